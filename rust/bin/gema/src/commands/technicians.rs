//! Technician commands.

use std::path::Path;

use anyhow::Result;
use gema_client::groups_by_technician;

use crate::commands::{Output, require_session};

/// Technicians with the work groups each belongs to.
pub async fn list(output: Output, client_config_path: &Path) -> Result<()> {
    let service = require_session(client_config_path)?;
    let technicians = service.technicians().await?;
    if output.json(&technicians)? {
        return Ok(());
    }
    if technicians.is_empty() {
        println!("No technicians.");
        return Ok(());
    }

    let groups = service.work_groups().await?;
    let memberships = service.memberships().await?;
    let by_technician = groups_by_technician(&memberships, &groups);

    println!("{:6} {:24} {:28} {:12} {}", "ID", "NAME", "EMAIL", "KIND", "GROUPS");
    for t in &technicians {
        let codes = by_technician
            .get(&t.id)
            .map(|gs| gs.iter().map(|g| g.code.as_str()).collect::<Vec<_>>().join(","))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "-".into());
        println!("{:6} {:24} {:28} {:12} {}", t.id, t.name, t.email, t.kind.to_string(), codes);
    }
    Ok(())
}

pub async fn create(name: &str, email: &str, client_config_path: &Path) -> Result<()> {
    let service = require_session(client_config_path)?;
    service.create_technician(name, email).await?;
    println!("Technician {} <{}> created.", name, email);
    Ok(())
}
