//! Work group and membership commands.

use std::path::Path;

use anyhow::Result;
use gema_core::validate::WorkGroupForm;

use crate::commands::{Output, print_result, require_session};

pub async fn list(output: Output, client_config_path: &Path) -> Result<()> {
    let service = require_session(client_config_path)?;
    let groups = service.work_groups().await?;
    if output.json(&groups)? {
        return Ok(());
    }
    if groups.is_empty() {
        println!("No work groups.");
        return Ok(());
    }

    let memberships = service.memberships().await?;
    println!("{:6} {:12} {:32} {:10} {}", "ID", "CODE", "NAME", "SUPERVISOR", "MEMBERS");
    for g in &groups {
        let supervisor = g.supervisor_id.map(|id| id.to_string()).unwrap_or_else(|| "-".into());
        let members = memberships
            .iter()
            .find(|m| m.group_id == g.id)
            .map_or(0, |m| m.technicians.len());
        println!("{:6} {:12} {:32} {:10} {}", g.id, g.code, g.name, supervisor, members);
    }
    Ok(())
}

pub async fn create(form: WorkGroupForm, output: Output, client_config_path: &Path) -> Result<()> {
    let service = require_session(client_config_path)?;
    let group = service.create_work_group(&form).await?;
    if output.json(&group)? {
        return Ok(());
    }
    println!("Work group {} created (id {}).", group.code, group.id);
    Ok(())
}

pub async fn update(id: i64, form: WorkGroupForm, client_config_path: &Path) -> Result<()> {
    let service = require_session(client_config_path)?;
    let updated = service.update_work_group(id, &form).await?;
    println!("Work group {} updated.", id);
    print_result(&updated)
}

pub async fn delete(id: i64, client_config_path: &Path) -> Result<()> {
    let service = require_session(client_config_path)?;
    let deleted = service.delete_work_group(id).await?;
    println!("Work group {} deleted.", id);
    print_result(&deleted)
}

/// Technicians of one group.
pub async fn members(group_id: i64, output: Output, client_config_path: &Path) -> Result<()> {
    let service = require_session(client_config_path)?;
    let memberships = service.memberships().await?;
    let technicians = memberships
        .into_iter()
        .find(|m| m.group_id == group_id)
        .map(|m| m.technicians)
        .unwrap_or_default();
    if output.json(&technicians)? {
        return Ok(());
    }
    if technicians.is_empty() {
        println!("Work group {} has no technicians.", group_id);
        return Ok(());
    }
    println!("{:6} {:24} {}", "ID", "NAME", "EMAIL");
    for t in &technicians {
        println!("{:6} {:24} {}", t.id, t.name, t.email);
    }
    Ok(())
}

pub async fn add_member(group_id: i64, technician_id: i64, client_config_path: &Path) -> Result<()> {
    let service = require_session(client_config_path)?;
    service.add_member(group_id, technician_id).await?;
    println!("Technician {} added to work group {}.", technician_id, group_id);
    Ok(())
}

pub async fn remove_member(group_id: i64, technician_id: i64, client_config_path: &Path) -> Result<()> {
    let service = require_session(client_config_path)?;
    service.remove_member(group_id, technician_id).await?;
    println!("Technician {} removed from work group {}.", technician_id, group_id);
    Ok(())
}
