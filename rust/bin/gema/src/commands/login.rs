//! Login / logout / status commands.

use std::path::Path;

use anyhow::Result;

use crate::commands::{anonymous_service, current_context};
use crate::config::ClientConfig;

/// Log in to the current context's backend and store the session.
///
/// The form is validated locally first; an invalid email never reaches
/// the backend.
pub async fn login(email: &str, password: &str, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;
    let ctx = current_context(&config)?.clone();

    let service = anonymous_service(&ctx)?;
    let session = service.login(email, password).await?;

    let ctx_mut = config
        .get_mut(&ctx.name)
        .ok_or_else(|| anyhow::anyhow!("Context disappeared"))?;
    let username = session.username.clone();
    ctx_mut.set_session(session);
    config.save(client_config_path)?;

    println!("Logged in as {}.", username);
    println!("Session saved to context \"{}\".", ctx.name);
    if !ctx.guide_seen {
        println!("New to technical locations? Run `gema guide` to download the guide.");
    }
    Ok(())
}

/// Drop the session of the current context.
pub fn logout(client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    let current_name = config.current_context.clone();
    if current_name.is_empty() {
        anyhow::bail!("No current context.");
    }

    let ctx = config
        .current_mut()
        .ok_or_else(|| anyhow::anyhow!("Current context not found."))?;
    ctx.clear_session();
    config.save(client_config_path)?;
    println!("Logged out from context \"{}\".", current_name);
    Ok(())
}

/// Show the current context and who is logged in.
pub fn status(client_config_path: &Path) -> Result<()> {
    let config = ClientConfig::load(client_config_path)?;
    let ctx = current_context(&config)?;

    let server = ctx.server_url().unwrap_or_else(|| "-".to_string());
    println!("Context:   {}", ctx.name);
    println!("Server:    {}", server);
    if ctx.session().is_active() {
        println!("User:      {} <{}>", ctx.username, ctx.email);
    } else {
        println!("User:      not logged in");
    }
    Ok(())
}
