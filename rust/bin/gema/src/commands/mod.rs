//! Command implementations. Each takes the client config path so it can
//! load (and, for session commands, save) the current context.

pub mod context;
pub mod groups;
pub mod guide;
pub mod locations;
pub mod login;
pub mod technicians;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use gema_client::{GemaClient, GemaService, NoAuth};
use serde::Serialize;

use crate::config::{ClientConfig, Context};

/// Output format selected with `-o`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Output {
    Table,
    Json,
}

impl Output {
    /// Print `value` as pretty JSON and return true when JSON was asked for.
    pub fn json<T: Serialize>(self, value: &T) -> Result<bool> {
        if self == Output::Json {
            println!("{}", serde_json::to_string_pretty(value)?);
            return Ok(true);
        }
        Ok(false)
    }
}

/// Current context, or an error telling the user how to pick one.
pub fn current_context(config: &ClientConfig) -> Result<&Context> {
    config
        .current()
        .ok_or_else(|| anyhow::anyhow!("No current context. Run `gema use context <name>`."))
}

fn server_url(ctx: &Context) -> Result<String> {
    ctx.server_url().ok_or_else(|| {
        anyhow::anyhow!(
            "No server URL set for context \"{}\". Run `gema context set {} --server <url>`.",
            ctx.name,
            ctx.name
        )
    })
}

/// Service for a context without a session (login and static files).
pub fn anonymous_service(ctx: &Context) -> Result<GemaService> {
    let client = GemaClient::new(server_url(ctx)?, Arc::new(NoAuth));
    Ok(GemaService::new(client))
}

/// Service authenticated with the current context's session.
///
/// Refuses to run any protected command while logged out.
pub fn require_session(client_config_path: &Path) -> Result<GemaService> {
    let config = ClientConfig::load(client_config_path)?;
    let ctx = current_context(&config)?;
    let session = ctx.session();
    if !session.is_active() {
        anyhow::bail!("Not logged in to context \"{}\". Run `gema login`.", ctx.name);
    }
    let server = server_url(ctx)?;
    tracing::debug!(context = %ctx.name, %server, user = %session.email, "using session");
    let client = GemaClient::new(server, Arc::new(session));
    Ok(GemaService::new(client))
}

/// Ask on stderr and read a yes/no answer; anything but `y` is no.
pub fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{prompt} [y/N]: ");
    let mut s = String::new();
    std::io::stdin().read_line(&mut s)?;
    Ok(s.trim().eq_ignore_ascii_case("y"))
}

/// Print a mutation result: the backend's `data`, if it sent any.
pub fn print_result(value: &serde_json::Value) -> Result<()> {
    if !value.is_null() {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}
