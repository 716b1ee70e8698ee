//! Client-side context management.
//!
//! Reads/writes `~/.gema/config.toml`.

use std::path::{Path, PathBuf};

use gema_client::Session;
use serde::{Deserialize, Serialize};

/// Environment variable that overrides the server URL of every context.
pub const BASE_URL_ENV: &str = "GEMA_BACKEND_BASE_URL";

/// A single context: one GEMA backend plus the session held against it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Context name (e.g. "guayana").
    pub name: String,

    /// Backend URL (e.g. "http://localhost:3000").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,

    /// Bearer token (set by `gema login`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,

    /// Display name of the logged-in user.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,

    /// The guide to technical locations was already downloaded.
    #[serde(default)]
    pub guide_seen: bool,
}

impl Context {
    pub fn new(name: &str, server: &str) -> Self {
        Self {
            name: name.to_string(),
            server: server.to_string(),
            ..Default::default()
        }
    }

    /// Server URL, with the environment override applied.
    pub fn server_url(&self) -> Option<String> {
        std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| Some(self.server.clone()).filter(|s| !s.is_empty()))
    }

    pub fn session(&self) -> Session {
        Session::new(&self.token, &self.username, &self.email)
    }

    pub fn set_session(&mut self, session: Session) {
        self.token = session.token;
        self.username = session.username;
        self.email = session.email;
    }

    pub fn clear_session(&mut self) {
        self.set_session(Session::default());
    }
}

/// Client configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Name of the currently active context.
    #[serde(rename = "current-context", default)]
    pub current_context: String,

    #[serde(default)]
    pub contexts: Vec<Context>,
}

impl ClientConfig {
    /// Default config file path: ~/.gema/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Load config from disk, or return default if the file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the currently active context, if any.
    pub fn current(&self) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == self.current_context)
    }

    pub fn current_mut(&mut self) -> Option<&mut Context> {
        let name = self.current_context.clone();
        self.get_mut(&name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    /// Add or update a context.
    pub fn upsert_context(&mut self, ctx: Context) {
        if let Some(existing) = self.get_mut(&ctx.name) {
            *existing = ctx;
        } else {
            self.contexts.push(ctx);
        }
    }

    /// Remove a context by name. Returns true if it was found.
    pub fn remove_context(&mut self, name: &str) -> bool {
        let len = self.contexts.len();
        self.contexts.retain(|c| c.name != name);
        if self.current_context == name {
            self.current_context = String::new();
        }
        self.contexts.len() < len
    }
}

/// Return the GEMA config directory (~/.gema).
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".gema")
}
