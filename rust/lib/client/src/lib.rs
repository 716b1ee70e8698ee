//! GEMA HTTP client.
//!
//! [`GemaClient`] wraps every backend endpoint with typed payloads.
//! Authentication goes through a pluggable [`TokenSource`]; the usual one
//! is the logged-in [`Session`]. [`GemaService`] layers form validation,
//! parent resolution and an explicit [`QueryCache`] on top.
//!
//! # Usage
//!
//! ```ignore
//! use gema_client::{GemaClient, GemaService, Session};
//!
//! let client = GemaClient::new("http://localhost:3000", Arc::new(session));
//! let service = GemaService::new(client);
//! let tree = service.locations().await?;
//! ```

pub mod cache;
pub mod client;
pub mod error;
pub mod export;
pub mod service;
pub mod session;

pub use cache::{QueryCache, QueryKey, QueryStatus};
pub use client::GemaClient;
pub use error::ApiError;
pub use export::Download;
pub use service::{GemaService, groups_by_technician};
pub use session::{NoAuth, Session, TokenSource};
