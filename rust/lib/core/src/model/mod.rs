//! Wire types shared with the GEMA backend.
//!
//! Field names follow the backend JSON exactly; Rust names are English.

mod group;
mod location;
mod technician;

pub use group::*;
pub use location::*;
pub use technician::*;

use serde::{Deserialize, Serialize};

/// Every backend response wraps its payload in `{"data": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
