//! GEMA core: data model, location hierarchy utilities and form schemas.
//!
//! Everything here is pure. Network access lives in `gema-client`.

pub mod hierarchy;
pub mod model;
pub mod validate;

pub use hierarchy::code::{CodeSegments, Level};
pub use hierarchy::create::{CreateRequest, ResolveError, plan_creation};
pub use hierarchy::filter::{LevelFilter, level_options, prune};
pub use hierarchy::tree::{descendant_count, flatten, rebuild};
pub use model::*;
pub use validate::{FieldError, ValidationErrors};
