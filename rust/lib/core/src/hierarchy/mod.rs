//! Client-side view of the seven-level location hierarchy.
//!
//! - [`code`]: building identification codes from ordered segments.
//! - [`tree`]: flattening, rebuilding, counting and grouping.
//! - [`filter`]: level facets and ancestor-preserving pruning.
//! - [`create`]: resolving the parents of a location before creation.

pub mod code;
pub mod create;
pub mod filter;
pub mod tree;

/// Separator between abbreviations in an identification code.
pub const CODE_SEPARATOR: char = '-';
