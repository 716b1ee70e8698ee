use crate::model::{NewLocation, ParentLink, TechnicalLocation};
use crate::validate::{ValidationErrors, validate_new_location};

use super::code::CodeSegments;

/// Why a new location cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Debe indicar al menos el módulo de la ubicación")]
    EmptyCode,

    #[error("No se encontró la ubicación padre con código {code}")]
    ParentNotFound { code: String },

    #[error("Ya existe una ubicación con código {code}")]
    AlreadyExists { code: String },

    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}

/// What the user filled in to create one location.
#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    pub segments: CodeSegments,
    pub description: String,
    /// The location is an equipment item and may serve other locations.
    pub equipment: bool,
    /// Additional virtual parents; only used when `equipment` is set.
    pub virtual_parents: Vec<i64>,
}

/// Build the creation payload, resolving the physical parent against the
/// existing locations (flattened).
///
/// Fails without touching the network when the code implies a parent that
/// does not exist yet.
pub fn plan_creation(
    request: &CreateRequest,
    existing: &[TechnicalLocation],
) -> Result<NewLocation, ResolveError> {
    let code = request.segments.code();
    if code.is_empty() {
        return Err(ResolveError::EmptyCode);
    }
    if existing.iter().any(|loc| loc.code == code) {
        return Err(ResolveError::AlreadyExists { code });
    }

    let mut parents = Vec::new();
    let mut physical_id = None;
    if let Some(parent_code) = request.segments.parent_code() {
        let parent = existing
            .iter()
            .find(|loc| loc.code == parent_code)
            .ok_or(ResolveError::ParentNotFound { code: parent_code })?;
        tracing::debug!(code = %code, parent = parent.id, "resolved physical parent");
        parents.push(ParentLink::physical(parent.id));
        physical_id = Some(parent.id);
    }

    if request.equipment {
        for &id in &request.virtual_parents {
            if Some(id) == physical_id || parents.iter().any(|p| p.parent_id == id) {
                continue;
            }
            parents.push(ParentLink::virtual_link(id));
        }
    }

    // The abbreviation is the last segment of the code, not of the form:
    // anything past a gap never reaches the code.
    let abbreviation = request
        .segments
        .included()
        .last()
        .cloned()
        .unwrap_or_default();

    let location = NewLocation {
        description: request.description.clone(),
        abbreviation,
        parents,
    };
    validate_new_location(&location)?;
    Ok(location)
}
