//! Form schemas.
//!
//! Each schema takes the raw form values, collects every violation (it
//! does not stop at the first one) and returns the typed payload only
//! when the form is valid. Messages are user-facing.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Credentials, LocationUpdate, NewLocation, NewTechnician, NewWorkGroup};

/// Required domain suffix for institutional emails.
pub const INSTITUTIONAL_DOMAIN: &str = "ucab.edu.ve";

pub const DESCRIPTION_MAX: usize = 50;
pub const ABBREVIATION_MAX: usize = 5;
pub const GROUP_CODE_MIN: usize = 3;
pub const TECHNICIAN_NAME_MIN: usize = 2;

/// A violation attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All violations found in one form.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", join(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn join(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError { field, message: message.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages for one field, in the order they were found.
    pub fn for_field(&self, field: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// Loose structural email check: one `@`, non-empty local part, dotted
/// domain, no whitespace.
pub fn is_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
}

/// Institutional address: a plain local part at exactly `ucab.edu.ve`.
static INSTITUTIONAL_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@ucab\.edu\.ve$").expect("valid institutional email pattern")
});

fn is_institutional(email: &str) -> bool {
    INSTITUTIONAL_EMAIL.is_match(email)
}

// ── Login ───────────────────────────────────────────────────────────

pub fn validate_login(email: &str, password: &str) -> Result<Credentials, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if email.is_empty() {
        errors.push("email", "El correo electrónico es requerido");
    } else {
        if !is_email(email) {
            errors.push("email", "Correo electrónico inválido");
        }
        if !email.ends_with(INSTITUTIONAL_DOMAIN) {
            errors.push("email", "El correo debe ser de la UCAB");
        }
    }
    if password.is_empty() {
        errors.push("password", "La contraseña es requerida");
    }
    errors.into_result(Credentials {
        email: email.to_string(),
        password: password.to_string(),
    })
}

// ── Technical locations ─────────────────────────────────────────────

fn check_description(errors: &mut ValidationErrors, description: &str) {
    let len = description.chars().count();
    if description.trim().is_empty() {
        errors.push("descripcion", "La descripción no puede estar vacía");
    } else if len > DESCRIPTION_MAX {
        errors.push(
            "descripcion",
            format!("La descripción debe tener como máximo {DESCRIPTION_MAX} caracteres"),
        );
    }
}

fn check_abbreviation(errors: &mut ValidationErrors, abbreviation: &str) {
    let len = abbreviation.chars().count();
    if abbreviation.trim().is_empty() {
        errors.push("abreviacion", "La abreviación no puede estar vacía");
    } else if len > ABBREVIATION_MAX {
        errors.push(
            "abreviacion",
            format!("La abreviación debe tener como máximo {ABBREVIATION_MAX} caracteres"),
        );
    }
}

fn check_parents(errors: &mut ValidationErrors, parents: &[crate::model::ParentLink]) {
    if parents.iter().filter(|p| p.physical).count() > 1 {
        errors.push("padres", "Solo un padre puede ser la ubicación física");
    }
}

pub fn validate_new_location(location: &NewLocation) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_description(&mut errors, &location.description);
    check_abbreviation(&mut errors, &location.abbreviation);
    check_parents(&mut errors, &location.parents);
    errors.into_result(())
}

/// An update needs a positive id and at least one non-blank field.
pub fn validate_location_update(id: i64, update: &LocationUpdate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if id <= 0 {
        errors.push("id", "El parámetro 'id' debe ser un número positivo válido.");
    }

    let description = update.description.as_deref().filter(|s| !s.trim().is_empty());
    let abbreviation = update.abbreviation.as_deref().filter(|s| !s.trim().is_empty());
    let parents = update.parents.as_deref().filter(|p| !p.is_empty());

    if description.is_none() && abbreviation.is_none() && parents.is_none() {
        errors.push(
            "ubicacion",
            "Debe proporcionar al menos uno de los siguientes parámetros válidos para actualizar: descripcion, abreviacion o padres.",
        );
    }
    if let Some(d) = description {
        check_description(&mut errors, d);
    }
    if let Some(a) = abbreviation {
        check_abbreviation(&mut errors, a);
    }
    if let Some(p) = parents {
        check_parents(&mut errors, p);
    }
    errors.into_result(())
}

// ── Work groups ─────────────────────────────────────────────────────

/// Raw work-group form; the supervisor arrives as text and is coerced.
#[derive(Debug, Clone, Default)]
pub struct WorkGroupForm {
    pub code: String,
    pub name: String,
    pub supervisor: String,
}

pub fn validate_work_group(form: &WorkGroupForm) -> Result<NewWorkGroup, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if form.code.is_empty() {
        errors.push("codigo", "El código es requerido");
    } else if form.code.chars().count() < GROUP_CODE_MIN {
        errors.push(
            "codigo",
            format!("El código debe tener al menos {GROUP_CODE_MIN} caracteres"),
        );
    }
    if form.name.trim().is_empty() {
        errors.push("nombre", "El nombre es requerido");
    }
    let supervisor = if form.supervisor.trim().is_empty() {
        errors.push("supervisor", "El supervisor es requerido");
        0
    } else {
        match form.supervisor.trim().parse::<i64>() {
            Ok(id) => id,
            Err(_) => {
                errors.push("supervisor", "El supervisor debe ser un número entero");
                0
            }
        }
    };
    errors.into_result(NewWorkGroup {
        code: form.code.clone(),
        name: form.name.clone(),
        supervisor_id: supervisor,
    })
}

// ── Technicians ─────────────────────────────────────────────────────

pub fn validate_technician(name: &str, email: &str) -> Result<NewTechnician, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if name.chars().count() < TECHNICIAN_NAME_MIN {
        errors.push("Nombre", "El nombre es requerido");
    }
    if !is_email(email) {
        errors.push("Correo", "Correo inválido");
    }
    if !is_institutional(email) {
        errors.push("Correo", "Debe ser un correo institucional @ucab.edu.ve");
    }
    errors.into_result(NewTechnician {
        name: name.to_string(),
        email: email.to_string(),
    })
}
