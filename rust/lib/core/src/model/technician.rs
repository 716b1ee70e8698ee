use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserKind {
    Tecnico,
    Coordinador,
}

impl std::fmt::Display for UserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserKind::Tecnico => f.write_str("TECNICO"),
            UserKind::Coordinador => f.write_str("COORDINADOR"),
        }
    }
}

/// A user of the maintenance program (technician or coordinator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technician {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Nombre")]
    pub name: String,
    /// Institutional email.
    #[serde(rename = "Correo")]
    pub email: String,
    #[serde(rename = "Tipo", default = "default_kind")]
    pub kind: UserKind,
}

fn default_kind() -> UserKind {
    UserKind::Tecnico
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTechnician {
    #[serde(rename = "Nombre")]
    pub name: String,
    #[serde(rename = "Correo")]
    pub email: String,
}

/// Body of `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    #[serde(rename = "Correo")]
    pub email: String,
    #[serde(rename = "Contraseña")]
    pub password: String,
}

/// Payload inside the login envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginData {
    pub token: String,
    #[serde(rename = "usuario")]
    pub user: Technician,
}
