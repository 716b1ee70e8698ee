use serde::{Deserialize, Serialize};

use super::Technician;

/// A named crew of technicians under one supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkGroup {
    pub id: i64,
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "supervisorId", default)]
    pub supervisor_id: Option<i64>,
}

/// Payload for creating or updating a work group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWorkGroup {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "supervisorId")]
    pub supervisor_id: i64,
}

/// Members of one work group, as returned in bulk by `GET /trabajaEnGrupo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembership {
    #[serde(rename = "grupoDeTrabajoId")]
    pub group_id: i64,
    #[serde(rename = "usuarios", default)]
    pub technicians: Vec<Technician>,
}

/// Body for adding or removing one technician from a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipChange {
    #[serde(rename = "tecnicoId")]
    pub technician_id: i64,
    #[serde(rename = "grupoDeTrabajoId")]
    pub group_id: i64,
}
