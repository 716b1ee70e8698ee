use serde::{Deserialize, Deserializer, Serialize};

/// A technical location as a flat record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalLocation {
    #[serde(rename = "idUbicacion")]
    pub id: i64,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "abreviacion")]
    pub abbreviation: String,
    /// Dash-joined abbreviations from the root down to this node.
    #[serde(rename = "codigo_Identificacion")]
    pub code: String,
    /// Depth in the hierarchy, 1 = module.
    #[serde(rename = "nivel")]
    pub level: u8,
}

/// A node of the location tree as served by `GET /ubicaciones-tecnicas`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationNode {
    #[serde(flatten)]
    pub location: TechnicalLocation,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LocationNode>,
}

impl LocationNode {
    pub fn leaf(location: TechnicalLocation) -> Self {
        Self { location, children: Vec::new() }
    }

    pub fn code(&self) -> &str {
        &self.location.code
    }
}

fn null_as_empty<'de, D>(de: D) -> Result<Vec<LocationNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<LocationNode>>::deserialize(de)?.unwrap_or_default())
}

/// Link from a location to one of its parents.
///
/// At most one link per location is physical (true containment); the rest
/// are virtual service relationships, e.g. an HVAC unit serving several rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    #[serde(rename = "idPadre")]
    pub parent_id: i64,
    #[serde(rename = "esUbicacionFisica", default)]
    pub physical: bool,
}

impl ParentLink {
    pub fn physical(parent_id: i64) -> Self {
        Self { parent_id, physical: true }
    }

    pub fn virtual_link(parent_id: i64) -> Self {
        Self { parent_id, physical: false }
    }
}

/// A parent of some location, as returned by the ancestor query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLocation {
    #[serde(flatten)]
    pub location: TechnicalLocation,
    #[serde(rename = "esUbicacionFisica", default)]
    pub physical: bool,
}

/// Payload of `POST /ubicaciones-tecnicas`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLocation {
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "abreviacion")]
    pub abbreviation: String,
    #[serde(rename = "padres", default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<ParentLink>,
}

/// Payload of `PUT /ubicaciones-tecnicas/:id`. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationUpdate {
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "abreviacion", skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
    #[serde(rename = "padres", skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<ParentLink>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_accepts_missing_and_null_children() {
        let json = r#"[
            {"idUbicacion": 1, "descripcion": "Modulo 2", "abreviacion": "M2",
             "codigo_Identificacion": "M2", "nivel": 1,
             "children": [
                {"idUbicacion": 2, "descripcion": "Planta 1", "abreviacion": "P1",
                 "codigo_Identificacion": "M2-P1", "nivel": 2, "children": null}
             ]},
            {"idUbicacion": 3, "descripcion": "Modulo 3", "abreviacion": "M3",
             "codigo_Identificacion": "M3", "nivel": 1}
        ]"#;
        let nodes: Vec<LocationNode> = serde_json::from_str(json).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].children[0].code(), "M2-P1");
        assert!(nodes[0].children[0].children.is_empty());
        assert!(nodes[1].children.is_empty());
    }

    #[test]
    fn new_location_uses_backend_field_names() {
        let payload = NewLocation {
            description: "Floor 1".into(),
            abbreviation: "P1".into(),
            parents: vec![ParentLink::physical(7)],
        };
        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(v["descripcion"], "Floor 1");
        assert_eq!(v["abreviacion"], "P1");
        assert_eq!(v["padres"][0]["idPadre"], 7);
        assert_eq!(v["padres"][0]["esUbicacionFisica"], true);
    }

    #[test]
    fn update_omits_unset_fields() {
        let update = LocationUpdate {
            description: Some("Nueva".into()),
            ..Default::default()
        };
        let v = serde_json::to_value(&update).unwrap();
        assert_eq!(v, serde_json::json!({"descripcion": "Nueva"}));
    }
}
