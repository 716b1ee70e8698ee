//! In-process stand-in for the GEMA backend.
//!
//! Serves a small location tree, work groups and technicians, requires the
//! bearer token issued by `/login`, and records every request so tests can
//! assert what reached the network.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use serde_json::{Value, json};

pub const EMAIL: &str = "ana@ucab.edu.ve";
pub const PASSWORD: &str = "secreto";
pub const TOKEN: &str = "tok-123";
pub const EXPORT_BYTES: &[u8] = b"PK\x03\x04fake-xlsx";

#[derive(Default)]
pub struct Recorder {
    /// `"METHOD path"` of every request, in arrival order.
    pub requests: Vec<String>,
    /// JSON bodies of POST/PUT/DELETE requests.
    pub bodies: Vec<Value>,
}

#[derive(Clone)]
pub struct Backend {
    pub recorder: Arc<Mutex<Recorder>>,
    pub tree: Arc<Mutex<Value>>,
}

impl Backend {
    pub fn requests(&self) -> Vec<String> {
        self.recorder.lock().unwrap().requests.clone()
    }

    pub fn count(&self, request: &str) -> usize {
        self.requests().iter().filter(|r| *r == request).count()
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.recorder.lock().unwrap().bodies.clone()
    }

    fn record(&self, request: String, body: Option<Value>) {
        let mut rec = self.recorder.lock().unwrap();
        rec.requests.push(request);
        if let Some(body) = body {
            rec.bodies.push(body);
        }
    }
}

fn location(id: i64, code: &str, children: Vec<Value>) -> Value {
    let abbreviation = code.rsplit('-').next().unwrap();
    json!({
        "idUbicacion": id,
        "descripcion": format!("Ubicacion {code}"),
        "abreviacion": abbreviation,
        "codigo_Identificacion": code,
        "nivel": code.split('-').count(),
        "children": children,
    })
}

/// M2 → P1 → A101, plus an empty M3.
pub fn default_tree() -> Value {
    json!([
        location(1, "M2", vec![
            location(2, "M2-P1", vec![location(3, "M2-P1-A101", vec![])]),
        ]),
        location(4, "M3", vec![]),
    ])
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {TOKEN}").as_str())
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": "Token inválido"}))).into_response()
}

async fn login(State(b): State<Backend>, Json(body): Json<Value>) -> Response {
    b.record("POST /login".into(), Some(body.clone()));
    if body["Correo"] == EMAIL && body["Contraseña"] == PASSWORD {
        Json(json!({"data": {"token": TOKEN, "usuario": {
            "Id": 1, "Nombre": "Ana García", "Correo": EMAIL, "Tipo": "COORDINADOR"
        }}}))
        .into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"error": "Credenciales inválidas"}))).into_response()
    }
}

async fn list_locations(State(b): State<Backend>, headers: HeaderMap) -> Response {
    b.record("GET /ubicaciones-tecnicas".into(), None);
    if !authorized(&headers) {
        return unauthorized();
    }
    let tree = b.tree.lock().unwrap().clone();
    Json(json!({"data": tree})).into_response()
}

async fn create_location(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("POST /ubicaciones-tecnicas".into(), Some(body.clone()));
    if !authorized(&headers) {
        return unauthorized();
    }
    if body["abreviacion"] == "DUP" {
        return (StatusCode::CONFLICT, Json(json!({"error": "La ubicación ya existe"}))).into_response();
    }
    (StatusCode::CREATED, Json(json!({"data": {"idUbicacion": 100}}))).into_response()
}

async fn update_location(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    b.record(format!("PUT /ubicaciones-tecnicas/{id}"), Some(body));
    if !authorized(&headers) {
        return unauthorized();
    }
    if id == 999 {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    Json(json!({"data": {"idUbicacion": id}})).into_response()
}

async fn delete_location(State(b): State<Backend>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    b.record(format!("DELETE /ubicaciones-tecnicas/{id}"), None);
    if !authorized(&headers) {
        return unauthorized();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn branches(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let suffix = q.get("nivel").map(|n| format!("?nivel={n}")).unwrap_or_default();
    b.record(format!("GET /ubicaciones-tecnicas/ramas/{id}{suffix}"), None);
    if !authorized(&headers) {
        return unauthorized();
    }
    if id != 1 {
        return (StatusCode::NOT_FOUND, Json(json!({}))).into_response();
    }
    let all = json!([
        location(2, "M2-P1", vec![]),
        location(3, "M2-P1-A101", vec![]),
    ]);
    let data: Vec<Value> = all
        .as_array()
        .unwrap()
        .iter()
        .filter(|l| match q.get("nivel") {
            Some(n) => l["nivel"].to_string() == *n,
            None => true,
        })
        .cloned()
        .collect();
    Json(json!({"data": data})).into_response()
}

async fn parents(State(b): State<Backend>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    b.record(format!("GET /ubicaciones-tecnicas/padres/{id}"), None);
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut parent = location(2, "M2-P1", vec![]);
    parent["esUbicacionFisica"] = json!(true);
    Json(json!({"data": [parent]})).into_response()
}

async fn export(State(b): State<Backend>, headers: HeaderMap) -> Response {
    b.record("GET /ubicaciones-tecnicas/export/excel".into(), None);
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        [(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"ubicaciones-2026.xlsx\"",
        )],
        EXPORT_BYTES,
    )
        .into_response()
}

async fn guide(State(b): State<Backend>) -> Response {
    b.record("GET /guia-ubicaciones-tecnicas.pdf".into(), None);
    (StatusCode::OK, b"%PDF-1.4".as_slice()).into_response()
}

async fn list_groups(State(b): State<Backend>, headers: HeaderMap) -> Response {
    b.record("GET /grupos".into(), None);
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"data": [
        {"id": 1, "codigo": "SGMREF", "nombre": "Refrigeración", "supervisorId": 7},
        {"id": 2, "codigo": "SGMELE", "nombre": "Eléctrico", "supervisorId": null},
    ]}))
    .into_response()
}

async fn create_group(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("POST /grupos".into(), Some(body.clone()));
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut group = body;
    group["id"] = json!(3);
    Json(json!({"data": group})).into_response()
}

async fn update_group(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    b.record(format!("PUT /grupos/{id}"), Some(body.clone()));
    if !authorized(&headers) {
        return unauthorized();
    }
    if id == 404 {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "Grupo no encontrado"}))).into_response();
    }
    let mut group = body;
    group["id"] = json!(id);
    Json(json!({"data": group})).into_response()
}

async fn delete_group(State(b): State<Backend>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    b.record(format!("DELETE /grupos/{id}"), None);
    if !authorized(&headers) {
        return unauthorized();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_technicians(State(b): State<Backend>, headers: HeaderMap) -> Response {
    b.record("GET /tecnicos".into(), None);
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"data": [
        {"Id": 10, "Nombre": "Luis", "Correo": "luis@ucab.edu.ve", "Tipo": "TECNICO"},
        {"Id": 11, "Nombre": "Marta", "Correo": "marta@ucab.edu.ve", "Tipo": "TECNICO"},
    ]}))
    .into_response()
}

async fn create_technician(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("POST /tecnicos".into(), Some(body.clone()));
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"data": body})).into_response()
}

async fn memberships(State(b): State<Backend>, headers: HeaderMap) -> Response {
    b.record("GET /trabajaEnGrupo".into(), None);
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"data": [
        {"grupoDeTrabajoId": 1, "usuarios": [
            {"Id": 10, "Nombre": "Luis", "Correo": "luis@ucab.edu.ve", "Tipo": "TECNICO"}
        ]},
    ]}))
    .into_response()
}

async fn add_member(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("POST /trabajaEnGrupo".into(), Some(body));
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"data": null})).into_response()
}

async fn remove_member(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("DELETE /trabajaEnGrupo".into(), Some(body));
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"data": {"eliminado": true}})).into_response()
}

/// Start the backend on an ephemeral port. Returns its base URL.
pub async fn spawn_backend() -> (String, Backend) {
    let backend = Backend {
        recorder: Arc::new(Mutex::new(Recorder::default())),
        tree: Arc::new(Mutex::new(default_tree())),
    };

    let app = Router::new()
        .route("/login", post(login))
        .route("/ubicaciones-tecnicas", get(list_locations).post(create_location))
        .route(
            "/ubicaciones-tecnicas/{id}",
            put(update_location).delete(delete_location),
        )
        .route("/ubicaciones-tecnicas/ramas/{id}", get(branches))
        .route("/ubicaciones-tecnicas/padres/{id}", get(parents))
        .route("/ubicaciones-tecnicas/export/excel", get(export))
        .route("/guia-ubicaciones-tecnicas.pdf", get(guide))
        .route("/grupos", get(list_groups).post(create_group))
        .route("/grupos/{id}", put(update_group).delete(delete_group))
        .route("/tecnicos", get(list_technicians).post(create_technician))
        .route("/trabajaEnGrupo", get(memberships).post(add_member).delete(remove_member))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), backend)
}
