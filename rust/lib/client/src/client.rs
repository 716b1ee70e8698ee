use std::sync::Arc;

use gema_core::model::*;
use gema_core::validate::{validate_location_update, validate_new_location};
use reqwest::header::CONTENT_DISPOSITION;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::export::{DEFAULT_EXPORT_NAME, Download, GUIDE_NAME, filename_from_disposition};
use crate::session::TokenSource;

const LOCATIONS: &str = "/ubicaciones-tecnicas";

/// Typed client for the GEMA REST API.
///
/// Every authenticated call asks the [`TokenSource`] for a token first and
/// fails with [`ApiError::MissingSession`] before sending if there is none.
#[derive(Clone)]
pub struct GemaClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl GemaClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token, or fail if there is no session.
    async fn authed(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, ApiError> {
        match self.tokens.token().await? {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Err(ApiError::MissingSession),
        }
    }

    /// Map a non-2xx response to [`ApiError::Server`], preferring the
    /// body's `error` field over `fallback`.
    async fn check(resp: reqwest::Response, fallback: &str) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        warn!(status = status.as_u16(), %message, "request failed");
        Err(ApiError::Server {
            status: status.as_u16(),
            message,
        })
    }

    /// Decode the `data` member of a successful enveloped response.
    async fn parse<T: DeserializeOwned>(resp: reqwest::Response, fallback: &str) -> Result<T, ApiError> {
        let resp = Self::check(resp, fallback).await?;
        let env: Envelope<T> = resp
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("response body: {}", e)))?;
        Ok(env.data)
    }

    /// Decode a mutation response loosely: `data` if present, the whole
    /// body otherwise, `null` for an empty body.
    async fn parse_loose(resp: reqwest::Response, fallback: &str) -> Result<Value, ApiError> {
        let resp = Self::check(resp, fallback).await?;
        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        let mut body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::Decode(format!("response body: {}", e)))?;
        Ok(match body.get_mut("data") {
            Some(data) => data.take(),
            None => body,
        })
    }

    async fn get_authed<T: DeserializeOwned>(&self, path: &str, fallback: &str) -> Result<T, ApiError> {
        let req = self.authed(self.http.get(self.url(path))).await?;
        debug!(path, "GET");
        let resp = req.send().await?;
        Self::parse(resp, fallback).await
    }

    // ── Session ─────────────────────────────────────────────────────

    /// `POST /login`. Needs no token.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginData, ApiError> {
        debug!(email = %credentials.email, "POST /login");
        let resp = self
            .http
            .post(self.url("/login"))
            .json(credentials)
            .send()
            .await?;
        Self::parse(resp, "Error al iniciar sesión, por favor intente de nuevo.").await
    }

    // ── Technical locations ─────────────────────────────────────────

    /// Full location tree.
    pub async fn locations(&self) -> Result<Vec<LocationNode>, ApiError> {
        self.get_authed(
            LOCATIONS,
            "Error al obtener las ubicaciones técnicas, por favor intente de nuevo.",
        )
        .await
    }

    /// Locations depending on `id`, optionally only those at `level`.
    pub async fn location_branches(&self, id: i64, level: Option<u8>) -> Result<Vec<LocationNode>, ApiError> {
        let mut path = format!("{LOCATIONS}/ramas/{id}");
        if let Some(level) = level {
            path.push_str(&format!("?nivel={level}"));
        }
        self.get_authed(
            &path,
            "Error al obtener ubicaciones dependientes, por favor intente de nuevo.",
        )
        .await
    }

    /// Physical and virtual parents of `id`.
    pub async fn location_parents(&self, id: i64) -> Result<Vec<ParentLocation>, ApiError> {
        self.get_authed(
            &format!("{LOCATIONS}/padres/{id}"),
            "Error al obtener los padres de la ubicación, por favor intente de nuevo.",
        )
        .await
    }

    pub async fn create_location(&self, location: &NewLocation) -> Result<Value, ApiError> {
        validate_new_location(location)?;
        let req = self.authed(self.http.post(self.url(LOCATIONS)).json(location)).await?;
        debug!(abbreviation = %location.abbreviation, "POST {LOCATIONS}");
        let resp = req.send().await?;
        Self::parse_loose(
            resp,
            "Error al crear la ubicación técnica, por favor intente de nuevo.",
        )
        .await
    }

    pub async fn update_location(&self, id: i64, update: &LocationUpdate) -> Result<Value, ApiError> {
        validate_location_update(id, update)?;
        let url = self.url(&format!("{LOCATIONS}/{id}"));
        let req = self.authed(self.http.put(url).json(update)).await?;
        let resp = req.send().await?;
        Self::parse_loose(
            resp,
            "Error al actualizar la ubicación técnica, por favor intente de nuevo.",
        )
        .await
    }

    pub async fn delete_location(&self, id: i64) -> Result<Value, ApiError> {
        let url = self.url(&format!("{LOCATIONS}/{id}"));
        let req = self.authed(self.http.delete(url)).await?;
        let resp = req.send().await?;
        Self::parse_loose(
            resp,
            "Error al eliminar la ubicación técnica, por favor intente de nuevo.",
        )
        .await
    }

    /// Spreadsheet with every location.
    pub async fn export_locations(&self) -> Result<Download, ApiError> {
        let url = self.url(&format!("{LOCATIONS}/export/excel"));
        let req = self.authed(self.http.get(url)).await?;
        let resp = req.send().await?;
        let resp = Self::check(
            resp,
            "Error al exportar las ubicaciones técnicas, por favor intente de nuevo.",
        )
        .await?;
        let filename = resp
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| DEFAULT_EXPORT_NAME.to_string());
        let bytes = resp.bytes().await?.to_vec();
        Ok(Download { filename, bytes })
    }

    /// The static guide to technical locations. Needs no token.
    pub async fn download_guide(&self) -> Result<Download, ApiError> {
        let resp = self
            .http
            .get(self.url(&format!("/{GUIDE_NAME}")))
            .send()
            .await?;
        let resp = Self::check(resp, "Error al descargar la guía de ubicaciones técnicas.").await?;
        let bytes = resp.bytes().await?.to_vec();
        Ok(Download {
            filename: GUIDE_NAME.to_string(),
            bytes,
        })
    }

    // ── Work groups ─────────────────────────────────────────────────

    pub async fn work_groups(&self) -> Result<Vec<WorkGroup>, ApiError> {
        self.get_authed("/grupos", "Error al obtener los grupos de trabajo.").await
    }

    pub async fn create_work_group(&self, group: &NewWorkGroup) -> Result<WorkGroup, ApiError> {
        let req = self.authed(self.http.post(self.url("/grupos")).json(group)).await?;
        let resp = req.send().await?;
        Self::parse(resp, "Error al crear el grupo de trabajo.").await
    }

    pub async fn update_work_group(&self, id: i64, group: &NewWorkGroup) -> Result<Value, ApiError> {
        let url = self.url(&format!("/grupos/{id}"));
        let req = self.authed(self.http.put(url).json(group)).await?;
        let resp = req.send().await?;
        Self::parse_loose(resp, "Error al actualizar el grupo de trabajo.").await
    }

    pub async fn delete_work_group(&self, id: i64) -> Result<Value, ApiError> {
        let url = self.url(&format!("/grupos/{id}"));
        let req = self.authed(self.http.delete(url)).await?;
        let resp = req.send().await?;
        Self::parse_loose(resp, "Error al eliminar el grupo de trabajo.").await
    }

    // ── Technicians ─────────────────────────────────────────────────

    pub async fn technicians(&self) -> Result<Vec<Technician>, ApiError> {
        self.get_authed("/tecnicos", "Error al obtener los técnicos.").await
    }

    pub async fn create_technician(&self, technician: &NewTechnician) -> Result<Value, ApiError> {
        let req = self
            .authed(self.http.post(self.url("/tecnicos")).json(technician))
            .await?;
        let resp = req.send().await?;
        Self::parse_loose(resp, "Error al crear el técnico.").await
    }

    // ── Group membership ────────────────────────────────────────────

    /// Members of every group, in one request.
    pub async fn memberships(&self) -> Result<Vec<GroupMembership>, ApiError> {
        self.get_authed(
            "/trabajaEnGrupo",
            "Error al obtener los técnicos de los grupos de trabajo.",
        )
        .await
    }

    pub async fn add_member(&self, change: &MembershipChange) -> Result<Value, ApiError> {
        let req = self
            .authed(self.http.post(self.url("/trabajaEnGrupo")).json(change))
            .await?;
        let resp = req.send().await?;
        Self::parse_loose(resp, "Error al agregar el técnico al grupo de trabajo.").await
    }

    pub async fn remove_member(&self, change: &MembershipChange) -> Result<Value, ApiError> {
        let req = self
            .authed(self.http.delete(self.url("/trabajaEnGrupo")).json(change))
            .await?;
        let resp = req.send().await?;
        Self::parse_loose(resp, "Error al eliminar el técnico del grupo de trabajo.").await
    }
}
