//! Mutation and query flows on top of [`GemaClient`].
//!
//! Reads go through the [`QueryCache`]; each mutation validates its form,
//! calls the backend and, on success only, invalidates the queries whose
//! data it changed. A failed mutation leaves the cache untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use gema_core::hierarchy::create::{CreateRequest, plan_creation};
use gema_core::hierarchy::tree::flatten;
use gema_core::model::*;
use gema_core::validate::{WorkGroupForm, validate_login, validate_technician, validate_work_group};
use serde_json::Value;
use tracing::info;

use crate::cache::{QueryCache, QueryKey};
use crate::client::GemaClient;
use crate::error::ApiError;
use crate::export::Download;
use crate::session::Session;

pub struct GemaService {
    client: GemaClient,
    cache: Arc<QueryCache>,
}

impl GemaService {
    pub fn new(client: GemaClient) -> Self {
        Self::with_cache(client, Arc::new(QueryCache::default()))
    }

    pub fn with_cache(client: GemaClient, cache: Arc<QueryCache>) -> Self {
        Self { client, cache }
    }

    pub fn client(&self) -> &GemaClient {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // ── Session ─────────────────────────────────────────────────────

    /// Validate the credentials and log in. Nothing is sent when the
    /// login form is invalid.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let credentials = validate_login(email, password)?;
        let data = self.client.login(&credentials).await?;
        self.cache.clear();
        info!(user = %data.user.name, "logged in");
        Ok(Session::new(data.token, data.user.name, data.user.email))
    }

    // ── Technical locations ─────────────────────────────────────────

    pub async fn locations(&self) -> Result<Vec<LocationNode>, ApiError> {
        self.cache
            .fetch(&QueryKey::Locations, || self.client.locations())
            .await
    }

    /// Every location as flat pre-order records.
    pub async fn flat_locations(&self) -> Result<Vec<TechnicalLocation>, ApiError> {
        Ok(flatten(&self.locations().await?))
    }

    pub async fn location_branches(&self, id: i64, level: Option<u8>) -> Result<Vec<LocationNode>, ApiError> {
        self.cache
            .fetch(&QueryKey::LocationBranches { id, level }, || {
                self.client.location_branches(id, level)
            })
            .await
    }

    pub async fn location_parents(&self, id: i64) -> Result<Vec<ParentLocation>, ApiError> {
        self.cache
            .fetch(&QueryKey::LocationParents { id }, || self.client.location_parents(id))
            .await
    }

    /// Resolve parents against the current tree, then create.
    ///
    /// A missing physical parent is reported as
    /// [`ResolveError::ParentNotFound`](gema_core::ResolveError) and no
    /// creation request is sent.
    pub async fn create_location(&self, request: &CreateRequest) -> Result<Value, ApiError> {
        let existing = self.flat_locations().await?;
        let payload = plan_creation(request, &existing)?;
        let created = self.client.create_location(&payload).await?;
        self.cache.invalidate(QueryKey::LOCATIONS);
        info!(code = %request.segments.code(), "location created");
        Ok(created)
    }

    pub async fn update_location(&self, id: i64, update: &LocationUpdate) -> Result<Value, ApiError> {
        let updated = self.client.update_location(id, update).await?;
        self.cache.invalidate(QueryKey::LOCATIONS);
        info!(id, "location updated");
        Ok(updated)
    }

    pub async fn delete_location(&self, id: i64) -> Result<Value, ApiError> {
        let deleted = self.client.delete_location(id).await?;
        self.cache.invalidate(QueryKey::LOCATIONS);
        info!(id, "location deleted");
        Ok(deleted)
    }

    pub async fn export_locations(&self) -> Result<Download, ApiError> {
        self.client.export_locations().await
    }

    // ── Work groups ─────────────────────────────────────────────────

    pub async fn work_groups(&self) -> Result<Vec<WorkGroup>, ApiError> {
        self.cache
            .fetch(&QueryKey::WorkGroups, || self.client.work_groups())
            .await
    }

    fn invalidate_groups(&self) {
        self.cache.invalidate(QueryKey::WORK_GROUPS);
        self.cache.invalidate(QueryKey::GROUP_MEMBERS);
    }

    pub async fn create_work_group(&self, form: &WorkGroupForm) -> Result<WorkGroup, ApiError> {
        let group = validate_work_group(form)?;
        let created = self.client.create_work_group(&group).await?;
        self.invalidate_groups();
        info!(code = %created.code, "work group created");
        Ok(created)
    }

    pub async fn update_work_group(&self, id: i64, form: &WorkGroupForm) -> Result<Value, ApiError> {
        let group = validate_work_group(form)?;
        let updated = self.client.update_work_group(id, &group).await?;
        self.invalidate_groups();
        Ok(updated)
    }

    pub async fn delete_work_group(&self, id: i64) -> Result<Value, ApiError> {
        let deleted = self.client.delete_work_group(id).await?;
        self.invalidate_groups();
        Ok(deleted)
    }

    // ── Technicians and membership ──────────────────────────────────

    pub async fn technicians(&self) -> Result<Vec<Technician>, ApiError> {
        self.cache
            .fetch(&QueryKey::Technicians, || self.client.technicians())
            .await
    }

    pub async fn create_technician(&self, name: &str, email: &str) -> Result<Value, ApiError> {
        let technician = validate_technician(name, email)?;
        let created = self.client.create_technician(&technician).await?;
        self.cache.invalidate(QueryKey::TECHNICIANS);
        info!(email, "technician created");
        Ok(created)
    }

    pub async fn memberships(&self) -> Result<Vec<GroupMembership>, ApiError> {
        self.cache
            .fetch(&QueryKey::GroupMembers, || self.client.memberships())
            .await
    }

    pub async fn add_member(&self, group_id: i64, technician_id: i64) -> Result<Value, ApiError> {
        let change = MembershipChange { technician_id, group_id };
        let added = self.client.add_member(&change).await?;
        self.cache.invalidate(QueryKey::GROUP_MEMBERS);
        Ok(added)
    }

    pub async fn remove_member(&self, group_id: i64, technician_id: i64) -> Result<Value, ApiError> {
        let change = MembershipChange { technician_id, group_id };
        let removed = self.client.remove_member(&change).await?;
        self.cache.invalidate(QueryKey::GROUP_MEMBERS);
        Ok(removed)
    }
}

/// Technician id → groups it belongs to. Memberships that point at a group
/// missing from `groups` are skipped.
pub fn groups_by_technician(
    memberships: &[GroupMembership],
    groups: &[WorkGroup],
) -> BTreeMap<i64, Vec<WorkGroup>> {
    let mut map: BTreeMap<i64, Vec<WorkGroup>> = BTreeMap::new();
    for membership in memberships {
        let Some(group) = groups.iter().find(|g| g.id == membership.group_id) else {
            continue;
        };
        for technician in &membership.technicians {
            map.entry(technician.id).or_default().push(group.clone());
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tech(id: i64) -> Technician {
        Technician {
            id,
            name: format!("Tecnico {id}"),
            email: format!("t{id}@ucab.edu.ve"),
            kind: UserKind::Tecnico,
        }
    }

    fn group(id: i64, code: &str) -> WorkGroup {
        WorkGroup {
            id,
            code: code.into(),
            name: format!("Grupo {code}"),
            supervisor_id: None,
        }
    }

    #[test]
    fn maps_technicians_to_groups() {
        let groups = vec![group(1, "SGMREF"), group(2, "SGMELE")];
        let memberships = vec![
            GroupMembership { group_id: 1, technicians: vec![tech(10), tech(11)] },
            GroupMembership { group_id: 2, technicians: vec![tech(10)] },
            GroupMembership { group_id: 99, technicians: vec![tech(12)] },
        ];
        let map = groups_by_technician(&memberships, &groups);
        let codes = |id: i64| -> Vec<String> {
            map.get(&id).map(|g| g.iter().map(|g| g.code.clone()).collect()).unwrap_or_default()
        };
        assert_eq!(codes(10), vec!["SGMREF", "SGMELE"]);
        assert_eq!(codes(11), vec!["SGMREF"]);
        assert!(codes(12).is_empty());
    }
}
