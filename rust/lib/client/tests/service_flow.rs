mod support;

use std::sync::Arc;

use gema_client::{ApiError, GemaClient, GemaService, NoAuth, QueryKey, QueryStatus, Session};
use gema_core::hierarchy::code::{CodeSegments, Level};
use gema_core::hierarchy::create::{CreateRequest, ResolveError};
use gema_core::validate::WorkGroupForm;
use serde_json::json;
use support::{EMAIL, PASSWORD, TOKEN, spawn_backend};

fn service(base: &str) -> GemaService {
    GemaService::new(GemaClient::new(base, Arc::new(Session::new(TOKEN, "Ana", EMAIL))))
}

fn floor(module: &str, floor: &str) -> CreateRequest {
    CreateRequest {
        segments: CodeSegments::default()
            .with(Level::Modulo, module)
            .with(Level::Planta, floor),
        description: "Floor 1".into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn login_rejects_foreign_email_without_request() {
    let (base, backend) = spawn_backend().await;
    let svc = GemaService::new(GemaClient::new(&base, Arc::new(NoAuth)));
    let err = svc.login("ana@gmail.com", PASSWORD).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn login_builds_session() {
    let (base, _backend) = spawn_backend().await;
    let svc = GemaService::new(GemaClient::new(&base, Arc::new(NoAuth)));
    let session = svc.login(EMAIL, PASSWORD).await.unwrap();
    assert_eq!(session, Session::new(TOKEN, "Ana García", EMAIL));
}

#[tokio::test]
async fn creating_floor_under_existing_module() {
    let (base, backend) = spawn_backend().await;
    // M2 exists with id 1; M2-P3 does not.
    service(&base).create_location(&floor("M2", "P3")).await.unwrap();

    let bodies = backend.bodies();
    assert_eq!(bodies.len(), 1);
    assert_eq!(
        bodies[0],
        json!({
            "descripcion": "Floor 1",
            "abreviacion": "P3",
            "padres": [{"idPadre": 1, "esUbicacionFisica": true}],
        })
    );
}

#[tokio::test]
async fn missing_parent_blocks_creation_request() {
    let (base, backend) = spawn_backend().await;
    let err = service(&base)
        .create_location(&floor("M9", "P1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Resolve(ResolveError::ParentNotFound { ref code }) if code == "M9"
    ));
    assert_eq!(backend.count("POST /ubicaciones-tecnicas"), 0);
}

#[tokio::test]
async fn successful_mutation_invalidates_location_queries() {
    let (base, backend) = spawn_backend().await;
    let svc = service(&base);

    svc.locations().await.unwrap();
    svc.location_branches(1, None).await.unwrap();
    svc.locations().await.unwrap();
    assert_eq!(backend.count("GET /ubicaciones-tecnicas"), 1);

    // Creation reads the cached tree, then invalidates it.
    svc.create_location(&floor("M2", "P3")).await.unwrap();
    assert_eq!(backend.count("GET /ubicaciones-tecnicas"), 1);
    assert_eq!(svc.cache().status(&QueryKey::Locations), Some(QueryStatus::Stale));
    assert_eq!(
        svc.cache().status(&QueryKey::LocationBranches { id: 1, level: None }),
        Some(QueryStatus::Stale)
    );

    svc.locations().await.unwrap();
    assert_eq!(backend.count("GET /ubicaciones-tecnicas"), 2);
}

#[tokio::test]
async fn failed_mutation_keeps_cache_fresh() {
    let (base, _backend) = spawn_backend().await;
    let svc = service(&base);
    svc.locations().await.unwrap();

    let dup = CreateRequest {
        segments: CodeSegments::default().with(Level::Modulo, "DUP"),
        description: "Duplicado".into(),
        ..Default::default()
    };
    let err = svc.create_location(&dup).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.to_string(), "La ubicación ya existe");
    assert_eq!(svc.cache().status(&QueryKey::Locations), Some(QueryStatus::Fresh));
}

#[tokio::test]
async fn work_group_form_is_validated_then_invalidates() {
    let (base, backend) = spawn_backend().await;
    let svc = service(&base);
    svc.work_groups().await.unwrap();
    svc.memberships().await.unwrap();

    let bad = WorkGroupForm {
        code: "AB".into(),
        name: "Mecánico".into(),
        supervisor: "4".into(),
    };
    assert!(matches!(
        svc.create_work_group(&bad).await,
        Err(ApiError::Validation(_))
    ));
    assert_eq!(backend.count("POST /grupos"), 0);

    let good = WorkGroupForm {
        code: "SGMMEC".into(),
        ..bad
    };
    let created = svc.create_work_group(&good).await.unwrap();
    assert_eq!(created.id, 3);
    assert_eq!(created.supervisor_id, Some(4));
    assert_eq!(svc.cache().status(&QueryKey::WorkGroups), Some(QueryStatus::Stale));
    assert_eq!(svc.cache().status(&QueryKey::GroupMembers), Some(QueryStatus::Stale));
}

#[tokio::test]
async fn technician_creation_invalidates_list() {
    let (base, backend) = spawn_backend().await;
    let svc = service(&base);
    svc.technicians().await.unwrap();

    assert!(svc.create_technician("Pedro", "pedro@gmail.com").await.is_err());
    assert_eq!(backend.count("POST /tecnicos"), 0);

    svc.create_technician("Pedro", "pedro@ucab.edu.ve").await.unwrap();
    assert_eq!(svc.cache().status(&QueryKey::Technicians), Some(QueryStatus::Stale));
    svc.technicians().await.unwrap();
    assert_eq!(backend.count("GET /tecnicos"), 2);
}

fn refrigeration_form() -> WorkGroupForm {
    WorkGroupForm {
        code: "SGMREF".into(),
        name: "Refrigeración central".into(),
        supervisor: "9".into(),
    }
}

#[tokio::test]
async fn work_group_update_sends_payload_and_invalidates() {
    let (base, backend) = spawn_backend().await;
    let svc = service(&base);
    svc.work_groups().await.unwrap();
    svc.memberships().await.unwrap();
    svc.technicians().await.unwrap();

    let updated = svc.update_work_group(1, &refrigeration_form()).await.unwrap();
    assert_eq!(updated["id"], 1);
    assert_eq!(backend.count("PUT /grupos/1"), 1);
    assert_eq!(
        backend.bodies().pop().unwrap(),
        json!({"codigo": "SGMREF", "nombre": "Refrigeración central", "supervisorId": 9})
    );
    assert_eq!(svc.cache().status(&QueryKey::WorkGroups), Some(QueryStatus::Stale));
    assert_eq!(svc.cache().status(&QueryKey::GroupMembers), Some(QueryStatus::Stale));
    assert_eq!(svc.cache().status(&QueryKey::Technicians), Some(QueryStatus::Fresh));

    svc.work_groups().await.unwrap();
    assert_eq!(backend.count("GET /grupos"), 2);
}

#[tokio::test]
async fn failed_work_group_update_keeps_cache_fresh() {
    let (base, _backend) = spawn_backend().await;
    let svc = service(&base);
    svc.work_groups().await.unwrap();

    let err = svc.update_work_group(404, &refrigeration_form()).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "Grupo no encontrado");
    assert_eq!(svc.cache().status(&QueryKey::WorkGroups), Some(QueryStatus::Fresh));
}

#[tokio::test]
async fn work_group_delete_invalidates_groups_and_members() {
    let (base, backend) = spawn_backend().await;
    let svc = service(&base);
    svc.work_groups().await.unwrap();
    svc.memberships().await.unwrap();

    let deleted = svc.delete_work_group(2).await.unwrap();
    assert!(deleted.is_null());
    assert_eq!(backend.count("DELETE /grupos/2"), 1);
    assert_eq!(svc.cache().status(&QueryKey::WorkGroups), Some(QueryStatus::Stale));
    assert_eq!(svc.cache().status(&QueryKey::GroupMembers), Some(QueryStatus::Stale));
}

#[tokio::test]
async fn removing_member_sends_body_and_invalidates_members() {
    let (base, backend) = spawn_backend().await;
    let svc = service(&base);
    svc.work_groups().await.unwrap();
    svc.memberships().await.unwrap();

    let removed = svc.remove_member(1, 10).await.unwrap();
    assert_eq!(removed["eliminado"], true);
    assert_eq!(backend.count("DELETE /trabajaEnGrupo"), 1);
    assert_eq!(
        backend.bodies().pop().unwrap(),
        json!({"tecnicoId": 10, "grupoDeTrabajoId": 1})
    );
    assert_eq!(svc.cache().status(&QueryKey::GroupMembers), Some(QueryStatus::Stale));
    assert_eq!(svc.cache().status(&QueryKey::WorkGroups), Some(QueryStatus::Fresh));

    svc.memberships().await.unwrap();
    assert_eq!(backend.count("GET /trabajaEnGrupo"), 2);
}
