/// Integration test: full registration and review cycle over an on-disk
/// SQLite database, reopened between steps the way the CLI reopens it on
/// every invocation.

use std::sync::Arc;

use bono_api::admin::{admin_overview, approve_application, set_application_status};
use bono_api::auth::{login, logout};
use bono_api::dashboard::dashboard;
use bono_api::registration::register;
use bono_api::{ApiError, SqliteState};
use bono_db::store::{APPLICATIONS_KEY, USERS_KEY};
use bono_db::{Database, KeyValueStore, SqliteStore, StoreError, Table};
use bono_types::api::{RegisterOutcome, RegisterRequest};
use bono_types::models::ApplicationStatus;
use chrono::Utc;
use uuid::Uuid;

fn open(path: &std::path::Path) -> SqliteState {
    let db = Arc::new(Database::open(path).unwrap());
    SqliteState::open(db).unwrap()
}

fn request(email: &str, cedula: &str) -> RegisterRequest {
    RegisterRequest {
        first_name: "Carmen".into(),
        last_name: "Rosario".into(),
        cedula: cedula.into(),
        email: email.into(),
        phone: "809-555-0101".into(),
        password: "Navidad2024".into(),
        confirm_password: "Navidad2024".into(),
        terms_accepted: true,
    }
}

#[test]
fn register_review_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bono.db");

    let app_id = {
        let mut state = open(&path);
        let outcome = register(&mut state.records, request("carmen@example.com", "031-1234567-2"), Utc::now()).unwrap();
        let RegisterOutcome::Registered { application, .. } = outcome else {
            panic!("expected registration to succeed");
        };
        application.id
    };

    {
        let mut state = open(&path);
        assert_eq!(state.records.users().len(), 2);

        let admin = login(&state, "adrian", "admin123").unwrap();
        let updated = approve_application(&mut state.records, &admin, app_id).unwrap();
        assert_eq!(updated.status, ApplicationStatus::Approved);
    }

    let mut state = open(&path);
    let overview = admin_overview(&state.records);
    assert_eq!(overview.counts.total, 1);
    assert_eq!(overview.counts.approved, 1);

    // session survived the reopen
    let view = dashboard(&state).unwrap();
    assert!(view.admin.is_some());

    let admin = login(&state, "adrian", "admin123").unwrap();
    set_application_status(&mut state.records, &admin, app_id, ApplicationStatus::Paid).unwrap();
    logout(&state).unwrap();

    login(&state, "carmen", "Navidad2024").unwrap();
    let view = dashboard(&state).unwrap();
    assert!(view.admin.is_none());
    let latest = view.latest.unwrap();
    assert_eq!(latest.status, ApplicationStatus::Paid);
    assert_eq!(latest.status_text, "Pagada");
}

#[test]
fn reopening_never_duplicates_admin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bono.db");

    for _ in 0..3 {
        let state = open(&path);
        let admins = state
            .records
            .users()
            .iter()
            .filter(|u| u.username == "adrian")
            .count();
        assert_eq!(admins, 1);
    }
}

#[test]
fn rejected_form_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bono.db");
    let db = Arc::new(Database::open(&path).unwrap());
    let mut state = SqliteState::open(db.clone()).unwrap();
    let raw = SqliteStore::new(db, Table::Local);
    let users_before = raw.get(USERS_KEY).unwrap();

    let mut bad = request("carmen@example.com", "031-1234567-2");
    bad.terms_accepted = false;
    let outcome = register(&mut state.records, bad, Utc::now()).unwrap();

    assert!(!outcome.is_registered());
    assert_eq!(raw.get(USERS_KEY).unwrap(), users_before);
    assert_eq!(raw.get(APPLICATIONS_KEY).unwrap(), None);
}

#[test]
fn second_registration_with_same_identity_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = open(&dir.path().join("bono.db"));

    assert!(register(&mut state.records, request("carmen@example.com", "031-1234567-2"), Utc::now())
        .unwrap()
        .is_registered());

    let same_email = register(&mut state.records, request("carmen@example.com", "032-1234567-2"), Utc::now()).unwrap();
    let same_cedula = register(&mut state.records, request("otra@example.com", "031-1234567-2"), Utc::now()).unwrap();

    assert!(!same_email.is_registered());
    assert!(!same_cedula.is_registered());
    assert_eq!(state.records.applications().len(), 1);
}

#[test]
fn unknown_application_update_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = open(&dir.path().join("bono.db"));
    let admin = login(&state, "adrian", "admin123").unwrap();

    let err = approve_application(&mut state.records, &admin, Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, ApiError::Store(StoreError::ApplicationNotFound(_))));
}
