use bono_db::{KeyValueStore, RecordStore};
use bono_types::api::{AdminOverview, AdminRow};
use bono_types::models::{Application, ApplicationStatus, User};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::status::{aggregate_counts, status_style_class, status_text};

pub const UNKNOWN_APPLICANT: &str = "Usuario desconocido";
pub const MISSING_CEDULA: &str = "N/A";

/// Counts plus one row per application, in submission order.
pub fn admin_overview<S: KeyValueStore>(store: &RecordStore<S>) -> AdminOverview {
    let rows = store
        .applications()
        .iter()
        .map(|app| admin_row(store, app))
        .collect();

    AdminOverview {
        counts: aggregate_counts(store.applications()),
        rows,
    }
}

fn admin_row<S: KeyValueStore>(store: &RecordStore<S>, app: &Application) -> AdminRow {
    let owner = store.find_user_by_id(app.user_id);

    AdminRow {
        application_id: app.id,
        applicant_name: owner
            .map(|u| u.name.clone())
            .unwrap_or_else(|| UNKNOWN_APPLICANT.to_string()),
        cedula: owner
            .map(|u| u.cedula.clone())
            .unwrap_or_else(|| MISSING_CEDULA.to_string()),
        submitted_at: app.submitted_at,
        amount: app.amount,
        status: app.status.clone(),
        status_text: status_text(&app.status),
        status_class: status_style_class(&app.status),
        actionable: app.status == ApplicationStatus::Pending,
    }
}

pub fn approve_application<S: KeyValueStore>(
    store: &mut RecordStore<S>,
    actor: &User,
    id: Uuid,
) -> Result<Application, ApiError> {
    set_application_status(store, actor, id, ApplicationStatus::Approved)
}

pub fn reject_application<S: KeyValueStore>(
    store: &mut RecordStore<S>,
    actor: &User,
    id: Uuid,
) -> Result<Application, ApiError> {
    set_application_status(store, actor, id, ApplicationStatus::Rejected)
}

/// Move an application to any review state. Unknown ids come back as
/// `StoreError::ApplicationNotFound`.
pub fn set_application_status<S: KeyValueStore>(
    store: &mut RecordStore<S>,
    actor: &User,
    id: Uuid,
    status: ApplicationStatus,
) -> Result<Application, ApiError> {
    if !actor.is_admin() {
        return Err(ApiError::NotAdmin);
    }

    let updated = store.update_application_status(id, status)?;
    info!("'{}' set application {} to {}", actor.username, id, updated.status);
    Ok(updated)
}
