use bono_db::KeyValueStore;
use bono_types::api::{ApplicationSummary, Dashboard};
use bono_types::models::Application;

use crate::admin::admin_overview;
use crate::auth::{AppState, current_user};
use crate::error::ApiError;
use crate::status::{role_label, status_indicators, status_text};

/// Dashboard for the logged-in user.
///
/// Applicants see their most recent application; administrators see the most
/// recent application overall plus the review overview.
pub fn dashboard<S: KeyValueStore, T: KeyValueStore>(
    state: &AppState<S, T>,
) -> Result<Dashboard, ApiError> {
    let user = current_user(state)?;

    let latest = if user.is_admin() {
        state.records.applications().last()
    } else {
        state.records.applications_for_user(user.id).last().copied()
    };

    Ok(Dashboard {
        user_name: user.name.clone(),
        role_label: role_label(user.role),
        latest: latest.map(summarize),
        admin: user.is_admin().then(|| admin_overview(&state.records)),
    })
}

pub fn summarize(application: &Application) -> ApplicationSummary {
    ApplicationSummary {
        id: application.id,
        status: application.status.clone(),
        status_text: status_text(&application.status),
        submitted_at: application.submitted_at,
        indicators: status_indicators(application),
    }
}
