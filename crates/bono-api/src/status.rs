use bono_types::api::{StatusCounts, StatusIndicators, StepState};
use bono_types::models::{Application, ApplicationStatus, Role};

pub const UNKNOWN_STATUS_TEXT: &str = "Desconocido";
pub const DEFAULT_STATUS_CLASS: &str = "bg-gray-100 text-gray-800";

pub fn status_text(status: &ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Pending => "Pendiente",
        ApplicationStatus::UnderReview => "En Revisión",
        ApplicationStatus::Approved => "Aprobada",
        ApplicationStatus::Rejected => "Rechazada",
        ApplicationStatus::Paid => "Pagada",
        ApplicationStatus::Unknown(_) => UNKNOWN_STATUS_TEXT,
    }
}

pub fn status_style_class(status: &ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Pending => "bg-yellow-100 text-yellow-800",
        ApplicationStatus::UnderReview => "bg-blue-100 text-blue-800",
        ApplicationStatus::Approved => "bg-green-100 text-green-800",
        ApplicationStatus::Rejected => "bg-red-100 text-red-800",
        ApplicationStatus::Paid => "bg-purple-100 text-purple-800",
        ApplicationStatus::Unknown(_) => DEFAULT_STATUS_CLASS,
    }
}

/// Totals for the admin header. Paid applications count as approved.
pub fn aggregate_counts<'a>(applications: impl IntoIterator<Item = &'a Application>) -> StatusCounts {
    applications
        .into_iter()
        .fold(StatusCounts::default(), |mut counts, app| {
            counts.total += 1;
            if app.status == ApplicationStatus::Pending {
                counts.pending += 1;
            }
            if app.status.is_granted() {
                counts.approved += 1;
            }
            counts
        })
}

pub fn documents_complete(application: &Application) -> bool {
    application.documents.cedula && application.documents.bank_statement
}

pub fn status_indicators(application: &Application) -> StatusIndicators {
    let step = |done: bool| {
        if done {
            StepState::Completed
        } else {
            StepState::Pending
        }
    };

    StatusIndicators {
        documents: step(documents_complete(application)),
        approval: step(application.status.is_granted()),
        deposit: step(application.status == ApplicationStatus::Paid),
    }
}

pub fn step_text(state: StepState) -> &'static str {
    match state {
        StepState::Completed => "Completado",
        StepState::Pending => "Pendiente",
    }
}

pub fn step_style_class(state: StepState) -> &'static str {
    match state {
        StepState::Completed => "text-green-600",
        StepState::Pending => "text-yellow-600",
    }
}

pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::Admin => "Administrador",
        Role::User => "Solicitante",
    }
}

/// `RD$5,000` style amount.
pub fn format_amount(amount: u32) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("RD${}", grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bono_types::models::{BENEFIT_AMOUNT, Documents};
    use chrono::Utc;
    use uuid::Uuid;

    fn app(status: ApplicationStatus) -> Application {
        Application {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status,
            amount: BENEFIT_AMOUNT,
            submitted_at: Utc::now(),
            updated_at: None,
            documents: Documents::default(),
            notes: String::new(),
        }
    }

    #[test]
    fn text_and_class_are_total() {
        for status in ApplicationStatus::KNOWN {
            assert!(!status_text(&status).is_empty());
            assert_ne!(status_text(&status), UNKNOWN_STATUS_TEXT);
            assert!(!status_style_class(&status).is_empty());
            assert_ne!(status_style_class(&status), DEFAULT_STATUS_CLASS);
        }

        let odd = ApplicationStatus::Unknown("archived".into());
        assert_eq!(status_text(&odd), "Desconocido");
        assert_eq!(status_style_class(&odd), "bg-gray-100 text-gray-800");
    }

    #[test]
    fn counts_treat_paid_as_approved() {
        let apps = vec![
            app(ApplicationStatus::Pending),
            app(ApplicationStatus::Pending),
            app(ApplicationStatus::UnderReview),
            app(ApplicationStatus::Approved),
            app(ApplicationStatus::Paid),
            app(ApplicationStatus::Rejected),
        ];

        let counts = aggregate_counts(&apps);
        assert_eq!(
            counts,
            StatusCounts {
                total: 6,
                pending: 2,
                approved: 2,
            }
        );
        assert_eq!(aggregate_counts(&Vec::<Application>::new()), StatusCounts::default());
    }

    #[test]
    fn documents_need_both_flags() {
        let mut a = app(ApplicationStatus::Pending);
        assert!(!documents_complete(&a));

        a.documents.cedula = true;
        assert!(!documents_complete(&a));

        a.documents.bank_statement = true;
        assert!(documents_complete(&a));
    }

    #[test]
    fn indicators_follow_status() {
        let pending = status_indicators(&app(ApplicationStatus::Pending));
        assert_eq!(pending.approval, StepState::Pending);
        assert_eq!(pending.deposit, StepState::Pending);

        let approved = status_indicators(&app(ApplicationStatus::Approved));
        assert_eq!(approved.approval, StepState::Completed);
        assert_eq!(approved.deposit, StepState::Pending);
        assert_eq!(step_text(approved.approval), "Completado");
        assert_eq!(step_style_class(approved.approval), "text-green-600");

        let paid = status_indicators(&app(ApplicationStatus::Paid));
        assert_eq!(paid.approval, StepState::Completed);
        assert_eq!(paid.deposit, StepState::Completed);
        assert_eq!(step_text(paid.deposit), "Completado");
        assert_eq!(step_style_class(paid.documents), "text-yellow-600");
    }

    #[test]
    fn amounts_are_grouped() {
        assert_eq!(format_amount(5000), "RD$5,000");
        assert_eq!(format_amount(999), "RD$999");
        assert_eq!(format_amount(1_234_567), "RD$1,234,567");
        assert_eq!(format_amount(0), "RD$0");
    }
}
