use bono_db::{KeyValueStore, RecordStore, StoreError, UniqueField};
use bono_types::api::{FieldError, FieldId, RegisterOutcome, RegisterRequest};
use bono_types::models::{
    Application, ApplicationStatus, BENEFIT_AMOUNT, Documents, INITIAL_NOTE, Role, User,
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::validation::{
    CEDULA_MSG, CONFIRM_PASSWORD_MSG, EMAIL_MSG, FIRST_NAME_MSG, LAST_NAME_MSG, PHONE_MSG,
    TERMS_MSG, validate_cedula, validate_email, validate_name, validate_password, validate_phone,
};

pub const DUPLICATE_EMAIL_MSG: &str = "Este email ya está registrado";
pub const DUPLICATE_CEDULA_MSG: &str = "Esta cédula ya está registrada";

/// Validate a registration form and, if every check passes, create the user
/// together with a pending application.
///
/// All failures are collected before anything is written; a rejected form
/// leaves the store untouched. `now` stamps both records.
pub fn register<S: KeyValueStore>(
    store: &mut RecordStore<S>,
    req: RegisterRequest,
    now: DateTime<Utc>,
) -> Result<RegisterOutcome, ApiError> {
    let form = TrimmedForm::from(req);

    let errors = collect_errors(store, &form);
    if !errors.is_empty() {
        warn!(
            "Registration rejected for '{}': {} field error(s)",
            form.email,
            errors.len()
        );
        return Ok(RegisterOutcome::Rejected { errors });
    }

    let user = User {
        id: Uuid::new_v4(),
        username: username_from_email(&form.email),
        password: form.password,
        role: Role::User,
        name: format!("{} {}", form.first_name, form.last_name),
        first_name: Some(form.first_name),
        last_name: Some(form.last_name),
        email: form.email,
        cedula: form.cedula,
        phone: form.phone,
        created_at: now,
    };

    let application = Application {
        id: Uuid::new_v4(),
        user_id: user.id,
        status: ApplicationStatus::Pending,
        amount: BENEFIT_AMOUNT,
        submitted_at: now,
        updated_at: None,
        documents: Documents::default(),
        notes: INITIAL_NOTE.to_string(),
    };

    match store.insert_registration(user.clone(), application.clone()) {
        Ok(()) => {}
        Err(StoreError::Duplicate { field, .. }) => {
            return Ok(RegisterOutcome::Rejected {
                errors: vec![duplicate_error(field)],
            });
        }
        Err(e) => return Err(e.into()),
    }

    info!("Registered user '{}' with application {}", user.username, application.id);
    Ok(RegisterOutcome::Registered { user, application })
}

/// Greeting shown once the account exists.
pub fn welcome_message(user: &User) -> String {
    let first_name = user.first_name.as_deref().unwrap_or(&user.name);
    format!(
        "¡Bienvenido {}!\n\nTu solicitud del Bono Navideño 5K ha sido registrada.\n\nUsuario: {}\n\nRevisa tu email para más información.",
        first_name, user.username
    )
}

/// Local part of the email. Two addresses on different domains can map to
/// the same username; that is not checked.
pub fn username_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

struct TrimmedForm {
    first_name: String,
    last_name: String,
    cedula: String,
    email: String,
    phone: String,
    password: String,
    confirm_password: String,
    terms_accepted: bool,
}

impl From<RegisterRequest> for TrimmedForm {
    fn from(req: RegisterRequest) -> Self {
        Self {
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            cedula: req.cedula.trim().to_string(),
            email: req.email.trim().to_string(),
            phone: req.phone.trim().to_string(),
            password: req.password,
            confirm_password: req.confirm_password,
            terms_accepted: req.terms_accepted,
        }
    }
}

fn collect_errors<S: KeyValueStore>(store: &RecordStore<S>, form: &TrimmedForm) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if !validate_name(&form.first_name) {
        errors.push(FieldError::new(FieldId::FirstName, FIRST_NAME_MSG));
    }
    if !validate_name(&form.last_name) {
        errors.push(FieldError::new(FieldId::LastName, LAST_NAME_MSG));
    }
    if !validate_cedula(&form.cedula) {
        errors.push(FieldError::new(FieldId::Cedula, CEDULA_MSG));
    }
    if !validate_email(&form.email) {
        errors.push(FieldError::new(FieldId::Email, EMAIL_MSG));
    }
    if !validate_phone(&form.phone) {
        errors.push(FieldError::new(FieldId::Phone, PHONE_MSG));
    }
    if let Some(message) = validate_password(&form.password).message() {
        errors.push(FieldError::new(FieldId::Password, message));
    }
    if form.confirm_password.is_empty() || form.confirm_password != form.password {
        errors.push(FieldError::new(FieldId::ConfirmPassword, CONFIRM_PASSWORD_MSG));
    }
    if !form.terms_accepted {
        errors.push(FieldError::new(FieldId::Terms, TERMS_MSG));
    }

    if store.find_user_by_email(&form.email).is_some() {
        errors.push(duplicate_error(UniqueField::Email));
    }
    if store.find_user_by_cedula(&form.cedula).is_some() {
        errors.push(duplicate_error(UniqueField::Cedula));
    }

    errors
}

fn duplicate_error(field: UniqueField) -> FieldError {
    match field {
        UniqueField::Email => FieldError::new(FieldId::Email, DUPLICATE_EMAIL_MSG),
        UniqueField::Cedula => FieldError::new(FieldId::Cedula, DUPLICATE_CEDULA_MSG),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bono_db::MemoryStore;

    fn valid_request() -> RegisterRequest {
        RegisterRequest {
            first_name: "Ana".into(),
            last_name: "Perez".into(),
            cedula: "002-1234567-8".into(),
            email: "ana@example.com".into(),
            phone: "809-555-1234".into(),
            password: "Secreto123".into(),
            confirm_password: "Secreto123".into(),
            terms_accepted: true,
        }
    }

    fn fresh_store() -> RecordStore<MemoryStore> {
        RecordStore::initialize(MemoryStore::new()).unwrap()
    }

    fn fields(outcome: &RegisterOutcome) -> Vec<FieldId> {
        outcome.errors().iter().map(|e| e.field).collect()
    }

    #[test]
    fn valid_form_creates_user_and_pending_application() {
        let mut store = fresh_store();
        let outcome = register(&mut store, valid_request(), Utc::now()).unwrap();

        let RegisterOutcome::Registered { user, application } = outcome else {
            panic!("expected registration to succeed");
        };
        assert_eq!(user.username, "ana");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.name, "Ana Perez");
        assert_eq!(application.user_id, user.id);
        assert_eq!(application.status, ApplicationStatus::Pending);
        assert_eq!(application.amount, 5000);
        assert_eq!(application.documents, Documents { cedula: false, bank_statement: false });
        assert_eq!(application.notes, INITIAL_NOTE);

        // admin + new user
        assert_eq!(store.users().len(), 2);
        assert_eq!(store.applications().len(), 1);
    }

    #[test]
    fn records_are_stamped_with_given_time() {
        let mut store = fresh_store();
        let now = DateTime::parse_from_rfc3339("2024-12-01T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let RegisterOutcome::Registered { user, application } =
            register(&mut store, valid_request(), now).unwrap()
        else {
            panic!("expected registration to succeed");
        };
        assert_eq!(user.created_at, now);
        assert_eq!(application.submitted_at, now);
        assert!(application.updated_at.is_none());
    }

    #[test]
    fn text_fields_are_trimmed() {
        let mut store = fresh_store();
        let mut req = valid_request();
        req.first_name = "  Ana ".into();
        req.email = " ana@example.com\t".into();
        req.cedula = " 002-1234567-8 ".into();

        let outcome = register(&mut store, req, Utc::now()).unwrap();
        assert!(outcome.is_registered());

        let user = store.find_user_by_email("ana@example.com").unwrap();
        assert_eq!(user.first_name.as_deref(), Some("Ana"));
        assert_eq!(user.cedula, "002-1234567-8");
    }

    #[test]
    fn every_failure_is_reported_and_nothing_written() {
        let mut store = fresh_store();
        let req = RegisterRequest {
            first_name: "A".into(),
            last_name: " ".into(),
            cedula: "1-1234567-8".into(),
            email: "not-an-email".into(),
            phone: "555-123-4567".into(),
            password: "abc".into(),
            confirm_password: "abd".into(),
            terms_accepted: false,
        };

        let outcome = register(&mut store, req, Utc::now()).unwrap();
        assert_eq!(
            fields(&outcome),
            vec![
                FieldId::FirstName,
                FieldId::LastName,
                FieldId::Cedula,
                FieldId::Email,
                FieldId::Phone,
                FieldId::Password,
                FieldId::ConfirmPassword,
                FieldId::Terms,
            ]
        );
        assert_eq!(store.users().len(), 1);
        assert!(store.applications().is_empty());
    }

    #[test]
    fn single_bad_field_blocks_registration() {
        let mut store = fresh_store();
        let mut req = valid_request();
        req.phone = "809-5551234".into();

        let outcome = register(&mut store, req, Utc::now()).unwrap();
        assert_eq!(fields(&outcome), vec![FieldId::Phone]);
        assert_eq!(outcome.errors()[0].message, PHONE_MSG);
        assert!(store.applications().is_empty());
    }

    #[test]
    fn each_field_alone_blocks_registration() {
        let cases: [(FieldId, fn(&mut RegisterRequest)); 8] = [
            (FieldId::FirstName, |r| r.first_name = "A".into()),
            (FieldId::LastName, |r| r.last_name = "  ".into()),
            (FieldId::Cedula, |r| r.cedula = "002-1234567".into()),
            (FieldId::Email, |r| r.email = "ana@example".into()),
            (FieldId::Phone, |r| r.phone = "807-555-1234".into()),
            (FieldId::Password, |r| {
                r.password = "secreto123".into();
                r.confirm_password = "secreto123".into();
            }),
            (FieldId::ConfirmPassword, |r| r.confirm_password = "Secreto124".into()),
            (FieldId::Terms, |r| r.terms_accepted = false),
        ];

        for (field, break_field) in cases {
            let mut store = fresh_store();
            let mut req = valid_request();
            break_field(&mut req);

            let outcome = register(&mut store, req, Utc::now()).unwrap();
            assert_eq!(fields(&outcome), vec![field], "{}", field);
            assert_eq!(store.users().len(), 1, "{}", field);
            assert!(store.applications().is_empty(), "{}", field);
        }
    }

    #[test]
    fn empty_confirmation_is_a_mismatch() {
        let mut store = fresh_store();
        let mut req = valid_request();
        req.confirm_password = String::new();

        let outcome = register(&mut store, req, Utc::now()).unwrap();
        assert_eq!(fields(&outcome), vec![FieldId::ConfirmPassword]);
    }

    #[test]
    fn password_message_lists_missing_rules() {
        let mut store = fresh_store();
        let mut req = valid_request();
        req.password = "abc12345".into();
        req.confirm_password = "abc12345".into();

        let outcome = register(&mut store, req, Utc::now()).unwrap();
        assert_eq!(
            outcome.errors()[0].message,
            "La contraseña debe tener: una mayúscula"
        );
    }

    #[test]
    fn duplicate_email_rejected() {
        let mut store = fresh_store();
        assert!(register(&mut store, valid_request(), Utc::now()).unwrap().is_registered());

        let mut second = valid_request();
        second.cedula = "003-7654321-0".into();
        let outcome = register(&mut store, second, Utc::now()).unwrap();

        assert_eq!(outcome.errors(), &[FieldError::new(FieldId::Email, DUPLICATE_EMAIL_MSG)]);
        assert_eq!(store.users().len(), 2);
        assert_eq!(store.applications().len(), 1);
    }

    #[test]
    fn duplicate_cedula_rejected() {
        let mut store = fresh_store();
        assert!(register(&mut store, valid_request(), Utc::now()).unwrap().is_registered());

        let mut second = valid_request();
        second.email = "bea@example.com".into();
        let outcome = register(&mut store, second, Utc::now()).unwrap();

        assert_eq!(outcome.errors(), &[FieldError::new(FieldId::Cedula, DUPLICATE_CEDULA_MSG)]);
        assert_eq!(store.users().len(), 2);
    }

    #[test]
    fn admin_cedula_is_taken() {
        let mut store = fresh_store();
        let mut req = valid_request();
        req.cedula = "001-0000000-0".into();

        let outcome = register(&mut store, req, Utc::now()).unwrap();
        assert_eq!(fields(&outcome), vec![FieldId::Cedula]);
    }

    #[test]
    fn shared_local_part_yields_same_username() {
        // Known gap: usernames are not checked for uniqueness.
        let mut store = fresh_store();
        assert!(register(&mut store, valid_request(), Utc::now()).unwrap().is_registered());

        let mut other = valid_request();
        other.email = "ana@otro.do".into();
        other.cedula = "003-7654321-0".into();
        assert!(register(&mut store, other, Utc::now()).unwrap().is_registered());

        let anas = store.users().iter().filter(|u| u.username == "ana").count();
        assert_eq!(anas, 2);
    }

    #[test]
    fn welcome_mentions_first_name_and_username() {
        let mut store = fresh_store();
        let RegisterOutcome::Registered { user, .. } =
            register(&mut store, valid_request(), Utc::now()).unwrap()
        else {
            panic!("expected registration to succeed");
        };

        let msg = welcome_message(&user);
        assert!(msg.starts_with("¡Bienvenido Ana!"));
        assert!(msg.contains("Usuario: ana"));
    }
}
