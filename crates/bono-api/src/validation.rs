//! Field validators for the registration form.
//!
//! Each check is pure and looks at one value. Digits are ASCII only, matching
//! how cedulas and phone numbers are printed.

use bono_types::api::{FieldError, FieldId};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_PASSWORD_LEN: usize = 8;

pub const FIRST_NAME_MSG: &str = "El nombre debe tener al menos 2 caracteres";
pub const LAST_NAME_MSG: &str = "El apellido debe tener al menos 2 caracteres";
pub const CEDULA_MSG: &str = "Ingresa una cédula válida (XXX-XXXXXXX-X)";
pub const EMAIL_MSG: &str = "Ingresa un email válido";
pub const PHONE_MSG: &str = "Ingresa un teléfono válido (XXX-XXX-XXXX)";
pub const CONFIRM_PASSWORD_MSG: &str = "Las contraseñas no coinciden";
pub const TERMS_MSG: &str = "Debes aceptar los términos y condiciones";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

static CEDULA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{3}-[0-9]{7}-[0-9]$").expect("cedula pattern compiles"));

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(809|829|849)-[0-9]{3}-[0-9]{4}$").expect("phone pattern compiles")
});

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Dominican cedula, `XXX-XXXXXXX-X`.
///
/// Format and segment ranges only. The last digit is not verified as a check
/// digit, so passing here does not mean the document exists.
pub fn validate_cedula(cedula: &str) -> bool {
    if !CEDULA_RE.is_match(cedula) {
        return false;
    }

    let mut parts = cedula.split('-');
    let (Some(first), Some(second), Some(check), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let (Ok(first), Ok(second), Ok(check)) =
        (first.parse::<u32>(), second.parse::<u32>(), check.parse::<u32>())
    else {
        return false;
    };

    (1..=999).contains(&first) && second <= 9_999_999 && check <= 9
}

/// Dominican phone number on one of the 809/829/849 area codes.
pub fn validate_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

pub fn validate_name(name: &str) -> bool {
    name.trim().chars().count() >= MIN_NAME_LEN
}

/// Which password rules failed. All four are evaluated every time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PasswordErrors {
    pub length: bool,
    pub lower: bool,
    pub upper: bool,
    pub number: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PasswordCheck {
    pub is_valid: bool,
    pub errors: PasswordErrors,
}

impl PasswordCheck {
    /// Combined message listing every missing requirement, or `None` when
    /// the password is acceptable.
    pub fn message(&self) -> Option<String> {
        if self.is_valid {
            return None;
        }

        let mut missing = Vec::new();
        if self.errors.length {
            missing.push("al menos 8 caracteres");
        }
        if self.errors.lower {
            missing.push("una minúscula");
        }
        if self.errors.upper {
            missing.push("una mayúscula");
        }
        if self.errors.number {
            missing.push("un número");
        }

        Some(format!("La contraseña debe tener: {}", missing.join(", ")))
    }
}

/// Length is counted in characters, so an emoji counts once.
pub fn validate_password(password: &str) -> PasswordCheck {
    let errors = PasswordErrors {
        length: password.chars().count() < MIN_PASSWORD_LEN,
        lower: !password.chars().any(|c| c.is_ascii_lowercase()),
        upper: !password.chars().any(|c| c.is_ascii_uppercase()),
        number: !password.chars().any(|c| c.is_ascii_digit()),
    };

    PasswordCheck {
        is_valid: !(errors.length || errors.lower || errors.upper || errors.number),
        errors,
    }
}

/// Check one field as the user types.
///
/// An empty value is not reported, the form only complains on submit.
/// `password` is the current password, used when checking the confirmation.
pub fn check_field(field: FieldId, value: &str, password: Option<&str>) -> Option<FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    match field {
        FieldId::FirstName => (!validate_name(trimmed)).then(|| FieldError::new(field, FIRST_NAME_MSG)),
        FieldId::LastName => (!validate_name(trimmed)).then(|| FieldError::new(field, LAST_NAME_MSG)),
        FieldId::Cedula => (!validate_cedula(trimmed)).then(|| FieldError::new(field, CEDULA_MSG)),
        FieldId::Email => (!validate_email(trimmed)).then(|| FieldError::new(field, EMAIL_MSG)),
        FieldId::Phone => (!validate_phone(trimmed)).then(|| FieldError::new(field, PHONE_MSG)),
        FieldId::Password => validate_password(value)
            .message()
            .map(|msg| FieldError::new(field, msg)),
        FieldId::ConfirmPassword => match password {
            Some(password) if password != value => {
                Some(FieldError::new(field, CONFIRM_PASSWORD_MSG))
            }
            _ => None,
        },
        FieldId::Terms => None,
    }
}
