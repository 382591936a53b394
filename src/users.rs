//! Users
//!
//! Customer accounts. Guests can order without one; signed-in customers have their orders
//! counted and can see their order and reservation history.

use std::fmt;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    dates::deserialize_optional_date,
    payments::is_digits,
    validation::{ValidationErrors, looks_like_email},
};

const PHONE_DIGITS: usize = 9;
const MIN_NAME_CHARS: usize = 3;
const MIN_PASSWORD_CHARS: usize = 6;

/// User identifier assigned by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A customer account as the API returns it.
///
/// Fields this client does not model are kept in [`User::extra`] so that a fetched user can be
/// written back without losing anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Identifier
    pub id: UserId,

    /// Full name
    #[serde(rename = "nombre")]
    pub name: String,

    /// Email, also the login name
    pub email: String,

    /// Phone number
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,

    /// Password, present only on responses straight from the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Number of orders placed
    #[serde(rename = "pedidos", default)]
    pub order_count: Option<u32>,

    /// Registration day
    #[serde(
        rename = "fechaRegistro",
        default,
        deserialize_with = "deserialize_optional_date"
    )]
    pub registered_on: Option<Date>,

    /// Whether the account may place orders; absent means active
    #[serde(rename = "activo", default)]
    pub active: Option<bool>,

    /// Whether the account can use the back office
    #[serde(rename = "esAdmin", default)]
    pub is_admin: Option<bool>,

    /// Everything else the API sent
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Returns `true` unless the account has been deactivated.
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }

    /// Returns `true` for back-office accounts.
    pub fn is_admin(&self) -> bool {
        self.is_admin.unwrap_or_default()
    }

    /// The same user with one more order counted.
    #[must_use]
    pub fn with_order_counted(mut self) -> Self {
        self.order_count = Some(self.order_count.unwrap_or_default().saturating_add(1));
        self
    }

    /// The user without credentials, suitable for keeping in a session.
    #[must_use]
    pub fn without_password(mut self) -> Self {
        self.password = None;
        self
    }
}

/// Registration request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    /// Full name
    #[serde(rename = "nombre")]
    pub name: String,

    /// Email
    pub email: String,

    /// Phone number
    #[serde(rename = "telefono")]
    pub phone: String,

    /// Password
    pub password: String,
}

/// What the customer typed into the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    /// Full name
    pub name: String,

    /// Email
    pub email: String,

    /// Phone number
    pub phone: String,

    /// Password
    pub password: String,

    /// Password again
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns every failing field as [`ValidationErrors`].
    pub fn validate(&self) -> Result<NewUser, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = self.name.trim();
        let email = self.email.trim();
        let phone = self.phone.trim();

        if name.is_empty() {
            errors.add("nombre", "El nombre es requerido");
        } else if name.chars().count() < MIN_NAME_CHARS {
            errors.add("nombre", "El nombre debe tener al menos 3 caracteres");
        }

        if email.is_empty() {
            errors.add("email", "El correo electrónico es requerido");
        } else if !looks_like_email(email) {
            errors.add("email", "El correo electrónico no es válido");
        }

        if phone.is_empty() {
            errors.add("telefono", "El teléfono es requerido");
        } else if !is_digits(phone, PHONE_DIGITS) {
            errors.add("telefono", "El teléfono debe tener exactamente 9 dígitos");
        }

        if self.password.is_empty() {
            errors.add("password", "La contraseña es requerida");
        } else if self.password.chars().count() < MIN_PASSWORD_CHARS {
            errors.add("password", "La contraseña debe tener al menos 6 caracteres");
        }

        if self.confirm_password.is_empty() {
            errors.add("confirmPassword", "Debes confirmar tu contraseña");
        } else if self.password != self.confirm_password {
            errors.add("confirmPassword", "Las contraseñas no coinciden");
        }

        errors.into_result(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            password: self.password.clone(),
        })
    }
}

/// Login request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Email
    pub email: String,

    /// Password
    pub password: String,
}

impl Credentials {
    /// Validate the login form.
    ///
    /// # Errors
    ///
    /// Returns every failing field as [`ValidationErrors`].
    pub fn validate(email: &str, password: &str) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = email.trim();

        if email.is_empty() {
            errors.add("usuario", "El usuario es requerido");
        } else if email.chars().count() < MIN_NAME_CHARS {
            errors.add("usuario", "El usuario debe tener al menos 3 caracteres");
        }

        if password.is_empty() {
            errors.add("password", "La contraseña es requerida");
        } else if password.chars().count() < MIN_PASSWORD_CHARS {
            errors.add("password", "La contraseña debe tener al menos 6 caracteres");
        }

        errors.into_result(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use testresult::TestResult;

    use super::*;

    const API_USER: &str = r#"{
        "id": 12,
        "nombre": "Ana Quispe",
        "email": "ana@sanisidro.pe",
        "telefono": "987654321",
        "password": "secreto",
        "pedidos": 4,
        "fechaRegistro": [2025, 11, 2],
        "activo": true,
        "esAdmin": false,
        "fechaCreacion": "2025-11-02T10:00:00"
    }"#;

    fn form() -> RegistrationForm {
        RegistrationForm {
            name: "Ana Quispe".to_string(),
            email: "ana@sanisidro.pe".to_string(),
            phone: "987654321".to_string(),
            password: "secreto".to_string(),
            confirm_password: "secreto".to_string(),
        }
    }

    #[test]
    fn deserializes_api_user() -> TestResult {
        let user: User = serde_json::from_str(API_USER)?;

        assert_eq!(user.id, UserId(12));
        assert_eq!(user.order_count, Some(4));
        assert_eq!(user.registered_on, Some(date(2025, 11, 2)));
        assert!(user.is_active());
        assert!(!user.is_admin());
        assert!(user.extra.contains_key("fechaCreacion"));

        Ok(())
    }

    #[test]
    fn counting_an_order_keeps_every_other_field() -> TestResult {
        let user: User = serde_json::from_str(API_USER)?;
        let updated = serde_json::to_value(user.with_order_counted())?;

        assert_eq!(updated["pedidos"], 5);
        assert_eq!(updated["password"], "secreto");
        assert_eq!(updated["fechaCreacion"], "2025-11-02T10:00:00");

        Ok(())
    }

    #[test]
    fn missing_counter_starts_at_one() -> TestResult {
        let user: User = serde_json::from_str(
            r#"{"id": 1, "nombre": "Luis", "email": "luis@correo.pe", "pedidos": null}"#,
        )?;

        assert_eq!(user.with_order_counted().order_count, Some(1));

        Ok(())
    }

    #[test]
    fn session_copy_drops_password() -> TestResult {
        let user: User = serde_json::from_str(API_USER)?;
        let value = serde_json::to_value(user.without_password())?;

        assert!(value.get("password").is_none());

        Ok(())
    }

    #[test]
    fn deactivated_user_is_not_active() -> TestResult {
        let user: User = serde_json::from_str(
            r#"{"id": 1, "nombre": "Luis", "email": "luis@correo.pe", "activo": false}"#,
        )?;

        assert!(!user.is_active());

        Ok(())
    }

    #[test]
    fn valid_registration_builds_request() -> TestResult {
        let new_user = form().validate()?;

        assert_eq!(new_user.name, "Ana Quispe");
        assert_eq!(
            serde_json::to_value(&new_user)?,
            serde_json::json!({
                "nombre": "Ana Quispe",
                "email": "ana@sanisidro.pe",
                "telefono": "987654321",
                "password": "secreto"
            })
        );

        Ok(())
    }

    #[test]
    fn registration_reports_every_failing_field() {
        let form = RegistrationForm {
            name: "Al".to_string(),
            email: "ana@sanisidro".to_string(),
            phone: "98765".to_string(),
            password: "abc".to_string(),
            confirm_password: "abd".to_string(),
        };

        let errors = form.validate().err().unwrap_or_default();

        assert_eq!(errors.fields().len(), 5);
        assert_eq!(
            errors.message("nombre"),
            Some("El nombre debe tener al menos 3 caracteres")
        );
        assert_eq!(
            errors.message("telefono"),
            Some("El teléfono debe tener exactamente 9 dígitos")
        );
        assert_eq!(
            errors.message("confirmPassword"),
            Some("Las contraseñas no coinciden")
        );
    }

    #[test]
    fn login_requires_user_and_password() {
        let errors = Credentials::validate("", "123").err().unwrap_or_default();

        assert_eq!(errors.message("usuario"), Some("El usuario es requerido"));
        assert_eq!(
            errors.message("password"),
            Some("La contraseña debe tener al menos 6 caracteres")
        );
    }

    #[test]
    fn valid_login_trims_email() -> TestResult {
        let credentials = Credentials::validate(" ana@sanisidro.pe ", "secreto")?;

        assert_eq!(credentials.email, "ana@sanisidro.pe");

        Ok(())
    }
}
