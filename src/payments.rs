//! Payments
//!
//! Payment is a form, not a transaction: the customer picks a method and fills in its fields,
//! and once they validate the holder's name and phone travel with the order. No card data
//! leaves the form.

use std::{fmt, str::FromStr};

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CARD_NUMBER_DIGITS: usize = 16;
const YAPE_PHONE_DIGITS: usize = 9;
const YAPE_CODE_DIGITS: usize = 6;

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Credit or debit card
    Card,

    /// Yape mobile wallet
    Yape,
}

impl PaymentMethod {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Yape => "yape",
        }
    }

    /// Name shown on invoices.
    pub fn label(self) -> &'static str {
        match self {
            Self::Card => "Tarjeta",
            Self::Yape => "Yape",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown payment method.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "card" | "tarjeta" => Ok(Self::Card),
            "yape" => Ok(Self::Yape),
            other => Err(UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// Validation failures on the payment form. Messages are shown to the customer as-is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentValidationError {
    /// No method was chosen.
    #[error("Por favor selecciona un método de pago")]
    MethodNotSelected,

    /// A card field is blank.
    #[error("Por favor completa todos los campos de la tarjeta")]
    IncompleteCard,

    /// The expiry date is malformed or in the past.
    #[error("La fecha de vencimiento no es válida o tu tarjeta ya expiró")]
    InvalidExpiry,

    /// The card number is not sixteen digits.
    #[error("El número de tarjeta debe tener 16 dígitos")]
    CardNumberLength,

    /// A Yape field is blank.
    #[error("Por favor completa todos los campos de Yape")]
    IncompleteYape,

    /// The Yape phone number is not nine digits.
    #[error("El número de Yape debe tener 9 dígitos")]
    YapePhoneLength,

    /// The Yape approval code is not six digits.
    #[error("El código de verificación debe tener 6 dígitos")]
    YapeCodeLength,
}

/// What the customer typed into the payment form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentForm {
    /// Selected method
    pub method: Option<PaymentMethod>,

    /// Card number; spaces are ignored
    pub card_number: String,

    /// Name on the card
    pub card_holder: String,

    /// Expiry as `MM/YY`
    pub card_expiry: String,

    /// Card security code
    pub card_cvv: String,

    /// Yape phone number
    pub yape_phone: String,

    /// Name on the Yape account
    pub yape_holder: String,

    /// Yape approval code
    pub yape_code: String,
}

/// The part of a validated payment form that is kept with the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    /// Method used
    pub method: PaymentMethod,

    /// Card or account holder
    pub holder_name: String,

    /// Yape phone number; absent for card payments
    pub phone: Option<String>,
}

impl PaymentForm {
    /// Validate the form as of `today`, which decides whether a card has expired.
    ///
    /// # Errors
    ///
    /// Returns the first [`PaymentValidationError`] found, in the order the fields appear.
    pub fn validate(&self, today: Date) -> Result<PaymentDetails, PaymentValidationError> {
        match self.method {
            None => Err(PaymentValidationError::MethodNotSelected),
            Some(PaymentMethod::Card) => self.validate_card(today),
            Some(PaymentMethod::Yape) => self.validate_yape(),
        }
    }

    fn validate_card(&self, today: Date) -> Result<PaymentDetails, PaymentValidationError> {
        if [
            &self.card_number,
            &self.card_holder,
            &self.card_expiry,
            &self.card_cvv,
        ]
        .iter()
        .any(|field| field.trim().is_empty())
        {
            return Err(PaymentValidationError::IncompleteCard);
        }

        if !expiry_is_valid(self.card_expiry.trim(), today) {
            return Err(PaymentValidationError::InvalidExpiry);
        }

        let number: String = self
            .card_number
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        if !is_digits(&number, CARD_NUMBER_DIGITS) {
            return Err(PaymentValidationError::CardNumberLength);
        }

        Ok(PaymentDetails {
            method: PaymentMethod::Card,
            holder_name: self.card_holder.trim().to_string(),
            phone: None,
        })
    }

    fn validate_yape(&self) -> Result<PaymentDetails, PaymentValidationError> {
        if [&self.yape_phone, &self.yape_holder, &self.yape_code]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(PaymentValidationError::IncompleteYape);
        }

        let phone = self.yape_phone.trim();

        if !is_digits(phone, YAPE_PHONE_DIGITS) {
            return Err(PaymentValidationError::YapePhoneLength);
        }

        if !is_digits(self.yape_code.trim(), YAPE_CODE_DIGITS) {
            return Err(PaymentValidationError::YapeCodeLength);
        }

        Ok(PaymentDetails {
            method: PaymentMethod::Yape,
            holder_name: self.yape_holder.trim().to_string(),
            phone: Some(phone.to_string()),
        })
    }
}

/// Returns `true` if `value` is exactly `len` ASCII digits.
pub(crate) fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

/// A card expiring in `MM/YY` is usable through the end of that month.
fn expiry_is_valid(expiry: &str, today: Date) -> bool {
    let Some((month, year)) = expiry.split_once('/') else {
        return false;
    };

    if !is_digits(month, 2) || !is_digits(year, 2) {
        return false;
    }

    let (Ok(month), Ok(year)) = (month.parse::<i16>(), year.parse::<i16>()) else {
        return false;
    };

    if !(1..=12).contains(&month) {
        return false;
    }

    (2000 + year, month) >= (today.year(), i16::from(today.month()))
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use testresult::TestResult;

    use super::*;

    fn card() -> PaymentForm {
        PaymentForm {
            method: Some(PaymentMethod::Card),
            card_number: "4111 1111 1111 1111".to_string(),
            card_holder: "Ana Quispe".to_string(),
            card_expiry: "08/27".to_string(),
            card_cvv: "123".to_string(),
            ..PaymentForm::default()
        }
    }

    fn yape() -> PaymentForm {
        PaymentForm {
            method: Some(PaymentMethod::Yape),
            yape_phone: "987654321".to_string(),
            yape_holder: "Luis Rojas".to_string(),
            yape_code: "123456".to_string(),
            ..PaymentForm::default()
        }
    }

    fn today() -> Date {
        date(2026, 10, 18)
    }

    #[test]
    fn valid_card_keeps_holder_only() -> TestResult {
        let details = card().validate(today())?;

        assert_eq!(
            details,
            PaymentDetails {
                method: PaymentMethod::Card,
                holder_name: "Ana Quispe".to_string(),
                phone: None,
            }
        );

        Ok(())
    }

    #[test]
    fn valid_yape_keeps_holder_and_phone() -> TestResult {
        let details = yape().validate(today())?;

        assert_eq!(details.method, PaymentMethod::Yape);
        assert_eq!(details.phone.as_deref(), Some("987654321"));

        Ok(())
    }

    #[test]
    fn missing_method_is_rejected() {
        assert_eq!(
            PaymentForm::default().validate(today()),
            Err(PaymentValidationError::MethodNotSelected)
        );
    }

    #[test]
    fn blank_card_field_is_rejected() {
        let form = PaymentForm {
            card_cvv: " ".to_string(),
            ..card()
        };

        assert_eq!(
            form.validate(today()),
            Err(PaymentValidationError::IncompleteCard)
        );
    }

    #[test]
    fn expiry_must_be_well_formed_and_not_past() {
        for expiry in ["13/27", "00/27", "9/27", "0927", "09/2027", "09/25", "ab/cd"] {
            let form = PaymentForm {
                card_expiry: expiry.to_string(),
                ..card()
            };

            assert_eq!(
                form.validate(today()),
                Err(PaymentValidationError::InvalidExpiry),
                "expiry {expiry}"
            );
        }
    }

    #[test]
    fn card_expiring_this_month_is_accepted() -> TestResult {
        let form = PaymentForm {
            card_expiry: "10/26".to_string(),
            ..card()
        };

        form.validate(today())?;

        Ok(())
    }

    #[test]
    fn card_number_must_have_sixteen_digits() {
        let form = PaymentForm {
            card_number: "4111 1111 1111".to_string(),
            ..card()
        };

        assert_eq!(
            form.validate(today()),
            Err(PaymentValidationError::CardNumberLength)
        );
    }

    #[test]
    fn yape_fields_are_checked_in_order() {
        let blank = PaymentForm {
            yape_holder: String::new(),
            ..yape()
        };
        let short_phone = PaymentForm {
            yape_phone: "98765".to_string(),
            ..yape()
        };
        let short_code = PaymentForm {
            yape_code: "12".to_string(),
            ..yape()
        };

        assert_eq!(
            blank.validate(today()),
            Err(PaymentValidationError::IncompleteYape)
        );
        assert_eq!(
            short_phone.validate(today()),
            Err(PaymentValidationError::YapePhoneLength)
        );
        assert_eq!(
            short_code.validate(today()),
            Err(PaymentValidationError::YapeCodeLength)
        );
    }

    #[test]
    fn method_parses_from_text() -> TestResult {
        assert_eq!("Card".parse::<PaymentMethod>()?, PaymentMethod::Card);
        assert_eq!("yape".parse::<PaymentMethod>()?, PaymentMethod::Yape);
        assert!("cash".parse::<PaymentMethod>().is_err());

        Ok(())
    }
}
