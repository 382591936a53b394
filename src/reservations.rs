//! Reservations
//!
//! Table bookings. A booking must fall inside business hours, and a booking for today must be
//! at least an hour ahead of the current time.

use std::{fmt, str::FromStr};

use jiff::{
    ToSpan, Zoned,
    civil::{Date, Time, time},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    dates::{deserialize_date, deserialize_time, parse_date, parse_time},
    payments::is_digits,
    validation::{ValidationErrors, looks_like_email},
};

/// Opening time for bookings.
pub const OPENS_AT: Time = time(10, 0, 0, 0);

/// Latest bookable time.
pub const CLOSES_AT: Time = time(21, 0, 0, 0);

/// Largest party a single booking can be made for.
pub const MAX_PARTY_SIZE: u32 = 20;

/// Longest note a booking can carry, in characters.
pub const MAX_NOTES_CHARS: usize = 200;

const PHONE_DIGITS: usize = 9;
const DNI_DIGITS: usize = 8;

/// Reservation identifier assigned by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(pub i64);

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Booking status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    /// Awaiting confirmation
    #[default]
    #[serde(rename = "pendiente")]
    Pending,

    /// Confirmed by the restaurant
    #[serde(rename = "confirmada")]
    Confirmed,

    /// Cancelled
    #[serde(rename = "cancelada")]
    Cancelled,
}

impl ReservationStatus {
    /// Every status.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Confirmed, Self::Cancelled];

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::Confirmed => "confirmada",
            Self::Cancelled => "cancelada",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown reservation status.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown reservation status: {0}")]
pub struct UnknownReservationStatus(String);

impl FromStr for ReservationStatus {
    type Err = UnknownReservationStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();

        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or(UnknownReservationStatus(wanted))
    }
}

/// A table booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Identifier, absent until stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ReservationId>,

    /// Name the table is booked under
    #[serde(rename = "nombre")]
    pub name: String,

    /// Contact email
    pub email: String,

    /// Contact phone
    #[serde(rename = "telefono")]
    pub phone: String,

    /// Day of the booking
    #[serde(rename = "fecha", deserialize_with = "deserialize_date")]
    pub date: Date,

    /// Time of the booking
    #[serde(rename = "hora", deserialize_with = "deserialize_time")]
    pub time: Time,

    /// Number of guests
    #[serde(rename = "numeroPersonas")]
    pub party_size: u32,

    /// Notes for the restaurant
    #[serde(rename = "comentarios", default)]
    pub notes: Option<String>,

    /// Booking status
    #[serde(rename = "estado", default)]
    pub status: ReservationStatus,
}

impl Reservation {
    /// Returns `true` if the booking was made with `email`, ignoring case.
    pub fn is_booked_by(&self, email: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(email.trim())
    }

    /// Mark the booking cancelled.
    pub fn cancel(&mut self) {
        self.status = ReservationStatus::Cancelled;
    }
}

/// Earliest bookable time on `date`, as of `now`.
///
/// Future days open at [`OPENS_AT`]. Today is one hour from now, but never before opening;
/// once that hour is past [`CLOSES_AT`] (or past midnight) only the closing time remains.
pub fn earliest_time(date: Date, now: &Zoned) -> Time {
    if date > now.date() {
        return OPENS_AT;
    }

    let current = time(now.hour(), now.minute(), 0, 0);

    match current.checked_add(1.hour()) {
        Ok(later) if later < OPENS_AT => OPENS_AT,
        Ok(later) if later <= CLOSES_AT => later,
        _ => CLOSES_AT,
    }
}

/// What the customer typed into the booking form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationForm {
    /// Name
    pub name: String,

    /// Email
    pub email: String,

    /// Phone number
    pub phone: String,

    /// Day, `YYYY-MM-DD`
    pub date: String,

    /// Time, `HH:MM`
    pub time: String,

    /// Number of guests
    pub party_size: String,

    /// Notes
    pub notes: String,
}

impl ReservationForm {
    /// Validate every field as of `now`.
    ///
    /// # Errors
    ///
    /// Returns every failing field as [`ValidationErrors`].
    pub fn validate(&self, now: &Zoned) -> Result<Reservation, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = self.name.trim();
        let email = self.email.trim();
        let phone = self.phone.trim();
        let notes = self.notes.trim();

        if name.is_empty() {
            errors.add("nombre", "El nombre es requerido");
        }

        if !looks_like_email(email) {
            errors.add("email", "El correo electrónico no es válido");
        }

        if !is_digits(phone, PHONE_DIGITS) {
            errors.add("telefono", "El teléfono debe tener exactamente 9 dígitos");
        }

        let date = match parse_date(&self.date) {
            Ok(date) if date < now.date() => {
                errors.add("fecha", "La fecha no puede ser anterior a hoy");
                None
            }
            Ok(date) => Some(date),
            Err(_) => {
                errors.add("fecha", "La fecha es requerida");
                None
            }
        };

        let time = match parse_time(&self.time) {
            Ok(time) if time < OPENS_AT || time > CLOSES_AT => {
                errors.add(
                    "hora",
                    format!(
                        "Nuestro horario de atención es de {} a {}.",
                        OPENS_AT.strftime("%H:%M"),
                        CLOSES_AT.strftime("%H:%M")
                    ),
                );
                None
            }
            Ok(time) => date.map_or(Some(time), |date| {
                let earliest = earliest_time(date, now);

                if time < earliest {
                    errors.add(
                        "hora",
                        format!(
                            "Para el día de hoy, las reservas deben ser a partir de las {} (1 hora de anticipación).",
                            earliest.strftime("%H:%M")
                        ),
                    );
                    None
                } else {
                    Some(time)
                }
            }),
            Err(_) => {
                errors.add("hora", "La hora es requerida");
                None
            }
        };

        let party_size = match self.party_size.trim().parse::<u32>() {
            Ok(size) if (1..=MAX_PARTY_SIZE).contains(&size) => Some(size),
            _ => {
                errors.add("personas", "El número de personas debe estar entre 1 y 20");
                None
            }
        };

        if notes.chars().count() > MAX_NOTES_CHARS {
            errors.add("notas", "Las notas no pueden superar los 200 caracteres");
        }

        match (date, time, party_size) {
            (Some(date), Some(time), Some(party_size)) if errors.is_empty() => Ok(Reservation {
                id: None,
                name: name.to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
                date,
                time,
                party_size,
                notes: Some(notes.to_string()),
                status: ReservationStatus::Pending,
            }),
            _ => Err(errors),
        }
    }
}

/// Errors raised for a malformed national ID number.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DniError {
    /// Nothing was entered.
    #[error("Por favor ingrese un DNI.")]
    Empty,

    /// Not exactly eight digits.
    #[error("El DNI debe tener exactamente 8 dígitos.")]
    Length,
}

/// A Peruvian national ID number (DNI), exactly eight digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dni(String);

impl Dni {
    /// Parse a DNI, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns a [`DniError`] if the input is empty or not eight digits.
    pub fn parse(raw: &str) -> Result<Self, DniError> {
        let dni = raw.trim();

        if dni.is_empty() {
            return Err(DniError::Empty);
        }

        if !is_digits(dni, DNI_DIGITS) {
            return Err(DniError::Length);
        }

        Ok(Self(dni.to_string()))
    }

    /// The digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Dni {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A national ID lookup result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Given names
    #[serde(default)]
    pub first_name: Option<String>,

    /// Paternal surname
    #[serde(default)]
    pub first_last_name: Option<String>,

    /// Maternal surname
    #[serde(default)]
    pub second_last_name: Option<String>,

    /// DNI the record belongs to
    #[serde(default)]
    pub document_number: Option<String>,

    /// Full name as registered
    #[serde(default)]
    pub full_name: Option<String>,
}

impl IdentityRecord {
    /// Full name, assembled from its parts when the lookup did not provide one.
    pub fn name(&self) -> Option<String> {
        let full = self
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|full| !full.is_empty());

        if let Some(full) = full {
            return Some(full.to_string());
        }

        let parts: Vec<&str> = [
            &self.first_name,
            &self.first_last_name,
            &self.second_last_name,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref().map(str::trim))
        .filter(|part| !part.is_empty())
        .collect();

        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use jiff::{civil::date, tz::TimeZone};
    use testresult::TestResult;

    use super::*;

    fn at(hour: i8, minute: i8) -> TestResult<Zoned> {
        Ok(date(2026, 10, 18)
            .at(hour, minute, 30, 0)
            .to_zoned(TimeZone::fixed(jiff::tz::offset(-5)))?)
    }

    fn form() -> ReservationForm {
        ReservationForm {
            name: "Ana Quispe".to_string(),
            email: "ana@sanisidro.pe".to_string(),
            phone: "987654321".to_string(),
            date: "2026-10-20".to_string(),
            time: "19:30".to_string(),
            party_size: "4".to_string(),
            notes: "Mesa cerca de la ventana".to_string(),
        }
    }

    #[test]
    fn cancelling_a_booking_made_by_the_customer() -> TestResult {
        let mut reservation = form().validate(&at(9, 0)?)?;

        assert!(reservation.is_booked_by(" ANA@sanisidro.pe"));
        assert!(!reservation.is_booked_by("luis@sanisidro.pe"));

        reservation.cancel();

        assert_eq!(reservation.status, ReservationStatus::Cancelled);

        Ok(())
    }

    #[test]
    fn future_days_open_at_ten() -> TestResult {
        assert_eq!(earliest_time(date(2026, 10, 19), &at(20, 0)?), OPENS_AT);

        Ok(())
    }

    #[test]
    fn today_requires_an_hour_of_notice() -> TestResult {
        let today = date(2026, 10, 18);

        assert_eq!(earliest_time(today, &at(7, 15)?), OPENS_AT);
        assert_eq!(earliest_time(today, &at(13, 45)?), time(14, 45, 0, 0));
        assert_eq!(earliest_time(today, &at(20, 30)?), CLOSES_AT);
        assert_eq!(earliest_time(today, &at(23, 30)?), CLOSES_AT);

        Ok(())
    }

    #[test]
    fn valid_form_builds_pending_reservation() -> TestResult {
        let reservation = form().validate(&at(12, 0)?)?;

        assert_eq!(reservation.date, date(2026, 10, 20));
        assert_eq!(reservation.time, time(19, 30, 0, 0));
        assert_eq!(reservation.party_size, 4);
        assert_eq!(reservation.status, ReservationStatus::Pending);

        let value = serde_json::to_value(&reservation)?;

        assert_eq!(value["fecha"], "2026-10-20");
        assert_eq!(value["hora"], "19:30:00");
        assert_eq!(value["numeroPersonas"], 4);
        assert_eq!(value["estado"], "pendiente");

        Ok(())
    }

    #[test]
    fn time_outside_business_hours_is_rejected() -> TestResult {
        let reservation = ReservationForm {
            time: "22:00".to_string(),
            ..form()
        };

        let errors = reservation
            .validate(&at(12, 0)?)
            .err()
            .unwrap_or_default();

        assert_eq!(
            errors.message("hora"),
            Some("Nuestro horario de atención es de 10:00 a 21:00.")
        );

        Ok(())
    }

    #[test]
    fn same_day_booking_needs_notice() -> TestResult {
        let reservation = ReservationForm {
            date: "2026-10-18".to_string(),
            time: "13:00".to_string(),
            ..form()
        };

        let errors = reservation
            .validate(&at(12, 30)?)
            .err()
            .unwrap_or_default();

        assert_eq!(
            errors.message("hora"),
            Some("Para el día de hoy, las reservas deben ser a partir de las 13:30 (1 hora de anticipación).")
        );

        Ok(())
    }

    #[test]
    fn past_date_and_bad_fields_are_all_reported() -> TestResult {
        let reservation = ReservationForm {
            name: " ".to_string(),
            phone: "12345".to_string(),
            date: "2026-10-17".to_string(),
            party_size: "25".to_string(),
            notes: "x".repeat(201),
            ..form()
        };

        let errors = reservation
            .validate(&at(12, 0)?)
            .err()
            .unwrap_or_default();

        let fields: Vec<&str> = errors.fields().iter().map(|error| error.field).collect();

        assert_eq!(fields, ["nombre", "telefono", "fecha", "personas", "notas"]);

        Ok(())
    }

    #[test]
    fn stored_reservation_accepts_array_dates() -> TestResult {
        let reservation: Reservation = serde_json::from_str(
            r#"{
                "id": 7,
                "nombre": "Luis",
                "email": "luis@correo.pe",
                "telefono": "912345678",
                "fecha": [2026, 10, 20],
                "hora": [19, 30],
                "numeroPersonas": 2,
                "comentarios": null,
                "estado": "confirmada"
            }"#,
        )?;

        assert_eq!(reservation.id, Some(ReservationId(7)));
        assert_eq!(reservation.status, ReservationStatus::Confirmed);
        assert_eq!(reservation.time, time(19, 30, 0, 0));

        Ok(())
    }

    #[test]
    fn dni_must_be_eight_digits() -> TestResult {
        assert_eq!(Dni::parse(" 12345678 ")?.as_str(), "12345678");
        assert_eq!(Dni::parse(""), Err(DniError::Empty));
        assert_eq!(Dni::parse("1234567"), Err(DniError::Length));
        assert_eq!(Dni::parse("1234567a"), Err(DniError::Length));

        Ok(())
    }

    #[test]
    fn identity_name_prefers_full_name() -> TestResult {
        let record: IdentityRecord = serde_json::from_str(
            r#"{"first_name": "ANA", "first_last_name": "QUISPE", "second_last_name": "ROJAS", "full_name": "ANA QUISPE ROJAS"}"#,
        )?;

        assert_eq!(record.name().as_deref(), Some("ANA QUISPE ROJAS"));

        let parts_only = IdentityRecord {
            full_name: None,
            ..record
        };

        assert_eq!(parts_only.name().as_deref(), Some("ANA QUISPE ROJAS"));
        assert_eq!(
            IdentityRecord {
                first_name: None,
                first_last_name: None,
                second_last_name: None,
                document_number: None,
                full_name: Some("  ".to_string()),
            }
            .name(),
            None
        );

        Ok(())
    }

    #[test]
    fn status_parses_from_wire_names() -> TestResult {
        assert_eq!(
            "Confirmada".parse::<ReservationStatus>()?,
            ReservationStatus::Confirmed
        );

        Ok(())
    }
}
