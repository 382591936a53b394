//! Customer-side cancellation.

use sanisidro::reservations::{Reservation, ReservationId};
use thiserror::Error;
use tracing::info;

use super::ReservationsService;
use crate::api::ApiError;

/// Why a customer could not cancel a booking.
#[derive(Debug, Error)]
pub enum CancelError {
    /// No reservation has that ID.
    #[error("Reserva no encontrada")]
    NotFound,

    /// The reservation was made with another email.
    #[error("Solo puedes cancelar tus propias reservas")]
    NotYours,

    /// The API could not be reached or refused the change.
    #[error(transparent)]
    Api(ApiError),
}

impl From<ApiError> for CancelError {
    fn from(error: ApiError) -> Self {
        if error.is_not_found() {
            Self::NotFound
        } else {
            Self::Api(error)
        }
    }
}

/// Cancel reservation `id` on behalf of the customer signed in as `email`.
///
/// # Errors
///
/// Returns [`CancelError::NotYours`] without writing if the booking belongs to someone else.
#[tracing::instrument(name = "reservations.cancel", skip(service), err)]
pub async fn cancel_reservation(
    service: &dyn ReservationsService,
    id: ReservationId,
    email: &str,
) -> Result<Reservation, CancelError> {
    let mut reservation = service.get_reservation(id).await?;

    if !reservation.is_booked_by(email) {
        return Err(CancelError::NotYours);
    }

    reservation.cancel();

    let updated = service.update_reservation(id, reservation).await?;

    info!(reservation_id = %id, "customer cancelled reservation");

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use jiff::civil::{date, time};
    use sanisidro::reservations::ReservationStatus;
    use testresult::TestResult;

    use super::*;
    use crate::domain::reservations::MockReservationsService;

    fn booking(id: ReservationId) -> Reservation {
        Reservation {
            id: Some(id),
            name: "Ana Quispe".to_string(),
            email: "Ana@SanIsidro.pe".to_string(),
            phone: "987654321".to_string(),
            date: date(2026, 10, 20),
            time: time(20, 0, 0, 0),
            party_size: 2,
            notes: None,
            status: ReservationStatus::Confirmed,
        }
    }

    #[tokio::test]
    async fn customer_cancels_own_booking() -> TestResult {
        let mut service = MockReservationsService::new();

        service
            .expect_get_reservation()
            .returning(|id| Ok(booking(id)));
        service
            .expect_update_reservation()
            .once()
            .withf(|id, reservation| {
                *id == ReservationId(8) && reservation.status == ReservationStatus::Cancelled
            })
            .returning(|_, reservation| Ok(reservation));

        let cancelled = cancel_reservation(&service, ReservationId(8), "ana@sanisidro.pe").await?;

        assert_eq!(cancelled.status, ReservationStatus::Cancelled);

        Ok(())
    }

    #[tokio::test]
    async fn someone_elses_booking_is_left_alone() {
        let mut service = MockReservationsService::new();

        service
            .expect_get_reservation()
            .returning(|id| Ok(booking(id)));
        service.expect_update_reservation().never();

        let result = cancel_reservation(&service, ReservationId(8), "luis@correo.pe").await;

        assert!(matches!(result, Err(CancelError::NotYours)));
    }

    #[tokio::test]
    async fn missing_booking_is_reported_as_not_found() {
        let mut service = MockReservationsService::new();

        service
            .expect_get_reservation()
            .returning(|_| Err(ApiError::NotFound));

        let result = cancel_reservation(&service, ReservationId(99), "ana@sanisidro.pe").await;

        assert_eq!(
            result.map_err(|error| error.to_string()).err().as_deref(),
            Some("Reserva no encontrada")
        );
    }
}
