//! Reservations service.

use async_trait::async_trait;
use jiff::civil::Date;
use mockall::automock;
use sanisidro::reservations::{Reservation, ReservationId, ReservationStatus};
use tracing::info;

use crate::api::{ApiClient, ApiError};

const RESERVATIONS: &str = "reservas";

#[derive(Debug, Clone)]
pub struct HttpReservationsService {
    api: ApiClient,
}

impl HttpReservationsService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ReservationsService for HttpReservationsService {
    #[tracing::instrument(
        name = "reservations.service.create_reservation",
        skip(self, reservation),
        fields(date = %reservation.date, time = %reservation.time),
        err
    )]
    async fn create_reservation(&self, reservation: Reservation) -> Result<Reservation, ApiError> {
        let created: Reservation = self.api.post([RESERVATIONS], &reservation).await?;

        info!(reservation_id = ?created.id, "created reservation");

        Ok(created)
    }

    #[tracing::instrument(name = "reservations.service.list_reservations", skip(self), err)]
    async fn list_reservations(&self) -> Result<Vec<Reservation>, ApiError> {
        self.api.get([RESERVATIONS]).await
    }

    #[tracing::instrument(
        name = "reservations.service.get_reservation",
        skip(self),
        fields(reservation_id = %id),
        err
    )]
    async fn get_reservation(&self, id: ReservationId) -> Result<Reservation, ApiError> {
        self.api.get([RESERVATIONS, &id.to_string()]).await
    }

    #[tracing::instrument(name = "reservations.service.list_for_user", skip(self), err)]
    async fn list_for_user(&self, email: &str) -> Result<Vec<Reservation>, ApiError> {
        self.api.get([RESERVATIONS, "usuario", email]).await
    }

    #[tracing::instrument(
        name = "reservations.service.list_by_date",
        skip(self),
        fields(date = %date),
        err
    )]
    async fn list_by_date(&self, date: Date) -> Result<Vec<Reservation>, ApiError> {
        self.api
            .get([RESERVATIONS, "fecha", &date.to_string()])
            .await
    }

    #[tracing::instrument(
        name = "reservations.service.list_by_status",
        skip(self),
        fields(status = %status),
        err
    )]
    async fn list_by_status(
        &self,
        status: ReservationStatus,
    ) -> Result<Vec<Reservation>, ApiError> {
        self.api
            .get([RESERVATIONS, "estado", status.as_str()])
            .await
    }

    #[tracing::instrument(
        name = "reservations.service.update_reservation",
        skip(self, reservation),
        fields(reservation_id = %id, status = %reservation.status),
        err
    )]
    async fn update_reservation(
        &self,
        id: ReservationId,
        reservation: Reservation,
    ) -> Result<Reservation, ApiError> {
        self.api
            .put([RESERVATIONS, &id.to_string()], &reservation)
            .await
    }

    #[tracing::instrument(
        name = "reservations.service.delete_reservation",
        skip(self),
        fields(reservation_id = %id),
        err
    )]
    async fn delete_reservation(&self, id: ReservationId) -> Result<(), ApiError> {
        self.api.delete([RESERVATIONS, &id.to_string()]).await
    }
}

#[automock]
#[async_trait]
pub trait ReservationsService: Send + Sync {
    /// Books a table.
    async fn create_reservation(&self, reservation: Reservation) -> Result<Reservation, ApiError>;

    /// Retrieves every reservation.
    async fn list_reservations(&self) -> Result<Vec<Reservation>, ApiError>;

    /// Retrieve a single reservation.
    async fn get_reservation(&self, id: ReservationId) -> Result<Reservation, ApiError>;

    /// Retrieves the reservations made with an email.
    async fn list_for_user(&self, email: &str) -> Result<Vec<Reservation>, ApiError>;

    /// Retrieves the reservations for one day.
    async fn list_by_date(&self, date: Date) -> Result<Vec<Reservation>, ApiError>;

    /// Retrieves the reservations in one status.
    async fn list_by_status(&self, status: ReservationStatus)
    -> Result<Vec<Reservation>, ApiError>;

    /// Replaces a reservation.
    async fn update_reservation(
        &self,
        id: ReservationId,
        reservation: Reservation,
    ) -> Result<Reservation, ApiError>;

    /// Deletes a reservation.
    async fn delete_reservation(&self, id: ReservationId) -> Result<(), ApiError>;
}
