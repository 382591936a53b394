//! Users service.

use async_trait::async_trait;
use mockall::automock;
use sanisidro::users::{Credentials, NewUser, User, UserId};
use tracing::info;

use crate::api::{ApiClient, ApiError};

const USERS: &str = "usuarios";

#[derive(Debug, Clone)]
pub struct HttpUsersService {
    api: ApiClient,
}

impl HttpUsersService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl UsersService for HttpUsersService {
    #[tracing::instrument(
        name = "users.service.register",
        skip(self, user),
        fields(email = %user.email),
        err
    )]
    async fn register(&self, user: NewUser) -> Result<User, ApiError> {
        let created: User = self.api.post([USERS, "registro"], &user).await?;

        info!(user_id = %created.id, "registered user");

        Ok(created)
    }

    #[tracing::instrument(
        name = "users.service.login",
        skip(self, credentials),
        fields(email = %credentials.email),
        err
    )]
    async fn login(&self, credentials: Credentials) -> Result<User, ApiError> {
        self.api.post([USERS, "login"], &credentials).await
    }

    #[tracing::instrument(name = "users.service.list_users", skip(self), err)]
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.api.get([USERS]).await
    }

    #[tracing::instrument(
        name = "users.service.get_user",
        skip(self),
        fields(user_id = %id),
        err
    )]
    async fn get_user(&self, id: UserId) -> Result<User, ApiError> {
        self.api.get([USERS, &id.to_string()]).await
    }

    #[tracing::instrument(
        name = "users.service.update_user",
        skip(self, user),
        fields(user_id = %user.id),
        err
    )]
    async fn update_user(&self, user: User) -> Result<User, ApiError> {
        self.api.put([USERS, &user.id.to_string()], &user).await
    }

    #[tracing::instrument(
        name = "users.service.delete_user",
        skip(self),
        fields(user_id = %id),
        err
    )]
    async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        self.api.delete([USERS, &id.to_string()]).await?;

        info!(user_id = %id, "deleted user");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Creates a customer account.
    async fn register(&self, user: NewUser) -> Result<User, ApiError>;

    /// Signs a customer in.
    ///
    /// Wrong credentials are reported as [`ApiError::Unauthorized`].
    async fn login(&self, credentials: Credentials) -> Result<User, ApiError>;

    /// Retrieves every account.
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;

    /// Retrieve a single user.
    async fn get_user(&self, id: UserId) -> Result<User, ApiError>;

    /// Replaces a user.
    async fn update_user(&self, user: User) -> Result<User, ApiError>;

    /// Deletes an account.
    async fn delete_user(&self, id: UserId) -> Result<(), ApiError>;
}
