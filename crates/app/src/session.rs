//! Signed-in user session.

use sanisidro::{
    storage::{Storage, StorageError, USER_KEY, load_json, save_json},
    users::User,
};
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised by the session store.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Nobody is signed in.
    #[error("Debes iniciar sesión para continuar")]
    NotSignedIn,

    /// The session could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The signed-in user, persisted so it survives restarts.
///
/// The stored copy never carries the password.
#[derive(Debug)]
pub struct SessionStore<S> {
    user: Option<User>,
    storage: S,
}

impl<S: Storage> SessionStore<S> {
    /// Restore the session saved in `storage`.
    ///
    /// An unreadable session is treated as signed out.
    pub fn load(storage: S) -> Self {
        let user = load_json::<User>(&storage, USER_KEY).unwrap_or_else(|error| {
            warn!(%error, "discarding unreadable session");

            None
        });

        Self { user, storage }
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSignedIn`] if nobody is signed in.
    pub fn require_user(&self) -> Result<&User, SessionError> {
        self.user.as_ref().ok_or(SessionError::NotSignedIn)
    }

    /// Start a session for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] if the session cannot be saved.
    pub fn sign_in(&mut self, user: User) -> Result<&User, SessionError> {
        let user = user.without_password();

        save_json(&mut self.storage, USER_KEY, &user)?;

        info!(user_id = %user.id, "signed in");

        Ok(self.user.insert(user))
    }

    /// End the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] if the stored session cannot be removed.
    pub fn sign_out(&mut self) -> Result<(), SessionError> {
        self.storage.remove(USER_KEY)?;

        if let Some(user) = self.user.take() {
            info!(user_id = %user.id, "signed out");
        }

        Ok(())
    }
}
