//! Login, registration and account operations over an injected API and
//! session store.
//!
//! ARCHITECTURE
//! ============
//! [`AuthService`] owns the [`SessionStore`] and an [`AuthApi`] handle; there
//! is no ambient global. Successful login/register writes the session and
//! routes through [`gate::destination_for`], the same decision used on app
//! start. Failed calls leave the stored session untouched.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;

use crate::api::{ApiError, AuthApi, AuthPayload, Credentials, PasswordChange, ProfileUpdate, RegisterRequest};
use crate::gate::{self, Destination};
use crate::session::{KeyValueStore, Session, SessionStore, StoreError, UserRecord};

pub const MIN_PASSWORD_LEN: usize = 6;

pub const NETWORK_FAILURE_MESSAGE: &str = "Could not reach the server. Check your connection and try again.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";
const STORE_FAILURE_MESSAGE: &str = "Could not save your session on this device.";
const NOT_LOGGED_IN_MESSAGE: &str = "You are not logged in. Please log in again.";

/// Errors surfaced by [`AuthService`] operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Input rejected before any network call.
    #[error("invalid input: {0}")]
    Invalid(&'static str),

    /// The operation needs a stored session and there is none.
    #[error("not logged in")]
    NotLoggedIn,

    /// The server accepted the request but the payload is unusable.
    #[error("malformed server response: {0}")]
    MalformedResponse(&'static str),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Message suitable for showing to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Invalid(reason) => (*reason).to_owned(),
            Self::NotLoggedIn => NOT_LOGGED_IN_MESSAGE.to_owned(),
            Self::Api(ApiError::Request(_)) => NETWORK_FAILURE_MESSAGE.to_owned(),
            Self::Api(ApiError::Rejected { message: Some(message) }) => message.clone(),
            Self::Api(_) | Self::MalformedResponse(_) => GENERIC_FAILURE_MESSAGE.to_owned(),
            Self::Store(_) => STORE_FAILURE_MESSAGE.to_owned(),
        }
    }
}

/// Result of a successful login or registration.
#[derive(Clone, Debug, PartialEq)]
pub struct LoginOutcome {
    pub session: Session,
    pub destination: Destination,
}

pub struct AuthService<S> {
    api: Arc<dyn AuthApi>,
    store: SessionStore<S>,
}

impl<S: KeyValueStore> AuthService<S> {
    pub fn new(api: Arc<dyn AuthApi>, store: SessionStore<S>) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    /// Where the app should land right now.
    pub async fn resolve_destination(&self) -> Destination {
        gate::resolve_destination(&self.store).await
    }

    /// The stored session.
    ///
    /// # Errors
    ///
    /// [`AuthError::NotLoggedIn`] when absent or when the stored session
    /// cannot be read back.
    pub async fn current_session(&self) -> Result<Session, AuthError> {
        match self.store.read().await {
            Ok(Some(session)) => Ok(session),
            Ok(None) => Err(AuthError::NotLoggedIn),
            Err(e) => {
                tracing::warn!(error = %e, "stored session unreadable; treating as logged out");
                Err(AuthError::NotLoggedIn)
            }
        }
    }

    /// Log in with email and password and persist the session.
    ///
    /// # Errors
    ///
    /// Returns an error for blank input, transport failure, a rejected or
    /// malformed response, or a storage failure. The stored session is
    /// unchanged in every error case except a storage failure during save.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Invalid("Email and password are required."));
        }
        let credentials = Credentials { email: email.to_owned(), password: password.to_owned() };

        let payload = self.api.login(&credentials).await.inspect_err(|e| {
            tracing::warn!(%email, error = %e, "login failed");
        })?;
        let outcome = self.establish(payload).await?;
        tracing::info!(%email, destination = %outcome.destination, "login succeeded");
        Ok(outcome)
    }

    /// Create an account and log straight into it.
    ///
    /// # Errors
    ///
    /// Same as [`AuthService::login`], plus local validation of the form.
    pub async fn register(&self, request: RegisterRequest) -> Result<LoginOutcome, AuthError> {
        let request = RegisterRequest {
            name: request.name.trim().to_owned(),
            email: request.email.trim().to_owned(),
            password: request.password,
            phone: request.phone.map(|p| p.trim().to_owned()).filter(|p| !p.is_empty()),
        };
        if request.name.is_empty() || request.email.is_empty() || request.password.is_empty() {
            return Err(AuthError::Invalid("Name, email and password are required."));
        }
        if !request.email.contains('@') {
            return Err(AuthError::Invalid("Enter a valid email address."));
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Invalid("Password must be at least 6 characters."));
        }

        let payload = self.api.register(&request).await.inspect_err(|e| {
            tracing::warn!(email = %request.email, error = %e, "registration failed");
        })?;
        let outcome = self.establish(payload).await?;
        tracing::info!(email = %request.email, destination = %outcome.destination, "registered");
        Ok(outcome)
    }

    /// Drop the stored session. Local only; the backend keeps no session state.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the session cannot be removed.
    pub async fn logout(&self) -> Result<Destination, AuthError> {
        self.store.clear().await?;
        tracing::info!("logged out");
        Ok(Destination::Login)
    }

    /// Fetch the current user's profile from the backend.
    ///
    /// # Errors
    ///
    /// [`AuthError::NotLoggedIn`] without a session, otherwise API errors.
    pub async fn profile(&self) -> Result<UserRecord, AuthError> {
        let session = self.current_session().await?;
        Ok(self.api.fetch_profile(&session.token).await?)
    }

    /// Edit the profile. The stored user record follows the server's copy.
    ///
    /// # Errors
    ///
    /// [`AuthError::Invalid`] for an empty edit, [`AuthError::NotLoggedIn`]
    /// without a session, otherwise API or storage errors.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserRecord, AuthError> {
        let update = update.normalized().ok_or(AuthError::Invalid("Nothing to update."))?;
        if update.email.as_deref().is_some_and(|e| !e.contains('@')) {
            return Err(AuthError::Invalid("Enter a valid email address."));
        }
        let session = self.current_session().await?;

        let user = match self.api.update_profile(&session.token, &update).await? {
            Some(user) => {
                self.store.update_user(&user).await?;
                user
            }
            None => session.user,
        };
        tracing::info!("profile updated");
        Ok(user)
    }

    /// Change the account password. Returns the server's confirmation text.
    ///
    /// # Errors
    ///
    /// [`AuthError::Invalid`] when the form fails local checks,
    /// [`AuthError::NotLoggedIn`] without a session, otherwise API errors.
    pub async fn change_password(&self, current: &str, new: &str, confirm: &str) -> Result<Option<String>, AuthError> {
        validate_password_change(current, new, confirm)?;
        let session = self.current_session().await?;

        let change = PasswordChange { current: current.to_owned(), new: new.to_owned() };
        let message = self.api.change_password(&session.token, &change).await?;
        tracing::info!("password changed");
        Ok(message)
    }

    async fn establish(&self, payload: AuthPayload) -> Result<LoginOutcome, AuthError> {
        let token = payload
            .token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MalformedResponse("missing token"))?;
        let user = payload.user.ok_or(AuthError::MalformedResponse("missing user"))?;

        self.store.save(&token, &user).await?;
        let destination = gate::destination_for(&user);
        Ok(LoginOutcome { session: Session { token, user }, destination })
    }
}

fn validate_password_change(current: &str, new: &str, confirm: &str) -> Result<(), AuthError> {
    if current.is_empty() || new.is_empty() || confirm.is_empty() {
        return Err(AuthError::Invalid("All password fields are required."));
    }
    if new != confirm {
        return Err(AuthError::Invalid("New passwords do not match."));
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Invalid("Password must be at least 6 characters."));
    }
    if new == current {
        return Err(AuthError::Invalid("New password must differ from the current one."));
    }
    Ok(())
}
