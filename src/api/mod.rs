//! Backend REST API: the [`AuthApi`] seam and its HTTP implementation.
//!
//! ERROR HANDLING
//! ==============
//! Calls never retry. Every failure is returned as an [`ApiError`] and the
//! caller decides what the user sees.

pub mod http;
pub mod types;

pub use http::HttpApi;
pub use types::{
    Accepted, ApiError, AuthPayload, Credentials, PasswordChange, ProfileUpdate, RegisterRequest, UserPayload,
};

use crate::session::UserRecord;

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const PROFILE_PATH: &str = "/api/users/profile";
pub const PASSWORD_PATH: &str = "/api/users/password";

/// Backend operations used by the auth flow.
///
/// Abstracted behind a trait so tests can substitute a scripted stub.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /api/auth/login`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-success envelope.
    async fn login(&self, credentials: &Credentials) -> Result<AuthPayload, ApiError>;

    /// `POST /api/auth/register`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-success envelope.
    async fn register(&self, request: &RegisterRequest) -> Result<AuthPayload, ApiError>;

    /// `GET /api/users/profile`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-success envelope.
    async fn fetch_profile(&self, token: &str) -> Result<UserRecord, ApiError>;

    /// `PUT /api/users/profile`. Returns the updated user if the server sent one.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-success envelope.
    async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> Result<Option<UserRecord>, ApiError>;

    /// `PUT /api/users/password`. Returns the server's confirmation message, if any.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure or a non-success envelope.
    async fn change_password(&self, token: &str, change: &PasswordChange) -> Result<Option<String>, ApiError>;
}
