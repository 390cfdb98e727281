//! Wire types for the backend REST API and envelope decoding.
//!
//! DESIGN
//! ======
//! Every endpoint answers with `{status, message?, data?}`. The envelope's
//! `status` is authoritative: a 200 carrying `status: "error"` is a
//! rejection, and a 4xx carrying a well-formed error envelope surfaces the
//! server's message rather than a bare status code.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::UserRecord;

pub const STATUS_SUCCESS: &str = "success";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (DNS, connect, timeout, ...).
    #[error("API request failed: {0}")]
    Request(String),

    /// Non-success HTTP status with a body that is not an envelope.
    #[error("API response error: status {status}")]
    Response { status: u16, body: String },

    /// The body could not be decoded into the expected shape.
    #[error("API response parse failed: {0}")]
    Parse(String),

    /// The server answered with a non-success envelope.
    #[error("request rejected: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// ENVELOPE
// =============================================================================

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    message: Option<String>,
    data: Option<Value>,
}

/// Body of a successful envelope.
#[derive(Debug)]
pub struct Accepted<T> {
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> Accepted<T> {
    /// The `data` member, which the endpoint is required to send.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] if the server omitted it.
    pub fn require_data(self) -> Result<T, ApiError> {
        self.data.ok_or_else(|| ApiError::Parse("envelope has no data".to_owned()))
    }
}

/// Decode a response body into an accepted envelope or an [`ApiError`].
///
/// # Errors
///
/// See [`ApiError`] variants.
pub fn decode_envelope<T: DeserializeOwned>(http_status: u16, body: &str) -> Result<Accepted<T>, ApiError> {
    let envelope: Envelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if !(200..300).contains(&http_status) => {
            return Err(ApiError::Response { status: http_status, body: body.to_owned() });
        }
        Err(e) => return Err(ApiError::Parse(e.to_string())),
    };

    let message = envelope.message.filter(|m| !m.trim().is_empty());
    if envelope.status != STATUS_SUCCESS {
        return Err(ApiError::Rejected { message });
    }

    let data = match envelope.data {
        None | Some(Value::Null) => None,
        Some(value) => Some(serde_json::from_value(value).map_err(|e| ApiError::Parse(e.to_string()))?),
    };
    Ok(Accepted { data, message })
}

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("phone", &self.phone)
            .finish()
    }
}

/// Partial profile edit; `None` fields are left untouched server-side.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ProfileUpdate {
    /// Drop blank fields; returns `None` if nothing is left to send.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        fn keep(field: Option<String>) -> Option<String> {
            field.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
        }
        let update = Self { name: keep(self.name), email: keep(self.email), phone: keep(self.phone) };
        if update == Self::default() { None } else { Some(update) }
    }
}

#[derive(Clone, Serialize)]
pub struct PasswordChange {
    #[serde(rename = "currentPassword")]
    pub current: String,
    #[serde(rename = "newPassword")]
    pub new: String,
}

impl fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordChange { .. }")
    }
}

// =============================================================================
// RESPONSES
// =============================================================================

/// `data` of login and register responses.
///
/// Both members are optional on the wire so a malformed success can be
/// reported as such instead of as a parse failure.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AuthPayload {
    pub token: Option<String>,
    pub user: Option<UserRecord>,
}

/// `data` of profile responses.
#[derive(Clone, Debug, Deserialize)]
pub struct UserPayload {
    pub user: UserRecord,
}
