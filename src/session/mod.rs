//! Persisted login session: auth token plus the serialized user record.
//!
//! ARCHITECTURE
//! ============
//! The session lives in two string entries of a [`KeyValueStore`]:
//! `auth.token` and `auth.user` (JSON). They are written and removed as a
//! pair. Whatever is stored is trusted until an explicit [`SessionStore::clear`];
//! there is no expiry and no encryption.
//!
//! A half-present pair (token without user or the reverse) or an undecodable
//! user record reads as "no session", and the leftovers are removed so the
//! next read starts clean.

pub mod storage;


use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub use storage::{FileStorage, KeyValueStore, MemoryStorage};

pub const TOKEN_KEY: &str = "auth.token";
pub const USER_KEY: &str = "auth.user";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by session storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Refused to persist a session without a token.
    #[error("session token must not be empty")]
    EmptyToken,

    /// The backing file could not be read or written.
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but is not a JSON string map.
    #[error("session storage is corrupt: {0}")]
    Corrupt(String),

    /// The user record could not be serialized.
    #[error("user record encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

// =============================================================================
// TYPES
// =============================================================================

/// The backend's user object.
///
/// Only the two role flags are interpreted; every other field is carried
/// through untouched so a later read returns what the backend sent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Gym administrator.
    #[serde(rename = "isAdmin", default, deserialize_with = "deserialize_flag")]
    pub is_admin: bool,
    /// Personal trainer.
    #[serde(rename = "isPersonal", default, deserialize_with = "deserialize_flag")]
    pub is_personal: bool,
    /// Remaining backend fields (id, name, email, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Display name from the `name` field, if the backend sent one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.extra.get("name").and_then(Value::as_str)
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.extra.get("email").and_then(Value::as_str)
    }
}

/// Role flags arrive as booleans from most endpoints, but older rows come
/// back as `0`/`1`, `"true"` or `null`.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        Value::Bool(flag) => Ok(flag),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|v| v.abs() > f64::EPSILON)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            other => Err(D::Error::custom(format!("invalid role flag '{other}'"))),
        },
        other => Err(D::Error::custom(format!("invalid role flag {other}"))),
    }
}

/// A logged-in user: bearer token and the user record returned at login.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserRecord,
}

// =============================================================================
// STORE
// =============================================================================

/// Session persistence on top of a [`KeyValueStore`].
pub struct SessionStore<S> {
    storage: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Persist a session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyToken`] for an empty token, or a storage error.
    pub async fn save(&self, token: &str, user: &UserRecord) -> Result<(), StoreError> {
        if token.is_empty() {
            return Err(StoreError::EmptyToken);
        }
        let user_json = serde_json::to_string(user)?;
        self.storage
            .set_many(&[(TOKEN_KEY, token), (USER_KEY, user_json.as_str())])
            .await
    }

    /// Read the stored session, if a complete and decodable one exists.
    ///
    /// # Errors
    ///
    /// Returns an error only when the underlying storage fails.
    pub async fn read(&self) -> Result<Option<Session>, StoreError> {
        let token = self.storage.get(TOKEN_KEY).await?;
        let user = self.storage.get(USER_KEY).await?;

        match (token, user) {
            (None, None) => Ok(None),
            (Some(token), Some(user_json)) if !token.is_empty() => match serde_json::from_str(&user_json) {
                Ok(user) => Ok(Some(Session { token, user })),
                Err(e) => {
                    tracing::warn!(error = %e, "stored user record is undecodable; clearing session");
                    self.clear().await?;
                    Ok(None)
                }
            },
            (token, user) => {
                tracing::warn!(
                    has_token = token.as_deref().is_some_and(|t| !t.is_empty()),
                    has_user = user.is_some(),
                    "partial session in storage; clearing"
                );
                self.clear().await?;
                Ok(None)
            }
        }
    }

    /// Replace the stored user record, keeping the token.
    ///
    /// Returns `false` without writing when no session is stored.
    ///
    /// # Errors
    ///
    /// Returns a storage or encode error.
    pub async fn update_user(&self, user: &UserRecord) -> Result<bool, StoreError> {
        if self.read().await?.is_none() {
            return Ok(false);
        }
        let user_json = serde_json::to_string(user)?;
        self.storage.set(USER_KEY, &user_json).await?;
        Ok(true)
    }

    /// Remove both session entries.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying storage fails.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.storage.remove_many(&[TOKEN_KEY, USER_KEY]).await
    }
}
