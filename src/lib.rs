//! Client library for the trainerhub gym / personal-training backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Everything a front end needs to talk to the backend: a persisted session
//! (token + user record), the auth gate that picks the landing route from
//! the stored role flags, and the REST calls for login, registration,
//! profile and password management.
//!
//! ```text
//!   AuthService ──► AuthApi (HttpApi / mock) ──► backend
//!        │
//!        └──► SessionStore ──► KeyValueStore (FileStorage / MemoryStorage)
//!                  ▲
//!   gate::resolve_destination
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod gate;
pub mod session;

pub use api::{AuthApi, HttpApi};
pub use auth::{AuthError, AuthService, LoginOutcome};
pub use config::ClientConfig;
pub use gate::Destination;
pub use session::{Session, SessionStore, UserRecord};
