//! Auth gate: which area a user lands in.
//!
//! SYSTEM CONTEXT
//! ==============
//! The single authority for role-based routing. App start, entry to the
//! authenticated area, and the post-login redirect all go through
//! [`destination_for`] so they can never disagree.

#[cfg(test)]
#[path = "gate_test.rs"]
mod gate_test;

use std::fmt;

use crate::session::{KeyValueStore, SessionStore, UserRecord};

/// Landing area for the current session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Destination {
    Login,
    AdminHome,
    PersonalHome,
    ClientHome,
}

impl Destination {
    /// Fixed route path of the destination.
    #[must_use]
    pub fn route(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::AdminHome => "/admin",
            Self::PersonalHome => "/personal",
            Self::ClientHome => "/client",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route())
    }
}

/// Route an authenticated user by role. `isAdmin` wins over `isPersonal`.
#[must_use]
pub fn destination_for(user: &UserRecord) -> Destination {
    if user.is_admin {
        Destination::AdminHome
    } else if user.is_personal {
        Destination::PersonalHome
    } else {
        Destination::ClientHome
    }
}

/// Resolve the destination for whatever session is stored.
///
/// Storage failures are indistinguishable from "never logged in": both land
/// on [`Destination::Login`].
pub async fn resolve_destination<S: KeyValueStore>(store: &SessionStore<S>) -> Destination {
    match store.read().await {
        Ok(Some(session)) => destination_for(&session.user),
        Ok(None) => Destination::Login,
        Err(e) => {
            tracing::warn!(error = %e, "session read failed; routing to login");
            Destination::Login
        }
    }
}
