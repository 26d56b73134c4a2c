//! # Auth State
//!
//! Who is signed in. The storefront runs with a single configured account,
//! so the session starts signed in as that user.

use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use ts_rs::TS;

/// Signed-in identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub is_logged_in: bool,
    pub user_id: i64,
    pub role: String,
}

/// Thread-safe holder of the current [`Session`].
#[derive(Debug, Clone)]
pub struct AuthState {
    session: Arc<Mutex<Session>>,
}

impl AuthState {
    /// Starts signed in as `user_id`.
    pub fn signed_in(user_id: i64, role: impl Into<String>) -> Self {
        AuthState {
            session: Arc::new(Mutex::new(Session {
                is_logged_in: true,
                user_id,
                role: role.into(),
            })),
        }
    }

    pub fn session(&self) -> Session {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The signed-in user, if any.
    pub fn user_id(&self) -> Option<i64> {
        let session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        session.is_logged_in.then_some(session.user_id)
    }
}
