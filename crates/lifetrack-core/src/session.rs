//! Session lifecycle for the authenticated identity.
//!
//! The identity is established once per session by the external
//! authentication collaborator and handed to the sync engine as an
//! explicit object with a typed lifecycle, rather than ambient global
//! state: `Unauthenticated -> Authenticated -> Closed`.

use crate::error::{Result, TrackError};
use crate::store::UserId;

/// Authentication state for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Unauthenticated,
    Authenticated(UserId),
    /// Terminal; a closed session can never sign in again.
    Closed,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shortcut for an already-authenticated session.
    pub fn authenticated(user: UserId) -> Self {
        Session::Authenticated(user)
    }

    /// Bind an identity. Fails on a closed session.
    pub fn sign_in(&mut self, user: UserId) -> Result<()> {
        match self {
            Session::Closed => Err(TrackError::AuthUnavailable),
            _ => {
                *self = Session::Authenticated(user);
                Ok(())
            }
        }
    }

    /// Drop the identity without closing the session.
    pub fn sign_out(&mut self) {
        if !matches!(self, Session::Closed) {
            *self = Session::Unauthenticated;
        }
    }

    /// Terminal transition.
    pub fn close(&mut self) {
        *self = Session::Closed;
    }

    pub fn user(&self) -> Option<&UserId> {
        match self {
            Session::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }
}
