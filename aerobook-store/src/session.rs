//! Signed-in session: auth token, user profile and the booking draft.
//!
//! A store is created when the user signs in and cleared on logout or as
//! soon as the token is found to be expired.

use aerobook_core::BookingDraft;
use aerobook_shared::{Masked, UserProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    pub token: Masked<String>,
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: Masked::new(token.into()),
            expires_at,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// The persisted form: token object plus serialized user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub auth_token: AuthToken,
    pub user: UserProfile,
}

#[derive(Debug)]
struct Session {
    stored: StoredSession,
    draft: BookingDraft,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    inner: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn start(&self, auth_token: AuthToken, user: UserProfile) {
        info!(user_id = %user.id, expires_at = %auth_token.expires_at, "Session started");
        *self.write() = Some(Session {
            stored: StoredSession { auth_token, user },
            draft: BookingDraft::Empty,
        });
    }

    /// Restores a persisted session; an already expired one is dropped.
    pub fn restore(&self, stored: StoredSession, now: DateTime<Utc>) -> bool {
        if stored.auth_token.is_expired_at(now) {
            debug!("Persisted session already expired");
            self.logout();
            return false;
        }
        *self.write() = Some(Session { stored, draft: BookingDraft::Empty });
        true
    }

    /// Runs `f` on the live session. The expiry check, the clear of an
    /// expired session and the read all happen under one write guard.
    fn with_live<T>(&self, now: DateTime<Utc>, f: impl FnOnce(&Session) -> T) -> Option<T> {
        let mut guard = self.write();
        if guard
            .as_ref()
            .is_some_and(|session| session.stored.auth_token.is_expired_at(now))
        {
            info!("Session token expired, clearing session");
            *guard = None;
        }
        guard.as_ref().map(f)
    }

    pub fn token_at(&self, now: DateTime<Utc>) -> Option<String> {
        self.with_live(now, |s| s.stored.auth_token.token.expose().clone())
    }

    pub fn token(&self) -> Option<String> {
        self.token_at(Utc::now())
    }

    pub fn user_at(&self, now: DateTime<Utc>) -> Option<UserProfile> {
        self.with_live(now, |s| s.stored.user.clone())
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.user_at(Utc::now())
    }

    pub fn is_authenticated(&self) -> bool {
        self.with_live(Utc::now(), |_| ()).is_some()
    }

    /// Snapshot for persistence, if a live session exists.
    pub fn persist(&self) -> Option<StoredSession> {
        self.with_live(Utc::now(), |s| s.stored.clone())
    }

    pub fn draft(&self) -> Option<BookingDraft> {
        self.read().as_ref().map(|s| s.draft.clone())
    }

    /// Runs `f` against the session's draft; `None` without a session.
    pub fn update_draft<T>(&self, f: impl FnOnce(&mut BookingDraft) -> T) -> Option<T> {
        self.write().as_mut().map(|s| f(&mut s.draft))
    }

    pub fn logout(&self) {
        if self.write().take().is_some() {
            info!("Session cleared");
        }
    }
}
