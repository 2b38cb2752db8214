//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! One [`SessionManager`] is built at start-up and handed to every consumer
//! (route guards, pages). Consumers read [`AuthState`] snapshots or subscribe
//! to changes; only the manager mutates the session.
//!
//! DESIGN
//! ======
//! Snapshots are published through a `watch` channel, so a reader always sees
//! a whole `AuthState`. Every commit that touches both the token store and the
//! published user runs under one mutex held across no `.await`; when a logout
//! interleaves with an in-flight login, whichever commit runs last wins for
//! both halves.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::token::{StoreError, TokenStore};
use crate::net::api::{ApiError, IdentityService};
use crate::net::types::{AuthResponse, RegistrationInput, RegistrationPayload, Role, User};

/// Authentication state tracking the current user and loading status.
///
/// `loading` is true only until the first rehydration finishes. Role
/// predicates are computed from `user` on every call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
}

impl AuthState {
    /// State published before rehydration completes.
    #[must_use]
    pub fn rehydrating() -> Self {
        Self { user: None, loading: true }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn role(&self) -> Option<&Role> {
        self.user.as_ref().map(|user| &user.role)
    }

    #[must_use]
    pub fn has_role(&self, role: &Role) -> bool {
        self.role() == Some(role)
    }

    #[must_use]
    pub fn is_job_seeker(&self) -> bool {
        self.has_role(&Role::JobSeeker)
    }

    #[must_use]
    pub fn is_employer(&self) -> bool {
        self.has_role(&Role::Employer)
    }
}

/// Lifecycle position of a [`SessionManager`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Rehydrating,
    Authenticated,
    Anonymous,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The credential could not be persisted; the session was left unchanged.
    #[error("could not save credential: {0}")]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Text to show the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::Store(_) => "Signed in, but the session could not be saved on this device.".to_owned(),
        }
    }
}

// =============================================================================
// SESSION MANAGER
// =============================================================================

/// Owner of the current session. Cheap to clone; clones share one session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    identity: Arc<dyn IdentityService>,
    tokens: Arc<dyn TokenStore>,
    state: watch::Sender<AuthState>,
    started: AtomicBool,
    commit: Mutex<()>,
}

impl SessionManager {
    /// Build a manager in the uninitialized phase. Call [`SessionManager::init`]
    /// before serving protected content.
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityService>, tokens: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(AuthState::rehydrating());
        Self {
            inner: Arc::new(Inner {
                identity,
                tokens,
                state,
                started: AtomicBool::new(false),
                commit: Mutex::new(()),
            }),
        }
    }

    /// Build a manager and run rehydration before returning it.
    pub async fn start(identity: Arc<dyn IdentityService>, tokens: Arc<dyn TokenStore>) -> Self {
        let session = Self::new(identity, tokens);
        session.init().await;
        session
    }

    /// Rehydrate the session from the stored credential.
    ///
    /// Runs at most once per manager. Later calls wait for the first run to
    /// finish and return its result. Never fails: any problem with the stored
    /// credential resolves to an anonymous session.
    pub async fn init(&self) -> AuthState {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            let mut rx = self.subscribe();
            if let Ok(state) = rx.wait_for(|state| !state.loading).await {
                return state.clone();
            }
            return self.snapshot();
        }

        self.rehydrate().await;
        self.snapshot()
    }

    async fn rehydrate(&self) {
        if self.inner.tokens.get().is_none() {
            tracing::debug!("no stored credential; session starts anonymous");
            self.finish_rehydration(None, false);
            return;
        }

        match self.inner.identity.fetch_current_user().await {
            Ok(user) => {
                tracing::info!(role = %user.role, "session restored from stored credential");
                self.finish_rehydration(Some(user), false);
            }
            Err(e) => {
                // Offline and logged-out look the same from here.
                tracing::warn!(error = %e, "stored credential unusable; session starts anonymous");
                self.finish_rehydration(None, true);
            }
        }
    }

    fn finish_rehydration(&self, user: Option<User>, discard_credential: bool) {
        let _commit = self.lock_commit();
        if discard_credential {
            if let Err(e) = self.inner.tokens.clear() {
                tracing::error!(error = %e, "failed to discard unusable credential");
            }
        }
        self.inner.state.send_modify(|state| {
            state.user = user;
            state.loading = false;
        });
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Propagates the identity service error (bad credentials, transport) or
    /// a storage failure. The session is unchanged on error.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let auth = self.inner.identity.login(email, password).await.map_err(|e| {
            tracing::info!(error = %e, "login rejected");
            e
        })?;
        self.establish(auth)
    }

    /// Create an account from the registration form and sign in as it.
    ///
    /// # Errors
    ///
    /// Propagates the identity service error (rejected payload, transport) or
    /// a storage failure. The session is unchanged on error.
    pub async fn register(&self, input: &RegistrationInput) -> Result<User, SessionError> {
        let payload = RegistrationPayload::from_input(input);
        let auth = self.inner.identity.register(&payload).await.map_err(|e| {
            tracing::info!(error = %e, role = %payload.role(), "registration rejected");
            e
        })?;
        self.establish(auth)
    }

    fn establish(&self, auth: AuthResponse) -> Result<User, SessionError> {
        let AuthResponse { token, user } = auth;
        let _commit = self.lock_commit();
        self.inner.tokens.set(&token)?;
        self.inner
            .state
            .send_modify(|state| state.user = Some(user.clone()));
        tracing::info!(role = %user.role, "signed in");
        Ok(user)
    }

    /// Drop the credential and the identity. Needs no network and cannot fail.
    pub fn logout(&self) {
        let _commit = self.lock_commit();
        if let Err(e) = self.inner.tokens.clear() {
            tracing::error!(error = %e, "failed to remove stored credential on logout");
        }
        self.inner.state.send_modify(|state| state.user = None);
        tracing::info!("signed out");
    }

    /// Current session as one consistent value.
    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if !self.inner.started.load(Ordering::SeqCst) {
            return SessionPhase::Uninitialized;
        }
        let state = self.inner.state.borrow();
        if state.loading {
            SessionPhase::Rehydrating
        } else if state.is_authenticated() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }

    fn lock_commit(&self) -> MutexGuard<'_, ()> {
        self.inner
            .commit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
