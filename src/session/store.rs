//! The session store: single source of truth for "is the caller
//! authenticated".
//!
//! State lives in a `tokio::sync::watch` channel so every mutation is applied
//! atomically and observed by subscribers (the route guard).
//!
//! Asynchronous results are applied against a snapshot taken when the
//! operation started. Logout and forced logout advance an epoch, which voids
//! every pending login and recovery. An applied login records its sequence
//! number, which voids pending recovery and any older login. Failed or
//! cancelled logins change neither, so they never void anything.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::persist::CredentialStore;
use super::state::{Credential, Session, SessionPhase, SessionState};
use crate::auth::{AuthGrant, Authenticator};
use crate::errors::{ClientError, ErrorKind};
use crate::models::Identity;

#[derive(Debug, Clone, Default)]
struct Shared {
    state: SessionState,
    /// Advanced by logout and forced logout.
    epoch: u64,
    /// Sequence number handed to the most recently started login.
    logins_started: u64,
    /// Sequence number of the login that last populated the session.
    last_applied_login: u64,
}

/// What an in-flight operation saw when it started.
#[derive(Debug, Clone, Copy, Default)]
struct Ticket {
    epoch: u64,
    last_applied_login: u64,
}

/// Why a login attempt did not authenticate the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginFailure {
    pub kind: ErrorKind,
    pub reason: String,
}

impl LoginFailure {
    fn from_error(err: &ClientError) -> Self {
        Self {
            kind: err.kind(),
            reason: err.user_message(),
        }
    }
}

/// Result of a single `login` call. Exactly one is produced per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success(Identity),
    Failure(LoginFailure),
    /// The attempt was cancelled or superseded by a later session change;
    /// the session was not touched.
    Discarded,
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

struct Inner {
    tx: watch::Sender<Shared>,
    authenticator: Arc<dyn Authenticator>,
    credentials: Arc<dyn CredentialStore>,
}

/// Cheap-to-clone handle to the process's session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("phase", &self.phase())
            .finish()
    }
}

impl SessionStore {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let (tx, _rx) = watch::channel(Shared::default());
        Self {
            inner: Arc::new(Inner {
                tx,
                authenticator,
                credentials,
            }),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.tx.borrow().state.clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.tx.borrow().state.phase()
    }

    pub fn session(&self) -> Session {
        Session::from(&self.inner.tx.borrow().state)
    }

    pub fn is_settled(&self) -> bool {
        self.inner.tx.borrow().state.is_settled()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.tx.borrow().state.is_authenticated()
    }

    pub fn credential(&self) -> Option<Credential> {
        self.inner.tx.borrow().state.credential().cloned()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.inner.tx.borrow().state.identity().cloned()
    }

    pub fn subscribe(&self) -> SessionWatcher {
        SessionWatcher {
            rx: self.inner.tx.subscribe(),
        }
    }

    /// Recover a stored credential and settle the session.
    ///
    /// Always leaves the session settled, whatever the outcome. A no-op once
    /// the session has settled.
    pub async fn initialize(&self) -> SessionPhase {
        if self.is_settled() {
            return self.phase();
        }
        let ticket = self.snapshot();

        let recovered = match self.inner.credentials.load() {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored credential");
                None
            }
        };

        let mut discard_stored = false;
        let next = match recovered {
            None => {
                tracing::debug!("no stored credential");
                SessionState::Unauthenticated
            }
            Some(credential) => match self.inner.authenticator.identify(&credential).await {
                Ok(identity) => {
                    tracing::debug!(username = %identity.username, "recovered session");
                    SessionState::Authenticated {
                        credential,
                        identity,
                    }
                }
                Err(err) => {
                    if matches!(
                        err.kind(),
                        ErrorKind::Authorization | ErrorKind::Authentication
                    ) {
                        tracing::info!("stored credential was rejected, discarding it");
                        discard_stored = true;
                    } else {
                        tracing::warn!(error = %err, "could not verify stored credential");
                    }
                    SessionState::Unauthenticated
                }
            },
        };

        self.inner.tx.send_if_modified(|shared| {
            let current = shared.epoch == ticket.epoch
                && shared.last_applied_login == ticket.last_applied_login;
            if current {
                // Cleared under the channel lock so a login that has since
                // stored a fresh credential cannot lose it.
                if discard_stored {
                    if let Err(e) = self.inner.credentials.clear() {
                        tracing::warn!(error = %e, "failed to remove stored credential");
                    }
                }
                shared.state = next;
                true
            } else if !shared.state.is_settled() {
                // Superseded, but recovery is over: settle without a session.
                shared.state = SessionState::Unauthenticated;
                true
            } else {
                tracing::debug!("discarding recovery superseded by a later change");
                false
            }
        });

        self.phase()
    }

    pub async fn login(&self, username: &str, password: &str) -> LoginOutcome {
        self.login_with_cancel(username, password, &CancellationToken::new())
            .await
    }

    /// Like [`login`](Self::login), but a cancelled `cancel` token discards
    /// the result whenever it arrives.
    pub async fn login_with_cancel(
        &self,
        username: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> LoginOutcome {
        if username.trim().is_empty() || password.is_empty() {
            return LoginOutcome::Failure(LoginFailure {
                kind: ErrorKind::Validation,
                reason: "Username and password are required".to_string(),
            });
        }

        let (ticket, seq) = self.begin_login();
        tracing::debug!(username, seq, "login started");

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(username, "login cancelled before completion");
                return LoginOutcome::Discarded;
            }
            result = self.inner.authenticator.authenticate(username, password) => result,
        };

        if cancel.is_cancelled() {
            return LoginOutcome::Discarded;
        }

        match result {
            Ok(AuthGrant {
                credential,
                identity,
            }) => {
                let applied = self.apply_login(
                    ticket,
                    seq,
                    SessionState::Authenticated {
                        credential,
                        identity: identity.clone(),
                    },
                );
                if applied {
                    tracing::info!(username = %identity.username, "logged in");
                    LoginOutcome::Success(identity)
                } else {
                    tracing::info!(username, "discarding login superseded by a later change");
                    LoginOutcome::Discarded
                }
            }
            Err(err) => {
                tracing::warn!(username, error = %err, "login failed");
                LoginOutcome::Failure(LoginFailure::from_error(&err))
            }
        }
    }

    /// Clear the session and the stored credential. Idempotent.
    pub fn logout(&self) {
        let changed = self.inner.tx.send_if_modified(|shared| {
            shared.epoch += 1;
            if let Err(e) = self.inner.credentials.clear() {
                tracing::warn!(error = %e, "failed to remove stored credential");
            }
            let changed = shared.state != SessionState::Unauthenticated;
            shared.state = SessionState::Unauthenticated;
            changed
        });
        if changed {
            tracing::info!("logged out");
        }
    }

    /// Forced logout after the server rejected `credential`.
    ///
    /// Only acts when `credential` is still the session's credential, so a
    /// late rejection of an old token cannot end a newer session. Returns
    /// whether the session was cleared.
    pub fn reject_credential(&self, credential: &Credential) -> bool {
        let rejected = self.inner.tx.send_if_modified(|shared| {
            let is_current = matches!(
                &shared.state,
                SessionState::Authenticated { credential: current, .. } if current == credential
            );
            if !is_current {
                return false;
            }
            shared.epoch += 1;
            shared.state = SessionState::Unauthenticated;
            if let Err(e) = self.inner.credentials.clear() {
                tracing::warn!(error = %e, "failed to remove stored credential");
            }
            true
        });
        if rejected {
            tracing::warn!("credential rejected by server, session cleared");
        }
        rejected
    }

    fn snapshot(&self) -> Ticket {
        let shared = self.inner.tx.borrow();
        Ticket {
            epoch: shared.epoch,
            last_applied_login: shared.last_applied_login,
        }
    }

    /// Hand out the next login sequence number along with the snapshot the
    /// login is checked against.
    fn begin_login(&self) -> (Ticket, u64) {
        let mut started = (Ticket::default(), 0);
        // Subscribers only care about state, so counting a login does not
        // notify them.
        self.inner.tx.send_if_modified(|shared| {
            shared.logins_started += 1;
            started = (
                Ticket {
                    epoch: shared.epoch,
                    last_applied_login: shared.last_applied_login,
                },
                shared.logins_started,
            );
            false
        });
        started
    }

    /// Apply a successful login unless a logout or a newer applied login
    /// happened since it started.
    fn apply_login(&self, ticket: Ticket, seq: u64, next: SessionState) -> bool {
        self.inner.tx.send_if_modified(|shared| {
            if shared.epoch != ticket.epoch || shared.last_applied_login > seq {
                return false;
            }
            // Persist under the channel lock so a concurrent logout cannot
            // clear the file before this write lands.
            if let Some(credential) = next.credential() {
                if let Err(e) = self.inner.credentials.save(credential) {
                    tracing::warn!(error = %e, "failed to store credential");
                }
            }
            shared.last_applied_login = seq;
            shared.state = next;
            true
        })
    }
}

/// Subscription to session mutations.
#[derive(Debug)]
pub struct SessionWatcher {
    rx: watch::Receiver<Shared>,
}

impl SessionWatcher {
    pub fn current(&self) -> SessionState {
        self.rx.borrow().state.clone()
    }

    /// Wait for the next mutation. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<SessionState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().state.clone())
    }

    /// Wait until the session has settled.
    pub async fn settled(&mut self) -> Option<SessionState> {
        let shared = self
            .rx
            .wait_for(|shared| shared.state.is_settled())
            .await
            .ok()?;
        Some(shared.state.clone())
    }
}
