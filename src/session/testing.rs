//! Stub authenticator shared by the session, guard and login flow tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};

use super::persist::{CredentialStore, MemoryCredentialStore};
use super::{Credential, SessionStore};
use crate::auth::{AuthGrant, Authenticator};
use crate::errors::ClientError;
use crate::models::Identity;

/// Accepts `admin/admin123` and `testuser/user123`; the matching tokens are
/// `token-admin` and `token-testuser`.
pub(crate) struct StubAuthenticator {
    gate: Option<Arc<Semaphore>>,
    /// When set, only logins for this user wait on `gate`.
    gated_user: Option<String>,
    entered: Arc<Notify>,
    calls: Arc<AtomicUsize>,
    unreachable: bool,
}

impl StubAuthenticator {
    pub fn accepting() -> Self {
        Self {
            gate: None,
            gated_user: None,
            entered: Arc::new(Notify::new()),
            calls: Arc::new(AtomicUsize::new(0)),
            unreachable: false,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::accepting()
        }
    }

    /// Every call blocks until the returned semaphore is given a permit.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let stub = Self {
            gate: Some(gate.clone()),
            ..Self::accepting()
        };
        (stub, gate)
    }

    /// Only logins for `username` block on the returned semaphore; every
    /// other call goes straight through.
    pub fn gated_for(username: &str) -> (Self, Arc<Semaphore>) {
        let (stub, gate) = Self::gated();
        let stub = Self {
            gated_user: Some(username.to_string()),
            ..stub
        };
        (stub, gate)
    }

    /// Notified each time a call reaches the stub.
    pub fn entered(&self) -> Arc<Notify> {
        self.entered.clone()
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    async fn enter(&self, username: Option<&str>) -> Result<(), ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        let held = match &self.gated_user {
            Some(gated) => username == Some(gated.as_str()),
            None => true,
        };
        if let Some(gate) = self.gate.as_ref().filter(|_| held) {
            gate.acquire()
                .await
                .expect("stub gate closed")
                .forget();
        }
        if self.unreachable {
            return Err(ClientError::Network("could not connect to server".into()));
        }
        Ok(())
    }
}

fn username_for_token(token: &str) -> Option<&str> {
    match token {
        "token-admin" => Some("admin"),
        "token-testuser" => Some("testuser"),
        _ => None,
    }
}

#[async_trait]
impl Authenticator for StubAuthenticator {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthGrant, ClientError> {
        self.enter(Some(username)).await?;
        match (username, password) {
            ("admin", "admin123") | ("testuser", "user123") => Ok(AuthGrant {
                credential: Credential::new(format!("token-{}", username)),
                identity: Identity::new(username),
            }),
            _ => Err(ClientError::Authentication(
                "Incorrect username or password".into(),
            )),
        }
    }

    async fn identify(&self, credential: &Credential) -> Result<Identity, ClientError> {
        self.enter(None).await?;
        username_for_token(credential.expose())
            .map(Identity::new)
            .ok_or_else(|| ClientError::Authorization("Could not validate credentials".into()))
    }
}

pub(crate) fn store_with(
    authenticator: StubAuthenticator,
    stored: Option<Credential>,
) -> (SessionStore, Arc<MemoryCredentialStore>) {
    let persisted = Arc::new(match stored {
        Some(credential) => MemoryCredentialStore::with_credential(credential),
        None => MemoryCredentialStore::default(),
    });
    let credentials: Arc<dyn CredentialStore> = persisted.clone();
    let store = SessionStore::new(Arc::new(authenticator), credentials);
    (store, persisted)
}
