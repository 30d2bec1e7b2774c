//! Wiring: one session store and one API client per process, built from the
//! effective configuration.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiClient;
use crate::auth::HttpAuthenticator;
use crate::config::Config;
use crate::guard::{GuardDecision, Route, RouteGuard};
use crate::http::HttpTransport;
use crate::session::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, SessionPhase, SessionStore,
};
use crate::ui::LoadingIndicator;

pub struct App {
    config: Config,
    session: SessionStore,
    api: ApiClient,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let base_url = config.api_url();
        let timeout = config.timeout();
        let transport = HttpTransport::new(&base_url, timeout)
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;

        let credentials: Arc<dyn CredentialStore> = if config.persist_session() {
            Arc::new(FileCredentialStore::new(config.credential_path()))
        } else {
            Arc::new(MemoryCredentialStore::default())
        };
        let authenticator = Arc::new(HttpAuthenticator::new(transport.clone()));
        let session = SessionStore::new(authenticator, credentials);
        let api = ApiClient::new(transport, session.clone());

        tracing::debug!(
            base_url = %base_url,
            timeout_secs = timeout.as_secs(),
            persist = config.persist_session(),
            "app initialized"
        );

        Ok(Self {
            config,
            session,
            api,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Run session recovery behind a loading indicator.
    pub async fn recover(&self) -> SessionPhase {
        if self.session.is_settled() {
            return self.session.phase();
        }
        let indicator = LoadingIndicator::start("Restoring session...");
        let phase = self.session.initialize().await;
        indicator.finish();
        phase
    }

    /// Navigate to `route`: recover the session, then let the guard decide.
    /// A redirect to the login screen becomes an error telling the user how
    /// to log in.
    pub async fn enter(&self, route: Route) -> Result<()> {
        self.recover().await;
        let mut guard = RouteGuard::new(self.session.clone());
        match guard.resolve(route).await {
            GuardDecision::Render(_) => Ok(()),
            GuardDecision::Redirect(_) => {
                anyhow::bail!("Not logged in. Run `taskdesk login` first.")
            }
            GuardDecision::Loading => anyhow::bail!("Session could not be restored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnvOverrides, TaskdeskToml};
    use tempfile::TempDir;

    fn config_in(dir: &TempDir, base_url: &str, persist: bool) -> Config {
        let mut toml = TaskdeskToml::default();
        toml.api.base_url = base_url.to_string();
        toml.session.persist = persist;
        Config::from_parts(
            dir.path().join("taskdesk.toml"),
            toml,
            EnvOverrides::default(),
            None,
        )
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let dir = TempDir::new().unwrap();
        let err = App::new(config_in(&dir, "not a url", true))
            .err()
            .unwrap();
        assert!(err.to_string().contains("Invalid API base URL"));
    }

    #[tokio::test]
    async fn test_enter_protected_route_without_credential_fails() {
        let dir = TempDir::new().unwrap();
        let app = App::new(config_in(&dir, "http://127.0.0.1:9", true)).unwrap();

        let err = app.enter(Route::Dashboard).await.unwrap_err();

        assert!(err.to_string().contains("taskdesk login"));
        assert_eq!(app.session().phase(), SessionPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_login_route_is_always_reachable() {
        let dir = TempDir::new().unwrap();
        let app = App::new(config_in(&dir, "http://127.0.0.1:9", false)).unwrap();

        app.enter(Route::Login).await.unwrap();
    }
}
