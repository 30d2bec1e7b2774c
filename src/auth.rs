//! Credential exchange with the API's `/auth` endpoints.

use async_trait::async_trait;
use reqwest::Method;

use crate::errors::ClientError;
use crate::http::HttpTransport;
use crate::models::{Identity, LoginRequest, LoginResponse};
use crate::session::Credential;

/// A credential together with the identity it belongs to.
///
/// The session store only ever receives both at once, so a populated session
/// can never hold one without the other.
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub credential: Credential,
    pub identity: Identity,
}

/// The session store's view of the authentication backend.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Exchange a username/password pair for a credential and identity.
    async fn authenticate(&self, username: &str, password: &str)
    -> Result<AuthGrant, ClientError>;

    /// Resolve the identity behind an existing credential.
    async fn identify(&self, credential: &Credential) -> Result<Identity, ClientError>;
}

/// [`Authenticator`] backed by the remote API.
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    transport: HttpTransport,
}

impl HttpAuthenticator {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthGrant, ClientError> {
        let request = self
            .transport
            .request(Method::POST, "/auth/login")
            .json(&LoginRequest { username, password });

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(login_error)?;
        let body: LoginResponse = self.transport.decode(response, "/auth/login").await?;

        if !body.token_type.eq_ignore_ascii_case("bearer") {
            tracing::warn!(token_type = %body.token_type, "unexpected token type from login");
        }
        let credential = Credential::new(body.access_token);

        // Older servers only return the token; ask who it belongs to.
        let identity = match body.user {
            Some(identity) => identity,
            None => self.identify(&credential).await.map_err(login_error)?,
        };

        Ok(AuthGrant {
            credential,
            identity,
        })
    }

    async fn identify(&self, credential: &Credential) -> Result<Identity, ClientError> {
        let request = self
            .transport
            .request(Method::GET, "/auth/me")
            .bearer_auth(credential.expose());
        let response = self.transport.execute(request).await?;
        self.transport.decode(response, "/auth/me").await
    }
}

/// Rejections at login time are bad credentials, not an expired session.
fn login_error(err: ClientError) -> ClientError {
    match err {
        ClientError::Authorization(msg) => ClientError::Authentication(msg),
        ClientError::Api { status, message } if matches!(status, 400 | 403 | 422) => {
            ClientError::Authentication(message)
        }
        other => other,
    }
}
