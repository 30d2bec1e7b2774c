//! Authenticated CRUD client for the `/projects` and `/tasks` collections.
//!
//! Every call attaches the session's credential as a bearer token. A 401
//! from the server is turned into a forced logout before the error is handed
//! back to the caller.

use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::ClientError;
use crate::http::HttpTransport;
use crate::models::{NewProject, NewTask, Project, ProjectUpdate, Task, TaskFilter, TaskUpdate};
use crate::session::SessionStore;

#[derive(Debug, Clone)]
pub struct ApiClient {
    transport: HttpTransport,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(transport: HttpTransport, session: SessionStore) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    // Projects

    pub async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        self.get_json("/projects", &[]).await
    }

    pub async fn get_project(&self, id: i64) -> Result<Project, ClientError> {
        self.get_json(&format!("/projects/{}", id), &[]).await
    }

    pub async fn create_project(&self, project: &NewProject) -> Result<Project, ClientError> {
        self.send_json(Method::POST, "/projects", project).await
    }

    pub async fn update_project(
        &self,
        id: i64,
        update: &ProjectUpdate,
    ) -> Result<Project, ClientError> {
        self.send_json(Method::PUT, &format!("/projects/{}", id), update)
            .await
    }

    pub async fn delete_project(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/projects/{}", id)).await
    }

    // Tasks

    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, ClientError> {
        self.get_json("/tasks", &filter.query_pairs()).await
    }

    pub async fn get_task(&self, id: i64) -> Result<Task, ClientError> {
        self.get_json(&format!("/tasks/{}", id), &[]).await
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ClientError> {
        self.send_json(Method::POST, "/tasks", task).await
    }

    pub async fn update_task(&self, id: i64, update: &TaskUpdate) -> Result<Task, ClientError> {
        self.send_json(Method::PUT, &format!("/tasks/{}", id), update)
            .await
    }

    pub async fn delete_task(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/tasks/{}", id)).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, ClientError> {
        let response = self
            .authorized(Method::GET, path, |request| {
                if query.is_empty() {
                    request
                } else {
                    request.query(query)
                }
            })
            .await?;
        self.transport.decode(response, path).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self
            .authorized(method, path, |request| request.json(body))
            .await?;
        self.transport.decode(response, path).await
    }

    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        // The body is just a confirmation message.
        self.authorized(Method::DELETE, path, |request| request)
            .await
            .map(drop)
    }

    async fn authorized(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response, ClientError> {
        let credential = self
            .session
            .credential()
            .ok_or_else(|| ClientError::Authorization("not logged in".to_string()))?;

        tracing::debug!(%method, path, "api request");
        let request = build(
            self.transport
                .request(method, path)
                .bearer_auth(credential.expose()),
        );

        match self.transport.execute(request).await {
            Err(ClientError::Authorization(message)) => {
                self.session.reject_credential(&credential);
                Err(ClientError::Authorization(message))
            }
            other => other,
        }
    }
}
