//! In-process stand-in for the task management API.
//!
//! Runs on its own thread and runtime so both `#[test]` (assert_cmd) and
//! `#[tokio::test]` callers can use it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::TcpListener as StdListener;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tokio::sync::{Notify, Semaphore};

pub const CREATED_AT: &str = "2024-01-15T10:30:00";

#[derive(Default)]
struct Db {
    /// token -> username
    tokens: HashMap<String, String>,
    projects: Vec<Value>,
    tasks: Vec<Value>,
    next_id: i64,
    issued: usize,
}

struct Stub {
    db: Mutex<Db>,
    /// The `slow` user's login waits here for a permit.
    slow_gate: Semaphore,
    /// Notified when a `slow` login reaches the server.
    slow_arrived: Notify,
}

type Shared = Arc<Stub>;

pub struct StubApi {
    pub base_url: String,
    state: Shared,
}

impl StubApi {
    pub fn start() -> Self {
        let listener = StdListener::bind("127.0.0.1:0").expect("bind stub api");
        listener.set_nonblocking(true).expect("nonblocking listener");
        let addr = listener.local_addr().expect("stub api address");

        let state: Shared = Arc::new(Stub {
            db: Mutex::new(Db {
                next_id: 1,
                ..Db::default()
            }),
            slow_gate: Semaphore::new(0),
            slow_arrived: Notify::new(),
        });
        let app = router(state.clone());

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("stub api runtime");
            runtime.block_on(async move {
                let listener =
                    tokio::net::TcpListener::from_std(listener).expect("tokio listener");
                axum::serve(listener, app).await.expect("stub api server");
            });
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Wait until a `slow` login request is being held by the server.
    pub async fn slow_login_arrived(&self) {
        self.state.slow_arrived.notified().await;
    }

    /// Let one held `slow` login finish.
    pub fn release_slow_login(&self) {
        self.state.slow_gate.add_permits(1);
    }

    /// Invalidate every issued token, as if the server restarted with a new
    /// signing key.
    pub fn revoke_tokens(&self) {
        self.state.db.lock().unwrap().tokens.clear();
    }

    pub fn issued_tokens(&self) -> usize {
        self.state.db.lock().unwrap().issued
    }

    pub fn seed_project(&self, name: &str) -> i64 {
        let mut db = self.state.db.lock().unwrap();
        let id = db.take_id();
        db.projects.push(project_record(id, name, None));
        id
    }

    pub fn seed_task(&self, project_id: i64, title: &str, status: &str) -> i64 {
        let mut db = self.state.db.lock().unwrap();
        let id = db.take_id();
        let mut record = task_record(id, title, project_id);
        record["status"] = json!(status);
        if status == "done" {
            record["completed_at"] = json!(CREATED_AT);
        }
        db.tasks.push(record);
        id
    }

    pub fn project_count(&self) -> usize {
        self.state.db.lock().unwrap().projects.len()
    }

    pub fn task(&self, id: i64) -> Option<Value> {
        let db = self.state.db.lock().unwrap();
        db.tasks.iter().find(|t| t["id"] == id).cloned()
    }
}

impl Db {
    fn take_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn issue_token(&mut self, username: &str) -> String {
        self.issued += 1;
        let token = format!("token-{}-{}", username, self.issued);
        self.tokens.insert(token.clone(), username.to_string());
        token
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<String, Response> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        match token.and_then(|t| self.tokens.get(t)) {
            Some(username) => Ok(username.clone()),
            None => Err(detail(
                StatusCode::UNAUTHORIZED,
                "Could not validate credentials",
            )),
        }
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .with_state(state)
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn user(username: &str) -> Option<Value> {
    let (id, full_name, role) = match username {
        "admin" => (1, "Admin User", "admin"),
        "testuser" => (2, "Test User", "user"),
        "legacy" => (3, "Legacy User", "user"),
        "slow" => (4, "Slow User", "user"),
        _ => return None,
    };
    Some(json!({
        "id": id,
        "username": username,
        "email": format!("{}@example.com", username),
        "full_name": full_name,
        "role": role,
        "is_active": true,
    }))
}

fn password_for(username: &str) -> Option<&'static str> {
    match username {
        "admin" => Some("admin123"),
        "testuser" => Some("user123"),
        "legacy" => Some("legacy123"),
        "slow" => Some("slow123"),
        _ => None,
    }
}

fn project_record(id: i64, name: &str, description: Option<&str>) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": description,
        "owner_id": 1,
        "is_active": true,
        "created_at": CREATED_AT,
        "updated_at": null,
    })
}

fn task_record(id: i64, title: &str, project_id: i64) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "status": "todo",
        "priority": "medium",
        "due_date": null,
        "project_id": project_id,
        "assigned_to_id": null,
        "created_by_id": 1,
        "completed_at": null,
        "created_at": CREATED_AT,
        "updated_at": null,
    })
}

/// Copy every non-null field of `patch` onto `record`.
fn merge(record: &mut Value, patch: &Map<String, Value>) {
    for (key, value) in patch {
        if !value.is_null() {
            record[key.as_str()] = value.clone();
        }
    }
}

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<LoginBody>) -> Response {
    if body.username == "slow" {
        state.slow_arrived.notify_one();
        if let Ok(permit) = state.slow_gate.acquire().await {
            permit.forget();
        }
    }
    if password_for(&body.username) != Some(body.password.as_str()) {
        return detail(StatusCode::UNAUTHORIZED, "Incorrect username or password");
    }

    let token = state.db.lock().unwrap().issue_token(&body.username);
    if body.username == "legacy" {
        return Json(json!({ "access_token": token, "token_type": "bearer" })).into_response();
    }
    Json(json!({
        "access_token": token,
        "token_type": "bearer",
        "user": user(&body.username),
    }))
    .into_response()
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let db = state.db.lock().unwrap();
    match db.authorize(&headers) {
        Ok(username) => Json(user(&username)).into_response(),
        Err(response) => response,
    }
}

async fn list_projects(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let db = state.db.lock().unwrap();
    if let Err(response) = db.authorize(&headers) {
        return response;
    }
    Json(db.projects.clone()).into_response()
}

async fn get_project(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let db = state.db.lock().unwrap();
    if let Err(response) = db.authorize(&headers) {
        return response;
    }
    match db.projects.iter().find(|p| p["id"] == id) {
        Some(project) => Json(project.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Project not found"),
    }
}

async fn create_project(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut db = state.db.lock().unwrap();
    if let Err(response) = db.authorize(&headers) {
        return response;
    }
    let Some(name) = body["name"].as_str().filter(|n| !n.is_empty()) else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "detail": [{ "loc": ["body", "name"], "msg": "field required" }]
            })),
        )
            .into_response();
    };
    let id = db.take_id();
    let record = project_record(id, name, body["description"].as_str());
    db.projects.push(record.clone());
    Json(record).into_response()
}

async fn update_project(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    let mut db = state.db.lock().unwrap();
    if let Err(response) = db.authorize(&headers) {
        return response;
    }
    match db.projects.iter_mut().find(|p| p["id"] == id) {
        Some(project) => {
            merge(project, &body);
            project["updated_at"] = json!(CREATED_AT);
            Json(project.clone()).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Project not found"),
    }
}

async fn delete_project(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut db = state.db.lock().unwrap();
    if let Err(response) = db.authorize(&headers) {
        return response;
    }
    let before = db.projects.len();
    db.projects.retain(|p| p["id"] != id);
    if db.projects.len() == before {
        return detail(StatusCode::NOT_FOUND, "Project not found");
    }
    db.tasks.retain(|t| t["project_id"] != id);
    Json(json!({ "message": "Project deleted successfully" })).into_response()
}

#[derive(Deserialize)]
struct TaskQuery {
    project_id: Option<i64>,
    status: Option<String>,
    skip: Option<usize>,
    limit: Option<usize>,
}

async fn list_tasks(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<TaskQuery>,
) -> Response {
    let db = state.db.lock().unwrap();
    if let Err(response) = db.authorize(&headers) {
        return response;
    }
    let tasks: Vec<Value> = db
        .tasks
        .iter()
        .filter(|t| query.project_id.is_none_or(|id| t["project_id"] == id))
        .filter(|t| {
            query
                .status
                .as_deref()
                .is_none_or(|status| t["status"] == status)
        })
        .skip(query.skip.unwrap_or(0))
        .take(query.limit.unwrap_or(100))
        .cloned()
        .collect();
    Json(tasks).into_response()
}

async fn get_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let db = state.db.lock().unwrap();
    if let Err(response) = db.authorize(&headers) {
        return response;
    }
    match db.tasks.iter().find(|t| t["id"] == id) {
        Some(task) => Json(task.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Task not found"),
    }
}

async fn create_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    let mut db = state.db.lock().unwrap();
    if let Err(response) = db.authorize(&headers) {
        return response;
    }
    let project_id = body.get("project_id").and_then(Value::as_i64).unwrap_or(0);
    if !db.projects.iter().any(|p| p["id"] == project_id) {
        return detail(StatusCode::NOT_FOUND, "Project not found");
    }
    let title = body.get("title").and_then(Value::as_str).unwrap_or("");
    let id = db.take_id();
    let mut record = task_record(id, title, project_id);
    merge(&mut record, &body);
    db.tasks.push(record.clone());
    Json(record).into_response()
}

async fn update_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    let mut db = state.db.lock().unwrap();
    if let Err(response) = db.authorize(&headers) {
        return response;
    }
    match db.tasks.iter_mut().find(|t| t["id"] == id) {
        Some(task) => {
            merge(task, &body);
            if task["status"] == "done" {
                task["completed_at"] = json!(CREATED_AT);
            }
            task["updated_at"] = json!(CREATED_AT);
            Json(task.clone()).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Task not found"),
    }
}

async fn delete_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut db = state.db.lock().unwrap();
    if let Err(response) = db.authorize(&headers) {
        return response;
    }
    let before = db.tasks.len();
    db.tasks.retain(|t| t["id"] != id);
    if db.tasks.len() == before {
        return detail(StatusCode::NOT_FOUND, "Task not found");
    }
    Json(json!({ "message": "Task deleted successfully" })).into_response()
}
