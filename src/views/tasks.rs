use chrono::NaiveDate;
use console::{StyledObject, style};

use super::{format_date, surface};
use crate::api::ApiClient;
use crate::errors::ClientError;
use crate::models::{
    NewTask, Project, Task, TaskFilter, TaskPriority, TaskStatus, TaskUpdate, due_date_from_day,
};
use crate::ui::{error_banner, heading, icons};

/// Contents of the "Add Task" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub project_id: Option<i64>,
    pub assigned_to_id: Option<i64>,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
}

impl TaskForm {
    pub fn to_payload(&self) -> Result<NewTask, ClientError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ClientError::Validation("Task title is required".into()));
        }
        let project_id = self
            .project_id
            .ok_or_else(|| ClientError::Validation("Select a project for the task".into()))?;
        let description = self.description.trim();
        Ok(NewTask {
            title: title.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            project_id,
            assigned_to_id: self.assigned_to_id,
            priority: self.priority,
            due_date: self.due_date.map(due_date_from_day),
        })
    }
}

#[derive(Debug)]
pub struct TasksView {
    tasks: Vec<Task>,
    projects: Vec<Project>,
    filter: TaskFilter,
    loading: bool,
    error: Option<String>,
    form: Option<TaskForm>,
}

impl Default for TasksView {
    fn default() -> Self {
        Self::new(TaskFilter::default())
    }
}

impl TasksView {
    pub fn new(filter: TaskFilter) -> Self {
        Self {
            tasks: Vec::new(),
            projects: Vec::new(),
            filter,
            loading: true,
            error: None,
            form: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_form_open(&self) -> bool {
        self.form.is_some()
    }

    pub fn toggle_form(&mut self) {
        self.form = match self.form {
            Some(_) => None,
            None => Some(TaskForm::default()),
        };
    }

    pub fn form_mut(&mut self) -> Option<&mut TaskForm> {
        self.form.as_mut()
    }

    pub fn project_name(&self, project_id: i64) -> Option<&str> {
        self.projects
            .iter()
            .find(|p| p.id == project_id)
            .map(|p| p.name.as_str())
    }

    /// Fetch tasks (with the current filter) and the projects used for name
    /// lookup and the project picker.
    pub async fn load(&mut self, api: &ApiClient) {
        let result = tokio::try_join!(api.list_tasks(&self.filter), api.list_projects());
        match result {
            Ok((tasks, projects)) => {
                self.tasks = tasks;
                self.projects = projects;
                self.error = None;
            }
            Err(e) => self.error = Some(surface("fetching tasks", &e)),
        }
        self.loading = false;
    }

    pub async fn submit(&mut self, api: &ApiClient) -> Option<Task> {
        let payload = match self.form.as_ref() {
            Some(form) => form.to_payload(),
            None => Err(ClientError::Validation("Open the task form first".into())),
        };
        let payload = match payload {
            Ok(payload) => payload,
            Err(e) => {
                self.error = Some(e.user_message());
                return None;
            }
        };

        match api.create_task(&payload).await {
            Ok(task) => {
                tracing::info!(id = task.id, title = %task.title, "task created");
                self.form = None;
                self.load(api).await;
                Some(task)
            }
            Err(e) => {
                self.error = Some(surface("creating task", &e));
                None
            }
        }
    }

    pub async fn change_status(
        &mut self,
        api: &ApiClient,
        id: i64,
        status: TaskStatus,
    ) -> Option<Task> {
        self.update(api, id, &TaskUpdate::status(status)).await
    }

    pub async fn update(&mut self, api: &ApiClient, id: i64, update: &TaskUpdate) -> Option<Task> {
        if update.is_empty() {
            self.error = Some("Nothing to update".to_string());
            return None;
        }
        match api.update_task(id, update).await {
            Ok(task) => {
                self.load(api).await;
                Some(task)
            }
            Err(e) => {
                self.error = Some(surface("updating task", &e));
                None
            }
        }
    }

    pub async fn delete(&mut self, api: &ApiClient, id: i64) -> bool {
        match api.delete_task(id).await {
            Ok(()) => {
                tracing::info!(id, "task deleted");
                self.load(api).await;
                true
            }
            Err(e) => {
                self.error = Some(surface("deleting task", &e));
                false
            }
        }
    }

    pub fn render(&self) -> String {
        if self.loading {
            return "Loading tasks...".to_string();
        }

        let mut out = vec![heading("Tasks"), String::new()];
        if let Some(error) = &self.error {
            out.push(error_banner(error));
            out.push(String::new());
        }

        if self.tasks.is_empty() {
            out.push("No tasks found. Create your first task!".to_string());
            return out.join("\n");
        }

        for task in &self.tasks {
            out.push(self.render_task(task));
            out.push(String::new());
        }
        out.pop();
        out.join("\n")
    }

    pub fn render_task(&self, task: &Task) -> String {
        render_task(task, self.project_name(task.project_id))
    }
}

/// One task card. `project_name` falls back to the project id.
pub fn render_task(task: &Task, project_name: Option<&str>) -> String {
    let project = project_name
        .map(str::to_string)
        .unwrap_or_else(|| format!("project #{}", task.project_id));

    let mut lines = vec![format!(
        "{}{} {}  [{}] [{}]",
        icons::TASK,
        style(&task.title).bold(),
        style(format!("#{}", task.id)).dim(),
        status_style(task.status),
        priority_style(task.priority),
    )];
    if let Some(description) = task.description.as_deref().filter(|d| !d.trim().is_empty()) {
        lines.push(format!("   {}", description));
    }

    let mut meta = vec![format!("Project: {}", project)];
    if let Some(assignee) = task.assigned_to_id {
        meta.push(format!("Assignee: #{}", assignee));
    }
    if task.due_date.is_some() {
        meta.push(format!("Due: {}", format_date(task.due_date.as_ref())));
    }
    if task.status == TaskStatus::Done && task.completed_at.is_some() {
        meta.push(format!(
            "Completed: {}",
            format_date(task.completed_at.as_ref())
        ));
    }
    lines.push(format!("   {}", style(meta.join(" | ")).dim()));
    lines.join("\n")
}

fn status_style(status: TaskStatus) -> StyledObject<&'static str> {
    let label = style(status.as_str());
    match status {
        TaskStatus::Todo => label.white(),
        TaskStatus::InProgress => label.blue(),
        TaskStatus::Review => label.yellow(),
        TaskStatus::Done => label.green(),
    }
}

fn priority_style(priority: TaskPriority) -> StyledObject<&'static str> {
    let label = style(priority.as_str());
    match priority {
        TaskPriority::Low => label.dim(),
        TaskPriority::Medium => label.yellow(),
        TaskPriority::High => label.color256(208),
        TaskPriority::Urgent => label.red().bold(),
    }
}
