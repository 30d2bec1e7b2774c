use console::style;

use super::{format_date, surface};
use crate::api::ApiClient;
use crate::errors::ClientError;
use crate::models::{NewProject, Project, ProjectUpdate};
use crate::ui::{error_banner, heading, icons};

/// Contents of the "Add Project" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectForm {
    pub name: String,
    pub description: String,
}

impl ProjectForm {
    pub fn to_payload(&self) -> Result<NewProject, ClientError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ClientError::Validation("Project name is required".into()));
        }
        let description = self.description.trim();
        Ok(NewProject {
            name: name.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
        })
    }
}

#[derive(Debug)]
pub struct ProjectsView {
    projects: Vec<Project>,
    loading: bool,
    error: Option<String>,
    form: Option<ProjectForm>,
}

impl Default for ProjectsView {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectsView {
    pub fn new() -> Self {
        Self {
            projects: Vec::new(),
            loading: true,
            error: None,
            form: None,
        }
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

    /// "Add Project" / "Cancel". Closing discards whatever was typed.
    pub fn toggle_form(&mut self) {
        self.form = match self.form {
            Some(_) => None,
            None => Some(ProjectForm::default()),
        };
    }

    pub fn form_mut(&mut self) -> Option<&mut ProjectForm> {
        self.form.as_mut()
    }

    pub async fn load(&mut self, api: &ApiClient) {
        match api.list_projects().await {
            Ok(projects) => {
                self.projects = projects;
                self.error = None;
            }
            Err(e) => self.error = Some(surface("fetching projects", &e)),
        }
        self.loading = false;
    }

    /// Create a project from the open form. On success the form is reset and
    /// closed, and the list refreshed.
    pub async fn submit(&mut self, api: &ApiClient) -> Option<Project> {
        let payload = match self.form.as_ref() {
            Some(form) => form.to_payload(),
            None => Err(ClientError::Validation("Open the project form first".into())),
        };
        let payload = match payload {
            Ok(payload) => payload,
            Err(e) => {
                self.error = Some(e.user_message());
                return None;
            }
        };

        match api.create_project(&payload).await {
            Ok(project) => {
                tracing::info!(id = project.id, name = %project.name, "project created");
                self.form = None;
                self.load(api).await;
                Some(project)
            }
            Err(e) => {
                self.error = Some(surface("creating project", &e));
                None
            }
        }
    }

    pub async fn update(
        &mut self,
        api: &ApiClient,
        id: i64,
        update: &ProjectUpdate,
    ) -> Option<Project> {
        if update.is_empty() {
            self.error = Some("Nothing to update".to_string());
            return None;
        }
        match api.update_project(id, update).await {
            Ok(project) => {
                self.load(api).await;
                Some(project)
            }
            Err(e) => {
                self.error = Some(surface("updating project", &e));
                None
            }
        }
    }

    pub async fn delete(&mut self, api: &ApiClient, id: i64) -> bool {
        match api.delete_project(id).await {
            Ok(()) => {
                tracing::info!(id, "project deleted");
                self.load(api).await;
                true
            }
            Err(e) => {
                self.error = Some(surface("deleting project", &e));
                false
            }
        }
    }

    pub fn render(&self) -> String {
        if self.loading {
            return "Loading projects...".to_string();
        }

        let mut out = vec![heading("Projects"), String::new()];
        if let Some(error) = &self.error {
            out.push(error_banner(error));
            out.push(String::new());
        }

        if self.projects.is_empty() {
            out.push("No projects found. Create your first project!".to_string());
            out.push(format!(
                "Run {} to add one.",
                style("taskdesk projects create --name <NAME>").cyan()
            ));
            return out.join("\n");
        }

        for project in &self.projects {
            out.push(render_project(project));
            out.push(String::new());
        }
        out.pop();
        out.join("\n")
    }
}

/// One project card: name, description, and creation date.
pub fn render_project(project: &Project) -> String {
    let mut lines = vec![format!(
        "{}{} {}",
        icons::FOLDER,
        style(&project.name).bold(),
        style(format!("#{}", project.id)).dim()
    )];
    if !project.is_active {
        lines[0].push_str(&format!(" {}", style("(inactive)").yellow()));
    }
    let description = project
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or("No description");
    lines.push(format!("   {}", description));
    lines.push(format!(
        "   {}",
        style(format!(
            "Created: {}",
            format_date(project.created_at.as_ref())
        ))
        .dim()
    ));
    lines.join("\n")
}
