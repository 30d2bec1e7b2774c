//! `taskdesk projects`: list, show, create, update, delete.

use anyhow::Result;

use super::super::ProjectsCommands;
use super::{confirm_delete, view_result};
use taskdesk::app::App;
use taskdesk::guard::Route;
use taskdesk::models::ProjectUpdate;
use taskdesk::ui::{LoadingIndicator, icons};
use taskdesk::views::{ProjectsView, render_project};

pub async fn cmd_projects(app: &App, command: ProjectsCommands) -> Result<()> {
    app.enter(Route::Projects).await?;
    let api = app.api();
    let mut view = ProjectsView::new();

    match command {
        ProjectsCommands::List => {
            let indicator = LoadingIndicator::start("Loading projects...");
            view.load(api).await;
            indicator.finish();
            println!("{}", view.render());
            view_result(view.error(), "load projects")?;
        }
        ProjectsCommands::Show { id } => {
            let project = api
                .get_project(id)
                .await
                .map_err(|e| {
                    anyhow::anyhow!("Failed to load project {}: {}", id, e.user_message())
                })?;
            println!("{}", render_project(&project));
        }
        ProjectsCommands::Create { name, description } => {
            view.toggle_form();
            if let Some(form) = view.form_mut() {
                form.name = name;
                form.description = description.unwrap_or_default();
            }
            match view.submit(api).await {
                Some(project) => println!(
                    "{}Created project {} (#{})",
                    icons::CHECK,
                    project.name,
                    project.id
                ),
                None => view_result(view.error(), "create project")?,
            }
        }
        ProjectsCommands::Update {
            id,
            name,
            description,
            active,
        } => {
            let update = ProjectUpdate {
                name,
                description,
                is_active: active,
            };
            match view.update(api, id, &update).await {
                Some(project) => println!(
                    "{}Updated project {} (#{})",
                    icons::CHECK,
                    project.name,
                    project.id
                ),
                None => view_result(view.error(), "update project")?,
            }
        }
        ProjectsCommands::Delete { id, force } => {
            if !confirm_delete(&format!("project #{}", id), force) {
                println!("Cancelled.");
                return Ok(());
            }
            if view.delete(api, id).await {
                println!("{}Deleted project #{}", icons::CHECK, id);
            } else {
                view_result(view.error(), "delete project")?;
            }
        }
    }

    Ok(())
}
