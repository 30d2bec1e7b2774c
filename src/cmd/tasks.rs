//! `taskdesk tasks`: list, show, create, status, update, delete.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use super::super::TasksCommands;
use super::{confirm_delete, view_result};
use taskdesk::app::App;
use taskdesk::guard::Route;
use taskdesk::models::{TaskFilter, TaskPriority, TaskStatus, TaskUpdate, due_date_from_day};
use taskdesk::ui::{LoadingIndicator, icons};
use taskdesk::views::{TasksView, render_task};

pub async fn cmd_tasks(app: &App, command: TasksCommands) -> Result<()> {
    app.enter(Route::Tasks).await?;
    let api = app.api();

    match command {
        TasksCommands::List { project, status } => {
            let filter = TaskFilter {
                project_id: project,
                status: status.as_deref().map(parse_status).transpose()?,
                ..TaskFilter::default()
            };
            let mut view = TasksView::new(filter);
            let indicator = LoadingIndicator::start("Loading tasks...");
            view.load(api).await;
            indicator.finish();
            println!("{}", view.render());
            view_result(view.error(), "load tasks")?;
        }
        TasksCommands::Show { id } => {
            let task = api
                .get_task(id)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to load task {}: {}", id, e.user_message()))?;
            let project = api.get_project(task.project_id).await.ok();
            println!(
                "{}",
                render_task(&task, project.as_ref().map(|p| p.name.as_str()))
            );
        }
        TasksCommands::Create {
            title,
            project,
            description,
            priority,
            assignee,
            due,
        } => {
            let priority = priority.as_deref().map(parse_priority).transpose()?;
            let due_date = due.as_deref().map(parse_day).transpose()?;

            let mut view = TasksView::default();
            view.toggle_form();
            if let Some(form) = view.form_mut() {
                form.title = title;
                form.description = description.unwrap_or_default();
                form.project_id = Some(project);
                form.assigned_to_id = assignee;
                form.priority = priority.unwrap_or_default();
                form.due_date = due_date;
            }
            match view.submit(api).await {
                Some(task) => {
                    println!("{}Created task {} (#{})", icons::CHECK, task.title, task.id)
                }
                None => view_result(view.error(), "create task")?,
            }
        }
        TasksCommands::Status { id, status } => {
            let status = parse_status(&status)?;
            let mut view = TasksView::default();
            match view.change_status(api, id, status).await {
                Some(task) => println!("{}Task #{} is now {}", icons::CHECK, task.id, task.status),
                None => view_result(view.error(), "update task")?,
            }
        }
        TasksCommands::Update {
            id,
            title,
            description,
            status,
            priority,
            assignee,
            due,
        } => {
            let update = TaskUpdate {
                title,
                description,
                status: status.as_deref().map(parse_status).transpose()?,
                priority: priority.as_deref().map(parse_priority).transpose()?,
                due_date: due
                    .as_deref()
                    .map(parse_day)
                    .transpose()?
                    .map(due_date_from_day),
                assigned_to_id: assignee,
            };
            let mut view = TasksView::default();
            match view.update(api, id, &update).await {
                Some(task) => {
                    println!("{}Updated task {} (#{})", icons::CHECK, task.title, task.id)
                }
                None => view_result(view.error(), "update task")?,
            }
        }
        TasksCommands::Delete { id, force } => {
            if !confirm_delete(&format!("task #{}", id), force) {
                println!("Cancelled.");
                return Ok(());
            }
            let mut view = TasksView::default();
            if view.delete(api, id).await {
                println!("{}Deleted task #{}", icons::CHECK, id);
            } else {
                view_result(view.error(), "delete task")?;
            }
        }
    }

    Ok(())
}

fn parse_status(raw: &str) -> Result<TaskStatus> {
    raw.parse::<TaskStatus>().map_err(anyhow::Error::msg)
}

fn parse_priority(raw: &str) -> Result<TaskPriority> {
    raw.parse::<TaskPriority>().map_err(anyhow::Error::msg)
}

fn parse_day(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid due date '{}'. Expected YYYY-MM-DD", raw))
}
