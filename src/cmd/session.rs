//! Session commands: `taskdesk login`, `logout`, `whoami`.

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Password};

use taskdesk::app::App;
use taskdesk::login::{LoginFlow, SubmitResult};
use taskdesk::ui::{LoadingIndicator, icons};

pub async fn cmd_login(app: &App, username: Option<&str>, password: Option<&str>) -> Result<()> {
    app.recover().await;
    if let Some(identity) = app.session().identity() {
        println!(
            "{}Already logged in as {}. Run 'taskdesk logout' to switch users.",
            icons::USER,
            style(identity.display_name()).bold()
        );
        return Ok(());
    }

    let username = match username {
        Some(u) => u.to_string(),
        None => Input::new()
            .with_prompt("Username")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read username")?,
    };
    let password = match password {
        Some(p) => p.to_string(),
        None => Password::new()
            .with_prompt("Password")
            .allow_empty_password(true)
            .interact()
            .context("Failed to read password")?,
    };

    let flow = LoginFlow::new(app.session().clone());
    let indicator = LoadingIndicator::start("Signing in...");
    let result = flow.submit(&username, &password).await;
    indicator.finish();

    match result {
        SubmitResult::LoggedIn(identity) => {
            println!(
                "{}Logged in as {}",
                icons::CHECK,
                style(identity.display_name()).green().bold()
            );
            Ok(())
        }
        SubmitResult::Rejected(reason) | SubmitResult::Invalid(reason) => {
            anyhow::bail!("{}", reason)
        }
        SubmitResult::Busy | SubmitResult::Discarded => {
            anyhow::bail!("Login was interrupted before the server answered")
        }
    }
}

pub async fn cmd_logout(app: &App) -> Result<()> {
    app.session().logout();
    println!("{}Logged out.", icons::LOCK);
    Ok(())
}

pub async fn cmd_whoami(app: &App) -> Result<()> {
    app.recover().await;
    let Some(identity) = app.session().identity() else {
        anyhow::bail!("Not logged in. Run `taskdesk login` first.");
    };

    println!("{}{}", icons::USER, style(identity.display_name()).bold());
    println!("  Username: {}", identity.username);
    if let Some(email) = &identity.email {
        println!("  Email:    {}", email);
    }
    if let Some(role) = identity.role {
        println!("  Role:     {}", role.as_str());
    }
    println!("  Server:   {}", app.config().api_url());
    Ok(())
}
