//! Account and session commands

use std::path::Path;

use colored::Colorize;
use dialoguer::{Input, Password, theme::ColorfulTheme};

use crate::cli::{CommandContext, OutputFormat};
use crate::client::AccountApi;
use crate::client::models::{NewUser, PasswordChange};
use crate::config::Config;
use crate::error::Result;
use crate::models::{SessionStatusDisplay, UserDisplay};
use crate::output::formatters::format_duration;
use crate::output::print_item;
use crate::session::{Session, SessionState, refresh_delay};

/// Environment variable read instead of prompting for the password
const PASSWORD_ENV: &str = "JOBTRACK_PASSWORD";

/// Sign in and store the token pair
pub async fn login(ctx: &CommandContext, username: Option<&str>) -> Result<()> {
    let theme = ColorfulTheme::default();

    let username = match username.or(ctx.config.username.as_deref()) {
        Some(name) => name.to_string(),
        None => Input::<String>::with_theme(&theme)
            .with_prompt("Username")
            .interact_text()?,
    };

    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => password,
        _ => Password::with_theme(&theme)
            .with_prompt(format!("Password for {}", username))
            .interact()?,
    };

    ctx.session().login(&username, &password).await?;

    // Reload so runtime overrides are not written back
    let mut config = Config::load_at(ctx.config_ref())?;
    if config.username.as_deref() != Some(username.as_str()) {
        config.username = Some(username.clone());
        config.save_at(ctx.config_ref())?;
    }

    println!("{} Logged in as {}", "✓".green(), username.bold());
    Ok(())
}

/// Clear both tokens
pub fn logout(ctx: &CommandContext) -> Result<()> {
    let was_signed_in = ctx.session().state() == SessionState::Active;
    ctx.session().logout()?;

    if was_signed_in {
        println!("{} Logged out", "✓".green());
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

/// Show what is stored locally, without contacting the API
pub fn status(ctx: &CommandContext) -> Result<()> {
    let display = session_status(ctx.session(), &ctx.config, &ctx.data_dir);

    if ctx.format == OutputFormat::Table {
        println!("{}\n", "JobTrack Session Status".bold());
    }
    print_item(&display, ctx.format)
}

fn session_status(session: &Session, config: &Config, data_dir: &Path) -> SessionStatusDisplay {
    let claims = session.claims();
    let has_access = session.access_token().is_some();
    let has_refresh = session.has_refresh_token();
    let now = session.now();

    let state = match (has_access, has_refresh) {
        (true, true) => "active",
        (false, true) => "renewable",
        (true, false) => "active (no refresh token)",
        (false, false) => "signed out",
    };

    let user = claims
        .as_ref()
        .and_then(|c| c.subject.clone())
        .or_else(|| config.username.clone())
        .unwrap_or_else(|| "--".to_string());

    let access_token = match (&claims, has_access) {
        (Some(c), _) if c.is_expired_at(now) => "expired",
        (Some(_), _) => "valid",
        (None, true) => "unreadable",
        (None, false) => "none",
    };

    let expires = claims
        .as_ref()
        .map(|c| c.expires_at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "--".to_string());

    let renewal = match &claims {
        Some(c) => match refresh_delay(c.expires_at, now, session.policy().refresh_threshold) {
            Some(delay) if delay.is_zero() => "due now".to_string(),
            Some(delay) => format!("in {}", format_duration(delay)),
            None if has_refresh => "on next request".to_string(),
            None => "--".to_string(),
        },
        None if has_refresh => "on next request".to_string(),
        None => "--".to_string(),
    };

    SessionStatusDisplay {
        state: state.to_string(),
        user,
        access_token: access_token.to_string(),
        expires,
        refresh_token: if has_refresh { "stored" } else { "none" }.to_string(),
        renewal,
        api_url: config.api_url.clone(),
        data_dir: data_dir.display().to_string(),
    }
}

/// Show the account behind the current session
pub async fn whoami(ctx: &CommandContext) -> Result<()> {
    let user = ctx.client.me().await?;
    print_item(&UserDisplay::from(&user), ctx.format)
}

/// Create an account interactively
pub async fn register(ctx: &CommandContext) -> Result<()> {
    let theme = ColorfulTheme::default();

    println!("{}\n", "Create a JobTrack account".bold());

    let username: String = Input::with_theme(&theme)
        .with_prompt("Username")
        .interact_text()?;
    let email: String = Input::with_theme(&theme)
        .with_prompt("Email")
        .interact_text()?;
    let full_name: String = Input::with_theme(&theme)
        .with_prompt("Full name (optional)")
        .allow_empty(true)
        .interact_text()?;
    let password = Password::with_theme(&theme)
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let new_user = NewUser {
        username,
        email,
        password,
        full_name: Some(full_name).filter(|name| !name.trim().is_empty()),
    };
    let user = ctx.client.register(&new_user).await?;

    println!(
        "{} Account {} created. Run {} to sign in.",
        "✓".green(),
        user.username.bold(),
        "jobtrack login".cyan()
    );
    Ok(())
}

/// Change the password of the signed-in account
pub async fn passwd(ctx: &CommandContext) -> Result<()> {
    let theme = ColorfulTheme::default();

    let current_password = Password::with_theme(&theme)
        .with_prompt("Current password")
        .interact()?;
    let new_password = Password::with_theme(&theme)
        .with_prompt("New password")
        .with_confirmation("Confirm new password", "Passwords do not match")
        .interact()?;

    ctx.client
        .change_password(&PasswordChange {
            current_password,
            new_password,
        })
        .await?;

    println!("{} Password changed", "✓".green());
    Ok(())
}
