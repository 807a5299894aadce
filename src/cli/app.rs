//! Job application commands

use colored::Colorize;
use log::debug;

use crate::cli::{AppCommands, ApplicationFields, CommandContext, confirm_delete};
use crate::client::ApplicationApi;
use crate::client::models::{
    Application, ApplicationUpdate, NewApplication, STATUS_ORDER, group_by_status, resolve_status,
};
use crate::error::{Error, Result};
use crate::models::{ApplicationCard, ApplicationDetail, ApplicationDisplay};
use crate::output::board::print_board;
use crate::output::{Formattable, print_item};

pub async fn run(ctx: &CommandContext, command: AppCommands) -> Result<()> {
    match command {
        AppCommands::List { status, archived } => list(ctx, status.as_deref(), archived).await,
        AppCommands::Board { compact } => board(ctx, compact).await,
        AppCommands::Show { id } => show(ctx, &id).await,
        AppCommands::Add {
            company,
            position,
            status,
            fields,
            notes,
        } => add(ctx, company, position, &status, fields, notes).await,
        AppCommands::Update {
            id,
            company,
            position,
            status,
            fields,
        } => {
            let update = ApplicationUpdate {
                company,
                position,
                location: fields.location,
                url: fields.url,
                application_date: fields.date,
                status: status.as_deref().map(resolve_status),
                description: fields.description,
                ..Default::default()
            };
            update_fields(ctx, &id, &update).await
        }
        AppCommands::Move { id, status } => move_to(ctx, &id, &status).await,
        AppCommands::Note { id, text } => note(ctx, &id, &text).await,
        AppCommands::Archive { id, undo } => archive(ctx, &id, !undo).await,
        AppCommands::Delete { id, yes } => delete(ctx, &id, yes).await,
    }
}

async fn list(ctx: &CommandContext, status: Option<&str>, archived: bool) -> Result<()> {
    let status = status.map(resolve_status);
    debug!("Listing applications (status={:?}, archived={})", status, archived);

    let apps = ctx.client.list_applications(status.as_deref()).await?;
    let now = ctx.session().now();

    let rows: Vec<ApplicationDisplay> = apps
        .iter()
        .filter(|app| app.archived == archived)
        .map(|app| ApplicationDisplay::new(app, now))
        .collect();
    rows.print(ctx.format)
}

async fn board(ctx: &CommandContext, compact: bool) -> Result<()> {
    let apps: Vec<Application> = ctx
        .client
        .list_applications(None)
        .await?
        .into_iter()
        .filter(|app| !app.archived)
        .collect();
    let now = ctx.session().now();

    let columns: Vec<_> = group_by_status(apps, &STATUS_ORDER, compact, |app| app.status.as_str())
        .into_iter()
        .map(|column| column.map(|app| ApplicationCard::new(&app, now)))
        .collect();
    print_board(&columns, ctx.format)
}

async fn show(ctx: &CommandContext, id: &str) -> Result<()> {
    let app = ctx.client.get_application(id).await?;
    print_item(&ApplicationDetail::new(&app, ctx.session().now()), ctx.format)
}

async fn add(
    ctx: &CommandContext,
    company: String,
    position: String,
    status: &str,
    fields: ApplicationFields,
    notes: Vec<String>,
) -> Result<()> {
    let application_date = fields
        .date
        .unwrap_or_else(|| ctx.session().now().format("%Y-%m-%d").to_string());

    let new_app = NewApplication {
        company,
        position,
        location: fields.location,
        url: fields.url,
        application_date,
        status: resolve_status(status),
        description: fields.description,
        notes,
        archived: false,
    };

    let app = ctx.client.create_application(&new_app).await?;
    print_saved(ctx, "Created", &app)
}

async fn update_fields(ctx: &CommandContext, id: &str, update: &ApplicationUpdate) -> Result<()> {
    if update.is_empty() {
        return Err(Error::Other(
            "Nothing to update. Pass at least one field, see `jobtrack app update --help`."
                .to_string(),
        ));
    }
    let app = ctx.client.update_application(id, update).await?;
    print_saved(ctx, "Updated", &app)
}

async fn move_to(ctx: &CommandContext, id: &str, status: &str) -> Result<()> {
    let status = resolve_status(status);
    let app = ctx.client.move_application(id, &status).await?;
    print_saved(ctx, "Moved", &app)
}

async fn note(ctx: &CommandContext, id: &str, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::Other("Note text is empty".to_string()));
    }
    let app = ctx.client.add_note(id, text.trim()).await?;
    print_saved(ctx, "Noted", &app)
}

async fn archive(ctx: &CommandContext, id: &str, archived: bool) -> Result<()> {
    let app = ctx.client.set_archived(id, archived).await?;
    let verb = if archived { "Archived" } else { "Restored" };
    print_saved(ctx, verb, &app)
}

async fn delete(ctx: &CommandContext, id: &str, yes: bool) -> Result<()> {
    if !yes {
        let app = ctx.client.get_application(id).await?;
        let what = format!("application \"{} - {}\"", app.company, app.position);
        if !confirm_delete(&what, false)? {
            return Ok(());
        }
    }

    ctx.client.delete_application(id).await?;
    eprintln!("{} Deleted application {}", "✓".green(), id);
    Ok(())
}

/// Confirm a write, or print the saved record for scripts
fn print_saved(ctx: &CommandContext, verb: &str, app: &Application) -> Result<()> {
    match ctx.format {
        crate::cli::OutputFormat::Json => {
            print_item(&ApplicationDetail::new(app, ctx.session().now()), ctx.format)
        }
        crate::cli::OutputFormat::Table => {
            println!(
                "{} {} {} ({} - {}) [{}]",
                "✓".green(),
                verb,
                app.id.bold(),
                app.company,
                app.position,
                app.status.cyan()
            );
            Ok(())
        }
    }
}
