//! User management commands

use colored::Colorize;

use crate::cli::{CommandContext, OutputFormat, UserCommands, confirm_delete};
use crate::client::UserApi;
use crate::client::models::{User, UserUpdate};
use crate::error::{Error, Result};
use crate::models::UserDisplay;
use crate::output::{Formattable, print_item};

pub async fn run(ctx: &CommandContext, command: UserCommands) -> Result<()> {
    match command {
        UserCommands::List => list(ctx).await,
        UserCommands::Show { id } => {
            let user = ctx.client.get_user(&id).await?;
            print_item(&UserDisplay::from(&user), ctx.format)
        }
        UserCommands::Update {
            id,
            username,
            email,
            name,
        } => {
            let update = UserUpdate {
                username,
                email,
                full_name: name,
            };
            if update.is_empty() {
                return Err(Error::Other(
                    "Nothing to update. Pass at least one field, see `jobtrack user update --help`."
                        .to_string(),
                ));
            }
            let user = ctx.client.update_user(&id, &update).await?;
            print_saved(ctx, &user)
        }
        UserCommands::Delete { id, yes } => {
            if !yes {
                let user = ctx.client.get_user(&id).await?;
                let what = format!("account \"{}\" and all of its applications", user.username);
                if !confirm_delete(&what, false)? {
                    return Ok(());
                }
            }
            ctx.client.delete_user(&id).await?;
            eprintln!("{} Deleted account {}", "✓".green(), id);
            Ok(())
        }
    }
}

/// List every account (requires an admin session)
async fn list(ctx: &CommandContext) -> Result<()> {
    let users = ctx.client.list_users().await?;
    log::debug!("Fetched {} users", users.len());

    let rows: Vec<UserDisplay> = users.iter().map(UserDisplay::from).collect();
    rows.print(ctx.format)
}

fn print_saved(ctx: &CommandContext, user: &User) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => print_item(&UserDisplay::from(user), ctx.format),
        OutputFormat::Table => {
            println!(
                "{} Updated {} ({})",
                "✓".green(),
                user.username.bold(),
                user.email
            );
            Ok(())
        }
    }
}
