//! Task commands

use colored::Colorize;

use crate::cli::{CommandContext, OutputFormat, TaskCommands, confirm_delete};
use crate::client::TaskApi;
use crate::client::models::{NewTask, Task, TaskStatus, TaskUpdate, group_by_status};
use crate::error::{Error, Result};
use crate::models::{TaskCard, TaskDisplay};
use crate::output::board::print_board;
use crate::output::{Formattable, print_item};

pub async fn run(ctx: &CommandContext, command: TaskCommands) -> Result<()> {
    match command {
        TaskCommands::List { status } => list(ctx, status).await,
        TaskCommands::Board => board(ctx).await,
        TaskCommands::Add {
            title,
            description,
            status,
            due,
            application,
        } => {
            let new_task = NewTask {
                title,
                description,
                status,
                due_date: due,
                application_id: application,
            };
            let task = ctx.client.create_task(&new_task).await?;
            print_saved(ctx, "Created", &task)
        }
        TaskCommands::Move { id, status } => {
            let task = ctx.client.move_task(&id, status).await?;
            print_saved(ctx, "Moved", &task)
        }
        TaskCommands::Update {
            id,
            title,
            description,
            due,
            application,
        } => {
            let update = TaskUpdate {
                title,
                description,
                due_date: due,
                application_id: application,
                ..Default::default()
            };
            if update.is_empty() {
                return Err(Error::Other(
                    "Nothing to update. Pass at least one field, see `jobtrack task update --help`."
                        .to_string(),
                ));
            }
            let task = ctx.client.update_task(&id, &update).await?;
            print_saved(ctx, "Updated", &task)
        }
        TaskCommands::Delete { id, yes } => {
            if !yes {
                let task = ctx.client.get_task(&id).await?;
                if !confirm_delete(&format!("task \"{}\"", task.title), false)? {
                    return Ok(());
                }
            }
            ctx.client.delete_task(&id).await?;
            eprintln!("{} Deleted task {}", "✓".green(), id);
            Ok(())
        }
    }
}

async fn list(ctx: &CommandContext, status: Option<TaskStatus>) -> Result<()> {
    let tasks = ctx.client.list_tasks().await?;
    let rows: Vec<TaskDisplay> = tasks
        .iter()
        .filter(|task| status.is_none_or(|s| task.status == s.label()))
        .map(TaskDisplay::from)
        .collect();
    rows.print(ctx.format)
}

async fn board(ctx: &CommandContext) -> Result<()> {
    let tasks = ctx.client.list_tasks().await?;
    let order = TaskStatus::ALL.map(|s| s.label());

    let columns: Vec<_> = group_by_status(tasks, &order, false, |task| task.status.as_str())
        .into_iter()
        .map(|column| column.map(|task| TaskCard::from(&task)))
        .collect();
    print_board(&columns, ctx.format)
}

fn print_saved(ctx: &CommandContext, verb: &str, task: &Task) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => print_item(&TaskDisplay::from(task), ctx.format),
        OutputFormat::Table => {
            println!(
                "{} {} {} \"{}\" [{}]",
                "✓".green(),
                verb,
                task.id.bold(),
                task.title,
                task.status.cyan()
            );
            Ok(())
        }
    }
}
