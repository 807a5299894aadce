//! Interactive shell
//!
//! Keeps one session alive across commands. Every line typed counts as user
//! activity, the proactive refresh is armed for the stored token, and the
//! shell exits as soon as the session ends (idle logout or failed renewal).

use std::io::{BufRead, Write};

use clap::Parser;
use colored::Colorize;
use tokio::sync::mpsc;

use crate::cli::{Cli, CommandContext, Commands, dispatch};
use crate::error::{ApiError, Result};
use crate::output::formatters::format_duration;
use crate::session::{ActivityFeed, ActivityKind, Session, SessionState};

/// What a typed line asks for
#[derive(Debug, PartialEq, Eq)]
enum LineAction {
    Empty,
    Exit,
    Run(Vec<String>),
}

pub async fn run(ctx: &CommandContext) -> Result<()> {
    let session = ctx.session().clone();
    resume(&session).await?;
    if let Some(due) = session.armed_refresh_at() {
        log::debug!("Next token renewal at {}", due);
    }

    let (feed, events) = ActivityFeed::channel();
    let tracking = session.track_activity(events);
    let mut state = session.subscribe();

    println!(
        "{} Type {} for commands, {} to leave. Idle sessions end after {}.",
        "JobTrack shell.".bold(),
        "help".cyan(),
        "exit".cyan(),
        format_duration(session.policy().inactivity_timeout)
    );
    print_prompt();

    let mut lines = read_lines();
    let outcome = loop {
        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let current = state.borrow_and_update().clone();
                if let Some(outcome) = finished(&current) {
                    break outcome;
                }
            }
            line = lines.recv() => {
                let line = match line {
                    Some(Ok(line)) => line,
                    Some(Err(e)) => break Err(e.into()),
                    None => break Ok(()),
                };
                feed.emit(ActivityKind::KeyPress);

                match classify(&line) {
                    Ok(LineAction::Empty) => {}
                    Ok(LineAction::Exit) => break Ok(()),
                    Ok(LineAction::Run(args)) => execute(ctx, args).await,
                    Err(e) => eprintln!("{} {}", "Error:".red(), e),
                }

                // A command may have ended the session; leave before waiting
                // on the next line.
                if let Some(outcome) = finished(&session.state()) {
                    break outcome;
                }
                print_prompt();
            }
        }
    };

    tracking.stop();
    outcome
}

/// Read stdin on a plain thread.
///
/// A pending read there does not hold up runtime shutdown when the shell
/// exits on a session change.
fn read_lines() -> mpsc::UnboundedReceiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// How the shell ends for a session state, or `None` to keep going
fn finished(state: &SessionState) -> Option<Result<()>> {
    match state {
        SessionState::Active => None,
        SessionState::SignedOut => {
            println!("Signed out.");
            Some(Ok(()))
        }
        SessionState::Ended(_) => Some(Err(ApiError::SessionExpired.into())),
    }
}

/// Make sure there is a usable access token and renewal is armed
async fn resume(session: &Session) -> Result<()> {
    let armed = session.access_token().is_some() && session.setup_token_refresh().is_some();
    if armed {
        return Ok(());
    }
    if !session.has_refresh_token() {
        return Err(ApiError::Unauthorized.into());
    }

    log::debug!("No usable access token, renewing before starting the shell");
    match session.renew().await {
        Ok(_) => Ok(()),
        Err(e) => {
            log::debug!("Renewal at shell start failed: {}", e);
            Err(ApiError::SessionExpired.into())
        }
    }
}

async fn execute(ctx: &CommandContext, args: Vec<String>) {
    let format_given = args
        .iter()
        .any(|arg| arg == "--format" || arg.starts_with("--format="));

    let cli = match Cli::try_parse_from(std::iter::once("jobtrack".to_string()).chain(args)) {
        Ok(cli) => cli,
        Err(e) => {
            // Covers `help` and `--help` as well as usage errors
            let _ = e.print();
            return;
        }
    };

    let ctx = if format_given {
        ctx.with_format(cli.format)
    } else {
        ctx.clone()
    };

    let result = match cli.command {
        Commands::Login { .. } => {
            eprintln!("Already signed in. Run `logout` first, then `jobtrack login`.");
            return;
        }
        Commands::Shell => {
            eprintln!("Already in a shell.");
            return;
        }
        Commands::Completion { .. } => {
            eprintln!("Run `jobtrack completion` outside the shell.");
            return;
        }
        Commands::Version => {
            println!("jobtrack version {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        command => dispatch(&ctx, command).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red(), e);
    }
}

fn print_prompt() {
    print!("{} ", "jobtrack>".cyan().bold());
    let _ = std::io::stdout().flush();
}

fn classify(line: &str) -> std::result::Result<LineAction, String> {
    let args = split_line(line)?;
    match args.first().map(String::as_str) {
        None => Ok(LineAction::Empty),
        Some("exit") | Some("quit") => Ok(LineAction::Exit),
        Some(_) => Ok(LineAction::Run(args)),
    }
}

/// Split a line into words, honouring single quotes, double quotes and
/// backslash escapes.
fn split_line(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') | (None, '\\') => match chars.next() {
                Some(escaped) => {
                    current.push(escaped);
                    in_word = true;
                }
                None => return Err("trailing backslash".to_string()),
            },
            (Some(_), c) => current.push(c),
            (None, '"') | (None, '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("unterminated {} quote", q));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::session::test_support::harness;

    #[test]
    fn test_split_line_quotes() {
        assert_eq!(
            split_line(r#"app add "Acme Corp" 'Backend Dev' --note it\'s"#).unwrap(),
            vec!["app", "add", "Acme Corp", "Backend Dev", "--note", "it's"]
        );
        assert_eq!(
            split_line(r#"app note a1 "say \"hi\"""#).unwrap(),
            vec!["app", "note", "a1", "say \"hi\""]
        );
        assert_eq!(split_line("  task   list  ").unwrap(), vec!["task", "list"]);
        assert_eq!(split_line(r#"app note a1 """#).unwrap(), vec!["app", "note", "a1", ""]);
    }

    #[test]
    fn test_split_line_errors() {
        assert!(split_line(r#"app add "Acme"#).is_err());
        assert!(split_line("app add Acme\\").is_err());
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("   ").unwrap(), LineAction::Empty);
        assert_eq!(classify("exit").unwrap(), LineAction::Exit);
        assert_eq!(classify("quit").unwrap(), LineAction::Exit);
        assert_eq!(
            classify("app list --archived").unwrap(),
            LineAction::Run(vec!["app".into(), "list".into(), "--archived".into()])
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_follows_session_state() {
        let h = harness(Duration::from_secs(3600));
        h.session.login("alice", "secret").await.unwrap();
        assert!(finished(&h.session.state()).is_none());

        h.session.logout().unwrap();
        assert!(matches!(finished(&h.session.state()), Some(Ok(()))));

        h.session.login("alice", "secret").await.unwrap();
        h.session.expire(crate::session::LogoutReason::Expired);
        let outcome = finished(&h.session.state()).unwrap();
        assert!(outcome.unwrap_err().to_string().contains("Session expired"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_requires_tokens() {
        let h = harness(Duration::from_secs(3600));
        let err = resume(&h.session).await.unwrap_err();
        assert!(err.to_string().contains("Not logged in"));
        assert_eq!(h.auth.refresh_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_arms_refresh_for_valid_token() {
        let h = harness(Duration::from_secs(3600));
        h.session.login("alice", "secret").await.unwrap();

        resume(&h.session).await.unwrap();

        assert!(h.session.armed_refresh_at().is_some());
        assert_eq!(h.auth.refresh_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_renews_from_refresh_token() {
        let h = harness(Duration::from_secs(3600));
        h.store.set_refresh_token("refresh-0").unwrap();

        resume(&h.session).await.unwrap();

        assert_eq!(h.auth.refresh_calls(), 1);
        assert_eq!(h.auth.last_refresh_token().as_deref(), Some("refresh-0"));
        assert!(h.session.access_token().is_some());
        assert!(h.session.armed_refresh_at().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_rejected_renewal_ends_session() {
        let h = harness(Duration::from_secs(3600));
        h.store.set_refresh_token("refresh-0").unwrap();
        h.auth.reject_refresh();

        let err = resume(&h.session).await.unwrap_err();

        assert!(err.to_string().contains("Session expired"));
        assert_eq!(h.navigator.routes(), vec!["/auth/login?session=expired"]);
        assert!(h.store.refresh_token().is_none());
    }
}
