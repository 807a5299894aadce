//! Command execution context
//!
//! Provides a unified context for command execution, eliminating boilerplate
//! for config loading, token storage and client initialization.

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::{AuthClient, JobTrackClient};
use crate::config::Config;
use crate::error::Result;
use crate::session::{LoginRedirect, Navigator, Session, SessionPolicy, TokenStore};

/// Context for command execution containing config, client, and runtime options.
///
/// Cloning is cheap: the session and the HTTP client are shared.
#[derive(Clone)]
pub struct CommandContext {
    /// Loaded configuration with runtime overrides applied
    pub config: Config,
    /// Config file location, used when saving the remembered username
    pub config_path: Option<String>,
    /// API client bound to the session
    pub client: JobTrackClient,
    /// Output format preference
    pub format: OutputFormat,
    /// Directory holding the cookie jar and local storage
    pub data_dir: PathBuf,
}

impl CommandContext {
    /// Create a new command context.
    ///
    /// Opens the token store but performs no network call; commands that
    /// need a session fail on their first request when none is stored.
    ///
    /// # Errors
    /// Returns error if the config cannot be loaded or the token store
    /// cannot be opened.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let mut config = Config::load_at(opts.config_ref())?;
        if let Some(url) = opts.api_url_ref() {
            config = config.with_api_url(url)?;
        }

        let data_dir = config.data_dir()?;
        log::debug!("Using data directory {}", data_dir.display());

        let store = TokenStore::open(&data_dir, config.session.access_token_ttl())?;
        let auth = AuthClient::new(&config.api_url, config.request_timeout())?;
        let session = Session::builder(store, Arc::new(auth))
            .navigator(Arc::new(TerminalNavigator))
            .policy(SessionPolicy::from(&config.session))
            .build();

        let client = JobTrackClient::new(&config.api_url, config.request_timeout(), session)?;

        Ok(Self {
            config,
            config_path: opts.config.clone(),
            client,
            format: opts.format,
            data_dir,
        })
    }

    /// Same context with a different output format
    pub fn with_format(&self, format: OutputFormat) -> Self {
        Self {
            format,
            ..self.clone()
        }
    }

    pub fn session(&self) -> &Session {
        self.client.session()
    }

    pub fn config_ref(&self) -> Option<&str> {
        self.config_path.as_deref()
    }
}

/// Tells the user to sign in again when the session ends
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect(&self, to: &LoginRedirect) {
        log::debug!("Login redirect: {}", to.route());
        eprintln!(
            "\n{} Your session has ended ({}). Run {} to sign in again.",
            "⚠".yellow(),
            to.route(),
            "jobtrack login".bold()
        );
    }
}
