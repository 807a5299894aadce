//! Token storage
//!
//! The access token and the refresh token have different lifetimes, so each
//! lives in its own [`TokenSlot`]:
//! - access token in a [`CookieJar`] entry that expires on its own
//! - refresh token in [`LocalStorage`], persistent until cleared

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

use super::TokenPair;
use crate::error::StorageError;

type Result<T> = std::result::Result<T, StorageError>;

/// Key under which the refresh token is kept in local storage
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// A single persisted credential
pub trait TokenSlot: Send + Sync {
    fn read(&self) -> Result<Option<String>>;
    fn write(&self, value: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Cookie-style file entry with its own expiry.
///
/// Reading an expired entry yields `None`, the same way a browser drops an
/// expired cookie.
pub struct CookieJar {
    path: PathBuf,
    ttl: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
struct CookieEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CookieJar {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }
}

impl TokenSlot for CookieJar {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let entry: CookieEntry = serde_yaml::from_str(&contents)
            .map_err(|e| StorageError::Corrupt(format!("{}: {}", self.path.display(), e)))?;

        if entry.expires_at <= Utc::now() {
            log::debug!("Cookie {} expired at {}", self.path.display(), entry.expires_at);
            return Ok(None);
        }
        Ok(Some(entry.value))
    }

    fn write(&self, value: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| StorageError::Io(format!("cookie ttl out of range: {}", e)))?;
        let entry = CookieEntry {
            value: value.to_string(),
            expires_at: Utc::now() + ttl,
        };
        let contents =
            serde_yaml::to_string(&entry).map_err(|e| StorageError::Io(e.to_string()))?;
        std::fs::write(&self.path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// SQLite-backed key/value store, one slot per key
pub struct LocalStorage {
    conn: Arc<Mutex<Connection>>,
    key: String,
}

impl LocalStorage {
    /// Open (or create) the storage database and bind a slot to `key`
    pub fn open(db_path: &Path, key: &str) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn, key)
    }

    /// Slot over an in-memory database
    #[cfg(test)]
    pub fn in_memory(key: &str) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, key)
    }

    fn with_connection(conn: Connection, key: &str) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS local_storage (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            key: key.to_string(),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Database("local storage lock poisoned".to_string()))
    }
}

impl TokenSlot for LocalStorage {
    fn read(&self) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![self.key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, value: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![self.key, value, Utc::now().timestamp()],
        )?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM local_storage WHERE key = ?1", params![self.key])?;
        Ok(())
    }
}

/// In-process slot
#[cfg(test)]
#[derive(Default)]
pub struct MemorySlot {
    value: Mutex<Option<String>>,
}

#[cfg(test)]
impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl TokenSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.value.lock().map(|v| v.clone()).unwrap_or_default())
    }

    fn write(&self, value: &str) -> Result<()> {
        if let Ok(mut slot) = self.value.lock() {
            *slot = Some(value.to_string());
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if let Ok(mut slot) = self.value.lock() {
            *slot = None;
        }
        Ok(())
    }
}

/// Access and refresh token storage.
///
/// Values are stored verbatim. Read failures are logged and reported as an
/// absent token.
#[derive(Clone)]
pub struct TokenStore {
    access: Arc<dyn TokenSlot>,
    refresh: Arc<dyn TokenSlot>,
}

impl TokenStore {
    pub fn new(access: Arc<dyn TokenSlot>, refresh: Arc<dyn TokenSlot>) -> Self {
        Self { access, refresh }
    }

    /// Cookie jar for the access token, local storage for the refresh token
    pub fn open(data_dir: &Path, access_ttl: Duration) -> Result<Self> {
        let access = CookieJar::new(data_dir.join("session.cookie"), access_ttl);
        let refresh = LocalStorage::open(&data_dir.join("storage.db"), REFRESH_TOKEN_KEY)?;
        Ok(Self::new(Arc::new(access), Arc::new(refresh)))
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySlot::new()), Arc::new(MemorySlot::new()))
    }

    pub fn access_token(&self) -> Option<String> {
        read_or_warn(self.access.as_ref(), "access token")
    }

    pub fn set_access_token(&self, token: &str) -> Result<()> {
        self.access.write(token)
    }

    pub fn clear_access_token(&self) -> Result<()> {
        self.access.clear()
    }

    pub fn refresh_token(&self) -> Option<String> {
        read_or_warn(self.refresh.as_ref(), "refresh token")
    }

    pub fn set_refresh_token(&self, token: &str) -> Result<()> {
        self.refresh.write(token)
    }

    pub fn clear_refresh_token(&self) -> Result<()> {
        self.refresh.clear()
    }

    /// Replace both tokens
    pub fn store_pair(&self, pair: &TokenPair) -> Result<()> {
        self.set_access_token(&pair.access_token)?;
        self.set_refresh_token(&pair.refresh_token)
    }

    /// Remove both tokens, attempting each even if the first fails
    pub fn clear(&self) -> Result<()> {
        let access = self.clear_access_token();
        let refresh = self.clear_refresh_token();
        access.and(refresh)
    }
}

fn read_or_warn(slot: &dyn TokenSlot, what: &str) -> Option<String> {
    match slot.read() {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Failed to read {}: {}", what, e);
            None
        }
    }
}
