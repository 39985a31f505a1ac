//! Session context: the bearer token store and the unauthorized hook.
//!
//! The client never touches ambient global state. Whatever persists the
//! token is injected as a [`TokenStore`], and what happens after the server
//! rejects the credentials (typically sending the user back to the login
//! screen) is injected as a callback.

use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Key the bearer token is persisted under.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Persistent storage for the bearer token.
///
/// Clearing an already-empty store must succeed.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;

    fn store(&self, token: &str) -> io::Result<()>;

    fn clear(&self) -> io::Result<()>;
}

/// Process-local token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn store(&self, token: &str) -> io::Result<()> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.token.write() = None;
        Ok(())
    }
}

/// Token store backed by a JSON object on disk.
///
/// The token lives under [`AUTH_TOKEN_KEY`]; other keys in the file are
/// preserved. A missing or unreadable file reads as "no token".
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Map<String, Value> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str::<Map<String, Value>>(&content).ok())
            .unwrap_or_default()
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(entries).map_err(io::Error::other)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let _guard = self.lock.lock();
        self.read_entries()
            .get(AUTH_TOKEN_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn store(&self, token: &str) -> io::Result<()> {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries();
        entries.insert(AUTH_TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.write_entries(&entries)
    }

    fn clear(&self) -> io::Result<()> {
        let _guard = self.lock.lock();
        if !self.path.exists() {
            return Ok(());
        }
        let mut entries = self.read_entries();
        if entries.remove(AUTH_TOKEN_KEY).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}

/// Callback invoked with the login path after the server answers 401.
pub type UnauthorizedHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Session context shared by every request of one client.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl Session {
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self::from_store(Arc::new(store))
    }

    pub fn from_store(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            on_unauthorized: None,
        }
    }

    /// Session without a token, kept in memory.
    pub fn in_memory() -> Self {
        Self::new(MemoryTokenStore::new())
    }

    /// In-memory session that starts out authenticated.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self::new(MemoryTokenStore::with_token(token))
    }

    /// Install the hook run after a 401 response has cleared the token.
    pub fn on_unauthorized<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    pub fn token(&self) -> Option<String> {
        self.store.load()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn set_token(&self, token: &str) -> io::Result<()> {
        self.store.store(token)
    }

    pub fn clear(&self) -> io::Result<()> {
        self.store.clear()
    }

    /// Drop the stored credentials and hand control to the unauthorized hook.
    pub(crate) fn invalidate(&self, login_path: &str) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear stored token");
        }
        if let Some(hook) = &self.on_unauthorized {
            hook(login_path);
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("on_unauthorized", &self.on_unauthorized.is_some())
            .finish()
    }
}
