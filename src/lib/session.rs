//! Session state shared by the API client and the sync controller: the bearer
//! token, the CSRF value of the page, the filter selection and the
//! auth-failure side effect.
use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    models::{Facet, FilterState, Id},
    notify::{Level, Notifier},
};

pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed. Please sign in again.";

/// A trait for every place a bearer token can be persisted between runs.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> io::Result<Option<String>>;
    fn save(&self, token: &str) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

/// Keeps the token for the process lifetime only.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(read(&self.token).clone())
    }

    fn save(&self, token: &str) -> io::Result<()> {
        *write(&self.token) = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *write(&self.token) = None;
        Ok(())
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct StoredToken {
    access: String,
}

/// Persists the token as `{"access": "..."}` in a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> io::Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        debug!("Reading token from {}", self.path.display());
        let file = BufReader::new(File::open(&self.path)?);
        let stored: StoredToken = serde_json::from_reader(file)?;
        Ok(Some(stored.access))
    }

    fn save(&self, token: &str) -> io::Result<()> {
        info!("Writing token to {}", self.path.display());
        let file = File::create(&self.path)?;
        let stored = StoredToken {
            access: token.to_owned(),
        };
        Ok(serde_json::to_writer_pretty(file, &stored)?)
    }

    fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// A trait for whatever sends the user to the login page.
pub trait Navigator: Send + Sync {
    fn redirect(&self, url: &str);
}

/// Logs where the user should sign in.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, url: &str) {
        warn!("Sign in again at {}", url);
    }
}

pub struct Session {
    token: RwLock<Option<String>>,
    filters: RwLock<FilterState>,
    csrf_token: Option<String>,
    login_url: String,
    store: Box<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Box<dyn Navigator>,
}

impl Session {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            token: RwLock::new(None),
            filters: RwLock::new(FilterState::default()),
            csrf_token: None,
            login_url: "/admin/login/".to_string(),
            store: Box::new(MemoryTokenStore::default()),
            notifier,
            navigator: Box::new(LogNavigator),
        }
    }

    /// Replaces the token store and picks up a token it already holds.
    pub fn with_store(mut self, store: Box<dyn TokenStore>) -> Self {
        match store.load() {
            Ok(Some(token)) => {
                info!("Restored saved token");
                *write(&self.token) = Some(token);
            }
            Ok(None) => {}
            Err(e) => warn!("Could not read saved token: {}", e),
        }
        self.store = store;
        self
    }

    pub fn with_csrf_token(mut self, csrf_token: Option<String>) -> Self {
        self.csrf_token = csrf_token.filter(|t| !t.is_empty());
        self
    }

    pub fn with_login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = login_url.into();
        self
    }

    pub fn with_navigator(mut self, navigator: Box<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn token(&self) -> Option<String> {
        read(&self.token).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        read(&self.token).is_some()
    }

    pub fn set_token(&self, token: &str) {
        *write(&self.token) = Some(token.to_owned());
        if let Err(e) = self.store.save(token) {
            warn!("Could not persist token: {}", e);
        }
    }

    pub fn clear_token(&self) {
        *write(&self.token) = None;
        if let Err(e) = self.store.clear() {
            warn!("Could not clear saved token: {}", e);
        }
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn filters(&self) -> FilterState {
        read(&self.filters).clone()
    }

    pub fn set_filters(&self, filters: FilterState) {
        *write(&self.filters) = filters;
    }

    /// Returns whether the selection changed.
    pub fn set_filter(&self, facet: Facet, id: Id, selected: bool) -> bool {
        write(&self.filters).set(facet, id, selected)
    }

    /// Runs once for every request the backend rejects with 401.
    pub fn handle_auth_failure(&self) {
        warn!("Backend rejected the credentials, dropping token");
        self.clear_token();
        self.notifier.notify(AUTH_FAILED_MESSAGE, Level::Error);
        self.navigator.redirect(&self.login_url);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("csrf_token", &self.csrf_token.is_some())
            .field("login_url", &self.login_url)
            .field("filters", &*read(&self.filters))
            .finish()
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
