use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

pub use file_session_store::FileSessionStore;
pub use in_memory_session_store::InMemorySessionStore;

use crate::api::{AuthResponse, UserId};
use crate::client::AccessTokenSource;

mod file_session_store;
mod in_memory_session_store;

const LOGIN_PATH: &str = "/login";
const BOOKS_PATH: &str = "/admin/books";
const DEFAULT_USER_NAME: &str = "Admin User";

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session storage failure {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to (de)serialize session: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Who is logged in, kept for display only
pub struct StoredUser {
    pub email: String,
    pub role: String,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub access_token: String,
    /// Unix seconds after which the token is no longer sent
    pub expires_at: u64,
    pub user: Option<StoredUser>,
}

impl StoredSession {
    pub fn from_auth(auth: &AuthResponse, ttl: Duration) -> Self {
        Self {
            access_token: auth.access_token.clone(),
            expires_at: unix_now() + ttl.as_secs(),
            user: Some(StoredUser {
                email: auth.email.clone(),
                role: auth.role.clone(),
                user_id: auth.user_id,
            }),
        }
    }

    pub fn is_expired(&self) -> bool {
        unix_now() >= self.expires_at
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Where the access token lives between runs
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredSession>, SessionStoreError>;
    fn save(&self, session: &StoredSession) -> Result<(), SessionStoreError>;
    fn clear(&self) -> Result<(), SessionStoreError>;
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Route {
    Login,
    Books,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => LOGIN_PATH,
            Route::Books => BOOKS_PATH,
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Tells the person at the terminal what to do next
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: Route) {
        match route {
            Route::Login => eprintln!("Session ended, log in again with `bookstore-admin login`"),
            Route::Books => eprintln!("Continue with `bookstore-admin books list`"),
        }
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: parking_lot::Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().push(route);
    }
}

/// Redirect decision for a visit of `path`, `None` lets the visit through
pub fn route_guard(path: &str, has_token: bool) -> Option<Route> {
    let is_public = path == LOGIN_PATH;
    match (has_token, is_public) {
        (false, false) => Some(Route::Login),
        (true, true) => Some(Route::Books),
        _ => None,
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CurrentUser {
    pub name: String,
    pub email: String,
}

impl CurrentUser {
    fn from_stored(user: Option<&StoredUser>) -> Self {
        match user {
            Some(user) => Self {
                name: user
                    .email
                    .split('@')
                    .next()
                    .filter(|name| !name.is_empty())
                    .unwrap_or(DEFAULT_USER_NAME)
                    .to_string(),
                email: user.email.clone(),
            },
            None => Self {
                name: DEFAULT_USER_NAME.to_string(),
                email: String::new(),
            },
        }
    }
}

pub struct Session {
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    ttl: Duration,
    redirected_to_login: AtomicBool,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>, ttl: Duration) -> Self {
        Self {
            store,
            navigator,
            ttl,
            redirected_to_login: AtomicBool::new(false),
        }
    }

    /// Session that is still valid, expired ones are dropped from the store
    pub fn current(&self) -> Option<StoredSession> {
        match self.store.load() {
            Ok(Some(session)) if session.is_expired() => {
                tracing::info!("Stored session expired");
                if let Err(err) = self.store.clear() {
                    tracing::warn!("Failed to clear expired session {}", err);
                }
                None
            }
            Ok(session) => session,
            Err(err) => {
                tracing::warn!("Failed to load session {}", err);
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    /// Stores the token of a successful login and re-arms the login redirect
    pub fn start(&self, auth: &AuthResponse) -> Result<(), SessionStoreError> {
        self.store
            .save(&StoredSession::from_auth(auth, self.ttl))?;
        self.redirected_to_login.store(false, Ordering::SeqCst);
        Ok(())
    }

    pub fn end(&self) -> Result<(), SessionStoreError> {
        self.store.clear()
    }

    /// Clears the token on every call and redirects to login only the first time.
    /// Returns true when this call redirected
    pub fn handle_unauthorized(&self) -> bool {
        if let Err(err) = self.store.clear() {
            tracing::warn!("Failed to clear session after 401 {}", err);
        }
        if self.redirected_to_login.swap(true, Ordering::SeqCst) {
            return false;
        }
        tracing::info!("Unauthorized response, redirecting to login");
        self.navigator.navigate(Route::Login);
        true
    }

    pub fn navigate(&self, route: Route) {
        self.navigator.navigate(route);
    }

    /// Applies [`route_guard`] for `path`, redirecting when needed
    pub fn guard(&self, path: &str) -> Option<Route> {
        let redirect = route_guard(path, self.is_authenticated());
        if let Some(route) = redirect {
            self.navigator.navigate(route);
        }
        redirect
    }

    pub fn current_user(&self) -> CurrentUser {
        let session = self.current();
        CurrentUser::from_stored(session.as_ref().and_then(|s| s.user.as_ref()))
    }
}

impl AccessTokenSource for Session {
    fn access_token(&self) -> Option<String> {
        self.current().map(|session| session.access_token)
    }
}
