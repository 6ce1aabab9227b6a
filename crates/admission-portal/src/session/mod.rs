//! Session handling: the single source of truth for "is a user logged in,
//! and with what role".
//!
//! The portal keeps two string entries in a persistent key/value store, the
//! opaque access token and the serialized user-info record. A session counts
//! as authenticated only when both entries are present and the user record
//! parses; anything else reads as anonymous so a corrupted store can never
//! grant access.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Storage key holding the opaque bearer token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key holding the serialized user-info record.
pub const USER_INFO_KEY: &str = "user_info";

/// Role attached to an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Candidate,
    Admin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Admin => "admin",
        }
    }

    /// Landing route used as the default post-login destination.
    pub const fn home_route(self) -> &'static str {
        match self {
            Role::Candidate => "/dashboard",
            Role::Admin => "/admin/dashboard",
        }
    }
}

/// Identity record persisted alongside the access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
}

/// Opaque bearer token issued by the backend. Expiry is enforced server-side
/// by rejecting stale tokens; the client stores it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken(pub String);

/// Authentication state derived from the persistent store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Authenticated { token: AccessToken, user: UserInfo },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    /// Authenticated and holding one of the required roles.
    pub fn authorized_for(&self, required: &[Role]) -> bool {
        match self {
            Session::Anonymous => false,
            Session::Authenticated { user, .. } => required.contains(&user.role),
        }
    }

    pub fn user(&self) -> Option<&UserInfo> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { user, .. } => Some(user),
        }
    }

    pub fn token(&self) -> Option<&AccessToken> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { token, .. } => Some(token),
        }
    }
}

/// Key/value persistence behind the session store, mirroring the
/// browser-local store the portal runs on.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("session storage io failure: {0}")]
    Io(#[from] io::Error),
    #[error("session storage holds invalid data: {0}")]
    Corrupt(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to serialize user record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Wraps a [`SessionStorage`] with the write/read/clear contract the access
/// gate relies on. All operations run under one guard so no reader ever
/// observes a half-written or half-cleared pair of entries.
pub struct SessionStore<S> {
    storage: S,
    guard: Mutex<()>,
}

impl<S: SessionStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            guard: Mutex::new(()),
        }
    }

    /// Persist a fresh login: token and user land together.
    pub fn write(&self, token: &AccessToken, user: &UserInfo) -> Result<(), SessionError> {
        let serialized = serde_json::to_string(user)?;
        let _guard = self.guard.lock().expect("session guard poisoned");
        self.storage.set(ACCESS_TOKEN_KEY, &token.0)?;
        self.storage.set(USER_INFO_KEY, &serialized)?;
        Ok(())
    }

    /// Current session, re-read from storage on every call. A missing entry,
    /// a storage failure, or an unparseable user record all read as
    /// [`Session::Anonymous`].
    pub fn read(&self) -> Session {
        let _guard = self.guard.lock().expect("session guard poisoned");
        let token = match self.storage.get(ACCESS_TOKEN_KEY) {
            Ok(value) => value,
            Err(err) => {
                warn!(%err, "session storage unreadable; treating as anonymous");
                return Session::Anonymous;
            }
        };
        let user_raw = match self.storage.get(USER_INFO_KEY) {
            Ok(value) => value,
            Err(err) => {
                warn!(%err, "session storage unreadable; treating as anonymous");
                return Session::Anonymous;
            }
        };

        match (token, user_raw) {
            (Some(token), Some(raw)) => match serde_json::from_str::<UserInfo>(&raw) {
                Ok(user) => Session::Authenticated {
                    token: AccessToken(token),
                    user,
                },
                Err(err) => {
                    warn!(%err, "stored user record malformed; treating as anonymous");
                    Session::Anonymous
                }
            },
            _ => Session::Anonymous,
        }
    }

    /// Remove both entries. Atomic from any reader's perspective.
    pub fn clear(&self) -> Result<(), SessionError> {
        let _guard = self.guard.lock().expect("session guard poisoned");
        self.storage.remove(ACCESS_TOKEN_KEY)?;
        self.storage.remove(USER_INFO_KEY)?;
        Ok(())
    }

    /// Convenience for the API client's bearer injection.
    pub fn token(&self) -> Option<AccessToken> {
        match self.read() {
            Session::Authenticated { token, .. } => Some(token),
            Session::Anonymous => None,
        }
    }
}

/// In-memory storage used by tests and short-lived tooling.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .entries
            .lock()
            .expect("storage mutex poisoned")
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .expect("storage mutex poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .expect("storage mutex poisoned")
            .remove(key);
        Ok(())
    }
}

impl MemoryStorage {
    /// Seed an entry directly, bypassing the store contract. Test hook for
    /// simulating corrupted or half-present data.
    pub fn seed(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .expect("storage mutex poisoned")
            .insert(key.to_string(), value.to_string());
    }
}

/// File-backed storage for the command-line front end: one JSON object
/// holding the key/value entries.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|err| StorageError::Corrupt(err.to_string())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|err| StorageError::Corrupt(err.to_string()))?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        entries.remove(key);
        self.save(&entries)
    }
}
