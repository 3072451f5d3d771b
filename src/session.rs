// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Auth session state for the API client.
//!
//! Two independent bearer-token scopes are tracked: the end-user session and
//! the admin session. Each token lives in a [`TokenCell`], a small watch-backed
//! cell that the client reads at request time, so a login that completes after
//! the client was built is picked up by the very next call. Tokens and user
//! snapshots are mirrored into a [`TokenStore`] so they survive restarts.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;

pub const USER_TOKEN_KEY: &str = "token";
pub const ADMIN_TOKEN_KEY: &str = "adminToken";
pub const USER_PROFILE_KEY: &str = "user";
pub const ADMIN_PROFILE_KEY: &str = "adminUser";

/// Observable holder for a single bearer token.
#[derive(Clone, Debug)]
pub struct TokenCell {
    tx: Arc<watch::Sender<Option<String>>>,
}

impl TokenCell {
    pub fn new(initial: Option<String>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn get(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    pub fn is_set(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn set(&self, token: Option<String>) {
        self.tx.send_replace(token.filter(|t| !t.is_empty()));
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}

impl Default for TokenCell {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Durable key-value storage for tokens and profile snapshots.
pub trait TokenStore: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

#[derive(Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, key: &str) -> Option<String> {
        let guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        guard.get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> io::Result<()> {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        guard.remove(key);
        Ok(())
    }
}

/// JSON file backed store; the whole map is rewritten on every change.
pub struct FileTokenStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileTokenStore {
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => HashMap::new(),
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &HashMap<String, String>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, json)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, key: &str) -> Option<String> {
        let guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        guard.get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> io::Result<()> {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(key.to_string(), value.to_string());
        self.flush(&guard)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.remove(key).is_some() {
            self.flush(&guard)?;
        }
        Ok(())
    }
}

/// Which token, if any, authenticates a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScope {
    User,
    Admin,
    Anonymous,
}

/// Both token scopes plus their durable mirror.
#[derive(Clone)]
pub struct Session {
    user: TokenCell,
    admin: TokenCell,
    store: Arc<dyn TokenStore>,
}

impl Session {
    /// Restore any tokens previously persisted in `store`.
    pub fn restore(store: Arc<dyn TokenStore>) -> Self {
        let user = TokenCell::new(store.load(USER_TOKEN_KEY));
        let admin = TokenCell::new(store.load(ADMIN_TOKEN_KEY));

        tracing::debug!(
            user_token = user.is_set(),
            admin_token = admin.is_set(),
            "restored session from token store"
        );

        Self { user, admin, store }
    }

    pub fn in_memory() -> Self {
        Self::restore(Arc::new(MemoryTokenStore::new()))
    }

    pub fn user_token(&self) -> &TokenCell {
        &self.user
    }

    pub fn admin_token(&self) -> &TokenCell {
        &self.admin
    }

    pub fn token_for(&self, scope: AuthScope) -> Option<String> {
        match scope {
            AuthScope::User => self.user.get(),
            AuthScope::Admin => self.admin.get(),
            AuthScope::Anonymous => None,
        }
    }

    pub fn set_token(&self, token: Option<String>) {
        self.persist(USER_TOKEN_KEY, token.as_deref());
        self.user.set(token);
    }

    pub fn set_admin_token(&self, token: Option<String>) {
        self.persist(ADMIN_TOKEN_KEY, token.as_deref());
        self.admin.set(token);
    }

    pub fn store_user<T: Serialize>(&self, user: &T) {
        self.persist_json(USER_PROFILE_KEY, user);
    }

    pub fn store_admin_user<T: Serialize>(&self, admin: &T) {
        self.persist_json(ADMIN_PROFILE_KEY, admin);
    }

    pub fn stored_user<T: DeserializeOwned>(&self) -> Option<T> {
        self.load_json(USER_PROFILE_KEY)
    }

    pub fn stored_admin_user<T: DeserializeOwned>(&self) -> Option<T> {
        self.load_json(ADMIN_PROFILE_KEY)
    }

    /// Drop the end-user token and profile snapshot.
    pub fn clear_user(&self) {
        self.set_token(None);
        self.persist(USER_PROFILE_KEY, None);
    }

    /// Drop the admin token and profile snapshot.
    pub fn clear_admin(&self) {
        self.set_admin_token(None);
        self.persist(ADMIN_PROFILE_KEY, None);
    }

    fn persist(&self, key: &str, value: Option<&str>) {
        let result = match value {
            Some(value) if !value.is_empty() => self.store.save(key, value),
            _ => self.store.remove(key),
        };

        if let Err(error) = result {
            tracing::warn!(key, %error, "failed to persist session value");
        }
    }

    fn persist_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.persist(key, Some(&json)),
            Err(error) => tracing::warn!(key, %error, "failed to serialize session value"),
        }
    }

    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.load(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(key, %error, "discarding unreadable session value");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_cell_publishes_changes() {
        let cell = TokenCell::default();
        let mut rx = cell.subscribe();
        assert!(cell.get().is_none());

        cell.set(Some("abc".to_string()));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_deref(), Some("abc"));

        cell.set(Some(String::new()));
        assert!(!cell.is_set());
    }

    #[test]
    fn session_scopes_are_independent() {
        let session = Session::in_memory();
        session.set_token(Some("user-token".to_string()));

        assert_eq!(session.token_for(AuthScope::User).as_deref(), Some("user-token"));
        assert!(session.token_for(AuthScope::Admin).is_none());
        assert!(session.token_for(AuthScope::Anonymous).is_none());

        session.set_admin_token(Some("admin-token".to_string()));
        session.clear_user();
        assert!(session.token_for(AuthScope::User).is_none());
        assert_eq!(session.token_for(AuthScope::Admin).as_deref(), Some("admin-token"));
    }

    #[test]
    fn session_restores_from_store() {
        let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
        {
            let session = Session::restore(store.clone());
            session.set_admin_token(Some("persisted".to_string()));
            session.store_admin_user(&serde_json::json!({ "email": "ops@rentloop.test" }));
        }

        let restored = Session::restore(store);
        assert_eq!(restored.admin_token().get().as_deref(), Some("persisted"));
        let admin: serde_json::Value = restored.stored_admin_user().unwrap();
        assert_eq!(admin["email"], "ops@rentloop.test");

        restored.clear_admin();
        assert!(restored.stored_admin_user::<serde_json::Value>().is_none());
    }

    #[test]
    fn file_store_round_trips_through_disk() {
        let path = std::env::temp_dir().join(format!(
            "rentloop-session-{}-{}.json",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));

        let store = FileTokenStore::open(&path).unwrap();
        store.save(USER_TOKEN_KEY, "on-disk").unwrap();

        let reopened = FileTokenStore::open(&path).unwrap();
        assert_eq!(reopened.load(USER_TOKEN_KEY).as_deref(), Some("on-disk"));
        reopened.remove(USER_TOKEN_KEY).unwrap();
        assert!(FileTokenStore::open(&path).unwrap().load(USER_TOKEN_KEY).is_none());

        let _ = fs::remove_file(path);
    }
}
