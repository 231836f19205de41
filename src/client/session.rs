//! Durable session state for the client.
//!
//! The browser localStorage analog: two keys, `sessionToken` and `email`,
//! persisted as a small JSON file. Read synchronously at construction;
//! written on every login/logout. Only `login` and `logout` mutate the
//! session; everyone else observes through snapshots or the watch channel.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::errors::ClientError;

/// A snapshot of the client's authentication state.
///
/// Invariant: `is_logged_in == token.is_some()`. Snapshots are only built
/// by [`SessionStore`], which upholds it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub is_logged_in: bool,
    pub token: Option<String>,
    pub email: Option<String>,
}

impl Session {
    fn logged_in(email: String, token: String) -> Self {
        Self {
            is_logged_in: true,
            token: Some(token),
            email: Some(email),
        }
    }

    fn logged_out() -> Self {
        Self::default()
    }
}

/// On-disk shape of the session file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedSession {
    #[serde(rename = "sessionToken", default, skip_serializing_if = "Option::is_none")]
    session_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

/// The client's session store; the single writer of session state.
pub struct SessionStore {
    path: PathBuf,
    tx: watch::Sender<Session>,
}

impl SessionStore {
    /// Open the store at the configured `EMSA_SESSION_PATH`.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::open(config.session_path.clone())
    }

    /// Open the store, deriving the initial state from the session file.
    /// A missing or unreadable file means logged out.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let initial = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<PersistedSession>(&raw) {
                Ok(persisted) => match persisted.session_token {
                    Some(token) => {
                        Session::logged_in(persisted.email.unwrap_or_default(), token)
                    }
                    None => Session::logged_out(),
                },
                Err(err) => {
                    tracing::warn!("Ignoring malformed session file {:?}: {}", path, err);
                    Session::logged_out()
                }
            },
            Err(_) => Session::logged_out(),
        };
        let (tx, _rx) = watch::channel(initial);
        Self { path, tx }
    }

    /// Persist the credentials and flip to logged in.
    pub fn login(&self, email: &str, token: &str) -> Result<(), ClientError> {
        let persisted = PersistedSession {
            session_token: Some(token.to_string()),
            email: Some(email.to_string()),
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&persisted).map_err(
            |err| ClientError::Decode(err.to_string()),
        )?)?;
        self.tx
            .send_replace(Session::logged_in(email.to_string(), token.to_string()));
        Ok(())
    }

    /// Clear the persisted credentials and flip to logged out.
    pub fn logout(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        self.tx.send_replace(Session::logged_out());
        Ok(())
    }

    /// The current session snapshot.
    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// Subscribe to session changes (the shared-context seam).
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SessionStore {
        SessionStore::open(dir.path().join("session.json"))
    }

    #[test]
    fn test_initial_state_is_logged_out() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let session = store.current();
        assert!(!session.is_logged_in);
        assert!(session.token.is_none());
        assert!(session.email.is_none());
    }

    #[test]
    fn test_login_then_read_back() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.login("a@b.com", "tok-123").unwrap();

        let session = store.current();
        assert!(session.is_logged_in);
        assert_eq!(session.email.as_deref(), Some("a@b.com"));
        assert_eq!(session.token.as_deref(), Some("tok-123"));

        // A fresh store derives state from the same file
        let reopened = store_in(&dir);
        let session = reopened.current();
        assert!(session.is_logged_in);
        assert_eq!(session.token.as_deref(), Some("tok-123"));
    }

    #[test]
    fn test_logout_clears_both_keys() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.login("a@b.com", "tok-123").unwrap();
        store.logout().unwrap();

        let session = store.current();
        assert!(!session.is_logged_in);
        assert!(session.token.is_none());
        assert!(session.email.is_none());

        assert!(!dir.path().join("session.json").exists());
        assert!(!store_in(&dir).current().is_logged_in);
    }

    #[test]
    fn test_invariant_logged_in_iff_token() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        for _ in 0..3 {
            store.login("a@b.com", "t").unwrap();
            let s = store.current();
            assert_eq!(s.is_logged_in, s.token.is_some());
            store.logout().unwrap();
            let s = store.current();
            assert_eq!(s.is_logged_in, s.token.is_some());
        }
    }

    #[test]
    fn test_malformed_file_means_logged_out() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("session.json"), "not json").unwrap();
        assert!(!store_in(&dir).current().is_logged_in);
    }

    #[tokio::test]
    async fn test_subscribers_observe_changes() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut rx = store.subscribe();

        store.login("a@b.com", "tok").unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_logged_in);

        store.logout().unwrap();
        rx.changed().await.unwrap();
        assert!(!rx.borrow().is_logged_in);
    }
}
