/// Persisted authentication flag
///
/// One boolean in a JSON record, read once at startup to decide
/// whether the shell opens onto the feed or the login screen, and
/// rewritten on the explicit login/logout transitions. Nothing else
/// reads or writes this file.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Default)]
struct SessionRecord {
    authenticated: bool,
}

pub struct AuthStore {
    path: PathBuf,
}

impl AuthStore {
    /// Open the store at its default location:
    /// - Linux: ~/.local/share/pinboard/session.json
    /// - macOS: ~/Library/Application Support/pinboard/session.json
    /// - Windows: %APPDATA%\pinboard\session.json
    pub fn open() -> Self {
        AuthStore {
            path: default_session_path(),
        }
    }

    /// Open the store at a specific path (tests point this at a
    /// temporary location)
    pub fn at(path: PathBuf) -> Self {
        AuthStore { path }
    }

    /// Read the flag. A missing or unreadable record means logged out.
    pub fn is_authenticated(&self) -> bool {
        match fs::read_to_string(&self.path) {
            Ok(json) => serde_json::from_str::<SessionRecord>(&json)
                .map(|record| record.authenticated)
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    pub fn login(&self) -> io::Result<()> {
        self.write(true)
    }

    pub fn logout(&self) -> io::Result<()> {
        self.write(false)
    }

    fn write(&self, authenticated: bool) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let record = SessionRecord { authenticated };
        let json = serde_json::to_string(&record).map_err(io::Error::other)?;
        fs::write(&self.path, json)
    }
}

fn default_session_path() -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(|| dirs::home_dir())
        .expect("Could not determine user data directory");

    path.push("pinboard");
    path.push("session.json");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_record_means_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = AuthStore::at(dir.path().join("session.json"));

        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_login_logout_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = AuthStore::at(dir.path().join("nested").join("session.json"));

        store.login().unwrap();
        assert!(store.is_authenticated());

        store.logout().unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_corrupt_record_means_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json at all").unwrap();

        let store = AuthStore::at(path);
        assert!(!store.is_authenticated());
    }
}
