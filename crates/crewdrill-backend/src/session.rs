//! File-backed session token cache.
//!
//! The hosted backend's auth tokens are cached on disk so a signed-in
//! session survives between CLI invocations, mirroring the browser client's
//! persisted auth session.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// The persisted part of an authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub user_id: Uuid,
}

/// Reads/writes the session file; keeps an in-process copy so repeated
/// lookups don't touch the disk.
pub struct SessionStore {
    path: PathBuf,
    cached: Mutex<Option<StoredSession>>,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        let cached = Self::read_file(&path);
        Self {
            path,
            cached: Mutex::new(cached),
        }
    }

    fn read_file(path: &PathBuf) -> Option<StoredSession> {
        let content = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("discarding unreadable session file {}: {e}", path.display());
                None
            }
        }
    }

    pub fn current(&self) -> Option<StoredSession> {
        self.cached.lock().unwrap().clone()
    }

    pub fn save(&self, session: StoredSession) {
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(&session) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    warn!("failed to persist session to {}: {e}", self.path.display());
                }
            }
            Err(e) => warn!("failed to serialize session: {e}"),
        }
        *self.cached.lock().unwrap() = Some(session);
    }

    pub fn clear(&self) {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!("failed to remove session file {}: {e}", self.path.display());
            }
        }
        *self.cached.lock().unwrap() = None;
    }
}
