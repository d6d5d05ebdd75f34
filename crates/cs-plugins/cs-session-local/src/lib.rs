//! # cs-session-local
//!
//! File-backed implementation of `SessionStore`: one JSON document under a
//! fixed path, the desktop analogue of a browser's local-storage key.
//! Anything unparseable is deleted and treated as "no session".

use std::fs;
use std::io;
use std::path::PathBuf;

use cs_core::error::{AppError, Result};
use cs_core::models::Session;
use cs_core::traits::SessionStore;

pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn io_err(err: io::Error) -> AppError {
    AppError::Transport(err.to_string())
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<Session> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    log::warn!("could not read saved session: {err}");
                }
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                // corrupt data is discarded so the next load starts clean
                log::warn!("discarding unparseable session data: {err}");
                let _ = fs::remove_file(&self.path);
                None
            }
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = serde_json::to_string(session)
            .map_err(|err| AppError::Transport(err.to_string()))?;
        fs::write(&self.path, raw).map_err(io_err)
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_err(err)),
        }
    }
}
