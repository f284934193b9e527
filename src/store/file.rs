use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::app::{GoodscribeError, Result};
use crate::domain::LoginSession;
use crate::store::{SessionConfig, SessionStore};

const SESSION_FILE: &str = "session.json";

/// JSON session file at a fixed path.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open the store named by `config`, falling back to the default location.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let path = match &config.path {
            Some(p) => p.clone(),
            None => Self::default_path()?,
        };
        Ok(Self::new(path))
    }

    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| GoodscribeError::Config("Could not determine data directory".into()))?;
        Ok(data_dir.join("goodscribe").join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<LoginSession> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No session file at {}", self.path.display());
                return None;
            }
            Err(e) => {
                warn!("Could not read session file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<LoginSession>(&content) {
            Ok(session) => {
                debug!(
                    "Loaded session with {} cookie(s) saved at {}",
                    session.cookies.len(),
                    session.saved_at
                );
                Some(session)
            }
            Err(e) => {
                warn!("Ignoring corrupt session file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn save(&self, session: &LoginSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json)?;
        debug!(
            "Saved {} cookie(s) to {}",
            session.cookies.len(),
            self.path.display()
        );
        Ok(())
    }
}
