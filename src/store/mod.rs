pub mod file;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::app::Result;
use crate::domain::LoginSession;

pub use file::FileSessionStore;

/// Where the login session is kept
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session file; defaults to `<data_dir>/goodscribe/session.json`
    pub path: Option<PathBuf>,
}

/// The single global slot holding the browser login session.
///
/// Loaded before every dynamic render and overwritten after a successful one.
/// There is no delete.
pub trait SessionStore: Send + Sync {
    /// `None` when nothing usable has been saved yet.
    fn load(&self) -> Option<LoginSession>;
    fn save(&self, session: &LoginSession) -> Result<()>;
}
