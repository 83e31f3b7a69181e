//! Session file storage

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::Session;

/// JSON file holding the persisted session
pub struct SessionStorage {
    file_path: PathBuf,
}

impl Default for SessionStorage {
    fn default() -> Self {
        Self::new(crate::constants::get_session_file())
    }
}

impl SessionStorage {
    pub fn new(file_path: PathBuf) -> Self {
        Self { file_path }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn exists(&self) -> bool {
        self.file_path.exists()
    }

    /// `Ok(None)` when no session was saved
    pub fn load(&self) -> io::Result<Option<Session>> {
        let content = match fs::read_to_string(&self.file_path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let session = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> io::Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(session)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.file_path, content)?;

        log::debug!("Session saved to {}", self.file_path.display());
        Ok(())
    }

    pub fn clear(&self) -> io::Result<()> {
        if self.exists() {
            fs::remove_file(&self.file_path)?;
            log::debug!("Session file removed");
        }
        Ok(())
    }
}
