use super::{StateStore, StoreState};
use crate::error::{FilterzError, Result};
use std::fs;
use std::path::{Path, PathBuf};

const STATE_FILENAME: &str = "state.json";

/// Keeps the session state in `state.json` inside a data directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.join(STATE_FILENAME)
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(FilterzError::Io)?;
        }
        Ok(())
    }
}

impl StateStore for FileStore {
    fn load(&self) -> Result<Option<StoreState>> {
        let path = self.state_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(FilterzError::Io)?;
        let state: StoreState = serde_json::from_str(&content).map_err(|e| {
            FilterzError::Store(format!("Corrupt state file {}: {}", path.display(), e))
        })?;
        Ok(Some(state))
    }

    fn save(&mut self, state: &StoreState) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_json::to_string_pretty(state).map_err(FilterzError::Serialization)?;
        fs::write(self.state_path(), content).map_err(FilterzError::Io)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let path = self.state_path();
        if path.exists() {
            fs::remove_file(path).map_err(FilterzError::Io)?;
        }
        Ok(())
    }
}
