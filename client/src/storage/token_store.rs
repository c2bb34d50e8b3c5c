//! File-backed token storage.

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::storage::traits::{StoredTokens, TokenStore};

/// Keeps the session tokens in a small JSON file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<StoredTokens> {
        if !self.path.exists() {
            return Ok(StoredTokens::default());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read token file {}", self.path.display()))?;
        let tokens = serde_json::from_str(&raw)
            .with_context(|| format!("Token file {} is corrupt", self.path.display()))?;
        Ok(tokens)
    }

    fn save(&self, tokens: &StoredTokens) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(tokens)?;
        write_owner_only(&self.path, &raw)
            .with_context(|| format!("Failed to write token file {}", self.path.display()))?;
        debug!(path = %self.path.display(), "stored session tokens");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove token file {}", self.path.display()))?;
            debug!(path = %self.path.display(), "removed session tokens");
        }
        Ok(())
    }
}

/// Writes the file readable by its owner only (0600 on unix), tightening an existing file too
fn write_owner_only(path: &Path, contents: &str) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents.as_bytes())
}
