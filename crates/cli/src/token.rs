//! Bearer token persistence.
//!
//! The token from `shop login` is written as JSON to the token file
//! (`SHOPFRONT_TOKEN_FILE`, default `$HOME/.shopfront_token`). On unix the
//! file is created with mode 0600.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

/// Default file name under `$HOME`.
pub const DEFAULT_FILE_NAME: &str = ".shopfront_token";

/// A signed-in session as stored on disk.
#[derive(Serialize, Deserialize)]
struct StoredToken {
    username: String,
    access_token: String,
}

/// Token file location and access.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Resolve the token file from an explicit path or `$HOME`.
    ///
    /// # Errors
    ///
    /// Returns `CliError::NoTokenLocation` if neither is available.
    pub fn locate(explicit: Option<PathBuf>, home: Option<PathBuf>) -> Result<Self, CliError> {
        explicit
            .or_else(|| home.map(|home| home.join(DEFAULT_FILE_NAME)))
            .map(Self::new)
            .ok_or(CliError::NoTokenLocation)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored username and token.
    ///
    /// # Errors
    ///
    /// Returns `CliError::NotSignedIn` if there is no token file, or
    /// `CliError::TokenFile` if it can't be read or parsed.
    pub fn load(&self) -> Result<(String, SecretString), CliError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CliError::NotSignedIn);
            }
            Err(e) => return Err(self.file_error(e)),
        };

        let stored: StoredToken = serde_json::from_str(&content).map_err(|e| self.file_error(e))?;
        if stored.access_token.is_empty() {
            return Err(CliError::NotSignedIn);
        }
        Ok((stored.username, SecretString::from(stored.access_token)))
    }

    /// Store a token, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be written.
    pub fn save(&self, username: &str, token: &SecretString) -> Result<(), CliError> {
        let stored = StoredToken {
            username: username.to_string(),
            access_token: token.expose_secret().to_string(),
        };
        let json = serde_json::to_string(&stored).map_err(|e| self.file_error(e))?;

        let mut file = open_private(&self.path)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }

    /// Delete the token file. Missing files are fine.
    ///
    /// Returns whether a token was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but can't be removed.
    pub fn clear(&self) -> Result<bool, CliError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn file_error(&self, error: impl std::fmt::Display) -> CliError {
        CliError::TokenFile {
            path: self.path.display().to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
