//! Read-only access to the published data files.
//!
//! The backend offers no listing, only "give me this file" and
//! "does this file exist", which is all [`DataSource`] exposes.

use async_trait::async_trait;

pub mod dir;
pub mod error;
pub mod http;
#[cfg(test)]
pub(crate) mod memory;

use error::SourceError;

pub const ARTISTS_FILE: &str = "artists.json";
pub const STARTUP_FILE: &str = "startup.json";

pub fn notified_file(year: i32) -> String {
    format!("notified_{year}.json")
}

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Returns the file body, or `None` if the file does not exist.
    async fn fetch(&self, path: &str) -> Result<Option<Vec<u8>>, SourceError>;

    /// Checks that the file exists without transferring it.
    async fn exists(&self, path: &str) -> Result<bool, SourceError> {
        Ok(self.fetch(path).await?.is_some())
    }
}

/// Rejects anything that could escape the data root.
pub(crate) fn check_path(path: &str) -> Result<&str, SourceError> {
    let bad = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|part| part.is_empty() || part == "..");
    if bad {
        Err(SourceError::InvalidPath(path.to_string()))
    } else {
        Ok(path)
    }
}
