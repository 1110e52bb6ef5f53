use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;

use super::{DataSource, check_path, error::SourceError};

/// Data files in a local directory, as written by the release checker
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, SourceError> {
        Ok(self.root.join(check_path(path)?))
    }
}

#[async_trait]
impl DataSource for DirSource {
    async fn fetch(&self, path: &str) -> Result<Option<Vec<u8>>, SourceError> {
        let file = self.resolve(path)?;
        match tokio::fs::read(&file).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SourceError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool, SourceError> {
        let file = self.resolve(path)?;
        match tokio::fs::metadata(&file).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(SourceError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }
}
