use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;

use super::{DataSource, error::SourceError};

/// In-memory source with scripted failures, recording every requested path.
#[derive(Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
    broken: HashSet<String>,
    fail_everything: bool,
    requests: Mutex<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request answers with a server error
    pub fn failing() -> Self {
        Self {
            fail_everything: true,
            ..Self::default()
        }
    }

    pub fn with_file(mut self, path: &str, body: &str) -> Self {
        self.files.insert(path.to_string(), body.as_bytes().to_vec());
        self
    }

    pub fn with_broken(mut self, path: &str) -> Self {
        self.broken.insert(path.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn answer(&self, path: &str) -> Result<Option<&Vec<u8>>, SourceError> {
        self.requests.lock().unwrap().push(path.to_string());
        if self.fail_everything || self.broken.contains(path) {
            return Err(SourceError::Status {
                path: path.to_string(),
                status: 500,
            });
        }
        Ok(self.files.get(path))
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn fetch(&self, path: &str) -> Result<Option<Vec<u8>>, SourceError> {
        Ok(self.answer(path)?.cloned())
    }

    async fn exists(&self, path: &str) -> Result<bool, SourceError> {
        Ok(self.answer(path)?.is_some())
    }
}
