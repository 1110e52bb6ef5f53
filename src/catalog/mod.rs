use std::time::Duration;

use log::error;
use serde::de::DeserializeOwned;

use crate::{
    config::{self, Discovery, Images},
    source::{DataSource, STARTUP_FILE, dir::DirSource, error::SourceError, http::HttpSource},
};

pub mod aggregate;
pub mod discovery;
pub mod error;
pub mod files;

use aggregate::Aggregation;
use error::LoadError;
use files::StartupState;

/// Fetches and parses one JSON file. `Ok(None)` when the file does not exist.
pub async fn load_json<T: DeserializeOwned>(
    source: &dyn DataSource,
    path: &str,
) -> Result<Option<T>, LoadError> {
    let Some(body) = source.fetch(path).await? else {
        return Ok(None);
    };
    serde_json::from_slice(&body)
        .map(Some)
        .map_err(|source| LoadError::Parse {
            path: path.to_string(),
            source,
        })
}

/// Entry point to the published data: year discovery plus aggregation
pub struct Catalog {
    source: Box<dyn DataSource>,
    discovery: Discovery,
    images: Images,
}

impl Catalog {
    pub fn new(source: Box<dyn DataSource>, discovery: Discovery, images: Images) -> Self {
        Self {
            source,
            discovery,
            images,
        }
    }

    pub fn from_config(cfg: &config::Config) -> Result<Self, SourceError> {
        let source: Box<dyn DataSource> = match &cfg.source {
            config::Source::Http {
                base_url,
                timeout_secs,
            } => Box::new(HttpSource::new(
                base_url,
                timeout_secs.map(Duration::from_secs),
            )?),
            config::Source::Dir { path } => Box::new(DirSource::new(path)),
        };
        Ok(Self::new(source, cfg.discovery.clone(), cfg.images.clone()))
    }

    pub async fn discover_years(&self, current_year: i32) -> Vec<i32> {
        discovery::discover_years(self.source.as_ref(), current_year, &self.discovery).await
    }

    /// One full load cycle: discovery, then fetching and joining every year
    pub async fn load(&self, current_year: i32) -> Aggregation {
        let years = self.discover_years(current_year).await;
        aggregate::aggregate(self.source.as_ref(), &years, &self.images).await
    }

    /// Reads the startup marker; anything unusable reads as "not completed"
    pub async fn load_startup(&self) -> StartupState {
        match load_json::<StartupState>(self.source.as_ref(), STARTUP_FILE).await {
            Ok(Some(state)) => state,
            Ok(None) => {
                error!("Failed to load {STARTUP_FILE}: not found");
                StartupState::default()
            }
            Err(e) => {
                error!("Error loading startup config: {e}");
                StartupState::default()
            }
        }
    }
}
