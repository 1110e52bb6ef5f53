use std::time::Duration;

use async_trait::async_trait;
use log::trace;
use reqwest::{Client, StatusCode};

use super::{DataSource, check_path, error::SourceError};

/// Data files served over HTTP, e.g. `http://localhost:11888/data`
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, SourceError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|source| SourceError::Http {
            path: base_url.to_string(),
            source,
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, path: &str) -> Result<String, SourceError> {
        Ok(format!("{}/{}", self.base_url, check_path(path)?))
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<Option<Vec<u8>>, SourceError> {
        let url = self.url_for(path)?;
        let http_err = |source: reqwest::Error| SourceError::Http {
            path: path.to_string(),
            source,
        };

        let res = self.client.get(&url).send().await.map_err(http_err)?;
        trace!("GET {} -> {}", url, res.status());

        match res.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = res.bytes().await.map_err(http_err)?;
                Ok(Some(body.to_vec()))
            }
            status => Err(SourceError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            }),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool, SourceError> {
        let url = self.url_for(path)?;
        let res = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(|source| SourceError::Http {
                path: path.to_string(),
                source,
            })?;
        trace!("HEAD {} -> {}", url, res.status());

        match res.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(SourceError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            }),
        }
    }
}
