use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request for {path} failed: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} answered with status {status}")]
    Status { path: String, status: u16 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid data path: {0}")]
    InvalidPath(String),
}
