use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http request to proxy API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("docker daemon error: {0}")]
    Docker(#[from] bollard::errors::Error),
}

pub type Result<T> = std::result::Result<T, SourceError>;
