use thiserror::Error;

/// Every provider call fails with one of these reasons so the Reconciler
/// can switch on cause instead of matching concrete error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorReason {
    Auth,
    Transient,
    NotFound,
    Invalid,
    Other,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("transient provider failure: {0}")]
    Transient(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("invalid record intent: {0}")]
    Invalid(String),

    #[error("provider call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Cloudflare API error: {0}")]
    CloudflareApi(#[from] cloudflare::framework::Error),

    #[error("Cloudflare API failure: {0}")]
    CloudflareApiFailure(#[from] cloudflare::framework::response::ApiFailure),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(#[from] std::net::AddrParseError),

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub fn reason(&self) -> ErrorReason {
        match self {
            ProviderError::Auth(_) => ErrorReason::Auth,
            ProviderError::Transient(_) | ProviderError::Timeout(_) => ErrorReason::Transient,
            ProviderError::NotFound(_) => ErrorReason::NotFound,
            ProviderError::Invalid(_) | ProviderError::InvalidIpAddress(_) => ErrorReason::Invalid,
            ProviderError::CloudflareApiFailure(failure) => {
                if failure.to_string().to_ascii_lowercase().contains("authentication") {
                    ErrorReason::Auth
                } else {
                    ErrorReason::Other
                }
            }
            ProviderError::CloudflareApi(_) | ProviderError::Other(_) => ErrorReason::Other,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
