//! Shared vendor error kinds and error value helpers.
//!
//! ```rust
//! use tprovider::{ProviderError, ProviderErrorKind};
//!
//! let auth = ProviderError::authentication("bad key");
//! assert_eq!(auth.kind, ProviderErrorKind::Authentication);
//!
//! let timeout = ProviderError::timeout("temporary timeout");
//! assert_eq!(timeout.to_string(), "Timeout: temporary timeout");
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Authentication,
    RateLimited,
    InvalidRequest,
    Timeout,
    Transport,
    Unavailable,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Authentication, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::RateLimited, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidRequest, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Timeout, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transport, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unavailable, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Other, message)
    }

    /// Maps a non-success HTTP status from a vendor API onto an error kind.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = match status {
            401 | 403 => ProviderErrorKind::Authentication,
            429 => ProviderErrorKind::RateLimited,
            408 | 504 => ProviderErrorKind::Timeout,
            400 | 404 | 422 => ProviderErrorKind::InvalidRequest,
            502 | 503 => ProviderErrorKind::Unavailable,
            _ => ProviderErrorKind::Transport,
        };
        Self::new(kind, message)
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ProviderError {}

#[cfg(any(feature = "provider-openai", feature = "provider-ollama"))]
impl From<reqwest::Error> for ProviderError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            ProviderError::timeout(value.to_string())
        } else {
            ProviderError::transport(value.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ProviderError, ProviderErrorKind};

    #[test]
    fn from_status_groups_vendor_statuses() {
        let kinds = [401, 403, 429, 408, 504, 400, 404, 422, 502, 503, 500]
            .map(|status| ProviderError::from_status(status, "failed").kind);
        assert_eq!(
            kinds,
            [
                ProviderErrorKind::Authentication,
                ProviderErrorKind::Authentication,
                ProviderErrorKind::RateLimited,
                ProviderErrorKind::Timeout,
                ProviderErrorKind::Timeout,
                ProviderErrorKind::InvalidRequest,
                ProviderErrorKind::InvalidRequest,
                ProviderErrorKind::InvalidRequest,
                ProviderErrorKind::Unavailable,
                ProviderErrorKind::Unavailable,
                ProviderErrorKind::Transport,
            ]
        );
    }
}
