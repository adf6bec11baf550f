use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    /// Transport failure or timeout before a status line was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ScraperError {
    /// `true` for timeouts, transport failures, and non-2xx responses.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http(_) | Self::UnexpectedStatus { .. })
    }

    /// `true` when a payload arrived but could not be decoded.
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Deserialize { .. })
    }

    /// HTTP status code of a failed response, if the server produced one.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
