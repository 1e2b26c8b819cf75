use thiserror::Error;

/// Failure of a single request against the forge.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not found or no access (HTTP {0})")]
    Inaccessible(u16),
    #[error("HTTP error {status}: {reason}")]
    Http { status: u16, reason: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid response payload: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn is_inaccessible(&self) -> bool {
        matches!(self, FetchError::Inaccessible(_))
    }
}

impl From<ureq::Error> for FetchError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status @ (401 | 403 | 404), _) => FetchError::Inaccessible(status),
            ureq::Error::Status(status, response) => FetchError::Http {
                status,
                reason: response.status_text().to_string(),
            },
            ureq::Error::Transport(transport) => FetchError::Transport(transport.to_string()),
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inaccessible_is_detected() {
        assert!(FetchError::Inaccessible(404).is_inaccessible());
        assert!(!FetchError::Transport("reset".to_string()).is_inaccessible());
    }

    #[test]
    fn display_includes_status() {
        let err = FetchError::Http {
            status: 502,
            reason: "Bad Gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 502: Bad Gateway");
        assert_eq!(
            FetchError::Inaccessible(403).to_string(),
            "not found or no access (HTTP 403)"
        );
    }
}
