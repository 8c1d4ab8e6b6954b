//! Webhook error types.

use thiserror::Error;

/// Reasons a signature header is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// No signature header was sent.
    #[error("Missing signature")]
    Missing,

    /// The header is not `<algorithm>=<hex digest>`, or the digest is not
    /// valid hex of the right length.
    #[error("Malformed signature header")]
    Malformed,

    /// The header names an algorithm other than the configured one.
    #[error("Unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The digest does not match the body.
    #[error("Invalid signature")]
    Invalid,
}

/// Error type for rejected webhook requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// The request used a method other than POST.
    #[error("Unsupported method: {method}")]
    UnsupportedMethod { method: String },

    /// Signature verification failed.
    #[error(transparent)]
    InvalidSignature(#[from] SignatureError),
}

impl WebhookError {
    /// Returns an HTTP status code appropriate for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnsupportedMethod { .. } => 405,
            Self::InvalidSignature(_) => 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let err = WebhookError::UnsupportedMethod {
            method: "GET".into(),
        };
        assert_eq!(err.status_code(), 405);
        assert_eq!(WebhookError::from(SignatureError::Invalid).status_code(), 400);
        assert_eq!(WebhookError::from(SignatureError::Missing).status_code(), 400);
    }

    #[test]
    fn test_error_display() {
        let err = WebhookError::from(SignatureError::UnsupportedAlgorithm("md5".into()));
        assert_eq!(err.to_string(), "Unsupported signature algorithm: md5");
    }
}
