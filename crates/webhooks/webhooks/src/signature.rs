//! HMAC signature generation and verification.
//!
//! GitHub signs the raw request body with the hook secret and sends the
//! result as `<algorithm>=<hex digest>`. The digest must be computed over the
//! body bytes exactly as received, before any JSON decoding.

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;

use crate::error::SignatureError;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Keyed hash used to sign webhook bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    /// HMAC-SHA1, sent as `X-Hub-Signature: sha1=<hex>`.
    #[default]
    Sha1,
    /// HMAC-SHA256, sent as `X-Hub-Signature-256: sha256=<hex>`.
    Sha256,
}

impl SignatureAlgorithm {
    /// Tag used before the `=` in the header value.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }

    /// Header carrying signatures for this algorithm.
    pub fn header_name(&self) -> &'static str {
        match self {
            Self::Sha1 => "X-Hub-Signature",
            Self::Sha256 => "X-Hub-Signature-256",
        }
    }

    /// Digest length in bytes.
    pub fn digest_len(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
        }
    }

    fn digest(&self, secret: &[u8], body: &[u8]) -> Result<Vec<u8>, SignatureError> {
        match self {
            Self::Sha1 => {
                let mut mac =
                    HmacSha1::new_from_slice(secret).map_err(|_| SignatureError::Invalid)?;
                mac.update(body);
                Ok(mac.finalize().into_bytes().to_vec())
            }
            Self::Sha256 => {
                let mut mac =
                    HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::Invalid)?;
                mac.update(body);
                Ok(mac.finalize().into_bytes().to_vec())
            }
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("sha1") {
            Ok(Self::Sha1)
        } else if s.eq_ignore_ascii_case("sha256") {
            Ok(Self::Sha256)
        } else {
            Err(SignatureError::UnsupportedAlgorithm(s.to_string()))
        }
    }
}

/// Webhook signer for generating and verifying signatures.
#[derive(Clone)]
pub struct WebhookSigner {
    secret: String,
    algorithm: SignatureAlgorithm,
}

impl WebhookSigner {
    /// Creates a new HMAC-SHA1 signer with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            algorithm: SignatureAlgorithm::Sha1,
        }
    }

    /// Sets the signing algorithm.
    pub fn with_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Returns the signing algorithm.
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Returns true when no secret is configured and verification is skipped.
    pub fn is_insecure(&self) -> bool {
        self.secret.is_empty()
    }

    /// Generates a full signature header value for `body`.
    pub fn sign_header(&self, body: &[u8]) -> Result<String, SignatureError> {
        let digest = self.algorithm.digest(self.secret.as_bytes(), body)?;
        Ok(format!("{}={}", self.algorithm.tag(), hex::encode(digest)))
    }

    /// Verifies a signature header against the raw body.
    ///
    /// Always succeeds when the secret is empty.
    pub fn verify_header(&self, header: Option<&str>, body: &[u8]) -> Result<(), SignatureError> {
        if self.is_insecure() {
            return Ok(());
        }

        let header = header.filter(|h| !h.is_empty()).ok_or(SignatureError::Missing)?;
        let (tag, hex_digest) = header.split_once('=').ok_or(SignatureError::Malformed)?;

        if !tag.eq_ignore_ascii_case(self.algorithm.tag()) {
            return Err(SignatureError::UnsupportedAlgorithm(tag.to_string()));
        }

        let supplied = hex::decode(hex_digest).map_err(|_| SignatureError::Malformed)?;
        if supplied.len() != self.algorithm.digest_len() {
            return Err(SignatureError::Malformed);
        }

        let expected = self.algorithm.digest(self.secret.as_bytes(), body)?;
        if constant_time_eq(&expected, &supplied) {
            Ok(())
        } else {
            Err(SignatureError::Invalid)
        }
    }

    /// Verifies a signature header, collapsing every failure to `false`.
    pub fn verify(&self, header: Option<&str>, body: &[u8]) -> bool {
        self.verify_header(header, body).is_ok()
    }
}

impl fmt::Debug for WebhookSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookSigner")
            .field("secret", &if self.is_insecure() { "<empty>" } else { "<redacted>" })
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// Verifies a `sha1=<hex>` signature of `body` made with `secret`.
///
/// An empty secret disables verification and returns true; callers are
/// expected to log that. An empty or malformed header returns false.
pub fn verify(secret: &str, signature: &str, body: &[u8]) -> bool {
    WebhookSigner::new(secret).verify(Some(signature), body)
}

/// Compares two digests without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
