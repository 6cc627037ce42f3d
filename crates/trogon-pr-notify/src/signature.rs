use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PREFIX: &str = "sha256=";

/// Why a webhook body failed authentication. All map to HTTP 401.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SignatureError {
    /// No secret is configured; webhooks are rejected rather than trusted.
    #[error("webhook secret is not configured")]
    SecretNotConfigured,

    #[error("missing sha256 signature")]
    MissingSignature,

    #[error("signature is not valid hex")]
    BadSignatureHex,

    #[error("signature mismatch")]
    SignatureMismatch,
}

/// Verifies a GitHub webhook signature using constant-time comparison.
///
/// GitHub sends `X-Hub-Signature-256: sha256=<hex>`. This validates the
/// HMAC-SHA256 of the exact raw request body against that header value.
/// Must run before the body is parsed.
pub fn verify(secret: &[u8], body: &[u8], signature_header: Option<&str>) -> Result<(), SignatureError> {
    if secret.is_empty() {
        return Err(SignatureError::SecretNotConfigured);
    }

    let hex_sig = signature_header
        .and_then(|h| h.strip_prefix(SIGNATURE_PREFIX))
        .ok_or(SignatureError::MissingSignature)?;

    let provided = hex::decode(hex_sig).map_err(|_| SignatureError::BadSignatureHex)?;

    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::SignatureMismatch)?;
    mac.update(body);
    mac.verify_slice(&provided)
        .map_err(|_| SignatureError::SignatureMismatch)
}
