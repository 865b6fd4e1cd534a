// stagecoach_service/src/github/signature.rs

//! Verification of `X-Hub-Signature-256` webhook signatures.

use crate::errors::{AppError, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;

pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";
const SIGNATURE_PREFIX: &str = "sha256=";

type HmacSha256 = Hmac<Sha256>;

/// Checks that `header` is `sha256=<hex HMAC-SHA256 of body keyed by secret>`.
/// The digest comparison is constant-time.
pub fn verify(secret: &[u8], body: &[u8], header: Option<&str>) -> Result<()> {
  let header = header.ok_or_else(|| AppError::Signature(format!("missing {} header", SIGNATURE_HEADER)))?;
  let hex_digest = header
    .strip_prefix(SIGNATURE_PREFIX)
    .ok_or_else(|| AppError::Signature("signature is not a sha256 digest".to_string()))?;
  let expected = hex::decode(hex_digest).map_err(|e| AppError::Signature(format!("malformed signature: {}", e)))?;

  let mut mac = HmacSha256::new_from_slice(secret).map_err(|e| AppError::Internal(e.to_string()))?;
  mac.update(body);
  mac
    .verify_slice(&expected)
    .map_err(|_| AppError::Signature("payload signature does not match".to_string()))
}

/// Produces the header value GitHub would send for `body`.
#[cfg(test)]
pub fn sign(secret: &[u8], body: &[u8]) -> Result<String> {
  let mut mac = HmacSha256::new_from_slice(secret).map_err(|e| AppError::Internal(e.to_string()))?;
  mac.update(body);
  Ok(format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes())))
}
