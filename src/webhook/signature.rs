//! Webhook signature verification.
//!
//! The platform signs every delivery with an HMAC of the raw body keyed
//! by the app secret, sent as `x-hub-signature: sha1=<hex>`. The digest
//! must be computed over the exact bytes received — the parsed JSON
//! re-serializes differently.

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::error::SignatureError;

/// Header carrying the body digest.
pub const SIGNATURE_HEADER: &str = "x-hub-signature";

type HmacSha1 = Hmac<Sha1>;

/// Check `header` against the HMAC-SHA1 of `body` under `secret`.
///
/// A missing header is rejected outright. The digest comparison runs in
/// constant time via `Mac::verify_slice`.
pub fn verify(body: &[u8], header: Option<&str>, secret: &str) -> Result<(), SignatureError> {
    let header = header.ok_or(SignatureError::Missing)?;
    let (algorithm, digest_hex) = header
        .split_once('=')
        .ok_or_else(|| SignatureError::Malformed(header.to_string()))?;
    if algorithm != "sha1" {
        return Err(SignatureError::UnsupportedAlgorithm(algorithm.to_string()));
    }
    let digest =
        hex::decode(digest_hex.trim()).map_err(|_| SignatureError::Malformed(header.to_string()))?;
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|err| SignatureError::Malformed(err.to_string()))?;
    mac.update(body);
    mac.verify_slice(&digest).map_err(|_| SignatureError::Mismatch)
}

/// Produce the header value the platform would send for `body`.
pub fn sign(body: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(body);
    format!("sha1={}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "app-secret";

    #[test]
    fn signed_bodies_verify() {
        let body = br#"{"object":"page","entry":[]}"#;
        let header = sign(body, SECRET);
        assert!(verify(body, Some(&header), SECRET).is_ok());
    }

    #[test]
    fn any_body_mutation_fails_verification() {
        let body = b"payload bytes";
        let header = sign(body, SECRET);
        for i in 0..body.len() {
            let mut mutated = body.to_vec();
            mutated[i] ^= 0x01;
            assert!(
                matches!(
                    verify(&mutated, Some(&header), SECRET),
                    Err(SignatureError::Mismatch)
                ),
                "mutation at byte {i} should fail"
            );
        }
    }

    #[test]
    fn any_signature_mutation_fails_verification() {
        let body = b"payload bytes";
        let header = sign(body, SECRET);
        let (prefix, digest) = header.split_once('=').unwrap();
        for i in 0..digest.len() {
            let mut chars: Vec<char> = digest.chars().collect();
            chars[i] = if chars[i] == '0' { '1' } else { '0' };
            let tampered: String = chars.into_iter().collect();
            let result = verify(body, Some(&format!("{prefix}={tampered}")), SECRET);
            assert!(result.is_err(), "digest mutation at {i} should fail");
        }
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let body = b"payload bytes";
        let header = sign(body, SECRET);
        assert!(matches!(
            verify(body, Some(&header), "other-secret"),
            Err(SignatureError::Mismatch)
        ));
    }

    #[test]
    fn missing_header_is_rejected() {
        assert!(matches!(
            verify(b"body", None, SECRET),
            Err(SignatureError::Missing)
        ));
    }

    #[test]
    fn unsupported_algorithm_is_rejected() {
        assert!(matches!(
            verify(b"body", Some("sha256=abcdef"), SECRET),
            Err(SignatureError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn malformed_headers_are_rejected() {
        for header in ["sha1", "sha1=not-hex", "sha1=abc"] {
            let result = verify(b"body", Some(header), SECRET);
            assert!(result.is_err(), "{header} should be rejected");
        }
    }
}
