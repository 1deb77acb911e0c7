//! HMAC request-signing protocol
//!
//! Reproduces the provider's expected scheme bit-exactly: an
//! HMAC-SHA256 signature over a three-line base string (signed host,
//! date, and request-line headers), wrapped in a base64-encoded
//! authorization parameter string.

use crate::error::AdvisoryError;
use crate::models::SignedHeaders;
use crate::Result;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SIGNING_ALGORITHM: &str = "hmac-sha256";
const SIGNED_HEADERS: &str = "host date request-line";

/// HTTP-date form, always GMT
pub fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Three newline-joined lines: signed host, date, and the literal
/// HTTP request line.
fn signature_base(host: &str, date: &str, method: &str, path: &str) -> String {
    format!("host: {}\ndate: {}\n{} {} HTTP/1.1", host, date, method, path)
}

/// Build the signed headers for one outbound request.
///
/// The authorization value is `Bearer <b64(params)>` where `params`
/// embeds the API key, algorithm name, signed header names, and the
/// base64 HMAC signature.
pub fn sign_request(
    api_key: &str,
    api_secret: &str,
    host: &str,
    method: &str,
    path: &str,
    date: &str,
) -> Result<SignedHeaders> {
    if api_key.is_empty() || api_secret.is_empty() {
        return Err(AdvisoryError::Signing(
            "advisory API key or secret not configured".to_string(),
        ));
    }

    let base = signature_base(host, date, method, path);

    let mut mac = HmacSha256::new_from_slice(api_secret.as_bytes())
        .map_err(|e| AdvisoryError::Signing(format!("invalid HMAC key: {}", e)))?;
    mac.update(base.as_bytes());
    let signature = BASE64.encode(mac.finalize().into_bytes());

    let params = format!(
        "hmac api_key=\"{}\", algorithm=\"{}\", headers=\"{}\", signature=\"{}\"",
        api_key, SIGNING_ALGORITHM, SIGNED_HEADERS, signature
    );

    Ok(SignedHeaders {
        authorization: format!("Bearer {}", BASE64.encode(params.as_bytes())),
        date: date.to_string(),
        host: host.to_string(),
    })
}
