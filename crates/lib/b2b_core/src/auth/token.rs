//! Client-side JWT expiry check.
//!
//! The signature is not verified here; the backend does that on every
//! request. This only reads the `exp` claim so a stale session is dropped
//! without a round trip.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
enum TokenError {
    #[error("expected 3 segments, found {0}")]
    SegmentCount(usize),

    #[error("payload is not base64")]
    Encoding,

    #[error("payload is not a JSON object")]
    Payload,

    #[error("exp claim is not a number")]
    Expiry,
}

/// `exp` claim in seconds, `None` when the token carries no expiry.
fn decode_expiry(token: &str) -> Result<Option<f64>, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::SegmentCount(segments.len()));
    }

    let payload = segments[1];
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| URL_SAFE.decode(payload))
        .or_else(|_| STANDARD.decode(payload))
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .map_err(|_| TokenError::Encoding)?;

    let claims: Value = serde_json::from_slice(&bytes).map_err(|_| TokenError::Payload)?;
    let Value::Object(claims) = claims else {
        return Err(TokenError::Payload);
    };

    match claims.get("exp") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map(Some).ok_or(TokenError::Expiry),
        Some(_) => Err(TokenError::Expiry),
    }
}

/// Whether `token` is well-formed and unexpired at `now`.
///
/// Tokens without an `exp` claim never expire.
pub fn is_token_valid_at(token: &str, now: DateTime<Utc>) -> bool {
    let now_secs = now.timestamp_millis() as f64 / 1000.0;
    match decode_expiry(token) {
        Ok(None) => true,
        Ok(Some(exp)) => exp > now_secs,
        Err(_) => false,
    }
}

pub fn is_token_valid(token: &str) -> bool {
    is_token_valid_at(token, Utc::now())
}

/// Expiry time of a well-formed token, if it has one.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let exp = decode_expiry(token).ok()??;
    DateTime::from_timestamp_millis((exp * 1000.0) as i64)
}
