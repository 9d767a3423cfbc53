//! Slack request signing: `X-Slack-Signature: v0=<hex hmac-sha256>` over
//! `v0:{X-Slack-Request-Timestamp}:{raw body}`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{Result, SlackError};

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

/// Requests older (or newer) than this are rejected to stop replays.
pub const MAX_SKEW_SECS: i64 = 60 * 5;

/// Check a request signature against `secret`.
///
/// `now` is unix seconds; pass `chrono::Utc::now().timestamp()` in production.
pub fn verify_signature(
    secret: &str,
    timestamp: Option<&str>,
    signature: Option<&str>,
    body: &[u8],
    now: i64,
) -> Result<()> {
    let timestamp = timestamp.ok_or(SlackError::MissingHeader(TIMESTAMP_HEADER))?;
    let signature = signature.ok_or(SlackError::MissingHeader(SIGNATURE_HEADER))?;

    let sent_at: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| SlackError::StaleTimestamp)?;
    if (now - sent_at).abs() > MAX_SKEW_SECS {
        return Err(SlackError::StaleTimestamp);
    }

    let expected = signature
        .strip_prefix("v0=")
        .and_then(|hex_sig| hex::decode(hex_sig).ok())
        .ok_or(SlackError::BadSignature)?;

    signing_mac(secret, timestamp, body)?
        .verify_slice(&expected)
        .map_err(|_| SlackError::BadSignature)
}

/// Produce the header value Slack would send for `body`.
pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> Result<String> {
    let mac = signing_mac(secret, timestamp, body)?;
    Ok(format!("v0={}", hex::encode(mac.finalize().into_bytes())))
}

fn signing_mac(secret: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SlackError::BadSignature)?;
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
    const BODY: &[u8] = b"token=xyz&command=%2Fresearch&text=Acme";

    #[test]
    fn accepts_valid_signature() {
        let now = 1_700_000_000;
        let ts = now.to_string();
        let sig = sign(SECRET, &ts, BODY).unwrap();
        assert!(verify_signature(SECRET, Some(&ts), Some(&sig), BODY, now).is_ok());
    }

    #[test]
    fn rejects_tampered_body() {
        let now = 1_700_000_000;
        let ts = now.to_string();
        let sig = sign(SECRET, &ts, BODY).unwrap();
        let err = verify_signature(SECRET, Some(&ts), Some(&sig), b"text=Globex", now).unwrap_err();
        assert!(matches!(err, SlackError::BadSignature));
    }

    #[test]
    fn rejects_wrong_secret() {
        let now = 1_700_000_000;
        let ts = now.to_string();
        let sig = sign("other", &ts, BODY).unwrap();
        assert!(verify_signature(SECRET, Some(&ts), Some(&sig), BODY, now).is_err());
    }

    #[test]
    fn rejects_stale_timestamp() {
        let sent = 1_700_000_000;
        let ts = sent.to_string();
        let sig = sign(SECRET, &ts, BODY).unwrap();
        let err = verify_signature(SECRET, Some(&ts), Some(&sig), BODY, sent + MAX_SKEW_SECS + 1)
            .unwrap_err();
        assert!(matches!(err, SlackError::StaleTimestamp));
        assert!(verify_signature(SECRET, Some(&ts), Some(&sig), BODY, sent + MAX_SKEW_SECS).is_ok());
    }

    #[test]
    fn rejects_missing_or_malformed_headers() {
        let now = 1_700_000_000;
        let ts = now.to_string();
        assert!(matches!(
            verify_signature(SECRET, None, Some("v0=00"), BODY, now),
            Err(SlackError::MissingHeader(TIMESTAMP_HEADER))
        ));
        assert!(matches!(
            verify_signature(SECRET, Some(&ts), None, BODY, now),
            Err(SlackError::MissingHeader(SIGNATURE_HEADER))
        ));
        assert!(matches!(
            verify_signature(SECRET, Some(&ts), Some("sha256=abc"), BODY, now),
            Err(SlackError::BadSignature)
        ));
        assert!(matches!(
            verify_signature(SECRET, Some("yesterday"), Some("v0=00"), BODY, now),
            Err(SlackError::StaleTimestamp)
        ));
    }
}
