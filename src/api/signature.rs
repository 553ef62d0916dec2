use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::error;

/// Requests older than this (or this far in the future) are rejected as replays.
const MAX_REQUEST_AGE_SECS: u64 = 300;

fn mac_for(signing_secret: &str, timestamp: &str, request_body: &str) -> Option<Hmac<Sha256>> {
    let mut mac = match Hmac::<Sha256>::new_from_slice(signing_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            error!("Failed to create HMAC: {}", e);
            return None;
        }
    };
    mac.update(format!("v0:{timestamp}:{request_body}").as_bytes());
    Some(mac)
}

/// Checks a Slack `v0` request signature at the current time.
#[must_use]
pub fn verify_slack_signature(
    request_body: &str,
    timestamp: &str,
    signature: &str,
    signing_secret: &str,
) -> bool {
    let now_secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    verify_slack_signature_at(request_body, timestamp, signature, signing_secret, now_secs)
}

#[must_use]
pub fn verify_slack_signature_at(
    request_body: &str,
    timestamp: &str,
    signature: &str,
    signing_secret: &str,
    now_secs: u64,
) -> bool {
    let Ok(ts) = timestamp.parse::<u64>() else {
        error!("Invalid X-Slack-Request-Timestamp: {}", timestamp);
        return false;
    };
    if ts.abs_diff(now_secs) > MAX_REQUEST_AGE_SECS {
        error!("Timestamp out of range, potential replay attack");
        return false;
    }

    let Some(expected) = signature.strip_prefix("v0=").and_then(|hex_sig| hex::decode(hex_sig).ok())
    else {
        error!("Malformed X-Slack-Signature header");
        return false;
    };

    let Some(mac) = mac_for(signing_secret, timestamp, request_body) else {
        return false;
    };

    if mac.verify_slice(&expected).is_ok() {
        true
    } else {
        error!("Slack signature verification failed");
        false
    }
}

/// Computes the `v0=` signature Slack would send for a body.
#[must_use]
pub fn compute_signature(timestamp: &str, request_body: &str, signing_secret: &str) -> String {
    mac_for(signing_secret, timestamp, request_body).map_or_else(String::new, |mac| {
        format!("v0={}", hex::encode(mac.finalize().into_bytes()))
    })
}
