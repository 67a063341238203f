//! Request signature the Union API verifies on every signed call.
//!
//! The algorithm has to match the platform byte for byte: params with empty
//! values are excluded, the rest are sorted by key and joined as `key=value`
//! pairs, prefixed with the token/timestamp/nonce triple, and the whole
//! string is HMAC-SHA256'd with the client secret.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// HMAC-SHA256 keyed with the client secret.
type HmacSha256 = Hmac<Sha256>;

/// Compute the `X-Api-Sign` value for one outgoing request.
///
/// Pure function of its inputs; `params` entries with empty values are
/// ignored, which must agree with what the sender actually transmits.
/// Returns the signature as lowercase hex.
#[must_use]
pub fn sign_request(
    client_secret: &str,
    access_token: &str,
    timestamp_ms: &str,
    nonce: &str,
    params: &BTreeMap<String, String>,
) -> String {
    let param_str = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut base_str =
        format!("access_token={access_token}&timestamp={timestamp_ms}&nonce={nonce}");
    if !param_str.is_empty() {
        base_str.push('&');
        base_str.push_str(&param_str);
    }

    let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(base_str.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
