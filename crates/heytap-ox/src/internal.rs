//! Shared plumbing for signed POST calls.

use std::collections::BTreeMap;

use chrono::Utc;
use rand::Rng;

use crate::{response::ApiEnvelope, sign::sign_request};

/// Upper bound (inclusive) for the signing nonce.
const NONCE_MAX: u32 = 20_000;

/// Helper that stamps, signs and sends one form-encoded request.
pub(crate) struct HeytapRequestHelper {
    client: reqwest::Client,
    base_url: String,
    client_secret: String,
}

impl HeytapRequestHelper {
    pub(crate) fn new(client: reqwest::Client, base_url: &str, client_secret: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            client_secret: client_secret.to_string(),
        }
    }

    /// POST `params` to `path` with the platform's signed-header set.
    ///
    /// Empty values are dropped before signing so the signed set and the
    /// transmitted set are the same; the `BTreeMap` keeps both sorted by key.
    /// Transport failures (timeout, connection error, undecodable body) come
    /// back as a `code: -1` envelope instead of an error so callers can treat
    /// every non-zero code uniformly.
    pub(crate) async fn post_signed(
        &self,
        path: &str,
        access_token: &str,
        mut params: BTreeMap<String, String>,
    ) -> ApiEnvelope {
        params.retain(|_, v| !v.is_empty());

        let timestamp = Utc::now().timestamp_millis().to_string();
        let nonce = rand::thread_rng().gen_range(0..=NONCE_MAX).to_string();
        let signature = sign_request(
            &self.client_secret,
            access_token,
            &timestamp,
            &nonce,
            &params,
        );

        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        let request = self
            .client
            .post(&url)
            .header("Authorization", access_token)
            .header("X-Client-Send-Utc-Ms", &timestamp)
            .header("X-Nonce", &nonce)
            .header("X-Api-Sign", &signature)
            .form(&params);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return ApiEnvelope::transport_failure(e.to_string()),
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return ApiEnvelope::transport_failure(e.to_string()),
        };

        // A non-2xx with a JSON envelope is still a platform answer; only a
        // body that does not decode becomes a transport failure.
        match serde_json::from_slice::<ApiEnvelope>(&bytes) {
            Ok(envelope) => envelope,
            Err(_) => ApiEnvelope::transport_failure(format!(
                "HTTP {}: {}",
                status.as_u16(),
                String::from_utf8_lossy(&bytes)
            )),
        }
    }
}
