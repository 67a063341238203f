//! The Union API client and its three domain operations.

use core::fmt;
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use bon::Builder;
use chrono::{Local, Utc};

use crate::{
    app::App,
    error::HeytapRequestError,
    internal::HeytapRequestHelper,
    report::{MediaReport, MediaStatus},
    response::{ApiEnvelope, IncomeQuery, MediaItem, MediaQuery, TokenEnvelope},
    slot::SlotRequest,
    token::TokenCache,
};

const BASE_URL: &str = "https://openapi.heytapmobi.com";

/// Fixed per-call timeout. A timed-out call surfaces as a transport failure,
/// not an error.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Union API client bound to one credential set. Cloning shares the token
/// lifecycle; separate credential sets need separate clients.
#[derive(Clone, Builder)]
pub struct Heytap {
    #[builder(into)]
    pub(crate) client_id: String,
    #[builder(into)]
    pub(crate) client_secret: String,
    /// Platform media id, sent as `appId` on create calls.
    #[builder(into)]
    pub(crate) media_id: String,
    #[builder(default = default_http_client())]
    pub(crate) client: reqwest::Client,
    #[builder(default = BASE_URL.to_string(), into)]
    pub(crate) base_url: String,
    #[builder(skip)]
    pub(crate) token_cache: Arc<Mutex<TokenCache>>,
}

fn default_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("Failed to create HTTP client")
}

impl Heytap {
    /// Create a new client with the given credential set.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        media_id: impl Into<String>,
    ) -> Self {
        Self::builder()
            .client_id(client_id.into())
            .client_secret(client_secret.into())
            .media_id(media_id.into())
            .build()
    }

    /// Build a client from one registry entry. Every app owns an independent
    /// token lifecycle.
    #[must_use]
    pub fn for_app(app: &App) -> Self {
        Self::new(
            app.client_id.clone(),
            app.client_secret.clone(),
            app.media_id.clone(),
        )
    }

    /// Like [`Heytap::for_app`] with an overridden API base URL.
    #[must_use]
    pub fn for_app_at(app: &App, base_url: impl Into<String>) -> Self {
        Self::builder()
            .client_id(app.client_id.clone())
            .client_secret(app.client_secret.clone())
            .media_id(app.media_id.clone())
            .base_url(base_url)
            .build()
    }

    /// Base URL for the API
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create request helper for internal use
    fn request_helper(&self) -> HeytapRequestHelper {
        HeytapRequestHelper::new(self.client.clone(), &self.base_url, &self.client_secret)
    }

    /// Cached access token while it is still valid, otherwise exactly one
    /// client-credentials request against the token endpoint.
    pub(crate) async fn access_token(&self) -> Result<String, HeytapRequestError> {
        if let Some(token) = self
            .token_cache
            .lock()
            .expect("token cache lock")
            .valid(Utc::now())
        {
            return Ok(token);
        }

        let url = format!("{}/oauth2/v1/token", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| HeytapRequestError::Auth {
                message: e.to_string(),
            })?;

        let envelope: TokenEnvelope =
            response
                .json()
                .await
                .map_err(|e| HeytapRequestError::Auth {
                    message: e.to_string(),
                })?;

        if envelope.code != 0 {
            // Nothing is cached on failure; the next call retries from
            // scratch.
            return Err(HeytapRequestError::Auth {
                message: envelope
                    .message
                    .unwrap_or_else(|| format!("token endpoint returned code {}", envelope.code)),
            });
        }

        let data = envelope.data.ok_or_else(|| HeytapRequestError::Auth {
            message: "token response missing data".to_string(),
        })?;

        Ok(self
            .token_cache
            .lock()
            .expect("token cache lock")
            .store(data.access_token, data.expire_in, Utc::now()))
    }

    /// Create one ad slot. Returns the raw envelope; `code == 0` means the
    /// slot exists and `data.posId` identifies it. Transport and platform
    /// failures both come back as non-zero envelopes so batch processing can
    /// keep going; only token acquisition aborts with an error.
    pub async fn create_ad_slot(
        &self,
        request: &SlotRequest,
    ) -> Result<ApiEnvelope, HeytapRequestError> {
        let token = self.access_token().await?;
        Ok(self
            .request_helper()
            .post_signed(
                "union/v1/order/create",
                &token,
                request.params(&self.media_id),
            )
            .await)
    }

    /// Look up the review status of media accounts matching `app_name`.
    ///
    /// Transport and platform failures keep the uniform `code != 0`
    /// envelope shape (with an empty report list) rather than erroring, the
    /// same contract as [`Heytap::create_ad_slot`] and
    /// [`Heytap::query_income`].
    pub async fn query_media_status(
        &self,
        app_name: &str,
    ) -> Result<MediaQuery, HeytapRequestError> {
        let token = self.access_token().await?;

        let mut params = BTreeMap::new();
        params.insert("page".to_string(), "1".to_string());
        params.insert("rows".to_string(), "10".to_string());
        params.insert("searchingWord".to_string(), app_name.to_string());

        let envelope = self
            .request_helper()
            .post_signed("union/v1/app/list", &token, params)
            .await;

        let reports = if envelope.is_success() {
            let items: Vec<MediaItem> = envelope
                .data
                .as_ref()
                .and_then(|data| data.get("items"))
                .map(|items| serde_json::from_value(items.clone()))
                .transpose()?
                .unwrap_or_default();

            items
                .into_iter()
                .map(|item| MediaReport {
                    media_name: item.media_name.unwrap_or_default(),
                    status: MediaStatus::from_union_status(item.union_status),
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(MediaQuery { envelope, reports })
    }

    /// Pull the daily revenue report for today minus `day_offset` days
    /// (`1` is yesterday). The response is returned raw together with the
    /// resolved date; filtering and summing live in [`crate::report`].
    pub async fn query_income(
        &self,
        day_offset: i64,
    ) -> Result<IncomeQuery, HeytapRequestError> {
        let token = self.access_token().await?;

        let day = Local::now() - chrono::Duration::days(day_offset);
        let stamp = day.format("%Y%m%d").to_string();

        let mut params = BTreeMap::new();
        params.insert("startTime".to_string(), stamp.clone());
        params.insert("endTime".to_string(), stamp);
        params.insert("timeGranularity".to_string(), "day".to_string());

        let envelope = self
            .request_helper()
            .post_signed("union/api/report/appQuery", &token, params)
            .await;

        Ok(IncomeQuery {
            envelope,
            date: day.format("%Y-%m-%d").to_string(),
        })
    }
}

impl fmt::Debug for Heytap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heytap")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("media_id", &self.media_id)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
