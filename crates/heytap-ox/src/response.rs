//! Response payloads returned by the Union API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::HeytapRequestError, report::MediaReport};

/// Envelope every Union endpoint wraps its payload in. `code == 0` means
/// success; anything else is a failure regardless of whether it came from
/// the platform or was synthesized locally for a transport error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope {
    /// Business status code, `0` on success.
    #[serde(default)]
    pub code: i64,
    /// Human-readable platform message.
    #[serde(default)]
    pub message: Option<String>,
    /// Endpoint-specific payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApiEnvelope {
    /// Whether the platform accepted the request.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Envelope standing in for a failure that never reached the platform
    /// (timeout, connection error, undecodable body).
    pub(crate) fn transport_failure(message: impl Into<String>) -> Self {
        Self {
            code: -1,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Convert a non-zero envelope into a
    /// [`Platform`](HeytapRequestError::Platform) error, for callers that
    /// would rather propagate than inspect codes.
    pub fn require_success(self) -> Result<Self, HeytapRequestError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(HeytapRequestError::Platform {
                code: self.code,
                message: self.message.unwrap_or_default(),
            })
        }
    }

    /// `data.posId` from a create response. The platform is not consistent
    /// about returning it as a string or a number.
    #[must_use]
    pub fn pos_id(&self) -> Option<String> {
        match self.data.as_ref()?.get("posId")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Token endpoint envelope. Kept separate from [`ApiEnvelope`] so the token
/// payload is typed instead of fished out of a `Value`.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenEnvelope {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<TokenData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenData {
    pub access_token: String,
    pub expire_in: i64,
}

/// One entry of `data.items` from the media list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    /// Display name of the media account.
    #[serde(default)]
    pub media_name: Option<String>,
    /// Raw review status code, mapped by [`crate::report::MediaStatus`].
    #[serde(default)]
    pub union_status: Option<i64>,
}

/// One row of the revenue report. Numeric fields arrive as strings or
/// numbers depending on the endpoint's mood, so they are kept raw here and
/// parsed on access.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeRow {
    #[serde(default)]
    pub app_name: Option<String>,
    /// `2` standard auction, `1` real-time bidding, absent when the report
    /// does not differentiate.
    #[serde(default)]
    pub bidding_type: Option<i64>,
    #[serde(default)]
    pub income: Option<Value>,
    #[serde(default)]
    pub ecpm: Option<Value>,
}

impl IncomeRow {
    /// Revenue for this row as a float, whatever wire type it arrived as.
    #[must_use]
    pub fn income_f64(&self) -> Option<f64> {
        number_or_string(self.income.as_ref()?)
    }

    /// Effective cost per mille for this row.
    #[must_use]
    pub fn ecpm_f64(&self) -> Option<f64> {
        number_or_string(self.ecpm.as_ref()?)
    }
}

fn number_or_string(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Raw media-list response plus its rows mapped to status labels. A
/// failed query (transport or platform) keeps its non-zero envelope and an
/// empty report list.
#[derive(Debug, Clone)]
pub struct MediaQuery {
    /// Unfiltered platform response.
    pub envelope: ApiEnvelope,
    /// One entry per matched media account; empty on failure.
    pub reports: Vec<MediaReport>,
}

/// Raw income response plus the day it covers (`YYYY-MM-DD`).
#[derive(Debug, Clone)]
pub struct IncomeQuery {
    /// Unfiltered platform response.
    pub envelope: ApiEnvelope,
    /// Resolved report date.
    pub date: String,
}

impl IncomeQuery {
    /// Report rows, empty when the envelope carries no parseable data.
    #[must_use]
    pub fn rows(&self) -> Vec<IncomeRow> {
        self.envelope
            .data
            .as_ref()
            .and_then(|data| serde_json::from_value(data.clone()).ok())
            .unwrap_or_default()
    }
}
