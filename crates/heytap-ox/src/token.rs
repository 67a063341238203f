//! Expiry-aware cache for the client-credentials access token.

use chrono::{DateTime, Duration, Utc};

/// Safety margin subtracted from the platform's `expire_in` so a token is
/// never used right at its real expiry.
const EXPIRY_MARGIN_SECS: i64 = 300;

/// Cached token state. Either empty/expired or holding a token that is
/// valid strictly before `expires_at`.
#[derive(Debug, Default)]
pub(crate) struct TokenCache {
    cached: Option<CachedToken>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl TokenCache {
    /// Returns the cached token while `now` is strictly inside the validity
    /// window, without any network activity.
    pub(crate) fn valid(&self, now: DateTime<Utc>) -> Option<String> {
        self.cached
            .as_ref()
            .filter(|c| now < c.expires_at)
            .map(|c| c.token.clone())
    }

    /// Stores a freshly acquired token and returns it.
    pub(crate) fn store(
        &mut self,
        token: impl Into<String>,
        expire_in_secs: i64,
        now: DateTime<Utc>,
    ) -> String {
        let token = token.into();
        self.cached = Some(CachedToken {
            token: token.clone(),
            expires_at: now + Duration::seconds(expire_in_secs - EXPIRY_MARGIN_SECS),
        });
        token
    }
}
