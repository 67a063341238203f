//! Application registry reference data.

use core::fmt;
use std::collections::HashSet;

use bon::Builder;
use serde::{Deserialize, Serialize};

/// One entry of the caller-supplied application registry. How the registry
/// is loaded or stored is the caller's business; the crate only needs the
/// credential set and the display names.
#[derive(Clone, Serialize, Deserialize, Builder)]
pub struct App {
    /// Display name, also the value the report endpoints key rows by.
    #[builder(into)]
    pub app_name: String,
    /// Owning company. Revenue reports are issued per company.
    #[builder(into)]
    pub company: String,
    #[builder(into)]
    pub client_id: String,
    #[builder(into)]
    pub client_secret: String,
    /// Platform media id, sent as `appId` on create calls.
    #[builder(into)]
    pub media_id: String,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("app_name", &self.app_name)
            .field("company", &self.company)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("media_id", &self.media_id)
            .finish()
    }
}

/// First app per distinct company, in registry order. The revenue report is
/// company-wide, so querying a second app of the same company would count
/// the same rows twice.
#[must_use]
pub fn one_per_company(apps: &[App]) -> Vec<&App> {
    let mut seen = HashSet::new();
    apps.iter()
        .filter(|app| seen.insert(app.company.as_str()))
        .collect()
}
