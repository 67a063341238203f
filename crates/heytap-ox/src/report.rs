//! Status labels and revenue aggregation on top of the raw query responses.

use core::fmt;
use std::collections::HashSet;

use chrono::Local;

use crate::{
    app::{App, one_per_company},
    client::Heytap,
    error::HeytapRequestError,
    response::IncomeRow,
};

/// Union review status of a media account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaStatus {
    Normal,
    Frozen,
    Unknown,
}

impl MediaStatus {
    /// `unionStatus` mapping: `2` normal, `4` frozen, anything else unknown.
    #[must_use]
    pub fn from_union_status(status: Option<i64>) -> Self {
        match status {
            Some(2) => MediaStatus::Normal,
            Some(4) => MediaStatus::Frozen,
            _ => MediaStatus::Unknown,
        }
    }

    /// Frozen accounts are the state the status poll exists to catch.
    #[must_use]
    pub fn is_frozen(self) -> bool {
        matches!(self, MediaStatus::Frozen)
    }
}

impl fmt::Display for MediaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MediaStatus::Normal => "正常",
            MediaStatus::Frozen => "冻结",
            MediaStatus::Unknown => "未知",
        };
        f.write_str(label)
    }
}

/// One media row with its mapped status.
#[derive(Debug, Clone)]
pub struct MediaReport {
    pub media_name: String,
    pub status: MediaStatus,
}

/// Per-app revenue line the filter kept.
#[derive(Debug, Clone)]
pub struct IncomeLine {
    pub app_name: String,
    pub income: f64,
    pub ecpm: Option<f64>,
}

/// Kept lines plus their total.
#[derive(Debug, Clone, Default)]
pub struct IncomeSummary {
    pub lines: Vec<IncomeLine>,
    pub total: f64,
}

/// Filter and sum revenue rows.
///
/// A row counts when its `biddingType` is `2` (standard auction) or absent
/// (undifferentiated), and its app is one of `known_apps`. Rows with any
/// other bidding type are dropped entirely.
#[must_use]
pub fn sum_income<'a, I>(rows: I, known_apps: &HashSet<&str>) -> IncomeSummary
where
    I: IntoIterator<Item = &'a IncomeRow>,
{
    let mut summary = IncomeSummary::default();
    for row in rows {
        if !matches!(row.bidding_type, Some(2) | None) {
            continue;
        }
        let Some(app_name) = row.app_name.as_deref() else {
            continue;
        };
        if !known_apps.contains(app_name) {
            continue;
        }
        let income = row.income_f64().unwrap_or(0.0);
        summary.total += income;
        summary.lines.push(IncomeLine {
            app_name: app_name.to_string(),
            income,
            ecpm: row.ecpm_f64(),
        });
    }
    summary
}

/// Total revenue across a whole registry for today minus `day_offset` days.
///
/// Reports are issued per company, so one client is built for the first app
/// of each distinct company while the app-name filter still spans the full
/// registry. Returns the summary and the report date (`YYYY-MM-DD`). Failed
/// company queries contribute nothing; only token acquisition aborts.
pub async fn registry_income(
    apps: &[App],
    day_offset: i64,
) -> Result<(IncomeSummary, String), HeytapRequestError> {
    registry_income_with(apps, day_offset, Heytap::for_app).await
}

/// [`registry_income`] with an explicit client factory, for callers that
/// need their own base URL or HTTP client per credential set.
pub async fn registry_income_with<F>(
    apps: &[App],
    day_offset: i64,
    make_client: F,
) -> Result<(IncomeSummary, String), HeytapRequestError>
where
    F: Fn(&App) -> Heytap,
{
    let known: HashSet<&str> = apps.iter().map(|app| app.app_name.as_str()).collect();
    let date = (Local::now() - chrono::Duration::days(day_offset))
        .format("%Y-%m-%d")
        .to_string();

    let mut summary = IncomeSummary::default();
    for app in one_per_company(apps) {
        let client = make_client(app);
        let query = client.query_income(day_offset).await?;
        if !query.envelope.is_success() {
            continue;
        }
        let part = sum_income(&query.rows(), &known);
        summary.total += part.total;
        summary.lines.extend(part.lines);
    }

    Ok((summary, date))
}
