use crate::serde::date;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Aggregated activity counters for one user and one calendar day.
///
/// A user has at most one `DailyStats` record per date; the pair
/// (`user_id`, `date`) is the identity, there is no separate row id.
/// Counters that were never written are zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub user_id: String,
    #[serde(with = "date")]
    pub date: NaiveDate,
    pub steps: u32,
    pub distance_km: f64,
    pub calories: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DailyStats {
    /// Deserializes a [`DailyStats`] instance from a JSON string.
    pub fn from_json(json: &str) -> serde_json::Result<DailyStats> {
        serde_json::from_str(json)
    }

    /// Serializes a [`DailyStats`] into a JSON `String`.
    pub fn to_json(stats: &DailyStats) -> serde_json::Result<String> {
        serde_json::to_string(stats)
    }
}

/// A partial update for today's counters. Fields left as `None` keep
/// their stored value, or zero if the record is created by the update.
#[derive(Debug, Clone, Default)]
pub struct StatsUpdate {
    pub steps: Option<u32>,
    pub distance_km: Option<f64>,
    pub calories: Option<u32>,
}
