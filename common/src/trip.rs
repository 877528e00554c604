use crate::{route_point::RoutePoint, serde::date};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Represents the result of a completed recording before it is persisted.
///
/// A `TripSummary` is produced by the recorder when a recording stops with
/// enough samples. It carries everything a persistence gateway needs to
/// create a stored trip, but no identity or ownership yet.
///
/// # Fields
///
/// - `name` – A display name for the trip.
/// - `date` – The calendar date the recording completed, ISO 8601 on the wire.
/// - `distance_km` – The accumulated great-circle distance in kilometers.
/// - `duration_min` – The recording duration in whole minutes, never negative.
/// - `route` – The ordered location samples that make up the route.
///
/// # Example
///
/// ```rust
/// use common::{route_point::RoutePoint, trip::TripSummary};
/// use chrono::NaiveDate;
///
/// let summary = TripSummary {
///     name: "Morning walk".into(),
///     date: NaiveDate::from_ymd_opt(2026, 8, 22).unwrap(),
///     distance_km: 0.157,
///     duration_min: 2,
///     route: vec![
///         RoutePoint::new(4.711, -74.0721, 1755000000000),
///         RoutePoint::new(4.712, -74.0711, 1755000060000),
///     ],
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    pub name: String,
    #[serde(with = "date")]
    pub date: NaiveDate,
    pub distance_km: f64,
    pub duration_min: i64,
    pub route: Vec<RoutePoint>,
}

impl TripSummary {
    /// Deserializes a [`TripSummary`] instance from a JSON string.
    pub fn from_json(json: &str) -> serde_json::Result<TripSummary> {
        serde_json::from_str(json)
    }

    /// Serializes a [`TripSummary`] into a JSON `String`.
    pub fn to_json(summary: &TripSummary) -> serde_json::Result<String> {
        serde_json::to_string(summary)
    }
}

/// Represents a persisted trip owned by a user.
///
/// A `Trip` is what a persistence gateway hands back after storing a
/// [`TripSummary`]: the summary content plus the assigned identifier, the
/// owning user and the storage timestamps.
///
/// # Fields
///
/// - `id` – The storage identifier assigned when the trip was saved.
/// - `user_id` – The identity the trip belongs to.
/// - `name` – A display name for the trip.
/// - `date` – The calendar date of the trip, ISO 8601 on the wire.
/// - `distance_km` – The accumulated great-circle distance in kilometers.
/// - `duration_min` – The recording duration in whole minutes.
/// - `route` – The ordered location samples that make up the route.
/// - `created_at` – When the record was first written.
/// - `updated_at` – When the record was last rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(with = "date")]
    pub date: NaiveDate,
    pub distance_km: f64,
    pub duration_min: i64,
    pub route: Vec<RoutePoint>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    /// Deserializes a [`Trip`] instance from a JSON string.
    pub fn from_json(json: &str) -> serde_json::Result<Trip> {
        serde_json::from_str(json)
    }

    /// Serializes a [`Trip`] into a JSON `String`.
    pub fn to_json(trip: &Trip) -> serde_json::Result<String> {
        serde_json::to_string(trip)
    }
}

/// A cheap listing row for a stored trip, loaded without the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripInfo {
    pub id: String,
    pub name: String,
    #[serde(with = "date")]
    pub date: NaiveDate,
    pub distance_km: f64,
    pub duration_min: i64,
    pub point_count: usize,
}

impl TripInfo {
    /// Deserializes a [`TripInfo`] instance from a JSON string.
    pub fn from_json(json: &str) -> serde_json::Result<TripInfo> {
        serde_json::from_str(json)
    }

    /// Serializes a [`TripInfo`] into a JSON `String`.
    pub fn to_json(info: &TripInfo) -> serde_json::Result<String> {
        serde_json::to_string(info)
    }
}

/// A partial update for a stored trip. Fields left as `None` keep their
/// stored value.
#[derive(Debug, Clone, Default)]
pub struct TripUpdate {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub distance_km: Option<f64>,
    pub duration_min: Option<i64>,
    pub route: Option<Vec<RoutePoint>>,
}
