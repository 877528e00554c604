// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use chrono::NaiveDate;
use common::{
    route_point::RoutePoint,
    trip::{Trip, TripSummary},
};

fn get_summary_as_json<'a>() -> &'a str {
    r#"
    {
        "name": "Morning walk",
        "date": "2026-08-22",
        "distance_km": 0.157,
        "duration_min": 2,
        "route": [
            { "latitude": 4.711, "longitude": -74.0721, "timestamp": 1755000000000 },
            { "latitude": 4.712, "longitude": -74.0711, "timestamp": 1755000060000 }
        ]
    }
    "#
}

fn get_summary() -> TripSummary {
    TripSummary {
        name: "Morning walk".into(),
        date: NaiveDate::from_ymd_opt(2026, 8, 22)
            .unwrap_or_else(|| panic!("Failed to create the test date")),
        distance_km: 0.157,
        duration_min: 2,
        route: vec![
            RoutePoint::new(4.711, -74.0721, 1_755_000_000_000),
            RoutePoint::new(4.712, -74.0711, 1_755_000_060_000),
        ],
    }
}

#[test]
pub fn deserialize_trip_summary_from_json() {
    let summary = TripSummary::from_json(get_summary_as_json())
        .unwrap_or_else(|e| panic!("Failed to deserialize the raw json. Reason: {e}"));
    assert_eq!(summary, get_summary());
}

#[test]
pub fn serialize_trip_summary_date_as_iso8601() {
    let json = TripSummary::to_json(&get_summary())
        .unwrap_or_else(|e| panic!("Failed to serialize the summary. Reason: {e}"));
    assert!(json.contains(r#""date":"2026-08-22""#));
}

#[test]
pub fn trip_round_trips_through_json() {
    let summary = get_summary();
    let trip = Trip {
        id: "2026_08_22_09_15_00_000".into(),
        user_id: "walker".into(),
        name: summary.name.clone(),
        date: summary.date,
        distance_km: summary.distance_km,
        duration_min: summary.duration_min,
        route: summary.route.clone(),
        created_at: "2026-08-22T09:15:00Z"
            .parse()
            .unwrap_or_else(|e| panic!("Failed to parse the creation time. Reason: {e}")),
        updated_at: "2026-08-22T09:15:00Z"
            .parse()
            .unwrap_or_else(|e| panic!("Failed to parse the update time. Reason: {e}")),
    };
    let json = Trip::to_json(&trip)
        .unwrap_or_else(|e| panic!("Failed to serialize the trip. Reason: {e}"));
    let restored = Trip::from_json(&json)
        .unwrap_or_else(|e| panic!("Failed to deserialize the trip. Reason: {e}"));
    assert_eq!(restored, trip);
}
