// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use common::route_point::RoutePoint;

fn get_bare_point_as_json<'a>() -> &'a str {
    r#"
    {
        "latitude": 4.711,
        "longitude": -74.0721,
        "timestamp": 1755000000000
    }
    "#
}

fn get_full_point_as_json<'a>() -> &'a str {
    r#"
    {
        "latitude": 4.711,
        "longitude": -74.0721,
        "timestamp": 1755000000000,
        "speed": 1.4,
        "altitude": 2640.0
    }
    "#
}

fn get_bare_point() -> RoutePoint {
    RoutePoint::new(4.711, -74.0721, 1_755_000_000_000)
}

#[test]
pub fn deserialize_route_point_without_optional_fields() {
    let point = RoutePoint::from_json(get_bare_point_as_json())
        .unwrap_or_else(|e| panic!("Failed to deserialize the raw json. Reason: {e}"));
    assert_eq!(point, get_bare_point());
}

#[test]
pub fn deserialize_route_point_with_optional_fields() {
    let point = RoutePoint::from_json(get_full_point_as_json())
        .unwrap_or_else(|e| panic!("Failed to deserialize the raw json. Reason: {e}"));
    assert_eq!(point.speed, Some(1.4));
    assert_eq!(point.altitude, Some(2640.0));
}

#[test]
pub fn serialize_route_point_skips_absent_fields() {
    let json = serde_json::to_string(&get_bare_point())
        .unwrap_or_else(|e| panic!("Failed to serialize the route point. Reason: {e}"));
    assert!(!json.contains("speed"));
    assert!(!json.contains("altitude"));
}
