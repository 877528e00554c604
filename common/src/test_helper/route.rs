use crate::route_point::RoutePoint;

/// Two samples roughly 157 m apart, taken one minute apart.
pub fn short_hop() -> Vec<RoutePoint> {
    vec![
        RoutePoint::new(4.711, -74.0721, 1_755_000_000_000),
        RoutePoint::new(4.712, -74.0711, 1_755_000_060_000),
    ]
}

/// Five samples heading due north, one every 0.001 degrees of latitude
/// (about 111 m), thirty seconds apart.
pub fn city_walk() -> Vec<RoutePoint> {
    (0..5)
        .map(|i| {
            RoutePoint::new(
                4.711 + f64::from(i) * 0.001,
                -74.0721,
                1_755_000_000_000 + i64::from(i) * 30_000,
            )
        })
        .collect()
}
