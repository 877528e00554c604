use common::route_point::RoutePoint;

/// Mean Earth radius in kilometers, as used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Calculates the great-circle distance in kilometers between two route points.
///
/// This function uses the haversine formula in its atan2 form, which stays
/// numerically stable for very small angles, so consecutive samples a few
/// meters apart still accumulate correctly.
///
/// # Parameters
/// - `a`: Reference to the first route point.
/// - `b`: Reference to the second route point.
///
/// # Returns
/// The distance between `a` and `b` in kilometers as a `f64`.
///
/// # Notes
/// - The function expects latitude and longitude values in **degrees**.
/// - The Earth is treated as a sphere of radius [`EARTH_RADIUS_KM`];
///   ellipsoidal effects are ignored.
pub fn distance_between(a: &RoutePoint, b: &RoutePoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Calculates the total length of a route in kilometers.
///
/// Sums the great-circle distance over each pair of consecutive points in
/// the order they were recorded.
///
/// # Parameters
/// - `route`: The ordered route points to measure.
///
/// # Returns
/// The accumulated distance in kilometers. Routes with fewer than two
/// points have a length of `0.0`.
pub fn total_distance(route: &[RoutePoint]) -> f64 {
    route
        .windows(2)
        .map(|pair| distance_between(&pair[0], &pair[1]))
        .sum()
}
