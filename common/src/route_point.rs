use serde::{Deserialize, Serialize};

/// Represents a single recorded location sample on a trip route.
///
/// The `RoutePoint` struct stores a point on Earth in decimal degrees
/// together with the moment it was observed. Latitude values range from
/// -90.0 to 90.0 and longitude values range from -180.0 to 180.0. The
/// timestamp counts milliseconds since the Unix epoch.
///
/// Speed and altitude are optional because not every location provider
/// reports them. Absent values stay absent in the serialized form.
///
/// # Fields
///
/// - `latitude` – The latitude in decimal degrees (positive for north, negative for south).
/// - `longitude` – The longitude in decimal degrees (positive for east, negative for west).
/// - `timestamp` – Milliseconds since the Unix epoch when the sample was taken.
/// - `speed` – The ground speed in meters per second, if the provider reported one.
/// - `altitude` – The altitude in meters above sea level, if the provider reported one.
///
/// # Example
///
/// ```rust
/// use common::route_point::RoutePoint;
///
/// let point = RoutePoint::new(4.711, -74.0721, 1755000000000);
///
/// println!("{:?}", point);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

impl RoutePoint {
    /// Creates a new [`RoutePoint`] with the given coordinates and timestamp.
    ///
    /// Speed and altitude are left unset. Providers that know them fill the
    /// fields in directly.
    ///
    /// # Example
    ///
    /// ```rust
    /// use common::route_point::RoutePoint;
    ///
    /// let point = RoutePoint::new(52.5200, 13.4050, 0);
    /// assert!(point.speed.is_none());
    /// ```
    pub fn new(latitude: f64, longitude: f64, timestamp: i64) -> Self {
        RoutePoint {
            latitude,
            longitude,
            timestamp,
            speed: None,
            altitude: None,
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
