use crate::feed::PositionFeed;
use crate::{LocationError, LocationSource, LocationSubscription, Permission};
use common::route_point::RoutePoint;
use std::sync::{Arc, Mutex};

/// A push driven [`LocationSource`] for tests of downstream crates.
///
/// Samples are delivered exactly as pushed, so tests control coordinates
/// and timestamps. The permission answer is fixed at construction and the
/// stream can be ended on demand to exercise failure handling.
pub struct ManualLocationSource {
    feed: Arc<PositionFeed>,
    latest: Mutex<Option<RoutePoint>>,
    permission: Permission,
}

impl Default for ManualLocationSource {
    fn default() -> Self {
        ManualLocationSource::new(Permission::Granted)
    }
}

impl ManualLocationSource {
    pub fn new(permission: Permission) -> Self {
        ManualLocationSource {
            feed: Arc::new(PositionFeed::new()),
            latest: Mutex::new(None),
            permission,
        }
    }

    /// Publishes a sample to every open subscription. Without subscribers
    /// the sample is discarded.
    pub fn push(&self, point: &RoutePoint) {
        *self.latest.lock().unwrap_or_else(|e| e.into_inner()) = Some(point.clone());
        self.feed.publish(point);
    }

    /// Ends the stream: every open subscription observes the end and new
    /// subscriptions are refused.
    pub fn fail_stream(&self) {
        self.feed.close();
    }

    /// The number of currently open subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.feed.subscriber_count()
    }
}

#[async_trait::async_trait]
impl LocationSource for ManualLocationSource {
    async fn request_permission(&self) -> Result<Permission, LocationError> {
        Ok(self.permission)
    }

    async fn current_position(&self) -> Result<RoutePoint, LocationError> {
        self.latest
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(LocationError::NoFix)
    }

    async fn subscribe(
        &self,
        min_distance_m: f64,
    ) -> Result<LocationSubscription, LocationError> {
        self.feed.subscribe(min_distance_m)
    }
}
