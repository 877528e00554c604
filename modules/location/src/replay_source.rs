use crate::feed::PositionFeed;
use crate::{LocationError, LocationSource, LocationSubscription, Permission};
use chrono::Utc;
use common::route_point::RoutePoint;
use std::{
    io::{Error, ErrorKind},
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing::debug;

/// A location provider that replays a fixed route in a constant frequency.
///
/// The route is walked in order and wraps around at the end, so the stream
/// keeps delivering until the source is dropped. Every emitted sample gets
/// a fresh timestamp.
pub struct ReplayLocationSource {
    feed: Arc<PositionFeed>,
    latest: Arc<Mutex<Option<RoutePoint>>>,
    replay_handle: tokio::task::JoinHandle<()>,
}

impl ReplayLocationSource {
    /// Creates a new replay source walking `route` with one sample per
    /// `interval`. An empty route is rejected.
    pub fn new(route: &[RoutePoint], interval: Duration) -> Result<Self, LocationError> {
        if route.is_empty() {
            return Err(LocationError::Provider(Error::new(
                ErrorKind::InvalidData,
                "route parameter is empty",
            )));
        }
        let feed = Arc::new(PositionFeed::new());
        let latest = Arc::new(Mutex::new(None));
        let replay_handle = tokio::spawn(replay_task(
            route.to_vec(),
            interval,
            Arc::clone(&feed),
            Arc::clone(&latest),
        ));
        Ok(ReplayLocationSource {
            feed,
            latest,
            replay_handle,
        })
    }
}

impl Drop for ReplayLocationSource {
    fn drop(&mut self) {
        self.replay_handle.abort();
        self.feed.close();
    }
}

#[async_trait::async_trait]
impl LocationSource for ReplayLocationSource {
    async fn request_permission(&self) -> Result<Permission, LocationError> {
        Ok(Permission::Granted)
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

async fn replay_task(
    route: Vec<RoutePoint>,
    interval: Duration,
    feed: Arc<PositionFeed>,
    latest: Arc<Mutex<Option<RoutePoint>>>,
) {
    let mut timer = tokio::time::interval(interval);
    let mut next_position = 0;
    debug!("Replaying a route with {} waypoints", route.len());
    loop {
        timer.tick().await;
        let mut point = route[next_position].clone();
        point.timestamp = Utc::now().timestamp_millis();
        *latest.lock().unwrap_or_else(|e| e.into_inner()) = Some(point.clone());
        feed.publish(&point);
        next_position += 1;
        if next_position >= route.len() {
            next_position = 0;
        }
    }
}
