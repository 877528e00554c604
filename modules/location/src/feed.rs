use crate::{LocationError, LocationSubscription};
use common::route_point::RoutePoint;
use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

/// Buffered samples per subscription. At walking sample rates the buffer
/// only fills when a consumer stopped reading.
const SUBSCRIPTION_BUFFER_SIZE: usize = 64;

struct FeedConsumer {
    tx: mpsc::Sender<RoutePoint>,
    min_distance_m: f64,
    last_sent: Option<RoutePoint>,
}

impl FeedConsumer {
    fn accepts(&self, point: &RoutePoint) -> bool {
        if self.min_distance_m <= 0.0 {
            return true;
        }
        match &self.last_sent {
            None => true,
            Some(last) => geo::distance_between(last, point) * 1000.0 >= self.min_distance_m,
        }
    }
}

/// Fans provider samples out to the open subscriptions.
///
/// Each subscription gets its own channel and its own min-distance filter
/// state. Consumers whose receiving end went away are pruned on the next
/// publish. Publishing without subscribers discards the sample.
pub(crate) struct PositionFeed {
    consumers: Mutex<Vec<FeedConsumer>>,
    closed: AtomicBool,
}

impl PositionFeed {
    pub(crate) fn new() -> Self {
        PositionFeed {
            consumers: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn subscribe(
        &self,
        min_distance_m: f64,
    ) -> Result<LocationSubscription, LocationError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(LocationError::StreamClosed);
        }
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER_SIZE);
        self.consumers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(FeedConsumer {
                tx,
                min_distance_m,
                last_sent: None,
            });
        Ok(LocationSubscription::new(rx))
    }

    pub(crate) fn publish(&self, point: &RoutePoint) {
        let mut consumers = self.consumers.lock().unwrap_or_else(|e| e.into_inner());
        consumers.retain_mut(|consumer| {
            if !consumer.accepts(point) {
                return true;
            }
            match consumer.tx.try_send(point.clone()) {
                Ok(()) => {
                    consumer.last_sent = Some(point.clone());
                    true
                }
                Err(TrySendError::Full(_)) => {
                    warn!("Dropping location sample for a stalled subscription");
                    true
                }
                Err(TrySendError::Closed(_)) => false,
            }
        });
    }

    /// Ends the feed: every open subscription sees the end of its stream
    /// and later subscribe calls are refused.
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.consumers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        let mut consumers = self.consumers.lock().unwrap_or_else(|e| e.into_inner());
        consumers.retain(|consumer| !consumer.tx.is_closed());
        consumers.len()
    }
}
