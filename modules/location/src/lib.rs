// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Location Modul for the trip engine
//!
//! Defines the contract a location provider has to fulfill and ships the
//! gpsd backed provider for real hardware and a replay provider for
//! development without a receiver.

use common::route_point::RoutePoint;
use thiserror::Error;
use tokio::sync::mpsc;

mod feed;
pub mod gpsd_source;
pub mod replay_source;
pub mod test_helper;

/// The outcome of asking the user or host system for location access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Errors reported by location providers.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The provider could not be reached or rejected its setup input.
    #[error("location provider failure: {0}")]
    Provider(#[from] std::io::Error),
    /// The provider has not produced a position fix yet.
    #[error("no position fix available yet")]
    NoFix,
    /// The sample stream ended and will not deliver again.
    #[error("location stream closed")]
    StreamClosed,
}

/// The contract every location provider fulfills.
///
/// Providers deliver samples through [`LocationSubscription`]s. A sample
/// published while no subscription exists is discarded, nothing buffers
/// samples for later subscribers.
#[async_trait::async_trait]
pub trait LocationSource: Send + Sync {
    /// Asks for permission to read locations.
    ///
    /// A denied response is a regular outcome, not an error; errors are
    /// reserved for providers that could not be asked at all.
    async fn request_permission(&self) -> Result<Permission, LocationError>;

    /// Returns the most recent known position.
    async fn current_position(&self) -> Result<RoutePoint, LocationError>;

    /// Opens a sample subscription.
    ///
    /// A sample is delivered if it is the first since subscribing or at
    /// least `min_distance_m` meters of great-circle distance away from
    /// the previously delivered one. A threshold of zero or below
    /// delivers every sample.
    async fn subscribe(&self, min_distance_m: f64)
        -> Result<LocationSubscription, LocationError>;
}

/// An open sample subscription.
///
/// The subscription owns its receiving end exclusively. Dropping it or
/// calling [`unsubscribe`](Self::unsubscribe) releases it; the release is
/// idempotent and releasing twice is a safe no-op.
pub struct LocationSubscription {
    receiver: mpsc::Receiver<RoutePoint>,
}

impl LocationSubscription {
    pub(crate) fn new(receiver: mpsc::Receiver<RoutePoint>) -> Self {
        LocationSubscription { receiver }
    }

    /// Waits for the next sample.
    ///
    /// Returns [`None`] once the subscription was released or the provider
    /// closed the stream, for example because the gpsd connection died.
    pub async fn next(&mut self) -> Option<RoutePoint> {
        self.receiver.recv().await
    }

    /// Releases the subscription and discards samples that were still
    /// buffered. Calling this again has no effect.
    pub fn unsubscribe(&mut self) {
        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}
    }
}
