// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Recorder Modul for the trip engine
//!
//! Turns a stream of location samples into a stored trip. The
//! [`TrackRecorder`] subscribes to a [`LocationSource`] when a recording
//! starts, buffers the delivered samples, and on stop derives the trip
//! distance and duration before handing the result to a
//! [`TripStore`](storage::TripStore).

use common::{
    auth::AuthContext,
    elapsed_time_source::{ElapsedTimeSource, MonotonicTimeSource},
    route_point::RoutePoint,
    trip::{Trip, TripSummary},
};
use location::{LocationError, LocationSource, LocationSubscription, Permission};
use std::sync::{Arc, Mutex};
use storage::{StorageError, TripStore};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// The sample distance gate a [`RecorderConfig`] starts out with.
pub const DEFAULT_MIN_SAMPLE_DISTANCE_M: f64 = 10.0;

/// The smallest number of samples a recording can be stored from.
pub const MIN_TRIP_POINTS: usize = 2;

/// Tuning knobs for a [`TrackRecorder`].
///
/// # Fields
///
/// - `min_sample_distance_m` – Samples closer than this to the previously
///   buffered one are dropped by the location provider. Zero or below
///   buffers every sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecorderConfig {
    pub min_sample_distance_m: f64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        RecorderConfig {
            min_sample_distance_m: DEFAULT_MIN_SAMPLE_DISTANCE_M,
        }
    }
}

/// Errors reported by the [`TrackRecorder`].
#[derive(Debug, Error)]
pub enum RecorderError {
    /// The user or host system refused location access.
    #[error("location permission denied")]
    PermissionDenied,

    /// A recording is already running; it keeps running untouched.
    #[error("a recording is already running")]
    AlreadyRecording,

    /// There is no recording to stop.
    #[error("no recording is running")]
    NotRecording,

    /// The recording buffered fewer samples than a trip needs.
    #[error("a trip needs at least 2 samples, got {points}")]
    InsufficientData { points: usize },

    /// The sample stream died while the recording was running.
    #[error("location stream failed while recording")]
    Stream(#[source] LocationError),

    /// The trip could not be persisted. The summary is handed back so the
    /// caller can retry the save explicitly.
    #[error("failed to persist the recorded trip")]
    Persistence {
        summary: Box<TripSummary>,
        #[source]
        source: StorageError,
    },

    /// The location provider failed while a recording was being set up.
    #[error(transparent)]
    Location(#[from] LocationError),
}

/// How the most recent recording ended.
#[derive(Debug, Clone, PartialEq)]
pub enum StopOutcome {
    /// The recording was stored as this trip.
    Saved(Trip),

    /// The recording was discarded for having too few samples.
    TooShort { points: usize },

    /// The trip was complete but could not be persisted.
    SaveFailed { message: String },

    /// The sample stream died before the recording was stopped.
    StreamFailed { message: String },
}

/// A point-in-time view of the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecorderStatus {
    pub tracking: bool,
    pub points: usize,
}

/// Session data shared between the recorder and its ingest task.
#[derive(Default)]
struct SessionState {
    recording: bool,
    stream_failed: bool,
    points: Vec<RoutePoint>,
    last_outcome: Option<StopOutcome>,
}

/// Records trips from a stream of location samples.
///
/// A recorder is either idle or recording. [`start`](Self::start) opens a
/// subscription on the location provider and buffers every delivered
/// sample; [`stop`](Self::stop) releases the subscription, summarizes the
/// buffered route and persists it. Samples published while the recorder is
/// idle are never buffered. Dropping a recording recorder discards the
/// buffered session without storing anything.
///
/// # Type Parameters
/// - `T`: The time source implementation (e.g., [`MonotonicTimeSource`]) used to measure the
///   recording duration. Defaults to [`MonotonicTimeSource`].
pub struct TrackRecorder<T: ElapsedTimeSource = MonotonicTimeSource> {
    location: Arc<dyn LocationSource>,
    trips: Arc<dyn TripStore>,
    auth: AuthContext,
    config: RecorderConfig,
    elapsed_time_source: T,
    state: Arc<Mutex<SessionState>>,
    ingest: Option<JoinHandle<()>>,
}

impl TrackRecorder<MonotonicTimeSource> {
    /// Creates a new recorder using the default [`MonotonicTimeSource`].
    pub fn new(
        location: Arc<dyn LocationSource>,
        trips: Arc<dyn TripStore>,
        auth: AuthContext,
        config: RecorderConfig,
    ) -> Self {
        TrackRecorder::new_with_source(
            MonotonicTimeSource::default(),
            location,
            trips,
            auth,
            config,
        )
    }
}

impl<T: ElapsedTimeSource + Default> TrackRecorder<T> {
    /// Creates a new recorder with a custom time source.
    pub fn new_with_source(
        elapsed_time_source: T,
        location: Arc<dyn LocationSource>,
        trips: Arc<dyn TripStore>,
        auth: AuthContext,
        config: RecorderConfig,
    ) -> Self {
        TrackRecorder {
            location,
            trips,
            auth,
            config,
            elapsed_time_source,
            state: Arc::new(Mutex::new(SessionState::default())),
            ingest: None,
        }
    }

    /// Starts a recording.
    ///
    /// Asks the provider for permission, opens a sample subscription with
    /// the configured distance gate and begins buffering samples. Fails
    /// with [`RecorderError::AlreadyRecording`] while a recording runs; the
    /// running session is left untouched.
    pub async fn start(&mut self) -> Result<(), RecorderError> {
        {
            let session = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if session.recording {
                return Err(RecorderError::AlreadyRecording);
            }
        }
        // A session that ended through a stream failure leaves its finished
        // ingest task behind until the next start or stop reaps it.
        if let Some(stale) = self.ingest.take() {
            stale.abort();
            let _ = stale.await;
        }

        if self.location.request_permission().await? == Permission::Denied {
            return Err(RecorderError::PermissionDenied);
        }
        let subscription = self
            .location
            .subscribe(self.config.min_sample_distance_m)
            .await?;

        {
            let mut session = self.state.lock().unwrap_or_else(|e| e.into_inner());
            session.recording = true;
            session.stream_failed = false;
            session.points.clear();
        }
        self.elapsed_time_source.start();
        self.ingest = Some(tokio::spawn(ingest_samples(
            subscription,
            Arc::clone(&self.state),
        )));
        info!("Recording started for user {}", self.auth.user_id);
        Ok(())
    }

    /// Stops the recording and persists the buffered route.
    ///
    /// The trip is named `name`, or after its date when [`None`] is given.
    /// The duration is the elapsed recording time in whole minutes, rounded
    /// down. The buffered session is consumed either way: a failed save
    /// hands the complete summary back inside
    /// [`RecorderError::Persistence`] and the caller decides whether to
    /// retry it against the store.
    pub async fn stop(&mut self, name: Option<&str>) -> Result<Trip, RecorderError> {
        let Some(ingest) = self.ingest.take() else {
            return Err(RecorderError::NotRecording);
        };
        {
            // Leaving the recording state first keeps late samples out of
            // the route while the ingest task winds down.
            let mut session = self.state.lock().unwrap_or_else(|e| e.into_inner());
            session.recording = false;
        }
        ingest.abort();
        let _ = ingest.await;

        let (route, stream_failed) = {
            let mut session = self.state.lock().unwrap_or_else(|e| e.into_inner());
            (std::mem::take(&mut session.points), session.stream_failed)
        };
        if stream_failed {
            return Err(RecorderError::Stream(LocationError::StreamClosed));
        }
        if route.len() < MIN_TRIP_POINTS {
            warn!("Recording discarded, {} samples are too few", route.len());
            let mut session = self.state.lock().unwrap_or_else(|e| e.into_inner());
            session.last_outcome = Some(StopOutcome::TooShort {
                points: route.len(),
            });
            return Err(RecorderError::InsufficientData {
                points: route.len(),
            });
        }

        let elapsed = self.elapsed_time_source.elapsed_time();
        let date = chrono::Utc::now().date_naive();
        let summary = TripSummary {
            name: match name {
                Some(name) => name.to_owned(),
                None => format!("Trip {}", date.format("%Y-%m-%d")),
            },
            date,
            distance_km: geo::total_distance(&route),
            duration_min: (elapsed.as_secs() / 60) as i64,
            route,
        };
        match self.trips.save_trip(&self.auth, &summary).await {
            Ok(trip) => {
                info!(
                    "Recording stored as trip {} with {:.3} km over {} min",
                    trip.id, trip.distance_km, trip.duration_min
                );
                let mut session = self.state.lock().unwrap_or_else(|e| e.into_inner());
                session.last_outcome = Some(StopOutcome::Saved(trip.clone()));
                Ok(trip)
            }
            Err(source) => {
                error!("Failed to store the recorded trip. Error: {source}");
                let mut session = self.state.lock().unwrap_or_else(|e| e.into_inner());
                session.last_outcome = Some(StopOutcome::SaveFailed {
                    message: source.to_string(),
                });
                Err(RecorderError::Persistence {
                    summary: Box::new(summary),
                    source,
                })
            }
        }
    }

    /// Returns whether a recording runs and how many samples it buffered.
    ///
    /// The tracking flag drops on its own when the sample stream dies.
    pub fn status(&self) -> RecorderStatus {
        let session = self.state.lock().unwrap_or_else(|e| e.into_inner());
        RecorderStatus {
            tracking: session.recording,
            points: session.points.len(),
        }
    }

    /// Returns the samples buffered by the running recording.
    pub fn route(&self) -> Vec<RoutePoint> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .points
            .clone()
    }

    /// Returns how the most recent recording ended, or [`None`] if no
    /// recording was brought to an end yet.
    pub fn last_outcome(&self) -> Option<StopOutcome> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last_outcome
            .clone()
    }
}

impl<T: ElapsedTimeSource> Drop for TrackRecorder<T> {
    /// Discards a still running session without storing anything.
    fn drop(&mut self) {
        if let Some(ingest) = self.ingest.take() {
            ingest.abort();
        }
    }
}

/// Buffers delivered samples until the recording leaves the recording
/// state or the stream dies under it.
async fn ingest_samples(mut subscription: LocationSubscription, state: Arc<Mutex<SessionState>>) {
    while let Some(point) = subscription.next().await {
        let mut session = state.lock().unwrap_or_else(|e| e.into_inner());
        if !session.recording {
            break;
        }
        session.points.push(point);
    }
    {
        let mut session = state.lock().unwrap_or_else(|e| e.into_inner());
        if session.recording {
            warn!("Location stream ended while a recording was running");
            session.recording = false;
            session.stream_failed = true;
            session.last_outcome = Some(StopOutcome::StreamFailed {
                message: LocationError::StreamClosed.to_string(),
            });
        }
    }
    subscription.unsubscribe();
}
