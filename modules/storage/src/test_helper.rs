use crate::{StatsStore, StorageError, TripStore};
use chrono::{NaiveDate, Utc};
use common::{
    auth::AuthContext,
    stats::{DailyStats, StatsUpdate},
    trip::{Trip, TripInfo, TripSummary, TripUpdate},
};
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

/// An in-memory [`TripStore`] and [`StatsStore`] for tests of downstream
/// crates.
///
/// The next save can be armed to fail once, which exercises the error
/// path of callers without touching a file system.
#[derive(Default)]
pub struct MemoryStorage {
    trips: Mutex<Vec<Trip>>,
    stats: Mutex<Vec<DailyStats>>,
    fail_next_save: Mutex<Option<String>>,
    save_calls: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    /// Arms a one-shot failure: the next [`TripStore::save_trip`] call
    /// fails with the given reason, later calls succeed again.
    pub fn fail_next_save(&self, reason: &str) {
        *self
            .fail_next_save
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(reason.to_owned());
    }

    /// The number of save attempts seen so far, failed ones included.
    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn trip_count(&self) -> usize {
        self.trips.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait::async_trait]
impl TripStore for MemoryStorage {
    async fn save_trip(
        &self,
        auth: &AuthContext,
        summary: &TripSummary,
    ) -> Result<Trip, StorageError> {
        let attempt = self.save_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self
            .fail_next_save
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            return Err(StorageError::Io(std::io::Error::other(reason)));
        }
        let now = Utc::now();
        let trip = Trip {
            id: format!("memory_{attempt}"),
            user_id: auth.user_id.clone(),
            name: summary.name.clone(),
            date: summary.date,
            distance_km: summary.distance_km,
            duration_min: summary.duration_min,
            route: summary.route.clone(),
            created_at: now,
            updated_at: now,
        };
        self.trips
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(trip.clone());
        Ok(trip)
    }

    async fn trip_infos(&self, auth: &AuthContext) -> Result<Vec<TripInfo>, StorageError> {
        let trips = self.trips.lock().unwrap_or_else(|e| e.into_inner());
        let mut infos: Vec<TripInfo> = trips
            .iter()
            .filter(|trip| trip.user_id == auth.user_id)
            .map(|trip| TripInfo {
                id: trip.id.clone(),
                name: trip.name.clone(),
                date: trip.date,
                distance_km: trip.distance_km,
                duration_min: trip.duration_min,
                point_count: trip.route.len(),
            })
            .collect();
        infos.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        Ok(infos)
    }

    async fn trip(&self, auth: &AuthContext, id: &str) -> Result<Trip, StorageError> {
        self.trips
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|trip| trip.user_id == auth.user_id && trip.id == id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound { id: id.to_owned() })
    }

    async fn update_trip(
        &self,
        auth: &AuthContext,
        id: &str,
        update: &TripUpdate,
    ) -> Result<Trip, StorageError> {
        let mut trips = self.trips.lock().unwrap_or_else(|e| e.into_inner());
        let trip = trips
            .iter_mut()
            .find(|trip| trip.user_id == auth.user_id && trip.id == id)
            .ok_or_else(|| StorageError::NotFound { id: id.to_owned() })?;
        if let Some(ref name) = update.name {
            trip.name = name.clone();
        }
        if let Some(date) = update.date {
            trip.date = date;
        }
        if let Some(distance_km) = update.distance_km {
            trip.distance_km = distance_km;
        }
        if let Some(duration_min) = update.duration_min {
            trip.duration_min = duration_min;
        }
        if let Some(ref route) = update.route {
            trip.route = route.clone();
        }
        trip.updated_at = Utc::now();
        Ok(trip.clone())
    }

    async fn delete_trip(&self, auth: &AuthContext, id: &str) -> Result<(), StorageError> {
        let mut trips = self.trips.lock().unwrap_or_else(|e| e.into_inner());
        let before = trips.len();
        trips.retain(|trip| !(trip.user_id == auth.user_id && trip.id == id));
        if trips.len() == before {
            return Err(StorageError::NotFound { id: id.to_owned() });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl StatsStore for MemoryStorage {
    async fn today(&self, auth: &AuthContext) -> Result<Option<DailyStats>, StorageError> {
        let date = Utc::now().date_naive();
        Ok(self
            .stats
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|stats| stats.user_id == auth.user_id && stats.date == date)
            .cloned())
    }

    async fn upsert_today(
        &self,
        auth: &AuthContext,
        update: &StatsUpdate,
    ) -> Result<DailyStats, StorageError> {
        let now = Utc::now();
        let date = now.date_naive();
        let mut all = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        let index = match all
            .iter()
            .position(|stats| stats.user_id == auth.user_id && stats.date == date)
        {
            Some(index) => index,
            None => {
                all.push(DailyStats {
                    user_id: auth.user_id.clone(),
                    date,
                    steps: 0,
                    distance_km: 0.0,
                    calories: 0,
                    created_at: now,
                    updated_at: now,
                });
                all.len() - 1
            }
        };
        let stats = &mut all[index];
        if let Some(steps) = update.steps {
            stats.steps = steps;
        }
        if let Some(distance_km) = update.distance_km {
            stats.distance_km = distance_km;
        }
        if let Some(calories) = update.calories {
            stats.calories = calories;
        }
        stats.updated_at = now;
        Ok(stats.clone())
    }

    async fn range(
        &self,
        auth: &AuthContext,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyStats>, StorageError> {
        let mut entries: Vec<DailyStats> = self
            .stats
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|stats| {
                stats.user_id == auth.user_id && stats.date >= start && stats.date <= end
            })
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }
}
