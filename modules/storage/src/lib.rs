// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Storage Modul for the trip engine
//!
//! Provides the interfaces and implementation to store and load trip and
//! daily statistic data on linux based systems.

use chrono::{DateTime, NaiveDate, Utc};
use common::{
    auth::AuthContext,
    stats::{DailyStats, StatsUpdate},
    trip::{Trip, TripInfo, TripSummary, TripUpdate},
};
use std::{
    fs::DirBuilder,
    io::{self},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{
    fs::read_dir,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, error, info};

pub mod test_helper;

/// Errors reported by trip and stats stores.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io failure: {0}")]
    Io(#[from] io::Error),
    #[error("stored record is not valid json: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("no stored record with id {id}")]
    NotFound { id: String },
}

/// The persistence gateway for recorded trips.
///
/// Every call carries the [`AuthContext`] it acts for; stored records are
/// scoped to that identity and a store never returns another user's data.
/// A failed save is reported to the caller, the store does not retry.
#[async_trait::async_trait]
pub trait TripStore: Send + Sync {
    /// Persists a summary and returns the stored trip with its assigned
    /// id, owner and storage timestamps.
    async fn save_trip(
        &self,
        auth: &AuthContext,
        summary: &TripSummary,
    ) -> Result<Trip, StorageError>;

    /// Lists the stored trips of the calling user, newest date first.
    async fn trip_infos(&self, auth: &AuthContext) -> Result<Vec<TripInfo>, StorageError>;

    /// Loads one stored trip including its route.
    async fn trip(&self, auth: &AuthContext, id: &str) -> Result<Trip, StorageError>;

    /// Applies a partial update to a stored trip and returns the result.
    async fn update_trip(
        &self,
        auth: &AuthContext,
        id: &str,
        update: &TripUpdate,
    ) -> Result<Trip, StorageError>;

    /// Deletes a stored trip.
    async fn delete_trip(&self, auth: &AuthContext, id: &str) -> Result<(), StorageError>;
}

/// The persistence gateway for per-day activity counters.
#[async_trait::async_trait]
pub trait StatsStore: Send + Sync {
    /// Loads today's counters, or [`None`] if nothing was recorded yet.
    async fn today(&self, auth: &AuthContext) -> Result<Option<DailyStats>, StorageError>;

    /// Applies a partial update to today's counters, creating the record
    /// with zeroed counters if it does not exist yet.
    async fn upsert_today(
        &self,
        auth: &AuthContext,
        update: &StatsUpdate,
    ) -> Result<DailyStats, StorageError>;

    /// Loads the counters of the given date range, newest date first.
    async fn range(
        &self,
        auth: &AuthContext,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyStats>, StorageError>;
}

/// A file system–based implementation of the trip and stats stores.
///
/// Trips are stored per user below the trip folder: the full record as a
/// `.trip` file next to a `.info` file carrying the cheap listing row.
/// Daily counters live below the stats folder as one `.stats` file per
/// user and date.
///
/// ## Important
///
/// `FilesSystemStorage` **does not implement any internal synchronization or locking mechanisms**.
/// Therefore, **only one instance should be used per `root_dir` in the application at any time**.
/// Creating multiple instances pointing to the same directory may result in data races,
/// file corruption, or unexpected behavior.
pub struct FilesSystemStorage {
    trip_root_dir: String,
    stats_root_dir: String,
}

impl FilesSystemStorage {
    pub fn new(root_dir: &PathBuf) -> Self {
        let mut trip_file_path = std::path::PathBuf::from(&root_dir);
        trip_file_path.push("trip");
        let mut stats_file_path = PathBuf::from(&root_dir);
        stats_file_path.push("stats");
        if let Err(e) = DirBuilder::new().recursive(true).create(&trip_file_path) {
            error!(
                "Failed to create trip dir folder {}. Error: {}",
                trip_file_path.to_string_lossy(),
                e
            );
        }
        if let Err(e) = DirBuilder::new().recursive(true).create(&stats_file_path) {
            error!(
                "Failed to create stats dir folder {}. Error: {}",
                stats_file_path.to_string_lossy(),
                e
            );
        }
        info!(
            "Using trip storage folder: {}",
            trip_file_path.to_string_lossy()
        );
        info!(
            "Using stats storage folder: {}",
            stats_file_path.to_string_lossy()
        );
        FilesSystemStorage {
            trip_root_dir: trip_file_path.to_string_lossy().to_string(),
            stats_root_dir: stats_file_path.to_string_lossy().to_string(),
        }
    }

    /// Writes arbitrary bytes to the file at `path`, ensuring they are persisted.
    ///
    /// The file is created if it does not exist, or truncated if it does. After writing
    /// `data`, the file is explicitly synced to ensure durability.
    async fn save_bytes(&self, path: &str, data: &[u8]) -> io::Result<()> {
        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        Ok(())
    }

    async fn load_file(&self, file_path: &str) -> io::Result<String> {
        let mut file = tokio::fs::File::open(file_path).await?;
        let mut json = String::default();
        file.read_to_string(&mut json).await?;
        Ok(json)
    }

    /// Writes the full record and the listing row of a trip, creating the
    /// user folder on first use.
    async fn write_trip(&self, trip: &Trip) -> Result<(), StorageError> {
        let json_trip = Trip::to_json(trip)?;
        let json_info = TripInfo::to_json(&Self::info_of(trip))?;
        tokio::fs::create_dir_all(self.user_dir(&self.trip_root_dir, &trip.user_id)).await?;
        self.save_bytes(
            &self.trip_file_path(&trip.user_id, &trip.id),
            json_trip.as_bytes(),
        )
        .await?;
        self.save_bytes(
            &self.trip_info_file_path(&trip.user_id, &trip.id),
            json_info.as_bytes(),
        )
        .await?;
        Ok(())
    }

    async fn load_trip(&self, user_id: &str, id: &str) -> Result<Trip, StorageError> {
        let file_path = self.trip_file_path(user_id, id);
        let json = self.load_file(&file_path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StorageError::NotFound { id: id.to_owned() }
            } else {
                StorageError::Io(e)
            }
        })?;
        Ok(Trip::from_json(&json)?)
    }

    async fn remove_file(&self, path: &str, id: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::NotFound { id: id.to_owned() })
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn load_stats_for(
        &self,
        user_id: &str,
        date: &NaiveDate,
    ) -> Result<Option<DailyStats>, StorageError> {
        let file_path = self.stats_file_path(user_id, date);
        match self.load_file(&file_path).await {
            Ok(json) => Ok(Some(DailyStats::from_json(&json)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn info_of(trip: &Trip) -> TripInfo {
        TripInfo {
            id: trip.id.clone(),
            name: trip.name.clone(),
            date: trip.date,
            distance_km: trip.distance_km,
            duration_min: trip.duration_min,
            point_count: trip.route.len(),
        }
    }

    /// Derives the stable identifier of a trip from its creation time.
    fn get_id(created_at: &DateTime<Utc>) -> String {
        format!(
            "{}_{}",
            created_at.format("%Y_%m_%d"),
            created_at.format("%H_%M_%S_%3f")
        )
    }

    fn user_dir(&self, root: &str, user_id: &str) -> PathBuf {
        let mut dir = PathBuf::from(root);
        dir.push(user_id);
        dir
    }

    fn trip_file_path(&self, user_id: &str, id: &str) -> String {
        self.file_path(id, &self.user_dir(&self.trip_root_dir, user_id), "trip")
    }

    fn trip_info_file_path(&self, user_id: &str, id: &str) -> String {
        self.file_path(id, &self.user_dir(&self.trip_root_dir, user_id), "info")
    }

    fn stats_file_path(&self, user_id: &str, date: &NaiveDate) -> String {
        self.file_path(
            &date.format("%Y-%m-%d").to_string(),
            &self.user_dir(&self.stats_root_dir, user_id),
            "stats",
        )
    }

    fn file_path(&self, id: &str, path: &Path, extension: &str) -> String {
        let mut file_path = std::path::PathBuf::from(path);
        file_path.push(id);
        file_path.set_extension(extension);
        file_path.to_string_lossy().to_string()
    }
}

#[async_trait::async_trait]
impl TripStore for FilesSystemStorage {
    async fn save_trip(
        &self,
        auth: &AuthContext,
        summary: &TripSummary,
    ) -> Result<Trip, StorageError> {
        let now = Utc::now();
        let trip = Trip {
            id: Self::get_id(&now),
            user_id: auth.user_id.clone(),
            name: summary.name.clone(),
            date: summary.date,
            distance_km: summary.distance_km,
            duration_min: summary.duration_min,
            route: summary.route.clone(),
            created_at: now,
            updated_at: now,
        };
        self.write_trip(&trip).await?;
        debug!("Stored trip with id {} in {}", trip.id, self.trip_root_dir);
        Ok(trip)
    }

    async fn trip_infos(&self, auth: &AuthContext) -> Result<Vec<TripInfo>, StorageError> {
        let dir = self.user_dir(&self.trip_root_dir, &auth.user_id);
        let mut dirs = match read_dir(&dir).await {
            Ok(dirs) => dirs,
            // A user without stored trips has no folder yet.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };
        let mut infos = Vec::<TripInfo>::new();
        while let Some(entry) = dirs.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.file_type().is_file() {
                continue;
            }
            if let Some(ext) = entry.path().extension()
                && ext == "info"
                && let Some(id) = entry.path().file_stem()
            {
                let file_path = entry.path().to_string_lossy().to_string();
                match self.load_file(&file_path).await {
                    Ok(json) => match TripInfo::from_json(&json) {
                        Ok(info) => {
                            debug!(
                                "Loaded trip info with id {} from file {}",
                                id.to_string_lossy().to_string(),
                                file_path
                            );
                            infos.push(info);
                        }
                        Err(e) => {
                            error!(
                                "Failed to parse trip info from file {}. Error: {}",
                                file_path, e
                            );
                            continue;
                        }
                    },
                    Err(e) => {
                        error!(
                            "Failed to load trip info from file {}. Error: {}",
                            file_path, e
                        );
                        continue;
                    }
                }
            }
        }
        infos.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        Ok(infos)
    }

    async fn trip(&self, auth: &AuthContext, id: &str) -> Result<Trip, StorageError> {
        let trip = self.load_trip(&auth.user_id, id).await?;
        debug!("Loaded trip with id {id} from {}", self.trip_root_dir);
        Ok(trip)
    }

    async fn update_trip(
        &self,
        auth: &AuthContext,
        id: &str,
        update: &TripUpdate,
    ) -> Result<Trip, StorageError> {
        let mut trip = self.load_trip(&auth.user_id, id).await?;
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
        self.write_trip(&trip).await?;
        debug!("Updated trip with id {id} in {}", self.trip_root_dir);
        Ok(trip)
    }

    async fn delete_trip(&self, auth: &AuthContext, id: &str) -> Result<(), StorageError> {
        // The listing row goes first so a listing never shows a trip whose
        // record is already gone.
        self.remove_file(&self.trip_info_file_path(&auth.user_id, id), id)
            .await?;
        self.remove_file(&self.trip_file_path(&auth.user_id, id), id)
            .await?;
        debug!("Deleted trip with id {id} from {}", self.trip_root_dir);
        Ok(())
    }
}

#[async_trait::async_trait]
impl StatsStore for FilesSystemStorage {
    async fn today(&self, auth: &AuthContext) -> Result<Option<DailyStats>, StorageError> {
        let date = Utc::now().date_naive();
        self.load_stats_for(&auth.user_id, &date).await
    }

    async fn upsert_today(
        &self,
        auth: &AuthContext,
        update: &StatsUpdate,
    ) -> Result<DailyStats, StorageError> {
        let now = Utc::now();
        let date = now.date_naive();
        let mut stats = match self.load_stats_for(&auth.user_id, &date).await? {
            Some(stats) => stats,
            None => DailyStats {
                user_id: auth.user_id.clone(),
                date,
                steps: 0,
                distance_km: 0.0,
                calories: 0,
                created_at: now,
                updated_at: now,
            },
        };
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
        let json = DailyStats::to_json(&stats)?;
        tokio::fs::create_dir_all(self.user_dir(&self.stats_root_dir, &auth.user_id)).await?;
        self.save_bytes(&self.stats_file_path(&auth.user_id, &date), json.as_bytes())
            .await?;
        debug!(
            "Stored stats of {} for {date} in {}",
            auth.user_id, self.stats_root_dir
        );
        Ok(stats)
    }

    async fn range(
        &self,
        auth: &AuthContext,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyStats>, StorageError> {
        let dir = self.user_dir(&self.stats_root_dir, &auth.user_id);
        let mut dirs = match read_dir(&dir).await {
            Ok(dirs) => dirs,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };
        let mut entries = Vec::<DailyStats>::new();
        while let Some(entry) = dirs.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.file_type().is_file() {
                continue;
            }
            if let Some(ext) = entry.path().extension()
                && ext == "stats"
            {
                let file_path = entry.path().to_string_lossy().to_string();
                match self.load_file(&file_path).await {
                    Ok(json) => match DailyStats::from_json(&json) {
                        Ok(stats) => {
                            if stats.date >= start && stats.date <= end {
                                entries.push(stats);
                            }
                        }
                        Err(e) => {
                            error!(
                                "Failed to parse stats from file {}. Error: {}",
                                file_path, e
                            );
                            continue;
                        }
                    },
                    Err(e) => {
                        error!("Failed to load stats from file {}. Error: {}", file_path, e);
                        continue;
                    }
                }
            }
        }
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }
}
