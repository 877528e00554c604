// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use chrono::NaiveDate;
use common::{
    auth::AuthContext,
    test_helper::route::short_hop,
    trip::{TripSummary, TripUpdate},
};
use std::time::Duration;
use storage::{StorageError, TripStore};

mod helper;
use helper::{create_storage, get_path};

fn get_summary(name: &str, date: &str) -> TripSummary {
    TripSummary {
        name: name.to_owned(),
        date: date
            .parse::<NaiveDate>()
            .unwrap_or_else(|e| panic!("Failed to parse the test date {date}. Reason: {e}")),
        distance_km: 0.157,
        duration_min: 2,
        route: short_hop(),
    }
}

fn trip_files_exist(folder_name: &str, user_id: &str, id: &str) -> (bool, bool) {
    let base = format!("{}/trip/{user_id}", get_path(folder_name));
    (
        std::fs::exists(format!("{base}/{id}.trip")).unwrap_or(false),
        std::fs::exists(format!("{base}/{id}.info")).unwrap_or(false),
    )
}

#[test_log::test(tokio::test)]
pub async fn save_and_load_stored_trip() {
    let storage = create_storage("save_and_load_stored_trip");
    let auth = AuthContext::new("walker");
    let summary = get_summary("Morning walk", "2026-08-22");

    let trip = storage
        .save_trip(&auth, &summary)
        .await
        .unwrap_or_else(|e| panic!("Failed to save the trip. Reason: {e}"));
    assert_eq!(trip.user_id, "walker");
    assert_eq!(trip.name, summary.name);
    assert_eq!(trip.distance_km, summary.distance_km);
    assert_eq!(trip.duration_min, summary.duration_min);
    assert_eq!(trip.route, summary.route);

    let (data_file, info_file) = trip_files_exist("save_and_load_stored_trip", "walker", &trip.id);
    assert!(data_file, "the trip record file has to exist");
    assert!(info_file, "the trip info file has to exist");

    let loaded = storage
        .trip(&auth, &trip.id)
        .await
        .unwrap_or_else(|e| panic!("Failed to load the trip. Reason: {e}"));
    assert_eq!(loaded, trip);
}

#[test_log::test(tokio::test)]
pub async fn list_trip_infos_newest_date_first() {
    let storage = create_storage("list_trip_infos_newest_date_first");
    let auth = AuthContext::new("walker");
    for (name, date) in [
        ("Oldest", "2026-08-20"),
        ("Newest", "2026-08-22"),
        ("Middle", "2026-08-21"),
    ] {
        storage
            .save_trip(&auth, &get_summary(name, date))
            .await
            .unwrap_or_else(|e| panic!("Failed to save the trip {name}. Reason: {e}"));
        // Ids derive from the creation time with millisecond precision.
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let infos = storage
        .trip_infos(&auth)
        .await
        .unwrap_or_else(|e| panic!("Failed to list the trips. Reason: {e}"));
    let names: Vec<&str> = infos.iter().map(|info| info.name.as_str()).collect();
    assert_eq!(names, vec!["Newest", "Middle", "Oldest"]);
    assert!(infos.iter().all(|info| info.point_count == 2));
}

#[tokio::test]
pub async fn report_not_found_for_missing_trip() {
    let storage = create_storage("report_not_found_for_missing_trip");
    let auth = AuthContext::new("walker");
    let result = storage.trip(&auth, "2026_08_22_00_00_00_000").await;
    assert!(matches!(result, Err(StorageError::NotFound { .. })));
}

#[tokio::test]
pub async fn update_stored_trip() {
    let storage = create_storage("update_stored_trip");
    let auth = AuthContext::new("walker");
    let trip = storage
        .save_trip(&auth, &get_summary("Morning walk", "2026-08-22"))
        .await
        .unwrap_or_else(|e| panic!("Failed to save the trip. Reason: {e}"));

    tokio::time::sleep(Duration::from_millis(5)).await;
    let update = TripUpdate {
        name: Some("Evening walk".to_owned()),
        distance_km: Some(0.2),
        ..TripUpdate::default()
    };
    let updated = storage
        .update_trip(&auth, &trip.id, &update)
        .await
        .unwrap_or_else(|e| panic!("Failed to update the trip. Reason: {e}"));
    assert_eq!(updated.name, "Evening walk");
    assert_eq!(updated.distance_km, 0.2);
    assert_eq!(updated.route, trip.route, "untouched fields keep their value");
    assert!(updated.updated_at > updated.created_at);

    let reloaded = storage
        .trip(&auth, &trip.id)
        .await
        .unwrap_or_else(|e| panic!("Failed to reload the trip. Reason: {e}"));
    assert_eq!(reloaded, updated);

    let missing = storage
        .update_trip(&auth, "2026_08_22_00_00_00_000", &update)
        .await;
    assert!(matches!(missing, Err(StorageError::NotFound { .. })));
}

#[tokio::test]
pub async fn delete_stored_trip() {
    let storage = create_storage("delete_stored_trip");
    let auth = AuthContext::new("walker");
    let trip = storage
        .save_trip(&auth, &get_summary("Morning walk", "2026-08-22"))
        .await
        .unwrap_or_else(|e| panic!("Failed to save the trip. Reason: {e}"));

    storage
        .delete_trip(&auth, &trip.id)
        .await
        .unwrap_or_else(|e| panic!("Failed to delete the trip. Reason: {e}"));
    let (data_file, info_file) = trip_files_exist("delete_stored_trip", "walker", &trip.id);
    assert!(!data_file, "the trip record file has to be removed");
    assert!(!info_file, "the trip info file has to be removed");

    let second = storage.delete_trip(&auth, &trip.id).await;
    assert!(matches!(second, Err(StorageError::NotFound { .. })));
    assert!(storage
        .trip_infos(&auth)
        .await
        .unwrap_or_else(|e| panic!("Failed to list the trips. Reason: {e}"))
        .is_empty());
}

#[tokio::test]
pub async fn scope_trips_to_their_user() {
    let storage = create_storage("scope_trips_to_their_user");
    let walker = AuthContext::new("walker");
    let runner = AuthContext::new("runner");
    let trip = storage
        .save_trip(&walker, &get_summary("Morning walk", "2026-08-22"))
        .await
        .unwrap_or_else(|e| panic!("Failed to save the trip. Reason: {e}"));

    assert!(storage
        .trip_infos(&runner)
        .await
        .unwrap_or_else(|e| panic!("Failed to list the trips. Reason: {e}"))
        .is_empty());
    let foreign = storage.trip(&runner, &trip.id).await;
    assert!(matches!(foreign, Err(StorageError::NotFound { .. })));
}

#[tokio::test]
pub async fn skip_unreadable_listing_rows() {
    let storage = create_storage("skip_unreadable_listing_rows");
    let auth = AuthContext::new("walker");
    storage
        .save_trip(&auth, &get_summary("Morning walk", "2026-08-22"))
        .await
        .unwrap_or_else(|e| panic!("Failed to save the trip. Reason: {e}"));

    let broken = format!(
        "{}/trip/walker/broken.info",
        get_path("skip_unreadable_listing_rows")
    );
    std::fs::write(&broken, "not json")
        .unwrap_or_else(|e| panic!("Failed to write the broken info file. Reason: {e}"));

    let infos = storage
        .trip_infos(&auth)
        .await
        .unwrap_or_else(|e| panic!("Failed to list the trips. Reason: {e}"));
    assert_eq!(infos.len(), 1, "unreadable rows are skipped, not fatal");
}
