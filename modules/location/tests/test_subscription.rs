// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use common::test_helper::route::{city_walk, short_hop};
use location::test_helper::ManualLocationSource;
use location::{LocationSource, Permission};
use std::time::Duration;
use tokio::time::timeout;

const TIMEOUT_MS: u16 = 100;

#[test_log::test(tokio::test)]
async fn discard_samples_without_subscription() {
    let source = ManualLocationSource::default();
    let route = short_hop();
    source.push(&route[0]);

    let mut subscription = source
        .subscribe(0.0)
        .await
        .unwrap_or_else(|e| panic!("Failed to subscribe. Reason: {e}"));
    source.push(&route[1]);

    let point = timeout(Duration::from_millis(TIMEOUT_MS.into()), subscription.next())
        .await
        .unwrap_or_else(|_| panic!("No sample received within {TIMEOUT_MS} ms"))
        .unwrap_or_else(|| panic!("Stream ended unexpectedly"));
    assert_eq!(point, route[1], "only samples pushed after subscribing arrive");
}

#[test_log::test(tokio::test)]
async fn unsubscribe_is_idempotent() {
    let source = ManualLocationSource::default();
    let route = short_hop();
    let mut subscription = source
        .subscribe(0.0)
        .await
        .unwrap_or_else(|e| panic!("Failed to subscribe. Reason: {e}"));

    subscription.unsubscribe();
    subscription.unsubscribe();

    source.push(&route[0]);
    assert_eq!(subscription.next().await, None);
    assert_eq!(source.subscriber_count(), 0);
}

#[test_log::test(tokio::test)]
async fn filter_applies_per_subscription() {
    let source = ManualLocationSource::default();
    let route = city_walk();
    let mut all_samples = source
        .subscribe(0.0)
        .await
        .unwrap_or_else(|e| panic!("Failed to subscribe. Reason: {e}"));
    let mut coarse = source
        .subscribe(100_000.0)
        .await
        .unwrap_or_else(|e| panic!("Failed to subscribe. Reason: {e}"));

    for point in &route {
        source.push(point);
    }

    for expected in &route {
        let point = timeout(Duration::from_millis(TIMEOUT_MS.into()), all_samples.next())
            .await
            .unwrap_or_else(|_| panic!("No sample received within {TIMEOUT_MS} ms"))
            .unwrap_or_else(|| panic!("Stream ended unexpectedly"));
        assert_eq!(&point, expected);
    }

    let first = timeout(Duration::from_millis(TIMEOUT_MS.into()), coarse.next())
        .await
        .unwrap_or_else(|_| panic!("No sample received within {TIMEOUT_MS} ms"))
        .unwrap_or_else(|| panic!("Stream ended unexpectedly"));
    assert_eq!(first, route[0]);
    let beyond = timeout(Duration::from_millis(TIMEOUT_MS.into()), coarse.next()).await;
    assert!(beyond.is_err(), "the walk never leaves the 100 km gate");
}

#[test_log::test(tokio::test)]
async fn ended_stream_closes_subscriptions_and_refuses_new_ones() {
    let source = ManualLocationSource::default();
    let mut subscription = source
        .subscribe(0.0)
        .await
        .unwrap_or_else(|e| panic!("Failed to subscribe. Reason: {e}"));

    source.fail_stream();

    let end = timeout(Duration::from_millis(TIMEOUT_MS.into()), subscription.next())
        .await
        .unwrap_or_else(|_| panic!("Stream end not observed within {TIMEOUT_MS} ms"));
    assert_eq!(end, None);
    assert!(source.subscribe(0.0).await.is_err());
}

#[test_log::test(tokio::test)]
async fn report_configured_permission() {
    let granting = ManualLocationSource::default();
    let denying = ManualLocationSource::new(Permission::Denied);
    assert_eq!(
        granting
            .request_permission()
            .await
            .unwrap_or_else(|e| panic!("Failed to request permission. Reason: {e}")),
        Permission::Granted
    );
    assert_eq!(
        denying
            .request_permission()
            .await
            .unwrap_or_else(|e| panic!("Failed to request permission. Reason: {e}")),
        Permission::Denied
    );
}
