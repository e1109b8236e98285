// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Friend activity feed tests.
//!
//! Friends and ratings are seeded directly into the in-memory store, then
//! the feed is read back through the HTTP API.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use cinemate::models::{RatingRecord, SubscriptionTier};
use serde_json::Value;

mod common;
use common::{day, watched, TestApp};

async fn activity(app: &TestApp, uid: &str) -> Vec<Value> {
    let (status, body) = app.json(uid, "GET", "/api/friends/activity", None).await;
    assert_eq!(status, StatusCode::OK);
    body["items"].as_array().cloned().unwrap_or_default()
}

fn timestamps(items: &[Value]) -> Vec<DateTime<Utc>> {
    items
        .iter()
        .map(|i| {
            i["timestamp"]
                .as_str()
                .unwrap()
                .parse::<DateTime<Utc>>()
                .unwrap()
        })
        .collect()
}

/// `uid` follows each of `friends`, all of whom exist.
async fn with_friends(app: &TestApp, uid: &str, friends: &[&str]) {
    app.add_user(uid, SubscriptionTier::Free).await;
    for f in friends {
        let friend = app.add_user(f, SubscriptionTier::Free).await;
        app.befriend(uid, &friend).await;
    }
}

#[tokio::test]
async fn test_feed_sorted_newest_first() {
    let app = common::create_test_app();
    with_friends(&app, "me", &["a", "b", "c"]).await;
    app.store.insert_rating("a", watched(1, 3));
    app.store.insert_rating("b", watched(2, 7));
    app.store.insert_rating("c", watched(3, 1));
    app.store.insert_rating("a", watched(4, 9));
    app.store.insert_rating("b", watched(5, 5));

    let items = activity(&app, "me").await;
    let ts = timestamps(&items);

    assert_eq!(items.len(), 5);
    assert!(ts.windows(2).all(|w| w[0] >= w[1]), "not sorted: {:?}", ts);
    assert_eq!(items[0]["movie"]["id"], 4);
    assert_eq!(items[0]["participant"]["uid"], "a");
}

#[tokio::test]
async fn test_feed_never_exceeds_page_size() {
    let app = common::create_test_app();
    let friends: Vec<String> = (0..4).map(|i| format!("f{}", i)).collect();
    let names: Vec<&str> = friends.iter().map(String::as_str).collect();
    with_friends(&app, "me", &names).await;

    for (i, f) in friends.iter().enumerate() {
        for n in 0..12 {
            app.store
                .insert_rating(f, watched(1 + (i as u64) * 20 + n as u64, n));
        }
    }

    let items = activity(&app, "me").await;
    assert_eq!(items.len(), 10);
}

#[tokio::test]
async fn test_unknown_movies_dropped_from_feed() {
    let app = common::create_test_app();
    with_friends(&app, "me", &["a"]).await;
    app.store.insert_rating("a", watched(1, 1));
    // Outside the fake lookup's table
    app.store.insert_rating("a", watched(5000, 2));
    app.store.insert_rating("a", watched(2, 3));

    let items = activity(&app, "me").await;

    let ids: Vec<u64> = items
        .iter()
        .map(|i| i["movie"]["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 1]);
    assert!(items
        .iter()
        .all(|i| i["movie"]["title"] != "Unknown Movie"));
}

#[tokio::test]
async fn test_two_friends_merge_keeps_newest_ten() {
    let app = common::create_test_app();
    with_friends(&app, "me", &["a", "b"]).await;
    for n in 1..=3 {
        app.store.insert_rating("a", watched(n as u64, n));
    }
    for n in 1..=15 {
        app.store.insert_rating("b", watched(20 + n as u64, n));
    }

    let items = activity(&app, "me").await;

    assert_eq!(items.len(), 10);
    assert!(items.iter().all(|i| i["participant"]["uid"] == "b"));
    let ts = timestamps(&items);
    let expected: Vec<DateTime<Utc>> = (6..=15).rev().map(day).collect();
    assert_eq!(ts, expected);
}

#[tokio::test]
async fn test_private_and_unwatched_records_hidden() {
    let app = common::create_test_app();
    with_friends(&app, "me", &["a"]).await;
    app.store.insert_rating("a", watched(1, 1));
    app.store.insert_rating(
        "a",
        RatingRecord {
            is_private: true,
            ..watched(2, 5)
        },
    );
    app.store.insert_rating(
        "a",
        RatingRecord {
            watched: false,
            watchlist: true,
            ..watched(3, 6)
        },
    );

    let items = activity(&app, "me").await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["movie"]["id"], 1);
}

#[tokio::test]
async fn test_private_rating_set_through_api_hidden_from_friends() {
    let app = common::create_test_app();
    with_friends(&app, "me", &["a"]).await;

    let (status, _) = app
        .json(
            "a",
            "PUT",
            "/api/ratings/8",
            Some(serde_json::json!({"watched": true, "rating": 5, "isPrivate": true})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(activity(&app, "me").await.is_empty());

    app.json(
        "a",
        "PUT",
        "/api/ratings/8",
        Some(serde_json::json!({"isPrivate": false})),
    )
    .await;
    let items = activity(&app, "me").await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["rating"], 5.0);
}

#[tokio::test]
async fn test_failing_friend_skipped() {
    let app = common::create_test_app();
    with_friends(&app, "me", &["a", "broken"]).await;
    app.store.insert_rating("a", watched(1, 1));
    app.store.insert_rating("broken", watched(2, 2));
    app.store.fail_reads_for("broken");

    let items = activity(&app, "me").await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["participant"]["uid"], "a");
}

#[tokio::test]
async fn test_no_friends_empty_feed() {
    let app = common::create_test_app();
    app.add_user("me", SubscriptionTier::Free).await;

    assert!(activity(&app, "me").await.is_empty());
}

#[tokio::test]
async fn test_friend_list_read_failure_propagates() {
    let app = common::create_test_app();
    app.store.fail_reads_for("me");

    let (status, _) = app.json("me", "GET", "/api/friends/activity", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
