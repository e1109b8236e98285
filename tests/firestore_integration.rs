// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (`FIRESTORE_EMULATOR_HOST`). They are skipped otherwise.

use cinemate::db::{RatingQuery, Store};
use cinemate::models::{
    AiHistoryEntry, AiSuggestion, CheckoutSession, IncomingRecommendation, MediaType,
    RatingChange, SentRecommendation, SubscriptionTier,
};

mod common;
use common::{day, test_db, test_user};

/// Generate a unique user ID for test isolation.
fn unique_uid(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}

fn watch(rating: f64) -> RatingChange {
    RatingChange {
        rating: Some(rating),
        watched: Some(true),
        ..Default::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_user_roundtrip() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("user");

    assert!(db.get_user(&uid).await.unwrap().is_none());

    let user = test_user(&uid, SubscriptionTier::Pro);
    db.upsert_user(&user).await.unwrap();

    let stored = db.get_user(&uid).await.unwrap().expect("user should exist");
    assert_eq!(stored.display_name, user.display_name);
    assert_eq!(stored.subscription, SubscriptionTier::Pro);
    assert_eq!(stored.created_at, user.created_at);
}

#[tokio::test]
async fn test_friend_edges() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("me");
    let friend = test_user(&unique_uid("friend"), SubscriptionTier::Free);

    db.set_friend(&uid, &cinemate::models::Friend::from_user(&friend, day(1)))
        .await
        .unwrap();
    let friends = db.list_friends(&uid).await.unwrap();
    assert_eq!(friends.len(), 1);
    assert_eq!(friends[0].uid, friend.uid);

    db.delete_friend(&uid, &friend.uid).await.unwrap();
    assert!(db.list_friends(&uid).await.unwrap().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// RATING TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_rating_update_merges_and_counts() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("rater");

    db.update_rating_atomic(&uid, 550, &watch(8.0), day(1))
        .await
        .unwrap();
    let merged = db
        .update_rating_atomic(
            &uid,
            550,
            &RatingChange {
                watchlist: Some(true),
                ..Default::default()
            },
            day(2),
        )
        .await
        .unwrap();

    assert_eq!(merged.rating, 8.0);
    assert!(merged.watched && merged.watchlist);
    assert_eq!(merged.updated_at, day(2));

    let stats = db.get_library_stats(&uid).await.unwrap().unwrap();
    assert_eq!((stats.watched_count, stats.watchlist_count), (1, 1));

    assert!(db.delete_rating_atomic(&uid, 550, day(3)).await.unwrap());
    assert!(db.get_rating(&uid, 550).await.unwrap().is_none());
    let stats = db.get_library_stats(&uid).await.unwrap().unwrap();
    assert_eq!((stats.watched_count, stats.watchlist_count), (0, 0));
}

#[tokio::test]
async fn test_concurrent_rating_writes_keep_counts() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("racer");
    let listed = RatingChange {
        watchlist: Some(true),
        ..Default::default()
    };

    let writes = (1..=5).map(|n| db.update_rating_atomic(&uid, n, &listed, day(n as i64)));
    for result in futures_util::future::join_all(writes).await {
        result.unwrap();
    }

    let stats = db.get_library_stats(&uid).await.unwrap().unwrap();
    assert_eq!(stats.watchlist_count, 5);
}

#[tokio::test]
async fn test_friend_visible_query() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("friend");

    for n in 1..=12 {
        db.update_rating_atomic(&uid, n, &watch(5.0), day(n as i64))
            .await
            .unwrap();
    }
    // Private and unwatched records must not come back
    db.update_rating_atomic(
        &uid,
        100,
        &RatingChange {
            is_private: Some(true),
            ..watch(9.0)
        },
        day(20),
    )
    .await
    .unwrap();
    db.update_rating_atomic(
        &uid,
        101,
        &RatingChange {
            watchlist: Some(true),
            ..Default::default()
        },
        day(21),
    )
    .await
    .unwrap();

    let records = db
        .query_ratings(&uid, &RatingQuery::friend_visible(10))
        .await
        .unwrap();

    let ids: Vec<u64> = records.iter().map(|r| r.media_id).collect();
    assert_eq!(ids, (3..=12).rev().collect::<Vec<u64>>());
}

// ═══════════════════════════════════════════════════════════════════════════
// RECOMMENDATION / HISTORY / CHECKOUT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_recommendation_copies() {
    require_emulator!();

    let db = test_db().await;
    let from = unique_uid("from");
    let to = unique_uid("to");

    let sent = SentRecommendation {
        id: uuid::Uuid::new_v4().to_string(),
        from: from.clone(),
        to: to.clone(),
        media_id: 1399,
        media_type: MediaType::Tv,
        message: Some("dragons".to_string()),
        created_at: day(1),
    };
    let incoming = IncomingRecommendation {
        id: sent.id.clone(),
        from: from.clone(),
        from_name: "From".to_string(),
        from_photo_url: None,
        media_id: 1399,
        media_type: MediaType::Tv,
        sender_rating: Some(9.0),
        message: sent.message.clone(),
        created_at: day(1),
    };

    db.add_sent_recommendation(&sent).await.unwrap();
    db.add_incoming_recommendation(&to, &incoming).await.unwrap();

    assert_eq!(db.list_sent_recommendations(&from, 10).await.unwrap(), vec![sent]);
    assert_eq!(
        db.list_incoming_recommendations(&to, 10).await.unwrap(),
        vec![incoming]
    );
}

#[tokio::test]
async fn test_ai_history_newest_first() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("ai");

    for n in 1..=3 {
        let entry = AiHistoryEntry {
            id: format!("h{}", n),
            preferences: format!("prefs {}", n),
            suggestions: vec![AiSuggestion {
                title: "Heat".to_string(),
                year: "1995".to_string(),
                reasoning: "Heist".to_string(),
            }],
            created_at: day(n),
        };
        db.add_ai_history(&uid, &entry).await.unwrap();
    }

    let history = db.list_ai_history(&uid, 2).await.unwrap();
    let ids: Vec<&str> = history.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["h3", "h2"]);
}

#[tokio::test]
async fn test_checkout_session_roundtrip() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid("buyer");
    let session = CheckoutSession {
        id: uuid::Uuid::new_v4().to_string(),
        price: "price_pro".to_string(),
        success_url: "http://localhost/ok".to_string(),
        cancel_url: "http://localhost/cancel".to_string(),
        created_at: day(1),
        url: None,
        error: None,
    };

    db.create_checkout_session(&uid, &session).await.unwrap();
    let stored = db
        .get_checkout_session(&uid, &session.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, session);
    assert!(stored.outcome().is_none());
}
