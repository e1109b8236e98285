use chrono::{Duration, TimeZone, Utc};
use cinemate::models::{FeedRef, LibraryItem, MediaType, Movie, Participant};
use cinemate::services::collection::{self, CollectionFilter, CollectionSort};
use cinemate::services::feed::merge_feed_refs;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

const GENRES: [&str; 6] = ["Drama", "Comedy", "Action", "Sci-Fi", "Horror", "Romance"];

/// A library the size of a heavy user's collection.
fn library(n: u64) -> Vec<LibraryItem> {
    let base = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| LibraryItem {
            movie: Movie {
                id: i,
                title: format!("Title number {}", i),
                synopsis: "A long synopsis that the text search has to scan through.".repeat(4),
                genres: vec![
                    GENRES[(i % 6) as usize].to_string(),
                    GENRES[((i / 6) % 6) as usize].to_string(),
                ],
                year: if i % 50 == 0 {
                    "TBA".to_string()
                } else {
                    (1950 + i % 75).to_string()
                },
                rating: (i % 100) as f64 / 10.0,
                image_url: String::new(),
                image_hint: String::new(),
                media_type: if i % 4 == 0 { MediaType::Tv } else { MediaType::Movie },
            },
            user_rating: (i % 11) as f64,
            watched: true,
            watchlist: false,
            is_private: false,
            notes: None,
            updated_at: base + Duration::hours(i as i64),
        })
        .collect()
}

fn benchmark_collection_filter(c: &mut Criterion) {
    let items = library(2_000);
    let full = CollectionFilter {
        rating_range: Some((3.0, 8.0)),
        year_start: Some(1980),
        year_end: Some(2010),
        genres: vec!["sci-fi".to_string(), "drama".to_string()],
        media_type: Some(MediaType::Movie),
        text: Some("number 1".to_string()),
    };

    let mut group = c.benchmark_group("collection_filter");

    group.bench_function("unfiltered_recent", |b| {
        b.iter(|| {
            collection::apply(
                black_box(items.clone()),
                &CollectionFilter::default(),
                CollectionSort::Recent,
            )
        })
    });

    group.bench_function("all_filters_title_sort", |b| {
        b.iter(|| collection::apply(black_box(items.clone()), &full, CollectionSort::Title))
    });

    group.finish();
}

fn benchmark_feed_merge(c: &mut Criterion) {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    // 200 friends, 10 records each
    let batches: Vec<Vec<FeedRef>> = (0..200)
        .map(|f| {
            (0..10)
                .map(|n| FeedRef {
                    participant: Participant::bare(&format!("friend-{}", f)),
                    media_id: (f * 10 + n) as u64,
                    media_type: MediaType::Movie,
                    timestamp: base + Duration::minutes((f * 37 + n * 101) % 5000),
                    rating: None,
                    note: None,
                })
                .collect()
        })
        .collect();

    c.bench_function("merge_feed_refs_200_friends", |b| {
        b.iter(|| merge_feed_refs(black_box(batches.clone()), 10))
    });
}

criterion_group!(benches, benchmark_collection_filter, benchmark_feed_merge);
criterion_main!(benches);
