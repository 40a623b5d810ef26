//! Derived views over the store's current snapshot
//!
//! Pure projections, recomputed on demand; none of these own mutation
//! rights or keep parallel state that could drift from the store.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{FixedOffset, NaiveDate};
use snapwall_common::models::PhotoRecord;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::store::GalleryStore;

/// Number of distinct uploaders represented in the collection
///
/// Only the count is exposed upward, not the membership list.
pub fn contributor_count(records: &[PhotoRecord]) -> usize {
    records
        .iter()
        .map(|r| r.uploader_id)
        .collect::<HashSet<_>>()
        .len()
}

/// Collection sorted by `created_at` descending (newest first)
pub fn chronological_feed(records: &[PhotoRecord]) -> Vec<PhotoRecord> {
    let mut feed = records.to_vec();
    feed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    feed
}

/// Photos of one local calendar day, in ascending time order
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    pub day: NaiveDate,
    pub photos: Vec<PhotoRecord>,
}

/// Group records by calendar day in the viewer's local offset
///
/// The grouping key is the *local* date, not the UTC date: two records a few
/// minutes apart across a UTC midnight land in the same bucket when their
/// local dates match. Buckets come newest-day-first; photos within a day
/// read in ascending time order.
pub fn date_buckets(records: &[PhotoRecord], offset: FixedOffset) -> Vec<DayBucket> {
    let mut ordered = records.to_vec();
    ordered.sort_by_key(|r| r.created_at);

    let mut buckets: Vec<DayBucket> = Vec::new();
    for record in ordered {
        let day = record.created_at.with_timezone(&offset).date_naive();
        match buckets.iter_mut().find(|b| b.day == day) {
            Some(bucket) => bucket.photos.push(record),
            None => buckets.push(DayBucket {
                day,
                photos: vec![record],
            }),
        }
    }

    buckets.sort_by(|a, b| b.day.cmp(&a.day));
    buckets
}

/// Wrapping slideshow cursor
///
/// The cursor only ever moves on a tick; a collection that shrank since the
/// last tick clamps the cursor back into range instead of panicking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlideshowCursor {
    index: usize,
}

impl SlideshowCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one, wrapping to 0 at the collection length
    pub fn advance(&mut self, len: usize) -> usize {
        if len == 0 {
            self.index = 0;
        } else {
            let next = self.index + 1;
            self.index = if next >= len { 0 } else { next };
        }
        self.index
    }

    /// Current position, clamped into the collection's range
    pub fn position(&self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.index.min(len - 1))
        }
    }
}

/// Run the fixed-interval slideshow tick loop
///
/// Publishes each new cursor position on a watch channel; the loop ends when
/// the last receiver is dropped or the task is aborted at session teardown.
pub fn spawn_auto_advance(
    store: Arc<GalleryStore>,
    every: Duration,
) -> (watch::Receiver<usize>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(0usize);

    let handle = tokio::spawn(async move {
        let mut cursor = SlideshowCursor::new();
        let mut ticker = tokio::time::interval(every);
        // The first tick fires immediately; skip it so position 0 holds for
        // a full interval
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let len = store.len().await;
            let position = cursor.advance(len);
            if tx.send(position).is_err() {
                break;
            }
        }
    });

    (rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use snapwall_common::models::PhotoId;
    use uuid::Uuid;

    fn record_at(id: &str, uploader: Uuid, created_at: DateTime<Utc>) -> PhotoRecord {
        PhotoRecord {
            id: PhotoId::from(id),
            event_id: Uuid::nil(),
            uploader_id: uploader,
            image_url: "https://cdn.example/p.jpg".to_string(),
            caption: None,
            created_at,
        }
    }

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_contributor_count_is_distinct() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let records = vec![
            record_at("p1", alice, ts("2024-03-01T10:00:00Z")),
            record_at("p2", alice, ts("2024-03-01T11:00:00Z")),
            record_at("p3", bob, ts("2024-03-01T12:00:00Z")),
        ];

        assert_eq!(contributor_count(&records), 2);
        assert_eq!(contributor_count(&[]), 0);
    }

    #[test]
    fn test_feed_is_newest_first() {
        let u = Uuid::new_v4();
        let records = vec![
            record_at("old", u, ts("2024-03-01T10:00:00Z")),
            record_at("new", u, ts("2024-03-02T10:00:00Z")),
            record_at("mid", u, ts("2024-03-01T18:00:00Z")),
        ];

        let feed = chronological_feed(&records);
        let ids: Vec<&str> = feed.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_buckets_use_local_calendar_day() {
        let u = Uuid::new_v4();
        // UTC-5: both instants fall on the local day 2024-03-01
        let records = vec![
            record_at("p1", u, ts("2024-03-01T23:50:00Z")),
            record_at("p2", u, ts("2024-03-02T00:05:00Z")),
        ];
        let utc_minus_5 = FixedOffset::west_opt(5 * 3600).unwrap();

        let buckets = date_buckets(&records, utc_minus_5);
        assert_eq!(buckets.len(), 1);
        assert_eq!(
            buckets[0].day,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(buckets[0].photos.len(), 2);

        // The same records split across two UTC days
        let utc = FixedOffset::east_opt(0).unwrap();
        let buckets = date_buckets(&records, utc);
        assert_eq!(buckets.len(), 2);
    }

    #[test]
    fn test_buckets_newest_day_first_ascending_within_day() {
        let u = Uuid::new_v4();
        let records = vec![
            record_at("b", u, ts("2024-03-02T12:00:00Z")),
            record_at("a", u, ts("2024-03-02T08:00:00Z")),
            record_at("earlier", u, ts("2024-03-01T09:00:00Z")),
        ];
        let utc = FixedOffset::east_opt(0).unwrap();

        let buckets = date_buckets(&records, utc);
        assert_eq!(buckets.len(), 2);
        assert_eq!(
            buckets[0].day,
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
        let ids: Vec<&str> = buckets[0].photos.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_cursor_wraps_at_length() {
        let mut cursor = SlideshowCursor::new();
        assert_eq!(cursor.advance(3), 1);
        assert_eq!(cursor.advance(3), 2);
        assert_eq!(cursor.advance(3), 0);
    }

    #[test]
    fn test_cursor_clamps_when_collection_shrinks() {
        let mut cursor = SlideshowCursor::new();
        cursor.advance(5);
        cursor.advance(5);
        cursor.advance(5);
        cursor.advance(5); // index 4

        // Collection shrank to 2; next tick lands in range
        let position = cursor.advance(2);
        assert!(position < 2);
        assert_eq!(cursor.position(2), Some(position));
    }

    #[test]
    fn test_cursor_on_empty_collection() {
        let mut cursor = SlideshowCursor::new();
        assert_eq!(cursor.advance(0), 0);
        assert_eq!(cursor.position(0), None);
    }

    #[tokio::test]
    async fn test_auto_advance_ticks_and_wraps() {
        let store = Arc::new(GalleryStore::new());
        for id in ["p1", "p2", "p3"] {
            store.add(record_at(id, Uuid::nil(), Utc::now())).await;
        }

        let (mut rx, handle) = spawn_auto_advance(Arc::clone(&store), Duration::from_millis(10));

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 1);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 2);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 0);

        handle.abort();
    }
}
