//! crates/page_tracker_core/src/reading_sessions.rs
//!
//! The reading ledger service: records incremental reading progress and
//! answers "how many pages did I read today" queries. Sessions are
//! append-only; nothing ever updates or deletes one.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveTime};
use tracing::info;

use crate::domain::ReadingSession;
use crate::ports::{Clock, DatabaseService, PortError, PortResult};

const MINIMUM_NUMBER_OF_PAGES: i32 = 0;
const DEFAULT_STARTING_PAGE: i32 = 1;

/// Records reading sessions and derives daily page totals.
#[derive(Clone)]
pub struct ReadingSessionService {
    db: Arc<dyn DatabaseService>,
    clock: Arc<dyn Clock>,
}

impl ReadingSessionService {
    pub fn new(db: Arc<dyn DatabaseService>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Returns the number of pages read on the day implied by
    /// `date_to_retrieve`.
    ///
    /// The day runs from local midnight to midnight-plus-24h (end
    /// exclusive) in the offset carried by `date_to_retrieve` itself, not
    /// in any server-local timezone. Two calls with the same wall-clock
    /// date but different offsets can bucket differently; that is the
    /// reader's local day, by intention.
    pub async fn get_number_of_pages_read(
        &self,
        date_to_retrieve: DateTime<FixedOffset>,
    ) -> PortResult<i32> {
        // A fixed offset has no DST transitions, so local midnight is
        // always the instant minus the local time-of-day.
        let since_midnight = date_to_retrieve.time() - NaiveTime::MIN;
        let day_start_inclusive = date_to_retrieve - since_midnight;
        let day_end_exclusive = day_start_inclusive + Duration::hours(24);

        let sessions = self
            .db
            .sessions_between(day_start_inclusive, day_end_exclusive)
            .await?;

        info!(
            count = sessions.len(),
            from = %day_start_inclusive,
            to = %day_end_exclusive,
            "Found reading sessions recorded in day window"
        );

        Ok(sessions.iter().map(|s| s.number_of_pages).sum())
    }

    /// Saves the page number the reader was on when they finished, then
    /// derives the number of pages read since the last recorded session.
    ///
    /// The previous position is the latest session's `page_finished_on`,
    /// or page 1 when nothing has been recorded yet. The new page number
    /// may equal the previous one (a zero-page session) but can never
    /// regress.
    pub async fn record_finished_at(&self, page_number: i32) -> PortResult<ReadingSession> {
        if page_number < DEFAULT_STARTING_PAGE {
            return Err(PortError::Validation {
                field: "page_number",
                message: format!("Page number must be at least {DEFAULT_STARTING_PAGE}"),
            });
        }

        let latest = self.db.latest_session().await?;
        let previous_page_number = latest
            .map(|s| s.page_finished_on)
            .unwrap_or(DEFAULT_STARTING_PAGE);

        if page_number < previous_page_number {
            return Err(PortError::Validation {
                field: "page_number",
                message: format!(
                    "Page number can't be earlier than the last recorded page ({previous_page_number})"
                ),
            });
        }

        let session = ReadingSession {
            id: 0,
            number_of_pages: page_number - previous_page_number,
            date_of_session: self.clock.now(),
            page_finished_on: page_number,
            book_id: None,
        };

        let created = self.db.insert_session(session).await?;
        info!(
            session_id = created.id,
            pages = created.number_of_pages,
            finished_on = created.page_finished_on,
            "Recorded reading session"
        );
        Ok(created)
    }

    /// Creates a session where the reader read `number_of_pages` full
    /// pages, timestamped now. The absolute position is left at its
    /// default; this path never links a book.
    pub async fn record_pages(&self, number_of_pages: i32) -> PortResult<ReadingSession> {
        if number_of_pages < MINIMUM_NUMBER_OF_PAGES {
            return Err(PortError::Validation {
                field: "number_of_pages",
                message: format!("Number of pages must be at least {MINIMUM_NUMBER_OF_PAGES}"),
            });
        }

        let session = ReadingSession {
            id: 0,
            number_of_pages,
            date_of_session: self.clock.now(),
            page_finished_on: DEFAULT_STARTING_PAGE,
            book_id: None,
        };

        let created = self.db.insert_session(session).await?;
        info!(
            session_id = created.id,
            pages = created.number_of_pages,
            "Recorded reading session"
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{instant, FixedClock, InMemoryDb};

    fn service(db: Arc<InMemoryDb>, now: DateTime<FixedOffset>) -> ReadingSessionService {
        ReadingSessionService::new(db, Arc::new(FixedClock(now)))
    }

    #[tokio::test]
    async fn record_pages_rejects_negative_counts() {
        for pages in [-1, -2, -30] {
            let db = Arc::new(InMemoryDb::new());
            let err = service(db.clone(), instant("2024-07-11T10:30:00+10:00"))
                .record_pages(pages)
                .await
                .unwrap_err();

            assert!(matches!(
                err,
                PortError::Validation {
                    field: "number_of_pages",
                    ..
                }
            ));
            assert!(db.sessions().is_empty());
        }
    }

    #[tokio::test]
    async fn record_pages_saves_session_with_clock_timestamp() {
        for pages in [0, 1, 22] {
            let now = instant("2024-07-11T10:30:00+10:00");
            let db = Arc::new(InMemoryDb::new());
            let created = service(db.clone(), now).record_pages(pages).await.unwrap();

            assert_eq!(created.number_of_pages, pages);
            assert_eq!(created.date_of_session, now);
            assert_eq!(created.page_finished_on, 1);
            assert_eq!(created.book_id, None);
            assert_eq!(db.sessions().len(), 1);
        }
    }

    #[tokio::test]
    async fn record_finished_at_uses_default_starting_page_when_no_history() {
        let db = Arc::new(InMemoryDb::new());
        let created = service(db, instant("2024-07-11T10:30:00+10:00"))
            .record_finished_at(5)
            .await
            .unwrap();

        assert_eq!(created.page_finished_on, 5);
        assert_eq!(created.number_of_pages, 4);
    }

    #[tokio::test]
    async fn record_finished_at_computes_delta_from_latest_session() {
        let db = Arc::new(InMemoryDb::new());
        db.add_session(6, instant("2024-07-10T08:00:00+10:00"), 6);
        // An older session with a larger page must not win the "latest" race.
        db.add_session(2, instant("2024-07-01T08:00:00+10:00"), 40);

        let created = service(db, instant("2024-07-11T10:30:00+10:00"))
            .record_finished_at(15)
            .await
            .unwrap();

        assert_eq!(created.number_of_pages, 9);
        assert_eq!(created.page_finished_on, 15);
    }

    #[tokio::test]
    async fn record_finished_at_allows_rereading_the_same_page() {
        let db = Arc::new(InMemoryDb::new());
        db.add_session(6, instant("2024-07-10T08:00:00+10:00"), 46);

        let created = service(db, instant("2024-07-11T10:30:00+10:00"))
            .record_finished_at(46)
            .await
            .unwrap();

        assert_eq!(created.number_of_pages, 0);
        assert_eq!(created.page_finished_on, 46);
    }

    #[tokio::test]
    async fn record_finished_at_rejects_regression() {
        let db = Arc::new(InMemoryDb::new());
        db.add_session(6, instant("2024-07-10T08:00:00+10:00"), 20);

        let err = service(db.clone(), instant("2024-07-11T10:30:00+10:00"))
            .record_finished_at(19)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PortError::Validation {
                field: "page_number",
                ..
            }
        ));
        assert_eq!(db.sessions().len(), 1);
    }

    #[tokio::test]
    async fn record_finished_at_rejects_pages_before_one() {
        let db = Arc::new(InMemoryDb::new());
        let err = service(db, instant("2024-07-11T10:30:00+10:00"))
            .record_finished_at(0)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PortError::Validation {
                field: "page_number",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn pages_read_buckets_by_the_reference_offset_day() {
        let db = Arc::new(InMemoryDb::new());
        // Day before, last second: excluded.
        db.add_session(1, instant("2024-07-10T23:59:59+10:00"), 1);
        // Exactly local midnight: included.
        db.add_session(2, instant("2024-07-11T00:00:00+10:00"), 1);
        // Last second of the day: included.
        db.add_session(4, instant("2024-07-11T23:59:59+10:00"), 1);
        // Exactly the next midnight: excluded.
        db.add_session(8, instant("2024-07-12T00:00:00+10:00"), 1);

        let total = service(db, instant("2024-07-11T23:00:00+10:00"))
            .get_number_of_pages_read(instant("2024-07-11T23:00:00+10:00"))
            .await
            .unwrap();

        assert_eq!(total, 6);
    }

    #[tokio::test]
    async fn pages_read_counts_instants_not_wall_clocks() {
        let db = Arc::new(InMemoryDb::new());
        // 2024-07-11 01:00 +10:00 == 2024-07-10 15:00 UTC; in the +10:00
        // day window even though its stored offset differs.
        db.add_session(3, instant("2024-07-10T15:00:00+00:00"), 1);

        let total = service(db, instant("2024-07-11T12:00:00+10:00"))
            .get_number_of_pages_read(instant("2024-07-11T12:00:00+10:00"))
            .await
            .unwrap();

        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn pages_read_returns_zero_without_sessions() {
        let db = Arc::new(InMemoryDb::new());
        let total = service(db, instant("2024-07-11T12:00:00+10:00"))
            .get_number_of_pages_read(instant("2024-07-11T12:00:00+10:00"))
            .await
            .unwrap();

        assert_eq!(total, 0);
    }
}
