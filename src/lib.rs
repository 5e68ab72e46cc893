// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod attendance;
pub mod config;
pub mod holidays;
pub mod index;
pub mod records;
pub mod resolve;
pub mod trends;

// CSV ingestion and row normalization
pub mod ingest;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{
    aggregate, event_contribution, normalize_days, score_days, CalendarError, ScoredDay,
};
pub use crate::config::{ScoringConfig, DEFAULT_SCORING_CONFIG_PATH, ENV_SCORING_CONFIG_PATH};
pub use crate::holidays::HolidaySet;
pub use crate::index::EventIndex;
pub use crate::ingest::{normalize_rows, read_events_csv, read_events_csv_file, types::RawEventRow};
pub use crate::records::{
    DailyRecord, EventCategory, EventRecord, EventSummary, ImpactLevel, PendingEvent,
};
pub use crate::resolve::{resolve, split_date_range, DateOutcome, UnresolvedReason};
pub use crate::trends::MonthlyTrends;
