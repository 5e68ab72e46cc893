//! records.rs — Core value types shared across the pipeline: event records,
//! the pending-review side channel, per-day calendar records and impact tiers.
//!
//! Serialized shapes here match the calendar JSON consumed downstream:
//! categories keep their Japanese labels, tiers stay English.

use serde::{Deserialize, Serialize};

use crate::resolve::DateOutcome;
use chrono::NaiveDate;

/// Event category as it appears in the source tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventCategory {
    #[serde(rename = "大会")]
    Competition,
    #[serde(rename = "クルーズ")]
    Cruise,
    #[serde(rename = "コンサート")]
    Concert,
    /// Festivals and other general events.
    #[serde(rename = "イベント")]
    Festival,
}

impl EventCategory {
    /// Parse a raw category label. Unknown labels fall back to `Festival`,
    /// which carries the largest zero-attendance default.
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "大会" => Self::Competition,
            "クルーズ" => Self::Cruise,
            "コンサート" => Self::Concert,
            _ => Self::Festival,
        }
    }

    /// Emoji marker prefixed onto calendar subjects.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Competition => "🏆",
            Self::Cruise => "🚢",
            Self::Concert => "🎤",
            Self::Festival => "🎉",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Competition => "大会",
            Self::Cruise => "クルーズ",
            Self::Concert => "コンサート",
            Self::Festival => "イベント",
        }
    }
}

/// Discrete impact tier, used both per event (attendance bands) and per
/// calendar day (normalized-score bands).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl ImpactLevel {
    /// Attendance banding: 1000+ heads is High, 300+ is Medium.
    pub fn for_attendees(attendees: u32) -> Self {
        if attendees >= 1000 {
            Self::High
        } else if attendees >= 300 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// One normalized event, created once from a raw source row and immutable
/// thereafter. Dates stay as tagged outcomes; records whose dates did not
/// resolve are routed to the pending list when the index is built.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub category: EventCategory,
    pub subject: String,
    pub start_date: DateOutcome,
    pub end_date: DateOutcome,
    pub estimated_attendees: u32,
    pub location: String,
    pub description: String,
    pub organizer: String,
    pub contact: String,
    /// The raw date-range text exactly as scraped, kept for review output.
    pub date_text: String,
    pub source: String,
}

impl EventRecord {
    /// Both ends as navigable dates, if the record resolved at all.
    /// The span may still be inverted; the index checks that separately.
    pub fn resolved_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.start_date.date()?, self.end_date.date()?))
    }

    /// Days covered by the event, inclusive. `None` until both ends resolve.
    pub fn span_days(&self) -> Option<i64> {
        let (start, end) = self.resolved_span()?;
        Some((end - start).num_days() + 1)
    }
}

/// Event that could not be placed on the calendar, surfaced for manual
/// review. Field names match the review JSON the collectors produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingEvent {
    pub subject: String,
    /// Original date text, verbatim.
    pub original_date: String,
    pub event_type: EventCategory,
    pub location: String,
    pub description: String,
    pub organizer: String,
    pub contact: String,
}

impl PendingEvent {
    pub fn from_record(record: &EventRecord) -> Self {
        Self {
            subject: record.subject.clone(),
            original_date: record.date_text.clone(),
            event_type: record.category,
            location: record.location.clone(),
            description: record.description.clone(),
            organizer: record.organizer.clone(),
            contact: record.contact.clone(),
        }
    }
}

/// Per-day view of an active event, embedded in the calendar output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    /// Subject with the category marker prefixed (e.g. "🚢 飛鳥Ⅱ入港").
    pub subject: String,
    pub event_type: EventCategory,
    pub estimated_attendees: u32,
    pub location: String,
    pub impact_level: ImpactLevel,
}

impl EventSummary {
    pub fn for_record(record: &EventRecord) -> Self {
        Self {
            subject: format!("{} {}", record.category.marker(), record.subject),
            event_type: record.category,
            estimated_attendees: record.estimated_attendees,
            location: record.location.clone(),
            impact_level: ImpactLevel::for_attendees(record.estimated_attendees),
        }
    }
}

/// One calendar day after both aggregation passes. Chronological, one per
/// day, no gaps; `normalized_score` is on the 0–100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub is_holiday: bool,
    pub holiday_name: Option<String>,
    pub events: Vec<EventSummary>,
    pub raw_score: f64,
    /// Monthly trend value for this day's month, before weighting.
    pub trend_score: f64,
    pub normalized_score: f64,
    pub impact_level: ImpactLevel,
}
