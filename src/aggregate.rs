//! aggregate.rs — Two-pass calendar aggregation.
//!
//! Pass one ([`score_days`]) walks every day of the inclusive range and
//! accumulates absolute demand points from holidays, the monthly trend,
//! active events and the weekend effect. Pass two ([`normalize_days`])
//! rescales against the busiest day so scores land on 0-100 and bands the
//! impact tier. [`aggregate`] composes both.
//!
//! Day scoring is independent per day; only normalization needs the whole
//! range.

use chrono::{Datelike, NaiveDate, Weekday};
use thiserror::Error;
use tracing::debug;

use crate::config::ScoringConfig;
use crate::holidays::HolidaySet;
use crate::index::EventIndex;
use crate::records::{DailyRecord, EventCategory, EventRecord, EventSummary};
use crate::trends::MonthlyTrends;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("invalid calendar range: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// One day after the scoring pass, before normalization.
#[derive(Debug, Clone)]
pub struct ScoredDay {
    pub date: NaiveDate,
    pub is_holiday: bool,
    pub holiday_name: Option<String>,
    pub events: Vec<EventSummary>,
    pub raw_score: f64,
    pub trend_score: f64,
}

/// Score every day in `[start, end]`. Fails only on an inverted range;
/// missing holiday or trend data degrades to zero contribution.
pub fn score_days(
    index: &EventIndex,
    holidays: &HolidaySet,
    trends: &MonthlyTrends,
    start: NaiveDate,
    end: NaiveDate,
    cfg: &ScoringConfig,
) -> Result<Vec<ScoredDay>, CalendarError> {
    if end < start {
        return Err(CalendarError::InvalidRange { start, end });
    }

    let mut days = Vec::new();
    let mut day = start;
    loop {
        days.push(score_one_day(index, holidays, trends, day, cfg));
        match day.succ_opt() {
            Some(next) if next <= end => day = next,
            _ => break,
        }
    }
    Ok(days)
}

fn score_one_day(
    index: &EventIndex,
    holidays: &HolidaySet,
    trends: &MonthlyTrends,
    date: NaiveDate,
    cfg: &ScoringConfig,
) -> ScoredDay {
    let mut raw = 0.0;

    // 1) Holiday bonus.
    let holiday_name = holidays.name_for(date).map(|s| s.to_string());
    let is_holiday = holiday_name.is_some();
    if is_holiday {
        raw += cfg.scoring.holiday_bonus;
    }

    // 2) Monthly trend, weighted. The unweighted value is kept on the record.
    let trend_score = trends.score_for(date).unwrap_or(0.0);
    raw += trend_score * cfg.scoring.trend_weight;

    // 3) Active events.
    let mut events = Vec::new();
    for record in index.active_on(date) {
        events.push(EventSummary::for_record(record));
        raw += event_contribution(record, cfg);
    }

    // 4) Weekend effect.
    let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
    if weekend {
        raw += cfg.scoring.weekend_bonus;
    }

    debug!(
        %date,
        raw_score = raw,
        holiday = is_holiday,
        weekend,
        trend = trend_score,
        active_events = events.len(),
        "scored day"
    );

    ScoredDay {
        date,
        is_holiday,
        holiday_name,
        events,
        raw_score: raw,
        trend_score,
    }
}

/// Absolute contribution of one event on one day of its span.
///
/// Attendance is prorated over the span; zero-attendance events use the
/// category default instead. Cruise contributions are damped, multi-day
/// competitions add a lodging term for the extra nights, and national-scale
/// competitions and flagship subjects add span-prorated bonuses.
pub fn event_contribution(record: &EventRecord, cfg: &ScoringConfig) -> f64 {
    let duration = record.span_days().unwrap_or(1).max(1) as f64;
    let attendees = f64::from(record.estimated_attendees);

    let mut score = if record.estimated_attendees > 0 {
        (attendees / duration) / cfg.scoring.attendee_divisor
    } else {
        cfg.category_defaults.for_category(record.category) / duration
    };

    if record.category == EventCategory::Cruise {
        score /= cfg.scoring.cruise_damping;
    }

    if record.category == EventCategory::Competition {
        if duration > 1.0 {
            score += (attendees / cfg.scoring.lodging_divisor) * (duration - 1.0);
        }
        if cfg.markers.is_national(&record.subject)
            || record.estimated_attendees >= cfg.scoring.national_attendee_min
        {
            score += cfg.scoring.national_bonus / duration;
        }
    }

    if cfg.flagship.matches(&record.subject) {
        score += cfg.flagship.bonus / duration;
    }

    score
}

/// Rescale raw scores so the busiest day is 100 and band impact tiers.
/// An all-zero range stays all-zero.
pub fn normalize_days(days: Vec<ScoredDay>, cfg: &ScoringConfig) -> Vec<DailyRecord> {
    let max_raw = days.iter().map(|d| d.raw_score).fold(0.0_f64, f64::max);
    days.into_iter()
        .map(|d| {
            let normalized = if max_raw > 0.0 {
                d.raw_score / max_raw * 100.0
            } else {
                0.0
            };
            DailyRecord {
                date: d.date,
                is_holiday: d.is_holiday,
                holiday_name: d.holiday_name,
                events: d.events,
                raw_score: d.raw_score,
                trend_score: d.trend_score,
                normalized_score: normalized,
                impact_level: cfg.thresholds.tier_for(normalized),
            }
        })
        .collect()
}

/// Score and normalize `[start, end]` in one call.
pub fn aggregate(
    index: &EventIndex,
    holidays: &HolidaySet,
    trends: &MonthlyTrends,
    start: NaiveDate,
    end: NaiveDate,
    cfg: &ScoringConfig,
) -> Result<Vec<DailyRecord>, CalendarError> {
    let days = score_days(index, holidays, trends, start, end, cfg)?;
    Ok(normalize_days(days, cfg))
}
