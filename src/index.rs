//! index.rs — Day-keyed event index.
//!
//! Building the index is also the routing point: records whose dates never
//! resolved, or whose span is inverted, go to the pending list instead of
//! the calendar. Everything indexed is guaranteed navigable.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::records::{EventRecord, PendingEvent};

#[derive(Debug, Default)]
pub struct EventIndex {
    records: Vec<EventRecord>,
    by_day: BTreeMap<NaiveDate, Vec<usize>>,
}

impl EventIndex {
    /// Partition records into the index and the pending-review list.
    ///
    /// Indexed events cover every day of their inclusive span. Within one
    /// day, events keep the order they arrived in.
    pub fn build(records: Vec<EventRecord>) -> (Self, Vec<PendingEvent>) {
        let mut index = Self::default();
        let mut pending = Vec::new();

        for record in records {
            match record.resolved_span() {
                Some((start, end)) if end < start => {
                    warn!(
                        subject = %record.subject,
                        %start,
                        %end,
                        "inverted event span, routing to pending"
                    );
                    pending.push(PendingEvent::from_record(&record));
                }
                Some((start, end)) => {
                    let idx = index.records.len();
                    let mut day = start;
                    loop {
                        index.by_day.entry(day).or_default().push(idx);
                        match day.succ_opt() {
                            Some(next) if next <= end => day = next,
                            _ => break,
                        }
                    }
                    index.records.push(record);
                }
                None => {
                    debug!(
                        subject = %record.subject,
                        date_text = %record.date_text,
                        "unresolved dates, routing to pending"
                    );
                    pending.push(PendingEvent::from_record(&record));
                }
            }
        }

        (index, pending)
    }

    /// Events active on `day`, in arrival order.
    pub fn active_on(&self, day: NaiveDate) -> Vec<&EventRecord> {
        match self.by_day.get(&day) {
            Some(ids) => ids.iter().map(|&i| &self.records[i]).collect(),
            None => Vec::new(),
        }
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::EventCategory;
    use crate::resolve::{DateOutcome, UnresolvedReason};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn record(subject: &str, start: DateOutcome, end: DateOutcome) -> EventRecord {
        EventRecord {
            category: EventCategory::Festival,
            subject: subject.to_string(),
            start_date: start,
            end_date: end,
            estimated_attendees: 0,
            location: "釧路市内".to_string(),
            description: String::new(),
            organizer: String::new(),
            contact: String::new(),
            date_text: "8月上旬".to_string(),
            source: "test".to_string(),
        }
    }

    #[test]
    fn multi_day_event_is_active_on_every_span_day() {
        let r = record(
            "港まつり",
            DateOutcome::Resolved(date(2025, 8, 1)),
            DateOutcome::Resolved(date(2025, 8, 3)),
        );
        let (index, pending) = EventIndex::build(vec![r]);
        assert!(pending.is_empty());
        assert_eq!(index.len(), 1);
        assert_eq!(index.active_on(date(2025, 7, 31)).len(), 0);
        assert_eq!(index.active_on(date(2025, 8, 1)).len(), 1);
        assert_eq!(index.active_on(date(2025, 8, 2)).len(), 1);
        assert_eq!(index.active_on(date(2025, 8, 3)).len(), 1);
        assert_eq!(index.active_on(date(2025, 8, 4)).len(), 0);
    }

    #[test]
    fn unresolved_record_goes_to_pending() {
        let r = record(
            "日程未定の大会",
            DateOutcome::Unresolved {
                original: "未定".to_string(),
                reason: UnresolvedReason::Undetermined,
            },
            DateOutcome::Unresolved {
                original: "未定".to_string(),
                reason: UnresolvedReason::Undetermined,
            },
        );
        let (index, pending) = EventIndex::build(vec![r]);
        assert!(index.is_empty());
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].subject, "日程未定の大会");
        assert_eq!(pending[0].original_date, "8月上旬");
    }

    #[test]
    fn inverted_span_goes_to_pending() {
        let r = record(
            "逆転イベント",
            DateOutcome::Resolved(date(2025, 8, 3)),
            DateOutcome::Resolved(date(2025, 8, 1)),
        );
        let (index, pending) = EventIndex::build(vec![r]);
        assert!(index.is_empty());
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn fuzzy_dates_are_navigable() {
        let r = record(
            "霧のイベント",
            DateOutcome::Fuzzy(date(2025, 9, 25)),
            DateOutcome::Fuzzy(date(2025, 9, 25)),
        );
        let (index, pending) = EventIndex::build(vec![r]);
        assert!(pending.is_empty());
        assert_eq!(index.active_on(date(2025, 9, 25)).len(), 1);
    }

    #[test]
    fn same_day_events_keep_arrival_order() {
        let a = record(
            "朝のイベント",
            DateOutcome::Resolved(date(2025, 8, 1)),
            DateOutcome::Resolved(date(2025, 8, 1)),
        );
        let b = record(
            "夜のイベント",
            DateOutcome::Resolved(date(2025, 8, 1)),
            DateOutcome::Resolved(date(2025, 8, 1)),
        );
        let (index, _) = EventIndex::build(vec![a, b]);
        let active = index.active_on(date(2025, 8, 1));
        assert_eq!(active[0].subject, "朝のイベント");
        assert_eq!(active[1].subject, "夜のイベント");
    }
}
