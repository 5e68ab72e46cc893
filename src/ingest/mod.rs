//! ingest — Turns raw collector rows into normalized event records.
//!
//! Per row: split the raw date-range text, resolve both ends, pull an
//! attendance estimate out of the description (with category-specific
//! fallbacks), and annotate provisional or fuzzy dates. Rows in excluded
//! areas are dropped here; rows with unresolved dates are kept and routed
//! to pending later, when the index is built.

pub mod types;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::attendance;
use crate::config::ScoringConfig;
use crate::records::{EventCategory, EventRecord};
use crate::resolve::{resolve_on, split_date_range, strip_tentative};
use types::RawEventRow;

const TENTATIVE_NOTE: &str = "(日程は予定)";
const FUZZY_NOTE: &str = "※仮日付（上旬=5日、中旬=15日、下旬=25日で設定）";

/// Read the combined events CSV (header row with the collectors' column
/// names).
pub fn read_events_csv<R: Read>(reader: R) -> anyhow::Result<Vec<RawEventRow>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        let row: RawEventRow = row.context("parsing event CSV row")?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn read_events_csv_file(path: impl AsRef<Path>) -> anyhow::Result<Vec<RawEventRow>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("opening events CSV {}", path.display()))?;
    read_events_csv(file)
}

/// Normalize rows against the current UTC date. Returns the records plus
/// the number of rows dropped by the excluded-area filter.
pub fn normalize_rows(
    rows: Vec<RawEventRow>,
    era_year_context: Option<i32>,
    cfg: &ScoringConfig,
) -> (Vec<EventRecord>, usize) {
    normalize_rows_at(rows, era_year_context, cfg, Utc::now().date_naive())
}

/// Deterministic variant of [`normalize_rows`] with an explicit `today`,
/// which anchors month/day-only dates when no era context is given.
pub fn normalize_rows_at(
    rows: Vec<RawEventRow>,
    era_year_context: Option<i32>,
    cfg: &ScoringConfig,
    today: NaiveDate,
) -> (Vec<EventRecord>, usize) {
    let mut records = Vec::with_capacity(rows.len());
    let mut excluded = 0usize;
    for row in rows {
        if cfg.markers.is_excluded_location(&row.location) {
            debug!(
                subject = %row.subject,
                location = %row.location,
                "dropping event in excluded area"
            );
            excluded += 1;
            continue;
        }
        records.push(normalize_row(row, era_year_context, today));
    }
    (records, excluded)
}

fn normalize_row(row: RawEventRow, era_year_context: Option<i32>, today: NaiveDate) -> EventRecord {
    let (subject, tentative_subject) = strip_tentative(&row.subject);
    let category = EventCategory::parse(&row.event_type);

    let (start_text, end_text) = split_date_range(&row.date_text);
    let (start_text, tentative_start) = strip_tentative(&start_text);
    let start_date = resolve_on(&start_text, None, era_year_context, today);

    // A missing end means a single-day event; an unresolvable end stays
    // tagged and sends the record to pending.
    let (end_date, tentative_end) = match end_text {
        Some(raw_end) => {
            let (end_clean, tentative) = strip_tentative(&raw_end);
            let end = resolve_on(&end_clean, start_date.date(), era_year_context, today);
            (end, tentative)
        }
        None => (start_date.clone(), false),
    };

    let mut attendees = attendance::extract(&row.description);
    if attendees == 0 {
        // Cruise descriptions carry tonnage, concert locations the venue.
        attendees = match category {
            EventCategory::Cruise => attendance::estimate_cruise_attendees(&row.description),
            EventCategory::Concert => attendance::estimate_concert_attendees(&row.location),
            _ => 0,
        };
    }

    let tentative = tentative_subject || tentative_start || tentative_end;
    let fuzzy = start_date.is_fuzzy() || end_date.is_fuzzy();
    let mut description_parts: Vec<&str> = Vec::new();
    let trimmed_description = row.description.trim();
    if !trimmed_description.is_empty() {
        description_parts.push(trimmed_description);
    }
    if tentative {
        description_parts.push(TENTATIVE_NOTE);
    }
    if fuzzy {
        description_parts.push(FUZZY_NOTE);
    }

    EventRecord {
        category,
        subject,
        start_date,
        end_date,
        estimated_attendees: attendees,
        location: row.location.trim().to_string(),
        description: description_parts.join("\n"),
        organizer: row.organizer.trim().to_string(),
        contact: row.contact.trim().to_string(),
        date_text: row.date_text.trim().to_string(),
        source: row.source.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::DateOutcome;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn row(event_type: &str, subject: &str, date_text: &str) -> RawEventRow {
        RawEventRow {
            event_type: event_type.to_string(),
            subject: subject.to_string(),
            date_text: date_text.to_string(),
            location: "釧路市内".to_string(),
            description: String::new(),
            organizer: String::new(),
            contact: String::new(),
            source: "test".to_string(),
        }
    }

    fn normalize_one(r: RawEventRow, era: Option<i32>) -> EventRecord {
        let (mut records, excluded) =
            normalize_rows_at(vec![r], era, &ScoringConfig::default_seed(), date(2025, 3, 1));
        assert_eq!(excluded, 0);
        records.remove(0)
    }

    #[test]
    fn csv_headers_map_to_row_fields() {
        let csv = "\
EventType,Subject,DateText,Location,Description,Organizer,Contact,DataSource
大会,全国スポーツ大会,2025-08-01～2025-08-03,釧路アイスアリーナ,参集人員: 1200人,〇〇連盟,0154-00-0000,pdf
";
        let rows = read_events_csv(csv.as_bytes()).expect("valid CSV");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].event_type, "大会");
        assert_eq!(rows[0].subject, "全国スポーツ大会");
        assert_eq!(rows[0].description, "参集人員: 1200人");
        assert_eq!(rows[0].source, "pdf");
    }

    #[test]
    fn range_rows_resolve_both_ends() {
        let record = normalize_one(row("大会", "全国大会", "9/20-9/21"), Some(7));
        assert_eq!(record.category, EventCategory::Competition);
        assert_eq!(record.start_date, DateOutcome::Resolved(date(2025, 9, 20)));
        assert_eq!(record.end_date, DateOutcome::Resolved(date(2025, 9, 21)));
        assert_eq!(record.span_days(), Some(2));
    }

    #[test]
    fn missing_end_means_single_day() {
        let record = normalize_one(row("イベント", "花火大会", "2025-08-01"), None);
        assert_eq!(record.start_date, DateOutcome::Resolved(date(2025, 8, 1)));
        assert_eq!(record.end_date, record.start_date);
    }

    #[test]
    fn unresolvable_end_stays_tagged() {
        // A bare day number has no month rule; the record keeps its tag and
        // is routed to pending when the index is built.
        let record = normalize_one(row("イベント", "港まつり", "2025年9月20日～21日"), None);
        assert_eq!(record.start_date, DateOutcome::Resolved(date(2025, 9, 20)));
        assert!(record.end_date.is_unresolved());
        assert_eq!(record.resolved_span(), None);
    }

    #[test]
    fn attendance_is_extracted_from_description() {
        let mut r = row("大会", "地区大会", "2025-08-01");
        r.description = "参集人員: 2023: 1,200人, 2024: 1,500人".to_string();
        let record = normalize_one(r, None);
        assert_eq!(record.estimated_attendees, 1_500);
    }

    #[test]
    fn cruise_attendance_falls_back_to_tonnage() {
        let mut r = row("クルーズ", "にっぽん丸入港", "2025-08-01");
        r.description = "トン数: 22,472t\n前港: 横浜".to_string();
        let record = normalize_one(r, None);
        assert_eq!(record.category, EventCategory::Cruise);
        assert_eq!(record.estimated_attendees, 642);
    }

    #[test]
    fn concert_attendance_falls_back_to_venue() {
        let mut r = row("コンサート", "夏のコンサート", "2025/9/20(土)");
        r.location = "釧路市民文化会館 大ホール".to_string();
        let record = normalize_one(r, None);
        assert_eq!(record.estimated_attendees, 1_500);
        assert_eq!(record.start_date, DateOutcome::Resolved(date(2025, 9, 20)));
    }

    #[test]
    fn tentative_subject_and_date_are_annotated() {
        let record = normalize_one(row("イベント", "霧のまつり(予定)", "2025年8月1日(予定)"), None);
        assert_eq!(record.subject, "霧のまつり");
        assert_eq!(record.start_date, DateOutcome::Resolved(date(2025, 8, 1)));
        assert!(record.description.contains(TENTATIVE_NOTE));
    }

    #[test]
    fn fuzzy_dates_are_annotated() {
        let mut r = row("イベント", "秋のイベント", "2025年9月下旬");
        r.description = "会場: 釧路市内".to_string();
        let record = normalize_one(r, None);
        assert_eq!(record.start_date, DateOutcome::Fuzzy(date(2025, 9, 25)));
        assert!(record.end_date.is_fuzzy());
        assert!(record.description.starts_with("会場: 釧路市内\n"));
        assert!(record.description.contains(FUZZY_NOTE));
    }

    #[test]
    fn excluded_locations_are_dropped_and_counted() {
        let mut keep = row("イベント", "市内イベント", "2025-08-01");
        keep.location = "釧路市観光国際交流センター".to_string();
        let mut drop = row("イベント", "湖畔イベント", "2025-08-01");
        drop.location = "阿寒湖温泉街".to_string();
        let (records, excluded) = normalize_rows_at(
            vec![keep, drop],
            None,
            &ScoringConfig::default_seed(),
            date(2025, 3, 1),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(excluded, 1);
        assert_eq!(records[0].subject, "市内イベント");
    }
}
