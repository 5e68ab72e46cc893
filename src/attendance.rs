//! attendance.rs — Attendance extraction from free-text descriptions.
//!
//! Event descriptions carry figures in several shapes: a labelled
//! "参集人員: ..." summary, year-prefixed figures like "2024: 1,500人", and
//! raw history lines "`<era-year> <count>`" copied from source spreadsheets.
//! The estimate is the maximum across everything recognized; "-" means "no
//! record" and never counts as zero.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::resolve::ERA_YEAR_OFFSET;

static RE_LABELLED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"参集人員:\s*(?:(?:最新|\d{4}):\s*)?([\d,]+)\s*人?").expect("labelled figure regex")
});
static RE_YEAR_FIGURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(最新|\d{4}):\s*([\d,]+)\s*人").expect("year figure regex"));
static RE_HISTORY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})\s+([\d,]+|-)").expect("history line regex"));
static RE_TONNAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([\d,]+)t").expect("tonnage regex"));

// Rough passenger-space ratio for cruise ships.
const TONNAGE_PER_PASSENGER: u32 = 35;

// Known venues and their usual hall capacity; unknown venues estimate 0.
const VENUE_CAPACITY: &[(&str, u32)] = &[
    ("コーチャンフォー釧路文化ホール", 1500),
    ("釧路市民文化会館", 1500),
    ("北海道立釧路芸術館", 100),
];

/// Best attendance estimate found in `description`, 0 when nothing usable
/// is present.
pub fn extract(description: &str) -> u32 {
    let mut best = 0u32;
    for caps in RE_LABELLED.captures_iter(description) {
        if let Some(n) = caps.get(1).map(|m| m.as_str()).and_then(parse_count) {
            best = best.max(n);
        }
    }
    for caps in RE_YEAR_FIGURE.captures_iter(description) {
        if let Some(n) = caps.get(2).map(|m| m.as_str()).and_then(parse_count) {
            best = best.max(n);
        }
    }
    for line in description.lines() {
        if let Some(n) = history_line(line) {
            best = best.max(n.1);
        }
    }
    best
}

/// All per-year figures in `description` as `(western year, count)` pairs,
/// in the order they appear. Era-year history lines are converted; the
/// unlabelled "最新" figure has no year and is not included.
pub fn attendance_figures(description: &str) -> Vec<(i32, u32)> {
    let mut figures = Vec::new();
    for caps in RE_YEAR_FIGURE.captures_iter(description) {
        let year = caps.get(1).and_then(|m| m.as_str().parse::<i32>().ok());
        let count = caps.get(2).map(|m| m.as_str()).and_then(parse_count);
        if let (Some(year), Some(count)) = (year, count) {
            figures.push((year, count));
        }
    }
    for line in description.lines() {
        if let Some(pair) = history_line(line) {
            figures.push(pair);
        }
    }
    figures
}

/// Passenger estimate from ship info carrying a gross tonnage like
/// "(115,875t)".
pub fn estimate_cruise_attendees(ship_info: &str) -> u32 {
    let tonnage = RE_TONNAGE
        .captures(ship_info)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .and_then(parse_count);
    match tonnage {
        Some(t) => t / TONNAGE_PER_PASSENGER,
        None => 0,
    }
}

/// Capacity estimate from the venue name, 0 for unknown venues.
pub fn estimate_concert_attendees(venue: &str) -> u32 {
    for (name, capacity) in VENUE_CAPACITY {
        if venue.contains(name) {
            return *capacity;
        }
    }
    0
}

fn history_line(line: &str) -> Option<(i32, u32)> {
    let caps = RE_HISTORY_LINE.captures(line.trim())?;
    let era = caps.get(1).and_then(|m| m.as_str().parse::<i32>().ok())?;
    let raw = caps.get(2).map(|m| m.as_str())?;
    if raw == "-" {
        return None;
    }
    let count = parse_count(raw)?;
    Some((ERA_YEAR_OFFSET + era, count))
}

fn parse_count(raw: &str) -> Option<u32> {
    match raw.replace(',', "").parse::<u32>() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(figure = %raw, "ignoring unparsable attendance figure");
            None
        }
    }
}
