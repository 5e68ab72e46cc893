//! resolve.rs — Date-expression resolver: turns free-text Japanese date
//! strings (era years, fuzzy period phrases, missing fields) into calendar
//! dates or tagged unresolved markers, plus raw range splitting.
//!
//! Resolution is an ordered rule chain; the first matching rule wins and
//! every outcome is explicit. Nothing here performs I/O.

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

// First Reiwa year is 2019, so era year N maps to 2018 + N.
pub(crate) const ERA_YEAR_OFFSET: i32 = 2018;

static RE_CANONICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("canonical date regex"));
static RE_ERA_REIWA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^令和\s*(\d+)").expect("reiwa era regex"));
static RE_ERA_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^R\s*(\d+)").expect("era letter regex"));
static RE_FUZZY: Lazy<Regex> = Lazy::new(|| Regex::new(r"上旬|中旬|下旬|頃").expect("fuzzy marker regex"));
static RE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})年").expect("year regex"));
static RE_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2})月").expect("month regex"));
static RE_YMD_JP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})年\s*(\d{1,2})月\s*(\d{1,2})日").expect("japanese y-m-d regex")
});
static RE_YMD_SEP: Lazy<Regex> = Lazy::new(|| {
    // Trailing weekday/time annotations are tolerated, trailing digits are not.
    Regex::new(r"^(\d{4})[/.](\d{1,2})[/.](\d{1,2})(?:\D.*)?$").expect("separated y-m-d regex")
});
static RE_YEAR_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})年\s*(\d{1,2})日").expect("year-day regex"));
static RE_MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[月/-](\d{1,2})日?").expect("month-day regex"));

/// Why a date string could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// Year/day pattern without a reference month to borrow from.
    MissingYear,
    /// Fuzzy period phrase without an extractable year and month.
    FuzzyPeriod,
    /// Explicit 未定 ("to be determined").
    Undetermined,
    /// Digits that do not form a real calendar date.
    InvalidDate,
    /// Nothing matched; the text is carried verbatim.
    Unrecognized,
}

impl UnresolvedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingYear => "missing-year",
            Self::FuzzyPeriod => "fuzzy-period",
            Self::Undetermined => "undetermined",
            Self::InvalidDate => "invalid-date",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl std::fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving one date expression. `Fuzzy` is a real, navigable
/// date that was substituted from a period phrase and keeps that tag so
/// downstream output can annotate it. `Unresolved` is never coerced to a
/// date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateOutcome {
    Resolved(NaiveDate),
    Fuzzy(NaiveDate),
    Unresolved {
        original: String,
        reason: UnresolvedReason,
    },
}

impl DateOutcome {
    /// The navigable date, if any.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Resolved(d) | Self::Fuzzy(d) => Some(*d),
            Self::Unresolved { .. } => None,
        }
    }

    pub fn is_fuzzy(&self) -> bool {
        matches!(self, Self::Fuzzy(_))
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::Unresolved { .. })
    }
}

/// Remove the tentative qualifier "(予定)" (either paren width) and report
/// whether anything was removed.
pub fn strip_tentative(text: &str) -> (String, bool) {
    let mut out = text.to_string();
    let mut stripped = false;
    for marker in ["(予定)", "（予定）"] {
        if out.contains(marker) {
            out = out.replace(marker, "");
            stripped = true;
        }
    }
    (out.trim().to_string(), stripped)
}

/// Split raw date-range text into start and optional end expressions.
///
/// Ranges use "～"/"〜" or a bare "-"; a canonical `YYYY-MM-DD` is a single
/// date, never split on its own hyphens. With several separators the
/// outermost segments are the endpoints.
pub fn split_date_range(raw: &str) -> (String, Option<String>) {
    let text = raw.trim();
    if RE_CANONICAL.is_match(text) {
        return (text.to_string(), None);
    }
    if let Some((left, right)) = split_at(text, |c| c == '～' || c == '〜') {
        let right = if right.is_empty() { None } else { Some(right) };
        return (left, right);
    }
    if let Some((left, right)) = split_at(text, |c| c == '-') {
        let right = if right.is_empty() { None } else { Some(right) };
        return (left, right);
    }
    (text.to_string(), None)
}

fn split_at(text: &str, is_sep: impl Fn(char) -> bool) -> Option<(String, String)> {
    let mut seps = text.char_indices().filter(|(_, c)| is_sep(*c));
    let first = seps.next()?;
    let last = seps.last().unwrap_or(first);
    let left = text[..first.0].trim().to_string();
    let right = text[last.0 + last.1.len_utf8()..].trim().to_string();
    Some((left, right))
}

/// Resolve a date expression against the current UTC date. See
/// [`resolve_on`] for the deterministic variant.
pub fn resolve(
    text: &str,
    reference: Option<NaiveDate>,
    era_year_context: Option<i32>,
) -> DateOutcome {
    resolve_on(text, reference, era_year_context, Utc::now().date_naive())
}

/// Resolve a date expression with an explicit `today`, used when a
/// month/day-only date has no era context and the nearest future occurrence
/// must be picked.
///
/// `reference` supplies the month for year/day-only expressions; it is
/// normally the resolved start of the same event.
pub fn resolve_on(
    text: &str,
    reference: Option<NaiveDate>,
    era_year_context: Option<i32>,
    today: NaiveDate,
) -> DateOutcome {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return DateOutcome::Unresolved {
            original: String::new(),
            reason: UnresolvedReason::Unrecognized,
        };
    }

    // Era prefix and tentative qualifier are both no-ops on canonical input,
    // so cleaning first keeps every later rule simple.
    let substituted = substitute_era(trimmed);
    let (clean, _) = strip_tentative(&substituted);
    let s = clean.as_str();

    // 1) Canonical YYYY-MM-DD passes through, parse-validated.
    if RE_CANONICAL.is_match(s) {
        return match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(d) => DateOutcome::Resolved(d),
            Err(_) => DateOutcome::Unresolved {
                original: s.to_string(),
                reason: UnresolvedReason::InvalidDate,
            },
        };
    }

    // 2) Fuzzy period markers: substitute a representative day, keep the tag.
    if RE_FUZZY.is_match(s) {
        let year = RE_YEAR
            .captures(s)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<i32>().ok());
        let month = RE_MONTH
            .captures(s)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok());
        return match (year, month) {
            (Some(y), Some(m)) => {
                let day = fuzzy_day(s);
                match NaiveDate::from_ymd_opt(y, m, day) {
                    Some(d) => DateOutcome::Fuzzy(d),
                    None => DateOutcome::Unresolved {
                        original: format!("{y:04}-{m:02}-{day:02}"),
                        reason: UnresolvedReason::InvalidDate,
                    },
                }
            }
            _ => DateOutcome::Unresolved {
                original: trimmed.to_string(),
                reason: UnresolvedReason::FuzzyPeriod,
            },
        };
    }

    // 3) Explicit "undetermined" stays undetermined; no placeholder dates.
    if s.contains("未定") {
        return DateOutcome::Unresolved {
            original: trimmed.to_string(),
            reason: UnresolvedReason::Undetermined,
        };
    }

    // 4) Full year-month-day, Japanese or slash/dot separated.
    if let Some(c) = RE_YMD_JP.captures(s) {
        if let (Some(y), Some(m), Some(d)) = (cap_i32(&c, 1), cap_u32(&c, 2), cap_u32(&c, 3)) {
            return make_date(y, m, d);
        }
    }
    if let Some(c) = RE_YMD_SEP.captures(s) {
        if let (Some(y), Some(m), Some(d)) = (cap_i32(&c, 1), cap_u32(&c, 2), cap_u32(&c, 3)) {
            return make_date(y, m, d);
        }
    }

    // 5) Year and day with the month omitted: borrow the reference month.
    if let Some(c) = RE_YEAR_DAY.captures(s) {
        if let (Some(y), Some(d)) = (cap_i32(&c, 1), cap_u32(&c, 2)) {
            return match reference {
                Some(r) => make_date(y, r.month(), d),
                None => DateOutcome::Unresolved {
                    original: trimmed.to_string(),
                    reason: UnresolvedReason::MissingYear,
                },
            };
        }
    }

    // 6) Month/day only: era context decides the fiscal year (April start),
    //    otherwise the nearest future occurrence relative to `today`.
    if let Some(c) = RE_MONTH_DAY.captures(s) {
        if let (Some(m), Some(d)) = (cap_u32(&c, 1), cap_u32(&c, 2)) {
            let y = match era_year_context {
                Some(era) => match era_fiscal_year(era, m) {
                    Some(y) => y,
                    None => {
                        return DateOutcome::Unresolved {
                            original: trimmed.to_string(),
                            reason: UnresolvedReason::Unrecognized,
                        }
                    }
                },
                None => {
                    if m < today.month() {
                        today.year() + 1
                    } else {
                        today.year()
                    }
                }
            };
            return make_date(y, m, d);
        }
    }

    DateOutcome::Unresolved {
        original: trimmed.to_string(),
        reason: UnresolvedReason::Unrecognized,
    }
}

/// Convert a leading era-year marker (令和7 / R7) to a western year. Era
/// numbers too large for a calendar year leave the text untouched, so the
/// rule chain tags the expression unrecognized instead.
fn substitute_era(text: &str) -> String {
    let captured = RE_ERA_REIWA
        .captures(text)
        .or_else(|| RE_ERA_LETTER.captures(text));
    if let Some(c) = captured {
        if let (Some(whole), Some(num)) = (c.get(0), c.get(1)) {
            let year = num
                .as_str()
                .parse::<i32>()
                .ok()
                .and_then(|n| ERA_YEAR_OFFSET.checked_add(n));
            if let Some(year) = year {
                return format!("{}{}", year, &text[whole.end()..]);
            }
        }
    }
    text.to_string()
}

/// Calendar year for a month/day expression under era context: era year N
/// covers April through December of `2018 + N`; January through March belong
/// to the following calendar year. `None` when the mapped year would
/// overflow.
fn era_fiscal_year(era: i32, month: u32) -> Option<i32> {
    let base = ERA_YEAR_OFFSET.checked_add(era)?;
    if (4..=12).contains(&month) {
        Some(base)
    } else {
        base.checked_add(1)
    }
}

fn fuzzy_day(text: &str) -> u32 {
    if text.contains("上旬") {
        5
    } else if text.contains("中旬") {
        15
    } else if text.contains("下旬") {
        25
    } else {
        // 頃 and other "around" phrasing lands mid-month.
        15
    }
}

fn make_date(y: i32, m: u32, d: u32) -> DateOutcome {
    match NaiveDate::from_ymd_opt(y, m, d) {
        Some(date) => DateOutcome::Resolved(date),
        None => DateOutcome::Unresolved {
            original: format!("{y:04}-{m:02}-{d:02}"),
            reason: UnresolvedReason::InvalidDate,
        },
    }
}

fn cap_i32(c: &regex::Captures<'_>, i: usize) -> Option<i32> {
    c.get(i).and_then(|m| m.as_str().parse().ok())
}

fn cap_u32(c: &regex::Captures<'_>, i: usize) -> Option<u32> {
    c.get(i).and_then(|m| m.as_str().parse().ok())
}
