//! trends.rs — Monthly tourism trend scores.
//!
//! Scores are keyed `"YYYY-MM"` and already normalized to a 0-100 scale
//! where the busiest month is 100. They can be loaded from the processed
//! JSON file or rebuilt from raw counter text. Loaded scores are hardened
//! into the 0-100 band so the scoring math never sees a negative or
//! non-finite trend.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static RE_MONTH_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})月:\s*([\d,]+)").expect("month count regex"));

/// Month-granular trend lookup for the scoring pass.
#[derive(Debug, Clone, Default)]
pub struct MonthlyTrends {
    scores: BTreeMap<String, f64>,
}

impl MonthlyTrends {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(scores: BTreeMap<String, f64>) -> Self {
        Self { scores }
    }

    /// Parse the processed trends JSON object (`"YYYY-MM"` -> score).
    ///
    /// Out-of-band scores are clamped into 0-100 and non-finite scores are
    /// dropped, each with a warning.
    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let mut scores: BTreeMap<String, f64> =
            serde_json::from_str(raw).context("parsing monthly trends JSON")?;
        scores.retain(|month, score| {
            if !score.is_finite() {
                warn!(%month, value = *score, "dropping non-finite trend score");
                return false;
            }
            if *score < 0.0 || *score > 100.0 {
                warn!(%month, value = *score, "clamping out-of-band trend score");
                *score = score.clamp(0.0, 100.0);
            }
            true
        });
        Ok(Self { scores })
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading trends file {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    /// Build from raw counter text with "N月: 123,456" lines.
    ///
    /// Counts are normalized so the busiest month scores 100 (all-zero input
    /// scores 0 everywhere). Repeated months keep the last figure.
    /// `fiscal_base_year` is the calendar year containing April; months
    /// January-March are keyed into the following year.
    pub fn from_raw_counts(raw: &str, fiscal_base_year: i32) -> Self {
        let mut by_month: BTreeMap<u32, u64> = BTreeMap::new();
        for caps in RE_MONTH_COUNT.captures_iter(raw) {
            let month = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
            let count = caps
                .get(2)
                .and_then(|m| m.as_str().replace(',', "").parse::<u64>().ok());
            if let (Some(month), Some(count)) = (month, count) {
                if (1..=12).contains(&month) {
                    by_month.insert(month, count);
                } else {
                    warn!(month, "skipping out-of-range month in trend data");
                }
            }
        }

        let max = by_month.values().copied().max().unwrap_or(0);
        let mut scores = BTreeMap::new();
        for (month, count) in by_month {
            let score = if max > 0 {
                count as f64 / max as f64 * 100.0
            } else {
                0.0
            };
            let year = if month >= 4 {
                fiscal_base_year
            } else {
                fiscal_base_year + 1
            };
            scores.insert(format!("{year}-{month:02}"), score);
        }
        Self { scores }
    }

    /// Trend score for the month containing `date`, if known.
    pub fn score_for(&self, date: NaiveDate) -> Option<f64> {
        self.scores.get(&month_key(date)).copied()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.scores.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}
