//! holidays.rs — National holiday lookup.
//!
//! Backed by the pre-fetched holiday CSV (date, name per row, header line
//! first). The loader expects UTF-8; transcoding legacy encodings happens
//! before the file reaches us. Rows whose date does not parse are skipped
//! with a warning, never fatal.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct HolidaySet {
    map: BTreeMap<NaiveDate, String>,
}

impl HolidaySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (NaiveDate, String)>) -> Self {
        Self {
            map: pairs.into_iter().collect(),
        }
    }

    /// Read a holiday CSV with a header row; column 0 is the date
    /// (`YYYY/MM/DD` or `YYYY-MM-DD`), column 1 the holiday name.
    pub fn from_csv_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut map = BTreeMap::new();
        for (i, row) in rdr.records().enumerate() {
            let row = row.context("reading holiday CSV row")?;
            let raw_date = row.get(0).unwrap_or("").trim();
            let name = row.get(1).unwrap_or("").trim();
            match parse_holiday_date(raw_date) {
                Some(date) => {
                    map.insert(date, name.to_string());
                }
                // Header is line 1, so data row i sits on line i + 2.
                None => warn!(line = i + 2, value = %raw_date, "skipping unparsable holiday row"),
            }
        }
        Ok(Self { map })
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("opening holiday CSV {}", path.display()))?;
        Self::from_csv_reader(file)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.map.contains_key(&date)
    }

    pub fn name_for(&self, date: NaiveDate) -> Option<&str> {
        self.map.get(&date).map(|s| s.as_str())
    }

    /// Holidays inside `[start, end]`, chronological.
    pub fn in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, &str)> {
        self.map
            .range(start..=end)
            .map(|(d, n)| (*d, n.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

fn parse_holiday_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}
