use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SCHEMA_VERSION: u32 = 1;

/// One historical version of the tracked file.
#[derive(Debug, Clone)]
pub struct CommitVersion {
    pub commit_id: String,
    pub timestamp: DateTime<Utc>,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ParsedTable {
    /// True when there are no data rows, whether or not a header was read.
    pub fn has_no_rows(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Positions of the date and KPI columns inside one table's header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub date: usize,
    pub kpi: Option<usize>,
}

impl ColumnIndex {
    /// Minimum number of fields a row needs to contribute.
    pub fn min_fields(&self) -> usize {
        self.kpi.map_or(self.date, |kpi| kpi.max(self.date)) + 1
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub count: u64,
    pub kpi_sum: f64,
}

impl Totals {
    pub fn add_row(&mut self, kpi: f64) {
        self.count += 1;
        self.kpi_sum += kpi;
    }

    pub fn merge(&mut self, other: &Totals) {
        self.count += other.count;
        self.kpi_sum += other.kpi_sum;
    }
}

/// Date → commit → totals. Keys are kept sorted so serialization is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateResult(BTreeMap<String, BTreeMap<String, Totals>>);

impl AggregateResult {
    pub(crate) fn from_map(map: BTreeMap<String, BTreeMap<String, Totals>>) -> Self {
        Self(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, date: &str, commit_id: &str) -> Option<&Totals> {
        self.0.get(date).and_then(|commits| commits.get(commit_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, Totals>)> {
        self.0.iter()
    }

    /// Flattened `(date, commit, totals)` view in key order.
    pub fn leaves(&self) -> impl Iterator<Item = (&str, &str, &Totals)> {
        self.0.iter().flat_map(|(date, commits)| {
            commits
                .iter()
                .map(move |(commit, totals)| (date.as_str(), commit.as_str(), totals))
        })
    }
}

/// Counters describing what the aggregator kept and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub commits: u64,
    pub commits_skipped: u64,
    pub rows_folded: u64,
    pub rows_skipped: u64,
    pub kpi_parse_failures: u64,
}

impl AggregateStats {
    pub fn merge(&mut self, other: &AggregateStats) {
        self.commits += other.commits;
        self.commits_skipped += other.commits_skipped;
        self.rows_folded += other.rows_folded;
        self.rows_skipped += other.rows_skipped;
        self.kpi_parse_failures += other.kpi_parse_failures;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NdjsonLeaf<'a> {
    pub date: &'a str,
    pub commit: &'a str,
    pub count: u64,
    #[serde(rename = "kpiSum")]
    pub kpi_sum: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionEntry {
    pub commit_id: String,
    pub timestamp: DateTime<Utc>,
    pub size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionsOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub file: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub entries: Vec<VersionEntry>,
}

#[derive(Debug, Clone)]
pub struct DateRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new() -> Self {
        Self { since: None, until: None }
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        if let Some(since) = self.since {
            if timestamp < &since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if timestamp > &until {
                return false;
            }
        }
        true
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::new()
    }
}
