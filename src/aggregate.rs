use crate::model::{AggregateResult, AggregateStats, ColumnIndex, ParsedTable, Totals};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, warn};

/// A row-level problem that does not stop aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum RowIssue {
    /// The row lacks the date or KPI field and was skipped.
    TooShort { fields: usize, needed: usize },
    /// The KPI field is not a finite number; the row counted with a zero KPI.
    KpiParse { value: String },
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowIssue::TooShort { fields, needed } => {
                write!(f, "row has {fields} fields, needs {needed}")
            }
            RowIssue::KpiParse { value } => write!(f, "KPI value {value:?} is not a number"),
        }
    }
}

/// Folds parsed file versions into per (date, commit) totals.
///
/// Accumulators live in one flat map keyed by `(date, commit)`; [`finish`]
/// regroups them into the nested [`AggregateResult`].
///
/// [`finish`]: Aggregator::finish
#[derive(Debug, Default)]
pub struct Aggregator {
    accumulators: HashMap<(String, String), Totals>,
    stats: AggregateStats,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> AggregateStats {
        self.stats
    }

    /// Note a commit whose content never reached the aggregator.
    pub fn skip_commit(&mut self) {
        self.stats.commits_skipped += 1;
    }

    /// Fold every data row of one table. Rows are never fatal: problems are
    /// logged, counted in [`stats`](Aggregator::stats) and returned together
    /// with their 1-based data row index.
    pub fn fold_table(
        &mut self,
        commit_id: &str,
        table: &ParsedTable,
        columns: ColumnIndex,
    ) -> Vec<(usize, RowIssue)> {
        self.stats.commits += 1;
        let mut issues = Vec::new();

        for (i, fields) in table.rows.iter().enumerate() {
            // 1-based data row, header excluded
            let row = i + 1;
            match self.fold_row(commit_id, fields, columns) {
                None => {}
                Some(issue @ RowIssue::TooShort { .. }) => {
                    warn!(commit = %commit_id, row, %issue, "Skipping short row");
                    issues.push((row, issue));
                }
                Some(issue @ RowIssue::KpiParse { .. }) => {
                    warn!(commit = %commit_id, row, %issue, "Counting row with zero KPI");
                    issues.push((row, issue));
                }
            }
        }

        debug!(
            commit = %commit_id,
            rows = table.rows.len(),
            issues = issues.len(),
            "Folded table"
        );
        issues
    }

    fn fold_row(&mut self, commit_id: &str, row: &[String], columns: ColumnIndex) -> Option<RowIssue> {
        let needed = columns.min_fields();
        if row.len() < needed {
            self.stats.rows_skipped += 1;
            return Some(RowIssue::TooShort { fields: row.len(), needed });
        }

        let (kpi, issue) = match columns.kpi {
            Some(idx) => match parse_kpi(&row[idx]) {
                Some(value) => (value, None),
                None => {
                    self.stats.kpi_parse_failures += 1;
                    (0.0, Some(RowIssue::KpiParse { value: row[idx].clone() }))
                }
            },
            None => (0.0, None),
        };

        let key = (row[columns.date].clone(), commit_id.to_string());
        self.accumulators.entry(key).or_default().add_row(kpi);
        self.stats.rows_folded += 1;
        issue
    }

    /// Combine a partial aggregation into this one by summing per key.
    pub fn merge(&mut self, other: Aggregator) {
        for (key, totals) in other.accumulators {
            self.accumulators.entry(key).or_default().merge(&totals);
        }
        self.stats.merge(&other.stats);
    }

    pub fn finish(self) -> AggregateResult {
        let mut nested: BTreeMap<String, BTreeMap<String, Totals>> = BTreeMap::new();
        for ((date, commit_id), totals) in self.accumulators {
            nested.entry(date).or_default().insert(commit_id, totals);
        }
        AggregateResult::from_map(nested)
    }
}

/// Aggregate already parsed tables that share one column layout.
pub fn aggregate<S: AsRef<str>>(commits: &[(S, ParsedTable)], columns: ColumnIndex) -> AggregateResult {
    let mut aggregator = Aggregator::new();
    for (commit_id, table) in commits {
        aggregator.fold_table(commit_id.as_ref(), table, columns);
    }
    aggregator.finish()
}

fn parse_kpi(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
