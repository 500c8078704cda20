pub mod aggregate;
pub mod cli;
pub mod columns;
pub mod config;
pub mod emit;
pub mod error;
pub mod git;
pub mod model;
pub mod report;
pub mod table;
pub mod util;
pub mod versions;

pub use aggregate::{aggregate, Aggregator, RowIssue};
pub use columns::resolve;
pub use config::ReportConfig;
pub use emit::emit;
pub use error::{KpiError, Result};
pub use model::{AggregateResult, ColumnIndex, CommitVersion, ParsedTable, Totals};
pub use table::parse;
