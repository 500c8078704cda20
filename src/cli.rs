use crate::config::ReportConfig;
use crate::report::ReportArgs;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kpi-history")]
#[command(about = "Row counts and KPI sums across the git history of a CSV file")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Path to git repository")]
    pub repo: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "START_DATE",
        help = "Start from this commit or date (RFC3339, YYYY-MM-DD, or relative like 90d)"
    )]
    pub since: Option<String>,

    #[arg(
        long,
        global = true,
        help = "End at this commit or date (RFC3339, YYYY-MM-DD, or relative like 90d)"
    )]
    pub until: Option<String>,

    #[arg(long, global = true, default_value_t = 100, help = "Maximum number of commits to read")]
    pub max_commits: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate row counts and KPI sums by report date and commit
    Report {
        #[arg(env = "TRACKED_FILE", help = "Path of the CSV file inside the repository")]
        file: String,

        #[arg(long, env = "DATE_COLUMN", help = "Header name of the report date column")]
        date_column: String,

        #[arg(long, env = "KPI_COLUMN", help = "Header name of the KPI column (omit to count rows only)")]
        kpi_column: Option<String>,

        #[arg(long, default_value = "dist", help = "Directory for the timestamped report file")]
        out_dir: PathBuf,

        #[arg(long, help = "Print the report as JSON instead of writing a file")]
        json: bool,

        #[arg(long, conflicts_with = "json", help = "Print the report as NDJSON instead of writing a file")]
        ndjson: bool,
    },
    /// List the commits whose version of the file would be aggregated
    Versions {
        #[arg(env = "TRACKED_FILE", help = "Path of the CSV file inside the repository")]
        file: String,

        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Report {
                file,
                date_column,
                kpi_column,
                out_dir,
                json,
                ndjson,
            } => {
                let config = ReportConfig::new(date_column, kpi_column)?;
                crate::report::exec(
                    self.common,
                    ReportArgs {
                        file,
                        config,
                        out_dir,
                        json,
                        ndjson,
                    },
                )
            }
            Commands::Versions { file, json } => crate::versions::exec(self.common, file, json),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn report_args_parse() {
        let cli = Cli::try_parse_from([
            "kpi-history",
            "--since",
            "2024-01-01",
            "report",
            "data/kpi.csv",
            "--date-column",
            "date",
            "--kpi-column",
            "amount",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.common.since.as_deref(), Some("2024-01-01"));
        assert_eq!(cli.common.max_commits, 100);
        match cli.command {
            Commands::Report { file, date_column, kpi_column, json, .. } => {
                assert_eq!(file, "data/kpi.csv");
                assert_eq!(date_column, "date");
                assert_eq!(kpi_column.as_deref(), Some("amount"));
                assert!(json);
            }
            Commands::Versions { .. } => panic!("expected report"),
        }
    }

    #[test]
    fn json_and_ndjson_conflict() {
        let parsed = Cli::try_parse_from([
            "kpi-history",
            "report",
            "kpi.csv",
            "--date-column",
            "date",
            "--json",
            "--ndjson",
        ]);
        assert!(parsed.is_err());
    }
}
