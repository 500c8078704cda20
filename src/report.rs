use crate::aggregate::Aggregator;
use crate::cli::CommonArgs;
use crate::columns;
use crate::config::ReportConfig;
use crate::emit::{emit, emit_ndjson, print_summary};
use crate::error::{KpiError, Result};
use crate::git::{GitRepo, VersionSource};
use crate::model::{AggregateResult, AggregateStats, CommitVersion, DateRange};
use crate::table;
use crate::util::report_file_name;
use anyhow::Context;
use chrono::Utc;
use console::style;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct ReportRun {
    pub result: AggregateResult,
    pub stats: AggregateStats,
}

pub struct ReportArgs {
    pub file: String,
    pub config: ReportConfig,
    pub out_dir: PathBuf,
    pub json: bool,
    pub ndjson: bool,
}

pub fn exec(common: CommonArgs, args: ReportArgs) -> anyhow::Result<()> {
    let repo = GitRepo::open(common.repo.as_ref()).context("Failed to open git repository")?;

    let range = repo
        .resolve_range(common.since.as_deref(), common.until.as_deref())
        .context("Failed to resolve date range")?;

    let run = build_report(&repo, &args.file, &range, common.max_commits, &args.config)
        .context("Failed to build report")?;

    if args.json {
        emit(&run.result, io::stdout().lock())?;
    } else if args.ndjson {
        emit_ndjson(&run.result, io::stdout().lock())?;
    } else {
        println!("Number of commits: {}", run.stats.commits + run.stats.commits_skipped);
        print_summary(&run.result, &run.stats);
        let path = write_report(&run.result, &args.out_dir)?;
        println!("\nResults written to {}", style(path.display()).cyan());
    }

    Ok(())
}

/// Fetch the versions of `file` from `source` and aggregate them.
pub fn build_report<S: VersionSource + ?Sized>(
    source: &S,
    file: &str,
    range: &DateRange,
    limit: usize,
    config: &ReportConfig,
) -> Result<ReportRun> {
    let versions = source.versions(file, range, limit)?;
    info!(file, versions = versions.len(), "Collected file versions");
    run(&versions, config)
}

/// Parse, resolve and fold every version. Unreadable versions are skipped;
/// a configured column missing from a readable version aborts the run.
pub fn run(versions: &[CommitVersion], config: &ReportConfig) -> Result<ReportRun> {
    let mut aggregator = Aggregator::new();

    for version in versions {
        let table = match table::parse(&version.content) {
            Ok(table) if table.header.is_empty() => {
                warn!(commit = %version.commit_id, "Skipping version without a header row");
                aggregator.skip_commit();
                continue;
            }
            Ok(table) => table,
            Err(err) => {
                warn!(commit = %version.commit_id, error = %err, "Skipping unreadable version");
                aggregator.skip_commit();
                continue;
            }
        };

        let columns = columns::resolve(&table.header, &config.date_column, config.kpi_column())
            .inspect_err(|err| {
                error!(commit = %version.commit_id, error = %err, "Cannot resolve configured columns");
            })?;

        aggregator.fold_table(&version.commit_id, &table, columns);
    }

    let stats = aggregator.stats();
    info!(
        commits = stats.commits,
        commits_skipped = stats.commits_skipped,
        rows = stats.rows_folded,
        rows_skipped = stats.rows_skipped,
        kpi_parse_failures = stats.kpi_parse_failures,
        "Aggregation finished"
    );

    Ok(ReportRun {
        result: aggregator.finish(),
        stats,
    })
}

/// Create `out_dir` if needed and write a timestamped report into it.
pub fn write_report(result: &AggregateResult, out_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(report_file_name(&Utc::now()));
    let file = File::create(&path)
        .map_err(|e| KpiError::Io(io::Error::new(e.kind(), format!("{}: {e}", path.display()))))?;
    emit(result, BufWriter::new(file))?;
    info!(path = %path.display(), "Report written");
    Ok(path)
}
