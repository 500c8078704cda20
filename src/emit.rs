use crate::error::{KpiError, Result};
use crate::model::{AggregateResult, AggregateStats, NdjsonLeaf};
use console::style;
use std::io::Write;

/// Write the aggregate as pretty JSON: `{date: {commit: {count, kpiSum}}}`.
pub fn emit<W: Write>(result: &AggregateResult, mut sink: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut sink, result).map_err(KpiError::from_json)?;
    sink.write_all(b"\n")?;
    sink.flush()?;
    Ok(())
}

/// One JSON object per (date, commit) leaf.
pub fn emit_ndjson<W: Write>(result: &AggregateResult, mut sink: W) -> Result<()> {
    for (date, commit, totals) in result.leaves() {
        let leaf = NdjsonLeaf {
            date,
            commit,
            count: totals.count,
            kpi_sum: totals.kpi_sum,
        };
        serde_json::to_writer(&mut sink, &leaf).map_err(KpiError::from_json)?;
        sink.write_all(b"\n")?;
    }
    sink.flush()?;
    Ok(())
}

pub fn print_summary(result: &AggregateResult, stats: &AggregateStats) {
    if result.is_empty() {
        println!("No data to display");
        return;
    }

    println!("{}", style("Line counts and KPI by report date").bold());
    println!("{}", "─".repeat(60));

    for (date, commits) in result.iter() {
        let counts: Vec<String> = commits.values().map(|t| t.count.to_string()).collect();
        let kpis: Vec<String> = commits.values().map(|t| format!("{:.2}", t.kpi_sum)).collect();
        println!("{} {:<12} {}", style("Line Count").cyan(), date, counts.join(" "));
        println!("{} {:<12} {}", style("       KPI").green(), date, kpis.join(" "));
    }

    if stats.rows_skipped > 0 || stats.kpi_parse_failures > 0 || stats.commits_skipped > 0 {
        println!(
            "\n{} {} commits skipped, {} rows skipped, {} KPI values unreadable",
            style("Warnings:").yellow().bold(),
            stats.commits_skipped,
            stats.rows_skipped,
            stats.kpi_parse_failures
        );
    }
}
