use crate::cli::CommonArgs;
use crate::git::GitRepo;
use crate::model::{CommitVersion, VersionEntry, VersionsOutput, SCHEMA_VERSION};
use crate::util::short_id;
use anyhow::Context;
use chrono::Utc;
use console::style;

pub fn exec(common: CommonArgs, file: String, json: bool) -> anyhow::Result<()> {
    let repo = GitRepo::open(common.repo.as_ref()).context("Failed to open git repository")?;

    let range = repo
        .resolve_range(common.since.as_deref(), common.until.as_deref())
        .context("Failed to resolve date range")?;

    let versions = repo
        .file_versions(&file, &range, common.max_commits)
        .with_context(|| format!("Failed to collect versions of {file}"))?;

    let entries = to_entries(&versions);

    if json {
        let output = VersionsOutput {
            version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            repository_path: repo.path().to_string_lossy().to_string(),
            file,
            since: common.since.clone(),
            until: common.until.clone(),
            entries,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        output_table(&file, &entries);
    }

    Ok(())
}

fn to_entries(versions: &[CommitVersion]) -> Vec<VersionEntry> {
    versions
        .iter()
        .map(|v| VersionEntry {
            commit_id: v.commit_id.clone(),
            timestamp: v.timestamp,
            size_bytes: v.content.len(),
        })
        .collect()
}

fn output_table(file: &str, entries: &[VersionEntry]) {
    if entries.is_empty() {
        println!("No versions of {file} in range");
        return;
    }

    println!(
        "{:<10} {:<20} {:>10}",
        style("Commit").bold(),
        style("Date").bold(),
        style("Bytes").bold()
    );
    println!("{}", "─".repeat(42));
    for e in entries {
        println!(
            "{:<10} {:<20} {:>10}",
            short_id(&e.commit_id),
            e.timestamp.format("%Y-%m-%d %H:%M:%S"),
            e.size_bytes
        );
    }
    println!("\n{} versions of {}", style(entries.len()).cyan(), file);
}
