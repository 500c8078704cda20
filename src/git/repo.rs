use crate::error::{KpiError, Result};
use crate::git::VersionSource;
use crate::model::{CommitVersion, DateRange};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use gix::{discover, ObjectId, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::debug;

/// Which end of a calendar day a bare `YYYY-MM-DD` stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayEdge {
    Start,
    End,
}

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at `path`, or current dir if `None`
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let repo_path = match path {
            Some(p) => p.as_ref().to_path_buf(),
            None => std::env::current_dir()?,
        };

        let repo = discover(&repo_path)?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resolve_range(&self, since: Option<&str>, until: Option<&str>) -> Result<DateRange> {
        let mut range = DateRange::new();

        let since_dt = since
            .map(|s| self.parse_commit_or_date(s, DayEdge::Start))
            .transpose()?;
        let until_dt = until
            .map(|u| self.parse_commit_or_date(u, DayEdge::End))
            .transpose()?;

        if let (Some(s), Some(u)) = (since_dt, until_dt) {
            if s > u {
                return Err(KpiError::InvalidDate(format!(
                    "Invalid range: since ({}) is after until ({})",
                    s, u
                )));
            }
        }

        if let Some(s) = since_dt {
            range = range.with_since(s);
        }
        if let Some(u) = until_dt {
            range = range.with_until(u);
        }

        Ok(range)
    }

    fn parse_commit_or_date(&self, input: &str, edge: DayEdge) -> Result<DateTime<Utc>> {
        if let Some(dt) = parse_date(input, edge)? {
            return Ok(dt);
        }

        // Fallback to Git ref
        let id = self
            .repo
            .rev_parse_single(input)
            .map_err(|e| KpiError::Parse(format!("Invalid commit or date '{input}': {e}")))?;

        let commit = id
            .object()?
            .try_into_commit()
            .map_err(|_| KpiError::Parse(format!("Not a commit: {input}")))?;

        let secs = commit.time()?.seconds;
        DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| KpiError::InvalidDate(format!("Invalid timestamp: {secs}")))
    }

    /// Walk history from HEAD and collect every commit inside `range` whose
    /// blob at `file` differs from the blob in every parent, so merges that
    /// took one side's file unchanged are not versions. Newest first, at most
    /// `limit` entries.
    pub fn file_versions(&self, file: &str, range: &DateRange, limit: usize) -> Result<Vec<CommitVersion>> {
        let file = normalize_path(file);
        let mut head = self.repo.head()?;
        let head_commit = head.peel_to_commit_in_place()?;

        let mut versions = Vec::new();
        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut stack: VecDeque<ObjectId> = VecDeque::from([head_commit.id]);

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Collecting versions of {file}..."));

        while let Some(commit_id) = stack.pop_back() {
            if !seen.insert(commit_id) {
                continue;
            }

            let commit = self.repo.find_commit(commit_id)?;
            let secs = commit.time()?.seconds;
            let timestamp = DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| KpiError::InvalidDate(format!("Invalid timestamp: {secs}")))?;

            let parents: Vec<ObjectId> = commit.parent_ids().map(|id| id.into()).collect();

            if range.contains(&timestamp) {
                if let Some(blob_id) = self.blob_at(commit_id, file)? {
                    let mut unchanged = false;
                    for parent_id in &parents {
                        if self.blob_at(*parent_id, file)? == Some(blob_id) {
                            unchanged = true;
                            break;
                        }
                    }

                    if !unchanged {
                        let content = self.repo.find_object(blob_id)?.detach().data;
                        debug!(commit = %commit_id, bytes = content.len(), "Found file version");
                        versions.push(CommitVersion {
                            commit_id: commit_id.to_string(),
                            timestamp,
                            content,
                        });
                        pb.inc(1);
                    }
                }
            }

            for pid in parents {
                stack.push_back(pid);
            }
        }

        pb.finish_and_clear();

        versions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.commit_id.cmp(&b.commit_id)));
        versions.truncate(limit);
        Ok(versions)
    }

    fn blob_at(&self, commit_id: ObjectId, file: &str) -> Result<Option<ObjectId>> {
        let tree = self.repo.find_commit(commit_id)?.tree()?;
        let entry = tree.lookup_entry_by_path(file)?;
        Ok(entry
            .filter(|e| e.mode().is_blob())
            .map(|e| e.object_id()))
    }
}

impl VersionSource for GitRepo {
    fn versions(&self, file: &str, range: &DateRange, limit: usize) -> Result<Vec<CommitVersion>> {
        self.file_versions(file, range, limit)
    }
}

fn normalize_path(file: &str) -> &str {
    file.trim_start_matches("./")
}

/// Parse RFC3339, `YYYY-MM-DD` or a relative duration such as `90d`,
/// `2weeks` or `3days ago`. `Ok(None)` means the input is none of these.
///
/// A bare date resolves to the first or last second of that day depending on
/// `edge`, so both ends of a range include the whole day.
pub fn parse_date(input: &str, edge: DayEdge) -> Result<Option<DateTime<Utc>>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let datetime = match edge {
            DayEdge::Start => date.and_hms_opt(0, 0, 0),
            DayEdge::End => date.and_hms_opt(23, 59, 59),
        };
        if let Some(datetime) = datetime {
            return Ok(Some(Utc.from_utc_datetime(&datetime)));
        }
    }

    if let Some(duration) = parse_relative(input) {
        let target = SystemTime::now()
            .checked_sub(duration)
            .ok_or_else(|| KpiError::InvalidDate(format!("Duration overflow for '{input}'")))?;
        return Ok(Some(DateTime::<Utc>::from(target)));
    }

    Ok(None)
}

fn parse_relative(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();
    let input = input.strip_suffix(" ago").unwrap_or(&input);
    let input = input.strip_prefix('-').unwrap_or(input);
    humantime::parse_duration(input.trim()).ok()
}
