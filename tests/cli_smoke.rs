use assert_cmd::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn git(dir: &Path, args: &[&str]) {
    assert!(Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

fn init_git_repo(dir: &Path) {
    git(dir, &["init"]);
    git(dir, &["config", "core.autocrlf", "false"]);
    git(dir, &["config", "core.safecrlf", "false"]);
    git(dir, &["config", "user.email", "you@example.com"]);
    git(dir, &["config", "user.name", "Your Name"]);
}

fn commit_file(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f.sync_all().unwrap();
    git(dir, &["add", "."]);
    git(dir, &["commit", "-m", &format!("update {name}")]);
}

fn kpi_history(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kpi-history").unwrap();
    cmd.current_dir(dir)
        .env_remove("START_DATE")
        .env_remove("TRACKED_FILE")
        .env_remove("DATE_COLUMN")
        .env_remove("KPI_COLUMN")
        .arg("--repo")
        .arg(dir);
    cmd
}

fn seed_history(dir: &Path) {
    init_git_repo(dir);
    commit_file(dir, "data/kpi.csv", "date,kpi\n2024-01-01,10\n2024-01-01,20\n");
    commit_file(dir, "README.md", "unrelated\n");
    commit_file(
        dir,
        "data/kpi.csv",
        "date,kpi\n2024-01-01,10\n2024-01-01,20\n2024-01-02,5\n",
    );
}

#[test]
fn report_json_groups_by_date_and_commit() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    seed_history(dir.path());

    let out = kpi_history(dir.path())
        .args(["report", "data/kpi.csv", "--date-column", "date", "--kpi-column", "kpi", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();

    let first_day = v["2024-01-01"].as_object().unwrap();
    assert_eq!(first_day.len(), 2);
    for totals in first_day.values() {
        assert_eq!(totals["count"].as_u64(), Some(2));
        assert_eq!(totals["kpiSum"].as_f64(), Some(30.0));
    }

    let second_day = v["2024-01-02"].as_object().unwrap();
    assert_eq!(second_day.len(), 1);
    let totals = second_day.values().next().unwrap();
    assert_eq!(totals["count"].as_u64(), Some(1));
    assert_eq!(totals["kpiSum"].as_f64(), Some(5.0));
}

#[test]
fn report_writes_timestamped_file() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    seed_history(dir.path());
    let out_dir = dir.path().join("reports");

    kpi_history(dir.path())
        .args(["report", "data/kpi.csv", "--date-column", "date"])
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .success();

    let files: Vec<_> = fs::read_dir(&out_dir).unwrap().map(|e| e.unwrap().path()).collect();
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("lineCountsByDateByVersion_"));
    assert!(name.ends_with(".json"));

    let v: serde_json::Value = serde_json::from_slice(&fs::read(&files[0]).unwrap()).unwrap();
    let totals = v["2024-01-02"].as_object().unwrap().values().next().unwrap();
    assert_eq!(totals["count"].as_u64(), Some(1));
    assert_eq!(totals["kpiSum"].as_f64(), Some(0.0));
}

#[test]
fn report_fails_on_unknown_column() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    seed_history(dir.path());

    kpi_history(dir.path())
        .args(["report", "data/kpi.csv", "--date-column", "day", "--json"])
        .assert()
        .failure();
}

#[test]
fn versions_lists_only_commits_touching_the_file() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    seed_history(dir.path());

    let out = kpi_history(dir.path())
        .args(["versions", "data/kpi.csv", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let entries = v["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(v["file"].as_str(), Some("data/kpi.csv"));
}

#[test]
fn max_commits_limits_versions() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    seed_history(dir.path());

    let out = kpi_history(dir.path())
        .args(["--max-commits", "1", "versions", "data/kpi.csv", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["entries"].as_array().unwrap().len(), 1);
}

#[test]
fn merge_taking_one_side_is_not_a_new_version() {
    let dir = tempdir().unwrap();
    if !has_git() {
        return;
    }
    init_git_repo(dir.path());
    commit_file(dir.path(), "data/kpi.csv", "date,kpi\n2024-01-01,10\n");

    git(dir.path(), &["checkout", "-b", "feature"]);
    commit_file(dir.path(), "data/kpi.csv", "date,kpi\n2024-01-01,10\n2024-01-02,5\n");

    git(dir.path(), &["checkout", "-"]);
    commit_file(dir.path(), "README.md", "unrelated\n");
    git(dir.path(), &["merge", "--no-ff", "feature", "-m", "merge feature"]);

    let out = kpi_history(dir.path())
        .args(["versions", "data/kpi.csv", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["entries"].as_array().unwrap().len(), 2);

    let out = kpi_history(dir.path())
        .args(["report", "data/kpi.csv", "--date-column", "date", "--kpi-column", "kpi", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["2024-01-01"].as_object().unwrap().len(), 2);
    assert_eq!(v["2024-01-02"].as_object().unwrap().len(), 1);
}
