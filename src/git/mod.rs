pub mod repo;

pub use repo::GitRepo;

use crate::error::Result;
use crate::model::{CommitVersion, DateRange};

/// Supplies the historical versions of one tracked file.
pub trait VersionSource {
    /// Versions of `file` committed inside `range`, at most `limit` of them.
    fn versions(&self, file: &str, range: &DateRange, limit: usize) -> Result<Vec<CommitVersion>>;
}
