//! View models returned by the summary repository.

use crate::model::Summary;

/// Result of an insert-if-absent write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredSummary {
    /// This call wrote the row.
    Inserted(Summary),
    /// A row for the episode already existed; it was left untouched.
    Existing(Summary),
}
