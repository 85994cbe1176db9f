//! Diff ingestion and normalization.
//!
//! Produces [`FileChange`]s for a commit or the working tree. Retrieval
//! problems for a single file degrade to a placeholder diff; only an
//! unresolvable commit yields `None`.

pub mod commit;
pub mod file;
pub mod stat;
pub mod working_tree;

pub use commit::{CommitAnalysis, CommitMeta, analyze_commit, is_merge_commit};
pub use file::{FileChange, FileStatus, ingest_committed_file};
pub use stat::{DiffStats, NameStatusEntry, StatEntry, parse_name_status, parse_stat};
pub use working_tree::{WORKING_TREE_HASH, WORKING_TREE_SUBJECT, analyze_working_tree};
