//! Git operations: commit discovery, range resolution, and the command runner.

pub mod commits;
pub mod range;
pub mod runner;
pub mod tags;

pub use commits::{CommitType, ConventionalParts, DiscoveredCommit, discover_commits, parse_commit_message};
pub use range::{CommitRange, open_repository, resolve_range};
pub use runner::{GitCli, Probe, RunnerExt, VersionControlRunner};
pub use tags::{VersionTag, latest_reachable_tag, version_from_tag};
