//! Commit range resolution.

use std::path::Path;

use git2::{Oid, Repository};

use crate::error::GitError;

use super::tags::latest_reachable_tag;

/// Resolved commit range. `from == None` means "all history up to `to`".
#[derive(Debug, Clone)]
pub struct CommitRange {
    pub from: Option<Oid>,
    pub to: Oid,
    pub from_ref: String,
    pub to_ref: String,
}

/// Resolve a commit range from user-provided references.
///
/// Without `from`, the range starts after the nearest release tag reachable
/// from `to`, or covers the whole history when there is none.
pub fn resolve_range(
    repo: &Repository,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<CommitRange, GitError> {
    let to_ref = to.unwrap_or("HEAD");
    let to_oid = resolve_reference(repo, to_ref)?;

    let (from_oid, from_ref) = match from {
        Some(reference) => (Some(resolve_reference(repo, reference)?), reference.to_string()),
        None => match latest_reachable_tag(repo, to_oid)? {
            Some(tag) => (Some(tag.oid), tag.name),
            None => (None, "root".to_string()),
        },
    };

    Ok(CommitRange {
        from: from_oid,
        to: to_oid,
        from_ref,
        to_ref: to_ref.to_string(),
    })
}

/// Open the repository containing `path`, searching parent directories.
pub fn open_repository(path: &Path) -> Result<Repository, GitError> {
    Repository::discover(path).map_err(GitError::OpenRepository)
}

/// Resolve a tag, branch, or commit hash to a commit OID.
pub fn resolve_reference(repo: &Repository, reference: &str) -> Result<Oid, GitError> {
    let object = repo
        .revparse_single(reference)
        .map_err(|e| GitError::ReferenceNotFound(reference.to_string(), e))?;
    let commit = object.peel_to_commit().map_err(GitError::ParseCommit)?;
    Ok(commit.id())
}
