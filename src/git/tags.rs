//! Release tag detection for the default range start.

use std::collections::HashMap;

use git2::{Oid, Repository, Sort};
use semver::Version;
use tracing::{debug, warn};

use crate::error::GitError;

/// A stable release tag peeled to its commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTag {
    pub name: String,
    pub oid: Oid,
    pub version: Version,
}

/// Parse `v1.2.3` or `1.2.3` into a version.
pub fn version_from_tag(tag_name: &str) -> Option<Version> {
    Version::parse(tag_name.strip_prefix('v').unwrap_or(tag_name)).ok()
}

/// `vX.Y.Z` / `X.Y.Z` with no pre-release or build suffix.
fn is_stable_release(version: &Version) -> bool {
    version.pre.is_empty() && version.build.is_empty()
}

/// All stable release tags, grouped by the commit they point at.
pub fn release_tags(repo: &Repository) -> Result<HashMap<Oid, Vec<VersionTag>>, GitError> {
    let names = repo.tag_names(None).map_err(GitError::RevwalkError)?;
    let mut by_commit: HashMap<Oid, Vec<VersionTag>> = HashMap::new();

    for name in names.iter() {
        let Some(name) = name else {
            warn!("Skipping tag whose name is not valid UTF-8");
            continue;
        };
        let Some(version) = version_from_tag(name).filter(is_stable_release) else {
            continue;
        };
        match repo
            .revparse_single(&format!("refs/tags/{name}"))
            .and_then(|obj| obj.peel_to_commit())
        {
            Ok(commit) => by_commit.entry(commit.id()).or_default().push(VersionTag {
                name: name.to_string(),
                oid: commit.id(),
                version,
            }),
            Err(e) => debug!(tag = %name, error = %e, "Skipping tag that does not point at a commit"),
        }
    }

    Ok(by_commit)
}

/// Nearest stable release tag reachable from `tip`, excluding tags on `tip`
/// itself so that `--to v2.0.0` starts after the previous release.
pub fn latest_reachable_tag(repo: &Repository, tip: Oid) -> Result<Option<VersionTag>, GitError> {
    let tags = release_tags(repo)?;
    if tags.is_empty() {
        debug!("No stable semver tags found in repository");
        return Ok(None);
    }

    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk
        .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
        .map_err(GitError::RevwalkError)?;
    revwalk.push(tip).map_err(GitError::RevwalkError)?;

    for oid in revwalk {
        let oid = oid.map_err(GitError::RevwalkError)?;
        if oid == tip {
            continue;
        }
        if let Some(best) = tags
            .get(&oid)
            .and_then(|candidates| candidates.iter().max_by(|a, b| a.version.cmp(&b.version)))
        {
            debug!(tag = %best.name, "Found latest reachable release tag");
            return Ok(Some(best.clone()));
        }
    }

    Ok(None)
}
