//! Parsers for `--name-status`, `--stat`, and `--shortstat` output.

use serde::Serialize;

use super::file::FileStatus;

/// Aggregate size of a commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub files: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl DiffStats {
    pub fn total_changes(&self) -> usize {
        self.insertions + self.deletions
    }
}

/// One line of `git show --name-status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameStatusEntry {
    pub status: FileStatus,
    pub path: String,
    pub old_path: Option<String>,
}

/// Parse tab-separated name-status lines (`M\tpath`, `R087\told\tnew`).
pub fn parse_name_status(output: &str) -> Vec<NameStatusEntry> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.split('\t');
            let code = parts.next()?.trim().chars().next()?;
            let first = parts.next()?.trim();
            if first.is_empty() {
                return None;
            }
            let status = FileStatus::from_code(code);
            match (status, parts.next()) {
                (FileStatus::Renamed, Some(new_path)) => Some(NameStatusEntry {
                    status,
                    path: new_path.trim().to_string(),
                    old_path: Some(first.to_string()),
                }),
                (_, Some(copy_target)) => Some(NameStatusEntry {
                    status,
                    path: copy_target.trim().to_string(),
                    old_path: None,
                }),
                (_, None) => Some(NameStatusEntry {
                    status,
                    path: first.to_string(),
                    old_path: None,
                }),
            }
        })
        .collect()
}

/// One file row of `git diff --stat`, with counts approximated from the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatEntry {
    pub path: String,
    pub old_path: Option<String>,
    pub status: FileStatus,
    pub additions: usize,
    pub deletions: usize,
    pub binary: bool,
}

/// Resolve `a => b` and `dir/{a => b}/file` rename notation.
fn resolve_rename(raw: &str) -> (String, Option<String>) {
    let Some((left, right)) = raw.split_once(" => ") else {
        return (raw.to_string(), None);
    };

    if let (Some(open), Some(close)) = (left.rfind('{'), right.find('}')) {
        let prefix = &left[..open];
        let old_mid = &left[open + 1..];
        let new_mid = &right[..close];
        let suffix = &right[close + 1..];
        let join = |mid: &str| format!("{prefix}{mid}{suffix}").replace("//", "/");
        return (join(new_mid), Some(join(old_mid)));
    }

    (right.trim().to_string(), Some(left.trim().to_string()))
}

/// Parse a single `path | N +++--` row.
pub fn parse_stat_line(line: &str) -> Option<StatEntry> {
    let (raw_path, counts) = line.rsplit_once('|')?;
    let raw_path = raw_path.trim();
    if raw_path.is_empty() {
        return None;
    }
    let (path, old_path) = resolve_rename(raw_path);
    let counts = counts.trim();

    if counts.starts_with("Bin") {
        let status = if counts.contains("Bin 0 ->") {
            FileStatus::Added
        } else if counts.ends_with("-> 0 bytes") {
            FileStatus::Deleted
        } else {
            FileStatus::Modified
        };
        return Some(StatEntry {
            path,
            old_path,
            status,
            additions: 0,
            deletions: 0,
            binary: true,
        });
    }

    let mut tokens = counts.split_whitespace();
    let total: usize = tokens.next()?.parse().ok()?;
    let graph = tokens.next().unwrap_or("");
    let plus = graph.chars().filter(|c| *c == '+').count();
    let minus = graph.chars().filter(|c| *c == '-').count();

    let (additions, deletions) = if plus + minus == 0 {
        (total, 0)
    } else {
        let additions = ((total as f64) * (plus as f64) / ((plus + minus) as f64)).round() as usize;
        (additions, total.saturating_sub(additions))
    };

    let status = if old_path.is_some() {
        FileStatus::Renamed
    } else if total > 0 && minus == 0 && plus > 0 {
        FileStatus::Added
    } else if total > 0 && plus == 0 && minus > 0 {
        FileStatus::Deleted
    } else {
        FileStatus::Modified
    };

    Some(StatEntry {
        path,
        old_path,
        status,
        additions,
        deletions,
        binary: false,
    })
}

/// Parse `N files changed, X insertions(+), Y deletions(-)`.
pub fn parse_shortstat(line: &str) -> Option<DiffStats> {
    let mut stats = DiffStats::default();
    let mut matched = false;
    for part in line.trim().split(',') {
        let mut words = part.split_whitespace();
        let (Some(n), Some(label)) = (words.next(), words.next()) else {
            continue;
        };
        let Ok(n) = n.parse::<usize>() else {
            continue;
        };
        if label.starts_with("file") {
            stats.files = n;
            matched = true;
        } else if label.starts_with("insertion") {
            stats.insertions = n;
        } else if label.starts_with("deletion") {
            stats.deletions = n;
        }
    }
    matched.then_some(stats)
}

/// Parse full `--stat` output into rows plus the trailing summary, if present.
pub fn parse_stat(output: &str) -> (Vec<StatEntry>, Option<DiffStats>) {
    let mut entries = Vec::new();
    let mut summary = None;
    for line in output.lines() {
        if line.contains('|') {
            if let Some(entry) = parse_stat_line(line) {
                entries.push(entry);
            }
        } else if let Some(stats) = parse_shortstat(line) {
            summary = Some(stats);
        }
    }
    (entries, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_status_with_rename() {
        let out = "M\tsrc/lib.rs\nA\tsrc/new.rs\nR087\tsrc/old.rs\tsrc/moved.rs\nD\tREADME.old\n";
        let entries = parse_name_status(out);
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].status, FileStatus::Modified);
        assert_eq!(entries[2].status, FileStatus::Renamed);
        assert_eq!(entries[2].path, "src/moved.rs");
        assert_eq!(entries[2].old_path.as_deref(), Some("src/old.rs"));
        assert_eq!(entries[3].status, FileStatus::Deleted);
    }

    #[test]
    fn test_stat_line_splits_by_graph_ratio() {
        let entry = parse_stat_line(" src/app.rs | 40 ++++++++++++++++++++++++++++++----------").unwrap();
        assert_eq!(entry.path, "src/app.rs");
        assert_eq!(entry.additions + entry.deletions, 40);
        assert_eq!(entry.additions, 30);
        assert_eq!(entry.status, FileStatus::Modified);
    }

    #[test]
    fn test_stat_line_status_from_graph() {
        assert_eq!(parse_stat_line(" a.txt | 3 +++").unwrap().status, FileStatus::Added);
        assert_eq!(parse_stat_line(" a.txt | 3 ---").unwrap().status, FileStatus::Deleted);
    }

    #[test]
    fn test_stat_line_binary_and_rename() {
        let bin = parse_stat_line(" logo.png | Bin 0 -> 2048 bytes").unwrap();
        assert!(bin.binary);
        assert_eq!(bin.status, FileStatus::Added);

        let moved = parse_stat_line(" src/{old => new}/mod.rs | 2 +-").unwrap();
        assert_eq!(moved.path, "src/new/mod.rs");
        assert_eq!(moved.old_path.as_deref(), Some("src/old/mod.rs"));
        assert_eq!(moved.status, FileStatus::Renamed);
    }

    #[test]
    fn test_parse_stat_with_summary() {
        let out = " a.rs | 2 +-\n b.rs | 1 +\n 2 files changed, 2 insertions(+), 1 deletion(-)\n";
        let (entries, summary) = parse_stat(out);
        assert_eq!(entries.len(), 2);
        assert_eq!(
            summary,
            Some(DiffStats {
                files: 2,
                insertions: 2,
                deletions: 1
            })
        );
    }

    #[test]
    fn test_shortstat_without_deletions() {
        let stats = parse_shortstat(" 1 file changed, 5 insertions(+)").unwrap();
        assert_eq!(stats.files, 1);
        assert_eq!(stats.insertions, 5);
        assert_eq!(stats.deletions, 0);
        assert!(parse_shortstat("nothing here").is_none());
    }
}
