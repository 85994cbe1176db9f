//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};

use changescribe::classify::ChangeCategory;
use changescribe::error::GitError;
use changescribe::git::VersionControlRunner;
use changescribe::ingest::{CommitAnalysis, CommitMeta, FileChange, FileStatus};
use changescribe::summarize::{AiSummary, Impact, SummarizedCommit, SummarySource};

/// A fake runner answering git commands from a script.
///
/// Commands are matched on their space-joined arguments. Unscripted commands
/// fail like an unknown revision would.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: HashMap<String, Result<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful command.
    pub fn ok(mut self, args: &str, output: &str) -> Self {
        self.responses
            .insert(args.to_string(), Ok(output.to_string()));
        self
    }

    /// Script a failing command.
    pub fn fail(mut self, args: &str, stderr: &str) -> Self {
        self.responses
            .insert(args.to_string(), Err(stderr.to_string()));
        self
    }

    /// Every command run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl VersionControlRunner for ScriptedRunner {
    async fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let key = args.join(" ");
        self.calls.lock().expect("calls lock").push(key.clone());
        match self.responses.get(&key) {
            Some(Ok(output)) => Ok(output.clone()),
            Some(Err(stderr)) => Err(GitError::CommandFailed {
                command: key,
                code: 128,
                stderr: stderr.clone(),
            }),
            None => Err(GitError::CommandFailed {
                command: key,
                code: 128,
                stderr: "fatal: unscripted command".to_string(),
            }),
        }
    }
}

/// Metadata output of `git show --no-patch` for a scripted commit.
pub fn metadata_output(hash: &str, parents: &[&str], subject: &str) -> String {
    format!(
        "{}\n{}\nTest User\n2024-05-01T10:00:00+00:00\n{}\n",
        hash,
        parents.join(" "),
        subject
    )
}

/// The metadata command `analyze_commit` runs for `hash`.
pub fn metadata_args(hash: &str) -> String {
    format!("show --no-patch --format=%H%n%P%n%an%n%aI%n%s%n%b {}", hash)
}

/// The per-file diff command `analyze_commit` runs.
pub fn file_diff_args(hash: &str, path: &str) -> String {
    format!("show --format= -M --unified=3 {} -- {}", hash, path)
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write `files` and commit them with `message`. Returns the commit OID.
    pub fn commit_files(&self, message: &str, files: &[(&str, &str)]) -> Oid {
        let mut index = self.repo.index().expect("Failed to get index");
        for (path, content) in files {
            let full = self.dir.path().join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create directories");
            }
            std::fs::write(&full, content).expect("Failed to write test file");
            index.add_path(Path::new(path)).expect("Failed to add file");
        }
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let sig = self.signature();
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Commit a single throwaway file change.
    pub fn commit(&self, message: &str) -> Oid {
        let content = format!("{}\n", message);
        self.commit_files(message, &[("test.txt", content.as_str())])
    }

    /// Create a lightweight tag at `oid`.
    pub fn tag(&self, name: &str, oid: Oid) {
        let object = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo
            .tag_lightweight(name, &object, false)
            .expect("Failed to create tag");
    }
}

/// Build an analysis from a subject and `(path, status, diff)` triples.
pub fn analysis(subject: &str, files: &[(&str, FileStatus, &str)]) -> CommitAnalysis {
    let meta = CommitMeta {
        hash: format!("{:0<40}", subject.len()),
        parents: vec!["parent".to_string()],
        author: "Test User".to_string(),
        date: "2024-05-01T10:00:00+00:00".to_string(),
        subject: subject.to_string(),
        body: String::new(),
    };
    let files = files
        .iter()
        .map(|(path, status, diff)| FileChange::new(*status, *path, *diff))
        .collect();
    CommitAnalysis::assemble(meta, files, None)
}

/// A complete AI summary with the given category, impact and breaking flag.
pub fn summary(category: ChangeCategory, impact: Impact, breaking: bool) -> AiSummary {
    AiSummary {
        summary: format!("{} change", category),
        category,
        impact,
        description: String::new(),
        technical_details: String::new(),
        business_value: String::new(),
        risk_factors: Vec::new(),
        recommendations: Vec::new(),
        highlights: Vec::new(),
        breaking_changes: breaking,
        migration_required: false,
        user_facing: true,
        confidence: None,
        source: SummarySource::Ai,
    }
}

/// Pair a bare analysis with `summary`, using `hash` as the commit id.
pub fn summarized(hash: &str, summary: AiSummary) -> SummarizedCommit {
    let meta = CommitMeta {
        hash: hash.to_string(),
        subject: summary.summary.clone(),
        ..Default::default()
    };
    SummarizedCommit {
        analysis: CommitAnalysis::assemble(meta, Vec::new(), None),
        summary,
    }
}
