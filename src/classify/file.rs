//! Path-based file classification: category, language, importance, complexity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ingest::FileStatus;

/// Broad role of a file in the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Configuration,
    Documentation,
    Tests,
    Source,
    Frontend,
    Assets,
    Build,
    Other,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Documentation => "documentation",
            Self::Tests => "tests",
            Self::Source => "source",
            Self::Frontend => "frontend",
            Self::Assets => "assets",
            Self::Build => "build",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much a change to a file matters. Ordered from least to most important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Medium,
    High,
    Critical,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Coarse complexity bucket derived from a 1..=5 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
}

impl ComplexityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complexity {
    pub score: u8,
    pub level: ComplexityLevel,
}

/// Dependency manifests and lockfiles, matched against the file name.
pub(crate) const MANIFEST_FILES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "cargo.toml",
    "cargo.lock",
    "go.mod",
    "go.sum",
    "pyproject.toml",
    "requirements.txt",
    "pipfile",
    "pipfile.lock",
    "poetry.lock",
    "gemfile",
    "gemfile.lock",
    "composer.json",
    "composer.lock",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
];

const CONFIG_MARKERS: &[&str] = &[".config.", "tsconfig", ".eslintrc", ".prettierrc"];

/// Config directories and `config.*` files nested in a tree; source files there stay source.
const NESTED_CONFIG_MARKERS: &[&str] = &["/config/", "/config."];

const SOURCE_EXTENSIONS: &[&str] = &[
    "rs", "js", "mjs", "cjs", "ts", "jsx", "tsx", "py", "go", "java", "kt", "kts", "rb", "php",
    "c", "h", "cc", "cpp", "hpp", "cs", "swift", "m", "scala", "sh", "bash", "sql", "lua", "ex",
    "exs", "dart",
];

const FRONTEND_EXTENSIONS: &[&str] = &[
    "css", "scss", "sass", "less", "html", "htm", "vue", "svelte", "hbs", "ejs", "pug",
];

const ASSET_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "ico", "webp", "bmp", "woff", "woff2", "ttf", "eot",
    "mp3", "mp4", "pdf",
];

const BUILD_MARKERS: &[&str] = &[
    "makefile",
    "dockerfile",
    "docker-compose",
    "jenkinsfile",
    "build/",
    "dist/",
    "scripts/",
    "webpack",
    "rollup",
    "gulpfile",
    "gruntfile",
    "build.rs",
];

const ENTRY_POINT_STEMS: &[&str] = &["index", "main", "app", "server"];

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn extension(path: &str) -> Option<&str> {
    let name = file_name(path);
    name.rsplit_once('.')
        .filter(|(stem, _)| !stem.is_empty())
        .map(|(_, ext)| ext)
}

fn stem(path: &str) -> &str {
    let name = file_name(path);
    name.split('.').next().unwrap_or(name)
}

/// Whether the file is a dependency manifest or lockfile.
pub fn is_manifest(path: &str) -> bool {
    let name = file_name(path).to_lowercase();
    MANIFEST_FILES.contains(&name.as_str())
}

/// Markdown and reStructuredText, README/CHANGELOG files, and anything under `docs/`.
pub fn is_documentation(path: &str) -> bool {
    let lower = path.to_lowercase();
    let name = file_name(&lower);
    lower.ends_with(".md")
        || lower.ends_with(".mdx")
        || lower.ends_with(".rst")
        || name.starts_with("readme")
        || name.starts_with("changelog")
        || lower.contains("/docs/")
        || lower.starts_with("docs/")
}

/// Markdown, README or CHANGELOG files: the only files a docs-only commit touches.
pub fn is_prose_document(path: &str) -> bool {
    let lower = path.to_lowercase();
    let name = file_name(&lower);
    lower.ends_with(".md") || name.starts_with("readme") || name.starts_with("changelog")
}

/// Whether the path looks like a test file or lives in a test directory.
pub fn is_test_file(path: &str) -> bool {
    let lower = path.to_lowercase();
    let name = file_name(&lower);
    lower.contains("/test/")
        || lower.contains("/tests/")
        || lower.contains("__tests__")
        || lower.starts_with("test/")
        || lower.starts_with("tests/")
        || name.contains(".test.")
        || name.contains(".spec.")
        || name.starts_with("test_")
        || stem(name).ends_with("_test")
}

/// Whether the file has a recognized source-code extension.
pub fn is_source_file(path: &str) -> bool {
    extension(path)
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_configuration(path: &str) -> bool {
    let lower = path.to_lowercase();
    let name = file_name(&lower);
    is_manifest(&lower)
        || name.starts_with('.')
        || name.contains(".env")
        || CONFIG_MARKERS.iter().any(|m| lower.contains(m))
        || lower.starts_with("config/")
        || (NESTED_CONFIG_MARKERS.iter().any(|m| lower.contains(m)) && !is_source_file(&lower))
        || matches!(extension(&lower), Some("toml" | "yaml" | "yml" | "ini" | "cfg" | "conf"))
}

/// Categorize a file by path. First matching rule wins.
pub fn categorize_file(path: &str) -> FileCategory {
    let lower = path.to_lowercase();
    let ext = extension(&lower);

    if is_configuration(&lower) {
        FileCategory::Configuration
    } else if is_documentation(&lower) {
        FileCategory::Documentation
    } else if is_test_file(&lower) {
        FileCategory::Tests
    } else if is_source_file(&lower) {
        FileCategory::Source
    } else if ext.is_some_and(|e| FRONTEND_EXTENSIONS.contains(&e)) {
        FileCategory::Frontend
    } else if ext.is_some_and(|e| ASSET_EXTENSIONS.contains(&e)) {
        FileCategory::Assets
    } else if BUILD_MARKERS.iter().any(|m| lower.contains(m)) {
        FileCategory::Build
    } else {
        FileCategory::Other
    }
}

/// Map a file extension to a language name.
pub fn detect_language(path: &str) -> &'static str {
    let name = file_name(path).to_lowercase();
    if name == "dockerfile" {
        return "Dockerfile";
    }
    if name == "makefile" {
        return "Makefile";
    }

    match extension(&name).unwrap_or("") {
        "rs" => "Rust",
        "js" | "mjs" | "cjs" => "JavaScript",
        "jsx" => "JavaScript (JSX)",
        "ts" => "TypeScript",
        "tsx" => "TypeScript (TSX)",
        "py" => "Python",
        "go" => "Go",
        "java" => "Java",
        "kt" | "kts" => "Kotlin",
        "rb" => "Ruby",
        "php" => "PHP",
        "c" | "h" => "C",
        "cc" | "cpp" | "hpp" => "C++",
        "cs" => "C#",
        "swift" => "Swift",
        "m" => "Objective-C",
        "scala" => "Scala",
        "sh" | "bash" => "Shell",
        "sql" => "SQL",
        "lua" => "Lua",
        "ex" | "exs" => "Elixir",
        "dart" => "Dart",
        "css" => "CSS",
        "scss" | "sass" => "SCSS",
        "less" => "Less",
        "html" | "htm" => "HTML",
        "vue" => "Vue",
        "svelte" => "Svelte",
        "json" => "JSON",
        "yaml" | "yml" => "YAML",
        "toml" => "TOML",
        "xml" => "XML",
        "md" | "mdx" => "Markdown",
        _ => "Unknown",
    }
}

fn is_build_file(path: &str) -> bool {
    let name = file_name(path).to_lowercase();
    name == "makefile"
        || name == "dockerfile"
        || name == "build.rs"
        || name.starts_with("webpack.config")
        || name.starts_with("vite.config")
        || name.starts_with("rollup.config")
}

fn under_src_or_lib(path: &str) -> bool {
    let lower = path.to_lowercase();
    lower.starts_with("src/")
        || lower.starts_with("lib/")
        || lower.contains("/src/")
        || lower.contains("/lib/")
}

/// Assess how important a change to `path` is.
///
/// Deleted files are never below `High`.
pub fn assess_file_importance(path: &str, status: FileStatus) -> Importance {
    let base = if is_manifest(path) || is_build_file(path) {
        Importance::Critical
    } else if under_src_or_lib(path) && ENTRY_POINT_STEMS.contains(&stem(path).to_lowercase().as_str()) {
        Importance::Critical
    } else if under_src_or_lib(path) {
        Importance::High
    } else {
        match categorize_file(path) {
            FileCategory::Configuration => Importance::High,
            FileCategory::Documentation | FileCategory::Assets => Importance::Low,
            _ => Importance::Medium,
        }
    };

    if status == FileStatus::Deleted {
        base.max(Importance::High)
    } else {
        base
    }
}

/// Count `+`/`-` content lines, skipping the `+++`/`---` file headers.
pub fn count_changed_lines(diff: &str) -> (usize, usize) {
    diff.lines().fold((0, 0), |(adds, dels), line| {
        if line.starts_with("+++") || line.starts_with("---") {
            (adds, dels)
        } else if line.starts_with('+') {
            (adds + 1, dels)
        } else if line.starts_with('-') {
            (adds, dels + 1)
        } else {
            (adds, dels)
        }
    })
}

/// Complexity from a total changed-line count.
pub fn complexity_for_lines(changed_lines: usize) -> Complexity {
    let score = match changed_lines {
        0..=10 => 1,
        11..=50 => 2,
        51..=100 => 3,
        101..=200 => 4,
        _ => 5,
    };
    let level = match score {
        1 | 2 => ComplexityLevel::Low,
        3 => ComplexityLevel::Medium,
        _ => ComplexityLevel::High,
    };
    Complexity { score, level }
}

/// Complexity of a diff from its changed-line count.
pub fn assess_change_complexity(diff: &str) -> Complexity {
    let (adds, dels) = count_changed_lines(diff);
    complexity_for_lines(adds + dels)
}
