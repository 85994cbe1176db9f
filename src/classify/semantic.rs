//! Regex pattern library for framework and idiom signals in diffs.
//!
//! Matches are evidence for prompts and fallback summaries, never ground truth.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex_lite::Regex;

struct SemanticPattern {
    tag: &'static str,
    regex: Regex,
}

fn pattern(tag: &'static str, re: &str) -> SemanticPattern {
    SemanticPattern {
        tag,
        regex: Regex::new(re).expect("semantic pattern"),
    }
}

static PATTERNS: LazyLock<Vec<SemanticPattern>> = LazyLock::new(|| {
    vec![
        pattern("react-hooks", r"\buse(State|Effect|Memo|Callback|Context|Reducer|Ref|LayoutEffect)\s*\("),
        pattern("custom-hook", r"\b(function|const)\s+use[A-Z]\w*"),
        pattern(
            "api-get",
            r"(\b(app|router|server)\.get\s*\(|export\s+(async\s+)?function\s+GET\b|#\[get\(|@(Get|GetMapping)\b)",
        ),
        pattern(
            "api-post",
            r"(\b(app|router|server)\.post\s*\(|export\s+(async\s+)?function\s+POST\b|#\[post\(|@(Post|PostMapping)\b)",
        ),
        pattern(
            "api-put",
            r"(\b(app|router|server)\.put\s*\(|export\s+(async\s+)?function\s+PUT\b|#\[put\(|@(Put|PutMapping)\b)",
        ),
        pattern(
            "api-delete",
            r"(\b(app|router|server)\.delete\s*\(|export\s+(async\s+)?function\s+DELETE\b|#\[delete\(|@(Delete|DeleteMapping)\b)",
        ),
        pattern(
            "api-patch",
            r"(\b(app|router|server)\.patch\s*\(|export\s+(async\s+)?function\s+PATCH\b|#\[patch\(|@(Patch|PatchMapping)\b)",
        ),
        pattern(
            "schema-ddl",
            r"(?i)\b(create|alter|drop)\s+(table|index|view|schema)\b",
        ),
        pattern(
            "error-handling",
            r"(\btry\s*\{|\bcatch\s*\(|\bexcept\s+\w*|\bthrow\s+new\b|\.map_err\(|Result<|\braise\s+\w+)",
        ),
        pattern(
            "authentication",
            r"(?i)\b(auth\w*|jwt|oauth\w*|login|logout|password|credential\w*|bearer)\b",
        ),
        pattern("caching", r"(?i)\b(cache\w*|memoi[sz]e\w*|redis|ttl)\b"),
        pattern(
            "routing",
            r"(?i)(<Route\b|\bcreateBrowserRouter\b|\buseNavigate\b|\bnavigate\s*\(|\bredirect\s*\(|\broutes?\s*[:=])",
        ),
        pattern(
            "data-fetching",
            r"(\bfetch\s*\(|\baxios\.\w+|\buseQuery\b|\buseSWR\b|\breqwest::|\bgetServerSideProps\b|\bhttp\.(Get|Post)\b)",
        ),
        pattern("async-flow", r"\b(async\s+fn|async\s+function|await\b|\.await\b|Promise\.all)"),
        pattern("logging", r"(\bconsole\.(log|warn|error)\b|\b(tracing|log)::|\blogger\.\w+|\b(debug|info|warn|error)!\()"),
    ]
});

/// Only the added and removed lines of a diff, without file headers.
fn changed_content(diff: &str) -> String {
    diff.lines()
        .filter(|line| {
            (line.starts_with('+') || line.starts_with('-'))
                && !line.starts_with("+++")
                && !line.starts_with("---")
        })
        .map(|line| &line[1..])
        .collect::<Vec<_>>()
        .join("\n")
}

/// Detect semantic patterns in a diff, plus path-derived signals.
pub fn analyze_semantic_changes(diff: &str, path: &str) -> BTreeSet<String> {
    let content = changed_content(diff);
    let mut tags: BTreeSet<String> = PATTERNS
        .iter()
        .filter(|p| p.regex.is_match(&content))
        .map(|p| p.tag.to_string())
        .collect();

    let lower = path.to_lowercase();
    if lower.contains("/api/") || lower.starts_with("api/") || lower.contains("/routes/") {
        tags.insert("api-route".to_string());
    }
    if lower.contains("migrations/") || lower.contains("migrate") {
        tags.insert("database-migration".to_string());
    }
    if lower.contains("/components/") {
        tags.insert("ui-component".to_string());
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_react_hooks_and_fetching() {
        let diff = "+  const [user, setUser] = useState(null);\n+  useEffect(() => { fetch('/api/user') }, []);\n";
        let tags = analyze_semantic_changes(diff, "src/components/Profile.tsx");
        assert!(tags.contains("react-hooks"));
        assert!(tags.contains("data-fetching"));
        assert!(tags.contains("ui-component"));
    }

    #[test]
    fn test_detects_route_handlers_by_verb() {
        let diff = "+export async function POST(req) {\n+  return Response.json({})\n+}\n";
        let tags = analyze_semantic_changes(diff, "app/api/users/route.ts");
        assert!(tags.contains("api-post"));
        assert!(!tags.contains("api-get"));
        assert!(tags.contains("api-route"));
    }

    #[test]
    fn test_detects_schema_ddl() {
        let diff = "+CREATE TABLE orders (\n+  id SERIAL PRIMARY KEY\n+);\n";
        let tags = analyze_semantic_changes(diff, "db/migrations/001_orders.sql");
        assert!(tags.contains("schema-ddl"));
        assert!(tags.contains("database-migration"));
    }

    #[test]
    fn test_context_lines_are_ignored() {
        let diff = " try {\n   doThing();\n } catch (e) {}\n+const x = 1;\n";
        let tags = analyze_semantic_changes(diff, "src/a.js");
        assert!(!tags.contains("error-handling"));
    }

    #[test]
    fn test_file_headers_are_ignored() {
        let diff = "--- a/src/auth.rs\n+++ b/src/auth.rs\n+let x = 1;\n";
        let tags = analyze_semantic_changes(diff, "src/auth.rs");
        assert!(!tags.contains("authentication"));
    }
}
