//! changescribe - CLI entry point.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use semver::Version;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use changescribe::changelog::{
    OutputFormat, RenderOptions, assemble_changelog, render, write_changelog,
    writer::generate_summary,
};
use changescribe::git::{GitCli, discover_commits, open_repository, resolve_range};
use changescribe::llm::{ProviderKind, create_provider};
use changescribe::pipeline::{summarize_commits, summarize_working_tree};
use changescribe::summarize::{AnalysisMode, Metrics, Summarizer, SummarizerConfig};

/// Turn git history into a classified, AI-summarized changelog.
#[derive(Parser, Debug)]
#[command(name = "changescribe")]
#[command(about = "Turn git history into a classified, AI-summarized changelog")]
#[command(version)]
struct Cli {
    /// Start of commit range (tag, commit hash, or branch). Defaults to the latest release tag
    #[arg(long, conflicts_with = "working_tree")]
    from: Option<String>,

    /// End of commit range
    #[arg(long, default_value = "HEAD", conflicts_with = "working_tree")]
    to: String,

    /// Summarize uncommitted changes instead of a commit range
    #[arg(long)]
    working_tree: bool,

    /// Path to the generated changelog
    #[arg(short = 'o', long, default_value = "AI_CHANGELOG.md")]
    output: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,

    /// Analysis depth requested from the model (standard, detailed, enterprise)
    #[arg(long, default_value = "standard")]
    mode: AnalysisMode,

    /// Chat-completion provider
    #[arg(long, value_enum, default_value_t = ProviderKind::Claude)]
    provider: ProviderKind,

    /// Skip the AI provider and use rule-based summaries only
    #[arg(long)]
    no_ai: bool,

    /// Model name; overrides tier-based selection
    #[arg(long)]
    model: Option<String>,

    /// Version for the changelog heading (defaults to "Unreleased")
    #[arg(long = "set-version")]
    version: Option<Version>,

    /// Dry run - print changelog without writing
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("warn,changescribe=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Step 1: Open git repository
    let repo = open_repository(Path::new("."))
        .context("Not a git repository. Run changescribe from within a git repository.")?;
    let workdir = repo
        .workdir()
        .context("Bare repositories are not supported")?
        .to_path_buf();
    let runner = GitCli::new(&workdir);

    // Step 2: Set up summarization
    let provider = (!cli.no_ai).then(|| create_provider(cli.provider));
    let config = SummarizerConfig {
        mode: cli.mode,
        model_override: cli.model.clone(),
        ..Default::default()
    };
    let mut summarizer = Summarizer::new(provider.as_deref(), config);
    let mut metrics = Metrics::new();

    // Step 3: Ingest and summarize
    let commits = if cli.working_tree {
        eprintln!("Analyzing uncommitted changes...");
        summarize_working_tree(&runner, &workdir, &mut summarizer, &mut metrics).await
    } else {
        let range = resolve_range(&repo, cli.from.as_deref(), Some(&cli.to))
            .context("Failed to resolve commit range")?;
        eprintln!(
            "Analyzing commits from {} to {}...",
            range.from_ref, range.to_ref
        );

        let discovered = discover_commits(&repo, &range).context("Failed to fetch commits")?;
        if discovered.is_empty() {
            eprintln!("No changes found since {}. Nothing to add.", range.from_ref);
            return Ok(());
        }
        let merges = discovered.iter().filter(|c| c.parent_count > 1).count();
        if merges > 0 {
            eprintln!("Found {} commits ({} merges)", discovered.len(), merges);
        } else {
            eprintln!("Found {} commits", discovered.len());
        }
        for commit in &discovered {
            debug!(hash = %commit.hash, subject = %commit.subject, "Discovered commit");
        }

        let hashes: Vec<String> = discovered.into_iter().map(|c| c.hash).collect();
        summarize_commits(&runner, &hashes, &mut summarizer, &mut metrics).await
    };

    if commits.is_empty() {
        eprintln!("No changes to summarize. Nothing to add.");
        return Ok(());
    }

    // Step 4: Assemble and render
    let options = RenderOptions {
        version: cli.version.clone(),
        format: cli.format,
        ..Default::default()
    };
    let report = metrics.report();
    let document = assemble_changelog(commits, report, &options);
    let rendered = render(&document, options.format).context("Failed to render changelog")?;

    // Step 5: Write or display
    if cli.dry_run {
        println!("{}", rendered);
    } else {
        write_changelog(&cli.output, &rendered).context("Failed to write changelog")?;
        eprintln!("✓ {}", generate_summary(document.entries.len(), &cli.output));
    }

    debug!(?report, "Run complete");
    eprintln!("{}", report);

    Ok(())
}
