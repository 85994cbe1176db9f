//! Release insights, changelog assembly, rendering and writing.

pub mod insights;
pub mod render;
pub mod writer;

pub use insights::ReleaseInsights;
pub use render::{
    ChangelogDocument, ChangelogEntry, OutputFormat, RenderOptions, assemble_changelog,
    format_entry_line, render, render_json, render_markdown, sort_for_changelog,
};
pub use writer::write_changelog;
