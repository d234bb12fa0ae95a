//! CLI output formatting for the pipeline stages.
//!
//! Output is information-centric: the primary display for every article is
//! its semantic identity (listing position, title, date) with filesystem
//! paths as secondary `Source:` context lines. Skipped files always print,
//! with their reasons, so a bad draft is visible instead of silently gone.
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::corpus::Corpus;
use crate::render::SiteSummary;
use std::path::Path;

/// Summarize a loaded corpus: the article inventory plus skipped files.
pub fn format_corpus_summary(corpus: &Corpus, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Articles".to_string());
    for (i, article) in corpus.iter().enumerate() {
        let meta = &article.meta;
        let title = if meta.title.is_empty() {
            meta.slug.as_str()
        } else {
            meta.title.as_str()
        };
        let time = meta.time.map(|t| format!(" {t}")).unwrap_or_default();
        let category = meta
            .category
            .as_deref()
            .map(|c| format!(" [{c}]"))
            .unwrap_or_default();
        lines.push(format!("{:03} {title} ({}{time}){category}", i + 1, meta.date));
        let source = article
            .path
            .strip_prefix(root)
            .unwrap_or(&article.path);
        lines.push(format!("    Source: {}", source.display()));
    }
    if corpus.is_empty() {
        lines.push("    (none)".to_string());
    }

    if !corpus.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for skipped in &corpus.skipped {
            let source = skipped.path.strip_prefix(root).unwrap_or(&skipped.path);
            lines.push(format!("    {}", source.display()));
            lines.push(format!("        {}", skipped.reason));
        }
    }

    lines
}

pub fn print_corpus_summary(corpus: &Corpus, root: &Path) {
    for line in format_corpus_summary(corpus, root) {
        println!("{line}");
    }
}

/// Summarize what the render stage wrote.
pub fn format_build_summary(summary: &SiteSummary) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "Generated {} article pages, {} category pages, {} essays",
        summary.articles,
        summary.categories.len(),
        summary.essays
    ));
    for category in &summary.categories {
        lines.push(format!("    category/{category}/index.html"));
    }
    lines
}

pub fn print_build_summary(summary: &SiteSummary) {
    for line in format_build_summary(summary) {
        println!("{line}");
    }
}
