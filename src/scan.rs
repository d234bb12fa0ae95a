//! Filesystem scanning: corpus discovery.
//!
//! Stage 1 of the build pipeline. Walks the content root and discovers
//! article source files, deriving each file's slug and folder category.
//!
//! ## Directory Structure
//!
//! ```text
//! content/                         # Content root
//! ├── config.toml                  # Site configuration (optional)
//! ├── hello-world.mdx              # Uncategorized article (no folder)
//! ├── tech/                        # Category directory
//! │   ├── rust-notes.mdx           # category = "tech"
//! │   └── deep/older-notes.mdx     # category = "deep" (nearest directory)
//! ├── essay/                       # The essay category (timeline layout)
//! │   └── rainy-evening.mdx
//! └── test/                        # Reserved: draft content, excluded in
//!     └── test-styles.mdx          # production unless overridden
//! ```
//!
//! ## Conventions
//!
//! - The slug is the file stem and must be unique across the whole corpus;
//!   a duplicate anywhere in the tree is a scan error.
//! - A file's category is the lower-cased name of its **nearest** enclosing
//!   directory under the root. Root-level files have no category.
//! - Recognized article extensions: `.md` and `.mdx`.
//!
//! ## Test-content filtering
//!
//! Draft content lives alongside real content under the reserved `test`
//! category or a `test` slug prefix. In production mode those sources are
//! dropped from the scan result unless [`ScanOptions::include_tests`] is
//! set, so drafts never ship by accident but remain one flag away.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("duplicate slug `{slug}`: {first} and {second}")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Reserved category name for draft/test content.
pub const TEST_CATEGORY: &str = "test";

/// Reserved slug prefix for draft/test content.
pub const TEST_PREFIX: &str = "test";

const ARTICLE_EXTENSIONS: &[&str] = &["md", "mdx"];

/// Execution-mode switches for the scan.
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// Production mode drops reserved test content from the result.
    pub production: bool,
    /// Override: keep test content even in production mode.
    pub include_tests: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            production: true,
            include_tests: false,
        }
    }
}

impl ScanOptions {
    fn excludes_tests(&self) -> bool {
        self.production && !self.include_tests
    }
}

/// A discovered article file, prior to metadata resolution.
#[derive(Debug, Clone)]
pub struct ArticleSource {
    pub path: PathBuf,
    /// File stem; the article's identity across the whole system.
    pub slug: String,
    /// Lower-cased name of the nearest enclosing directory under the root,
    /// `None` for root-level files.
    pub folder_category: Option<String>,
}

impl ArticleSource {
    fn is_test_content(&self) -> bool {
        self.slug.starts_with(TEST_PREFIX)
            || self
                .folder_category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(TEST_CATEGORY))
    }
}

/// Walk `root` and return every article source in deterministic
/// (lexicographic) traversal order.
pub fn scan_corpus(root: &Path, options: &ScanOptions) -> Result<Vec<ArticleSource>, ScanError> {
    let mut sources = Vec::new();
    let mut seen: HashMap<String, PathBuf> = HashMap::new();

    let walker = WalkDir::new(root).sort_by_file_name();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_article(entry.path()) {
            continue;
        }

        let path = entry.path().to_path_buf();
        let slug = match path.file_stem() {
            Some(stem) => stem.to_string_lossy().to_string(),
            None => continue,
        };
        let folder_category = folder_category(&path, root);

        let source = ArticleSource {
            path,
            slug,
            folder_category,
        };
        if options.excludes_tests() && source.is_test_content() {
            continue;
        }

        if let Some(first) = seen.get(&source.slug) {
            return Err(ScanError::DuplicateSlug {
                slug: source.slug,
                first: first.clone(),
                second: source.path,
            });
        }
        seen.insert(source.slug.clone(), source.path.clone());
        sources.push(source);
    }

    Ok(sources)
}

fn is_article(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    ARTICLE_EXTENSIONS.contains(&ext.as_str())
}

/// The nearest enclosing directory name under `root`, lower-cased.
fn folder_category(path: &Path, root: &Path) -> Option<String> {
    let parent = path.parent()?;
    if parent == root {
        return None;
    }
    parent
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
}
