//! Shared test utilities for the glasspress test suite.
//!
//! Provides fixture writers and corpus lookup helpers. Articles are plain
//! text, so fixtures are written inline by each test instead of copied from
//! a fixture directory — every test states exactly the corpus it needs.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! write_article(tmp.path(), "tech/post.mdx", "---\ndate: 2024-01-01\n---\nbody");
//!
//! let corpus = load_corpus(tmp.path());
//! let article = find_article(&corpus, "post");
//! assert_eq!(article.meta.category.as_deref(), Some("tech"));
//! ```

use crate::config::SiteConfig;
use crate::corpus::{Article, Corpus};
use crate::scan::ScanOptions;
use std::fs;
use std::path::Path;

/// Write one article file, creating parent directories as needed.
pub fn write_article(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Load a corpus with default options and config.
pub fn load_corpus(root: &Path) -> Corpus {
    Corpus::load(root, &ScanOptions::default(), &SiteConfig::default()).unwrap()
}

/// Find an article by slug. Panics with the available inventory on miss.
pub fn find_article<'a>(corpus: &'a Corpus, slug: &str) -> &'a Article {
    corpus.get(slug).unwrap_or_else(|_| {
        let slugs: Vec<&str> = corpus.iter().map(|a| a.meta.slug.as_str()).collect();
        panic!("article '{slug}' not found. Available: {slugs:?}")
    })
}

/// Slugs of a listing, in order.
pub fn listed_slugs(corpus: &Corpus, category: Option<&str>) -> Vec<String> {
    corpus
        .list(category)
        .iter()
        .map(|a| a.meta.slug.clone())
        .collect()
}
