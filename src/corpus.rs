//! The article corpus: an immutable, queryable in-memory collection.
//!
//! Stage 2 of the build pipeline. [`Corpus::load`] runs the scan, parses
//! front-matter, resolves metadata, and produces a collection that is
//! sorted once and indexed by slug. All listing queries are reads against
//! that snapshot, so repeated queries can never reorder or disagree.
//!
//! ## Listing order
//!
//! Articles sort descending by date, then by resolved time within the day
//! (articles without a time sort as midnight; day-period labels order by
//! their anchor hour). Ties keep scan order — the sort is stable and
//! performed exactly once at load, so re-running a build cannot shuffle
//! same-day articles.
//!
//! ## Failure isolation
//!
//! A file with malformed front-matter fails alone: it is skipped, recorded
//! on [`Corpus::skipped`] with its path and reason, and reported by the
//! CLI. One bad draft cannot take down the whole site build.
//!
//! ## Process-wide cache
//!
//! [`cached`] memoizes the first successful load for the lifetime of the
//! process (the corpus only changes when files change, and picking that up
//! requires a new build anyway). The cache is write-once and explicit:
//! [`reset_cache`] exists for tests and long-lived callers, and there is
//! deliberately no other invalidation.

use crate::config::SiteConfig;
use crate::frontmatter;
use crate::metadata::{self, ArticleMeta, FileTimes};
use crate::scan::{self, ArticleSource, ScanError, ScanOptions};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("article not found: {0}")]
    NotFound(String),
    #[error(
        "essay feed misaligned: {expected} metadata entries vs {actual} bodies; offending: {}",
        .slugs.join(", ")
    )]
    FeedMisaligned {
        expected: usize,
        actual: usize,
        slugs: Vec<String>,
    },
}

/// A fully resolved article: canonical metadata plus the raw markdown body.
#[derive(Debug, Clone)]
pub struct Article {
    pub meta: ArticleMeta,
    pub body: String,
    /// Where this article came from; diagnostic display only.
    pub path: PathBuf,
}

/// A source file that failed resolution and was skipped.
#[derive(Debug, Clone)]
pub struct SkippedArticle {
    pub path: PathBuf,
    pub reason: String,
}

/// The loaded corpus. Immutable after construction.
#[derive(Debug)]
pub struct Corpus {
    /// Articles in listing order (date desc, time desc, scan order).
    articles: Vec<Article>,
    by_slug: HashMap<String, usize>,
    /// Files skipped during load, with reasons. Diagnostic only.
    pub skipped: Vec<SkippedArticle>,
}

impl Corpus {
    /// Scan `root`, resolve every article, and build the sorted corpus.
    pub fn load(
        root: &Path,
        options: &ScanOptions,
        config: &SiteConfig,
    ) -> Result<Corpus, CorpusError> {
        let sources = scan::scan_corpus(root, options)?;

        let mut articles = Vec::with_capacity(sources.len());
        let mut skipped = Vec::new();
        for source in &sources {
            match load_article(source, config) {
                Ok(article) => articles.push(article),
                Err(reason) => skipped.push(SkippedArticle {
                    path: source.path.clone(),
                    reason,
                }),
            }
        }

        // Stable sort: same-day ties keep scan order, every run alike.
        articles.sort_by(|a, b| b.meta.sort_key().cmp(&a.meta.sort_key()));

        let by_slug = articles
            .iter()
            .enumerate()
            .map(|(i, article)| (article.meta.slug.clone(), i))
            .collect();

        Ok(Corpus {
            articles,
            by_slug,
            skipped,
        })
    }

    /// All articles in listing order, optionally filtered by category
    /// (case-insensitive).
    pub fn list(&self, category: Option<&str>) -> Vec<&Article> {
        self.articles
            .iter()
            .filter(|a| matches_category(&a.meta, category))
            .collect()
    }

    /// Listing plus body content, for layouts that render articles inline.
    pub fn list_with_content(&self, category: Option<&str>) -> Vec<(&ArticleMeta, &str)> {
        self.articles
            .iter()
            .filter(|a| matches_category(&a.meta, category))
            .map(|a| (&a.meta, a.body.as_str()))
            .collect()
    }

    /// Look up one article by slug. A missing slug is a distinct
    /// [`CorpusError::NotFound`], not an I/O error.
    pub fn get(&self, slug: &str) -> Result<&Article, CorpusError> {
        self.by_slug
            .get(slug)
            .map(|&i| &self.articles[i])
            .ok_or_else(|| CorpusError::NotFound(slug.to_string()))
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Article> {
        self.articles.iter()
    }

    /// Every distinct category present, in listing order of first appearance.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for article in &self.articles {
            if let Some(category) = article.meta.category.as_deref() {
                if !seen.iter().any(|c: &&str| c.eq_ignore_ascii_case(category)) {
                    seen.push(category);
                }
            }
        }
        seen
    }
}

fn matches_category(meta: &ArticleMeta, category: Option<&str>) -> bool {
    match category {
        None => true,
        Some(wanted) => meta
            .category
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(wanted)),
    }
}

fn load_article(source: &ArticleSource, config: &SiteConfig) -> Result<Article, String> {
    let input = fs::read_to_string(&source.path).map_err(|e| e.to_string())?;
    let (raw, body) = frontmatter::parse(&source.path, &input).map_err(|e| e.to_string())?;
    let times = FileTimes::read(&source.path).map_err(|e| e.to_string())?;
    Ok(Article {
        meta: metadata::resolve(source, &raw, &times, config),
        body: body.to_string(),
        path: source.path.clone(),
    })
}

/// Assert that a metadata listing and its rendered-content counterpart
/// describe the same set: equal cardinality and a non-empty body for every
/// entry. A violation is fatal — silent misalignment would attach the wrong
/// metadata to the wrong rendered body.
pub fn check_feed_alignment(
    metas: &[&ArticleMeta],
    bodies: &[&str],
) -> Result<(), CorpusError> {
    if metas.len() != bodies.len() {
        return Err(CorpusError::FeedMisaligned {
            expected: metas.len(),
            actual: bodies.len(),
            slugs: metas.iter().map(|m| m.slug.clone()).collect(),
        });
    }
    let empty: Vec<String> = metas
        .iter()
        .zip(bodies)
        .filter(|(_, body)| body.trim().is_empty())
        .map(|(meta, _)| meta.slug.clone())
        .collect();
    if !empty.is_empty() {
        return Err(CorpusError::FeedMisaligned {
            expected: metas.len(),
            actual: bodies.len(),
            slugs: empty,
        });
    }
    Ok(())
}

static CACHE: RwLock<Option<Arc<Corpus>>> = RwLock::new(None);

/// Load the corpus through the process-wide write-once cache.
///
/// The first successful load wins; later calls return the same snapshot
/// regardless of arguments. Call [`reset_cache`] to force a reload.
pub fn cached(
    root: &Path,
    options: &ScanOptions,
    config: &SiteConfig,
) -> Result<Arc<Corpus>, CorpusError> {
    if let Some(corpus) = CACHE.read().unwrap().as_ref() {
        return Ok(Arc::clone(corpus));
    }
    let corpus = Arc::new(Corpus::load(root, options, config)?);
    let mut slot = CACHE.write().unwrap();
    // A racing loader may have filled the slot; first write wins.
    if let Some(existing) = slot.as_ref() {
        return Ok(Arc::clone(existing));
    }
    *slot = Some(Arc::clone(&corpus));
    Ok(corpus)
}

/// Clear the process-wide corpus cache. Intended for tests.
pub fn reset_cache() {
    *CACHE.write().unwrap() = None;
}
