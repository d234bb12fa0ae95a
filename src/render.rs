//! Stage 3: render the corpus into the final HTML site.
//!
//! HTML is generated with Maud: templates are compile-time checked Rust
//! expressions and all interpolation is auto-escaped. Article bodies go
//! through pulldown-cmark with the crate-wide extension set from
//! [`crate::outline::markdown_options`].
//!
//! ## Outline matching
//!
//! The table of contents and the body anchors must agree: the renderer
//! re-walks the body's heading events and injects `id` attributes taken
//! from the same outline the TOC is built from, in document order. Both
//! sides parse identical input with identical options, so the sequences
//! line up; the anchors are the stable URL-fragment contract.
//!
//! ## Output layout
//!
//! ```text
//! dist/
//! ├── index.html               # All categories except essay
//! ├── essays.html              # Chronological essay timeline
//! ├── 404.html                 # Not-found page
//! ├── category/<cat>/index.html
//! └── posts/<slug>.html
//! ```

use crate::config::SiteConfig;
use crate::corpus::{self, Corpus, CorpusError};
use crate::metadata::ArticleMeta;
use crate::outline::{self, HeadingNode};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd, html as cmark_html};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Corpus(#[from] CorpusError),
}

/// What got written, for CLI display.
#[derive(Debug)]
pub struct SiteSummary {
    pub articles: usize,
    pub categories: Vec<String>,
    pub essays: usize,
}

/// Render the whole site into `out_dir`.
pub fn write_site(
    corpus: &Corpus,
    config: &SiteConfig,
    out_dir: &Path,
) -> Result<SiteSummary, RenderError> {
    fs::create_dir_all(out_dir)?;

    // The home index lists everything except essays; the essay timeline
    // is its own page.
    let front_page: Vec<&ArticleMeta> = corpus
        .list(None)
        .into_iter()
        .map(|a| &a.meta)
        .filter(|m| !m.is_essay())
        .collect();
    write_page(
        &out_dir.join("index.html"),
        index_page(&front_page, config, &config.title, ""),
    )?;

    let mut categories = Vec::new();
    for category in corpus.categories() {
        if category.eq_ignore_ascii_case(crate::metadata::ESSAY_CATEGORY) {
            continue;
        }
        let listed: Vec<&ArticleMeta> = corpus
            .list(Some(category))
            .into_iter()
            .map(|a| &a.meta)
            .collect();
        let entry = config.category_entry(category);
        let title = entry
            .map(|e| e.title.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| config.category_label(category));
        let description = entry.map(|e| e.description.clone()).unwrap_or_default();
        let dir = out_dir.join("category").join(category);
        fs::create_dir_all(&dir)?;
        write_page(
            &dir.join("index.html"),
            index_page(&listed, config, &title, &description),
        )?;
        categories.push(category.to_string());
    }

    let posts_dir = out_dir.join("posts");
    fs::create_dir_all(&posts_dir)?;
    let mut articles = 0;
    for article in corpus.iter() {
        let headings = outline::extract_headings(&article.body);
        write_page(
            &posts_dir.join(format!("{}.html", article.meta.slug)),
            article_page(&article.meta, &article.body, &headings, config),
        )?;
        articles += 1;
    }

    let essays = write_essay_feed(corpus, config, out_dir)?;
    write_page(&out_dir.join("404.html"), not_found_page(config))?;

    Ok(SiteSummary {
        articles,
        categories,
        essays,
    })
}

fn write_essay_feed(
    corpus: &Corpus,
    config: &SiteConfig,
    out_dir: &Path,
) -> Result<usize, RenderError> {
    let entries = corpus.list_with_content(Some(crate::metadata::ESSAY_CATEGORY));
    let metas: Vec<&ArticleMeta> = entries.iter().map(|(m, _)| *m).collect();
    let bodies: Vec<&str> = entries.iter().map(|(_, b)| *b).collect();
    // Misalignment here would attach the wrong date to the wrong rendered
    // body; refuse to build instead.
    corpus::check_feed_alignment(&metas, &bodies)?;

    write_page(
        &out_dir.join("essays.html"),
        essay_feed_page(&entries, config),
    )?;
    Ok(entries.len())
}

fn write_page(path: &Path, markup: Markup) -> Result<(), RenderError> {
    fs::write(path, markup.into_string())?;
    Ok(())
}

// ============================================================================
// Body rendering
// ============================================================================

/// Render an article body to HTML, stamping outline slugs onto the level
/// 2-4 headings as `id` attributes.
pub fn body_html(body: &str, headings: &[HeadingNode]) -> String {
    let mut anchors = headings.iter();
    let events = Parser::new_ext(body, outline::markdown_options()).map(|event| match event {
        Event::Start(Tag::Heading { level, .. }) if in_outline(level) => {
            match anchors.next() {
                Some(h) => Event::Html(
                    format!("<h{} id=\"{}\">", heading_depth(level), h.slug).into(),
                ),
                // Outline shorter than the document; render bare rather
                // than mislabel.
                None => Event::Html(format!("<h{}>", heading_depth(level)).into()),
            }
        }
        Event::End(TagEnd::Heading(level)) if in_outline(level) => {
            Event::Html(format!("</h{}>", heading_depth(level)).into())
        }
        other => other,
    });

    let mut out = String::with_capacity(body.len() * 2);
    cmark_html::push_html(&mut out, events);
    out
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn in_outline(level: HeadingLevel) -> bool {
    matches!(
        level,
        HeadingLevel::H2 | HeadingLevel::H3 | HeadingLevel::H4
    )
}

// ============================================================================
// Pages
// ============================================================================

fn page_shell(title: &str, config: &SiteConfig, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="stylesheet" href={ (config.base_url) "styles.css" };
            }
            body {
                header.site-header {
                    a.site-title href=(config.base_url) { (config.title) }
                }
                main { (content) }
            }
        }
    }
}

fn article_page(
    meta: &ArticleMeta,
    body: &str,
    headings: &[HeadingNode],
    config: &SiteConfig,
) -> Markup {
    let rendered = body_html(body, headings);
    let title = if meta.title.is_empty() {
        meta.slug.as_str()
    } else {
        meta.title.as_str()
    };
    page_shell(
        title,
        config,
        html! {
            div.article-layout {
                @if !headings.is_empty() {
                    aside.toc { (toc(headings)) }
                }
                article.article {
                    header.article-header {
                        h1 { (title) }
                        @if !meta.description.is_empty() {
                            p.description { (meta.description) }
                        }
                        p.meta-line {
                            time datetime=(meta.date) { (meta.date) }
                            @if let Some(time) = meta.time {
                                span.time { (time) }
                            }
                            @if let Some(updated) = meta.updated {
                                span.updated { "updated " (updated) }
                            }
                            @if !meta.author.is_empty() {
                                span.author { (meta.author) }
                            }
                            @if let Some(category) = &meta.category {
                                a.category
                                    href={ (config.base_url) "category/" (category) "/" } {
                                    (config.category_label(category))
                                }
                            }
                        }
                    }
                    div.article-body { (PreEscaped(rendered)) }
                }
            }
        },
    )
}

fn toc(headings: &[HeadingNode]) -> Markup {
    html! {
        nav.table-of-contents {
            ul {
                @for heading in headings {
                    li class={ "toc-level-" (heading.level) } {
                        a href={ "#" (heading.slug) } { (heading.text) }
                    }
                }
            }
        }
    }
}

fn index_page(
    metas: &[&ArticleMeta],
    config: &SiteConfig,
    title: &str,
    description: &str,
) -> Markup {
    page_shell(
        title,
        config,
        html! {
            h1 { (title) }
            @if !description.is_empty() {
                p.category-description { (description) }
            }
            @if metas.is_empty() {
                p.empty { "Nothing here yet." }
            }
            div.card-grid {
                @for meta in metas {
                    a.card href={ (config.base_url) "posts/" (meta.slug) ".html" } {
                        div.card-meta {
                            time datetime=(meta.date) { (meta.date) }
                            @if let Some(category) = &meta.category {
                                span.category { (config.category_label(category)) }
                            }
                        }
                        h2 { (if meta.title.is_empty() { &meta.slug } else { &meta.title }) }
                        @if !meta.description.is_empty() {
                            p.card-description { (meta.description) }
                        }
                    }
                }
            }
        },
    )
}

fn essay_feed_page(entries: &[(&ArticleMeta, &str)], config: &SiteConfig) -> Markup {
    let label = config.category_label(crate::metadata::ESSAY_CATEGORY);
    page_shell(
        &label,
        config,
        html! {
            h1 { (label) }
            div.timeline {
                @for (meta, body) in entries {
                    article.timeline-entry {
                        div.timeline-meta {
                            time datetime=(meta.date) { (meta.date) }
                            @if let Some(time) = meta.time {
                                span.period { (time) }
                            }
                        }
                        // Essays are short and untitled; render inline,
                        // no TOC anchors needed.
                        div.timeline-body { (PreEscaped(body_html(body, &[]))) }
                    }
                }
            }
        },
    )
}

fn not_found_page(config: &SiteConfig) -> Markup {
    page_shell(
        "Not found",
        config,
        html! {
            div.not-found {
                h1 { "404" }
                p { "This article does not exist, or has drifted away." }
                a href=(config.base_url) { "Back to the index" }
            }
        },
    )
}
