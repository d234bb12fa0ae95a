//! Heading outline extraction for table-of-contents generation.
//!
//! Parses an article body as a markdown event stream and collects headings
//! at levels 2-4 into a flat outline. Level-1 headings are document titles
//! and excluded; levels 5+ are too deep to navigate to.
//!
//! Each heading gets a URL-fragment slug derived from its flattened text.
//! Slugs double as in-page anchor ids in the rendered HTML, so extraction
//! must be deterministic and idempotent — identical input always yields
//! identical slugs, and existing deep links into a section keep working
//! across rebuilds. Do not change the slugification rules.
//!
//! The outline is a flat list; the heading tree is implicit in the level
//! sequence (a level-3 heading's parent is the nearest preceding heading
//! with a lower level) and reconstructed by consumers on demand.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One entry in a document's table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingNode {
    /// Heading depth, 2-4.
    pub level: u8,
    /// Flattened plain-text content (inline formatting concatenated).
    pub text: String,
    /// URL-fragment identifier, unique within the document.
    pub slug: String,
}

/// The markdown extension set used everywhere in the crate.
///
/// The outline extractor and the HTML renderer must parse with the same
/// options, or their heading sequences could disagree and anchors would
/// detach from the TOC.
pub fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options
}

/// Sequential, collision-resistant slug generator.
///
/// Two identical heading texts in one document receive distinct slugs: the
/// second occurrence of `foo` becomes `foo-1`, the third `foo-2`. Generated
/// slugs are also checked against every slug already handed out, so a
/// literal `foo-1` heading can never collide with a disambiguated one.
#[derive(Debug, Default)]
pub struct Slugger {
    counts: HashMap<String, usize>,
    produced: HashSet<String>,
}

impl Slugger {
    pub fn slug(&mut self, text: &str) -> String {
        let base = slug::slugify(text);
        let base = if base.is_empty() {
            "section".to_string()
        } else {
            base
        };
        let mut n = self.counts.get(&base).copied().unwrap_or(0);
        loop {
            let candidate = if n == 0 {
                base.clone()
            } else {
                format!("{base}-{n}")
            };
            n += 1;
            if self.produced.insert(candidate.clone()) {
                self.counts.insert(base, n);
                return candidate;
            }
        }
    }
}

fn depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

const MIN_LEVEL: u8 = 2;
const MAX_LEVEL: u8 = 4;

/// Extract the heading outline from an article body.
pub fn extract_headings(body: &str) -> Vec<HeadingNode> {
    let mut headings = Vec::new();
    let mut slugger = Slugger::default();
    // (level, accumulated text) while inside a heading
    let mut current: Option<(u8, String)> = None;

    for event in Parser::new_ext(body, markdown_options()) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some((depth(level), String::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, text)) = current.take() {
                    if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
                        let slug = slugger.slug(&text);
                        headings.push(HeadingNode { level, text, slug });
                    }
                }
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(&t);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((_, text)) = current.as_mut() {
                    text.push(' ');
                }
            }
            _ => {}
        }
    }

    headings
}
