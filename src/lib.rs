//! # Glasspress
//!
//! A minimal static site generator for a markdown personal blog. Your
//! filesystem is the data source: directories become categories, dates fall
//! back to file timestamps, and articles are markdown files with a YAML
//! front-matter header.
//!
//! # Architecture: Content Pipeline + Transition Machine
//!
//! The crate has two independent cores. The **content resolution pipeline**
//! turns a directory tree into rendered pages through three stages:
//!
//! ```text
//! 1. Scan      content/  →  ArticleSource[]   (filesystem → discovered files)
//! 2. Resolve   sources   →  Corpus            (front-matter + fallbacks → sorted metadata)
//! 3. Render    corpus    →  dist/             (final HTML site)
//! ```
//!
//! Each stage is as pure a function as the domain allows: the scan is the
//! only stage that walks directories, resolution takes filesystem
//! timestamps as plain values ([`metadata::FileTimes`]), and rendering is a
//! function of the loaded corpus. Unit tests exercise resolution logic
//! without touching real file clocks.
//!
//! The **view transition state machine** ([`transition`]) is the
//! client-runtime model for the card-to-detail shared-element animation.
//! It shares no state with the pipeline; it is included here because its
//! ordering rules (re-entrancy, the measurement handshake, forced reset)
//! are the behavioral contract the UI layer must drive.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1 — walks the content root, derives slugs and folder categories, filters test content |
//! | [`frontmatter`] | Fenced YAML header parsing; typed `date`/`time`/`updated` sentinels |
//! | [`metadata`] | Stage 2 — canonical per-article metadata with filesystem fallbacks |
//! | [`corpus`] | The immutable, slug-indexed collection; sorted listings; process cache |
//! | [`outline`] | Heading outline extraction and anchor slug generation |
//! | [`render`] | Stage 3 — renders the final HTML site with Maud |
//! | [`transition`] | The shared-element view transition state machine |
//! | [`config`] | `config.toml` loading: site title, default author, category labels |
//! | [`output`] | CLI output formatting — inventory display of pipeline results |
//!
//! # Design Decisions
//!
//! ## The Filesystem Is the Database, Once
//!
//! Directory walks and front-matter parses happen exactly once per load,
//! producing an immutable [`corpus::Corpus`] (a sorted vector indexed by
//! slug). Every listing and lookup is a read against that snapshot, so two
//! queries can never disagree about order or contents. A process-wide
//! write-once cache ([`corpus::cached`]) memoizes the load; its only
//! invalidation is the explicit [`corpus::reset_cache`] hook.
//!
//! ## Sentinels Become Types at the Edge
//!
//! Front-matter overloads its string values (`time: auto`, `time: "09:30"`,
//! `time: morning`). Those are decided once, at parse time, into tagged
//! variants — resolution and rendering never re-interpret raw strings, so
//! a sentinel cannot mean two things in two places.
//!
//! ## The Transition Is an Explicit Automaton
//!
//! The original animation logic was scattered across UI effect callbacks;
//! here it is a transition table over (phase × event) that returns the
//! side effects to perform. The machine never reads a clock — callers pass
//! `now` in — which makes the "stuck overlay" class of bug testable and
//! excluded by construction.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): compile-time
//! checked templates, type-safe interpolation, XSS-safe escaping by
//! default, and no runtime template directory to ship or get out of sync.

pub mod config;
pub mod corpus;
pub mod frontmatter;
pub mod metadata;
pub mod outline;
pub mod output;
pub mod render;
pub mod scan;
pub mod transition;

#[cfg(test)]
pub(crate) mod test_helpers;
