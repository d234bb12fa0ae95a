use clap::{Parser, Subcommand};
use glasspress::corpus::Corpus;
use glasspress::scan::ScanOptions;
use glasspress::{config, output, render};
use std::path::PathBuf;

/// Shared flags for commands that scan content.
#[derive(clap::Args, Clone)]
struct ScanArgs {
    /// Include reserved test content (category `test` or `test` slug prefix)
    #[arg(long)]
    include_tests: bool,
}

impl ScanArgs {
    fn options(&self) -> ScanOptions {
        ScanOptions {
            production: true,
            include_tests: self.include_tests,
        }
    }
}

#[derive(Parser)]
#[command(name = "glasspress")]
#[command(about = "Static site generator for a markdown personal blog")]
#[command(long_about = "\
Static site generator for a markdown personal blog

Articles are markdown files with YAML front-matter. Directories become
categories, dates fall back to file timestamps, and the essay category
renders as a chronological timeline.

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  ├── hello-world.mdx              # Uncategorized article
  ├── tech/                        # Category directory (name = category)
  │   └── rust-notes.mdx
  ├── essay/                       # Essays: untitled, timeline layout,
  │   └── rainy-evening.mdx        #   day-period labels instead of clocks
  └── test/                        # Draft content, excluded in production
      └── test-styles.mdx          #   (also: any `test`-prefixed slug)

Front-matter keys (all optional):
  title, description, author, category
  date:     YYYY-MM-DD (falls back to file creation time)
  time:     HH:MM | auto | late-night/morning/noon/afternoon/evening
  updated:  YYYY-MM-DD | auto (hidden when equal to date)

Run 'glasspress gen-config' to print a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan and resolve the corpus, writing a metadata manifest
    Scan(ScanArgs),
    /// Run the full pipeline: scan → resolve → render HTML
    Build(ScanArgs),
    /// Validate all content (including drafts) without building
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Scan(scan_args) => {
            let site_config = config::load_config(&cli.source)?;
            let corpus = Corpus::load(&cli.source, &scan_args.options(), &site_config)?;
            std::fs::create_dir_all(&cli.output)?;
            let metas: Vec<_> = corpus.iter().map(|a| &a.meta).collect();
            let manifest_path = cli.output.join("manifest.json");
            std::fs::write(&manifest_path, serde_json::to_string_pretty(&metas)?)?;
            output::print_corpus_summary(&corpus, &cli.source);
            println!("Manifest: {}", manifest_path.display());
        }
        Command::Build(scan_args) => {
            let site_config = config::load_config(&cli.source)?;

            println!("==> Stage 1: Scanning {}", cli.source.display());
            let corpus = Corpus::load(&cli.source, &scan_args.options(), &site_config)?;
            output::print_corpus_summary(&corpus, &cli.source);

            println!("==> Stage 2: Rendering → {}", cli.output.display());
            let summary = render::write_site(&corpus, &site_config, &cli.output)?;
            output::print_build_summary(&summary);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            let site_config = config::load_config(&cli.source)?;
            println!("==> Checking {}", cli.source.display());
            // Drafts are validated too; they are content, just unshipped.
            let options = ScanOptions {
                production: false,
                include_tests: true,
            };
            let corpus = Corpus::load(&cli.source, &options, &site_config)?;
            output::print_corpus_summary(&corpus, &cli.source);
            if !corpus.skipped.is_empty() {
                return Err(format!(
                    "{} article(s) failed to resolve",
                    corpus.skipped.len()
                )
                .into());
            }
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
