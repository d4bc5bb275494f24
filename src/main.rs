//! repotext - Concatenate a project's text files into a single document
//!
//! repotext provides:
//! - Ignore-file pattern matching (globs, negation, directory-only rules)
//! - Depth-first tree collection with ignored subtrees pruned
//! - Per-file error isolation
//! - Text/Markdown/JSON output framing

use anyhow::Result;
use clap::Parser;
use tracing::Level;

mod backends;
mod cli;
mod core;
mod flows;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    cli::run(cli)
}
