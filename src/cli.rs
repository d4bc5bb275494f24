//! CLI module - Command-line interface definitions and handlers

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::core::paths::find_repo_root;
use crate::core::render::{OutputFormat, RenderConfig};
use crate::core::rules::DEFAULT_IGNORE_FILE;
use crate::core::tokenizer::TokenModel;
use crate::flows::concat::{run_concat, ConcatOptions, OutputTarget, DEFAULT_OUTPUT};

/// repotext - concatenate a project's text files into a single document.
#[derive(Parser, Debug)]
#[command(name = "repotext")]
#[command(
    author,
    version,
    about,
    long_about = r##"repotext walks a project tree and writes every text file into one document,
skipping whatever the ignore file (default: .gitignore) excludes.

Ignored directories are never descended into. Files are emitted depth-first,
files before subdirectories, each sorted by name, so output is reproducible.
A file that cannot be read becomes an error block; the scan continues.

Output formats:
- text: "# File: <path>" headers separated by "---" (default)
- md: Markdown headings with fenced content
- json: a single JSON array of records
- jsonl: one JSON record per line

Examples:
    repotext
    repotext --root ../service -o service.txt
    repotext --format md -e '*.lock' -e 'docs/'
    repotext -o - | wc -c
"##
)]
pub struct Cli {
    /// Root directory to scan.
    #[arg(
        long,
        value_name = "ROOT",
        long_help = "Root directory to scan.\n\n\
If omitted, the nearest ancestor of the current directory that contains a .git\n\
entry is used, falling back to the current directory. Emitted paths are relative\n\
to this root."
    )]
    pub root: Option<PathBuf>,

    /// Ignore-pattern file.
    #[arg(
        long,
        default_value = DEFAULT_IGNORE_FILE,
        value_name = "FILE",
        long_help = "Ignore-pattern file, relative to ROOT unless absolute.\n\n\
Blank lines and lines starting with '#' are skipped. A missing file means no\n\
user rules; builtin names (.git, caches, the output file) are always ignored."
    )]
    pub ignore_file: PathBuf,

    /// Output file ("-" for stdout).
    #[arg(
        short,
        long,
        default_value = DEFAULT_OUTPUT,
        value_name = "PATH",
        long_help = "Where to write the document. Use '-' to write to stdout; progress lines\n\
then go to stderr. The output file name is always ignored during the scan."
    )]
    pub output: PathBuf,

    /// Output format (text/md/json/jsonl).
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: String,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(long)]
    pub pretty: bool,

    /// Extra ignore pattern (repeatable).
    #[arg(
        short,
        long = "exclude",
        value_name = "PATTERN",
        long_help = "Extra ignore pattern, same syntax as the ignore file. Applied after the\n\
file's rules, so it wins under last-match-wins. May be repeated."
    )]
    pub excludes: Vec<String>,

    /// Stop entering new directories after N files.
    #[arg(
        long,
        value_name = "N",
        long_help = "Soft limit on emitted files. Checked before entering each directory;\n\
a directory already entered is always written in full."
    )]
    pub max_files: Option<usize>,

    /// Token model for the summary estimate.
    #[arg(long = "tokens", default_value = "cl100k", value_name = "MODEL")]
    pub token_model: String,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,

    /// Quiet mode (no progress lines).
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose mode (debug diagnostics on stderr).
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,
}

impl Cli {
    /// Resolve CLI flags into flow options
    pub fn into_options(self) -> Result<ConcatOptions> {
        let format: OutputFormat = self
            .format
            .parse()
            .map_err(anyhow::Error::msg)
            .context("Invalid --format")?;
        let token_model: TokenModel = self
            .token_model
            .parse()
            .map_err(anyhow::Error::msg)
            .context("Invalid --tokens")?;

        let root = match self.root {
            Some(root) => root,
            None => {
                let cwd = std::env::current_dir().context("Cannot determine current directory")?;
                find_repo_root(&cwd).unwrap_or(cwd)
            }
        };
        // Keep the given path if it cannot be resolved; the scan reports it
        let root = root.canonicalize().unwrap_or(root);

        Ok(ConcatOptions {
            root,
            ignore_file: self.ignore_file,
            output: OutputTarget::parse(&self.output),
            render: RenderConfig::with_pretty(format, self.pretty),
            excludes: self.excludes,
            max_files: self.max_files,
            token_model,
            quiet: self.quiet,
        })
    }
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let options = cli.into_options()?;
    run_concat(&options)?;
    Ok(())
}
