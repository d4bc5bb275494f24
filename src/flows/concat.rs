//! Concat flow - Collect a tree and write it as one document
//!
//! Loads the ignore rules, walks the root, renders every record into the
//! output sink and reports a summary.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::backends::collect::TreeCollector;
use crate::core::paths::{basename, normalize_path, resolve};
use crate::core::render::{RenderConfig, Renderer};
use crate::core::rules::{RuleSet, DEFAULT_BUILTINS, DEFAULT_IGNORE_FILE};
use crate::core::tokenizer::{count_tokens, TokenModel};

/// Default output artifact name
pub const DEFAULT_OUTPUT: &str = "output.txt";

/// Where the rendered document goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Stdout,
}

impl OutputTarget {
    /// "-" selects stdout
    pub fn parse(value: &Path) -> Self {
        if value == Path::new("-") {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(value.to_path_buf())
        }
    }

    /// File name to add to the builtin ignore set
    fn artifact_name(&self) -> Option<String> {
        match self {
            OutputTarget::File(path) => Some(basename(&normalize_path(path)).to_string()),
            OutputTarget::Stdout => None,
        }
    }
}

/// Options for the concat flow
#[derive(Debug, Clone)]
pub struct ConcatOptions {
    /// Scan root
    pub root: PathBuf,
    /// Ignore-pattern file, relative to root unless absolute
    pub ignore_file: PathBuf,
    pub output: OutputTarget,
    pub render: RenderConfig,
    /// Extra patterns appended after the ignore file's rules
    pub excludes: Vec<String>,
    /// Stop entering directories once this many records exist
    pub max_files: Option<usize>,
    pub token_model: TokenModel,
    pub quiet: bool,
}

impl Default for ConcatOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            ignore_file: PathBuf::from(DEFAULT_IGNORE_FILE),
            output: OutputTarget::File(PathBuf::from(DEFAULT_OUTPUT)),
            render: RenderConfig::default(),
            excludes: Vec::new(),
            max_files: None,
            token_model: TokenModel::default(),
            quiet: false,
        }
    }
}

/// Concat run statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatSummary {
    pub files: usize,
    pub errors: usize,
    pub bytes: usize,
    pub tokens: usize,
    /// False when --max-files stopped the walk
    pub complete: bool,
}

/// Builtin names for a run: the defaults, `output.txt`, and the configured
/// artifact name when it differs
pub fn builtins_for(output: &OutputTarget) -> Vec<String> {
    let mut names: Vec<String> = DEFAULT_BUILTINS.iter().map(|s| s.to_string()).collect();
    names.push(DEFAULT_OUTPUT.to_string());
    names.extend(
        output
            .artifact_name()
            .filter(|name| name.as_str() != DEFAULT_OUTPUT),
    );
    names
}

/// Build the rule set for a run
pub fn load_rules(options: &ConcatOptions) -> Result<RuleSet> {
    let ignore_path = resolve(&options.root, &options.ignore_file);
    let mut rules = RuleSet::load(&ignore_path, builtins_for(&options.output))?;
    rules.extend(&options.excludes);
    Ok(rules)
}

/// Run the concat flow and return its summary
pub fn run_concat(options: &ConcatOptions) -> Result<ConcatSummary> {
    let rules = load_rules(options)?;

    // Progress goes to stderr when the document itself goes to stdout
    let to_stdout = options.output == OutputTarget::Stdout;
    let progress = |line: String| {
        if options.quiet {
            return;
        }
        if to_stdout {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    };

    progress(format!(
        "{} {}",
        "Scanning".green().bold(),
        options.root.display()
    ));
    let builtins: Vec<&str> = rules.builtins().collect();
    progress(format!(
        "Ignoring builtins [{}] and {} rule(s)",
        builtins.join(", "),
        rules.rules().len()
    ));
    for rule in rules.rules() {
        debug!(
            rule = %rule,
            negated = rule.is_negated(),
            dir_only = rule.is_dir_only(),
            anchored = rule.is_anchored(),
            "rule"
        );
    }

    let collector = TreeCollector::new(&options.root, &rules)?;
    let set = match options.max_files {
        Some(limit) => collector.collect_until(|records| records.len() >= limit)?,
        None => collector.collect()?,
    };

    let document = Renderer::with_config(options.render).render(&set);
    let summary = ConcatSummary {
        files: set.content_count(),
        errors: set.error_count(),
        bytes: document.len(),
        tokens: count_tokens(&document, options.token_model),
        complete: set.complete,
    };

    match &options.output {
        OutputTarget::Stdout => write_document(io::stdout().lock(), &document)
            .context("Failed to write output to stdout")?,
        OutputTarget::File(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            write_document(BufWriter::new(file), &document)
                .with_context(|| format!("Failed to write output file {}", path.display()))?;
        }
    }

    progress(format!(
        "Collected {} file(s), {} unreadable",
        summary.files, summary.errors
    ));
    if !summary.complete {
        progress(format!(
            "{} stopped early after reaching --max-files",
            "Note:".yellow().bold()
        ));
    }
    progress(format!(
        "Wrote {} bytes (~{} tokens, {})",
        summary.bytes, summary.tokens, options.token_model
    ));
    if let OutputTarget::File(path) = &options.output {
        progress(format!(
            "{} {}",
            "Repository content has been written to".green(),
            path.display()
        ));
    }

    Ok(summary)
}

fn write_document<W: Write>(mut writer: W, document: &str) -> io::Result<()> {
    writer.write_all(document.as_bytes())?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::OutputFormat;
    use std::fs;
    use tempfile::tempdir;

    fn options(root: &Path, output: &Path) -> ConcatOptions {
        ConcatOptions {
            root: root.to_path_buf(),
            output: OutputTarget::File(output.to_path_buf()),
            token_model: TokenModel::Heuristic,
            quiet: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_output_target_parse() {
        assert_eq!(OutputTarget::parse(Path::new("-")), OutputTarget::Stdout);
        assert_eq!(
            OutputTarget::parse(Path::new("out/all.txt")),
            OutputTarget::File(PathBuf::from("out/all.txt"))
        );
    }

    #[test]
    fn test_builtins_include_output_name() {
        let names = builtins_for(&OutputTarget::File(PathBuf::from("dist/bundle.md")));
        assert!(names.contains(&".git".to_string()));
        assert!(names.contains(&"bundle.md".to_string()));
        assert!(names.contains(&DEFAULT_OUTPUT.to_string()));

        let names = builtins_for(&OutputTarget::File(PathBuf::from(DEFAULT_OUTPUT)));
        assert_eq!(names.len(), DEFAULT_BUILTINS.len() + 1);
    }

    #[test]
    fn test_builtins_keep_default_output_for_stdout() {
        let names = builtins_for(&OutputTarget::Stdout);
        assert_eq!(names.len(), DEFAULT_BUILTINS.len() + 1);
        assert!(names.contains(&DEFAULT_OUTPUT.to_string()));

        let rules = RuleSet::compile(std::iter::empty::<&str>(), names);
        assert!(rules.is_ignored("output.txt", false));
        assert!(rules.is_ignored("nested/output.txt", false));
    }

    #[test]
    fn test_run_concat_writes_document() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("project");
        fs::create_dir_all(root.join("skip")).unwrap();
        fs::write(root.join("a.txt"), "hello").unwrap();
        fs::write(root.join("skip/b.txt"), "b").unwrap();
        fs::write(root.join(".gitignore"), "skip\n").unwrap();
        let output = temp.path().join("output.txt");

        let summary = run_concat(&options(&root, &output)).unwrap();
        let document = fs::read_to_string(&output).unwrap();

        assert_eq!(summary.files, 2); // a.txt and .gitignore
        assert_eq!(summary.errors, 0);
        assert!(summary.complete);
        assert_eq!(summary.bytes, document.len());
        assert!(document.contains("# File: a.txt\nhello\n"));
        assert!(!document.contains("b.txt"));
    }

    #[test]
    fn test_run_concat_output_inside_root_is_not_collected() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.txt"), "a").unwrap();
        let output = temp.path().join("bundle.txt");
        fs::write(&output, "stale").unwrap();

        run_concat(&options(temp.path(), &output)).unwrap();
        let document = fs::read_to_string(&output).unwrap();
        assert!(!document.contains("bundle.txt"));
        assert!(!document.contains("stale"));
    }

    #[test]
    fn test_run_concat_excludes_take_precedence() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("p");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("keep.log"), "k").unwrap();
        fs::write(root.join(".gitignore"), "!keep.log\n").unwrap();
        let output = temp.path().join("out.jsonl");

        let mut opts = options(&root, &output);
        opts.excludes = vec!["*.log".to_string(), ".gitignore".to_string()];
        opts.render = RenderConfig::new(OutputFormat::Jsonl);

        let summary = run_concat(&opts).unwrap();
        assert_eq!(summary.files, 0);
        assert_eq!(fs::read_to_string(&output).unwrap(), "");
    }

    #[test]
    fn test_run_concat_missing_root_fails() {
        let temp = tempdir().unwrap();
        let output = temp.path().join("output.txt");
        let result = run_concat(&options(&temp.path().join("nope"), &output));
        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_run_concat_max_files() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("p");
        fs::create_dir_all(root.join("d")).unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("d/b.txt"), "b").unwrap();
        let output = temp.path().join("output.txt");

        let mut opts = options(&root, &output);
        opts.max_files = Some(1);
        let summary = run_concat(&opts).unwrap();
        assert_eq!(summary.files, 1);
        assert!(!summary.complete);
    }
}
