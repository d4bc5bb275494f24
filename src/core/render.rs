//! Renderer module
//!
//! Renders a RecordSet into an output sink: text, md, json or jsonl.
//! Every format keeps one self-delimited block per record with the path
//! before the content, and error blocks that read differently from content.

use std::io::{self, Write};

use crate::core::model::{FileRecord, Outcome, RecordSet};

/// Separator line written after every text block
pub const RECORD_SEPARATOR: &str = "---";

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Markdown,
    Json,
    Jsonl,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            "jsonl" => Ok(OutputFormat::Jsonl),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    #[allow(dead_code)]
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            pretty: false,
        }
    }

    /// Create a new render config with pretty option
    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// Renderer for record sets
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    #[allow(dead_code)]
    pub fn new(format: OutputFormat) -> Self {
        Self {
            config: RenderConfig::new(format),
        }
    }

    /// Create a new renderer with render config
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a record set to a string
    pub fn render(&self, set: &RecordSet) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.render_to(set, &mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Render to a writer
    pub fn render_to<W: Write>(&self, set: &RecordSet, mut writer: W) -> io::Result<()> {
        match self.config.format {
            OutputFormat::Text => {
                for record in &set.records {
                    write_text_block(&mut writer, record)?;
                }
            }
            OutputFormat::Markdown => {
                for record in &set.records {
                    write_markdown_block(&mut writer, record)?;
                }
            }
            OutputFormat::Json => {
                if self.config.pretty {
                    serde_json::to_writer_pretty(&mut writer, &set.records)?;
                } else {
                    serde_json::to_writer(&mut writer, &set.records)?;
                }
                writeln!(writer)?;
            }
            OutputFormat::Jsonl => {
                for record in &set.records {
                    if self.config.pretty {
                        serde_json::to_writer_pretty(&mut writer, record)?;
                    } else {
                        serde_json::to_writer(&mut writer, record)?;
                    }
                    writeln!(writer)?;
                }
            }
        }
        writer.flush()
    }
}

fn write_text_block<W: Write>(writer: &mut W, record: &FileRecord) -> io::Result<()> {
    match &record.outcome {
        Outcome::Content(content) => {
            writeln!(writer, "# File: {}", record.path)?;
            writeln!(writer, "{}", content)?;
        }
        Outcome::Error(message) => {
            writeln!(writer, "# Could not read file: {}", record.path)?;
            writeln!(writer, "# Error: {}", message)?;
        }
    }
    write!(writer, "\n{}\n\n", RECORD_SEPARATOR)
}

fn write_markdown_block<W: Write>(writer: &mut W, record: &FileRecord) -> io::Result<()> {
    writeln!(writer, "## `{}`\n", record.path)?;
    match &record.outcome {
        Outcome::Content(content) => {
            let fence = fence_for(content);
            writeln!(writer, "{}{}", fence, fence_language(&record.path))?;
            write!(writer, "{}", content)?;
            if !content.ends_with('\n') {
                writeln!(writer)?;
            }
            writeln!(writer, "{}", fence)?;
        }
        Outcome::Error(message) => {
            writeln!(writer, "> **Error:** {}", message)?;
        }
    }
    writeln!(writer)
}

/// A backtick fence longer than any backtick run in `content`
fn fence_for(content: &str) -> String {
    let longest = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(std::cmp::max(3, longest + 1))
}

/// Info string for a fenced block, taken from the file extension
fn fence_language(path: &str) -> &str {
    let name = crate::core::paths::basename(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            ext
        }
        _ => "",
    }
}
