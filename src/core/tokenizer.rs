//! Token counting for the run summary
//!
//! Uses tiktoken encodings (cl100k_base by default) with a fast heuristic
//! fallback when an encoding cannot be loaded.

use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;
use tiktoken_rs::{cl100k_base, o200k_base, CoreBPE};

/// Supported token models/encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenModel {
    /// cl100k_base encoding (GPT-4, GPT-3.5-turbo, Claude approximation)
    #[default]
    Cl100k,
    /// o200k_base encoding (GPT-4o)
    O200k,
    /// Fast heuristic estimation (no BPE encoding)
    Heuristic,
}

impl TokenModel {
    fn get_bpe(&self) -> Option<&'static CoreBPE> {
        match self {
            TokenModel::Cl100k => CL100K_BPE.as_ref().ok(),
            TokenModel::O200k => O200K_BPE.as_ref().ok(),
            TokenModel::Heuristic => None,
        }
    }

    pub fn available_models() -> &'static [&'static str] {
        &["cl100k", "o200k", "heuristic"]
    }
}

impl fmt::Display for TokenModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenModel::Cl100k => "cl100k",
            TokenModel::O200k => "o200k",
            TokenModel::Heuristic => "heuristic",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TokenModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cl100k" | "cl100k_base" | "gpt4" | "gpt-4" | "claude" | "default" => {
                Ok(TokenModel::Cl100k)
            }
            "o200k" | "o200k_base" | "gpt4o" | "gpt-4o" => Ok(TokenModel::O200k),
            "heuristic" | "fast" | "estimate" => Ok(TokenModel::Heuristic),
            _ => Err(format!(
                "Unknown model: {}. Available: {}",
                s,
                TokenModel::available_models().join(", ")
            )),
        }
    }
}

static CL100K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| cl100k_base().map_err(|e| format!("Failed to load cl100k_base: {}", e)));

static O200K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| o200k_base().map_err(|e| format!("Failed to load o200k_base: {}", e)));

/// Count tokens in text using the specified model
pub fn count_tokens(text: &str, model: TokenModel) -> usize {
    if text.is_empty() {
        return 0;
    }

    match model.get_bpe() {
        Some(bpe) => bpe.encode_with_special_tokens(text).len(),
        None => estimate_tokens_heuristic(text),
    }
}

/// Estimate tokens without BPE encoding.
///
/// ASCII words run about 4 characters per token, code punctuation about 2,
/// CJK about 1.5 and other non-ASCII about 2.
pub fn estimate_tokens_heuristic(text: &str) -> usize {
    let mut ascii_chars = 0usize;
    let mut symbols = 0usize;
    let mut cjk_chars = 0usize;
    let mut other = 0usize;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() || c.is_ascii_whitespace() {
            ascii_chars += 1;
        } else if c.is_ascii() {
            symbols += 1;
        } else if is_cjk_char(c) {
            cjk_chars += 1;
        } else {
            other += 1;
        }
    }

    ascii_chars.div_ceil(4) + symbols.div_ceil(2) + (cjk_chars * 2).div_ceil(3) + other.div_ceil(2)
}

#[inline]
fn is_cjk_char(c: char) -> bool {
    let cp = c as u32;
    (0x4E00..=0x9FFF).contains(&cp)
        || (0x3400..=0x4DBF).contains(&cp)
        || (0x3000..=0x30FF).contains(&cp)
        || (0xAC00..=0xD7AF).contains(&cp)
        || (0xFF00..=0xFFEF).contains(&cp)
}
