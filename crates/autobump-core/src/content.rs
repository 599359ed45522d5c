//! Line-ending detection and line-oriented file content.
//!
//! Files are always split on `\r?\n`, whatever their convention. The
//! detected [`LineEnding`] only decides how the lines are joined again when
//! the file is rewritten.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static LINE_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n").expect("line split pattern is valid"));

/// A line-ending convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// Unix style (`\n`).
    Lf,
    /// Windows style (`\r\n`).
    Crlf,
    /// Classic Mac style (`\r`).
    Cr,
}

impl LineEnding {
    /// The newline sequence used when a file carries no `\r` at all.
    pub const fn platform_default() -> Self {
        if cfg!(windows) { Self::Crlf } else { Self::Lf }
    }

    /// The literal byte sequence for this ending.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
            Self::Cr => "\r",
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lf => write!(f, "lf"),
            Self::Crlf => write!(f, "crlf"),
            Self::Cr => write!(f, "cr"),
        }
    }
}

/// Classify the line ending of raw file bytes.
///
/// Only the first `\r` is inspected: followed by `\n` it means `\r\n`,
/// otherwise a bare `\r`. Content without any `\r` gets `default`.
pub fn detect_line_ending(bytes: &[u8], default: LineEnding) -> LineEnding {
    match bytes.iter().position(|&b| b == b'\r') {
        None => default,
        Some(i) if bytes.get(i + 1) == Some(&b'\n') => LineEnding::Crlf,
        Some(_) => LineEnding::Cr,
    }
}

/// A file held as lines plus the ending used to join them back together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    /// Ending applied uniformly on rewrite.
    pub line_ending: LineEnding,
    /// Lines with their `\r?\n` terminators stripped.
    pub lines: Vec<String>,
}

impl FileContent {
    /// Split `text` into lines, detecting the ending from the same text.
    pub fn parse(text: &str, default: LineEnding) -> Self {
        Self {
            line_ending: detect_line_ending(text.as_bytes(), default),
            lines: LINE_SPLIT_RE.split(text).map(str::to_owned).collect(),
        }
    }

    /// Join the lines with the detected ending.
    pub fn render(&self) -> String {
        render_lines(&self.lines, self.line_ending)
    }
}

/// Join `lines` with `ending`.
pub fn render_lines(lines: &[String], ending: LineEnding) -> String {
    lines.join(ending.as_str())
}
