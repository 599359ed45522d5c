//! Comment-marker guided line selection ("safe matching").
//!
//! Two markers are recognized, both written as a `//` line comment:
//!
//! - `// $auto-bumper` after code: replace the version on this line
//! - `// $auto-bumper` on a line of its own: replace the version on the next
//!   line
//! - `// $auto-bumper-line`: replace the version on the next line
//!
//! Markers are case-sensitive, must end at whitespace or end of line, and
//! may share the comment with other text.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::literal::LiteralReplacer;

static NEXT_LINE_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"//[ \t]*\$auto-bumper-line(?:\s|$)")
        .expect("next-line marker pattern is valid")
});

static THIS_LINE_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"//[ \t]*\$auto-bumper(?:\s|$)")
        .expect("this-line marker pattern is valid")
});

/// Whether `line` marks the following line as a replacement target.
pub fn is_next_line_marker(line: &str) -> bool {
    NEXT_LINE_MARKER_RE.is_match(line)
}

/// Whether `line` carries a `$auto-bumper` marker.
///
/// The `-line` variant is excluded: it targets the next line instead.
pub fn is_this_line_marker(line: &str) -> bool {
    THIS_LINE_MARKER_RE.is_match(line) && !is_next_line_marker(line)
}

/// Whether `line` is nothing but a comment, as for a marker placed above the
/// code it guards.
fn is_comment_only(line: &str) -> bool {
    line.trim_start().starts_with("//")
}

/// Selector state between lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GuardState {
    /// No pending replacement.
    #[default]
    Normal,
    /// The previous line was a next-line marker.
    Armed,
}

/// Walks a file line by line, replacing only marker-selected lines.
///
/// Create one per file; state never carries over between files.
#[derive(Debug)]
pub struct GuardedLineSelector<'r> {
    replacer: &'r LiteralReplacer,
    state: GuardState,
}

impl<'r> GuardedLineSelector<'r> {
    /// Start in [`GuardState::Normal`].
    pub const fn new(replacer: &'r LiteralReplacer) -> Self {
        Self {
            replacer,
            state: GuardState::Normal,
        }
    }

    /// Current state.
    pub const fn state(&self) -> GuardState {
        self.state
    }

    /// Feed the next line and get back its (possibly rewritten) text.
    pub fn process<'a>(&mut self, line: &'a str) -> Cow<'a, str> {
        if is_next_line_marker(line) {
            self.state = GuardState::Armed;
            return Cow::Borrowed(line);
        }

        if self.state == GuardState::Armed {
            self.state = GuardState::Normal;
            return self.replacer.replace(line);
        }

        if is_this_line_marker(line) {
            if is_comment_only(line) {
                self.state = GuardState::Armed;
                return Cow::Borrowed(line);
            }
            return self.replacer.replace(line);
        }

        Cow::Borrowed(line)
    }
}
