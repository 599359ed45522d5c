//! Quoted version-literal replacement.
//!
//! A [`LiteralReplacer`] rewrites `"1.2.3"`, `'1.2.3'` and `` `1.2.3` `` on a
//! single line. Each quote style is tried on its own and replaces at most its
//! first match, so a line quoting the same version twice in the same style
//! only has the first occurrence rewritten.

use std::borrow::Cow;

use regex::{NoExpand, Regex};

/// Quote characters that may enclose a version literal.
pub const QUOTES: [char; 3] = ['"', '\'', '`'];

/// Replaces one version string inside quoted literals.
#[derive(Debug, Clone)]
pub struct LiteralReplacer {
    patterns: Vec<(Regex, String)>,
}

impl LiteralReplacer {
    /// Build a replacer for `old` → `new`.
    ///
    /// `old` is escaped before it becomes part of a pattern; `new` is
    /// inserted as-is and never interpreted as a capture reference.
    ///
    /// # Errors
    ///
    /// Fails only if the compiled pattern exceeds the regex size limit.
    pub fn new(old: &str, new: &str) -> Result<Self, regex::Error> {
        let escaped = regex::escape(old);
        let patterns = QUOTES
            .iter()
            .map(|&q| {
                let re = Regex::new(&format!("{q}{escaped}{q}"))?;
                Ok((re, format!("{q}{new}{q}")))
            })
            .collect::<Result<_, regex::Error>>()?;
        Ok(Self { patterns })
    }

    /// Apply every quote style once to `line`.
    ///
    /// Returns `Cow::Borrowed` when nothing matched.
    pub fn replace<'a>(&self, line: &'a str) -> Cow<'a, str> {
        let mut out = Cow::Borrowed(line);
        for (re, replacement) in &self.patterns {
            let replaced = match re.replacen(&out, 1, NoExpand(replacement)) {
                Cow::Owned(next) => Some(next),
                Cow::Borrowed(_) => None,
            };
            if let Some(next) = replaced {
                out = Cow::Owned(next);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_double_quoted() {
        let r = LiteralReplacer::new("1.0.0", "2.0.0").unwrap();
        assert_eq!(r.replace(r#"const v = "1.0.0";"#), r#"const v = "2.0.0";"#);
    }

    #[test]
    fn replaces_single_quoted_and_backtick() {
        let r = LiteralReplacer::new("1.0.0", "2.0.0").unwrap();
        assert_eq!(r.replace("v = '1.0.0'"), "v = '2.0.0'");
        assert_eq!(r.replace("v = `1.0.0`"), "v = `2.0.0`");
    }

    #[test]
    fn leaves_bare_occurrences_alone() {
        let r = LiteralReplacer::new("1.0.0", "2.0.0").unwrap();
        let line = "version = 1.0.0";
        assert!(matches!(r.replace(line), Cow::Borrowed(_)));
    }

    #[test]
    fn only_first_occurrence_per_quote_style() {
        let r = LiteralReplacer::new("1.0.0", "2.0.0").unwrap();
        assert_eq!(
            r.replace(r#"["1.0.0", "1.0.0"]"#),
            r#"["2.0.0", "1.0.0"]"#
        );
    }

    #[test]
    fn each_quote_style_replaced_independently() {
        let r = LiteralReplacer::new("1.0.0", "2.0.0").unwrap();
        assert_eq!(
            r.replace(r#""1.0.0" '1.0.0' `1.0.0` "1.0.0""#),
            r#""2.0.0" '2.0.0' `2.0.0` "1.0.0""#
        );
    }

    #[test]
    fn escapes_metacharacters_in_old_version() {
        let r = LiteralReplacer::new("1.0.0", "2.0.0").unwrap();
        // `.` must not match arbitrary characters
        assert_eq!(r.replace(r#""1x0y0""#), r#""1x0y0""#);

        let r = LiteralReplacer::new("1.0+build(1)[x]", "1.1").unwrap();
        assert_eq!(r.replace(r#"v = "1.0+build(1)[x]""#), r#"v = "1.1""#);
    }

    #[test]
    fn new_version_inserted_literally() {
        let r = LiteralReplacer::new("1.0.0", "$1.0").unwrap();
        assert_eq!(r.replace(r#""1.0.0""#), r#""$1.0""#);
    }

    #[test]
    fn mismatched_quotes_do_not_match() {
        let r = LiteralReplacer::new("1.0.0", "2.0.0").unwrap();
        assert_eq!(r.replace(r#""1.0.0'"#), r#""1.0.0'"#);
    }

    #[test]
    fn prerelease_versions_match_exactly() {
        let r = LiteralReplacer::new("1.2.3-SNAPSHOT", "1.2.3").unwrap();
        assert_eq!(r.replace(r#"v = "1.2.3-SNAPSHOT""#), r#"v = "1.2.3""#);
        assert_eq!(r.replace(r#"v = "1.2.3""#), r#"v = "1.2.3""#);
    }
}
