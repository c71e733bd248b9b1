//! Neutralizes comment markers that appear inside string and regex literals.
//!
//! Each literal span on a line is replaced by a single [`PLACEHOLDER`]
//! character before any comment pattern is matched, so `puts "#"` is not
//! mistaken for a mixed line. Spans are found by shortest match between two
//! delimiters on the same line, single quotes first, then double quotes,
//! then slashes. This is a heuristic: literals spanning lines
//! are not tracked, and escaped delimiters (`"a\"b"`) end the span early.
//! Output on such lines may be inaccurate, and no error is raised.

use std::borrow::Cow;

use regex::Regex;

use crate::error::CountlocError;
use crate::Result;

/// Character substituted for each stripped span.
pub const PLACEHOLDER: &str = "X";

/// A kind of line-local literal span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    /// `'...'`
    SingleQuoted,
    /// `"..."`
    DoubleQuoted,
    /// `/.../`, for languages with slash-delimited regex literals
    SlashDelimited,
}

impl Literal {
    fn pattern(&self) -> &'static str {
        match self {
            Literal::SingleQuoted => r"'.*?'",
            Literal::DoubleQuoted => r#"".*?""#,
            Literal::SlashDelimited => r"/.*?/",
        }
    }
}

/// Stands in for a protected token while the literal passes run.
const MASK: char = '\u{E000}';

/// Strips literal spans from single lines.
///
/// One pass per literal kind, in the order given: a quote inside a span
/// removed by an earlier pass can no longer open a span in a later one.
/// Tokens listed as protected (such as Python's `"""` block delimiter) are
/// masked before the passes and restored afterwards, so they survive even
/// though they consist of quote characters.
#[derive(Debug, Clone)]
pub struct LiteralStripper {
    passes: Vec<Regex>,
    protected: Vec<(String, String)>,
}

impl LiteralStripper {
    /// Build a stripper for the given literal kinds and protected tokens.
    pub fn new(literals: &[Literal], protected: &[&str]) -> Result<Self> {
        let passes = literals
            .iter()
            .map(|literal| {
                let pattern = literal.pattern();
                Regex::new(pattern).map_err(|source| CountlocError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let protected = protected
            .iter()
            .enumerate()
            .map(|(i, token)| (token.to_string(), format!("{MASK}{i}{MASK}")))
            .collect();

        Ok(Self { passes, protected })
    }

    /// Return a copy of `line` with every literal span replaced.
    ///
    /// Borrows when nothing was stripped.
    pub fn strip<'a>(&self, line: &'a str) -> Cow<'a, str> {
        if self.passes.is_empty() {
            return Cow::Borrowed(line);
        }

        let masking = !line.contains(MASK)
            && self
                .protected
                .iter()
                .any(|(token, _)| line.contains(token.as_str()));

        let mut text = Cow::Borrowed(line);
        if masking {
            let mut masked = line.to_string();
            for (token, mask) in &self.protected {
                masked = masked.replace(token.as_str(), mask);
            }
            text = Cow::Owned(masked);
        }

        for pass in &self.passes {
            let replaced = match pass.replace_all(&text, PLACEHOLDER) {
                Cow::Owned(stripped) => Some(stripped),
                Cow::Borrowed(_) => None,
            };
            if let Some(stripped) = replaced {
                text = Cow::Owned(stripped);
            }
        }

        if masking {
            let mut restored = text.into_owned();
            for (token, mask) in &self.protected {
                restored = restored.replace(mask.as_str(), token);
            }
            text = Cow::Owned(restored);
        }
        text
    }
}
