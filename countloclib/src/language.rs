//! Comment-syntax rules for the supported language families.
//!
//! Every family gets one immutable [`LanguageRules`] value. The values are
//! compiled once into a [`RuleTable`], which callers build at startup and
//! then share read-only (it is `Send + Sync`) across every file they count.
//!
//! | Family | Line comment | Block comment |
//! |--------|--------------|---------------|
//! | Ruby   | `#`          | `=begin` / `=end` at line start |
//! | Python | `#`          | `"""` / `"""` |
//! | Brace  | `//`         | `/*` / `*/`, may share a line with code |
//! | Basic  | `'`, `REM`   | none |

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CountlocError;
use crate::strip::{Literal, LiteralStripper};
use crate::Result;

/// A language family with its own comment syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Ruby: `#` and `=begin`/`=end`
    Ruby,
    /// Python: `#` and `"""` docstring blocks
    Python,
    /// C, C++, C#, Java: `//` and `/* */`
    Brace,
    /// Visual Basic family: `'` and `REM`
    Basic,
}

impl Language {
    /// Every supported language, in table order.
    pub const ALL: [Language; 4] = [
        Language::Ruby,
        Language::Python,
        Language::Brace,
        Language::Basic,
    ];

    /// Canonical identifier, accepted back by `from_str`.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Ruby => "ruby",
            Language::Python => "python",
            Language::Brace => "brace",
            Language::Basic => "basic",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = CountlocError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ruby" | "rb" => Ok(Language::Ruby),
            "python" | "py" => Ok(Language::Python),
            "brace" | "c" | "cpp" | "c++" | "cplusplus" | "csharp" | "cs" | "java" => {
                Ok(Language::Brace)
            }
            "basic" | "vb" | "vbnet" | "vbscript" => Ok(Language::Basic),
            _ => Err(CountlocError::UnsupportedLanguage(s.to_string())),
        }
    }
}

/// Uncompiled patterns for one language family.
struct RuleSpec {
    single_line_full: &'static str,
    single_line_mixed: &'static str,
    block: Option<BlockSpec>,
    blank_line: &'static str,
    literals: &'static [Literal],
    protected: &'static [&'static str],
}

struct BlockSpec {
    begin: &'static str,
    end: &'static str,
    begin_mixed: Option<&'static str>,
    end_mixed: Option<&'static str>,
}

const BLANK_LINE: &str = r"^\s*$";

const RUBY: RuleSpec = RuleSpec {
    single_line_full: r"^\s*#",
    single_line_mixed: r"#",
    block: Some(BlockSpec {
        begin: r"^=begin(\s|$)",
        end: r"^=end(\s|$)",
        begin_mixed: None,
        end_mixed: None,
    }),
    blank_line: BLANK_LINE,
    literals: &[
        Literal::SingleQuoted,
        Literal::DoubleQuoted,
        Literal::SlashDelimited,
    ],
    protected: &[],
};

const PYTHON: RuleSpec = RuleSpec {
    single_line_full: r"^\s*#",
    single_line_mixed: r"#",
    block: Some(BlockSpec {
        begin: r#"""""#,
        end: r#"""""#,
        begin_mixed: None,
        end_mixed: None,
    }),
    blank_line: BLANK_LINE,
    literals: &[Literal::SingleQuoted, Literal::DoubleQuoted],
    protected: &[r#"""""#],
};

// The begin pattern refuses a `/*` that sits behind a `//` line comment, and
// consumes everything up to the marker so that replacing the match leaves
// only the text after the opening delimiter.
const BRACE: RuleSpec = RuleSpec {
    single_line_full: r"^\s*//",
    single_line_mixed: r"//",
    block: Some(BlockSpec {
        begin: r"^(?:[^/]|/[^/*])*/\*",
        end: r"\*/",
        begin_mixed: Some(r"^\s*(?:[^\s/]|/[^*]).*/\*"),
        end_mixed: Some(r"\*/\s*(?:[^\s/]|/[^/])"),
    }),
    blank_line: BLANK_LINE,
    literals: &[Literal::SingleQuoted, Literal::DoubleQuoted],
    protected: &[],
};

// `'` opens a comment here, so single-quoted spans are never literals.
const BASIC: RuleSpec = RuleSpec {
    single_line_full: r"^\s*(?:'|(?i:rem)(?:\s|$))",
    single_line_mixed: r"'",
    block: None,
    blank_line: BLANK_LINE,
    literals: &[Literal::DoubleQuoted],
    protected: &[],
};

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| CountlocError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Block comment delimiters.
#[derive(Debug, Clone)]
pub struct BlockComment {
    pub(crate) begin: Regex,
    pub(crate) end: Regex,
    /// Code precedes the opening delimiter on the same line.
    pub(crate) begin_mixed: Option<Regex>,
    /// Code follows the closing delimiter on the same line.
    pub(crate) end_mixed: Option<Regex>,
}

impl BlockComment {
    fn compile(spec: &BlockSpec) -> Result<Self> {
        Ok(Self {
            begin: compile(spec.begin)?,
            end: compile(spec.end)?,
            begin_mixed: spec.begin_mixed.map(compile).transpose()?,
            end_mixed: spec.end_mixed.map(compile).transpose()?,
        })
    }

    /// Whether the block that `line` opens is closed again on the same line.
    ///
    /// The first begin-marker match is replaced before looking for the end
    /// marker, so identical delimiters (`"""`) are not mistaken for a close.
    pub(crate) fn closes_on_same_line(&self, line: &str) -> bool {
        let rest = self.begin.replacen(line, 1, crate::strip::PLACEHOLDER);
        self.end.is_match(&rest)
    }
}

/// Immutable comment-syntax rules for one language family.
#[derive(Debug, Clone)]
pub struct LanguageRules {
    language: Language,
    pub(crate) single_line_full: Regex,
    pub(crate) single_line_mixed: Regex,
    pub(crate) block: Option<BlockComment>,
    pub(crate) blank_line: Regex,
    pub(crate) stripper: LiteralStripper,
}

impl LanguageRules {
    fn compile(language: Language, spec: &RuleSpec) -> Result<Self> {
        Ok(Self {
            language,
            single_line_full: compile(spec.single_line_full)?,
            single_line_mixed: compile(spec.single_line_mixed)?,
            block: spec.block.as_ref().map(BlockComment::compile).transpose()?,
            blank_line: compile(spec.blank_line)?,
            stripper: LiteralStripper::new(spec.literals, spec.protected)?,
        })
    }

    /// The family these rules belong to.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Whether this family has block comments at all.
    pub fn has_block_comments(&self) -> bool {
        self.block.is_some()
    }
}

/// The compiled rule sets for every supported language.
#[derive(Debug, Clone)]
pub struct RuleTable {
    ruby: LanguageRules,
    python: LanguageRules,
    brace: LanguageRules,
    basic: LanguageRules,
}

impl RuleTable {
    /// Compile the rule set of every supported language.
    pub fn new() -> Result<Self> {
        Ok(Self {
            ruby: LanguageRules::compile(Language::Ruby, &RUBY)?,
            python: LanguageRules::compile(Language::Python, &PYTHON)?,
            brace: LanguageRules::compile(Language::Brace, &BRACE)?,
            basic: LanguageRules::compile(Language::Basic, &BASIC)?,
        })
    }

    /// Rules for a resolved language.
    pub fn rules(&self, language: Language) -> &LanguageRules {
        match language {
            Language::Ruby => &self.ruby,
            Language::Python => &self.python,
            Language::Brace => &self.brace,
            Language::Basic => &self.basic,
        }
    }

    /// Rules for a language identifier such as `"ruby"` or `"cpp"`.
    ///
    /// Fails with [`CountlocError::UnsupportedLanguage`] for unknown names.
    pub fn rules_for(&self, id: &str) -> Result<&LanguageRules> {
        let language: Language = id.parse()?;
        Ok(self.rules(language))
    }
}
