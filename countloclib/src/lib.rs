//! # countloclib
//!
//! A lines of code counter library that classifies every line of a source
//! file as code, comment or blank.
//!
//! ## Overview
//!
//! Classification is a single pass over the lines of a file with one bit of
//! state (inside a block comment or not) and a small set of per-language
//! patterns. It is a heuristic, not a lexer: string literals are neutralized
//! line by line, block comments do not nest, and escaped quotes can fool the
//! literal stripper.
//!
//! Counted categories:
//!
//! - **Code**: lines with anything that is not a comment
//! - **Comments**: lines with a comment, including code lines with a trailing comment
//! - **Blank**: whitespace-only lines
//! - **Lines**: every line, counted once
//!
//! ## Supported languages
//!
//! - **Ruby**: `#`, `=begin`/`=end`, regex literals
//! - **Python**: `#`, `"""` blocks
//! - **Brace** (C, C++, C#, Java): `//`, `/* */`
//! - **Basic** (VB, VBScript): `'`, `REM`
//!
//! ## Example
//!
//! ```rust
//! use countloclib::{count_str, Counters, Language, RuleTable};
//!
//! let table = RuleTable::new().unwrap();
//!
//! let a = count_str("a.rb", "# setup\nputs 'hi' # greet\n", table.rules(Language::Ruby));
//! assert_eq!(a.code(), 1);
//! assert_eq!(a.comments(), 2);
//!
//! let b = count_str("b.py", "\"\"\"\ndocs\n\"\"\"\n\nprint('x')\n", table.rules(Language::Python));
//! assert_eq!(b.blank(), 1);
//!
//! let total = Counters::total("TOTAL", [&a, &b]);
//! assert_eq!(total.lines(), 7);
//! ```

pub mod classifier;
pub mod counter;
pub mod error;
pub mod filter;
pub mod language;
pub mod options;
pub mod stats;
pub mod strip;
pub mod table;

pub use classifier::{
    classify_line, count_reader, count_str, count_str_with, Classifier, ClassifierState,
    LineCounter, LineKind,
};
pub use counter::{count_file, count_paths, CountOptions, CountResult, SkippedFile};
pub use error::CountlocError;
pub use filter::{discover_files, ExtensionMap, FilterConfig};
pub use language::{Language, LanguageRules, RuleTable};
pub use options::{BlankInBlock, ClassifierOptions, OnError};
pub use stats::{Counters, LineCounts, Ratio};
pub use strip::{Literal, LiteralStripper};
pub use table::{LocTable, TableRow};

/// Result type for countloclib operations
pub type Result<T> = std::result::Result<T, CountlocError>;
