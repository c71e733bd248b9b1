//! Per-line classification into code, comment and blank lines.
//!
//! The classifier is a small state machine. Its only state is whether the
//! previous line left a block comment open; everything else is decided from
//! the current line and the language's [`LanguageRules`]. Each line is first
//! run through the language's literal stripper so that comment markers
//! inside strings and regex literals are never matched.
//!
//! Patterns are tried in a fixed priority order:
//!
//! 1. Inside a block comment: end marker with trailing code, end marker,
//!    otherwise the line belongs to the comment.
//! 2. Outside: block begin, blank, full-line comment, trailing comment,
//!    otherwise code.

use std::io::BufRead;

use tracing::trace;

use crate::language::LanguageRules;
use crate::options::{BlankInBlock, ClassifierOptions};
use crate::stats::Counters;

/// The outcome of classifying one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// Whitespace only
    Blank,
    /// Comment only
    Comment,
    /// Code only
    Code,
    /// Code followed by a line comment
    Mixed,
    /// Code sharing the line with a block comment delimiter
    BlockMixed,
}

impl LineKind {
    pub fn has_code(&self) -> bool {
        matches!(self, LineKind::Code | LineKind::Mixed | LineKind::BlockMixed)
    }

    pub fn has_comment(&self) -> bool {
        matches!(
            self,
            LineKind::Comment | LineKind::Mixed | LineKind::BlockMixed
        )
    }
}

/// State carried from one line to the next within a single file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifierState {
    pub inside_block_comment: bool,
}

impl ClassifierState {
    const OUTSIDE: Self = Self {
        inside_block_comment: false,
    };
    const INSIDE: Self = Self {
        inside_block_comment: true,
    };
}

/// Classifies lines with one language's rules.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'r> {
    rules: &'r LanguageRules,
    options: ClassifierOptions,
}

impl<'r> Classifier<'r> {
    pub fn new(rules: &'r LanguageRules) -> Self {
        Self {
            rules,
            options: ClassifierOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ClassifierOptions) -> Self {
        self.options = options;
        self
    }

    /// Classify `line` given the state left by the previous line.
    ///
    /// Pure: the same inputs always give the same kind and next state.
    pub fn classify(&self, line: &str, state: ClassifierState) -> (LineKind, ClassifierState) {
        let rules = self.rules;
        let stripped = rules.stripper.strip(line);
        let line = stripped.as_ref();

        if state.inside_block_comment {
            if let Some(block) = &rules.block {
                if block.end_mixed.as_ref().is_some_and(|re| re.is_match(line)) {
                    return (LineKind::BlockMixed, ClassifierState::OUTSIDE);
                }
                if block.end.is_match(line) {
                    return (LineKind::Comment, ClassifierState::OUTSIDE);
                }
            }
            if self.options.blank_in_block == BlankInBlock::Blank
                && rules.blank_line.is_match(line)
            {
                return (LineKind::Blank, state);
            }
            return (LineKind::Comment, state);
        }

        if let Some(block) = &rules.block {
            if block.begin.is_match(line) {
                let kind = if block
                    .begin_mixed
                    .as_ref()
                    .is_some_and(|re| re.is_match(line))
                {
                    LineKind::BlockMixed
                } else {
                    LineKind::Comment
                };
                let next = if block.closes_on_same_line(line) {
                    ClassifierState::OUTSIDE
                } else {
                    ClassifierState::INSIDE
                };
                return (kind, next);
            }
        }

        let kind = if rules.blank_line.is_match(line) {
            LineKind::Blank
        } else if rules.single_line_full.is_match(line) {
            LineKind::Comment
        } else if rules.single_line_mixed.is_match(line) {
            LineKind::Mixed
        } else {
            LineKind::Code
        };
        (kind, state)
    }
}

/// Classify a line with default options.
pub fn classify_line(
    line: &str,
    rules: &LanguageRules,
    state: ClassifierState,
) -> (LineKind, ClassifierState) {
    Classifier::new(rules).classify(line, state)
}

/// Feeds the lines of one file through a [`Classifier`] into [`Counters`].
///
/// Create one per file; the block-comment state is never shared.
#[derive(Debug)]
pub struct LineCounter<'r> {
    classifier: Classifier<'r>,
    state: ClassifierState,
    counters: Counters,
}

impl<'r> LineCounter<'r> {
    pub fn new(name: impl Into<String>, rules: &'r LanguageRules) -> Self {
        Self {
            classifier: Classifier::new(rules),
            state: ClassifierState::default(),
            counters: Counters::new(name),
        }
    }

    pub fn with_options(mut self, options: ClassifierOptions) -> Self {
        self.classifier = self.classifier.with_options(options);
        self
    }

    /// Classify one line (without its line terminator) and count it.
    pub fn feed(&mut self, line: &str) -> LineKind {
        let (kind, next) = self.classifier.classify(line, self.state);
        self.state = next;
        self.counters.counts.record(kind);

        trace!(
            file = %self.counters.name,
            line = self.counters.counts.lines,
            ?kind,
            "{}",
            line
        );
        kind
    }

    /// Classify every line of `lines`.
    pub fn feed_all<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.feed(line.as_ref());
        }
    }

    pub fn state(&self) -> ClassifierState {
        self.state
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn finish(self) -> Counters {
        self.counters
    }
}

/// Count the lines of in-memory text.
///
/// # Example
///
/// ```rust
/// use countloclib::{count_str, Language, RuleTable};
///
/// let table = RuleTable::new().unwrap();
/// let source = "/*\n * greeting\n */\nputs(\"hi\"); // say hi\n";
///
/// let counters = count_str("hello.c", source, table.rules(Language::Brace));
/// assert_eq!(counters.code(), 1);
/// assert_eq!(counters.comments(), 4);
/// assert_eq!(counters.lines(), 4);
/// ```
pub fn count_str(name: impl Into<String>, text: &str, rules: &LanguageRules) -> Counters {
    count_str_with(name, text, rules, ClassifierOptions::default())
}

/// Count the lines of in-memory text with explicit options.
pub fn count_str_with(
    name: impl Into<String>,
    text: &str,
    rules: &LanguageRules,
    options: ClassifierOptions,
) -> Counters {
    let mut counter = LineCounter::new(name, rules).with_options(options);
    counter.feed_all(text.lines());
    counter.finish()
}

/// Count the lines produced by a reader.
///
/// Invalid UTF-8 is replaced rather than rejected, so only I/O failures
/// surface as errors.
pub fn count_reader<R: BufRead>(
    name: impl Into<String>,
    mut reader: R,
    rules: &LanguageRules,
    options: ClassifierOptions,
) -> std::io::Result<Counters> {
    let mut counter = LineCounter::new(name, rules).with_options(options);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&buf);
        counter.feed(text.trim_end_matches(|c| c == '\n' || c == '\r'));
    }

    Ok(counter.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{Language, RuleTable};
    use crate::stats::LineCounts;

    fn table() -> RuleTable {
        RuleTable::new().unwrap()
    }

    fn counts(language: Language, text: &str) -> LineCounts {
        count_str("Test", text, table().rules(language)).counts
    }

    fn expect(code: u64, comments: u64, blank: u64, lines: u64) -> LineCounts {
        LineCounts {
            code,
            comments,
            blank,
            lines,
        }
    }

    #[test]
    fn empty_input() {
        let counters = count_str("empty", "", table().rules(Language::Ruby));
        assert_eq!(counters.counts, LineCounts::new());
        assert_eq!(counters.name, "empty");
    }

    #[test]
    fn classify_is_pure() {
        let table = table();
        let rules = table.rules(Language::Brace);
        let state = ClassifierState::default();
        let first = classify_line("int x; /* open", rules, state);
        let second = classify_line("int x; /* open", rules, state);
        assert_eq!(first, second);
        assert_eq!(first.0, LineKind::BlockMixed);
        assert!(first.1.inside_block_comment);
    }

    #[test]
    fn block_begin_takes_priority_over_line_comment() {
        let table = table();
        let rules = table.rules(Language::Ruby);
        let (kind, state) = classify_line("=begin # note", rules, ClassifierState::default());
        assert_eq!(kind, LineKind::Comment);
        assert!(state.inside_block_comment);
    }

    #[test]
    fn inside_block_ignores_line_comment_markers() {
        let table = table();
        let rules = table.rules(Language::Brace);
        let inside = ClassifierState {
            inside_block_comment: true,
        };
        let (kind, state) = classify_line("x = 1; // not code", rules, inside);
        assert_eq!(kind, LineKind::Comment);
        assert!(state.inside_block_comment);
    }

    #[test]
    fn end_mixed_closes_block_with_code() {
        let table = table();
        let rules = table.rules(Language::Brace);
        let inside = ClassifierState {
            inside_block_comment: true,
        };
        let (kind, state) = classify_line(" */ int x = 0;", rules, inside);
        assert_eq!(kind, LineKind::BlockMixed);
        assert!(!state.inside_block_comment);
    }

    #[test]
    fn blank_in_block_policy() {
        let table = table();
        let rules = table.rules(Language::Brace);
        let text = "/* a\n\n*/";

        let lenient = count_str_with("t", text, rules, ClassifierOptions::default());
        assert_eq!(lenient.counts, expect(0, 2, 1, 3));

        let strict = count_str_with(
            "t",
            text,
            rules,
            ClassifierOptions::new().blank_in_block(BlankInBlock::Comment),
        );
        assert_eq!(strict.counts, expect(0, 3, 0, 3));
    }

    #[test]
    fn ruby_mixed() {
        assert_eq!(
            counts(Language::Ruby, "puts 'hello' # This is a mixed comment"),
            expect(1, 1, 0, 1)
        );
    }

    #[test]
    fn ruby_comment_char_in_regexp() {
        assert_eq!(counts(Language::Ruby, "puts /#/"), expect(1, 0, 0, 1));
    }

    #[test]
    fn python_docstring_on_one_line() {
        assert_eq!(
            counts(Language::Python, r#""""This is a comment""""#),
            expect(0, 1, 0, 1)
        );
    }

    #[test]
    fn brace_mixed_code_and_comments() {
        let text = "/*\n * Sample foo function\n */\nvoid foo() {\n    // say hello\n    printf(\"Hello World\");\n}\n\n// The End";
        assert_eq!(counts(Language::Brace, text), expect(3, 5, 1, 9));
    }

    #[test]
    fn basic_quote_in_string() {
        assert_eq!(counts(Language::Basic, "x = \"hello '\""), expect(1, 0, 0, 1));
    }

    #[test]
    fn reader_handles_crlf_and_invalid_utf8() {
        let table = table();
        let bytes: &[u8] = b"# one\r\nputs 1\r\n\xff\xfe code\n";
        let counters =
            count_reader("r", bytes, table.rules(Language::Ruby), ClassifierOptions::default())
                .unwrap();
        assert_eq!(counters.counts, expect(2, 1, 0, 3));
    }

    #[test]
    fn reader_without_trailing_newline() {
        let table = table();
        let counters = count_reader(
            "r",
            "a = 1\n\nb = 2".as_bytes(),
            table.rules(Language::Python),
            ClassifierOptions::default(),
        )
        .unwrap();
        assert_eq!(counters.counts, expect(2, 0, 1, 3));
    }

    #[test]
    fn line_counter_tracks_state() {
        let table = table();
        let mut counter = LineCounter::new("t", table.rules(Language::Python));
        assert_eq!(counter.feed("\"\"\""), LineKind::Comment);
        assert!(counter.state().inside_block_comment);
        assert_eq!(counter.feed("docs"), LineKind::Comment);
        assert_eq!(counter.feed("\"\"\""), LineKind::Comment);
        assert!(!counter.state().inside_block_comment);
        assert_eq!(counter.counters().lines(), 3);
    }

    #[test]
    fn line_kind_flags() {
        assert!(LineKind::Mixed.has_code() && LineKind::Mixed.has_comment());
        assert!(LineKind::BlockMixed.has_code() && LineKind::BlockMixed.has_comment());
        assert!(!LineKind::Blank.has_code() && !LineKind::Blank.has_comment());
        assert!(LineKind::Code.has_code() && !LineKind::Code.has_comment());
    }
}
