//! Core data structures for LOC statistics

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::classifier::LineKind;

/// Line counts for one file or an aggregate.
///
/// A mixed line bumps both `code` and `comments` but `lines` only once, so
/// `lines == code + comments + blank` does not hold in general. What does
/// hold is `lines >= blank` and `lines >= max(code, comments)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineCounts {
    /// Lines containing code (including mixed lines)
    pub code: u64,
    /// Lines containing a comment (including mixed lines)
    pub comments: u64,
    /// Whitespace-only lines
    pub blank: u64,
    /// Every line read
    pub lines: u64,
}

impl LineCounts {
    /// Create a new LineCounts with all zeros
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one classified line.
    pub fn record(&mut self, kind: LineKind) {
        self.lines += 1;
        match kind {
            LineKind::Blank => self.blank += 1,
            LineKind::Comment => self.comments += 1,
            LineKind::Code => self.code += 1,
            LineKind::Mixed | LineKind::BlockMixed => {
                self.code += 1;
                self.comments += 1;
            }
        }
    }

    /// Field-wise sum of two counts. Neither operand is modified.
    pub fn merge(&self, other: &Self) -> Self {
        *self + *other
    }

    /// Ratio of code lines to comment lines.
    pub fn code_to_comment_ratio(&self) -> Ratio {
        if self.comments == 0 {
            Ratio::Undefined
        } else {
            Ratio::Defined(self.code as f64 / self.comments as f64)
        }
    }
}

impl Add for LineCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            code: self.code + other.code,
            comments: self.comments + other.comments,
            blank: self.blank + other.blank,
            lines: self.lines + other.lines,
        }
    }
}

impl AddAssign for LineCounts {
    fn add_assign(&mut self, other: Self) {
        self.code += other.code;
        self.comments += other.comments;
        self.blank += other.blank;
        self.lines += other.lines;
    }
}

impl Sum for LineCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::new(), Add::add)
    }
}

/// Code-to-comment ratio. `Undefined` when there are no comment lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ratio {
    Defined(f64),
    Undefined,
}

impl Ratio {
    /// The ratio as a number, if defined
    pub fn value(&self) -> Option<f64> {
        match self {
            Ratio::Defined(v) => Some(*v),
            Ratio::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Ratio::Undefined)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Ratio::Defined(v) => format!("{:.2}", v),
            Ratio::Undefined => "undefined".to_string(),
        };

        // Respect width and alignment from the formatter
        if let Some(width) = f.width() {
            if f.align() == Some(fmt::Alignment::Left) {
                write!(f, "{:<width$}", s, width = width)
            } else {
                write!(f, "{:>width$}", s, width = width)
            }
        } else {
            write!(f, "{}", s)
        }
    }
}

/// Named line counts: one file, one in-memory text, or a total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// Label, typically a file path or "TOTAL"
    pub name: String,
    /// The four counters
    pub counts: LineCounts,
}

impl Counters {
    /// Create zeroed counters with a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            counts: LineCounts::new(),
        }
    }

    /// Create counters from existing counts
    pub fn with_counts(name: impl Into<String>, counts: LineCounts) -> Self {
        Self {
            name: name.into(),
            counts,
        }
    }

    /// Sum two counters under a name chosen by the caller.
    pub fn merge(&self, other: &Counters, name: impl Into<String>) -> Counters {
        Counters::with_counts(name, self.counts.merge(&other.counts))
    }

    /// Sum any number of counters under one name.
    pub fn total<'a>(name: impl Into<String>, items: impl IntoIterator<Item = &'a Counters>) -> Self {
        Counters::with_counts(name, items.into_iter().map(|c| c.counts).sum())
    }

    pub fn code(&self) -> u64 {
        self.counts.code
    }

    pub fn comments(&self) -> u64 {
        self.counts.comments
    }

    pub fn blank(&self) -> u64 {
        self.counts.blank
    }

    pub fn lines(&self) -> u64 {
        self.counts.lines
    }

    pub fn code_to_comment_ratio(&self) -> Ratio {
        self.counts.code_to_comment_ratio()
    }
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<40} {:>8} {:>8} {:>8} {:>8}",
            self.name, self.counts.code, self.counts.comments, self.counts.blank, self.counts.lines
        )
    }
}
