//! Input options for line classification and counting.
//!
//! This module contains the configuration types that change how lines are
//! classified and how the driver reacts to files it cannot count.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a whitespace-only line inside an open block comment is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlankInBlock {
    /// Count it as blank (historic countloc behaviour)
    #[default]
    Blank,
    /// Count it as part of the comment
    Comment,
}

impl FromStr for BlankInBlock {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blank" => Ok(BlankInBlock::Blank),
            "comment" => Ok(BlankInBlock::Comment),
            _ => Err(format!("Unknown blank-in-block policy: {}", s)),
        }
    }
}

/// Options for the line classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassifierOptions {
    /// Policy for blank lines inside block comments
    pub blank_in_block: BlankInBlock,
}

impl ClassifierOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the blank-in-block policy
    pub fn blank_in_block(mut self, policy: BlankInBlock) -> Self {
        self.blank_in_block = policy;
        self
    }
}

/// What the driver does with a file it cannot count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Record the file as skipped and carry on
    #[default]
    Skip,
    /// Stop and return the error
    Abort,
}
