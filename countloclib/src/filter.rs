//! File discovery with glob filtering and extension-to-language resolution.
//!
//! Paths named explicitly are always returned so the caller can report the
//! ones it cannot count. Files found by walking a directory are only
//! returned when the caller's `accept` predicate (usually "has a known
//! language") says so.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::error::CountlocError;
use crate::language::Language;
use crate::Result;

/// Maps file extensions to languages. Many extensions may share one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionMap {
    map: HashMap<String, Language>,
}

const DEFAULT_EXTENSIONS: &[(&str, Language)] = &[
    ("rb", Language::Ruby),
    ("rbw", Language::Ruby),
    ("rake", Language::Ruby),
    ("gemspec", Language::Ruby),
    ("py", Language::Python),
    ("pyw", Language::Python),
    ("c", Language::Brace),
    ("h", Language::Brace),
    ("cc", Language::Brace),
    ("cpp", Language::Brace),
    ("cxx", Language::Brace),
    ("hh", Language::Brace),
    ("hpp", Language::Brace),
    ("hxx", Language::Brace),
    ("cs", Language::Brace),
    ("java", Language::Brace),
    ("vb", Language::Basic),
    ("vbs", Language::Basic),
    ("bas", Language::Basic),
    ("cls", Language::Basic),
    ("frm", Language::Basic),
];

impl Default for ExtensionMap {
    fn default() -> Self {
        Self {
            map: DEFAULT_EXTENSIONS
                .iter()
                .map(|(ext, lang)| (ext.to_string(), *lang))
                .collect(),
        }
    }
}

impl ExtensionMap {
    /// A map with no extensions registered.
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Register (or re-map) an extension, without the leading dot.
    pub fn with(mut self, extension: &str, language: Language) -> Self {
        self.map
            .insert(extension.trim_start_matches('.').to_lowercase(), language);
        self
    }

    /// Language for a bare extension such as `"cpp"`. Case-insensitive.
    pub fn style_for_extension(&self, extension: &str) -> Option<Language> {
        self.map.get(&extension.to_lowercase()).copied()
    }

    /// Language for a path, from its extension.
    pub fn resolve(&self, path: &Path) -> Option<Language> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.style_for_extension(ext))
    }

    /// Registered extensions for a language, sorted.
    pub fn extensions_for(&self, language: Language) -> Vec<&str> {
        let mut exts: Vec<&str> = self
            .map
            .iter()
            .filter(|(_, l)| **l == language)
            .map(|(e, _)| e.as_str())
            .collect();
        exts.sort_unstable();
        exts
    }
}

/// Configuration for file filtering.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Glob patterns to include (if empty, include everything)
    pub include: Vec<Pattern>,
    /// Glob patterns to exclude
    pub exclude: Vec<Pattern>,
    /// Descend into subdirectories
    pub recursive: bool,
}

impl FilterConfig {
    /// Create a new empty filter config (top level only, no globs).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an include pattern.
    pub fn include(mut self, pattern: &str) -> Result<Self> {
        self.include.push(parse_glob(pattern)?);
        Ok(self)
    }

    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        self.exclude.push(parse_glob(pattern)?);
        Ok(self)
    }

    /// Add multiple include patterns.
    pub fn include_many(mut self, patterns: &[&str]) -> Result<Self> {
        for pattern in patterns {
            self = self.include(pattern)?;
        }
        Ok(self)
    }

    /// Add multiple exclude patterns.
    pub fn exclude_many(mut self, patterns: &[&str]) -> Result<Self> {
        for pattern in patterns {
            self = self.exclude(pattern)?;
        }
        Ok(self)
    }

    /// Walk subdirectories too.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Check a path against the glob patterns.
    ///
    /// Excludes win over includes; with no include patterns everything
    /// not excluded matches.
    pub fn matches(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        if self.exclude.iter().any(|p| p.matches(&path_str)) {
            return false;
        }

        self.include.is_empty() || self.include.iter().any(|p| p.matches(&path_str))
    }
}

fn parse_glob(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| CountlocError::InvalidGlob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Check if a directory should be skipped during traversal.
fn should_skip_dir(name: &str) -> bool {
    name.starts_with('.')
}

/// Discover source files under `root`.
///
/// A file `root` is returned as-is when it passes the globs. A directory is
/// walked (one level, or fully when `filter.recursive`), skipping hidden
/// directories, and yields the files that pass both the globs and `accept`.
/// Results are sorted.
pub fn discover_files(
    root: impl AsRef<Path>,
    filter: &FilterConfig,
    accept: impl Fn(&Path) -> bool,
) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();

    if !root.exists() {
        return Err(CountlocError::PathNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();

    if root.is_file() {
        if filter.matches(root) {
            files.push(root.to_path_buf());
        }
        return Ok(files);
    }

    let mut walker = WalkDir::new(root).follow_links(true);
    if !filter.recursive {
        walker = walker.max_depth(1);
    }

    for entry in walker.into_iter().filter_entry(|e| {
        if e.depth() == 0 || !e.file_type().is_dir() {
            return true;
        }
        let name = e.file_name().to_str().unwrap_or("");
        !should_skip_dir(name)
    }) {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        let path = entry.path();

        if path.is_file() && filter.matches(path) && accept(path) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();

    Ok(files)
}
