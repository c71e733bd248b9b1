//! High-level LOC counting API.
//!
//! This module drives the classifier over files: it discovers them, resolves
//! each one's language, counts files independently (in parallel with the
//! `parallel` feature) and folds the results into a total.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classifier::count_reader;
use crate::error::CountlocError;
use crate::filter::{discover_files, ExtensionMap, FilterConfig};
use crate::language::{Language, LanguageRules, RuleTable};
use crate::options::{ClassifierOptions, OnError};
use crate::stats::Counters;
use crate::Result;

/// Options for counting LOC.
#[derive(Debug, Clone, Default)]
pub struct CountOptions {
    /// File filter configuration
    pub file_filter: FilterConfig,
    /// Extension-to-language map
    pub extensions: ExtensionMap,
    /// Count every file as this language, ignoring extensions
    pub language: Option<Language>,
    /// Language for files whose extension is not mapped (else they are skipped)
    pub fallback: Option<Language>,
    /// Classifier behaviour
    pub classifier: ClassifierOptions,
    /// What to do with files that cannot be counted
    pub on_error: OnError,
}

impl CountOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set file filter.
    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.file_filter = filter;
        self
    }

    /// Set the extension map.
    pub fn extensions(mut self, extensions: ExtensionMap) -> Self {
        self.extensions = extensions;
        self
    }

    /// Force one language for every file.
    pub fn language(mut self, language: Option<Language>) -> Self {
        self.language = language;
        self
    }

    /// Language used when an extension is not mapped.
    pub fn fallback(mut self, language: Option<Language>) -> Self {
        self.fallback = language;
        self
    }

    /// Set classifier options.
    pub fn classifier(mut self, options: ClassifierOptions) -> Self {
        self.classifier = options;
        self
    }

    /// Set the error policy.
    pub fn on_error(mut self, policy: OnError) -> Self {
        self.on_error = policy;
        self
    }

    /// Resolve the language of a file: override, then extension, then fallback.
    pub fn resolve(&self, path: &Path) -> Option<Language> {
        self.language
            .or_else(|| self.extensions.resolve(path))
            .or(self.fallback)
    }
}

/// A file that was not counted, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of counting LOC over a set of paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResult {
    /// Per-file counters, in discovery order
    pub files: Vec<Counters>,
    /// Sum of all files, named `TOTAL (N files)`
    pub total: Counters,
    /// Files that could not be counted
    pub skipped: Vec<SkippedFile>,
}

impl CountResult {
    /// Create a new empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a result from per-file counters, computing the total.
    pub fn from_files(files: Vec<Counters>, skipped: Vec<SkippedFile>) -> Self {
        let total = Counters::total(total_label(files.len()), &files);
        Self {
            files,
            total,
            skipped,
        }
    }
}

fn total_label(file_count: usize) -> String {
    format!("TOTAL ({} files)", file_count)
}

/// Count LOC in a single file with already-resolved rules.
///
/// # Example
///
/// ```rust,ignore
/// use countloclib::{count_file, ClassifierOptions, Language, RuleTable};
///
/// let table = RuleTable::new()?;
/// let counters = count_file("lib/app.rb", table.rules(Language::Ruby), ClassifierOptions::default())?;
/// println!("{}", counters);
/// ```
pub fn count_file(
    path: impl AsRef<Path>,
    rules: &LanguageRules,
    options: ClassifierOptions,
) -> Result<Counters> {
    let path = path.as_ref();
    let read_err = |e: std::io::Error| CountlocError::FileRead {
        path: path.to_path_buf(),
        source: e,
    };

    let file = File::open(path).map_err(read_err)?;
    let counters = count_reader(
        path.to_string_lossy(),
        BufReader::new(file),
        rules,
        options,
    )
    .map_err(read_err)?;

    debug!(
        path = %path.display(),
        language = %rules.language(),
        lines = counters.lines(),
        "counted file"
    );
    Ok(counters)
}

/// Resolve the language of `path` and count it.
fn count_resolved(path: &Path, table: &RuleTable, options: &CountOptions) -> Result<Counters> {
    let language = options
        .resolve(path)
        .ok_or_else(|| CountlocError::UnknownExtension(path.to_path_buf()))?;
    count_file(path, table.rules(language), options.classifier)
}

/// Count LOC in files and directories.
///
/// Directories are walked per `options.file_filter` and only yield files
/// whose language resolves; files named directly are always attempted.
/// Files that cannot be resolved or read are recorded in
/// [`CountResult::skipped`], or abort the whole count under
/// [`OnError::Abort`].
///
/// # Example
///
/// ```rust,ignore
/// use countloclib::{count_paths, CountOptions, FilterConfig, RuleTable};
///
/// let table = RuleTable::new()?;
/// let options = CountOptions::new().filter(FilterConfig::new().recursive(true));
/// let result = count_paths(&["lib", "bin/tool.rb"], &table, &options)?;
/// println!("{}", result.total);
/// ```
pub fn count_paths<P: AsRef<Path>>(
    paths: &[P],
    table: &RuleTable,
    options: &CountOptions,
) -> Result<CountResult> {
    let mut skipped = Vec::new();
    let mut targets: Vec<PathBuf> = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for root in paths {
        let root = root.as_ref();
        match discover_files(root, &options.file_filter, |p| options.resolve(p).is_some()) {
            Ok(found) => {
                for file in found {
                    if seen.insert(file.clone()) {
                        targets.push(file);
                    }
                }
            }
            Err(err) => skip_or_abort(root, err, options.on_error, &mut skipped)?,
        }
    }

    debug!(files = targets.len(), "discovered files");

    #[cfg(feature = "parallel")]
    let outcomes: Vec<Result<Counters>> = targets
        .par_iter()
        .map(|path| count_resolved(path, table, options))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<Result<Counters>> = targets
        .iter()
        .map(|path| count_resolved(path, table, options))
        .collect();

    let mut files = Vec::with_capacity(outcomes.len());
    for (path, outcome) in targets.iter().zip(outcomes) {
        match outcome {
            Ok(counters) => files.push(counters),
            Err(err) => skip_or_abort(path, err, options.on_error, &mut skipped)?,
        }
    }

    Ok(CountResult::from_files(files, skipped))
}

fn skip_or_abort(
    path: &Path,
    err: CountlocError,
    policy: OnError,
    skipped: &mut Vec<SkippedFile>,
) -> Result<()> {
    match policy {
        OnError::Abort => Err(err),
        OnError::Skip => {
            warn!(path = %path.display(), "skipping: {}", err);
            skipped.push(SkippedFile {
                path: path.to_path_buf(),
                reason: err.to_string(),
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::LineCounts;
    use std::fs;
    use tempfile::tempdir;

    fn create_source_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn create_project(root: &Path) {
        create_source_file(
            &root.join("app.rb"),
            "# entry point\nrequire 'lib'\n\nputs 'hi' # greet\n",
        );
        create_source_file(
            &root.join("lib/tool.py"),
            "\"\"\"\nTool module.\n\"\"\"\nimport os\n",
        );
        create_source_file(
            &root.join("src/main.c"),
            "/* main */\nint main() {\n    return 0; // ok\n}\n",
        );
        create_source_file(&root.join("NOTES.txt"), "not source\n");
    }

    fn table() -> RuleTable {
        RuleTable::new().unwrap()
    }

    #[test]
    fn test_count_file() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("form.vb");
        create_source_file(&file, "' header\nDim x As Integer\nx = 1 ' set\n\n");

        let table = table();
        let counters =
            count_file(&file, table.rules(Language::Basic), ClassifierOptions::default()).unwrap();

        assert_eq!(
            counters.counts,
            LineCounts {
                code: 2,
                comments: 2,
                blank: 1,
                lines: 4,
            }
        );
        assert_eq!(counters.name, file.to_string_lossy());
    }

    #[test]
    fn test_count_file_missing() {
        let table = table();
        let err = count_file(
            "/nonexistent/file.rb",
            table.rules(Language::Ruby),
            ClassifierOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, CountlocError::FileRead { .. }));
    }

    #[test]
    fn test_count_paths_recursive() {
        let temp = tempdir().unwrap();
        create_project(temp.path());

        let options = CountOptions::new().filter(FilterConfig::new().recursive(true));
        let result = count_paths(&[temp.path()], &table(), &options).unwrap();

        assert_eq!(result.files.len(), 3);
        assert!(result.skipped.is_empty());
        assert_eq!(result.total.name, "TOTAL (3 files)");
        // app.rb: 2 code, 2 comments, 1 blank, 4 lines
        // tool.py: 1 code, 3 comments, 4 lines
        // main.c: 3 code, 2 comments, 4 lines
        assert_eq!(
            result.total.counts,
            LineCounts {
                code: 6,
                comments: 7,
                blank: 1,
                lines: 12,
            }
        );
    }

    #[test]
    fn test_count_paths_top_level_only() {
        let temp = tempdir().unwrap();
        create_project(temp.path());

        let result = count_paths(&[temp.path()], &table(), &CountOptions::new()).unwrap();

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].name.ends_with("app.rb"));
    }

    #[test]
    fn test_overlapping_paths_counted_once() {
        let temp = tempdir().unwrap();
        create_project(temp.path());
        let app = temp.path().join("app.rb");

        let paths = [app.clone(), temp.path().to_path_buf(), app];
        let result = count_paths(&paths, &table(), &CountOptions::new()).unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.total.lines(), 4);
        assert_eq!(result.total.name, "TOTAL (1 files)");
    }

    #[test]
    fn test_discovery_order_kept() {
        let temp = tempdir().unwrap();
        create_project(temp.path());
        let tool = temp.path().join("lib/tool.py");
        let app = temp.path().join("app.rb");

        let result = count_paths(&[&tool, &app, &tool], &table(), &CountOptions::new()).unwrap();

        let names: Vec<&str> = result.files.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec![tool.to_string_lossy(), app.to_string_lossy()]);
    }

    #[test]
    fn test_unknown_extension_skipped() {
        let temp = tempdir().unwrap();
        create_project(temp.path());
        let notes = temp.path().join("NOTES.txt");

        let result = count_paths(&[&notes], &table(), &CountOptions::new()).unwrap();

        assert!(result.files.is_empty());
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].path, notes);
        assert_eq!(result.total.counts, LineCounts::new());
    }

    #[test]
    fn test_unknown_extension_aborts() {
        let temp = tempdir().unwrap();
        create_project(temp.path());
        let notes = temp.path().join("NOTES.txt");

        let options = CountOptions::new().on_error(OnError::Abort);
        let err = count_paths(&[&notes], &table(), &options).unwrap_err();

        assert!(matches!(err, CountlocError::UnknownExtension(_)));
    }

    #[test]
    fn test_fallback_language() {
        let temp = tempdir().unwrap();
        create_project(temp.path());
        let notes = temp.path().join("NOTES.txt");

        let options = CountOptions::new().fallback(Some(Language::Ruby));
        let result = count_paths(&[&notes], &table(), &options).unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].code(), 1);
    }

    #[test]
    fn test_language_override() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("script.txt");
        create_source_file(&file, "// not a ruby comment\n# ruby comment\n");

        let options = CountOptions::new().language(Some(Language::Ruby));
        let result = count_paths(&[&file], &table(), &options).unwrap();

        assert_eq!(result.total.code(), 1);
        assert_eq!(result.total.comments(), 1);
    }

    #[test]
    fn test_missing_path_skipped() {
        let result =
            count_paths(&["/nonexistent/path"], &table(), &CountOptions::new()).unwrap();

        assert_eq!(result.skipped.len(), 1);
        assert!(result.skipped[0].reason.contains("does not exist"));
    }

    #[test]
    fn test_resolve_order() {
        let options = CountOptions::new().fallback(Some(Language::Basic));
        assert_eq!(options.resolve(Path::new("a.rb")), Some(Language::Ruby));
        assert_eq!(options.resolve(Path::new("a.xyz")), Some(Language::Basic));

        let forced = options.language(Some(Language::Python));
        assert_eq!(forced.resolve(Path::new("a.rb")), Some(Language::Python));
    }
}
