//! # countloc
//!
//! A command-line lines of code counter for Ruby, Python, C-family and
//! Basic sources.
//!
//! ## Overview
//!
//! countloc is a thin wrapper around countloclib: it turns command-line
//! options into [`CountOptions`], counts every path it is given and renders
//! the per-file table plus a total.
//!
//! ## Usage
//!
//! ```bash
//! # Count the files directly inside a directory
//! countloc src
//!
//! # Recurse, only Ruby files, excluding vendored code
//! countloc -r . --include "**/*.rb" --exclude "**/vendor/**"
//!
//! # Count extension-less scripts as Python
//! countloc bin/* --default-mode python
//!
//! # Write a CSV report
//! countloc -r lib --format csv -o loc.csv
//! ```
//!
//! Logging goes to stderr. `-v` shows per-file events, `-vv` every
//! classified line; `COUNTLOC_LOG` takes a full filter directive instead.

mod render;

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use countloclib::{
    count_paths, BlankInBlock, ClassifierOptions, CountOptions, CountResult, FilterConfig,
    Language, OnError, RuleTable,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use render::OutputFormat;

const LANGUAGE_HELP: &str = "ruby, python, brace (c, cpp, csharp, java) or basic (vb)";

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("countloc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Count lines of code, comments and blank lines")
        .arg(
            Arg::new("paths")
                .value_name("PATH")
                .help("Files or directories to count")
                .required(true)
                .num_args(1..)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("recurse")
                .short('r')
                .long("recurse")
                .action(ArgAction::SetTrue)
                .help("Descend into subdirectories"),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("LANG")
                .value_parser(parse_language)
                .help(format!("Count every file as this language: {}", LANGUAGE_HELP)),
        )
        .arg(
            Arg::new("default-mode")
                .long("default-mode")
                .value_name("LANG")
                .value_parser(parse_language)
                .help("Language for files with an unknown extension (else they are skipped)"),
        )
        .arg(
            Arg::new("include")
                .short('i')
                .long("include")
                .action(ArgAction::Append)
                .help("Include files matching glob pattern"),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .action(ArgAction::Append)
                .help("Exclude files matching glob pattern"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_parser(["text", "csv", "html", "json"])
                .default_value("text")
                .help("Report format"),
        )
        .arg(
            Arg::new("output-file")
                .short('o')
                .long("output-file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Write the report to a file instead of stdout"),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .action(ArgAction::SetTrue)
                .help("Abort on the first file that cannot be read or has no language"),
        )
        .arg(
            Arg::new("blank-in-block")
                .long("blank-in-block")
                .value_parser(["blank", "comment"])
                .default_value("blank")
                .help("How to count whitespace-only lines inside block comments"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v debug, -vv trace)"),
        )
}

fn parse_language(value: &str) -> Result<Language, String> {
    value.parse().map_err(|e: countloclib::CountlocError| e.to_string())
}

/// Install the stderr subscriber. `COUNTLOC_LOG` wins over `-v`.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_env("COUNTLOC_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Build filter config from matches
fn build_filter(matches: &ArgMatches) -> anyhow::Result<FilterConfig> {
    let mut filter = FilterConfig::new().recursive(matches.get_flag("recurse"));

    if let Some(includes) = matches.get_many::<String>("include") {
        for pattern in includes {
            filter = filter.include(pattern)?;
        }
    }

    if let Some(excludes) = matches.get_many::<String>("exclude") {
        for pattern in excludes {
            filter = filter.exclude(pattern)?;
        }
    }

    Ok(filter)
}

fn build_options(matches: &ArgMatches) -> anyhow::Result<CountOptions> {
    let blank_in_block: BlankInBlock = matches
        .get_one::<String>("blank-in-block")
        .map(|s| s.parse())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();

    let on_error = if matches.get_flag("strict") {
        OnError::Abort
    } else {
        OnError::Skip
    };

    Ok(CountOptions::new()
        .filter(build_filter(matches)?)
        .language(matches.get_one::<Language>("mode").copied())
        .fallback(matches.get_one::<Language>("default-mode").copied())
        .classifier(ClassifierOptions::new().blank_in_block(blank_in_block))
        .on_error(on_error))
}

fn output_format(matches: &ArgMatches) -> anyhow::Result<OutputFormat> {
    matches
        .get_one::<String>("format")
        .map(|s| s.parse())
        .transpose()
        .map_err(anyhow::Error::msg)
        .map(Option::unwrap_or_default)
}

fn report_skipped(result: &CountResult) {
    for skipped in &result.skipped {
        eprintln!("Skipped {}: {}", skipped.path.display(), skipped.reason);
    }
}

fn write_report(report: &str, target: Option<&PathBuf>) -> anyhow::Result<()> {
    match target {
        Some(path) => fs::write(path, report)
            .with_context(|| format!("failed to write report to '{}'", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(report.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

fn run(matches: &ArgMatches) -> anyhow::Result<ExitCode> {
    let paths: Vec<PathBuf> = matches
        .get_many::<PathBuf>("paths")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();
    let options = build_options(matches)?;
    let format = output_format(matches)?;

    let table = RuleTable::new()?;
    let result = count_paths(&paths, &table, &options)?;
    debug!(
        files = result.files.len(),
        skipped = result.skipped.len(),
        "count finished"
    );

    report_skipped(&result);

    let report = render::render(&result, format)?;
    write_report(&report, matches.get_one::<PathBuf>("output-file"))?;

    if result.files.is_empty() && !result.skipped.is_empty() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();
    init_logging(matches.get_count("verbose"));

    match run(&matches) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ArgMatches {
        build_command().try_get_matches_from(args).unwrap()
    }

    #[test]
    fn test_command_is_valid() {
        build_command().debug_assert();
    }

    #[test]
    fn test_paths_required() {
        assert!(build_command().try_get_matches_from(["countloc"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let matches = parse(&["countloc", "src"]);
        let options = build_options(&matches).unwrap();

        assert!(!options.file_filter.recursive);
        assert_eq!(options.language, None);
        assert_eq!(options.fallback, None);
        assert_eq!(options.on_error, OnError::Skip);
        assert_eq!(options.classifier.blank_in_block, BlankInBlock::Blank);
        assert_eq!(output_format(&matches).unwrap(), OutputFormat::Text);
    }

    #[test]
    fn test_all_options() {
        let matches = parse(&[
            "countloc",
            "a.txt",
            "lib",
            "-r",
            "-m",
            "py",
            "--default-mode",
            "VB",
            "--strict",
            "--blank-in-block",
            "comment",
            "--format",
            "csv",
        ]);
        let options = build_options(&matches).unwrap();

        assert_eq!(matches.get_many::<PathBuf>("paths").unwrap().count(), 2);
        assert!(options.file_filter.recursive);
        assert_eq!(options.language, Some(Language::Python));
        assert_eq!(options.fallback, Some(Language::Basic));
        assert_eq!(options.on_error, OnError::Abort);
        assert_eq!(options.classifier.blank_in_block, BlankInBlock::Comment);
        assert_eq!(output_format(&matches).unwrap(), OutputFormat::Csv);
    }

    #[test]
    fn test_unknown_language_rejected() {
        let result = build_command().try_get_matches_from(["countloc", "src", "-m", "cobol"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_glob_reported() {
        let matches = parse(&["countloc", "src", "--include", "[oops"]);
        let err = build_options(&matches).unwrap_err();
        assert!(err.to_string().contains("[oops"));
    }

    #[test]
    fn test_verbosity_counts() {
        let matches = parse(&["countloc", "src", "-vv"]);
        assert_eq!(matches.get_count("verbose"), 2);
    }
}
