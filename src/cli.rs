//! CLI parsing and orchestration. Scrapes every configured level to Markdown and JSON,
//! or queries previously written Markdown. Maps startup errors to exit codes.

use crate::config::{self, Config};
use crate::formats::{format_json, format_markdown, write_json, write_markdown, FormatError};
use crate::library::{LibraryError, VocabLibrary};
use crate::model::{CombinedDocument, JlptLevel, LevelDocument};
use crate::scraper::{
    scrape_level, LevelOutcome, PageFetcher, PoliteClient, ScraperError, DEFAULT_DELAY_SECS,
    DEFAULT_TIMEOUT_SECS,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const MARKDOWN_DIR: &str = "vocabulary";
const JSON_DIR: &str = "vocabulary_json";
const COMBINED_FILE: &str = "all_vocabulary.json";
const RULE: &str = "============================================================";

/// Startup error carrying exit code and message. Level failures never surface here.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Library(#[from] LibraryError),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::Client(_) => 2,
            CliRunError::OutputDir { .. } | CliRunError::Library(_) => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "jlptscrape")]
#[command(about = "Scrape JLPT vocabulary lists and write normalized Markdown and JSON")]
#[command(
    after_help = "Config file keys (output_dir, user_agent, request_delay_secs, timeout_secs, [levels]) are read from ./jlptscrape.toml or the user config dir. CLI flags override config."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Root directory for vocabulary/ and vocabulary_json/. Default: current directory.
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// HTTP User-Agent (overrides config).
    #[arg(long, global = true)]
    pub user_agent: Option<String>,

    /// Delay between requests in seconds (overrides config; default 1).
    #[arg(long, global = true)]
    pub delay: Option<u64>,

    /// Request timeout in seconds (overrides config; default 30).
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Suppress progress output (summary and errors only).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Debug logging and verbose error chains.
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Scrape every configured level (the default when no subcommand is given).
    Scrape,
    /// Search previously scraped vocabulary.
    Search {
        /// Case-insensitive text matched against word, reading, meaning, and category.
        query: Option<String>,
        /// Restrict to one level (N5..N1).
        #[arg(long, value_parser = parse_level)]
        level: Option<JlptLevel>,
        /// Restrict to one category (exact match).
        #[arg(long)]
        category: Option<String>,
        /// Max rows to print.
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// List categories of previously scraped vocabulary.
    Categories {
        /// Restrict to one level (N5..N1).
        #[arg(long, value_parser = parse_level)]
        level: Option<JlptLevel>,
    },
}

fn parse_level(s: &str) -> Result<JlptLevel, String> {
    JlptLevel::parse(s)
        .ok_or_else(|| format!("Invalid level: '{}'. Use N5, N4, N3, N2, or N1.", s))
}

/// Output file layout under one root.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub markdown_dir: PathBuf,
    pub json_dir: PathBuf,
}

impl OutputPaths {
    pub fn new(root: &Path) -> Self {
        Self {
            markdown_dir: root.join(MARKDOWN_DIR),
            json_dir: root.join(JSON_DIR),
        }
    }

    pub fn create_dirs(&self) -> Result<(), CliRunError> {
        for dir in [&self.markdown_dir, &self.json_dir] {
            std::fs::create_dir_all(dir).map_err(|e| CliRunError::OutputDir {
                path: dir.clone(),
                source: e,
            })?;
        }
        Ok(())
    }

    pub fn markdown_path(&self, level: JlptLevel) -> PathBuf {
        self.markdown_dir.join(format!("{}.md", level.file_stem()))
    }

    pub fn json_path(&self, level: JlptLevel) -> PathBuf {
        self.json_dir.join(format!("{}.json", level.file_stem()))
    }

    pub fn combined_path(&self) -> PathBuf {
        self.json_dir.join(COMBINED_FILE)
    }
}

/// Why one level was abandoned.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error(transparent)]
    Scraper(#[from] ScraperError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl LevelError {
    fn is_transport(&self) -> bool {
        matches!(self, LevelError::Scraper(e) if e.is_transport())
    }
}

/// Files written for one successful level.
#[derive(Debug)]
pub struct WrittenLevel {
    pub document: LevelDocument,
    /// Category and item count of each extracted section, in page order.
    pub sections: Vec<(String, usize)>,
    pub markdown_path: PathBuf,
    pub json_path: PathBuf,
}

/// What processing one level produced, for reporting once the spinner is gone.
#[derive(Debug)]
pub enum LevelReport {
    Written(WrittenLevel),
    NoContent,
    Empty,
}

/// Result of a full scrape run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub succeeded: Vec<JlptLevel>,
    /// No content root or no vocabulary rows.
    pub skipped: Vec<JlptLevel>,
    pub failed: Vec<JlptLevel>,
    pub total_words: usize,
    pub combined_path: Option<PathBuf>,
}

/// Fetch, extract, and write one level. Prints nothing; the caller reports.
fn process_level<F: PageFetcher + ?Sized>(
    level: JlptLevel,
    url: &str,
    fetcher: &mut F,
    paths: &OutputPaths,
) -> Result<LevelReport, LevelError> {
    let result = match scrape_level(level, url, fetcher)? {
        LevelOutcome::Scraped(result) => result,
        LevelOutcome::NoContent => return Ok(LevelReport::NoContent),
        LevelOutcome::Empty => return Ok(LevelReport::Empty),
    };

    let markdown_path = paths.markdown_path(level);
    write_markdown(&format_markdown(level, &result.sections), &markdown_path)?;

    let document = format_json(level, &result.sections);
    let json_path = paths.json_path(level);
    write_json(&document, &json_path)?;

    Ok(LevelReport::Written(WrittenLevel {
        document,
        sections: result
            .sections
            .iter()
            .map(|s| (s.category.clone(), s.items.len()))
            .collect(),
        markdown_path,
        json_path,
    }))
}

fn fetch_spinner(url: &str) -> indicatif::ProgressBar {
    let spinner = indicatif::ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::default_spinner()
        .template("{spinner} {msg} ({elapsed})")
    {
        spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
    }
    spinner.set_message(format!("Fetching {}", url));
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Scrape every level in order. Each level's failure is logged and contained; the
/// combined file is written only when at least one level succeeded.
pub fn scrape_all<F: PageFetcher + ?Sized>(
    levels: &[(JlptLevel, String)],
    fetcher: &mut F,
    paths: &OutputPaths,
    quiet: bool,
) -> RunSummary {
    let mut summary = RunSummary::default();
    let mut combined = CombinedDocument::default();

    for (level, url) in levels {
        let level = *level;
        if !quiet {
            println!("\n{}", RULE);
            println!("Processing JLPT {}", level);
            println!("{}", RULE);
            println!("Fetching {}...", url);
        }

        let spinner = (!quiet).then(|| fetch_spinner(url));
        let outcome = process_level(level, url, fetcher, paths);
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        match outcome {
            Ok(LevelReport::Written(written)) => {
                let words = written.document.total_items;
                summary.total_words += words;
                summary.succeeded.push(level);
                if !quiet {
                    for (category, items) in &written.sections {
                        println!("  Found category: {}", category);
                        println!("    - Found {} items", items);
                    }
                    let categories = written
                        .document
                        .vocabulary
                        .iter()
                        .map(|r| r.category.as_str())
                        .collect::<std::collections::BTreeSet<_>>()
                        .len();
                    println!("\n✓ Saved {} words in {} categories", words, categories);
                    println!("  - Markdown: {}", written.markdown_path.display());
                    println!("  - JSON: {}", written.json_path.display());
                }
                combined.levels.push(written.document);
            }
            Ok(LevelReport::NoContent) => {
                tracing::info!(level = %level, url = %url, "could not find content area");
                println!("Could not find content area");
                println!("No vocabulary found for {}", level);
                summary.skipped.push(level);
            }
            Ok(LevelReport::Empty) => {
                tracing::info!(level = %level, url = %url, "no vocabulary sections");
                println!("No vocabulary found for {}", level);
                summary.skipped.push(level);
            }
            Err(e) => {
                // Display already carries each source's message.
                if e.is_transport() {
                    println!("✗ Error fetching {}: {}", level, e);
                    tracing::error!(level = %level, url = %url, error = %e, "fetch failed");
                } else {
                    println!("✗ Error processing {}: {}", level, e);
                    tracing::error!(level = %level, url = %url, error = %e, "level failed");
                }
                summary.failed.push(level);
            }
        }
    }

    if !combined.levels.is_empty() {
        let path = paths.combined_path();
        match write_json(&combined, &path) {
            Ok(()) => {
                println!("\n✓ Saved combined vocabulary to {}", path.display());
                summary.combined_path = Some(path);
            }
            Err(e) => {
                println!("✗ Error writing combined vocabulary: {}", e);
                tracing::error!(error = %e, "combined write failed");
            }
        }
    }

    summary
}

fn print_summary(summary: &RunSummary) {
    println!("\n{}", RULE);
    println!("Scraping complete!");
    println!("Total words scraped: {}", summary.total_words);
    println!(
        "Levels: {} succeeded, {} skipped, {} failed",
        summary.succeeded.len(),
        summary.skipped.len(),
        summary.failed.len()
    );
    println!("Output formats: Markdown (.md) and JSON (.json)");
    println!("{}\n", RULE);
}

fn output_root(args: &Args, config: Option<&Config>) -> PathBuf {
    args.output_dir
        .clone()
        .or_else(|| config.and_then(|c| c.output_dir.clone()))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn build_client(args: &Args, config: Option<&Config>) -> Result<PoliteClient, CliRunError> {
    let delay_secs = args
        .delay
        .or_else(|| config.and_then(|c| c.request_delay_secs))
        .unwrap_or(DEFAULT_DELAY_SECS);
    let timeout_secs = args
        .timeout
        .or_else(|| config.and_then(|c| c.timeout_secs))
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let user_agent = args
        .user_agent
        .clone()
        .or_else(|| config.and_then(|c| c.user_agent.clone()));

    let mut builder = PoliteClient::builder()
        .delay_secs(delay_secs)
        .timeout_secs(timeout_secs);
    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }
    builder.build().map_err(CliRunError::Client)
}

fn run_scrape(args: &Args, config: Option<&Config>) -> Result<RunSummary, CliRunError> {
    let levels = match config {
        Some(c) => c.level_urls().map_err(CliRunError::InvalidInput)?,
        None => config::default_level_urls(),
    };
    let mut client = build_client(args, config)?;

    let paths = OutputPaths::new(&output_root(args, config));
    paths.create_dirs()?;
    if !args.quiet {
        println!("Markdown output: {}", paths.markdown_dir.display());
        println!("JSON output: {}", paths.json_dir.display());
    }

    let summary = scrape_all(&levels, &mut client, &paths, args.quiet);
    print_summary(&summary);
    Ok(summary)
}

fn load_library(args: &Args, config: Option<&Config>) -> Result<VocabLibrary, CliRunError> {
    let paths = OutputPaths::new(&output_root(args, config));
    let library = VocabLibrary::load(&paths.markdown_dir)?;
    if library.is_empty() && !args.quiet {
        eprintln!(
            "No vocabulary found in {}. Run the scrape first.",
            paths.markdown_dir.display()
        );
    }
    Ok(library)
}

/// Entry point for the CLI. Returns Ok(()) once every level has been attempted, whatever
/// their individual outcomes; Err only for startup failures.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    let config = config::load_config().map_err(CliRunError::InvalidInput)?;
    let config = config.as_ref();

    match args.command.clone().unwrap_or(Command::Scrape) {
        Command::Scrape => {
            run_scrape(args, config)?;
        }
        Command::Search {
            query,
            level,
            category,
            limit,
        } => {
            let library = load_library(args, config)?;
            let hits = library.filter(level, category.as_deref(), query.as_deref().unwrap_or(""));
            for r in hits.iter().take(limit) {
                println!(
                    "{} ({}) - {} [{} / {}]",
                    r.word, r.reading, r.meaning, r.level, r.category
                );
            }
            if !args.quiet {
                println!("{} of {} matches shown", hits.len().min(limit), hits.len());
            }
        }
        Command::Categories { level } => {
            let library = load_library(args, config)?;
            for category in library.categories(level) {
                println!("{}", category);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::error::Error as StdError;

    /// Serves canned pages by URL; unknown URLs get a 404.
    struct FakeSite {
        pages: HashMap<String, String>,
        requested: Vec<String>,
    }

    impl FakeSite {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(u, p)| (u.to_string(), p.to_string()))
                    .collect(),
                requested: Vec::new(),
            }
        }
    }

    impl PageFetcher for FakeSite {
        fn fetch(&mut self, url: &str) -> Result<String, ScraperError> {
            self.requested.push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| ScraperError::HttpStatus {
                    status: 404,
                    url: url.to_string(),
                })
        }
    }

    const N5_PAGE: &str = r#"<html><body><div class="entry-content">
<h2>Greeting</h2>
<table><tr><th>Hiragana</th><th>Romaji</th><th>English</th></tr>
<tr><td>ありがとう</td><td>arigatou</td><td>thank you</td></tr>
<tr><td>はい</td><td>hai</td><td>yes</td></tr></table>
<h3>シェアする</h3>
</div></body></html>"#;

    const N4_PAGE: &str = r#"<html><body><article>
<h2>Color</h2>
<table><tr><th>Hiragana</th><th>Kanji</th><th>English</th></tr>
<tr><td>あお</td><td>青</td><td>blue</td></tr></table>
</article></body></html>"#;

    fn levels(pairs: &[(JlptLevel, &str)]) -> Vec<(JlptLevel, String)> {
        pairs.iter().map(|(l, u)| (*l, u.to_string())).collect()
    }

    #[test]
    fn scrape_all_writes_per_level_and_combined_files() -> Result<(), Box<dyn StdError>> {
        let dir = tempfile::tempdir()?;
        let paths = OutputPaths::new(dir.path());
        paths.create_dirs()?;
        let mut site = FakeSite::new(&[("https://x/n5", N5_PAGE), ("https://x/n4", N4_PAGE)]);
        let lv = levels(&[(JlptLevel::N5, "https://x/n5"), (JlptLevel::N4, "https://x/n4")]);

        let summary = scrape_all(&lv, &mut site, &paths, true);

        assert_eq!(summary.succeeded, vec![JlptLevel::N5, JlptLevel::N4]);
        assert_eq!(summary.total_words, 3);
        assert_eq!(site.requested, vec!["https://x/n5", "https://x/n4"]);

        let md = std::fs::read_to_string(dir.path().join("vocabulary/N5_vocabulary.md"))?;
        assert!(md.contains("| ありがとう | ありがとう | thank you |"));
        let n4: LevelDocument = serde_json::from_str(&std::fs::read_to_string(
            dir.path().join("vocabulary_json/N4_vocabulary.json"),
        )?)?;
        assert_eq!(n4.vocabulary[0].word, "青");
        assert_eq!(n4.vocabulary[0].reading, "あお");

        let combined: CombinedDocument = serde_json::from_str(&std::fs::read_to_string(
            dir.path().join("vocabulary_json/all_vocabulary.json"),
        )?)?;
        assert_eq!(combined.levels.len(), 2);
        assert_eq!(combined.levels[0].level, JlptLevel::N5);
        assert_eq!(summary.combined_path, Some(paths.combined_path()));
        Ok(())
    }

    #[test]
    fn failed_level_does_not_stop_later_levels() -> Result<(), Box<dyn StdError>> {
        let dir = tempfile::tempdir()?;
        let paths = OutputPaths::new(dir.path());
        paths.create_dirs()?;
        let mut site = FakeSite::new(&[("https://x/n4", N4_PAGE)]);
        let lv = levels(&[(JlptLevel::N5, "https://x/missing"), (JlptLevel::N4, "https://x/n4")]);

        let summary = scrape_all(&lv, &mut site, &paths, true);

        assert_eq!(summary.failed, vec![JlptLevel::N5]);
        assert_eq!(summary.succeeded, vec![JlptLevel::N4]);
        assert!(!paths.markdown_path(JlptLevel::N5).exists());
        assert!(paths.markdown_path(JlptLevel::N4).exists());
        assert!(paths.combined_path().exists());
        Ok(())
    }

    #[test]
    fn no_content_and_empty_levels_are_skipped_without_files() -> Result<(), Box<dyn StdError>> {
        let dir = tempfile::tempdir()?;
        let paths = OutputPaths::new(dir.path());
        paths.create_dirs()?;
        let mut site = FakeSite::new(&[
            ("https://x/n3", "<html><body><p>moved</p></body></html>"),
            (
                "https://x/n2",
                r#"<html><body><div class="entry-content"><h2>Intro</h2></div></body></html>"#,
            ),
        ]);
        let lv = levels(&[(JlptLevel::N3, "https://x/n3"), (JlptLevel::N2, "https://x/n2")]);

        let summary = scrape_all(&lv, &mut site, &paths, true);

        assert_eq!(summary.skipped, vec![JlptLevel::N3, JlptLevel::N2]);
        assert!(summary.succeeded.is_empty());
        assert!(summary.combined_path.is_none());
        assert!(!paths.combined_path().exists());
        assert!(!paths.json_path(JlptLevel::N3).exists());
        Ok(())
    }

    #[test]
    fn process_level_reports_each_section_for_later_printing() -> Result<(), Box<dyn StdError>> {
        let dir = tempfile::tempdir()?;
        let paths = OutputPaths::new(dir.path());
        paths.create_dirs()?;
        let mut site = FakeSite::new(&[
            ("https://x/n4", N4_PAGE),
            ("https://x/none", "<html><body><p>moved</p></body></html>"),
        ]);

        match process_level(JlptLevel::N4, "https://x/n4", &mut site, &paths)? {
            LevelReport::Written(written) => {
                assert_eq!(written.sections, vec![("Color".to_string(), 1)]);
                assert_eq!(written.markdown_path, paths.markdown_path(JlptLevel::N4));
            }
            other => panic!("expected Written, got {:?}", other),
        }
        assert!(matches!(
            process_level(JlptLevel::N3, "https://x/none", &mut site, &paths)?,
            LevelReport::NoContent
        ));
        Ok(())
    }

    #[test]
    fn write_failure_is_contained_to_its_level() -> Result<(), Box<dyn StdError>> {
        let dir = tempfile::tempdir()?;
        // Directories are never created, so every write fails.
        let paths = OutputPaths::new(&dir.path().join("missing"));
        let mut site = FakeSite::new(&[("https://x/n5", N5_PAGE)]);
        let lv = levels(&[(JlptLevel::N5, "https://x/n5")]);

        let summary = scrape_all(&lv, &mut site, &paths, true);

        assert_eq!(summary.failed, vec![JlptLevel::N5]);
        assert!(summary.combined_path.is_none());
        Ok(())
    }

    #[test]
    fn level_error_transport_classification() {
        let transport = LevelError::Scraper(ScraperError::HttpStatus {
            status: 500,
            url: "u".into(),
        });
        assert!(transport.is_transport());
        let write = LevelError::Format(FormatError::Io {
            path: PathBuf::from("x"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        });
        assert!(!write.is_transport());
        let message = write.to_string();
        assert_eq!(message, "Failed to write output: x: disk full");
        assert_eq!(message.matches("disk full").count(), 1);
    }

    #[test]
    fn output_paths_layout() {
        let paths = OutputPaths::new(Path::new("out"));
        assert_eq!(
            paths.markdown_path(JlptLevel::N5),
            PathBuf::from("out/vocabulary/N5_vocabulary.md")
        );
        assert_eq!(
            paths.json_path(JlptLevel::N1),
            PathBuf::from("out/vocabulary_json/N1_vocabulary.json")
        );
        assert_eq!(
            paths.combined_path(),
            PathBuf::from("out/vocabulary_json/all_vocabulary.json")
        );
    }

    #[test]
    fn no_arguments_means_scrape() {
        let args = Args::try_parse_from(["jlptscrape"]).unwrap();
        assert!(args.command.is_none());
        assert!(!args.quiet);
    }

    #[test]
    fn search_arguments_parse() {
        let args = Args::try_parse_from([
            "jlptscrape",
            "search",
            "blue",
            "--level",
            "n5",
            "--category",
            "Color",
            "-q",
        ])
        .unwrap();
        assert!(args.quiet);
        assert_eq!(
            args.command,
            Some(Command::Search {
                query: Some("blue".to_string()),
                level: Some(JlptLevel::N5),
                category: Some("Color".to_string()),
                limit: 50,
            })
        );
    }

    #[test]
    fn parse_level_rejects_unknown() {
        assert_eq!(parse_level("N1").unwrap(), JlptLevel::N1);
        assert!(parse_level("N0").is_err());
    }

    #[test]
    fn cli_run_error_exit_codes() {
        assert_eq!(CliRunError::InvalidInput("x".into()).exit_code(), 1);
        assert_eq!(
            CliRunError::OutputDir {
                path: PathBuf::from("x"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            }
            .exit_code(),
            3
        );
        assert_eq!(
            CliRunError::Library(LibraryError::Io {
                path: PathBuf::from("x"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "bad"),
            })
            .exit_code(),
            3
        );
    }

    #[test]
    fn output_root_prefers_flag_then_config() {
        let args = Args::try_parse_from(["jlptscrape"]).unwrap();
        assert_eq!(output_root(&args, None), PathBuf::from("."));
        let config = Config {
            output_dir: Some(PathBuf::from("cfg")),
            ..Config::default()
        };
        assert_eq!(output_root(&args, Some(&config)), PathBuf::from("cfg"));
        let args = Args::try_parse_from(["jlptscrape", "--output-dir", "flag"]).unwrap();
        assert_eq!(output_root(&args, Some(&config)), PathBuf::from("flag"));
    }
}
