use chan_client::ChanApiClient;
use chanwatch_core::{
    CoreError, ErrorExt, FileConfig, MatchStatistics, ScanConfig, TimeWindow,
    DEFAULT_ARCHIVE_OUTPUT_DIR, DEFAULT_LAST_HOURS, DEFAULT_LIVE_OUTPUT_DIR,
};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use report_writer::{ReportContext, ReportKind, ReportWriter};
use scan_service::{ScanOutcome, Scanner};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "chanwatch=info,scan_service=info,chan_client=info,report_writer=info";

#[derive(Parser, Debug)]
#[command(name = "chanwatch", version, about = "Scan imageboard posts for keywords")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan the threads currently listed in the board catalog
    Scan(ScanArgs),
    /// Scan archived threads
    Archive(ArchiveArgs),
    /// Count the archived threads of a board
    CountArchived {
        #[arg(short, long)]
        board: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Board to scan, e.g. "pol"
    #[arg(short, long)]
    board: Option<String>,

    /// Keyword to look for (repeatable)
    #[arg(short, long = "keyword")]
    keywords: Vec<String>,

    /// Only posts from the last N hours
    #[arg(long, conflicts_with_all = ["start", "end"])]
    hours: Option<u64>,

    /// Window start (RFC 3339)
    #[arg(long)]
    start: Option<DateTime<Utc>>,

    /// Window end (RFC 3339), defaults to now
    #[arg(long)]
    end: Option<DateTime<Utc>>,

    /// Directory for the JSON and text reports
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ScanArgs {
    #[command(flatten)]
    filter: FilterArgs,
}

#[derive(Args, Debug)]
struct ArchiveArgs {
    #[command(flatten)]
    filter: FilterArgs,

    /// Maximum number of archived threads to process
    #[arg(long)]
    max_threads: Option<usize>,
}

impl FilterArgs {
    fn apply(&self, file: &mut FileConfig) {
        if let Some(board) = &self.board {
            file.board = Some(board.clone());
        }
        if !self.keywords.is_empty() {
            file.keywords = Some(self.keywords.clone());
        }
        if self.hours.is_some() || self.start.is_some() || self.end.is_some() {
            file.window.last_hours = self.hours;
            file.window.start = self.start;
            file.window.end = self.end;
        }
        if let Some(dir) = &self.output_dir {
            file.output_dir = Some(dir.clone());
        }
    }
}

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    tracing::info!("Starting chanwatch");

    if let Err(e) = run(cli).await {
        e.log_error();
        eprintln!("Error: {}", e.user_friendly_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CoreError> {
    let mut file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let now = Utc::now();

    match cli.command {
        Command::Scan(args) => {
            args.filter.apply(&mut file);
            let default_window = TimeWindow::last_hours(now, DEFAULT_LAST_HOURS)?;
            let config = file.resolve(now, default_window, DEFAULT_LIVE_OUTPUT_DIR)?;
            let scanner = Scanner::new(ChanApiClient::new(&file.client_settings())?, config);

            tracing::warn!("Only currently active threads are available through the catalog");
            let outcome = scanner.scan_live().await;
            scanner.source().get_metrics().await.log_summary();
            save(scanner.config(), ReportKind::Live, &outcome?, now)
        }
        Command::Archive(args) => {
            args.filter.apply(&mut file);
            if let Some(max) = args.max_threads {
                file.max_threads = Some(max);
            }
            let config = file.resolve(now, TimeWindow::unbounded(), DEFAULT_ARCHIVE_OUTPUT_DIR)?;
            let scanner = Scanner::new(ChanApiClient::new(&file.client_settings())?, config);

            let outcome = scanner.scan_archived().await;
            scanner.source().get_metrics().await.log_summary();
            let outcome = outcome?;
            let stats = MatchStatistics::from_records(&outcome.records);
            tracing::info!(
                "Unique threads with matches: {}, original posts: {}, posts with files: {}",
                stats.unique_threads,
                stats.original_posts,
                stats.posts_with_files
            );
            save(scanner.config(), ReportKind::Archived, &outcome, now)
        }
        Command::CountArchived { board } => {
            if board.is_some() {
                file.board = board;
            }
            let config = file.resolve(now, TimeWindow::unbounded(), DEFAULT_ARCHIVE_OUTPUT_DIR)?;
            let scanner = Scanner::new(ChanApiClient::new(&file.client_settings())?, config);

            let count = scanner.count_archived().await;
            scanner.source().get_metrics().await.log_summary();
            let count = count?;
            println!(
                "Total archived threads available on /{}/: {}",
                scanner.config().board,
                count
            );
            Ok(())
        }
    }
}

fn save(
    config: &ScanConfig,
    kind: ReportKind,
    outcome: &ScanOutcome,
    generated_at: DateTime<Utc>,
) -> Result<(), CoreError> {
    let writer = ReportWriter::new(&config.output_dir);
    let context = ReportContext {
        board: &config.board,
        kind,
        window: config.window,
        keywords: &config.keywords,
        summary: &outcome.summary,
        generated_at,
    };

    match writer.write(&context, &outcome.records)? {
        Some(written) => {
            println!("Saved {} posts to:", outcome.records.len());
            println!("  JSON: {}", written.json_path.display());
            println!("  Text: {}", written.text_path.display());
        }
        None => println!("No matches found with current criteria"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_command_parsing() {
        let cli = Cli::try_parse_from([
            "chanwatch", "scan", "--board", "g", "-k", "rust", "-k", "linux", "--hours", "6",
        ])
        .unwrap();

        let Command::Scan(args) = cli.command else {
            panic!("Expected Scan command");
        };
        assert_eq!(args.filter.board.as_deref(), Some("g"));
        assert_eq!(args.filter.keywords, vec!["rust", "linux"]);
        assert_eq!(args.filter.hours, Some(6));
    }

    #[test]
    fn test_hours_conflicts_with_start() {
        let result = Cli::try_parse_from([
            "chanwatch",
            "scan",
            "--hours",
            "6",
            "--start",
            "2025-10-21T00:00:00Z",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_archive_command_overrides() {
        let cli = Cli::try_parse_from([
            "chanwatch",
            "--config",
            "chanwatch.toml",
            "archive",
            "--max-threads",
            "50",
            "-k",
            "border",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("chanwatch.toml")));

        let Command::Archive(args) = cli.command else {
            panic!("Expected Archive command");
        };
        assert_eq!(args.max_threads, Some(50));

        let mut file = FileConfig {
            board: Some("int".to_string()),
            ..Default::default()
        };
        args.filter.apply(&mut file);
        let config = file
            .resolve(Utc::now(), TimeWindow::unbounded(), DEFAULT_ARCHIVE_OUTPUT_DIR)
            .unwrap();

        assert_eq!(config.board, "int");
        assert_eq!(config.keywords, vec!["border"]);
        assert!(config.window.is_unbounded());
        assert_eq!(config.output_dir, PathBuf::from("output_archived"));
    }

    #[test]
    fn test_window_flags_replace_file_window() {
        let args = FilterArgs {
            start: Some("2025-10-21T00:00:00Z".parse().unwrap()),
            ..Default::default()
        };
        let mut file = FileConfig::default();
        file.window.last_hours = Some(24);

        args.apply(&mut file);
        assert_eq!(file.window.last_hours, None);
        assert!(file.window.start.is_some());
    }
}
