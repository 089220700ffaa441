//! Scan pipelines: fetch threads from a [`PostSource`], run every post
//! through the [`PostFilter`] and collect match records in encounter order.

use chan_client::{CatalogPage, ChanApiClient};
use chanwatch_core::{
    CoreError, ErrorExt, MatchRecord, PostFilter, PostLocation, RawPost, ScanConfig, ScanSummary,
};
use tracing::{debug, info, warn};


const PREVIEW_CHARS: usize = 100;

/// Where posts come from. Implemented by the HTTP client; tests use an
/// in-memory board.
pub trait PostSource {
    async fn catalog(&self, board: &str) -> Result<Vec<CatalogPage>, CoreError>;

    async fn thread(&self, board: &str, thread_no: i64) -> Result<Vec<RawPost>, CoreError>;

    async fn archive(&self, board: &str) -> Result<Vec<i64>, CoreError>;
}

impl PostSource for ChanApiClient {
    async fn catalog(&self, board: &str) -> Result<Vec<CatalogPage>, CoreError> {
        self.get_catalog(board).await
    }

    async fn thread(&self, board: &str, thread_no: i64) -> Result<Vec<RawPost>, CoreError> {
        Ok(self.get_thread(board, thread_no).await?.posts)
    }

    async fn archive(&self, board: &str) -> Result<Vec<i64>, CoreError> {
        self.get_archive(board).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub records: Vec<MatchRecord>,
    pub summary: ScanSummary,
}

pub struct Scanner<S> {
    source: S,
    config: ScanConfig,
    filter: PostFilter,
}

impl<S: PostSource> Scanner<S> {
    pub fn new(source: S, config: ScanConfig) -> Self {
        let filter = PostFilter::new(config.keywords.clone(), config.window);
        Self {
            source,
            config,
            filter,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Scans the threads currently listed in the board catalog.
    ///
    /// Only threads whose OP falls inside the window are fetched. A thread that
    /// fails to load is logged and skipped; a failing catalog aborts the scan.
    pub async fn scan_live(&self) -> Result<ScanOutcome, CoreError> {
        let board = self.config.board.as_str();
        info!(
            "Scanning live threads on /{}/ ({}), keywords: {}",
            board,
            self.config.window.describe(),
            self.config.keywords.join(", ")
        );

        let catalog = self.source.catalog(board).await?;
        let mut outcome = ScanOutcome::default();

        for page in &catalog {
            for thread in &page.threads {
                outcome.summary.threads_checked += 1;

                if !self.filter.accepts_time(thread.time) {
                    continue;
                }

                match self.source.thread(board, thread.no).await {
                    Ok(posts) => self.evaluate_thread(thread.no, &posts, false, &mut outcome),
                    Err(e) => {
                        warn!("Skipping thread {}: {}", thread.no, e);
                        e.log_warn();
                    }
                }
            }
        }

        self.log_summary(&outcome);
        Ok(outcome)
    }

    /// Scans up to `max_threads` archived threads of the board.
    pub async fn scan_archived(&self) -> Result<ScanOutcome, CoreError> {
        let board = self.config.board.as_str();
        info!(
            "Scanning archived threads on /{}/ (max {}), keywords: {}",
            board,
            self.config.max_threads,
            self.config.keywords.join(", ")
        );

        let archive = self.source.archive(board).await?;
        let mut outcome = ScanOutcome::default();

        if archive.len() > self.config.max_threads {
            info!(
                "Archive lists {} threads, processing the first {}",
                archive.len(),
                self.config.max_threads
            );
        }

        for (i, &thread_no) in archive.iter().take(self.config.max_threads).enumerate() {
            outcome.summary.threads_checked += 1;
            debug!("Processing archived thread #{}: {}", i + 1, thread_no);

            match self.source.thread(board, thread_no).await {
                Ok(posts) => self.evaluate_thread(thread_no, &posts, true, &mut outcome),
                Err(e) => {
                    warn!("Error processing archived thread {}: {}", thread_no, e);
                    e.log_warn();
                }
            }
        }

        self.log_summary(&outcome);
        Ok(outcome)
    }

    pub async fn count_archived(&self) -> Result<usize, CoreError> {
        let board = self.config.board.as_str();
        let count = self.source.archive(board).await?.len();
        info!("Total archived threads available on /{}/: {}", board, count);
        Ok(count)
    }

    fn evaluate_thread(
        &self,
        thread_no: i64,
        posts: &[RawPost],
        archived: bool,
        outcome: &mut ScanOutcome,
    ) {
        let location = PostLocation {
            board: &self.config.board,
            thread_no,
            thread_is_archived: archived,
        };

        for post in posts {
            outcome.summary.posts_checked += 1;
            if !self.filter.accepts_time(post.timestamp) {
                continue;
            }
            outcome.summary.posts_in_window += 1;

            let Some(post_match) = self.filter.evaluate(post) else {
                continue;
            };

            let record = MatchRecord::new(location, post, post_match, &self.config.urls);
            outcome.summary.matches += 1;

            info!(
                "Match #{}: {:?} in /{}/thread/{}",
                outcome.summary.matches, record.matched_keywords, record.board, thread_no
            );
            debug!("  Thread: {}", preview(&record.thread_title, 50));
            debug!("  Time: {}", record.human_time);
            debug!("  Text preview: {}", preview(&record.post_text, PREVIEW_CHARS));

            outcome.records.push(record);
        }
    }

    fn log_summary(&self, outcome: &ScanOutcome) {
        let summary = &outcome.summary;
        info!(
            "Results: {} threads checked, {} posts checked, {} in window, {} matching",
            summary.threads_checked, summary.posts_checked, summary.posts_in_window, summary.matches
        );
    }
}

/// First `max_chars` characters, with an ellipsis when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
