use chanwatch_core::{
    CoreError, MatchRecord, MatchStatistics, OutputError, ScanSummary, TimeWindow,
};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[cfg(test)]
mod tests;

const RULE_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Live,
    Archived,
}

impl ReportKind {
    fn file_tag(self) -> &'static str {
        match self {
            ReportKind::Live => "filtered_raw",
            ReportKind::Archived => "archived_filtered",
        }
    }
}

/// Run details printed in the text report header.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub board: &'a str,
    pub kind: ReportKind,
    pub window: TimeWindow,
    pub keywords: &'a [String],
    pub summary: &'a ScanSummary,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenReport {
    pub json_path: PathBuf,
    pub text_path: PathBuf,
}

pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes the JSON and text reports. Nothing is written for an empty
    /// result set.
    pub fn write(
        &self,
        context: &ReportContext<'_>,
        records: &[MatchRecord],
    ) -> Result<Option<WrittenReport>, CoreError> {
        if records.is_empty() {
            info!("No matches found with current criteria, nothing written");
            return Ok(None);
        }

        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            error!(
                "Failed to create output directory {}: {}",
                self.output_dir.display(),
                e
            );
            OutputError::DirectoryCreation {
                path: self.output_dir.display().to_string(),
            }
        })?;

        let stem = format!(
            "{}_{}_{}",
            context.board,
            context.kind.file_tag(),
            context.generated_at.format("%Y%m%d_%H%M%S")
        );
        let json_path = self.output_dir.join(format!("{}.json", stem));
        let text_path = self.output_dir.join(format!("{}.txt", stem));

        let json = serde_json::to_string_pretty(records)?;
        write_file(&json_path, &json)?;
        write_file(&text_path, &render_text(context, records))?;

        info!(
            "Saved {} posts to {} and {}",
            records.len(),
            json_path.display(),
            text_path.display()
        );

        Ok(Some(WrittenReport {
            json_path,
            text_path,
        }))
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), OutputError> {
    std::fs::write(path, contents).map_err(|e| {
        error!("Failed to write {}: {}", path.display(), e);
        OutputError::WriteFailed {
            path: path.display().to_string(),
        }
    })
}

/// Human-readable rendering of a report.
pub fn render_text(context: &ReportContext<'_>, records: &[MatchRecord]) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    match context.kind {
        ReportKind::Live => out.push_str(&format!("4chan /{}/ Filtered Posts\n", context.board)),
        ReportKind::Archived => out.push_str(&format!(
            "ARCHIVED THREADS ANALYSIS - /{}/\n",
            context.board
        )),
    }
    out.push_str(&format!(
        "Generated: {}\n",
        context.generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("Time Range: {}\n", context.window.describe()));
    out.push_str(&format!("Keywords: {}\n", context.keywords.join(", ")));
    out.push_str(&format!(
        "Threads processed: {}\n",
        context.summary.threads_checked
    ));
    out.push_str(&format!("Total posts: {}\n", context.summary.posts_checked));
    out.push_str(&format!("Total Matches: {}\n", records.len()));

    if context.kind == ReportKind::Archived {
        let stats = MatchStatistics::from_records(records);
        out.push_str(&format!(
            "Unique threads with matches: {}\n",
            stats.unique_threads
        ));
        out.push_str(&format!(
            "Original posts (thread starters): {}\n",
            stats.original_posts
        ));
        out.push_str(&format!(
            "Posts with files/images: {}\n",
            stats.posts_with_files
        ));
    }
    out.push_str(&format!("{}\n\n", rule));

    for (i, post) in records.iter().enumerate() {
        out.push_str(&format!(
            "POST #{} - Keywords: {}\n",
            i + 1,
            post.matched_keywords.join(", ")
        ));
        out.push_str(&format!("{}\n", rule));
        out.push_str(&format!("Thread: {}\n", post.thread_title));
        if post.thread_is_archived {
            out.push_str(&format!("Thread #: {} (Archived)\n", post.thread_no));
        }
        out.push_str(&format!("Time: {}\n", post.human_time));

        out.push_str(&format!("Poster: {}", post.poster_name));
        if !post.poster_id.is_empty() {
            out.push_str(&format!(" (ID: {})", post.poster_id));
        }
        if let Some(flag) = &post.poster_flag {
            out.push_str(&format!(" ({})", flag));
        }
        out.push('\n');

        out.push_str(&format!("URL: {}\n", post.post_url));
        out.push_str(&format!("Original Post: {}\n", post.is_original_post));
        out.push_str(&format!(
            "Replies: {}, Images: {}\n",
            post.replies, post.images
        ));
        if let (Some(name), Some(url)) = (&post.file_name, &post.file_url) {
            out.push_str(&format!("File: {} ({})\n", name, url));
        }
        out.push_str(&format!("{}\n", "-".repeat(40)));
        out.push_str(&format!("{}\n", post.post_text));
        out.push_str(&format!("\n{}\n\n", rule));
    }

    out
}
