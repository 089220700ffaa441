#[cfg(test)]
mod tests {
    use crate::{render_text, ReportContext, ReportKind, ReportWriter};
    use chanwatch_core::{MatchRecord, ScanSummary, TimeWindow};
    use chrono::{TimeZone, Utc};

    fn record(post_no: i64) -> MatchRecord {
        MatchRecord {
            board: "pol".to_string(),
            thread_no: 100,
            post_no,
            thread_title: "Election General".to_string(),
            post_text: "> be me\nvote for Bidén".to_string(),
            poster_name: "Anonymous".to_string(),
            poster_id: "aB3dE5fG".to_string(),
            poster_flag: Some("Canada".to_string()),
            timestamp: 1_000_000_000,
            human_time: "2001-09-09 01:46:40".to_string(),
            replies: 3,
            images: 1,
            thread_url: "https://boards.4chan.org/pol/thread/100".to_string(),
            post_url: format!("https://boards.4chan.org/pol/thread/100#p{}", post_no),
            is_original_post: post_no == 100,
            thread_is_archived: false,
            file_name: None,
            file_url: None,
            matched_keywords: vec!["vote".to_string(), "election".to_string()],
        }
    }

    fn context<'a>(
        kind: ReportKind,
        keywords: &'a [String],
        summary: &'a ScanSummary,
    ) -> ReportContext<'a> {
        ReportContext {
            board: "pol",
            kind,
            window: TimeWindow::new(0, 1_000_000_000).unwrap(),
            keywords,
            summary,
            generated_at: Utc.with_ymd_and_hms(2025, 10, 21, 8, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_empty_results_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("out");
        let writer = ReportWriter::new(&output_dir);
        let keywords = vec!["vote".to_string()];
        let summary = ScanSummary::default();

        let written = writer
            .write(&context(ReportKind::Live, &keywords, &summary), &[])
            .unwrap();

        assert!(written.is_none());
        assert!(!output_dir.exists());
    }

    #[test]
    fn test_write_json_and_text() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("output_official_api"));
        let keywords = vec!["vote".to_string(), "election".to_string()];
        let summary = ScanSummary {
            threads_checked: 10,
            posts_checked: 250,
            posts_in_window: 40,
            matches: 2,
        };
        let records = vec![record(100), record(101)];

        let written = writer
            .write(&context(ReportKind::Live, &keywords, &summary), &records)
            .unwrap()
            .unwrap();

        assert!(written
            .json_path
            .ends_with("output_official_api/pol_filtered_raw_20251021_083000.json"));
        assert!(written
            .text_path
            .ends_with("output_official_api/pol_filtered_raw_20251021_083000.txt"));

        let json = std::fs::read_to_string(&written.json_path).unwrap();
        let parsed: Vec<MatchRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, records);
        assert!(json.contains("Bidén"), "non-ASCII should not be escaped");

        let text = std::fs::read_to_string(&written.text_path).unwrap();
        assert!(text.starts_with("4chan /pol/ Filtered Posts\n"));
        assert!(text.contains("Total Matches: 2"));
        assert!(text.contains("POST #2 - Keywords: vote, election"));
    }

    #[test]
    fn test_render_text_post_block() {
        let keywords = vec!["vote".to_string()];
        let summary = ScanSummary::default();
        let mut post = record(101);
        post.file_name = Some("chart.png".to_string());
        post.file_url = Some("https://i.4cdn.org/pol/99.png".to_string());

        let text = render_text(&context(ReportKind::Live, &keywords, &summary), &[post]);

        assert!(text.contains("Generated: 2025-10-21 08:30:00\n"));
        assert!(text.contains("Time Range: 1970-01-01 00:00:00 to 2001-09-09 01:46:40\n"));
        assert!(text.contains("Poster: Anonymous (ID: aB3dE5fG) (Canada)\n"));
        assert!(text.contains("URL: https://boards.4chan.org/pol/thread/100#p101\n"));
        assert!(text.contains("Replies: 3, Images: 1\n"));
        assert!(text.contains("File: chart.png (https://i.4cdn.org/pol/99.png)\n"));
        assert!(text.contains("----------------------------------------\n> be me\nvote for Bidén\n"));
        assert!(!text.contains("Thread #:"));
    }

    #[test]
    fn test_render_archived_header() {
        let keywords = vec!["border".to_string()];
        let summary = ScanSummary::default();
        let mut post = record(100);
        post.thread_is_archived = true;
        post.poster_id = String::new();
        post.poster_flag = None;

        let text = render_text(&context(ReportKind::Archived, &keywords, &summary), &[post]);

        assert!(text.starts_with("ARCHIVED THREADS ANALYSIS - /pol/\n"));
        assert!(text.contains("Unique threads with matches: 1\n"));
        assert!(text.contains("Original posts (thread starters): 1\n"));
        assert!(text.contains("Thread #: 100 (Archived)\n"));
        assert!(text.contains("Poster: Anonymous\n"));
    }
}
