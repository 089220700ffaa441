use chrono::DateTime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BOARDS_HOST: &str = "4chan.org";
pub const DEFAULT_MEDIA_HOST: &str = "i.4cdn.org";

/// A post exactly as the board API returns it.
///
/// Only `com`, `sub`, `time` and `no` feed the filter; the rest is carried
/// through to the match record untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    #[serde(rename = "no")]
    pub number: i64,
    #[serde(rename = "time", default)]
    pub timestamp: i64,
    #[serde(rename = "com", default)]
    pub comment_html: Option<String>,
    #[serde(rename = "sub", default)]
    pub subject_html: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "id", default)]
    pub poster_id: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub replies: u32,
    #[serde(default)]
    pub images: u32,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub tim: Option<i64>,
    /// Thread this post replies to, 0 for an OP.
    #[serde(default)]
    pub resto: i64,
}

impl RawPost {
    pub fn is_original_post(&self) -> bool {
        self.resto == 0
    }

    pub fn has_file(&self) -> bool {
        self.tim.is_some() && self.ext.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanedPost {
    pub clean_text: String,
    pub clean_title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub matched_keywords: Vec<String>,
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        !self.matched_keywords.is_empty()
    }
}

/// A post that passed the filter, together with what it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostMatch {
    pub cleaned: CleanedPost,
    pub result: MatchResult,
}

/// Where a matched post lives on the board.
#[derive(Debug, Clone, Copy)]
pub struct PostLocation<'a> {
    pub board: &'a str,
    pub thread_no: i64,
    pub thread_is_archived: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardUrls {
    pub boards_host: String,
    pub media_host: String,
}

impl BoardUrls {
    pub fn new(boards_host: impl Into<String>, media_host: impl Into<String>) -> Self {
        Self {
            boards_host: boards_host.into(),
            media_host: media_host.into(),
        }
    }

    pub fn thread_url(&self, board: &str, thread_no: i64) -> String {
        format!(
            "https://boards.{}/{}/thread/{}",
            self.boards_host, board, thread_no
        )
    }

    pub fn post_url(&self, board: &str, thread_no: i64, post_no: i64) -> String {
        format!("{}#p{}", self.thread_url(board, thread_no), post_no)
    }

    pub fn file_url(&self, board: &str, tim: i64, ext: &str) -> String {
        format!("https://{}/{}/{}{}", self.media_host, board, tim, ext)
    }
}

impl Default for BoardUrls {
    fn default() -> Self {
        Self::new(DEFAULT_BOARDS_HOST, DEFAULT_MEDIA_HOST)
    }
}

/// One matched post as written to the report files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub board: String,
    pub thread_no: i64,
    pub post_no: i64,
    pub thread_title: String,
    pub post_text: String,
    pub poster_name: String,
    pub poster_id: String,
    pub poster_flag: Option<String>,
    pub timestamp: i64,
    pub human_time: String,
    pub replies: u32,
    pub images: u32,
    pub thread_url: String,
    pub post_url: String,
    pub is_original_post: bool,
    pub thread_is_archived: bool,
    pub file_name: Option<String>,
    pub file_url: Option<String>,
    pub matched_keywords: Vec<String>,
}

impl MatchRecord {
    pub fn new(
        location: PostLocation<'_>,
        post: &RawPost,
        post_match: PostMatch,
        urls: &BoardUrls,
    ) -> Self {
        let PostMatch { cleaned, result } = post_match;
        let board = location.board;

        let (file_name, file_url) = match (&post.tim, &post.ext) {
            (Some(tim), Some(ext)) => (
                Some(format!(
                    "{}{}",
                    post.filename.as_deref().unwrap_or_default(),
                    ext
                )),
                Some(urls.file_url(board, *tim, ext)),
            ),
            _ => (None, None),
        };

        Self {
            board: board.to_string(),
            thread_no: location.thread_no,
            post_no: post.number,
            thread_title: if cleaned.clean_title.is_empty() {
                "No Title".to_string()
            } else {
                cleaned.clean_title
            },
            post_text: cleaned.clean_text,
            poster_name: post
                .name
                .clone()
                .unwrap_or_else(|| "Anonymous".to_string()),
            poster_id: post.poster_id.clone().unwrap_or_default(),
            poster_flag: post.country_name.clone(),
            timestamp: post.timestamp,
            human_time: format_timestamp(post.timestamp),
            replies: post.replies,
            images: post.images,
            thread_url: urls.thread_url(board, location.thread_no),
            post_url: urls.post_url(board, location.thread_no, post.number),
            is_original_post: post.is_original_post(),
            thread_is_archived: location.thread_is_archived,
            file_name,
            file_url,
            matched_keywords: result.matched_keywords,
        }
    }

    pub fn has_file(&self) -> bool {
        self.file_url.is_some()
    }
}

/// Counters for a single scan run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub threads_checked: u64,
    pub posts_checked: u64,
    pub posts_in_window: u64,
    pub matches: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchStatistics {
    pub unique_threads: usize,
    pub original_posts: usize,
    pub posts_with_files: usize,
}

impl MatchStatistics {
    pub fn from_records(records: &[MatchRecord]) -> Self {
        let mut threads: Vec<i64> = records.iter().map(|r| r.thread_no).collect();
        threads.sort_unstable();
        threads.dedup();

        Self {
            unique_threads: threads.len(),
            original_posts: records.iter().filter(|r| r.is_original_post).count(),
            posts_with_files: records.iter().filter(|r| r.has_file()).count(),
        }
    }
}

/// Renders a Unix timestamp as `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn format_timestamp(unix_timestamp: i64) -> String {
    DateTime::from_timestamp(unix_timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_match() -> PostMatch {
        PostMatch {
            cleaned: CleanedPost {
                clean_text: "Vote for Biden".to_string(),
                clean_title: String::new(),
            },
            result: MatchResult {
                matched_keywords: vec!["biden".to_string()],
            },
        }
    }

    #[test]
    fn test_raw_post_deserializes_board_fields() {
        let json = r#"{
            "no": 519433413,
            "resto": 519431000,
            "time": 1761000000,
            "com": "&gt;&gt;519431737&gt;hello",
            "name": "Anonymous",
            "id": "aB3dE5fG",
            "country_name": "Canada",
            "filename": "chart",
            "ext": ".png",
            "tim": 1761000000123
        }"#;

        let post: RawPost = serde_json::from_str(json).unwrap();
        assert_eq!(post.number, 519433413);
        assert_eq!(post.timestamp, 1761000000);
        assert_eq!(post.subject_html, None);
        assert_eq!(post.poster_id.as_deref(), Some("aB3dE5fG"));
        assert!(!post.is_original_post());
        assert!(post.has_file());
        assert_eq!(post.replies, 0);
    }

    #[test]
    fn test_raw_post_rejects_wrong_types() {
        let json = r#"{"no": 1, "time": "yesterday"}"#;
        assert!(serde_json::from_str::<RawPost>(json).is_err());
    }

    #[test]
    fn test_board_urls() {
        let urls = BoardUrls::default();
        assert_eq!(
            urls.thread_url("pol", 123),
            "https://boards.4chan.org/pol/thread/123"
        );
        assert_eq!(
            urls.post_url("pol", 123, 456),
            "https://boards.4chan.org/pol/thread/123#p456"
        );
        assert_eq!(
            urls.file_url("pol", 1761000000123, ".png"),
            "https://i.4cdn.org/pol/1761000000123.png"
        );
    }

    #[test]
    fn test_match_record_defaults() {
        let post = RawPost {
            number: 42,
            timestamp: 0,
            ..Default::default()
        };
        let location = PostLocation {
            board: "pol",
            thread_no: 42,
            thread_is_archived: false,
        };

        let record = MatchRecord::new(location, &post, sample_match(), &BoardUrls::default());
        assert_eq!(record.thread_title, "No Title");
        assert_eq!(record.poster_name, "Anonymous");
        assert_eq!(record.poster_id, "");
        assert_eq!(record.human_time, "1970-01-01 00:00:00");
        assert!(record.is_original_post);
        assert!(!record.has_file());
        assert_eq!(record.post_url, "https://boards.4chan.org/pol/thread/42#p42");
        assert_eq!(record.matched_keywords, vec!["biden"]);
    }

    #[test]
    fn test_match_record_file_fields() {
        let post = RawPost {
            number: 7,
            resto: 3,
            filename: Some("chart".to_string()),
            ext: Some(".png".to_string()),
            tim: Some(99),
            ..Default::default()
        };
        let location = PostLocation {
            board: "pol",
            thread_no: 3,
            thread_is_archived: true,
        };

        let record = MatchRecord::new(location, &post, sample_match(), &BoardUrls::default());
        assert_eq!(record.file_name.as_deref(), Some("chart.png"));
        assert_eq!(record.file_url.as_deref(), Some("https://i.4cdn.org/pol/99.png"));
        assert!(record.thread_is_archived);
        assert!(!record.is_original_post);
    }

    #[test]
    fn test_format_timestamp_out_of_range() {
        assert_eq!(format_timestamp(i64::MAX), "Unknown");
        assert_eq!(format_timestamp(1_000_000_000), "2001-09-09 01:46:40");
    }

    #[test]
    fn test_match_statistics() {
        let post = RawPost::default();
        let urls = BoardUrls::default();
        let op = MatchRecord::new(
            PostLocation {
                board: "pol",
                thread_no: 1,
                thread_is_archived: false,
            },
            &post,
            sample_match(),
            &urls,
        );
        let mut reply = op.clone();
        reply.is_original_post = false;
        let mut other = op.clone();
        other.thread_no = 2;
        other.file_url = Some("https://i.4cdn.org/pol/1.jpg".to_string());

        let stats = MatchStatistics::from_records(&[op, reply, other]);
        assert_eq!(stats.unique_threads, 2);
        assert_eq!(stats.original_posts, 2);
        assert_eq!(stats.posts_with_files, 1);
    }
}
