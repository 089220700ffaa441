//! Post normalization and keyword matching.
//!
//! Everything here is pure: no I/O, no shared state. A [`PostFilter`] can be
//! cloned into as many callers as needed.

use crate::config::TimeWindow;
use crate::types::{CleanedPost, MatchResult, PostMatch, RawPost};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TAG_RE: Regex = Regex::new(r"<[^<]+?>").unwrap();
    static ref QUOTE_LINK_RE: Regex = Regex::new(r">>\d+>").unwrap();
    static ref GREENTEXT_RE: Regex = Regex::new(r"(?m)^>+ ?").unwrap();
}

const ENTITIES: [(&str, &str); 5] = [
    ("&gt;", ">"),
    ("&lt;", "<"),
    ("&quot;", "\""),
    ("&amp;", "&"),
    ("&#039;", "'"),
];

/// Turns board comment HTML into plain text.
///
/// Tags are dropped (markup `<br>` included), the five entities the board
/// emits are decoded, an escaped `&lt;br&gt;` becomes a newline, `>>123>`
/// backreferences are removed and every greentext line starts with exactly
/// `> `. A reply link directly followed by a quoted line collapses into one
/// `>>123>` backreference and is removed with it.
pub fn normalize(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return String::new(),
    };

    let mut text = TAG_RE.replace_all(raw, "").into_owned();

    for (entity, decoded) in ENTITIES {
        text = text.replace(entity, decoded);
    }

    let text = text.replace("<br>", "\n").replace("<wbr>", "");
    let text = QUOTE_LINK_RE.replace_all(&text, "");
    let text = GREENTEXT_RE.replace_all(text.trim(), "> ");

    text.trim().to_string()
}

/// Returns the keywords found in `text`, case-insensitively, in keyword order.
pub fn match_keywords(text: &str, keywords: &[String]) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let text_lower = text.to_lowercase();
    let mut matched: Vec<String> = Vec::new();

    for keyword in keywords {
        if keyword.is_empty() || matched.contains(keyword) {
            continue;
        }
        if text_lower.contains(&keyword.to_lowercase()) {
            matched.push(keyword.clone());
        }
    }

    matched
}

/// Inclusive on both ends.
pub fn in_window(timestamp: i64, start: i64, end: i64) -> bool {
    start <= timestamp && timestamp <= end
}

#[derive(Debug, Clone)]
pub struct PostFilter {
    keywords: Vec<String>,
    window: TimeWindow,
}

impl PostFilter {
    pub fn new(keywords: Vec<String>, window: TimeWindow) -> Self {
        Self { keywords, window }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn accepts_time(&self, timestamp: i64) -> bool {
        in_window(timestamp, self.window.start(), self.window.end())
    }

    pub fn clean(&self, post: &RawPost) -> CleanedPost {
        CleanedPost {
            clean_text: normalize(post.comment_html.as_deref()),
            clean_title: normalize(post.subject_html.as_deref()),
        }
    }

    /// Returns the cleaned post and its keywords when it falls inside the
    /// window and matches at least one keyword.
    pub fn evaluate(&self, post: &RawPost) -> Option<PostMatch> {
        if !self.accepts_time(post.timestamp) {
            return None;
        }

        let cleaned = self.clean(post);
        let full_text = format!("{} {}", cleaned.clean_title, cleaned.clean_text);
        let result = MatchResult {
            matched_keywords: match_keywords(&full_text, &self.keywords),
        };

        if result.is_match() {
            Some(PostMatch { cleaned, result })
        } else {
            None
        }
    }
}
