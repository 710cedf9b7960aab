//! Location references for fulltext pages
//!
//! A page location carries a fragment identifier naming a sentence and a
//! query string of the form `<start>-<end>` naming a 1-based inclusive word
//! range. Token elements on the page are addressed by the composite
//! identifier `<sentenceId>w<position>`.

use serde::{Deserialize, Serialize};

/// Read-only snapshot of a page location, split into its fragment and query
/// parts. Both parts are stored without their `#`/`?` prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    fragment: Option<String>,
    query: Option<String>,
}

impl Location {
    pub fn new(fragment: Option<String>, query: Option<String>) -> Self {
        Self {
            fragment: fragment.filter(|s| !s.is_empty()),
            query: query.filter(|s| !s.is_empty()),
        }
    }

    /// Split a URL into fragment and query parts.
    ///
    /// Accepts both the browser ordering (`page?3-5#s42`) and the documented
    /// scheme where the range trails the fragment (`page#s42?3-5`).
    pub fn from_url(url: &str) -> Self {
        let (head, fragment_part) = match url.split_once('#') {
            Some((head, frag)) => (head, Some(frag)),
            None => (url, None),
        };

        let (fragment, query) = match fragment_part {
            Some(frag) => match frag.split_once('?') {
                Some((sid, range)) => (Some(sid), Some(range)),
                None => (Some(frag), head.split_once('?').map(|(_, q)| q)),
            },
            None => (None, head.split_once('?').map(|(_, q)| q)),
        };

        tracing::debug!(?fragment, ?query, "parsed page location");

        Self::new(
            fragment.map(|s| s.to_string()),
            query.map(|s| s.to_string()),
        )
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }
}

/// A parsed start-end word range, 1-based and inclusive at both ends.
///
/// `start <= end` is assumed but never validated; a reversed range simply
/// yields no positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRange {
    pub start: i64,
    pub end: i64,
}

impl MatchRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Parse a query string of the form `<start>-<end>`.
    ///
    /// A leading `?` is stripped, the string is split on `-`, and the first
    /// two pieces are parsed as integers. Returns `None` when either piece
    /// is not a number, which downstream degrades to marking nothing.
    pub fn parse(query: &str) -> Option<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut parts = query.split('-');
        let start = parse_index(parts.next()?)?;
        let end = parse_index(parts.next()?)?;
        Some(Self { start, end })
    }

    /// Ascending iterator over the closed range; empty when `start > end`.
    pub fn positions(&self) -> impl Iterator<Item = i64> {
        self.start..=self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Parse a base-10 integer from the leading prefix of `s`.
///
/// Mirrors the parse behavior of the rendering environment: leading
/// whitespace and an optional sign are accepted, digits are consumed until
/// the first non-digit, and anything after is ignored. No digits means no
/// number.
fn parse_index(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };

    let prefix_len = digits.bytes().take_while(|b| b.is_ascii_digit()).count();
    if prefix_len == 0 {
        return None;
    }

    digits[..prefix_len].parse::<i64>().ok().map(|n| sign * n)
}

/// Composite identifier of the token element at `position` within the
/// sentence, e.g. `s42w3` for the third word of sentence `s42`.
pub fn token_element_id(sentence_id: &str, position: i64) -> String {
    format!("{}w{}", sentence_id, position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("3"), Some(3));
        assert_eq!(parse_index(" 42 "), Some(42));
        assert_eq!(parse_index("3abc"), Some(3));
        assert_eq!(parse_index("-2"), Some(-2));
        assert_eq!(parse_index("+7"), Some(7));
        assert_eq!(parse_index("a"), None);
        assert_eq!(parse_index(""), None);
        assert_eq!(parse_index("-"), None);
    }

    #[test]
    fn test_range_parse() {
        assert_eq!(MatchRange::parse("3-5"), Some(MatchRange::new(3, 5)));
        assert_eq!(MatchRange::parse("?3-5"), Some(MatchRange::new(3, 5)));
        assert_eq!(MatchRange::parse("5-3"), Some(MatchRange::new(5, 3)));
        assert_eq!(MatchRange::parse("3abc-5"), Some(MatchRange::new(3, 5)));
        assert_eq!(MatchRange::parse("a-b"), None);
        assert_eq!(MatchRange::parse("3"), None);
        assert_eq!(MatchRange::parse(""), None);
        // a leading minus sign leaves an empty first piece
        assert_eq!(MatchRange::parse("-2-1"), None);
    }

    #[test]
    fn test_range_extra_pieces_ignored() {
        assert_eq!(MatchRange::parse("3-5-9"), Some(MatchRange::new(3, 5)));
    }

    #[test]
    fn test_range_positions() {
        let range = MatchRange::new(3, 5);
        assert_eq!(range.positions().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert!(!range.is_empty());

        let reversed = MatchRange::new(5, 3);
        assert_eq!(reversed.positions().count(), 0);
        assert!(reversed.is_empty());

        let single = MatchRange::new(4, 4);
        assert_eq!(single.positions().collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn test_token_element_id() {
        assert_eq!(token_element_id("s42", 3), "s42w3");
        assert_eq!(token_element_id("abc1_x", 17), "abc1_xw17");
    }

    #[test]
    fn test_location_from_url_browser_order() {
        let loc = Location::from_url("https://host/la/page012.html?3-5#s42");
        assert_eq!(loc.fragment(), Some("s42"));
        assert_eq!(loc.query(), Some("3-5"));
    }

    #[test]
    fn test_location_from_url_trailing_range() {
        let loc = Location::from_url("https://host/la/page012.html#s42?3-5");
        assert_eq!(loc.fragment(), Some("s42"));
        assert_eq!(loc.query(), Some("3-5"));
    }

    #[test]
    fn test_location_missing_parts() {
        let loc = Location::from_url("https://host/la/page012.html#s42");
        assert_eq!(loc.fragment(), Some("s42"));
        assert_eq!(loc.query(), None);

        let loc = Location::from_url("https://host/la/page012.html?3-5");
        assert_eq!(loc.fragment(), None);
        assert_eq!(loc.query(), Some("3-5"));

        let loc = Location::from_url("https://host/la/page012.html");
        assert_eq!(loc.fragment(), None);
        assert_eq!(loc.query(), None);
    }
}
