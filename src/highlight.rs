//! Highlighting of matched words within a displayed sentence
//!
//! Given the fragment and query parts of a page location, computes which
//! token elements fall inside the matched word range and marks them with the
//! `match` class. Runs once per page; missing input or a malformed range
//! degrades to doing nothing at all.

use crate::location::{token_element_id, MatchRange};

/// Class token added to each matched word.
pub const MATCH_CLASS: &str = "match";

/// Identifiers of the token elements a location refers to.
///
/// Pure function of the two location parts: if either is absent the result
/// is empty, otherwise one identifier per position of the parsed range, in
/// ascending order. Whether an element actually exists is the caller's
/// concern.
pub fn match_token_ids(fragment: Option<&str>, query: Option<&str>) -> Vec<String> {
    let (Some(fragment), Some(query)) = (fragment, query) else {
        return Vec::new();
    };

    let sentence_id = fragment.strip_prefix('#').unwrap_or(fragment);
    let Some(range) = MatchRange::parse(query) else {
        tracing::debug!(query, "match range did not parse, nothing to highlight");
        return Vec::new();
    };

    tracing::debug!(sentence_id, ?range, "computing match identifiers");

    range
        .positions()
        .map(|i| {
            let id = token_element_id(sentence_id, i);
            tracing::trace!(%id, "match identifier");
            id
        })
        .collect()
}

/// Drive the highlighter through a caller-supplied marking closure.
///
/// `mark` receives each computed identifier and reports whether an element
/// with that id existed and was marked; absent elements are skipped
/// silently. Returns how many elements were marked.
pub fn highlight_with<F>(fragment: Option<&str>, query: Option<&str>, mut mark: F) -> usize
where
    F: FnMut(&str) -> bool,
{
    let mut marked = 0;
    for id in match_token_ids(fragment, query) {
        if mark(&id) {
            marked += 1;
        }
    }
    marked
}
