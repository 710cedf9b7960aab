//! Token elements and rendered sentence pages
//!
//! A fulltext page is a sentence rendered as a sequence of token elements,
//! each addressable by the composite id `<sentenceId>w<n>` with `n` counting
//! words from 1. The page owns its elements; the highlighter only looks ids
//! up and adds classes.

use crate::highlight::{highlight_with, MATCH_CLASS};
use crate::location::token_element_id;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Ordered set of class tokens behind a class attribute.
///
/// Adding is add-if-absent, so repeated highlighting cannot duplicate a
/// class, and rendering joins with single spaces so an initially empty
/// attribute never grows a leading space.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList(Vec<String>);

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a class attribute value on whitespace.
    pub fn parse(value: &str) -> Self {
        let mut list = Self::new();
        for class in value.split_whitespace() {
            list.add(class);
        }
        list
    }

    /// Add a class if it is not already present. Returns whether the list
    /// changed.
    pub fn add(&mut self, class: &str) -> bool {
        if self.contains(class) {
            return false;
        }
        self.0.push(class.to_string());
        true
    }

    pub fn contains(&self, class: &str) -> bool {
        self.0.iter().any(|c| c == class)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ClassList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

impl Serialize for ClassList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ClassList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value))
    }
}

/// One word of a sentence as delivered by the token store, before the page
/// template assigns element identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub surface: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
}

impl Word {
    pub fn new(surface: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            lemma: None,
            pos: None,
        }
    }
}

/// A word token as rendered on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenElement {
    pub id: String,
    pub surface: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    #[serde(default, skip_serializing_if = "ClassList::is_empty")]
    pub classes: ClassList,
}

/// A rendered sentence with its token elements indexed by id.
#[derive(Debug, Clone, Serialize)]
pub struct FulltextPage {
    pub corpus_id: String,
    pub sentence_id: String,
    tokens: Vec<TokenElement>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl FulltextPage {
    /// Render a sentence into token elements, assigning the 1-based
    /// composite identifiers the highlighter addresses.
    pub fn new(
        corpus_id: impl Into<String>,
        sentence_id: impl Into<String>,
        words: Vec<Word>,
    ) -> Self {
        let corpus_id = corpus_id.into();
        let sentence_id = sentence_id.into();

        let tokens: Vec<TokenElement> = words
            .into_iter()
            .enumerate()
            .map(|(i, word)| TokenElement {
                id: token_element_id(&sentence_id, (i + 1) as i64),
                surface: word.surface,
                lemma: word.lemma,
                pos: word.pos,
                classes: ClassList::new(),
            })
            .collect();

        let index = tokens
            .iter()
            .enumerate()
            .map(|(slot, token)| (token.id.clone(), slot))
            .collect();

        Self {
            corpus_id,
            sentence_id,
            tokens,
            index,
        }
    }

    pub fn tokens(&self) -> &[TokenElement] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn element(&self, id: &str) -> Option<&TokenElement> {
        self.index.get(id).map(|&slot| &self.tokens[slot])
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut TokenElement> {
        self.index.get(id).map(|&slot| &mut self.tokens[slot])
    }

    /// Apply a match range to this page, adding the `match` class to every
    /// token the range addresses that actually exists. Returns the ids that
    /// were marked. A missing or malformed range marks nothing.
    pub fn apply_matches(&mut self, query: Option<&str>) -> Vec<String> {
        let mut marked = Vec::new();
        let Self {
            sentence_id,
            tokens,
            index,
            ..
        } = self;

        highlight_with(Some(sentence_id.as_str()), query, |id| {
            match index.get(id) {
                Some(&slot) => {
                    tokens[slot].classes.add(MATCH_CLASS);
                    marked.push(id.to_string());
                    true
                }
                None => false,
            }
        });

        marked
    }

    /// Ids of the tokens currently carrying the `match` class.
    pub fn matched_ids(&self) -> Vec<String> {
        self.tokens
            .iter()
            .filter(|t| t.classes.contains(MATCH_CLASS))
            .map(|t| t.id.clone())
            .collect()
    }
}
