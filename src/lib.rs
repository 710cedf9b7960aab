//! Murre - fulltext reading environment for annotated text corpora
//!
//! Library backing the fulltext pages of a corpus-search platform: corpus
//! registration records, sentence pages built from token elements, and the
//! highlighting of a matched word range within a displayed sentence.

// Location parsing comes first as the highlighter is built on it
pub mod location;
pub mod highlight;
pub mod page;
pub mod corpus;
pub mod store;
pub mod error;
pub mod state;

pub use error::MurreError;
pub use state::AppState;
pub use location::{token_element_id, Location, MatchRange};
pub use highlight::{highlight_with, match_token_ids, MATCH_CLASS};
pub use page::{ClassList, FulltextPage, TokenElement, Word};
pub use corpus::{
    AttributeConfig, AttributeType, CorpusConfig, CorpusFolder, CorpusInfo, CorpusRegistry,
    DisplayType, IprHolder, LicenceInfo, UrlOpts,
};
pub use store::{FulltextStore, PageKey};
