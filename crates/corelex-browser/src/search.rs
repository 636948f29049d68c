use corelex_db::CorelexDb;
use corelex_morphy::NounMorphy;
use corelex_types::{Noun, normalize_noun};
use thiserror::Error;

pub const MAX_QUERY_LEN: usize = 128;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("search term must be at most {0} bytes, got {1}")]
    TooLong(usize, usize),
    #[error("invalid character in search term: {0:?}")]
    InvalidChar(char),
}

/// Result of looking a noun up in CoreLex.
#[derive(Debug)]
pub struct SearchOutcome<'a> {
    /// The query as normalised for lookup.
    pub noun: String,
    /// The lemma the matches were found under, if any.
    pub lemma: Option<String>,
    pub matches: Vec<Noun<'a>>,
}

/// Validate a raw search term. Blank input means "no search".
pub fn parse_noun_query(raw: &str) -> Result<Option<String>, QueryError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.len() > MAX_QUERY_LEN {
        return Err(QueryError::TooLong(MAX_QUERY_LEN, trimmed.len()));
    }
    if let Some(c) = trimmed.chars().find(|c| c.is_control()) {
        return Err(QueryError::InvalidChar(c));
    }
    Ok(Some(normalize_noun(trimmed)))
}

/// Find the CoreLex rows for a noun, falling back to its lemmas when the
/// surface form is not filed itself.
pub fn search_noun<'a>(db: &'a CorelexDb, morphy: &NounMorphy, noun: &str) -> SearchOutcome<'a> {
    let candidates = morphy.lemmas_for(noun, |candidate| db.noun_exists(candidate));
    let lemma = candidates.first().map(|c| c.lemma.to_string());
    let matches = lemma
        .as_deref()
        .map(|lemma| db.fetch_noun_types(lemma))
        .unwrap_or_default();
    SearchOutcome {
        noun: normalize_noun(noun),
        lemma,
        matches,
    }
}
