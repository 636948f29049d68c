//! Shared, zero-copy record types for the CoreLex tables.
//!
//! CoreLex groups nouns by the combination of *basic types* their senses
//! fall under. Three tables describe it:
//!
//! - `basic_types`: a short code (`act`, `art`, ...) and the WordNet synset it
//!   stands for ([`BasicType`]);
//! - `corelex_types`: a CoreLex type label and one of the polysemous types
//!   (space-separated basic type codes) it covers ([`CorelexType`]);
//! - `nouns`: a noun with its polysemous type and CoreLex type ([`Noun`]).
//!
//! Text fields borrow from a backing buffer (`&str`) so a loader can hand out
//! views without copying.
//!
//! ```rust
//! use corelex_types::{CorelexType, normalize_noun};
//!
//! let row = CorelexType { corelex_type: "acr", polysemous_type: "act atr rel" };
//! assert_eq!(row.codes().collect::<Vec<_>>(), vec!["act", "atr", "rel"]);
//! assert_eq!(normalize_noun(" Human Action "), "human_action");
//! ```

use std::fmt;

/// A basic type code and the synset it is anchored to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct BasicType<'a> {
    pub code: &'a str,
    pub synset_id: &'a str,
    /// Space-separated lexical forms of the synset.
    pub synset_elements: &'a str,
}

/// One `(corelex_type, polysemous_type)` row.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct CorelexType<'a> {
    pub corelex_type: &'a str,
    /// Space-separated basic type codes.
    pub polysemous_type: &'a str,
}

impl<'a> CorelexType<'a> {
    /// Basic type codes of the polysemous type, in order.
    pub fn codes(&self) -> impl Iterator<Item = &'a str> + 'a {
        split_codes(self.polysemous_type)
    }
}

/// A noun filed under a polysemous type and CoreLex type.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Noun<'a> {
    pub noun: &'a str,
    pub polysemous_type: &'a str,
    pub corelex_type: &'a str,
}

impl fmt::Display for Noun<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] ({})",
            self.noun, self.polysemous_type, self.corelex_type
        )
    }
}

/// Split a polysemous type on single spaces.
///
/// Splitting is literal: a doubled space yields an empty code, which no basic
/// type table contains, so callers see it as a failed lookup instead of it
/// being dropped.
pub fn split_codes(polysemous_type: &str) -> impl Iterator<Item = &str> {
    polysemous_type.split(' ')
}

/// Normalise a noun the way the `nouns` table stores it: trimmed, lowercase,
/// inner spaces as underscores.
pub fn normalize_noun(text: &str) -> String {
    let mut s = text.trim().to_string();
    s.make_ascii_lowercase();
    s.replace(' ', "_")
}

/// Render a stored noun for display and WordNet queries (underscores as spaces).
pub fn display_noun(noun: &str) -> String {
    noun.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_codes_literally() {
        assert_eq!(split_codes("act").collect::<Vec<_>>(), vec!["act"]);
        assert_eq!(
            split_codes("act  rel").collect::<Vec<_>>(),
            vec!["act", "", "rel"]
        );
    }

    #[test]
    fn normalizes_nouns() {
        assert_eq!(normalize_noun("Dog"), "dog");
        assert_eq!(normalize_noun("  causal agent "), "causal_agent");
        assert_eq!(display_noun("causal_agent"), "causal agent");
    }

    #[test]
    fn displays_noun_rows() {
        let noun = Noun {
            noun: "school",
            polysemous_type: "act grp",
            corelex_type: "acr",
        };
        assert_eq!(noun.to_string(), "school [act grp] (acr)");
    }
}
