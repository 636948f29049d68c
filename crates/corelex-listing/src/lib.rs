//! Turn CoreLex table rows into display rows.
//!
//! Two operations carry the listing pages:
//!
//! 1. [`resolve_synsets`] expands a polysemous type (`"act atr rel"`) into the
//!    synset members of its basic types, in order.
//! 2. [`group_by_corelex_type`] walks rows ordered by CoreLex type and shows
//!    each type label only on the first row of its run; later rows of the run
//!    carry `None`, which a page renders as a blank continuation cell.
//!
//! The crate never touches storage. It takes the rows and a
//! [`BasicTypeIndex`] built with [`index_basic_types`], whatever loaded them.
//!
//! # Ordering
//! Grouping relies on rows of one CoreLex type being contiguous. By default
//! that is trusted: each row is compared with its predecessor only, and rows
//! are never re-sorted. [`GroupingMode::Validate`] (or
//! [`group_by_corelex_type_strict`]) instead fails with
//! [`ListingError::OrderingViolation`] when a type reappears after its run
//! ended.
//!
//! # Example
//! ```rust
//! use corelex_listing::{group_by_corelex_type, index_basic_types};
//! use corelex_types::{BasicType, CorelexType};
//!
//! let basic = [
//!     BasicType { code: "act", synset_id: "00016649", synset_elements: "act" },
//!     BasicType { code: "rel", synset_id: "00017862", synset_elements: "relation" },
//! ];
//! let idx = index_basic_types(&basic);
//! let rows = [
//!     CorelexType { corelex_type: "acr", polysemous_type: "act rel" },
//!     CorelexType { corelex_type: "acr", polysemous_type: "rel" },
//! ];
//! let shown = group_by_corelex_type(&rows, &idx).unwrap();
//! assert_eq!(shown[0].corelex_type, Some("acr"));
//! assert_eq!(shown[0].synsets, "act relation");
//! assert_eq!(shown[1].corelex_type, None);
//! ```

mod nouns;

use std::collections::{HashMap, HashSet};

use corelex_types::{BasicType, CorelexType, split_codes};
use thiserror::Error;

pub use nouns::{NounGroup, group_nouns_by_polysemous_type};

/// Lookup table from basic type code to its record.
pub type BasicTypeIndex<'a> = HashMap<&'a str, BasicType<'a>>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ListingError {
    #[error("unknown basic type code {code:?} in polysemous type {polysemous_type:?}")]
    Lookup {
        code: String,
        polysemous_type: String,
    },
    #[error("corelex type {corelex_type} reappears at row {row} after its run ended")]
    OrderingViolation { corelex_type: String, row: usize },
}

/// How [`group_with_mode`] treats the contiguity of CoreLex type runs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum GroupingMode {
    /// Compare with the previous row only; repeated labels pass through.
    #[default]
    Trust,
    /// Fail when a type shows up again after a different one.
    Validate,
}

/// One rendered table row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisplayRow<'a> {
    /// Set on the first row of a run, `None` on continuation rows.
    pub corelex_type: Option<&'a str>,
    pub polysemous_type: &'a str,
    pub synsets: String,
}

/// Index basic types by code. A later duplicate replaces an earlier one.
pub fn index_basic_types<'a>(basic_types: &[BasicType<'a>]) -> BasicTypeIndex<'a> {
    basic_types.iter().map(|bt| (bt.code, *bt)).collect()
}

/// Join the synset members of every basic type code in `polysemous_type`.
///
/// Codes are split on single spaces and resolved in order; the results are
/// joined with one space. A code missing from `basic_types` is an error, never
/// a silently shorter string.
pub fn resolve_synsets(
    polysemous_type: &str,
    basic_types: &BasicTypeIndex<'_>,
) -> Result<String, ListingError> {
    let mut synsets = Vec::new();
    for code in split_codes(polysemous_type) {
        let basic_type = basic_types.get(code).ok_or_else(|| ListingError::Lookup {
            code: code.to_string(),
            polysemous_type: polysemous_type.to_string(),
        })?;
        synsets.push(basic_type.synset_elements);
    }
    Ok(synsets.join(" "))
}

/// Group rows by CoreLex type, trusting that runs are contiguous.
pub fn group_by_corelex_type<'a>(
    rows: &[CorelexType<'a>],
    basic_types: &BasicTypeIndex<'_>,
) -> Result<Vec<DisplayRow<'a>>, ListingError> {
    group_with_mode(rows, basic_types, GroupingMode::Trust)
}

/// Group rows by CoreLex type, rejecting non-contiguous runs.
pub fn group_by_corelex_type_strict<'a>(
    rows: &[CorelexType<'a>],
    basic_types: &BasicTypeIndex<'_>,
) -> Result<Vec<DisplayRow<'a>>, ListingError> {
    group_with_mode(rows, basic_types, GroupingMode::Validate)
}

pub fn group_with_mode<'a>(
    rows: &[CorelexType<'a>],
    basic_types: &BasicTypeIndex<'_>,
    mode: GroupingMode,
) -> Result<Vec<DisplayRow<'a>>, ListingError> {
    let mut out = Vec::with_capacity(rows.len());
    let mut last: Option<&str> = None;
    let mut closed: HashSet<&str> = HashSet::new();

    for (idx, row) in rows.iter().enumerate() {
        let current = row.corelex_type;
        let starts_run = last != Some(current);
        if starts_run && mode == GroupingMode::Validate {
            if let Some(previous) = last {
                closed.insert(previous);
            }
            if closed.contains(current) {
                return Err(ListingError::OrderingViolation {
                    corelex_type: current.to_string(),
                    row: idx,
                });
            }
        }

        out.push(DisplayRow {
            corelex_type: starts_run.then_some(current),
            polysemous_type: row.polysemous_type,
            synsets: resolve_synsets(row.polysemous_type, basic_types)?,
        });
        last = Some(current);
    }

    Ok(out)
}

/// Refill continuation cells with the label of the run they belong to.
pub fn flatten_labels<'a>(rows: &[DisplayRow<'a>]) -> Vec<Option<&'a str>> {
    let mut current = None;
    rows.iter()
        .map(|row| {
            if row.corelex_type.is_some() {
                current = row.corelex_type;
            }
            current
        })
        .collect()
}
