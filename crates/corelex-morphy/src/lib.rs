//! WordNet-style noun lemmatisation (morphy, nouns only).
//!
//! CoreLex only files nouns, so only the noun half of morphy is needed:
//!
//! 1. Emit the surface form if it is a known noun.
//! 2. Check the exception list (`noun.exc`: `surface lemma...` per line).
//! 3. Apply the noun suffix rules (`-ies` to `-y`, `-men` to `-man`, ...).
//! 4. Deduplicate while keeping provenance.
//!
//! Existence is decided by a caller-provided predicate, so this crate does not
//! depend on any table loader.
//!
//! # Example
//! ```no_run
//! use corelex_db::CorelexDb;
//! use corelex_morphy::NounMorphy;
//!
//! # fn main() -> anyhow::Result<()> {
//! let dir = "/path/to/corelex";
//! let db = CorelexDb::load(dir)?;
//! let morph = NounMorphy::load(dir)?;
//! for cand in morph.lemmas_for("treaties", |noun| db.noun_exists(noun)) {
//!     println!("{:?}: {}", cand.source, cand.lemma);
//! }
//! # Ok(()) }
//! ```

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use corelex_types::normalize_noun;

pub const NOUN_EXCEPTIONS_FILE: &str = "noun.exc";

const NOUN_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

/// Where a candidate lemma originated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CandidateSource {
    Surface,
    Exception,
    Rule {
        suffix: &'static str,
        replacement: &'static str,
    },
}

/// A lemma candidate with its provenance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LemmaCandidate<'a> {
    pub lemma: Cow<'a, str>,
    pub source: CandidateSource,
}

/// Noun morphy parameterised by a caller-provided existence check.
#[derive(Debug, Default)]
pub struct NounMorphy {
    exceptions: HashMap<String, Vec<String>>,
}

impl NounMorphy {
    /// Rules only, no exception list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `noun.exc` from a CoreLex data directory. A missing file is
    /// treated as empty.
    pub fn load(data_dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            exceptions: load_exc(data_dir.as_ref().join(NOUN_EXCEPTIONS_FILE))?,
        })
    }

    /// Number of surface forms with exception entries.
    pub fn exception_count(&self) -> usize {
        self.exceptions.len()
    }

    /// Generate noun lemmas for a surface form, most direct first.
    pub fn lemmas_for<'a, F>(&'a self, surface: &str, noun_exists: F) -> Vec<LemmaCandidate<'a>>
    where
        F: Fn(&str) -> bool,
    {
        let mut seen: HashSet<Cow<'a, str>> = HashSet::new();
        let mut out: Vec<LemmaCandidate<'a>> = Vec::new();
        let norm_surface = normalize_noun(surface);
        if norm_surface.is_empty() {
            return out;
        }

        if noun_exists(&norm_surface) {
            push_unique(
                &mut out,
                &mut seen,
                LemmaCandidate {
                    lemma: Cow::Owned(norm_surface.clone()),
                    source: CandidateSource::Surface,
                },
            );
        }

        if let Some(entries) = self.exceptions.get(&norm_surface) {
            for lemma in entries {
                if noun_exists(lemma) {
                    push_unique(
                        &mut out,
                        &mut seen,
                        LemmaCandidate {
                            lemma: Cow::Borrowed(lemma.as_str()),
                            source: CandidateSource::Exception,
                        },
                    );
                }
            }
        }

        for &(suffix, replacement) in NOUN_RULES {
            if let Some(candidate) = apply_rule(&norm_surface, suffix, replacement)
                && noun_exists(&candidate)
            {
                push_unique(
                    &mut out,
                    &mut seen,
                    LemmaCandidate {
                        lemma: Cow::Owned(candidate),
                        source: CandidateSource::Rule {
                            suffix,
                            replacement,
                        },
                    },
                );
            }
        }

        out
    }
}

fn load_exc(path: PathBuf) -> Result<HashMap<String, Vec<String>>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let file =
        File::open(&path).with_context(|| format!("open exception file {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut map = HashMap::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("read line {} in {}", lineno + 1, path.display()))?;
        let mut parts = line.split_whitespace();
        let surface = match parts.next() {
            Some(s) => normalize_noun(s),
            None => continue,
        };
        let lemmas: Vec<String> = parts.map(normalize_noun).collect();
        if !lemmas.is_empty() {
            map.insert(surface, lemmas);
        }
    }
    Ok(map)
}

fn push_unique<'a>(
    out: &mut Vec<LemmaCandidate<'a>>,
    seen: &mut HashSet<Cow<'a, str>>,
    candidate: LemmaCandidate<'a>,
) {
    if seen.insert(candidate.lemma.clone()) {
        out.push(candidate);
    }
}

fn apply_rule(surface: &str, suffix: &str, replacement: &str) -> Option<String> {
    surface
        .strip_suffix(suffix)
        .filter(|stem| !stem.is_empty())
        .map(|stem| format!("{stem}{replacement}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_exists(targets: &[&str]) -> impl Fn(&str) -> bool {
        let set: HashSet<String> = targets.iter().map(|t| normalize_noun(t)).collect();
        move |noun| set.contains(&normalize_noun(noun))
    }

    #[test]
    fn uses_exceptions() {
        let mut morph = NounMorphy::new();
        morph
            .exceptions
            .insert("children".into(), vec!["child".into()]);

        let candidates = morph.lemmas_for("Children", fake_exists(&["child"]));
        assert_eq!(candidates.len(), 1);
        assert!(matches!(candidates[0].source, CandidateSource::Exception));
        assert_eq!(candidates[0].lemma, "child");
    }

    #[test]
    fn surface_comes_before_rule_hits() {
        let morph = NounMorphy::new();
        let candidates = morph.lemmas_for("glasses", fake_exists(&["glasses", "glass"]));
        assert_eq!(candidates.len(), 2);
        assert!(matches!(candidates[0].source, CandidateSource::Surface));
        assert_eq!(candidates[1].lemma, "glass");
        assert_eq!(
            candidates[1].source,
            CandidateSource::Rule {
                suffix: "ses",
                replacement: "s"
            }
        );
    }

    #[test]
    fn applies_noun_suffix_rules() {
        let morph = NounMorphy::new();
        let known = fake_exists(&["treaty", "businessman", "church"]);
        assert_eq!(morph.lemmas_for("treaties", &known)[0].lemma, "treaty");
        assert_eq!(morph.lemmas_for("businessmen", &known)[0].lemma, "businessman");
        assert_eq!(morph.lemmas_for("churches", &known)[0].lemma, "church");
        assert!(morph.lemmas_for("s", &known).is_empty());
        assert!(morph.lemmas_for("   ", &known).is_empty());
    }

    #[test]
    fn loads_exception_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(NOUN_EXCEPTIONS_FILE),
            "mice mouse\ngeese goose\n\ncriteria criterion\n",
        )
        .unwrap();
        let morph = NounMorphy::load(dir.path()).unwrap();
        assert_eq!(morph.exception_count(), 3);
        let candidates = morph.lemmas_for("geese", fake_exists(&["goose"]));
        assert_eq!(candidates[0].lemma, "goose");

        let empty = NounMorphy::load(dir.path().join("missing")).unwrap();
        assert_eq!(empty.exception_count(), 0);
    }

    #[test]
    fn normalizes_multiword_queries() {
        let morph = NounMorphy::new();
        let candidates = morph.lemmas_for("Causal Agents", fake_exists(&["causal_agent"]));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].lemma, "causal_agent");
    }
}
