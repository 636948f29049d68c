//! Load CoreLex table dumps with zero-copy text.
//!
//! A CoreLex database directory holds one tab-separated file per table:
//!
//! | file | columns |
//! |---|---|
//! | `basic_types.tab` | `code`, `synset_id`, `synset_elements` |
//! | `corelex_types.tab` | `corelex_type`, `polysemous_type` |
//! | `nouns.tab` | `noun`, `polysemous_type`, `corelex_type` |
//!
//! Blank lines and lines starting with `#` are skipped. Every record is
//! validated once at load time; afterwards the tables are read-only and all
//! text is handed out as `&str` slices of the original bytes. Callers choose
//! between memory-mapped files or owned buffers via [`LoadMode`].
//!
//! CoreLex type rows are kept ordered by `corelex_type` with file order as the
//! tie-break, so every type forms one contiguous run.
//!
//! # Example
//! ```no_run
//! use corelex_db::{CorelexDb, DbConfig, LoadMode};
//!
//! # fn main() -> anyhow::Result<()> {
//! let db = CorelexDb::open(&DbConfig::new("/path/to/corelex", LoadMode::Mmap))?;
//! for row in db.fetch_corelex_types(Some("acr")) {
//!     println!("{} {}", row.corelex_type, row.polysemous_type);
//! }
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p corelex-db --example stats -- <dir>`.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use corelex_types::{BasicType, CorelexType, Noun, normalize_noun};
use memmap2::Mmap;
use tracing::debug;

pub const BASIC_TYPES_FILE: &str = "basic_types.tab";
pub const CORELEX_TYPES_FILE: &str = "corelex_types.tab";
pub const NOUNS_FILE: &str = "nouns.tab";

/// Strategy for loading table files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map each table file (fast, zero-copy).
    Mmap,
    /// Read each file into an owned buffer (portable fallback).
    Owned,
}

/// Where and how to open a CoreLex database.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DbConfig {
    pub data_dir: PathBuf,
    pub mode: LoadMode,
}

impl DbConfig {
    pub fn new(data_dir: impl Into<PathBuf>, mode: LoadMode) -> Self {
        Self {
            data_dir: data_dir.into(),
            mode,
        }
    }
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum FileKind {
    BasicTypes,
    CorelexTypes,
    Nouns,
}

impl FileKind {
    fn file_name(self) -> &'static str {
        match self {
            FileKind::BasicTypes => BASIC_TYPES_FILE,
            FileKind::CorelexTypes => CORELEX_TYPES_FILE,
            FileKind::Nouns => NOUNS_FILE,
        }
    }
}

#[derive(Clone, Copy)]
struct TextRef {
    file: FileKind,
    start: usize,
    len: usize,
}

struct TableFiles {
    basic_types: Buffer,
    corelex_types: Buffer,
    nouns: Buffer,
}

impl TableFiles {
    fn load(dir: &Path, mode: LoadMode) -> Result<Self> {
        Ok(Self {
            basic_types: load_file(dir.join(BASIC_TYPES_FILE), mode)?,
            corelex_types: load_file(dir.join(CORELEX_TYPES_FILE), mode)?,
            nouns: load_file(dir.join(NOUNS_FILE), mode)?,
        })
    }

    fn bytes(&self, file: FileKind) -> &[u8] {
        match file {
            FileKind::BasicTypes => self.basic_types.as_slice(),
            FileKind::CorelexTypes => self.corelex_types.as_slice(),
            FileKind::Nouns => self.nouns.as_slice(),
        }
    }

    fn text(&self, r: TextRef) -> &str {
        let bytes = self.bytes(r.file);
        let slice = &bytes[r.start..r.start + r.len];
        std::str::from_utf8(slice).expect("table text is valid utf8")
    }
}

struct BasicTypeData {
    code: TextRef,
    synset_id: TextRef,
    synset_elements: TextRef,
}

struct CorelexTypeData {
    corelex_type: TextRef,
    polysemous_type: TextRef,
}

struct NounData {
    noun: TextRef,
    polysemous_type: TextRef,
    corelex_type: TextRef,
}

/// In-memory view of the CoreLex tables backed by mmap or owned buffers.
pub struct CorelexDb {
    files: TableFiles,
    basic_types: Vec<BasicTypeData>,
    basic_type_idx: HashMap<String, usize>,
    corelex_types: Vec<CorelexTypeData>,
    type_runs: HashMap<String, Range<usize>>,
    nouns: Vec<NounData>,
    nouns_by_type: HashMap<String, Vec<usize>>,
    nouns_by_noun: HashMap<String, Vec<usize>>,
}

impl CorelexDb {
    /// Open the database described by `config`.
    pub fn open(config: &DbConfig) -> Result<Self> {
        Self::load_with_mode(&config.data_dir, config.mode)
    }

    /// Load from a directory, memory-mapping the table files.
    pub fn load(data_dir: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_mode(data_dir, LoadMode::Mmap)
    }

    /// Load choosing between mmap and owned buffers at runtime.
    pub fn load_with_mode(data_dir: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let dir = data_dir.as_ref();
        for name in [BASIC_TYPES_FILE, CORELEX_TYPES_FILE, NOUNS_FILE] {
            let path = dir.join(name);
            if !path.exists() {
                anyhow::bail!("missing required CoreLex table: {}", path.display());
            }
        }

        let files = TableFiles::load(dir, mode)?;

        let (basic_types, basic_type_idx) = parse_basic_types(&files)?;

        let mut corelex_types = parse_corelex_types(&files)?;
        // Stable, so rows of one type keep their file order.
        corelex_types.sort_by(|a, b| {
            files
                .text(a.corelex_type)
                .cmp(files.text(b.corelex_type))
        });
        let type_runs = collect_runs(&files, &corelex_types);

        let nouns = parse_nouns(&files)?;
        let mut nouns_by_type: HashMap<String, Vec<usize>> = HashMap::new();
        let mut nouns_by_noun: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, noun) in nouns.iter().enumerate() {
            nouns_by_type
                .entry(files.text(noun.corelex_type).to_string())
                .or_default()
                .push(idx);
            nouns_by_noun
                .entry(normalize_noun(files.text(noun.noun)))
                .or_default()
                .push(idx);
        }

        Ok(Self {
            files,
            basic_types,
            basic_type_idx,
            corelex_types,
            type_runs,
            nouns,
            nouns_by_type,
            nouns_by_noun,
        })
    }

    /// All basic types in file order.
    pub fn fetch_basic_types(&self) -> Vec<BasicType<'_>> {
        debug!("select basic_types");
        self.basic_types
            .iter()
            .map(|bt| self.basic_type_view(bt))
            .collect()
    }

    /// Look up one basic type by code.
    pub fn basic_type(&self, code: &str) -> Option<BasicType<'_>> {
        self.basic_type_idx
            .get(code)
            .map(|idx| self.basic_type_view(&self.basic_types[*idx]))
    }

    /// CoreLex type rows ordered by `corelex_type`, optionally restricted to
    /// one type. An unknown filter yields no rows.
    pub fn fetch_corelex_types(&self, filter: Option<&str>) -> Vec<CorelexType<'_>> {
        debug!(filter, "select corelex_types");
        let rows = match filter {
            Some(name) => match self.type_runs.get(name) {
                Some(run) => &self.corelex_types[run.clone()],
                None => &[],
            },
            None => self.corelex_types.as_slice(),
        };
        rows.iter().map(|row| self.corelex_type_view(row)).collect()
    }

    /// Whether a CoreLex type has at least one row.
    pub fn corelex_type_exists(&self, name: &str) -> bool {
        self.type_runs.contains_key(name)
    }

    /// Nouns filed under a CoreLex type, in file order.
    pub fn fetch_nouns(&self, corelex_type: &str) -> Vec<Noun<'_>> {
        debug!(corelex_type, "select nouns by corelex_type");
        self.nouns_view(self.nouns_by_type.get(corelex_type))
    }

    /// Every row for a noun. The query is normalised before lookup.
    pub fn fetch_noun_types(&self, noun: &str) -> Vec<Noun<'_>> {
        let key = normalize_noun(noun);
        debug!(noun = %key, "select nouns by noun");
        self.nouns_view(self.nouns_by_noun.get(&key))
    }

    /// Whether the noun appears in the `nouns` table.
    pub fn noun_exists(&self, noun: &str) -> bool {
        self.nouns_by_noun.contains_key(&normalize_noun(noun))
    }

    /// Number of basic types.
    pub fn basic_type_count(&self) -> usize {
        self.basic_types.len()
    }

    /// Number of `(corelex_type, polysemous_type)` rows.
    pub fn corelex_type_row_count(&self) -> usize {
        self.corelex_types.len()
    }

    /// Number of distinct CoreLex types.
    pub fn corelex_type_count(&self) -> usize {
        self.type_runs.len()
    }

    /// Number of noun rows.
    pub fn noun_count(&self) -> usize {
        self.nouns.len()
    }

    fn basic_type_view(&self, data: &BasicTypeData) -> BasicType<'_> {
        BasicType {
            code: self.files.text(data.code),
            synset_id: self.files.text(data.synset_id),
            synset_elements: self.files.text(data.synset_elements),
        }
    }

    fn corelex_type_view(&self, data: &CorelexTypeData) -> CorelexType<'_> {
        CorelexType {
            corelex_type: self.files.text(data.corelex_type),
            polysemous_type: self.files.text(data.polysemous_type),
        }
    }

    fn nouns_view(&self, indices: Option<&Vec<usize>>) -> Vec<Noun<'_>> {
        indices
            .map(|v| v.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|idx| {
                let data = &self.nouns[*idx];
                Noun {
                    noun: self.files.text(data.noun),
                    polysemous_type: self.files.text(data.polysemous_type),
                    corelex_type: self.files.text(data.corelex_type),
                }
            })
            .collect()
    }
}

fn load_file(path: PathBuf, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(&path).with_context(|| format!("open {}", path.display()))?;
            let len = file
                .metadata()
                .with_context(|| format!("stat {}", path.display()))?
                .len();
            if len == 0 {
                return Ok(Buffer::Owned(Vec::new()));
            }
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(&path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

/// Split a table into `(line number, fields)` records, checking the column
/// count. Fields are trimmed and must be non-empty.
fn records(
    file: FileKind,
    bytes: &[u8],
    columns: usize,
) -> Result<Vec<(usize, Vec<TextRef>)>> {
    let mut out = Vec::new();
    for (lineno, raw_line) in bytes.split(|b| *b == b'\n').enumerate() {
        let line = strip_cr(raw_line);
        if line.iter().all(u8::is_ascii_whitespace) || line.first() == Some(&b'#') {
            continue;
        }
        let line_str = std::str::from_utf8(line)
            .with_context(|| format!("{}:{} invalid utf8", file.file_name(), lineno + 1))?;
        let fields: Vec<&str> = line_str.split('\t').map(str::trim).collect();
        if fields.len() != columns {
            anyhow::bail!(
                "{}:{} expected {} tab-separated fields, got {}",
                file.file_name(),
                lineno + 1,
                columns,
                fields.len()
            );
        }
        if let Some(pos) = fields.iter().position(|f| f.is_empty()) {
            anyhow::bail!(
                "{}:{} field {} is empty",
                file.file_name(),
                lineno + 1,
                pos + 1
            );
        }
        let refs = fields
            .into_iter()
            .map(|f| text_ref_str(file, bytes, f))
            .collect();
        out.push((lineno + 1, refs));
    }
    Ok(out)
}

fn parse_basic_types(files: &TableFiles) -> Result<(Vec<BasicTypeData>, HashMap<String, usize>)> {
    let file = FileKind::BasicTypes;
    let mut rows = Vec::new();
    let mut idx = HashMap::new();
    for (lineno, fields) in records(file, files.bytes(file), 3)? {
        let code = files.text(fields[0]).to_string();
        if idx.contains_key(&code) {
            anyhow::bail!(
                "{}:{} duplicate basic type code {}",
                file.file_name(),
                lineno,
                code
            );
        }
        idx.insert(code, rows.len());
        rows.push(BasicTypeData {
            code: fields[0],
            synset_id: fields[1],
            synset_elements: fields[2],
        });
    }
    Ok((rows, idx))
}

fn parse_corelex_types(files: &TableFiles) -> Result<Vec<CorelexTypeData>> {
    let file = FileKind::CorelexTypes;
    Ok(records(file, files.bytes(file), 2)?
        .into_iter()
        .map(|(_, fields)| CorelexTypeData {
            corelex_type: fields[0],
            polysemous_type: fields[1],
        })
        .collect())
}

fn parse_nouns(files: &TableFiles) -> Result<Vec<NounData>> {
    let file = FileKind::Nouns;
    Ok(records(file, files.bytes(file), 3)?
        .into_iter()
        .map(|(_, fields)| NounData {
            noun: fields[0],
            polysemous_type: fields[1],
            corelex_type: fields[2],
        })
        .collect())
}

/// Map each CoreLex type to its run in the sorted row vector.
fn collect_runs(
    files: &TableFiles,
    rows: &[CorelexTypeData],
) -> HashMap<String, Range<usize>> {
    let mut runs: HashMap<String, Range<usize>> = HashMap::new();
    for (idx, row) in rows.iter().enumerate() {
        runs.entry(files.text(row.corelex_type).to_string())
            .and_modify(|run| run.end = idx + 1)
            .or_insert(idx..idx + 1);
    }
    runs
}

fn text_ref_str(file: FileKind, root: &[u8], token: &str) -> TextRef {
    let start = token.as_ptr() as usize - root.as_ptr() as usize;
    TextRef {
        file,
        start,
        len: token.len(),
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    if line.ends_with(b"\r") {
        &line[..line.len() - 1]
    } else {
        line
    }
}
