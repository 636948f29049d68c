use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use corelex_db::{CorelexDb, LoadMode};

fn main() -> Result<()> {
    let data_dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: cargo run -p corelex-db --example stats -- <path-to-corelex-dir>")?;

    let db = CorelexDb::load_with_mode(&data_dir, LoadMode::Mmap)
        .with_context(|| format!("loading CoreLex from {}", data_dir.display()))?;

    let mut code_usage: HashMap<&str, usize> = HashMap::new();
    let mut unknown_codes = 0usize;
    for row in db.fetch_corelex_types(None) {
        for code in row.codes() {
            if db.basic_type(code).is_none() {
                unknown_codes += 1;
            }
            *code_usage.entry(code).or_default() += 1;
        }
    }

    println!("Data directory : {}", data_dir.display());
    println!("Basic types    : {}", db.basic_type_count());
    println!("CoreLex types  : {}", db.corelex_type_count());
    println!("Type rows      : {}", db.corelex_type_row_count());
    println!("Noun rows      : {}", db.noun_count());
    println!("Unknown codes  : {}", unknown_codes);

    let mut usage: Vec<_> = code_usage.into_iter().collect();
    usage.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    for (code, count) in usage.iter().take(10) {
        println!("  {code:<4} used in {count} polysemous types");
    }

    Ok(())
}
