use std::path::{Path, PathBuf};

use corelex_db::{CorelexDb, DbConfig, LoadMode};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("cl")
}

fn write_tables(dir: &Path, basic: &str, types: &str, nouns: &str) {
    std::fs::write(dir.join("basic_types.tab"), basic).unwrap();
    std::fs::write(dir.join("corelex_types.tab"), types).unwrap();
    std::fs::write(dir.join("nouns.tab"), nouns).unwrap();
}

#[test]
fn loads_all_tables() {
    let db = CorelexDb::load(fixture_dir()).expect("load fixtures");
    assert_eq!(db.basic_type_count(), 8);
    assert_eq!(db.corelex_type_row_count(), 6);
    assert_eq!(db.corelex_type_count(), 2);
    assert_eq!(db.noun_count(), 7);

    let act = db.basic_type("act").expect("act present");
    assert_eq!(act.synset_id, "00016649");
    assert_eq!(act.synset_elements, "act human_action human_activity");

    let codes: Vec<_> = db.fetch_basic_types().iter().map(|bt| bt.code).collect();
    assert_eq!(codes[..3], ["act", "atr", "evt"]);
}

#[test]
fn owned_mode_matches_mmap() {
    let mmap = CorelexDb::load_with_mode(fixture_dir(), LoadMode::Mmap).unwrap();
    let owned = CorelexDb::open(&DbConfig::new(fixture_dir(), LoadMode::Owned)).unwrap();
    assert_eq!(mmap.fetch_corelex_types(None), owned.fetch_corelex_types(None));
    assert_eq!(mmap.fetch_basic_types(), owned.fetch_basic_types());
}

#[test]
fn orders_corelex_types_with_stable_tie_break() {
    let db = CorelexDb::load(fixture_dir()).unwrap();
    let rows: Vec<_> = db
        .fetch_corelex_types(None)
        .iter()
        .map(|r| (r.corelex_type, r.polysemous_type))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("acr", "act atr rel"),
            ("acr", "act evt rel"),
            ("acr", "act rel"),
            ("acr", "act rel sta"),
            ("pas", "act atr pos"),
            ("pas", "atr pos"),
        ]
    );
}

#[test]
fn filters_corelex_types() {
    let db = CorelexDb::load(fixture_dir()).unwrap();
    let pas = db.fetch_corelex_types(Some("pas"));
    assert_eq!(pas.len(), 2);
    assert!(pas.iter().all(|r| r.corelex_type == "pas"));
    assert!(db.fetch_corelex_types(Some("zzz")).is_empty());
    assert!(db.corelex_type_exists("acr"));
    assert!(!db.corelex_type_exists("zzz"));
}

#[test]
fn looks_up_nouns_by_type_and_by_name() {
    let db = CorelexDb::load(fixture_dir()).unwrap();
    let acr: Vec<_> = db.fetch_nouns("acr").iter().map(|n| n.noun).collect();
    assert_eq!(acr, vec!["dealing", "intercourse", "contact", "treaty"]);

    let dealing = db.fetch_noun_types(" Dealing ");
    assert_eq!(dealing.len(), 2);
    assert_eq!(dealing[0].corelex_type, "acr");
    assert_eq!(dealing[1].corelex_type, "pas");
    assert!(db.noun_exists("wealth"));
    assert!(!db.noun_exists("dog"));
    assert!(db.fetch_nouns("zzz").is_empty());
}

#[test]
fn rejects_missing_table() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("basic_types.tab"), "act\t1\tact\n").unwrap();
    let err = CorelexDb::load(dir.path()).err().expect("load must fail");
    assert!(err.to_string().contains("missing required CoreLex table"));
}

#[test]
fn rejects_wrong_field_count() {
    let dir = tempfile::tempdir().unwrap();
    write_tables(dir.path(), "act\t1\tact\n", "acr\tact\textra\n", "");
    let err = CorelexDb::load(dir.path()).err().expect("load must fail");
    let msg = err.to_string();
    assert!(msg.contains("corelex_types.tab:1"), "{msg}");
    assert!(msg.contains("expected 2"), "{msg}");
}

#[test]
fn rejects_empty_field() {
    let dir = tempfile::tempdir().unwrap();
    write_tables(dir.path(), "act\t\tact\n", "", "");
    let err = CorelexDb::load(dir.path()).err().expect("load must fail");
    assert!(err.to_string().contains("field 2 is empty"));
}

#[test]
fn rejects_duplicate_basic_type() {
    let dir = tempfile::tempdir().unwrap();
    write_tables(dir.path(), "chm\t1\tcompound\n# note\nchm\t2\telement\n", "", "");
    let err = CorelexDb::load(dir.path()).err().expect("load must fail");
    let msg = err.to_string();
    assert!(msg.contains("basic_types.tab:3"), "{msg}");
    assert!(msg.contains("duplicate basic type code chm"), "{msg}");
}

#[test]
fn accepts_empty_tables() {
    let dir = tempfile::tempdir().unwrap();
    write_tables(dir.path(), "", "\n\n", "# nothing yet\n");
    let db = CorelexDb::load_with_mode(dir.path(), LoadMode::Owned).unwrap();
    assert_eq!(db.basic_type_count(), 0);
    assert!(db.fetch_corelex_types(None).is_empty());
}
