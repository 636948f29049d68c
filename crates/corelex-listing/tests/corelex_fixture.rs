use std::path::PathBuf;

use corelex_db::CorelexDb;
use corelex_listing::{
    flatten_labels, group_by_corelex_type, group_by_corelex_type_strict,
    group_nouns_by_polysemous_type, index_basic_types,
};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("corelex-db")
        .join("tests")
        .join("fixtures")
        .join("cl")
}

#[test]
fn lists_fixture_types_with_synsets() {
    let db = CorelexDb::load(fixture_dir()).expect("load fixtures");
    let basic = db.fetch_basic_types();
    let idx = index_basic_types(&basic);
    let rows = db.fetch_corelex_types(None);

    let shown = group_by_corelex_type_strict(&rows, &idx).expect("loader keeps runs contiguous");
    assert_eq!(shown, group_by_corelex_type(&rows, &idx).unwrap());

    let labels: Vec<_> = shown.iter().map(|r| r.corelex_type).collect();
    assert_eq!(
        labels,
        vec![Some("acr"), None, None, None, Some("pas"), None]
    );
    assert_eq!(
        shown[0].synsets,
        "act human_action human_activity attribute relation"
    );
    assert_eq!(shown[5].synsets, "attribute possession");

    let flat = flatten_labels(&shown);
    assert!(flat.iter().zip(&rows).all(|(l, r)| *l == Some(r.corelex_type)));
}

#[test]
fn groups_fixture_nouns_for_one_type() {
    let db = CorelexDb::load(fixture_dir()).unwrap();
    let rows = db.fetch_corelex_types(Some("acr"));
    let nouns = db.fetch_nouns("acr");
    let groups = group_nouns_by_polysemous_type(&rows, &nouns);
    let by_type: Vec<_> = groups
        .iter()
        .map(|g| (g.polysemous_type, g.nouns.clone()))
        .collect();
    assert_eq!(
        by_type,
        vec![
            ("act atr rel", vec![]),
            ("act evt rel", vec!["contact"]),
            ("act rel", vec!["dealing", "intercourse"]),
            ("act rel sta", vec!["treaty"]),
        ]
    );
}
