//! Integration tests for the merge engine.

use std::collections::BTreeSet;
use std::path::PathBuf;

use colmerge_ingest::{LoadedTable, parse_directives};
use colmerge_transform::{MergeError, merge_tables};
use indexmap::IndexMap;
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use proptest::prelude::*;

fn test_df(columns: Vec<(&str, Vec<&str>)>) -> DataFrame {
    let cols: Vec<Column> = columns
        .into_iter()
        .map(|(name, values)| {
            Series::new(
                name.into(),
                values.iter().copied().map(String::from).collect::<Vec<_>>(),
            )
            .into_column()
        })
        .collect();
    DataFrame::new(cols).unwrap()
}

fn loaded(name: &str, id: &str, frame: DataFrame) -> LoadedTable {
    LoadedTable {
        name: name.to_string(),
        path: PathBuf::from(format!("{name}.csv")),
        frame,
        id_column: Some(id.to_string()),
        raw_rows: 0,
        deleted_rows: 0,
    }
}

fn tables(entries: Vec<LoadedTable>) -> IndexMap<String, LoadedTable> {
    entries
        .into_iter()
        .map(|table| (table.name.clone(), table))
        .collect()
}

fn names(frame: &DataFrame) -> Vec<String> {
    frame
        .get_column_names()
        .into_iter()
        .map(ToString::to_string)
        .collect()
}

/// Column values with missing cells rendered as `None`.
fn values(frame: &DataFrame, name: &str) -> Vec<Option<String>> {
    frame
        .column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|value| value.map(String::from))
        .collect()
}

fn some(values: &[&str]) -> Vec<Option<String>> {
    values.iter().map(|v| Some(v.to_string())).collect()
}

#[test]
fn positional_identifier_and_alias() {
    let plan = parse_directives("FILE A a.csv 0\nADD-COL A 1,2 AS two\nOUTPUT-FILE = out.csv\n")
        .unwrap();
    let frame = test_df(vec![
        ("h0", vec!["1", "2"]),
        ("h1", vec!["x", "p"]),
        ("h2", vec!["y", "q"]),
    ]);
    let merged = merge_tables(&plan, &tables(vec![loaded("A", "h0", frame)])).unwrap();

    assert_eq!(names(&merged.frame), vec!["h0", "h1", "two"]);
    assert_eq!(merged.id_column, "h0");
    assert_eq!(merged.height(), 2);
    assert_eq!(values(&merged.frame, "two"), some(&["y", "q"]));
}

#[test]
fn two_files_outer_join_fills_missing_sides() {
    let plan = parse_directives(
        "FILE A a.csv id\nFILE B b.csv id\nADD-COL A name\nADD-COL B score\n",
    )
    .unwrap();
    let a = test_df(vec![("id", vec!["1", "2"]), ("name", vec!["ann", "bob"])]);
    let b = test_df(vec![("id", vec!["2", "3"]), ("score", vec!["10", "20"])]);
    let merged = merge_tables(
        &plan,
        &tables(vec![loaded("A", "id", a), loaded("B", "id", b)]),
    )
    .unwrap();

    assert_eq!(names(&merged.frame), vec!["id", "name", "score"]);
    assert_eq!(merged.height(), 3);
    assert_eq!(values(&merged.frame, "id"), some(&["1", "2", "3"]));
    assert_eq!(
        values(&merged.frame, "name"),
        vec![Some("ann".to_string()), Some("bob".to_string()), None]
    );
    assert_eq!(
        values(&merged.frame, "score"),
        vec![None, Some("10".to_string()), Some("20".to_string())]
    );
    assert_eq!(merged.contributions.len(), 2);
    assert_eq!(merged.contributions[1].columns, vec!["score"]);
}

#[test]
fn differently_named_identifiers_join_under_the_first_name() {
    let plan = parse_directives(
        "FILE A a.csv id\nFILE B b.csv subject\nADD-COL A name\nADD-COL B score\n",
    )
    .unwrap();
    let a = test_df(vec![("id", vec!["1"]), ("name", vec!["ann"])]);
    let b = test_df(vec![("subject", vec!["1"]), ("score", vec!["10"])]);
    let merged = merge_tables(
        &plan,
        &tables(vec![loaded("A", "id", a), loaded("B", "subject", b)]),
    )
    .unwrap();

    assert_eq!(names(&merged.frame), vec!["id", "name", "score"]);
    assert_eq!(merged.height(), 1);
}

#[test]
fn identifiers_of_different_types_join_as_text() {
    let plan = parse_directives(
        "FILE A a.csv id\nFILE B b.csv id\nADD-COL A name\nADD-COL B score\n",
    )
    .unwrap();
    let a = DataFrame::new(vec![
        Series::new("id".into(), vec![1i64, 2]).into_column(),
        Series::new("name".into(), vec!["ann", "bob"]).into_column(),
    ])
    .unwrap();
    let b = test_df(vec![("id", vec!["1", "2"]), ("score", vec!["10", "20"])]);
    let merged = merge_tables(
        &plan,
        &tables(vec![loaded("A", "id", a), loaded("B", "id", b)]),
    )
    .unwrap();

    assert_eq!(merged.height(), 2);
    assert_eq!(values(&merged.frame, "score"), some(&["10", "20"]));
}

#[test]
fn colliding_column_names_get_suffixes() {
    let plan = parse_directives(
        "FILE A a.csv id\nFILE B b.csv id\nADD-COL A value\nADD-COL B value, other\n",
    )
    .unwrap();
    let a = test_df(vec![("id", vec!["1"]), ("value", vec!["a"])]);
    let b = test_df(vec![
        ("id", vec!["1"]),
        ("value", vec!["b"]),
        ("other", vec!["c"]),
    ]);
    let merged = merge_tables(
        &plan,
        &tables(vec![loaded("A", "id", a), loaded("B", "id", b)]),
    )
    .unwrap();

    assert_eq!(names(&merged.frame), vec!["id", "value_x", "value_y", "other"]);
    assert_eq!(values(&merged.frame, "value_x"), some(&["a"]));
    assert_eq!(values(&merged.frame, "value_y"), some(&["b"]));
}

#[test]
fn identifier_alias_names_the_merged_key() {
    let plan = parse_directives(
        "FILE A a.csv id\nFILE B b.csv id\nADD-COL A id AS key, name\nADD-COL B score\n",
    )
    .unwrap();
    let a = test_df(vec![("id", vec!["1", "2"]), ("name", vec!["ann", "bob"])]);
    let b = test_df(vec![("id", vec!["2"]), ("score", vec!["10"])]);
    let merged = merge_tables(
        &plan,
        &tables(vec![loaded("A", "id", a), loaded("B", "id", b)]),
    )
    .unwrap();

    assert_eq!(merged.id_column, "key");
    assert_eq!(names(&merged.frame), vec!["key", "name", "score"]);
    assert_eq!(values(&merged.frame, "key"), some(&["1", "2"]));
}

#[test]
fn suffix_clash_with_existing_column_is_rejected() {
    let plan = parse_directives(
        "FILE A a.csv id\nFILE B b.csv id\nADD-COL A v, v_y\nADD-COL B v\n",
    )
    .unwrap();
    let a = test_df(vec![
        ("id", vec!["1"]),
        ("v", vec!["a"]),
        ("v_y", vec!["b"]),
    ]);
    let b = test_df(vec![("id", vec!["1"]), ("v", vec!["c"])]);
    let err = merge_tables(
        &plan,
        &tables(vec![loaded("A", "id", a), loaded("B", "id", b)]),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        MergeError::SuffixCollision { ref file, ref column, line: 4 } if file == "B" && column == "v"
    ));
}

#[test]
fn suffixed_left_name_clashing_with_right_column_is_rejected() {
    let plan = parse_directives(
        "FILE A a.csv id\nFILE B b.csv id\nADD-COL A v\nADD-COL B v, v_x\n",
    )
    .unwrap();
    let a = test_df(vec![("id", vec!["1"]), ("v", vec!["a"])]);
    let b = test_df(vec![
        ("id", vec!["1"]),
        ("v", vec!["b"]),
        ("v_x", vec!["c"]),
    ]);
    let err = merge_tables(
        &plan,
        &tables(vec![loaded("A", "id", a), loaded("B", "id", b)]),
    )
    .unwrap_err();

    assert!(matches!(err, MergeError::SuffixCollision { line: 4, .. }));
}

#[test]
fn single_file_with_all_columns_round_trips() {
    let plan = parse_directives("FILE A a.csv id\nADD-COL A id, b, a\n").unwrap();
    let frame = test_df(vec![
        ("id", vec!["3", "1", "2"]),
        ("b", vec!["x", "", "z"]),
        ("a", vec!["p", "q", "r"]),
    ]);
    let merged = merge_tables(&plan, &tables(vec![loaded("A", "id", frame.clone())])).unwrap();
    assert!(merged.frame.equals(&frame));
}

#[test]
fn files_without_add_col_are_not_merged() {
    let plan = parse_directives("FILE A a.csv id\nFILE B b.csv id\nADD-COL B score\n").unwrap();
    let a = test_df(vec![("id", vec!["1"]), ("name", vec!["ann"])]);
    let b = test_df(vec![("id", vec!["2"]), ("score", vec!["9"])]);
    let merged = merge_tables(
        &plan,
        &tables(vec![loaded("A", "id", a), loaded("B", "id", b)]),
    )
    .unwrap();
    assert_eq!(names(&merged.frame), vec!["id", "score"]);
    assert_eq!(merged.contributions.len(), 1);
}

#[test]
fn empty_plan_has_nothing_to_merge() {
    let plan = parse_directives("FILE A a.csv id\n").unwrap();
    let a = test_df(vec![("id", vec!["1"])]);
    let err = merge_tables(&plan, &tables(vec![loaded("A", "id", a)])).unwrap_err();
    assert!(matches!(err, MergeError::NothingToMerge));
}

#[test]
fn unloaded_file_is_reported() {
    let plan = parse_directives("FILE A a.csv id\nADD-COL A name\n").unwrap();
    let err = merge_tables(&plan, &IndexMap::new()).unwrap_err();
    assert!(matches!(err, MergeError::UnknownFile { line: 2, .. }));
}

proptest! {
    #[test]
    fn outer_join_keeps_every_identifier_once(
        key_sets in prop::collection::vec(prop::collection::btree_set(0u8..40, 1..12), 1..5)
    ) {
        let mut text = String::new();
        let mut entries = Vec::new();
        for (idx, keys) in key_sets.iter().enumerate() {
            let name = format!("F{idx}");
            text.push_str(&format!("FILE {name} {name}.csv id\nADD-COL {name} v{idx}\n"));
            let ids: Vec<String> = keys.iter().map(u8::to_string).collect();
            let vals: Vec<String> = keys.iter().map(|k| format!("{name}-{k}")).collect();
            let frame = DataFrame::new(vec![
                Series::new("id".into(), ids).into_column(),
                Series::new(format!("v{idx}").into(), vals).into_column(),
            ])
            .unwrap();
            entries.push(loaded(&name, "id", frame));
        }
        let plan = parse_directives(&text).unwrap();
        let merged = merge_tables(&plan, &tables(entries)).unwrap();

        let expected: BTreeSet<String> = key_sets
            .iter()
            .flatten()
            .map(u8::to_string)
            .collect();
        let ids: Vec<String> = values(&merged.frame, "id")
            .into_iter()
            .map(|v| v.unwrap_or_default())
            .collect();
        let unique: BTreeSet<String> = ids.iter().cloned().collect();

        prop_assert_eq!(ids.len(), expected.len());
        prop_assert_eq!(unique, expected);
    }
}
