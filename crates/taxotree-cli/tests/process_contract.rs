use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{Value, json};
use tempfile::tempdir;

fn cli_bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_taxotree"))
}

fn run(db: &Path, args: &[&str]) -> Output {
    Command::new(cli_bin_path())
        .arg("--db")
        .arg(db)
        .args(args)
        .env_remove("TAXOTREE_DB")
        .env("TAXOTREE_LOG", "warn")
        .output()
        .expect("run taxotree")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout json")
}

fn seed_tree(dir: &Path) -> PathBuf {
    let source = dir.join("taxonomy.json");
    let tree = json!({
        "name": "Animal",
        "children": [
            { "name": "Dog", "children": [{ "name": "Puppy" }] },
            { "name": "Cat" }
        ]
    });
    fs::write(&source, serde_json::to_vec(&tree).expect("encode tree")).expect("write tree");
    source
}

#[test]
fn import_then_browse_process_contract() {
    // Given a nested tree file
    // When importing it and listing children
    // Then stdout carries the lazy listing JSON.
    let dir = tempdir().expect("tempdir");
    let db = dir.path().join("taxonomy.db");
    let source = seed_tree(dir.path());

    let report = stdout_json(&run(&db, &["import", source.to_str().expect("source path")]));
    assert_eq!(report["read"], 4);
    assert_eq!(report["inserted"], 4);

    let top = stdout_json(&run(&db, &["children"]));
    assert_eq!(
        top,
        json!([{
            "name": "Animal",
            "size": 3,
            "hasChildren": true,
            "matchesSearch": false,
            "hasSearchMatchInChildren": false
        }])
    );

    let animal = stdout_json(&run(
        &db,
        &["children", "--path", "Animal", "--search", "puppy"],
    ));
    assert_eq!(animal[0]["name"], "Dog");
    assert_eq!(animal[0]["hasSearchMatchInChildren"], true);
    assert_eq!(animal[1]["name"], "Cat");
    assert_eq!(animal[1]["hasChildren"], false);

    let tree = stdout_json(&run(&db, &["tree"]));
    assert_eq!(tree["children"][0]["children"][0]["name"], "Puppy");
}

#[test]
fn global_search_process_contract() {
    let dir = tempdir().expect("tempdir");
    let db = dir.path().join("taxonomy.db");
    let source = seed_tree(dir.path());
    let _ = stdout_json(&run(&db, &["import", source.to_str().expect("source path")]));

    // Dog (1) + Puppy (0)
    let rollup = stdout_json(&run(&db, &["search", "dog"]));
    assert_eq!(rollup, json!([{ "name": "Animal", "size": 1 }]));
}

#[test]
fn tree_on_empty_store_fails_with_status() {
    let dir = tempdir().expect("tempdir");
    let db = dir.path().join("taxonomy.db");
    let output = run(&db, &["tree"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}
