//! Integration tests for compiling command tree files.

use std::io::Write;

use sqlfrag_cli::{CliError, DialectName, OutputFormat, compile, load_tree, render};
use sqlfrag_core::generator::GeneratorOptions;
use tempfile::NamedTempFile;

const NESTED_FILTER: &str = r#"{
    "command": "query",
    "query": {
        "kind": "filter",
        "input": {
            "expr": {
                "kind": "filter",
                "input": {
                    "expr": {
                        "kind": "scan",
                        "target": { "table": "Customers", "properties": ["Id", "Name"] }
                    },
                    "variable": "c"
                },
                "predicate": {
                    "kind": "comparison",
                    "op": "gt",
                    "left": {
                        "kind": "property",
                        "instance": { "kind": "variable_ref", "name": "c" },
                        "property": "Id"
                    },
                    "right": { "kind": "constant", "value": { "int": 1 } }
                }
            },
            "variable": "f"
        },
        "predicate": {
            "kind": "comparison",
            "op": "eq",
            "left": {
                "kind": "property",
                "instance": { "kind": "variable_ref", "name": "f" },
                "property": "Name"
            },
            "right": { "kind": "parameter", "name": "name" }
        }
    }
}"#;

fn write_tree(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(json.as_bytes()).expect("Failed to write temp file");
    file
}

#[test]
fn test_compile_file_with_fusion() {
    let file = write_tree(NESTED_FILTER);
    let tree = load_tree(file.path()).unwrap();
    let generated = compile(&tree, DialectName::Mysql, GeneratorOptions::default()).unwrap();
    assert_eq!(
        generated.sql,
        "SELECT `f`.`Id`, `f`.`Name`\r\n FROM `Customers` AS `f`\r\n \
         WHERE (`f`.`Name` = @name) AND (`f`.`Id` > 1)"
    );
}

#[test]
fn test_compile_file_without_fusion() {
    let file = write_tree(NESTED_FILTER);
    let tree = load_tree(file.path()).unwrap();
    let generated = compile(
        &tree,
        DialectName::Generic,
        GeneratorOptions {
            fuse_selects: false,
        },
    )
    .unwrap();
    let rendered = render(&generated, OutputFormat::Sql).unwrap();
    assert!(rendered.starts_with("SELECT \"f\".\"Id\", \"f\".\"Name\"\n FROM (SELECT"));
    assert!(rendered.ends_with("-- column 0: Id <- f.Id\n-- column 1: Name <- f.Name\n"));
}

#[test]
fn test_invalid_json_reports_path() {
    let file = write_tree("{ \"command\": \"query\" }");
    let err = load_tree(file.path()).unwrap_err();
    assert!(matches!(err, CliError::Parse { .. }));
    assert!(err.to_string().contains(&file.path().display().to_string()));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_tree(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, CliError::Read { .. }));
}

#[test]
fn test_generation_error_is_wrapped() {
    let file = write_tree(
        r#"{
            "command": "query",
            "query": { "kind": "constant", "value": { "int": 1 } }
        }"#,
    );
    let tree = load_tree(file.path()).unwrap();
    let err = compile(&tree, DialectName::Generic, GeneratorOptions::default()).unwrap_err();
    assert!(matches!(err, CliError::Generate(_)));
}
