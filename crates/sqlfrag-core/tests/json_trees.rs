//! Integration tests for command trees deserialized from JSON, the form in
//! which the command-line tool receives them.

mod common;

use common::*;
use sqlfrag_core::tree::CommandTree;

fn parse_tree(json: &str) -> CommandTree {
    serde_json::from_str(json).unwrap_or_else(|e| panic!("Failed to parse tree: {json}\nError: {e}"))
}

#[test]
fn test_query_from_json() {
    let tree = parse_tree(
        r#"{
            "command": "query",
            "query": {
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
                    "op": "eq",
                    "left": {
                        "kind": "property",
                        "instance": { "kind": "variable_ref", "name": "c" },
                        "property": "Id"
                    },
                    "right": { "kind": "constant", "value": { "int": 1 } }
                }
            }
        }"#,
    );
    assert_eq!(
        generate_tree(&tree).sql,
        "SELECT \"c\".\"Id\", \"c\".\"Name\"\r\n FROM \"Customers\" AS \"c\"\r\n WHERE \"c\".\"Id\" = 1"
    );
}

#[test]
fn test_delete_from_json() {
    let tree = parse_tree(
        r#"{
            "command": "delete",
            "target": {
                "expr": {
                    "kind": "scan",
                    "target": { "table": "Customers", "properties": ["Id", "Name"], "keys": ["Id"] }
                },
                "variable": "t"
            },
            "predicate": {
                "kind": "is_null",
                "argument": {
                    "kind": "property",
                    "instance": { "kind": "variable_ref", "name": "t" },
                    "property": "Name"
                }
            }
        }"#,
    );
    assert_eq!(
        generate_tree(&tree).sql,
        "DELETE FROM \"Customers\" WHERE \"Name\" IS NULL"
    );
}

#[test]
fn test_tree_round_trips_through_json() {
    let tree = CommandTree::Query {
        query: customers().scan(),
    };
    let json = serde_json::to_string(&tree).unwrap();
    assert_eq!(parse_tree(&json), tree);
}
