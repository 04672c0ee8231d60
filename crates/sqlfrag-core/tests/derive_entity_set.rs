//! Integration tests for `#[derive(EntitySet)]`.

mod common;

use common::generate;
use sqlfrag_core::schema::EntitySet;
use sqlfrag_core::tree::Expr;
use sqlfrag_derive::EntitySet;

#[allow(dead_code)]
#[derive(EntitySet)]
#[entity_set(name = "customers", schema = "shop")]
struct Customer {
    #[property(key)]
    id: i64,
    #[property(name = "full_name")]
    name: String,
    email: Option<String>,
    #[property(skip)]
    cached_score: f64,
}

#[allow(dead_code)]
#[derive(EntitySet)]
struct OrderLine {
    #[property(key)]
    order_id: i64,
    #[property(key)]
    line_no: i32,
    quantity: i32,
}

// ===================================================================
// Metadata
// ===================================================================

#[test]
fn test_explicit_names() {
    assert_eq!(Customer::TABLE, "customers");
    assert_eq!(Customer::SCHEMA, Some("shop"));
    assert_eq!(Customer::PROPERTIES, &["id", "full_name", "email"]);
    assert_eq!(Customer::KEYS, &["id"]);
}

#[test]
fn test_default_table_name_is_snake_case() {
    assert_eq!(OrderLine::TABLE, "order_line");
    assert_eq!(OrderLine::SCHEMA, None);
    assert_eq!(OrderLine::KEYS, &["order_id", "line_no"]);
}

#[test]
fn test_entity_set_ref() {
    let set = Customer::entity_set();
    assert_eq!(set.table, "customers");
    assert_eq!(set.schema.as_deref(), Some("shop"));
    assert_eq!(set.properties, vec!["id", "full_name", "email"]);
    assert_eq!(set.keys, vec!["id"]);
    assert_eq!(set.defining_query, None);
}

// ===================================================================
// Generation
// ===================================================================

#[test]
fn test_scan_of_derived_entity_set() {
    let query = Expr::filter(
        Customer::scan(),
        "c",
        Expr::var("c").prop("email").is_null().not(),
    );
    assert_eq!(
        generate(query).sql,
        "SELECT \"c\".\"id\", \"c\".\"full_name\", \"c\".\"email\"\r\n \
         FROM \"shop\".\"customers\" AS \"c\"\r\n WHERE \"c\".\"email\" IS NOT NULL"
    );
}
