//! Integration tests for generation with the MySQL dialect.

use sqlfrag_core::generator::SqlGenerator;
use sqlfrag_core::schema::EntitySetRef;
use sqlfrag_core::tree::{
    Binding, CommandTree, Expr, InsertCommand, NamedExpr, SetClause, SortKey,
};
use sqlfrag_core::value::SqlValue;
use sqlfrag_mysql::MySqlDialect;

fn generate(tree: &CommandTree) -> sqlfrag_core::GeneratedSql {
    SqlGenerator::new(&MySqlDialect)
        .generate(tree)
        .unwrap_or_else(|e| panic!("Failed to generate: {tree:?}\nError: {e:?}"))
}

fn products() -> EntitySetRef {
    EntitySetRef::new("products", &["id", "name", "price"]).with_keys(&["id"])
}

#[test]
fn test_paged_query() {
    let query = Expr::Skip {
        input: Binding::new(products().scan(), "p"),
        keys: vec![SortKey::asc(Expr::var("p").prop("price"))],
        count: Box::new(Expr::constant(20)),
    };
    assert_eq!(
        generate(&CommandTree::Query { query }).sql,
        "SELECT `p`.`id`, `p`.`name`, `p`.`price`\r\n FROM `products` AS `p`\r\n \
         ORDER BY `p`.`price` ASC\r\n LIMIT 20,18446744073709551615"
    );
}

#[test]
fn test_booleans_are_inline_and_text_is_bound() {
    let query = Expr::filter(
        products().scan(),
        "p",
        Expr::var("p")
            .prop("name")
            .eq(Expr::constant("desk"))
            .and(Expr::constant(true).eq(Expr::constant(false))),
    );
    let generated = generate(&CommandTree::Query { query });
    assert!(generated
        .sql
        .ends_with("WHERE (`p`.`name` = @gp0) AND (1 = 0)"));
    assert_eq!(generated.parameters[0].name, "@gp0");
    assert_eq!(generated.parameters[0].value, SqlValue::Text(String::from("desk")));
}

#[test]
fn test_insert_reads_back_identity() {
    let tree = CommandTree::Insert(InsertCommand {
        target: Binding::new(products().scan(), "t"),
        set_clauses: vec![
            SetClause::new(Expr::var("t").prop("name"), Expr::param("name")),
            SetClause::new(Expr::var("t").prop("price"), Expr::constant(9.5)),
        ],
        returning: Some(vec![NamedExpr::new("id", Expr::var("t").prop("id"))]),
    });
    assert_eq!(
        generate(&tree).sql,
        "INSERT INTO `products`(`name`, `price`) VALUES (@name, 9.5);\r\n\
         SELECT `id`\r\n FROM `products`\r\n WHERE ROW_COUNT() > 0 AND `id` = LAST_INSERT_ID()"
    );
}
