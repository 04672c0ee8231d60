//! SQL Dialect support.
//!
//! Different databases have slightly different SQL syntax. The generator
//! builds the same fragment tree for every target; this trait decides how the
//! dialect-sensitive bits of that tree are spelled.

mod generic;

pub use generic::GenericDialect;

/// The row-count sentinel written when an offset is present without a limit.
pub const UNBOUNDED_LIMIT: &str = "18446744073709551615";

/// Trait for SQL dialect-specific behavior.
pub trait Dialect {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character (e.g., `"` for standard SQL, `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Returns the opening and closing identifier quotes.
    ///
    /// Defaults to [`Dialect::identifier_quote`] on both sides; bracket
    /// quoting dialects override this.
    fn identifier_quotes(&self) -> (char, char) {
        let quote = self.identifier_quote();
        (quote, quote)
    }

    /// Returns the prefix used for named parameters (`:name`, `@name`).
    fn parameter_prefix(&self) -> char {
        ':'
    }

    /// Returns the name of the `index`-th generated parameter.
    fn generated_parameter_name(&self, index: usize) -> String {
        format!("{}gp{index}", self.parameter_prefix())
    }

    /// Returns the literals used for `true` and `false` constants.
    fn boolean_literals(&self) -> (&'static str, &'static str) {
        ("1", "0")
    }

    /// Returns the row count written when a query skips rows without a limit.
    fn unbounded_limit(&self) -> &'static str {
        UNBOUNDED_LIMIT
    }

    /// Returns the expression yielding the identity generated by the last insert.
    fn identity_function(&self) -> &'static str {
        "last_insert_id()"
    }

    /// Returns the expression yielding the number of rows touched by the last statement.
    fn row_count_function(&self) -> &'static str {
        "row_count()"
    }

    /// Quotes an identifier, doubling any embedded closing quote.
    fn quote_identifier(&self, name: &str) -> String {
        let (open, close) = self.identifier_quotes();
        let mut doubled = String::with_capacity(2);
        doubled.push(close);
        doubled.push(close);
        let escaped = name.replace(close, &doubled);
        format!("{open}{escaped}{close}")
    }
}
