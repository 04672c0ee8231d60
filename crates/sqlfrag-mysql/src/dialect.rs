//! MySQL dialect implementation.

use sqlfrag_core::dialect::Dialect;

/// MySQL dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn parameter_prefix(&self) -> char {
        '@'
    }

    fn identity_function(&self) -> &'static str {
        "LAST_INSERT_ID()"
    }

    fn row_count_function(&self) -> &'static str {
        "ROW_COUNT()"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlfrag_core::dialect::UNBOUNDED_LIMIT;

    #[test]
    fn test_mysql_dialect() {
        let dialect = MySqlDialect::new();
        assert_eq!(dialect.name(), "mysql");
        assert_eq!(dialect.identifier_quotes(), ('`', '`'));
        assert_eq!(dialect.parameter_prefix(), '@');
        assert_eq!(dialect.generated_parameter_name(2), "@gp2");
        assert_eq!(dialect.unbounded_limit(), UNBOUNDED_LIMIT);
    }

    #[test]
    fn test_backtick_escaping() {
        assert_eq!(MySqlDialect.quote_identifier("odd`name"), "`odd``name`");
    }
}
