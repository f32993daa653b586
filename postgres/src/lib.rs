//! PostgreSQL dialect.
//!
//! Identifiers are double-quoted throughout. PostgreSQL has a native
//! boolean type, so result sets need no 0/1 coercion. List aggregation is
//! spelled `STRING_AGG`; the canonical `GROUP_CONCAT` name maps onto it.

use trellis_core::dialect::{Dialect, FunctionRegistry, render_concat_pipes};
use trellis_core::sql_function;

sql_function!(render_array_agg, "ARRAY_AGG");
sql_function!(render_bool_and, "BOOL_AND");
sql_function!(render_bool_or, "BOOL_OR");

/// `STRING_AGG(value, delimiter)`; a single argument gets the `,`
/// delimiter.
pub fn render_string_agg(args: &[String]) -> String {
    match args {
        [value] => format!("STRING_AGG({value}, ',')"),
        _ => format!("STRING_AGG({})", args.join(", ")),
    }
}

#[derive(Debug, Clone)]
pub struct PostgresDialect {
    functions: FunctionRegistry,
}

impl PostgresDialect {
    pub fn new() -> Self {
        let mut functions = FunctionRegistry::shared();
        functions.register("CONCAT", render_concat_pipes);
        functions.register("GROUP_CONCAT", render_string_agg);
        functions.register("STRING_AGG", render_string_agg);
        functions.register("ARRAY_AGG", render_array_agg);
        functions.register("BOOL_AND", render_bool_and);
        functions.register("BOOL_OR", render_bool_or);
        Self { functions }
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_ident(&self, ident: &str, _is_alias: bool) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn needs_boolean_coercion(&self) -> bool {
        false
    }

    fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_double_quoted() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.quote_ident("name", false), "\"name\"");
        assert_eq!(dialect.quote_ident("name", true), "\"name\"");
        assert_eq!(dialect.quote_qualified("User.id"), "\"User\".\"id\"");
        assert_eq!(dialect.quote_qualified("id"), "\"id\"");
        assert_eq!(dialect.quote_qualified("*"), "*");
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.quote_ident("a\"b", false), "\"a\"\"b\"");
    }

    #[test]
    fn order_by_quotes_reference_only() {
        let dialect = PostgresDialect::new();
        assert_eq!(
            dialect.quote_order_by("User.id DESC"),
            "\"User\".\"id\" DESC"
        );
    }

    #[test]
    fn native_booleans_need_no_coercion() {
        assert!(!PostgresDialect::new().needs_boolean_coercion());
    }

    #[test]
    fn function_spellings() {
        let dialect = PostgresDialect::new();
        let functions = dialect.functions();

        let concat = functions.get("CONCAT").unwrap();
        assert_eq!(concat(&["a".to_string(), "b".to_string()]), "a || b");

        let group_concat = functions.get("GROUP_CONCAT").unwrap();
        assert_eq!(group_concat(&["x".to_string()]), "STRING_AGG(x, ',')");
        assert_eq!(
            group_concat(&["x".to_string(), "'; '".to_string()]),
            "STRING_AGG(x, '; ')"
        );

        let array_agg = functions.get("ARRAY_AGG").unwrap();
        assert_eq!(array_agg(&["id".to_string()]), "ARRAY_AGG(id)");

        assert!(functions.get("TOTAL").is_none());
        assert!(functions.get("JSON_ARRAYAGG").is_none());
    }
}
