//! MySQL dialect.
//!
//! Identifiers are backtick-quoted throughout. Booleans are stored as 0/1
//! and coerced in result sets. `CONCAT` is a native variadic call.

use trellis_core::dialect::{Dialect, FunctionRegistry, render_group_concat};
use trellis_core::sql_function;

sql_function!(render_concat_call, "CONCAT");
sql_function!(render_bit_and, "BIT_AND");
sql_function!(render_bit_or, "BIT_OR");
sql_function!(render_json_arrayagg, "JSON_ARRAYAGG");

#[derive(Debug, Clone)]
pub struct MySQLDialect {
    functions: FunctionRegistry,
}

impl MySQLDialect {
    pub fn new() -> Self {
        let mut functions = FunctionRegistry::shared();
        functions.register("CONCAT", render_concat_call);
        functions.register("GROUP_CONCAT", render_group_concat);
        functions.register("BIT_AND", render_bit_and);
        functions.register("BIT_OR", render_bit_or);
        functions.register("JSON_ARRAYAGG", render_json_arrayagg);
        Self { functions }
    }
}

impl Default for MySQLDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for MySQLDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_ident(&self, ident: &str, _is_alias: bool) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn needs_boolean_coercion(&self) -> bool {
        true
    }

    fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }
}
