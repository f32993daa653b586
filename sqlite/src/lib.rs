//! SQLite dialect.
//!
//! SQLite accepts bare identifiers for tables and columns, so none are
//! quoted; generated result-key aliases can contain a dot (`User.id`) and
//! are double-quoted. Booleans are stored as 0/1 and coerced in result
//! sets.

use trellis_core::dialect::{
    Dialect, FunctionRegistry, render_concat_pipes, render_group_concat,
};
use trellis_core::sql_function;

sql_function!(render_total, "TOTAL");

#[derive(Debug, Clone)]
pub struct SQLiteDialect {
    functions: FunctionRegistry,
}

impl SQLiteDialect {
    pub fn new() -> Self {
        let mut functions = FunctionRegistry::shared();
        functions.register("CONCAT", render_concat_pipes);
        functions.register("GROUP_CONCAT", render_group_concat);
        functions.register("TOTAL", render_total);
        Self { functions }
    }
}

impl Default for SQLiteDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for SQLiteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_ident(&self, ident: &str, is_alias: bool) -> String {
        if is_alias {
            format!("\"{}\"", ident.replace('"', "\"\""))
        } else {
            ident.to_string()
        }
    }

    fn quote_table(&self, name: &str, _is_alias: bool) -> String {
        name.to_string()
    }

    fn needs_boolean_coercion(&self) -> bool {
        true
    }

    fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }
}
