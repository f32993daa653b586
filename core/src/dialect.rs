//! Dialect strategy: every per-database difference lives behind this
//! interface. The builder and renderer never branch on which database is
//! active; they only call through a [`Dialect`].

use indexmap::IndexMap;
use std::fmt;

/// Renders one registered SQL function from already-rendered arguments.
pub type RenderFn = fn(&[String]) -> String;

/// Defines a function item rendering `NAME(arg, arg, ...)`.
///
/// Dialect crates use this for their plain-call functions:
///
/// ```
/// trellis_core::sql_function!(render_total, "TOTAL");
///
/// fn main() {
///     assert_eq!(render_total(&["price".to_string()]), "TOTAL(price)");
/// }
/// ```
#[macro_export]
macro_rules! sql_function {
    ($name:ident, $keyword:literal) => {
        pub fn $name(args: &[::std::string::String]) -> ::std::string::String {
            ::std::format!(concat!($keyword, "({})"), args.join(", "))
        }
    };
}

sql_function!(render_count, "COUNT");
sql_function!(render_sum, "SUM");
sql_function!(render_avg, "AVG");
sql_function!(render_min, "MIN");
sql_function!(render_max, "MAX");
sql_function!(render_upper, "UPPER");
sql_function!(render_lower, "LOWER");
sql_function!(render_trim, "TRIM");

/// `a || b || c` concatenation, shared by the dialects without a native
/// variadic CONCAT call.
pub fn render_concat_pipes(args: &[String]) -> String {
    args.join(" || ")
}

sql_function!(render_group_concat, "GROUP_CONCAT");

/// Named SQL functions available to the per-query function context.
///
/// Every dialect starts from [`FunctionRegistry::shared`] and layers its
/// own spellings and extensions on top.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    entries: IndexMap<&'static str, RenderFn>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The baseline every dialect renders identically.
    pub fn shared() -> Self {
        let mut registry = Self::new();
        registry.register("COUNT", render_count);
        registry.register("SUM", render_sum);
        registry.register("AVG", render_avg);
        registry.register("MIN", render_min);
        registry.register("MAX", render_max);
        registry.register("UPPER", render_upper);
        registry.register("LOWER", render_lower);
        registry.register("TRIM", render_trim);
        registry
    }

    /// Registers or overrides a function under its canonical name.
    pub fn register(&mut self, name: &'static str, render: RenderFn) {
        self.entries.insert(name, render);
    }

    /// Looks a function up by canonical name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<RenderFn> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, render)| *render)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// One database flavor's string-rendering rules.
///
/// Implementations are pure data plus quoting functions; they are selected
/// once per query context and threaded explicitly through the builder and
/// renderer.
pub trait Dialect: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Quotes a bare identifier. `is_alias` distinguishes result-key and
    /// source aliases from column identifiers for dialects that treat them
    /// differently.
    fn quote_ident(&self, ident: &str, is_alias: bool) -> String;

    /// Quotes a table name or table alias. Defaults to [`Self::quote_ident`].
    fn quote_table(&self, name: &str, is_alias: bool) -> String {
        self.quote_ident(name, is_alias)
    }

    /// Quotes a `Table.column` or bare `column` reference. Unqualified input
    /// comes back quoted but unqualified; `*` passes through untouched.
    fn quote_qualified(&self, reference: &str) -> String {
        if reference == "*" {
            return reference.to_string();
        }
        match reference.split_once('.') {
            Some((qualifier, "*")) => format!("{}.*", self.quote_table(qualifier, false)),
            Some((qualifier, column)) => format!(
                "{}.{}",
                self.quote_table(qualifier, false),
                self.quote_ident(column, false)
            ),
            None => self.quote_ident(reference, false),
        }
    }

    /// Quotes the identifier portion of an ORDER BY clause, preserving an
    /// optional trailing direction verbatim.
    fn quote_order_by(&self, clause: &str) -> String {
        let (reference, direction) = split_direction(clause);
        match direction {
            Some(direction) => format!("{} {}", self.quote_qualified(reference), direction),
            None => self.quote_qualified(reference),
        }
    }

    /// Whether this dialect stores booleans as 0/1 and needs a CASE
    /// expression to surface logical booleans in result sets.
    fn needs_boolean_coercion(&self) -> bool;

    fn functions(&self) -> &FunctionRegistry;
}

/// Splits an optional trailing `ASC`/`DESC` (any casing) off an ORDER BY
/// clause, returning the suffix verbatim.
pub fn split_direction(clause: &str) -> (&str, Option<&str>) {
    let trimmed = clause.trim_end();
    if let Some((reference, last)) = trimmed.rsplit_once(char::is_whitespace) {
        if last.eq_ignore_ascii_case("ASC") || last.eq_ignore_ascii_case("DESC") {
            return (reference.trim_end(), Some(last));
        }
    }
    (trimmed, None)
}
