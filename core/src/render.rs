//! Pure SQL assembly: query state in, one SQL string out.
//!
//! Clause order is fixed regardless of the order builder methods ran in:
//! `SELECT [DISTINCT] .. FROM .. JOIN .. WHERE .. GROUP BY .. HAVING ..
//! ORDER BY .. LIMIT .. OFFSET ..;`. Star selections expand here, against
//! the schema's declared column order.

use crate::builder::{QueryState, SelectItem, WhereEntry};
use crate::dialect::Dialect;
use crate::resolve::{ResolvedColumn, Source};
use crate::schema::{ColumnType, Schema};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RenderStyle {
    /// Clauses joined with spaces.
    Compact,
    /// One clause per line.
    Pretty,
}

pub(crate) fn render(
    schema: &Schema,
    dialect: &dyn Dialect,
    state: &QueryState,
    style: RenderStyle,
) -> String {
    let mut clauses: Vec<String> = Vec::new();

    let items = expand_selects(schema, dialect, state);
    if !items.is_empty() {
        let keyword = if state.distinct {
            "SELECT DISTINCT"
        } else {
            "SELECT"
        };
        clauses.push(format!("{keyword} {}", items.join(", ")));
    }

    clauses.push(format!("FROM {}", render_source(dialect, &state.base)));

    for join in &state.joins {
        clauses.push(format!(
            "JOIN {} ON {} = {}",
            render_source(dialect, &join.source),
            dialect.quote_qualified(&format!("{}.{}", join.source.key(), join.local)),
            dialect.quote_qualified(&format!("{}.{}", join.remote_key, join.remote)),
        ));
    }

    if !state.wheres.is_empty() {
        clauses.push(format!("WHERE {}", render_entries(dialect, &state.wheres)));
    }

    if !state.group_by.is_empty() {
        let columns: Vec<String> = state
            .group_by
            .iter()
            .map(|column| dialect.quote_qualified(column))
            .collect();
        clauses.push(format!("GROUP BY {}", columns.join(", ")));
    }

    if !state.havings.is_empty() {
        clauses.push(format!("HAVING {}", render_entries(dialect, &state.havings)));
    }

    if !state.order_by.is_empty() {
        let columns: Vec<String> = state
            .order_by
            .iter()
            .map(|clause| dialect.quote_order_by(clause))
            .collect();
        clauses.push(format!("ORDER BY {}", columns.join(", ")));
    }

    if let Some(n) = state.limit {
        clauses.push(format!("LIMIT {n}"));
    }
    if let Some(n) = state.offset {
        clauses.push(format!("OFFSET {n}"));
    }

    let separator = match style {
        RenderStyle::Compact => " ",
        RenderStyle::Pretty => "\n",
    };
    let sql = format!("{};", clauses.join(separator));
    tracing::debug!(dialect = dialect.name(), %sql, "rendered query");
    sql
}

fn render_source(dialect: &dyn Dialect, source: &Source) -> String {
    match &source.alias {
        Some(alias) => format!(
            "{} AS {}",
            dialect.quote_table(&source.table, false),
            dialect.quote_table(alias, true)
        ),
        None => dialect.quote_table(&source.table, false),
    }
}

fn render_entries(dialect: &dyn Dialect, entries: &[WhereEntry]) -> String {
    let parts: Vec<String> = entries
        .iter()
        .map(|entry| match entry {
            WhereEntry::Criteria(criteria) => format!("({})", criteria.render(dialect)),
            WhereEntry::Raw(sql) => sql.clone(),
        })
        .collect();
    parts.join(" AND ")
}

/// `CASE WHEN col = 1 THEN TRUE ELSE FALSE END`, for dialects that store
/// booleans as 0/1.
fn boolean_case(column_sql: &str) -> String {
    format!("CASE WHEN {column_sql} = 1 THEN TRUE ELSE FALSE END")
}

/// Resolves one single-column select item to its SQL fragment and result
/// key.
///
/// A column whose name is unique across the bound sources renders bare; a
/// shared name renders qualified and aliased so result keys cannot
/// silently collide. Boolean columns are coerced per the dialect.
pub(crate) fn render_select_column(
    dialect: &dyn Dialect,
    hit: &ResolvedColumn<'_>,
    alias: Option<&str>,
) -> (String, String) {
    let coerce = hit.tag.ty == ColumnType::Boolean && dialect.needs_boolean_coercion();

    let base = if hit.unique {
        dialect.quote_ident(&hit.column, false)
    } else {
        dialect.quote_qualified(&format!("{}.{}", hit.source.key(), hit.column))
    };
    let base = if coerce { boolean_case(&base) } else { base };

    match alias {
        Some(alias) => (
            format!("{base} AS {}", dialect.quote_ident(alias, true)),
            alias.to_string(),
        ),
        None => {
            let key = if hit.unique {
                hit.column.clone()
            } else {
                format!("{}.{}", hit.source.key(), hit.column)
            };
            if hit.unique && !coerce {
                (base, key)
            } else {
                let quoted = dialect.quote_ident(&key, true);
                (format!("{base} AS {quoted}"), key)
            }
        }
    }
}

fn expand_selects(schema: &Schema, dialect: &dyn Dialect, state: &QueryState) -> Vec<String> {
    let sources: Vec<&Source> = std::iter::once(&state.base)
        .chain(state.joins.iter().map(|join| &join.source))
        .collect();
    let multi = sources.len() > 1;
    let no_omissions: Vec<(String, String)> = Vec::new();

    let mut items = Vec::new();
    for item in &state.selects {
        match item {
            SelectItem::Star => {
                for &source in &sources {
                    expand_source(schema, dialect, source, multi, &no_omissions, &mut items);
                }
            }
            SelectItem::StarExcept { omit } => {
                for &source in &sources {
                    expand_source(schema, dialect, source, multi, omit, &mut items);
                }
            }
            SelectItem::TableStar { key } => {
                if let Some(source) = sources.iter().copied().find(|s| s.key() == key) {
                    expand_source(schema, dialect, source, multi, &no_omissions, &mut items);
                }
            }
            SelectItem::Rendered { sql, .. } => items.push(sql.clone()),
        }
    }
    items
}

fn expand_source(
    schema: &Schema,
    dialect: &dyn Dialect,
    source: &Source,
    multi: bool,
    omit: &[(String, String)],
    items: &mut Vec<String>,
) {
    let Some(table) = schema.get(&source.table) else {
        // Sources are validated when bound; an unknown table here would be
        // a schema swapped out from under the builder.
        debug_assert!(false, "bound source {} missing from schema", source.table);
        return;
    };
    let key = source.key();

    for (column, tag) in table.fields() {
        if omit
            .iter()
            .any(|(omit_key, omit_column)| omit_key == key && omit_column == column)
        {
            continue;
        }
        let coerce = tag.ty == ColumnType::Boolean && dialect.needs_boolean_coercion();
        if multi {
            let qualified = format!("{key}.{column}");
            let base = dialect.quote_qualified(&qualified);
            let base = if coerce { boolean_case(&base) } else { base };
            items.push(format!("{base} AS {}", dialect.quote_ident(&qualified, true)));
        } else {
            let base = dialect.quote_ident(column, false);
            if coerce {
                items.push(format!(
                    "{} AS {}",
                    boolean_case(&base),
                    dialect.quote_ident(column, true)
                ));
            } else {
                items.push(base);
            }
        }
    }
}
