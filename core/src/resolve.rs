//! Resolution of table, alias, and column references against the set of
//! sources a query has bound so far.

use crate::error::{Error, Result};
use crate::schema::{Schema, Table, TypeTag};

/// One bound source: a table occurrence in the FROM/JOIN list, optionally
/// aliased. An alias shadows the bare table name for this occurrence.
#[derive(Clone, Debug)]
pub(crate) struct Source {
    pub table: String,
    pub alias: Option<String>,
}

impl Source {
    pub fn new(table: impl Into<String>, alias: Option<&str>) -> Self {
        Self {
            table: table.into(),
            alias: alias.map(str::to_string),
        }
    }

    /// The key this occurrence is addressable by: the alias when one was
    /// given, the bare table name otherwise.
    pub fn key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }
}

/// A column reference resolved to a single bound source.
pub(crate) struct ResolvedColumn<'a> {
    pub source: &'a Source,
    pub column: String,
    pub tag: TypeTag,
    /// Whether the column name occurs on exactly one bound source.
    pub unique: bool,
}

/// The bound sources of one query, in bind order.
pub(crate) struct SourceSet<'a> {
    schema: &'a Schema,
    sources: Vec<&'a Source>,
}

impl<'a> SourceSet<'a> {
    pub fn new(
        schema: &'a Schema,
        base: &'a Source,
        joined: impl Iterator<Item = &'a Source>,
    ) -> Self {
        let mut sources = vec![base];
        sources.extend(joined);
        Self { schema, sources }
    }

    pub fn multi(&self) -> bool {
        self.sources.len() > 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Source> + '_ {
        self.sources.iter().copied()
    }

    pub fn table_of(&self, source: &Source) -> Result<&'a Table> {
        self.schema.require(&source.table)
    }

    /// Finds a source by binding key.
    pub fn find(&self, key: &str) -> Option<&'a Source> {
        self.sources.iter().copied().find(|s| s.key() == key)
    }

    /// Every bound source carrying the named column.
    pub fn occurrences(&self, column: &str) -> Result<Vec<&'a Source>> {
        let mut hits = Vec::new();
        for source in self.iter() {
            if self.table_of(source)?.has_field(column) {
                hits.push(source);
            }
        }
        Ok(hits)
    }

    fn keys(&self) -> String {
        let keys: Vec<&str> = self.sources.iter().map(|s| s.key()).collect();
        keys.join(", ")
    }

    /// Resolves `column` or `qualifier.column`.
    ///
    /// Bare names must identify a column on exactly one bound source;
    /// qualified names are valid regardless of ambiguity elsewhere.
    pub fn resolve(&self, reference: &str) -> Result<ResolvedColumn<'a>> {
        match reference.split_once('.') {
            Some((qualifier, column)) => {
                let source = self
                    .find(qualifier)
                    .ok_or_else(|| Error::UnknownTable(qualifier.to_string()))?;
                let table = self.table_of(source)?;
                let tag = table.field(column).ok_or_else(|| Error::UnknownColumn {
                    table: source.key().to_string(),
                    column: column.to_string(),
                })?;
                let unique = self.occurrences(column)?.len() == 1;
                Ok(ResolvedColumn {
                    source,
                    column: column.to_string(),
                    tag,
                    unique,
                })
            }
            None => {
                let hits = self.occurrences(reference)?;
                match hits.as_slice() {
                    [] => Err(Error::UnknownColumn {
                        table: self.keys(),
                        column: reference.to_string(),
                    }),
                    [source] => {
                        let tag = self.table_of(source)?.field(reference).ok_or_else(|| {
                            Error::UnknownColumn {
                                table: source.key().to_string(),
                                column: reference.to_string(),
                            }
                        })?;
                        Ok(ResolvedColumn {
                            source,
                            column: reference.to_string(),
                            tag,
                            unique: true,
                        })
                    }
                    _ => Err(Error::AmbiguousColumn(reference.to_string())),
                }
            }
        }
    }
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether a string is a plain column reference (`column` or
/// `qualifier.column`) as opposed to an expression fragment.
pub(crate) fn is_column_ref(s: &str) -> bool {
    match s.split_once('.') {
        Some((qualifier, column)) => is_ident(qualifier) && is_ident(column),
        None => is_ident(s),
    }
}
