//! Runtime schema model: tables, typed columns, and the foreign-key
//! relation graph that join validation consults.
//!
//! The model is produced once by an external ingestion step (either
//! programmatically or from its serialized JSON form) and is read-only for
//! the process lifetime. The relation map is treated as ground truth; it is
//! not re-derived or cross-checked against another source.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Value type of a column, with nullability tracked separately in [`TypeTag`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Boolean,
    Blob,
    Json,
}

impl ColumnType {
    /// Whether a join predicate may compare columns of these two types.
    pub fn compatible_with(self, other: ColumnType) -> bool {
        self == other
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Real => "real",
            ColumnType::Text => "text",
            ColumnType::Boolean => "boolean",
            ColumnType::Blob => "blob",
            ColumnType::Json => "json",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "integer" | "int" => Ok(ColumnType::Integer),
            "real" | "float" | "double" => Ok(ColumnType::Real),
            "text" | "string" => Ok(ColumnType::Text),
            "boolean" | "bool" => Ok(ColumnType::Boolean),
            "blob" | "bytes" => Ok(ColumnType::Blob),
            "json" => Ok(ColumnType::Json),
            other => Err(Error::SchemaFormat(format!("unknown column type: {other}"))),
        }
    }
}

/// Column type plus nullability.
///
/// The serialized form marks nullable columns with a leading `?`, so
/// `"?text"` is a nullable text column and `"text"` is non-nullable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeTag {
    pub ty: ColumnType,
    pub nullable: bool,
}

impl TypeTag {
    pub const fn new(ty: ColumnType, nullable: bool) -> Self {
        Self { ty, nullable }
    }

    pub const fn integer() -> Self {
        Self::new(ColumnType::Integer, false)
    }

    pub const fn real() -> Self {
        Self::new(ColumnType::Real, false)
    }

    pub const fn text() -> Self {
        Self::new(ColumnType::Text, false)
    }

    pub const fn boolean() -> Self {
        Self::new(ColumnType::Boolean, false)
    }

    pub const fn blob() -> Self {
        Self::new(ColumnType::Blob, false)
    }

    pub const fn json() -> Self {
        Self::new(ColumnType::Json, false)
    }

    /// Returns the same tag with nullability switched on.
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Parses the serialized tag form, `?` prefix marking nullability.
    pub fn parse(tag: &str) -> Result<Self> {
        match tag.strip_prefix('?') {
            Some(base) => Ok(Self::new(base.parse()?, true)),
            None => Ok(Self::new(tag.parse()?, false)),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "?{}", self.ty)
        } else {
            self.ty.fmt(f)
        }
    }
}

/// Foreign-key paths to one target table: local column to remote columns.
pub type RelationPaths = IndexMap<String, Vec<String>>;

/// One table: ordered columns and the outgoing relation map.
///
/// Column declaration order is preserved; star expansion emits columns in
/// this order.
#[derive(Clone, Debug)]
pub struct Table {
    name: String,
    fields: IndexMap<String, TypeTag>,
    relations: IndexMap<String, RelationPaths>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            relations: IndexMap::new(),
        }
    }

    /// Appends a column. Declaration order is meaningful.
    pub fn column(mut self, name: impl Into<String>, tag: TypeTag) -> Self {
        self.fields.insert(name.into(), tag);
        self
    }

    /// Records a foreign-key path from `local` on this table to the
    /// `remote` columns on `target`.
    pub fn relation(mut self, target: impl Into<String>, local: impl Into<String>, remote: &[&str]) -> Self {
        self.relations
            .entry(target.into())
            .or_default()
            .insert(local.into(), remote.iter().map(|c| (*c).to_string()).collect());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, column: &str) -> Option<TypeTag> {
        self.fields.get(column).copied()
    }

    pub fn has_field(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Columns in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, TypeTag)> {
        self.fields.iter().map(|(name, tag)| (name.as_str(), *tag))
    }

    pub fn relations_to(&self, target: &str) -> Option<&RelationPaths> {
        self.relations.get(target)
    }

    fn from_value(name: &str, value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::SchemaFormat(format!("table {name} must be an object")))?;

        let mut table = Table::new(name);

        let fields = obj
            .get("fields")
            .and_then(Value::as_object)
            .ok_or_else(|| Error::SchemaFormat(format!("table {name} is missing fields")))?;
        for (column, tag) in fields {
            let tag = tag
                .as_str()
                .ok_or_else(|| Error::SchemaFormat(format!("{name}.{column} type tag must be a string")))?;
            table = table.column(column, TypeTag::parse(tag)?);
        }

        if let Some(relations) = obj.get("relations").and_then(Value::as_object) {
            for (target, paths) in relations {
                let paths = paths.as_object().ok_or_else(|| {
                    Error::SchemaFormat(format!("relations from {name} to {target} must be an object"))
                })?;
                for (local, remotes) in paths {
                    let remotes: Vec<&str> = match remotes {
                        Value::Array(items) => items
                            .iter()
                            .map(|v| {
                                v.as_str().ok_or_else(|| {
                                    Error::SchemaFormat(format!(
                                        "remote columns of {name}.{local} must be strings"
                                    ))
                                })
                            })
                            .collect::<Result<_>>()?,
                        other => {
                            return Err(Error::SchemaFormat(format!(
                                "remote columns of {name}.{local} must be an array, got {other}"
                            )));
                        }
                    };
                    table = table.relation(target, local, &remotes);
                }
            }
        }

        Ok(table)
    }
}

/// The full schema: every table the builder may reference.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    tables: IndexMap<String, Table>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, table: Table) -> Self {
        self.tables.insert(table.name.clone(), table);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub(crate) fn require(&self, name: &str) -> Result<&Table> {
        self.get(name).ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    /// Whether any foreign-key relationship connects the two tables, in
    /// either direction.
    pub fn related(&self, a: &str, b: &str) -> bool {
        let forward = self.get(a).and_then(|t| t.relations_to(b)).is_some();
        let backward = self.get(b).and_then(|t| t.relations_to(a)).is_some();
        forward || backward
    }

    /// Whether `joined.local = source.remote` is one of the recorded
    /// foreign-key paths between the two tables, in either direction.
    pub fn relation_pair(&self, joined: &str, local: &str, source: &str, remote: &str) -> bool {
        let forward = self
            .get(joined)
            .and_then(|t| t.relations_to(source))
            .and_then(|paths| paths.get(local))
            .is_some_and(|remotes| remotes.iter().any(|r| r == remote));
        let backward = self
            .get(source)
            .and_then(|t| t.relations_to(joined))
            .and_then(|paths| paths.get(remote))
            .is_some_and(|locals| locals.iter().any(|l| l == local));
        forward || backward
    }

    /// Decodes the serialized schema produced by the ingestion step.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| Error::SchemaFormat(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::SchemaFormat("schema must be an object".to_string()))?;
        let mut schema = Schema::new();
        for (name, table) in obj {
            schema = schema.table(Table::from_value(name, table)?);
        }
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Schema {
        Schema::new()
            .table(
                Table::new("User")
                    .column("id", TypeTag::integer())
                    .column("email", TypeTag::text())
                    .relation("Post", "id", &["authorId"]),
            )
            .table(
                Table::new("Post")
                    .column("id", TypeTag::integer())
                    .column("authorId", TypeTag::integer())
                    .relation("User", "authorId", &["id"]),
            )
    }

    #[test]
    fn parses_type_tags() {
        assert_eq!(TypeTag::parse("text").unwrap(), TypeTag::text());
        assert_eq!(TypeTag::parse("?text").unwrap(), TypeTag::text().nullable());
        assert_eq!(TypeTag::parse("bool").unwrap(), TypeTag::boolean());
        assert!(TypeTag::parse("decimalish").is_err());
    }

    #[test]
    fn type_tag_display_round_trips() {
        for tag in ["integer", "?integer", "text", "?boolean", "json"] {
            assert_eq!(TypeTag::parse(tag).unwrap().to_string(), tag);
        }
    }

    #[test]
    fn relation_pair_matches_either_direction() {
        let schema = sample();
        assert!(schema.relation_pair("Post", "authorId", "User", "id"));
        assert!(schema.relation_pair("User", "id", "Post", "authorId"));
        assert!(!schema.relation_pair("Post", "id", "User", "id"));
        assert!(schema.related("User", "Post"));
        assert!(!schema.related("User", "User"));
    }

    #[test]
    fn decodes_serialized_schema() {
        let schema = Schema::from_json(
            r#"{
                "User": {
                    "fields": {"id": "integer", "email": "?text"},
                    "relations": {"Post": {"id": ["authorId"]}}
                },
                "Post": {
                    "fields": {"id": "integer", "authorId": "integer"}
                }
            }"#,
        )
        .unwrap();

        let user = schema.get("User").unwrap();
        let columns: Vec<&str> = user.fields().map(|(name, _)| name).collect();
        assert_eq!(columns, ["id", "email"]);
        assert_eq!(user.field("email").unwrap(), TypeTag::text().nullable());
        assert!(schema.relation_pair("Post", "authorId", "User", "id"));
    }

    #[test]
    fn rejects_malformed_schema() {
        assert!(Schema::from_json("[]").is_err());
        assert!(Schema::from_json(r#"{"User": {"fields": {"id": "mystery"}}}"#).is_err());
        assert!(Schema::from_json(r#"{"User": {}}"#).is_err());
    }
}
