//! Recursive boolean-condition trees for WHERE and HAVING clauses.
//!
//! A [`Criteria`] value corresponds to one criteria object: an ordered set
//! of field conditions and logical groups. Construction fails fast on
//! unknown operators and wrong operand counts; rendering never repairs a
//! malformed tree.

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::expr::Literal;
use crate::resolve::is_column_ref;
use serde_json::Value;
use smallvec::SmallVec;

/// Logical combinator keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Not,
    Nor,
}

impl LogicalOp {
    /// Parses the object-form key (`$AND`, `$OR`, `$NOT`, `$NOR`).
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "$AND" => Some(LogicalOp::And),
            "$OR" => Some(LogicalOp::Or),
            "$NOT" => Some(LogicalOp::Not),
            "$NOR" => Some(LogicalOp::Nor),
            _ => None,
        }
    }
}

/// One comparison applied to a field.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    Eq(Literal),
    NotEq(Literal),
    Gt(Literal),
    Gte(Literal),
    Lt(Literal),
    Lte(Literal),
    Like(String),
    NotLike(String),
    In(Vec<Literal>),
    NotIn(Vec<Literal>),
    Between(Literal, Literal),
    NotBetween(Literal, Literal),
    IsNull,
    IsNotNull,
}

impl Condition {
    pub fn eq(value: impl Into<Literal>) -> Self {
        Condition::Eq(value.into())
    }

    pub fn not_eq(value: impl Into<Literal>) -> Self {
        Condition::NotEq(value.into())
    }

    pub fn gt(value: impl Into<Literal>) -> Self {
        Condition::Gt(value.into())
    }

    pub fn gte(value: impl Into<Literal>) -> Self {
        Condition::Gte(value.into())
    }

    pub fn lt(value: impl Into<Literal>) -> Self {
        Condition::Lt(value.into())
    }

    pub fn lte(value: impl Into<Literal>) -> Self {
        Condition::Lte(value.into())
    }

    pub fn like(pattern: impl Into<String>) -> Self {
        Condition::Like(pattern.into())
    }

    pub fn not_like(pattern: impl Into<String>) -> Self {
        Condition::NotLike(pattern.into())
    }

    pub fn in_list<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Literal>,
    {
        Condition::In(values.into_iter().map(Into::into).collect())
    }

    pub fn not_in<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Literal>,
    {
        Condition::NotIn(values.into_iter().map(Into::into).collect())
    }

    pub fn between(low: impl Into<Literal>, high: impl Into<Literal>) -> Self {
        Condition::Between(low.into(), high.into())
    }

    pub fn not_between(low: impl Into<Literal>, high: impl Into<Literal>) -> Self {
        Condition::NotBetween(low.into(), high.into())
    }

    /// Builds a condition from a dynamic operator string and operand list,
    /// enforcing operand arity. Unrecognized operators are an error, never
    /// passed through.
    pub fn from_parts(op: &str, mut values: Vec<Literal>) -> Result<Self> {
        fn single(op: &str, values: &mut Vec<Literal>) -> Result<Literal> {
            if values.len() != 1 {
                return Err(Error::MalformedCriteria(format!(
                    "{op} takes exactly one operand, got {}",
                    values.len()
                )));
            }
            Ok(values.remove(0))
        }

        fn pattern(op: &str, values: &mut Vec<Literal>) -> Result<String> {
            match single(op, values)? {
                Literal::Text(s) => Ok(s),
                other => Err(Error::MalformedCriteria(format!(
                    "{op} takes a string pattern, got {}",
                    other.render()
                ))),
            }
        }

        fn pair(op: &str, values: Vec<Literal>) -> Result<(Literal, Literal)> {
            let mut iter = values.into_iter();
            match (iter.next(), iter.next(), iter.next()) {
                (Some(low), Some(high), None) => Ok((low, high)),
                _ => Err(Error::MalformedCriteria(format!(
                    "{op} requires exactly two values"
                ))),
            }
        }

        let canonical = op.trim().to_ascii_uppercase();
        match canonical.as_str() {
            "=" | "==" => Ok(Condition::Eq(single(op, &mut values)?)),
            "!=" | "<>" => Ok(Condition::NotEq(single(op, &mut values)?)),
            ">" => Ok(Condition::Gt(single(op, &mut values)?)),
            ">=" => Ok(Condition::Gte(single(op, &mut values)?)),
            "<" => Ok(Condition::Lt(single(op, &mut values)?)),
            "<=" => Ok(Condition::Lte(single(op, &mut values)?)),
            "LIKE" => Ok(Condition::Like(pattern(op, &mut values)?)),
            "NOT LIKE" => Ok(Condition::NotLike(pattern(op, &mut values)?)),
            "IN" => Ok(Condition::In(values)),
            "NOT IN" => Ok(Condition::NotIn(values)),
            "BETWEEN" => {
                let (low, high) = pair(op, values)?;
                Ok(Condition::Between(low, high))
            }
            "NOT BETWEEN" => {
                let (low, high) = pair(op, values)?;
                Ok(Condition::NotBetween(low, high))
            }
            "IS NULL" => Ok(Condition::IsNull),
            "IS NOT NULL" => Ok(Condition::IsNotNull),
            _ => Err(Error::UnknownOperator(op.to_string())),
        }
    }

    fn render(&self, field: &str) -> String {
        fn list(values: &[Literal]) -> String {
            if values.is_empty() {
                // An empty list matches nothing; IN (NULL) keeps the SQL valid.
                return "NULL".to_string();
            }
            let rendered: Vec<String> = values.iter().map(Literal::render).collect();
            rendered.join(", ")
        }

        match self {
            Condition::Eq(v) if v.is_null() => format!("{field} IS NULL"),
            Condition::Eq(v) => format!("{field} = {}", v.render()),
            Condition::NotEq(v) if v.is_null() => format!("{field} IS NOT NULL"),
            Condition::NotEq(v) => format!("{field} != {}", v.render()),
            Condition::Gt(v) => format!("{field} > {}", v.render()),
            Condition::Gte(v) => format!("{field} >= {}", v.render()),
            Condition::Lt(v) => format!("{field} < {}", v.render()),
            Condition::Lte(v) => format!("{field} <= {}", v.render()),
            Condition::Like(p) => format!("{field} LIKE {}", Literal::Text(p.clone()).render()),
            Condition::NotLike(p) => {
                format!("{field} NOT LIKE {}", Literal::Text(p.clone()).render())
            }
            Condition::In(values) => format!("{field} IN ({})", list(values)),
            Condition::NotIn(values) => format!("{field} NOT IN ({})", list(values)),
            Condition::Between(low, high) => {
                format!("{field} BETWEEN {} AND {}", low.render(), high.render())
            }
            Condition::NotBetween(low, high) => {
                format!("{field} NOT BETWEEN {} AND {}", low.render(), high.render())
            }
            Condition::IsNull => format!("{field} IS NULL"),
            Condition::IsNotNull => format!("{field} IS NOT NULL"),
        }
    }
}

#[derive(Clone, Debug)]
enum Entry {
    Field { field: String, condition: Condition },
    Group { op: LogicalOp, children: Vec<Criteria> },
    Raw(String),
}

/// One criteria object: ordered field conditions and logical groups,
/// implicitly AND-joined.
#[derive(Clone, Debug, Default)]
pub struct Criteria {
    entries: SmallVec<[Entry; 2]>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field condition.
    pub fn field(mut self, field: impl Into<String>, condition: Condition) -> Self {
        self.entries.push(Entry::Field {
            field: field.into(),
            condition,
        });
        self
    }

    /// Appends a verbatim fragment. The caller owns its correctness and
    /// quoting.
    pub fn raw(mut self, sql: impl Into<String>) -> Self {
        self.entries.push(Entry::Raw(sql.into()));
        self
    }

    /// Appends a logical group over child criteria.
    pub fn group<I>(mut self, op: LogicalOp, children: I) -> Self
    where
        I: IntoIterator<Item = Criteria>,
    {
        self.entries.push(Entry::Group {
            op,
            children: children.into_iter().collect(),
        });
        self
    }

    pub fn and<I: IntoIterator<Item = Criteria>>(children: I) -> Self {
        Self::new().group(LogicalOp::And, children)
    }

    pub fn or<I: IntoIterator<Item = Criteria>>(children: I) -> Self {
        Self::new().group(LogicalOp::Or, children)
    }

    pub fn not<I: IntoIterator<Item = Criteria>>(children: I) -> Self {
        Self::new().group(LogicalOp::Not, children)
    }

    pub fn nor<I: IntoIterator<Item = Criteria>>(children: I) -> Self {
        Self::new().group(LogicalOp::Nor, children)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_compound(&self) -> bool {
        self.entries.len() > 1
    }

    /// Builds a criteria tree from the object form: field keys map to
    /// conditions (scalars are equality, arrays are implicit IN, objects
    /// carry an `op` with `value`/`values`), `$AND`/`$OR`/`$NOT`/`$NOR`
    /// keys hold arrays of child objects.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::MalformedCriteria(format!("criteria must be an object, got {value}")))?;

        let mut criteria = Criteria::new();
        for (key, value) in object {
            if let Some(op) = LogicalOp::parse(key) {
                let items = value.as_array().ok_or_else(|| {
                    Error::MalformedCriteria(format!("{key} expects an array of criteria"))
                })?;
                let children: Vec<Criteria> =
                    items.iter().map(Criteria::from_json).collect::<Result<_>>()?;
                criteria = criteria.group(op, children);
            } else {
                criteria = criteria.field(key, condition_from_json(value)?);
            }
        }
        Ok(criteria)
    }

    /// Field names referenced anywhere in the tree, for validation against
    /// the bound sources.
    pub(crate) fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        for entry in &self.entries {
            match entry {
                Entry::Field { field, .. } => out.push(field),
                Entry::Group { children, .. } => {
                    for child in children {
                        child.collect_fields(out);
                    }
                }
                Entry::Raw(_) => {}
            }
        }
    }

    /// Renders the object's entries AND-joined, without outer parentheses;
    /// the clause assembler parenthesizes top-level entries.
    pub(crate) fn render(&self, dialect: &dyn Dialect) -> String {
        let parts: Vec<String> = self.entries.iter().map(|e| render_entry(e, dialect)).collect();
        parts.join(" AND ")
    }
}

fn quote_field(field: &str, dialect: &dyn Dialect) -> String {
    if is_column_ref(field) {
        dialect.quote_qualified(field)
    } else {
        field.to_string()
    }
}

fn render_entry(entry: &Entry, dialect: &dyn Dialect) -> String {
    match entry {
        Entry::Field { field, condition } => condition.render(&quote_field(field, dialect)),
        Entry::Raw(sql) => sql.clone(),
        Entry::Group { op, children } => match op {
            LogicalOp::And | LogicalOp::Or => {
                let parts: Vec<String> = children
                    .iter()
                    .map(|child| {
                        let rendered = child.render(dialect);
                        if child.is_compound() {
                            format!("({rendered})")
                        } else {
                            rendered
                        }
                    })
                    .collect();
                let joined = match op {
                    LogicalOp::And => parts.join(" AND "),
                    _ => parts.join(" OR "),
                };
                if children.len() > 1 {
                    format!("({joined})")
                } else {
                    joined
                }
            }
            LogicalOp::Not | LogicalOp::Nor => {
                let parts: Vec<String> = children
                    .iter()
                    .map(|child| format!("({})", child.render(dialect)))
                    .collect();
                let joined = match op {
                    LogicalOp::Not => parts.join(" AND "),
                    _ => parts.join(" OR "),
                };
                format!("NOT({joined})")
            }
        },
    }
}

fn condition_from_json(value: &Value) -> Result<Condition> {
    match value {
        Value::Array(items) => {
            let values: Vec<Literal> = items.iter().map(Literal::try_from).collect::<Result<_>>()?;
            Ok(Condition::In(values))
        }
        Value::Object(map) => {
            let op = map
                .get("op")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::MalformedCriteria("condition object is missing op".to_string()))?;
            let values = match (map.get("value"), map.get("values")) {
                (Some(single), None) => vec![Literal::try_from(single)?],
                (None, Some(Value::Array(items))) => {
                    items.iter().map(Literal::try_from).collect::<Result<_>>()?
                }
                (None, Some(other)) => {
                    return Err(Error::MalformedCriteria(format!(
                        "values must be an array, got {other}"
                    )));
                }
                (None, None) => Vec::new(),
                (Some(_), Some(_)) => {
                    return Err(Error::MalformedCriteria(
                        "condition carries both value and values".to_string(),
                    ));
                }
            };
            Condition::from_parts(op, values)
        }
        scalar => Ok(Condition::Eq(Literal::try_from(scalar)?)),
    }
}
