//! Expression values: opaque SQL fragments carrying a phantom result type,
//! plus the per-query function context that builds them.

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::resolve::SourceSet;
use serde_json::Value;
use std::marker::PhantomData;

/// A rendered SQL fragment with a phantom result type.
///
/// The runtime shape is just the fragment; the type parameter only exists
/// so function signatures can document what the fragment evaluates to.
/// Fragments nest without re-quoting, which is what makes
/// `upper(trim(col))` compose.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expr<T = ()> {
    sql: String,
    _ty: PhantomData<fn() -> T>,
}

impl<T> Expr<T> {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn into_sql(self) -> String {
        self.sql
    }
}

/// Wraps a raw SQL fragment as an [`Expr`]. The caller vouches for the
/// fragment's correctness and quoting.
pub fn expr<T>(sql: impl Into<String>) -> Expr<T> {
    Expr {
        sql: sql.into(),
        _ty: PhantomData,
    }
}

/// A host-language literal and its SQL rendering.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Text(String),
    Integer(i64),
    Real(f64),
    Bool(bool),
    Null,
}

impl Literal {
    /// Renders the literal: text single-quoted with `''` doubling, numbers
    /// verbatim, booleans as `1`/`0`, null as `NULL`.
    pub fn render(&self) -> String {
        match self {
            Literal::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Literal::Integer(i) => i.to_string(),
            Literal::Real(r) => r.to_string(),
            Literal::Bool(true) => "1".to_string(),
            Literal::Bool(false) => "0".to_string(),
            Literal::Null => "NULL".to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Text(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Text(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Integer(i64::from(value))
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Integer(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Real(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl TryFrom<&Value> for Literal {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Literal::Null),
            Value::Bool(b) => Ok(Literal::Bool(*b)),
            Value::String(s) => Ok(Literal::Text(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Literal::Integer(i))
                } else if let Some(r) = n.as_f64() {
                    Ok(Literal::Real(r))
                } else {
                    Err(Error::MalformedCriteria(format!("unusable number: {n}")))
                }
            }
            other => Err(Error::MalformedCriteria(format!(
                "expected a literal value, got {other}"
            ))),
        }
    }
}

/// Maps host values to the phantom type of the [`Expr`] that `lit` returns.
pub trait IntoLiteral: Into<Literal> {
    type Ty;
}

impl IntoLiteral for &str {
    type Ty = String;
}

impl IntoLiteral for String {
    type Ty = String;
}

impl IntoLiteral for i32 {
    type Ty = i64;
}

impl IntoLiteral for i64 {
    type Ty = i64;
}

impl IntoLiteral for f64 {
    type Ty = f64;
}

impl IntoLiteral for bool {
    type Ty = bool;
}

/// Converts a host literal into an [`Expr`] fragment.
pub fn lit<V: IntoLiteral>(value: V) -> Expr<V::Ty> {
    expr(value.into().render())
}

/// The `NULL` literal fragment.
pub fn lit_null() -> Expr<()> {
    expr(Literal::Null.render())
}

/// One argument to a context function: either a column reference (resolved
/// and quoted through the active dialect) or an already-rendered fragment
/// (used verbatim).
#[derive(Clone, Debug)]
pub enum FnArg {
    Column(String),
    Fragment(String),
}

impl From<&str> for FnArg {
    fn from(reference: &str) -> Self {
        FnArg::Column(reference.to_string())
    }
}

impl From<String> for FnArg {
    fn from(reference: String) -> Self {
        FnArg::Column(reference)
    }
}

impl<T> From<Expr<T>> for FnArg {
    fn from(e: Expr<T>) -> Self {
        FnArg::Fragment(e.into_sql())
    }
}

/// Per-query function context: the active dialect's functions exposed as
/// callables over column references and expression values.
pub struct FnContext<'q> {
    dialect: &'q dyn Dialect,
    sources: &'q SourceSet<'q>,
}

impl<'q> FnContext<'q> {
    pub(crate) fn new(dialect: &'q dyn Dialect, sources: &'q SourceSet<'q>) -> Self {
        Self { dialect, sources }
    }

    /// A validated, dialect-quoted column reference.
    pub fn col(&self, reference: &str) -> Result<Expr<()>> {
        self.sources.resolve(reference)?;
        Ok(expr(self.dialect.quote_qualified(reference)))
    }

    fn render_arg(&self, arg: FnArg) -> Result<String> {
        match arg {
            FnArg::Column(reference) if reference == "*" => Ok(reference),
            FnArg::Column(reference) => {
                self.sources.resolve(&reference)?;
                Ok(self.dialect.quote_qualified(&reference))
            }
            FnArg::Fragment(sql) => Ok(sql),
        }
    }

    fn invoke(&self, name: &str, args: Vec<FnArg>) -> Result<String> {
        let render = self
            .dialect
            .functions()
            .get(name)
            .ok_or_else(|| Error::UnknownFunction(name.to_string()))?;
        let rendered: Vec<String> = args
            .into_iter()
            .map(|arg| self.render_arg(arg))
            .collect::<Result<_>>()?;
        Ok(render(&rendered))
    }

    /// Calls any registered function by canonical name, including the
    /// dialect-unique extensions.
    pub fn call<I>(&self, name: &str, args: I) -> Result<Expr<()>>
    where
        I: IntoIterator,
        I::Item: Into<FnArg>,
    {
        let args = args.into_iter().map(Into::into).collect();
        Ok(expr(self.invoke(name, args)?))
    }

    pub fn count(&self, arg: impl Into<FnArg>) -> Result<Expr<i64>> {
        Ok(expr(self.invoke("COUNT", vec![arg.into()])?))
    }

    pub fn sum(&self, arg: impl Into<FnArg>) -> Result<Expr<f64>> {
        Ok(expr(self.invoke("SUM", vec![arg.into()])?))
    }

    pub fn avg(&self, arg: impl Into<FnArg>) -> Result<Expr<f64>> {
        Ok(expr(self.invoke("AVG", vec![arg.into()])?))
    }

    pub fn min(&self, arg: impl Into<FnArg>) -> Result<Expr<()>> {
        Ok(expr(self.invoke("MIN", vec![arg.into()])?))
    }

    pub fn max(&self, arg: impl Into<FnArg>) -> Result<Expr<()>> {
        Ok(expr(self.invoke("MAX", vec![arg.into()])?))
    }

    pub fn upper(&self, arg: impl Into<FnArg>) -> Result<Expr<String>> {
        Ok(expr(self.invoke("UPPER", vec![arg.into()])?))
    }

    pub fn lower(&self, arg: impl Into<FnArg>) -> Result<Expr<String>> {
        Ok(expr(self.invoke("LOWER", vec![arg.into()])?))
    }

    pub fn trim(&self, arg: impl Into<FnArg>) -> Result<Expr<String>> {
        Ok(expr(self.invoke("TRIM", vec![arg.into()])?))
    }

    pub fn concat<I>(&self, args: I) -> Result<Expr<String>>
    where
        I: IntoIterator,
        I::Item: Into<FnArg>,
    {
        let args = args.into_iter().map(Into::into).collect();
        Ok(expr(self.invoke("CONCAT", args)?))
    }

    pub fn group_concat(&self, arg: impl Into<FnArg>) -> Result<Expr<String>> {
        Ok(expr(self.invoke("GROUP_CONCAT", vec![arg.into()])?))
    }
}
