//! Core engine of the trellis query builder: the schema model, the staged
//! builder, the criteria tree, expression values, the dialect seam, and
//! the SQL renderer. Dialect implementations live in their own crates.

pub mod builder;
pub mod criteria;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod expr;
mod render;
mod resolve;
pub mod schema;

// Re-export key types and traits
pub use builder::{ExecutableStage, QueryBuilder, SelectBuilder};
pub use criteria::{Condition, Criteria, LogicalOp};
pub use dialect::{Dialect, FunctionRegistry, RenderFn};
pub use error::{Error, Result};
pub use executor::{Executor, Row};
pub use expr::{Expr, FnArg, FnContext, Literal, expr, lit, lit_null};
pub use schema::{ColumnType, Schema, Table, TypeTag};
