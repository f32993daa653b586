//! # trellis
//!
//! A schema-aware fluent SQL query builder. Chains are staged —
//! `from → join → where → group_by → having → select → order_by →
//! limit/offset` — and every step is validated against a schema model:
//! unknown tables and columns, joins without a recorded foreign-key
//! relationship, and ambiguous unqualified columns are rejected when the
//! method is called, not when the database complains. Rendering goes
//! through a pluggable dialect (SQLite, PostgreSQL, MySQL ship here).
//!
//! ## Quick start
//!
//! ```rust
//! use trellis::prelude::*;
//! use trellis::sqlite::SQLiteDialect;
//!
//! # fn main() -> trellis::Result<()> {
//! let schema = Schema::new()
//!     .table(
//!         Table::new("User")
//!             .column("id", TypeTag::integer())
//!             .column("email", TypeTag::text())
//!             .column("name", TypeTag::text())
//!             .relation("Post", "id", &["authorId"]),
//!     )
//!     .table(
//!         Table::new("Post")
//!             .column("id", TypeTag::integer())
//!             .column("authorId", TypeTag::integer())
//!             .column("title", TypeTag::text())
//!             .relation("User", "authorId", &["id"]),
//!     );
//!
//! let dialect = SQLiteDialect::new();
//! let qb = QueryBuilder::new(&schema, &dialect);
//!
//! let sql = qb
//!     .from("User")?
//!     .join("Post", "authorId", "User.id")?
//!     .select("User.name")?
//!     .select("Post.title")?
//!     .to_sql();
//! assert_eq!(
//!     sql,
//!     "SELECT name, title FROM User JOIN Post ON Post.authorId = User.id;"
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Dialect support
//!
//! | Database   | Crate             | Feature flag |
//! |------------|-------------------|--------------|
//! | SQLite     | `trellis-sqlite`  | `sqlite`     |
//! | PostgreSQL | `trellis-postgres`| `postgres`   |
//! | MySQL      | `trellis-mysql`   | `mysql`      |

// Core engine
pub use trellis_core::{
    builder, criteria, dialect, error, executor, expr, schema,
};

pub use trellis_core::{
    ColumnType, Condition, Criteria, Dialect, Error, ExecutableStage, Executor, Expr, FnArg,
    FnContext, FunctionRegistry, Literal, LogicalOp, QueryBuilder, RenderFn, Result, Row, Schema,
    SelectBuilder, Table, TypeTag, expr as sql_expr, lit, lit_null,
};

// Dialect implementations
#[cfg(feature = "sqlite")]
pub use trellis_sqlite as sqlite;

#[cfg(feature = "postgres")]
pub use trellis_postgres as postgres;

#[cfg(feature = "mysql")]
pub use trellis_mysql as mysql;

/// Everything a typical caller needs in scope.
pub mod prelude {
    pub use trellis_core::{
        Condition, Criteria, Dialect, Error, Executor, Expr, FnArg, FnContext, Literal, LogicalOp,
        QueryBuilder, Result, Row, Schema, SelectBuilder, Table, TypeTag, lit, lit_null,
    };

    #[cfg(feature = "sqlite")]
    pub use trellis_sqlite::SQLiteDialect;

    #[cfg(feature = "postgres")]
    pub use trellis_postgres::PostgresDialect;

    #[cfg(feature = "mysql")]
    pub use trellis_mysql::MySQLDialect;
}
