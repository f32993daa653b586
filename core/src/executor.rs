//! The execution hand-off seam.
//!
//! The builder only produces SQL strings; sending them anywhere is the
//! executor's business. Rows come back as untyped key/value maps — result
//! typing is a compile-time overlay the builder does not enforce at
//! runtime.

use crate::error::Result;
use std::future::Future;

/// One result row.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// External query execution collaborator.
pub trait Executor {
    fn execute_query(&self, sql: &str) -> impl Future<Output = Result<Vec<Row>>> + Send;
}
