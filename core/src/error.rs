use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Table name not present in the schema
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// Column name not present on the named source
    #[error("unknown column {column} on {table}")]
    UnknownColumn { table: String, column: String },

    /// A source with the same binding key is already part of the query
    #[error("source {0} is already bound; alias the new occurrence")]
    DuplicateSource(String),

    /// No foreign-key relationship connects the joined table to the remote source
    #[error("no relationship between {table} and {source_table}")]
    InvalidJoin { table: String, source_table: String },

    /// The join column pair is not one of the recorded foreign-key paths
    #[error("{table}.{local} = {source_table}.{remote} is not a recorded relationship")]
    JoinColumnMismatch {
        table: String,
        local: String,
        source_table: String,
        remote: String,
    },

    /// Join predicate compares columns of different value types
    #[error("join columns {local} ({local_ty}) and {remote} ({remote_ty}) have incompatible types")]
    IncompatibleJoinTypes {
        local: String,
        local_ty: String,
        remote: String,
        remote_ty: String,
    },

    /// Unqualified column name exists on more than one bound source
    #[error("column {0} is ambiguous; qualify it with a table name or alias")]
    AmbiguousColumn(String),

    /// Criteria tree could not be constructed
    #[error("malformed criteria: {0}")]
    MalformedCriteria(String),

    /// Operator string not part of the condition grammar
    #[error("unrecognized operator: {0}")]
    UnknownOperator(String),

    /// Raw fragment starts with a clause keyword the renderer adds itself
    #[error("raw fragment must not begin with the {0} keyword")]
    GuardedRaw(String),

    /// Select or omit entry that is not a usable column reference
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// Two select items would produce the same result key
    #[error("duplicate select key: {0}")]
    DuplicateSelectKey(String),

    /// Function name not registered for the active dialect
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// Serialized schema could not be decoded
    #[error("schema format error: {0}")]
    SchemaFormat(String),

    /// Error reported by the external executor
    #[error("execution error: {0}")]
    Execution(String),
}

/// Result type for query construction and execution
pub type Result<T> = std::result::Result<T, Error>;
