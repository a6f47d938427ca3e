//! Structured error handling for query evaluation

pub mod codes;
pub mod query;

pub use codes::ErrorCode;
pub use query::{QueryError, QueryResult};
