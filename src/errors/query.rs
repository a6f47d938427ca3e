use thiserror::Error;

use super::codes::ErrorCode;

pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Failures raised while building or evaluating filters, sort keys and accessors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("unknown filter operator '{operator}' in lookup '{lookup}'")]
    UnknownOperator { lookup: String, operator: String },

    #[error("record has no field named '{field}'")]
    MissingField { field: String },

    #[error("cannot apply '{operation}' to {left} and {right}")]
    TypeMismatch {
        operation: String,
        left: &'static str,
        right: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in '{operation}'")]
    ArithmeticOverflow { operation: String },
}

impl QueryError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn type_mismatch(
        operation: impl Into<String>,
        left: &'static str,
        right: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            operation: operation.into(),
            left,
            right,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownOperator { .. } => ErrorCode::UnknownOperator,
            Self::MissingField { .. } => ErrorCode::MissingField,
            Self::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            Self::DivisionByZero => ErrorCode::DivisionByZero,
            Self::ArithmeticOverflow { .. } => ErrorCode::ArithmeticOverflow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = QueryError::UnknownOperator {
            lookup: "price__foo".to_string(),
            operator: "foo".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unknown filter operator 'foo' in lookup 'price__foo'"
        );

        let err = QueryError::missing_field("balcony");
        assert!(err.to_string().contains("balcony"));

        let err = QueryError::type_mismatch("gt", "string", "integer");
        assert_eq!(err.to_string(), "cannot apply 'gt' to string and integer");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            QueryError::missing_field("x").code(),
            ErrorCode::MissingField
        );
        assert_eq!(QueryError::DivisionByZero.code(), ErrorCode::DivisionByZero);
        assert_eq!(
            QueryError::type_mismatch("range", "string", "list").code(),
            ErrorCode::TypeMismatch
        );
    }
}
