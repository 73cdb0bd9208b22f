//! Error types for building and persisting the expression tree model.

use crate::ids::ExprId;

/// Errors raised by [`TreeBuilder`](crate::builder::TreeBuilder) and by
/// snapshot loading/saving on [`CoverageDb`](crate::db::CoverageDb).
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    /// The snapshot file could not be read or written.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot content is not a valid coverage database.
    #[error("malformed snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// The snapshot parsed but its ids or parent links do not fit together.
    #[error("inconsistent snapshot: {0}")]
    Inconsistent(String),

    /// An expression ID was not issued by this database.
    #[error("unknown expression {0}")]
    UnknownExpr(ExprId),

    /// The expression is already owned by a parent or a statement.
    #[error("expression {0} is already attached")]
    AlreadyAttached(ExprId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_expr() {
        let err = IrError::UnknownExpr(ExprId::from_raw(7));
        assert_eq!(err.to_string(), "unknown expression e7");
    }

    #[test]
    fn display_already_attached() {
        let err = IrError::AlreadyAttached(ExprId::from_raw(2));
        assert_eq!(err.to_string(), "expression e2 is already attached");
    }

    #[test]
    fn display_inconsistent() {
        let err = IrError::Inconsistent("e3 is its own ancestor".to_string());
        assert_eq!(err.to_string(), "inconsistent snapshot: e3 is its own ancestor");
    }

    #[test]
    fn display_io() {
        let err = IrError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.to_string().starts_with("snapshot I/O error:"));
    }
}
