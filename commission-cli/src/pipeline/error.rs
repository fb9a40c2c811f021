//! Row-scoped error taxonomy
//!
//! Every error here aborts exactly one row. The orchestrator renders the
//! message into the batch error list and moves on to the next row; nothing
//! in this module ever aborts the batch.

use super::resolver::DimensionKind;

/// Error that aborts processing of a single row
#[derive(Debug, Clone, PartialEq)]
pub enum RowError {
    /// Dimension lookup-or-create failed
    Dimension {
        kind: DimensionKind,
        message: String,
    },
    /// Order insert failed; the commission insert was not attempted
    Order { message: String },
    /// Commission insert failed; the order row stays persisted
    Commission { message: String },
}

impl RowError {
    pub(crate) fn dimension(kind: DimensionKind, source: &anyhow::Error) -> Self {
        RowError::Dimension {
            kind,
            message: format!("{:#}", source),
        }
    }

    pub(crate) fn order(source: &anyhow::Error) -> Self {
        RowError::Order {
            message: format!("{:#}", source),
        }
    }

    pub(crate) fn commission(source: &anyhow::Error) -> Self {
        RowError::Commission {
            message: format!("{:#}", source),
        }
    }
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowError::Dimension { kind, message } => write!(f, "{}: {}", kind.label(), message),
            RowError::Order { message } => write!(f, "Order: {}", message),
            RowError::Commission { message } => write!(f, "Commission: {}", message),
        }
    }
}

impl std::error::Error for RowError {}
