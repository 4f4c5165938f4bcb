//! Binding error taxonomy.

use crate::model::record::RecordError;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BindingResult<T> = Result<T, BindingError>;

/// Command or read issued through a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Add,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    pub(crate) fn past_tense(self) -> &'static str {
        match self {
            Self::Load => "loaded",
            Self::Add => "added",
            Self::Update => "updated",
            Self::Delete => "deleted",
        }
    }
}

/// Failure surfaced by a binding command.
///
/// `Display` stays generic so the message is safe to show to users; the
/// store detail is only reachable through `source()`.
#[derive(Debug)]
pub enum BindingError {
    /// Owner identity is not resolved yet. Raised before any store call.
    AuthenticationRequired,
    /// Draft or patch failed validation. Raised before any store call.
    InvalidInput(RecordError),
    /// The store rejected the read or write.
    PersistenceFailure {
        operation: Operation,
        label: &'static str,
        source: StoreError,
    },
}

impl BindingError {
    pub fn is_authentication_required(&self) -> bool {
        matches!(self, Self::AuthenticationRequired)
    }

    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, Self::PersistenceFailure { .. })
    }
}

impl Display for BindingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationRequired => write!(f, "authentication required"),
            Self::InvalidInput(err) => write!(f, "invalid input: {err}"),
            Self::PersistenceFailure {
                operation, label, ..
            } => write!(f, "failed to {} {label}", operation.as_str()),
        }
    }
}

impl Error for BindingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AuthenticationRequired => None,
            Self::InvalidInput(err) => Some(err),
            Self::PersistenceFailure { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BindingError, Operation};
    use crate::store::StoreError;
    use std::error::Error;

    #[test]
    fn persistence_failure_message_hides_store_detail() {
        let err = BindingError::PersistenceFailure {
            operation: Operation::Add,
            label: "habit",
            source: StoreError::InvalidData("secret table layout".to_string()),
        };
        assert_eq!(err.to_string(), "failed to add habit");
        assert!(err
            .source()
            .map(|source| source.to_string().contains("secret"))
            .unwrap_or(false));
    }
}
