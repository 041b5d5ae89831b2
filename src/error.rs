// ABOUTME: the single structured error type, which doubles as the fail-flow effect payload.

use thiserror::Error;

use crate::value::Value;

/// A structured error: a message, an optional source index, and an ordered
/// list of child errors for nesting (e.g. a script parse failure that
/// collects the errors of each attempted alternative).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TgtlError {
    pub message: String,
    pub index: i64,
    pub children: Vec<Value>,
}

pub const NO_INDEX: i64 = -1;

impl TgtlError {
    pub fn new(message: impl Into<String>, index: i64, children: Vec<Value>) -> Self {
        Self {
            message: message.into(),
            index,
            children,
        }
    }

    pub fn from_string(message: impl Into<String>) -> Self {
        Self::new(message, NO_INDEX, Vec::new())
    }

    pub fn at(message: impl Into<String>, index: i64) -> Self {
        Self::new(message, index, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_has_no_index_and_no_children() {
        let err = TgtlError::from_string("boom");
        assert_eq!(err.message, "boom");
        assert_eq!(err.index, NO_INDEX);
        assert!(err.children.is_empty());
    }

    #[test]
    fn display_renders_message_only() {
        let err = TgtlError::at("division by 0", 12);
        assert_eq!(err.to_string(), "division by 0");
    }
}
