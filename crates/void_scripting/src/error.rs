//! Script bridge errors

use crate::field::FieldType;

/// Result type for scripting operations
pub type Result<T> = std::result::Result<T, ScriptError>;

/// Errors that can occur in the scripting bridge
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptError {
    /// Failed to load an assembly
    LoadError(String),
    /// No class with this name in the loaded assemblies
    ClassNotFound(String),
    /// A method call failed inside the host
    CallError(String),
    /// The class declares no such field
    FieldNotFound { class: String, field: String },
    /// Value type differs from the declared field type
    FieldTypeMismatch {
        field: String,
        expected: FieldType,
        found: FieldType,
    },
    /// Invalid engine state
    InvalidState(String),
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptError::LoadError(s) => write!(f, "Load error: {}", s),
            ScriptError::ClassNotFound(s) => write!(f, "Class not found: {}", s),
            ScriptError::CallError(s) => write!(f, "Call error: {}", s),
            ScriptError::FieldNotFound { class, field } => {
                write!(f, "Field {} not found in class {}", field, class)
            }
            ScriptError::FieldTypeMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "Field {} expects {:?}, got {:?}",
                field, expected, found
            ),
            ScriptError::InvalidState(s) => write!(f, "Invalid state: {}", s),
        }
    }
}

impl std::error::Error for ScriptError {}
