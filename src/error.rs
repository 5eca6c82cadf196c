use serde::Serialize;
use thiserror::Error;

use crate::model::{BlockType, HandlerSlot, Property, ReturnType};

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Structured error type for the dispatch engine. Every failure is raised at the
/// point of detection and handed back to the caller; nothing here is recovered.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "code", content = "detail")]
pub enum EngineError {
    #[error("Expected a {expected} value but got: {value}")]
    TypeMismatch { expected: ReturnType, value: String },
    #[error("{}", unsupported_operation_message(.operation, .property))]
    UnsupportedOperation {
        operation: HandlerSlot,
        property: Option<Property>,
    },
    #[error("{block_type} blocks do not support the {property} property")]
    UnsupportedProperty {
        property: Property,
        block_type: BlockType,
    },
    #[error("Cannot determine which {block_type} property to act on")]
    UnresolvedProperty { block_type: BlockType },
    #[error("No block or group found for selector \"{selector}\"")]
    UnknownSelector { selector: String },
    #[error("No handler registered for {block_type} blocks")]
    UnregisteredBlockType { block_type: BlockType },
    #[error("\"{name}\" is not a {block_type} block")]
    IncompatibleDevice { name: String, block_type: BlockType },
    #[error("Invalid instruction: {message}")]
    InvalidInstruction { message: String },
    #[error("I/O error: {message}")]
    Io { message: String },
    #[error("JSON error: {message}")]
    Json { message: String },
}

#[allow(clippy::trivially_copy_pass_by_ref, clippy::ref_option)]
fn unsupported_operation_message(operation: &HandlerSlot, property: &Option<Property>) -> String {
    match property {
        Some(property) => format!("{operation} is not supported for the {property} property"),
        None => format!("{operation} is not supported"),
    }
}

impl EngineError {
    pub fn type_mismatch(expected: ReturnType, value: impl ToString) -> Self {
        EngineError::TypeMismatch {
            expected,
            value: value.to_string(),
        }
    }

    pub fn unsupported(operation: HandlerSlot) -> Self {
        EngineError::UnsupportedOperation {
            operation,
            property: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        EngineError::InvalidInstruction {
            message: message.into(),
        }
    }

    /// Attach the property to an unsupported-operation error raised by a nested handler.
    #[must_use]
    pub fn for_property(self, property: Property) -> Self {
        match self {
            EngineError::UnsupportedOperation {
                operation,
                property: None,
            } => EngineError::UnsupportedOperation {
                operation,
                property: Some(property),
            },
            other => other,
        }
    }
}

impl From<crate::store::StoreError> for EngineError {
    fn from(e: crate::store::StoreError) -> Self {
        match e {
            crate::store::StoreError::Io(io_err) => EngineError::Io {
                message: io_err.to_string(),
            },
            crate::store::StoreError::Json(json_err) => EngineError::Json {
                message: json_err.to_string(),
            },
        }
    }
}
