//! Bridge error types
//!
//! The two conversion directions report failures differently:
//!
//! - **Native → Python** and registry lookups return [`BridgeError`], which
//!   converts into a [`PyErr`] so that `#[pyfunction]` glue can raise it with `?`.
//!   A Python exception raised by `FromString` passes through unchanged.
//! - **Python → native** never raises. [`crate::read_python_protobuf`] collapses every
//!   failure into `false` plus a logged diagnostic; [`crate::try_read_python_protobuf`]
//!   hands the same failure back as a `BridgeError` for native callers that need
//!   the kind.

use pyo3::create_exception;
use pyo3::exceptions::PyException;
use pyo3::PyErr;
use thiserror::Error;

create_exception!(
    proto_bridge,
    ProtoBridgeError,
    PyException,
    "Base class for errors raised by the protobuf bridge."
);
create_exception!(
    proto_bridge,
    RegistryError,
    ProtoBridgeError,
    "A protobuf type name could not be resolved to a class."
);
create_exception!(
    proto_bridge,
    ConversionError,
    ProtoBridgeError,
    "A protobuf value could not be converted between native and Python form."
);

/// Bridge error taxonomy
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Type registry {module} is unavailable: {reason}")]
    RegistryUnavailable { module: String, reason: String },

    #[error("Type registry {module} is already initialized")]
    RegistryInitialized { module: String },

    #[error("Could not resolve {module}.{type_name}")]
    UnknownType { module: String, type_name: String },

    #[error("{module}.{type_name} is not a type")]
    NotAType { module: String, type_name: String },

    #[error("Native {type_name} serialization failed: {reason}")]
    SerializeFailed { type_name: String, reason: String },

    #[error("{type_name}.{method} raised: {source}")]
    ConstructFailed {
        type_name: String,
        method: String,
        #[source]
        source: PyErr,
    },

    #[error("None object given where a protobuf object was expected")]
    NoObjectGiven,

    #[error("Failed to call {method} on {object_type} (perhaps it is not a protobuf?): {source}")]
    NotSerializable {
        method: String,
        object_type: String,
        #[source]
        source: PyErr,
    },

    #[error("{method} did not return bytes (got {returned})")]
    NotByteResult { method: String, returned: String },

    #[error("Could not deserialize protobuf as expected type {type_name}: {reason}")]
    ParseFailed { type_name: String, reason: String },
}

impl BridgeError {
    /// Whether this failure comes from resolving a type name.
    pub fn is_registry_error(&self) -> bool {
        matches!(
            self,
            BridgeError::RegistryUnavailable { .. }
                | BridgeError::RegistryInitialized { .. }
                | BridgeError::UnknownType { .. }
                | BridgeError::NotAType { .. }
        )
    }
}

impl From<BridgeError> for PyErr {
    fn from(err: BridgeError) -> PyErr {
        match err {
            BridgeError::ConstructFailed { source, .. } => source,
            err if err.is_registry_error() => RegistryError::new_err(err.to_string()),
            err => ConversionError::new_err(err.to_string()),
        }
    }
}

/// Bridge result type alias
pub type BridgeResult<T> = Result<T, BridgeError>;
