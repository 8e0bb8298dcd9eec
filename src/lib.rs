//! # Proto Bridge
//!
//! Exchanges protocol-buffer values between a native Rust process and an
//! embedded CPython interpreter.
//!
//! Values cross the boundary only in their serialized wire form: the native
//! side encodes with `prost`, the Python side builds an instance of the
//! generated class with `FromString`, and the reverse direction goes through
//! `SerializeToString`. No message type is special-cased.
//!
//! ## Architecture
//!
//! - **Lock**: [`InterpreterLock`] holds the interpreter for a scope; re-entrant
//! - **Registry**: [`TypeRegistry`] resolves a type name to a class in one Python module
//! - **Bridge**: [`ProtoBridge`] runs the two conversions
//!
//! ### Example
//!
//! ```ignore
//! use proto_bridge::{InterpreterLock, ProtoBridge, BridgeConfig};
//!
//! let config = BridgeConfig::load_or_default();
//! let bridge = ProtoBridge::from_config(&config);
//!
//! let lock = InterpreterLock::acquire();
//! let py = lock.python();
//! bridge.registry().import(py)?;
//! let obj = bridge.to_python(py, &task_info, "TaskInfo")?;
//!
//! let mut back = TaskInfo::default();
//! assert!(bridge.read_protobuf(Some(&obj), &mut back));
//! ```
//!
//! ## Modules
//!
//! - [`lock`]: Scoped interpreter lock
//! - [`registry`]: Type registry lookup
//! - [`bridge`]: Native ↔ Python converters
//! - [`config`]: Configuration loading
//! - [`logging`]: Tracing subscriber setup

/// Native ↔ Python protobuf conversion
pub mod bridge;
/// Configuration system
pub mod config;
/// Error types and Python exception classes
pub mod error;
/// Scoped interpreter lock
pub mod lock;
/// Logging initialization
pub mod logging;
/// Type name → Python class lookup
pub mod registry;

pub use bridge::{
    create_python_protobuf, read_python_protobuf, try_read_python_protobuf, ConversionOptions,
    ProtoBridge,
};
pub use config::{BridgeConfig, ConfigError, ConfigResult, LogLevel, LoggingConfig};
pub use error::{BridgeError, BridgeResult, ConversionError, ProtoBridgeError, RegistryError};
pub use lock::{with_interpreter, InterpreterLock};
pub use logging::init_logging;
pub use registry::TypeRegistry;
