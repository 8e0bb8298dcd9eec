//! Protobuf bridge
//!
//! Moves protobuf values between native `prost` messages and Python objects by
//! serializing on one side and parsing on the other. The wire form is the only
//! thing the two sides share.
//!
//! ```text
//!   native T ──encode──▶ bytes ──Class.FromString──▶ Python object
//!   native T ◀──decode── bytes ◀──obj.SerializeToString── Python object
//! ```
//!
//! ## Error conventions
//!
//! The directions deliberately differ:
//!
//! - [`ProtoBridge::to_python`] is called from Python-facing glue, so it returns
//!   a [`crate::BridgeError`] that converts into a Python exception with `?`.
//! - [`ProtoBridge::read_protobuf`] is called from native code that cannot
//!   receive Python exceptions, so it returns `bool`, logs a diagnostic, and
//!   clears any Python error state before returning.
//!
//! ## Example
//!
//! ```ignore
//! #[pyfunction]
//! fn launch(py: Python<'_>, task: &Bound<'_, PyAny>) -> PyResult<Py<PyAny>> {
//!     let bridge = scheduler::bridge();
//!     let mut info = TaskInfo::default();
//!     if !bridge.read_protobuf(Some(task), &mut info) {
//!         return Ok(py.None());
//!     }
//!     let status = scheduler::launch(info);
//!     Ok(bridge.to_python(py, &status, "TaskStatus")?.unbind())
//! }
//! ```

pub mod from_python;
pub mod to_python;

pub use from_python::{read_python_protobuf, try_read_python_protobuf};
pub use to_python::create_python_protobuf;

use crate::config::BridgeConfig;
use crate::error::BridgeResult;
use crate::registry::TypeRegistry;
use prost::Message;
use pyo3::prelude::*;
use std::sync::Arc;

/// Per-bridge conversion settings
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOptions {
    pub serialize_method: String,
    pub construct_method: String,
    pub max_message_bytes: usize,
    pub print_tracebacks: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self::from(&BridgeConfig::default())
    }
}

impl From<&BridgeConfig> for ConversionOptions {
    fn from(config: &BridgeConfig) -> Self {
        Self {
            serialize_method: config.serialize_method.clone(),
            construct_method: config.construct_method.clone(),
            max_message_bytes: config.max_message_bytes,
            print_tracebacks: config.print_tracebacks,
        }
    }
}

/// Type registry plus conversion options, shared by all call sites.
#[derive(Debug, Clone)]
pub struct ProtoBridge {
    registry: Arc<TypeRegistry>,
    options: ConversionOptions,
}

impl ProtoBridge {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_options(registry, ConversionOptions::default())
    }

    pub fn with_options(registry: Arc<TypeRegistry>, options: ConversionOptions) -> Self {
        Self { registry, options }
    }

    /// A bridge whose registry still has to be installed or imported.
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::with_options(
            Arc::new(TypeRegistry::new(config.registry_module.clone())),
            ConversionOptions::from(config),
        )
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Native → Python. See [`create_python_protobuf`].
    pub fn to_python<'py, T: Message>(
        &self,
        py: Python<'py>,
        value: &T,
        type_name: &str,
    ) -> BridgeResult<Bound<'py, PyAny>> {
        create_python_protobuf(py, &self.registry, &self.options, value, type_name)
    }

    /// Python → native. See [`read_python_protobuf`].
    pub fn read_protobuf<T: Message + Default>(
        &self,
        obj: Option<&Bound<'_, PyAny>>,
        dest: &mut T,
    ) -> bool {
        read_python_protobuf(obj, dest, &self.options)
    }

    /// Python → native. See [`try_read_python_protobuf`].
    pub fn try_read_protobuf<T: Message + Default>(
        &self,
        obj: Option<&Bound<'_, PyAny>>,
        dest: &mut T,
    ) -> BridgeResult<()> {
        try_read_python_protobuf(obj, dest, &self.options)
    }

    /// Pass `value` through its Python class and back.
    pub fn round_trip<T: Message + Default>(
        &self,
        py: Python<'_>,
        value: &T,
        type_name: &str,
    ) -> BridgeResult<T> {
        let obj = self.to_python(py, value, type_name)?;
        let mut out = T::default();
        self.try_read_protobuf(Some(&obj), &mut out)?;
        Ok(out)
    }

    /// Check that `type_name` resolves, for validating names at startup.
    pub fn ensure_registered(&self, py: Python<'_>, type_name: &str) -> BridgeResult<()> {
        self.registry.resolve(py, type_name).map(|_| ())
    }

    /// Resolve each name, returning the first failure.
    pub fn ensure_all_registered<'a, I>(&self, py: Python<'_>, type_names: I) -> BridgeResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for type_name in type_names {
            self.ensure_registered(py, type_name)?;
        }
        Ok(())
    }
}
