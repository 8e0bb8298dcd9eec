//! Native → Python conversion
//!
//! Serializes the native value with prost and hands the bytes to the registered
//! class's byte constructor. Every failure here is meant to be raised into Python.

use super::ConversionOptions;
use crate::error::{BridgeError, BridgeResult};
use crate::registry::TypeRegistry;
use prost::Message;
use pyo3::prelude::*;
use pyo3::types::PyBytes;

/// Build a new Python `type_name` instance holding the content of `value`.
///
/// Registry failures are returned as-is. A Python exception raised by the
/// class constructor comes back as [`BridgeError::ConstructFailed`], which
/// converts into exactly that exception again.
pub fn create_python_protobuf<'py, T: Message>(
    py: Python<'py>,
    registry: &TypeRegistry,
    options: &ConversionOptions,
    value: &T,
    type_name: &str,
) -> BridgeResult<Bound<'py, PyAny>> {
    let class = registry.resolve(py, type_name)?;
    let encoded = encode_native(value, type_name, options.max_message_bytes)?;
    let bytes = PyBytes::new_bound(py, &encoded);

    class
        .call_method1(options.construct_method.as_str(), (bytes,))
        .map_err(|source| {
            tracing::debug!(
                target: "proto_bridge::convert",
                type_name,
                error = %source,
                "Python constructor raised"
            );
            BridgeError::ConstructFailed {
                type_name: type_name.to_string(),
                method: options.construct_method.clone(),
                source,
            }
        })
}

pub(crate) fn encode_native<T: Message>(
    value: &T,
    type_name: &str,
    max_message_bytes: usize,
) -> BridgeResult<Vec<u8>> {
    let len = value.encoded_len();
    if len > max_message_bytes {
        return Err(BridgeError::SerializeFailed {
            type_name: type_name.to_string(),
            reason: format!("encoded size {} exceeds limit of {} bytes", len, max_message_bytes),
        });
    }
    let mut buf = Vec::with_capacity(len);
    value
        .encode(&mut buf)
        .map_err(|err| BridgeError::SerializeFailed {
            type_name: type_name.to_string(),
            reason: err.to_string(),
        })?;
    Ok(buf)
}
