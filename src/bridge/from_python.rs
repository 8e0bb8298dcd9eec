//! Python → native conversion
//!
//! The caller here is native code, so nothing is ever raised back into Python.
//! Failures come out as `false` (or a [`BridgeError`] from the `try_` variant)
//! and any Python error state produced along the way is drained first.

use super::ConversionOptions;
use crate::error::{BridgeError, BridgeResult};
use prost::Message;
use pyo3::prelude::*;
use pyo3::types::{PyByteArray, PyBytes, PyTracebackMethods};

/// Populate `dest` from a Python protobuf object.
///
/// Returns `false` and logs one diagnostic line on failure; `dest` is only
/// written on success.
pub fn read_python_protobuf<T: Message + Default>(
    obj: Option<&Bound<'_, PyAny>>,
    dest: &mut T,
    options: &ConversionOptions,
) -> bool {
    match try_read_python_protobuf(obj, dest, options) {
        Ok(()) => true,
        Err(err) => {
            report_failure(obj.map(|obj| obj.py()), &err, options);
            false
        }
    }
}

/// Like [`read_python_protobuf`], but returns the failure kind.
///
/// No Python exception is left pending when this returns.
pub fn try_read_python_protobuf<T: Message + Default>(
    obj: Option<&Bound<'_, PyAny>>,
    dest: &mut T,
    options: &ConversionOptions,
) -> BridgeResult<()> {
    let obj = match obj {
        Some(obj) if !obj.is_none() => obj,
        _ => return Err(BridgeError::NoObjectGiven),
    };

    let result = serialize_and_decode::<T>(obj, options);
    match result {
        Ok(value) => {
            *dest = value;
            Ok(())
        }
        Err(err) => {
            drain_pending_error(obj.py(), options);
            Err(err)
        }
    }
}

fn serialize_and_decode<T: Message + Default>(
    obj: &Bound<'_, PyAny>,
    options: &ConversionOptions,
) -> BridgeResult<T> {
    let serialized = obj
        .call_method0(options.serialize_method.as_str())
        .map_err(|source| BridgeError::NotSerializable {
            method: options.serialize_method.clone(),
            object_type: obj.get_type().to_string(),
            source,
        })?;

    if let Ok(bytes) = serialized.downcast::<PyBytes>() {
        return decode_native(bytes.as_bytes(), options.max_message_bytes);
    }
    if let Ok(array) = serialized.downcast::<PyByteArray>() {
        return decode_native(&array.to_vec(), options.max_message_bytes);
    }
    Err(BridgeError::NotByteResult {
        method: options.serialize_method.clone(),
        returned: serialized.get_type().to_string(),
    })
}

pub(crate) fn decode_native<T: Message + Default>(
    bytes: &[u8],
    max_message_bytes: usize,
) -> BridgeResult<T> {
    let type_name = native_type_name::<T>();
    if bytes.len() > max_message_bytes {
        return Err(BridgeError::ParseFailed {
            type_name,
            reason: format!(
                "serialized size {} exceeds limit of {} bytes",
                bytes.len(),
                max_message_bytes
            ),
        });
    }
    T::decode(bytes).map_err(|err| BridgeError::ParseFailed {
        type_name,
        reason: err.to_string(),
    })
}

/// Last path segment of `T`'s Rust type name.
fn native_type_name<T>() -> String {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full).to_string()
}

/// Take any exception still pending in the interpreter and log it.
fn drain_pending_error(py: Python<'_>, options: &ConversionOptions) {
    if let Some(err) = PyErr::take(py) {
        tracing::warn!(target: "proto_bridge::convert", error = %err, "Discarding pending Python error");
        if options.print_tracebacks {
            err.print(py);
        }
    }
}

fn report_failure(py: Option<Python<'_>>, err: &BridgeError, options: &ConversionOptions) {
    match (err, py) {
        (BridgeError::NotSerializable { source, .. }, Some(py)) => {
            let traceback = source
                .traceback_bound(py)
                .and_then(|tb| tb.format().ok())
                .unwrap_or_default();
            tracing::error!(target: "proto_bridge::convert", %traceback, "{}", err);
            if options.print_tracebacks {
                source.print(py);
            }
        }
        _ => tracing::error!(target: "proto_bridge::convert", "{}", err),
    }
}
