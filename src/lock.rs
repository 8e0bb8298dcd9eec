//! Scoped interpreter lock
//!
//! RAII wrapper over the CPython GIL state API. Constructing an
//! [`InterpreterLock`] blocks until this thread owns the interpreter; dropping it
//! restores whatever state the thread had before, so nested acquisition on the
//! same thread is fine.
//!
//! The guard enters pyo3's own GIL accounting, so `Py` handles and `PyErr`s
//! dropped or cloned under it adjust reference counts immediately.

#![allow(deprecated)] // `GILPool` carries pyo3's per-thread GIL count in 0.21

use pyo3::{ffi, GILPool, Python};
use std::marker::PhantomData;
use std::mem::ManuallyDrop;

/// Exclusive access to the embedded interpreter for the lifetime of the guard.
///
/// The guard is `!Send`: the GIL state must be released on the thread that
/// acquired it.
#[must_use = "the interpreter lock is released as soon as the guard is dropped"]
pub struct InterpreterLock {
    state: ffi::PyGILState_STATE,
    pool: ManuallyDrop<GILPool>,
    _not_send: PhantomData<*mut ()>,
}

impl InterpreterLock {
    /// Block until this thread holds the interpreter lock.
    ///
    /// Initializes the interpreter on first use.
    pub fn acquire() -> Self {
        pyo3::prepare_freethreaded_python();
        let state = unsafe { ffi::PyGILState_Ensure() };
        // SAFETY: the GIL was just taken by this thread. Creating the pool also
        // applies reference count changes deferred while no thread held it.
        let pool = ManuallyDrop::new(unsafe { GILPool::new() });
        tracing::trace!(target: "proto_bridge::lock", "Interpreter lock acquired");
        Self {
            state,
            pool,
            _not_send: PhantomData,
        }
    }

    /// Token for running Python operations while the guard is alive.
    pub fn python(&self) -> Python<'_> {
        // SAFETY: the GIL is held until `self` is dropped, and the returned token
        // borrows `self`.
        unsafe { Python::assume_gil_acquired() }
    }
}

impl Drop for InterpreterLock {
    fn drop(&mut self) {
        // The pool must go before the thread state is released.
        unsafe {
            ManuallyDrop::drop(&mut self.pool);
            ffi::PyGILState_Release(self.state);
        }
        tracing::trace!(target: "proto_bridge::lock", "Interpreter lock released");
    }
}

/// Run `f` with the interpreter lock held.
///
/// The lock is released however `f` exits, including by unwinding.
pub fn with_interpreter<F, R>(f: F) -> R
where
    F: for<'py> FnOnce(Python<'py>) -> R,
{
    Python::with_gil(f)
}
