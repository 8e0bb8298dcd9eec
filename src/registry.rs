//! Type registry
//!
//! Maps a protobuf type name to the Python class generated for it. The registry
//! is rooted in one module (`mesos_pb2` by default) that startup code installs
//! once; after that it is only ever read.

use crate::error::{BridgeError, BridgeResult};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyType};
use std::sync::OnceLock;

/// Read-only handle to the module holding generated protobuf classes.
///
/// Cheap to share behind an `Arc`; lookups need the interpreter lock.
#[derive(Debug)]
pub struct TypeRegistry {
    module_name: String,
    module: OnceLock<Py<PyModule>>,
}

impl TypeRegistry {
    /// An empty registry. Lookups fail with
    /// [`BridgeError::RegistryUnavailable`] until a module is installed.
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            module: OnceLock::new(),
        }
    }

    /// A registry already rooted in `module`.
    pub fn with_module(module: &Bound<'_, PyModule>) -> Self {
        let module_name = module
            .getattr("__name__")
            .and_then(|name| name.extract::<String>())
            .unwrap_or_else(|_| "<module>".to_string());
        let registry = Self::new(module_name);
        let _ = registry.module.set(module.clone().unbind());
        registry
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn is_installed(&self) -> bool {
        self.module.get().is_some()
    }

    /// Root the registry in `module`. Only the first call succeeds.
    pub fn install(&self, module: &Bound<'_, PyModule>) -> BridgeResult<()> {
        self.module
            .set(module.clone().unbind())
            .map_err(|_| BridgeError::RegistryInitialized {
                module: self.module_name.clone(),
            })?;
        tracing::debug!(target: "proto_bridge::registry", module = %self.module_name, "Type registry installed");
        Ok(())
    }

    /// Import the module named at construction and install it.
    ///
    /// A no-op if a module is already installed.
    pub fn import(&self, py: Python<'_>) -> BridgeResult<()> {
        if self.is_installed() {
            return Ok(());
        }
        let module = PyModule::import_bound(py, self.module_name.as_str()).map_err(|err| {
            BridgeError::RegistryUnavailable {
                module: self.module_name.clone(),
                reason: err.to_string(),
            }
        })?;
        match self.install(&module) {
            // Another thread won the race while the import released the lock.
            Err(BridgeError::RegistryInitialized { .. }) => Ok(()),
            other => other,
        }
    }

    /// The module's top-level namespace.
    fn namespace<'py>(&self, py: Python<'py>) -> BridgeResult<Bound<'py, PyDict>> {
        let unavailable = |reason: String| BridgeError::RegistryUnavailable {
            module: self.module_name.clone(),
            reason,
        };
        let module = self
            .module
            .get()
            .ok_or_else(|| unavailable("module not initialized".to_string()))?;
        module
            .bind(py)
            .getattr("__dict__")
            .map_err(|err| unavailable(err.to_string()))?
            .downcast_into::<PyDict>()
            .map_err(|_| unavailable("module namespace is not a dict".to_string()))
    }

    /// Resolve `type_name` to a class in the registry module.
    pub fn resolve<'py>(&self, py: Python<'py>, type_name: &str) -> BridgeResult<Bound<'py, PyType>> {
        let namespace = self.namespace(py)?;
        let entry = namespace
            .get_item(type_name)
            .map_err(|err| BridgeError::RegistryUnavailable {
                module: self.module_name.clone(),
                reason: err.to_string(),
            })?
            .ok_or_else(|| {
                tracing::debug!(target: "proto_bridge::registry", type_name, "Unknown protobuf type");
                BridgeError::UnknownType {
                    module: self.module_name.clone(),
                    type_name: type_name.to_string(),
                }
            })?;
        entry
            .downcast_into::<PyType>()
            .map_err(|_| BridgeError::NotAType {
                module: self.module_name.clone(),
                type_name: type_name.to_string(),
            })
    }

    pub fn contains(&self, py: Python<'_>, type_name: &str) -> bool {
        self.resolve(py, type_name).is_ok()
    }

    /// Sorted names of every class in the registry module.
    pub fn type_names(&self, py: Python<'_>) -> BridgeResult<Vec<String>> {
        let namespace = self.namespace(py)?;
        let mut names: Vec<String> = namespace
            .iter()
            .filter(|(_, value)| value.is_instance_of::<PyType>())
            .filter_map(|(key, _)| key.extract::<String>().ok())
            .filter(|name| !name.starts_with("__"))
            .collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::with_interpreter;

    const REGISTRY_SOURCE: &str = r#"
import json as codecs

VERSION = "1.0"

class TaskInfo:
    pass

class TaskStatus:
    pass
"#;

    fn fixture(py: Python<'_>) -> TypeRegistry {
        let module =
            PyModule::from_code_bound(py, REGISTRY_SOURCE, "registry_pb2.py", "registry_pb2").unwrap();
        TypeRegistry::with_module(&module)
    }

    #[test]
    fn test_resolve_registered_type() {
        with_interpreter(|py| {
            let registry = fixture(py);
            assert_eq!(registry.module_name(), "registry_pb2");
            let class = registry.resolve(py, "TaskInfo").unwrap();
            let name: String = class.getattr("__name__").unwrap().extract().unwrap();
            assert_eq!(name, "TaskInfo");
            assert!(registry.contains(py, "TaskStatus"));
        });
    }

    #[test]
    fn test_unknown_type() {
        with_interpreter(|py| {
            let registry = fixture(py);
            let err = registry.resolve(py, "FrameworkInfo").unwrap_err();
            assert!(matches!(
                err,
                BridgeError::UnknownType { ref type_name, .. } if type_name == "FrameworkInfo"
            ));
            assert_eq!(err.to_string(), "Could not resolve registry_pb2.FrameworkInfo");
        });
    }

    #[test]
    fn test_not_a_type() {
        with_interpreter(|py| {
            let registry = fixture(py);
            assert!(matches!(
                registry.resolve(py, "VERSION"),
                Err(BridgeError::NotAType { .. })
            ));
            assert!(matches!(
                registry.resolve(py, "codecs"),
                Err(BridgeError::NotAType { .. })
            ));
        });
    }

    #[test]
    fn test_uninstalled_registry_is_unavailable() {
        with_interpreter(|py| {
            let registry = TypeRegistry::new("mesos_pb2");
            assert!(!registry.is_installed());
            assert!(matches!(
                registry.resolve(py, "TaskInfo"),
                Err(BridgeError::RegistryUnavailable { .. })
            ));
            assert!(registry.type_names(py).is_err());
        });
    }

    #[test]
    fn test_install_only_once() {
        with_interpreter(|py| {
            let registry = TypeRegistry::new("registry_pb2");
            let module =
                PyModule::from_code_bound(py, REGISTRY_SOURCE, "registry_pb2.py", "registry_pb2").unwrap();
            registry.install(&module).unwrap();
            assert!(matches!(
                registry.install(&module),
                Err(BridgeError::RegistryInitialized { .. })
            ));
            assert!(registry.contains(py, "TaskInfo"));
        });
    }

    #[test]
    fn test_import_by_name() {
        with_interpreter(|py| {
            let registry = TypeRegistry::new("json");
            registry.import(py).unwrap();
            registry.import(py).unwrap();
            assert!(registry.contains(py, "JSONDecoder"));

            let missing = TypeRegistry::new("no_such_module_pb2");
            assert!(matches!(
                missing.import(py),
                Err(BridgeError::RegistryUnavailable { .. })
            ));
            assert!(!missing.is_installed());
        });
    }

    #[test]
    fn test_type_names() {
        with_interpreter(|py| {
            let registry = fixture(py);
            assert_eq!(
                registry.type_names(py).unwrap(),
                vec!["TaskInfo".to_string(), "TaskStatus".to_string()]
            );
        });
    }
}
