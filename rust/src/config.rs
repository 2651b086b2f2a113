//! Configuration types for the CPM engine.

use pyo3::prelude::*;

/// Options for a critical path calculation.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CpmConfig {
    /// Verbosity level: 0=silent, 1=summary, 2=detail, 3=trace.
    #[pyo3(get, set)]
    pub verbosity: u8,
    /// Fail on finish-to-start edges naming a task outside the input set
    /// instead of skipping them.
    #[pyo3(get, set)]
    pub reject_dangling_dependencies: bool,
}

impl Default for CpmConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            reject_dangling_dependencies: false,
        }
    }
}

#[pymethods]
impl CpmConfig {
    #[new]
    #[pyo3(signature = (verbosity=None, reject_dangling_dependencies=None))]
    fn new(verbosity: Option<u8>, reject_dangling_dependencies: Option<bool>) -> Self {
        let defaults = Self::default();
        Self {
            verbosity: verbosity.unwrap_or(defaults.verbosity),
            reject_dangling_dependencies: reject_dangling_dependencies
                .unwrap_or(defaults.reject_dangling_dependencies),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "CpmConfig(verbosity={}, reject_dangling_dependencies={})",
            self.verbosity,
            if self.reject_dangling_dependencies {
                "True"
            } else {
                "False"
            }
        )
    }
}
