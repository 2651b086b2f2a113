//! Critical Path Method engine for construction project schedules.
//!
//! Takes a project's tasks with their dependency edges and computes early and
//! late dates, total float, the critical path and the project duration.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;

mod config;
pub mod critical_path;
pub mod interner;
pub mod logging;
mod models;

pub use config::CpmConfig;
pub use critical_path::{
    calculate_critical_path, calculate_critical_path_with_config, CriticalPathError, TaskGraph,
};
pub use models::{CpmResult, Dependency, DependencyType, Task, TaskId, TaskMetrics};

/// Run the critical path calculation over a project's tasks.
///
/// This algorithm:
/// 1. Orders tasks so each finish-to-start predecessor comes first
/// 2. Forward pass: early start/finish from predecessor finishes
/// 3. Backward pass: late start/finish from successor late starts
/// 4. Marks zero-float tasks as critical
///
/// # Arguments
/// * `tasks` - List of tasks with their dependencies
/// * `config` - Optional engine configuration (verbosity, dangling edge policy)
///
/// # Returns
/// * CpmResult with per-task metrics, critical path and project duration
///
/// # Raises
/// * ValueError on cycles, duplicate ids, negative durations or
///   (in strict mode) dangling dependencies
#[pyfunction]
#[pyo3(signature = (tasks, config=None))]
fn run_critical_path(tasks: Vec<Task>, config: Option<CpmConfig>) -> PyResult<CpmResult> {
    let config = config.unwrap_or_default();

    calculate_critical_path_with_config(&tasks, &config)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}

/// The cpm_rust Python module.
#[pymodule]
fn cpm_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<Dependency>()?;
    m.add_class::<Task>()?;
    m.add_class::<TaskMetrics>()?;
    m.add_class::<CpmResult>()?;

    // Config types
    m.add_class::<CpmConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(run_critical_path, m)?)?;

    Ok(())
}
