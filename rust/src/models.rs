//! Core data types for the CPM engine.

use chrono::NaiveDateTime;
use pyo3::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::critical_path::{ceil_days, CriticalPathError};

// Note: We use std HashMap here for PyO3 interface compatibility

/// Caller-assigned task identifier.
pub type TaskId = i64;

/// Kind of constraint a dependency edge expresses.
///
/// Only `FinishToStart` edges take part in scheduling. The other kinds are
/// stored by the task data model for display and are ignored by the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DependencyType {
    #[default]
    FinishToStart,
    StartToStart,
    FinishToFinish,
}

impl DependencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FinishToStart => "finish_to_start",
            Self::StartToStart => "start_to_start",
            Self::FinishToFinish => "finish_to_finish",
        }
    }

    /// Whether edges of this kind constrain early/late dates.
    pub fn is_scheduling(&self) -> bool {
        matches!(self, Self::FinishToStart)
    }
}

impl FromStr for DependencyType {
    type Err = CriticalPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "finish_to_start" => Ok(Self::FinishToStart),
            "start_to_start" => Ok(Self::StartToStart),
            "finish_to_finish" => Ok(Self::FinishToFinish),
            other => Err(CriticalPathError::UnknownDependencyType(other.to_string())),
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An edge from a task to the task it depends on.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dependency {
    #[pyo3(get, set)]
    pub depends_on_task_id: TaskId,
    pub dep_type: DependencyType,
}

impl Dependency {
    pub fn finish_to_start(depends_on_task_id: TaskId) -> Self {
        Self {
            depends_on_task_id,
            dep_type: DependencyType::FinishToStart,
        }
    }

    pub fn with_type(depends_on_task_id: TaskId, dep_type: DependencyType) -> Self {
        Self {
            depends_on_task_id,
            dep_type,
        }
    }
}

#[pymethods]
impl Dependency {
    #[new]
    #[pyo3(signature = (depends_on_task_id, dep_type="finish_to_start"))]
    fn new(depends_on_task_id: TaskId, dep_type: &str) -> PyResult<Self> {
        let dep_type = dep_type
            .parse::<DependencyType>()
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
        Ok(Self::with_type(depends_on_task_id, dep_type))
    }

    /// Wire name of the dependency type.
    #[getter(dep_type)]
    fn get_dep_type(&self) -> &'static str {
        self.dep_type.as_str()
    }

    fn __repr__(&self) -> String {
        format!(
            "Dependency(depends_on_task_id={}, dep_type={:?})",
            self.depends_on_task_id,
            self.dep_type.as_str()
        )
    }
}

/// A task in a project's schedule network.
#[pyclass]
#[derive(Clone, Debug)]
pub struct Task {
    #[pyo3(get, set)]
    pub id: TaskId,
    #[pyo3(get, set)]
    pub start_date: NaiveDateTime,
    #[pyo3(get, set)]
    pub end_date: NaiveDateTime,
    #[pyo3(get, set)]
    pub dependencies: Vec<Dependency>,
}

impl Task {
    /// Whole days between start and end, rounded up.
    pub fn nominal_duration_days(&self) -> i64 {
        ceil_days(self.end_date - self.start_date)
    }
}

#[pymethods]
impl Task {
    #[new]
    #[pyo3(signature = (id, start_date, end_date, dependencies=Vec::new()))]
    fn new(
        id: TaskId,
        start_date: NaiveDateTime,
        end_date: NaiveDateTime,
        dependencies: Vec<Dependency>,
    ) -> Self {
        Self {
            id,
            start_date,
            end_date,
            dependencies,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(id={}, start={}, end={}, deps={})",
            self.id,
            self.start_date,
            self.end_date,
            self.dependencies.len()
        )
    }
}

/// Schedule metrics computed for one task.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskMetrics {
    #[pyo3(get)]
    pub early_start: NaiveDateTime,
    #[pyo3(get)]
    pub early_finish: NaiveDateTime,
    #[pyo3(get)]
    pub late_start: NaiveDateTime,
    #[pyo3(get)]
    pub late_finish: NaiveDateTime,
    /// Days the task can slip without moving the project end.
    #[pyo3(get)]
    pub total_float: i64,
    #[pyo3(get)]
    pub is_critical: bool,
}

#[pymethods]
impl TaskMetrics {
    fn __repr__(&self) -> String {
        format!(
            "TaskMetrics(early_start={}, late_start={}, total_float={}, is_critical={})",
            self.early_start,
            self.late_start,
            self.total_float,
            if self.is_critical { "True" } else { "False" }
        )
    }
}

/// Result of a critical path calculation over a whole project.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CpmResult {
    /// IDs of zero-float tasks, in input order.
    #[pyo3(get)]
    pub critical_path: Vec<TaskId>,
    #[pyo3(get)]
    pub task_metrics: HashMap<TaskId, TaskMetrics>,
    /// Days from the earliest task start to the latest early finish.
    #[pyo3(get)]
    pub project_duration: i64,
}

impl CpmResult {
    pub fn metrics(&self, task_id: TaskId) -> Option<&TaskMetrics> {
        self.task_metrics.get(&task_id)
    }

    pub fn is_empty(&self) -> bool {
        self.task_metrics.is_empty()
    }
}

#[pymethods]
impl CpmResult {
    /// Whether the task is on the critical path. Unknown IDs are not critical.
    pub fn is_critical(&self, task_id: TaskId) -> bool {
        self.task_metrics
            .get(&task_id)
            .is_some_and(|m| m.is_critical)
    }

    /// Critical task IDs ordered by early start, ties broken by ID.
    pub fn critical_chain(&self) -> Vec<TaskId> {
        let mut chain: Vec<(NaiveDateTime, TaskId)> = self
            .critical_path
            .iter()
            .filter_map(|id| self.task_metrics.get(id).map(|m| (m.early_start, *id)))
            .collect();
        chain.sort_unstable();
        chain.into_iter().map(|(_, id)| id).collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "CpmResult(critical_path={:?}, tasks={}, project_duration={})",
            self.critical_path,
            self.task_metrics.len(),
            self.project_duration
        )
    }
}
