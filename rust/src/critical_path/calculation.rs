//! Critical path calculation using forward and backward passes.

use chrono::NaiveDateTime;
use std::collections::HashMap;
use thiserror::Error;

use crate::config::CpmConfig;
use crate::interner::TaskSlot;
use crate::models::{CpmResult, Task, TaskId};
use crate::{log_summary, log_trace};

use super::graph::TaskGraph;
use super::types::{ceil_days, shift_days, TaskTiming};

/// Errors that can occur during critical path calculation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CriticalPathError {
    #[error("Cyclic dependency detected between tasks {task_ids:?}")]
    CyclicDependency { task_ids: Vec<TaskId> },
    #[error("Task {task_id} ends before it starts ({start} > {end})")]
    InvalidTaskDuration {
        task_id: TaskId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    #[error("Duplicate task id: {0}")]
    DuplicateTaskId(TaskId),
    #[error("Task {task_id} depends on unknown task {depends_on_task_id}")]
    DanglingDependency {
        task_id: TaskId,
        depends_on_task_id: TaskId,
    },
    #[error("Unknown dependency type: {0}")]
    UnknownDependencyType(String),
    #[error("Date out of range while scheduling task {0}")]
    DateOutOfRange(TaskId),
}

/// Calculate early/late dates, float and the critical path for a project.
///
/// Uses the default configuration: silent, dangling edges skipped.
pub fn calculate_critical_path(tasks: &[Task]) -> Result<CpmResult, CriticalPathError> {
    calculate_critical_path_with_config(tasks, &CpmConfig::default())
}

/// Calculate the critical path with explicit options.
///
/// Only finish-to-start edges constrain the schedule. A task with no such
/// predecessor starts at its own start date; otherwise it starts when the
/// last of its predecessors finishes. Every task keeps its nominal duration.
///
/// # Returns
/// * `Ok(CpmResult)` with one metrics entry per input task
/// * `Err(CriticalPathError)` if the input fails validation or contains a cycle
pub fn calculate_critical_path_with_config(
    tasks: &[Task],
    config: &CpmConfig,
) -> Result<CpmResult, CriticalPathError> {
    let verbosity = config.verbosity;

    let graph = TaskGraph::build(tasks, config)?;

    // Only an empty project has no start date
    let Some(project_start) = graph.earliest_start_date() else {
        return Ok(CpmResult::default());
    };

    let order = graph.topological_order()?;
    let mut timings = forward_pass(&graph, &order)?;

    // Every early finish is at or after the project start
    let project_end = timings
        .iter()
        .flatten()
        .map(|t| t.early_finish)
        .fold(project_start, NaiveDateTime::max);

    backward_pass(&graph, &order, &mut timings, project_end)?;

    let mut critical_path: Vec<TaskId> = Vec::new();
    let mut task_metrics = HashMap::with_capacity(graph.len());

    // Slots follow input order, so the critical path does too
    for (idx, timing) in timings.iter().enumerate() {
        let Some(timing) = timing else {
            continue;
        };
        let task_id = graph.task_id(idx as TaskSlot);
        let metrics = timing.to_metrics();
        log_trace!(
            verbosity,
            "  Task {}: ES={} EF={} LS={} LF={} float={}",
            task_id,
            metrics.early_start,
            metrics.early_finish,
            metrics.late_start,
            metrics.late_finish,
            metrics.total_float
        );
        if metrics.is_critical {
            critical_path.push(task_id);
        }
        task_metrics.insert(task_id, metrics);
    }

    let project_duration = ceil_days(project_end - project_start);

    log_summary!(
        verbosity,
        "Critical path: {} tasks, {} critical, project {} -> {} ({} days)",
        task_metrics.len(),
        critical_path.len(),
        project_start,
        project_end,
        project_duration
    );

    Ok(CpmResult {
        critical_path,
        task_metrics,
        project_duration,
    })
}

/// Compute early start/finish for every slot, walking in topological order.
fn forward_pass(
    graph: &TaskGraph,
    order: &[TaskSlot],
) -> Result<Vec<Option<TaskTiming>>, CriticalPathError> {
    let mut timings: Vec<Option<TaskTiming>> = vec![None; graph.len()];

    for &slot in order {
        // Earliest start = max of all predecessor finish times
        let mut latest_pred_finish: Option<NaiveDateTime> = None;
        for &pred in graph.predecessors(slot) {
            if let Some(ref pred_timing) = timings[pred as usize] {
                let finish = pred_timing.early_finish;
                if latest_pred_finish.map_or(true, |f| finish > f) {
                    latest_pred_finish = Some(finish);
                }
            }
        }

        let early_start = latest_pred_finish.unwrap_or_else(|| graph.start_date(slot));
        let early_finish = shift_days(early_start, graph.duration_days(slot))
            .ok_or_else(|| CriticalPathError::DateOutOfRange(graph.task_id(slot)))?;

        timings[slot as usize] = Some(TaskTiming::from_early(early_start, early_finish));
    }

    Ok(timings)
}

/// Fill in late start/finish, walking in reverse topological order.
fn backward_pass(
    graph: &TaskGraph,
    order: &[TaskSlot],
    timings: &mut [Option<TaskTiming>],
    project_end: NaiveDateTime,
) -> Result<(), CriticalPathError> {
    for &slot in order.iter().rev() {
        // Latest finish = min of all successor late starts
        let mut earliest_succ_start: Option<NaiveDateTime> = None;
        for &succ in graph.successors(slot) {
            if let Some(ref succ_timing) = timings[succ as usize] {
                let start = succ_timing.late_start;
                if earliest_succ_start.map_or(true, |s| start < s) {
                    earliest_succ_start = Some(start);
                }
            }
        }

        let late_finish = earliest_succ_start.unwrap_or(project_end);
        let late_start = shift_days(late_finish, -graph.duration_days(slot))
            .ok_or_else(|| CriticalPathError::DateOutOfRange(graph.task_id(slot)))?;

        if let Some(ref mut timing) = timings[slot as usize] {
            timing.late_finish = late_finish;
            timing.late_start = late_start;
        }
    }

    Ok(())
}
