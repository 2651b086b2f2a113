//! Task arena with finish-to-start edges and topological ordering.

use chrono::NaiveDateTime;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

use crate::config::CpmConfig;
use crate::interner::{TaskIndex, TaskSlot};
use crate::models::{Task, TaskId};
use crate::log_detail;

use super::calculation::CriticalPathError;

/// Validated task network, all lookups by dense slot.
///
/// Slots follow input order: the task at position `i` of the input lives at slot `i`.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    index: TaskIndex,
    start_dates: Vec<NaiveDateTime>,
    durations: Vec<i64>,
    predecessors: Vec<Vec<TaskSlot>>,
    successors: Vec<Vec<TaskSlot>>,
}

impl TaskGraph {
    /// Validate tasks and build the arena.
    ///
    /// Only finish-to-start edges are kept. Edges naming a task outside the
    /// input are skipped, or rejected when the config asks for it.
    pub fn build(tasks: &[Task], config: &CpmConfig) -> Result<Self, CriticalPathError> {
        let verbosity = config.verbosity;
        let n = tasks.len();

        let mut index = TaskIndex::with_capacity(n);
        let mut start_dates = Vec::with_capacity(n);
        let mut durations = Vec::with_capacity(n);

        for task in tasks {
            index
                .insert(task.id)
                .ok_or(CriticalPathError::DuplicateTaskId(task.id))?;
            if task.end_date < task.start_date {
                return Err(CriticalPathError::InvalidTaskDuration {
                    task_id: task.id,
                    start: task.start_date,
                    end: task.end_date,
                });
            }
            start_dates.push(task.start_date);
            durations.push(task.nominal_duration_days());
        }

        let mut predecessors: Vec<Vec<TaskSlot>> = vec![Vec::new(); n];
        let mut successors: Vec<Vec<TaskSlot>> = vec![Vec::new(); n];
        let mut seen_edges: FxHashSet<(TaskSlot, TaskSlot)> = FxHashSet::default();

        for (slot, task) in tasks.iter().enumerate() {
            let slot = slot as TaskSlot;
            for dep in &task.dependencies {
                if !dep.dep_type.is_scheduling() {
                    log_detail!(
                        verbosity,
                        "  Task {}: ignoring {} edge to {}",
                        task.id,
                        dep.dep_type,
                        dep.depends_on_task_id
                    );
                    continue;
                }

                let Some(pred) = index.get(dep.depends_on_task_id) else {
                    if config.reject_dangling_dependencies {
                        return Err(CriticalPathError::DanglingDependency {
                            task_id: task.id,
                            depends_on_task_id: dep.depends_on_task_id,
                        });
                    }
                    log_detail!(
                        verbosity,
                        "  Task {}: skipping edge to unknown task {}",
                        task.id,
                        dep.depends_on_task_id
                    );
                    continue;
                };

                if !seen_edges.insert((pred, slot)) {
                    log_detail!(
                        verbosity,
                        "  Task {}: duplicate edge to {}",
                        task.id,
                        dep.depends_on_task_id
                    );
                    continue;
                }
                predecessors[slot as usize].push(pred);
                successors[pred as usize].push(slot);
            }
        }

        Ok(Self {
            index,
            start_dates,
            durations,
            predecessors,
            successors,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn task_id(&self, slot: TaskSlot) -> TaskId {
        self.index.ids()[slot as usize]
    }

    #[inline]
    pub fn start_date(&self, slot: TaskSlot) -> NaiveDateTime {
        self.start_dates[slot as usize]
    }

    /// Nominal duration in whole days.
    #[inline]
    pub fn duration_days(&self, slot: TaskSlot) -> i64 {
        self.durations[slot as usize]
    }

    /// Tasks that must finish before this one starts.
    #[inline]
    pub fn predecessors(&self, slot: TaskSlot) -> &[TaskSlot] {
        &self.predecessors[slot as usize]
    }

    /// Tasks that wait for this one to finish.
    #[inline]
    pub fn successors(&self, slot: TaskSlot) -> &[TaskSlot] {
        &self.successors[slot as usize]
    }

    /// Earliest nominal start over all tasks.
    pub fn earliest_start_date(&self) -> Option<NaiveDateTime> {
        self.start_dates.iter().copied().min()
    }

    /// Order slots so every predecessor comes before its successors (Kahn's algorithm).
    ///
    /// Ties keep input order. Fails with the IDs of the tasks on (or between)
    /// cycles if the network is not acyclic.
    pub fn topological_order(&self) -> Result<Vec<TaskSlot>, CriticalPathError> {
        let n = self.len();
        let mut in_degree: Vec<usize> = self.predecessors.iter().map(Vec::len).collect();

        let mut queue: VecDeque<TaskSlot> = (0..n)
            .filter(|&idx| in_degree[idx] == 0)
            .map(|idx| idx as TaskSlot)
            .collect();

        let mut order: Vec<TaskSlot> = Vec::with_capacity(n);

        while let Some(slot) = queue.pop_front() {
            order.push(slot);
            for &succ in &self.successors[slot as usize] {
                let degree = &mut in_degree[succ as usize];
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(succ);
                }
            }
        }

        if order.len() != n {
            return Err(CriticalPathError::CyclicDependency {
                task_ids: self.cycle_members(&in_degree),
            });
        }

        Ok(order)
    }

    /// IDs of tasks left over by Kahn's algorithm that lie on a cycle or
    /// between two cycles, sorted ascending.
    ///
    /// Leftover tasks that only hang downstream of a cycle are peeled off by
    /// running the same elimination backwards over the leftover set.
    fn cycle_members(&self, in_degree: &[usize]) -> Vec<TaskId> {
        let n = self.len();
        let mut alive: Vec<bool> = in_degree.iter().map(|&d| d > 0).collect();

        let mut out_degree: Vec<usize> = (0..n)
            .map(|idx| {
                if alive[idx] {
                    self.successors[idx]
                        .iter()
                        .filter(|&&s| alive[s as usize])
                        .count()
                } else {
                    0
                }
            })
            .collect();

        let mut queue: VecDeque<usize> = (0..n)
            .filter(|&idx| alive[idx] && out_degree[idx] == 0)
            .collect();

        while let Some(idx) = queue.pop_front() {
            alive[idx] = false;
            for &pred in &self.predecessors[idx] {
                let pred = pred as usize;
                if alive[pred] {
                    out_degree[pred] -= 1;
                    if out_degree[pred] == 0 {
                        queue.push_back(pred);
                    }
                }
            }
        }

        let mut ids: Vec<TaskId> = (0..n)
            .filter(|&idx| alive[idx])
            .map(|idx| self.task_id(idx as TaskSlot))
            .collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dependency, DependencyType};
    use chrono::NaiveDate;

    fn day(n: u64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Days::new(n)
    }

    fn make_task(id: TaskId, duration: u64, deps: &[TaskId]) -> Task {
        Task {
            id,
            start_date: day(0),
            end_date: day(duration),
            dependencies: deps.iter().map(|&d| Dependency::finish_to_start(d)).collect(),
        }
    }

    fn ids(graph: &TaskGraph, slots: &[TaskSlot]) -> Vec<TaskId> {
        slots.iter().map(|&s| graph.task_id(s)).collect()
    }

    #[test]
    fn test_build_keeps_input_order_slots() {
        let tasks = vec![make_task(30, 2, &[]), make_task(10, 1, &[30])];
        let graph = TaskGraph::build(&tasks, &CpmConfig::default()).unwrap();

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.task_id(0), 30);
        assert_eq!(graph.task_id(1), 10);
        assert_eq!(graph.duration_days(0), 2);
        assert_eq!(graph.predecessors(1), &[0]);
        assert_eq!(graph.successors(0), &[1]);
    }

    #[test]
    fn test_topological_order_reversed_input() {
        // c -> b -> a given in reverse order
        let tasks = vec![
            make_task(3, 1, &[2]),
            make_task(2, 1, &[1]),
            make_task(1, 1, &[]),
        ];
        let graph = TaskGraph::build(&tasks, &CpmConfig::default()).unwrap();
        let order = graph.topological_order().unwrap();
        assert_eq!(ids(&graph, &order), vec![1, 2, 3]);
    }

    #[test]
    fn test_non_finish_to_start_edges_ignored() {
        let mut b = make_task(2, 1, &[]);
        b.dependencies = vec![
            Dependency::with_type(1, DependencyType::StartToStart),
            Dependency::with_type(1, DependencyType::FinishToFinish),
        ];
        let tasks = vec![make_task(1, 1, &[]), b];
        let graph = TaskGraph::build(&tasks, &CpmConfig::default()).unwrap();
        assert!(graph.predecessors(1).is_empty());
        assert!(graph.successors(0).is_empty());
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let tasks = vec![make_task(1, 1, &[]), make_task(2, 1, &[1, 1])];
        let graph = TaskGraph::build(&tasks, &CpmConfig::default()).unwrap();
        assert_eq!(graph.predecessors(1).len(), 1);
        assert_eq!(graph.successors(0).len(), 1);
    }

    #[test]
    fn test_dangling_edge_skipped() {
        let tasks = vec![make_task(1, 1, &[42])];
        let graph = TaskGraph::build(&tasks, &CpmConfig::default()).unwrap();
        assert!(graph.predecessors(0).is_empty());
    }

    #[test]
    fn test_dangling_edge_rejected_when_strict() {
        let tasks = vec![make_task(1, 1, &[42])];
        let config = CpmConfig {
            reject_dangling_dependencies: true,
            ..CpmConfig::default()
        };
        let err = TaskGraph::build(&tasks, &config).unwrap_err();
        assert_eq!(
            err,
            CriticalPathError::DanglingDependency {
                task_id: 1,
                depends_on_task_id: 42
            }
        );
    }

    #[test]
    fn test_duplicate_task_id() {
        let tasks = vec![make_task(1, 1, &[]), make_task(1, 2, &[])];
        let err = TaskGraph::build(&tasks, &CpmConfig::default()).unwrap_err();
        assert_eq!(err, CriticalPathError::DuplicateTaskId(1));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let mut task = make_task(7, 0, &[]);
        task.start_date = day(5);
        task.end_date = day(2);
        let err = TaskGraph::build(&[task], &CpmConfig::default()).unwrap_err();
        assert_eq!(
            err,
            CriticalPathError::InvalidTaskDuration {
                task_id: 7,
                start: day(5),
                end: day(2),
            }
        );
    }

    #[test]
    fn test_cycle_reports_only_cycle_members() {
        // 1 -> 2 -> 3 -> 2, and 4 hangs off the cycle
        let tasks = vec![
            make_task(1, 1, &[]),
            make_task(2, 1, &[1, 3]),
            make_task(3, 1, &[2]),
            make_task(4, 1, &[3]),
        ];
        let graph = TaskGraph::build(&tasks, &CpmConfig::default()).unwrap();
        let err = graph.topological_order().unwrap_err();
        assert_eq!(
            err,
            CriticalPathError::CyclicDependency {
                task_ids: vec![2, 3]
            }
        );
    }

    #[test]
    fn test_self_edge_is_cycle() {
        let tasks = vec![make_task(5, 1, &[5])];
        let graph = TaskGraph::build(&tasks, &CpmConfig::default()).unwrap();
        assert_eq!(
            graph.topological_order(),
            Err(CriticalPathError::CyclicDependency { task_ids: vec![5] })
        );
    }

    #[test]
    fn test_long_chain_no_recursion() {
        let n: TaskId = 50_000;
        let tasks: Vec<Task> = (0..n)
            .map(|i| {
                if i == 0 {
                    make_task(i, 1, &[])
                } else {
                    make_task(i, 1, &[i - 1])
                }
            })
            .collect();
        let graph = TaskGraph::build(&tasks, &CpmConfig::default()).unwrap();
        let order = graph.topological_order().unwrap();
        assert_eq!(order.len(), n as usize);
        assert_eq!(graph.task_id(order[0]), 0);
        assert_eq!(graph.task_id(order[order.len() - 1]), n - 1);
    }
}
