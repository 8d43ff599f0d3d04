//! The integer model the CP search branches over: index-based mirrors of a
//! [`Project`]'s employees, tasks, durations, and precedence links.

use chrono::{DateTime, Duration, Utc};

use crate::error::ScheduleError;
use crate::estimator::{EstimationMatrix, TimeEstimator};
use crate::model::{Project, Task, TaskPriority};

/// A pre-`AssignedTask` given as input, fixed before search begins.
#[derive(Debug, Clone, Copy)]
pub struct PinnedAssignment {
    pub employee_idx: usize,
    pub start_minutes: i64,
    pub duration_minutes: i64,
}

/// One task's placement: which employee, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignedSlot {
    pub employee_idx: usize,
    pub start_minutes: i64,
    pub duration_minutes: i64,
}

impl AssignedSlot {
    pub fn end_minutes(&self) -> i64 {
        self.start_minutes + self.duration_minutes
    }
}

/// Index-based view of a project ready for constraint search: `durations[e][t]`
/// in minutes, `predecessor[t]` is the single task index `t` depends on (if
/// any), `pinned[t]` fixes a task's slot when it arrived pre-assigned.
pub struct CpProblemData {
    pub n_employees: usize,
    pub n_tasks: usize,
    pub durations: Vec<Vec<i64>>,
    pub predecessor: Vec<Option<usize>>,
    pub priority: Vec<TaskPriority>,
    pub pinned: Vec<Option<PinnedAssignment>>,
    pub kick_off: DateTime<Utc>,
}

impl CpProblemData {
    /// Builds the index model from `project`, resolving every
    /// `(employee, task)` duration through `matrix`.
    pub fn build(project: &Project, matrix: &EstimationMatrix<'_>) -> Result<Self, ScheduleError> {
        let employees = project.all_employees();
        let tasks = project.all_tasks();
        let n_employees = employees.len();
        let n_tasks = tasks.len();

        let mut durations = vec![vec![0i64; n_tasks]; n_employees];
        for (e_idx, employee) in employees.iter().enumerate() {
            for (t_idx, task) in tasks.iter().enumerate() {
                let minutes = matrix.duration(employee.id, task.id())?.num_minutes();
                durations[e_idx][t_idx] = minutes.max(1);
            }
        }

        let mut predecessor = vec![None; n_tasks];
        for (t_idx, task) in tasks.iter().enumerate() {
            if let Some(dep_id) = task.depends_on() {
                let dep_idx = tasks
                    .iter()
                    .position(|t| t.id() == dep_id)
                    .ok_or_else(|| ScheduleError::validation("Task.dependsOn", "dangling dependency in CP model"))?;
                predecessor[t_idx] = Some(dep_idx);
            }
        }

        let priority = tasks.iter().map(Task::priority).collect();

        let mut pinned = vec![None; n_tasks];
        for (t_idx, task) in tasks.iter().enumerate() {
            if task.pinned() {
                let emp_id = task.employee().expect("pinned task is assigned");
                let employee_idx = employees
                    .iter()
                    .position(|e| e.id == emp_id)
                    .ok_or_else(|| ScheduleError::UnknownEmployee { id: emp_id })?;
                let start = task.start_at().expect("pinned task has a start");
                let duration = task.duration().expect("pinned task has a duration");
                pinned[t_idx] = Some(PinnedAssignment {
                    employee_idx,
                    start_minutes: (start - project.kick_off()).num_minutes(),
                    duration_minutes: duration.num_minutes(),
                });
            }
        }

        Ok(Self {
            n_employees,
            n_tasks,
            durations,
            predecessor,
            priority,
            pinned,
            kick_off: project.kick_off(),
        })
    }

    /// A topological order over tasks: since `dependsOn` is a single
    /// optional reference, the graph has out-degree at most one per node,
    /// so this is a simple chain-following walk rather than a general DFS.
    /// Fails if a cycle slipped past `Project::validate`.
    pub fn topological_order(&self) -> Result<Vec<usize>, ScheduleError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        let mut marks = vec![None; self.n_tasks];
        let mut order = Vec::with_capacity(self.n_tasks);

        for start in 0..self.n_tasks {
            if marks[start].is_some() {
                continue;
            }
            let mut path = Vec::new();
            let mut current = Some(start);
            while let Some(idx) = current {
                match marks[idx] {
                    Some(Mark::Done) => break,
                    Some(Mark::Visiting) => {
                        return Err(ScheduleError::validation(
                            "Task.dependsOn",
                            "cyclic precedence reached the CP solver",
                        ));
                    }
                    None => {
                        marks[idx] = Some(Mark::Visiting);
                        path.push(idx);
                        current = self.predecessor[idx];
                    }
                }
            }
            for idx in path.into_iter().rev() {
                marks[idx] = Some(Mark::Done);
                order.push(idx);
            }
        }

        Ok(order)
    }

    /// Employees with identical duration columns (same estimated duration
    /// for every task) are interchangeable; used for symmetry breaking.
    pub fn employee_equivalence_groups(&self) -> Vec<Vec<usize>> {
        let mut groups: Vec<Vec<usize>> = Vec::new();
        'employee: for e in 0..self.n_employees {
            let column: Vec<i64> = (0..self.n_tasks).map(|t| self.durations[e][t]).collect();
            for group in groups.iter_mut() {
                let rep = group[0];
                let rep_column: Vec<i64> = (0..self.n_tasks).map(|t| self.durations[rep][t]).collect();
                if rep_column == column {
                    group.push(e);
                    continue 'employee;
                }
            }
            groups.push(vec![e]);
        }
        groups
    }

    pub fn decode(&self, project: &Project, slots: &[AssignedSlot]) -> Project {
        let employees = project.all_employees();
        let tasks: Vec<Task> = project
            .all_tasks()
            .iter()
            .zip(slots.iter())
            .map(|(task, slot)| {
                let employee_id = employees[slot.employee_idx].id;
                let start_at = self.kick_off + Duration::minutes(slot.start_minutes);
                let duration = Duration::minutes(slot.duration_minutes);
                if task.pinned() {
                    task.assign_pinned(employee_id, start_at, duration)
                } else {
                    task.assign(employee_id, start_at, duration)
                }
            })
            .collect();
        project.with_tasks(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Employee, Project, SkillPoint, Task, TaskPriority};
    use crate::estimator::MatrixEstimator;
    use std::collections::HashMap as Map;

    fn project_with_reversed_dependency_indices() -> Project {
        // t3 depends on t2, which depends on t1, but the tasks are handed
        // to `Project::new` in the reverse of that order so a naive
        // insertion-order assumption would get the topological sort wrong.
        let e = Employee::new("e", Map::<String, SkillPoint>::new()).unwrap();
        let t1 = Task::new("t1", TaskPriority::Major, Map::new()).unwrap();
        let t2 = Task::new("t2", TaskPriority::Major, Map::new()).unwrap().with_dependency(t1.id());
        let t3 = Task::new("t3", TaskPriority::Major, Map::new()).unwrap().with_dependency(t2.id());
        Project::new(
            "p",
            "2022-01-01T00:00:00Z".parse().unwrap(),
            vec![e],
            vec![t3.clone(), t2.clone(), t1.clone()],
        )
        .unwrap()
    }

    #[test]
    fn topological_order_respects_precedence_regardless_of_task_list_order() {
        let project = project_with_reversed_dependency_indices();
        let estimator = MatrixEstimator::new(vec![vec![10, 10, 10]]);
        let matrix = EstimationMatrix::new(&project, &estimator);
        let data = CpProblemData::build(&project, &matrix).unwrap();

        let order = data.topological_order().unwrap();
        let position = |task_idx: usize| order.iter().position(|&t| t == task_idx).unwrap();

        // project.all_tasks() == [t3, t2, t1] at indices [0, 1, 2].
        let (t3_idx, t2_idx, t1_idx) = (0, 1, 2);
        assert!(position(t1_idx) < position(t2_idx), "t1 must precede its dependent t2");
        assert!(position(t2_idx) < position(t3_idx), "t2 must precede its dependent t3");
    }
}
