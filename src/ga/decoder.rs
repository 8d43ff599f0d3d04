//! Turns a permutation of task indices into a concrete, pinned-respecting
//! schedule via greedy earliest-finish-time assignment.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};

use crate::estimator::EstimationMatrix;
use crate::error::ScheduleError;
use crate::model::{EmployeeId, Project, Task};
use crate::scheduler::composite_objective;

/// The outcome of decoding one permutation: the fully-assigned project and
/// its `100*makespan + priorityCost` fitness (lower is better).
pub struct Decoded {
    pub project: Project,
    pub fitness: i64,
}

/// Decodes `permutation` (a permutation of `0..project.all_tasks().len()`)
/// against `project`, looking up durations through `matrix`.
///
/// Tasks are visited in permutation order; a task whose dependency hasn't
/// been scheduled yet is skipped and revisited once it has (step 1 of the
/// decoder). Pinned tasks keep their fixed slot; everyone else goes to
/// whichever employee minimizes `max(employee_available[e], dep_ready_time)
/// + estimate(e, t)`, ties broken by lowest employee index (step 2-3). Each
/// employee's availability is a single scalar instant, bumped to the new
/// task's end after every placement (including pinned ones) — not an
/// earliest-open-gap search, so a pinned task that leaves a gap earlier in
/// an employee's day does not get backfilled. An empty task set decodes to
/// fitness 0.
pub fn decode(
    project: &Project,
    matrix: &EstimationMatrix<'_>,
    permutation: &[usize],
) -> Result<Decoded, ScheduleError> {
    let tasks = project.all_tasks();
    let employees = project.all_employees();

    if tasks.is_empty() {
        return Ok(Decoded {
            project: project.with_tasks(Vec::new()),
            fitness: 0,
        });
    }

    let mut end_times: Vec<Option<DateTime<Utc>>> = vec![None; tasks.len()];
    let mut decoded: Vec<Option<Task>> = vec![None; tasks.len()];
    let mut employee_available: HashMap<EmployeeId, DateTime<Utc>> = employees
        .iter()
        .map(|e| (e.id, project.kick_off()))
        .collect();

    let mut pending: VecDeque<usize> = permutation.iter().copied().collect();
    let max_iterations = tasks.len() * tasks.len() + tasks.len() + 8;
    let mut iterations = 0usize;

    while let Some(task_idx) = pending.pop_front() {
        iterations += 1;
        if iterations > max_iterations {
            return Err(ScheduleError::validation(
                "Project.tasks",
                "permutation decoder could not make progress, dependency graph likely cyclic",
            ));
        }

        let task = &tasks[task_idx];
        let dep_ready = match task.depends_on() {
            Some(dep_id) => {
                let dep_idx = tasks
                    .iter()
                    .position(|t| t.id() == dep_id)
                    .expect("dependency reference was validated before decoding");
                match end_times[dep_idx] {
                    Some(end) => end,
                    None => {
                        pending.push_back(task_idx);
                        continue;
                    }
                }
            }
            None => project.kick_off(),
        };

        if task.pinned() {
            let employee = task.employee().expect("pinned task carries an employee");
            let start = task.start_at().expect("pinned task carries a start instant");
            let duration = task.duration().expect("pinned task carries a duration");
            let end = start + duration;
            let available = employee_available.entry(employee).or_insert(project.kick_off());
            *available = (*available).max(end);
            end_times[task_idx] = Some(end);
            decoded[task_idx] = Some(task.clone());
            continue;
        }

        let mut best: Option<(usize, DateTime<Utc>, chrono::Duration)> = None;
        for (e_idx, employee) in employees.iter().enumerate() {
            let duration = matrix.duration(employee.id, task.id())?;
            let available = employee_available[&employee.id];
            let start = available.max(dep_ready);
            let finish = start + duration;
            let better = match &best {
                None => true,
                Some((_, best_start, best_dur)) => finish < *best_start + *best_dur,
            };
            if better {
                best = Some((e_idx, start, duration));
            }
        }
        let (e_idx, start, duration) = best.expect("at least one employee exists for a non-empty project");
        let employee_id = employees[e_idx].id;
        let end = start + duration;
        employee_available.insert(employee_id, end);
        end_times[task_idx] = Some(end);
        decoded[task_idx] = Some(task.assign(employee_id, start, duration));
    }

    let tasks: Vec<Task> = decoded
        .into_iter()
        .map(|t| t.expect("every task index appears exactly once in a permutation"))
        .collect();
    let project = project.with_tasks(tasks);
    let fitness = composite_objective(&project);
    Ok(Decoded { project, fitness })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::MatrixEstimator;
    use crate::model::{Employee, SkillPoint, TaskPriority};
    use std::collections::HashMap as Map;

    fn five_task_project() -> Project {
        let e1 = Employee::new("e1", Map::<String, SkillPoint>::new()).unwrap();
        let e2 = Employee::new("e2", Map::new()).unwrap();
        let e3 = Employee::new("e3", Map::new()).unwrap();
        let t1 = Task::new("task1", TaskPriority::Major, Map::new()).unwrap();
        let t2 = Task::new("task2", TaskPriority::Major, Map::new()).unwrap();
        let t3 = Task::new("task3", TaskPriority::Major, Map::new())
            .unwrap()
            .with_dependency(t1.id());
        let t4 = Task::new("task4", TaskPriority::Major, Map::new())
            .unwrap()
            .with_dependency(t2.id());
        let t5 = Task::new("task5", TaskPriority::Major, Map::new()).unwrap();
        Project::new(
            "p",
            "2022-01-01T00:00:00Z".parse().unwrap(),
            vec![e1, e2, e3],
            vec![t1, t2, t3, t4, t5],
        )
        .unwrap()
    }

    fn five_task_estimator() -> MatrixEstimator {
        MatrixEstimator::new(vec![
            vec![10, 20, 30, 40, 50],
            vec![15, 25, 35, 45, 55],
            vec![12, 22, 32, 42, 52],
        ])
    }

    #[test]
    fn decoder_respects_dependencies() {
        let project = five_task_project();
        let estimator = five_task_estimator();
        let matrix = EstimationMatrix::new(&project, &estimator);

        let decoded = decode(&project, &matrix, &[0, 1, 2, 3, 4]).unwrap();
        let task1 = decoded.project.all_tasks()[0].clone();
        let task3 = decoded.project.all_tasks()[2].clone();
        assert!(task3.start_at().unwrap() >= task1.ends_at().unwrap());
    }

    #[test]
    fn empty_task_set_decodes_to_zero_fitness() {
        let e1 = Employee::new("e1", Map::<String, SkillPoint>::new()).unwrap();
        let project = Project::new("empty", "2022-01-01T00:00:00Z".parse().unwrap(), vec![e1], vec![]).unwrap();
        let estimator = MatrixEstimator::new(vec![]);
        let matrix = EstimationMatrix::new(&project, &estimator);
        let decoded = decode(&project, &matrix, &[]).unwrap();
        assert_eq!(decoded.fitness, 0);
    }

    #[test]
    fn decoding_is_deterministic() {
        let project = five_task_project();
        let estimator = five_task_estimator();
        let matrix = EstimationMatrix::new(&project, &estimator);

        let a = decode(&project, &matrix, &[4, 0, 1, 2, 3]).unwrap();
        let b = decode(&project, &matrix, &[4, 0, 1, 2, 3]).unwrap();
        assert_eq!(a.fitness, b.fitness);
        assert_eq!(a.project.ends_at(), b.project.ends_at());
    }

    #[test]
    fn does_not_backfill_a_gap_left_by_a_pinned_task() {
        // e1 is pinned busy [50, 60) and otherwise free; a following
        // non-pinned task must land at `max(available, dep_ready) = 60`,
        // not get inserted into the open [kickoff, 50) gap.
        let e1 = Employee::new("e1", Map::<String, SkillPoint>::new()).unwrap();
        let kick_off: DateTime<Utc> = "2022-01-01T00:00:00Z".parse().unwrap();

        let pinned = Task::new("pinned", TaskPriority::Major, Map::new())
            .unwrap()
            .assign_pinned(e1.id, kick_off + chrono::Duration::minutes(50), chrono::Duration::minutes(10));
        let follower = Task::new("follower", TaskPriority::Major, Map::new()).unwrap();

        let project = Project::new("p", kick_off, vec![e1], vec![pinned.clone(), follower.clone()]).unwrap();
        let estimator = MatrixEstimator::new(vec![vec![10, 10]]);
        let matrix = EstimationMatrix::new(&project, &estimator);

        let decoded = decode(&project, &matrix, &[0, 1]).unwrap();
        let follower_decoded = decoded.project.task_by_id(follower.id()).unwrap();
        assert_eq!(follower_decoded.start_at().unwrap(), kick_off + chrono::Duration::minutes(60));
    }
}
