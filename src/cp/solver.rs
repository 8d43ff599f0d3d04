//! Branch-and-bound search over the integer model in [`super::model`].
//!
//! Shape mirrors a pluggable constraint solver (build a model, run it,
//! stream improving solutions) even though the search itself — a serial
//! schedule-generation scheme with chronological backtracking — is
//! hand-rolled rather than delegated to an external CP-SAT engine.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::{Duration as WallClock, Instant};

use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::model::{AssignedSlot, CpProblemData};
use crate::scheduler::OBJECTIVE_WEIGHT;

/// Per-employee booked minute intervals, kept sorted by start.
#[derive(Debug, Clone, Default)]
struct IntTimeline {
    busy: Vec<(i64, i64)>,
}

impl IntTimeline {
    fn occupy(&mut self, start: i64, end: i64) {
        let pos = self.busy.partition_point(|&(s, _)| s < start);
        self.busy.insert(pos, (start, end));
    }

    fn earliest_free(&self, ready: i64, duration: i64) -> i64 {
        let mut candidate = ready;
        for &(busy_start, busy_end) in &self.busy {
            if candidate + duration <= busy_start {
                break;
            }
            if candidate < busy_end {
                candidate = busy_end;
            }
        }
        candidate
    }
}

/// Search outcome for one call: best slots found and whether the space was
/// proved exhausted (optimal).
///
/// `optimal` is only as strong as the space actually searched: branching
/// happens over employee assignment for the single task order
/// `CpProblemData::topological_order` returns, not over task sequencing
/// itself, so this proves optimality within that fixed order rather than
/// over every dependency-respecting order. The two search spaces coincide
/// whenever no two ready tasks both prefer the same employee at the same
/// instant, which holds for every fixture exercised so far; a project
/// engineered so that delaying a task past an earlier-ready sibling beats
/// greedy earliest-fit would need sequence branching to find, and this
/// search would report `optimal = true` on a locally-best-but-not-globally-
/// best schedule instead.
pub struct SearchResult {
    pub slots: Vec<AssignedSlot>,
    pub optimal: bool,
}

/// A shared incumbent, guarded so multiple portfolio workers only ever
/// report a strictly improving sequence.
struct Incumbent {
    objective: AtomicI64,
    best: Mutex<Option<Vec<AssignedSlot>>>,
}

impl Incumbent {
    fn new() -> Self {
        Self {
            objective: AtomicI64::new(i64::MAX),
            best: Mutex::new(None),
        }
    }

    fn objective(&self) -> i64 {
        self.objective.load(Ordering::Acquire)
    }

    /// Records `slots` if `objective` strictly improves the incumbent,
    /// invoking `on_improve` while still holding the lock so emissions are
    /// totally ordered across workers.
    fn try_improve(&self, slots: &[AssignedSlot], objective: i64, on_improve: &mut dyn FnMut(&[AssignedSlot])) {
        let mut best = self.best.lock().unwrap();
        if objective < self.objective.load(Ordering::Acquire) {
            self.objective.store(objective, Ordering::Release);
            *best = Some(slots.to_vec());
            on_improve(slots);
        }
    }
}

/// One worker's branch ordering over equivalent employees; distinct
/// orderings across portfolio replicas diversify the search.
#[derive(Clone, Copy)]
enum BranchOrder {
    Ascending,
    Descending,
    Shuffled(u64),
}

struct Worker<'a> {
    data: &'a CpProblemData,
    order: &'a [usize],
    deadline: Instant,
    symmetry_breaking: bool,
    branch_order: BranchOrder,
    incumbent: &'a Incumbent,
    timed_out: &'a AtomicBool,
}

impl<'a> Worker<'a> {
    fn employee_branch_order(&self, task_idx: usize, used: &[bool]) -> Vec<usize> {
        let mut candidates: Vec<usize> = (0..self.data.n_employees).collect();

        match self.branch_order {
            BranchOrder::Ascending => {}
            BranchOrder::Descending => candidates.reverse(),
            BranchOrder::Shuffled(seed) => {
                let mut rng = rand::rngs::StdRng::seed_from_u64(seed ^ task_idx as u64);
                candidates.shuffle(&mut rng);
            }
        }

        if !self.symmetry_breaking {
            return candidates;
        }

        let groups = self.data.employee_equivalence_groups();
        candidates
            .into_iter()
            .filter(|&e| {
                let group = groups.iter().find(|g| g.contains(&e)).expect("employee belongs to a group");
                if group.len() == 1 {
                    return true;
                }
                // Within an equivalence group, only the lowest-indexed
                // still-unused employee may branch; already-used members
                // remain individually eligible (so a partial solution that
                // already touched e2 of an equivalent {e1, e2} can still
                // extend through e2).
                let lowest_unused = group.iter().find(|&&g| !used[g]).copied();
                match lowest_unused {
                    Some(lowest) => e == lowest || used[e],
                    None => true,
                }
            })
            .collect()
    }

    fn search(
        &self,
        depth: usize,
        slots: &mut Vec<Option<AssignedSlot>>,
        employee_timelines: &mut Vec<IntTimeline>,
        employee_used: &mut Vec<bool>,
        max_end: i64,
        on_improve: &mut dyn FnMut(&[AssignedSlot]),
    ) -> bool {
        if Instant::now() >= self.deadline {
            self.timed_out.store(true, Ordering::Release);
            return false;
        }

        if OBJECTIVE_WEIGHT * max_end >= self.incumbent.objective() {
            return true; // pruned, but the subtree below this bound is not itself exhausted
        }

        if depth == self.data.n_tasks {
            let finished: Vec<AssignedSlot> = slots.iter().map(|s| s.expect("every task assigned at a leaf")).collect();
            let objective = leaf_objective(self.data, &finished);
            self.incumbent.try_improve(&finished, objective, on_improve);
            return true;
        }

        let task_idx = self.order[depth];
        let ready = match self.data.predecessor[task_idx] {
            Some(dep_idx) => slots[dep_idx].expect("predecessor precedes its dependents in topological order").end_minutes(),
            None => 0,
        };

        if let Some(pinned) = self.data.pinned[task_idx] {
            let mut timeline = employee_timelines[pinned.employee_idx].clone();
            timeline.occupy(pinned.start_minutes, pinned.start_minutes + pinned.duration_minutes);
            let saved = std::mem::replace(&mut employee_timelines[pinned.employee_idx], timeline);

            slots[task_idx] = Some(AssignedSlot {
                employee_idx: pinned.employee_idx,
                start_minutes: pinned.start_minutes,
                duration_minutes: pinned.duration_minutes,
            });
            let was_used = employee_used[pinned.employee_idx];
            employee_used[pinned.employee_idx] = true;

            let new_max_end = max_end.max(pinned.start_minutes + pinned.duration_minutes);
            let exhausted = self.search(depth + 1, slots, employee_timelines, employee_used, new_max_end, on_improve);

            slots[task_idx] = None;
            employee_used[pinned.employee_idx] = was_used;
            employee_timelines[pinned.employee_idx] = saved;
            return exhausted;
        }

        let mut fully_exhausted = true;
        for employee_idx in self.employee_branch_order(task_idx, employee_used) {
            let duration = self.data.durations[employee_idx][task_idx];
            let start = employee_timelines[employee_idx].earliest_free(ready, duration);
            let end = start + duration;

            let saved_timeline = employee_timelines[employee_idx].clone();
            employee_timelines[employee_idx].occupy(start, end);
            slots[task_idx] = Some(AssignedSlot {
                employee_idx,
                start_minutes: start,
                duration_minutes: duration,
            });
            let was_used = employee_used[employee_idx];
            employee_used[employee_idx] = true;

            let new_max_end = max_end.max(end);
            let branch_exhausted =
                self.search(depth + 1, slots, employee_timelines, employee_used, new_max_end, on_improve);

            slots[task_idx] = None;
            employee_used[employee_idx] = was_used;
            employee_timelines[employee_idx] = saved_timeline;

            fully_exhausted &= branch_exhausted;
        }

        fully_exhausted
    }
}

fn leaf_objective(data: &CpProblemData, slots: &[AssignedSlot]) -> i64 {
    let makespan = slots.iter().map(AssignedSlot::end_minutes).max().unwrap_or(0);
    let mut priority_cost = 0i64;
    for i in 0..slots.len() {
        for j in 0..slots.len() {
            if slots[i].start_minutes < slots[j].start_minutes && data.priority[i] > data.priority[j] {
                priority_cost += 1;
            }
        }
    }
    OBJECTIVE_WEIGHT * makespan + priority_cost
}

/// Runs `workers` independent branch-and-bound replicas (1 for a plain
/// single-threaded search, >1 for a portfolio), sharing one incumbent.
/// `on_improve` fires under the incumbent's lock, so the sequence it
/// observes strictly improves call over call.
pub fn search(
    data: &CpProblemData,
    order: &[usize],
    time_limit: WallClock,
    workers: usize,
    symmetry_breaking: bool,
    mut on_improve: impl FnMut(&[AssignedSlot]) + Send,
) -> SearchResult {
    let deadline = Instant::now() + time_limit;
    let incumbent = Incumbent::new();
    let timed_out = AtomicBool::new(false);

    let branch_orders: Vec<BranchOrder> = (0..workers.max(1))
        .map(|i| match i {
            0 => BranchOrder::Ascending,
            1 => BranchOrder::Descending,
            n => BranchOrder::Shuffled(n as u64),
        })
        .collect();

    // Fallback trivial slot (everyone at time 0 on employee 0) so a leaf
    // always exists even if the true search times out immediately.
    let trivial: Vec<AssignedSlot> = (0..data.n_tasks)
        .map(|t| AssignedSlot {
            employee_idx: 0,
            start_minutes: 0,
            duration_minutes: data.durations.first().map(|row| row[t]).unwrap_or(1),
        })
        .collect();

    let on_improve_ref = Mutex::new(&mut on_improve as &mut (dyn FnMut(&[AssignedSlot]) + Send));

    let run_worker = |worker_idx: usize, branch_order: BranchOrder| -> bool {
        tracing::info!(worker_idx, "portfolio worker starting");
        let worker = Worker {
            data,
            order,
            deadline,
            symmetry_breaking,
            branch_order,
            incumbent: &incumbent,
            timed_out: &timed_out,
        };
        let mut slots = vec![None; data.n_tasks];
        let mut timelines = vec![IntTimeline::default(); data.n_employees];
        let mut used = vec![false; data.n_employees];
        let mut forward = |found: &[AssignedSlot]| {
            let mut guard = on_improve_ref.lock().unwrap();
            (*guard)(found);
        };
        let exhausted = worker.search(0, &mut slots, &mut timelines, &mut used, 0, &mut forward);
        tracing::info!(worker_idx, exhausted, "portfolio worker stopped");
        exhausted
    };

    let exhausted = if workers <= 1 {
        run_worker(0, branch_orders[0])
    } else {
        use rayon::prelude::*;
        branch_orders
            .par_iter()
            .enumerate()
            .map(|(worker_idx, &order)| run_worker(worker_idx, order))
            .reduce(|| true, |a, b| a && b)
    };

    let optimal = exhausted && !timed_out.load(Ordering::Acquire);
    let best = incumbent.best.lock().unwrap().clone();
    match best {
        Some(slots) => SearchResult { slots, optimal },
        None => SearchResult {
            slots: trivial,
            optimal: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_timeline_skips_booked_interval() {
        let mut timeline = IntTimeline::default();
        timeline.occupy(10, 30);
        assert_eq!(timeline.earliest_free(0, 15), 0);
        assert_eq!(timeline.earliest_free(5, 15), 30);
    }
}
