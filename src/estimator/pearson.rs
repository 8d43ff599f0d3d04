//! Skill-correlation duration estimator.

use chrono::Duration;

use super::TimeEstimator;
use crate::error::ScheduleError;

/// Estimates duration from the Pearson correlation between an employee's
/// skill vector and a task's required-skill vector: a well-matched employee
/// (correlation near 1) finishes fast, a mismatched one (correlation near
/// -1) finishes slow.
#[derive(Debug, Clone, Copy, Default)]
pub struct PearsonEstimator;

impl TimeEstimator for PearsonEstimator {
    fn skills_estimation(
        &self,
        emp_skills: &[i64],
        task_skills: &[i64],
    ) -> Result<Duration, ScheduleError> {
        if emp_skills.len() < 2 {
            return Err(ScheduleError::IllegalNumSkills {
                kind: "employee",
                size: emp_skills.len(),
            });
        }
        if task_skills.len() < 2 {
            return Err(ScheduleError::IllegalNumSkills {
                kind: "task",
                size: task_skills.len(),
            });
        }
        if emp_skills.len() != task_skills.len() {
            return Err(ScheduleError::IllegalSkillSets {
                n_emp: emp_skills.len(),
                n_task: task_skills.len(),
            });
        }

        let r = pearson_correlation(emp_skills, task_skills);
        let minutes = 5.0 + (40.0 * (1.0 - r)).round();
        Ok(Duration::minutes(minutes as i64))
    }
}

/// Pearson's r over two equal-length slices. A zero-variance input (a
/// constant vector) makes the correlation undefined; that NaN is folded to
/// `0` rather than propagated.
fn pearson_correlation(a: &[i64], b: &[i64]) -> f64 {
    let n = a.len() as f64;
    let a: Vec<f64> = a.iter().map(|&x| x as f64).collect();
    let b: Vec<f64> = b.iter().map(|&x| x as f64).collect();
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..a.len() {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    let r = cov / denom;
    if r.is_nan() {
        0.0
    } else {
        r.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_yield_five_minutes() {
        let est = PearsonEstimator;
        let d = est.skills_estimation(&[1, 2, 3], &[1, 2, 3]).unwrap();
        assert_eq!(d, Duration::minutes(5));
    }

    #[test]
    fn reversed_vectors_yield_eighty_five_minutes() {
        let est = PearsonEstimator;
        let d = est.skills_estimation(&[1, 2, 3], &[3, 2, 1]).unwrap();
        assert_eq!(d, Duration::minutes(85));
    }

    #[test]
    fn constant_task_vector_yields_forty_five_minutes() {
        let est = PearsonEstimator;
        let d = est.skills_estimation(&[1, 2, 3], &[1, 1, 1]).unwrap();
        assert_eq!(d, Duration::minutes(45));
    }

    #[test]
    fn mismatched_lengths_fail() {
        let est = PearsonEstimator;
        let err = est.skills_estimation(&[1, 2], &[1, 2, 3]).unwrap_err();
        assert_eq!(err, ScheduleError::IllegalSkillSets { n_emp: 2, n_task: 3 });
    }

    #[test]
    fn empty_vectors_fail() {
        let est = PearsonEstimator;
        let err = est.skills_estimation(&[], &[]).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::IllegalNumSkills {
                kind: "employee",
                size: 0
            }
        );
    }
}
