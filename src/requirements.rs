//! Expansion of (subject, batch) demand into one-slot requirements.

use log::debug;

use crate::data::{BatchId, SubjectId};
use crate::problem::Problem;

/// One weekly contact hour that must be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub subject_id: SubjectId,
    pub batch_id: BatchId,
    /// Position of the subject in the snapshot's subject list.
    pub subject: usize,
    /// Position of the batch in the batch grid.
    pub batch: usize,
    /// `credits × 10`.
    pub priority: u32,
}

/// Emits `hours_per_week` requirements for every subject and every batch of
/// the same department and semester.
pub fn expand(problem: &Problem) -> Vec<Requirement> {
    let catalog = &problem.catalog;
    let mut requirements = Vec::new();

    for (subject_pos, subject) in catalog.subjects.iter().enumerate() {
        for batch in catalog
            .batches
            .iter()
            .filter(|b| b.department_id == subject.department_id && b.semester == subject.semester)
        {
            let Some(batch_pos) = problem.batches.position(batch.id) else {
                continue;
            };
            requirements.extend(
                std::iter::repeat(Requirement {
                    subject_id: subject.id,
                    batch_id: batch.id,
                    subject: subject_pos,
                    batch: batch_pos,
                    priority: subject.credits * 10,
                })
                .take(subject.hours_per_week as usize),
            );
        }
    }

    debug!(
        "Expanded {} subjects and {} batches into {} requirements.",
        catalog.subjects.len(),
        catalog.batches.len(),
        requirements.len()
    );
    requirements
}

/// `100 − 10 × eligible faculty`: the fewer people can teach a subject, the
/// earlier it should be placed.
pub fn constraint_score(problem: &Problem, requirement: &Requirement) -> i64 {
    100 - 10 * problem.eligibility[requirement.subject].len() as i64
}

/// Most constrained first. The sort is stable so equal scores keep
/// expansion order.
pub fn sort_by_constraint(problem: &Problem, requirements: &mut [Requirement]) {
    requirements.sort_by_key(|r| std::cmp::Reverse(constraint_score(problem, r)));
}
