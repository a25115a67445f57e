use thiserror::Error;

use crate::data::{BatchId, SubjectId};
use crate::validation::ValidationError;

/// Why a generation call produced no timetable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    /// The request itself is malformed; nothing was searched.
    #[error("invalid input: {}", join_messages(.0))]
    InvalidInput(Vec<ValidationError>),

    /// No attempt placed every requirement.
    #[error("unable to generate a feasible timetable after {attempts} attempts{}", infeasible_detail(.timed_out, .blocking))]
    Infeasible {
        attempts: usize,
        timed_out: bool,
        blocking: Option<BlockingRequirement>,
    },

    /// Every requested option failed.
    #[error("unable to generate any of {requested} timetable options")]
    NoOptions { requested: usize },
}

/// The (subject, batch) demand that most often ran out of candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockingRequirement {
    pub subject_id: SubjectId,
    pub batch_id: BatchId,
}

impl std::fmt::Display for BlockingRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "subject {} for batch {}", self.subject_id, self.batch_id)
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn infeasible_detail(timed_out: &bool, blocking: &Option<BlockingRequirement>) -> String {
    let mut detail = String::new();
    if *timed_out {
        detail.push_str(" (time limit reached)");
    }
    if let Some(b) = blocking {
        detail.push_str(&format!(", {b} could not be placed"));
    }
    detail
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_infeasible_message() {
        let err = ScheduleError::Infeasible {
            attempts: 100,
            timed_out: false,
            blocking: Some(BlockingRequirement {
                subject_id: 7,
                batch_id: 3,
            }),
        };
        assert_eq!(
            err.to_string(),
            "unable to generate a feasible timetable after 100 attempts, subject 7 for batch 3 could not be placed"
        );
    }

    #[test]
    fn test_invalid_input_message_joins_errors() {
        let err = ScheduleError::InvalidInput(vec![
            ValidationError::new(ValidationErrorKind::DuplicateId, "duplicate subject id 1"),
            ValidationError::new(ValidationErrorKind::InvalidParameters, "end time must be after start time"),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid input: duplicate subject id 1; end time must be after start time"
        );
    }
}
