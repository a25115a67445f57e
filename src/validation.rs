//! Input validation for generation requests.
//!
//! Runs before any search and reports every problem it finds at once:
//! duplicate catalog ids, degenerate working-week parameters, preference
//! levels below one, and fixed slots that end before they start.

use std::collections::HashSet;

use crate::data::{GenerationRequest, OptimizationParams};

pub type ValidationResult = Result<(), Vec<ValidationError>>;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two catalog entities of the same kind share an id.
    DuplicateId,
    /// Working hours, lunch window or working-day count make no sense.
    InvalidParameters,
    /// An eligibility mapping with a preference level of zero.
    InvalidPreference,
    /// A fixed slot whose end is not after its start.
    InvalidFixedSlot,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

pub fn validate_request(request: &GenerationRequest) -> ValidationResult {
    let mut errors = validate_params(&request.params);
    let catalog = &request.catalog;

    check_unique("subject", catalog.subjects.iter().map(|s| s.id), &mut errors);
    check_unique("faculty", catalog.faculty.iter().map(|f| f.id), &mut errors);
    check_unique("classroom", catalog.classrooms.iter().map(|c| c.id), &mut errors);
    check_unique("batch", catalog.batches.iter().map(|b| b.id), &mut errors);

    let mut seen_pairs = HashSet::new();
    for mapping in &catalog.eligibility {
        if !seen_pairs.insert((mapping.faculty_id, mapping.subject_id)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!(
                    "duplicate eligibility mapping for faculty {} and subject {}",
                    mapping.faculty_id, mapping.subject_id
                ),
            ));
        }
        if mapping.preference_level == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidPreference,
                format!(
                    "faculty {} has preference level 0 for subject {}",
                    mapping.faculty_id, mapping.subject_id
                ),
            ));
        }
    }

    for fixed in catalog.fixed_slots.iter().filter(|f| f.is_active) {
        if fixed.end_time <= fixed.start_time {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidFixedSlot,
                format!(
                    "fixed slot {} ends at {} but starts at {}",
                    fixed.id, fixed.end_time, fixed.start_time
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks the working-week parameters. An empty result means the calendar
/// grid can be built; it may still hold zero slots if lunch covers the day.
pub fn validate_params(params: &OptimizationParams) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if params.end_time.hour() <= params.start_time.hour() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameters,
            format!(
                "end time {} must be at least one hour after start time {}",
                params.end_time, params.start_time
            ),
        ));
    }
    if params.lunch_break_end < params.lunch_break_start {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameters,
            format!(
                "lunch break ends at {} before it starts at {}",
                params.lunch_break_end, params.lunch_break_start
            ),
        ));
    }
    if !(1..=7).contains(&params.working_days) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameters,
            format!("working days must be between 1 and 7, got {}", params.working_days),
        ));
    }

    errors
}

fn check_unique(
    entity: &str,
    ids: impl Iterator<Item = u32>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("duplicate {entity} id {id}"),
            ));
        }
    }
}
