//! Whole-schedule quality score.
//!
//! Penalizes uneven faculty workload (population variance of sessions per
//! faculty member) and rewards dense room use (mean sessions per room that
//! appears in the schedule). Placements that leave a resource empty do not
//! count towards that resource.

use itertools::Itertools;

use crate::data::Placement;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolutionScorer {
    pub base: f64,
    pub variance_weight: f64,
    pub utilization_weight: f64,
}

impl SolutionScorer {
    /// Used inside the search to pick the best complete attempt.
    pub const ATTEMPT: Self = Self {
        base: 1000.0,
        variance_weight: 10.0,
        utilization_weight: 5.0,
    };

    /// Used to rank finished options against each other.
    pub const OPTION: Self = Self {
        base: 100.0,
        variance_weight: 2.0,
        utilization_weight: 2.0,
    };

    pub fn score(&self, placements: &[Placement]) -> f64 {
        let faculty_hours: Vec<f64> = placements
            .iter()
            .filter_map(|p| p.faculty_id)
            .counts()
            .into_values()
            .map(|n| n as f64)
            .collect();
        let room_sessions: Vec<f64> = placements
            .iter()
            .filter_map(|p| p.classroom_id)
            .counts()
            .into_values()
            .map(|n| n as f64)
            .collect();

        self.base - variance(&faculty_hours) * self.variance_weight
            + mean(&room_sessions) * self.utilization_weight
    }
}

/// Option-ranking score: rounded and never below zero.
pub fn option_score(placements: &[Placement]) -> u32 {
    SolutionScorer::OPTION.score(placements).round().max(0.0) as u32
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64
}
