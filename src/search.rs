//! Greedy multi-restart placement search.
//!
//! Each attempt walks the requirements in order and commits the best-scoring
//! (day, slot, faculty, classroom) candidate for each one. An attempt that
//! meets a requirement with no candidate is abandoned; there is no
//! backtracking. With a non-zero variation the pick is sampled from the top
//! candidates and the requirement order is reshuffled periodically, so
//! restarts explore different schedules.

use log::{debug, info, trace};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::data::{BatchId, Placement, SubjectId};
use crate::error::{BlockingRequirement, ScheduleError};
use crate::fixed::Seed;
use crate::occupancy::Occupancy;
use crate::problem::{EligibleFaculty, Problem};
use crate::requirements::Requirement;
use crate::scoring::SolutionScorer;

/// Tuning knobs for the search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    pub base_attempts: usize,
    pub attempts_per_variation: usize,
    /// Size of the pool a randomized pick samples from.
    pub top_k: usize,
    /// Attempts between requirement reshuffles in variation mode.
    pub reshuffle_interval: usize,
    /// Wall-clock budget for one search. Checked between attempts.
    pub time_limit_ms: Option<u64>,
    /// Skip faculty who reached `max_hours_per_day` or `max_hours_per_week`.
    pub enforce_faculty_caps: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_attempts: 100,
            attempts_per_variation: 50,
            top_k: 3,
            reshuffle_interval: 20,
            time_limit_ms: None,
            enforce_faculty_caps: false,
        }
    }
}

impl SearchConfig {
    pub fn attempts(&self, variation: u32) -> usize {
        self.base_attempts + self.attempts_per_variation * variation as usize
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}

/// A feasible way to place one requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub day: usize,
    pub slot: usize,
    pub faculty: usize,
    pub classroom: usize,
    pub score: i64,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub placements: Vec<Placement>,
    pub score: f64,
    pub attempts: usize,
}

pub struct PlacementSearch<'a> {
    problem: &'a Problem,
    seed: &'a Seed,
    config: &'a SearchConfig,
}

impl<'a> PlacementSearch<'a> {
    pub fn new(problem: &'a Problem, seed: &'a Seed, config: &'a SearchConfig) -> Self {
        Self {
            problem,
            seed,
            config,
        }
    }

    /// Runs up to `config.attempts(variation)` attempts over `requirements`
    /// (already sorted) and returns the best complete one.
    pub fn run<R: Rng>(
        &self,
        mut requirements: Vec<Requirement>,
        variation: u32,
        rng: &mut R,
    ) -> Result<SearchOutcome, ScheduleError> {
        let start_time = Instant::now();
        let randomized = variation > 0;
        let max_attempts = self.config.attempts(variation);
        let deadline = self.config.time_limit().map(|limit| start_time + limit);
        info!(
            "Searching placements for {} requirements ({} fixed), up to {} attempts, variation {}.",
            requirements.len(),
            self.seed.placements.len(),
            max_attempts,
            variation
        );

        let mut best: Option<(Vec<Placement>, f64)> = None;
        let mut failures: HashMap<(SubjectId, BatchId), usize> = HashMap::new();
        let mut attempts = 0;
        let mut timed_out = false;

        while attempts < max_attempts {
            if attempts > 0 && deadline.is_some_and(|d| Instant::now() >= d) {
                debug!("Time limit reached after {attempts} attempts.");
                timed_out = true;
                break;
            }

            match self.attempt(&requirements, randomized, rng) {
                Ok(placements) => {
                    let score = SolutionScorer::ATTEMPT.score(&placements);
                    trace!("Attempt {} complete with score {score:.2}.", attempts + 1);
                    if best.as_ref().is_none_or(|(_, best_score)| score > *best_score) {
                        best = Some((placements, score));
                    }
                }
                Err(blocked) => {
                    trace!(
                        "Attempt {} abandoned at subject {} batch {}.",
                        attempts + 1,
                        blocked.subject_id,
                        blocked.batch_id
                    );
                    *failures.entry((blocked.subject_id, blocked.batch_id)).or_default() += 1;
                }
            }
            attempts += 1;

            if !randomized {
                // Without randomness every further attempt would repeat this one.
                break;
            }
            if self.config.reshuffle_interval > 0 && attempts % self.config.reshuffle_interval == 0 {
                requirements.shuffle(rng);
            }
        }

        match best {
            Some((placements, score)) => {
                info!(
                    "Best schedule scored {score:.2} after {attempts} attempts in {:.2?}.",
                    start_time.elapsed()
                );
                Ok(SearchOutcome {
                    placements,
                    score,
                    attempts,
                })
            }
            None => {
                let blocking = failures
                    .into_iter()
                    .max_by_key(|&(key, count)| (count, Reverse(key)))
                    .map(|((subject_id, batch_id), _)| BlockingRequirement {
                        subject_id,
                        batch_id,
                    });
                info!("No feasible schedule after {attempts} attempts.");
                Err(ScheduleError::Infeasible {
                    attempts,
                    timed_out,
                    blocking,
                })
            }
        }
    }

    /// One greedy pass. Returns the requirement that could not be placed on
    /// failure.
    fn attempt<R: Rng>(
        &self,
        requirements: &[Requirement],
        randomized: bool,
        rng: &mut R,
    ) -> Result<Vec<Placement>, Requirement> {
        let mut occupancy = self.seed.occupancy.clone();
        let mut placements = self.seed.placements.clone();
        placements.reserve(requirements.len());

        for requirement in requirements {
            let mut candidates = self.candidates(&occupancy, requirement);
            let chosen = if randomized && candidates.len() > 1 {
                candidates.sort_by_key(|c| Reverse(c.score));
                let pool = self.config.top_k.clamp(1, candidates.len());
                candidates[rng.random_range(0..pool)]
            } else {
                // first of the highest scores
                match candidates.iter().min_by_key(|c| Reverse(c.score)) {
                    Some(c) => *c,
                    None => return Err(*requirement),
                }
            };

            occupancy.commit(
                chosen.faculty,
                chosen.classroom,
                requirement.batch,
                chosen.day,
                chosen.slot,
            );
            placements.push(self.placement(requirement, &chosen));
        }

        Ok(placements)
    }

    /// Every free (day, slot, faculty, classroom) combination for one
    /// requirement, in day, slot, mapping, room order.
    pub fn candidates(&self, occupancy: &Occupancy, requirement: &Requirement) -> Vec<Candidate> {
        let calendar = &self.problem.calendar;
        let eligible = &self.problem.eligibility[requirement.subject];
        let mut candidates = Vec::new();
        if eligible.is_empty() {
            return candidates;
        }

        for day in 0..calendar.working_days() {
            for slot in 0..calendar.slot_count() {
                if !occupancy.batches.is_free(requirement.batch, day, slot) {
                    continue;
                }
                for faculty in eligible {
                    if !occupancy.faculty.is_free(faculty.position, day, slot)
                        || !self.within_caps(occupancy, faculty, day)
                    {
                        continue;
                    }
                    let score = candidate_score(occupancy, faculty, day, slot);
                    candidates.extend(
                        (0..self.problem.classrooms.len())
                            .filter(|&room| occupancy.classrooms.is_free(room, day, slot))
                            .map(|classroom| Candidate {
                                day,
                                slot,
                                faculty: faculty.position,
                                classroom,
                                score,
                            }),
                    );
                }
            }
        }

        candidates
    }

    fn within_caps(&self, occupancy: &Occupancy, faculty: &EligibleFaculty, day: usize) -> bool {
        !self.config.enforce_faculty_caps
            || (occupancy.faculty.day_load(faculty.position, day) < faculty.max_hours_per_day as usize
                && occupancy.faculty.week_load(faculty.position) < faculty.max_hours_per_week as usize)
    }

    fn placement(&self, requirement: &Requirement, candidate: &Candidate) -> Placement {
        let slot = self.problem.calendar.slots()[candidate.slot];
        Placement {
            day_of_week: candidate.day,
            start_time: slot.start_time,
            end_time: slot.end_time,
            subject_id: Some(requirement.subject_id),
            faculty_id: Some(self.problem.faculty.id(candidate.faculty)),
            classroom_id: Some(self.problem.classrooms.id(candidate.classroom)),
            batch_id: Some(requirement.batch_id),
            is_fixed: false,
        }
    }
}

/// Desirability of putting `faculty` at (`day`, `slot`). The room does not
/// affect the score.
pub fn candidate_score(occupancy: &Occupancy, faculty: &EligibleFaculty, day: usize, slot: usize) -> i64 {
    let grid = &occupancy.faculty;
    let mut score = 100 + faculty.preference_level as i64 * 20;

    score -= grid.day_load(faculty.position, day) as i64 * 5;
    if slot < 2 {
        score += 5;
    }
    if grid.previous_occupied(faculty.position, day, slot) {
        score -= 10;
    }
    if grid.next_occupied(faculty.position, day, slot) {
        score -= 10;
    }

    score
}
