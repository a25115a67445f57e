use log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::time::Instant;

use crate::data::{GenerationRequest, Timetable, TimetableOption};
use crate::error::ScheduleError;
use crate::fixed::preload;
use crate::problem::Problem;
use crate::requirements::{expand, sort_by_constraint};
use crate::scoring::option_score;
use crate::search::{PlacementSearch, SearchConfig, SearchOutcome};
use crate::validation::validate_request;

/// Generates one timetable for the request's department and semester.
///
/// Uses `request.seed` for the search's random source, or a fresh seed from
/// the OS when none is given; the seed used is reported in the result.
pub fn generate(request: &GenerationRequest, config: &SearchConfig) -> Result<Timetable, ScheduleError> {
    let seed = request.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let outcome = generate_with_rng(request, config, &mut rng)?;
    Ok(Timetable {
        placements: outcome.placements,
        score: outcome.score,
        attempts: outcome.attempts,
        seed,
    })
}

/// Same as [`generate`] with a caller-supplied random source.
pub fn generate_with_rng<R: Rng>(
    request: &GenerationRequest,
    config: &SearchConfig,
    rng: &mut R,
) -> Result<SearchOutcome, ScheduleError> {
    validate_request(request).map_err(ScheduleError::InvalidInput)?;

    let problem = Problem::new(request);
    info!(
        "Generating timetable for department {} semester {} ({}): {} subjects, {} faculty, {} classrooms, {} batches, {} slots x {} days.",
        request.department_id,
        request.semester,
        request.academic_year,
        problem.catalog.subjects.len(),
        problem.faculty.len(),
        problem.classrooms.len(),
        problem.batches.len(),
        problem.calendar.slot_count(),
        problem.calendar.working_days()
    );

    let seed = preload(&problem);
    let mut requirements = expand(&problem);
    sort_by_constraint(&problem, &mut requirements);

    PlacementSearch::new(&problem, &seed, config).run(requirements, request.variation, rng)
}

/// Generates `num_options` independent timetables in parallel and returns
/// the ones that succeeded, best option score first.
///
/// Option `i` (zero based) runs with variation `i`, so the first option is
/// the deterministic greedy schedule and the rest are randomized. Failed
/// options are logged and left out; only a complete wipe-out is an error.
pub fn generate_options(
    request: &GenerationRequest,
    num_options: usize,
    config: &SearchConfig,
) -> Result<Vec<TimetableOption>, ScheduleError> {
    validate_request(request).map_err(ScheduleError::InvalidInput)?;

    let start_time = Instant::now();
    let base_seed = request.seed.unwrap_or_else(|| rand::rng().random());

    let mut options: Vec<TimetableOption> = (0..num_options)
        .into_par_iter()
        .filter_map(|i| {
            let option_request = GenerationRequest {
                variation: i as u32,
                seed: Some(base_seed.wrapping_add(i as u64)),
                ..request.clone()
            };
            match generate(&option_request, config) {
                Ok(timetable) => Some(TimetableOption {
                    option: i + 1,
                    score: option_score(&timetable.placements),
                    placements: timetable.placements,
                }),
                Err(e) => {
                    warn!("Error generating option {}: {e}", i + 1);
                    None
                }
            }
        })
        .collect();

    if options.is_empty() {
        return Err(ScheduleError::NoOptions {
            requested: num_options,
        });
    }

    options.sort_by(|a, b| b.score.cmp(&a.score).then(a.option.cmp(&b.option)));
    info!(
        "Generated {} of {} timetable options in {:.2?}.",
        options.len(),
        num_options,
        start_time.elapsed()
    );
    Ok(options)
}
