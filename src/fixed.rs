//! Preloading of administratively pinned sessions.

use log::{debug, warn};

use crate::calendar::TimeSlot;
use crate::data::Placement;
use crate::occupancy::{Occupancy, OccupancyGrid, ResourceIndex};
use crate::problem::Problem;

/// Occupancy and output every attempt starts from.
#[derive(Debug, Clone)]
pub struct Seed {
    pub occupancy: Occupancy,
    pub placements: Vec<Placement>,
}

/// Marks each active fixed slot in the grids and emits it as a fixed
/// placement. Slots whose day or start time do not resolve against the
/// calendar are skipped. A slot longer than one hour blocks every calendar
/// slot it overlaps.
pub fn preload(problem: &Problem) -> Seed {
    let mut occupancy = problem.empty_occupancy();
    let mut placements = Vec::new();

    for fixed in problem.catalog.fixed_slots.iter().filter(|f| f.is_active) {
        let Some(day) = problem.calendar.day_index(&fixed.day_of_week) else {
            warn!(
                "Skipping fixed slot {}: day {:?} is not a working day.",
                fixed.id, fixed.day_of_week
            );
            continue;
        };
        if problem.calendar.slot_index(fixed.start_time).is_none() {
            warn!(
                "Skipping fixed slot {}: {} is not the start of a time slot.",
                fixed.id, fixed.start_time
            );
            continue;
        }

        let span = TimeSlot {
            start_time: fixed.start_time,
            end_time: fixed.end_time,
        };
        for (slot, _) in problem
            .calendar
            .slots()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.overlaps(&span))
        {
            mark(&mut occupancy.faculty, &problem.faculty, fixed.faculty_id, day, slot);
            mark(&mut occupancy.classrooms, &problem.classrooms, fixed.classroom_id, day, slot);
            mark(&mut occupancy.batches, &problem.batches, fixed.batch_id, day, slot);
        }

        placements.push(Placement {
            day_of_week: day,
            start_time: fixed.start_time,
            end_time: fixed.end_time,
            subject_id: fixed.subject_id,
            faculty_id: fixed.faculty_id,
            classroom_id: fixed.classroom_id,
            batch_id: fixed.batch_id,
            is_fixed: true,
        });
    }

    debug!("Preloaded {} fixed placements.", placements.len());
    Seed {
        occupancy,
        placements,
    }
}

fn mark(grid: &mut OccupancyGrid, index: &ResourceIndex, id: Option<u32>, day: usize, slot: usize) {
    let Some(id) = id else { return };
    match index.position(id) {
        Some(position) => grid.occupy(position, day, slot),
        None => debug!("Fixed slot resource {id} is outside this problem; not tracked."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::ClockTime;
    use crate::data::{GenerationRequest, OptimizationParams};

    fn problem(fixed_slots: serde_json::Value) -> Problem {
        Problem::new(&GenerationRequest {
            department_id: 1,
            semester: 3,
            academic_year: "2025-26".into(),
            params: OptimizationParams::default(),
            variation: 0,
            seed: None,
            catalog: serde_json::from_value(serde_json::json!({
                "faculty": [{ "id": 10, "departmentId": 1 }],
                "classrooms": [{ "id": 100, "capacity": 70 }],
                "batches": [{ "id": 50, "departmentId": 1, "semester": 3, "studentCount": 60 }],
                "fixedSlots": fixed_slots
            }))
            .unwrap(),
        })
    }

    #[test]
    fn test_fixed_slot_marks_all_named_resources() {
        let problem = problem(serde_json::json!([{
            "id": 1, "dayOfWeek": "Tuesday", "startTime": "10:00", "endTime": "11:00",
            "subjectId": 1, "facultyId": 10, "classroomId": 100, "batchId": 50
        }]));
        let seed = preload(&problem);

        assert!(!seed.occupancy.faculty.is_free(0, 1, 1));
        assert!(!seed.occupancy.classrooms.is_free(0, 1, 1));
        assert!(!seed.occupancy.batches.is_free(0, 1, 1));
        assert_eq!(seed.placements.len(), 1);
        let placement = &seed.placements[0];
        assert!(placement.is_fixed);
        assert_eq!(placement.day_of_week, 1);
        assert_eq!(placement.start_time, ClockTime::from_hour(10));
        assert_eq!(placement.faculty_id, Some(10));
    }

    #[test]
    fn test_null_resources_leave_grids_untouched() {
        let problem = problem(serde_json::json!([{
            "dayOfWeek": 0, "startTime": "09:00", "endTime": "10:00", "batchId": 50
        }]));
        let seed = preload(&problem);
        assert!(seed.occupancy.faculty.is_free(0, 0, 0));
        assert!(seed.occupancy.classrooms.is_free(0, 0, 0));
        assert!(!seed.occupancy.batches.is_free(0, 0, 0));
        assert_eq!(seed.placements[0].faculty_id, None);
    }

    #[test]
    fn test_unresolvable_fixed_slots_skipped() {
        let problem = problem(serde_json::json!([
            { "dayOfWeek": "Sunday", "startTime": "09:00", "endTime": "10:00", "facultyId": 10 },
            { "dayOfWeek": 0, "startTime": "09:30", "endTime": "10:30", "facultyId": 10 },
            { "dayOfWeek": 0, "startTime": "13:00", "endTime": "14:00", "facultyId": 10 },
            { "dayOfWeek": 0, "startTime": "11:00", "endTime": "12:00", "facultyId": 10, "isActive": false }
        ]));
        let seed = preload(&problem);
        assert!(seed.placements.is_empty());
        assert_eq!(seed.occupancy.faculty.week_load(0), 0);
    }

    #[test]
    fn test_multi_hour_fixed_slot_blocks_every_covered_slot() {
        let problem = problem(serde_json::json!([
            { "dayOfWeek": 0, "startTime": "09:00", "endTime": "11:00", "batchId": 50 },
            { "dayOfWeek": 1, "startTime": "12:00", "endTime": "15:00", "facultyId": 10 }
        ]));
        let seed = preload(&problem);

        // 09:00 and 10:00 on Monday, nothing from 11:00
        assert!(!seed.occupancy.batches.is_free(0, 0, 0));
        assert!(!seed.occupancy.batches.is_free(0, 0, 1));
        assert!(seed.occupancy.batches.is_free(0, 0, 2));
        // 12:00 and 14:00 on Tuesday, lunch has no slot
        assert!(!seed.occupancy.faculty.is_free(0, 1, 3));
        assert!(!seed.occupancy.faculty.is_free(0, 1, 4));
        assert!(seed.occupancy.faculty.is_free(0, 1, 5));
        assert_eq!(seed.occupancy.faculty.week_load(0), 2);
        assert_eq!(seed.placements.len(), 2);
        assert_eq!(seed.placements[0].end_time, ClockTime::from_hour(11));
    }

    #[test]
    fn test_unknown_resource_still_emitted() {
        let problem = problem(serde_json::json!([{
            "dayOfWeek": 2, "startTime": "14:00", "endTime": "15:00", "facultyId": 77, "batchId": 50
        }]));
        let seed = preload(&problem);
        assert_eq!(seed.placements.len(), 1);
        assert!(!seed.occupancy.batches.is_free(0, 2, 4));
    }
}
