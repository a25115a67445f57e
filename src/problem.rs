//! Immutable per-call snapshot the search runs against.

use log::{debug, warn};

use crate::calendar::CalendarGrid;
use crate::data::{Catalog, FacultyId, GenerationRequest, SubjectId};
use crate::occupancy::{Occupancy, ResourceIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibleFaculty {
    pub faculty_id: FacultyId,
    pub position: usize,
    pub preference_level: u32,
    pub max_hours_per_day: u32,
    pub max_hours_per_week: u32,
}

#[derive(Debug, Clone)]
pub struct Problem {
    pub catalog: Catalog,
    pub calendar: CalendarGrid,
    pub faculty: ResourceIndex,
    pub classrooms: ResourceIndex,
    pub batches: ResourceIndex,
    /// Eligible faculty per subject, aligned with `catalog.subjects`, in
    /// mapping order.
    pub eligibility: Vec<Vec<EligibleFaculty>>,
}

impl Problem {
    /// Scopes the request's catalog to its department and semester and
    /// builds the id → position tables once. Mappings naming faculty outside
    /// the scoped catalog are dropped.
    pub fn new(request: &GenerationRequest) -> Self {
        let catalog = request.catalog.scoped(request.department_id, request.semester);
        let calendar = CalendarGrid::from_params(&request.params);
        let faculty = ResourceIndex::new(catalog.faculty.iter().map(|f| f.id));
        let classrooms = ResourceIndex::new(catalog.classrooms.iter().map(|c| c.id));
        let batches = ResourceIndex::new(catalog.batches.iter().map(|b| b.id));

        let eligibility: Vec<Vec<EligibleFaculty>> = catalog
            .subjects
            .iter()
            .map(|subject| {
                catalog
                    .eligibility
                    .iter()
                    .filter(|m| m.subject_id == subject.id)
                    .filter_map(|m| {
                        let Some(position) = faculty.position(m.faculty_id) else {
                            debug!(
                                "Ignoring mapping of subject {} to faculty {} outside the department or unavailable.",
                                subject.id, m.faculty_id
                            );
                            return None;
                        };
                        let member = &catalog.faculty[position];
                        Some(EligibleFaculty {
                            faculty_id: m.faculty_id,
                            position,
                            preference_level: m.preference_level,
                            max_hours_per_day: member.max_hours_per_day,
                            max_hours_per_week: member.max_hours_per_week,
                        })
                    })
                    .collect()
            })
            .collect();

        for (subject, eligible) in catalog.subjects.iter().zip(&eligibility) {
            if eligible.is_empty() && subject.hours_per_week > 0 {
                warn!(
                    "Subject {} ({}) has no eligible faculty; no timetable can place it.",
                    subject.id, subject.name
                );
            }
        }

        Self {
            catalog,
            calendar,
            faculty,
            classrooms,
            batches,
            eligibility,
        }
    }

    pub fn subject_position(&self, id: SubjectId) -> Option<usize> {
        self.catalog.subjects.iter().position(|s| s.id == id)
    }

    pub fn empty_occupancy(&self) -> Occupancy {
        Occupancy::new(
            self.faculty.len(),
            self.classrooms.len(),
            self.batches.len(),
            self.calendar.working_days(),
            self.calendar.slot_count(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::OptimizationParams;

    fn request() -> GenerationRequest {
        GenerationRequest {
            department_id: 1,
            semester: 3,
            academic_year: "2025-26".into(),
            params: OptimizationParams::default(),
            variation: 0,
            seed: None,
            catalog: serde_json::from_value(serde_json::json!({
                "subjects": [
                    { "id": 1, "departmentId": 1, "semester": 3, "credits": 4, "hoursPerWeek": 3 },
                    { "id": 2, "departmentId": 1, "semester": 3, "credits": 2, "hoursPerWeek": 1 }
                ],
                "faculty": [
                    { "id": 10, "departmentId": 1, "maxHoursPerDay": 4 },
                    { "id": 11, "departmentId": 1 },
                    { "id": 12, "departmentId": 1, "isAvailable": false }
                ],
                "classrooms": [{ "id": 100, "capacity": 70 }],
                "batches": [{ "id": 50, "departmentId": 1, "semester": 3, "studentCount": 60 }],
                "eligibility": [
                    { "facultyId": 11, "subjectId": 1, "preferenceLevel": 3 },
                    { "facultyId": 10, "subjectId": 1 },
                    { "facultyId": 12, "subjectId": 2 }
                ]
            }))
            .unwrap(),
        }
    }

    #[test]
    fn test_eligibility_keeps_mapping_order() {
        let problem = Problem::new(&request());
        let ids: Vec<u32> = problem.eligibility[0].iter().map(|e| e.faculty_id).collect();
        assert_eq!(ids, vec![11, 10]);
        assert_eq!(problem.eligibility[0][0].preference_level, 3);
        assert_eq!(problem.eligibility[0][1].max_hours_per_day, 4);
        assert_eq!(problem.eligibility[0][1].position, 0);
    }

    #[test]
    fn test_unavailable_faculty_not_eligible() {
        let problem = Problem::new(&request());
        assert!(problem.eligibility[1].is_empty());
        assert_eq!(problem.faculty.len(), 2);
    }

    #[test]
    fn test_empty_occupancy_dimensions() {
        let problem = Problem::new(&request());
        let occupancy = problem.empty_occupancy();
        assert_eq!(occupancy.faculty.week_load(1), 0);
        assert!(occupancy.batches.is_free(0, 4, 6));
        assert_eq!(problem.subject_position(2), Some(1));
    }
}
