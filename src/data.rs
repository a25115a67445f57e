use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calendar::{ClockTime, DayRef};

// Type aliases for clarity
pub type DepartmentId = u32;
pub type SubjectId = u32;
pub type FacultyId = u32;
pub type ClassroomId = u32;
pub type BatchId = u32;
pub type FixedSlotId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    #[default]
    Theory,
    Practical,
    Tutorial,
}

/// A subject taught to every batch of its department and semester.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    pub department_id: DepartmentId,
    pub semester: u32,
    pub credits: u32,
    pub hours_per_week: u32,
    #[serde(default, rename = "type")]
    pub session_type: SessionType,
    #[serde(default)]
    pub requires_lab: bool,
}

/// A teaching staff member. The hour caps are only honoured when the search
/// is configured to enforce them.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
    pub id: FacultyId,
    #[serde(default)]
    pub name: String,
    pub department_id: DepartmentId,
    #[serde(default = "default_max_hours_per_day")]
    pub max_hours_per_day: u32,
    #[serde(default = "default_max_hours_per_week")]
    pub max_hours_per_week: u32,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

/// A room. Rooms without a department belong to the shared pool.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classroom {
    pub id: ClassroomId,
    #[serde(default)]
    pub name: String,
    pub capacity: u32,
    #[serde(default = "default_room_type", rename = "type")]
    pub room_type: String,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

/// One student cohort; it needs a personal timetable without overlaps.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: BatchId,
    #[serde(default)]
    pub name: String,
    pub department_id: DepartmentId,
    pub semester: u32,
    pub student_count: u32,
    #[serde(default = "default_shift")]
    pub shift: String,
}

/// Which faculty may teach which subject, and how much they want to.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityMapping {
    pub faculty_id: FacultyId,
    pub subject_id: SubjectId,
    #[serde(default = "default_preference_level")]
    pub preference_level: u32,
}

/// An administratively pinned session reproduced verbatim in every schedule.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedSlot {
    #[serde(default)]
    pub id: FixedSlotId,
    pub day_of_week: DayRef,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    #[serde(default)]
    pub subject_id: Option<SubjectId>,
    #[serde(default)]
    pub faculty_id: Option<FacultyId>,
    #[serde(default)]
    pub classroom_id: Option<ClassroomId>,
    #[serde(default)]
    pub batch_id: Option<BatchId>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Per-department working-week parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizationParams {
    pub max_classes_per_day: u32,
    pub min_break_duration: u32,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub lunch_break_start: ClockTime,
    pub lunch_break_end: ClockTime,
    pub working_days: usize,
}

impl Default for OptimizationParams {
    fn default() -> Self {
        Self {
            max_classes_per_day: 6,
            min_break_duration: 15,
            start_time: ClockTime::from_hour(9),
            end_time: ClockTime::from_hour(17),
            lunch_break_start: ClockTime::from_hour(13),
            lunch_break_end: ClockTime::from_hour(14),
            working_days: 5,
        }
    }
}

/// Read-only snapshot of everything the engine needs from the catalog store.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Catalog {
    pub subjects: Vec<Subject>,
    pub faculty: Vec<Faculty>,
    pub classrooms: Vec<Classroom>,
    pub batches: Vec<Batch>,
    pub eligibility: Vec<EligibilityMapping>,
    pub fixed_slots: Vec<FixedSlot>,
}

impl Catalog {
    /// Narrows the catalog to one department and semester, mirroring what the
    /// store hands the optimizer: the department's subjects and batches of
    /// that semester, its available faculty, its own and shared available
    /// rooms, and eligibility rows for its subjects. Fixed slots are kept
    /// as-is apart from inactive ones.
    pub fn scoped(&self, department_id: DepartmentId, semester: u32) -> Catalog {
        let subjects: Vec<Subject> = self
            .subjects
            .iter()
            .filter(|s| s.department_id == department_id && s.semester == semester)
            .cloned()
            .collect();
        let eligibility = self
            .eligibility
            .iter()
            .filter(|m| {
                self.subjects
                    .iter()
                    .any(|s| s.id == m.subject_id && s.department_id == department_id)
            })
            .cloned()
            .collect();

        Catalog {
            subjects,
            faculty: self
                .faculty
                .iter()
                .filter(|f| f.department_id == department_id && f.is_available)
                .cloned()
                .collect(),
            classrooms: self
                .classrooms
                .iter()
                .filter(|c| {
                    c.is_available && c.department_id.is_none_or(|d| d == department_id)
                })
                .cloned()
                .collect(),
            batches: self
                .batches
                .iter()
                .filter(|b| b.department_id == department_id && b.semester == semester)
                .cloned()
                .collect(),
            eligibility,
            fixed_slots: self.fixed_slots.iter().filter(|f| f.is_active).cloned().collect(),
        }
    }

    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    pub fn faculty_member(&self, id: FacultyId) -> Option<&Faculty> {
        self.faculty.iter().find(|f| f.id == id)
    }

    pub fn classroom(&self, id: ClassroomId) -> Option<&Classroom> {
        self.classrooms.iter().find(|c| c.id == id)
    }

    pub fn batch(&self, id: BatchId) -> Option<&Batch> {
        self.batches.iter().find(|b| b.id == id)
    }
}

/// Everything one generation call needs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub department_id: DepartmentId,
    pub semester: u32,
    #[serde(default)]
    pub academic_year: String,
    #[serde(default)]
    pub params: OptimizationParams,
    /// Zero runs the deterministic greedy pass; larger values widen the
    /// search and randomize it.
    #[serde(default)]
    pub variation: u32,
    #[serde(default)]
    pub seed: Option<u64>,
    pub catalog: Catalog,
}

/// A single, scheduled session. Fixed sessions may leave any resource empty;
/// generated sessions always name all four.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub day_of_week: usize,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub subject_id: Option<SubjectId>,
    pub faculty_id: Option<FacultyId>,
    pub classroom_id: Option<ClassroomId>,
    pub batch_id: Option<BatchId>,
    #[serde(default)]
    pub is_fixed: bool,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn id(v: Option<u32>) -> String {
            v.map_or_else(|| "-".to_string(), |v| v.to_string())
        }
        write!(
            f,
            "day {} {}-{} subject {} faculty {} room {} batch {}{}",
            self.day_of_week,
            self.start_time,
            self.end_time,
            id(self.subject_id),
            id(self.faculty_id),
            id(self.classroom_id),
            id(self.batch_id),
            if self.is_fixed { " (fixed)" } else { "" }
        )
    }
}

/// The final output of one generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timetable {
    pub placements: Vec<Placement>,
    pub score: f64,
    pub attempts: usize,
    pub seed: u64,
}

/// One ranked alternative offered for human selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableOption {
    pub option: usize,
    pub placements: Vec<Placement>,
    pub score: u32,
}

fn default_true() -> bool {
    true
}

fn default_max_hours_per_day() -> u32 {
    6
}

fn default_max_hours_per_week() -> u32 {
    30
}

fn default_room_type() -> String {
    "classroom".to_string()
}

fn default_shift() -> String {
    "morning".to_string()
}

fn default_preference_level() -> u32 {
    1
}
