//! Double-booking detection on a finished schedule.
//!
//! Works on any placement list, however it was produced. The search avoids
//! conflicts by construction; this catches hand-edited schedules and fixed
//! slots that collide with each other.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::calendar::ClockTime;
use crate::data::{Catalog, Placement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    FacultyConflict,
    ClassroomConflict,
    BatchConflict,
}

impl ConflictKind {
    const ALL: [ConflictKind; 3] = [
        ConflictKind::FacultyConflict,
        ConflictKind::ClassroomConflict,
        ConflictKind::BatchConflict,
    ];

    fn resource(self, placement: &Placement) -> Option<u32> {
        match self {
            ConflictKind::FacultyConflict => placement.faculty_id,
            ConflictKind::ClassroomConflict => placement.classroom_id,
            ConflictKind::BatchConflict => placement.batch_id,
        }
    }

    fn resource_name(self, catalog: &Catalog, id: u32) -> Option<String> {
        match self {
            ConflictKind::FacultyConflict => catalog.faculty_member(id).map(|f| f.name.clone()),
            ConflictKind::ClassroomConflict => catalog.classroom(id).map(|c| c.name.clone()),
            ConflictKind::BatchConflict => catalog.batch(id).map(|b| b.name.clone()),
        }
    }
}

/// Two placements that book the same resource at overlapping times.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    pub resource_id: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub resource_name: Option<String>,
    pub day_of_week: usize,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    /// Positions of the two placements in the audited list, first < second.
    pub first: usize,
    pub second: usize,
}

/// Reports every unordered pair of placements that share a faculty member,
/// classroom or batch on the same day with overlapping times. Names are
/// filled in from `catalog` when given.
pub fn audit(placements: &[Placement], catalog: Option<&Catalog>) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for kind in ConflictKind::ALL {
        let groups = placements
            .iter()
            .enumerate()
            .filter_map(|(i, p)| kind.resource(p).map(|id| ((id, p.day_of_week), i)))
            .into_group_map();

        let mut found: Vec<Conflict> = groups
            .into_iter()
            .flat_map(|((resource_id, day), indices)| {
                indices
                    .into_iter()
                    .tuple_combinations()
                    .filter(|&(a, b)| overlaps(&placements[a], &placements[b]))
                    .map(move |(a, b)| Conflict {
                        kind,
                        resource_id,
                        resource_name: None,
                        day_of_week: day,
                        start_time: placements[a].start_time,
                        end_time: placements[a].end_time,
                        first: a,
                        second: b,
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        found.sort_by_key(|c| (c.first, c.second));
        conflicts.extend(found);
    }

    if let Some(catalog) = catalog {
        for conflict in &mut conflicts {
            conflict.resource_name = conflict.kind.resource_name(catalog, conflict.resource_id);
        }
    }

    conflicts
}

fn overlaps(a: &Placement, b: &Placement) -> bool {
    a.start_time < b.end_time && a.end_time > b.start_time
}
