//! Dense booking grids for faculty, classrooms and batches.
//!
//! Every tracked resource gets a stable position when the problem snapshot
//! is built. A grid is a flat `Vec<bool>` laid out as
//! `resource * days * slots + day * slots + slot`, so copying the grids at
//! the start of an attempt is a plain `Vec` clone.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ResourceIndex {
    positions: HashMap<u32, usize>,
    ids: Vec<u32>,
}

impl ResourceIndex {
    /// Assigns positions in iteration order. Repeated ids keep their first
    /// position.
    pub fn new(ids: impl IntoIterator<Item = u32>) -> Self {
        let mut index = Self::default();
        for id in ids {
            if !index.positions.contains_key(&id) {
                index.positions.insert(id, index.ids.len());
                index.ids.push(id);
            }
        }
        index
    }

    #[inline]
    pub fn position(&self, id: u32) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    #[inline]
    pub fn id(&self, position: usize) -> u32 {
        self.ids[position]
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    cells: Vec<bool>,
    days: usize,
    slots: usize,
}

impl OccupancyGrid {
    pub fn new(resources: usize, days: usize, slots: usize) -> Self {
        Self {
            cells: vec![false; resources * days * slots],
            days,
            slots,
        }
    }

    #[inline]
    fn cell(&self, resource: usize, day: usize, slot: usize) -> usize {
        debug_assert!(day < self.days && slot < self.slots);
        (resource * self.days + day) * self.slots + slot
    }

    #[inline]
    pub fn is_free(&self, resource: usize, day: usize, slot: usize) -> bool {
        !self.cells[self.cell(resource, day, slot)]
    }

    #[inline]
    pub fn occupy(&mut self, resource: usize, day: usize, slot: usize) {
        let cell = self.cell(resource, day, slot);
        self.cells[cell] = true;
    }

    /// Booked cells for one resource on one day.
    pub fn day_load(&self, resource: usize, day: usize) -> usize {
        let start = self.cell(resource, day, 0);
        self.cells[start..start + self.slots].iter().filter(|&&c| c).count()
    }

    /// Booked cells for one resource across the week.
    pub fn week_load(&self, resource: usize) -> usize {
        let span = self.days * self.slots;
        let start = resource * span;
        self.cells[start..start + span].iter().filter(|&&c| c).count()
    }

    /// Whether the slot right before `slot` is booked. False for the first
    /// slot of the day.
    pub fn previous_occupied(&self, resource: usize, day: usize, slot: usize) -> bool {
        slot > 0 && !self.is_free(resource, day, slot - 1)
    }

    /// Whether the slot right after `slot` is booked. False for the last
    /// slot of the day.
    pub fn next_occupied(&self, resource: usize, day: usize, slot: usize) -> bool {
        slot + 1 < self.slots && !self.is_free(resource, day, slot + 1)
    }
}

/// The three grids one attempt mutates as it commits placements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    pub faculty: OccupancyGrid,
    pub classrooms: OccupancyGrid,
    pub batches: OccupancyGrid,
}

impl Occupancy {
    pub fn new(faculty: usize, classrooms: usize, batches: usize, days: usize, slots: usize) -> Self {
        Self {
            faculty: OccupancyGrid::new(faculty, days, slots),
            classrooms: OccupancyGrid::new(classrooms, days, slots),
            batches: OccupancyGrid::new(batches, days, slots),
        }
    }

    pub fn commit(&mut self, faculty: usize, classroom: usize, batch: usize, day: usize, slot: usize) {
        self.faculty.occupy(faculty, day, slot);
        self.classrooms.occupy(classroom, day, slot);
        self.batches.occupy(batch, day, slot);
    }
}
