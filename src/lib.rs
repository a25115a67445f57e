//! Weekly academic timetable generation.
//!
//! Places every weekly contact hour of every (subject, batch) pair into a
//! (day, slot, faculty, classroom) cell without double-booking any faculty
//! member, room or batch, using a greedy multi-restart search. Also ranks
//! several independently generated options and audits finished schedules
//! for conflicts.

pub mod audit;
pub mod calendar;
pub mod config;
pub mod data;
pub mod error;
pub mod fixed;
pub mod occupancy;
pub mod problem;
pub mod requirements;
pub mod scoring;
pub mod search;
pub mod server;
pub mod solver;
pub mod validation;

pub use audit::{Conflict, ConflictKind, audit};
pub use data::{Catalog, GenerationRequest, Placement, Timetable, TimetableOption};
pub use error::ScheduleError;
pub use search::SearchConfig;
pub use solver::{generate, generate_options};
