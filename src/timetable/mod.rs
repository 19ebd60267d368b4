pub mod moves;
pub mod types;

pub use moves::{apply_move, validate_move, MoveOutcome, MoveRejection};
pub use types::{ClassAssignment, SlotRef, Timetable};
