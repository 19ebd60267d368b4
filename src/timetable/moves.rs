use super::types::{grade_from_name, SlotRef, Timetable};

/// Result of checking a drag-and-drop move before it is applied
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    Accepted,
    /// Source and destination are the same slot; nothing to do
    NoOp,
    Rejected(MoveRejection),
}

/// A rule that blocked a move
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MoveRejection {
    /// Destination slot does not exist in the grid. The generation response
    /// is rectangular so this only happens on a malformed move request.
    #[error("No such slot: {dest}")]
    UnknownDestination { dest: SlotRef },
    /// The class is already in the destination list (duplicate drop event).
    /// Rejected without a user-facing message.
    #[error("{class_name} is already in that slot")]
    AlreadyPresent { class_name: String },
    #[error("{dest} is full (max {max} concurrent classes)")]
    CapacityFull { dest: SlotRef, max: u32 },
    #[error("Grade {moving} and Grade {blocking} classes cannot share a slot")]
    GradeConflict { moving: u8, blocking: u8 },
}

impl MoveRejection {
    /// Silent rejections leave the grid unchanged without surfacing an error
    pub fn is_silent(&self) -> bool {
        matches!(self, MoveRejection::AlreadyPresent { .. })
    }
}

/// Structural failure while applying an already accepted move.
/// Nothing is applied when one of these occurs.
// Field name `source` is reserved by thiserror for error chaining, so the
// slot fields here are named `at`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MoveError {
    #[error("Source slot missing: {at}")]
    UnknownSource { at: SlotRef },
    #[error("Destination slot missing: {at}")]
    UnknownDestination { at: SlotRef },
    #[error("{class_name} is not in {at}")]
    ClassNotInSource { class_name: String, at: SlotRef },
}

/// Grades that must never share a slot: 1 with 2, and 3 with 4
fn conflicting_grade(grade: u8) -> Option<u8> {
    match grade {
        1 => Some(2),
        2 => Some(1),
        3 => Some(4),
        4 => Some(3),
        _ => None,
    }
}

/// Checks a move against the capacity and grade-exclusion rules.
///
/// Never mutates the timetable; the caller applies accepted moves with
/// `apply_move`.
pub fn validate_move(
    table: &Timetable,
    max_concurrent: u32,
    class_name: &str,
    from: &SlotRef,
    to: &SlotRef,
) -> MoveOutcome {
    if from == to {
        return MoveOutcome::NoOp;
    }

    let occupants = match table.slot(to) {
        Some(occupants) => occupants,
        None => {
            return MoveOutcome::Rejected(MoveRejection::UnknownDestination { dest: to.clone() })
        }
    };

    if occupants.iter().any(|c| c.name == class_name) {
        return MoveOutcome::Rejected(MoveRejection::AlreadyPresent {
            class_name: class_name.to_string(),
        });
    }

    if occupants.len() as u32 >= max_concurrent {
        return MoveOutcome::Rejected(MoveRejection::CapacityFull {
            dest: to.clone(),
            max: max_concurrent,
        });
    }

    if let Some(moving_grade) = grade_from_name(class_name) {
        if let Some(blocked_by) = conflicting_grade(moving_grade) {
            if occupants.iter().any(|c| c.grade == Some(blocked_by)) {
                return MoveOutcome::Rejected(MoveRejection::GradeConflict {
                    moving: moving_grade,
                    blocking: blocked_by,
                });
            }
        }
    }

    MoveOutcome::Accepted
}

/// Applies an accepted move as a copy-then-replace over the whole timetable.
///
/// The returned value has the class removed from the source list and inserted
/// into the destination list (kept sorted by name). The input timetable is
/// never touched, so a render of the previous value cannot observe a
/// half-applied move.
pub fn apply_move(
    table: &Timetable,
    class_name: &str,
    from: &SlotRef,
    to: &SlotRef,
) -> Result<Timetable, MoveError> {
    let mut next = table.clone();

    let source = next.slot_mut(from).ok_or_else(|| MoveError::UnknownSource {
        at: from.clone(),
    })?;
    let index = source
        .iter()
        .position(|c| c.name == class_name)
        .ok_or_else(|| MoveError::ClassNotInSource {
            class_name: class_name.to_string(),
            at: from.clone(),
        })?;
    let moved = source.remove(index);

    let dest = next.slot_mut(to).ok_or_else(|| MoveError::UnknownDestination {
        at: to.clone(),
    })?;
    dest.push(moved);
    dest.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(next)
}
