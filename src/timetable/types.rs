use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A class placed somewhere in the timetable grid.
///
/// The grade is extracted once from the "Grade <digit>" name prefix when the
/// generation response is parsed; names that do not match the pattern carry
/// no grade and never participate in grade-exclusion checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassAssignment {
    pub name: String,
    pub grade: Option<u8>,
}

impl ClassAssignment {
    pub fn from_name(name: &str) -> Self {
        Self {
            grade: grade_from_name(name),
            name: name.to_string(),
        }
    }
}

/// Extracts the grade from a class display name of the form "Grade <digit>..."
pub fn grade_from_name(name: &str) -> Option<u8> {
    let rest = name.strip_prefix("Grade ")?;
    let digit = rest.chars().next()?;
    digit.to_digit(10).map(|d| d as u8)
}

/// Identifies one grid cell: a room on a day at a session slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRef {
    pub room: String,
    pub day: String,
    pub slot: String,
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {} on {}", self.slot, self.room, self.day)
    }
}

/// The full weekly timetable for one generation cycle
///
/// room name -> day name -> slot name -> classes occupying that slot.
/// Created wholesale from a generation response, replaced on the next
/// generation, and mutated only through `apply_move`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timetable {
    pub rooms: HashMap<String, HashMap<String, HashMap<String, Vec<ClassAssignment>>>>,
    pub generated_at: DateTime<Utc>,
}

impl Timetable {
    /// Builds a timetable from an already shape-validated generation response.
    ///
    /// The top-level key count is checked by the caller; this still rejects
    /// wrong node types at any level so a malformed response never reaches
    /// the editor.
    pub fn from_response(value: &serde_json::Value) -> Result<Self, String> {
        let room_map = value
            .as_object()
            .ok_or_else(|| "response is not an object".to_string())?;

        let mut rooms = HashMap::new();
        for (room, days_value) in room_map {
            let day_map = days_value
                .as_object()
                .ok_or_else(|| format!("entry for {} is not an object", room))?;

            let mut days = HashMap::new();
            for (day, slots_value) in day_map {
                let slot_map = slots_value
                    .as_object()
                    .ok_or_else(|| format!("{} / {} is not an object", room, day))?;

                let mut slots = HashMap::new();
                for (slot, names_value) in slot_map {
                    let names = names_value
                        .as_array()
                        .ok_or_else(|| format!("{} / {} / {} is not a list", room, day, slot))?;

                    let mut occupants = Vec::new();
                    for name in names {
                        let name = name
                            .as_str()
                            .ok_or_else(|| format!("non-string class name in {} / {} / {}", room, day, slot))?;
                        occupants.push(ClassAssignment::from_name(name));
                    }
                    occupants.sort_by(|a, b| a.name.cmp(&b.name));
                    slots.insert(slot.clone(), occupants);
                }
                days.insert(day.clone(), slots);
            }
            rooms.insert(room.clone(), days);
        }

        Ok(Self {
            rooms,
            generated_at: Utc::now(),
        })
    }

    pub fn slot(&self, at: &SlotRef) -> Option<&Vec<ClassAssignment>> {
        self.rooms.get(&at.room)?.get(&at.day)?.get(&at.slot)
    }

    pub fn slot_mut(&mut self, at: &SlotRef) -> Option<&mut Vec<ClassAssignment>> {
        self.rooms.get_mut(&at.room)?.get_mut(&at.day)?.get_mut(&at.slot)
    }

    /// Total class placements across the whole grid
    pub fn total_class_count(&self) -> usize {
        self.rooms
            .values()
            .flat_map(|days| days.values())
            .flat_map(|slots| slots.values())
            .map(|occupants| occupants.len())
            .sum()
    }
}
