use std::fs::File;
use std::io::Write;

use crate::params::ScheduleParameters;
use crate::timetable::Timetable;

/// Formats one slot's occupants for display
pub fn format_occupants(table: &Timetable, room: &str, day: &str, slot: &str) -> String {
    let occupants = table
        .rooms
        .get(room)
        .and_then(|days| days.get(day))
        .and_then(|slots| slots.get(slot));
    match occupants {
        Some(list) if !list.is_empty() => list
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        _ => "[EMPTY]".to_string(),
    }
}

/// Prints the timetable grid room by room, in the declared
/// room/day/slot order rather than map iteration order
pub fn print_timetable(table: &Timetable, params: &ScheduleParameters) {
    println!("\n=== Weekly Timetable ===");
    println!("Total classes placed: {}", table.total_class_count());

    for room in params.room_names() {
        println!("\n** {} **", room);
        for day in params.active_days() {
            println!("  {}:", day);
            for slot in params.slot_names() {
                println!("    {} -> {}", slot, format_occupants(table, &room, &day, &slot));
            }
        }
    }
}

/// Writes the timetable to a file in the same layout as `print_timetable`
pub fn write_timetable_to_file(
    table: &Timetable,
    params: &ScheduleParameters,
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(filename)?;

    writeln!(file, "** Weekly Timetable ({} classes) **", table.total_class_count())?;
    for room in params.room_names() {
        writeln!(file, "\n{}", room)?;
        for day in params.active_days() {
            writeln!(file, "  {}:", day)?;
            for slot in params.slot_names() {
                writeln!(file, "    {} {}", slot, format_occupants(table, &room, &day, &slot))?;
            }
        }
    }

    Ok(())
}
