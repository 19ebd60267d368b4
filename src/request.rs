use serde_json::{json, Value};

use crate::params::ScheduleParameters;

/// Display label for the nth class of a grade: A, B, ... Z, then 27, 28, ...
fn class_label(index: u32) -> String {
    if index < 26 {
        ((b'A' + index as u8) as char).to_string()
    } else {
        (index + 1).to_string()
    }
}

/// Enumerates every class name implied by the grade counts,
/// e.g. "Grade 1 - A", "Grade 1 - B", "Grade 3 - A"
pub fn class_names(params: &ScheduleParameters) -> Vec<String> {
    let mut names = Vec::new();
    for (&grade, &count) in &params.grade_counts {
        for i in 0..count {
            names.push(format!("Grade {} - {}", grade, class_label(i)));
        }
    }
    names
}

/// Builds the natural-language scheduling brief sent to the generation
/// service. Recomputed fresh on every request; the five rules here are the
/// same ones the move validator re-checks on every drag-and-drop.
pub fn build_brief(params: &ScheduleParameters) -> String {
    let days = params.active_days();
    let rooms = params.room_names();
    let slots = params.slot_names();

    let mut grade_lines = Vec::new();
    for (&grade, &count) in &params.grade_counts {
        if count == 0 {
            continue;
        }
        let names: Vec<String> = (0..count)
            .map(|i| format!("Grade {} - {}", grade, class_label(i)))
            .collect();
        grade_lines.push(format!(
            "  Grade {}: {} classes ({})",
            grade,
            count,
            names.join(", ")
        ));
    }

    format!(
        r#"Plan a weekly class timetable for a school.

Classes to schedule:
{grade_lines}

Rooms: {rooms}
Active days: {days}
Sessions per day: {slots}

Rules:
1. Place every class listed above exactly once in the whole timetable. Do not invent, duplicate, or drop classes.
2. No slot may hold more than {max_concurrent} classes at the same time.
3. Grade 1 and Grade 2 classes must never share the same slot.
4. Grade 3 and Grade 4 classes must never share the same slot.
5. Fill Room 1 to capacity before placing anything in Room 2, then Room 2 before Room 3, and so on. Within that, spread classes as evenly as possible across the active days.

Return the timetable in the requested JSON shape, with an entry for every room, day, and slot (empty slots as empty lists)."#,
        grade_lines = grade_lines.join("\n"),
        rooms = rooms.join(", "),
        days = days.join(", "),
        slots = slots.join(", "),
        max_concurrent = params.max_concurrent,
    )
}

/// Builds the structured-output response schema: room -> day -> slot ->
/// list of class-name strings, with every room, day, and slot marked
/// required so the returned value is always the full rectangular grid.
pub fn build_response_schema(params: &ScheduleParameters) -> Value {
    let days = params.active_days();
    let rooms = params.room_names();
    let slots = params.slot_names();

    let mut slot_properties = serde_json::Map::new();
    for slot in &slots {
        slot_properties.insert(
            slot.clone(),
            json!({
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }),
        );
    }
    let slot_schema = json!({
        "type": "OBJECT",
        "properties": slot_properties,
        "required": slots,
    });

    let mut day_properties = serde_json::Map::new();
    for day in &days {
        day_properties.insert(day.clone(), slot_schema.clone());
    }
    let day_schema = json!({
        "type": "OBJECT",
        "properties": day_properties,
        "required": days,
    });

    let mut room_properties = serde_json::Map::new();
    for room in &rooms {
        room_properties.insert(room.clone(), day_schema.clone());
    }
    json!({
        "type": "OBJECT",
        "properties": room_properties,
        "required": rooms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn params() -> ScheduleParameters {
        ScheduleParameters {
            grade_counts: BTreeMap::from([(1, 2), (3, 1)]),
            max_concurrent: 2,
            sessions_per_day: 2,
            active_days: vec!["Wednesday".to_string(), "Monday".to_string()],
            room_count: 2,
        }
    }

    #[test]
    fn test_class_label_sequence() {
        assert_eq!(class_label(0), "A");
        assert_eq!(class_label(1), "B");
        assert_eq!(class_label(25), "Z");
        assert_eq!(class_label(26), "27");
    }

    #[test]
    fn test_class_names_convention() {
        let names = class_names(&params());
        assert_eq!(names, vec!["Grade 1 - A", "Grade 1 - B", "Grade 3 - A"]);
    }

    #[test]
    fn test_brief_enumerates_days_slots_rooms_and_rules() {
        let params = params();
        let brief = build_brief(&params);

        for day in params.active_days() {
            assert!(brief.contains(&day), "brief missing day {}", day);
        }
        for slot in params.slot_names() {
            assert!(brief.contains(&slot), "brief missing slot {}", slot);
        }
        for room in params.room_names() {
            assert!(brief.contains(&room), "brief missing room {}", room);
        }
        assert!(brief.contains("Grade 1: 2 classes (Grade 1 - A, Grade 1 - B)"));
        assert!(brief.contains("exactly once"));
        assert!(brief.contains("more than 2 classes"));
        assert!(brief.contains("Grade 1 and Grade 2"));
        assert!(brief.contains("Grade 3 and Grade 4"));
        assert!(brief.contains("Fill Room 1 to capacity"));
    }

    #[test]
    fn test_brief_skips_zero_count_grades() {
        let mut params = params();
        params.grade_counts.insert(5, 0);
        let brief = build_brief(&params);
        assert!(!brief.contains("Grade 5:"));
    }

    #[test]
    fn test_schema_top_level_keys_match_room_count() {
        let params = params();
        let schema = build_response_schema(&params);
        let properties = schema["properties"].as_object().unwrap();
        assert_eq!(properties.len(), params.room_count as usize);
        assert_eq!(
            schema["required"].as_array().unwrap().len(),
            params.room_count as usize
        );
    }

    #[test]
    fn test_schema_is_fully_rectangular() {
        let params = params();
        let schema = build_response_schema(&params);
        let room = &schema["properties"]["Room 1"];
        let required_days: Vec<&str> = room["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required_days, vec!["Monday", "Wednesday"]);

        let day = &room["properties"]["Monday"];
        let required_slots: Vec<&str> = day["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required_slots, vec!["Slot 1", "Slot 2"]);

        let slot = &day["properties"]["Slot 1"];
        assert_eq!(slot["type"], "ARRAY");
        assert_eq!(slot["items"]["type"], "STRING");
    }

    /// End-to-end request-builder scenario: 2 grade-1 classes, 1 room,
    /// 2 slots on Monday only
    #[test]
    fn test_minimal_scenario_brief_and_schema() {
        let params = ScheduleParameters {
            grade_counts: BTreeMap::from([(1, 2), (2, 0), (3, 0), (4, 0), (5, 0)]),
            max_concurrent: 3,
            sessions_per_day: 2,
            active_days: vec!["Monday".to_string()],
            room_count: 1,
        };

        let brief = build_brief(&params);
        assert!(brief.contains("Grade 1 - A"));
        assert!(brief.contains("Grade 1 - B"));
        assert_eq!(class_names(&params).len(), 2);

        let schema = build_response_schema(&params);
        let rooms = schema["properties"].as_object().unwrap();
        assert_eq!(rooms.len(), 1);
        assert!(rooms.contains_key("Room 1"));
        let days = rooms["Room 1"]["properties"].as_object().unwrap();
        assert_eq!(days.len(), 1);
        assert!(days.contains_key("Monday"));
        let slots = days["Monday"]["properties"].as_object().unwrap();
        assert_eq!(slots.len(), 2);
        assert!(slots.contains_key("Slot 1") && slots.contains_key("Slot 2"));
    }
}
