use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Weekdays the timetable can use, in calendar order.
pub const WEEKDAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

pub const MIN_GRADE: u8 = 1;
pub const MAX_GRADE: u8 = 5;
pub const MAX_SESSIONS_PER_DAY: u32 = 5;
pub const MAX_ROOMS: u32 = 10;

/// User-entered parameters for one timetable generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleParameters {
    /// grade (1-5) -> number of classes to schedule for that grade
    pub grade_counts: BTreeMap<u8, u32>,
    /// Maximum classes that may occupy a single slot at the same time
    pub max_concurrent: u32,
    pub sessions_per_day: u32,
    /// Active weekday names; any input order, normalized to calendar order
    pub active_days: Vec<String>,
    pub room_count: u32,
}

impl ScheduleParameters {
    /// Total number of classes implied by the grade counts.
    /// Summed in u64 so unbounded per-grade counts cannot overflow.
    pub fn total_classes(&self) -> u64 {
        self.grade_counts.values().map(|&count| count as u64).sum()
    }

    /// Maximum number of class placements the grid can hold.
    /// Multiplied in u64 so an unbounded max_concurrent cannot overflow.
    pub fn capacity(&self) -> u64 {
        self.max_concurrent as u64
            * self.active_days().len() as u64
            * self.sessions_per_day as u64
            * self.room_count as u64
    }

    /// Active days restricted to known weekdays, deduplicated,
    /// in calendar order regardless of the order they were toggled in
    pub fn active_days(&self) -> Vec<String> {
        WEEKDAYS
            .iter()
            .filter(|day| self.active_days.iter().any(|d| d == *day))
            .map(|day| day.to_string())
            .collect()
    }

    pub fn room_names(&self) -> Vec<String> {
        (1..=self.room_count).map(|i| format!("Room {}", i)).collect()
    }

    pub fn slot_names(&self) -> Vec<String> {
        (1..=self.sessions_per_day).map(|i| format!("Slot {}", i)).collect()
    }
}

/// Validates schedule parameters before a generation request is attempted
pub fn validate_parameters(params: &ScheduleParameters) -> Result<(), String> {
    for &grade in params.grade_counts.keys() {
        if !(MIN_GRADE..=MAX_GRADE).contains(&grade) {
            return Err(format!("Unknown grade: {}", grade));
        }
    }

    if params.max_concurrent < 1 {
        return Err("Max concurrent classes must be at least 1".to_string());
    }

    if params.sessions_per_day < 1 || params.sessions_per_day > MAX_SESSIONS_PER_DAY {
        return Err(format!(
            "Sessions per day must be between 1 and {}",
            MAX_SESSIONS_PER_DAY
        ));
    }

    if params.room_count < 1 || params.room_count > MAX_ROOMS {
        return Err(format!("Number of rooms must be between 1 and {}", MAX_ROOMS));
    }

    for day in &params.active_days {
        if !WEEKDAYS.contains(&day.as_str()) {
            return Err(format!("Unknown day: {}", day));
        }
    }
    if params.active_days().is_empty() {
        return Err("At least one active day must be selected".to_string());
    }

    let total = params.total_classes();
    if total == 0 {
        return Err("At least one class must be requested".to_string());
    }
    if total > params.capacity() {
        return Err(format!(
            "Requested {} classes but the grid only holds {} (rooms x days x sessions x max concurrent)",
            total,
            params.capacity()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_params() -> ScheduleParameters {
        ScheduleParameters {
            grade_counts: BTreeMap::from([(1, 2), (2, 1)]),
            max_concurrent: 2,
            sessions_per_day: 3,
            active_days: vec!["Monday".to_string(), "Wednesday".to_string()],
            room_count: 2,
        }
    }

    #[test]
    fn test_totals_and_capacity() {
        let params = base_params();
        assert_eq!(params.total_classes(), 3);
        // 2 concurrent * 2 days * 3 sessions * 2 rooms
        assert_eq!(params.capacity(), 24);
    }

    #[test]
    fn test_active_days_calendar_order() {
        let mut params = base_params();
        params.active_days = vec![
            "Friday".to_string(),
            "Monday".to_string(),
            "Monday".to_string(),
            "Tuesday".to_string(),
        ];
        assert_eq!(params.active_days(), vec!["Monday", "Tuesday", "Friday"]);
    }

    #[test]
    fn test_validate_accepts_base() {
        assert!(validate_parameters(&base_params()).is_ok());
    }

    #[test]
    fn test_validate_rejects_no_days() {
        let mut params = base_params();
        params.active_days.clear();
        assert!(validate_parameters(&params).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_day() {
        let mut params = base_params();
        params.active_days.push("Saturday".to_string());
        assert!(validate_parameters(&params).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_classes() {
        let mut params = base_params();
        params.grade_counts = BTreeMap::from([(1, 0), (3, 0)]);
        assert!(validate_parameters(&params).is_err());
    }

    #[test]
    fn test_validate_rejects_over_capacity() {
        let mut params = base_params();
        params.grade_counts = BTreeMap::from([(5, 100)]);
        assert!(validate_parameters(&params).is_err());
    }

    #[test]
    fn test_validate_rejects_huge_grade_counts_without_panicking() {
        // Counts near u32::MAX must fall out as over-capacity errors,
        // not overflow in the sum
        let mut params = base_params();
        params.grade_counts = BTreeMap::from([(1, u32::MAX), (2, u32::MAX)]);
        let error = validate_parameters(&params).unwrap_err();
        assert!(error.contains("grid only holds"), "got: {}", error);
        assert_eq!(params.total_classes(), 2 * u32::MAX as u64);
    }

    #[test]
    fn test_capacity_does_not_overflow_on_huge_max_concurrent() {
        let mut params = base_params();
        params.max_concurrent = u32::MAX;
        params.sessions_per_day = 5;
        params.room_count = 10;
        params.active_days = WEEKDAYS.iter().map(|d| d.to_string()).collect();
        assert_eq!(params.capacity(), u32::MAX as u64 * 5 * 5 * 10);
        assert!(validate_parameters(&params).is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_widgets() {
        let mut params = base_params();
        params.room_count = 11;
        assert!(validate_parameters(&params).is_err());

        let mut params = base_params();
        params.sessions_per_day = 6;
        assert!(validate_parameters(&params).is_err());

        let mut params = base_params();
        params.max_concurrent = 0;
        assert!(validate_parameters(&params).is_err());

        let mut params = base_params();
        params.grade_counts.insert(6, 1);
        assert!(validate_parameters(&params).is_err());
    }
}
