use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::scheduler::{ScheduleConstraints, ScheduleError};

pub const MINUTES_PER_DAY: u32 = 1440;

/// Parse a 24-hour "HH:MM" clock value into minutes from midnight.
pub fn parse_clock(value: &str) -> Result<u32, ScheduleError> {
    let invalid = || ScheduleError::InvalidClockTime(value.to_string());
    let (hours, minutes) = value.trim().split_once(':').ok_or_else(invalid)?;
    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    if hours >= 24 || minutes >= 60 {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

/// Render minutes from midnight as "HH:MM", wrapping into the 24-hour day
/// so derived slots like "60 minutes before breakfast" stay valid.
pub fn format_clock(minutes: i64) -> String {
    let wrapped = minutes.rem_euclid(MINUTES_PER_DAY as i64) as u32;
    format!("{:02}:{:02}", wrapped / 60, wrapped % 60)
}

/// Clock distance between two times of day, treated cyclically: 23:00 and
/// 01:00 are 120 minutes apart, not 22 hours.
pub fn clock_gap(a: u32, b: u32) -> u32 {
    let diff = a.abs_diff(b) % MINUTES_PER_DAY;
    diff.min(MINUTES_PER_DAY - diff)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    EmptyStomachMorning,
    Breakfast,
    Lunch,
    Afternoon,
    Dinner,
    Bedtime,
    PreWorkout,
    PostWorkout,
}

impl SlotKind {
    pub fn reasoning(self) -> &'static str {
        match self {
            Self::EmptyStomachMorning => {
                "Empty-stomach window before breakfast, best for absorption-sensitive supplements."
            }
            Self::Breakfast => "Taken with breakfast; dietary fat aids uptake of fat-soluble nutrients.",
            Self::Lunch => "Taken with lunch to pair absorption with a meal.",
            Self::Afternoon => "Mid-afternoon window, clear of the main meals.",
            Self::Dinner => "Taken with dinner to pair absorption with a meal.",
            Self::Bedtime => "Before bed, when relaxing and recovery-oriented supplements work best.",
            Self::PreWorkout => "Shortly before training for peak availability during the session.",
            Self::PostWorkout => "Within the post-training window to support recovery.",
        }
    }
}

impl Display for SlotKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::EmptyStomachMorning => "Morning (empty stomach)",
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Afternoon => "Afternoon",
            Self::Dinner => "Dinner",
            Self::Bedtime => "Bedtime",
            Self::PreWorkout => "Pre-workout",
            Self::PostWorkout => "Post-workout",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CandidateSlot {
    pub kind: SlotKind,
    pub minutes: u32,
    pub is_food: bool,
    pub is_empty_stomach: bool,
    pub products: Vec<Product>,
}

impl CandidateSlot {
    fn new(kind: SlotKind, minutes: i64, is_food: bool, is_empty_stomach: bool) -> Self {
        Self {
            kind,
            minutes: minutes.rem_euclid(MINUTES_PER_DAY as i64) as u32,
            is_food,
            is_empty_stomach,
            products: Vec::new(),
        }
    }
}

/// Fixed candidate slots derived from the day's anchors: an empty-stomach
/// slot an hour before breakfast, the three meals, an afternoon midpoint,
/// bedtime, and a pre/post workout pair when a workout time is set.
pub(crate) fn initialize_slots(
    constraints: &ScheduleConstraints,
) -> Result<Vec<CandidateSlot>, ScheduleError> {
    let breakfast = parse_clock(&constraints.meal_times.breakfast)? as i64;
    let lunch = parse_clock(&constraints.meal_times.lunch)? as i64;
    let dinner = parse_clock(&constraints.meal_times.dinner)? as i64;
    let bedtime = parse_clock(&constraints.sleep_time)? as i64;

    let mut slots = vec![
        CandidateSlot::new(SlotKind::EmptyStomachMorning, breakfast - 60, false, true),
        CandidateSlot::new(SlotKind::Breakfast, breakfast, true, false),
        CandidateSlot::new(SlotKind::Lunch, lunch, true, false),
        CandidateSlot::new(SlotKind::Afternoon, (lunch + dinner) / 2, false, true),
        CandidateSlot::new(SlotKind::Dinner, dinner, true, false),
        CandidateSlot::new(SlotKind::Bedtime, bedtime, false, true),
    ];

    if let Some(workout) = &constraints.workout_time {
        let workout = parse_clock(workout)? as i64;
        slots.push(CandidateSlot::new(
            SlotKind::PreWorkout,
            workout - 30,
            false,
            true,
        ));
        slots.push(CandidateSlot::new(
            SlotKind::PostWorkout,
            workout + 60,
            false,
            false,
        ));
    }

    slots.sort_by_key(|slot| slot.minutes);
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ScheduleConstraints;

    #[test]
    fn parses_and_formats_clock_values() {
        assert_eq!(parse_clock("08:00").expect("valid"), 480);
        assert_eq!(parse_clock("23:59").expect("valid"), 1439);
        assert!(parse_clock("24:00").is_err());
        assert!(parse_clock("08:61").is_err());
        assert!(parse_clock("eight").is_err());
        assert_eq!(format_clock(480), "08:00");
        assert_eq!(format_clock(-30), "23:30");
        assert_eq!(format_clock(1500), "01:00");
    }

    #[test]
    fn clock_gap_wraps_across_midnight() {
        assert_eq!(clock_gap(1380, 60), 120); // 23:00 vs 01:00
        assert_eq!(clock_gap(60, 1380), 120);
        assert_eq!(clock_gap(480, 600), 120);
        assert_eq!(clock_gap(0, 720), 720);
        assert_eq!(clock_gap(300, 300), 0);
    }

    #[test]
    fn slot_set_covers_the_day_in_order() {
        let constraints = ScheduleConstraints::default();
        let slots = initialize_slots(&constraints).expect("default constraints are valid");
        assert_eq!(slots.len(), 6);
        assert_eq!(slots[0].kind, SlotKind::EmptyStomachMorning);
        assert!(slots.windows(2).all(|w| w[0].minutes <= w[1].minutes));
        let breakfast = slots.iter().find(|s| s.kind == SlotKind::Breakfast).expect("breakfast");
        let empty = slots
            .iter()
            .find(|s| s.kind == SlotKind::EmptyStomachMorning)
            .expect("empty-stomach slot");
        assert_eq!(breakfast.minutes - empty.minutes, 60);
        assert!(breakfast.is_food && !breakfast.is_empty_stomach);
        assert!(empty.is_empty_stomach && !empty.is_food);
    }

    #[test]
    fn workout_time_adds_flanking_slots() {
        let constraints = ScheduleConstraints {
            workout_time: Some("17:00".to_string()),
            ..ScheduleConstraints::default()
        };
        let slots = initialize_slots(&constraints).expect("valid constraints");
        assert_eq!(slots.len(), 8);
        let pre = slots.iter().find(|s| s.kind == SlotKind::PreWorkout).expect("pre");
        let post = slots.iter().find(|s| s.kind == SlotKind::PostWorkout).expect("post");
        assert_eq!(pre.minutes, 16 * 60 + 30);
        assert_eq!(post.minutes, 18 * 60);
    }
}
