pub mod resolve;
pub mod slots;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Product, TimingTag};
use crate::detector::Conflict;
use crate::scheduler::resolve::resolution_pass;
use crate::scheduler::slots::{
    clock_gap, format_clock, initialize_slots, parse_clock, CandidateSlot, SlotKind,
};

pub const DEFAULT_MAX_PASSES: u32 = 10;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("stack is empty; nothing to schedule")]
    EmptyStack,
    #[error("invalid 24-hour clock time: {0}")]
    InvalidClockTime(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealTimes {
    pub breakfast: String,
    pub lunch: String,
    pub dinner: String,
}

impl Default for MealTimes {
    fn default() -> Self {
        Self {
            breakfast: "08:00".to_string(),
            lunch: "12:30".to_string(),
            dinner: "18:30".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleConstraints {
    #[serde(default)]
    pub meal_times: MealTimes,
    #[serde(default)]
    pub workout_time: Option<String>,
    #[serde(default = "default_sleep_time")]
    pub sleep_time: String,
    #[serde(default = "default_max_passes")]
    pub max_passes: u32,
}

impl Default for ScheduleConstraints {
    fn default() -> Self {
        Self {
            meal_times: MealTimes::default(),
            workout_time: None,
            sleep_time: default_sleep_time(),
            max_passes: default_max_passes(),
        }
    }
}

fn default_sleep_time() -> String {
    "22:30".to_string()
}

fn default_max_passes() -> u32 {
    DEFAULT_MAX_PASSES
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledDose {
    pub product_id: String,
    pub name: String,
    pub dosage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleSlot {
    pub time: String,
    pub products: Vec<ScheduledDose>,
    pub reasoning: String,
}

/// Best-effort greedy schedule: seed every product into the slot its timing
/// tag points at, then run bounded conflict-resolution passes. Conflicts the
/// passes cannot separate stay in place and remain visible through the
/// caller's conflict list; this function never fails on a well-formed stack.
pub fn generate_schedule(
    stack: &[Product],
    conflicts: &[Conflict],
    constraints: &ScheduleConstraints,
) -> Result<Vec<ScheduleSlot>, ScheduleError> {
    if stack.is_empty() {
        return Err(ScheduleError::EmptyStack);
    }

    let mut slots = initialize_slots(constraints)?;
    for product in stack {
        place(product.clone(), &mut slots);
    }

    for _ in 0..constraints.max_passes.max(1) {
        match resolution_pass(&slots, conflicts) {
            Some(next) => slots = next,
            None => break,
        }
    }

    slots.sort_by_key(|slot| slot.minutes);
    let mut out: Vec<ScheduleSlot> = Vec::new();
    for slot in slots.into_iter().filter(|slot| !slot.products.is_empty()) {
        let doses = slot.products.iter().map(|product| ScheduledDose {
            product_id: product.id.clone(),
            name: product.name.clone(),
            dosage: product.dosage_per_serving.clone(),
        });
        let time = format_clock(slot.minutes as i64);
        // Derived slots can collide on the clock (e.g. post-workout landing
        // on dinner); keep slot times unique by folding them together.
        match out.last_mut() {
            Some(last) if last.time == time => last.products.extend(doses),
            _ => out.push(ScheduleSlot {
                time,
                products: doses.collect(),
                reasoning: slot.kind.reasoning().to_string(),
            }),
        }
    }
    Ok(out)
}

/// Gap violations that survived resolution, reported as data rather than
/// errors so callers can surface schedule quality.
pub fn validate_schedule(schedule: &[ScheduleSlot], conflicts: &[Conflict]) -> Vec<String> {
    let mut times: HashMap<&str, u32> = HashMap::new();
    for slot in schedule {
        let Ok(minutes) = parse_clock(&slot.time) else {
            continue;
        };
        for dose in &slot.products {
            times.insert(dose.product_id.as_str(), minutes);
        }
    }

    let mut violations = Vec::new();
    for conflict in conflicts {
        let (Some(&a), Some(&b)) = (
            times.get(conflict.product_a_id.as_str()),
            times.get(conflict.product_b_id.as_str()),
        ) else {
            continue;
        };
        let gap = clock_gap(a, b);
        if gap < conflict.time_gap_minutes {
            violations.push(format!(
                "{} and {} are {} minutes apart, but {} requires {} minutes",
                conflict.product_a_name,
                conflict.product_b_name,
                gap,
                conflict.severity,
                conflict.time_gap_minutes
            ));
        }
    }
    violations
}

fn target_kind(tag: TimingTag) -> SlotKind {
    match tag {
        TimingTag::EmptyStomachMorning => SlotKind::EmptyStomachMorning,
        TimingTag::WithFoodMorning | TimingTag::Anytime => SlotKind::Breakfast,
        TimingTag::Afternoon => SlotKind::Afternoon,
        TimingTag::Evening => SlotKind::Dinner,
        TimingTag::BeforeBed => SlotKind::Bedtime,
        TimingTag::PreWorkout => SlotKind::PreWorkout,
        TimingTag::PostWorkout => SlotKind::PostWorkout,
    }
}

fn place(product: Product, slots: &mut [CandidateSlot]) {
    let kind = target_kind(product.optimal_timing);
    let idx = slots
        .iter()
        .position(|slot| slot.kind == kind)
        .or_else(|| {
            // Workout tags without a workout slot drop back to the
            // empty-stomach morning slot.
            slots
                .iter()
                .position(|slot| slot.kind == SlotKind::EmptyStomachMorning)
        })
        .unwrap_or(0);
    slots[idx].products.push(product);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Unit};
    use crate::detector::detect_conflicts;
    use crate::rules::RuleTable;

    fn schedule_product_ids(schedule: &[ScheduleSlot]) -> Vec<String> {
        let mut ids: Vec<String> = schedule
            .iter()
            .flat_map(|slot| slot.products.iter().map(|p| p.product_id.clone()))
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn empty_stack_is_a_typed_error() {
        let result = generate_schedule(&[], &[], &ScheduleConstraints::default());
        assert!(matches!(result, Err(ScheduleError::EmptyStack)));
    }

    #[test]
    fn invalid_meal_time_is_a_typed_error() {
        let constraints = ScheduleConstraints {
            meal_times: MealTimes {
                breakfast: "25:00".to_string(),
                ..MealTimes::default()
            },
            ..ScheduleConstraints::default()
        };
        let product = Product::adhoc("D3").with_ingredient("vit-d3", 25.0, Unit::Mcg);
        let result = generate_schedule(&[product], &[], &constraints);
        assert!(matches!(result, Err(ScheduleError::InvalidClockTime(_))));
    }

    #[test]
    fn every_product_is_placed_exactly_once() {
        let catalog = Catalog::builtin();
        let stack: Vec<Product> = catalog.products().cloned().collect();
        let conflicts = detect_conflicts(&stack, catalog, RuleTable::builtin()).expect("detection");
        let schedule = generate_schedule(&stack, &conflicts, &ScheduleConstraints::default())
            .expect("schedule generates");

        let mut expected: Vec<String> = stack.iter().map(|p| p.id.clone()).collect();
        expected.sort();
        assert_eq!(schedule_product_ids(&schedule), expected);
    }

    #[test]
    fn slots_are_unique_by_time_and_sorted() {
        let catalog = Catalog::builtin();
        let stack: Vec<Product> = catalog.products().cloned().collect();
        let schedule = generate_schedule(&stack, &[], &ScheduleConstraints::default())
            .expect("schedule generates");
        let times: Vec<u32> = schedule
            .iter()
            .map(|s| parse_clock(&s.time).expect("valid slot time"))
            .collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn before_bed_products_share_the_bedtime_slot() {
        let stack = vec![
            Product::adhoc("Melatonin Soft").with_timing(TimingTag::BeforeBed),
            Product::adhoc("Mag Glycinate").with_timing(TimingTag::BeforeBed),
            Product::adhoc("Glycine Powder").with_timing(TimingTag::BeforeBed),
        ];
        let schedule = generate_schedule(&stack, &[], &ScheduleConstraints::default())
            .expect("schedule generates");
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].time, "22:30");
        assert_eq!(schedule[0].products.len(), 3);
    }

    #[test]
    fn conflicting_products_end_up_far_enough_apart() {
        let catalog = Catalog::builtin();
        let iron = Product::adhoc("Iron Tabs")
            .with_timing(TimingTag::WithFoodMorning)
            .with_ingredient("iron", 65.0, Unit::Mg);
        let tea = Product::adhoc("Green Tea")
            .with_timing(TimingTag::WithFoodMorning)
            .with_ingredient("tannin", 150.0, Unit::Mg);
        let stack = vec![iron, tea];
        let conflicts = detect_conflicts(&stack, catalog, RuleTable::builtin()).expect("detection");
        assert_eq!(conflicts[0].time_gap_minutes, 120);

        let schedule = generate_schedule(&stack, &conflicts, &ScheduleConstraints::default())
            .expect("schedule generates");
        assert_eq!(schedule.len(), 2, "the pair is split across two slots");
        let times: Vec<u32> = schedule
            .iter()
            .map(|s| parse_clock(&s.time).expect("valid slot time"))
            .collect();
        assert!(clock_gap(times[0], times[1]) >= 120);
        assert!(validate_schedule(&schedule, &conflicts).is_empty());
    }

    #[test]
    fn mutual_conflicts_terminate_within_the_pass_limit() {
        // Three iron sources and three calcium sources all pushed into the
        // same breakfast slot produce a dense conflict set; generation must
        // still return within the pass bound.
        let mut stack = Vec::new();
        for n in 0..3 {
            stack.push(
                Product::adhoc(&format!("Iron {n}"))
                    .with_timing(TimingTag::WithFoodMorning)
                    .with_ingredient("iron", 30.0, Unit::Mg),
            );
            stack.push(
                Product::adhoc(&format!("Calcium {n}"))
                    .with_timing(TimingTag::WithFoodMorning)
                    .with_ingredient("calcium", 500.0, Unit::Mg),
            );
        }
        let conflicts =
            detect_conflicts(&stack, Catalog::builtin(), RuleTable::builtin()).expect("detection");
        assert_eq!(conflicts.len(), 9);

        let schedule = generate_schedule(&stack, &conflicts, &ScheduleConstraints::default())
            .expect("schedule generates");
        let mut expected: Vec<String> = stack.iter().map(|p| p.id.clone()).collect();
        expected.sort();
        assert_eq!(schedule_product_ids(&schedule), expected);
    }

    #[test]
    fn workout_tags_fall_back_without_a_workout_slot() {
        let stack = vec![Product::adhoc("Creatine").with_timing(TimingTag::PostWorkout)];
        let schedule = generate_schedule(&stack, &[], &ScheduleConstraints::default())
            .expect("schedule generates");
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].time, "07:00");

        let with_workout = ScheduleConstraints {
            workout_time: Some("17:00".to_string()),
            ..ScheduleConstraints::default()
        };
        let schedule = generate_schedule(&stack, &[], &with_workout).expect("schedule generates");
        assert_eq!(schedule[0].time, "18:00");
    }

    #[test]
    fn unresolved_violations_are_reported_as_data() {
        let conflicts = vec![Conflict {
            product_a_id: "a".to_string(),
            product_a_name: "A".to_string(),
            product_b_id: "b".to_string(),
            product_b_name: "B".to_string(),
            nutrient_a: "iron".to_string(),
            nutrient_b: "calcium".to_string(),
            severity: crate::rules::Severity::Critical,
            interaction: crate::rules::Interaction::AbsorptionCompetition,
            explanation: String::new(),
            mechanism: String::new(),
            time_gap_minutes: 240,
        }];
        let schedule = vec![ScheduleSlot {
            time: "08:00".to_string(),
            products: vec![
                ScheduledDose {
                    product_id: "a".to_string(),
                    name: "A".to_string(),
                    dosage: String::new(),
                },
                ScheduledDose {
                    product_id: "b".to_string(),
                    name: "B".to_string(),
                    dosage: String::new(),
                },
            ],
            reasoning: String::new(),
        }];
        let violations = validate_schedule(&schedule, &conflicts);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("240"));
    }
}
