use crate::catalog::{Product, TimingTag};
use crate::detector::Conflict;
use crate::scheduler::slots::{clock_gap, CandidateSlot};

/// Dosage-triggered conflicts carry a zero gap; when the resolver separates
/// them anyway it falls back to this spacing.
const DEFAULT_RELOCATION_GAP: u32 = 120;

/// One resolution pass over the slot set: for each slot, the first co-located
/// conflicting pair gets one of its products relocated to a slot far enough
/// away. Returns the rewritten slots, or `None` when the pass is a fixed
/// point. Pure with respect to its inputs; the caller iterates up to the
/// pass limit.
pub(crate) fn resolution_pass(
    slots: &[CandidateSlot],
    conflicts: &[Conflict],
) -> Option<Vec<CandidateSlot>> {
    let mut next: Vec<CandidateSlot> = slots.to_vec();
    let mut changed = false;

    for slot_idx in 0..next.len() {
        let Some((first, second, gap)) = first_conflicting_pair(&next[slot_idx], conflicts) else {
            continue;
        };

        // Prefer moving the second product of the pair; fall back to the
        // first. If neither fits anywhere the conflict stays in place and
        // remains visible through the caller's conflict list.
        if let Some(target) = relocation_target(&next, slot_idx, second, gap) {
            let product = next[slot_idx].products.remove(second);
            next[target].products.push(product);
            changed = true;
        } else if let Some(target) = relocation_target(&next, slot_idx, first, gap) {
            let product = next[slot_idx].products.remove(first);
            next[target].products.push(product);
            changed = true;
        }
    }

    changed.then_some(next)
}

/// Indices of the first product pair in the slot that a known conflict
/// references, plus the gap the conflict demands.
fn first_conflicting_pair(
    slot: &CandidateSlot,
    conflicts: &[Conflict],
) -> Option<(usize, usize, u32)> {
    for i in 0..slot.products.len() {
        for j in (i + 1)..slot.products.len() {
            let conflict = conflicts
                .iter()
                .find(|c| c.involves(&slot.products[i].id, &slot.products[j].id));
            if let Some(conflict) = conflict {
                let gap = if conflict.time_gap_minutes == 0 {
                    DEFAULT_RELOCATION_GAP
                } else {
                    conflict.time_gap_minutes
                };
                return Some((i, j, gap));
            }
        }
    }
    None
}

/// Best alternative slot for the product at `product_idx` of `from`: far
/// enough away on the clock, preferring slots that also satisfy the
/// product's own food requirement. `None` when no slot qualifies.
fn relocation_target(
    slots: &[CandidateSlot],
    from: usize,
    product_idx: usize,
    min_gap: u32,
) -> Option<usize> {
    let product = &slots[from].products[product_idx];
    let origin = slots[from].minutes;

    let mut candidates: Vec<usize> = (0..slots.len())
        .filter(|&idx| idx != from && clock_gap(slots[idx].minutes, origin) >= min_gap)
        .collect();
    candidates.sort_by_key(|&idx| !matches_food_requirement(product, &slots[idx]));
    candidates.first().copied()
}

fn matches_food_requirement(product: &Product, slot: &CandidateSlot) -> bool {
    match product.optimal_timing {
        TimingTag::WithFoodMorning => slot.is_food,
        TimingTag::EmptyStomachMorning => slot.is_empty_stomach,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Unit;
    use crate::detector::detect_conflicts;
    use crate::rules::RuleTable;
    use crate::scheduler::slots::initialize_slots;
    use crate::scheduler::ScheduleConstraints;

    fn slot_of<'a>(slots: &'a [CandidateSlot], product_id: &str) -> Option<&'a CandidateSlot> {
        slots
            .iter()
            .find(|s| s.products.iter().any(|p| p.id == product_id))
    }

    #[test]
    fn pass_relocates_one_side_of_a_conflicting_pair() {
        let iron = Product::adhoc("Iron").with_ingredient("iron", 65.0, Unit::Mg);
        let tea = Product::adhoc("Tea").with_ingredient("tannin", 150.0, Unit::Mg);
        let conflicts = detect_conflicts(
            &[iron.clone(), tea.clone()],
            crate::catalog::Catalog::builtin(),
            RuleTable::builtin(),
        )
        .expect("detection runs");
        assert_eq!(conflicts.len(), 1);

        let mut slots = initialize_slots(&ScheduleConstraints::default()).expect("slots");
        slots[1].products.push(iron.clone());
        slots[1].products.push(tea.clone());

        let resolved = resolution_pass(&slots, &conflicts).expect("pass changes placement");
        let iron_slot = slot_of(&resolved, &iron.id).expect("iron placed");
        let tea_slot = slot_of(&resolved, &tea.id).expect("tea placed");
        assert!(clock_gap(iron_slot.minutes, tea_slot.minutes) >= 120);
    }

    #[test]
    fn pass_without_conflicts_is_a_fixed_point() {
        let d3 = Product::adhoc("D3").with_ingredient("vit-d3", 25.0, Unit::Mcg);
        let mut slots = initialize_slots(&ScheduleConstraints::default()).expect("slots");
        slots[1].products.push(d3);
        assert!(resolution_pass(&slots, &[]).is_none());
    }
}
