use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::catalog::{convert_amount, Catalog, Product};
use crate::rules::{DosageCondition, Interaction, RuleTable, Severity, SynergyRule};

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("stack is empty; nothing to analyze")]
    EmptyStack,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conflict {
    pub product_a_id: String,
    pub product_a_name: String,
    pub product_b_id: String,
    pub product_b_name: String,
    pub nutrient_a: String,
    pub nutrient_b: String,
    pub severity: Severity,
    pub interaction: Interaction,
    pub explanation: String,
    pub mechanism: String,
    pub time_gap_minutes: u32,
}

impl Conflict {
    /// Unique per (product pair, nutrient pair); two rules matching the same
    /// product pair yield two distinct keys.
    pub fn key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.product_a_id, self.product_b_id, self.nutrient_a, self.nutrient_b
        )
    }

    pub fn involves(&self, product_a: &str, product_b: &str) -> bool {
        (self.product_a_id == product_a && self.product_b_id == product_b)
            || (self.product_a_id == product_b && self.product_b_id == product_a)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Synergy {
    pub product_a_id: String,
    pub product_a_name: String,
    pub product_b_id: String,
    pub product_b_name: String,
    pub nutrient_a: String,
    pub nutrient_b: String,
    pub benefit: String,
    pub mechanism: String,
}

/// Pairwise scan of the stack against the rule table. Pure and deterministic:
/// no I/O, output order follows input order. Conflicts are returned unsorted;
/// consumers sort by severity for display.
pub fn detect_conflicts(
    stack: &[Product],
    catalog: &Catalog,
    rules: &RuleTable,
) -> Result<Vec<Conflict>, DetectError> {
    if stack.is_empty() {
        return Err(DetectError::EmptyStack);
    }

    let nutrient_sets: Vec<BTreeSet<&str>> = stack
        .iter()
        .map(|product| valid_nutrient_ids(product, catalog))
        .collect();

    let mut conflicts = Vec::new();
    for i in 0..stack.len() {
        for j in (i + 1)..stack.len() {
            let (product_a, product_b) = (&stack[i], &stack[j]);
            for rule in &rules.conflicts {
                if !rule.matches(&nutrient_sets[i], &nutrient_sets[j]) {
                    continue;
                }
                if let Some(condition) = &rule.condition {
                    if !condition_holds(condition, product_a, product_b) {
                        continue;
                    }
                }
                conflicts.push(Conflict {
                    product_a_id: product_a.id.clone(),
                    product_a_name: product_a.name.clone(),
                    product_b_id: product_b.id.clone(),
                    product_b_name: product_b.name.clone(),
                    nutrient_a: rule.nutrient_a.clone(),
                    nutrient_b: rule.nutrient_b.clone(),
                    severity: rule.severity,
                    interaction: rule.interaction,
                    explanation: rule.explanation.clone(),
                    mechanism: rule.mechanism.clone(),
                    time_gap_minutes: rule.min_gap_minutes,
                });
            }
        }
    }
    Ok(conflicts)
}

/// Same scan shape as `detect_conflicts`, over the synergy table.
pub fn detect_synergies(
    stack: &[Product],
    catalog: &Catalog,
    rules: &RuleTable,
) -> Result<Vec<Synergy>, DetectError> {
    if stack.is_empty() {
        return Err(DetectError::EmptyStack);
    }

    let nutrient_sets: Vec<BTreeSet<&str>> = stack
        .iter()
        .map(|product| valid_nutrient_ids(product, catalog))
        .collect();

    let mut synergies = Vec::new();
    for i in 0..stack.len() {
        for j in (i + 1)..stack.len() {
            for rule in &rules.synergies {
                if rule.matches(&nutrient_sets[i], &nutrient_sets[j]) {
                    synergies.push(synergy_record(rule, &stack[i], &stack[j]));
                }
            }
        }
    }
    Ok(synergies)
}

fn synergy_record(rule: &SynergyRule, product_a: &Product, product_b: &Product) -> Synergy {
    Synergy {
        product_a_id: product_a.id.clone(),
        product_a_name: product_a.name.clone(),
        product_b_id: product_b.id.clone(),
        product_b_name: product_b.name.clone(),
        nutrient_a: rule.nutrient_a.clone(),
        nutrient_b: rule.nutrient_b.clone(),
        benefit: rule.benefit.clone(),
        mechanism: rule.mechanism.clone(),
    }
}

/// Nutrient ids of a product, dropping malformed entries (empty or dangling
/// references) with a warning instead of aborting the scan.
fn valid_nutrient_ids<'a>(product: &'a Product, catalog: &Catalog) -> BTreeSet<&'a str> {
    let mut ids = BTreeSet::new();
    for ingredient in &product.ingredients {
        let id = ingredient.nutrient_id.as_str();
        if id.is_empty() || catalog.nutrient(id).is_none() {
            warn!(
                product = %product.id,
                nutrient = %id,
                "skipping ingredient with unresolved nutrient reference"
            );
            continue;
        }
        ids.insert(id);
    }
    ids
}

/// Evaluate a dosage gate against the specific ingredient entry that carries
/// the conditioning nutrient, checking product A's entry first. Entries whose
/// unit cannot be normalized to the condition's unit skip the rule.
fn condition_holds(condition: &DosageCondition, product_a: &Product, product_b: &Product) -> bool {
    let entry = product_a
        .ingredients
        .iter()
        .find(|i| i.nutrient_id == condition.nutrient_id)
        .or_else(|| {
            product_b
                .ingredients
                .iter()
                .find(|i| i.nutrient_id == condition.nutrient_id)
        });
    let Some(entry) = entry else {
        return false;
    };
    match convert_amount(&condition.nutrient_id, entry.amount, entry.unit, condition.unit) {
        Some(normalized) => normalized >= condition.threshold,
        None => {
            warn!(
                nutrient = %condition.nutrient_id,
                from = %entry.unit,
                to = %condition.unit,
                "no unit conversion defined for dosage condition; skipping rule"
            );
            false
        }
    }
}

/// Stable ordering for display: severity descending, then conflict key.
pub fn sorted_by_severity(conflicts: &[Conflict]) -> Vec<Conflict> {
    let mut out = conflicts.to_vec();
    out.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.key().cmp(&b.key())));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Unit;

    fn catalog() -> &'static Catalog {
        Catalog::builtin()
    }

    fn rules() -> &'static RuleTable {
        RuleTable::builtin()
    }

    #[test]
    fn empty_stack_is_a_typed_error() {
        assert!(matches!(
            detect_conflicts(&[], catalog(), rules()),
            Err(DetectError::EmptyStack)
        ));
    }

    #[test]
    fn iron_calcium_pair_yields_one_critical_conflict() {
        let calcium = Product::adhoc("Calcium D3")
            .with_ingredient("calcium", 600.0, Unit::Mg)
            .with_ingredient("vit-d3", 5.0, Unit::Mcg);
        let iron = Product::adhoc("Iron C")
            .with_ingredient("iron", 14.0, Unit::Mg)
            .with_ingredient("vit-c", 60.0, Unit::Mg);

        let conflicts =
            detect_conflicts(&[calcium, iron], catalog(), rules()).expect("detection runs");
        assert_eq!(conflicts.len(), 1);
        let conflict = &conflicts[0];
        assert_eq!(conflict.severity, Severity::Critical);
        assert_eq!(conflict.time_gap_minutes, 240);
        assert!(conflict.involves("adhoc-calcium-d3", "adhoc-iron-c"));
    }

    #[test]
    fn detection_is_symmetric_in_input_order() {
        let a = Product::adhoc("A").with_ingredient("iron", 20.0, Unit::Mg);
        let b = Product::adhoc("B").with_ingredient("calcium", 500.0, Unit::Mg);

        let forward = detect_conflicts(&[a.clone(), b.clone()], catalog(), rules()).expect("forward");
        let reverse = detect_conflicts(&[b, a], catalog(), rules()).expect("reverse");
        let forward_keys: BTreeSet<String> = forward
            .iter()
            .map(|c| {
                let mut ids = [c.product_a_id.as_str(), c.product_b_id.as_str()];
                ids.sort();
                format!("{}:{}:{}:{}", ids[0], ids[1], c.nutrient_a, c.nutrient_b)
            })
            .collect();
        let reverse_keys: BTreeSet<String> = reverse
            .iter()
            .map(|c| {
                let mut ids = [c.product_a_id.as_str(), c.product_b_id.as_str()];
                ids.sort();
                format!("{}:{}:{}:{}", ids[0], ids[1], c.nutrient_a, c.nutrient_b)
            })
            .collect();
        assert_eq!(forward_keys, reverse_keys);
    }

    #[test]
    fn every_rule_is_reachable_with_a_satisfying_pair() {
        for rule in &rules().conflicts {
            let mut a = Product::adhoc("Rule Probe A");
            let mut b = Product::adhoc("Rule Probe B");
            a = a.with_ingredient(&rule.nutrient_a, 5000.0, Unit::Mg);
            b = b.with_ingredient(&rule.nutrient_b, 5000.0, Unit::Mg);
            if let Some(condition) = &rule.condition {
                // Rebuild the conditioned side at exactly the threshold.
                if condition.nutrient_id == rule.nutrient_a {
                    a = Product::adhoc("Rule Probe A").with_ingredient(
                        &rule.nutrient_a,
                        condition.threshold,
                        condition.unit,
                    );
                } else {
                    b = Product::adhoc("Rule Probe B").with_ingredient(
                        &rule.nutrient_b,
                        condition.threshold,
                        condition.unit,
                    );
                }
            }
            let conflicts = detect_conflicts(&[a, b], catalog(), rules()).expect("detection runs");
            let matching: Vec<_> = conflicts
                .iter()
                .filter(|c| c.nutrient_a == rule.nutrient_a && c.nutrient_b == rule.nutrient_b)
                .collect();
            assert_eq!(
                matching.len(),
                1,
                "rule {}x{} should fire exactly once",
                rule.nutrient_a,
                rule.nutrient_b
            );
        }
    }

    #[test]
    fn unrelated_nutrients_produce_no_conflicts() {
        let a = Product::adhoc("Biotin").with_ingredient("vit-b7", 5000.0, Unit::Mcg);
        let b = Product::adhoc("Selenium").with_ingredient("selenium", 200.0, Unit::Mcg);
        let conflicts = detect_conflicts(&[a, b], catalog(), rules()).expect("detection runs");
        assert!(conflicts.is_empty());
    }

    #[test]
    fn dosage_gate_respects_threshold_and_unit_conversion() {
        let fish_oil = Product::adhoc("Fish Oil").with_ingredient("epa", 300.0, Unit::Mg);

        let low_e = Product::adhoc("Vit E Low").with_ingredient("vit-e", 200.0, Unit::Iu);
        let conflicts = detect_conflicts(&[low_e, fish_oil.clone()], catalog(), rules())
            .expect("detection runs");
        assert!(conflicts.iter().all(|c| c.nutrient_a != "vit-e"));

        let high_e = Product::adhoc("Vit E High").with_ingredient("vit-e", 400.0, Unit::Iu);
        let conflicts = detect_conflicts(&[high_e, fish_oil.clone()], catalog(), rules())
            .expect("detection runs");
        assert!(conflicts.iter().any(|c| c.nutrient_a == "vit-e" && c.nutrient_b == "epa"));

        // 300 mg vitamin E is above the 400 IU (~268 mg) threshold once
        // normalized across units.
        let high_e_mg = Product::adhoc("Vit E Mg").with_ingredient("vit-e", 300.0, Unit::Mg);
        let conflicts =
            detect_conflicts(&[high_e_mg, fish_oil], catalog(), rules()).expect("detection runs");
        assert!(conflicts.iter().any(|c| c.nutrient_a == "vit-e" && c.nutrient_b == "epa"));
    }

    #[test]
    fn malformed_ingredient_references_are_skipped() {
        let broken = Product::adhoc("Broken")
            .with_ingredient("", 10.0, Unit::Mg)
            .with_ingredient("not-a-nutrient", 10.0, Unit::Mg)
            .with_ingredient("iron", 20.0, Unit::Mg);
        let calcium = Product::adhoc("Calcium").with_ingredient("calcium", 500.0, Unit::Mg);
        let conflicts =
            detect_conflicts(&[broken, calcium], catalog(), rules()).expect("detection runs");
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].nutrient_a, "iron");
    }

    #[test]
    fn multiple_rules_for_one_pair_emit_distinct_conflicts() {
        let a = Product::adhoc("Iron Zinc")
            .with_ingredient("iron", 30.0, Unit::Mg)
            .with_ingredient("zinc", 30.0, Unit::Mg);
        let b = Product::adhoc("Cal Mag")
            .with_ingredient("calcium", 500.0, Unit::Mg)
            .with_ingredient("magnesium", 200.0, Unit::Mg);
        let conflicts = detect_conflicts(&[a, b], catalog(), rules()).expect("detection runs");
        // iron x calcium and calcium x zinc fire across the pair; iron x zinc
        // and calcium x magnesium sit within a single product and must not.
        let keys: BTreeSet<String> = conflicts.iter().map(Conflict::key).collect();
        assert_eq!(keys.len(), conflicts.len(), "conflict keys are unique");
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts
            .iter()
            .all(|c| c.product_a_id != c.product_b_id));
    }

    #[test]
    fn synergies_detected_for_vitamin_d_and_calcium() {
        let d3 = Product::adhoc("D3").with_ingredient("vit-d3", 25.0, Unit::Mcg);
        let calcium = Product::adhoc("Cal").with_ingredient("calcium", 500.0, Unit::Mg);
        let synergies =
            detect_synergies(&[d3, calcium], catalog(), rules()).expect("detection runs");
        assert_eq!(synergies.len(), 1);
        assert_eq!(synergies[0].nutrient_a, "vit-d3");
    }
}
