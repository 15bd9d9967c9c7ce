pub mod interactions;
pub mod synergies;

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::catalog::Unit;

/// Ordered ascending so `Critical` compares greatest; consumers sort
/// descending for display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Edge weight used by graph-style consumers.
    pub fn weight(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 3,
            Self::High => 4,
            Self::Critical => 5,
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Interaction {
    AbsorptionCompetition,
    AbsorptionInhibition,
    AdverseInteraction,
    OxidationRisk,
    SynergyReduced,
    AbsorptionEnhanced,
}

impl Display for Interaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::AbsorptionCompetition => "absorption competition",
            Self::AbsorptionInhibition => "absorption inhibition",
            Self::AdverseInteraction => "adverse interaction",
            Self::OxidationRisk => "oxidation risk",
            Self::SynergyReduced => "synergy reduced",
            Self::AbsorptionEnhanced => "absorption enhanced",
        };
        write!(f, "{label}")
    }
}

/// Gate on one of the pair's nutrients: the rule applies only when the
/// triggering ingredient entry reaches `threshold` in `unit` (after unit
/// normalization).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DosageCondition {
    pub nutrient_id: String,
    pub threshold: f64,
    pub unit: Unit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConflictRule {
    pub nutrient_a: String,
    pub nutrient_b: String,
    pub severity: Severity,
    pub interaction: Interaction,
    pub explanation: String,
    pub mechanism: String,
    /// Zero means the conflict is dosage-triggered rather than
    /// timing-triggered.
    pub min_gap_minutes: u32,
    pub condition: Option<DosageCondition>,
}

impl ConflictRule {
    /// Symmetric match: the rule fires regardless of which product carries
    /// which nutrient, but never within a single product.
    pub fn matches(&self, a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> bool {
        (a.contains(self.nutrient_a.as_str()) && b.contains(self.nutrient_b.as_str()))
            || (a.contains(self.nutrient_b.as_str()) && b.contains(self.nutrient_a.as_str()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynergyRule {
    pub nutrient_a: String,
    pub nutrient_b: String,
    pub benefit: String,
    pub mechanism: String,
}

impl SynergyRule {
    pub fn matches(&self, a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> bool {
        (a.contains(self.nutrient_a.as_str()) && b.contains(self.nutrient_b.as_str()))
            || (a.contains(self.nutrient_b.as_str()) && b.contains(self.nutrient_a.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct RuleTable {
    pub conflicts: Vec<ConflictRule>,
    pub synergies: Vec<SynergyRule>,
}

static BUILTIN: Lazy<RuleTable> = Lazy::new(|| RuleTable {
    conflicts: interactions::builtin_conflict_rules(),
    synergies: synergies::builtin_synergy_rules(),
});

impl RuleTable {
    pub fn builtin() -> &'static RuleTable {
        &BUILTIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_critical_highest() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        let mut severities = vec![Severity::Medium, Severity::Critical, Severity::Low];
        severities.sort();
        assert_eq!(severities.last(), Some(&Severity::Critical));
    }

    #[test]
    fn rule_matching_is_symmetric_and_cross_product() {
        let rule = &RuleTable::builtin().conflicts[0];
        let with_a: BTreeSet<&str> = [rule.nutrient_a.as_str()].into();
        let with_b: BTreeSet<&str> = [rule.nutrient_b.as_str()].into();
        let empty: BTreeSet<&str> = BTreeSet::new();
        assert!(rule.matches(&with_a, &with_b));
        assert!(rule.matches(&with_b, &with_a));
        assert!(!rule.matches(&with_a, &empty));
        assert!(!rule.matches(&empty, &empty));
    }

    #[test]
    fn builtin_rules_reference_catalog_nutrients() {
        let catalog = crate::catalog::Catalog::builtin();
        for rule in &RuleTable::builtin().conflicts {
            assert!(catalog.nutrient(&rule.nutrient_a).is_some(), "{}", rule.nutrient_a);
            assert!(catalog.nutrient(&rule.nutrient_b).is_some(), "{}", rule.nutrient_b);
            if let Some(condition) = &rule.condition {
                assert!(
                    condition.nutrient_id == rule.nutrient_a
                        || condition.nutrient_id == rule.nutrient_b
                );
            }
        }
        for rule in &RuleTable::builtin().synergies {
            assert!(catalog.nutrient(&rule.nutrient_a).is_some(), "{}", rule.nutrient_a);
            assert!(catalog.nutrient(&rule.nutrient_b).is_some(), "{}", rule.nutrient_b);
        }
    }
}
