use crate::catalog::Unit;
use crate::rules::{ConflictRule, DosageCondition, Interaction, Severity};

fn rule(
    nutrient_a: &str,
    nutrient_b: &str,
    severity: Severity,
    interaction: Interaction,
    min_gap_minutes: u32,
    explanation: &str,
    mechanism: &str,
) -> ConflictRule {
    ConflictRule {
        nutrient_a: nutrient_a.to_string(),
        nutrient_b: nutrient_b.to_string(),
        severity,
        interaction,
        explanation: explanation.to_string(),
        mechanism: mechanism.to_string(),
        min_gap_minutes,
        condition: None,
    }
}

fn gated(rule: ConflictRule, nutrient_id: &str, threshold: f64, unit: Unit) -> ConflictRule {
    ConflictRule {
        condition: Some(DosageCondition {
            nutrient_id: nutrient_id.to_string(),
            threshold,
            unit,
        }),
        ..rule
    }
}

pub fn builtin_conflict_rules() -> Vec<ConflictRule> {
    use Interaction::*;
    use Severity::*;
    vec![
        rule(
            "iron",
            "calcium",
            Critical,
            AbsorptionCompetition,
            240,
            "Calcium strongly suppresses iron absorption (50-70% reduction); keep at least 4 hours apart.",
            "Calcium and iron compete for binding at the intestinal DMT1 transporter.",
        ),
        rule(
            "iron",
            "tannin",
            Critical,
            AbsorptionInhibition,
            120,
            "Tea polyphenols (tannins) bind iron into insoluble complexes, cutting absorption by 60-90%.",
            "Tannic acid chelates iron ions into non-absorbable complexes.",
        ),
        rule(
            "iron",
            "caffeine",
            Critical,
            AbsorptionInhibition,
            120,
            "Caffeine markedly reduces iron absorption (roughly 40-60%).",
            "Polyphenols in caffeinated drinks bind dietary iron.",
        ),
        rule(
            "calcium",
            "magnesium",
            High,
            AbsorptionCompetition,
            120,
            "High-dose calcium competitively inhibits magnesium uptake.",
            "Both share intestinal transport channels.",
        ),
        rule(
            "calcium",
            "zinc",
            High,
            AbsorptionCompetition,
            120,
            "High-dose calcium lowers zinc absorption efficiency.",
            "Competitive inhibition of zinc transport proteins.",
        ),
        rule(
            "iron",
            "zinc",
            High,
            AbsorptionCompetition,
            120,
            "Iron and zinc compete with each other for uptake at high doses.",
            "Both use the shared divalent metal ion transport system.",
        ),
        gated(
            rule(
                "vit-e",
                "epa",
                High,
                AdverseInteraction,
                0,
                "High-dose vitamin E (400 IU or more) taken with fish oil raises bleeding risk.",
                "Both have anticoagulant effects; stacked they increase bleeding tendency.",
            ),
            "vit-e",
            400.0,
            Unit::Iu,
        ),
        gated(
            rule(
                "vit-e",
                "dha",
                High,
                AdverseInteraction,
                0,
                "High-dose vitamin E (400 IU or more) taken with fish oil raises bleeding risk.",
                "Both have anticoagulant effects; stacked they increase bleeding tendency.",
            ),
            "vit-e",
            400.0,
            Unit::Iu,
        ),
        gated(
            rule(
                "vit-c",
                "copper",
                Medium,
                AbsorptionInhibition,
                60,
                "High-dose vitamin C (1000 mg or more) can reduce copper absorption.",
                "Competitive inhibition of copper ion uptake.",
            ),
            "vit-c",
            1000.0,
            Unit::Mg,
        ),
        rule(
            "zinc",
            "copper",
            Medium,
            AbsorptionCompetition,
            120,
            "High-dose zinc (over 50 mg) strongly suppresses copper absorption; chronic use can cause copper deficiency.",
            "Zinc induces metallothionein synthesis, which preferentially binds copper.",
        ),
        gated(
            rule(
                "vit-c",
                "epa",
                Medium,
                OxidationRisk,
                120,
                "High-dose vitamin C (1000 mg or more) taken with fish oil may accelerate oxidation of the oil and blunt its effect.",
                "Vitamin C can promote lipid peroxidation under some conditions.",
            ),
            "vit-c",
            1000.0,
            Unit::Mg,
        ),
        gated(
            rule(
                "vit-c",
                "dha",
                Medium,
                OxidationRisk,
                120,
                "High-dose vitamin C (1000 mg or more) taken with fish oil may accelerate oxidation of the oil and blunt its effect.",
                "Vitamin C can promote lipid peroxidation under some conditions.",
            ),
            "vit-c",
            1000.0,
            Unit::Mg,
        ),
        rule(
            "calcium",
            "protein",
            Medium,
            AbsorptionCompetition,
            90,
            "High calcium intake can interfere with protein absorption; separate by 1-2 hours.",
            "Calcium can form insoluble complexes with protein.",
        ),
        rule(
            "vit-e",
            "vit-c",
            Low,
            SynergyReduced,
            60,
            "Vitamins E and C are synergistic, but large doses taken together can oxidize each other; take them separately.",
            "Mutual redox interaction can destabilize both vitamins.",
        ),
        rule(
            "iron",
            "protein",
            Low,
            AbsorptionEnhanced,
            0,
            "Protein enhances iron absorption; beneficial, but watch for iron overload.",
            "Amino acids from protein assist iron transport.",
        ),
    ]
}
