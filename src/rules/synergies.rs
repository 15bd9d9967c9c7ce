use crate::rules::SynergyRule;

fn synergy(nutrient_a: &str, nutrient_b: &str, benefit: &str, mechanism: &str) -> SynergyRule {
    SynergyRule {
        nutrient_a: nutrient_a.to_string(),
        nutrient_b: nutrient_b.to_string(),
        benefit: benefit.to_string(),
        mechanism: mechanism.to_string(),
    }
}

pub fn builtin_synergy_rules() -> Vec<SynergyRule> {
    vec![
        synergy(
            "vit-d3",
            "calcium",
            "Vitamin D drives intestinal calcium absorption.",
            "Calcitriol upregulates calcium-binding transport proteins in the gut.",
        ),
        synergy(
            "vit-c",
            "iron",
            "Vitamin C boosts non-heme iron absorption.",
            "Ascorbate reduces ferric iron to the better-absorbed ferrous form.",
        ),
        synergy(
            "vit-k2",
            "vit-d3",
            "Vitamin K2 directs calcium mobilized by vitamin D into bone.",
            "K2 activates osteocalcin, which binds calcium into the bone matrix.",
        ),
        synergy(
            "curcumin",
            "epa",
            "Curcumin and omega-3s reinforce each other's anti-inflammatory effect.",
            "Both downregulate pro-inflammatory eicosanoid signalling.",
        ),
    ]
}
