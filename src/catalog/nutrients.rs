use crate::catalog::{Nutrient, NutrientCategory};

fn nutrient(id: &str, name: &str, common_name: &str, category: NutrientCategory, aliases: &[&str]) -> Nutrient {
    Nutrient {
        id: id.to_string(),
        name: name.to_string(),
        common_name: common_name.to_string(),
        category,
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
    }
}

pub fn builtin_nutrients() -> Vec<Nutrient> {
    use NutrientCategory::*;
    vec![
        // Fat-soluble vitamins
        nutrient("vit-a", "Vitamin A (Retinol)", "Vitamin A", FatSolubleVitamin, &["Vitamin A", "Retinol", "VA"]),
        nutrient("vit-d2", "Vitamin D2 (Ergocalciferol)", "Vitamin D", FatSolubleVitamin, &["Vitamin D2", "Ergocalciferol"]),
        nutrient("vit-d3", "Vitamin D3 (Cholecalciferol)", "Vitamin D", FatSolubleVitamin, &["Vitamin D3", "Cholecalciferol", "VD3"]),
        nutrient("vit-e", "Vitamin E (Tocopherol)", "Vitamin E", FatSolubleVitamin, &["Vitamin E", "Tocopherol", "VE"]),
        nutrient("vit-k1", "Vitamin K1 (Phylloquinone)", "Vitamin K", FatSolubleVitamin, &["Vitamin K1", "Phylloquinone"]),
        nutrient("vit-k2", "Vitamin K2 (Menaquinone)", "Vitamin K", FatSolubleVitamin, &["Vitamin K2", "Menaquinone", "MK-7"]),
        // Water-soluble vitamins
        nutrient("vit-c", "Vitamin C (Ascorbic Acid)", "Vitamin C", WaterSolubleVitamin, &["Vitamin C", "Ascorbic Acid", "VC"]),
        nutrient("vit-b1", "Vitamin B1 (Thiamine)", "Vitamin B1", WaterSolubleVitamin, &["Vitamin B1", "Thiamine", "VB1"]),
        nutrient("vit-b2", "Vitamin B2 (Riboflavin)", "Vitamin B2", WaterSolubleVitamin, &["Vitamin B2", "Riboflavin", "VB2"]),
        nutrient("vit-b3", "Vitamin B3 (Niacin)", "Vitamin B3", WaterSolubleVitamin, &["Vitamin B3", "Niacin", "VB3"]),
        nutrient("vit-b5", "Vitamin B5 (Pantothenic Acid)", "Vitamin B5", WaterSolubleVitamin, &["Vitamin B5", "Pantothenic Acid", "VB5"]),
        nutrient("vit-b6", "Vitamin B6 (Pyridoxine)", "Vitamin B6", WaterSolubleVitamin, &["Vitamin B6", "Pyridoxine", "VB6"]),
        nutrient("vit-b7", "Vitamin B7 (Biotin)", "Biotin", WaterSolubleVitamin, &["Vitamin B7", "Biotin", "VB7"]),
        nutrient("vit-b9", "Vitamin B9 (Folate)", "Folate", WaterSolubleVitamin, &["Vitamin B9", "Folic Acid", "Folate"]),
        nutrient("vit-b12", "Vitamin B12 (Cobalamin)", "Vitamin B12", WaterSolubleVitamin, &["Vitamin B12", "Cobalamin", "VB12"]),
        // Macro minerals
        nutrient("calcium", "Calcium", "Calcium", MacroMineral, &["Calcium", "Ca"]),
        nutrient("magnesium", "Magnesium", "Magnesium", MacroMineral, &["Magnesium", "Mg"]),
        nutrient("potassium", "Potassium", "Potassium", MacroMineral, &["Potassium", "K"]),
        nutrient("sodium", "Sodium", "Sodium", MacroMineral, &["Sodium", "Na"]),
        nutrient("phosphorus", "Phosphorus", "Phosphorus", MacroMineral, &["Phosphorus", "P"]),
        // Trace minerals
        nutrient("iron", "Iron", "Iron", TraceMineral, &["Iron", "Fe"]),
        nutrient("zinc", "Zinc", "Zinc", TraceMineral, &["Zinc", "Zn"]),
        nutrient("copper", "Copper", "Copper", TraceMineral, &["Copper", "Cu"]),
        nutrient("selenium", "Selenium", "Selenium", TraceMineral, &["Selenium", "Se"]),
        nutrient("iodine", "Iodine", "Iodine", TraceMineral, &["Iodine"]),
        nutrient("chromium", "Chromium", "Chromium", TraceMineral, &["Chromium", "Cr"]),
        nutrient("manganese", "Manganese", "Manganese", TraceMineral, &["Manganese", "Mn"]),
        nutrient("molybdenum", "Molybdenum", "Molybdenum", TraceMineral, &["Molybdenum", "Mo"]),
        // Amino acids
        nutrient("leucine", "Leucine", "Leucine", Bcaa, &["Leucine", "L-Leucine"]),
        nutrient("isoleucine", "Isoleucine", "Isoleucine", Bcaa, &["Isoleucine", "L-Isoleucine"]),
        nutrient("valine", "Valine", "Valine", Bcaa, &["Valine", "L-Valine"]),
        nutrient("lysine", "Lysine", "Lysine", EssentialAmino, &["Lysine", "L-Lysine"]),
        nutrient("methionine", "Methionine", "Methionine", EssentialAmino, &["Methionine", "L-Methionine"]),
        nutrient("phenylalanine", "Phenylalanine", "Phenylalanine", EssentialAmino, &["Phenylalanine", "L-Phenylalanine"]),
        nutrient("threonine", "Threonine", "Threonine", EssentialAmino, &["Threonine", "L-Threonine"]),
        nutrient("tryptophan", "Tryptophan", "Tryptophan", EssentialAmino, &["Tryptophan", "L-Tryptophan"]),
        nutrient("protein", "Protein (Complete)", "Protein", EssentialAmino, &["Protein", "Whey Protein"]),
        // Omega fatty acids
        nutrient("epa", "EPA (Eicosapentaenoic Acid)", "EPA", Omega3, &["EPA", "Eicosapentaenoic Acid", "Fish Oil"]),
        nutrient("dha", "DHA (Docosahexaenoic Acid)", "DHA", Omega3, &["DHA", "Docosahexaenoic Acid"]),
        nutrient("ala", "ALA (Alpha-Linolenic Acid)", "ALA", Omega3, &["ALA", "Alpha-Linolenic Acid"]),
        // Coenzymes and antioxidants
        nutrient("coq10", "Coenzyme Q10", "CoQ10", Coenzyme, &["CoQ10", "Ubiquinone"]),
        nutrient("glutathione", "Glutathione", "Glutathione", Antioxidant, &["Glutathione", "GSH"]),
        nutrient("resveratrol", "Resveratrol", "Resveratrol", Antioxidant, &["Resveratrol"]),
        nutrient("astaxanthin", "Astaxanthin", "Astaxanthin", Antioxidant, &["Astaxanthin"]),
        nutrient("caffeine", "Caffeine", "Caffeine", Antioxidant, &["Caffeine"]),
        nutrient("tannin", "Tannic Acid / Tea Polyphenols", "Tea Polyphenols", Antioxidant, &["Tannin", "Tea Polyphenols"]),
        // Herbal extracts
        nutrient("curcumin", "Curcumin", "Curcumin", HerbalExtract, &["Curcumin", "Turmeric"]),
        nutrient("green-tea", "Green Tea Extract", "Green Tea", HerbalExtract, &["Green Tea Extract", "EGCG"]),
        nutrient("ginseng", "Panax Ginseng Extract", "Ginseng", HerbalExtract, &["Ginseng", "Panax Ginseng"]),
        nutrient("ashwagandha", "Ashwagandha", "Ashwagandha", HerbalExtract, &["Ashwagandha"]),
        nutrient("rhodiola", "Rhodiola Rosea", "Rhodiola", HerbalExtract, &["Rhodiola"]),
        // Probiotic strains
        nutrient("lacto-acidophilus", "Lactobacillus Acidophilus", "L. Acidophilus", ProbioticStrain, &["Lactobacillus Acidophilus"]),
        nutrient("bifido-bifidum", "Bifidobacterium Bifidum", "B. Bifidum", ProbioticStrain, &["Bifidobacterium Bifidum"]),
    ]
}
