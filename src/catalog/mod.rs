pub mod nutrients;
pub mod products;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NutrientCategory {
    FatSolubleVitamin,
    WaterSolubleVitamin,
    MacroMineral,
    TraceMineral,
    EssentialAmino,
    Bcaa,
    Omega3,
    Omega6,
    ProbioticStrain,
    HerbalExtract,
    Antioxidant,
    Coenzyme,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Nutrient {
    pub id: String,
    pub name: String,
    pub common_name: String,
    pub category: NutrientCategory,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Mg,
    Mcg,
    G,
    Iu,
}

impl Display for Unit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Mg => "mg",
            Self::Mcg => "mcg",
            Self::G => "g",
            Self::Iu => "IU",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Error)]
#[error("unknown unit: {0}")]
pub struct UnitParseError(pub String);

impl FromStr for Unit {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mg" => Ok(Self::Mg),
            "mcg" | "ug" | "µg" => Ok(Self::Mcg),
            "g" => Ok(Self::G),
            "iu" => Ok(Self::Iu),
            _ => Err(UnitParseError(s.to_string())),
        }
    }
}

/// Milligrams per IU for nutrients commonly labelled in international units.
/// Pairs with no entry here have no defined IU conversion and dosage checks
/// against them are skipped rather than guessed.
fn mg_per_iu(nutrient_id: &str) -> Option<f64> {
    match nutrient_id {
        "vit-e" => Some(0.67),
        "vit-d2" | "vit-d3" => Some(0.000_025),
        "vit-a" => Some(0.000_3),
        _ => None,
    }
}

fn mg_per_mass_unit(unit: Unit) -> Option<f64> {
    match unit {
        Unit::Mg => Some(1.0),
        Unit::Mcg => Some(0.001),
        Unit::G => Some(1000.0),
        Unit::Iu => None,
    }
}

/// Convert an ingredient amount between units for the given nutrient.
/// Returns `None` when no conversion is defined (e.g. IU for a nutrient
/// without a known factor).
pub fn convert_amount(nutrient_id: &str, amount: f64, from: Unit, to: Unit) -> Option<f64> {
    if from == to {
        return Some(amount);
    }
    let in_mg = match from {
        Unit::Iu => amount * mg_per_iu(nutrient_id)?,
        _ => amount * mg_per_mass_unit(from)?,
    };
    match to {
        Unit::Iu => Some(in_mg / mg_per_iu(nutrient_id)?),
        _ => Some(in_mg / mg_per_mass_unit(to)?),
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Multivitamin,
    SingleVitamin,
    Mineral,
    Omega,
    Protein,
    Probiotic,
    Herbal,
    Sports,
    Beauty,
    Joint,
    Immunity,
    Sleep,
    Energy,
    FoodMeat,
    FoodEgg,
    FoodVegetable,
    FoodOrgan,
    BeverageTea,
    BeverageSoy,
    BeverageJuice,
    BeverageOther,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimingTag {
    EmptyStomachMorning,
    WithFoodMorning,
    Afternoon,
    Evening,
    PreWorkout,
    PostWorkout,
    BeforeBed,
    Anytime,
}

impl Display for TimingTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::EmptyStomachMorning => "empty-stomach morning",
            Self::WithFoodMorning => "morning with food",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::PreWorkout => "pre-workout",
            Self::PostWorkout => "post-workout",
            Self::BeforeBed => "before bed",
            Self::Anytime => "anytime",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Error)]
#[error("unknown timing tag: {0}")]
pub struct TimingTagParseError(pub String);

impl FromStr for TimingTag {
    type Err = TimingTagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "empty_stomach_morning" | "morning_empty_stomach" | "morning_empty" => {
                Ok(Self::EmptyStomachMorning)
            }
            "with_food_morning" | "morning_with_food" | "with_food" | "morning" => {
                Ok(Self::WithFoodMorning)
            }
            "afternoon" => Ok(Self::Afternoon),
            "evening" => Ok(Self::Evening),
            "pre_workout" => Ok(Self::PreWorkout),
            "post_workout" => Ok(Self::PostWorkout),
            "before_bed" | "bedtime" => Ok(Self::BeforeBed),
            "anytime" => Ok(Self::Anytime),
            _ => Err(TimingTagParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub nutrient_id: String,
    pub amount: f64,
    pub unit: Unit,
    #[serde(default)]
    pub percent_dv: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default = "default_product_category")]
    pub category: ProductCategory,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default = "default_dosage_text")]
    pub dosage_per_serving: String,
    #[serde(default = "default_servings_per_day")]
    pub servings_per_day: u32,
    #[serde(default = "default_timing")]
    pub optimal_timing: TimingTag,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl Product {
    /// Ad hoc product with catalog-compatible shape, e.g. one inferred from
    /// free text by the analysis flow.
    pub fn adhoc(name: &str) -> Self {
        Self {
            id: format!("adhoc-{}", slugify(name)),
            name: name.to_string(),
            brand: String::new(),
            category: default_product_category(),
            ingredients: Vec::new(),
            dosage_per_serving: default_dosage_text(),
            servings_per_day: default_servings_per_day(),
            optimal_timing: default_timing(),
            price: None,
            rating: None,
        }
    }

    pub fn with_timing(mut self, timing: TimingTag) -> Self {
        self.optimal_timing = timing;
        self
    }

    pub fn with_ingredient(mut self, nutrient_id: &str, amount: f64, unit: Unit) -> Self {
        self.ingredients.push(Ingredient {
            nutrient_id: nutrient_id.to_string(),
            amount,
            unit,
            percent_dv: None,
        });
        self
    }

    pub fn with_dosage(mut self, dosage: &str) -> Self {
        self.dosage_per_serving = dosage.to_string();
        self
    }

    pub fn nutrient_ids(&self) -> BTreeSet<&str> {
        self.ingredients
            .iter()
            .map(|i| i.nutrient_id.as_str())
            .collect()
    }
}

fn default_product_category() -> ProductCategory {
    ProductCategory::SingleVitamin
}

fn default_dosage_text() -> String {
    "as directed".to_string()
}

fn default_servings_per_day() -> u32 {
    1
}

fn default_timing() -> TimingTag {
    TimingTag::Anytime
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate nutrient id: {0}")]
    DuplicateNutrient(String),
    #[error("duplicate product id: {0}")]
    DuplicateProduct(String),
    #[error("product {product} references unknown nutrient: {nutrient}")]
    DanglingNutrient { product: String, nutrient: String },
    #[error("unknown product id: {0}")]
    UnknownProduct(String),
}

/// Immutable reference data handed to the detector and scheduler. Built-ins
/// cover the retail catalog; tests substitute small synthetic catalogs.
#[derive(Debug, Clone)]
pub struct Catalog {
    nutrients: BTreeMap<String, Nutrient>,
    products: BTreeMap<String, Product>,
}

static BUILTIN: Lazy<Catalog> = Lazy::new(|| {
    Catalog::new(nutrients::builtin_nutrients(), products::builtin_products())
        .expect("built-in catalog is internally consistent")
});

impl Catalog {
    pub fn new(nutrients: Vec<Nutrient>, products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut nutrient_map = BTreeMap::new();
        for nutrient in nutrients {
            if nutrient_map
                .insert(nutrient.id.clone(), nutrient.clone())
                .is_some()
            {
                return Err(CatalogError::DuplicateNutrient(nutrient.id));
            }
        }
        let mut product_map = BTreeMap::new();
        for product in products {
            for ingredient in &product.ingredients {
                if !nutrient_map.contains_key(&ingredient.nutrient_id) {
                    return Err(CatalogError::DanglingNutrient {
                        product: product.id.clone(),
                        nutrient: ingredient.nutrient_id.clone(),
                    });
                }
            }
            if product_map
                .insert(product.id.clone(), product.clone())
                .is_some()
            {
                return Err(CatalogError::DuplicateProduct(product.id));
            }
        }
        Ok(Self {
            nutrients: nutrient_map,
            products: product_map,
        })
    }

    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    pub fn nutrient(&self, id: &str) -> Option<&Nutrient> {
        self.nutrients.get(id)
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    pub fn nutrients(&self) -> impl Iterator<Item = &Nutrient> {
        self.nutrients.values()
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn resolve_products(&self, ids: &[String]) -> Result<Vec<Product>, CatalogError> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let product = self
                .product(id.trim())
                .ok_or_else(|| CatalogError::UnknownProduct(id.clone()))?;
            out.push(product.clone());
        }
        Ok(out)
    }

    /// Best-effort name lookup for free-text supplement mentions: exact id,
    /// then product name/brand substring, then nutrient alias containment.
    pub fn find_product(&self, query: &str) -> Option<&Product> {
        let needle = normalize(query);
        if needle.is_empty() {
            return None;
        }
        if let Some(product) = self.products.get(query.trim()) {
            return Some(product);
        }
        for product in self.products.values() {
            let name = normalize(&product.name);
            let branded = normalize(&format!("{} {}", product.brand, product.name));
            if name.contains(&needle) || needle.contains(&name) || branded.contains(&needle) {
                return Some(product);
            }
        }
        let nutrient_id = self.find_nutrient_id(&needle)?;
        self.products
            .values()
            .find(|p| p.ingredients.iter().any(|i| i.nutrient_id == nutrient_id))
    }

    fn find_nutrient_id(&self, needle: &str) -> Option<String> {
        for nutrient in self.nutrients.values() {
            let mut candidates = vec![
                normalize(&nutrient.name),
                normalize(&nutrient.common_name),
            ];
            candidates.extend(nutrient.aliases.iter().map(|a| normalize(a)));
            // Short chemical-symbol aliases only match exactly, otherwise a
            // query like "pre workout" would hit potassium via "k".
            if candidates
                .iter()
                .any(|c| c.as_str() == needle || (c.len() > 3 && needle.contains(c.as_str())))
            {
                return Some(nutrient.id.clone());
            }
        }
        None
    }
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid_and_resolves_ids() {
        let catalog = Catalog::builtin();
        assert!(catalog.nutrient("iron").is_some());
        assert!(catalog.product("bh-calcium-d3").is_some());
        let stack = catalog
            .resolve_products(&["bh-calcium-d3".to_string(), "nm-iron".to_string()])
            .expect("known ids resolve");
        assert_eq!(stack.len(), 2);
        assert!(matches!(
            catalog.resolve_products(&["no-such-product".to_string()]),
            Err(CatalogError::UnknownProduct(_))
        ));
    }

    #[test]
    fn rejects_dangling_nutrient_references() {
        let product = Product::adhoc("Mystery Pill").with_ingredient("unobtainium", 10.0, Unit::Mg);
        let err = Catalog::new(Vec::new(), vec![product]).unwrap_err();
        assert!(matches!(err, CatalogError::DanglingNutrient { .. }));
    }

    #[test]
    fn converts_iu_to_mg_for_vitamin_e() {
        let mg = convert_amount("vit-e", 400.0, Unit::Iu, Unit::Mg).expect("conversion defined");
        assert!((mg - 268.0).abs() < 1.0);
        assert!(convert_amount("iron", 10.0, Unit::Iu, Unit::Mg).is_none());
        let mcg = convert_amount("calcium", 0.6, Unit::G, Unit::Mcg).expect("mass conversion");
        assert!((mcg - 600_000.0).abs() < 1e-6);
    }

    #[test]
    fn finds_products_by_name_and_alias() {
        let catalog = Catalog::builtin();
        let by_name = catalog.find_product("vitamin d3").expect("name match");
        assert!(by_name.ingredients.iter().any(|i| i.nutrient_id == "vit-d3"));
        let by_alias = catalog.find_product("Ascorbic Acid").expect("alias match");
        assert!(by_alias.ingredients.iter().any(|i| i.nutrient_id == "vit-c"));
        assert!(catalog.find_product("definitely not a supplement").is_none());
    }

    #[test]
    fn parses_timing_tags_with_aliases() {
        assert_eq!(
            "MORNING_WITH_FOOD".parse::<TimingTag>().expect("legacy tag"),
            TimingTag::WithFoodMorning
        );
        assert_eq!(
            "before-bed".parse::<TimingTag>().expect("dashed tag"),
            TimingTag::BeforeBed
        );
        assert!("midnight snack".parse::<TimingTag>().is_err());
    }
}
