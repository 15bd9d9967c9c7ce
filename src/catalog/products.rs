use crate::catalog::{Ingredient, Product, ProductCategory, TimingTag, Unit};

struct ProductSpec {
    id: &'static str,
    name: &'static str,
    brand: &'static str,
    category: ProductCategory,
    ingredients: &'static [(&'static str, f64, Unit, Option<f64>)],
    dosage: &'static str,
    servings_per_day: u32,
    timing: TimingTag,
    price: f64,
    rating: f64,
}

impl ProductSpec {
    fn build(&self) -> Product {
        Product {
            id: self.id.to_string(),
            name: self.name.to_string(),
            brand: self.brand.to_string(),
            category: self.category,
            ingredients: self
                .ingredients
                .iter()
                .map(|(nutrient_id, amount, unit, percent_dv)| Ingredient {
                    nutrient_id: nutrient_id.to_string(),
                    amount: *amount,
                    unit: *unit,
                    percent_dv: *percent_dv,
                })
                .collect(),
            dosage_per_serving: self.dosage.to_string(),
            servings_per_day: self.servings_per_day,
            optimal_timing: self.timing,
            price: Some(self.price),
            rating: Some(self.rating),
        }
    }
}

const SPECS: &[ProductSpec] = &[
    ProductSpec {
        id: "bh-calcium-d3",
        name: "By-Health Liquid Calcium Softgels",
        brand: "By-Health",
        category: ProductCategory::Mineral,
        ingredients: &[
            ("calcium", 600.0, Unit::Mg, Some(75.0)),
            ("vit-d3", 5.0, Unit::Mcg, Some(100.0)),
        ],
        dosage: "2 softgels per serving",
        servings_per_day: 1,
        timing: TimingTag::WithFoodMorning,
        price: 129.0,
        rating: 4.7,
    },
    ProductSpec {
        id: "bh-omega3",
        name: "By-Health Deep Sea Fish Oil",
        brand: "By-Health",
        category: ProductCategory::Omega,
        ingredients: &[
            ("epa", 180.0, Unit::Mg, None),
            ("dha", 120.0, Unit::Mg, None),
        ],
        dosage: "2 softgels per serving",
        servings_per_day: 2,
        timing: TimingTag::WithFoodMorning,
        price: 198.0,
        rating: 4.6,
    },
    ProductSpec {
        id: "swisse-multivitamin",
        name: "Swisse Men's Ultivite Multivitamin",
        brand: "Swisse",
        category: ProductCategory::Multivitamin,
        ingredients: &[
            ("vit-a", 750.0, Unit::Mcg, None),
            ("vit-c", 165.0, Unit::Mg, None),
            ("vit-d3", 25.0, Unit::Mcg, None),
            ("vit-e", 41.0, Unit::Mg, None),
            ("vit-b12", 30.0, Unit::Mcg, None),
            ("zinc", 8.0, Unit::Mg, None),
        ],
        dosage: "1 tablet per serving",
        servings_per_day: 1,
        timing: TimingTag::WithFoodMorning,
        price: 268.0,
        rating: 4.8,
    },
    ProductSpec {
        id: "nm-vitd3",
        name: "Nature Made Vitamin D3 2000 IU",
        brand: "Nature Made",
        category: ProductCategory::SingleVitamin,
        ingredients: &[("vit-d3", 50.0, Unit::Mcg, Some(250.0))],
        dosage: "1 softgel per serving",
        servings_per_day: 1,
        timing: TimingTag::WithFoodMorning,
        price: 89.0,
        rating: 4.9,
    },
    ProductSpec {
        id: "nm-iron",
        name: "Nature Made Iron 65 mg",
        brand: "Nature Made",
        category: ProductCategory::Mineral,
        ingredients: &[("iron", 65.0, Unit::Mg, Some(361.0))],
        dosage: "1 tablet per serving",
        servings_per_day: 1,
        timing: TimingTag::EmptyStomachMorning,
        price: 59.0,
        rating: 4.6,
    },
    ProductSpec {
        id: "gnc-triple-strength",
        name: "GNC Triple Strength Fish Oil 1500mg",
        brand: "GNC",
        category: ProductCategory::Omega,
        ingredients: &[
            ("epa", 647.0, Unit::Mg, None),
            ("dha", 253.0, Unit::Mg, None),
        ],
        dosage: "1 softgel per serving",
        servings_per_day: 2,
        timing: TimingTag::WithFoodMorning,
        price: 328.0,
        rating: 4.7,
    },
    ProductSpec {
        id: "now-vitamin-e",
        name: "NOW Vitamin E-400",
        brand: "NOW Foods",
        category: ProductCategory::SingleVitamin,
        ingredients: &[("vit-e", 400.0, Unit::Iu, None)],
        dosage: "1 softgel per serving",
        servings_per_day: 1,
        timing: TimingTag::WithFoodMorning,
        price: 112.0,
        rating: 4.5,
    },
    ProductSpec {
        id: "db-vitc-1000",
        name: "Doctor's Best Vitamin C 1000 mg",
        brand: "Doctor's Best",
        category: ProductCategory::SingleVitamin,
        ingredients: &[("vit-c", 1000.0, Unit::Mg, None)],
        dosage: "1 tablet per serving",
        servings_per_day: 1,
        timing: TimingTag::Anytime,
        price: 75.0,
        rating: 4.7,
    },
    ProductSpec {
        id: "thorne-zinc",
        name: "Thorne Zinc Picolinate 15 mg",
        brand: "Thorne",
        category: ProductCategory::Mineral,
        ingredients: &[("zinc", 15.0, Unit::Mg, None)],
        dosage: "1 capsule per serving",
        servings_per_day: 1,
        timing: TimingTag::Evening,
        price: 98.0,
        rating: 4.8,
    },
    ProductSpec {
        id: "xz-calcium-mag",
        name: "XiuZheng Calcium Magnesium Tablets",
        brand: "XiuZheng",
        category: ProductCategory::Mineral,
        ingredients: &[
            ("calcium", 500.0, Unit::Mg, None),
            ("magnesium", 250.0, Unit::Mg, None),
        ],
        dosage: "2 tablets per serving",
        servings_per_day: 1,
        timing: TimingTag::BeforeBed,
        price: 68.0,
        rating: 4.4,
    },
    ProductSpec {
        id: "nutri-protein",
        name: "Nutrilite Protein Powder",
        brand: "Nutrilite",
        category: ProductCategory::Protein,
        ingredients: &[("protein", 10.0, Unit::G, None)],
        dosage: "1 scoop (10 g) per serving",
        servings_per_day: 2,
        timing: TimingTag::PostWorkout,
        price: 398.0,
        rating: 4.6,
    },
    ProductSpec {
        id: "lipton-green-tea",
        name: "Lipton Green Tea Bags",
        brand: "Lipton",
        category: ProductCategory::BeverageTea,
        ingredients: &[
            ("tannin", 150.0, Unit::Mg, None),
            ("caffeine", 28.0, Unit::Mg, None),
        ],
        dosage: "1 cup brewed",
        servings_per_day: 2,
        timing: TimingTag::Afternoon,
        price: 25.0,
        rating: 4.3,
    },
];

pub fn builtin_products() -> Vec<Product> {
    SPECS.iter().map(ProductSpec::build).collect()
}
