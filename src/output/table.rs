use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::ai::{AnalysisResult, ResolvedMention};
use crate::catalog::{Nutrient, Product};
use crate::detector::{sorted_by_severity, Conflict, Synergy};
use crate::rules::Severity;
use crate::scheduler::ScheduleSlot;
use crate::store::{SavedStack, ScheduleRecord};

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn severity_cell(severity: Severity) -> Cell {
    let cell = Cell::new(severity.to_string());
    match severity {
        Severity::Critical | Severity::High => cell.fg(Color::Red),
        Severity::Medium => cell.fg(Color::Yellow),
        Severity::Low => cell.fg(Color::Green),
    }
}

pub fn render_conflicts_table(conflicts: &[Conflict]) -> String {
    let mut table = base_table();
    table.set_header(vec![
        "Severity",
        "Product A",
        "Product B",
        "Nutrients",
        "Min Gap",
        "Why",
    ]);
    for conflict in sorted_by_severity(conflicts) {
        let gap = if conflict.time_gap_minutes == 0 {
            "dosage".to_string()
        } else {
            format!("{} min", conflict.time_gap_minutes)
        };
        table.add_row(Row::from(vec![
            severity_cell(conflict.severity),
            Cell::new(&conflict.product_a_name),
            Cell::new(&conflict.product_b_name),
            Cell::new(format!("{} x {}", conflict.nutrient_a, conflict.nutrient_b)),
            Cell::new(gap),
            Cell::new(&conflict.explanation),
        ]));
    }
    table.to_string()
}

pub fn render_synergies_table(synergies: &[Synergy]) -> String {
    let mut table = base_table();
    table.set_header(vec!["Product A", "Product B", "Nutrients", "Benefit"]);
    for synergy in synergies {
        table.add_row(vec![
            synergy.product_a_name.clone(),
            synergy.product_b_name.clone(),
            format!("{} + {}", synergy.nutrient_a, synergy.nutrient_b),
            synergy.benefit.clone(),
        ]);
    }
    table.to_string()
}

pub fn render_schedule_table(schedule: &[ScheduleSlot]) -> String {
    let mut table = base_table();
    table.set_header(vec!["Time", "Products", "Reasoning"]);
    for slot in schedule {
        let products = slot
            .products
            .iter()
            .map(|dose| format!("{} ({})", dose.name, dose.dosage))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![slot.time.clone(), products, slot.reasoning.clone()]);
    }
    table.to_string()
}

pub fn render_products_table(products: &[&Product]) -> String {
    let mut table = base_table();
    table.set_header(vec![
        "Id",
        "Name",
        "Brand",
        "Timing",
        "Ingredients",
        "Rating",
    ]);
    for product in products {
        let ingredients = product
            .ingredients
            .iter()
            .map(|i| format!("{} {}{}", i.nutrient_id, i.amount, i.unit))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            product.id.clone(),
            product.name.clone(),
            product.brand.clone(),
            product.optimal_timing.to_string(),
            ingredients,
            product
                .rating
                .map(|r| format!("{r:.1}"))
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table.to_string()
}

pub fn render_nutrients_table(nutrients: &[&Nutrient]) -> String {
    let mut table = base_table();
    table.set_header(vec!["Id", "Name", "Category", "Aliases"]);
    for nutrient in nutrients {
        table.add_row(vec![
            nutrient.id.clone(),
            nutrient.name.clone(),
            format!("{:?}", nutrient.category),
            nutrient.aliases.join(", "),
        ]);
    }
    table.to_string()
}

pub fn render_analysis_table(analysis: &AnalysisResult, resolved: &[ResolvedMention]) -> String {
    let mut table = base_table();
    table.set_header(vec!["Mention", "Dosage", "Timing", "Catalog Match"]);
    for item in resolved {
        table.add_row(vec![
            item.mention.name.clone(),
            item.mention
                .dosage
                .clone()
                .unwrap_or_else(|| "-".to_string()),
            item.mention
                .timing
                .clone()
                .unwrap_or_else(|| "-".to_string()),
            item.product
                .as_ref()
                .map(|p| p.id.clone())
                .unwrap_or_else(|| "(unmatched)".to_string()),
        ]);
    }

    let mut out = table.to_string();
    out.push_str(&format!(
        "\nCredibility score: {}/100",
        analysis.credibility_score
    ));
    for warning in &analysis.warnings {
        out.push_str(&format!("\nWarning: {warning}"));
    }
    out
}

pub fn render_stacks_table(stacks: &[SavedStack]) -> String {
    let mut table = base_table();
    table.set_header(vec!["Name", "Products", "Created At"]);
    for stack in stacks {
        table.add_row(vec![
            stack.name.clone(),
            stack.product_ids.join(", "),
            stack.created_at.to_rfc3339(),
        ]);
    }
    table.to_string()
}

pub fn render_history_table(records: &[ScheduleRecord]) -> String {
    let mut table = base_table();
    table.set_header(vec![
        "Generated At",
        "Stack",
        "Products",
        "Conflicts",
        "Slots",
    ]);
    for record in records {
        table.add_row(vec![
            record.generated_at.to_rfc3339(),
            record.stack_name.clone(),
            record.product_count.to_string(),
            record.conflict_count.to_string(),
            record.slots.len().to_string(),
        ]);
    }
    table.to_string()
}
