use anyhow::Result;

use crate::detector::{sorted_by_severity, Conflict};
use crate::scheduler::ScheduleSlot;

pub fn conflicts_to_csv(conflicts: &[Conflict]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "severity",
        "product_a",
        "product_b",
        "nutrient_a",
        "nutrient_b",
        "interaction",
        "time_gap_minutes",
        "explanation",
    ])?;
    for conflict in sorted_by_severity(conflicts) {
        writer.write_record([
            conflict.severity.to_string(),
            conflict.product_a_id.clone(),
            conflict.product_b_id.clone(),
            conflict.nutrient_a.clone(),
            conflict.nutrient_b.clone(),
            conflict.interaction.to_string(),
            conflict.time_gap_minutes.to_string(),
            conflict.explanation.clone(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn schedule_to_csv(schedule: &[ScheduleSlot]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["time", "product_id", "product", "dosage", "reasoning"])?;
    for slot in schedule {
        for dose in &slot.products {
            writer.write_record([
                slot.time.clone(),
                dose.product_id.clone(),
                dose.name.clone(),
                dose.dosage.clone(),
                slot.reasoning.clone(),
            ])?;
        }
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}
