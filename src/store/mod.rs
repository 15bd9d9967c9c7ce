pub mod migrations;

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::detector::Conflict;
use crate::scheduler::ScheduleSlot;
use crate::store::migrations::BASE_MIGRATION;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedStack {
    pub name: String,
    pub product_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub stack_name: String,
    pub product_count: usize,
    pub conflict_count: usize,
    pub slots: Vec<ScheduleSlot>,
    pub generated_at: DateTime<Utc>,
}

/// Identity of a product selection, independent of order and duplicates.
/// Keys the conflict cache: detection is deterministic for a fixed rule
/// table, so the same set always maps to the same result.
pub fn stack_hash(product_ids: &[String]) -> String {
    let mut ids: Vec<&str> = product_ids.iter().map(String::as_str).collect();
    ids.sort_unstable();
    ids.dedup();
    let mut hasher = Sha256::new();
    hasher.update(ids.join("\n").as_bytes());
    format!("{:x}", hasher.finalize())
}

pub struct StackStore {
    conn: Connection,
}

impl StackStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(BASE_MIGRATION)?;
        Ok(())
    }

    pub fn save_stack(&self, name: &str, product_ids: &[String]) -> Result<()> {
        self.conn.execute(
            r#"
INSERT INTO stacks(name, product_ids_json, created_at)
VALUES (?1, ?2, ?3)
ON CONFLICT(name) DO UPDATE SET product_ids_json = excluded.product_ids_json
"#,
            params![
                name,
                serde_json::to_string(product_ids)?,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    pub fn load_stack(&self, name: &str) -> Result<Option<SavedStack>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, product_ids_json, created_at FROM stacks WHERE name = ?1",
        )?;
        let result = stmt.query_row(params![name], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        });
        match result {
            Ok((name, ids_json, created_at)) => Ok(Some(SavedStack {
                name,
                product_ids: serde_json::from_str(&ids_json)?,
                created_at: parse_timestamp(&created_at),
            })),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_stacks(&self) -> Result<Vec<SavedStack>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, product_ids_json, created_at FROM stacks ORDER BY name",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut out = Vec::with_capacity(rows.len());
        for (name, ids_json, created_at) in rows {
            out.push(SavedStack {
                name,
                product_ids: serde_json::from_str(&ids_json)?,
                created_at: parse_timestamp(&created_at),
            });
        }
        Ok(out)
    }

    pub fn cache_conflicts(&self, stack_hash: &str, conflicts: &[Conflict]) -> Result<()> {
        self.conn.execute(
            r#"
INSERT INTO conflict_cache(stack_hash, conflicts_json, detected_at)
VALUES (?1, ?2, ?3)
ON CONFLICT(stack_hash) DO UPDATE SET
    conflicts_json = excluded.conflicts_json,
    detected_at = excluded.detected_at
"#,
            params![
                stack_hash,
                serde_json::to_string(conflicts)?,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    pub fn cached_conflicts(&self, stack_hash: &str) -> Result<Option<Vec<Conflict>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT conflicts_json FROM conflict_cache WHERE stack_hash = ?1")?;
        let result = stmt.query_row(params![stack_hash], |row| row.get::<_, String>(0));
        match result {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn insert_schedule_record(&self, record: &ScheduleRecord) -> Result<()> {
        self.conn.execute(
            r#"
INSERT INTO schedule_history(
    stack_name, product_count, conflict_count, schedule_json, generated_at
) VALUES (?1, ?2, ?3, ?4, ?5)
"#,
            params![
                record.stack_name,
                record.product_count as i64,
                record.conflict_count as i64,
                serde_json::to_string(&record.slots)?,
                record.generated_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }

    pub fn load_schedule_history(
        &self,
        stack_name: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ScheduleRecord>> {
        let sql = if stack_name.is_some() {
            r#"
SELECT stack_name, product_count, conflict_count, schedule_json, generated_at
FROM schedule_history
WHERE stack_name = ?1
ORDER BY id DESC
LIMIT ?2
"#
        } else {
            r#"
SELECT stack_name, product_count, conflict_count, schedule_json, generated_at
FROM schedule_history
ORDER BY id DESC
LIMIT ?1
"#
        };
        let mut stmt = self.conn.prepare(sql)?;
        let rows = if let Some(stack_name) = stack_name {
            stmt.query_map(params![stack_name, limit as i64], row_to_schedule_parts)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            stmt.query_map(params![limit as i64], row_to_schedule_parts)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        };
        let mut out = Vec::with_capacity(rows.len());
        for (stack_name, product_count, conflict_count, schedule_json, generated_at) in rows {
            out.push(ScheduleRecord {
                stack_name,
                product_count: product_count as usize,
                conflict_count: conflict_count as usize,
                slots: serde_json::from_str(&schedule_json)?,
                generated_at: parse_timestamp(&generated_at),
            });
        }
        Ok(out)
    }
}

type ScheduleParts = (String, i64, i64, String, String);

fn row_to_schedule_parts(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScheduleParts> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Interaction, Severity};

    fn temp_store() -> (tempfile::TempDir, StackStore) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = StackStore::open(&dir.path().join("stacks.db")).expect("store opens");
        (dir, store)
    }

    #[test]
    fn stack_hash_ignores_order_and_duplicates() {
        let a = stack_hash(&["b".to_string(), "a".to_string()]);
        let b = stack_hash(&["a".to_string(), "b".to_string(), "a".to_string()]);
        assert_eq!(a, b);
        assert_ne!(a, stack_hash(&["a".to_string()]));
    }

    #[test]
    fn saves_and_reloads_stacks() {
        let (_dir, store) = temp_store();
        let ids = vec!["bh-calcium-d3".to_string(), "nm-iron".to_string()];
        store.save_stack("cut", &ids).expect("save");
        let loaded = store.load_stack("cut").expect("load").expect("present");
        assert_eq!(loaded.product_ids, ids);
        assert!(store.load_stack("bulk").expect("load").is_none());
        store
            .save_stack("cut", &["nm-iron".to_string()])
            .expect("overwrite");
        let reloaded = store.load_stack("cut").expect("load").expect("present");
        assert_eq!(reloaded.product_ids.len(), 1);
        assert_eq!(store.list_stacks().expect("list").len(), 1);
    }

    #[test]
    fn conflict_cache_round_trips() {
        let (_dir, store) = temp_store();
        let conflicts = vec![Conflict {
            product_a_id: "a".to_string(),
            product_a_name: "A".to_string(),
            product_b_id: "b".to_string(),
            product_b_name: "B".to_string(),
            nutrient_a: "iron".to_string(),
            nutrient_b: "calcium".to_string(),
            severity: Severity::Critical,
            interaction: Interaction::AbsorptionCompetition,
            explanation: "explanation".to_string(),
            mechanism: "mechanism".to_string(),
            time_gap_minutes: 240,
        }];
        let hash = stack_hash(&["a".to_string(), "b".to_string()]);
        assert!(store.cached_conflicts(&hash).expect("lookup").is_none());
        store.cache_conflicts(&hash, &conflicts).expect("cache");
        let cached = store.cached_conflicts(&hash).expect("lookup").expect("hit");
        assert_eq!(cached, conflicts);
    }

    #[test]
    fn schedule_history_is_newest_first_and_filterable() {
        let (_dir, store) = temp_store();
        for n in 0..3 {
            store
                .insert_schedule_record(&ScheduleRecord {
                    stack_name: if n == 2 { "other" } else { "cut" }.to_string(),
                    product_count: n + 1,
                    conflict_count: n,
                    slots: Vec::new(),
                    generated_at: Utc::now(),
                })
                .expect("insert");
        }
        let all = store.load_schedule_history(None, 10).expect("history");
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].stack_name, "other");
        let cut = store.load_schedule_history(Some("cut"), 10).expect("history");
        assert_eq!(cut.len(), 2);
        let limited = store.load_schedule_history(None, 1).expect("history");
        assert_eq!(limited.len(), 1);
    }
}
