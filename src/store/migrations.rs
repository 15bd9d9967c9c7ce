pub const BASE_MIGRATION: &str = r#"
CREATE TABLE IF NOT EXISTS stacks (
    name TEXT PRIMARY KEY,
    product_ids_json TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS conflict_cache (
    stack_hash TEXT PRIMARY KEY,
    conflicts_json TEXT NOT NULL,
    detected_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS schedule_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    stack_name TEXT NOT NULL,
    product_count INTEGER NOT NULL,
    conflict_count INTEGER NOT NULL,
    schedule_json TEXT NOT NULL,
    generated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_schedule_history_stack
    ON schedule_history(stack_name, id DESC);
"#;
