use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::scheduler::{MealTimes, ScheduleConstraints, DEFAULT_MAX_PASSES};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub stack: StackConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StackConfig {
    #[serde(default)]
    pub products: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_breakfast")]
    pub breakfast: String,
    #[serde(default = "default_lunch")]
    pub lunch: String,
    #[serde(default = "default_dinner")]
    pub dinner: String,
    #[serde(default = "default_sleep")]
    pub sleep: String,
    /// Empty means no workout slots are generated.
    #[serde(default)]
    pub workout: String,
    #[serde(default = "default_max_passes")]
    pub max_passes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// "claude" or "deepseek"; API keys come from the environment.
    #[serde(default = "default_ai_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    #[serde(default = "default_ai_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub products: Option<Vec<String>>,
    pub breakfast: Option<String>,
    pub lunch: Option<String>,
    pub dinner: Option<String>,
    pub sleep: Option<String>,
    pub workout: Option<String>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/suppstack/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(products) = overrides.products {
            self.stack.products = products;
        }
        if let Some(breakfast) = overrides.breakfast {
            self.schedule.breakfast = breakfast;
        }
        if let Some(lunch) = overrides.lunch {
            self.schedule.lunch = lunch;
        }
        if let Some(dinner) = overrides.dinner {
            self.schedule.dinner = dinner;
        }
        if let Some(sleep) = overrides.sleep {
            self.schedule.sleep = sleep;
        }
        if let Some(workout) = overrides.workout {
            self.schedule.workout = workout;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn constraints(&self) -> ScheduleConstraints {
        let workout = self.schedule.workout.trim();
        ScheduleConstraints {
            meal_times: MealTimes {
                breakfast: self.schedule.breakfast.clone(),
                lunch: self.schedule.lunch.clone(),
                dinner: self.schedule.dinner.clone(),
            },
            workout_time: (!workout.is_empty()).then(|| workout.to_string()),
            sleep_time: self.schedule.sleep.clone(),
            max_passes: self.schedule.max_passes,
        }
    }

    pub fn default_template() -> String {
        let template = r#"[stack]
products = ["bh-calcium-d3", "nm-iron", "gnc-triple-strength"]

[schedule]
breakfast = "08:00"
lunch = "12:30"
dinner = "18:30"
sleep = "22:30"
workout = ""
max_passes = 10

[storage]
db_path = "~/.local/share/suppstack/stacks.db"

[ai]
provider = "claude"
model = ""
base_url = "https://api.deepseek.com"
timeout_secs = 30
language = "en"
"#;
        template.to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            breakfast: default_breakfast(),
            lunch: default_lunch(),
            dinner: default_dinner(),
            sleep: default_sleep(),
            workout: String::new(),
            max_passes: default_max_passes(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_ai_provider(),
            model: String::new(),
            base_url: default_ai_base_url(),
            timeout_secs: default_ai_timeout(),
            language: default_language(),
        }
    }
}

fn default_breakfast() -> String {
    "08:00".to_string()
}

fn default_lunch() -> String {
    "12:30".to_string()
}

fn default_dinner() -> String {
    "18:30".to_string()
}

fn default_sleep() -> String {
    "22:30".to_string()
}

fn default_max_passes() -> u32 {
    DEFAULT_MAX_PASSES
}

fn default_db_path() -> String {
    "~/.local/share/suppstack/stacks.db".to_string()
}

fn default_ai_provider() -> String {
    "claude".to_string()
}

fn default_ai_base_url() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_ai_timeout() -> u64 {
    30
}

fn default_language() -> String {
    "en".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_back_into_defaults() {
        let parsed: Config = toml::from_str(&Config::default_template()).expect("template parses");
        assert_eq!(parsed.schedule.breakfast, "08:00");
        assert_eq!(parsed.schedule.max_passes, 10);
        assert_eq!(parsed.ai.provider, "claude");
        assert_eq!(parsed.stack.products.len(), 3);
        assert!(parsed.constraints().workout_time.is_none());
    }

    #[test]
    fn overrides_take_precedence() {
        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides {
            products: Some(vec!["nm-iron".to_string()]),
            workout: Some("17:00".to_string()),
            ..ConfigOverrides::default()
        });
        assert_eq!(config.stack.products, vec!["nm-iron".to_string()]);
        assert_eq!(
            config.constraints().workout_time.as_deref(),
            Some("17:00")
        );
    }
}
