pub mod analysis;
pub mod commentary;
pub mod prompts;
pub mod provider;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use analysis::{analyze_content, resolve_mentions, AnalysisResult, ResolvedMention};
pub use commentary::{fallback_commentary, schedule_commentary};
pub use provider::{provider_from_config, AiProvider, ClaudeProvider, DeepSeekProvider};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::En => write!(f, "en"),
            Self::Zh => write!(f, "zh"),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown language: {0} (expected en or zh)")]
pub struct LanguageParseError(pub String);

impl FromStr for Language {
    type Err = LanguageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "zh" | "chinese" => Ok(Self::Zh),
            _ => Err(LanguageParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Transcript,
    #[default]
    Description,
}

impl Display for ContentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transcript => write!(f, "transcript"),
            Self::Description => write!(f, "description"),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown content type: {0} (expected transcript or description)")]
pub struct ContentTypeParseError(pub String);

impl FromStr for ContentType {
    type Err = ContentTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transcript" => Ok(Self::Transcript),
            "description" => Ok(Self::Description),
            _ => Err(ContentTypeParseError(s.to_string())),
        }
    }
}
