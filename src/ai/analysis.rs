use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ai::prompts::{analysis_prompt, analysis_system};
use crate::ai::{AiProvider, ContentType, Language};
use crate::catalog::{Catalog, Product};

const ANALYSIS_MAX_TOKENS: u32 = 4096;
const ANALYSIS_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplementMention {
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub timing: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub supplements: Vec<SupplementMention>,
    pub warnings: Vec<String>,
    /// 0-100; clamped on ingest since vendors do not reliably stay in range.
    pub credibility_score: u8,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    supplements: Vec<SupplementMention>,
    #[serde(default)]
    warnings: Vec<String>,
    #[serde(rename = "credibilityScore", default)]
    credibility_score: Option<f64>,
}

impl From<RawAnalysis> for AnalysisResult {
    fn from(raw: RawAnalysis) -> Self {
        Self {
            supplements: raw.supplements,
            warnings: raw.warnings,
            credibility_score: raw.credibility_score.unwrap_or(50.0).clamp(0.0, 100.0) as u8,
        }
    }
}

/// Extract supplement mentions from free text via the configured vendor.
/// Without a configured key this returns a deterministic sample result so
/// the rest of the pipeline stays exercisable in development.
pub async fn analyze_content(
    provider: &dyn AiProvider,
    content: &str,
    content_type: ContentType,
    language: Language,
) -> Result<AnalysisResult> {
    if !provider.configured() {
        warn!(
            provider = provider.name(),
            "vendor not configured, returning sample analysis"
        );
        return Ok(sample_result(language));
    }

    let prompt = analysis_prompt(content, content_type, language);
    let reply = provider
        .complete(
            Some(analysis_system(language)),
            &prompt,
            ANALYSIS_MAX_TOKENS,
            ANALYSIS_TEMPERATURE,
        )
        .await?;

    let json = extract_json(&reply)
        .with_context(|| format!("no JSON object in {} reply", provider.name()))?;
    let raw: RawAnalysis = serde_json::from_str(json)
        .with_context(|| format!("malformed analysis JSON from {}", provider.name()))?;
    Ok(raw.into())
}

/// First top-level `{ ... }` span in a possibly chatty reply.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResolvedMention {
    pub mention: SupplementMention,
    /// Catalog product the mention maps onto; `None` when nothing matched.
    pub product: Option<Product>,
}

/// Map extracted mentions onto catalog products by name/alias lookup.
pub fn resolve_mentions(catalog: &Catalog, analysis: &AnalysisResult) -> Vec<ResolvedMention> {
    analysis
        .supplements
        .iter()
        .map(|mention| ResolvedMention {
            mention: mention.clone(),
            product: catalog.find_product(&mention.name).cloned(),
        })
        .collect()
}

fn sample_result(language: Language) -> AnalysisResult {
    match language {
        Language::En => AnalysisResult {
            supplements: vec![
                SupplementMention {
                    name: "Vitamin D3".to_string(),
                    dosage: Some("5000 IU".to_string()),
                    timing: Some("Morning with breakfast".to_string()),
                    reasoning: Some(
                        "Improves mood and bone health, described as essential.".to_string(),
                    ),
                },
                SupplementMention {
                    name: "Magnesium Glycinate".to_string(),
                    dosage: Some("400 mg".to_string()),
                    timing: Some("Before bed".to_string()),
                    reasoning: Some("Helps with sleep and recovery.".to_string()),
                },
            ],
            warnings: vec![
                "High vitamin D3 dosage recommended without mentioning K2.".to_string(),
                "Content is anecdotal.".to_string(),
            ],
            credibility_score: 60,
        },
        Language::Zh => AnalysisResult {
            supplements: vec![
                SupplementMention {
                    name: "维生素D3".to_string(),
                    dosage: Some("5000 IU".to_string()),
                    timing: Some("早餐时服用".to_string()),
                    reasoning: Some("改善情绪和骨骼健康，被认为是必需的。".to_string()),
                },
                SupplementMention {
                    name: "甘氨酸镁".to_string(),
                    dosage: Some("400 mg".to_string()),
                    timing: Some("睡前".to_string()),
                    reasoning: Some("帮助睡眠和恢复。".to_string()),
                },
            ],
            warnings: vec![
                "推荐的维生素D3剂量较高，但未提及K2。".to_string(),
                "内容基于个人经验。".to_string(),
            ],
            credibility_score: 60,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_json_from_chatty_replies() {
        let reply = "Sure! Here is the analysis:\n{\"supplements\": [], \"warnings\": [], \"credibilityScore\": 80}\nHope that helps.";
        let json = extract_json(reply).expect("json span found");
        let raw: RawAnalysis = serde_json::from_str(json).expect("span parses");
        let result: AnalysisResult = raw.into();
        assert_eq!(result.credibility_score, 80);
        assert!(extract_json("no braces here").is_none());
        assert!(extract_json("}{").is_none());
    }

    #[test]
    fn credibility_score_is_clamped_and_defaulted() {
        let over: RawAnalysis =
            serde_json::from_str(r#"{"credibilityScore": 130}"#).expect("parses");
        assert_eq!(AnalysisResult::from(over).credibility_score, 100);
        let missing: RawAnalysis = serde_json::from_str("{}").expect("parses");
        assert_eq!(AnalysisResult::from(missing).credibility_score, 50);
    }

    #[tokio::test]
    async fn unconfigured_provider_returns_sample_result() {
        let provider = crate::ai::ClaudeProvider::new(None, "", 5);
        let result = analyze_content(&provider, "take vitamin C", ContentType::Description, Language::En)
            .await
            .expect("sample result");
        assert_eq!(result.credibility_score, 60);
        assert_eq!(result.supplements.len(), 2);
    }

    #[test]
    fn mentions_resolve_against_the_catalog() {
        let catalog = Catalog::builtin();
        let analysis = AnalysisResult {
            supplements: vec![
                SupplementMention {
                    name: "Vitamin D3".to_string(),
                    dosage: None,
                    timing: None,
                    reasoning: None,
                },
                SupplementMention {
                    name: "Unicorn Dust".to_string(),
                    dosage: None,
                    timing: None,
                    reasoning: None,
                },
            ],
            warnings: Vec::new(),
            credibility_score: 50,
        };
        let resolved = resolve_mentions(catalog, &analysis);
        assert_eq!(resolved.len(), 2);
        assert!(resolved[0].product.is_some());
        assert!(resolved[1].product.is_none());
    }
}
