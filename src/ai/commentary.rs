use tracing::warn;

use crate::ai::prompts::commentary_prompt;
use crate::ai::{AiProvider, Language};
use crate::detector::{Conflict, Synergy};
use crate::scheduler::ScheduleSlot;

const COMMENTARY_MAX_TOKENS: u32 = 800;
const COMMENTARY_TEMPERATURE: f32 = 0.9;

/// Free-text review of a finished schedule. Degrades to a deterministic
/// canned review on any vendor failure; the caller always gets text back.
pub async fn schedule_commentary(
    provider: &dyn AiProvider,
    schedule: &[ScheduleSlot],
    conflicts: &[Conflict],
    synergies: &[Synergy],
    language: Language,
) -> String {
    let product_count: usize = schedule.iter().map(|slot| slot.products.len()).sum();

    if !provider.configured() {
        warn!(provider = provider.name(), "vendor not configured, using fallback commentary");
        return fallback_commentary(conflicts.len(), product_count, language);
    }

    let prompt = commentary_prompt(schedule, conflicts, synergies, language);
    match provider
        .complete(None, &prompt, COMMENTARY_MAX_TOKENS, COMMENTARY_TEMPERATURE)
        .await
    {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            warn!(provider = provider.name(), "vendor returned empty commentary, using fallback");
            fallback_commentary(conflicts.len(), product_count, language)
        }
        Err(error) => {
            warn!(provider = provider.name(), %error, "commentary call failed, using fallback");
            fallback_commentary(conflicts.len(), product_count, language)
        }
    }
}

/// Canned review keyed by conflict count, product count, and language.
pub fn fallback_commentary(conflict_count: usize, product_count: usize, language: Language) -> String {
    match language {
        Language::En => match (conflict_count, product_count) {
            (0, 0..=5) => "Clean stack. Simple, even conservative. Decent product selection and \
sensible timing; nothing here will fight itself. Keep it up."
                .to_string(),
            (0, _) => "Zero conflicts across that many products? Impressive. But it is a lot of \
pills, and several of them overlap in function. Consider trimming the stack."
                .to_string(),
            (1..=2, _) => format!(
                "{conflict_count} conflict(s) detected. Not terrible, but needs work: some \
products are blocking each other's absorption. Space the flagged pairs out by \
at least 4 hours and re-check."
            ),
            _ => format!(
                "{conflict_count} conflicts. Is this a supplement stack or a chemistry \
experiment? Several products cancel each other out, and some combinations add \
risk. Rebuild the schedule around the flagged pairs before spending more money."
            ),
        },
        Language::Zh => match (conflict_count, product_count) {
            (0, 0..=5) => "不错，简洁高效的配方。产品选择合理，时间分配也靠谱，互相之间不打架，继续保持。".to_string(),
            (0, _) => "这么多产品居然0冲突，看得出下了功夫。不过数量有点多，不少功能是重复的，建议精简一下。".to_string(),
            (1..=2, _) => format!(
                "检测到{conflict_count}个冲突，还能抢救。部分产品会互相抵消吸收率，把标记的组合至少间隔4小时再服用。"
            ),
            _ => format!(
                "{conflict_count}个冲突？这是补剂方案还是化学实验？不少产品放在一起纯属浪费，个别组合还有风险，建议围绕标记的冲突对重新规划。"
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_deterministic_and_keyed_by_counts() {
        let a = fallback_commentary(0, 3, Language::En);
        let b = fallback_commentary(0, 3, Language::En);
        assert_eq!(a, b);
        assert_ne!(a, fallback_commentary(0, 9, Language::En));
        assert_ne!(a, fallback_commentary(2, 3, Language::En));
        assert!(fallback_commentary(2, 3, Language::En).contains('2'));
        assert_ne!(
            fallback_commentary(0, 3, Language::En),
            fallback_commentary(0, 3, Language::Zh)
        );
    }

    #[tokio::test]
    async fn unconfigured_provider_falls_back() {
        let provider = crate::ai::ClaudeProvider::new(None, "", 5);
        let text = schedule_commentary(&provider, &[], &[], &[], Language::En).await;
        assert_eq!(text, fallback_commentary(0, 0, Language::En));
    }
}
