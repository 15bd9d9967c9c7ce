use std::fmt::Write;

use crate::ai::{ContentType, Language};
use crate::detector::{Conflict, Synergy};
use crate::scheduler::ScheduleSlot;

pub const ANALYSIS_SYSTEM_EN: &str = "You are a professional nutritionist and pharmacologist. Your job is to analyze supplement claims in content, strip out the marketing hype, and extract the genuinely science-backed advice.";
pub const ANALYSIS_SYSTEM_ZH: &str = "你是一位专业的营养学家和药理学专家。你的任务是分析内容中的补剂信息，去除营销噱头，提取真实可靠的科学建议。";

/// Reviewer prompt for the schedule commentary call.
pub fn commentary_prompt(
    schedule: &[ScheduleSlot],
    conflicts: &[Conflict],
    synergies: &[Synergy],
    language: Language,
) -> String {
    let product_count: usize = schedule.iter().map(|slot| slot.products.len()).sum();
    let mut schedule_lines = String::new();
    for (idx, slot) in schedule.iter().enumerate() {
        let names: Vec<&str> = slot.products.iter().map(|p| p.name.as_str()).collect();
        let _ = writeln!(
            schedule_lines,
            "{}. {} - {} ({})",
            idx + 1,
            slot.time,
            names.join(", "),
            slot.reasoning
        );
    }
    let conflict_lines = if conflicts.is_empty() {
        match language {
            Language::En => "None".to_string(),
            Language::Zh => "无冲突".to_string(),
        }
    } else {
        let mut lines = String::new();
        for (idx, c) in conflicts.iter().enumerate() {
            let _ = writeln!(
                lines,
                "{}. {} vs {} - {} - {}",
                idx + 1,
                c.product_a_name,
                c.product_b_name,
                c.severity,
                c.explanation
            );
        }
        lines
    };

    match language {
        Language::En => format!(
            "You are a senior nutritionist and pharmacologist, known for sharp, honest feedback. \
Review the following supplement schedule.\n\n\
Products: {product_count}\nConflicts: {conflict_count}\nSynergies: {synergy_count}\n\n\
Schedule:\n{schedule_lines}\n\
Conflicts:\n{conflict_lines}\n\
Requirements:\n\
1. No template language - make the review fresh and specific to this plan\n\
2. Professional but conversational tone\n\
3. Judge the timing choices and how conflicts were handled\n\
4. Give 1-2 practical, science-based suggestions\n\
5. Length: 80-120 words\n\n\
Output the review directly, with no preamble:",
            conflict_count = conflicts.len(),
            synergy_count = synergies.len(),
        ),
        Language::Zh => format!(
            "你是一位资深的营养学专家和药理学家，以专业、犀利的点评风格著称。请对以下补剂排程方案进行深度点评。\n\n\
产品总数：{product_count}\n冲突数量：{conflict_count}\n协同效应：{synergy_count}\n\n\
详细排程：\n{schedule_lines}\n\
冲突详情：\n{conflict_lines}\n\
要求：\n\
1. 不要使用任何模板化语言，点评要针对这份方案\n\
2. 用专业但自然的语气\n\
3. 具体分析时间安排和冲突处理是否得当\n\
4. 提供1-2条基于科学事实的实用建议\n\
5. 长度：100-150字\n\n\
直接输出点评内容，不要前缀后缀：",
            conflict_count = conflicts.len(),
            synergy_count = synergies.len(),
        ),
    }
}

/// Extraction prompt for the influencer-content analysis call. Demands a
/// bare JSON object so the reply can be parsed mechanically.
pub fn analysis_prompt(content: &str, content_type: ContentType, language: Language) -> String {
    match language {
        Language::En => {
            let source = match content_type {
                ContentType::Transcript => "transcript",
                ContentType::Description => "description",
            };
            format!(
                "Analyze the following {source} and extract supplement recommendations.\n\n\
Tasks:\n\
1. Identify every supplement mentioned (use standardized names, e.g. \"Vitamin D3\")\n\
2. Extract the recommended dosage and timing when stated\n\
3. Capture the stated reasoning\n\
4. Flag warnings, side effects, or dangerous combinations\n\
5. Score content credibility 0-100: scientific citations (+20), correct \
mechanisms (+20), exaggerated marketing claims (-30), safe dosage advice (+20), \
risks acknowledged (+20)\n\n\
Output format (pure JSON, nothing else):\n\
{{\n  \"supplements\": [\n    {{\"name\": \"...\", \"dosage\": \"... or null\", \
\"timing\": \"... or null\", \"reasoning\": \"...\"}}\n  ],\n  \"warnings\": [\"...\"],\n  \"credibilityScore\": 75\n}}\n\n\
Content to analyze:\n{content}"
            )
        }
        Language::Zh => {
            let source = match content_type {
                ContentType::Transcript => "文稿",
                ContentType::Description => "描述",
            };
            format!(
                "分析以下{source}，提取补剂推荐信息：\n\n\
任务要求：\n\
1. 识别所有提到的补剂（使用标准化名称，如「维生素D3」）\n\
2. 提取推荐剂量和服用时间（如果提到）\n\
3. 识别内容中给出的理由\n\
4. 检测任何警告、副作用或危险组合\n\
5. 评估内容可信度（0-100分）：引用科学文献（+20），正确解释机制（+20），\
夸大营销宣传（-30），剂量建议安全（+20），提到潜在风险（+20）\n\n\
输出格式（必须是纯JSON，不要有其他文字）：\n\
{{\n  \"supplements\": [\n    {{\"name\": \"标准化名称\", \"dosage\": \"剂量或null\", \
\"timing\": \"服用时间或null\", \"reasoning\": \"推荐理由\"}}\n  ],\n  \"warnings\": [\"警告\"],\n  \"credibilityScore\": 75\n}}\n\n\
待分析内容：\n{content}"
            )
        }
    }
}

pub fn analysis_system(language: Language) -> &'static str {
    match language {
        Language::En => ANALYSIS_SYSTEM_EN,
        Language::Zh => ANALYSIS_SYSTEM_ZH,
    }
}
