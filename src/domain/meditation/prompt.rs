//! Script Prompt Builder - 构造冥想脚本生成提示词

use super::heuristics::HeuristicParameters;
use super::value_objects::{GenerationRequest, GuidanceLevel};
use crate::domain::script_segmenter::PAUSE_DELIMITER;

/// 系统角色指令
pub const SYSTEM_INSTRUCTION: &str = "You are an expert meditation guide. \
     Produce only the meditation script body, without any additional commentary.";

/// 脚本生成提示词
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPrompt {
    pub system: String,
    pub user: String,
    /// 后端输出长度上限提示（与目标字符数一致）
    pub max_tokens: u32,
}

/// 提示词构造器
pub struct ScriptPromptBuilder;

impl ScriptPromptBuilder {
    pub fn build(request: &GenerationRequest, params: &HeuristicParameters) -> ScriptPrompt {
        let sections = params.section_count();
        let pauses = params.pause_count;
        let chars = params.target_character_count;
        let minutes = request.duration.average_minutes();

        let user = format!(
            "Write a guided meditation script of roughly {minutes} minutes, \
             about {chars} characters long, focused on {focus}.\n\
             The meditation must have exactly {sections} sections separated by exactly \
             {pauses} '{delim}' markers, one marker for each pause.\n\
             1. {guidance}\n\
             2. Place each '{delim}' marker at a natural transition so the listener can rest \
             in silent reflection or focused breathing.\n\
             3. Before every '{delim}' marker, gently lead the listener into the pause so the \
             silence never arrives abruptly.\n\
             4. Keep every section centred on {focus}.\n\
             5. The final section must gently bring the listener back to the present moment \
             and close the session.\n\
             Output only the spoken script text and the '{delim}' markers, with no headings, \
             stage directions or commentary. Staying close to {chars} characters, {sections} \
             sections and {pauses} markers matters more than anything else.",
            minutes = minutes,
            chars = chars,
            sections = sections,
            pauses = pauses,
            delim = PAUSE_DELIMITER,
            focus = request.focus.as_str(),
            guidance = guidance_directive(request.guidance),
        );

        ScriptPrompt {
            system: SYSTEM_INSTRUCTION.to_string(),
            user,
            max_tokens: chars,
        }
    }
}

fn guidance_directive(level: GuidanceLevel) -> &'static str {
    match level {
        GuidanceLevel::Low => {
            "Use light guidance: short, sparse instructions that leave the listener plenty of \
             room to settle on their own."
        }
        GuidanceLevel::Medium => {
            "Use moderate guidance: balance clear instructions with open moments for the \
             listener's own practice."
        }
        GuidanceLevel::High => {
            "Use detailed guidance: walk the listener through every step with rich, continuous \
             instruction and imagery."
        }
    }
}
