/*!
 * Prompt templates for dialogue translation.
 *
 * The configurable part of the system prompt only sets tone and language
 * pair. The placeholder rules and the JSON reply contract are always
 * appended, since unmasking and reply parsing depend on them.
 */

use crate::language_utils;

/// System prompt template for dialogue translation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// Rules for `[Category_id]` placeholders
    pub const PLACEHOLDER_RULES: &'static str = r#"## Placeholders
The text may contain placeholders such as [Location_a1b2c3d4] or [Npc_0f9e8d7c].
- Copy every placeholder into the translation exactly as written
- Never translate, split or alter the inside of a placeholder
- Keep every placeholder; move it only where the target grammar requires"#;

    /// Reply format parsed by the providers
    pub const REPLY_FORMAT: &'static str = r#"## Output Requirements
Return ONLY a JSON object of the form {"translation": "<translated text>"}.
Do not include any text outside the JSON structure."#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Render the template for a language pair given as ISO codes.
    ///
    /// Codes are shown by their English name when known.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        let source = language_utils::get_language_name(source_language).unwrap_or_else(|_| source_language.to_string());
        let target = language_utils::get_language_name(target_language).unwrap_or_else(|_| target_language.to_string());

        format!(
            "{}\n\n{}\n\n{}",
            self.template
                .replace("{source_language}", &source)
                .replace("{target_language}", &target)
                .trim_end(),
            Self::PLACEHOLDER_RULES,
            Self::REPLY_FORMAT
        )
    }
}
