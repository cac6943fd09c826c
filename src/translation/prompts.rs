/*!
 * Prompt construction for batch translation requests.
 *
 * A request is two strings: an instruction block rendered from a template
 * (system message) and the marker-delimited payload for the batch (user
 * message).
 */

use crate::subtitle_processor::SubtitleEntry;
use crate::translation::markers;

/// A prompt template with placeholder substitution.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Instruction block sent as the system message for every batch.
    /// Placeholder: `{target_language}`.
    pub const SUBTITLE_TRANSLATOR: &'static str = r#"You are an expert translator specializing in {target_language}, with deep understanding of cultural context and natural speech patterns. Your task is to translate the following video transcript segments.

Key translation principles to follow:
- Prioritize natural, conversational language over literal translations
- Maintain the original tone and style (casual, formal, humorous, etc.)
- Adapt idioms and expressions to culturally appropriate equivalents in {target_language}
- Ensure the translations sound fluid and native when spoken aloud
- Consider the context that this is spoken dialogue, not written text
- Preserve the emotional impact and intent of the original speech

Format requirements:
- Keep all [START_SEG#] and [END_SEG#] markers exactly as they appear
- Maintain exact segment numbering
- Place your translation between the START and END markers
- Do not add any additional text or explanations
- Keep one empty line between segments

Example format:
[START_SEG1]
¿Qué tal?
[END_SEG1]

[START_SEG2]
¿Cómo estás?
[END_SEG2]"#;

    /// Create a template from a raw string.
    pub fn new(template: impl Into<String>) -> Self {
        PromptTemplate {
            template: template.into(),
        }
    }

    /// The standard subtitle translation instruction template.
    pub fn subtitle_translator() -> Self {
        Self::new(Self::SUBTITLE_TRANSLATOR)
    }

    /// Render the template for a target language.
    pub fn render(&self, target_language: &str) -> String {
        self.template.replace("{target_language}", target_language)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::subtitle_translator()
    }
}

/// Builds the instruction/payload message pair for a batch.
#[derive(Debug)]
pub struct TranslationPromptBuilder {
    template: PromptTemplate,
    target_language: String,
}

impl TranslationPromptBuilder {
    /// Create a builder for the given target language label.
    pub fn new(target_language: impl Into<String>) -> Self {
        TranslationPromptBuilder {
            template: PromptTemplate::default(),
            target_language: target_language.into(),
        }
    }

    /// Replace the instruction template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Build the (system, user) strings for one batch.
    pub fn build(&self, batch: &[SubtitleEntry]) -> (String, String) {
        let system = self.template.render(&self.target_language);
        let payload = markers::encode_batch(batch);
        (system, payload)
    }
}
