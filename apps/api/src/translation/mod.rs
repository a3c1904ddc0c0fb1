//! AI translation of stored resumes. Translates the JSONB content into
//! another supported language and commits the result as a new version
//! with `source = ai_translation`.

use serde::Deserialize;

use crate::document::ResumeDocument;
use crate::errors::AppError;
use crate::models::resume::ResumeLanguage;
use crate::translation::client::LlmClient;

pub mod client;
pub mod handlers;

const SYSTEM_PROMPT: &str =
    "You are a precise resume translator. You always reply with valid JSON and nothing else.";

/// Translation register. Professional mode rewrites into HR vocabulary
/// while translating; standard mode translates as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslateMode {
    #[default]
    Standard,
    Professional,
}

#[derive(Clone)]
pub struct TranslationService {
    llm: LlmClient,
}

impl TranslationService {
    pub fn new(llm: LlmClient) -> Self {
        TranslationService { llm }
    }

    pub async fn translate(
        &self,
        doc: &ResumeDocument,
        target: ResumeLanguage,
        mode: TranslateMode,
    ) -> Result<ResumeDocument, AppError> {
        let doc_json = serde_json::to_string_pretty(doc)
            .map_err(|e| AppError::Internal(e.into()))?;
        let prompt = build_translation_prompt(&doc_json, target, mode);
        self.llm
            .call_json::<ResumeDocument>(&prompt, SYSTEM_PROMPT)
            .await
            .map_err(|e| AppError::Translation(e.to_string()))
    }
}

fn language_name(language: ResumeLanguage) -> &'static str {
    match language {
        ResumeLanguage::En => "English",
        ResumeLanguage::Ru => "Russian",
        ResumeLanguage::Fr => "French",
    }
}

fn build_translation_prompt(doc_json: &str, target: ResumeLanguage, mode: TranslateMode) -> String {
    let mode_instruction = match mode {
        TranslateMode::Standard => "",
        TranslateMode::Professional => {
            "Use professional HR terminology and optimize the language for job applications. \
             Make achievements sound more impactful while maintaining accuracy.\n"
        }
    };

    format!(
        "Translate the following resume JSON to {}.\n{}\
         Maintain the exact JSON structure. Only translate the text values, not the keys.\n\
         Return only valid JSON, no additional text.\n\n\
         Resume JSON:\n{}",
        language_name(target),
        mode_instruction,
        doc_json
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_target_language() {
        let prompt = build_translation_prompt("{}", ResumeLanguage::Fr, TranslateMode::Standard);
        assert!(prompt.contains("to French"));
        assert!(prompt.contains("Return only valid JSON"));
        assert!(!prompt.contains("HR terminology"));
    }

    #[test]
    fn test_professional_mode_adds_register_instruction() {
        let prompt =
            build_translation_prompt("{}", ResumeLanguage::En, TranslateMode::Professional);
        assert!(prompt.contains("HR terminology"));
    }

    #[test]
    fn test_mode_deserializes_lowercase() {
        assert_eq!(
            serde_json::from_str::<TranslateMode>("\"professional\"").ok(),
            Some(TranslateMode::Professional)
        );
        assert_eq!(
            serde_json::from_str::<TranslateMode>("\"standard\"").ok(),
            Some(TranslateMode::Standard)
        );
    }
}
