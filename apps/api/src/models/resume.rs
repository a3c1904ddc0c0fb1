use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Resume languages the API accepts. Stored as TEXT; the enum lives at
/// the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeLanguage {
    En,
    Ru,
    Fr,
}

impl ResumeLanguage {
    pub fn as_str(self) -> &'static str {
        match self {
            ResumeLanguage::En => "en",
            ResumeLanguage::Ru => "ru",
            ResumeLanguage::Fr => "fr",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "en" => Some(ResumeLanguage::En),
            "ru" => Some(ResumeLanguage::Ru),
            "fr" => Some(ResumeLanguage::Fr),
            _ => None,
        }
    }
}

/// Where a persisted version came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSource {
    Manual,
    AiTranslation,
}

impl VersionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            VersionSource::Manual => "manual",
            VersionSource::AiTranslation => "ai_translation",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub language: String,
    pub template_id: String,
    pub content: Value,
    pub current_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeVersionRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub version: i32,
    pub content: Value,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_round_trips_through_text() {
        for lang in [ResumeLanguage::En, ResumeLanguage::Ru, ResumeLanguage::Fr] {
            assert_eq!(ResumeLanguage::parse(lang.as_str()), Some(lang));
        }
        assert_eq!(ResumeLanguage::parse("de"), None);
    }

    #[test]
    fn test_language_serde_matches_wire_form() {
        assert_eq!(
            serde_json::to_string(&ResumeLanguage::Fr).ok(),
            Some("\"fr\"".to_string())
        );
        assert_eq!(
            serde_json::to_string(&VersionSource::AiTranslation).ok(),
            Some("\"ai_translation\"".to_string())
        );
    }
}
