//! Resume content model — the canonical structured representation of a
//! resume, shared by the conversation engine, the CRUD surface, the
//! renderer and the version store.
//!
//! Every list field defaults to empty and deserializes to empty when
//! absent, so downstream consumers only ever see one representation of
//! "nothing here".

pub mod preview;

use serde::{Deserialize, Serialize};

/// Contact block collected at the start of the guided flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub target_position: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub profile_links: String,
    #[serde(default)]
    pub summary: String,
}

/// One job entry. Insertion order is the order the user entered them,
/// not necessarily date order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub company: String,
    pub role: String,
    pub period: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub specialty: String,
    pub years: String,
}

/// The full resume document. Stored as JSONB in `resumes.content` and
/// `resume_versions.content`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeDocument {
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub work_experience: Vec<WorkExperience>,
    #[serde(default)]
    pub education: Vec<Education>,
    /// Set semantics; display order preserved.
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub languages_spoken: Vec<String>,
    #[serde(default)]
    pub certificates: Vec<String>,
}

impl ResumeDocument {
    /// A document is ready to be committed once it carries at least a name.
    pub fn is_finalizable(&self) -> bool {
        !self.personal_info.full_name.trim().is_empty()
    }

    /// Suggested title for the persisted resume record.
    pub fn title(&self) -> String {
        let name = self.personal_info.full_name.trim();
        let position = self.personal_info.target_position.trim();
        if position.is_empty() {
            name.to_string()
        } else {
            format!("{name} — {position}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_deserializes_with_empty_lists() {
        let doc: ResumeDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.work_experience.is_empty());
        assert!(doc.education.is_empty());
        assert!(doc.skills.is_empty());
        assert!(doc.languages_spoken.is_empty());
        assert!(doc.certificates.is_empty());
        assert_eq!(doc.personal_info.full_name, "");
    }

    #[test]
    fn test_partial_json_fills_remaining_fields() {
        let doc: ResumeDocument = serde_json::from_str(
            r#"{"personal_info": {"full_name": "Alice"}, "skills": ["Rust"]}"#,
        )
        .unwrap();
        assert_eq!(doc.personal_info.full_name, "Alice");
        assert_eq!(doc.skills, vec!["Rust"]);
        assert!(doc.education.is_empty());
    }

    #[test]
    fn test_finalizable_requires_full_name() {
        let mut doc = ResumeDocument::default();
        assert!(!doc.is_finalizable());
        doc.personal_info.full_name = "   ".to_string();
        assert!(!doc.is_finalizable());
        doc.personal_info.full_name = "Alice".to_string();
        assert!(doc.is_finalizable());
    }

    #[test]
    fn test_title_with_and_without_position() {
        let mut doc = ResumeDocument::default();
        doc.personal_info.full_name = "Alice".to_string();
        assert_eq!(doc.title(), "Alice");
        doc.personal_info.target_position = "Engineer".to_string();
        assert_eq!(doc.title(), "Alice — Engineer");
    }

    #[test]
    fn test_roundtrip_preserves_entry_order() {
        let mut doc = ResumeDocument::default();
        doc.work_experience.push(WorkExperience {
            company: "Acme".into(),
            role: "Dev".into(),
            period: "2020-2022".into(),
            description: "Built things".into(),
        });
        doc.work_experience.push(WorkExperience {
            company: "Globex".into(),
            role: "Lead".into(),
            period: "2022-2024".into(),
            description: "Led things".into(),
        });
        let json = serde_json::to_string(&doc).unwrap();
        let back: ResumeDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back.work_experience[0].company, "Acme");
        assert_eq!(back.work_experience[1].company, "Globex");
    }
}
