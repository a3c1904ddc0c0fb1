//! Per-chat conversation state: the current step, the draft document
//! being accumulated, and the scratch buffer for the loop iteration in
//! progress. Serializable so the session store can keep it anywhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::conversation::steps::{ScratchField, Step};
use crate::document::{Education, ResumeDocument, WorkExperience};

/// Transient fields for the repeatable-loop iteration currently being
/// filled. Cleared on every committed iteration; never survives past
/// the loop it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scratch {
    pub company: Option<String>,
    pub role: Option<String>,
    pub period: Option<String>,
    pub description: Option<String>,
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub specialty: Option<String>,
    pub years: Option<String>,
}

impl Scratch {
    pub fn set(&mut self, field: ScratchField, value: String) {
        match field {
            ScratchField::Company => self.company = Some(value),
            ScratchField::Role => self.role = Some(value),
            ScratchField::Period => self.period = Some(value),
            ScratchField::Description => self.description = Some(value),
            ScratchField::Institution => self.institution = Some(value),
            ScratchField::Degree => self.degree = Some(value),
            ScratchField::Specialty => self.specialty = Some(value),
            ScratchField::Years => self.years = Some(value),
        }
    }

    pub fn clear(&mut self) {
        *self = Scratch::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Scratch::default()
    }

    /// Assembles a job entry if the whole sub-sequence was answered.
    pub fn take_experience(&mut self) -> Option<WorkExperience> {
        Some(WorkExperience {
            company: self.company.take()?,
            role: self.role.take()?,
            period: self.period.take()?,
            description: self.description.take()?,
        })
    }

    /// Assembles an education entry if the whole sub-sequence was answered.
    pub fn take_education(&mut self) -> Option<Education> {
        Some(Education {
            institution: self.institution.take()?,
            degree: self.degree.take()?,
            specialty: self.specialty.take()?,
            years: self.years.take()?,
        })
    }
}

/// One active guided-flow session, keyed by the external chat identity.
/// Exactly one exists per chat at a time; a restart replaces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub chat_id: String,
    pub current_step: Step,
    pub draft: ResumeDocument,
    pub scratch: Scratch,
    /// Set while the user is re-editing one section from the review
    /// step; finishing that section jumps back to review instead of
    /// walking the rest of the backbone.
    pub return_to_preview: bool,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(chat_id: impl Into<String>) -> Self {
        Session {
            chat_id: chat_id.into(),
            current_step: Step::first(),
            draft: ResumeDocument::default(),
            scratch: Scratch::default(),
            return_to_preview: false,
            created_at: Utc::now(),
        }
    }
}
