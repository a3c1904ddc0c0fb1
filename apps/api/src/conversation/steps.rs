//! The step table of the guided flow: a linear backbone with two
//! repeatable-collection loops (experience, education), an optional
//! certificates field, and a review/format tail.
//!
//! Each step owns its prompt, its quick-reply labels and a `StepKind`
//! describing how the engine should treat the answer. The whole
//! transition table is plain data, so it can be inspected and tested
//! without touching any I/O.

use serde::{Deserialize, Serialize};

use crate::conversation::session::Scratch;
use crate::document::ResumeDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    FullName,
    TargetPosition,
    Email,
    Phone,
    City,
    ProfileLinks,
    Summary,
    Skills,
    ExperienceDecision,
    ExperienceCompany,
    ExperienceRole,
    ExperiencePeriod,
    ExperienceDescription,
    ExperienceContinue,
    EducationDecision,
    EducationInstitution,
    EducationDegree,
    EducationSpecialty,
    EducationYears,
    EducationContinue,
    Languages,
    CertificatesDecision,
    Certificates,
    Preview,
    FormatChoice,
}

/// Single-valued personal fields targeted by linear text steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    FullName,
    TargetPosition,
    Email,
    Phone,
    City,
    ProfileLinks,
    Summary,
}

impl TextField {
    pub fn write(self, doc: &mut ResumeDocument, value: String) {
        let p = &mut doc.personal_info;
        match self {
            TextField::FullName => p.full_name = value,
            TextField::TargetPosition => p.target_position = value,
            TextField::Email => p.email = value,
            TextField::Phone => p.phone = value,
            TextField::City => p.city = value,
            TextField::ProfileLinks => p.profile_links = value,
            TextField::Summary => p.summary = value,
        }
    }
}

/// Comma-separated list fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListField {
    Skills,
    Languages,
    Certificates,
}

impl ListField {
    pub fn write(self, doc: &mut ResumeDocument, values: Vec<String>) {
        match self {
            ListField::Skills => doc.skills = values,
            ListField::Languages => doc.languages_spoken = values,
            ListField::Certificates => doc.certificates = values,
        }
    }
}

/// Per-iteration fields of the repeatable loops, buffered in [`Scratch`]
/// until the iteration completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScratchField {
    Company,
    Role,
    Period,
    Description,
    Institution,
    Degree,
    Specialty,
    Years,
}

/// Which repeatable collection a loop iteration commits into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopList {
    Experience,
    Education,
}

/// How the engine interprets an answer at a given step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Free text into one personal field, then advance.
    Text { field: TextField, next: Step },
    /// Comma-split list (at least one token), then advance.
    List { field: ListField, next: Step },
    /// Yes/no gate. The affirmative token enters, anything else skips.
    Decision { enter: Step, skip: Step },
    /// Free text into a scratch field mid-iteration.
    LoopField { field: ScratchField, next: Step },
    /// Final field of an iteration: commits the entry, clears scratch.
    LoopLast {
        field: ScratchField,
        list: LoopList,
        next: Step,
    },
    /// Continue/finish choice after a committed iteration.
    LoopContinue { repeat: Step, done: Step },
    /// Draft summary + confirm-or-edit.
    Preview,
    /// Enumerated output format; terminal interactive step.
    FormatChoice,
}

pub struct StepSpec {
    pub prompt: &'static str,
    pub quick_replies: &'static [&'static str],
    pub kind: StepKind,
}

impl Step {
    pub fn first() -> Step {
        Step::FullName
    }

    pub const fn spec(self) -> StepSpec {
        match self {
            Step::FullName => StepSpec {
                prompt: "What's your full name?",
                quick_replies: &[],
                kind: StepKind::Text {
                    field: TextField::FullName,
                    next: Step::TargetPosition,
                },
            },
            Step::TargetPosition => StepSpec {
                prompt: "What position are you applying for?",
                quick_replies: &[],
                kind: StepKind::Text {
                    field: TextField::TargetPosition,
                    next: Step::Email,
                },
            },
            Step::Email => StepSpec {
                prompt: "What's your email address?",
                quick_replies: &[],
                kind: StepKind::Text {
                    field: TextField::Email,
                    next: Step::Phone,
                },
            },
            Step::Phone => StepSpec {
                prompt: "What's your phone number?",
                quick_replies: &[],
                kind: StepKind::Text {
                    field: TextField::Phone,
                    next: Step::City,
                },
            },
            Step::City => StepSpec {
                prompt: "Which city are you based in?",
                quick_replies: &[],
                kind: StepKind::Text {
                    field: TextField::City,
                    next: Step::ProfileLinks,
                },
            },
            Step::ProfileLinks => StepSpec {
                prompt: "Share links to your profiles (GitHub, LinkedIn, portfolio).",
                quick_replies: &[],
                kind: StepKind::Text {
                    field: TextField::ProfileLinks,
                    next: Step::Summary,
                },
            },
            Step::Summary => StepSpec {
                prompt: "Write a couple of sentences about yourself.",
                quick_replies: &[],
                kind: StepKind::Text {
                    field: TextField::Summary,
                    next: Step::Skills,
                },
            },
            Step::Skills => StepSpec {
                prompt: "List your skills, separated by commas.",
                quick_replies: &[],
                kind: StepKind::List {
                    field: ListField::Skills,
                    next: Step::ExperienceDecision,
                },
            },
            Step::ExperienceDecision => StepSpec {
                prompt: "Shall we add work experience?",
                quick_replies: &["Yes", "No"],
                kind: StepKind::Decision {
                    enter: Step::ExperienceCompany,
                    skip: Step::EducationDecision,
                },
            },
            Step::ExperienceCompany => StepSpec {
                prompt: "Company name?",
                quick_replies: &[],
                kind: StepKind::LoopField {
                    field: ScratchField::Company,
                    next: Step::ExperienceRole,
                },
            },
            Step::ExperienceRole => StepSpec {
                prompt: "Your role there?",
                quick_replies: &[],
                kind: StepKind::LoopField {
                    field: ScratchField::Role,
                    next: Step::ExperiencePeriod,
                },
            },
            Step::ExperiencePeriod => StepSpec {
                prompt: "Employment period (e.g. 2021 — 2023)?",
                quick_replies: &[],
                kind: StepKind::LoopField {
                    field: ScratchField::Period,
                    next: Step::ExperienceDescription,
                },
            },
            Step::ExperienceDescription => StepSpec {
                prompt: "What did you do there?",
                quick_replies: &[],
                kind: StepKind::LoopLast {
                    field: ScratchField::Description,
                    list: LoopList::Experience,
                    next: Step::ExperienceContinue,
                },
            },
            Step::ExperienceContinue => StepSpec {
                prompt: "Job added. Add another one?",
                quick_replies: &["Add another", "Finish"],
                kind: StepKind::LoopContinue {
                    repeat: Step::ExperienceCompany,
                    done: Step::EducationDecision,
                },
            },
            Step::EducationDecision => StepSpec {
                prompt: "Shall we add education?",
                quick_replies: &["Yes", "No"],
                kind: StepKind::Decision {
                    enter: Step::EducationInstitution,
                    skip: Step::Languages,
                },
            },
            Step::EducationInstitution => StepSpec {
                prompt: "Name of the institution?",
                quick_replies: &[],
                kind: StepKind::LoopField {
                    field: ScratchField::Institution,
                    next: Step::EducationDegree,
                },
            },
            Step::EducationDegree => StepSpec {
                prompt: "Degree or level?",
                quick_replies: &[],
                kind: StepKind::LoopField {
                    field: ScratchField::Degree,
                    next: Step::EducationSpecialty,
                },
            },
            Step::EducationSpecialty => StepSpec {
                prompt: "Field of study?",
                quick_replies: &[],
                kind: StepKind::LoopField {
                    field: ScratchField::Specialty,
                    next: Step::EducationYears,
                },
            },
            Step::EducationYears => StepSpec {
                prompt: "Years of study (e.g. 2016 — 2020)?",
                quick_replies: &[],
                kind: StepKind::LoopLast {
                    field: ScratchField::Years,
                    list: LoopList::Education,
                    next: Step::EducationContinue,
                },
            },
            Step::EducationContinue => StepSpec {
                prompt: "Education added. Add another one?",
                quick_replies: &["Add another", "Finish"],
                kind: StepKind::LoopContinue {
                    repeat: Step::EducationInstitution,
                    done: Step::Languages,
                },
            },
            Step::Languages => StepSpec {
                prompt: "Which languages do you speak? Separate with commas.",
                quick_replies: &[],
                kind: StepKind::List {
                    field: ListField::Languages,
                    next: Step::CertificatesDecision,
                },
            },
            Step::CertificatesDecision => StepSpec {
                prompt: "Do you have certificates to add?",
                quick_replies: &["Yes", "No"],
                kind: StepKind::Decision {
                    enter: Step::Certificates,
                    skip: Step::Preview,
                },
            },
            Step::Certificates => StepSpec {
                prompt: "List your certificates, separated by commas.",
                quick_replies: &[],
                kind: StepKind::List {
                    field: ListField::Certificates,
                    next: Step::Preview,
                },
            },
            Step::Preview => StepSpec {
                prompt: "Reply 'confirm' to pick an output format, or name a section to edit: \
                         name, position, email, phone, city, links, summary, skills, experience, \
                         education, languages, certificates.",
                quick_replies: &["Confirm"],
                kind: StepKind::Preview,
            },
            Step::FormatChoice => StepSpec {
                prompt: "Which format would you like?",
                quick_replies: &["Document", "Image"],
                kind: StepKind::FormatChoice,
            },
        }
    }

    /// The full backbone in walking order. Used to reason about
    /// step positions in tests and in the review loop-back logic.
    pub fn backbone() -> &'static [Step] {
        &[
            Step::FullName,
            Step::TargetPosition,
            Step::Email,
            Step::Phone,
            Step::City,
            Step::ProfileLinks,
            Step::Summary,
            Step::Skills,
            Step::ExperienceDecision,
            Step::ExperienceCompany,
            Step::ExperienceRole,
            Step::ExperiencePeriod,
            Step::ExperienceDescription,
            Step::ExperienceContinue,
            Step::EducationDecision,
            Step::EducationInstitution,
            Step::EducationDegree,
            Step::EducationSpecialty,
            Step::EducationYears,
            Step::EducationContinue,
            Step::Languages,
            Step::CertificatesDecision,
            Step::Certificates,
            Step::Preview,
            Step::FormatChoice,
        ]
    }

    pub fn section(self) -> Section {
        match self {
            Step::FullName => Section::Name,
            Step::TargetPosition => Section::Position,
            Step::Email => Section::Email,
            Step::Phone => Section::Phone,
            Step::City => Section::City,
            Step::ProfileLinks => Section::Links,
            Step::Summary => Section::Summary,
            Step::Skills => Section::Skills,
            Step::ExperienceDecision
            | Step::ExperienceCompany
            | Step::ExperienceRole
            | Step::ExperiencePeriod
            | Step::ExperienceDescription
            | Step::ExperienceContinue => Section::Experience,
            Step::EducationDecision
            | Step::EducationInstitution
            | Step::EducationDegree
            | Step::EducationSpecialty
            | Step::EducationYears
            | Step::EducationContinue => Section::Education,
            Step::Languages => Section::Languages,
            Step::CertificatesDecision | Step::Certificates => Section::Certificates,
            Step::Preview | Step::FormatChoice => Section::Review,
        }
    }
}

/// Editable document sections, addressable by name from the review step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    Name,
    Position,
    Email,
    Phone,
    City,
    Links,
    Summary,
    Skills,
    Experience,
    Education,
    Languages,
    Certificates,
    Review,
}

impl Section {
    /// Maps a review-step reply to a section, if it names one.
    pub fn parse(raw: &str) -> Option<Section> {
        match raw.trim().to_lowercase().as_str() {
            "name" | "имя" => Some(Section::Name),
            "position" | "должность" => Some(Section::Position),
            "email" | "почта" => Some(Section::Email),
            "phone" | "телефон" => Some(Section::Phone),
            "city" | "город" => Some(Section::City),
            "links" | "ссылки" => Some(Section::Links),
            "summary" | "о себе" => Some(Section::Summary),
            "skills" | "навыки" => Some(Section::Skills),
            "experience" | "опыт" => Some(Section::Experience),
            "education" | "образование" => Some(Section::Education),
            "languages" | "языки" => Some(Section::Languages),
            "certificates" | "сертификаты" => Some(Section::Certificates),
            _ => None,
        }
    }

    /// First step of the section when re-entered for editing.
    pub fn entry_step(self) -> Option<Step> {
        match self {
            Section::Name => Some(Step::FullName),
            Section::Position => Some(Step::TargetPosition),
            Section::Email => Some(Step::Email),
            Section::Phone => Some(Step::Phone),
            Section::City => Some(Step::City),
            Section::Links => Some(Step::ProfileLinks),
            Section::Summary => Some(Step::Summary),
            Section::Skills => Some(Step::Skills),
            Section::Experience => Some(Step::ExperienceDecision),
            Section::Education => Some(Step::EducationDecision),
            Section::Languages => Some(Step::Languages),
            Section::Certificates => Some(Step::CertificatesDecision),
            Section::Review => None,
        }
    }

    /// Clears the section's collected data before re-entry, so the
    /// edited path starts from a clean slate.
    pub fn clear(self, doc: &mut ResumeDocument, scratch: &mut Scratch) {
        match self {
            Section::Name => doc.personal_info.full_name.clear(),
            Section::Position => doc.personal_info.target_position.clear(),
            Section::Email => doc.personal_info.email.clear(),
            Section::Phone => doc.personal_info.phone.clear(),
            Section::City => doc.personal_info.city.clear(),
            Section::Links => doc.personal_info.profile_links.clear(),
            Section::Summary => doc.personal_info.summary.clear(),
            Section::Skills => doc.skills.clear(),
            Section::Experience => {
                doc.work_experience.clear();
                scratch.clear();
            }
            Section::Education => {
                doc.education.clear();
                scratch.clear();
            }
            Section::Languages => doc.languages_spoken.clear(),
            Section::Certificates => doc.certificates.clear(),
            Section::Review => {}
        }
    }
}
