//! The pure transition engine: `(session, input) -> Transition`.
//!
//! No I/O here. The engine mutates only the session it is given; the
//! service layer owns loading, storing and the finalization pipeline.
//! Invalid input always leaves both the step and the draft untouched.

use crate::conversation::session::Session;
use crate::conversation::steps::{LoopList, Section, Step, StepKind};
use crate::conversation::validators;
use crate::render::RenderFormat;

const EMPTY_ANSWER: &str = "I need a non-empty answer here. Let's try again.";
const EMPTY_LIST: &str = "Give me at least one item, separated by commas.";
const UNKNOWN_FORMAT: &str = "Please choose one of: document, image.";

/// Outcome of feeding one user reply into the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Input rejected; step and draft unchanged. `message` re-asks.
    Stay { message: String },
    /// Session advanced to `step`.
    Next { step: Step },
    /// The interactive flow is complete; hand off to finalization.
    Finalize { format: RenderFormat },
}

/// Applies one reply to the session's current step.
pub fn apply(session: &mut Session, raw: &str) -> Transition {
    match session.current_step.spec().kind {
        StepKind::Text { field, next } => match validators::normalize_text(raw) {
            Some(value) => {
                field.write(&mut session.draft, value);
                advance(session, next)
            }
            None => stay(EMPTY_ANSWER),
        },
        StepKind::List { field, next } => {
            if raw.trim().is_empty() {
                return stay(EMPTY_ANSWER);
            }
            let tokens = validators::split_list(raw);
            if tokens.is_empty() {
                return stay(EMPTY_LIST);
            }
            field.write(&mut session.draft, tokens);
            advance(session, next)
        }
        StepKind::Decision { enter, skip } => {
            if raw.trim().is_empty() {
                return stay(EMPTY_ANSWER);
            }
            if validators::is_affirmative(raw) {
                advance(session, enter)
            } else {
                advance(session, skip)
            }
        }
        StepKind::LoopField { field, next } => match validators::normalize_text(raw) {
            Some(value) => {
                session.scratch.set(field, value);
                advance(session, next)
            }
            None => stay(EMPTY_ANSWER),
        },
        StepKind::LoopLast { field, list, next } => match validators::normalize_text(raw) {
            Some(value) => {
                session.scratch.set(field, value);
                commit_iteration(session, list);
                advance(session, next)
            }
            None => stay(EMPTY_ANSWER),
        },
        StepKind::LoopContinue { repeat, done } => {
            if raw.trim().is_empty() {
                return stay(EMPTY_ANSWER);
            }
            if validators::wants_more(raw) {
                advance(session, repeat)
            } else {
                advance(session, done)
            }
        }
        StepKind::Preview => {
            if validators::is_confirmation(raw) {
                return advance(session, Step::FormatChoice);
            }
            match Section::parse(raw) {
                Some(section) => enter_edit(session, section),
                None => stay(format!(
                    "I didn't catch that. {}",
                    Step::Preview.spec().prompt
                )),
            }
        }
        StepKind::FormatChoice => match validators::parse_format(raw) {
            Some(format) => Transition::Finalize { format },
            None => stay(UNKNOWN_FORMAT),
        },
    }
}

fn stay(message: impl Into<String>) -> Transition {
    Transition::Stay {
        message: message.into(),
    }
}

/// Appends the completed loop entry and clears the scratch buffer.
/// The sub-sequence ordering guarantees all fields are present.
fn commit_iteration(session: &mut Session, list: LoopList) {
    match list {
        LoopList::Experience => {
            if let Some(entry) = session.scratch.take_experience() {
                session.draft.work_experience.push(entry);
            }
        }
        LoopList::Education => {
            if let Some(entry) = session.scratch.take_education() {
                session.draft.education.push(entry);
            }
        }
    }
    session.scratch.clear();
}

/// Moves to `next`, short-circuiting back to the review step when an
/// edited section has just been completed.
fn advance(session: &mut Session, next: Step) -> Transition {
    let leaving_section = session.current_step.section();
    let target = if session.return_to_preview
        && next != Step::Preview
        && next.section() != leaving_section
    {
        Step::Preview
    } else {
        next
    };
    if target == Step::Preview {
        session.return_to_preview = false;
    }
    session.current_step = target;
    Transition::Next { step: target }
}

/// Re-enters the backbone at the named section with its data cleared.
fn enter_edit(session: &mut Session, section: Section) -> Transition {
    match section.entry_step() {
        Some(entry) => {
            section.clear(&mut session.draft, &mut session.scratch);
            session.return_to_preview = true;
            session.current_step = entry;
            Transition::Next { step: entry }
        }
        None => stay(format!(
            "That section can't be edited. {}",
            Step::Preview.spec().prompt
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ResumeDocument;

    fn session() -> Session {
        Session::new("chat-1")
    }

    /// Feeds replies one by one, asserting none of them is rejected.
    fn drive(session: &mut Session, replies: &[&str]) {
        for reply in replies {
            match apply(session, reply) {
                Transition::Stay { message } => {
                    panic!("reply {reply:?} rejected at {:?}: {message}", session.current_step)
                }
                _ => {}
            }
        }
    }

    const TO_PREVIEW: &[&str] = &[
        "Alice",
        "Engineer",
        "alice@example.com",
        "+1 555 0100",
        "Berlin",
        "github.com/alice",
        "I build backends.",
        "Rust, SQL",
        "no",
        "no",
        "English, German",
        "no",
    ];

    #[test]
    fn test_linear_step_writes_exactly_the_targeted_field() {
        let mut s = session();
        let before = s.draft.clone();
        assert_eq!(
            apply(&mut s, "  Alice  "),
            Transition::Next {
                step: Step::TargetPosition
            }
        );
        assert_eq!(s.draft.personal_info.full_name, "Alice");
        let mut expected = before;
        expected.personal_info.full_name = "Alice".to_string();
        assert_eq!(s.draft, expected);
    }

    #[test]
    fn test_invalid_input_changes_nothing() {
        let mut s = session();
        drive(&mut s, &["Alice", "Engineer"]);
        let step_before = s.current_step;
        let draft_before = s.draft.clone();

        let out = apply(&mut s, "   ");
        assert!(matches!(out, Transition::Stay { .. }));
        assert_eq!(s.current_step, step_before);
        assert_eq!(s.draft, draft_before);

        // Rejection is idempotent: a second bad reply is no different.
        let out = apply(&mut s, "");
        assert!(matches!(out, Transition::Stay { .. }));
        assert_eq!(s.current_step, step_before);
        assert_eq!(s.draft, draft_before);
    }

    #[test]
    fn test_skills_input_normalized() {
        let mut s = session();
        drive(&mut s, &[
            "Alice",
            "Engineer",
            "a@b.c",
            "555",
            "Berlin",
            "-",
            "About me",
        ]);
        assert_eq!(s.current_step, Step::Skills);
        drive(&mut s, &["Python, Go,  Rust ,,"]);
        assert_eq!(s.draft.skills, vec!["Python", "Go", "Rust"]);
    }

    #[test]
    fn test_skills_rejects_all_empty_tokens() {
        let mut s = session();
        drive(&mut s, &[
            "Alice", "Engineer", "a@b.c", "555", "Berlin", "-", "About",
        ]);
        let out = apply(&mut s, " , ,");
        assert!(matches!(out, Transition::Stay { .. }));
        assert_eq!(s.current_step, Step::Skills);
        assert!(s.draft.skills.is_empty());
    }

    #[test]
    fn test_declining_both_loops_records_empty_collections() {
        let mut s = session();
        drive(&mut s, TO_PREVIEW);
        assert_eq!(s.current_step, Step::Preview);
        assert!(s.draft.work_experience.is_empty());
        assert!(s.draft.education.is_empty());
    }

    #[test]
    fn test_n_loop_iterations_yield_n_full_entries() {
        let mut s = session();
        drive(&mut s, &[
            "Alice", "Engineer", "a@b.c", "555", "Berlin", "-", "About", "Rust",
        ]);
        assert_eq!(s.current_step, Step::ExperienceDecision);

        drive(&mut s, &["yes", "Acme", "Dev", "2019 — 2021", "Shipped v1"]);
        assert_eq!(s.current_step, Step::ExperienceContinue);
        assert!(s.scratch.is_empty(), "scratch must be cleared after append");

        drive(&mut s, &["add another", "Globex", "Lead", "2021 — 2024", "Ran the team"]);
        drive(&mut s, &["finish"]);

        assert_eq!(s.current_step, Step::EducationDecision);
        assert_eq!(s.draft.work_experience.len(), 2);
        let first = &s.draft.work_experience[0];
        assert_eq!(
            (first.company.as_str(), first.role.as_str(), first.period.as_str(), first.description.as_str()),
            ("Acme", "Dev", "2019 — 2021", "Shipped v1")
        );
        assert_eq!(s.draft.work_experience[1].company, "Globex");
        assert!(s.scratch.is_empty());
    }

    #[test]
    fn test_education_loop_mirrors_experience_loop() {
        let mut s = session();
        drive(&mut s, &[
            "Alice", "Engineer", "a@b.c", "555", "Berlin", "-", "About", "Rust", "no",
        ]);
        assert_eq!(s.current_step, Step::EducationDecision);
        drive(&mut s, &["да", "MIT", "BSc", "CS", "2016 — 2020", "finish"]);
        assert_eq!(s.current_step, Step::Languages);
        assert_eq!(s.draft.education.len(), 1);
        assert_eq!(s.draft.education[0].specialty, "CS");
        assert!(s.scratch.is_empty());
    }

    #[test]
    fn test_certificates_gate() {
        let mut s = session();
        drive(&mut s, &[
            "Alice", "Engineer", "a@b.c", "555", "Berlin", "-", "About", "Rust", "no", "no",
            "English",
        ]);
        assert_eq!(s.current_step, Step::CertificatesDecision);
        drive(&mut s, &["yes"]);
        assert_eq!(s.current_step, Step::Certificates);
        drive(&mut s, &["AWS SAA, CKA"]);
        assert_eq!(s.current_step, Step::Preview);
        assert_eq!(s.draft.certificates, vec!["AWS SAA", "CKA"]);
    }

    #[test]
    fn test_preview_confirm_reaches_format_choice_and_finalize() {
        let mut s = session();
        drive(&mut s, TO_PREVIEW);
        drive(&mut s, &["Confirm"]);
        assert_eq!(s.current_step, Step::FormatChoice);

        let out = apply(&mut s, "PDF");
        assert_eq!(
            out,
            Transition::Finalize {
                format: RenderFormat::Pdf
            }
        );
    }

    #[test]
    fn test_format_choice_reprompts_on_unknown_value() {
        let mut s = session();
        drive(&mut s, TO_PREVIEW);
        drive(&mut s, &["confirm"]);
        let out = apply(&mut s, "docx");
        assert!(matches!(out, Transition::Stay { .. }));
        assert_eq!(s.current_step, Step::FormatChoice);
    }

    #[test]
    fn test_preview_edit_of_single_field_returns_to_preview() {
        let mut s = session();
        drive(&mut s, TO_PREVIEW);

        drive(&mut s, &["city"]);
        assert_eq!(s.current_step, Step::City);
        assert_eq!(s.draft.personal_info.city, "");
        assert!(s.return_to_preview);

        drive(&mut s, &["Munich"]);
        assert_eq!(s.current_step, Step::Preview);
        assert_eq!(s.draft.personal_info.city, "Munich");
        assert!(!s.return_to_preview);
    }

    #[test]
    fn test_preview_edit_of_loop_section_runs_the_loop_then_returns() {
        let mut s = session();
        drive(&mut s, TO_PREVIEW);

        drive(&mut s, &["experience"]);
        assert_eq!(s.current_step, Step::ExperienceDecision);

        drive(&mut s, &["yes", "Acme", "Dev", "2020", "Built it", "finish"]);
        assert_eq!(s.current_step, Step::Preview);
        assert_eq!(s.draft.work_experience.len(), 1);
    }

    #[test]
    fn test_preview_edit_declined_loop_returns_straight_to_preview() {
        let mut s = session();
        drive(&mut s, TO_PREVIEW);
        drive(&mut s, &["education", "no"]);
        assert_eq!(s.current_step, Step::Preview);
        assert!(s.draft.education.is_empty());
    }

    #[test]
    fn test_preview_unrecognized_reply_reprompts_with_section_list() {
        let mut s = session();
        drive(&mut s, TO_PREVIEW);
        let out = apply(&mut s, "make it prettier");
        match out {
            Transition::Stay { message } => {
                assert!(message.contains("experience"));
                assert!(message.contains("confirm"));
            }
            other => panic!("expected Stay, got {other:?}"),
        }
        assert_eq!(s.current_step, Step::Preview);
    }

    #[test]
    fn test_russian_end_to_end_tokens() {
        let mut s = session();
        drive(&mut s, &[
            "Alice", "Engineer", "a@b.c", "555", "Москва", "-", "Обо мне", "Rust",
        ]);
        // "да" enters the loop, the continue reply falls back to finish,
        // "нет" skips education.
        drive(&mut s, &["да", "Acme", "Dev", "2020", "Работа", "Перейти к образованию"]);
        assert_eq!(s.current_step, Step::EducationDecision);
        drive(&mut s, &["нет", "Русский", "нет"]);
        assert_eq!(s.current_step, Step::Preview);
        assert_eq!(s.draft.work_experience.len(), 1);
        assert!(s.draft.education.is_empty());
    }

    #[test]
    fn test_draft_untouched_by_rejected_preview_reply() {
        let mut s = session();
        drive(&mut s, TO_PREVIEW);
        let draft_before = s.draft.clone();
        let _ = apply(&mut s, "hmm");
        assert_eq!(s.draft, draft_before);
        assert_ne!(s.draft, ResumeDocument::default());
    }
}
