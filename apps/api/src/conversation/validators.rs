//! Input normalization for the guided flow. Every function is pure and
//! total over arbitrary user text; the transition engine decides what a
//! rejection means (always: stay on the step and re-ask).
//!
//! The bot grew up speaking Russian, so the fixed token sets accept both
//! English and Russian forms.

use crate::render::RenderFormat;

const AFFIRMATIVE_TOKENS: &[&str] = &["yes", "y", "да"];
const MORE_TOKENS: &[&str] = &["more", "another", "ещё", "еще"];
const CONFIRM_TOKENS: &[&str] = &["confirm", "готово"];

/// Trims surrounding whitespace; rejects empty input.
pub fn normalize_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Splits a comma-separated answer into trimmed, non-empty tokens.
/// `"Python, Go,  Rust ,,"` becomes `["Python", "Go", "Rust"]`.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Exact (case-insensitive, trimmed) match against the affirmative token
/// set. Anything else at a yes/no step is the negative branch.
pub fn is_affirmative(raw: &str) -> bool {
    let lowered = raw.trim().to_lowercase();
    AFFIRMATIVE_TOKENS.contains(&lowered.as_str())
}

/// Continuation choice after a completed loop iteration: substring match
/// against the "more" token set wins, anything else means finish.
pub fn wants_more(raw: &str) -> bool {
    let lowered = raw.trim().to_lowercase();
    MORE_TOKENS.iter().any(|t| lowered.contains(t))
}

/// Exact (case-insensitive) confirmation at the review step.
pub fn is_confirmation(raw: &str) -> bool {
    let lowered = raw.trim().to_lowercase();
    CONFIRM_TOKENS.contains(&lowered.as_str())
}

/// Output format choice. Unrecognized input re-prompts.
pub fn parse_format(raw: &str) -> Option<RenderFormat> {
    match raw.trim().to_lowercase().as_str() {
        "document" | "pdf" | "документ" => Some(RenderFormat::Pdf),
        "image" | "png" | "картинка" | "изображение" => Some(RenderFormat::Png),
        _ => None,
    }
}

/// Commands that abandon the current session and start over.
pub fn is_restart_command(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "/start" | "/create" | "restart" | "заново"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_rejects_empty() {
        assert_eq!(normalize_text("  Alice  "), Some("Alice".to_string()));
        assert_eq!(normalize_text("   "), None);
        assert_eq!(normalize_text(""), None);
    }

    #[test]
    fn test_split_list_drops_empty_tokens() {
        assert_eq!(
            split_list("Python, Go,  Rust ,,"),
            vec!["Python", "Go", "Rust"]
        );
        assert!(split_list(" , ,").is_empty());
        assert_eq!(split_list("solo"), vec!["solo"]);
    }

    #[test]
    fn test_affirmative_tokens_case_insensitive() {
        assert!(is_affirmative("Yes"));
        assert!(is_affirmative(" YES "));
        assert!(is_affirmative("Да"));
        assert!(!is_affirmative("nope"));
        assert!(!is_affirmative("нет"));
        assert!(!is_affirmative("yes please"));
    }

    #[test]
    fn test_wants_more_is_substring_match() {
        assert!(wants_more("Add another one"));
        assert!(wants_more("MORE"));
        assert!(wants_more("добавить ещё"));
        assert!(!wants_more("finish"));
        assert!(!wants_more("done, thanks"));
    }

    #[test]
    fn test_confirmation_is_exact_match() {
        assert!(is_confirmation("Confirm"));
        assert!(is_confirmation("ГОТОВО"));
        assert!(!is_confirmation("confirm please"));
        assert!(!is_confirmation("ok"));
    }

    #[test]
    fn test_parse_format_enumerated_set() {
        assert_eq!(parse_format("PDF"), Some(RenderFormat::Pdf));
        assert_eq!(parse_format("document"), Some(RenderFormat::Pdf));
        assert_eq!(parse_format("Image"), Some(RenderFormat::Png));
        assert_eq!(parse_format("png"), Some(RenderFormat::Png));
        assert_eq!(parse_format("docx"), None);
        assert_eq!(parse_format(""), None);
    }

    #[test]
    fn test_restart_commands() {
        assert!(is_restart_command("/start"));
        assert!(is_restart_command("/create"));
        assert!(is_restart_command("Restart"));
        assert!(!is_restart_command("start over maybe"));
    }
}
