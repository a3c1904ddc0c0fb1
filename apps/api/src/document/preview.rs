//! Plain-text draft summary shown at the review step, before the user
//! confirms rendering. Walks the document in display order; empty
//! sections are listed with an explicit "none" marker so the user can
//! spot what they skipped.

use crate::document::ResumeDocument;

const NONE_MARKER: &str = "—";

/// Renders the whole draft as a flat text block.
pub fn render_preview(doc: &ResumeDocument) -> String {
    let mut out = String::from("Here is your resume so far:\n");
    let p = &doc.personal_info;

    push_field(&mut out, "Name", &p.full_name);
    push_field(&mut out, "Position", &p.target_position);
    push_field(&mut out, "Email", &p.email);
    push_field(&mut out, "Phone", &p.phone);
    push_field(&mut out, "City", &p.city);
    push_field(&mut out, "Links", &p.profile_links);
    push_field(&mut out, "Summary", &p.summary);

    push_list(&mut out, "Skills", &doc.skills);

    out.push_str("\nExperience:\n");
    if doc.work_experience.is_empty() {
        out.push_str(&format!("  {NONE_MARKER}\n"));
    }
    for (i, job) in doc.work_experience.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {} — {} ({})\n     {}\n",
            i + 1,
            job.company,
            job.role,
            job.period,
            job.description
        ));
    }

    out.push_str("\nEducation:\n");
    if doc.education.is_empty() {
        out.push_str(&format!("  {NONE_MARKER}\n"));
    }
    for (i, edu) in doc.education.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {} — {}, {} ({})\n",
            i + 1,
            edu.institution,
            edu.degree,
            edu.specialty,
            edu.years
        ));
    }

    push_list(&mut out, "Languages", &doc.languages_spoken);
    push_list(&mut out, "Certificates", &doc.certificates);

    out
}

fn push_field(out: &mut String, label: &str, value: &str) {
    if value.trim().is_empty() {
        out.push_str(&format!("{label}: {NONE_MARKER}\n"));
    } else {
        out.push_str(&format!("{label}: {value}\n"));
    }
}

fn push_list(out: &mut String, label: &str, values: &[String]) {
    if values.is_empty() {
        out.push_str(&format!("{label}: {NONE_MARKER}\n"));
    } else {
        out.push_str(&format!("{label}: {}\n", values.join(", ")));
    }
}
