//! LaTeX-backed renderer: writes a .tex file into a scratch directory,
//! compiles it with `pdflatex`, and for PNG output rasterizes the first
//! page with `pdftoppm`. The scratch directory is dropped with the
//! tempdir handle, so no per-render files survive on disk.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::process::Command;

use crate::document::{ResumeDocument, WorkExperience};
use crate::render::{
    DocumentRenderer, RenderError, RenderFormat, RenderedArtifact, DEFAULT_TEMPLATE_ID,
};

const PNG_DPI: &str = "200";

pub struct LatexRenderer {
    pdflatex_bin: String,
    pdftoppm_bin: String,
}

impl Default for LatexRenderer {
    fn default() -> Self {
        LatexRenderer {
            pdflatex_bin: "pdflatex".to_string(),
            pdftoppm_bin: "pdftoppm".to_string(),
        }
    }
}

impl LatexRenderer {
    pub fn new(pdflatex_bin: impl Into<String>, pdftoppm_bin: impl Into<String>) -> Self {
        LatexRenderer {
            pdflatex_bin: pdflatex_bin.into(),
            pdftoppm_bin: pdftoppm_bin.into(),
        }
    }

    async fn run_tool(
        &self,
        bin: &str,
        args: &[&str],
        workdir: &std::path::Path,
    ) -> Result<(), RenderError> {
        let output = Command::new(bin)
            .args(args)
            .current_dir(workdir)
            .output()
            .await?;
        if !output.status.success() {
            return Err(RenderError::Engine {
                message: format!("{bin} exited with {}", output.status),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentRenderer for LatexRenderer {
    async fn render(
        &self,
        doc: &ResumeDocument,
        template_id: &str,
        format: RenderFormat,
    ) -> Result<RenderedArtifact, RenderError> {
        if template_id != DEFAULT_TEMPLATE_ID {
            return Err(RenderError::UnknownTemplate(template_id.to_string()));
        }
        let source = build_latex(doc);
        let dir = tempfile::tempdir()?;
        let tex_path = dir.path().join("resume.tex");
        tokio::fs::write(&tex_path, source).await?;

        self.run_tool(
            &self.pdflatex_bin,
            &["-interaction=nonstopmode", "-halt-on-error", "resume.tex"],
            dir.path(),
        )
        .await?;

        let pdf_path = dir.path().join("resume.pdf");
        let artifact_path = match format {
            RenderFormat::Pdf => pdf_path,
            RenderFormat::Png => {
                // -singlefile keeps only the first page, matching the preview use.
                self.run_tool(
                    &self.pdftoppm_bin,
                    &["-png", "-singlefile", "-r", PNG_DPI, "resume.pdf", "resume"],
                    dir.path(),
                )
                .await?;
                dir.path().join("resume.png")
            }
        };

        let bytes = tokio::fs::read(&artifact_path)
            .await
            .map_err(|_| RenderError::MissingOutput)?;

        Ok(RenderedArtifact {
            bytes: Bytes::from(bytes),
            content_type: format.content_type(),
            file_ext: format.file_ext(),
        })
    }
}

// ─────────────────────────────────────────────
// LaTeX source generation
// ─────────────────────────────────────────────

/// Escapes the characters LaTeX treats specially in user text. Backslash
/// first, then the single-character replacements.
pub fn latex_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str(r"\textbackslash{}"),
            '&' => out.push_str(r"\&"),
            '%' => out.push_str(r"\%"),
            '$' => out.push_str(r"\$"),
            '#' => out.push_str(r"\#"),
            '_' => out.push_str(r"\_"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            _ => out.push(ch),
        }
    }
    out
}

/// Builds the full LaTeX document for a finished draft. Sections with no
/// content are omitted entirely rather than rendered empty.
pub fn build_latex(doc: &ResumeDocument) -> String {
    let mut out = String::new();
    out.push_str("\\documentclass[11pt]{article}\n");
    out.push_str("\\usepackage[utf8]{inputenc}\n");
    out.push_str("\\usepackage[T1,T2A]{fontenc}\n");
    out.push_str("\\usepackage[margin=2cm]{geometry}\n");
    out.push_str("\\pagestyle{empty}\n");
    out.push_str("\\begin{document}\n\n");

    let p = &doc.personal_info;
    out.push_str(&format!(
        "{{\\LARGE \\textbf{{{}}}}}\\\\[2pt]\n",
        latex_escape(&p.full_name)
    ));
    if !p.target_position.trim().is_empty() {
        out.push_str(&format!("{{\\large {}}}\\\\[6pt]\n", latex_escape(&p.target_position)));
    }

    let contact: Vec<String> = [&p.email, &p.phone, &p.city, &p.profile_links]
        .iter()
        .filter(|v| !v.trim().is_empty())
        .map(|v| latex_escape(v))
        .collect();
    if !contact.is_empty() {
        out.push_str(&format!("{}\\\\\n", contact.join(" \\textbar{} ")));
    }

    if !p.summary.trim().is_empty() {
        out.push_str("\n\\section*{Summary}\n");
        out.push_str(&latex_escape(&p.summary));
        out.push('\n');
    }

    if !doc.skills.is_empty() {
        out.push_str("\n\\section*{Skills}\n");
        out.push_str(&escape_join(&doc.skills));
        out.push('\n');
    }

    if !doc.work_experience.is_empty() {
        out.push_str("\n\\section*{Experience}\n");
        for job in &doc.work_experience {
            out.push_str(&experience_block(job));
        }
    }

    if !doc.education.is_empty() {
        out.push_str("\n\\section*{Education}\n");
        for edu in &doc.education {
            out.push_str(&format!(
                "\\textbf{{{}}} -- {}, {} ({})\\\\[4pt]\n",
                latex_escape(&edu.institution),
                latex_escape(&edu.degree),
                latex_escape(&edu.specialty),
                latex_escape(&edu.years)
            ));
        }
    }

    if !doc.languages_spoken.is_empty() {
        out.push_str("\n\\section*{Languages}\n");
        out.push_str(&escape_join(&doc.languages_spoken));
        out.push('\n');
    }

    if !doc.certificates.is_empty() {
        out.push_str("\n\\section*{Certificates}\n");
        out.push_str(&escape_join(&doc.certificates));
        out.push('\n');
    }

    out.push_str("\n\\end{document}\n");
    out
}

fn experience_block(job: &WorkExperience) -> String {
    format!(
        "\\textbf{{{}}} -- {} ({})\\\\\n{}\\\\[6pt]\n",
        latex_escape(&job.company),
        latex_escape(&job.role),
        latex_escape(&job.period),
        latex_escape(&job.description)
    )
}

fn escape_join(values: &[String]) -> String {
    values
        .iter()
        .map(|v| latex_escape(v))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Education, PersonalInfo};

    fn make_doc() -> ResumeDocument {
        ResumeDocument {
            personal_info: PersonalInfo {
                full_name: "Alice Doe".into(),
                target_position: "Backend Engineer".into(),
                email: "alice@example.com".into(),
                phone: "+1 555 0100".into(),
                city: "Berlin".into(),
                profile_links: "github.com/alice".into(),
                summary: "Ships reliable services.".into(),
            },
            skills: vec!["Rust".into(), "PostgreSQL".into()],
            work_experience: vec![WorkExperience {
                company: "Acme & Sons".into(),
                role: "Engineer".into(),
                period: "2020-2023".into(),
                description: "Built 100% of the billing path".into(),
            }],
            education: vec![Education {
                institution: "MIT".into(),
                degree: "BSc".into(),
                specialty: "CS".into(),
                years: "2016-2020".into(),
            }],
            languages_spoken: vec!["English".into()],
            certificates: vec![],
        }
    }

    #[test]
    fn test_escape_covers_special_characters() {
        assert_eq!(latex_escape("A & B"), r"A \& B");
        assert_eq!(latex_escape("100%"), r"100\%");
        assert_eq!(latex_escape("snake_case"), r"snake\_case");
        assert_eq!(latex_escape("{x}"), r"\{x\}");
        assert_eq!(latex_escape(r"C:\dir"), r"C:\textbackslash{}dir");
        assert_eq!(latex_escape("a^b~c"), r"a\textasciicircum{}b\textasciitilde{}c");
    }

    #[test]
    fn test_build_latex_escapes_user_text() {
        let source = build_latex(&make_doc());
        assert!(source.contains(r"Acme \& Sons"));
        assert!(source.contains(r"100\% of the billing path"));
        assert!(!source.contains("Acme & Sons"));
    }

    #[test]
    fn test_build_latex_includes_populated_sections() {
        let source = build_latex(&make_doc());
        for section in ["Summary", "Skills", "Experience", "Education", "Languages"] {
            assert!(
                source.contains(&format!("\\section*{{{section}}}")),
                "missing section {section}"
            );
        }
        assert!(source.contains("Rust, PostgreSQL"));
        assert!(source.contains("MIT"));
    }

    #[test]
    fn test_build_latex_omits_empty_sections() {
        let source = build_latex(&make_doc());
        assert!(!source.contains("\\section*{Certificates}"));

        let empty = build_latex(&ResumeDocument::default());
        assert!(!empty.contains("\\section*{Skills}"));
        assert!(!empty.contains("\\section*{Experience}"));
        assert!(empty.contains("\\begin{document}"));
        assert!(empty.contains("\\end{document}"));
    }
}
