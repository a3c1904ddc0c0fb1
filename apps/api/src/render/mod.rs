//! Document rendering boundary. The conversation layer only knows this
//! trait; the concrete LaTeX toolchain lives behind it so tests can swap
//! in a fake that never shells out.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::ResumeDocument;

pub mod latex;

pub use latex::LatexRenderer;

/// Output format the user picks at the end of the guided flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    Pdf,
    Png,
}

impl RenderFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            RenderFormat::Pdf => "application/pdf",
            RenderFormat::Png => "image/png",
        }
    }

    pub fn file_ext(self) -> &'static str {
        match self {
            RenderFormat::Pdf => "pdf",
            RenderFormat::Png => "png",
        }
    }
}

/// Finished artifact bytes plus the metadata the artifact store needs.
#[derive(Debug, Clone)]
pub struct RenderedArtifact {
    pub bytes: Bytes,
    pub content_type: &'static str,
    pub file_ext: &'static str,
}

/// The only template shipped today. The column exists so stored resumes
/// can opt into new templates without a migration.
pub const DEFAULT_TEMPLATE_ID: &str = "default";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    #[error("render engine failed: {message}")]
    Engine { message: String, stderr: String },

    #[error("render produced no output file")]
    MissingOutput,

    #[error("render I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns a completed draft into downloadable bytes.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(
        &self,
        doc: &ResumeDocument,
        template_id: &str,
        format: RenderFormat,
    ) -> Result<RenderedArtifact, RenderError>;
}
