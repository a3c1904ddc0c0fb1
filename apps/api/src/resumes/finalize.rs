//! Finalization pipeline: the one place where a finished draft touches
//! every external collaborator. Fixed stage order: persist first, then
//! render, then upload and sign. The persisted version survives any
//! later stage failing, so the user can re-export through the CRUD
//! surface even when the render or upload broke.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use uuid::Uuid;

use crate::document::ResumeDocument;
use crate::errors::AppError;
use crate::models::resume::{ResumeLanguage, VersionSource};
use crate::render::{DocumentRenderer, RenderFormat, DEFAULT_TEMPLATE_ID};
use crate::resumes::repository::ResumeRepository;
use crate::storage::{artifact_key, ArtifactStore, DEFAULT_LINK_TTL};

/// What the user gets at the end: a working link, or one failure
/// message. Either way the session is torn down by the caller.
#[derive(Debug, Clone)]
pub enum Delivery {
    Link {
        download_url: String,
        expires_in_secs: u64,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct FinalizeOutcome {
    pub resume_id: Uuid,
    pub version: i32,
    pub delivery: Delivery,
}

pub struct FinalizePipeline {
    repo: Arc<dyn ResumeRepository>,
    renderer: Arc<dyn DocumentRenderer>,
    artifacts: Arc<dyn ArtifactStore>,
}

impl FinalizePipeline {
    pub fn new(
        repo: Arc<dyn ResumeRepository>,
        renderer: Arc<dyn DocumentRenderer>,
        artifacts: Arc<dyn ArtifactStore>,
    ) -> Self {
        FinalizePipeline {
            repo,
            renderer,
            artifacts,
        }
    }

    pub async fn finalize(
        &self,
        chat_id: &str,
        doc: &ResumeDocument,
        format: RenderFormat,
    ) -> Result<FinalizeOutcome, AppError> {
        if !doc.is_finalizable() {
            return Err(AppError::UnprocessableEntity(
                "A resume needs at least a name before it can be finished".to_string(),
            ));
        }

        // Stage (a): durable data before anything that can flake.
        let user = self
            .repo
            .ensure_user(chat_id, &doc.personal_info.full_name)
            .await
            .context("ensure user")?;
        let content = serde_json::to_value(doc)
            .context("serialize draft")?;
        let resume = self
            .repo
            .create_resume(
                user.id,
                &doc.title(),
                ResumeLanguage::En,
                &content,
                VersionSource::Manual,
            )
            .await
            .context("persist resume")?;

        info!(
            resume_id = %resume.id,
            chat_id = %chat_id,
            "Resume persisted, version {}",
            resume.current_version
        );

        // Stage (b): render.
        let artifact = match self.renderer.render(doc, DEFAULT_TEMPLATE_ID, format).await {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!(resume_id = %resume.id, "Render failed: {e}");
                return Ok(FinalizeOutcome {
                    resume_id: resume.id,
                    version: resume.current_version,
                    delivery: Delivery::Failed {
                        reason: e.to_string(),
                    },
                });
            }
        };

        // Stage (c): upload and sign.
        let key = artifact_key(resume.id, resume.current_version, artifact.file_ext);
        let delivery = match self
            .artifacts
            .put(&key, artifact.bytes, artifact.content_type)
            .await
        {
            Ok(()) => match self.artifacts.presigned_link(&key, DEFAULT_LINK_TTL).await {
                Ok(download_url) => {
                    info!(resume_id = %resume.id, key = %key, "Artifact stored and link signed");
                    Delivery::Link {
                        download_url,
                        expires_in_secs: DEFAULT_LINK_TTL.as_secs(),
                    }
                }
                Err(e) => {
                    warn!(resume_id = %resume.id, "Link signing failed: {e}");
                    Delivery::Failed {
                        reason: e.to_string(),
                    }
                }
            },
            Err(e) => {
                warn!(resume_id = %resume.id, "Artifact upload failed: {e}");
                Delivery::Failed {
                    reason: e.to_string(),
                }
            }
        };

        Ok(FinalizeOutcome {
            resume_id: resume.id,
            version: resume.current_version,
            delivery,
        })
    }
}
