use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::document::ResumeDocument;
use crate::errors::AppError;
use crate::models::resume::{ResumeLanguage, ResumeVersionRow, VersionSource};
use crate::resumes::repository::ResumePatch;
use crate::state::AppState;
use crate::translation::TranslateMode;

#[derive(Deserialize)]
pub struct TranslateRequest {
    pub target_language: String,
    #[serde(default)]
    pub mode: TranslateMode,
}

/// POST /api/v1/resumes/:id/translate
///
/// Translates the current content and commits it as the next version.
/// The parent row's language follows the translation.
pub async fn handle_translate_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TranslateRequest>,
) -> Result<Json<ResumeVersionRow>, AppError> {
    let target = ResumeLanguage::parse(&req.target_language).ok_or_else(|| {
        AppError::Validation(format!("Unsupported language: {}", req.target_language))
    })?;

    let resume = state
        .resumes
        .get_resume(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;

    let doc: ResumeDocument = serde_json::from_value(resume.content.clone())
        .map_err(|e| AppError::Internal(e.into()))?;
    let translated = state.translator.translate(&doc, target, req.mode).await?;
    let content =
        serde_json::to_value(&translated).map_err(|e| AppError::Internal(e.into()))?;

    let version = state
        .resumes
        .append_version(id, &content, VersionSource::AiTranslation)
        .await?;
    state
        .resumes
        .update_resume(
            id,
            ResumePatch {
                language: Some(target),
                ..Default::default()
            },
        )
        .await?;

    Ok(Json(version))
}
