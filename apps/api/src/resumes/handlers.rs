use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::ResumeDocument;
use crate::errors::AppError;
use crate::models::resume::{ResumeLanguage, ResumeRow, ResumeVersionRow};
use crate::render::RenderFormat;
use crate::resumes::repository::ResumePatch;
use crate::state::AppState;
use crate::storage::{artifact_key, DEFAULT_LINK_TTL};

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct CreateResumeRequest {
    pub user_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub content: ResumeDocument,
}

#[derive(Deserialize)]
pub struct UpdateResumeRequest {
    pub title: Option<String>,
    pub language: Option<String>,
    pub template_id: Option<String>,
    pub content: Option<ResumeDocument>,
}

#[derive(Deserialize)]
pub struct ExportRequest {
    pub format: RenderFormat,
    /// Omit to export the current version.
    pub version: Option<i32>,
}

#[derive(Serialize)]
pub struct ExportResponse {
    pub resume_id: Uuid,
    pub version: i32,
    pub download_url: String,
    pub expires_in_secs: u64,
}

fn parse_language(raw: Option<&str>) -> Result<Option<ResumeLanguage>, AppError> {
    match raw {
        None => Ok(None),
        Some(raw) => ResumeLanguage::parse(raw)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Unsupported language: {raw}"))),
    }
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    Json(req): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<ResumeRow>), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("Title must not be empty".to_string()));
    }
    let language = parse_language(req.language.as_deref())?.unwrap_or(ResumeLanguage::En);
    let content = serde_json::to_value(&req.content)
        .map_err(|e| AppError::Internal(e.into()))?;
    let row = state
        .resumes
        .create_resume(
            req.user_id,
            req.title.trim(),
            language,
            &content,
            crate::models::resume::VersionSource::Manual,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ResumeRow>>, AppError> {
    Ok(Json(state.resumes.list_resumes(params.user_id).await?))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeRow>, AppError> {
    let row = state
        .resumes
        .get_resume(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(Json(row))
}

/// PUT /api/v1/resumes/:id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateResumeRequest>,
) -> Result<Json<ResumeRow>, AppError> {
    let content = match &req.content {
        Some(doc) => Some(serde_json::to_value(doc).map_err(|e| AppError::Internal(e.into()))?),
        None => None,
    };
    let patch = ResumePatch {
        title: req.title,
        language: parse_language(req.language.as_deref())?,
        template_id: req.template_id,
        content,
    };
    let row = state
        .resumes
        .update_resume(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(Json(row))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.resumes.delete_resume(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Resume {id} not found")))
    }
}

/// GET /api/v1/resumes/:id/versions
pub async fn handle_list_versions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ResumeVersionRow>>, AppError> {
    state
        .resumes
        .get_resume(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(Json(state.resumes.list_versions(id).await?))
}

/// GET /api/v1/resumes/:id/versions/:version
pub async fn handle_get_version(
    State(state): State<AppState>,
    Path((id, version)): Path<(Uuid, i32)>,
) -> Result<Json<ResumeVersionRow>, AppError> {
    let row = state
        .resumes
        .get_version(id, version)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Resume {id} has no version {version}"))
        })?;
    Ok(Json(row))
}

/// POST /api/v1/resumes/:id/export
///
/// Re-renders a stored snapshot and hands back a fresh link. This is the
/// retry path when the conversational finalization lost its render.
pub async fn handle_export_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ExportRequest>,
) -> Result<Json<ExportResponse>, AppError> {
    let resume = state
        .resumes
        .get_resume(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;

    let (version, content) = match req.version {
        Some(version) => {
            let snapshot = state.resumes.get_version(id, version).await?.ok_or_else(|| {
                AppError::NotFound(format!("Resume {id} has no version {version}"))
            })?;
            (snapshot.version, snapshot.content)
        }
        None => (resume.current_version, resume.content.clone()),
    };

    let doc: ResumeDocument =
        serde_json::from_value(content).map_err(|e| AppError::Internal(e.into()))?;
    let artifact = state
        .renderer
        .render(&doc, &resume.template_id, req.format)
        .await?;

    let key = artifact_key(id, version, artifact.file_ext);
    state
        .artifacts
        .put(&key, artifact.bytes, artifact.content_type)
        .await?;
    let download_url = state.artifacts.presigned_link(&key, DEFAULT_LINK_TTL).await?;

    Ok(Json(ExportResponse {
        resume_id: id,
        version,
        download_url,
        expires_in_secs: DEFAULT_LINK_TTL.as_secs(),
    }))
}
