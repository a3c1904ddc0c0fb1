//! Durable resume storage behind a trait so the finalization pipeline
//! and handlers can be exercised against a fake. The Postgres
//! implementation delegates version bookkeeping to `versioning`.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::resume::{ResumeLanguage, ResumeRow, ResumeVersionRow, VersionSource};
use crate::models::user::User;
use crate::render::DEFAULT_TEMPLATE_ID;
use crate::resumes::versioning;

/// Partial update for a stored resume. `content` is the only field that
/// produces a new version; the rest edit the parent row in place.
#[derive(Debug, Clone, Default)]
pub struct ResumePatch {
    pub title: Option<String>,
    pub language: Option<ResumeLanguage>,
    pub template_id: Option<String>,
    pub content: Option<Value>,
}

#[async_trait]
pub trait ResumeRepository: Send + Sync {
    /// Finds or creates the user row for an external chat identity.
    async fn ensure_user(&self, external_id: &str, display_name: &str) -> Result<User>;

    /// Creates a resume and its initial version 1 snapshot.
    async fn create_resume(
        &self,
        user_id: Uuid,
        title: &str,
        language: ResumeLanguage,
        content: &Value,
        source: VersionSource,
    ) -> Result<ResumeRow>;

    async fn get_resume(&self, id: Uuid) -> Result<Option<ResumeRow>>;

    async fn list_resumes(&self, user_id: Uuid) -> Result<Vec<ResumeRow>>;

    /// Applies a patch. Returns `None` if the resume does not exist.
    async fn update_resume(&self, id: Uuid, patch: ResumePatch) -> Result<Option<ResumeRow>>;

    /// Returns whether a row was deleted.
    async fn delete_resume(&self, id: Uuid) -> Result<bool>;

    async fn list_versions(&self, resume_id: Uuid) -> Result<Vec<ResumeVersionRow>>;

    async fn get_version(&self, resume_id: Uuid, version: i32)
        -> Result<Option<ResumeVersionRow>>;

    /// Appends the next version snapshot and bumps the parent row.
    async fn append_version(
        &self,
        resume_id: Uuid,
        content: &Value,
        source: VersionSource,
    ) -> Result<ResumeVersionRow>;
}

pub struct PgResumeRepository {
    pool: PgPool,
}

impl PgResumeRepository {
    pub fn new(pool: PgPool) -> Self {
        PgResumeRepository { pool }
    }
}

#[async_trait]
impl ResumeRepository for PgResumeRepository {
    async fn ensure_user(&self, external_id: &str, display_name: &str) -> Result<User> {
        Ok(sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, external_id, display_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (external_id)
            DO UPDATE SET display_name = EXCLUDED.display_name
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(external_id)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn create_resume(
        &self,
        user_id: Uuid,
        title: &str,
        language: ResumeLanguage,
        content: &Value,
        source: VersionSource,
    ) -> Result<ResumeRow> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes (id, user_id, title, language, template_id, content, current_version)
            VALUES ($1, $2, $3, $4, $5, $6, 1)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .bind(language.as_str())
        .bind(DEFAULT_TEMPLATE_ID)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO resume_versions (id, resume_id, version, content, source)
            VALUES ($1, $2, 1, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(row.id)
        .bind(content)
        .bind(source.as_str())
        .execute(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_resume(&self, id: Uuid) -> Result<Option<ResumeRow>> {
        Ok(
            sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_resumes(&self, user_id: Uuid) -> Result<Vec<ResumeRow>> {
        Ok(sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE user_id = $1 ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_resume(&self, id: Uuid, patch: ResumePatch) -> Result<Option<ResumeRow>> {
        if self.get_resume(id).await?.is_none() {
            return Ok(None);
        }

        if let Some(content) = &patch.content {
            versioning::commit_version(&self.pool, id, content, VersionSource::Manual).await?;
        }

        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            UPDATE resumes
            SET title = COALESCE($2, title),
                language = COALESCE($3, language),
                template_id = COALESCE($4, template_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.language.map(|l| l.as_str()))
        .bind(patch.template_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Some(row))
    }

    async fn delete_resume(&self, id: Uuid) -> Result<bool> {
        sqlx::query("DELETE FROM resume_versions WHERE resume_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_versions(&self, resume_id: Uuid) -> Result<Vec<ResumeVersionRow>> {
        versioning::get_version_history(&self.pool, resume_id).await
    }

    async fn get_version(
        &self,
        resume_id: Uuid,
        version: i32,
    ) -> Result<Option<ResumeVersionRow>> {
        versioning::get_version(&self.pool, resume_id, version).await
    }

    async fn append_version(
        &self,
        resume_id: Uuid,
        content: &Value,
        source: VersionSource,
    ) -> Result<ResumeVersionRow> {
        versioning::commit_version(&self.pool, resume_id, content, source).await
    }
}
