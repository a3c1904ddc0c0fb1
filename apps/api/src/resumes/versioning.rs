use anyhow::Result;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::resume::{ResumeVersionRow, VersionSource};

/// Commits a new resume version as a versioned INSERT and bumps the
/// parent row. CRITICAL: version history is append-only. Never UPDATE
/// existing version rows.
pub async fn commit_version(
    pool: &PgPool,
    resume_id: Uuid,
    content: &serde_json::Value,
    source: VersionSource,
) -> Result<ResumeVersionRow> {
    // 1. Determine next version
    let current_max: Option<i32> =
        sqlx::query_scalar("SELECT MAX(version) FROM resume_versions WHERE resume_id = $1")
            .bind(resume_id)
            .fetch_one(pool)
            .await?;
    let new_version = current_max.unwrap_or(0) + 1;

    // 2. Append-only INSERT
    let row = sqlx::query_as::<_, ResumeVersionRow>(
        r#"
        INSERT INTO resume_versions (id, resume_id, version, content, source)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(resume_id)
    .bind(new_version)
    .bind(content)
    .bind(source.as_str())
    .fetch_one(pool)
    .await?;

    // 3. Bump the parent to the committed snapshot
    sqlx::query(
        r#"
        UPDATE resumes
        SET content = $2, current_version = $3, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(resume_id)
    .bind(content)
    .bind(new_version)
    .execute(pool)
    .await?;

    info!("Committed resume {resume_id} version {new_version} ({})", source.as_str());

    Ok(row)
}

/// Returns all versions of a resume, oldest first.
pub async fn get_version_history(pool: &PgPool, resume_id: Uuid) -> Result<Vec<ResumeVersionRow>> {
    Ok(sqlx::query_as::<_, ResumeVersionRow>(
        "SELECT * FROM resume_versions WHERE resume_id = $1 ORDER BY version ASC",
    )
    .bind(resume_id)
    .fetch_all(pool)
    .await?)
}

/// Returns one version snapshot, if it exists.
pub async fn get_version(
    pool: &PgPool,
    resume_id: Uuid,
    version: i32,
) -> Result<Option<ResumeVersionRow>> {
    Ok(sqlx::query_as::<_, ResumeVersionRow>(
        "SELECT * FROM resume_versions WHERE resume_id = $1 AND version = $2",
    )
    .bind(resume_id)
    .bind(version)
    .fetch_optional(pool)
    .await?)
}
