use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use super::types::*;
use crate::errors::AppError;

#[derive(sqlx::FromRow)]
struct Row {
    id: i64,
    form_type: String,
    user_id: i64,
    fields: Json<Fields>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<Row> for Submission {
    type Error = AppError;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(Submission {
            id: row.id,
            form_type: row.form_type.parse()?,
            user_id: row.user_id,
            fields: row.fields.0,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    #[sqlx(flatten)]
    row: Row,
    student_name: String,
    student_id: Option<String>,
}

const SELECT_SUBMISSION: &str = "\
    SELECT s.id, s.form_type, s.user_id, s.fields, s.status, s.created_at \
    FROM submissions s";

const SELECT_REVIEW: &str = "\
    SELECT s.id, s.form_type, s.user_id, s.fields, s.status, s.created_at, \
           u.full_name AS student_name, u.student_id \
    FROM submissions s \
    JOIN users u ON u.id = s.user_id";

pub async fn create(pool: &PgPool, new: &NewSubmission) -> Result<Submission, AppError> {
    let row = sqlx::query_as::<_, Row>(
        "INSERT INTO submissions (form_type, user_id, fields, status) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, form_type, user_id, fields, status, created_at",
    )
    .bind(new.form_type.slug())
    .bind(new.user_id)
    .bind(Json(&new.fields))
    .bind(Status::Pending.as_str())
    .fetch_one(pool)
    .await?;
    row.try_into()
}

/// Find a submission by id, only if it has the given type.
pub async fn find_by_id(
    pool: &PgPool,
    form_type: FormType,
    id: i64,
) -> Result<Option<Submission>, AppError> {
    let sql = format!("{SELECT_SUBMISSION} WHERE s.form_type = $1 AND s.id = $2");
    sqlx::query_as::<_, Row>(&sql)
        .bind(form_type.slug())
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(Submission::try_from)
        .transpose()
}

/// Newest-first submissions, optionally filtered by type and owner.
pub async fn find_recent(
    pool: &PgPool,
    form_type: Option<FormType>,
    owner_id: Option<i64>,
    limit: Option<i64>,
) -> Result<Vec<ReviewItem>, AppError> {
    let sql = format!(
        "{SELECT_REVIEW} \
         WHERE ($1::TEXT IS NULL OR s.form_type = $1) \
           AND ($2::BIGINT IS NULL OR s.user_id = $2) \
         ORDER BY s.created_at DESC, s.id DESC \
         LIMIT $3"
    );
    let rows = sqlx::query_as::<_, ReviewRow>(&sql)
        .bind(form_type.map(|t| t.slug()))
        .bind(owner_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    rows.into_iter()
        .map(|r| {
            Ok(ReviewItem {
                submission: r.row.try_into()?,
                student_name: r.student_name,
                student_id: r.student_id,
            })
        })
        .collect()
}

/// Count submissions of one type, optionally restricted to an owner and a status.
pub async fn count(
    pool: &PgPool,
    form_type: FormType,
    owner_id: Option<i64>,
    status: Option<Status>,
) -> Result<i64, AppError> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM submissions \
         WHERE form_type = $1 \
           AND ($2::BIGINT IS NULL OR user_id = $2) \
           AND ($3::TEXT IS NULL OR status = $3)",
    )
    .bind(form_type.slug())
    .bind(owner_id)
    .bind(status.map(|s| s.as_str()))
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Overwrite the status. Returns false when no submission of that type has the id.
pub async fn update_status(
    pool: &PgPool,
    form_type: FormType,
    id: i64,
    status: Status,
) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE submissions SET status = $1 WHERE form_type = $2 AND id = $3")
        .bind(status.as_str())
        .bind(form_type.slug())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
