use sqlx::PgPool;

use super::types::{NewUser, User};
use crate::errors::AppError;

const SELECT_USER: &str = "\
    SELECT id, username, email, password_hash, full_name, student_id, is_admin, created_at \
    FROM users";

/// Find user by username for authentication. Returns internal User with password hash.
pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, AppError> {
    let sql = format!("{SELECT_USER} WHERE username = $1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, AppError> {
    let sql = format!("{SELECT_USER} WHERE id = $1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// True when either the username or the email is already registered.
pub async fn exists_by_username_or_email(
    pool: &PgPool,
    username: &str,
    email: &str,
) -> Result<bool, AppError> {
    let row: (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 OR email = $2)",
    )
    .bind(username)
    .bind(email)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

/// Highest numeric suffix among `STU###` ids, if any were assigned.
pub async fn last_student_number(pool: &PgPool) -> Result<Option<u32>, AppError> {
    let row: (Option<i32>,) = sqlx::query_as(
        "SELECT MAX(CAST(SUBSTRING(student_id FROM 4) AS INTEGER)) \
         FROM users WHERE student_id ~ '^STU[0-9]+$'",
    )
    .fetch_one(pool)
    .await?;
    Ok(row.0.and_then(|n| u32::try_from(n).ok()))
}

/// Count non-admin users.
pub async fn count_students(pool: &PgPool) -> Result<i64, AppError> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE NOT is_admin")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

pub async fn admin_exists(pool: &PgPool) -> Result<bool, AppError> {
    let row: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE is_admin)")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

/// Insert a user row. Unique collisions (username, email, student id)
/// surface as `DuplicateIdentity`.
pub async fn create(pool: &PgPool, new: &NewUser) -> Result<User, AppError> {
    let sql = "INSERT INTO users (username, email, password_hash, full_name, student_id, is_admin) \
               VALUES ($1, $2, $3, $4, $5, $6) \
               RETURNING id, username, email, password_hash, full_name, student_id, is_admin, created_at";
    sqlx::query_as::<_, User>(sql)
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.full_name)
        .bind(&new.student_id)
        .bind(new.is_admin)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::DuplicateIdentity
            }
            other => AppError::Db(other),
        })
}
