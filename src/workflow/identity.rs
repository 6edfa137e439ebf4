use crate::auth::password;
use crate::auth::validate::{validate_email, validate_password, validate_required, validate_username};
use crate::errors::AppError;
use crate::models::user::{MAX_STUDENTS, NewUser, RegistrationForm, User, format_student_id};
use crate::repo::Repository;

/// Registration request, already stripped of transport details.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub password_confirm: String,
}

impl From<&RegistrationForm> for Registration {
    fn from(form: &RegistrationForm) -> Self {
        Registration {
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            full_name: form.full_name.trim().to_string(),
            password: form.password.clone(),
            password_confirm: form.password2.clone(),
        }
    }
}

impl Registration {
    pub fn validate(&self) -> Vec<String> {
        [
            validate_username(&self.username),
            validate_email(&self.email),
            validate_required(&self.full_name, "Full name", 100),
            validate_password(&self.password, &self.password_confirm),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Next id in the student pool: one past the last assigned, starting at 1.
pub async fn next_student_id<R: Repository>(repo: &R) -> Result<String, AppError> {
    let next = repo.last_student_number().await?.map_or(1, |n| n + 1);
    if next > MAX_STUDENTS {
        log::warn!("Student id pool exhausted (last assigned STU{:03})", next - 1);
        return Err(AppError::CapacityExceeded);
    }
    Ok(format_student_id(next))
}

/// Create a student account with the next sequential student id.
pub async fn register<R: Repository>(repo: &R, reg: &Registration) -> Result<User, AppError> {
    let errors = reg.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    if repo.identity_taken(&reg.username, &reg.email).await? {
        return Err(AppError::DuplicateIdentity);
    }
    let student_id = next_student_id(repo).await?;
    let password_hash = password::hash_password(&reg.password)?;

    let user = repo
        .create_user(&NewUser {
            username: reg.username.clone(),
            email: reg.email.clone(),
            password_hash,
            full_name: reg.full_name.clone(),
            student_id: Some(student_id),
            is_admin: false,
        })
        .await?;
    log::info!(
        "Registered user '{}' as {}",
        user.username,
        user.student_id.as_deref().unwrap_or("-")
    );
    Ok(user)
}

/// Check credentials. Unknown users and wrong passwords fail the same way.
pub async fn authenticate<R: Repository>(
    repo: &R,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    let Some(user) = repo.find_user_by_username(username.trim()).await? else {
        log::warn!("Login failed for unknown user '{}'", username.trim());
        return Err(AppError::InvalidCredentials);
    };
    if password::verify_password(password, &user.password_hash)? {
        log::info!("User '{}' logged in", user.username);
        Ok(user)
    } else {
        log::warn!("Login failed for user '{}'", user.username);
        Err(AppError::InvalidCredentials)
    }
}

/// Create the administrator account if no admin exists yet.
/// Admins take no student id from the pool.
pub async fn bootstrap_admin<R: Repository>(
    repo: &R,
    username: &str,
    email: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    if repo.admin_exists().await? {
        log::info!("Admin account already present, skipping bootstrap");
        return Ok(None);
    }
    let password_hash = password::hash_password(password)?;
    let admin = repo
        .create_user(&NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            full_name: "Administrator".to_string(),
            student_id: None,
            is_admin: true,
        })
        .await?;
    log::info!("Created admin account '{}'", admin.username);
    Ok(Some(admin))
}
