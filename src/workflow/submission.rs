use std::collections::HashMap;

use crate::auth::access::{Capability, authorize};
use crate::auth::session::Principal;
use crate::errors::AppError;
use crate::models::submission::{FieldKind, FieldValue, FormType, NewSubmission, Submission};
use crate::repo::Repository;
use crate::uploads::{IMAGE_EXTENSIONS, IncomingFile, UploadStore, has_extension};

/// Raw request data for one form: text inputs and attached files, keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct SubmissionInput {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, IncomingFile>,
}

impl SubmissionInput {
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    pub fn file(mut self, name: &str, file: IncomingFile) -> Self {
        self.files.insert(name.to_string(), file);
        self
    }
}

/// Validate and store one form submission owned by `principal`.
///
/// Nothing is written unless every field validates. Attachments are stored
/// before the record, so a failed insert leaves the files behind.
pub async fn submit<R: Repository>(
    repo: &R,
    uploads: &UploadStore,
    principal: &Principal,
    form_type: FormType,
    input: SubmissionInput,
) -> Result<Submission, AppError> {
    authorize(principal, Capability::SubmitForms)?;
    let schema = form_type.schema();

    let (mut fields, mut errors) = match schema.parse_fields(&input.fields) {
        Ok(fields) => (fields, Vec::new()),
        Err(errors) => (Default::default(), errors),
    };

    let mut attachments = Vec::new();
    for spec in schema.file_fields() {
        let Some(file) = input.files.get(spec.name) else { continue };
        if file.filename.trim().is_empty() {
            continue;
        }
        if spec.kind == FieldKind::Image && !has_extension(&file.filename, IMAGE_EXTENSIONS) {
            log::warn!(
                "Rejected {} submission from user {}: '{}' is not an image",
                form_type,
                principal.user_id,
                file.filename
            );
            return Err(AppError::UnsupportedFileType(file.filename.clone()));
        }
        if file.bytes.len() > uploads.max_bytes() {
            errors.push(format!(
                "{}: फाइल {} बाइट्सपेक्षा मोठी आहे / is larger than {} bytes",
                spec.label,
                uploads.max_bytes(),
                uploads.max_bytes()
            ));
            continue;
        }
        attachments.push((spec.name, file));
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    for (name, file) in attachments {
        if let Some(reference) = uploads.save(file).await? {
            fields.insert(name.to_string(), FieldValue::File(reference));
        }
    }

    let submission = repo
        .create_submission(&NewSubmission { form_type, user_id: principal.user_id, fields })
        .await?;
    log::info!(
        "User {} submitted {} form #{}",
        principal.user_id,
        form_type,
        submission.id
    );
    Ok(submission)
}
