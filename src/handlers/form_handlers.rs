use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_session::Session;
use actix_web::{HttpResponse, web};
use futures_util::TryStreamExt;

use crate::auth::access::{Capability, authorize};
use crate::auth::csrf;
use crate::auth::session::{Flash, Principal, set_flash};
use crate::errors::{AppError, redirect, render};
use crate::models::submission::FormType;
use crate::repo::Repository;
use crate::templates_structs::{
    BonafideCertificateTemplate, FormPageTemplate, FormSuccessTemplate, PageContext,
};
use crate::uploads::{IncomingFile, UploadStore};
use crate::workflow::review;
use crate::workflow::submission::{self, SubmissionInput};

/// Cap on a single non-file multipart part.
const MAX_TEXT_BYTES: usize = 64 * 1024;

/// Allowance on top of the upload limit for the text parts of a request.
const TEXT_ALLOWANCE_BYTES: usize = 256 * 1024;

fn request_too_large(limit: usize) -> AppError {
    AppError::Validation(vec![format!(
        "विनंती {limit} बाइट्सपेक्षा मोठी आहे / Upload is larger than {limit} bytes"
    )])
}

/// Buffer a multipart body into text fields and the files `form_type` accepts.
///
/// The whole body is capped at `max_request_bytes`; crossing it stops the
/// read with a validation error. File parts under names the form has no file
/// field for are drained without being kept, as are parts with an empty file
/// name (an untouched file input).
async fn read_multipart(
    mut payload: Multipart,
    form_type: FormType,
    max_request_bytes: usize,
) -> Result<SubmissionInput, AppError> {
    let schema = form_type.schema();
    let mut input = SubmissionInput::default();
    let mut total = 0usize;

    while let Some(mut field) = payload.try_next().await? {
        let Some(disposition) = field.content_disposition() else { continue };
        let Some(name) = disposition.get_name().map(str::to_string) else { continue };
        let filename = disposition.get_filename().map(str::to_string);

        let (keep, limit) = match &filename {
            Some(filename) => (
                !filename.is_empty() && schema.file_fields().any(|spec| spec.name == name),
                max_request_bytes,
            ),
            None => (true, MAX_TEXT_BYTES),
        };
        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            total += chunk.len();
            if total > max_request_bytes {
                log::warn!("{form_type} submission body exceeded {max_request_bytes} bytes");
                return Err(request_too_large(max_request_bytes));
            }
            if keep {
                let room = limit.saturating_sub(bytes.len());
                bytes.extend_from_slice(&chunk[..room.min(chunk.len())]);
            }
        }

        match filename {
            Some(_) if !keep => log::debug!("Ignored file part '{name}' on {form_type} form"),
            Some(filename) => {
                input.files.insert(name, IncomingFile::new(filename, bytes));
            }
            None => {
                input.fields.insert(name, String::from_utf8_lossy(&bytes).into_owned());
            }
        }
    }
    Ok(input)
}

pub async fn show(
    form_type: web::Data<FormType>,
    session: Session,
    principal: Principal,
) -> Result<HttpResponse, AppError> {
    let form_type = **form_type;
    if let Err(e) = authorize(&principal, Capability::SubmitForms) {
        return e.recover(&session, "/");
    }

    let ctx = PageContext::build(&session, &principal, &form_type.form_path());
    render(FormPageTemplate::new(ctx, form_type))
}

pub async fn submit<R: Repository + 'static>(
    repo: web::Data<R>,
    uploads: web::Data<UploadStore>,
    form_type: web::Data<FormType>,
    session: Session,
    principal: Principal,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let form_type = **form_type;

    let max_request_bytes = uploads.max_bytes().saturating_add(TEXT_ALLOWANCE_BYTES);
    let mut input = match read_multipart(payload, form_type, max_request_bytes).await {
        Ok(input) => input,
        Err(AppError::Validation(errors)) => {
            return form_with_errors(&session, &principal, form_type, errors, HashMap::new());
        }
        Err(e) => return Err(e),
    };
    let token = input.fields.remove("csrf_token").unwrap_or_default();
    csrf::validate_csrf(&session, &token)?;

    let values: HashMap<String, String> = input.fields.clone();
    let errors = match submission::submit(
        repo.get_ref(),
        uploads.get_ref(),
        &principal,
        form_type,
        input,
    )
    .await
    {
        Ok(saved) => {
            set_flash(
                &session,
                Flash::success("फॉर्म यशस्वीरित्या सबमिट झाला! / Form submitted successfully!"),
            );
            return Ok(redirect(&format!("/form_success/{}/{}", form_type.slug(), saved.id)));
        }
        Err(AppError::Validation(errors)) => errors,
        Err(e @ AppError::UnsupportedFileType(_)) => vec![e.user_message()],
        Err(e) => return e.recover(&session, &form_type.form_path()),
    };

    form_with_errors(&session, &principal, form_type, errors, values)
}

/// Re-render a form with its problems and the values the user typed.
fn form_with_errors(
    session: &Session,
    principal: &Principal,
    form_type: FormType,
    errors: Vec<String>,
    values: HashMap<String, String>,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(session, principal, &form_type.form_path());
    let mut tmpl = FormPageTemplate::new(ctx, form_type);
    tmpl.errors = errors;
    tmpl.values = values;
    render(tmpl)
}

pub async fn success<R: Repository + 'static>(
    repo: web::Data<R>,
    session: Session,
    principal: Principal,
    path: web::Path<(String, i64)>,
) -> Result<HttpResponse, AppError> {
    let (slug, id) = path.into_inner();

    let found = match slug.parse::<FormType>() {
        Ok(form_type) => review::view_submission(repo.get_ref(), &principal, form_type, id).await,
        Err(e) => Err(e),
    };
    let (submission, _owner) = match found {
        Ok(found) => found,
        Err(e) => return e.recover(&session, principal.home()),
    };

    let ctx = PageContext::build(&session, &principal, "/form_success");
    render(FormSuccessTemplate { ctx, submission })
}

pub async fn bonafide_certificate<R: Repository + 'static>(
    repo: web::Data<R>,
    session: Session,
    principal: Principal,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let (bonafide, student) =
        match review::view_submission(repo.get_ref(), &principal, FormType::Bonafide, id).await {
            Ok(found) => found,
            Err(e) => return e.recover(&session, principal.home()),
        };

    let ctx = PageContext::build(&session, &principal, "/bonafide_certificate");
    render(BonafideCertificateTemplate { ctx, bonafide, student })
}
