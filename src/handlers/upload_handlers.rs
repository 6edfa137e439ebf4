use actix_files::NamedFile;
use actix_web::{HttpRequest, HttpResponse, web};

use crate::errors::AppError;
use crate::uploads::UploadStore;

/// Serve a stored attachment to any logged-in user.
pub async fn serve(
    req: HttpRequest,
    uploads: web::Data<UploadStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let reference = path.into_inner();
    let Some(file_path) = uploads.resolve(&reference) else {
        log::warn!("Refused upload path '{reference}'");
        return Err(AppError::NotFound);
    };
    let file = NamedFile::open_async(&file_path)
        .await
        .map_err(|_| AppError::NotFound)?;
    Ok(file.into_response(&req))
}
