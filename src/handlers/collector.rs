use axum::extract::multipart::{Multipart, MultipartError};

use crate::models::{ImageMediaType, MealSubmission, UploadedImage};

pub const CONTEXT_FIELD: &str = "input";
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("unsupported image type '{0}' (expected JPEG or PNG)")]
    UnsupportedMediaType(String),
    #[error("could not read the uploaded form: {0}")]
    Multipart(#[from] MultipartError),
}

/// Read the text field and the photo out of a submitted form into `submission`.
///
/// A missing photo is not an error here; the submission flow decides what
/// to do with it. On error, fields read before the failure stay filled in.
pub async fn collect(
    mut multipart: Multipart,
    submission: &mut MealSubmission,
) -> Result<(), CollectError> {
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            CONTEXT_FIELD => {
                submission.context = field.text().await?;
            }
            IMAGE_FIELD => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;

                log::debug!(
                    "📎 Upload field: name={:?}, type={:?}, {} bytes",
                    file_name,
                    content_type,
                    bytes.len()
                );

                submission.image = accept_file(file_name, content_type.as_deref(), bytes.to_vec())?;
            }
            other => {
                log::debug!("Ignoring unknown form field: {}", other);
            }
        }
    }

    Ok(())
}

/// Check an uploaded file against the JPEG/PNG allow-list.
///
/// Returns `None` for the empty part browsers send when no file was chosen.
pub fn accept_file(
    file_name: Option<String>,
    content_type: Option<&str>,
    bytes: Vec<u8>,
) -> Result<Option<UploadedImage>, CollectError> {
    let file_name = file_name.filter(|n| !n.is_empty());
    if file_name.is_none() && bytes.is_empty() {
        return Ok(None);
    }

    let declared = content_type
        .map(str::trim)
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("application/octet-stream"));

    let media_type = match declared {
        Some(mime) => ImageMediaType::from_mime(mime),
        None => file_name.as_deref().and_then(ImageMediaType::from_file_name),
    };

    let Some(media_type) = media_type else {
        let shown = declared
            .map(str::to_string)
            .or_else(|| file_name.clone())
            .unwrap_or_else(|| "unknown".to_string());
        return Err(CollectError::UnsupportedMediaType(shown));
    };

    Ok(Some(UploadedImage {
        file_name,
        media_type,
        bytes,
    }))
}
