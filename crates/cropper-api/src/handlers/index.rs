//! Upload form and crop submission.

use crate::error::{log_error, shows_details, status_of};
use crate::state::AppState;
use crate::views;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use bytes::Bytes;
use cropper_core::{AppError, ArtifactKind, ArtifactName, Config, ErrorMetadata};
use cropper_processing::ImageInput;
use std::sync::Arc;

const IMAGE_FIELD: &str = "image";
const IMAGE_URL_FIELD: &str = "image_url";

/// Names and sizes of a stored original/cropped pair.
#[derive(Debug, Clone)]
pub struct CropResult {
    pub original: ArtifactName,
    pub cropped: ArtifactName,
    pub original_dimensions: (u32, u32),
    pub cropped_dimensions: (u32, u32),
}

#[derive(Debug, Default)]
struct SubmittedForm {
    image: Option<Bytes>,
    image_url: Option<String>,
}

pub async fn show_form() -> Html<String> {
    Html(views::index_page(None).into_string())
}

/// Crop a submitted image and show both artifacts.
///
/// Problems the submitter can fix are shown above the form with status 200;
/// anything else renders a generic message with the error's status. A body
/// that is not a multipart form counts as an empty submission.
#[tracing::instrument(skip(state, multipart), fields(operation = "crop_image"))]
pub async fn submit(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Submission is not a multipart form");
            return render_error(AppError::MissingInput, &state.config);
        }
    };

    match crop_submission(&state, multipart).await {
        Ok(result) => Html(views::result_page(&result).into_string()).into_response(),
        Err(err) => render_error(err, &state.config),
    }
}

async fn crop_submission(state: &AppState, multipart: Multipart) -> Result<CropResult, AppError> {
    let form = read_form(multipart).await?;
    let input = ImageInput::from_form(form.image, form.image_url.as_deref())?;

    if let ImageInput::Url(ref url) = input {
        tracing::info!(url = %url, "Cropping image from URL");
    }

    let output = state.pipeline.run(input).await?;

    let names = state
        .store
        .put_batch(vec![
            (output.original, ArtifactKind::Original),
            (output.cropped, ArtifactKind::Cropped),
        ])
        .await
        .map_err(|e| AppError::StorageWrite(e.to_string()))?;

    let [original, cropped]: [ArtifactName; 2] = names.try_into().map_err(|names: Vec<_>| {
        AppError::StorageWrite(format!("Expected 2 artifact names, got {}", names.len()))
    })?;

    tracing::info!(
        original = %original,
        cropped = %cropped,
        width = output.cropped_dimensions.0,
        height = output.cropped_dimensions.1,
        "Stored cropped image"
    );

    Ok(CropResult {
        original,
        cropped,
        original_dimensions: output.original_dimensions,
        cropped_dimensions: output.cropped_dimensions,
    })
}

async fn read_form(mut multipart: Multipart) -> Result<SubmittedForm, AppError> {
    let mut form = SubmittedForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read form data: {}", e)))?
    {
        match field.name() {
            Some(IMAGE_FIELD) => {
                let data = field.bytes().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read uploaded file: {}", e))
                })?;
                // Browsers send an empty part when no file was chosen.
                if form.image.is_none() && !data.is_empty() {
                    form.image = Some(data);
                }
            }
            Some(IMAGE_URL_FIELD) => {
                let url = field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read image URL: {}", e))
                })?;
                if form.image_url.is_none() && !url.trim().is_empty() {
                    form.image_url = Some(url);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

fn render_error(err: AppError, config: &Config) -> Response {
    log_error(&err);

    if err.is_user_correctable() {
        let message = err.client_message();
        return (StatusCode::OK, Html(views::index_page(Some(&message)).into_string()))
            .into_response();
    }

    let message = if shows_details(&err, config) {
        err.detailed_message()
    } else {
        err.client_message()
    };

    (
        status_of(&err),
        Html(views::index_page(Some(&message)).into_string()),
    )
        .into_response()
}
