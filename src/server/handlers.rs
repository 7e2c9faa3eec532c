use super::types::{DiagnosisResponse, ErrorResponse, HealthResponse};
use crate::{
    Error, Result,
    diagnosis::{AnalysisRequest, DiagnosisService},
};
use axum::{
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub diagnosis: Arc<DiagnosisService>,
}

pub type HandlerError = (StatusCode, Json<ErrorResponse>);

fn error_response(e: &Error) -> HandlerError {
    (
        e.status_code(),
        Json(ErrorResponse {
            detail: e.to_string(),
        }),
    )
}

pub async fn analyze(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<Json<DiagnosisResponse>, HandlerError> {
    let request_id = Uuid::new_v4();

    let multipart = multipart.map_err(|rejection| {
        let e = Error::invalid_request(rejection.body_text());
        info!(%request_id, "Rejected analyze request: {}", e);
        error_response(&e)
    })?;

    process_analysis(state, multipart)
        .instrument(info_span!("analyze", %request_id))
        .await
}

async fn process_analysis(
    state: AppState,
    multipart: Multipart,
) -> std::result::Result<Json<DiagnosisResponse>, HandlerError> {
    let request = read_analysis_form(multipart).await.map_err(|e| {
        info!("Rejected analyze request: {}", e);
        error_response(&e)
    })?;

    info!(
        "Received analyze request with {} byte image",
        request.image.len()
    );

    match state.diagnosis.analyze(&request).await {
        Ok(diagnosis) => Ok(Json(DiagnosisResponse {
            diagnosis: diagnosis.text,
        })),
        Err(e) => {
            error!("Failed to analyze request: {}", e);
            Err(error_response(&e))
        }
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

fn form_error(context: &str, e: MultipartError) -> Error {
    let message = format!("{}: {}", context, e.body_text());
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge(message)
    } else {
        Error::invalid_request(message)
    }
}

/// Drains the whole form before checking required fields, so a rejected form never reaches upstream.
pub async fn read_analysis_form(mut multipart: Multipart) -> Result<AnalysisRequest> {
    let mut image = None;
    let mut image_filename = None;
    let mut image_content_type = None;
    let mut description = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| form_error("Failed to read multipart field", e))?
    {
        let name = field.name().map(String::from);
        match name.as_deref() {
            Some("image") => {
                image_filename = field.file_name().map(String::from);
                image_content_type = field.content_type().map(String::from);
                image = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| form_error("Failed to read image bytes", e))?,
                );
            }
            Some("description") => {
                description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| form_error("Failed to read description", e))?,
                );
            }
            _ => {}
        }
    }

    let image = image.ok_or(Error::MissingField { field: "image" })?;
    let description = description.ok_or(Error::MissingField {
        field: "description",
    })?;

    Ok(AnalysisRequest {
        image,
        image_filename,
        image_content_type,
        description,
    })
}
