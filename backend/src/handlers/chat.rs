//! Chat, translation, image and quick-query HTTP handlers

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::ModelRole;

use crate::error::{AppError, AppResult};
use crate::external::ImageInput;
use crate::services::chat::{ChatRequest, ChatService, QuickQueryRequest, TranslateRequest};
use crate::AppState;

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

fn chat_service(state: &AppState) -> ChatService {
    ChatService::new(
        state.db.clone(),
        state.ai.clone(),
        state.weather.clone(),
        state.config.weather.default_location.clone(),
    )
}

/// Conversational farming assistant
pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    match chat_service(&state).chat(request).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// English <-> Malayalam translation
pub async fn translate(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> impl IntoResponse {
    match chat_service(&state).translate(request).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => e.into_response(),
    }
}

struct ImageUpload {
    image: ImageInput,
    filename: String,
    message: Option<String>,
}

fn upload_error(error: MultipartError) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(error.body_text())
    } else {
        AppError::ValidationError(format!("Invalid upload: {}", error))
    }
}

async fn read_upload(mut multipart: Multipart) -> AppResult<ImageUpload> {
    let mut image = None;
    let mut message = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_error)?
    {
        match field.name() {
            Some("image") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_IMAGE_MIME)
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(upload_error)?;
                image = Some((filename, ImageInput { data: data.to_vec(), mime_type }));
            }
            Some("message") => {
                message = Some(
                    field
                        .text()
                        .await
                        .map_err(upload_error)?,
                );
            }
            _ => {}
        }
    }

    let (filename, image) = image.ok_or_else(|| {
        AppError::invalid("image", "No image provided", "ചിത്രം നൽകിയിട്ടില്ല")
    })?;
    if filename.is_empty() {
        return Err(AppError::invalid(
            "image",
            "No image selected",
            "ചിത്രം തിരഞ്ഞെടുത്തിട്ടില്ല",
        ));
    }

    Ok(ImageUpload {
        image,
        filename,
        message,
    })
}

/// Farm photo analysis (multipart `image` and optional `message`)
pub async fn analyze_image(State(state): State<AppState>, multipart: Multipart) -> impl IntoResponse {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(e) => return e.into_response(),
    };

    let reply = chat_service(&state)
        .analyze_image(upload.image, &upload.filename, upload.message)
        .await;
    (StatusCode::OK, Json(reply)).into_response()
}

/// Fast classification, summary or short answer
pub async fn quick_query(
    State(state): State<AppState>,
    Json(request): Json<QuickQueryRequest>,
) -> impl IntoResponse {
    let powered_by = state
        .config
        .ai
        .route(ModelRole::FastInference)
        .provider
        .as_str();

    match chat_service(&state).quick_query(request, powered_by).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => e.into_response(),
    }
}
