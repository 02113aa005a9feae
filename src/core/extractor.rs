use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;
use crate::shared::types::MessageResponse;

/// JSON body extractor whose rejections use the catalog's `{message, errors?}` body.
///
/// Well-formed JSON that does not fit the DTO (a missing `uiName`, a string
/// where `categoryId` expects a number) is reported as a validation error so
/// the offending field shows up in `errors`, like validator failures do.
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(AppJsonRejection)
    }
}

pub struct AppJsonRejection(JsonRejection);

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        let rejection = self.0;

        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            let body = MessageResponse::new("Request body is too large");
            return (StatusCode::PAYLOAD_TOO_LARGE, Json(body)).into_response();
        }

        let error = match rejection {
            JsonRejection::JsonDataError(err) => AppError::Validation(err.body_text()),
            JsonRejection::JsonSyntaxError(err) => {
                AppError::BadRequest(format!("Malformed JSON body: {}", err.body_text()))
            }
            JsonRejection::MissingJsonContentType(_) => AppError::BadRequest(
                "Expected request with `Content-Type: application/json`".to_string(),
            ),
            _ => AppError::BadRequest("Failed to read JSON body".to_string()),
        };

        error.into_response()
    }
}
