use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;

/// JSON extractor whose rejections use the service's error envelope
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(AppJsonRejection(rejection)),
        }
    }
}

pub struct AppJsonRejection(JsonRejection);

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        // Malformed bodies are reported like any other invalid input
        let detail = match self.0 {
            JsonRejection::JsonDataError(err) => ("body", format!("Invalid JSON data: {}", err)),
            JsonRejection::JsonSyntaxError(err) => {
                ("body", format!("Invalid JSON syntax: {}", err))
            }
            JsonRejection::MissingJsonContentType(err) => {
                ("content-type", format!("Missing JSON content type: {}", err))
            }
            _ => ("body", "Failed to parse JSON body".to_string()),
        };

        AppError::validation(detail.0, detail.1).into_response()
    }
}
