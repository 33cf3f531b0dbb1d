//! Request extractors with JSON error bodies
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    response::{IntoResponse, Response},
};

/// `axum::Json` whose rejection is an [`AppError`]
///
/// A body that is not JSON, or does not fit the target type, becomes a 400
/// with a fixed message; the serde detail only reaches the log.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl<T> IntoResponse for AppJson<T>
where
    axum::Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        AppError::BadRequest("Invalid request body".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        body: String,
    }

    async fn extract(content_type: Option<&str>, body: &str) -> Result<AppJson<Payload>, AppError> {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(value) = content_type {
            builder = builder.header("content-type", value);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        AppJson::<Payload>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn test_valid_body() {
        assert!(extract(Some("application/json"), r#"{"body":"hi"}"#).await.is_ok());
    }

    #[tokio::test]
    async fn test_rejections_hide_serde_detail() {
        for (content_type, body) in [
            (Some("application/json"), "{not json"),
            (Some("application/json"), "{}"),
            (None, r#"{"body":"hi"}"#),
        ] {
            match extract(content_type, body).await {
                Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Invalid request body"),
                other => panic!("unexpected: {other:?}"),
            }
        }
    }
}
