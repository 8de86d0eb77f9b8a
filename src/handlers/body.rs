use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// `Json<T>` whose rejections use the API error envelope
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                tracing::debug!("Rejected request body: {}", rejection.body_text());
                Err(ApiError::bad_request(rejection.body_text()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Login {
        email: String,
    }

    fn request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = Request::builder().method("POST").uri("/auth/login");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn well_formed_bodies_are_decoded() {
        let JsonBody(login) = JsonBody::<Login>::from_request(request(Some("application/json"), r#"{"email":"a@b.co"}"#), &())
            .await
            .unwrap();
        assert_eq!(login.email, "a@b.co");
    }

    #[tokio::test]
    async fn malformed_bodies_are_bad_requests() {
        for req in [
            request(Some("application/json"), "{not json"),
            request(Some("application/json"), r#"{"password":"x"}"#),
            request(None, r#"{"email":"a@b.co"}"#),
        ] {
            let err = JsonBody::<Login>::from_request(req, &()).await.unwrap_err();
            assert_eq!(err.status_code(), 400);
            assert_eq!(err.error_code(), "BAD_REQUEST");
        }
    }
}
