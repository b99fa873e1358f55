use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, OptionalFromRequest, Path, Request};
use axum::http::request::Parts;
use axum::response::Response;
use serde::de::DeserializeOwned;

use super::error::error_response;

/// `Json` whose rejection is a JSON `{ "error": ... }` body with axum's status.
pub struct ApiJson<T>(pub T);

/// `Path` whose rejection is a JSON `{ "error": ... }` body with axum's status.
pub struct ApiPath<T>(pub T);

fn json_rejection(rejection: JsonRejection) -> Response {
    tracing::warn!(
        status = %rejection.status(),
        error = %rejection.body_text(),
        "Rejected request body"
    );
    error_response(rejection.status(), rejection.body_text())
}

fn path_rejection(rejection: PathRejection) -> Response {
    tracing::warn!(
        status = %rejection.status(),
        error = %rejection.body_text(),
        "Rejected request path"
    );
    error_response(rejection.status(), rejection.body_text())
}

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = <Json<T> as FromRequest<S>>::from_request(request, state)
            .await
            .map_err(json_rejection)?;
        Ok(Self(value))
    }
}

/// A request without a `Content-Type` header has no body to parse.
impl<T, S> OptionalFromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let value = <Json<T> as OptionalFromRequest<S>>::from_request(request, state)
            .await
            .map_err(json_rejection)?;
        Ok(value.map(|Json(value)| Self(value)))
    }
}

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(path_rejection)?;
        Ok(Self(value))
    }
}
