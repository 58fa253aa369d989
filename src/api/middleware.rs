use crate::api::AppState;
use crate::domain::message::MessageId;
use crate::error::AppError;
use axum::{
    Json,
    body::Body,
    extract::{FromRequest, FromRequestParts, Path},
    http::{HeaderValue, Request, header, request::Parts},
};
use serde::de::DeserializeOwned;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// The authenticated caller, resolved from a `Bearer` JWT.
///
/// Handlers that take this extractor reject unauthenticated requests with 401
/// before any of their own logic runs.
#[derive(Debug)]
pub struct AuthUser {
    pub username: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts.headers.get(header::AUTHORIZATION).ok_or(AppError::AuthError)?;

        let auth_str = auth_header.to_str().map_err(|_| AppError::AuthError)?;
        let token = auth_str.strip_prefix("Bearer ").ok_or(AppError::AuthError)?;

        let username = state.auth_service.verify_token(token)?;
        tracing::Span::current().record("username", username.as_str());

        Ok(Self { username })
    }
}

/// Message id taken from the `{id}` path segment.
///
/// Anything that does not parse as an id is rejected with the JSON error body
/// instead of axum's plain-text rejection.
#[derive(Debug, Clone, Copy)]
pub struct MessageIdPath(pub MessageId);

impl<S: Send + Sync> FromRequestParts<S> for MessageIdPath {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<MessageId>::from_request_parts(parts, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection.body_text(), "Rejected message id");
            AppError::BadRequest("Invalid message id".into())
        })?;

        Ok(Self(id))
    }
}

/// `Json<T>` whose rejections use the JSON error body.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) =
            Json::<T>::from_request(req, state).await.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        Ok(Self(value))
    }
}

/// Reuses a client-supplied `x-request-id`, otherwise generates a UUID.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeRequestUuidOrHeader;

impl MakeRequestId for MakeRequestUuidOrHeader {
    fn make_request_id<B>(&mut self, request: &Request<B>) -> Option<RequestId> {
        if let Some(existing) = request.headers().get("x-request-id") {
            return Some(RequestId::new(existing.clone()));
        }

        HeaderValue::from_str(&Uuid::new_v4().to_string()).ok().map(RequestId::new)
    }
}
