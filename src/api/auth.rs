use crate::api::AppState;
use crate::api::middleware::JsonBody;
use crate::api::schemas::auth::{Login, Registration, Token};
use crate::error::Result;
use crate::services::auth_service;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Registration>,
) -> Result<impl IntoResponse> {
    let token = state
        .auth_service
        .register(auth_service::Registration {
            username: payload.username,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
            phone: payload.phone,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(Token { token })))
}

pub async fn login(State(state): State<AppState>, JsonBody(payload): JsonBody<Login>) -> Result<impl IntoResponse> {
    let token = state.auth_service.login(&payload.username, payload.password).await?;
    Ok(Json(Token { token }))
}
