use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use userbase_core::{Entity, NewUser, UserId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(get_user).put(update_user).delete(delete_user))
}

/// A segment that is not a non-negative integer, or that fails to decode at
/// all, is a 400 `Invalid user ID`.
fn parse_id(segment: Result<Path<String>, PathRejection>) -> Result<UserId, axum::response::Response> {
    segment
        .ok()
        .and_then(|Path(raw)| raw.parse::<UserId>().ok())
        .ok_or_else(|| errors::json_error(StatusCode::BAD_REQUEST, errors::INVALID_USER_ID))
}

pub async fn list_users(Extension(services): Extension<AppServices>) -> axum::response::Response {
    match services.users().find_all().await {
        Ok(users) => (StatusCode::OK, Json(dto::users_to_json(&users))).into_response(),
        Err(e) => errors::store_error_to_response(e, "Failed to fetch users"),
    }
}

pub async fn get_user(
    Extension(services): Extension<AppServices>,
    id: Result<Path<String>, PathRejection>,
) -> axum::response::Response {
    let id = match parse_id(id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.users().find_by_id(id).await {
        Ok(user) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::store_error_to_response(e, "Failed to fetch user"),
    }
}

pub async fn create_user(
    Extension(services): Extension<AppServices>,
    body: Bytes,
) -> axum::response::Response {
    let Ok(body) = dto::parse_body::<dto::CreateUserRequest>(&body) else {
        return errors::json_error(StatusCode::BAD_REQUEST, errors::INVALID_REQUEST);
    };

    let new_user = match NewUser::new(body.name.unwrap_or_default(), body.birthday.unwrap_or_default()) {
        Ok(u) => u,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, errors::FIELDS_REQUIRED),
    };

    match services.users().insert(new_user).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id(), "user created");
            (StatusCode::CREATED, Json(dto::user_to_json(&user))).into_response()
        }
        Err(e) => errors::store_error_to_response(e, "Failed to create user"),
    }
}

/// Load, overlay the non-empty body fields, save.
///
/// The record is looked up before the body is inspected, so an unknown id is
/// a 404 even when the body is malformed.
pub async fn update_user(
    Extension(services): Extension<AppServices>,
    id: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> axum::response::Response {
    let id = match parse_id(id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    let mut user = match services.users().find_by_id(id).await {
        Ok(u) => u,
        Err(e) => return errors::store_error_to_response(e, "Failed to fetch user"),
    };

    let Ok(body) = dto::parse_body::<dto::UpdateUserRequest>(&body) else {
        return errors::json_error(StatusCode::BAD_REQUEST, errors::INVALID_REQUEST);
    };

    user.apply_patch(body.into());

    match services.users().save(&user).await {
        Ok(saved) => (StatusCode::OK, Json(dto::user_to_json(&saved))).into_response(),
        Err(e) => errors::store_error_to_response(e, "Failed to update user"),
    }
}

pub async fn delete_user(
    Extension(services): Extension<AppServices>,
    id: Result<Path<String>, PathRejection>,
) -> axum::response::Response {
    let id = match parse_id(id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    if let Err(e) = services.users().find_by_id(id).await {
        return errors::store_error_to_response(e, "Failed to fetch user");
    }

    match services.users().delete(id).await {
        Ok(()) => {
            tracing::info!(user_id = %id, "user deleted");
            (
                StatusCode::OK,
                Json(serde_json::json!({ "message": "User deleted successfully" })),
            )
                .into_response()
        }
        Err(e) => errors::store_error_to_response(e, "Failed to delete user"),
    }
}
