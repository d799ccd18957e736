use axum::Router;

pub mod users;

/// Router for every API endpoint.
pub fn router() -> Router {
    Router::new().merge(users::router())
}
