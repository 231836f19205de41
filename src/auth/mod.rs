//! Bearer-token authentication for the mock backend.
//!
//! Tokens are issued by `POST /login` and compared in constant time.

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::errors::ErrorBody;
use crate::store::Store;

/// The authenticated caller, inserted into request extensions by the
/// auth layer and read by handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub mail: String,
}

/// Auth layer: requires `Authorization: Bearer <token>` where the token
/// was issued by login and not yet invalidated.
pub async fn bearer_auth_layer(store: Arc<Store>, mut request: Request, next: Next) -> Response {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string());

    let Some(token) = bearer else {
        return unauthorized_response("Missing bearer token");
    };

    match store.resolve_token(&token).await {
        Some(mail) => {
            request.extensions_mut().insert(CurrentUser { mail });
            next.run(request).await
        }
        None => unauthorized_response("Invalid or expired token"),
    }
}

/// Create an unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        detail: message.to_string(),
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
