//! EMSA meme-sharing app core.
//!
//! Two halves: a typed client library (session store, auth gates, resource
//! poller, mutation client) and the in-memory mock REST backend the client
//! talks to during local development and tests.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod store;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use store::Store;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub config: Arc<Config>,
}

/// Create the mock backend router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Store handle for the auth layer
    let auth_store = state.store.clone();

    // Routes requiring a bearer token
    let protected = Router::new()
        // Account
        .route("/logout", post(api::logout))
        .route("/user_details", get(api::user_details))
        .route("/update_account", put(api::update_account))
        .route("/remove_account", delete(api::remove_account))
        // Groups
        .route("/user_groups", get(api::user_groups))
        .route("/create_group", post(api::create_group))
        .route("/group_members", get(api::group_members))
        .route("/add_group_members", post(api::add_group_members))
        .route(
            "/remove_group_member/{group_id}/{mail}",
            delete(api::remove_group_member),
        )
        // Media
        .route("/group_content", get(api::group_content))
        .route("/add_link", post(api::add_link))
        .route(
            "/add_image",
            // Body limit above the image cap so the store's size check
            // governs the 413, not the transport
            post(api::add_image)
                .layer(DefaultBodyLimit::max(store::MAX_IMAGE_BYTES + 64 * 1024)),
        )
        .route("/propose_tags", post(api::proposed_tags))
        .route("/delete_media/{media_id}", delete(api::delete_media))
        // Friends
        .route("/user_friends", get(api::user_friends))
        .route("/create_friend_request", post(api::create_friend_request))
        .route("/pending_friend_requests", get(api::pending_friend_requests))
        .route("/sent_friend_requests", get(api::sent_friend_requests))
        .route("/add_friend", post(api::add_friend))
        .route(
            "/decline_friend_request/{mail}",
            delete(api::decline_friend_request),
        )
        .route(
            "/remove_friend_request/{mail}",
            delete(api::remove_friend_request),
        )
        .route("/remove_friend/{mail}", delete(api::remove_friend))
        .layer(middleware::from_fn(move |req, next| {
            auth::bearer_auth_layer(auth_store.clone(), req, next)
        }));

    // Public routes: registration, login, health
    let public = Router::new()
        .route("/register", post(api::register))
        .route("/login", post(api::login))
        .route("/health", get(health_check));

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
