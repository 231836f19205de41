//! User, auth, and friend API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::required_str;
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::{
    AddFriendRequest, LoginRequest, PublicUser, RegisterRequest, TokenResponse,
    UpdateAccountRequest,
};
use crate::AppState;

/// POST /register - Register a new user.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    let mail = required_str(request.mail, "mail")?;
    let password = required_str(request.password, "password")?;

    let user = state
        .store
        .register_user(&mail, &request.name, &password)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /login - Verify credentials and issue an access token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let mail = required_str(request.mail, "mail")?;
    let password = required_str(request.password, "password")?;

    let access_token = state.store.login(&mail, &password).await?;
    Ok(Json(TokenResponse { access_token }))
}

/// POST /logout - Invalidate the caller's token.
pub async fn logout(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    headers: axum::http::HeaderMap,
) -> StatusCode {
    if let Some(token) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
    {
        state.store.logout(token).await;
    }
    StatusCode::NO_CONTENT
}

/// GET /user_details - The caller's account record.
pub async fn user_details(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<PublicUser>, AppError> {
    Ok(Json(state.store.get_user(&user.mail).await?))
}

/// PUT /update_account - Update the caller's name and/or password.
pub async fn update_account(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<Json<PublicUser>, AppError> {
    Ok(Json(state.store.update_user(&user.mail, &request).await?))
}

/// DELETE /remove_account - Remove the caller's account and owned groups.
pub async fn remove_account(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<StatusCode, AppError> {
    state.store.remove_user(&user.mail).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /create_friend_request - Send a friend request.
pub async fn create_friend_request(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<AddFriendRequest>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    let friend_mail = required_str(request.friend_mail, "friend_mail")?;
    let receiver = state
        .store
        .create_friend_request(&user.mail, &friend_mail)
        .await?;
    Ok((StatusCode::CREATED, Json(receiver)))
}

/// GET /pending_friend_requests - Requests waiting for the caller.
pub async fn pending_friend_requests(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<Vec<PublicUser>> {
    Json(state.store.pending_requests(&user.mail).await)
}

/// GET /sent_friend_requests - Requests the caller has sent.
pub async fn sent_friend_requests(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<Vec<PublicUser>> {
    Json(state.store.sent_requests(&user.mail).await)
}

/// POST /add_friend - Accept a pending friend request.
pub async fn add_friend(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<AddFriendRequest>,
) -> Result<StatusCode, AppError> {
    let friend_mail = required_str(request.friend_mail, "friend_mail")?;
    state.store.add_friend(&user.mail, &friend_mail).await?;
    Ok(StatusCode::CREATED)
}

/// DELETE /decline_friend_request/{mail} - Decline a received request.
pub async fn decline_friend_request(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(mail): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.decline_friend_request(&user.mail, &mail).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /remove_friend_request/{mail} - Withdraw a sent request.
pub async fn remove_friend_request(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(mail): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.remove_friend_request(&user.mail, &mail).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /remove_friend/{mail} - End a friendship.
pub async fn remove_friend(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(mail): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.remove_friend(&user.mail, &mail).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /user_friends - The caller's friends.
pub async fn user_friends(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<Vec<PublicUser>> {
    Json(state.store.user_friends(&user.mail).await)
}
