//! Group API endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use super::{required, required_str};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::{AddGroupMembersRequest, CreateGroupRequest, Group, PublicUser};
use crate::AppState;

/// Query parameters for `GET /group_members`.
#[derive(Debug, Deserialize)]
pub struct GroupMembersQuery {
    #[serde(default)]
    pub group_id: Option<i64>,
}

/// GET /user_groups - Groups the caller belongs to.
pub async fn user_groups(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<Vec<Group>> {
    Json(state.store.user_groups(&user.mail).await)
}

/// POST /create_group - Create a group owned by the caller.
pub async fn create_group(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), AppError> {
    let name = required_str(request.name, "name")?;
    let group = state.store.create_group(&name, &user.mail).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

/// GET /group_members - Members of a group.
pub async fn group_members(
    State(state): State<AppState>,
    Query(query): Query<GroupMembersQuery>,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    let group_id = required(query.group_id, "group_id")?;
    Ok(Json(state.store.group_members(group_id).await?))
}

/// POST /add_group_members - Add users to a group.
pub async fn add_group_members(
    State(state): State<AppState>,
    Json(request): Json<AddGroupMembersRequest>,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    let group_id = required(request.group_id, "group_id")?;
    let members = state
        .store
        .add_group_members(group_id, &request.members)
        .await?;
    Ok(Json(members))
}

/// DELETE /remove_group_member/{group_id}/{mail} - Remove a member.
pub async fn remove_group_member(
    State(state): State<AppState>,
    Path((group_id, mail)): Path<(i64, String)>,
) -> Result<StatusCode, AppError> {
    state.store.remove_group_member(group_id, &mail).await?;
    Ok(StatusCode::NO_CONTENT)
}
