//! Media API endpoints: group content listing and meme uploads.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use super::{required, required_str};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::{
    propose_tag_from_link, propose_tags_from_name, AddLinkRequest, MediaGet,
    ProposeTagsRequest, ProposeTagsResponse,
};
use crate::AppState;

/// Query parameters for `GET /group_content`.
#[derive(Debug, Deserialize)]
pub struct GroupContentQuery {
    #[serde(default)]
    pub group_id: Option<i64>,
    /// Tag search term; empty or absent returns the unfiltered collection.
    #[serde(default)]
    pub search: String,
}

/// GET /group_content - A group's media, optionally filtered by tag term.
pub async fn group_content(
    State(state): State<AppState>,
    Query(query): Query<GroupContentQuery>,
) -> Result<Json<Vec<MediaGet>>, AppError> {
    let group_id = required(query.group_id, "group_id")?;
    Ok(Json(state.store.group_content(group_id, &query.search).await?))
}

/// POST /add_link - Add a link meme to a group.
pub async fn add_link(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<AddLinkRequest>,
) -> Result<(StatusCode, Json<MediaGet>), AppError> {
    let group_id = required(request.group_id, "group_id")?;
    let link = required_str(request.link, "link")?;
    let name = required_str(request.name, "name")?;

    let media = state
        .store
        .add_link(group_id, &link, &name, request.tags, &user.mail)
        .await?;
    Ok((StatusCode::CREATED, Json(media)))
}

/// POST /propose_tags - Propose tags from the media name's words, plus
/// the link's domain for non-images.
pub async fn proposed_tags(
    Json(request): Json<ProposeTagsRequest>,
) -> Result<Json<ProposeTagsResponse>, AppError> {
    let name = required(request.name, "name")?;
    let is_image = required(request.is_image, "is_image")?;

    let mut proposed_tags = propose_tags_from_name(&name);
    if !is_image {
        if let Some(tag) = propose_tag_from_link(&request.link) {
            proposed_tags.push(tag);
        }
    }
    Ok(Json(ProposeTagsResponse { proposed_tags }))
}

/// POST /add_image - Upload an image meme as multipart form data.
///
/// Expected fields: `group_id`, `name`, zero or more `tags`, and `image`.
pub async fn add_image(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MediaGet>), AppError> {
    let mut group_id: Option<i64> = None;
    let mut name: Option<String> = None;
    let mut tags: Vec<String> = Vec::new();
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("group_id") => {
                let text = field.text().await?;
                group_id = Some(text.parse().map_err(|_| {
                    AppError::Validation("group_id must be an integer".to_string())
                })?);
            }
            Some("name") => name = Some(field.text().await?),
            Some("tags") => tags.push(field.text().await?),
            Some("image") => image = Some(field.bytes().await?.to_vec()),
            _ => {}
        }
    }

    let group_id = required(group_id, "group_id")?;
    let name = required_str(name, "name")?;
    let image = required(image, "image")?;

    let media = state
        .store
        .add_image(group_id, &name, tags, &image, &user.mail)
        .await?;
    Ok((StatusCode::CREATED, Json(media)))
}

/// DELETE /delete_media/{media_id} - Delete a piece of media.
pub async fn delete_media(
    State(state): State<AppState>,
    Path(media_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.store.delete_media(media_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
