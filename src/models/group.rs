//! Group model and group mutation contracts.

use serde::{Deserialize, Serialize};

/// A meme-sharing group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub owner_mail: String,
}

/// Request body for `POST /create_group`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Request body for `POST /add_group_members`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddGroupMembersRequest {
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub members: Vec<String>,
}
