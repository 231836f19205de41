//! User model and the auth/friend request contracts.

use serde::{Deserialize, Serialize};

/// A user as visible to other users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub mail: String,
    #[serde(default)]
    pub name: String,
}

/// Request body for `POST /login`.
///
/// Fields are optional so that missing ones produce a 400 validation error
/// instead of a deserialization rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Request body for `POST /register`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// Response body for `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Request body for `PUT /update_account`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAccountRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Request body for `POST /create_friend_request` and `POST /add_friend`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddFriendRequest {
    #[serde(default)]
    pub friend_mail: Option<String>,
}
