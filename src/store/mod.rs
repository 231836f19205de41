//! In-memory object store for the mock backend.
//!
//! Holds users, issued tokens, groups, friendships, friend requests, and
//! media. Nothing survives a restart; the next poll cycle is the only
//! recovery path the front-end relies on.

use std::collections::HashMap;

use chrono::Utc;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::{Group, MediaGet, PublicUser, UpdateAccountRequest};

/// Upload size cap for images.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

struct UserRecord {
    mail: String,
    name: String,
    password: String,
}

impl UserRecord {
    fn public(&self) -> PublicUser {
        PublicUser {
            mail: self.mail.clone(),
            name: self.name.clone(),
        }
    }
}

struct GroupRecord {
    group: Group,
    members: Vec<String>,
}

struct FriendRequestRecord {
    sender_mail: String,
    receiver_mail: String,
}

#[derive(Default)]
struct StoreInner {
    users: HashMap<String, UserRecord>,
    /// token -> mail, for every token issued by login
    tokens: HashMap<String, String>,
    groups: HashMap<i64, GroupRecord>,
    next_group_id: i64,
    /// unordered friendship edges, stored once per direction
    friends: Vec<(String, String)>,
    requests: Vec<FriendRequestRecord>,
    media: HashMap<i64, MediaGet>,
    next_media_id: i64,
}

/// The mock backend's object store.
#[derive(Default)]
pub struct Store {
    inner: RwLock<StoreInner>,
}

/// Constant-time string comparison for secrets.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with the local-development demo fixture.
    pub async fn seed_demo(&self) {
        let demo_mail = "email@example.com";
        if self
            .register_user(demo_mail, "Demo User", "password")
            .await
            .is_err()
        {
            return;
        }
        for name in ["kociaki", "bigos", "baseniarze"] {
            // Registration above guarantees the owner exists
            let _ = self.create_group(name, demo_mail).await;
        }
        tracing::info!("Seeded demo user {}", demo_mail);
    }

    // ==================== USER OPERATIONS ====================

    pub async fn register_user(
        &self,
        mail: &str,
        name: &str,
        password: &str,
    ) -> Result<PublicUser, AppError> {
        let mut inner = self.inner.write().await;
        if inner.users.contains_key(mail) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        let record = UserRecord {
            mail: mail.to_string(),
            name: name.to_string(),
            password: password.to_string(),
        };
        let user = record.public();
        inner.users.insert(mail.to_string(), record);
        Ok(user)
    }

    /// Verify credentials and issue a fresh access token.
    pub async fn login(&self, mail: &str, password: &str) -> Result<String, AppError> {
        let mut inner = self.inner.write().await;
        let valid = inner
            .users
            .get(mail)
            .map(|user| constant_time_compare(&user.password, password))
            .unwrap_or(false);
        if !valid {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }
        let token = uuid::Uuid::new_v4().to_string();
        inner.tokens.insert(token.clone(), mail.to_string());
        Ok(token)
    }

    /// Invalidate a token. Unknown tokens are a no-op.
    pub async fn logout(&self, token: &str) {
        let mut inner = self.inner.write().await;
        inner.tokens.remove(token);
    }

    /// Resolve a bearer token to the mail it was issued for.
    pub async fn resolve_token(&self, token: &str) -> Option<String> {
        let inner = self.inner.read().await;
        inner
            .tokens
            .iter()
            .find(|(issued, _)| constant_time_compare(issued, token))
            .map(|(_, mail)| mail.clone())
    }

    pub async fn get_user(&self, mail: &str) -> Result<PublicUser, AppError> {
        let inner = self.inner.read().await;
        inner
            .users
            .get(mail)
            .map(|user| user.public())
            .ok_or_else(|| AppError::NotFound(format!("No user with mail: {}", mail)))
    }

    pub async fn update_user(
        &self,
        mail: &str,
        update: &UpdateAccountRequest,
    ) -> Result<PublicUser, AppError> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(mail)
            .ok_or_else(|| AppError::NotFound(format!("No user with mail: {}", mail)))?;
        if let Some(name) = &update.name {
            user.name = name.clone();
        }
        if let Some(password) = &update.password {
            user.password = password.clone();
        }
        Ok(user.public())
    }

    /// Remove an account: owned groups (with their media) are deleted,
    /// other memberships, friendships, requests, and tokens are dropped.
    pub async fn remove_user(&self, mail: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        if inner.users.remove(mail).is_none() {
            return Err(AppError::NotFound(format!("No user with mail: {}", mail)));
        }

        let owned: Vec<i64> = inner
            .groups
            .values()
            .filter(|g| g.group.owner_mail == mail)
            .map(|g| g.group.id)
            .collect();
        for group_id in owned {
            inner.groups.remove(&group_id);
            inner.media.retain(|_, m| m.group_id != group_id);
        }
        for group in inner.groups.values_mut() {
            group.members.retain(|member| member != mail);
        }
        inner.friends.retain(|(a, b)| a != mail && b != mail);
        inner
            .requests
            .retain(|r| r.sender_mail != mail && r.receiver_mail != mail);
        inner.tokens.retain(|_, owner| owner != mail);
        Ok(())
    }

    // ==================== GROUP OPERATIONS ====================

    pub async fn create_group(&self, name: &str, owner_mail: &str) -> Result<Group, AppError> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(owner_mail) {
            return Err(AppError::NotFound(format!(
                "No user with mail: {}",
                owner_mail
            )));
        }
        inner.next_group_id += 1;
        let group = Group {
            id: inner.next_group_id,
            name: name.to_string(),
            owner_mail: owner_mail.to_string(),
        };
        inner.groups.insert(
            group.id,
            GroupRecord {
                group: group.clone(),
                members: vec![owner_mail.to_string()],
            },
        );
        Ok(group)
    }

    pub async fn user_groups(&self, mail: &str) -> Vec<Group> {
        let inner = self.inner.read().await;
        let mut groups: Vec<Group> = inner
            .groups
            .values()
            .filter(|g| g.members.iter().any(|m| m == mail))
            .map(|g| g.group.clone())
            .collect();
        groups.sort_by_key(|g| g.id);
        groups
    }

    pub async fn group_members(&self, group_id: i64) -> Result<Vec<PublicUser>, AppError> {
        let inner = self.inner.read().await;
        let record = inner
            .groups
            .get(&group_id)
            .ok_or_else(|| AppError::NotFound(format!("No group found with ID: {}", group_id)))?;
        Ok(record
            .members
            .iter()
            .filter_map(|mail| inner.users.get(mail))
            .map(|user| user.public())
            .collect())
    }

    pub async fn add_group_members(
        &self,
        group_id: i64,
        members: &[String],
    ) -> Result<Vec<PublicUser>, AppError> {
        let mut inner = self.inner.write().await;
        if !inner.groups.contains_key(&group_id) {
            return Err(AppError::NotFound(format!(
                "No group found with ID: {}",
                group_id
            )));
        }
        for mail in members {
            if !inner.users.contains_key(mail) {
                return Err(AppError::Validation(format!("No user with mail: {}", mail)));
            }
        }
        let record = inner
            .groups
            .get_mut(&group_id)
            .ok_or_else(|| AppError::Internal("group vanished mid-update".to_string()))?;
        for mail in members {
            if !record.members.contains(mail) {
                record.members.push(mail.clone());
            }
        }
        let member_mails = record.members.clone();
        Ok(member_mails
            .iter()
            .filter_map(|mail| inner.users.get(mail))
            .map(|user| user.public())
            .collect())
    }

    pub async fn remove_group_member(&self, group_id: i64, mail: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let record = inner
            .groups
            .get_mut(&group_id)
            .ok_or_else(|| AppError::NotFound(format!("No group found with ID: {}", group_id)))?;
        let before = record.members.len();
        record.members.retain(|member| member != mail);
        if record.members.len() == before {
            return Err(AppError::NotFound(format!(
                "{} is not a member of group {}",
                mail, group_id
            )));
        }
        Ok(())
    }

    // ==================== FRIEND OPERATIONS ====================

    pub async fn create_friend_request(
        &self,
        sender_mail: &str,
        receiver_mail: &str,
    ) -> Result<PublicUser, AppError> {
        let mut inner = self.inner.write().await;
        if sender_mail == receiver_mail {
            return Err(AppError::Validation(
                "Cannot send a friend request to yourself".to_string(),
            ));
        }
        let receiver = inner
            .users
            .get(receiver_mail)
            .map(|user| user.public())
            .ok_or_else(|| {
                AppError::Validation(format!("No user with mail: {}", receiver_mail))
            })?;
        if are_friends(&inner, sender_mail, receiver_mail) {
            return Err(AppError::Validation("Users are already friends".to_string()));
        }
        let duplicate = inner.requests.iter().any(|r| {
            r.sender_mail == sender_mail && r.receiver_mail == receiver_mail
        });
        if duplicate {
            return Err(AppError::Validation(
                "Friend request already sent".to_string(),
            ));
        }
        inner.requests.push(FriendRequestRecord {
            sender_mail: sender_mail.to_string(),
            receiver_mail: receiver_mail.to_string(),
        });
        Ok(receiver)
    }

    /// Requests waiting for `mail` to accept or decline.
    pub async fn pending_requests(&self, mail: &str) -> Vec<PublicUser> {
        let inner = self.inner.read().await;
        inner
            .requests
            .iter()
            .filter(|r| r.receiver_mail == mail)
            .filter_map(|r| inner.users.get(&r.sender_mail))
            .map(|user| user.public())
            .collect()
    }

    /// Requests `mail` has sent and that are still unanswered.
    pub async fn sent_requests(&self, mail: &str) -> Vec<PublicUser> {
        let inner = self.inner.read().await;
        inner
            .requests
            .iter()
            .filter(|r| r.sender_mail == mail)
            .filter_map(|r| inner.users.get(&r.receiver_mail))
            .map(|user| user.public())
            .collect()
    }

    /// Accept a pending request from `friend_mail`.
    pub async fn add_friend(&self, mail: &str, friend_mail: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let position = inner
            .requests
            .iter()
            .position(|r| r.sender_mail == friend_mail && r.receiver_mail == mail)
            .ok_or_else(|| AppError::Validation("Friend request wasn't sent".to_string()))?;
        inner.requests.remove(position);
        inner
            .friends
            .push((mail.to_string(), friend_mail.to_string()));
        Ok(())
    }

    /// Decline a request received from `sender_mail`.
    pub async fn decline_friend_request(
        &self,
        receiver_mail: &str,
        sender_mail: &str,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let before = inner.requests.len();
        inner
            .requests
            .retain(|r| !(r.sender_mail == sender_mail && r.receiver_mail == receiver_mail));
        if inner.requests.len() == before {
            return Err(AppError::NotFound("No such friend request".to_string()));
        }
        Ok(())
    }

    /// Withdraw a request previously sent to `receiver_mail`.
    pub async fn remove_friend_request(
        &self,
        sender_mail: &str,
        receiver_mail: &str,
    ) -> Result<(), AppError> {
        // Same record, removed from the sender's side
        self.decline_friend_request(receiver_mail, sender_mail).await
    }

    pub async fn remove_friend(&self, mail: &str, friend_mail: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        if !are_friends(&inner, mail, friend_mail) {
            return Err(AppError::NotFound("Users are not friends".to_string()));
        }
        inner.friends.retain(|(a, b)| {
            !((a == mail && b == friend_mail) || (a == friend_mail && b == mail))
        });
        Ok(())
    }

    pub async fn user_friends(&self, mail: &str) -> Vec<PublicUser> {
        let inner = self.inner.read().await;
        inner
            .friends
            .iter()
            .filter_map(|(a, b)| {
                if a == mail {
                    Some(b)
                } else if b == mail {
                    Some(a)
                } else {
                    None
                }
            })
            .filter_map(|friend| inner.users.get(friend))
            .map(|user| user.public())
            .collect()
    }

    // ==================== MEDIA OPERATIONS ====================

    pub async fn add_link(
        &self,
        group_id: i64,
        link: &str,
        name: &str,
        tags: Vec<String>,
        uploaded_by: &str,
    ) -> Result<MediaGet, AppError> {
        self.create_media(group_id, false, String::new(), link.to_string(), name, tags, uploaded_by)
            .await
    }

    /// Store an uploaded image. The image bytes themselves are discarded;
    /// only a synthetic storage path is kept, as the mock has no blob store.
    pub async fn add_image(
        &self,
        group_id: i64,
        name: &str,
        tags: Vec<String>,
        image_bytes: &[u8],
        uploaded_by: &str,
    ) -> Result<MediaGet, AppError> {
        if image_bytes.len() >= MAX_IMAGE_BYTES {
            return Err(AppError::PayloadTooLarge(
                "File size exceeds the allowed limit of 2MB".to_string(),
            ));
        }
        let image_path = format!("memes/{}/{}", group_id, uuid::Uuid::new_v4());
        self.create_media(group_id, true, image_path, String::new(), name, tags, uploaded_by)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn create_media(
        &self,
        group_id: i64,
        is_image: bool,
        image_path: String,
        link: String,
        name: &str,
        tags: Vec<String>,
        uploaded_by: &str,
    ) -> Result<MediaGet, AppError> {
        let mut inner = self.inner.write().await;
        if !inner.groups.contains_key(&group_id) {
            return Err(AppError::NotFound(format!(
                "No group found with ID: {}",
                group_id
            )));
        }
        inner.next_media_id += 1;
        let media = MediaGet {
            id: inner.next_media_id,
            group_id,
            is_image,
            image_path,
            link,
            name: name.to_string(),
            uploaded_by: uploaded_by.to_string(),
            tags,
            created_at: Utc::now().to_rfc3339(),
        };
        inner.media.insert(media.id, media.clone());
        Ok(media)
    }

    /// List a group's media, optionally filtered by a tag search term.
    pub async fn group_content(
        &self,
        group_id: i64,
        search: &str,
    ) -> Result<Vec<MediaGet>, AppError> {
        let inner = self.inner.read().await;
        if !inner.groups.contains_key(&group_id) {
            return Err(AppError::NotFound(format!(
                "No group found with ID: {}",
                group_id
            )));
        }
        let mut media: Vec<MediaGet> = inner
            .media
            .values()
            .filter(|m| m.group_id == group_id)
            .filter(|m| crate::models::tags_match_term(&m.tags, search))
            .cloned()
            .collect();
        media.sort_by_key(|m| m.id);
        Ok(media)
    }

    pub async fn delete_media(&self, media_id: i64) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        inner
            .media
            .remove(&media_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("No media found with ID: {}", media_id)))
    }
}

fn are_friends(inner: &StoreInner, a: &str, b: &str) -> bool {
    inner
        .friends
        .iter()
        .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_users() -> Store {
        let store = Store::new();
        store
            .register_user("a@b.com", "Alice", "pw-a")
            .await
            .unwrap();
        store
            .register_user("c@d.com", "Carol", "pw-c")
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_register_duplicate_conflict() {
        let store = store_with_users().await;
        let err = store
            .register_user("a@b.com", "Again", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_login_issues_resolvable_token() {
        let store = store_with_users().await;
        let token = store.login("a@b.com", "pw-a").await.unwrap();
        assert_eq!(store.resolve_token(&token).await.as_deref(), Some("a@b.com"));

        store.logout(&token).await;
        assert!(store.resolve_token(&token).await.is_none());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let store = store_with_users().await;
        let err = store.login("a@b.com", "nope").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        // Unknown user fails the same way
        let err = store.login("nobody@b.com", "pw").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_group_membership_lifecycle() {
        let store = store_with_users().await;
        let group = store.create_group("memes", "a@b.com").await.unwrap();
        assert_eq!(store.user_groups("a@b.com").await, vec![group.clone()]);

        let members = store
            .add_group_members(group.id, &["c@d.com".to_string()])
            .await
            .unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(store.user_groups("c@d.com").await.len(), 1);

        store.remove_group_member(group.id, "c@d.com").await.unwrap();
        assert!(store.user_groups("c@d.com").await.is_empty());
    }

    #[tokio::test]
    async fn test_add_group_members_unknown_user() {
        let store = store_with_users().await;
        let group = store.create_group("memes", "a@b.com").await.unwrap();
        let err = store
            .add_group_members(group.id, &["ghost@b.com".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_friend_request_flow() {
        let store = store_with_users().await;
        store
            .create_friend_request("a@b.com", "c@d.com")
            .await
            .unwrap();

        assert_eq!(store.pending_requests("c@d.com").await[0].mail, "a@b.com");
        assert_eq!(store.sent_requests("a@b.com").await[0].mail, "c@d.com");

        // Accepting requires the pending request and consumes it
        store.add_friend("c@d.com", "a@b.com").await.unwrap();
        assert!(store.pending_requests("c@d.com").await.is_empty());
        assert_eq!(store.user_friends("a@b.com").await[0].mail, "c@d.com");
        assert_eq!(store.user_friends("c@d.com").await[0].mail, "a@b.com");

        store.remove_friend("a@b.com", "c@d.com").await.unwrap();
        assert!(store.user_friends("a@b.com").await.is_empty());
    }

    #[tokio::test]
    async fn test_add_friend_without_request() {
        let store = store_with_users().await;
        let err = store.add_friend("c@d.com", "a@b.com").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_duplicate_friend_request_rejected() {
        let store = store_with_users().await;
        store
            .create_friend_request("a@b.com", "c@d.com")
            .await
            .unwrap();
        let err = store
            .create_friend_request("a@b.com", "c@d.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_group_content_tag_filter() {
        let store = store_with_users().await;
        let group = store.create_group("memes", "a@b.com").await.unwrap();
        store
            .add_link(
                group.id,
                "https://example.com/1",
                "first",
                vec!["funny".to_string(), "nerd".to_string()],
                "a@b.com",
            )
            .await
            .unwrap();
        store
            .add_link(
                group.id,
                "https://example.com/2",
                "second",
                vec!["ryan gosling".to_string()],
                "a@b.com",
            )
            .await
            .unwrap();

        let filtered = store.group_content(group.id, "nerd").await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "first");

        let all = store.group_content(group.id, "").await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_image_size_cap() {
        let store = store_with_users().await;
        let group = store.create_group("memes", "a@b.com").await.unwrap();
        let huge = vec![0u8; MAX_IMAGE_BYTES];
        let err = store
            .add_image(group.id, "big", Vec::new(), &huge, "a@b.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }

    #[tokio::test]
    async fn test_seed_demo_fixture() {
        let store = Store::new();
        store.seed_demo().await;

        store.login("email@example.com", "password").await.unwrap();
        let groups = store.user_groups("email@example.com").await;
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["kociaki", "bigos", "baseniarze"]);

        // Seeding twice is a no-op
        store.seed_demo().await;
        assert_eq!(store.user_groups("email@example.com").await.len(), 3);
    }

    #[tokio::test]
    async fn test_remove_user_cascades() {
        let store = store_with_users().await;
        let group = store.create_group("memes", "a@b.com").await.unwrap();
        store
            .add_group_members(group.id, &["c@d.com".to_string()])
            .await
            .unwrap();
        store
            .add_link(group.id, "https://x", "m", Vec::new(), "a@b.com")
            .await
            .unwrap();

        store.remove_user("a@b.com").await.unwrap();

        assert!(store.get_user("a@b.com").await.is_err());
        // Owned group and its media are gone
        assert!(store.user_groups("c@d.com").await.is_empty());
        assert!(store.group_content(group.id, "").await.is_err());
    }
}
