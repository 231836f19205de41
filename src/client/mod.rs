//! Client library: typed API access, session state, route guards, and
//! the resource poller.
//!
//! This is the Rust rendition of the front-end's non-presentational core.
//! A UI layer would subscribe to the watch channels exposed here.

mod gate;
mod poller;
mod session;

pub use gate::{redirect_if_auth, require_auth, RouteDecision, SIGN_IN_PATH};
pub use poller::Poller;
pub use session::{Session, SessionStore};

use std::sync::Arc;
use std::time::Duration;

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::config::Config;
use crate::errors::{ClientError, ErrorBody};
use crate::models::{
    Group, MediaGet, Meme, ProposeTagsResponse, PublicUser, TokenResponse,
    UpdateAccountRequest,
};

/// Typed client for the EMSA API. Each mutation is a single
/// request/response call with the bearer token attached from the session.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a client against `base_url` (the `EMSA_API_URL` value).
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            session,
        }
    }

    /// Create a client against the configured `EMSA_API_URL`.
    pub fn from_config(config: &Config, session: Arc<SessionStore>) -> Self {
        Self::new(config.api_url.clone(), session)
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self) -> Result<String, ClientError> {
        self.session.current().token.ok_or(ClientError::NotLoggedIn)
    }

    /// Map non-success statuses to `ClientError::Api` with the server's
    /// `detail` message.
    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.detail)
            .unwrap_or_else(|_| status.to_string());
        Err(ClientError::Api {
            status: status.as_u16(),
            detail,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let token = self.bearer()?;
        let response = self
            .http
            .get(self.url(path))
            .query(query)
            .bearer_auth(token)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let token = self.bearer()?;
        let response = self
            .http
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    // ==================== AUTH ====================

    /// Register a new account. Does not log in.
    pub async fn register(
        &self,
        mail: &str,
        password: &str,
        name: &str,
    ) -> Result<PublicUser, ClientError> {
        let response = self
            .http
            .post(self.url("/register"))
            .json(&json!({ "mail": mail, "password": password, "name": name }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Log in: exchange credentials for an access token and persist the
    /// session on success.
    pub async fn login(&self, mail: &str, password: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.url("/login"))
            .json(&json!({ "mail": mail, "password": password }))
            .send()
            .await?;
        let token: TokenResponse = Self::check(response).await?.json().await?;
        self.session.login(mail, &token.access_token)?;
        Ok(())
    }

    /// Log out: invalidate the token server-side, then clear the local
    /// session. The local session is cleared even when the server call
    /// fails.
    pub async fn logout(&self) -> Result<(), ClientError> {
        if let Some(token) = self.session.current().token {
            let server_result = async {
                let response = self
                    .http
                    .post(self.url("/logout"))
                    .bearer_auth(&token)
                    .send()
                    .await?;
                Self::check(response).await?;
                Ok::<(), ClientError>(())
            }
            .await;
            if let Err(err) = server_result {
                tracing::warn!("logout call failed: {}", err);
            }
        }
        self.session.logout()
    }

    pub async fn user_details(&self) -> Result<PublicUser, ClientError> {
        self.get_json("/user_details", &[]).await
    }

    pub async fn update_account(
        &self,
        update: &UpdateAccountRequest,
    ) -> Result<PublicUser, ClientError> {
        let token = self.bearer()?;
        let response = self
            .http
            .put(self.url("/update_account"))
            .bearer_auth(token)
            .json(update)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Remove the account and clear the local session.
    pub async fn remove_account(&self) -> Result<(), ClientError> {
        self.delete("/remove_account").await?;
        self.session.logout()
    }

    // ==================== GROUPS ====================

    pub async fn user_groups(&self) -> Result<Vec<Group>, ClientError> {
        self.get_json("/user_groups", &[]).await
    }

    pub async fn create_group(&self, name: &str) -> Result<Group, ClientError> {
        let token = self.bearer()?;
        let response = self
            .http
            .post(self.url("/create_group"))
            .bearer_auth(token)
            .json(&json!({ "name": name }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn group_members(&self, group_id: i64) -> Result<Vec<PublicUser>, ClientError> {
        self.get_json("/group_members", &[("group_id", group_id.to_string())])
            .await
    }

    pub async fn add_group_members(
        &self,
        group_id: i64,
        members: &[String],
    ) -> Result<Vec<PublicUser>, ClientError> {
        let token = self.bearer()?;
        let response = self
            .http
            .post(self.url("/add_group_members"))
            .bearer_auth(token)
            .json(&json!({ "group_id": group_id, "members": members }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn remove_group_member(
        &self,
        group_id: i64,
        mail: &str,
    ) -> Result<(), ClientError> {
        self.delete(&format!("/remove_group_member/{}/{}", group_id, mail))
            .await
    }

    // ==================== FRIENDS ====================

    pub async fn user_friends(&self) -> Result<Vec<PublicUser>, ClientError> {
        self.get_json("/user_friends", &[]).await
    }

    pub async fn pending_friend_requests(&self) -> Result<Vec<PublicUser>, ClientError> {
        self.get_json("/pending_friend_requests", &[]).await
    }

    pub async fn sent_friend_requests(&self) -> Result<Vec<PublicUser>, ClientError> {
        self.get_json("/sent_friend_requests", &[]).await
    }

    pub async fn create_friend_request(
        &self,
        friend_mail: &str,
    ) -> Result<PublicUser, ClientError> {
        let token = self.bearer()?;
        let response = self
            .http
            .post(self.url("/create_friend_request"))
            .bearer_auth(token)
            .json(&json!({ "friend_mail": friend_mail }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Accept a pending friend request from `friend_mail`.
    pub async fn add_friend(&self, friend_mail: &str) -> Result<(), ClientError> {
        let token = self.bearer()?;
        let response = self
            .http
            .post(self.url("/add_friend"))
            .bearer_auth(token)
            .json(&json!({ "friend_mail": friend_mail }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn decline_friend_request(&self, mail: &str) -> Result<(), ClientError> {
        self.delete(&format!("/decline_friend_request/{}", mail)).await
    }

    pub async fn remove_friend_request(&self, mail: &str) -> Result<(), ClientError> {
        self.delete(&format!("/remove_friend_request/{}", mail)).await
    }

    pub async fn remove_friend(&self, mail: &str) -> Result<(), ClientError> {
        self.delete(&format!("/remove_friend/{}", mail)).await
    }

    // ==================== MEDIA ====================

    /// A group's media, filtered server-side by a tag search term.
    /// The empty term returns the unfiltered collection.
    pub async fn group_content(
        &self,
        group_id: i64,
        search: &str,
    ) -> Result<Vec<MediaGet>, ClientError> {
        self.get_json(
            "/group_content",
            &[
                ("group_id", group_id.to_string()),
                ("search", search.to_string()),
            ],
        )
        .await
    }

    /// Same as [`group_content`](Self::group_content), mapped into the
    /// render-ready meme shape.
    pub async fn group_memes(
        &self,
        group_id: i64,
        search: &str,
    ) -> Result<Vec<Meme>, ClientError> {
        let media = self.group_content(group_id, search).await?;
        Ok(media.iter().map(Meme::from).collect())
    }

    pub async fn add_link(
        &self,
        group_id: i64,
        link: &str,
        name: &str,
        tags: &[String],
    ) -> Result<MediaGet, ClientError> {
        let token = self.bearer()?;
        let response = self
            .http
            .post(self.url("/add_link"))
            .bearer_auth(token)
            .json(&json!({ "group_id": group_id, "link": link, "name": name, "tags": tags }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Upload an image meme as multipart form data.
    pub async fn add_image(
        &self,
        group_id: i64,
        name: &str,
        tags: &[String],
        file_name: &str,
        image_bytes: Vec<u8>,
    ) -> Result<MediaGet, ClientError> {
        let token = self.bearer()?;
        let mut form = reqwest::multipart::Form::new()
            .text("group_id", group_id.to_string())
            .text("name", name.to_string());
        for tag in tags {
            form = form.text("tags", tag.clone());
        }
        let part = reqwest::multipart::Part::bytes(image_bytes).file_name(file_name.to_string());
        form = form.part("image", part);

        let response = self
            .http
            .post(self.url("/add_image"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn delete_media(&self, media_id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/delete_media/{}", media_id)).await
    }

    /// Ask the backend for tag suggestions before adding media.
    pub async fn propose_tags(
        &self,
        name: &str,
        is_image: bool,
        link: &str,
    ) -> Result<Vec<String>, ClientError> {
        let token = self.bearer()?;
        let response = self
            .http
            .post(self.url("/propose_tags"))
            .bearer_auth(token)
            .json(&json!({ "name": name, "is_image": is_image, "link": link }))
            .send()
            .await?;
        let body: ProposeTagsResponse = Self::check(response).await?.json().await?;
        Ok(body.proposed_tags)
    }

    // ==================== POLLERS ====================

    /// Poll the caller's group list.
    pub fn poll_user_groups(self: &Arc<Self>, interval: Duration) -> Poller<Group> {
        let client = self.clone();
        Poller::spawn("user_groups", interval, move || {
            let client = client.clone();
            async move { client.user_groups().await }
        })
    }

    /// Poll the caller's friends list.
    pub fn poll_user_friends(self: &Arc<Self>, interval: Duration) -> Poller<PublicUser> {
        let client = self.clone();
        Poller::spawn("user_friends", interval, move || {
            let client = client.clone();
            async move { client.user_friends().await }
        })
    }

    /// Poll requests waiting for the caller.
    pub fn poll_pending_friend_requests(
        self: &Arc<Self>,
        interval: Duration,
    ) -> Poller<PublicUser> {
        let client = self.clone();
        Poller::spawn("pending_friend_requests", interval, move || {
            let client = client.clone();
            async move { client.pending_friend_requests().await }
        })
    }

    /// Poll requests the caller has sent.
    pub fn poll_sent_friend_requests(
        self: &Arc<Self>,
        interval: Duration,
    ) -> Poller<PublicUser> {
        let client = self.clone();
        Poller::spawn("sent_friend_requests", interval, move || {
            let client = client.clone();
            async move { client.sent_friend_requests().await }
        })
    }

    /// Poll a group's member list.
    pub fn poll_group_members(
        self: &Arc<Self>,
        group_id: i64,
        interval: Duration,
    ) -> Poller<PublicUser> {
        let client = self.clone();
        Poller::spawn("group_members", interval, move || {
            let client = client.clone();
            async move { client.group_members(group_id).await }
        })
    }

    /// Poll a group's meme gallery, filtered by a fixed search term.
    pub fn poll_group_memes(
        self: &Arc<Self>,
        group_id: i64,
        search: String,
        interval: Duration,
    ) -> Poller<Meme> {
        let client = self.clone();
        Poller::spawn("group_memes", interval, move || {
            let client = client.clone();
            let search = search.clone();
            async move { client.group_memes(group_id, &search).await }
        })
    }
}
