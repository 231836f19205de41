//! Media model, the meme view mapping, and media mutation contracts.

use serde::{Deserialize, Serialize};

/// A piece of media stored in a group, as returned by `GET /group_content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaGet {
    pub id: i64,
    pub group_id: i64,
    pub is_image: bool,
    #[serde(default)]
    pub image_path: String,
    #[serde(default)]
    pub link: String,
    pub name: String,
    pub uploaded_by: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
}

/// Kind of a rendered meme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemeKind {
    Image,
    Link,
}

/// The render-ready view of a piece of media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meme {
    #[serde(rename = "type")]
    pub kind: MemeKind,
    pub url: String,
    pub tags: Vec<String>,
}

impl Meme {
    /// True when any tag contains `term` case-insensitively.
    /// The empty term matches everything.
    pub fn matches_term(&self, term: &str) -> bool {
        tags_match_term(&self.tags, term)
    }
}

impl From<&MediaGet> for Meme {
    fn from(media: &MediaGet) -> Self {
        if media.is_image {
            Meme {
                kind: MemeKind::Image,
                url: media.image_path.clone(),
                tags: media.tags.clone(),
            }
        } else {
            Meme {
                kind: MemeKind::Link,
                url: media.link.clone(),
                tags: media.tags.clone(),
            }
        }
    }
}

/// Shared tag filter: case-insensitive substring match over the tag list.
pub fn tags_match_term(tags: &[String], term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let term = term.to_lowercase();
    tags.iter().any(|tag| tag.to_lowercase().contains(&term))
}

const KNOWN_DOMAINS: [&str; 3] = ["tiktok", "instagram", "reddit"];

/// Split the media name into lowercase word tags.
pub fn propose_tags_from_name(name: &str) -> Vec<String> {
    name.split_whitespace().map(str::to_lowercase).collect()
}

/// Propose a tag from the link's host: a known platform name when one of
/// the host labels matches, otherwise the first label. Links with no
/// recognizable host yield nothing.
pub fn propose_tag_from_link(link: &str) -> Option<String> {
    let host = link
        .split_once("://")
        .map(|(_, rest)| rest.split(['/', '?', '#']).next().unwrap_or(""))
        .unwrap_or("");
    let words: Vec<&str> = if host.is_empty() {
        link.split('.').collect()
    } else {
        host.split('.').collect()
    };

    if let Some(domain) = KNOWN_DOMAINS.iter().find(|d| words.contains(d)) {
        return Some(domain.to_string());
    }
    if host.is_empty() {
        return None;
    }
    words.first().map(|word| word.to_string())
}

/// Request body for `POST /propose_tags`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposeTagsRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_image: Option<bool>,
    #[serde(default)]
    pub link: String,
}

/// Response body for `POST /propose_tags`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposeTagsResponse {
    pub proposed_tags: Vec<String>,
}

/// Request body for `POST /add_link`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddLinkRequest {
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(is_image: bool, tags: &[&str]) -> MediaGet {
        MediaGet {
            id: 1,
            group_id: 1,
            is_image,
            image_path: "memes/1.png".to_string(),
            link: "https://example.com/meme".to_string(),
            name: "meme".to_string(),
            uploaded_by: "a@b.com".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_image_maps_to_image_path() {
        let meme = Meme::from(&media(true, &["funny"]));
        assert_eq!(meme.kind, MemeKind::Image);
        assert_eq!(meme.url, "memes/1.png");
    }

    #[test]
    fn test_link_maps_to_link() {
        let meme = Meme::from(&media(false, &["funny"]));
        assert_eq!(meme.kind, MemeKind::Link);
        assert_eq!(meme.url, "https://example.com/meme");
    }

    #[test]
    fn test_tag_filter() {
        let first = Meme::from(&media(true, &["funny", "nerd"]));
        let second = Meme::from(&media(false, &["ryan gosling"]));

        assert!(first.matches_term("nerd"));
        assert!(!second.matches_term("nerd"));

        // Empty term matches everything
        assert!(first.matches_term(""));
        assert!(second.matches_term(""));

        // Case-insensitive substring
        assert!(second.matches_term("GOSLING"));
    }

    #[test]
    fn test_propose_tags_from_name() {
        assert_eq!(propose_tags_from_name("abc def"), ["abc", "def"]);
        assert_eq!(propose_tags_from_name("a    ab   123-"), ["a", "ab", "123-"]);
        assert_eq!(propose_tags_from_name("HELLO World"), ["hello", "world"]);
        assert_eq!(
            propose_tags_from_name("   This is a Test   "),
            ["this", "is", "a", "test"]
        );
        assert!(propose_tags_from_name("").is_empty());
        assert!(propose_tags_from_name("     ").is_empty());
    }

    #[test]
    fn test_propose_tag_from_link() {
        assert_eq!(
            propose_tag_from_link("https://komixxy.pl/").as_deref(),
            Some("komixxy")
        );
        assert_eq!(
            propose_tag_from_link("https://vm.tiktok.com/zfrre-").as_deref(),
            Some("tiktok")
        );
        assert_eq!(
            propose_tag_from_link("https://github.com/some/repo/issues").as_deref(),
            Some("github")
        );
        assert_eq!(propose_tag_from_link("www.reddit.com").as_deref(), Some("reddit"));
        assert_eq!(propose_tag_from_link("reddit.com").as_deref(), Some("reddit"));
        assert_eq!(propose_tag_from_link("dsadsa"), None);
    }

    #[test]
    fn test_meme_serializes_with_type_field() {
        let meme = Meme::from(&media(true, &["funny"]));
        let value = serde_json::to_value(&meme).unwrap();
        assert_eq!(value["type"], "image");
        assert_eq!(value["url"], "memes/1.png");
    }
}
