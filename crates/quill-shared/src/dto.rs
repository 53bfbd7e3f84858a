//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a present field into `Some`, so `null` becomes `Some(None)`
/// and a missing field (via `#[serde(default)]`) stays `None`.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response containing a session token and the user it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse<U> {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: U,
}

impl<U> AuthResponse<U> {
    pub fn bearer(access_token: String, expires_in: i64, user: U) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}

/// Profile update. `avatar` and `bio` distinguish an absent field from an
/// explicit `null`, which clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub avatar: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub bio: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

/// Partial post update. `tag_ids: null` or `[]` clears the tags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub tag_ids: Option<Option<Vec<i64>>>,
}

/// Query string for `GET /posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub user_id: Option<i64>,
    pub status: Option<String>,
    pub tag_id: Option<i64>,
    pub keyword: Option<String>,
}

/// Query string for `GET /posts/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub view: bool,
}

/// Plain pagination query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub post_id: i64,
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_profile_distinguishes_null_from_absent() {
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"avatar": null, "email": "a@b.c"}"#).unwrap();

        assert_eq!(req.avatar, Some(None));
        assert_eq!(req.bio, None);
        assert_eq!(req.email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn test_update_post_tag_ids() {
        let absent: UpdatePostRequest = serde_json::from_str("{}").unwrap();
        let null: UpdatePostRequest = serde_json::from_str(r#"{"tag_ids": null}"#).unwrap();
        let empty: UpdatePostRequest = serde_json::from_str(r#"{"tag_ids": []}"#).unwrap();

        assert_eq!(absent.tag_ids, None);
        assert_eq!(null.tag_ids, Some(None));
        assert_eq!(empty.tag_ids, Some(Some(vec![])));
    }

    #[test]
    fn test_create_post_defaults() {
        let req: CreatePostRequest =
            serde_json::from_str(r#"{"title": "t", "content": "c"}"#).unwrap();

        assert!(req.tag_ids.is_empty());
        assert!(req.status.is_none());
    }
}
