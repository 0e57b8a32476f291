//! Data Transfer Objects - request/response types for the API.
//!
//! Request fields default to empty so that a missing field is reported by
//! validation rather than rejected by the JSON decoder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::{not_blank, validate_role};

/// Request to register a new user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[validate(custom(function = "validate_role"))]
    pub role: Option<String>,
}

/// Request to login.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CreatePostRequest {
    #[validate(length(min = 5, message = "Title must be at least 5 characters long"))]
    pub title: String,
    #[validate(length(min = 10, message = "Content must be at least 10 characters long"))]
    pub content: String,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct UpdatePostRequest {
    #[validate(length(min = 5, message = "Title must be at least 5 characters long"))]
    pub title: Option<String>,
    #[validate(length(min = 10, message = "Content must be at least 10 characters long"))]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CommentRequest {
    #[validate(custom(
        function = "not_blank",
        message = "Content is required and must be at least 1 character long"
    ))]
    pub content: String,
}

/// Query string of `GET /api/posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ListPostsQuery {
    #[validate(range(min = 1, message = "Page number must be a positive integer"))]
    pub page: Option<u64>,
    #[validate(range(min = 1, message = "Limit must be a positive integer"))]
    pub limit: Option<u64>,
    pub search: Option<String>,
}

/// Issued on register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub id: Uuid,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// A reference that is either a bare id or the resolved document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Expanded(T),
    Id(Uuid),
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorView {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub post: Uuid,
    /// `null` when the author no longer exists.
    pub author: Option<Expandable<AuthorView>>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// `null` when the author no longer exists.
    pub author: Option<Expandable<AuthorView>>,
    pub comments: Vec<Expandable<CommentResponse>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    pub total_posts: u64,
    pub current_page: u64,
    pub total_pages: u64,
    pub posts: Vec<PostResponse>,
}

/// Payload of the realtime `notify` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    pub user_id: String,
    pub message: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fail_validation() {
        let req: RegisterRequest = serde_json::from_str("{}").unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("role"));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let req = RegisterRequest {
            email: "jane@example.com".into(),
            password: "secret123".into(),
            role: Some("Root".into()),
        };

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("role"));
    }

    #[test]
    fn partial_update_checks_only_present_fields() {
        let req = UpdatePostRequest {
            title: Some("Long enough".into()),
            content: None,
        };
        assert!(req.validate().is_ok());

        let req = UpdatePostRequest {
            title: Some("Tiny".into()),
            content: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn blank_comment_is_rejected() {
        let req = CommentRequest {
            content: "   ".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn zero_page_is_rejected() {
        let query = ListPostsQuery {
            page: Some(0),
            ..Default::default()
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn author_serializes_as_id_or_document() {
        let id = Uuid::new_v4();
        let bare = serde_json::to_value(Expandable::<AuthorView>::Id(id)).unwrap();
        assert_eq!(bare, serde_json::json!(id.to_string()));

        let full = serde_json::to_value(Expandable::Expanded(AuthorView {
            id,
            email: "jane@example.com".into(),
        }))
        .unwrap();
        assert_eq!(full["email"], "jane@example.com");
    }
}
