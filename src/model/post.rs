//! Feed records: posts, comments, and the per-user like state
//!
//! The likes and commentCount fields on a post are denormalized counters.
//! They are only ever adjusted by the store alongside the write that
//! justifies them (a like toggle, a comment insert), never recomputed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::ApiError;

/// What kind of feed entry a post is
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Update,
    Question,
    Resource,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Update => "update",
            PostType::Question => "question",
            PostType::Resource => "resource",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "update" => Ok(PostType::Update),
            "question" => Ok(PostType::Question),
            "resource" => Ok(PostType::Resource),
            other => Err(ApiError::BadRequest(format!("Unknown post type: {}", other))),
        }
    }
}

/// Feed post
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i32,
    pub user_id: i32,
    pub content: String,
    pub image: Option<String>,
    pub is_anonymous: bool,
    pub post_type: Option<PostType>,
    pub related_conditions: Option<Vec<String>>,
    /// Count of distinct users currently liking this post
    pub likes: i32,
    /// Count of comments on this post, maintained with each insert
    pub comment_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating a post; counters and createdAt are
/// always server-assigned
#[derive(Clone, Debug)]
pub struct NewPost {
    pub user_id: i32,
    pub content: String,
    pub image: Option<String>,
    pub is_anonymous: bool,
    pub post_type: Option<PostType>,
    pub related_conditions: Option<Vec<String>>,
}

/// Comment on a post
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i32,
    pub post_id: i32,
    pub user_id: i32,
    pub content: String,
    pub likes: i32,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating a comment
#[derive(Clone, Debug)]
pub struct NewComment {
    pub post_id: i32,
    pub user_id: i32,
    pub content: String,
}

/// Result of a like toggle
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LikeOutcome {
    /// Whether the caller likes the post after the toggle
    pub liked: bool,
    /// The post's like count after the toggle
    pub likes: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_type_round_trip() {
        assert_eq!("update".parse::<PostType>().unwrap(), PostType::Update);
        assert_eq!("question".parse::<PostType>().unwrap(), PostType::Question);
        assert_eq!("resource".parse::<PostType>().unwrap(), PostType::Resource);
        assert!("rant".parse::<PostType>().is_err());
    }

    #[test]
    fn test_post_wire_field_names() {
        let post = Post {
            id: 1,
            user_id: 2,
            content: "Flu season is approaching".to_string(),
            image: None,
            is_anonymous: false,
            post_type: Some(PostType::Resource),
            related_conditions: None,
            likes: 0,
            comment_count: 0,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["userId"], 2);
        assert_eq!(json["postType"], "resource");
        assert_eq!(json["commentCount"], 0);
        assert_eq!(json["isAnonymous"], false);
    }
}
