use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

pub const POSTS_COLLECTION: &str = "posts";
pub const MESSAGES_COLLECTION: &str = "messages";
pub const LIKES_FIELD: &str = "likes";

/// Comments live in a per-post subcollection.
pub fn comments_collection(post_id: &str) -> String {
    format!("{POSTS_COLLECTION}/{post_id}/comments")
}

/// The authenticated identity. Written only by the auth provider, read
/// everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub uid: String,
    pub display_name: String,
    pub email: String,
    pub photo_url: String,
}

/// Feed post. Author fields are denormalized at write time; content is
/// immutable after creation, only the likes set changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_photo: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(skip)]
    pub preview_comments: Vec<Comment>,
}

impl Post {
    pub fn compose(session: &Session, content: String) -> Self {
        Self {
            id: String::new(),
            user_id: session.uid.clone(),
            user_name: session.display_name.clone(),
            user_photo: session.photo_url.clone(),
            content,
            timestamp: 0,
            likes: Vec::new(),
            preview_comments: Vec::new(),
        }
    }

    pub fn liked_by(&self, uid: &str) -> bool {
        self.likes.iter().any(|liker| liker == uid)
    }
}

/// Comment under one post. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_photo: String,
    pub text: String,
    #[serde(default)]
    pub timestamp: i64,
}

impl Comment {
    pub fn compose(session: &Session, text: String) -> Self {
        Self {
            id: String::new(),
            user_id: session.uid.clone(),
            user_name: session.display_name.clone(),
            user_photo: session.photo_url.clone(),
            text,
            timestamp: 0,
        }
    }
}

/// Message in the single global chat room. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_photo: String,
    pub text: String,
    #[serde(default)]
    pub timestamp: i64,
}

impl Message {
    pub fn compose(session: &Session, text: String) -> Self {
        Self {
            id: String::new(),
            user_id: session.uid.clone(),
            user_name: session.display_name.clone(),
            user_photo: session.photo_url.clone(),
            text,
            timestamp: 0,
        }
    }
}

/// Server timestamp rendered as a local calendar date.
pub fn date_label(timestamp: i64) -> String {
    DateTime::from_timestamp_millis(timestamp)
        .map(|utc| utc.with_timezone(&Local).format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

/// Server timestamp rendered as a local wall-clock time.
pub fn time_label(timestamp: i64) -> String {
    DateTime::from_timestamp_millis(timestamp)
        .map(|utc| utc.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_default()
}
