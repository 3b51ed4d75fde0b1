use super::types::{Comment, Message, Post, Session};

/// Which live query an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionScope {
    Feed,
    Chat,
    Profile,
    Thread,
}

/// Events from the backend task up to the UI.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    /// Fired once at startup with the current session and again on every
    /// change. A `None` arrives only after every subscription was cancelled.
    SessionChanged(Option<Session>),
    SignInFailed(String),

    /// Full ordered result sets, never deltas.
    FeedSnapshot(Vec<Post>),
    ChatSnapshot(Vec<Message>),
    ProfilePostsSnapshot(Vec<Post>),
    ThreadSnapshot {
        post_id: String,
        comments: Vec<Comment>,
    },

    /// Append confirmations. The UI keeps the input text until one of these
    /// arrives; a rejection leaves it intact for retry.
    PostSubmitted,
    PostRejected {
        reason: String,
    },
    CommentSubmitted,
    CommentRejected {
        reason: String,
    },
    MessageSubmitted,
    MessageRejected {
        reason: String,
    },

    /// A membership write failed; restore the given likes on that post.
    LikeRolledBack {
        post_id: String,
        likes: Vec<String>,
    },

    /// A live query could not be established. The UI offers a retry.
    SubscriptionFailed {
        scope: SubscriptionScope,
        reason: String,
    },
}
