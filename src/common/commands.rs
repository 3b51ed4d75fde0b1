use crate::store::MembershipOp;

/// Commands the UI sends down to the backend task.
#[derive(Debug, Clone)]
pub enum BackendCommand {
    SignIn,
    SignOut,

    /// Screen lifecycle: each Open establishes the screen's live query, each
    /// Close cancels it.
    OpenFeed,
    CloseFeed,
    OpenChat,
    CloseChat,
    OpenProfile,
    CloseProfile,

    /// Comment-thread expansion. At most one thread is live at a time; the
    /// backend cancels any previous thread subscription first.
    ExpandThread {
        post_id: String,
    },
    CollapseThread,

    SubmitPost {
        content: String,
    },
    SubmitComment {
        post_id: String,
        text: String,
    },
    SubmitMessage {
        text: String,
    },

    /// Optimistic like toggle. The UI already flipped its local copy;
    /// `prior_likes` is the state to restore if the remote write fails.
    ToggleLike {
        post_id: String,
        op: MembershipOp,
        prior_likes: Vec<String>,
    },
}
