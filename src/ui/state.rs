use crate::common::types::{Comment, Message, Post, Session};

/// Top-level navigation target. Login is forced whenever the session is
/// empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Feed,
    Chat,
    Profile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileTab {
    Posts,
    Photos,
    Friends,
    About,
}

/// Local UI state. Each screen owns its own copy of the data it renders,
/// refreshed independently by its own live query.
pub struct AppState {
    pub screen: Screen,
    pub session: Option<Session>,
    pub auth_pending: bool,
    pub auth_error: Option<String>,
    pub feed: FeedState,
    pub chat: ChatState,
    pub profile: ProfileState,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Login,
            session: None,
            auth_pending: false,
            auth_error: None,
            feed: FeedState::new(),
            chat: ChatState::new(),
            profile: ProfileState::new(),
        }
    }
}

pub struct FeedState {
    pub posts: Vec<Post>,
    pub loading: bool,
    pub error: Option<String>,
    pub composer: String,
    pub composer_pending: bool,
    pub composer_error: Option<String>,
    /// Post id of the expanded comment thread, if any.
    pub expanded: Option<String>,
    pub thread: Vec<Comment>,
    pub thread_loading: bool,
    pub comment_input: String,
    pub comment_pending: bool,
    pub comment_error: Option<String>,
}

impl FeedState {
    pub fn new() -> Self {
        Self {
            posts: Vec::new(),
            loading: false,
            error: None,
            composer: String::new(),
            composer_pending: false,
            composer_error: None,
            expanded: None,
            thread: Vec::new(),
            thread_loading: false,
            comment_input: String::new(),
            comment_pending: false,
            comment_error: None,
        }
    }

    pub fn collapse_thread(&mut self) {
        self.expanded = None;
        self.thread.clear();
        self.thread_loading = false;
        self.comment_input.clear();
        self.comment_pending = false;
        self.comment_error = None;
    }
}

pub struct ChatState {
    pub messages: Vec<Message>,
    pub loading: bool,
    pub error: Option<String>,
    pub input: String,
    pub send_pending: bool,
    pub send_error: Option<String>,
}

impl ChatState {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            loading: false,
            error: None,
            input: String::new(),
            send_pending: false,
            send_error: None,
        }
    }
}

/// Descriptive profile fields. Session-local scratch state: editable, shown
/// on the About tab, discarded on sign-out, never written remotely.
#[derive(Debug, Clone, Default)]
pub struct ProfileDetails {
    pub bio: String,
    pub location: String,
    pub website: String,
    pub birthday: String,
}

pub struct PhotoEntry {
    pub caption: String,
}

pub struct FriendEntry {
    pub name: String,
    pub mutual: u32,
}

pub struct ProfileState {
    pub tab: ProfileTab,
    pub posts: Vec<Post>,
    pub loading: bool,
    pub error: Option<String>,
    pub editing: bool,
    pub details: ProfileDetails,
    pub draft: ProfileDetails,
    pub photos: Vec<PhotoEntry>,
    pub friends: Vec<FriendEntry>,
}

impl ProfileState {
    pub fn new() -> Self {
        Self {
            tab: ProfileTab::Posts,
            posts: Vec::new(),
            loading: false,
            error: None,
            editing: false,
            details: ProfileDetails::default(),
            draft: ProfileDetails::default(),
            photos: placeholder_photos(),
            friends: placeholder_friends(),
        }
    }
}

fn placeholder_photos() -> Vec<PhotoEntry> {
    [
        "Tech conference",
        "Team workshop",
        "Project shipped",
        "Dev team offsite",
        "New office",
        "Networking event",
    ]
    .into_iter()
    .map(|caption| PhotoEntry {
        caption: caption.to_string(),
    })
    .collect()
}

fn placeholder_friends() -> Vec<FriendEntry> {
    [
        ("Carlos Oliveira", 15),
        ("Ana Costa", 8),
        ("Pedro Santos", 32),
        ("Mariana Costa", 7),
        ("Lucas Oliveira", 12),
        ("Juliana Pereira", 5),
    ]
    .into_iter()
    .map(|(name, mutual)| FriendEntry {
        name: name.to_string(),
        mutual,
    })
    .collect()
}
