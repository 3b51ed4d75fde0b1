use std::sync::Arc;

use futures::future;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use crate::common::commands::BackendCommand;
use crate::common::events::{BackendEvent, SubscriptionScope};
use crate::common::types::{
    Comment, LIKES_FIELD, MESSAGES_COLLECTION, Message, POSTS_COLLECTION, Post, Session,
    comments_collection,
};
use crate::config::AppConfig;
use crate::store::{
    Direction, MembershipOp, Query, RealtimeStore, Snapshot, Subscription, TIMESTAMP_FIELD,
    to_fields,
};

use super::auth::AuthProvider;

/// The expanded comment thread; at most one exists at a time.
struct ThreadSub {
    post_id: String,
    sub: Subscription,
}

/// Backend task: owns every live subscription and all remote calls. Driven
/// by a single select loop over UI commands, the session watch, and the
/// active subscriptions, so command handling and snapshot delivery
/// interleave without ever processing two snapshots of one query out of
/// order.
pub struct BackendClient {
    store: Arc<dyn RealtimeStore>,
    auth: Arc<dyn AuthProvider>,
    event_sender: mpsc::Sender<BackendEvent>,
    command_receiver: mpsc::Receiver<BackendCommand>,
    chat_window: usize,
    preview_limit: usize,
    session: Option<Session>,
    feed: Option<Subscription>,
    chat: Option<Subscription>,
    profile: Option<Subscription>,
    thread: Option<ThreadSub>,
}

impl BackendClient {
    pub fn new(
        store: Arc<dyn RealtimeStore>,
        auth: Arc<dyn AuthProvider>,
        event_sender: mpsc::Sender<BackendEvent>,
        command_receiver: mpsc::Receiver<BackendCommand>,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            auth,
            event_sender,
            command_receiver,
            chat_window: config.chat_window,
            preview_limit: config.preview_comments,
            session: None,
            feed: None,
            chat: None,
            profile: None,
            thread: None,
        }
    }

    pub async fn run(mut self) {
        let mut session_rx = self.auth.watch_session();
        // The session change feed fires once at startup with the current
        // session, possibly empty.
        let initial = session_rx.borrow_and_update().clone();
        self.apply_session(initial).await;

        loop {
            tokio::select! {
                command = self.command_receiver.recv() => {
                    match command {
                        Some(command) => self.handle_command(command).await,
                        None => break,
                    }
                }
                changed = session_rx.changed() => {
                    if changed.is_err() {
                        log::info!("Auth provider went away; stopping backend client");
                        break;
                    }
                    let session = session_rx.borrow_and_update().clone();
                    self.apply_session(session).await;
                }
                snapshot = Self::next_snapshot(&mut self.feed) => {
                    match snapshot {
                        Some(snapshot) => self.on_feed_snapshot(snapshot).await,
                        None => self.feed = None,
                    }
                }
                snapshot = Self::next_snapshot(&mut self.chat) => {
                    match snapshot {
                        Some(snapshot) => self.on_chat_snapshot(snapshot).await,
                        None => self.chat = None,
                    }
                }
                snapshot = Self::next_snapshot(&mut self.profile) => {
                    match snapshot {
                        Some(snapshot) => self.on_profile_snapshot(snapshot).await,
                        None => self.profile = None,
                    }
                }
                snapshot = Self::next_thread_snapshot(&mut self.thread) => {
                    match snapshot {
                        Some((post_id, snapshot)) => self.on_thread_snapshot(post_id, snapshot).await,
                        None => self.thread = None,
                    }
                }
            }
        }
    }

    async fn handle_command(&mut self, command: BackendCommand) {
        match command {
            BackendCommand::SignIn => {
                if let Err(err) = self.auth.sign_in().await {
                    log::warn!("Sign-in failed: {err}");
                    self.emit(BackendEvent::SignInFailed(err.to_string())).await;
                }
                // Success arrives through the session watch.
            }
            BackendCommand::SignOut => {
                // Subscriptions must be gone before the cleared session is
                // observable anywhere.
                self.cancel_all();
                self.auth.sign_out().await;
            }
            BackendCommand::OpenFeed => self.open_feed().await,
            BackendCommand::CloseFeed => {
                Self::cancel_slot(&mut self.feed);
                self.collapse_thread();
            }
            BackendCommand::OpenChat => self.open_chat().await,
            BackendCommand::CloseChat => Self::cancel_slot(&mut self.chat),
            BackendCommand::OpenProfile => self.open_profile().await,
            BackendCommand::CloseProfile => Self::cancel_slot(&mut self.profile),
            BackendCommand::ExpandThread { post_id } => self.expand_thread(post_id).await,
            BackendCommand::CollapseThread => self.collapse_thread(),
            BackendCommand::SubmitPost { content } => self.submit_post(content).await,
            BackendCommand::SubmitComment { post_id, text } => {
                self.submit_comment(post_id, text).await
            }
            BackendCommand::SubmitMessage { text } => self.submit_message(text).await,
            BackendCommand::ToggleLike {
                post_id,
                op,
                prior_likes,
            } => self.toggle_like(post_id, op, prior_likes).await,
        }
    }

    // ===== Session =====

    async fn apply_session(&mut self, session: Option<Session>) {
        if session.is_none() {
            self.cancel_all();
        }
        self.session = session.clone();
        self.emit(BackendEvent::SessionChanged(session)).await;
    }

    // ===== Live queries =====

    async fn open_feed(&mut self) {
        if self.session.is_none() {
            log::warn!("Feed requested without a session");
            return;
        }
        Self::cancel_slot(&mut self.feed);
        let query = Query::new(POSTS_COLLECTION).order_by(TIMESTAMP_FIELD, Direction::Desc);
        match self.store.subscribe(query).await {
            Ok(sub) => self.feed = Some(sub),
            Err(err) => self.report_failed(SubscriptionScope::Feed, err.to_string()).await,
        }
    }

    async fn open_chat(&mut self) {
        if self.session.is_none() {
            log::warn!("Chat requested without a session");
            return;
        }
        Self::cancel_slot(&mut self.chat);
        let query = Query::new(MESSAGES_COLLECTION)
            .order_by(TIMESTAMP_FIELD, Direction::Desc)
            .limit(self.chat_window);
        match self.store.subscribe(query).await {
            Ok(sub) => self.chat = Some(sub),
            Err(err) => self.report_failed(SubscriptionScope::Chat, err.to_string()).await,
        }
    }

    async fn open_profile(&mut self) {
        let Some(session) = self.session.clone() else {
            log::warn!("Profile requested without a session");
            return;
        };
        Self::cancel_slot(&mut self.profile);
        let query = Query::new(POSTS_COLLECTION)
            .filter_eq("user_id", session.uid)
            .order_by(TIMESTAMP_FIELD, Direction::Desc);
        match self.store.subscribe(query).await {
            Ok(sub) => self.profile = Some(sub),
            Err(err) => {
                self.report_failed(SubscriptionScope::Profile, err.to_string())
                    .await
            }
        }
    }

    async fn expand_thread(&mut self, post_id: String) {
        if self.session.is_none() {
            log::warn!("Thread requested without a session");
            return;
        }
        // Only one post's thread may be live; drop the previous one first.
        self.collapse_thread();
        let query =
            Query::new(comments_collection(&post_id)).order_by(TIMESTAMP_FIELD, Direction::Asc);
        match self.store.subscribe(query).await {
            Ok(sub) => self.thread = Some(ThreadSub { post_id, sub }),
            Err(err) => {
                self.report_failed(SubscriptionScope::Thread, err.to_string())
                    .await
            }
        }
    }

    fn collapse_thread(&mut self) {
        if let Some(mut thread) = self.thread.take() {
            thread.sub.cancel();
        }
    }

    fn cancel_all(&mut self) {
        Self::cancel_slot(&mut self.feed);
        Self::cancel_slot(&mut self.chat);
        Self::cancel_slot(&mut self.profile);
        self.collapse_thread();
    }

    fn cancel_slot(slot: &mut Option<Subscription>) {
        if let Some(mut sub) = slot.take() {
            sub.cancel();
        }
    }

    async fn report_failed(&mut self, scope: SubscriptionScope, reason: String) {
        log::error!("Subscription failed ({scope:?}): {reason}");
        self.emit(BackendEvent::SubscriptionFailed { scope, reason })
            .await;
    }

    // ===== Snapshot handlers =====

    async fn on_feed_snapshot(&mut self, snapshot: Snapshot) {
        let mut posts: Vec<Post> = decode_all(&snapshot);
        for post in &mut posts {
            post.preview_comments = self.preview_comments(&post.id).await;
        }
        self.emit(BackendEvent::FeedSnapshot(posts)).await;
    }

    async fn on_chat_snapshot(&mut self, snapshot: Snapshot) {
        let mut messages: Vec<Message> = decode_all(&snapshot);
        // The query keeps the newest window; the room reads oldest first.
        messages.reverse();
        self.emit(BackendEvent::ChatSnapshot(messages)).await;
    }

    async fn on_profile_snapshot(&mut self, snapshot: Snapshot) {
        let posts: Vec<Post> = decode_all(&snapshot);
        self.emit(BackendEvent::ProfilePostsSnapshot(posts)).await;
    }

    async fn on_thread_snapshot(&mut self, post_id: String, snapshot: Snapshot) {
        let comments: Vec<Comment> = decode_all(&snapshot);
        self.emit(BackendEvent::ThreadSnapshot { post_id, comments })
            .await;
    }

    async fn preview_comments(&self, post_id: &str) -> Vec<Comment> {
        let query = Query::new(comments_collection(post_id))
            .order_by(TIMESTAMP_FIELD, Direction::Desc)
            .limit(self.preview_limit);
        match self.store.fetch_once(query).await {
            Ok(snapshot) => {
                let mut comments: Vec<Comment> = decode_all(&snapshot);
                // Newest N, shown oldest first.
                comments.reverse();
                comments
            }
            Err(err) => {
                log::warn!("Preview comment fetch failed for {post_id}: {err}");
                Vec::new()
            }
        }
    }

    // ===== Writes =====

    async fn submit_post(&mut self, content: String) {
        let Some(session) = self.session.clone() else {
            self.emit(BackendEvent::PostRejected {
                reason: "not signed in".to_string(),
            })
            .await;
            return;
        };
        let content = content.trim().to_string();
        if content.is_empty() {
            log::debug!("Ignoring empty post submission");
            return;
        }
        let outcome = match to_fields(&Post::compose(&session, content)) {
            Ok(fields) => self.store.create(POSTS_COLLECTION, fields).await.map(|_| ()),
            Err(err) => Err(err),
        };
        match outcome {
            Ok(()) => self.emit(BackendEvent::PostSubmitted).await,
            Err(err) => {
                log::warn!("Post create failed: {err}");
                self.emit(BackendEvent::PostRejected {
                    reason: err.to_string(),
                })
                .await;
            }
        }
    }

    async fn submit_comment(&mut self, post_id: String, text: String) {
        let Some(session) = self.session.clone() else {
            self.emit(BackendEvent::CommentRejected {
                reason: "not signed in".to_string(),
            })
            .await;
            return;
        };
        let text = text.trim().to_string();
        if text.is_empty() {
            log::debug!("Ignoring empty comment submission");
            return;
        }
        let collection = comments_collection(&post_id);
        let outcome = match to_fields(&Comment::compose(&session, text)) {
            Ok(fields) => self.store.create(&collection, fields).await.map(|_| ()),
            Err(err) => Err(err),
        };
        match outcome {
            Ok(()) => self.emit(BackendEvent::CommentSubmitted).await,
            Err(err) => {
                log::warn!("Comment create failed for {post_id}: {err}");
                self.emit(BackendEvent::CommentRejected {
                    reason: err.to_string(),
                })
                .await;
            }
        }
    }

    async fn submit_message(&mut self, text: String) {
        let Some(session) = self.session.clone() else {
            self.emit(BackendEvent::MessageRejected {
                reason: "not signed in".to_string(),
            })
            .await;
            return;
        };
        let text = text.trim().to_string();
        if text.is_empty() {
            log::debug!("Ignoring empty message submission");
            return;
        }
        let outcome = match to_fields(&Message::compose(&session, text)) {
            Ok(fields) => self
                .store
                .create(MESSAGES_COLLECTION, fields)
                .await
                .map(|_| ()),
            Err(err) => Err(err),
        };
        match outcome {
            Ok(()) => self.emit(BackendEvent::MessageSubmitted).await,
            Err(err) => {
                log::warn!("Message create failed: {err}");
                self.emit(BackendEvent::MessageRejected {
                    reason: err.to_string(),
                })
                .await;
            }
        }
    }

    async fn toggle_like(&mut self, post_id: String, op: MembershipOp, prior_likes: Vec<String>) {
        let Some(session) = self.session.clone() else {
            log::warn!("Like toggled without a session");
            return;
        };
        if let Err(err) = self
            .store
            .update_membership(POSTS_COLLECTION, &post_id, LIKES_FIELD, &session.uid, op)
            .await
        {
            // Rolled back silently; the confirming snapshot never comes.
            log::warn!("Like update failed for {post_id}: {err}");
            self.emit(BackendEvent::LikeRolledBack {
                post_id,
                likes: prior_likes,
            })
            .await;
        }
    }

    // ===== Plumbing =====

    async fn emit(&mut self, event: BackendEvent) {
        if let Err(err) = self.event_sender.send(event).await {
            log::warn!("UI event channel closed: {err}");
        }
    }

    async fn next_snapshot(slot: &mut Option<Subscription>) -> Option<Snapshot> {
        match slot {
            Some(sub) => sub.next_snapshot().await,
            None => future::pending().await,
        }
    }

    async fn next_thread_snapshot(slot: &mut Option<ThreadSub>) -> Option<(String, Snapshot)> {
        match slot {
            Some(thread) => thread
                .sub
                .next_snapshot()
                .await
                .map(|snapshot| (thread.post_id.clone(), snapshot)),
            None => future::pending().await,
        }
    }
}

fn decode_all<T: DeserializeOwned>(snapshot: &Snapshot) -> Vec<T> {
    snapshot
        .iter()
        .filter_map(|doc| match doc.decode::<T>() {
            Ok(record) => Some(record),
            Err(err) => {
                log::warn!("Skipping malformed document {}: {err}", doc.id);
                None
            }
        })
        .collect()
}
