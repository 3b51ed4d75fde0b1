use eframe::egui;
use tokio::sync::mpsc;

use crate::common::commands::BackendCommand;
use crate::common::events::{BackendEvent, SubscriptionScope};
use crate::common::optimistic::rollback_likes;

use super::components::{chat, feed, login, profile, sidebar};
use super::state::{AppState, Screen};

pub struct SocialApp {
    state: AppState,
    command_sender: mpsc::Sender<BackendCommand>,
    event_receiver: mpsc::Receiver<BackendEvent>,
}

impl SocialApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        command_sender: mpsc::Sender<BackendCommand>,
        event_receiver: mpsc::Receiver<BackendEvent>,
    ) -> Self {
        Self {
            state: AppState::new(),
            command_sender,
            event_receiver,
        }
    }

    fn handle_backend_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::SessionChanged(Some(session)) => {
                self.state.auth_pending = false;
                self.state.auth_error = None;
                self.state.session = Some(session);
                if self.state.screen == Screen::Login {
                    self.navigate(Screen::Feed);
                }
            }
            BackendEvent::SessionChanged(None) => {
                // Subscriptions were already cancelled backend-side; drop
                // every screen's local copy along with the session.
                self.state = AppState::new();
            }
            BackendEvent::SignInFailed(reason) => {
                self.state.auth_pending = false;
                self.state.auth_error = Some(reason);
            }
            BackendEvent::FeedSnapshot(posts) => {
                self.state.feed.loading = false;
                self.state.feed.error = None;
                self.state.feed.posts = posts;
            }
            BackendEvent::ChatSnapshot(messages) => {
                self.state.chat.loading = false;
                self.state.chat.error = None;
                self.state.chat.messages = messages;
            }
            BackendEvent::ProfilePostsSnapshot(posts) => {
                self.state.profile.loading = false;
                self.state.profile.error = None;
                self.state.profile.posts = posts;
            }
            BackendEvent::ThreadSnapshot { post_id, comments } => {
                // A late snapshot for a thread that is no longer expanded is
                // stale; drop it.
                if self.state.feed.expanded.as_deref() == Some(post_id.as_str()) {
                    self.state.feed.thread = comments;
                    self.state.feed.thread_loading = false;
                }
            }
            BackendEvent::PostSubmitted => {
                self.state.feed.composer.clear();
                self.state.feed.composer_pending = false;
                self.state.feed.composer_error = None;
            }
            BackendEvent::PostRejected { reason } => {
                self.state.feed.composer_pending = false;
                self.state.feed.composer_error = Some(reason);
            }
            BackendEvent::CommentSubmitted => {
                self.state.feed.comment_input.clear();
                self.state.feed.comment_pending = false;
                self.state.feed.comment_error = None;
            }
            BackendEvent::CommentRejected { reason } => {
                self.state.feed.comment_pending = false;
                self.state.feed.comment_error = Some(reason);
            }
            BackendEvent::MessageSubmitted => {
                self.state.chat.input.clear();
                self.state.chat.send_pending = false;
                self.state.chat.send_error = None;
            }
            BackendEvent::MessageRejected { reason } => {
                self.state.chat.send_pending = false;
                self.state.chat.send_error = Some(reason);
            }
            BackendEvent::LikeRolledBack { post_id, likes } => {
                rollback_likes(&mut self.state.feed.posts, &post_id, &likes);
                rollback_likes(&mut self.state.profile.posts, &post_id, &likes);
            }
            BackendEvent::SubscriptionFailed { scope, reason } => match scope {
                SubscriptionScope::Feed => {
                    self.state.feed.loading = false;
                    self.state.feed.error = Some(reason);
                }
                SubscriptionScope::Chat => {
                    self.state.chat.loading = false;
                    self.state.chat.error = Some(reason);
                }
                SubscriptionScope::Profile => {
                    self.state.profile.loading = false;
                    self.state.profile.error = Some(reason);
                }
                SubscriptionScope::Thread => {
                    self.state.feed.thread_loading = false;
                    self.state.feed.comment_error = Some(reason);
                }
            },
        }
    }

    fn send_command(&mut self, command: BackendCommand) {
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Failed to send command to backend: {err}");
        }
    }

    /// Leaving a screen tears its live queries down; entering one opens them.
    fn navigate(&mut self, target: Screen) {
        if self.state.screen == target {
            return;
        }
        match self.state.screen {
            Screen::Feed => {
                if self.state.feed.expanded.is_some() {
                    self.state.feed.collapse_thread();
                    self.send_command(BackendCommand::CollapseThread);
                }
                self.send_command(BackendCommand::CloseFeed);
            }
            Screen::Chat => self.send_command(BackendCommand::CloseChat),
            Screen::Profile => self.send_command(BackendCommand::CloseProfile),
            Screen::Login => {}
        }
        match target {
            Screen::Feed => {
                self.state.feed.loading = true;
                self.send_command(BackendCommand::OpenFeed);
            }
            Screen::Chat => {
                self.state.chat.loading = true;
                self.send_command(BackendCommand::OpenChat);
            }
            Screen::Profile => {
                self.state.profile.loading = true;
                self.send_command(BackendCommand::OpenProfile);
            }
            Screen::Login => {}
        }
        self.state.screen = target;
    }

    fn apply_feed_actions(&mut self, actions: feed::FeedActions) {
        if let Some(content) = actions.submit_post {
            self.state.feed.composer_pending = true;
            self.state.feed.composer_error = None;
            self.send_command(BackendCommand::SubmitPost { content });
        }
        for like in actions.likes {
            self.send_command(BackendCommand::ToggleLike {
                post_id: like.post_id,
                op: like.toggle.op,
                prior_likes: like.toggle.prior,
            });
        }
        if let Some(post_id) = actions.expand {
            self.state.feed.collapse_thread();
            self.state.feed.expanded = Some(post_id.clone());
            self.state.feed.thread_loading = true;
            self.send_command(BackendCommand::ExpandThread { post_id });
        }
        if actions.collapse {
            self.state.feed.collapse_thread();
            self.send_command(BackendCommand::CollapseThread);
        }
        if let Some((post_id, text)) = actions.submit_comment {
            self.state.feed.comment_pending = true;
            self.state.feed.comment_error = None;
            self.send_command(BackendCommand::SubmitComment { post_id, text });
        }
        if actions.retry {
            self.state.feed.error = None;
            self.state.feed.loading = true;
            self.send_command(BackendCommand::OpenFeed);
        }
    }

    fn apply_chat_actions(&mut self, actions: chat::ChatActions) {
        if let Some(text) = actions.submit {
            self.state.chat.send_pending = true;
            self.state.chat.send_error = None;
            self.send_command(BackendCommand::SubmitMessage { text });
        }
        if actions.retry {
            self.state.chat.error = None;
            self.state.chat.loading = true;
            self.send_command(BackendCommand::OpenChat);
        }
    }

    fn apply_profile_actions(&mut self, actions: profile::ProfileActions) {
        for like in actions.likes {
            self.send_command(BackendCommand::ToggleLike {
                post_id: like.post_id,
                op: like.toggle.op,
                prior_likes: like.toggle.prior,
            });
        }
        if actions.retry {
            self.state.profile.error = None;
            self.state.profile.loading = true;
            self.send_command(BackendCommand::OpenProfile);
        }
    }
}

impl eframe::App for SocialApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_backend_events();

        let Some(session) = self.state.session.clone() else {
            let actions = egui::CentralPanel::default()
                .show(ctx, |ui| {
                    login::render(ui, self.state.auth_pending, self.state.auth_error.as_deref())
                })
                .inner;
            if actions.sign_in {
                self.state.auth_pending = true;
                self.state.auth_error = None;
                self.send_command(BackendCommand::SignIn);
            }
            ctx.request_repaint();
            return;
        };

        let sidebar_actions = egui::SidePanel::left("nav_sidebar")
            .resizable(true)
            .default_width(200.0)
            .show(ctx, |ui| sidebar::render(ui, &session, self.state.screen))
            .inner;

        match self.state.screen {
            Screen::Feed => {
                let actions = egui::CentralPanel::default()
                    .show(ctx, |ui| feed::render(ui, &mut self.state.feed, &session))
                    .inner;
                self.apply_feed_actions(actions);
            }
            Screen::Chat => {
                let actions = egui::CentralPanel::default()
                    .show(ctx, |ui| chat::render(ui, &mut self.state.chat, &session))
                    .inner;
                self.apply_chat_actions(actions);
            }
            Screen::Profile => {
                let actions = egui::CentralPanel::default()
                    .show(ctx, |ui| {
                        profile::render(ui, &mut self.state.profile, &session)
                    })
                    .inner;
                self.apply_profile_actions(actions);
            }
            Screen::Login => {
                // Unreachable while a session exists; the sidebar only
                // navigates between the three content screens.
            }
        }

        if let Some(target) = sidebar_actions.navigate {
            self.navigate(target);
        }
        if sidebar_actions.sign_out {
            self.send_command(BackendCommand::SignOut);
        }

        ctx.request_repaint();
    }
}
