use eframe::egui;

use crate::common::optimistic::{MembershipToggle, toggle_membership};
use crate::common::types::{Comment, Post, Session, date_label};
use crate::ui::state::FeedState;

use super::input_bar;

pub struct LikeAction {
    pub post_id: String,
    pub toggle: MembershipToggle,
}

#[derive(Default)]
pub struct FeedActions {
    pub submit_post: Option<String>,
    pub likes: Vec<LikeAction>,
    /// Thread to expand; collapse applies to the currently expanded one.
    pub expand: Option<String>,
    pub collapse: bool,
    pub submit_comment: Option<(String, String)>,
    pub retry: bool,
}

pub fn render(ui: &mut egui::Ui, feed: &mut FeedState, session: &Session) -> FeedActions {
    let mut actions = FeedActions::default();

    ui.heading("Feed");
    ui.separator();

    // Composer. The input keeps its text until the backend confirms the post.
    if let Some(content) = input_bar::render(
        ui,
        &mut feed.composer,
        !feed.composer_pending,
        "What are you thinking?",
        "Publish",
    ) {
        actions.submit_post = Some(content);
    }
    if feed.composer_pending {
        ui.label(egui::RichText::new("Publishing...").weak());
    }
    if let Some(error) = &feed.composer_error {
        ui.colored_label(egui::Color32::RED, format!("Post failed: {error}"));
    }
    ui.separator();

    if let Some(error) = &feed.error {
        ui.colored_label(egui::Color32::RED, format!("Feed unavailable: {error}"));
        if ui.button("Retry").clicked() {
            actions.retry = true;
        }
        return actions;
    }

    if feed.loading {
        ui.label("Loading feed...");
        return actions;
    }

    let FeedState {
        posts,
        expanded,
        thread,
        thread_loading,
        comment_input,
        comment_pending,
        comment_error,
        ..
    } = feed;

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for post in posts.iter_mut() {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    post_header(ui, &post.user_name, post.timestamp);
                    ui.label(&post.content);

                    let is_expanded = expanded.as_deref() == Some(post.id.as_str());
                    ui.horizontal(|ui| {
                        if like_button(ui, post, &session.uid) {
                            let toggle = toggle_membership(&mut post.likes, &session.uid);
                            actions.likes.push(LikeAction {
                                post_id: post.id.clone(),
                                toggle,
                            });
                        }
                        if ui.button("Comment").clicked() {
                            if is_expanded {
                                actions.collapse = true;
                            } else {
                                actions.expand = Some(post.id.clone());
                            }
                        }
                    });

                    if is_expanded {
                        ui.separator();
                        if *thread_loading {
                            ui.label("Loading comments...");
                        } else if thread.is_empty() {
                            ui.label("No comments yet. Be the first!");
                        } else {
                            for comment in thread.iter() {
                                comment_row(ui, comment);
                            }
                        }
                        if let Some(text) = input_bar::render(
                            ui,
                            comment_input,
                            !*comment_pending,
                            "Write a comment...",
                            "Publish",
                        ) {
                            actions.submit_comment = Some((post.id.clone(), text));
                        }
                        if let Some(error) = comment_error {
                            ui.colored_label(
                                egui::Color32::RED,
                                format!("Comment failed: {error}"),
                            );
                        }
                    } else if !post.preview_comments.is_empty() {
                        ui.separator();
                        for comment in &post.preview_comments {
                            comment_row(ui, comment);
                        }
                    }
                });
                ui.add_space(8.0);
            }
        });

    actions
}

pub(crate) fn post_header(ui: &mut egui::Ui, user_name: &str, timestamp: i64) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(user_name).strong());
        ui.label(egui::RichText::new(date_label(timestamp)).weak());
    });
}

/// Like button reflecting the current session's membership. Returns true on
/// click; the caller applies the optimistic toggle.
pub(crate) fn like_button(ui: &mut egui::Ui, post: &Post, uid: &str) -> bool {
    let label = if post.liked_by(uid) {
        format!("Liked ({})", post.likes.len())
    } else {
        format!("Like ({})", post.likes.len())
    };
    ui.button(label).clicked()
}

fn comment_row(ui: &mut egui::Ui, comment: &Comment) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(&comment.user_name).strong());
        ui.label(&comment.text);
    });
}
