use eframe::egui;

use crate::common::optimistic::toggle_membership;
use crate::common::types::Session;
use crate::ui::state::{ProfileState, ProfileTab};

use super::feed::{LikeAction, like_button, post_header};

#[derive(Default)]
pub struct ProfileActions {
    pub likes: Vec<LikeAction>,
    pub retry: bool,
}

pub fn render(ui: &mut egui::Ui, profile: &mut ProfileState, session: &Session) -> ProfileActions {
    let mut actions = ProfileActions::default();

    // Banner.
    ui.heading(&session.display_name);
    if !profile.details.bio.is_empty() {
        ui.label(&profile.details.bio);
    }
    ui.horizontal(|ui| {
        ui.label(format!("{} posts", profile.posts.len()));
        // Follower counts are not modeled; fixed values as in the original.
        ui.label("850 followers");
        ui.label("320 following");
        let edit_label = if profile.editing { "Cancel" } else { "Edit profile" };
        if ui.button(edit_label).clicked() {
            profile.editing = !profile.editing;
            if profile.editing {
                profile.draft = profile.details.clone();
            }
        }
    });
    ui.separator();

    if profile.editing {
        edit_form(ui, profile);
        ui.separator();
    }

    ui.horizontal(|ui| {
        let tabs = [
            (ProfileTab::Posts, "Posts"),
            (ProfileTab::Photos, "Photos"),
            (ProfileTab::Friends, "Friends"),
            (ProfileTab::About, "About"),
        ];
        for (tab, label) in tabs {
            if ui.selectable_label(profile.tab == tab, label).clicked() {
                profile.tab = tab;
            }
        }
    });
    ui.separator();

    match profile.tab {
        ProfileTab::Posts => posts_tab(ui, profile, session, &mut actions),
        ProfileTab::Photos => photos_tab(ui, profile),
        ProfileTab::Friends => friends_tab(ui, profile),
        ProfileTab::About => about_tab(ui, profile, session),
    }

    actions
}

fn edit_form(ui: &mut egui::Ui, profile: &mut ProfileState) {
    ui.label(egui::RichText::new("Edit profile").strong());
    egui::Grid::new("profile_edit").num_columns(2).show(ui, |ui| {
        ui.label("Bio");
        ui.text_edit_singleline(&mut profile.draft.bio);
        ui.end_row();
        ui.label("Location");
        ui.text_edit_singleline(&mut profile.draft.location);
        ui.end_row();
        ui.label("Website");
        ui.text_edit_singleline(&mut profile.draft.website);
        ui.end_row();
        ui.label("Birthday");
        ui.text_edit_singleline(&mut profile.draft.birthday);
        ui.end_row();
    });
    ui.horizontal(|ui| {
        if ui.button("Save changes").clicked() {
            // Saved locally only; these fields are never written remotely.
            profile.details = profile.draft.clone();
            profile.editing = false;
        }
        if ui.button("Cancel").clicked() {
            profile.editing = false;
        }
    });
}

fn posts_tab(
    ui: &mut egui::Ui,
    profile: &mut ProfileState,
    session: &Session,
    actions: &mut ProfileActions,
) {
    if let Some(error) = &profile.error {
        ui.colored_label(egui::Color32::RED, format!("Posts unavailable: {error}"));
        if ui.button("Retry").clicked() {
            actions.retry = true;
        }
        return;
    }
    if profile.loading {
        ui.label("Loading posts...");
        return;
    }
    if profile.posts.is_empty() {
        ui.label("No posts yet.");
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for post in profile.posts.iter_mut() {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    post_header(ui, &post.user_name, post.timestamp);
                    ui.label(&post.content);
                    if like_button(ui, post, &session.uid) {
                        let toggle = toggle_membership(&mut post.likes, &session.uid);
                        actions.likes.push(LikeAction {
                            post_id: post.id.clone(),
                            toggle,
                        });
                    }
                });
                ui.add_space(8.0);
            }
        });
}

fn photos_tab(ui: &mut egui::Ui, profile: &ProfileState) {
    ui.label(egui::RichText::new("Photos").strong());
    for photo in &profile.photos {
        ui.label(format!("[photo] {}", photo.caption));
    }
}

fn friends_tab(ui: &mut egui::Ui, profile: &ProfileState) {
    ui.label(
        egui::RichText::new(format!("Friends ({})", profile.friends.len())).strong(),
    );
    for friend in &profile.friends {
        ui.horizontal(|ui| {
            ui.label(&friend.name);
            ui.label(egui::RichText::new(format!("{} mutual friends", friend.mutual)).weak());
        });
    }
}

fn about_tab(ui: &mut egui::Ui, profile: &ProfileState, session: &Session) {
    ui.label(egui::RichText::new("About").strong());
    egui::Grid::new("profile_about").num_columns(2).show(ui, |ui| {
        ui.label("Full name:");
        ui.label(&session.display_name);
        ui.end_row();
        ui.label("Email:");
        ui.label(&session.email);
        ui.end_row();
        ui.label("Location:");
        ui.label(&profile.details.location);
        ui.end_row();
        ui.label("Website:");
        ui.label(&profile.details.website);
        ui.end_row();
        ui.label("Birthday:");
        ui.label(&profile.details.birthday);
        ui.end_row();
    });
}
