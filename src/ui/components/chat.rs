use eframe::egui;

use crate::common::types::{Session, time_label};
use crate::ui::state::ChatState;

use super::input_bar;

#[derive(Default)]
pub struct ChatActions {
    pub submit: Option<String>,
    pub retry: bool,
}

pub fn render(ui: &mut egui::Ui, chat: &mut ChatState, session: &Session) -> ChatActions {
    let mut actions = ChatActions::default();

    ui.heading("General Chat");
    ui.separator();

    if let Some(error) = &chat.error {
        ui.colored_label(egui::Color32::RED, format!("Chat unavailable: {error}"));
        if ui.button("Retry").clicked() {
            actions.retry = true;
        }
        return actions;
    }

    let input_height = 40.0;
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .max_height(ui.available_height() - input_height)
        .show(ui, |ui| {
            if chat.loading {
                ui.label("Loading messages...");
                return;
            }
            for message in &chat.messages {
                let own = message.user_id == session.uid;
                if own {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                        ui.label(egui::RichText::new(time_label(message.timestamp)).weak());
                        ui.label(&message.text);
                    });
                } else {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(&message.user_name).strong());
                        ui.label(&message.text);
                        ui.label(egui::RichText::new(time_label(message.timestamp)).weak());
                    });
                }
            }
        });

    ui.separator();
    if let Some(text) = input_bar::render(
        ui,
        &mut chat.input,
        !chat.send_pending,
        "Type a message...",
        "Send",
    ) {
        actions.submit = Some(text);
    }
    if let Some(error) = &chat.send_error {
        ui.colored_label(egui::Color32::RED, format!("Send failed: {error}"));
    }

    actions
}
