use eframe::egui;

use crate::common::types::Session;
use crate::ui::state::Screen;

#[derive(Default)]
pub struct SidebarActions {
    pub navigate: Option<Screen>,
    pub sign_out: bool,
}

fn initial(name: &str) -> String {
    name.chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "?".to_string())
}

pub fn render(ui: &mut egui::Ui, session: &Session, current: Screen) -> SidebarActions {
    let mut actions = SidebarActions::default();

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        ui.colored_label(
            egui::Color32::LIGHT_BLUE,
            egui::RichText::new(format!("({})", initial(&session.display_name))).strong(),
        );
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(&session.display_name).strong());
            ui.label(egui::RichText::new(&session.email).weak());
        });
    });
    ui.separator();

    let entries = [
        (Screen::Feed, "Feed"),
        (Screen::Profile, "Profile"),
        (Screen::Chat, "Chat"),
    ];
    for (screen, label) in entries {
        if ui.selectable_label(current == screen, label).clicked() && current != screen {
            actions.navigate = Some(screen);
        }
    }

    ui.separator();
    if ui.button("Sign out").clicked() {
        actions.sign_out = true;
    }

    actions
}
