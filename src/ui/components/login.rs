use eframe::egui;

#[derive(Default)]
pub struct LoginActions {
    pub sign_in: bool,
}

pub fn render(ui: &mut egui::Ui, auth_pending: bool, auth_error: Option<&str>) -> LoginActions {
    let mut actions = LoginActions::default();

    ui.vertical_centered(|ui| {
        ui.add_space(80.0);
        ui.heading("My Social Network");
        ui.label("Connect with people around the world");
        ui.add_space(20.0);

        if auth_pending {
            ui.label("Signing in...");
        } else if ui
            .add(egui::Button::new("Sign in").min_size(egui::vec2(160.0, 32.0)))
            .clicked()
        {
            actions.sign_in = true;
        }

        if let Some(error) = auth_error {
            ui.add_space(10.0);
            ui.colored_label(egui::Color32::RED, format!("Sign-in failed: {error}"));
        }
    });

    actions
}
