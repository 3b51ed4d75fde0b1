use eframe::egui;

/// Single-line input with a submit button. Returns the trimmed text on
/// Enter or button click; empty-after-trim input submits nothing. The text
/// is intentionally not cleared here: the caller clears it once the backend
/// confirms the write, so a failure leaves it intact for retry.
pub fn render(
    ui: &mut egui::Ui,
    input_text: &mut String,
    enabled: bool,
    hint: &str,
    button_label: &str,
) -> Option<String> {
    let mut send = false;
    ui.horizontal(|ui| {
        let response = ui.add_enabled(
            enabled,
            egui::TextEdit::singleline(input_text).hint_text(hint),
        );
        if ui.add_enabled(enabled, egui::Button::new(button_label)).clicked() {
            send = true;
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
        }
    });

    if send && enabled && !input_text.trim().is_empty() {
        return Some(input_text.trim().to_string());
    }

    None
}
