// src/ui/settings.rs
use std::path::PathBuf;
use eframe::egui;
use crate::config::Settings;

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsAction {
    None,
    Save(Settings),
    Cancel,
}

/// Editable copy of the settings; list and optional fields are edited as text.
#[derive(Debug, Clone)]
pub struct SettingsDialog {
    draft: Settings,
    command_text: String,
    data_dir_text: String,
    timeout_text: String,
}

impl SettingsDialog {
    pub fn new(settings: &Settings) -> Self {
        Self {
            draft: settings.clone(),
            command_text: settings.camera.command.as_ref().map(|c| c.join(" ")).unwrap_or_default(),
            data_dir_text: settings
                .storage
                .data_dir
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
            timeout_text: settings
                .endpoint
                .request_timeout_secs
                .map(|s| s.to_string())
                .unwrap_or_default(),
        }
    }

    /// Blank text clears the optional fields.
    pub fn build(&self) -> Settings {
        let mut settings = self.draft.clone();

        let command: Vec<String> = self.command_text.split_whitespace().map(String::from).collect();
        settings.camera.command = if command.is_empty() { None } else { Some(command) };

        let data_dir = self.data_dir_text.trim();
        settings.storage.data_dir = if data_dir.is_empty() { None } else { Some(PathBuf::from(data_dir)) };

        settings.endpoint.request_timeout_secs = self.timeout_text.trim().parse().ok();
        settings
    }

    pub fn show(&mut self, ctx: &egui::Context) -> SettingsAction {
        let mut action = SettingsAction::None;

        egui::Window::new("Settings")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("settings_grid")
                    .num_columns(2)
                    .spacing([8.0, 6.0])
                    .show(ui, |ui| {
                        ui.label("Endpoint URL:");
                        ui.text_edit_singleline(&mut self.draft.endpoint.base_url);
                        ui.end_row();

                        ui.label("Endpoint path:");
                        ui.text_edit_singleline(&mut self.draft.endpoint.path);
                        ui.end_row();

                        ui.label("Timeout (s):");
                        ui.add(egui::TextEdit::singleline(&mut self.timeout_text).hint_text("none"));
                        ui.end_row();

                        ui.label("Camera:");
                        ui.checkbox(&mut self.draft.camera.enabled, "Use live camera");
                        ui.end_row();

                        ui.label("Grab command:");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.command_text)
                                .hint_text("program args... (frame on stdout)"),
                        );
                        ui.end_row();

                        ui.label("Frame interval (ms):");
                        ui.add(
                            egui::DragValue::new(&mut self.draft.camera.frame_interval_ms)
                                .clamp_range(20..=5000),
                        );
                        ui.end_row();

                        ui.label("JPEG quality:");
                        ui.add(egui::Slider::new(&mut self.draft.camera.jpeg_quality, 1..=100));
                        ui.end_row();

                        ui.label("Data directory:");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.data_dir_text)
                                .hint_text("platform default"),
                        );
                        ui.end_row();
                    });

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        action = SettingsAction::Save(self.build());
                    }
                    if ui.button("Cancel").clicked() {
                        action = SettingsAction::Cancel;
                    }
                });
            });

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_fields_round_trip() {
        let mut settings = Settings::default();
        settings.camera.command = Some(vec!["grab".to_string(), "--png".to_string()]);
        settings.storage.data_dir = Some(PathBuf::from("/srv/cars"));
        settings.endpoint.request_timeout_secs = Some(30);

        assert_eq!(SettingsDialog::new(&settings).build(), settings);
    }

    #[test]
    fn blank_text_clears_optional_fields() {
        let mut dialog = SettingsDialog::new(&Settings::default());
        dialog.command_text = "   ".to_string();
        dialog.data_dir_text = String::new();
        dialog.timeout_text = "soon".to_string();

        let settings = dialog.build();
        assert_eq!(settings.camera.command, None);
        assert_eq!(settings.storage.data_dir, None);
        assert_eq!(settings.endpoint.request_timeout_secs, None);
    }
}
