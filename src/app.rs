// src/app.rs
use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{Context, Result};
use tracing::error;

use crate::analysis::HttpAnalyzer;
use crate::config::Settings;
use crate::file::{FileHandler, FileStorage, KeyValueStorage, SettingsFileHandler};
use crate::input::{dropped, picker, CommandCamera};
use crate::state::{AppState, CameraOutcome, Notify, Screen};
use crate::ui::camera::{CameraAction, CameraPreview};
use crate::ui::history::{show_history_view, ThumbnailCache};
use crate::ui::settings::{SettingsAction, SettingsDialog};
use crate::ui::upload::{show_error_banner, show_upload_view, UploadAction};

const LAST_DIR_KEY: &str = "last_image_dir";

pub struct CarAnalyzerApp {
    state: AppState,
    settings_handler: SettingsFileHandler,
    settings_path: PathBuf,
    settings_dialog: Option<SettingsDialog>,
    thumbnails: ThumbnailCache,
    preview: CameraPreview,
}

impl CarAnalyzerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        mut state: AppState,
        settings_handler: SettingsFileHandler,
        settings_path: PathBuf,
    ) -> Self {
        if let Some(storage) = cc.storage {
            state.last_image_dir = eframe::get_value::<Option<PathBuf>>(storage, LAST_DIR_KEY).flatten();
        }

        Self {
            state,
            settings_handler,
            settings_path,
            settings_dialog: None,
            thumbnails: ThumbnailCache::default(),
            preview: CameraPreview::default(),
        }
    }

    fn notifier(ctx: &egui::Context) -> Notify {
        let ctx = ctx.clone();
        Box::new(move || ctx.request_repaint())
    }

    fn show_menu(&mut self, ui: &mut egui::Ui) {
        let busy = self.state.is_busy();
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.add_enabled(!busy, egui::Button::new("Open Image...")).clicked() {
                    self.pick_image(ui.ctx());
                    ui.close_menu();
                }
                if ui.button("Settings...").clicked() {
                    self.settings_dialog = Some(SettingsDialog::new(&self.state.settings));
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                    ui.close_menu();
                }
            });
        });
    }

    fn pick_image(&mut self, ctx: &egui::Context) {
        if let Some(path) = picker::pick_image(self.state.last_image_dir.as_deref()) {
            self.state.submit_path(&path, Self::notifier(ctx));
        }
    }

    fn open_camera(&mut self, ctx: &egui::Context) {
        match self.state.open_camera() {
            CameraOutcome::Opened => self.preview.reset(),
            CameraOutcome::Fallback => {
                if let Some(path) = picker::pick_capture(self.state.last_image_dir.as_deref()) {
                    self.state.submit_path(&path, Self::notifier(ctx));
                }
            }
        }
    }

    fn save_settings(&mut self, settings: Settings) -> Result<()> {
        let analyzer = HttpAnalyzer::new(&settings.endpoint).context("Invalid endpoint settings")?;
        self.settings_handler
            .save(&settings, &self.settings_path)
            .with_context(|| format!("Failed to write {}", self.settings_path.display()))?;

        let data_dir = settings.storage.resolve_data_dir();
        let storage: Option<Box<dyn KeyValueStorage>> =
            if data_dir != self.state.settings.storage.resolve_data_dir() {
                self.thumbnails.clear();
                Some(Box::new(FileStorage::new(data_dir)))
            } else {
                None
            };

        let camera = CommandCamera::from_settings(&settings.camera);
        self.preview.reset();
        self.state.apply_settings(settings, Arc::new(analyzer), Box::new(camera), storage);
        Ok(())
    }
}

impl eframe::App for CarAnalyzerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_submission();

        if !self.state.is_busy() && self.state.current_screen == Screen::Upload {
            if let Some(image) = dropped::take_dropped_image(ctx) {
                self.state.submit_image(image, Self::notifier(ctx));
            }
        }

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            self.show_menu(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_source("main_scroll")
                .show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("Car Analyzer");
                        ui.label("Upload a car image to get detailed information about the vehicle");
                    });
                    ui.add_space(16.0);
                    show_error_banner(ui, &mut self.state.error_message);

                    match self.state.current_screen {
                        Screen::Upload => match show_upload_view(ui, &self.state) {
                            UploadAction::PickFile => self.pick_image(ctx),
                            UploadAction::OpenCamera => self.open_camera(ctx),
                            UploadAction::None => {}
                        },
                        Screen::Camera => {
                            let busy = self.state.is_busy();
                            match self.preview.show(ui, self.state.camera_stream(), busy) {
                                CameraAction::Capture => {
                                    self.state.capture_and_submit(Self::notifier(ctx));
                                    self.preview.reset();
                                }
                                CameraAction::Cancel => {
                                    self.state.close_camera();
                                    self.preview.reset();
                                }
                                CameraAction::None => {}
                            }
                        }
                    }

                    ui.add_space(16.0);
                    ui.separator();
                    show_history_view(ui, &self.state.history, &mut self.thumbnails);
                });
        });

        let action = self
            .settings_dialog
            .as_mut()
            .map(|dialog| dialog.show(ctx))
            .unwrap_or(SettingsAction::None);
        match action {
            SettingsAction::Save(settings) => match self.save_settings(settings) {
                Ok(()) => self.settings_dialog = None,
                Err(e) => {
                    error!("Failed to save settings: {:#}", e);
                    self.state.error_message = Some(format!("Failed to save settings: {:#}", e));
                }
            },
            SettingsAction::Cancel => self.settings_dialog = None,
            SettingsAction::None => {}
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, LAST_DIR_KEY, &self.state.last_image_dir);
    }
}
