// src/main.rs
use eframe::egui;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod analysis;
mod app;
mod config;
mod file;
mod input;
mod state;
mod ui;
mod utils;

use analysis::HttpAnalyzer;
use app::CarAnalyzerApp;
use config::Settings;
use file::{FileHandler, FileStorage, SettingsFileHandler};
use input::CommandCamera;
use state::AppState;

/// `RUST_LOG` wins over the configured level.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let settings_handler = SettingsFileHandler::new();
    let settings_path = SettingsFileHandler::default_path();
    // Settings pick the log level, so errors are reported once tracing is up
    let (settings, settings_error) = match settings_handler.load(&settings_path) {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };

    init_tracing(&settings.log_level);
    if let Some(e) = settings_error {
        warn!("Using default settings: {:#}", e);
    }

    let data_dir = settings.storage.resolve_data_dir();
    info!(
        endpoint = %settings.endpoint.url(),
        settings = %settings_path.display(),
        data = %data_dir.display(),
        "Starting Car Analyzer"
    );

    let analyzer = HttpAnalyzer::new(&settings.endpoint).context("Failed to build HTTP client")?;
    let camera = CommandCamera::from_settings(&settings.camera);
    let state = AppState::new(
        settings,
        Box::new(FileStorage::new(data_dir)),
        Arc::new(analyzer),
        Box::new(camera),
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 768.0])
            .with_title("Car Analyzer")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Car Analyzer",
        options,
        Box::new(move |cc| {
            Box::new(CarAnalyzerApp::new(cc, state, settings_handler, settings_path))
        }),
    ).map_err(|e| anyhow::anyhow!("Failed to run application: {}", e))
}
