// src/ui/result.rs
use eframe::egui;
use crate::analysis::AnalysisDisplay;
use crate::config::CarAnalysis;

pub fn show_analysis(ui: &mut egui::Ui, analysis: &CarAnalysis) {
    let display = AnalysisDisplay::from(analysis);

    ui.horizontal_wrapped(|ui| {
        card(ui, "Car Details", |ui| {
            ui.label(format!("Make: {}", display.make));
            ui.label(format!("Model: {}", display.model));
            ui.label(format!("Year: {}", display.year));
        });

        card(ui, "Price Range", |ui| {
            ui.label(&display.price);
        });

        card(ui, "Performance", |ui| {
            ui.label(format!("Horsepower: {}", display.horsepower));
            ui.label(format!("Top Speed: {}", display.top_speed));
        });
    });

    ui.add_space(4.0);
    card(ui, "Rarity", |ui| {
        ui.horizontal(|ui| {
            ui.label("Level:");
            ui.strong(&display.rarity);
            ui.separator();
            ui.label("Chance:");
            ui.strong(&display.chance);
        });
    });
}

fn card(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    ui.group(|ui| {
        ui.set_min_width(180.0);
        ui.vertical(|ui| {
            ui.strong(title);
            ui.add_space(4.0);
            add_contents(ui);
        });
    });
}
