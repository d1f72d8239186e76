// src/ui/mod.rs
pub mod camera;
pub mod history;
pub mod result;
pub mod settings;
pub mod upload;
