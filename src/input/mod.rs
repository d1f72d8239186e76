// src/input/mod.rs
pub mod camera;
pub mod dropped;
pub mod image_file;
pub mod picker;

pub use camera::{CameraStream, CommandCamera};
pub use image_file::ImageFile;
