#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use ar_paint::{PaintApp, PaintSettings};

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    // Optional settings file as the only argument
    let settings = match std::env::args().nth(1) {
        Some(path) => match PaintSettings::load(&path) {
            Ok(settings) => Some(settings),
            Err(err) => {
                log::error!("Ignoring settings from {}: {}", path, err);
                None
            }
        },
        None => None,
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 720.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };
    eframe::run_native(
        "AR Paint",
        native_options,
        Box::new(|cc| Ok(Box::new(PaintApp::new(cc, settings)))),
    )
}
