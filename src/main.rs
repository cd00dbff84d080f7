mod app;
mod charts;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::ListingExplorerApp;
use eframe::egui;

/// Loaded at startup when no path is given on the command line.
const DEFAULT_LISTINGS: &str = "listings.csv";

fn main() -> eframe::Result {
    env_logger::init();

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LISTINGS));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Listing Explorer",
        options,
        Box::new(move |_cc| Ok(Box::new(ListingExplorerApp::new(&path)))),
    )
}
