use std::path::Path;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{charts, panels, table};

const PAGE_TITLE: &str = "Massachusetts Airbnb Listings";
const PAGE_INTRO: &str =
    "Let's explore and look at the relationships between neighborhoods, reviews, and prices.";

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ListingExplorerApp {
    pub state: AppState,
}

impl ListingExplorerApp {
    /// Start the app with `path` already loaded (or its load error shown).
    pub fn new(path: &Path) -> Self {
        let mut state = AppState::default();
        state.open(path);
        Self { state }
    }
}

impl eframe::App for ListingExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            page(ui, &self.state);
        });
    }
}

fn page(ui: &mut Ui, state: &AppState) {
    if let Some(err) = &state.load_error {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(RichText::new(err).color(Color32::RED));
        });
        return;
    }
    let Some(chart_set) = &state.charts else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a listings file to explore  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(PAGE_TITLE);
            ui.label(PAGE_INTRO);
            ui.add_space(8.0);

            charts::chart_panel(ui, chart_set, &state.color_map);

            ui.separator();
            table::filtered_table(ui, state);
        });
}
