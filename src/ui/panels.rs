use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, SliderClamping, Ui};

use crate::data::filter::{neighbourhood_options, SCORE_BOUNDS, SCORE_STEP};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

enum PanelAction {
    Reset,
    ShowAll,
}

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(table) = state.table.clone() else {
        ui.label("No listings loaded.");
        return;
    };

    // Edit a copy so the whole selection is applied at once below.
    let mut filters = state.filters.clone();
    let mut follow = state.charts_follow_filters;
    let mut action = None;
    let colors = &state.color_map;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Neighbourhood ----
            ui.strong("Neighborhood");
            egui::ComboBox::from_id_salt("neighbourhood")
                .selected_text(filters.neighbourhood.to_string())
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for option in neighbourhood_options(&table) {
                        let label = option.to_string();
                        ui.selectable_value(&mut filters.neighbourhood, option, label);
                    }
                });
            ui.add_space(8.0);

            // ---- Price ----
            ui.strong("Price Range");
            match table.price_bounds {
                Some((lo, hi)) => range_sliders(ui, &mut filters.price_range, lo..=hi, 1.0, "$"),
                None => {
                    ui.label("No prices in this file.");
                }
            }
            ui.add_space(8.0);

            // ---- Room types ----
            ui.strong(format!(
                "Room Type(s)  ({}/{})",
                filters.room_types.len(),
                table.room_types.len()
            ));
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    filters.room_types = table.room_types.iter().cloned().collect();
                }
                if ui.small_button("None").clicked() {
                    filters.room_types.clear();
                }
            });
            for room_type in &table.room_types {
                let mut checked = filters.room_types.contains(room_type);
                let text = RichText::new(room_type).color(colors.color_for(room_type));
                if ui.checkbox(&mut checked, text).changed() {
                    if checked {
                        filters.room_types.insert(room_type.clone());
                    } else {
                        filters.room_types.remove(room_type);
                    }
                }
            }
            ui.add_space(8.0);

            // ---- Review score ----
            ui.strong("Review Score Range");
            range_sliders(
                ui,
                &mut filters.score_range,
                SCORE_BOUNDS.0..=SCORE_BOUNDS.1,
                SCORE_STEP,
                "",
            );
            ui.separator();

            ui.horizontal(|ui: &mut Ui| {
                if ui.button("Reset").clicked() {
                    action = Some(PanelAction::Reset);
                }
                if ui.button("Show all").clicked() {
                    action = Some(PanelAction::ShowAll);
                }
            });
            ui.checkbox(&mut follow, "Charts follow filters");
        });

    // Recompute the filtered table if any control changed.
    state.set_filters(filters);
    match action {
        Some(PanelAction::Reset) => state.reset_filters(),
        Some(PanelAction::ShowAll) => state.show_all(),
        None => {}
    }
    state.set_charts_follow_filters(follow);
}

/// Two sliders editing an inclusive `(min, max)` range.
///
/// Values outside `bounds` are left alone until the user edits them.
fn range_sliders(
    ui: &mut Ui,
    range: &mut (f64, f64),
    bounds: RangeInclusive<f64>,
    step: f64,
    prefix: &str,
) {
    let (lo, hi) = range;
    let lo_changed = ui
        .add(
            Slider::new(lo, bounds.clone())
                .step_by(step)
                .clamping(SliderClamping::Edits)
                .prefix(prefix)
                .text("min"),
        )
        .changed();
    let hi_changed = ui
        .add(
            Slider::new(hi, bounds)
                .step_by(step)
                .clamping(SliderClamping::Edits)
                .prefix(prefix)
                .text("max"),
        )
        .changed();

    if *lo > *hi {
        if lo_changed {
            *hi = *lo;
        } else if hi_changed {
            *lo = *hi;
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.charts.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export chart specs…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} listings loaded, {} shown by filters",
                table.len(),
                state.filtered.len()
            ));
        }
        if let Some(source) = &state.source {
            ui.separator();
            ui.weak(source.display().to_string());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listings")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export chart specs")
        .add_filter("Vega-Lite JSON", &["json"])
        .set_file_name("charts.json")
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_charts(&path) {
            log::error!("Failed to export charts: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
