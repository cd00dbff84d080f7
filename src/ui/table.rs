use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::{Listing, REQUIRED_COLUMNS};
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;
const MAX_TABLE_HEIGHT: f32 = 320.0;

/// Render the listings that pass the current filters.
pub fn filtered_table(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        return;
    };

    ui.strong(format!("Filtered listings ({})", state.filtered.len()));
    if state.filtered.is_empty() {
        ui.label("No listings match the current filters.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .vscroll(true)
        .max_scroll_height(MAX_TABLE_HEIGHT)
        .columns(Column::auto().at_least(90.0), REQUIRED_COLUMNS.len())
        .header(ROW_HEIGHT + 2.0, |mut header| {
            for name in REQUIRED_COLUMNS {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, state.filtered.len(), |mut row| {
                let Some(listing) = table.listings.get(state.filtered[row.index()]) else {
                    return;
                };
                for cell in cells(listing) {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}

/// Display text for the five columns, in `REQUIRED_COLUMNS` order.
fn cells(listing: &Listing) -> [String; 5] {
    [
        listing.neighbourhood_cleansed.clone().unwrap_or_default(),
        listing.price.map(|p| format!("${p:.2}")).unwrap_or_default(),
        listing.room_type.clone().unwrap_or_default(),
        listing
            .number_of_reviews
            .map(|n| n.to_string())
            .unwrap_or_default(),
        listing
            .review_scores_rating
            .map(|s| format!("{s:.2}"))
            .unwrap_or_default(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_render_blank() {
        let listing = Listing {
            neighbourhood_cleansed: Some("Fenway".to_string()),
            price: Some(1234.5),
            room_type: None,
            number_of_reviews: Some(7),
            review_scores_rating: None,
        };
        assert_eq!(cells(&listing), ["Fenway", "$1234.50", "", "7", ""]);
    }
}
