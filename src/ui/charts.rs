use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Plot, PlotBounds, PlotPoints,
    Points,
};

use crate::charts::{BarChartSpec, BoxPlotSpec, ChartSet, ScatterSpec};
use crate::color::ColorMap;
use crate::data::filter::SCORE_BOUNDS;

const CHART_HEIGHT: f32 = 320.0;
/// Vega's default mark colour, used for the single-series bar chart.
const BAR_COLOR: Color32 = Color32::from_rgb(0x4c, 0x78, 0xa8);
/// egui_plot draws axis labels horizontally, so long names are shortened.
const MAX_BAR_LABEL: usize = 14;

// ---------------------------------------------------------------------------
// Chart panel (central panel)
// ---------------------------------------------------------------------------

/// Render the three charts one below the other.
pub fn chart_panel(ui: &mut Ui, charts: &ChartSet, colors: &ColorMap) {
    bar_chart(ui, &charts.price_by_neighbourhood);
    ui.add_space(12.0);
    box_plot(ui, &charts.price_by_room_type, colors);
    ui.add_space(12.0);
    scatter(ui, &charts.score_vs_price, colors);
}

fn bar_chart(ui: &mut Ui, spec: &BarChartSpec) {
    ui.strong(&spec.title);

    let names: Vec<String> = spec
        .bars
        .iter()
        .map(|b| b.neighbourhood_cleansed.clone())
        .collect();
    let bars: Vec<Bar> = spec
        .bars
        .iter()
        .enumerate()
        .map(|(i, b)| {
            Bar::new(i as f64, b.mean_price)
                .name(&b.neighbourhood_cleansed)
                .width(0.8)
        })
        .collect();
    let chart = BarChart::new(bars)
        .color(BAR_COLOR)
        .element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| {
            format!("{}\nmean(price): {:.2}", bar.name, bar.value)
        }));

    Plot::new("price_by_neighbourhood")
        .height(CHART_HEIGHT)
        .x_axis_label(spec.x.title.as_str())
        .y_axis_label(spec.y.title.as_str())
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&names, mark.value)
        })
        .include_y(0.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

fn box_plot(ui: &mut Ui, spec: &BoxPlotSpec, colors: &ColorMap) {
    ui.strong(&spec.title);

    let names: Vec<String> = spec.boxes.iter().map(|b| b.room_type.clone()).collect();
    let n = spec.boxes.len();
    let (y_min, y_max) = spec.y.domain.unwrap_or((0.0, 1.0));

    Plot::new("price_by_room_type")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(spec.x.title.as_str())
        .y_axis_label(spec.y.title.as_str())
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&names, mark.value)
        })
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            for (i, b) in spec.boxes.iter().enumerate() {
                let color = colors.color_for(&b.room_type);
                let elem = BoxElem::new(i as f64, BoxSpread::new(b.min, b.q1, b.median, b.q3, b.max))
                    .name(&b.room_type)
                    .box_width(0.5)
                    .whisker_width(0.3)
                    .fill(color.gamma_multiply(0.4))
                    .stroke(Stroke::new(1.5, color));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&b.room_type).color(color));
            }
            // The axis domain clips what is drawn; statistics include every price.
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                [-0.5, y_min],
                [n.max(1) as f64 - 0.5, y_max],
            ));
        });
}

fn scatter(ui: &mut Ui, spec: &ScatterSpec, colors: &ColorMap) {
    ui.strong(&spec.title);

    let mut series: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for p in &spec.points {
        series
            .entry(p.room_type.as_str())
            .or_default()
            .push([p.price, p.review_scores_rating]);
    }

    let (min, max) = initial_view(spec);
    // Set once the initial view has been applied; cleared by a double-click reset.
    let fitted_id = ui.id().with("score_vs_price_fitted");
    let fitted = ui.data_mut(|d| d.get_temp::<bool>(fitted_id)).unwrap_or(false);
    let x_title = spec.x.title.clone();
    let y_title = spec.y.title.clone();

    let response = Plot::new("score_vs_price")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(spec.x.title.as_str())
        .y_axis_label(spec.y.title.as_str())
        .label_formatter(move |name, value| {
            let head = if name.is_empty() { String::new() } else { format!("{name}\n") };
            format!("{head}{x_title}: {:.2}\n{y_title}: {:.2}", value.x, value.y)
        })
        .allow_drag(spec.interactive)
        .allow_zoom(spec.interactive)
        .allow_scroll(spec.interactive)
        .allow_boxed_zoom(spec.interactive)
        .show(ui, |plot_ui| {
            for (room_type, points) in series {
                let color = colors.color_for(room_type).gamma_multiply(spec.opacity);
                let points: PlotPoints = points.into_iter().collect();
                plot_ui.points(Points::new(points).name(room_type).color(color).radius(3.0));
            }
            if !fitted {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(min, max));
            }
        });

    let reset = response.response.double_clicked();
    ui.data_mut(|d| d.insert_temp(fitted_id, !reset));
}

/// Opening view of the scatter plot: the x domain, and the score range of
/// the points (or the full score scale when there are none).
fn initial_view(spec: &ScatterSpec) -> ([f64; 2], [f64; 2]) {
    let (x_min, x_max) = spec.x.domain.unwrap_or_else(|| {
        spec.points
            .iter()
            .map(|p| p.price)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
    });
    let (y_min, y_max) = spec
        .points
        .iter()
        .map(|p| p.review_scores_rating)
        .fold(None, |acc: Option<(f64, f64)>, v| {
            Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
        })
        .unwrap_or(SCORE_BOUNDS);
    let pad = ((y_max - y_min) * 0.05).max(0.05);
    ([x_min, y_min - pad], [x_max, y_max + pad])
}

/// Category name for an integer grid position, blank between categories.
fn category_label(names: &[String], value: f64) -> String {
    if value < 0.0 || value.fract() != 0.0 {
        return String::new();
    }
    match names.get(value as usize) {
        Some(name) if name.chars().count() > MAX_BAR_LABEL => {
            let short: String = name.chars().take(MAX_BAR_LABEL - 1).collect();
            format!("{short}…")
        }
        Some(name) => name.clone(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_only_on_whole_positions() {
        let names = vec!["Back Bay".to_string(), "Jamaica Plain".to_string()];
        assert_eq!(category_label(&names, 0.0), "Back Bay");
        assert_eq!(category_label(&names, 0.5), "");
        assert_eq!(category_label(&names, -1.0), "");
        assert_eq!(category_label(&names, 2.0), "");
    }

    #[test]
    fn scatter_opens_on_the_price_domain() {
        use crate::charts::{scatter, SCATTER_PRICE_DOMAIN};
        use crate::data::model::ProjectedListing;

        let rows: Vec<ProjectedListing> = [(80.0, 3.0), (4000.0, 5.0), (250.0, 4.0)]
            .iter()
            .map(|&(price, score)| ProjectedListing {
                neighbourhood_cleansed: "Fenway".to_string(),
                price,
                room_type: "Private room".to_string(),
                number_of_reviews: 1,
                review_scores_rating: score,
            })
            .collect();
        let (min, max) = initial_view(&scatter(&rows));

        // Prices above the domain do not widen the opening view.
        assert_eq!((min[0], max[0]), SCATTER_PRICE_DOMAIN);
        assert!(min[1] < 3.0 && max[1] > 5.0);
    }

    #[test]
    fn empty_scatter_opens_on_the_score_scale() {
        let (min, max) = initial_view(&crate::charts::scatter(&[]));
        assert_eq!(min[0], 0.0);
        assert_eq!(max[0], 500.0);
        assert!(min[1] < SCORE_BOUNDS.0 && max[1] > SCORE_BOUNDS.1);
    }

    #[test]
    fn long_category_labels_are_shortened() {
        let names = vec!["South Boston Waterfront".to_string()];
        let label = category_label(&names, 0.0);
        assert_eq!(label.chars().count(), MAX_BAR_LABEL);
        assert!(label.ends_with('…'));
    }
}
