use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use crate::data::model::{ProjectedListing, NEIGHBOURHOOD, PRICE, REVIEW_SCORES_RATING, ROOM_TYPE};

// ---------------------------------------------------------------------------
// Display constants
// ---------------------------------------------------------------------------

/// Price axis domain of the box plot. Values outside still count towards the
/// box statistics; the axis only clips what is drawn.
pub const BOX_PRICE_DOMAIN: (f64, f64) = (0.0, 2000.0);
/// Price axis domain of the scatter plot.
pub const SCATTER_PRICE_DOMAIN: (f64, f64) = (0.0, 500.0);
pub const SCATTER_OPACITY: f32 = 0.5;
pub const BAR_LABEL_ANGLE: f32 = -45.0;

// ---------------------------------------------------------------------------
// Chart specifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    /// Fixed scale domain; `None` means fit to data.
    pub domain: Option<(f64, f64)>,
    pub label_angle: Option<f32>,
}

impl Axis {
    fn titled(title: &str) -> Self {
        Axis {
            title: title.to_string(),
            domain: None,
            label_angle: None,
        }
    }
}

/// One bar: the mean price of a neighbourhood.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighbourhoodBar {
    pub neighbourhood_cleansed: String,
    pub mean_price: f64,
    pub count: usize,
}

/// Average price by neighbourhood, bars sorted by descending mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartSpec {
    pub title: String,
    pub x: Axis,
    pub y: Axis,
    pub tooltip: Vec<String>,
    pub bars: Vec<NeighbourhoodBar>,
}

/// Min-max box statistics of price for one room type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomTypeBox {
    pub room_type: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub count: usize,
}

/// Price distribution by room type, coloured by room type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlotSpec {
    pub title: String,
    pub x: Axis,
    pub y: Axis,
    pub color_field: String,
    pub boxes: Vec<RoomTypeBox>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub price: f64,
    pub review_scores_rating: f64,
    pub room_type: String,
}

/// Review score against price, one point per row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSpec {
    pub title: String,
    pub x: Axis,
    pub y: Axis,
    pub color_field: String,
    pub opacity: f32,
    pub tooltip: Vec<String>,
    /// Pan and zoom enabled.
    pub interactive: bool,
    pub points: Vec<ScatterPoint>,
}

/// The three charts of the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSet {
    pub price_by_neighbourhood: BarChartSpec,
    pub price_by_room_type: BoxPlotSpec,
    pub score_vs_price: ScatterSpec,
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Build all three chart specifications from projected rows.
pub fn build_charts(rows: &[ProjectedListing]) -> ChartSet {
    ChartSet {
        price_by_neighbourhood: bar_chart(rows),
        price_by_room_type: box_plot(rows),
        score_vs_price: scatter(rows),
    }
}

pub fn bar_chart(rows: &[ProjectedListing]) -> BarChartSpec {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for row in rows {
        let entry = sums.entry(row.neighbourhood_cleansed.as_str()).or_default();
        entry.0 += row.price;
        entry.1 += 1;
    }

    let mut bars: Vec<NeighbourhoodBar> = sums
        .into_iter()
        .map(|(name, (sum, count))| NeighbourhoodBar {
            neighbourhood_cleansed: name.to_string(),
            mean_price: sum / count as f64,
            count,
        })
        .collect();
    // Descending by mean; the BTreeMap order breaks ties by name.
    bars.sort_by(|a, b| b.mean_price.total_cmp(&a.mean_price));

    BarChartSpec {
        title: "Average Airbnb Price by Neighborhood".to_string(),
        x: Axis {
            label_angle: Some(BAR_LABEL_ANGLE),
            ..Axis::titled("Neighborhoods cleansed")
        },
        y: Axis::titled("Mean of price"),
        tooltip: vec![NEIGHBOURHOOD.to_string(), format!("mean({PRICE})")],
        bars,
    }
}

pub fn box_plot(rows: &[ProjectedListing]) -> BoxPlotSpec {
    let mut prices: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for row in rows {
        prices.entry(row.room_type.as_str()).or_default().push(row.price);
    }

    let boxes = prices
        .into_iter()
        .map(|(room_type, mut values)| {
            values.sort_by(f64::total_cmp);
            RoomTypeBox {
                room_type: room_type.to_string(),
                min: values[0],
                q1: quantile(&values, 0.25),
                median: quantile(&values, 0.5),
                q3: quantile(&values, 0.75),
                max: values[values.len() - 1],
                count: values.len(),
            }
        })
        .collect();

    BoxPlotSpec {
        title: "Price Distribution by Room Type".to_string(),
        x: Axis::titled(ROOM_TYPE),
        y: Axis {
            domain: Some(BOX_PRICE_DOMAIN),
            ..Axis::titled(PRICE)
        },
        color_field: ROOM_TYPE.to_string(),
        boxes,
    }
}

pub fn scatter(rows: &[ProjectedListing]) -> ScatterSpec {
    ScatterSpec {
        title: "Review Score vs. Price".to_string(),
        x: Axis {
            domain: Some(SCATTER_PRICE_DOMAIN),
            ..Axis::titled(PRICE)
        },
        y: Axis::titled(REVIEW_SCORES_RATING),
        color_field: ROOM_TYPE.to_string(),
        opacity: SCATTER_OPACITY,
        tooltip: vec![PRICE.to_string(), REVIEW_SCORES_RATING.to_string()],
        interactive: true,
        points: rows
            .iter()
            .map(|r| ScatterPoint {
                price: r.price,
                review_scores_rating: r.review_scores_rating,
                room_type: r.room_type.clone(),
            })
            .collect(),
    }
}

/// Linearly interpolated quantile of non-empty sorted values.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ---------------------------------------------------------------------------
// Vega-Lite export
// ---------------------------------------------------------------------------

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

impl ChartSet {
    /// The three charts as Vega-Lite documents with inline data.
    pub fn to_vega_lite(&self) -> Vec<JsonValue> {
        let bar = &self.price_by_neighbourhood;
        let boxes = &self.price_by_room_type;
        let sc = &self.score_vs_price;

        // The box plot aggregates in the renderer, so it needs the raw rows.
        let price_rows: Vec<JsonValue> = sc
            .points
            .iter()
            .map(|p| json!({ PRICE: p.price, ROOM_TYPE: p.room_type }))
            .collect();

        vec![
            json!({
                "$schema": VEGA_LITE_SCHEMA,
                "title": bar.title,
                "data": { "values": bar.bars },
                "mark": "bar",
                "encoding": {
                    "x": {
                        "field": NEIGHBOURHOOD,
                        "type": "nominal",
                        "sort": "-y",
                        "title": bar.x.title,
                        "axis": { "labelAngle": bar.x.label_angle },
                    },
                    "y": { "field": "mean_price", "type": "quantitative", "title": bar.y.title },
                    "tooltip": [
                        { "field": NEIGHBOURHOOD, "type": "nominal" },
                        { "field": "mean_price", "type": "quantitative", "title": bar.tooltip[1] },
                    ],
                },
            }),
            json!({
                "$schema": VEGA_LITE_SCHEMA,
                "title": boxes.title,
                "data": { "values": price_rows },
                "mark": { "type": "boxplot", "extent": "min-max" },
                "encoding": {
                    "x": { "field": ROOM_TYPE, "type": "nominal", "title": boxes.x.title },
                    "y": {
                        "field": PRICE,
                        "type": "quantitative",
                        "scale": { "domain": domain_json(boxes.y.domain) },
                    },
                    "color": { "field": boxes.color_field, "type": "nominal" },
                },
            }),
            json!({
                "$schema": VEGA_LITE_SCHEMA,
                "title": sc.title,
                "data": { "values": sc.points },
                "mark": { "type": "circle", "opacity": sc.opacity },
                "params": [{ "name": "grid", "select": "interval", "bind": "scales" }],
                "encoding": {
                    "x": {
                        "field": PRICE,
                        "type": "quantitative",
                        "scale": { "domain": domain_json(sc.x.domain) },
                    },
                    "y": { "field": REVIEW_SCORES_RATING, "type": "quantitative" },
                    "color": { "field": sc.color_field, "type": "nominal" },
                    "tooltip": sc.tooltip.iter().map(|f| json!({ "field": f })).collect::<Vec<_>>(),
                },
            }),
        ]
    }
}

fn domain_json(domain: Option<(f64, f64)>) -> JsonValue {
    match domain {
        Some((lo, hi)) => json!([lo, hi]),
        None => JsonValue::Null,
    }
}
