use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::charts::{build_charts, ChartSet};
use crate::color::ColorMap;
use crate::data::filter::{filtered_indices, FilterSelection};
use crate::data::loader::load_file;
use crate::data::model::ListingTable;
use crate::data::project::project;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded listings (None until a file loads). Never mutated once loaded.
    pub table: Option<Arc<ListingTable>>,

    /// Where `table` came from.
    pub source: Option<PathBuf>,

    /// Current value of every sidebar control.
    pub filters: FilterSelection,

    /// Indices of listings passing the current filters (cached).
    pub filtered: Vec<usize>,

    /// Build charts from the filtered listings instead of the whole table.
    pub charts_follow_filters: bool,

    /// Chart specifications for the central panel.
    pub charts: Option<ChartSet>,

    /// Room type → colour, shared by the box and scatter plots.
    pub color_map: ColorMap,

    /// Load failure that leaves the page with nothing to show.
    pub load_error: Option<String>,

    /// Non-fatal status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            table: None,
            source: None,
            filters: FilterSelection::initial(&ListingTable::default()),
            filtered: Vec::new(),
            charts_follow_filters: false,
            charts: None,
            color_map: ColorMap::default(),
            load_error: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Load a listings file and make it the current table.
    ///
    /// Without a table already on screen a failure is fatal to the page;
    /// otherwise the previous table stays and the error goes to the status line.
    pub fn open(&mut self, path: &Path) {
        match load_file(path) {
            Ok(table) => {
                if table.is_empty() {
                    log::warn!("{} has no listings", path.display());
                }
                log::info!(
                    "{} listings, {} neighbourhoods, room types {:?}",
                    table.len(),
                    table.neighbourhoods.len(),
                    table.room_types
                );
                self.set_table(path.to_path_buf(), table);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                let message = format!("Error: {e}");
                if self.table.is_some() {
                    self.status_message = Some(message);
                } else {
                    self.load_error = Some(message);
                    self.charts = None;
                }
            }
        }
    }

    /// Ingest a newly loaded table, reset filters and rebuild charts.
    pub fn set_table(&mut self, source: PathBuf, table: ListingTable) {
        self.filters = FilterSelection::initial(&table);
        self.color_map = ColorMap::new(&table.room_types);
        self.table = Some(Arc::new(table));
        self.source = Some(source);
        self.load_error = None;
        self.status_message = None;
        self.refilter();
        self.rebuild_charts();
    }

    /// Recompute `filtered` after a control change.
    pub fn refilter(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        self.filtered = filtered_indices(table, &self.filters);
        log::debug!("{} of {} listings pass filters", self.filtered.len(), table.len());

        if self.charts_follow_filters {
            self.rebuild_charts();
        }
    }

    /// Rebuild the chart specifications from the table or the filtered rows.
    pub fn rebuild_charts(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        let rows = if self.charts_follow_filters {
            project(self.filtered.iter().filter_map(|&i| table.listings.get(i)))
        } else {
            project(&table.listings)
        };
        self.charts = Some(build_charts(&rows));
    }

    pub fn set_charts_follow_filters(&mut self, follow: bool) {
        if self.charts_follow_filters != follow {
            self.charts_follow_filters = follow;
            self.rebuild_charts();
        }
    }

    /// Replace the whole filter selection.
    pub fn set_filters(&mut self, filters: FilterSelection) {
        if self.filters != filters {
            self.filters = filters;
            self.refilter();
        }
    }

    /// Back to the initial control values.
    pub fn reset_filters(&mut self) {
        if let Some(table) = &self.table {
            let initial = FilterSelection::initial(table);
            self.set_filters(initial);
        }
    }

    /// Widen every control so all complete listings pass.
    pub fn show_all(&mut self) {
        if let Some(table) = &self.table {
            let all = FilterSelection::show_all(table);
            self.set_filters(all);
        }
    }

    /// Write the current charts as a JSON array of Vega-Lite documents.
    pub fn export_charts(&self, path: &Path) -> Result<()> {
        let charts = self.charts.as_ref().context("no charts to export")?;
        let text = serde_json::to_string_pretty(&charts.to_vega_lite())
            .context("serializing chart specs")?;
        std::fs::write(path, text)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported chart specs to {}", path.display());
        Ok(())
    }
}
