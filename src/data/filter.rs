use std::collections::BTreeSet;
use std::fmt;

use super::model::{Listing, ListingTable};

// ---------------------------------------------------------------------------
// Control domains and defaults
// ---------------------------------------------------------------------------

/// Fixed slider bounds for the review score.
pub const SCORE_BOUNDS: (f64, f64) = (1.0, 5.0);
pub const SCORE_STEP: f64 = 0.1;
pub const DEFAULT_SCORE_RANGE: (f64, f64) = (3.0, 5.0);
/// Initial price selection. Usually outside the observed price domain, so the
/// initial filtered view is typically empty.
pub const DEFAULT_PRICE_RANGE: (f64, f64) = (5000.0, 100000.0);

// ---------------------------------------------------------------------------
// Neighbourhood choice
// ---------------------------------------------------------------------------

/// The neighbourhood selector: either every neighbourhood or exactly one.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum NeighbourhoodChoice {
    #[default]
    All,
    Only(String),
}

impl fmt::Display for NeighbourhoodChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeighbourhoodChoice::All => write!(f, "All"),
            NeighbourhoodChoice::Only(n) => write!(f, "{n}"),
        }
    }
}

/// Options for the neighbourhood selector: `All` followed by the sorted
/// distinct neighbourhoods.
pub fn neighbourhood_options(table: &ListingTable) -> Vec<NeighbourhoodChoice> {
    std::iter::once(NeighbourhoodChoice::All)
        .chain(
            table
                .neighbourhoods
                .iter()
                .cloned()
                .map(NeighbourhoodChoice::Only),
        )
        .collect()
}

// ---------------------------------------------------------------------------
// FilterSelection – current value of every sidebar control
// ---------------------------------------------------------------------------

/// The values of the five sidebar controls.
///
/// A listing passes when all of these hold (bounds inclusive):
/// * its room type is in `room_types`
/// * its price lies in `price_range`
/// * its review score lies in `score_range`
/// * `neighbourhood` is `All`, or equals the listing's neighbourhood
///
/// A listing missing any of the tested fields never passes.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSelection {
    pub neighbourhood: NeighbourhoodChoice,
    pub price_range: (f64, f64),
    pub room_types: BTreeSet<String>,
    pub score_range: (f64, f64),
}

impl FilterSelection {
    /// The selection the sidebar starts with.
    pub fn initial(table: &ListingTable) -> Self {
        FilterSelection {
            neighbourhood: NeighbourhoodChoice::All,
            price_range: DEFAULT_PRICE_RANGE,
            room_types: table.room_types.iter().cloned().collect(),
            score_range: DEFAULT_SCORE_RANGE,
        }
    }

    /// The widest selection: every complete listing passes.
    pub fn show_all(table: &ListingTable) -> Self {
        FilterSelection {
            neighbourhood: NeighbourhoodChoice::All,
            price_range: table.price_bounds.unwrap_or((0.0, 0.0)),
            room_types: table.room_types.iter().cloned().collect(),
            score_range: SCORE_BOUNDS,
        }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        let room_ok = listing
            .room_type
            .as_ref()
            .is_some_and(|rt| self.room_types.contains(rt));
        let price_ok = listing
            .price
            .is_some_and(|p| within(p, self.price_range));
        let score_ok = listing
            .review_scores_rating
            .is_some_and(|s| within(s, self.score_range));
        let hood_ok = match &self.neighbourhood {
            NeighbourhoodChoice::All => true,
            NeighbourhoodChoice::Only(n) => listing.neighbourhood_cleansed.as_ref() == Some(n),
        };
        room_ok && price_ok && score_ok && hood_ok
    }
}

fn within(v: f64, (lo, hi): (f64, f64)) -> bool {
    v >= lo && v <= hi
}

/// Return indices of listings that pass the selection, in table order.
pub fn filtered_indices(table: &ListingTable, selection: &FilterSelection) -> Vec<usize> {
    table
        .listings
        .iter()
        .enumerate()
        .filter(|(_, l)| selection.matches(l))
        .map(|(i, _)| i)
        .collect()
}
