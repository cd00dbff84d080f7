use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const NEIGHBOURHOOD: &str = "neighbourhood_cleansed";
pub const PRICE: &str = "price";
pub const ROOM_TYPE: &str = "room_type";
pub const NUMBER_OF_REVIEWS: &str = "number_of_reviews";
pub const REVIEW_SCORES_RATING: &str = "review_scores_rating";

/// Every column the explorer reads. Other columns in the source are ignored.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    NEIGHBOURHOOD,
    PRICE,
    ROOM_TYPE,
    NUMBER_OF_REVIEWS,
    REVIEW_SCORES_RATING,
];

// ---------------------------------------------------------------------------
// Listing – one row of the source table
// ---------------------------------------------------------------------------

/// A single listing. Any field may be missing in the source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub neighbourhood_cleansed: Option<String>,
    /// Cleaned nightly price (currency symbol and separators stripped).
    pub price: Option<f64>,
    pub room_type: Option<String>,
    pub number_of_reviews: Option<i64>,
    /// Aggregate guest rating, roughly 1.0 – 5.0.
    pub review_scores_rating: Option<f64>,
}

// ---------------------------------------------------------------------------
// ListingTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The loaded listings plus the per-column domains the sidebar needs.
///
/// Built once per load and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct ListingTable {
    pub listings: Vec<Listing>,
    /// Distinct neighbourhoods, sorted.
    pub neighbourhoods: BTreeSet<String>,
    /// Distinct room types in order of first appearance.
    pub room_types: Vec<String>,
    /// Observed `(min, max)` price, `None` when no row has a price.
    pub price_bounds: Option<(f64, f64)>,
}

impl ListingTable {
    /// Build the column domains from the loaded listings.
    pub fn from_listings(listings: Vec<Listing>) -> Self {
        let mut neighbourhoods = BTreeSet::new();
        let mut room_types: Vec<String> = Vec::new();
        let mut price_bounds: Option<(f64, f64)> = None;

        for listing in &listings {
            if let Some(n) = &listing.neighbourhood_cleansed {
                neighbourhoods.insert(n.clone());
            }
            if let Some(rt) = &listing.room_type {
                if !room_types.contains(rt) {
                    room_types.push(rt.clone());
                }
            }
            if let Some(p) = listing.price.filter(|p| !p.is_nan()) {
                price_bounds = Some(match price_bounds {
                    Some((lo, hi)) => (lo.min(p), hi.max(p)),
                    None => (p, p),
                });
            }
        }

        ListingTable {
            listings,
            neighbourhoods,
            room_types,
            price_bounds,
        }
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ProjectedListing – a row with every visualised field present
// ---------------------------------------------------------------------------

/// A listing restricted to the five visualised columns, none missing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedListing {
    pub neighbourhood_cleansed: String,
    pub price: f64,
    pub room_type: String,
    pub number_of_reviews: i64,
    pub review_scores_rating: f64,
}
