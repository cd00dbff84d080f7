use super::model::{Listing, ProjectedListing};

/// Restrict listings to the five visualised columns, dropping any row that
/// is missing one of them. Row order is preserved.
pub fn project<'a, I>(listings: I) -> Vec<ProjectedListing>
where
    I: IntoIterator<Item = &'a Listing>,
{
    let projected: Vec<ProjectedListing> = listings
        .into_iter()
        .filter_map(|l| {
            Some(ProjectedListing {
                neighbourhood_cleansed: l.neighbourhood_cleansed.clone()?,
                price: l.price.filter(|p| !p.is_nan())?,
                room_type: l.room_type.clone()?,
                number_of_reviews: l.number_of_reviews?,
                review_scores_rating: l.review_scores_rating.filter(|s| !s.is_nan())?,
            })
        })
        .collect();

    log::debug!("Projected {} complete rows", projected.len());
    projected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(n: &str, price: f64) -> Listing {
        Listing {
            neighbourhood_cleansed: Some(n.to_string()),
            price: Some(price),
            room_type: Some("Private room".to_string()),
            number_of_reviews: Some(3),
            review_scores_rating: Some(4.2),
        }
    }

    #[test]
    fn drops_rows_with_any_missing_field() {
        let mut no_score = complete("B", 2.0);
        no_score.review_scores_rating = None;
        let mut no_reviews = complete("C", 3.0);
        no_reviews.number_of_reviews = None;
        let mut nan_price = complete("D", 4.0);
        nan_price.price = Some(f64::NAN);
        let mut no_hood = complete("E", 5.0);
        no_hood.neighbourhood_cleansed = None;

        let rows = vec![
            complete("A", 1.0),
            no_score,
            no_reviews,
            nan_price,
            no_hood,
            complete("F", 6.0),
        ];
        let projected = project(&rows);

        let hoods: Vec<&str> = projected
            .iter()
            .map(|p| p.neighbourhood_cleansed.as_str())
            .collect();
        assert_eq!(hoods, ["A", "F"]);
    }

    #[test]
    fn preserves_row_order() {
        let rows: Vec<Listing> = ["Z", "M", "A", "Q"]
            .iter()
            .enumerate()
            .map(|(i, n)| complete(n, i as f64))
            .collect();
        let projected = project(&rows);

        let prices: Vec<f64> = projected.iter().map(|p| p.price).collect();
        assert_eq!(prices, [0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn empty_input_projects_to_empty_output() {
        assert!(project(&Vec::<Listing>::new()).is_empty());
    }
}
