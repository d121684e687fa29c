//! Derived-column preprocessing.
//!
//! Runs once, after load and before any view attaches: labels each business
//! with its category of interest, buckets star ratings into the four rating
//! groups, and turns every weekday's raw hours string into opening-hour and
//! open-duration floats. A malformed hours string aborts the whole step.

use crate::error::Result;
use log::debug;
use viz_engine::{DayHours, RowStore, Value, Weekday, parse_day_hours};

/// Rating buckets, in ascending order.
pub const RATING_GROUPS: [&str; 4] = [
    "Rating 1-2",
    "Rating 2-3",
    "Rating 3-4",
    "Rating 4-5",
];

pub const CATEGORY_COLUMN: &str = "category_of_interest";
pub const RATING_GROUP_COLUMN: &str = "rating_group";

/// Fallback label for businesses matching none of the configured categories.
pub const OTHER_CATEGORY: &str = "Other";

/// Buckets a star rating. Stars outside [1, 5] have no group.
pub fn rating_group_label(stars: f64) -> Option<&'static str> {
    if !(1.0..=5.0).contains(&stars) {
        return None;
    }
    let group = if stars <= 2.0 {
        RATING_GROUPS[0]
    } else if stars <= 3.0 {
        RATING_GROUPS[1]
    } else if stars <= 4.0 {
        RATING_GROUPS[2]
    } else {
        RATING_GROUPS[3]
    };
    Some(group)
}

/// Adds every derived column the views and filters read.
pub fn derive_columns(store: &mut RowStore, categories_of_interest: &[String]) -> Result<()> {
    store.add_derived_column(CATEGORY_COLUMN, |row| {
        let label = row
            .text("categories")
            .and_then(|raw| {
                categories_of_interest
                    .iter()
                    .find(|category| raw.contains(category.as_str()))
            })
            .map_or(OTHER_CATEGORY, String::as_str);
        Ok(Value::Str(label.to_string()))
    })?;

    store.add_derived_column(RATING_GROUP_COLUMN, |row| {
        Ok(match row.num("stars").and_then(rating_group_label) {
            Some(group) => Value::Str(group.to_string()),
            None => Value::Missing,
        })
    })?;

    for day in Weekday::ALL {
        let hours_column = day.hours_column();
        store.add_derived_column(&day.opening_column(), |row| {
            Ok(match hours_value(row.text(&hours_column))? {
                Some(interval) => Value::Num(interval.opening_hour()),
                None => Value::Missing,
            })
        })?;

        let hours_column = day.hours_column();
        store.add_derived_column(&day.duration_column(), |row| {
            Ok(match hours_value(row.text(&hours_column))? {
                Some(interval) => Value::Num(interval.duration_hours()),
                None => Value::Missing,
            })
        })?;
    }

    debug!("derived columns ready for {} rows", store.len());
    Ok(())
}

fn hours_value(raw: Option<&str>) -> viz_engine::Result<Option<viz_engine::HoursInterval>> {
    match raw {
        None => Ok(None),
        Some(s) => match parse_day_hours(s)? {
            DayHours::Closed => Ok(None),
            DayHours::Open(interval) => Ok(Some(interval)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viz_engine::{EngineError, Row, RowId};

    fn categories() -> Vec<String> {
        ["Chinese", "Japanese", "Italian", "Polish", "Scandinavian"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn store(rows: Vec<Row>) -> RowStore {
        RowStore::load(rows).unwrap()
    }

    #[test]
    fn test_category_first_match_wins() {
        let mut store = store(vec![
            Row::new(RowId(0)).with_cell("categories", "Restaurants, Chinese, Italian"),
            Row::new(RowId(1)).with_cell("categories", "Burgers, Fast Food"),
            Row::new(RowId(2)),
        ]);
        derive_columns(&mut store, &categories()).unwrap();

        // Configured order decides ties, not order within the cell.
        assert_eq!(
            store.row(RowId(0)).unwrap().text(CATEGORY_COLUMN),
            Some("Chinese")
        );
        assert_eq!(
            store.row(RowId(1)).unwrap().text(CATEGORY_COLUMN),
            Some("Other")
        );
        assert_eq!(
            store.row(RowId(2)).unwrap().text(CATEGORY_COLUMN),
            Some("Other")
        );
    }

    #[test]
    fn test_rating_group_bins() {
        assert_eq!(rating_group_label(1.0), Some("Rating 1-2"));
        assert_eq!(rating_group_label(2.0), Some("Rating 1-2"));
        assert_eq!(rating_group_label(2.5), Some("Rating 2-3"));
        assert_eq!(rating_group_label(3.5), Some("Rating 3-4"));
        assert_eq!(rating_group_label(4.1), Some("Rating 4-5"));
        assert_eq!(rating_group_label(5.0), Some("Rating 4-5"));
        assert_eq!(rating_group_label(0.5), None);
        assert_eq!(rating_group_label(5.5), None);
    }

    #[test]
    fn test_rating_group_column() {
        let mut store = store(vec![
            Row::new(RowId(0)).with_cell("stars", 4.5),
            Row::new(RowId(1)).with_cell("stars", 0.0),
            Row::new(RowId(2)),
        ]);
        derive_columns(&mut store, &categories()).unwrap();
        assert_eq!(
            store.row(RowId(0)).unwrap().text(RATING_GROUP_COLUMN),
            Some("Rating 4-5")
        );
        assert!(store.row(RowId(1)).unwrap().get(RATING_GROUP_COLUMN).is_missing());
        assert!(store.row(RowId(2)).unwrap().get(RATING_GROUP_COLUMN).is_missing());
    }

    #[test]
    fn test_hours_derivation() {
        let mut store = store(vec![
            Row::new(RowId(0))
                .with_cell("hours_Monday", "09:30-22:00")
                .with_cell("hours_Tuesday", "Closed"),
        ]);
        derive_columns(&mut store, &categories()).unwrap();

        let row = store.row(RowId(0)).unwrap();
        assert_eq!(row.num("Monday_opening_hour"), Some(9.5));
        assert_eq!(row.num("Monday_open_duration"), Some(12.5));
        // Closed days derive to missing, never to an error.
        assert!(row.get("Tuesday_opening_hour").is_missing());
        assert!(row.get("Tuesday_open_duration").is_missing());
    }

    #[test]
    fn test_malformed_hours_abort_the_derive_step() {
        let mut store = store(vec![
            Row::new(RowId(0)).with_cell("hours_Monday", "09:00-17:00"),
            Row::new(RowId(1)).with_cell("hours_Monday", "all day long"),
        ]);
        let err = derive_columns(&mut store, &categories()).unwrap_err();
        let engine_err = match err {
            crate::error::DashboardError::Engine(e) => e,
            other => panic!("unexpected error: {other}"),
        };
        match engine_err {
            EngineError::ColumnComputation { column, row, .. } => {
                assert_eq!(column, "Monday_opening_hour");
                assert_eq!(row, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        // The failed column was not committed for any row.
        assert!(!store.has_column("Monday_opening_hour"));
    }
}
