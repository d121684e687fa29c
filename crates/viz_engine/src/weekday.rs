//! Days of the week as they appear in the dataset's column names.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Source column holding the raw `"HH:MM-HH:MM"`/`"Closed"` string.
    pub fn hours_column(self) -> String {
        format!("hours_{self}")
    }

    /// Derived column with the day's opening hour as a float.
    pub fn opening_column(self) -> String {
        format!("{self}_opening_hour")
    }

    /// Derived column with the day's open duration in hours.
    pub fn duration_column(self) -> String {
        format!("{self}_open_duration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_column_names() {
        assert_eq!(Weekday::Monday.hours_column(), "hours_Monday");
        assert_eq!(Weekday::Friday.opening_column(), "Friday_opening_hour");
        assert_eq!(Weekday::Sunday.duration_column(), "Sunday_open_duration");
    }

    #[test]
    fn test_iteration_matches_all() {
        let iterated: Vec<Weekday> = Weekday::iter().collect();
        assert_eq!(iterated, Weekday::ALL);
    }

    #[test]
    fn test_from_str_round_trip() {
        for day in Weekday::ALL {
            assert_eq!(Weekday::from_str(&day.to_string()).unwrap(), day);
        }
        assert!(Weekday::from_str("Funday").is_err());
    }
}
