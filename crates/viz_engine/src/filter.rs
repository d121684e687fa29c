//! Compound row filtering: independent named rules ANDed into one mask.

use crate::table::{Row, RowStore};
use crate::weekday::Weekday;
use std::collections::{BTreeMap, BTreeSet};

/// Which per-weekday derived metric a rule reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayMetric {
    OpeningHour,
    Duration,
}

impl DayMetric {
    fn column(self, day: Weekday) -> String {
        match self {
            DayMetric::OpeningHour => day.opening_column(),
            DayMetric::Duration => day.duration_column(),
        }
    }
}

/// A named, side-effect-free predicate over rows.
///
/// Evaluation is total: a rule reading a cell the row lacks sees an
/// explicit missing value and fails the row instead of erroring.
#[derive(Debug, Clone)]
pub enum FilterRule {
    /// Cell text must be one of the allowed strings. An empty set retains
    /// nothing, which is a legitimate result, not an error.
    OneOf {
        column: String,
        allowed: BTreeSet<String>,
    },
    /// Numeric cell must be at least `min`; missing fails.
    AtLeast { column: String, min: f64 },
    /// Row must be open on at least one of the given days, i.e. have a
    /// non-missing derived opening hour for it.
    OpenOn { days: BTreeSet<Weekday> },
    /// At least one weekday's derived metric reaches `min`.
    AnyDayAtLeast { metric: DayMetric, min: f64 },
}

impl FilterRule {
    pub fn one_of<I, S>(column: &str, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterRule::OneOf {
            column: column.to_string(),
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    pub fn open_on<I: IntoIterator<Item = Weekday>>(days: I) -> Self {
        FilterRule::OpenOn {
            days: days.into_iter().collect(),
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        match self {
            FilterRule::OneOf { column, allowed } => {
                row.text(column).is_some_and(|v| allowed.contains(v))
            }
            FilterRule::AtLeast { column, min } => row.num(column).is_some_and(|v| v >= *min),
            FilterRule::OpenOn { days } => days
                .iter()
                .any(|day| row.num(&day.opening_column()).is_some()),
            FilterRule::AnyDayAtLeast { metric, min } => Weekday::ALL
                .iter()
                .any(|&day| row.num(&metric.column(day)).is_some_and(|v| v >= *min)),
        }
    }

    /// True when the rule's selection set is empty, so it can never retain
    /// a row. Consumers with an explicit empty-selection policy check this
    /// before acting on the combined mask.
    pub fn is_empty_selection(&self) -> bool {
        match self {
            FilterRule::OneOf { allowed, .. } => allowed.is_empty(),
            FilterRule::OpenOn { days } => days.is_empty(),
            _ => false,
        }
    }
}

/// Named rules combined by logical AND. Replacing or removing one rule
/// never disturbs the others.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    rules: BTreeMap<String, FilterRule>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces or inserts a named rule.
    pub fn set_rule(&mut self, name: &str, rule: FilterRule) {
        self.rules.insert(name.to_string(), rule);
    }

    pub fn remove_rule(&mut self, name: &str) -> Option<FilterRule> {
        self.rules.remove(name)
    }

    pub fn rule(&self, name: &str) -> Option<&FilterRule> {
        self.rules.get(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The AND of all current rules over every row, aligned to row order.
    /// With no rules this is all-true; a rule with an empty selection makes
    /// it all-false, and callers decide what "nothing visible" means.
    pub fn combined_mask(&self, store: &RowStore) -> Vec<bool> {
        store.mask(|row| self.rules.values().all(|rule| rule.matches(row)))
    }
}
