//! Per-group density overlays with atomic replace.
//!
//! The manager owns the registry of drawn overlay artifacts, one contour
//! set per enabled group. Every recompute rebuilds the surfaces from
//! scratch: old artifacts are removed in full before new ones are added,
//! so the view never shows two generations at once.

use crate::filter::{FilterRule, FilterSet};
use crate::kde::{self, AxisRange, DensityGrid};
use crate::table::RowStore;
use crate::view::{ArtifactId, ViewAdapter};
use crate::weekday::Weekday;
use log::debug;

/// One group's computed contour set, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DensitySurface {
    pub group: String,
    pub grid: DensityGrid,
    pub levels: Vec<f64>,
}

/// What to compute: the overlay toggle, the groups to draw in draw order
/// (later groups render on top), and the weekdays whose (opening hour,
/// open duration) pairs feed each fit.
#[derive(Debug, Clone, Default)]
pub struct DensityRequest {
    pub enabled: bool,
    pub groups: Vec<String>,
    pub days: Vec<Weekday>,
}

/// Tuning for the density fit, usually taken from [`crate::EngineConfig`].
#[derive(Debug, Clone)]
pub struct DensityOptions {
    pub grid_size: usize,
    pub level_count: usize,
    /// Column whose value buckets rows into groups.
    pub group_column: String,
    /// Name of the filter rule whose empty selection freezes the overlay.
    pub category_filter: String,
    pub x_range: Option<AxisRange>,
    pub y_range: Option<AxisRange>,
}

pub struct DensityOverlayManager {
    options: DensityOptions,
    artifacts: Vec<(String, ArtifactId)>,
}

impl DensityOverlayManager {
    pub fn new(options: DensityOptions) -> Self {
        Self {
            options,
            artifacts: Vec::new(),
        }
    }

    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    /// Groups currently drawn, in rendering order.
    pub fn drawn_groups(&self) -> impl Iterator<Item = &str> {
        self.artifacts.iter().map(|(group, _)| group.as_str())
    }

    /// Rebuilds the overlays on `view`. Returns the number of artifacts
    /// now drawn.
    ///
    /// Edge cases, in evaluation order:
    /// - overlay disabled: remove everything;
    /// - the category selection is empty: keep the previous overlays
    ///   untouched (a fully empty selection is treated as "no meaningful
    ///   input" rather than a request to clear — a product decision, see
    ///   DESIGN.md);
    /// - a group with no selected days or fewer than two sample points is
    ///   skipped silently, as is one with no variance to estimate over.
    pub fn recompute(
        &mut self,
        store: &RowStore,
        filters: &FilterSet,
        request: &DensityRequest,
        view: &mut dyn ViewAdapter,
    ) -> usize {
        if !request.enabled {
            self.remove_all(view);
            return 0;
        }

        if filters
            .rule(&self.options.category_filter)
            .is_some_and(FilterRule::is_empty_selection)
        {
            debug!("category selection is empty, keeping previous overlays");
            return self.artifacts.len();
        }

        self.remove_all(view);

        let mask = filters.combined_mask(store);
        for group in &request.groups {
            let (xs, ys) = self.collect_samples(store, &mask, group, &request.days);
            if xs.len() < 2 {
                debug!("group {group}: {} sample points, skipping", xs.len());
                continue;
            }
            let Some(grid) = kde::density_grid(
                &xs,
                &ys,
                self.options.grid_size,
                self.options.x_range,
                self.options.y_range,
            ) else {
                debug!("group {group}: degenerate sample, skipping");
                continue;
            };
            let levels = kde::contour_levels(&grid.z, self.options.level_count);
            let artifact = view.add_overlay(DensitySurface {
                group: group.clone(),
                grid,
                levels,
            });
            self.artifacts.push((group.clone(), artifact));
        }

        debug!("density recompute drew {} group overlays", self.artifacts.len());
        self.artifacts.len()
    }

    /// Removes every drawn artifact, e.g. on view teardown.
    pub fn remove_all(&mut self, view: &mut dyn ViewAdapter) {
        for (_, artifact) in self.artifacts.drain(..) {
            view.remove_overlay(artifact);
        }
    }

    /// Concatenates the (opening hour, duration) pairs of mask-visible
    /// rows of `group` across the selected days. Rows closed on a day
    /// contribute nothing for it.
    fn collect_samples(
        &self,
        store: &RowStore,
        mask: &[bool],
        group: &str,
        days: &[Weekday],
    ) -> (Vec<f64>, Vec<f64>) {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for (row, &visible) in store.rows().iter().zip(mask) {
            if !visible || row.text(&self.options.group_column) != Some(group) {
                continue;
            }
            for day in days {
                if let (Some(x), Some(y)) = (
                    row.num(&day.opening_column()),
                    row.num(&day.duration_column()),
                ) {
                    xs.push(x);
                    ys.push(y);
                }
            }
        }
        (xs, ys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Row, RowId};
    use crate::view::ViewAdapter;
    use std::collections::BTreeMap;
    use std::collections::BTreeSet;

    /// Records overlay traffic; selection and visibility are irrelevant here.
    #[derive(Default)]
    struct OverlayHost {
        overlays: BTreeMap<ArtifactId, DensitySurface>,
        next: u64,
    }

    impl ViewAdapter for OverlayHost {
        fn name(&self) -> &str {
            "overlay-host"
        }

        fn selected_ids(&self) -> BTreeSet<RowId> {
            BTreeSet::new()
        }

        fn apply_selection(&mut self, _ids: &BTreeSet<RowId>) {}

        fn apply_visibility(&mut self, _mask: &[bool]) {}

        fn add_overlay(&mut self, surface: DensitySurface) -> ArtifactId {
            let id = ArtifactId(self.next);
            self.next += 1;
            self.overlays.insert(id, surface);
            id
        }

        fn remove_overlay(&mut self, artifact: ArtifactId) {
            self.overlays.remove(&artifact);
        }
    }

    fn options() -> DensityOptions {
        DensityOptions {
            grid_size: 20,
            level_count: 6,
            group_column: "rating_group".to_string(),
            category_filter: "category".to_string(),
            x_range: None,
            y_range: None,
        }
    }

    /// Ten rows: six in group A, four in group B, with Monday samples.
    fn store() -> RowStore {
        let mut rows = Vec::new();
        for i in 0..10u64 {
            let group = if i < 6 { "A" } else { "B" };
            rows.push(
                Row::new(RowId(i))
                    .with_cell("category", "Chinese")
                    .with_cell("rating_group", group)
                    .with_cell("Monday_opening_hour", 8.0 + i as f64)
                    .with_cell("Monday_open_duration", 6.0 + (i % 4) as f64),
            );
        }
        RowStore::load(rows).unwrap()
    }

    fn all_groups_request() -> DensityRequest {
        DensityRequest {
            enabled: true,
            groups: vec!["A".to_string(), "B".to_string()],
            days: vec![Weekday::Monday],
        }
    }

    #[test]
    fn test_disabled_always_clears() {
        let store = store();
        let filters = FilterSet::new();
        let mut manager = DensityOverlayManager::new(options());
        let mut view = OverlayHost::default();

        let drawn = manager.recompute(&store, &filters, &all_groups_request(), &mut view);
        assert_eq!(drawn, 2);

        let mut request = all_groups_request();
        request.enabled = false;
        let drawn = manager.recompute(&store, &filters, &request, &mut view);
        assert_eq!(drawn, 0);
        assert!(view.overlays.is_empty());
    }

    #[test]
    fn test_groups_drawn_in_request_order() {
        let store = store();
        let filters = FilterSet::new();
        let mut manager = DensityOverlayManager::new(options());
        let mut view = OverlayHost::default();

        manager.recompute(&store, &filters, &all_groups_request(), &mut view);
        let drawn: Vec<&str> = manager.drawn_groups().collect();
        assert_eq!(drawn, vec!["A", "B"]);

        // Reversed request order reverses rendering order.
        let mut request = all_groups_request();
        request.groups.reverse();
        manager.recompute(&store, &filters, &request, &mut view);
        let drawn: Vec<&str> = manager.drawn_groups().collect();
        assert_eq!(drawn, vec!["B", "A"]);
    }

    #[test]
    fn test_recompute_replaces_instead_of_stacking() {
        let store = store();
        let filters = FilterSet::new();
        let mut manager = DensityOverlayManager::new(options());
        let mut view = OverlayHost::default();

        manager.recompute(&store, &filters, &all_groups_request(), &mut view);
        manager.recompute(&store, &filters, &all_groups_request(), &mut view);
        assert_eq!(view.overlays.len(), 2);
        assert_eq!(manager.artifact_count(), 2);
    }

    #[test]
    fn test_single_point_group_is_skipped() {
        let mut rows = vec![
            Row::new(RowId(0))
                .with_cell("rating_group", "solo")
                .with_cell("Monday_opening_hour", 9.0)
                .with_cell("Monday_open_duration", 8.0),
        ];
        for i in 1..5u64 {
            rows.push(
                Row::new(RowId(i))
                    .with_cell("rating_group", "full")
                    .with_cell("Monday_opening_hour", 9.0 + i as f64)
                    .with_cell("Monday_open_duration", 6.0 + i as f64),
            );
        }
        let store = RowStore::load(rows).unwrap();
        let filters = FilterSet::new();
        let mut manager = DensityOverlayManager::new(options());
        let mut view = OverlayHost::default();

        let request = DensityRequest {
            enabled: true,
            groups: vec!["solo".to_string(), "full".to_string()],
            days: vec![Weekday::Monday],
        };
        let drawn = manager.recompute(&store, &filters, &request, &mut view);
        assert_eq!(drawn, 1);
        let drawn: Vec<&str> = manager.drawn_groups().collect();
        assert_eq!(drawn, vec!["full"]);
    }

    #[test]
    fn test_no_days_selected_clears_all_groups() {
        let store = store();
        let filters = FilterSet::new();
        let mut manager = DensityOverlayManager::new(options());
        let mut view = OverlayHost::default();

        manager.recompute(&store, &filters, &all_groups_request(), &mut view);
        let mut request = all_groups_request();
        request.days.clear();
        let drawn = manager.recompute(&store, &filters, &request, &mut view);
        assert_eq!(drawn, 0);
        assert!(view.overlays.is_empty());
    }

    #[test]
    fn test_empty_category_selection_freezes_previous_overlays() {
        let store = store();
        let mut filters = FilterSet::new();
        filters.set_rule(
            "category",
            FilterRule::one_of("category", ["Chinese"]),
        );
        let mut manager = DensityOverlayManager::new(options());
        let mut view = OverlayHost::default();

        manager.recompute(&store, &filters, &all_groups_request(), &mut view);
        assert_eq!(view.overlays.len(), 2);

        // Deselecting every category leaves the last good overlay on screen.
        filters.set_rule("category", FilterRule::one_of::<_, String>("category", []));
        let drawn = manager.recompute(&store, &filters, &all_groups_request(), &mut view);
        assert_eq!(drawn, 2);
        assert_eq!(view.overlays.len(), 2);
    }

    #[test]
    fn test_levels_drop_the_lowest() {
        let store = store();
        let filters = FilterSet::new();
        let mut manager = DensityOverlayManager::new(options());
        let mut view = OverlayHost::default();

        manager.recompute(&store, &filters, &all_groups_request(), &mut view);
        for surface in view.overlays.values() {
            assert_eq!(surface.levels.len(), 5);
            let z_min = surface.grid.z.iter().cloned().fold(f64::INFINITY, f64::min);
            assert!(surface.levels.iter().all(|&l| l > z_min));
        }
    }

    #[test]
    fn test_mask_limits_samples() {
        let store = store();
        let mut filters = FilterSet::new();
        // Only group B rows have opening hours >= 14.
        filters.set_rule(
            "opening",
            FilterRule::AtLeast {
                column: "Monday_opening_hour".to_string(),
                min: 14.0,
            },
        );
        let mut manager = DensityOverlayManager::new(options());
        let mut view = OverlayHost::default();

        let drawn = manager.recompute(&store, &filters, &all_groups_request(), &mut view);
        assert_eq!(drawn, 1);
        let drawn: Vec<&str> = manager.drawn_groups().collect();
        assert_eq!(drawn, vec!["B"]);
    }
}
