//! In-memory view adapters standing in for the plot surfaces.
//!
//! Rendering is out of scope here: each adapter records what a real plot
//! would draw (marked rows, visibility, overlay artifacts) so the engine's
//! effects stay observable from the driver and from tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use viz_engine::{ArtifactId, DensitySurface, RowId, RowStore, ViewAdapter};

/// Opening-hour vs. open-duration scatter; hosts the density overlays.
pub struct ScatterView {
    name: String,
    selected: BTreeSet<RowId>,
    visible: Vec<bool>,
    overlays: BTreeMap<ArtifactId, DensitySurface>,
    next_artifact: u64,
}

impl ScatterView {
    pub fn shared(name: &str) -> Rc<RefCell<ScatterView>> {
        Rc::new(RefCell::new(ScatterView {
            name: name.to_string(),
            selected: BTreeSet::new(),
            visible: Vec::new(),
            overlays: BTreeMap::new(),
            next_artifact: 0,
        }))
    }

    /// Simulates a user box/lasso selection gesture.
    pub fn select(&mut self, ids: impl IntoIterator<Item = RowId>) {
        self.selected = ids.into_iter().collect();
    }

    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|&&v| v).count()
    }

    /// Overlay groups in rendering order.
    pub fn overlay_groups(&self) -> Vec<&str> {
        self.overlays.values().map(|s| s.group.as_str()).collect()
    }
}

impl ViewAdapter for ScatterView {
    fn name(&self) -> &str {
        &self.name
    }

    fn selected_ids(&self) -> BTreeSet<RowId> {
        self.selected.clone()
    }

    fn apply_selection(&mut self, ids: &BTreeSet<RowId>) {
        self.selected = ids.clone();
    }

    fn apply_visibility(&mut self, mask: &[bool]) {
        self.visible = mask.to_vec();
    }

    fn add_overlay(&mut self, surface: DensitySurface) -> ArtifactId {
        let id = ArtifactId(self.next_artifact);
        self.next_artifact += 1;
        self.overlays.insert(id, surface);
        id
    }

    fn remove_overlay(&mut self, artifact: ArtifactId) {
        self.overlays.remove(&artifact);
    }
}

/// Hex-binned geographic map. Participates in selection linking and
/// visibility; it never hosts overlays, so those calls only keep the
/// handle bookkeeping honest.
pub struct HexMapView {
    name: String,
    selected: BTreeSet<RowId>,
    visible: Vec<bool>,
    overlays: BTreeSet<ArtifactId>,
    next_artifact: u64,
}

impl HexMapView {
    pub fn shared(name: &str) -> Rc<RefCell<HexMapView>> {
        Rc::new(RefCell::new(HexMapView {
            name: name.to_string(),
            selected: BTreeSet::new(),
            visible: Vec::new(),
            overlays: BTreeSet::new(),
            next_artifact: 0,
        }))
    }

    /// Simulates a selection gesture on the map.
    pub fn select(&mut self, ids: impl IntoIterator<Item = RowId>) {
        self.selected = ids.into_iter().collect();
    }

    pub fn selected(&self) -> &BTreeSet<RowId> {
        &self.selected
    }

    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|&&v| v).count()
    }
}

impl ViewAdapter for HexMapView {
    fn name(&self) -> &str {
        &self.name
    }

    fn selected_ids(&self) -> BTreeSet<RowId> {
        self.selected.clone()
    }

    fn apply_selection(&mut self, ids: &BTreeSet<RowId>) {
        self.selected = ids.clone();
    }

    fn apply_visibility(&mut self, mask: &[bool]) {
        self.visible = mask.to_vec();
    }

    fn add_overlay(&mut self, _surface: DensitySurface) -> ArtifactId {
        let id = ArtifactId(self.next_artifact);
        self.next_artifact += 1;
        self.overlays.insert(id);
        id
    }

    fn remove_overlay(&mut self, artifact: ArtifactId) {
        self.overlays.remove(&artifact);
    }
}

/// Average rating per category per year, over the visible subset only.
/// Read-only with respect to selection.
pub struct TrendView {
    name: String,
    /// (year, stars, category) per row, aligned to store order.
    samples: Vec<Option<(i64, f64, String)>>,
    series: BTreeMap<String, BTreeMap<i64, f64>>,
}

impl TrendView {
    pub fn shared(name: &str, store: &RowStore, category_column: &str) -> Rc<RefCell<TrendView>> {
        let samples = store
            .rows()
            .iter()
            .map(|row| {
                match (
                    row.num("year"),
                    row.num("stars"),
                    row.text(category_column),
                ) {
                    (Some(year), Some(stars), Some(category)) => {
                        Some((year as i64, stars, category.to_string()))
                    }
                    _ => None,
                }
            })
            .collect();
        Rc::new(RefCell::new(TrendView {
            name: name.to_string(),
            samples,
            series: BTreeMap::new(),
        }))
    }

    /// category -> year -> average stars.
    pub fn series(&self) -> &BTreeMap<String, BTreeMap<i64, f64>> {
        &self.series
    }

    fn rebuild(&mut self, mask: &[bool]) {
        let mut sums: BTreeMap<(String, i64), (f64, usize)> = BTreeMap::new();
        for (sample, &visible) in self.samples.iter().zip(mask) {
            if !visible {
                continue;
            }
            if let Some((year, stars, category)) = sample {
                let slot = sums.entry((category.clone(), *year)).or_insert((0.0, 0));
                slot.0 += stars;
                slot.1 += 1;
            }
        }

        self.series.clear();
        for ((category, year), (sum, count)) in sums {
            self.series
                .entry(category)
                .or_default()
                .insert(year, sum / count as f64);
        }
    }
}

impl ViewAdapter for TrendView {
    fn name(&self) -> &str {
        &self.name
    }

    fn selected_ids(&self) -> BTreeSet<RowId> {
        BTreeSet::new()
    }

    fn apply_selection(&mut self, _ids: &BTreeSet<RowId>) {
        // The trend chart has no point-level highlight.
    }

    fn apply_visibility(&mut self, mask: &[bool]) {
        self.rebuild(mask);
    }

    fn add_overlay(&mut self, _surface: DensitySurface) -> ArtifactId {
        ArtifactId(0)
    }

    fn remove_overlay(&mut self, _artifact: ArtifactId) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use viz_engine::{Row, RowId};

    fn trend_store() -> RowStore {
        RowStore::load(vec![
            Row::new(RowId(0))
                .with_cell("year", 2019.0)
                .with_cell("stars", 4.0)
                .with_cell("category_of_interest", "Chinese"),
            Row::new(RowId(1))
                .with_cell("year", 2019.0)
                .with_cell("stars", 2.0)
                .with_cell("category_of_interest", "Chinese"),
            Row::new(RowId(2))
                .with_cell("year", 2020.0)
                .with_cell("stars", 5.0)
                .with_cell("category_of_interest", "Italian"),
            Row::new(RowId(3)).with_cell("stars", 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_trend_averages_visible_rows() {
        let store = trend_store();
        let trend = TrendView::shared("trend", &store, "category_of_interest");
        trend
            .borrow_mut()
            .apply_visibility(&[true, true, true, true]);

        let series = trend.borrow();
        let series = series.series();
        assert_eq!(series["Chinese"][&2019], 3.0);
        assert_eq!(series["Italian"][&2020], 5.0);
        // Row 3 has no year or category; it contributes nothing.
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_trend_respects_mask() {
        let store = trend_store();
        let trend = TrendView::shared("trend", &store, "category_of_interest");
        trend
            .borrow_mut()
            .apply_visibility(&[true, false, true, true]);

        let series = trend.borrow();
        let series = series.series();
        // Only the 4-star Chinese row is visible now.
        assert_eq!(series["Chinese"][&2019], 4.0);
    }

    #[test]
    fn test_scatter_overlay_bookkeeping() {
        let scatter = ScatterView::shared("scatter");
        let mut view = scatter.borrow_mut();
        let a = view.add_overlay(surface("A"));
        view.add_overlay(surface("B"));
        assert_eq!(view.overlay_groups(), vec!["A", "B"]);

        view.remove_overlay(a);
        // Removing an unknown handle is a no-op.
        view.remove_overlay(ArtifactId(99));
        assert_eq!(view.overlay_groups(), vec!["B"]);
    }

    fn surface(group: &str) -> DensitySurface {
        DensitySurface {
            group: group.to_string(),
            grid: viz_engine::DensityGrid {
                x: vec![0.0, 1.0],
                y: vec![0.0, 1.0],
                z: vec![0.0; 4],
            },
            levels: vec![0.5],
        }
    }
}
