//! The boundary between the engine and whatever draws the data.

use crate::density::DensitySurface;
use crate::table::RowId;
use std::collections::BTreeSet;

/// Handle for one drawn overlay, scoped to the view that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactId(pub u64);

/// What a plot surface must expose to take part in linked selection,
/// mask-driven visibility and density overlays.
///
/// Implementations live with the rendering layer; the engine only ever
/// calls through this trait and makes no assumption about how a view
/// draws points, polygons or lines.
pub trait ViewAdapter {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Rows this view currently reports as selected.
    fn selected_ids(&self) -> BTreeSet<RowId>;

    /// Replace the view's highlighted rows with the broker's canonical set.
    /// The set may contain rows hidden by the current mask; views must
    /// tolerate hidden-but-selected rows.
    fn apply_selection(&mut self, ids: &BTreeSet<RowId>);

    /// Visibility mask aligned to the shared table's row order.
    fn apply_visibility(&mut self, mask: &[bool]);

    /// Draw one density contour set. The returned handle stays valid until
    /// it is removed.
    fn add_overlay(&mut self, surface: DensitySurface) -> ArtifactId;

    /// Remove a previously drawn overlay. Unknown handles are ignored.
    fn remove_overlay(&mut self, artifact: ArtifactId);
}
