//! Event-loop-facing coordinator.
//!
//! One session owns the shared table, the filter set, the selection
//! broker, the debounced recomputer and the overlay manager, and keeps
//! every attached view consistent: filter edits update visibility
//! immediately and schedule one density recompute for after the burst of
//! interactions settles; selection gestures route through the broker.
//!
//! Everything runs on the caller's event loop. Each method handles one
//! event to completion, so the filter set is never observed half-updated
//! and no locking is needed.

use crate::config::EngineConfig;
use crate::debounce::{Clock, DebouncedRecomputer, SystemClock};
use crate::density::{DensityOverlayManager, DensityRequest};
use crate::filter::{FilterRule, FilterSet};
use crate::selection::{SelectionBroker, ViewId};
use crate::table::{RowId, RowStore};
use crate::view::ViewAdapter;
use crate::weekday::Weekday;
use log::{debug, info};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Instant;

pub struct DashboardSession<C: Clock = SystemClock> {
    store: RowStore,
    filters: FilterSet,
    broker: SelectionBroker,
    recomputer: DebouncedRecomputer<C>,
    overlays: DensityOverlayManager,
    views: Vec<(ViewId, Rc<RefCell<dyn ViewAdapter>>)>,
    density_host: Option<ViewId>,
    request: DensityRequest,
}

impl DashboardSession<SystemClock> {
    pub fn new(store: RowStore, config: &EngineConfig) -> Self {
        Self::with_clock(store, config, SystemClock)
    }
}

impl<C: Clock> DashboardSession<C> {
    pub fn with_clock(store: RowStore, config: &EngineConfig, clock: C) -> Self {
        Self {
            store,
            filters: FilterSet::new(),
            broker: SelectionBroker::new(),
            recomputer: DebouncedRecomputer::with_clock(config.debounce_delay(), clock),
            overlays: DensityOverlayManager::new(config.density_options()),
            views: Vec::new(),
            density_host: None,
            request: DensityRequest::default(),
        }
    }

    pub fn store(&self) -> &RowStore {
        &self.store
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn selection(&self) -> &BTreeSet<RowId> {
        self.broker.selection()
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.artifact_count()
    }

    /// Registers a view for selection linking and visibility pushes. The
    /// current mask is applied right away so a late-attaching view starts
    /// consistent.
    pub fn attach_view(&mut self, view: Rc<RefCell<dyn ViewAdapter>>) -> ViewId {
        let id = self.broker.register_view(view.clone());
        view.borrow_mut()
            .apply_visibility(&self.filters.combined_mask(&self.store));
        self.views.push((id, view));
        id
    }

    /// Marks the view that hosts density overlays (typically the scatter).
    pub fn set_density_host(&mut self, id: ViewId) {
        self.density_host = Some(id);
    }

    /// Replaces or inserts a named filter rule. Visibility updates on every
    /// view immediately; the density recompute is debounced.
    pub fn set_filter(&mut self, name: &str, rule: FilterRule) {
        self.filters.set_rule(name, rule);
        self.refresh_visibility();
        self.recomputer.trigger();
    }

    pub fn remove_filter(&mut self, name: &str) {
        if self.filters.remove_rule(name).is_some() {
            self.refresh_visibility();
            self.recomputer.trigger();
        }
    }

    /// Toggles the overlay. Takes effect immediately, bypassing the
    /// debounce delay, like the original on/off switch.
    pub fn set_density_enabled(&mut self, enabled: bool) {
        self.request.enabled = enabled;
        self.force_recompute();
    }

    pub fn density_enabled(&self) -> bool {
        self.request.enabled
    }

    /// Sets the density groups to draw, in rendering order.
    pub fn set_density_groups(&mut self, groups: Vec<String>) {
        self.request.groups = groups;
        self.recomputer.trigger();
    }

    /// Sets the weekdays whose sample pairs feed the density fit.
    pub fn set_density_days(&mut self, days: Vec<Weekday>) {
        self.request.days = days;
        self.recomputer.trigger();
    }

    /// A view reports a selection gesture; the broker links it to every
    /// other view.
    pub fn selection_changed(&mut self, source: ViewId) {
        self.broker.notify_changed(source);
    }

    pub fn clear_selection(&mut self) {
        self.broker.clear();
    }

    /// Drives the debouncer; call from the event loop. Returns true when a
    /// recompute ran.
    pub fn tick(&mut self) -> bool {
        if !self.recomputer.take_due() {
            return false;
        }
        self.run_recompute();
        self.recomputer.complete();
        true
    }

    /// When the pending debounced recompute is scheduled, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.recomputer.next_deadline()
    }

    /// Explicit refresh: runs the recompute now and collapses any pending
    /// wake-up.
    pub fn force_recompute(&mut self) {
        if self.recomputer.force() {
            self.run_recompute();
            self.recomputer.complete();
        }
    }

    /// Drops any pending recompute, e.g. before tearing the views down.
    pub fn cancel_pending(&mut self) {
        self.recomputer.cancel();
    }

    /// Swaps in a new dataset (e.g. a city change). The selection is
    /// cleared, any pending recompute is dropped, and views are brought up
    /// to date against the new table immediately.
    pub fn replace_data(&mut self, store: RowStore) {
        info!("replacing dataset: {} rows", store.len());
        self.store = store;
        self.broker.clear();
        self.recomputer.cancel();
        self.refresh_visibility();
        self.force_recompute();
    }

    fn refresh_visibility(&mut self) {
        let mask = self.filters.combined_mask(&self.store);
        debug!(
            "visibility: {} of {} rows",
            mask.iter().filter(|&&v| v).count(),
            mask.len()
        );
        for (_, view) in &self.views {
            view.borrow_mut().apply_visibility(&mask);
        }
    }

    fn run_recompute(&mut self) {
        let Some(host) = self.density_host.and_then(|wanted| {
            self.views
                .iter()
                .find(|(id, _)| *id == wanted)
                .map(|(_, view)| view.clone())
        }) else {
            debug!("no density host attached, skipping recompute");
            return;
        };
        let mut view = host.borrow_mut();
        self.overlays
            .recompute(&self.store, &self.filters, &self.request, &mut *view);
    }
}
