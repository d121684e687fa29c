//! Cross-view selection linking.
//!
//! Views never talk to each other directly; a selection gesture in any view
//! is reported here, and the broker pushes the canonical set to every other
//! registered view. Routing everything through one owner is what breaks the
//! mutual-notification cycle two peer-wired views would otherwise form.

use crate::table::RowId;
use crate::view::ViewAdapter;
use log::debug;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

/// Identifies a registered view within the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(u32);

/// Single owner of the canonical "currently highlighted rows" set.
///
/// Views are held weakly: a torn-down view simply stops receiving pushes,
/// it is never an error. Selection survives filtering (hidden-but-selected
/// is legal) and is cleared only explicitly or on dataset replacement.
#[derive(Default)]
pub struct SelectionBroker {
    views: Vec<(ViewId, Weak<RefCell<dyn ViewAdapter>>)>,
    canonical: BTreeSet<RowId>,
    next_id: u32,
}

impl SelectionBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_view(&mut self, view: Rc<RefCell<dyn ViewAdapter>>) -> ViewId {
        let id = ViewId(self.next_id);
        self.next_id += 1;
        debug!("registered view {:?} ({})", id, view.borrow().name());
        self.views.push((id, Rc::downgrade(&view)));
        id
    }

    pub fn selection(&self) -> &BTreeSet<RowId> {
        &self.canonical
    }

    /// A view reports that its own selection changed. The broker reads the
    /// source's current set, stores it as canonical and pushes it to every
    /// *other* live view; the origin is never re-notified. Calls are
    /// processed one at a time, so the canonical set always reflects the
    /// most recently completed notification.
    pub fn notify_changed(&mut self, source: ViewId) {
        let Some(origin) = self.upgrade(source) else {
            debug!("selection change from unregistered view {source:?}, ignoring");
            return;
        };

        self.canonical = origin.borrow().selected_ids();
        debug!(
            "selection from {}: {} rows",
            origin.borrow().name(),
            self.canonical.len()
        );

        self.views.retain(|(_, weak)| weak.strong_count() > 0);
        for (id, weak) in &self.views {
            if *id == source {
                continue;
            }
            if let Some(view) = weak.upgrade() {
                view.borrow_mut().apply_selection(&self.canonical);
            }
        }
    }

    /// Explicit clear (a user action, or dataset replacement). Every live
    /// view is told about the now-empty set.
    pub fn clear(&mut self) {
        self.canonical.clear();
        self.views.retain(|(_, weak)| weak.strong_count() > 0);
        for (_, weak) in &self.views {
            if let Some(view) = weak.upgrade() {
                view.borrow_mut().apply_selection(&self.canonical);
            }
        }
    }

    fn upgrade(&self, id: ViewId) -> Option<Rc<RefCell<dyn ViewAdapter>>> {
        self.views
            .iter()
            .find(|(vid, _)| *vid == id)
            .and_then(|(_, weak)| weak.upgrade())
    }
}
