//! A top-level window: an ordered tab strip with one active tab.

use crate::model::{Rect, TabId, WindowId};

/// A window and its tab order.
#[derive(Debug, Clone)]
pub struct Window {
    id: WindowId,
    tabs: Vec<TabId>,
    active: Option<TabId>,
    hidden: bool,
    pub(crate) geometry: Rect,
    pub(crate) focus_stamp: u64,
}

impl Window {
    pub(crate) fn new(id: WindowId, geometry: Rect, hidden: bool) -> Self {
        Self {
            id,
            tabs: Vec::new(),
            active: None,
            hidden,
            geometry,
            focus_stamp: 0,
        }
    }

    /// Handle of this window.
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// Tabs in strip order.
    pub fn tabs(&self) -> &[TabId] {
        &self.tabs
    }

    /// Number of tabs.
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Whether the strip is empty.
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// The active tab.
    pub fn active(&self) -> Option<TabId> {
        self.active
    }

    /// Strip index of the active tab.
    pub fn active_index(&self) -> Option<usize> {
        self.active.and_then(|tab| self.position(tab))
    }

    /// Whether this is the hidden holding window.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Screen frame.
    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    /// Focus recency; higher is more recent. Zero means never focused.
    pub fn focus_stamp(&self) -> u64 {
        self.focus_stamp
    }

    /// Strip index of `tab`.
    pub fn position(&self, tab: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| *t == tab)
    }

    /// Whether `tab` is in the strip.
    pub fn contains(&self, tab: TabId) -> bool {
        self.tabs.contains(&tab)
    }

    /// Insert `tab` at `index` (clamped to the end). The first tab of an empty
    /// window becomes active.
    pub(crate) fn insert(&mut self, tab: TabId, index: usize) -> usize {
        let index = index.min(self.tabs.len());
        self.tabs.insert(index, tab);
        if self.active.is_none() {
            self.active = Some(tab);
        }
        index
    }

    /// Remove `tab`, returning its former index. When the active tab goes,
    /// the tab now at `min(index, len - 1)` becomes active.
    pub(crate) fn remove(&mut self, tab: TabId) -> Option<usize> {
        let index = self.position(tab)?;
        self.tabs.remove(index);
        if self.active == Some(tab) {
            self.active = if self.tabs.is_empty() {
                None
            } else {
                Some(self.tabs[index.min(self.tabs.len() - 1)])
            };
        }
        Some(index)
    }

    /// Drop every entry for `tab`, without touching the active tab.
    pub(crate) fn purge(&mut self, tab: TabId) {
        self.tabs.retain(|t| *t != tab);
    }

    /// Move the tab at `from` to `to` (clamped). The active tab is unchanged.
    pub(crate) fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from >= self.tabs.len() {
            return false;
        }
        let tab = self.tabs.remove(from);
        let to = to.min(self.tabs.len());
        self.tabs.insert(to, tab);
        from != to
    }

    /// Make `tab` active. Returns whether it is in the strip.
    pub(crate) fn set_active(&mut self, tab: TabId) -> bool {
        if !self.contains(tab) {
            return false;
        }
        self.active = Some(tab);
        true
    }

    /// Reset the active tab to the first one, or none.
    pub(crate) fn reset_active(&mut self) {
        self.active = self.tabs.first().copied();
    }
}
