//! Window registry: the single owner of every window and tab.
//!
//! Windows and tabs live in two maps keyed by their handles. Windows refer to
//! tabs by [`TabId`]; tabs record their [`WindowId`]. All structural changes go
//! through this type so the two sides never disagree for longer than one call.
//!
//! # Invariants
//!
//! - Every tab is listed by exactly one window, and that window is the one the
//!   tab records.
//! - A visible window with no tabs does not exist; it is destroyed by the call
//!   that emptied it. The hidden holding window may be empty.
//! - A window's active tab is one of its tabs.
//! - Every tab has at least one bound conversation and its active conversation
//!   is one of them.
//! - A tab's unseen count is zero exactly when its unseen state is `None`.
//!
//! [`WindowRegistry::audit`] checks these; [`WindowRegistry::heal`] repairs a
//! reported violation by the least destructive means.

use crate::model::{
    Conversation, ConversationKey, InvariantViolation, Point, Rect, TabId, WindowId,
};
use crate::state::tab::Tab;
use crate::state::window::Window;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// What [`WindowRegistry::remove_tab`] took out.
#[derive(Debug)]
pub struct TabRemoval {
    /// The removed tab, for the caller to cancel its pending work.
    pub tab: Tab,
    /// Window destroyed because the removal emptied it.
    pub destroyed_window: Option<WindowId>,
}

/// What [`WindowRegistry::move_tab`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabMove {
    /// Window the tab left.
    pub from: WindowId,
    /// Window the tab is now in.
    pub to: WindowId,
    /// Final strip index in `to`.
    pub index: usize,
    /// Source window destroyed because the move emptied it.
    pub destroyed_window: Option<WindowId>,
}

/// Owner of all windows and tabs.
#[derive(Debug)]
pub struct WindowRegistry {
    windows: BTreeMap<WindowId, Window>,
    tabs: BTreeMap<TabId, Tab>,
    by_conversation: HashMap<ConversationKey, TabId>,
    hidden: WindowId,
    next_window: u64,
    next_tab: u64,
    focus_clock: u64,
}

impl Default for WindowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowRegistry {
    /// A registry holding only the hidden holding window.
    pub fn new() -> Self {
        let hidden = WindowId::from_raw(1);
        let mut windows = BTreeMap::new();
        windows.insert(hidden, Window::new(hidden, Rect::default(), true));
        Self {
            windows,
            tabs: BTreeMap::new(),
            by_conversation: HashMap::new(),
            hidden,
            next_window: 1,
            next_tab: 0,
            focus_clock: 0,
        }
    }

    // ===== Lookup =====

    /// The hidden holding window.
    pub fn hidden_window(&self) -> WindowId {
        self.hidden
    }

    /// Window by handle.
    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub(crate) fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(&id)
    }

    /// All windows in creation order, the hidden window first.
    pub fn windows(&self) -> impl Iterator<Item = &Window> {
        self.windows.values()
    }

    /// Shown windows in creation order.
    pub fn visible_windows(&self) -> impl Iterator<Item = &Window> {
        self.windows.values().filter(|w| !w.is_hidden())
    }

    /// Number of shown windows.
    pub fn visible_window_count(&self) -> usize {
        self.visible_windows().count()
    }

    /// Tab by handle.
    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.get(&id)
    }

    pub(crate) fn tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.get_mut(&id)
    }

    /// All tabs in creation order.
    pub fn tabs(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.values()
    }

    /// Number of tabs, parked ones included.
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// Tab a conversation is bound to.
    pub fn tab_for(&self, key: &ConversationKey) -> Option<TabId> {
        self.by_conversation.get(key).copied()
    }

    /// Existing tab a new direct conversation should merge into.
    pub fn tab_for_identity(&self, conversation: &Conversation) -> Option<TabId> {
        self.tabs
            .values()
            .find(|tab| tab.accepts(conversation))
            .map(Tab::id)
    }

    /// Tabs in registry order: windows by creation, then strip order.
    pub fn tabs_in_order(&self) -> impl Iterator<Item = &Tab> {
        self.windows
            .values()
            .flat_map(|w| w.tabs().iter())
            .filter_map(|id| self.tabs.get(id))
    }

    /// Topmost shown window under `point` and how many shown windows overlap
    /// there. Topmost is the most recently focused, then the newest.
    pub fn window_at(&self, point: Point) -> Option<(WindowId, usize)> {
        let candidates: Vec<&Window> = self
            .visible_windows()
            .filter(|w| w.geometry().contains(point))
            .collect();
        let top = candidates
            .iter()
            .max_by_key(|w| (w.focus_stamp(), w.id()))?;
        Some((top.id(), candidates.len()))
    }

    // ===== Windows =====

    /// Create an empty shown window. The caller must add a tab before
    /// returning control, or destroy it.
    pub fn create_window(&mut self, geometry: Rect) -> WindowId {
        self.next_window += 1;
        let id = WindowId::from_raw(self.next_window);
        self.windows.insert(id, Window::new(id, geometry, false));
        debug!(window = %id, "Window created");
        id
    }

    /// Destroy an empty shown window. Refuses the hidden window and windows
    /// that still hold tabs.
    pub fn destroy_window(&mut self, id: WindowId) -> bool {
        if id == self.hidden {
            return false;
        }
        match self.windows.get(&id) {
            Some(w) if w.is_empty() => {
                self.windows.remove(&id);
                debug!(window = %id, "Window destroyed");
                true
            }
            _ => false,
        }
    }

    /// Set a window's frame.
    pub fn set_geometry(&mut self, id: WindowId, geometry: Rect) -> bool {
        match self.windows.get_mut(&id) {
            Some(w) => {
                w.geometry = geometry;
                true
            }
            None => false,
        }
    }

    /// Mark `id` as the most recently focused window.
    pub fn focus(&mut self, id: WindowId) -> bool {
        match self.windows.get_mut(&id) {
            Some(w) => {
                self.focus_clock += 1;
                w.focus_stamp = self.focus_clock;
                true
            }
            None => false,
        }
    }

    fn destroy_if_empty(&mut self, id: WindowId) -> Option<WindowId> {
        self.destroy_window(id).then_some(id)
    }

    // ===== Tabs =====

    /// Open a new tab for `conversation` in `window` at `index` (clamped).
    ///
    /// Returns `None` if the window does not exist or the conversation is
    /// already bound.
    pub fn open_tab(
        &mut self,
        window: WindowId,
        conversation: Conversation,
        index: usize,
    ) -> Option<TabId> {
        if self.by_conversation.contains_key(conversation.key()) {
            return None;
        }
        let w = self.windows.get_mut(&window)?;
        self.next_tab += 1;
        let id = TabId::from_raw(self.next_tab);
        w.insert(id, index);
        self.by_conversation.insert(conversation.key().clone(), id);
        self.tabs.insert(id, Tab::new(id, window, conversation));
        debug!(tab = %id, window = %window, "Tab opened");
        Some(id)
    }

    /// Bind another conversation to an existing tab.
    pub fn bind(&mut self, tab: TabId, conversation: Conversation) -> bool {
        if let Some(owner) = self.by_conversation.get(conversation.key()) {
            if *owner != tab {
                return false;
            }
        }
        let Some(t) = self.tabs.get_mut(&tab) else {
            return false;
        };
        self.by_conversation.insert(conversation.key().clone(), tab);
        t.bind(conversation);
        true
    }

    /// Replace the descriptor of a bound conversation.
    pub fn update(&mut self, conversation: Conversation) -> Option<TabId> {
        let id = self.tab_for(conversation.key())?;
        let t = self.tabs.get_mut(&id)?;
        t.update(conversation).then_some(id)
    }

    /// Unbind a conversation from its tab.
    ///
    /// Returns the tab and whether it has no conversations left. An emptied
    /// tab must be removed with [`Self::remove_tab`] by the caller.
    pub fn unbind(&mut self, key: &ConversationKey) -> Option<(TabId, bool)> {
        let id = self.by_conversation.remove(key)?;
        let t = self.tabs.get_mut(&id)?;
        t.unbind(key);
        Some((id, t.is_empty()))
    }

    /// Remove a tab and every mapping to it. A shown window emptied by the
    /// removal is destroyed.
    pub fn remove_tab(&mut self, id: TabId) -> Option<TabRemoval> {
        let tab = self.tabs.remove(&id)?;
        self.by_conversation.retain(|_, owner| *owner != id);
        let window = tab.window;
        if let Some(w) = self.windows.get_mut(&window) {
            w.remove(id);
        }
        let destroyed_window = self.destroy_if_empty(window);
        debug!(tab = %id, window = %window, "Tab removed");
        Some(TabRemoval {
            tab,
            destroyed_window,
        })
    }

    /// Move a tab to `dest` at `index` (clamped) in one step.
    ///
    /// Within one window this is a reorder. Across windows the tab leaves its
    /// source and joins `dest`; a shown source emptied by the move is
    /// destroyed.
    pub fn move_tab(&mut self, id: TabId, dest: WindowId, index: usize) -> Option<TabMove> {
        if !self.windows.contains_key(&dest) {
            return None;
        }
        let from = self.tabs.get(&id)?.window;
        if from == dest {
            let w = self.windows.get_mut(&dest)?;
            let current = w.position(id)?;
            w.reorder(current, index);
            let index = w.position(id)?;
            return Some(TabMove {
                from,
                to: dest,
                index,
                destroyed_window: None,
            });
        }

        if let Some(source) = self.windows.get_mut(&from) {
            source.remove(id);
        }
        let index = self.windows.get_mut(&dest)?.insert(id, index);
        if let Some(t) = self.tabs.get_mut(&id) {
            t.window = dest;
        }
        let destroyed_window = self.destroy_if_empty(from);
        debug!(tab = %id, from = %from, to = %dest, index, "Tab moved");
        Some(TabMove {
            from,
            to: dest,
            index,
            destroyed_window,
        })
    }

    /// Reorder a window's strip.
    pub fn reorder(&mut self, window: WindowId, from: usize, to: usize) -> bool {
        self.windows
            .get_mut(&window)
            .is_some_and(|w| w.reorder(from, to))
    }

    /// Make `tab` the active tab of its window.
    pub fn set_active_tab(&mut self, tab: TabId) -> bool {
        let Some(window) = self.tabs.get(&tab).map(|t| t.window) else {
            return false;
        };
        self.windows
            .get_mut(&window)
            .is_some_and(|w| w.set_active(tab))
    }

    /// Recompute which tabs are on screen. Returns the tabs whose visibility
    /// changed, with their new visibility.
    pub fn refresh_visibility(&mut self) -> Vec<(TabId, bool)> {
        let mut changed = Vec::new();
        for (id, tab) in &mut self.tabs {
            let visible = self
                .windows
                .get(&tab.window)
                .is_some_and(|w| !w.is_hidden() && w.active() == Some(*id));
            if visible != tab.visible {
                tab.visible = visible;
                changed.push((*id, visible));
            }
        }
        changed
    }

    // ===== Consistency =====

    /// Check every structural invariant.
    pub fn audit(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        let mut listings: HashMap<TabId, usize> = HashMap::new();
        for w in self.windows.values() {
            for tab in w.tabs() {
                *listings.entry(*tab).or_default() += 1;
                if !self.tabs.contains_key(tab) {
                    violations.push(InvariantViolation::DanglingTabEntry {
                        window: w.id(),
                        tab: *tab,
                    });
                }
            }
            if !w.is_hidden() && w.is_empty() {
                violations.push(InvariantViolation::EmptyVisibleWindow { window: w.id() });
            }
            let active_ok = match w.active() {
                Some(active) => w.contains(active),
                None => w.is_empty(),
            };
            if !active_ok {
                violations.push(InvariantViolation::ActiveTabMissing { window: w.id() });
            }
        }

        for (id, tab) in &self.tabs {
            let count = listings.get(id).copied().unwrap_or(0);
            let in_own_window = self
                .windows
                .get(&tab.window)
                .is_some_and(|w| w.contains(*id));
            if count == 0 || (count == 1 && !in_own_window) {
                violations.push(InvariantViolation::TabInNoWindow { tab: *id });
            } else if count > 1 {
                violations.push(InvariantViolation::TabInManyWindows { tab: *id, count });
            }
            if !tab.unseen.is_consistent() {
                violations.push(InvariantViolation::UnseenMismatch {
                    tab: *id,
                    count: tab.unseen.count(),
                    state: tab.unseen.state().to_string(),
                });
            }
            if tab.is_empty() || !tab.active_in_range() {
                violations.push(InvariantViolation::ActiveConversationUnbound { tab: *id });
            }
        }

        violations
    }

    /// Repair one reported violation.
    pub fn heal(&mut self, violation: &InvariantViolation) {
        warn!(%violation, "Repairing engine state");
        match violation {
            InvariantViolation::TabInNoWindow { tab }
            | InvariantViolation::TabInManyWindows { tab, .. } => self.park_orphan(*tab),
            InvariantViolation::DanglingTabEntry { window, tab } => {
                if let Some(w) = self.windows.get_mut(window) {
                    w.purge(*tab);
                    if w.active() == Some(*tab) {
                        w.reset_active();
                    }
                }
                self.destroy_if_empty(*window);
            }
            InvariantViolation::UnseenMismatch { tab, .. } => {
                if let Some(t) = self.tabs.get_mut(tab) {
                    t.unseen.clear();
                }
            }
            InvariantViolation::EmptyVisibleWindow { window } => {
                self.destroy_if_empty(*window);
            }
            InvariantViolation::ActiveTabMissing { window } => {
                if let Some(w) = self.windows.get_mut(window) {
                    w.reset_active();
                }
            }
            InvariantViolation::ActiveConversationUnbound { tab } => {
                let empty = self.tabs.get(tab).is_some_and(Tab::is_empty);
                if empty {
                    self.remove_tab(*tab);
                } else if let Some(t) = self.tabs.get_mut(tab) {
                    let first = t.conversations().first().map(|c| c.key().clone());
                    if let Some(first) = first {
                        t.set_active(&first);
                    }
                }
            }
        }
    }

    /// Strip a tab from every window and park it in the hidden window with a
    /// clean unseen state.
    fn park_orphan(&mut self, tab: TabId) {
        let mut emptied = Vec::new();
        for w in self.windows.values_mut() {
            if w.contains(tab) {
                w.purge(tab);
                if w.active() == Some(tab) || w.active().is_some_and(|a| !w.contains(a)) {
                    w.reset_active();
                }
                if w.is_empty() && !w.is_hidden() {
                    emptied.push(w.id());
                }
            }
        }
        for id in emptied {
            self.destroy_if_empty(id);
        }
        let hidden = self.hidden;
        if let Some(w) = self.windows.get_mut(&hidden) {
            w.insert(tab, usize::MAX);
        }
        if let Some(t) = self.tabs.get_mut(&tab) {
            t.window = hidden;
            t.unseen.clear();
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
