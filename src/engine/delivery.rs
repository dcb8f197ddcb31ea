//! Message delivery, backlog replay turns, unseen bookkeeping and focus.

use super::{ConversationEngine, ConversationFilter, EngineNotice, MessagingCore, PreferenceStore};
use crate::model::{ConversationKey, Message, Rect, TabId, UnseenState, WindowId};
use crate::scheduler::{TaskId, Wakeup};
use crate::state::{resolve_tab_action, ReplayStep, TabAction, TabCommand};
use tracing::{debug, warn};

impl<C: MessagingCore, P: PreferenceStore> ConversationEngine<C, P> {
    /// A message arrived for a bound conversation.
    ///
    /// A parked tab is reattached first. Received messages mark the tab
    /// unseen unless it is on screen in the focused window. While backlog
    /// replay is running the message is held back and shown after the
    /// backlog; otherwise it is shown at once.
    pub fn on_message_received(&mut self, key: &ConversationKey, message: Message) -> bool {
        let Some(tab) = self.registry.tab_for(key) else {
            warn!(conversation = %key, "Message for unbound conversation dropped");
            return false;
        };
        if self.is_parked(tab) {
            self.reattach(tab);
            self.settle();
        }

        let focused = self.has_focus(tab);
        let Some(t) = self.registry.tab_mut(tab) else {
            return false;
        };
        let marked = UnseenState::for_message(message.flags, t.kind())
            .is_some_and(|state| t.unseen.mark(state, focused));
        match t.replay.as_mut() {
            Some(replay) if replay.is_running() => {
                debug!(conversation = %key, "Holding live message until backlog is shown");
                replay.buffer_live(key.clone(), message);
            }
            _ => t.view.push_live(key.clone(), message),
        }
        if marked {
            self.notify(EngineNotice::TabRedraw(tab));
        }
        self.settle();
        true
    }

    pub(super) fn replay_turn(&mut self, tab: TabId, task: TaskId) {
        let Some(t) = self.registry.tab_mut(tab) else {
            return;
        };
        if t.replay_task != Some(task) {
            debug!(tab = %tab, "Ignoring stale replay wakeup");
            return;
        }
        t.replay_task = None;
        let Some(replay) = t.replay.as_mut() else {
            return;
        };
        match replay.step(&mut t.view) {
            ReplayStep::Continue => {
                t.replay_task = Some(self.scheduler.add_idle(Wakeup::Replay(tab)));
            }
            ReplayStep::Finished { .. } => self.notify(EngineNotice::TabRedraw(tab)),
            ReplayStep::Inactive => {}
        }
    }

    /// Unseen conversations, one per tab (the tab's active conversation), in
    /// registry order: windows by creation, then strip order.
    ///
    /// # Arguments
    /// * `filter` - Conversation kinds to consider
    /// * `min_state` - Lowest unseen state to include; `UnseenState::None` includes every tab
    /// * `hidden_only` - Only tabs parked in the hidden holding window
    /// * `max_count` - Stop after this many results; `0` means no limit
    pub fn list_unseen(
        &self,
        filter: ConversationFilter,
        min_state: UnseenState,
        hidden_only: bool,
        max_count: usize,
    ) -> Vec<ConversationKey> {
        let hidden = self.registry.hidden_window();
        let limit = if max_count == 0 { usize::MAX } else { max_count };
        self.registry
            .tabs_in_order()
            .filter(|t| filter.admits(t.kind()))
            .filter(|t| t.unseen().state() >= min_state)
            .filter(|t| !hidden_only || t.window() == hidden)
            .map(|t| t.active_key().clone())
            .take(limit)
            .collect()
    }

    /// Active conversation of a window's active tab.
    pub fn get_active_conversation(&self, window: WindowId) -> Option<ConversationKey> {
        let tab = self.registry.window(window)?.active()?;
        self.registry.tab(tab).map(|t| t.active_key().clone())
    }

    /// Show `key` in `window`: it becomes its tab's active conversation and
    /// that tab becomes the window's active tab. Fails if the conversation
    /// is not in that window.
    pub fn switch_active_conversation(&mut self, window: WindowId, key: &ConversationKey) -> bool {
        let Some(tab) = self.registry.tab_for(key) else {
            return false;
        };
        let Some(t) = self.registry.tab_mut(tab) else {
            return false;
        };
        if t.window() != window || !t.set_active(key) {
            return false;
        }
        self.registry.set_active_tab(tab);
        self.load_icon(tab);
        self.refresh_group(tab);
        self.clear_unseen(tab);
        self.notify(EngineNotice::TabRedraw(tab));
        self.notify(EngineNotice::MenuRefresh(tab));
        self.settle();
        true
    }

    /// Make `tab` the active tab of its window and clear its unseen state.
    pub fn switch_tab(&mut self, tab: TabId) -> bool {
        if !self.registry.set_active_tab(tab) {
            return false;
        }
        self.clear_unseen(tab);
        self.settle();
        true
    }

    /// Run a tab navigation action on `window`.
    pub fn handle_tab_action(&mut self, window: WindowId, action: TabAction) -> bool {
        match resolve_tab_action(&self.registry, window, action) {
            Some(TabCommand::Activate(tab)) => self.switch_tab(tab),
            Some(TabCommand::Close(tab)) => self.close_tab(tab),
            None => false,
        }
    }

    /// A window gained or lost input focus.
    ///
    /// Gaining focus clears the active tab's unseen state and puts the
    /// window on top for drop-target resolution. Losing it aborts a drag.
    pub fn window_focus_changed(&mut self, window: WindowId, focused: bool) -> bool {
        if self.registry.window(window).is_none() {
            return false;
        }
        if focused {
            self.registry.focus(window);
            self.focused = Some(window);
            let active = self.registry.window(window).and_then(|w| w.active());
            if let Some(tab) = active {
                self.clear_unseen(tab);
            }
        } else {
            if self.focused == Some(window) {
                self.focused = None;
            }
            self.drag.cancel();
        }
        self.settle();
        true
    }

    /// A window was moved or resized. The frame is remembered for new
    /// windows of the same kind.
    pub fn resize_window(&mut self, window: WindowId, geometry: Rect) -> bool {
        if window == self.registry.hidden_window() || !self.registry.set_geometry(window, geometry) {
            return false;
        }
        if let Some(kind) = self.geometry_kind(window) {
            self.preferences.set_window_geometry(kind, geometry);
            debug!(window = %window, %kind, "Window geometry remembered");
        }
        true
    }
}
