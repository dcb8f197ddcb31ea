//! Conversation lifecycle: creation, presentation, close, reattach and
//! destruction of tabs.

use super::{ConversationEngine, EngineNotice, GeometryKind, MessagingCore, PreferenceStore};
use crate::model::{
    Conversation, ConversationKey, ConversationKind, EngineError, TabId, UpdateKind, WindowId,
};
use crate::scheduler::{TaskId, Wakeup};
use crate::state::{HistoryReplay, Placement, PlacementCandidate};
use tracing::{debug, info, warn};

impl<C: MessagingCore, P: PreferenceStore> ConversationEngine<C, P> {
    /// The messaging core created a conversation.
    ///
    /// A direct conversation whose buddy already has a tab joins that tab.
    /// Anything else gets a new tab in the window chosen by the active
    /// placement policy. Stored backlog starts replaying on the next idle turn.
    ///
    /// Returns the tab now showing the conversation. A conversation that is
    /// already bound only has its descriptor refreshed.
    pub fn on_conversation_created(&mut self, conversation: Conversation) -> Option<TabId> {
        if let Some(tab) = self.registry.update(conversation.clone()) {
            debug!(conversation = %conversation.key(), "Conversation already bound");
            self.notify(EngineNotice::TabRedraw(tab));
            return Some(tab);
        }

        let key = conversation.key().clone();
        let tab = match self.registry.tab_for_identity(&conversation) {
            Some(tab) => {
                self.registry.bind(tab, conversation);
                if let Some(t) = self.registry.tab_mut(tab) {
                    t.set_active(&key);
                }
                if self.is_parked(tab) {
                    self.reattach(tab);
                }
                info!(conversation = %key, tab = %tab, "Conversation merged into tab");
                self.notify(EngineNotice::TabRedraw(tab));
                tab
            }
            None => self.open_tab_for(conversation)?,
        };

        self.refresh_group(tab);
        self.start_backlog(tab, &key);
        self.settle();
        Some(tab)
    }

    fn open_tab_for(&mut self, conversation: Conversation) -> Option<TabId> {
        let key = conversation.key().clone();
        let candidate = PlacementCandidate {
            kind: conversation.kind(),
            account: conversation.account().clone(),
            group: self.core.roster_group(&key),
        };
        let window = self.choose_window(&candidate);
        let Some(tab) = self.registry.open_tab(window, conversation, usize::MAX) else {
            warn!(conversation = %key, "Could not open tab");
            if self.registry.destroy_window(window) {
                self.window_destroyed(Some(window));
            }
            return None;
        };
        info!(
            conversation = %key,
            tab = %tab,
            window = %window,
            policy = self.policies.active_name(),
            "Tab opened"
        );
        self.load_icon(tab);
        Some(tab)
    }

    /// Window the active policy picks for `candidate`, created if needed.
    /// A pick that cannot take tabs falls back to a new window.
    pub(super) fn choose_window(&mut self, candidate: &PlacementCandidate) -> WindowId {
        match self.policies.place(candidate, &self.registry) {
            Placement::Existing(window)
                if self
                    .registry
                    .window(window)
                    .is_some_and(|w| !w.is_hidden()) =>
            {
                window
            }
            Placement::Existing(window) => {
                let err = EngineError::PlacementFailure {
                    reason: format!("window {window} cannot take tabs"),
                };
                warn!(
                    error = %err,
                    policy = self.policies.active_name(),
                    "Falling back to a new window"
                );
                self.new_window_for(candidate.kind.into())
            }
            Placement::NewWindow => self.new_window_for(candidate.kind.into()),
        }
    }

    pub(super) fn new_window_for(&mut self, kind: GeometryKind) -> WindowId {
        let geometry = self.new_window_geometry(kind);
        self.create_window(geometry)
    }

    /// Record the roster group of a tab's active conversation. Rooms have one
    /// too when they are on the buddy list.
    pub(super) fn refresh_group(&mut self, tab: TabId) {
        let Some(t) = self.registry.tab(tab) else {
            return;
        };
        let group = self.core.roster_group(t.active_key());
        if let Some(t) = self.registry.tab_mut(tab) {
            t.group = group;
        }
    }

    /// Snapshot the stored backlog of `key` into `tab`'s replay. Merges into a
    /// replay still running, otherwise starts a fresh one.
    pub(super) fn start_backlog(&mut self, tab: TabId, key: &ConversationKey) {
        let history = self.core.message_history(key);
        if history.is_empty() {
            return;
        }
        let batch = self.config.replay_batch;
        let Some(t) = self.registry.tab_mut(tab) else {
            return;
        };
        match t.replay.as_mut() {
            Some(replay) if replay.is_running() => replay.merge_backlog(key.clone(), history),
            _ => t.replay = HistoryReplay::start(vec![(key.clone(), history)], batch),
        }
        let running = t.replay.as_ref().is_some_and(HistoryReplay::is_running);
        if running && t.replay_task.is_none() {
            t.replay_task = Some(self.scheduler.add_idle(Wakeup::Replay(tab)));
            debug!(tab = %tab, conversation = %key, "Backlog replay scheduled");
        }
    }

    /// Whether a tab sits in the hidden holding window.
    pub(super) fn is_parked(&self, tab: TabId) -> bool {
        self.registry
            .tab(tab)
            .is_some_and(|t| t.window() == self.registry.hidden_window())
    }

    /// Move a parked tab back to a visible window chosen by the active
    /// policy and disarm its close timer.
    pub(super) fn reattach(&mut self, tab: TabId) -> Option<WindowId> {
        let t = self.registry.tab_mut(tab)?;
        if let Some(timer) = t.close_timer.take() {
            self.scheduler.cancel(timer);
        }
        let candidate = PlacementCandidate {
            kind: t.kind(),
            account: t.account().clone(),
            group: t.group().cloned(),
        };
        let window = self.choose_window(&candidate);
        let moved = self.registry.move_tab(tab, window, usize::MAX)?;
        info!(tab = %tab, window = %window, "Tab reattached");
        self.window_destroyed(moved.destroyed_window);
        Some(window)
    }

    /// Make sure a conversation has a tab, that the tab is on screen in its
    /// window, and that the window has focus.
    ///
    /// Unknown conversations are created first, applying the active placement
    /// policy. Presenting clears the tab's unseen state.
    pub fn present_conversation(&mut self, conversation: Conversation) -> Option<TabId> {
        let key = conversation.key().clone();
        let tab = match self.registry.tab_for(&key) {
            Some(tab) => tab,
            None => self.on_conversation_created(conversation)?,
        };
        if self.is_parked(tab) {
            self.reattach(tab);
        }
        if let Some(t) = self.registry.tab_mut(tab) {
            t.set_active(&key);
        }
        self.registry.set_active_tab(tab);
        let window = self.registry.tab(tab).map(|t| t.window());
        if let Some(window) = window {
            self.raise_window(window);
        }
        self.clear_unseen(tab);
        self.settle();
        Some(tab)
    }

    /// Give `window` input focus and put it on top.
    pub(super) fn raise_window(&mut self, window: WindowId) {
        if self.registry.focus(window) {
            self.focused = Some(window);
            self.notify(EngineNotice::WindowRaised(window));
        }
    }

    pub(super) fn clear_unseen(&mut self, tab: TabId) {
        let cleared = self
            .registry
            .tab_mut(tab)
            .is_some_and(|t| t.unseen.clear());
        if cleared {
            self.notify(EngineNotice::TabRedraw(tab));
        }
    }

    /// The user closed a tab.
    ///
    /// Direct conversations park in the hidden holding window and are
    /// destroyed when the close timeout expires, unless `close_immediately`
    /// is set. Group conversations park only when they are persistent rooms
    /// on a connected account. Everything else is destroyed now.
    pub fn close_tab(&mut self, tab: TabId) -> bool {
        let Some(t) = self.registry.tab(tab) else {
            return false;
        };
        if t.window() == self.registry.hidden_window() {
            return false;
        }
        let lingers = t.lingers_after_close(self.config.close_immediately)
            && match t.kind() {
                ConversationKind::Direct => true,
                ConversationKind::Group => self.core.is_account_connected(t.account()),
            };

        self.drag.forget_tab(tab);
        if lingers {
            self.park(tab);
        } else {
            self.request_destroy(tab);
            self.destroy_tab(tab);
        }
        self.settle();
        true
    }

    /// Close the tab showing `key`.
    pub fn close_conversation(&mut self, key: &ConversationKey) -> bool {
        match self.registry.tab_for(key) {
            Some(tab) => self.close_tab(tab),
            None => false,
        }
    }

    fn park(&mut self, tab: TabId) {
        let hidden = self.registry.hidden_window();
        self.stop_animation(tab);
        let Some(moved) = self.registry.move_tab(tab, hidden, usize::MAX) else {
            return;
        };
        self.window_destroyed(moved.destroyed_window);
        let timeout = self.config.close_timeout;
        if let Some(t) = self.registry.tab_mut(tab) {
            if let Some(old) = t.close_timer.take() {
                self.scheduler.cancel(old);
            }
            t.close_timer = Some(self.scheduler.add_timeout(timeout, Wakeup::CloseTimeout(tab)));
        }
        info!(tab = %tab, timeout_secs = timeout.as_secs(), "Tab parked");
    }

    /// Ask the messaging core to destroy every conversation bound to `tab`.
    fn request_destroy(&mut self, tab: TabId) {
        let keys: Vec<ConversationKey> = self
            .registry
            .tab(tab)
            .map(|t| t.conversations().iter().map(|c| c.key().clone()).collect())
            .unwrap_or_default();
        self.notices
            .extend(keys.into_iter().map(EngineNotice::DestroyConversation));
    }

    pub(super) fn close_timer_expired(&mut self, tab: TabId, task: TaskId) {
        let hidden = self.registry.hidden_window();
        let Some(t) = self.registry.tab_mut(tab) else {
            return;
        };
        if t.close_timer != Some(task) {
            debug!(tab = %tab, "Ignoring stale close timer");
            return;
        }
        t.close_timer = None;
        if t.window() != hidden {
            return;
        }
        info!(tab = %tab, "Close timeout expired");
        self.request_destroy(tab);
        self.destroy_tab(tab);
    }

    /// The messaging core destroyed a conversation. Its tab goes away with
    /// its last conversation, wherever it is.
    pub fn on_conversation_destroyed(&mut self, key: &ConversationKey) -> bool {
        let Some((tab, emptied)) = self.registry.unbind(key) else {
            debug!(conversation = %key, "Destroyed conversation was not bound");
            return false;
        };
        if emptied {
            self.destroy_tab(tab);
        } else {
            self.refresh_group(tab);
            self.notify(EngineNotice::TabRedraw(tab));
        }
        info!(conversation = %key, tab = %tab, "Conversation destroyed");
        self.settle();
        true
    }

    /// The messaging core changed something about a conversation.
    pub fn on_conversation_updated(&mut self, conversation: Conversation, kind: UpdateKind) -> bool {
        let key = conversation.key().clone();
        let Some(tab) = self.registry.update(conversation) else {
            debug!(conversation = %key, ?kind, "Update for unbound conversation");
            return false;
        };
        match kind {
            UpdateKind::Title | UpdateKind::Topic | UpdateKind::Typing | UpdateKind::LoggingState => {
                self.notify(EngineNotice::TabRedraw(tab));
            }
            UpdateKind::Icon => self.load_icon(tab),
            UpdateKind::MenuState | UpdateKind::Features => {
                self.notify(EngineNotice::MenuRefresh(tab));
            }
        }
        if kind == UpdateKind::Title {
            self.refresh_group(tab);
        }
        self.settle();
        true
    }
}
