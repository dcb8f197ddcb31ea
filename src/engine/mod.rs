//! The conversation engine: the facade external collaborators talk to.
//!
//! [`ConversationEngine`] owns every window and tab (through the
//! [`WindowRegistry`]), the single drag gesture, the placement policies and the
//! cooperative [`Scheduler`]. It is driven from one thread by three kinds of
//! input:
//!
//! - notifications from the messaging core (conversation created, destroyed,
//!   updated, message received),
//! - user input (present, close, pointer, focus, tab navigation),
//! - scheduler turns ([`ConversationEngine::run_idle_turn`] and
//!   [`ConversationEngine::advance_time`]) that run backlog replay, icon
//!   animation and close timers.
//!
//! Side effects on collaborators are queued as [`EngineNotice`]s.
//!
//! Every public operation leaves the registry consistent. In debug builds a
//! violated invariant panics; in release builds it is logged and repaired.

mod collaborators;
mod delivery;
mod icons;
mod lifecycle;
mod notice;
mod pointer;

pub use collaborators::{GeometryKind, MessagingCore, PreferenceStore};
pub use notice::EngineNotice;

use crate::config::EngineConfig;
use crate::model::{
    ConversationKey, ConversationKind, InvariantViolation, Rect, TabId, TypingState,
    UnseenState, WindowId,
};
use crate::scheduler::{Scheduler, TaskId, Wakeup};
use crate::state::{DragController, DragPhase, PolicyRegistry, Tab, Window, WindowRegistry};
use std::time::Duration;
use tracing::{error, info, warn};

/// Width of a window created without remembered geometry.
pub const DEFAULT_WINDOW_WIDTH: u32 = 640;

/// Height of a window created without remembered geometry.
pub const DEFAULT_WINDOW_HEIGHT: u32 = 480;

const WINDOW_SPACING: i32 = 20;

/// Which conversations [`ConversationEngine::list_unseen`] considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationFilter {
    /// Direct conversations only.
    Direct,
    /// Group conversations only.
    Group,
    /// Both kinds.
    #[default]
    Any,
}

impl ConversationFilter {
    fn admits(self, kind: ConversationKind) -> bool {
        match self {
            Self::Direct => kind == ConversationKind::Direct,
            Self::Group => kind == ConversationKind::Group,
            Self::Any => true,
        }
    }
}

/// Everything a tab strip needs to draw one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabLabel {
    /// The tab.
    pub tab: TabId,
    /// Title of the active conversation.
    pub title: String,
    /// Unseen severity.
    pub unseen: UnseenState,
    /// Unseen counter.
    pub unseen_count: u32,
    /// Typing state of the active conversation.
    pub typing: TypingState,
    /// Whether the account is online.
    pub connected: bool,
    /// Whether this is the window's active tab.
    pub active: bool,
    /// Number of bound conversations.
    pub conversations: usize,
}

/// The conversation-window engine.
#[derive(Debug)]
pub struct ConversationEngine<C, P> {
    config: EngineConfig,
    core: C,
    preferences: P,
    registry: WindowRegistry,
    policies: PolicyRegistry,
    drag: DragController,
    scheduler: Scheduler,
    focused: Option<WindowId>,
    notices: Vec<EngineNotice>,
}

impl<C: MessagingCore, P: PreferenceStore> ConversationEngine<C, P> {
    /// Start an engine. The hidden holding window exists from here until
    /// [`Self::shutdown`]. An unknown placement name in `config` falls back
    /// to the default policy.
    pub fn new(config: EngineConfig, core: C, preferences: P) -> Self {
        let mut policies = PolicyRegistry::with_defaults(config.conversations_per_window);
        if let Err(err) = policies.set_active(&config.placement) {
            warn!(error = %err, "Keeping default placement policy");
        }
        let drag = DragController::new(config.drag_deadzone);
        info!(placement = policies.active_name(), "Conversation engine started");
        Self {
            config,
            core,
            preferences,
            registry: WindowRegistry::new(),
            policies,
            drag,
            scheduler: Scheduler::new(),
            focused: None,
            notices: Vec::new(),
        }
    }

    // ===== Accessors =====

    /// Engine settings.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The messaging core.
    pub fn core(&self) -> &C {
        &self.core
    }

    /// Mutable access to the messaging core, for embedding applications and
    /// tests that feed it history.
    pub fn core_mut(&mut self) -> &mut C {
        &mut self.core
    }

    /// The preference store.
    pub fn preferences(&self) -> &P {
        &self.preferences
    }

    /// Read-only view of windows and tabs.
    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    /// The scheduler, for inspecting pending work.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The hidden holding window.
    pub fn hidden_window(&self) -> WindowId {
        self.registry.hidden_window()
    }

    /// Tab by handle.
    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.registry.tab(id)
    }

    /// Window by handle.
    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.registry.window(id)
    }

    /// Tab a conversation is bound to.
    pub fn tab_for(&self, key: &ConversationKey) -> Option<TabId> {
        self.registry.tab_for(key)
    }

    /// Window with input focus.
    pub fn focused_window(&self) -> Option<WindowId> {
        self.focused
    }

    /// Phase of the drag gesture.
    pub fn drag_phase(&self) -> DragPhase {
        self.drag.phase()
    }

    /// Insertion hint of the drag in progress.
    pub fn drag_hint(&self) -> Option<crate::state::DropHint> {
        self.drag.hint()
    }

    /// Name of the active placement policy.
    pub fn placement_policy(&self) -> &'static str {
        self.policies.active_name()
    }

    /// Names of every registered placement policy.
    pub fn placement_policies(&self) -> Vec<&'static str> {
        self.policies.names()
    }

    /// Select the placement policy used from now on. An unknown name is an
    /// error and leaves the current policy active.
    pub fn set_placement_policy(&mut self, name: &str) -> Result<(), crate::model::EngineError> {
        self.policies.set_active(name)?;
        info!(placement = name, "Placement policy changed");
        Ok(())
    }

    /// Take every queued notice.
    pub fn drain_notices(&mut self) -> Vec<EngineNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Queued notices, without taking them.
    pub fn pending_notices(&self) -> &[EngineNotice] {
        &self.notices
    }

    /// Labels of a window's tabs, in strip order.
    pub fn tab_labels(&self, window: WindowId) -> Vec<TabLabel> {
        let Some(w) = self.registry.window(window) else {
            return Vec::new();
        };
        w.tabs()
            .iter()
            .filter_map(|id| self.registry.tab(*id))
            .map(|tab| TabLabel {
                tab: tab.id(),
                title: tab.title().to_string(),
                unseen: tab.unseen().state(),
                unseen_count: tab.unseen().count(),
                typing: tab.typing(),
                connected: self.core.is_account_connected(tab.account()),
                active: w.active() == Some(tab.id()),
                conversations: tab.conversations().len(),
            })
            .collect()
    }

    /// Geometry key of a window: the shared kind of its tabs, or `Mixed`.
    pub fn geometry_kind(&self, window: WindowId) -> Option<GeometryKind> {
        let w = self.registry.window(window)?;
        let mut kinds = w
            .tabs()
            .iter()
            .filter_map(|id| self.registry.tab(*id))
            .map(|t| GeometryKind::from(t.kind()));
        let first = kinds.next()?;
        Some(if kinds.all(|k| k == first) {
            first
        } else {
            GeometryKind::Mixed
        })
    }

    // ===== Scheduler =====

    /// Run one idle turn. Returns how many wakeups were dispatched.
    pub fn run_idle_turn(&mut self) -> usize {
        let batch = self.scheduler.take_turn();
        let count = batch.len();
        for (task, wakeup) in batch {
            self.dispatch(task, wakeup);
        }
        count
    }

    /// Run idle turns until the idle queue is empty or `max_turns` is reached.
    /// Returns the number of turns taken.
    pub fn run_until_idle(&mut self, max_turns: usize) -> usize {
        let mut turns = 0;
        while turns < max_turns && self.scheduler.pending_idle() > 0 {
            self.run_idle_turn();
            turns += 1;
        }
        turns
    }

    /// Advance the virtual clock by `by`, firing every timer that falls due,
    /// in deadline order.
    pub fn advance_time(&mut self, by: Duration) -> usize {
        let until = self.scheduler.now().saturating_add(by);
        let mut fired = 0;
        while let Some((task, wakeup)) = self.scheduler.pop_due(until) {
            self.dispatch(task, wakeup);
            fired += 1;
        }
        self.scheduler.set_now(until);
        fired
    }

    fn dispatch(&mut self, task: TaskId, wakeup: Wakeup) {
        match wakeup {
            Wakeup::Replay(tab) => self.replay_turn(tab, task),
            Wakeup::IconFrame(tab) => self.icon_frame(tab, task),
            Wakeup::CloseTimeout(tab) => self.close_timer_expired(tab, task),
        }
        self.settle();
    }

    // ===== Shutdown =====

    /// Stop the engine: cancel all pending work, end any drag and destroy
    /// every window, the hidden holding window included. Returns the notices
    /// still queued, ending with one `WindowDestroyed` per window.
    pub fn shutdown(mut self) -> Vec<EngineNotice> {
        self.scheduler.clear();
        self.drag.cancel();
        let tabs: Vec<TabId> = self.registry.tabs().map(Tab::id).collect();
        for tab in tabs {
            if let Some(removal) = self.registry.remove_tab(tab) {
                if let Some(window) = removal.destroyed_window {
                    self.notices.push(EngineNotice::WindowDestroyed(window));
                }
            }
        }
        let remaining: Vec<WindowId> = self.registry.windows().map(Window::id).collect();
        self.notices
            .extend(remaining.into_iter().map(EngineNotice::WindowDestroyed));
        info!("Conversation engine stopped");
        self.notices
    }

    // ===== Internals =====

    pub(crate) fn notify(&mut self, notice: EngineNotice) {
        self.notices.push(notice);
    }

    /// Whether `tab` is on screen in the focused window.
    fn has_focus(&self, tab: TabId) -> bool {
        self.registry
            .tab(tab)
            .is_some_and(|t| t.is_visible() && self.focused == Some(t.window()))
    }

    /// Frame for a new window of `kind`: remembered geometry, or a slot to the
    /// right of the existing windows.
    fn new_window_geometry(&self, kind: GeometryKind) -> Rect {
        if let Some(rect) = self.preferences.window_geometry(kind) {
            return rect;
        }
        let slot = i32::try_from(self.registry.visible_window_count()).unwrap_or(0);
        let step = DEFAULT_WINDOW_WIDTH as i32 + WINDOW_SPACING;
        Rect::new(
            slot.saturating_mul(step),
            0,
            DEFAULT_WINDOW_WIDTH,
            DEFAULT_WINDOW_HEIGHT,
        )
    }

    fn create_window(&mut self, geometry: Rect) -> WindowId {
        let id = self.registry.create_window(geometry);
        self.notify(EngineNotice::WindowCreated(id));
        id
    }

    fn window_destroyed(&mut self, window: Option<WindowId>) {
        if let Some(window) = window {
            if self.focused == Some(window) {
                self.focused = None;
            }
            self.notify(EngineNotice::WindowDestroyed(window));
        }
    }

    /// Remove a tab and everything it owns in the scheduler.
    fn destroy_tab(&mut self, id: TabId) {
        self.drag.forget_tab(id);
        let Some(removal) = self.registry.remove_tab(id) else {
            return;
        };
        let mut tab = removal.tab;
        if let Some(task) = tab.replay_task.take() {
            self.scheduler.cancel(task);
        }
        if let Some(replay) = tab.replay.as_mut() {
            replay.cancel();
        }
        if let Some(task) = tab.icon.as_mut().and_then(|icon| icon.disarm()) {
            self.scheduler.cancel(task);
        }
        if let Some(task) = tab.close_timer.take() {
            self.scheduler.cancel(task);
        }
        self.window_destroyed(removal.destroyed_window);
    }

    /// Bring derived state up to date after any change: tab visibility, icon
    /// animations, then consistency.
    fn settle(&mut self) {
        if let Some(window) = self.focused {
            if self.registry.window(window).is_none() {
                self.focused = None;
            }
        }
        for (tab, visible) in self.registry.refresh_visibility() {
            if visible {
                self.start_animation(tab);
                // Uncovered in the focused window: the user is looking at it.
                let in_focus = self
                    .registry
                    .tab(tab)
                    .is_some_and(|t| Some(t.window()) == self.focused);
                if in_focus {
                    self.clear_unseen(tab);
                }
            } else {
                self.stop_animation(tab);
            }
        }
        self.enforce_invariants();
    }

    /// Current invariant violations. Empty whenever no operation is running.
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        self.registry.audit()
    }

    fn enforce_invariants(&mut self) {
        let violations = self.registry.audit();
        debug_assert!(
            violations.is_empty(),
            "Engine invariants violated: {violations:?}"
        );
        for violation in &violations {
            error!(%violation, "Engine invariant violated");
            self.registry.heal(violation);
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
