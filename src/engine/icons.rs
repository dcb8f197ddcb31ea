//! Buddy icon loading and frame timers.

use super::{ConversationEngine, EngineNotice, MessagingCore, PreferenceStore};
use crate::model::TabId;
use crate::scheduler::{TaskId, Wakeup};
use crate::state::IconAnimator;
use tracing::debug;

impl<C: MessagingCore, P: PreferenceStore> ConversationEngine<C, P> {
    /// Replace a tab's icon with the one the core has for its active
    /// conversation. The new icon starts animating if the tab is on screen.
    pub(super) fn load_icon(&mut self, tab: TabId) {
        let Some(key) = self.registry.tab(tab).map(|t| t.active_key().clone()) else {
            return;
        };
        let icon = self.core.buddy_icon(&key);
        self.stop_animation(tab);
        let settings = self.config.icons;
        let Some(t) = self.registry.tab_mut(tab) else {
            return;
        };
        t.icon = icon.map(|icon| IconAnimator::new(icon, settings));
        let shown = t.icon.as_ref().map(|a| (a.frame_index(), a.display_size()));
        let visible = t.visible;
        if let Some((frame, size)) = shown {
            self.notify(EngineNotice::IconRedraw { tab, frame, size });
        }
        if visible {
            self.start_animation(tab);
        }
    }

    /// Arm the frame timer of a multi-frame icon. Still icons never start.
    pub(super) fn start_animation(&mut self, tab: TabId) {
        if !self.config.animate_icons {
            return;
        }
        let Some(animator) = self.registry.tab_mut(tab).and_then(|t| t.icon.as_mut()) else {
            return;
        };
        if !animator.can_animate() || animator.is_running() {
            return;
        }
        let Some(delay) = animator.current_delay() else {
            return;
        };
        animator.arm(self.scheduler.add_timeout(delay, Wakeup::IconFrame(tab)));
        debug!(tab = %tab, "Icon animation started");
    }

    /// Cancel a tab's frame timer, if armed.
    pub(super) fn stop_animation(&mut self, tab: TabId) {
        let task = self
            .registry
            .tab_mut(tab)
            .and_then(|t| t.icon.as_mut())
            .and_then(IconAnimator::disarm);
        if let Some(task) = task {
            self.scheduler.cancel(task);
            debug!(tab = %tab, "Icon animation paused");
        }
    }

    pub(super) fn icon_frame(&mut self, tab: TabId, task: TaskId) {
        let Some(t) = self.registry.tab_mut(tab) else {
            return;
        };
        let visible = t.visible;
        let Some(animator) = t.icon.as_mut() else {
            return;
        };
        if animator.timer() != Some(task) {
            debug!(tab = %tab, "Ignoring stale icon frame");
            return;
        }
        animator.disarm();
        if !visible {
            return;
        }
        let next = animator.tick();
        let frame = animator.frame_index();
        let size = animator.display_size();
        if let Some(delay) = next {
            animator.arm(self.scheduler.add_timeout(delay, Wakeup::IconFrame(tab)));
        }
        self.notify(EngineNotice::IconRedraw { tab, frame, size });
    }
}
