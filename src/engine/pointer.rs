//! Pointer input: the tab drag gesture and what its release does.

use super::{ConversationEngine, EngineNotice, GeometryKind, MessagingCore, PreferenceStore};
use super::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH};
use crate::model::{Point, Rect, TabId, WindowId};
use crate::state::{DragOutcome, DropHint};
use tracing::{debug, info};

impl<C: MessagingCore, P: PreferenceStore> ConversationEngine<C, P> {
    /// Button pressed. Returns whether a tab label was hit and a drag armed.
    pub fn pointer_down(&mut self, at: Point) -> bool {
        self.drag.press(&self.registry, at)
    }

    /// Pointer moved. Returns the insertion hint while dragging over a window.
    pub fn pointer_motion(&mut self, at: Point) -> Option<DropHint> {
        self.drag.motion(&self.registry, at)
    }

    /// Button released. Applies the gesture and returns what it meant.
    pub fn pointer_up(&mut self, at: Point) -> DragOutcome {
        let outcome = self.drag.release(&self.registry, at);
        debug!(?outcome, "Drag released");
        match outcome {
            DragOutcome::NotDragging | DragOutcome::Unchanged => {}
            DragOutcome::Click { tab, .. } => {
                self.switch_tab(tab);
            }
            DragOutcome::Reorder { window, tab, to } => {
                self.registry.move_tab(tab, window, to);
            }
            DragOutcome::MoveTo { tab, to, index, .. } => {
                self.move_and_focus(tab, to, index);
            }
            DragOutcome::Detach { tab, at, .. } => {
                let kind = self
                    .registry
                    .tab(tab)
                    .map_or(GeometryKind::Mixed, |t| t.kind().into());
                let size = self.preferences.window_geometry(kind).map_or(
                    (DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT),
                    |r| (r.width, r.height),
                );
                let window = self.create_window(Rect::new(at.x, at.y, size.0, size.1));
                self.move_and_focus(tab, window, 0);
            }
        }
        self.settle();
        outcome
    }

    /// Abort the drag in progress (Escape). The tab stays where it was.
    pub fn cancel_drag(&mut self) -> bool {
        self.drag.cancel()
    }

    fn move_and_focus(&mut self, tab: TabId, window: WindowId, index: usize) {
        let Some(moved) = self.registry.move_tab(tab, window, index) else {
            if self.registry.window(window).is_some_and(|w| w.is_empty()) {
                self.registry.destroy_window(window);
                self.window_destroyed(Some(window));
            }
            return;
        };
        info!(tab = %tab, from = %moved.from, to = %moved.to, index = moved.index, "Tab dragged");
        self.window_destroyed(moved.destroyed_window);
        self.registry.set_active_tab(tab);
        self.raise_window(window);
        self.clear_unseen(tab);
        self.notify(EngineNotice::TabRedraw(tab));
    }
}
