//! Tab drag-and-drop gesture recognition.
//!
//! ```text
//! Idle ──press on tab label──▶ PreDrag ──leave deadzone──▶ Dragging
//!  ▲                              │                           │
//!  └────── release / Escape / focus lost / tab destroyed ─────┘
//! ```
//!
//! A press arms the gesture and records a deadzone around the press point.
//! Motion inside the deadzone is ignored, so a press-release without real
//! movement is a click. Once the pointer leaves the deadzone, every motion
//! resolves the window under the pointer and an insertion index, which the
//! caller shows as a hint. Release turns the gesture into a [`DragOutcome`]
//! for the engine to apply; the controller itself never mutates the registry.

use crate::model::{EngineError, Point, Rect, TabId, WindowId};
use crate::state::registry::WindowRegistry;
use tracing::debug;

/// Default deadzone half-size in pixels.
pub const DEFAULT_DRAG_DEADZONE: u32 = 4;

/// Where a dragged tab would land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropHint {
    /// Window under the pointer.
    pub window: WindowId,
    /// Insertion index in that window's strip, before the source is removed.
    pub index: usize,
    /// Screen position of the insertion arrow.
    pub arrow: Point,
}

/// What a release means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// No gesture was in progress.
    NotDragging,
    /// Released inside the deadzone: a plain click on a tab label.
    Click {
        /// Window clicked.
        window: WindowId,
        /// Tab clicked.
        tab: TabId,
    },
    /// Move the tab within its own window.
    Reorder {
        /// The window.
        window: WindowId,
        /// Tab being moved.
        tab: TabId,
        /// Final strip index.
        to: usize,
    },
    /// Move the tab into another window.
    MoveTo {
        /// Tab being moved.
        tab: TabId,
        /// Source window.
        from: WindowId,
        /// Destination window.
        to: WindowId,
        /// Insertion index in the destination.
        index: usize,
    },
    /// Dropped over no window: give the tab a window of its own.
    Detach {
        /// Tab being moved.
        tab: TabId,
        /// Source window.
        from: WindowId,
        /// Drop point, used to place the new window.
        at: Point,
    },
    /// A drag that changes nothing.
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DragSession {
    window: WindowId,
    tab: TabId,
    deadzone: Rect,
    hint: Option<DropHint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DragState {
    #[default]
    Idle,
    PreDrag(DragSession),
    Dragging(DragSession),
}

/// Phase of the gesture, for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// No button held over a tab.
    Idle,
    /// Pressed on a tab; still inside the deadzone.
    PreDrag,
    /// Dragging a tab.
    Dragging,
}

/// Tab drag gesture state machine.
#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
    deadzone_radius: u32,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_DEADZONE)
    }
}

impl DragController {
    /// A controller with the given deadzone half-size.
    pub fn new(deadzone_radius: u32) -> Self {
        Self {
            state: DragState::Idle,
            deadzone_radius,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> DragPhase {
        match self.state {
            DragState::Idle => DragPhase::Idle,
            DragState::PreDrag(_) => DragPhase::PreDrag,
            DragState::Dragging(_) => DragPhase::Dragging,
        }
    }

    /// Tab being pressed or dragged.
    pub fn source_tab(&self) -> Option<TabId> {
        match self.state {
            DragState::Idle => None,
            DragState::PreDrag(s) | DragState::Dragging(s) => Some(s.tab),
        }
    }

    /// Current insertion hint, while dragging over a window.
    pub fn hint(&self) -> Option<DropHint> {
        match self.state {
            DragState::Dragging(s) => s.hint,
            _ => None,
        }
    }

    /// Button pressed at `point`. Arms the gesture if a tab label is under
    /// the pointer. Returns whether it armed.
    pub fn press(&mut self, registry: &WindowRegistry, point: Point) -> bool {
        if self.state != DragState::Idle {
            return false;
        }
        let Some((window, _)) = registry.window_at(point) else {
            return false;
        };
        let Some(w) = registry.window(window) else {
            return false;
        };
        let Some(tab) = w
            .geometry()
            .tab_at(w.len(), point)
            .and_then(|index| w.tabs().get(index).copied())
        else {
            return false;
        };
        self.state = DragState::PreDrag(DragSession {
            window,
            tab,
            deadzone: Rect::around(point, self.deadzone_radius),
            hint: None,
        });
        debug!(tab = %tab, window = %window, "Drag armed");
        true
    }

    /// Pointer moved to `point`. Returns the insertion hint while dragging
    /// over a window.
    pub fn motion(&mut self, registry: &WindowRegistry, point: Point) -> Option<DropHint> {
        let mut session = match self.state {
            DragState::Idle => return None,
            DragState::PreDrag(s) if s.deadzone.contains(point) => return None,
            DragState::PreDrag(s) | DragState::Dragging(s) => s,
        };
        if registry.tab(session.tab).is_none() {
            self.state = DragState::Idle;
            return None;
        }
        session.hint = resolve_target(registry, point);
        if matches!(self.state, DragState::PreDrag(_)) {
            debug!(tab = %session.tab, "Drag started");
        }
        self.state = DragState::Dragging(session);
        session.hint
    }

    /// Button released at `point`. Always returns to idle.
    pub fn release(&mut self, registry: &WindowRegistry, point: Point) -> DragOutcome {
        let state = std::mem::take(&mut self.state);
        let session = match state {
            DragState::Idle => return DragOutcome::NotDragging,
            DragState::PreDrag(s) => {
                return DragOutcome::Click {
                    window: s.window,
                    tab: s.tab,
                }
            }
            DragState::Dragging(s) => s,
        };
        let Some(source) = registry.tab(session.tab).map(|t| t.window()) else {
            return DragOutcome::Unchanged;
        };
        let Some(source_window) = registry.window(source) else {
            return DragOutcome::Unchanged;
        };

        match resolve_target(registry, point) {
            Some(hint) if hint.window == source => {
                let Some(from) = source_window.position(session.tab) else {
                    return DragOutcome::Unchanged;
                };
                let to = if hint.index > from {
                    hint.index - 1
                } else {
                    hint.index
                };
                if to == from {
                    DragOutcome::Unchanged
                } else {
                    DragOutcome::Reorder {
                        window: source,
                        tab: session.tab,
                        to,
                    }
                }
            }
            Some(hint) => DragOutcome::MoveTo {
                tab: session.tab,
                from: source,
                to: hint.window,
                index: hint.index,
            },
            None if source_window.len() >= 2 => DragOutcome::Detach {
                tab: session.tab,
                from: source,
                at: point,
            },
            None => DragOutcome::Unchanged,
        }
    }

    /// Abandon the gesture (Escape, focus loss). Returns whether one was in
    /// progress.
    pub fn cancel(&mut self) -> bool {
        let active = self.state != DragState::Idle;
        if active {
            debug!("Drag cancelled");
        }
        self.state = DragState::Idle;
        active
    }

    /// Abandon the gesture if it involves `tab`.
    pub fn forget_tab(&mut self, tab: TabId) -> bool {
        if self.source_tab() == Some(tab) {
            return self.cancel();
        }
        false
    }
}

/// Window and insertion slot under `point`.
pub fn resolve_target(registry: &WindowRegistry, point: Point) -> Option<DropHint> {
    let (window, candidates) = registry.window_at(point)?;
    if candidates > 1 {
        let err = EngineError::DragResolutionAmbiguous { candidates };
        debug!(
            error = %err,
            window = %window,
            "Using most recently focused window"
        );
    }
    let w = registry.window(window)?;
    let geometry = w.geometry();
    let index = geometry.insertion_index(w.len(), point);
    Some(DropHint {
        window,
        index,
        arrow: geometry.insertion_hint(w.len(), index),
    })
}

#[cfg(test)]
#[path = "drag_tests.rs"]
mod tests;
