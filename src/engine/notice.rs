//! Outbox of requests from the engine to its collaborators.
//!
//! The engine never calls the renderer, the menus or the messaging core
//! directly for side effects. It queues notices; the embedding application
//! drains them with [`ConversationEngine::drain_notices`](super::ConversationEngine::drain_notices).

use crate::model::{ConversationKey, TabId, WindowId};
use std::fmt;

/// One request or announcement from the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineNotice {
    /// A window was created and should be shown.
    WindowCreated(WindowId),
    /// A window was destroyed.
    WindowDestroyed(WindowId),
    /// A window should be raised and given input focus.
    WindowRaised(WindowId),
    /// A tab label (title, unseen colour, typing state) needs redrawing.
    TabRedraw(TabId),
    /// A tab's buddy icon needs redrawing.
    IconRedraw {
        /// Tab owning the icon.
        tab: TabId,
        /// Frame now on display.
        frame: usize,
        /// Scaled display size.
        size: (u32, u32),
    },
    /// A tab's menus need refreshing.
    MenuRefresh(TabId),
    /// The messaging core should destroy this conversation.
    DestroyConversation(ConversationKey),
}

impl fmt::Display for EngineNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WindowCreated(w) => write!(f, "window-created {w}"),
            Self::WindowDestroyed(w) => write!(f, "window-destroyed {w}"),
            Self::WindowRaised(w) => write!(f, "window-raised {w}"),
            Self::TabRedraw(t) => write!(f, "tab-redraw {t}"),
            Self::IconRedraw { tab, frame, size } => {
                write!(f, "icon-redraw {tab} frame={frame} size={}x{}", size.0, size.1)
            }
            Self::MenuRefresh(t) => write!(f, "menu-refresh {t}"),
            Self::DestroyConversation(key) => write!(f, "destroy-conversation {key}"),
        }
    }
}
