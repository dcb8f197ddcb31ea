//! Window and tab state (pure).
//!
//! Everything here is plain data plus functions over it. Nothing touches the
//! scheduler or collaborators; the engine drives these types.

pub mod drag;
pub mod icon_animator;
pub mod placement;
pub mod registry;
pub mod replay;
pub mod tab;
pub mod tab_handler;
pub mod view;
pub mod window;

// Re-export for convenience
pub use drag::{DragController, DragOutcome, DragPhase, DropHint};
pub use icon_animator::{IconAnimator, IconSettings};
pub use placement::{Placement, PlacementCandidate, PlacementPolicy, PolicyRegistry};
pub use registry::{TabMove, TabRemoval, WindowRegistry};
pub use replay::{HistoryReplay, ReplayState, ReplayStep};
pub use tab::Tab;
pub use tab_handler::{resolve_tab_action, TabAction, TabCommand};
pub use view::{ConversationView, DisplayLine, DisplayOrigin};
pub use window::Window;
