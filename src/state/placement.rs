//! Placement policies: which window a new or reattached tab goes to.
//!
//! A policy only *chooses*. It reads the registry and returns a
//! [`Placement`]; the engine validates the choice and performs the single
//! insertion. Policies are looked up by name in a [`PolicyRegistry`].
//!
//! | Name      | Behaviour                                                    |
//! |-----------|--------------------------------------------------------------|
//! | `last`    | Most recently created shown window                           |
//! | `im_chat` | Most recent shown window whose tabs all share the new kind   |
//! | `new`     | Always a new window                                          |
//! | `group`   | First window holding a contact from the same roster group    |
//! | `account` | First window holding a conversation on the same account      |
//! | `number`  | Last window while it holds fewer than N tabs                 |

use crate::model::{AccountId, ConversationKind, EngineError, GroupId, WindowId};
use crate::state::registry::WindowRegistry;
use std::collections::BTreeMap;
use std::fmt;

/// Default policy name.
pub const DEFAULT_POLICY: &str = "last";

/// Default tab limit of the `number` policy.
pub const DEFAULT_CONVERSATIONS_PER_WINDOW: usize = 4;

/// What a policy knows about the tab being placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementCandidate {
    /// Kind of the tab's conversations.
    pub kind: ConversationKind,
    /// Account of the tab's active conversation.
    pub account: AccountId,
    /// Roster group of the contact, for direct conversations.
    pub group: Option<GroupId>,
}

/// A policy's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Append to this window.
    Existing(WindowId),
    /// Create a window for the tab.
    NewWindow,
}

/// A named window-selection rule.
pub trait PlacementPolicy: fmt::Debug {
    /// Registry name.
    fn name(&self) -> &'static str;

    /// Human-readable summary.
    fn description(&self) -> &'static str;

    /// Choose a window. Must not mutate anything and must be deterministic for
    /// a given registry state.
    fn place(&self, candidate: &PlacementCandidate, registry: &WindowRegistry) -> Placement;
}

/// Newest shown window.
#[derive(Debug, Default, Clone, Copy)]
pub struct LastWindow;

impl PlacementPolicy for LastWindow {
    fn name(&self) -> &'static str {
        "last"
    }

    fn description(&self) -> &'static str {
        "Last created window"
    }

    fn place(&self, _candidate: &PlacementCandidate, registry: &WindowRegistry) -> Placement {
        registry
            .visible_windows()
            .last()
            .map_or(Placement::NewWindow, |w| Placement::Existing(w.id()))
    }
}

/// Newest shown window whose tabs are all of the candidate's kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct LastWindowOfSameKind;

impl PlacementPolicy for LastWindowOfSameKind {
    fn name(&self) -> &'static str {
        "im_chat"
    }

    fn description(&self) -> &'static str {
        "Separate IM and Chat windows"
    }

    fn place(&self, candidate: &PlacementCandidate, registry: &WindowRegistry) -> Placement {
        registry
            .visible_windows()
            .filter(|w| {
                w.tabs()
                    .iter()
                    .filter_map(|id| registry.tab(*id))
                    .all(|t| t.kind() == candidate.kind)
            })
            .last()
            .map_or(Placement::NewWindow, |w| Placement::Existing(w.id()))
    }
}

/// Every tab gets its own window.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysNewWindow;

impl PlacementPolicy for AlwaysNewWindow {
    fn name(&self) -> &'static str {
        "new"
    }

    fn description(&self) -> &'static str {
        "New window"
    }

    fn place(&self, _candidate: &PlacementCandidate, _registry: &WindowRegistry) -> Placement {
        Placement::NewWindow
    }
}

/// First window holding a contact from the candidate's roster group.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByGroup;

impl PlacementPolicy for ByGroup {
    fn name(&self) -> &'static str {
        "group"
    }

    fn description(&self) -> &'static str {
        "By group"
    }

    fn place(&self, candidate: &PlacementCandidate, registry: &WindowRegistry) -> Placement {
        let Some(group) = candidate.group.as_ref() else {
            return Placement::NewWindow;
        };
        registry
            .visible_windows()
            .find(|w| {
                w.tabs()
                    .iter()
                    .filter_map(|id| registry.tab(*id))
                    .any(|t| t.group() == Some(group))
            })
            .map_or(Placement::NewWindow, |w| Placement::Existing(w.id()))
    }
}

/// First window holding a conversation on the candidate's account.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByAccount;

impl PlacementPolicy for ByAccount {
    fn name(&self) -> &'static str {
        "account"
    }

    fn description(&self) -> &'static str {
        "By account"
    }

    fn place(&self, candidate: &PlacementCandidate, registry: &WindowRegistry) -> Placement {
        registry
            .visible_windows()
            .find(|w| {
                w.tabs()
                    .iter()
                    .filter_map(|id| registry.tab(*id))
                    .any(|t| t.account() == &candidate.account)
            })
            .map_or(Placement::NewWindow, |w| Placement::Existing(w.id()))
    }
}

/// Newest shown window until it holds `per_window` tabs.
#[derive(Debug, Clone, Copy)]
pub struct ByNumber {
    per_window: usize,
}

impl ByNumber {
    /// Cap windows at `per_window` tabs (at least one).
    pub fn new(per_window: usize) -> Self {
        Self {
            per_window: per_window.max(1),
        }
    }
}

impl PlacementPolicy for ByNumber {
    fn name(&self) -> &'static str {
        "number"
    }

    fn description(&self) -> &'static str {
        "By conversation count"
    }

    fn place(&self, _candidate: &PlacementCandidate, registry: &WindowRegistry) -> Placement {
        match registry.visible_windows().last() {
            Some(w) if w.len() < self.per_window => Placement::Existing(w.id()),
            _ => Placement::NewWindow,
        }
    }
}

/// Named policies plus the active selection.
#[derive(Debug)]
pub struct PolicyRegistry {
    policies: BTreeMap<&'static str, Box<dyn PlacementPolicy>>,
    active: &'static str,
}

impl PolicyRegistry {
    /// Registry with every built-in policy and `last` active.
    pub fn with_defaults(per_window: usize) -> Self {
        let mut registry = Self {
            policies: BTreeMap::new(),
            active: DEFAULT_POLICY,
        };
        registry.register(Box::new(LastWindow));
        registry.register(Box::new(LastWindowOfSameKind));
        registry.register(Box::new(AlwaysNewWindow));
        registry.register(Box::new(ByGroup));
        registry.register(Box::new(ByAccount));
        registry.register(Box::new(ByNumber::new(per_window)));
        registry
    }

    /// Add or replace a policy under its own name.
    pub fn register(&mut self, policy: Box<dyn PlacementPolicy>) {
        self.policies.insert(policy.name(), policy);
    }

    /// Switch the active policy. An unknown name leaves the selection as is.
    pub fn set_active(&mut self, name: &str) -> Result<(), EngineError> {
        match self.policies.get_key_value(name) {
            Some((key, _)) => {
                self.active = key;
                Ok(())
            }
            None => Err(EngineError::UnknownPlacementPolicy(name.to_string())),
        }
    }

    /// Name of the active policy.
    pub fn active_name(&self) -> &'static str {
        self.active
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.policies.keys().copied().collect()
    }

    /// Ask the active policy for a decision.
    pub fn place(&self, candidate: &PlacementCandidate, registry: &WindowRegistry) -> Placement {
        match self.policies.get(self.active) {
            Some(policy) => policy.place(candidate, registry),
            None => Placement::NewWindow,
        }
    }
}

#[cfg(test)]
#[path = "placement_tests.rs"]
mod tests;
