//! Configuration module.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, load_config_with_precedence, merge_config,
    ConfigError, ConfigFile, ResolvedConfig,
};

use crate::state::icon_animator::IconSettings;
use crate::state::placement::{DEFAULT_CONVERSATIONS_PER_WINDOW, DEFAULT_POLICY};
use crate::state::drag::DEFAULT_DRAG_DEADZONE;
use crate::state::replay::DEFAULT_REPLAY_BATCH;
use std::time::Duration;

/// Default linger time of a parked conversation.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(600);

/// Settings consumed by the conversation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Destroy direct conversations on close instead of parking them.
    pub close_immediately: bool,
    /// How long a parked conversation lingers before it is destroyed.
    pub close_timeout: Duration,
    /// Animate multi-frame buddy icons.
    pub animate_icons: bool,
    /// Backlog records injected per idle turn.
    pub replay_batch: usize,
    /// Buddy icon display size and bounds.
    pub icons: IconSettings,
    /// Initial placement policy name.
    pub placement: String,
    /// Tab limit of the `number` placement policy.
    pub conversations_per_window: usize,
    /// Half-size in pixels of the drag deadzone.
    pub drag_deadzone: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            close_immediately: false,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
            animate_icons: true,
            replay_batch: DEFAULT_REPLAY_BATCH,
            icons: IconSettings::default(),
            placement: DEFAULT_POLICY.to_string(),
            conversations_per_window: DEFAULT_CONVERSATIONS_PER_WINDOW,
            drag_deadzone: DEFAULT_DRAG_DEADZONE,
        }
    }
}
