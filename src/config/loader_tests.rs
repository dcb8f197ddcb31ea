//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::env;
use std::fs;

#[test]
fn default_config_path_contains_convwin_config_toml() {
    if let Some(path) = default_config_path() {
        let path_str = path.to_string_lossy();
        assert!(
            path_str.contains("convwin") && path_str.ends_with("config.toml"),
            "Path should contain 'convwin' and end with 'config.toml', got: {}",
            path_str
        );
    }
}

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/config.toml");
    assert_eq!(
        result,
        Ok(None),
        "Missing config file should return Ok(None), not an error"
    );
}

#[test]
fn load_config_file_parses_valid_toml() {
    let config_path = env::temp_dir().join("convwin_test_config.toml");

    let toml_content = r#"
close_immediately = true
close_timeout_seconds = 30
animate_icons = false
min_backlog_replay_batch = 50
icon_size = 48
placement = "im_chat"
conversations_per_window = 6
drag_deadzone = 8
"#;

    fs::write(&config_path, toml_content).expect("Failed to write test config");

    let config = load_config_file(&config_path)
        .expect("Should successfully parse valid TOML")
        .expect("Should return Some(ConfigFile) for existing file");

    assert_eq!(config.close_immediately, Some(true));
    assert_eq!(config.close_timeout_seconds, Some(30));
    assert_eq!(config.animate_icons, Some(false));
    assert_eq!(config.min_backlog_replay_batch, Some(50));
    assert_eq!(config.icon_size, Some(48));
    assert_eq!(config.placement.as_deref(), Some("im_chat"));
    assert_eq!(config.conversations_per_window, Some(6));
    assert_eq!(config.drag_deadzone, Some(8));
    assert_eq!(config.icon_size_min, None);

    fs::remove_file(config_path).ok();
}

#[test]
fn load_config_file_returns_error_for_invalid_toml() {
    let config_path = env::temp_dir().join("convwin_test_invalid.toml");
    fs::write(&config_path, "placement = [unclosed").expect("Failed to write test config");

    let result = load_config_file(&config_path);
    assert!(
        matches!(result, Err(ConfigError::ParseError { .. })),
        "Invalid TOML should be a parse error, got: {:?}",
        result
    );

    fs::remove_file(config_path).ok();
}

#[test]
fn config_file_rejects_unknown_fields() {
    let result: Result<ConfigFile, _> = toml::from_str("theme = \"dark\"");
    assert!(result.is_err(), "Unknown keys should be rejected");
}

#[test]
fn merge_config_uses_defaults_when_none() {
    assert_eq!(merge_config(None), ResolvedConfig::default());
}

#[test]
fn merge_config_uses_defaults_for_none_fields() {
    let config_file = ConfigFile {
        placement: Some("group".to_string()),
        ..ConfigFile::default()
    };
    let resolved = merge_config(Some(config_file));
    let defaults = ResolvedConfig::default();

    assert_eq!(resolved.placement, "group");
    assert_eq!(resolved.close_immediately, defaults.close_immediately);
    assert_eq!(resolved.close_timeout_seconds, defaults.close_timeout_seconds);
    assert_eq!(resolved.min_backlog_replay_batch, defaults.min_backlog_replay_batch);
}

#[test]
fn engine_config_clamps_batch_and_capacity() {
    let resolved = ResolvedConfig {
        min_backlog_replay_batch: 0,
        conversations_per_window: 0,
        ..ResolvedConfig::default()
    };
    let engine = resolved.engine_config();
    assert_eq!(engine.replay_batch, 1);
    assert_eq!(engine.conversations_per_window, 1);
}

#[test]
fn engine_config_converts_timeout_to_duration() {
    let resolved = ResolvedConfig {
        close_timeout_seconds: 42,
        ..ResolvedConfig::default()
    };
    assert_eq!(
        resolved.engine_config().close_timeout,
        Duration::from_secs(42)
    );
}

/// RAII guard to ensure environment variable cleanup even under test parallelism.
/// Removes the var on drop, preventing test pollution in parallel execution.
struct EnvGuard(&'static str);

impl EnvGuard {
    fn new(name: &'static str) -> Self {
        env::remove_var(name);
        EnvGuard(name)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        env::remove_var(self.0);
    }
}

#[test]
#[serial(convwin_env)]
fn apply_env_overrides_respects_placement() {
    let _guard = EnvGuard::new(ENV_PLACEMENT);
    env::set_var(ENV_PLACEMENT, "account");

    let result = apply_env_overrides(ResolvedConfig::default());
    assert_eq!(result.placement, "account");
}

#[test]
#[serial(convwin_env)]
fn apply_env_overrides_parses_close_immediately() {
    let _guard = EnvGuard::new(ENV_CLOSE_IMMEDIATELY);
    env::set_var(ENV_CLOSE_IMMEDIATELY, "yes");
    assert!(apply_env_overrides(ResolvedConfig::default()).close_immediately);

    env::set_var(ENV_CLOSE_IMMEDIATELY, "0");
    let base = ResolvedConfig {
        close_immediately: true,
        ..ResolvedConfig::default()
    };
    assert!(!apply_env_overrides(base).close_immediately);
}

#[test]
#[serial(convwin_env)]
fn apply_env_overrides_ignores_garbage_bool() {
    let _guard = EnvGuard::new(ENV_CLOSE_IMMEDIATELY);
    env::set_var(ENV_CLOSE_IMMEDIATELY, "maybe");
    let base = ResolvedConfig::default();
    assert_eq!(apply_env_overrides(base.clone()), base);
}

#[test]
#[serial(convwin_env)]
fn apply_env_overrides_no_change_when_env_var_not_set() {
    let _guard_a = EnvGuard::new(ENV_PLACEMENT);
    let _guard_b = EnvGuard::new(ENV_CLOSE_IMMEDIATELY);

    let base = ResolvedConfig::default();
    assert_eq!(
        apply_env_overrides(base.clone()),
        base,
        "Config should be unchanged when no CONVWIN_* variable is set"
    );
}

#[test]
#[serial(convwin_config)]
fn load_config_with_precedence_prefers_explicit_path() {
    let _guard = EnvGuard::new(ENV_CONFIG);
    let explicit = env::temp_dir().join("convwin_test_explicit.toml");
    let from_env = env::temp_dir().join("convwin_test_env.toml");
    fs::write(&explicit, "placement = \"new\"").expect("write explicit");
    fs::write(&from_env, "placement = \"group\"").expect("write env");
    env::set_var(ENV_CONFIG, &from_env);

    let config = load_config_with_precedence(Some(explicit.clone()))
        .expect("loads")
        .expect("present");
    assert_eq!(config.placement.as_deref(), Some("new"));

    fs::remove_file(explicit).ok();
    fs::remove_file(from_env).ok();
}

#[test]
#[serial(convwin_config)]
fn load_config_with_precedence_uses_env_var_when_no_explicit_path() {
    let _guard = EnvGuard::new(ENV_CONFIG);
    let from_env = env::temp_dir().join("convwin_test_env_only.toml");
    fs::write(&from_env, "close_immediately = true").expect("write env");
    env::set_var(ENV_CONFIG, &from_env);

    let config = load_config_with_precedence(None)
        .expect("loads")
        .expect("present");
    assert_eq!(config.close_immediately, Some(true));

    fs::remove_file(from_env).ok();
}

#[test]
fn apply_cli_overrides_placement_and_close() {
    let result = apply_cli_overrides(
        ResolvedConfig::default(),
        Some("number".to_string()),
        Some(true),
    );
    assert_eq!(result.placement, "number");
    assert!(result.close_immediately);
}

#[test]
fn apply_cli_overrides_no_overrides() {
    let base = ResolvedConfig::default();
    assert_eq!(apply_cli_overrides(base.clone(), None, None), base);
}

#[test]
#[serial(convwin_env)]
fn precedence_chain_full_defaults_to_cli() {
    let _guard = EnvGuard::new(ENV_PLACEMENT);
    let file = ConfigFile {
        placement: Some("im_chat".to_string()),
        close_timeout_seconds: Some(5),
        ..ConfigFile::default()
    };
    let merged = merge_config(Some(file));
    assert_eq!(merged.placement, "im_chat");

    env::set_var(ENV_PLACEMENT, "account");
    let with_env = apply_env_overrides(merged);
    assert_eq!(with_env.placement, "account");

    let with_cli = apply_cli_overrides(with_env, Some("new".to_string()), None);
    assert_eq!(with_cli.placement, "new");
    assert_eq!(with_cli.close_timeout_seconds, 5, "File value survives");
}
