//! Pure core integration functions.
//!
//! Applies parsed scenario events to a [`ConversationEngine`]. Events that
//! feed the messaging core (history, icons, connectivity, roster groups) go
//! to the in-memory core; everything else is an engine notification or user
//! input. Nothing here performs I/O.

use crate::engine::{ConversationEngine, PreferenceStore};
use crate::model::error::ScriptError;
use crate::model::{ConversationKey, Message, Point};
use crate::source::script::{history_entries, script_icon};
use crate::source::{InMemoryCore, ParsedScript, ScriptEvent, ScriptLine};
use crate::state::TabAction;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of running a script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptReport {
    /// Events applied.
    pub applied: usize,
    /// Events the engine refused, in script order.
    pub errors: Vec<ScriptError>,
}

/// Apply every event of `script` in order.
///
/// Refused events are logged and collected; later events still run.
pub fn run_script<P: PreferenceStore>(
    engine: &mut ConversationEngine<InMemoryCore, P>,
    script: &ParsedScript,
) -> ScriptReport {
    let mut report = ScriptReport::default();
    for line in &script.events {
        match apply_event(engine, line) {
            Ok(()) => report.applied += 1,
            Err(err) => {
                warn!(error = %err, "Script event refused");
                report.errors.push(err);
            }
        }
    }
    report
}

fn unknown(line: usize, key: &ConversationKey) -> ScriptError {
    ScriptError::UnknownConversation {
        line,
        key: key.to_string(),
    }
}

fn rejected(line: usize, reason: impl Into<String>) -> ScriptError {
    ScriptError::Rejected {
        line,
        reason: reason.into(),
    }
}

/// Apply one event.
///
/// # Errors
///
/// Returns `ScriptError::UnknownConversation` for events naming a
/// conversation without a tab, and `ScriptError::Rejected` for events the
/// engine refuses.
pub fn apply_event<P: PreferenceStore>(
    engine: &mut ConversationEngine<InMemoryCore, P>,
    script_line: &ScriptLine,
) -> Result<(), ScriptError> {
    let line = script_line.line;
    debug!(line, event = ?script_line.event, "Applying script event");
    match &script_line.event {
        ScriptEvent::Create { conversation } => {
            engine
                .on_conversation_created(conversation.to_conversation())
                .ok_or_else(|| rejected(line, "no tab could be opened"))?;
        }
        ScriptEvent::Destroy { conversation } => {
            let key = conversation.key();
            if !engine.on_conversation_destroyed(&key) {
                return Err(unknown(line, &key));
            }
        }
        ScriptEvent::Update { conversation, what } => {
            if !engine.on_conversation_updated(conversation.to_conversation(), *what) {
                return Err(unknown(line, &conversation.key()));
            }
        }
        ScriptEvent::Message {
            conversation,
            sender,
            body,
            flags,
            timestamp,
        } => {
            let key = conversation.key();
            let message = Message::new(sender.clone(), body.clone(), *flags, *timestamp);
            if !engine.on_message_received(&key, message) {
                return Err(unknown(line, &key));
            }
        }
        ScriptEvent::History {
            conversation,
            records,
            generate,
        } => {
            let key = conversation.key();
            let entries = history_entries(&key, records, generate.as_ref());
            engine.core_mut().set_history(key, entries);
        }
        ScriptEvent::Icon {
            conversation,
            width,
            height,
            frames,
            delay_ms,
        } => {
            let icon = script_icon(*width, *height, *frames, *delay_ms);
            engine.core_mut().set_icon(conversation.key(), icon);
        }
        ScriptEvent::Connection { account, connected } => {
            engine.core_mut().set_connected(account.clone(), *connected);
        }
        ScriptEvent::RosterGroup {
            conversation,
            group,
        } => {
            engine
                .core_mut()
                .set_roster_group(conversation.key(), group.clone());
        }
        ScriptEvent::Present { conversation } => {
            engine
                .present_conversation(conversation.to_conversation())
                .ok_or_else(|| rejected(line, "no tab could be opened"))?;
        }
        ScriptEvent::Close { conversation } => {
            let key = conversation.key();
            if engine.tab_for(&key).is_none() {
                return Err(unknown(line, &key));
            }
            if !engine.close_conversation(&key) {
                return Err(rejected(line, format!("{key} is already closed")));
            }
        }
        ScriptEvent::Switch { conversation } => {
            let key = conversation.key();
            let window = engine
                .tab_for(&key)
                .and_then(|tab| engine.tab(tab))
                .map(|tab| tab.window())
                .ok_or_else(|| unknown(line, &key))?;
            if !engine.switch_active_conversation(window, &key) {
                return Err(rejected(line, format!("cannot show {key}")));
            }
        }
        ScriptEvent::PointerDown { x, y } => {
            engine.pointer_down(Point::new(*x, *y));
        }
        ScriptEvent::PointerMove { x, y } => {
            engine.pointer_motion(Point::new(*x, *y));
        }
        ScriptEvent::PointerUp { x, y } => {
            engine.pointer_up(Point::new(*x, *y));
        }
        ScriptEvent::CancelDrag => {
            engine.cancel_drag();
        }
        ScriptEvent::Focus { window, focused } => {
            if !engine.window_focus_changed(*window, *focused) {
                return Err(rejected(line, format!("unknown window {window}")));
            }
        }
        ScriptEvent::Resize { window, geometry } => {
            if !engine.resize_window(*window, *geometry) {
                return Err(rejected(line, format!("window {window} cannot be resized")));
            }
        }
        ScriptEvent::Tab { window, action } => {
            let action = action
                .parse::<TabAction>()
                .map_err(|err| rejected(line, err.to_string()))?;
            if !engine.handle_tab_action(*window, action) {
                return Err(rejected(line, format!("{action} does not apply to window {window}")));
            }
        }
        ScriptEvent::Placement { name } => {
            engine
                .set_placement_policy(name)
                .map_err(|err| rejected(line, err.to_string()))?;
        }
        ScriptEvent::Idle { turns } => {
            for _ in 0..*turns {
                engine.run_idle_turn();
            }
        }
        ScriptEvent::Advance { ms } => {
            engine.advance_time(Duration::from_millis(*ms));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::model::UnseenState;
    use crate::source::{parse_script, MemoryPreferences};

    // ===== Test Helpers =====

    fn engine() -> ConversationEngine<InMemoryCore, MemoryPreferences> {
        ConversationEngine::new(
            EngineConfig::default(),
            InMemoryCore::new(),
            MemoryPreferences::new(),
        )
    }

    fn run(script: &str) -> (ConversationEngine<InMemoryCore, MemoryPreferences>, ScriptReport) {
        let mut engine = engine();
        let parsed = parse_script(script);
        assert!(parsed.errors.is_empty(), "Script should parse: {:?}", parsed.errors);
        let report = run_script(&mut engine, &parsed);
        (engine, report)
    }

    // ===== run_script Tests =====

    #[test]
    fn create_events_open_tabs() {
        let (engine, report) = run(concat!(
            r#"{"event":"create","conversation":{"account":"me","name":"alice"}}"#,
            "\n",
            r##"{"event":"create","conversation":{"account":"me","name":"#rust","kind":"group"}}"##,
        ));

        assert_eq!(report.applied, 2);
        assert!(report.errors.is_empty());
        assert_eq!(engine.registry().tab_count(), 2);
    }

    #[test]
    fn history_before_create_is_replayed_on_idle() {
        let (engine, report) = run(concat!(
            r#"{"event":"history","conversation":{"account":"me","name":"bob"},"generate":{"count":150,"start":"2024-01-01T00:00:00Z"}}"#,
            "\n",
            r#"{"event":"create","conversation":{"account":"me","name":"bob"}}"#,
            "\n",
            r#"{"event":"idle","turns":2}"#,
        ));

        assert_eq!(report.applied, 3);
        let tab = engine.registry().tabs().next().expect("tab opened");
        let bodies = tab.view().bodies();
        assert_eq!(bodies.len(), 151);
        assert_eq!(bodies[0], "backlog 1");
        assert_eq!(bodies[150], "---");
    }

    #[test]
    fn message_to_unknown_conversation_is_reported() {
        let (_, report) = run(
            r#"{"event":"message","conversation":{"account":"me","name":"ghost"},"sender":"g","body":"boo","timestamp":"2024-01-01T00:00:00Z"}"#,
        );

        assert_eq!(report.applied, 0);
        assert!(matches!(
            report.errors.as_slice(),
            [ScriptError::UnknownConversation { line: 1, .. }]
        ));
    }

    #[test]
    fn refused_events_do_not_stop_the_script() {
        let (engine, report) = run(concat!(
            r#"{"event":"placement","name":"spiral"}"#,
            "\n",
            r#"{"event":"tab","window":2,"action":"sideways"}"#,
            "\n",
            r#"{"event":"create","conversation":{"account":"me","name":"alice"}}"#,
        ));

        assert_eq!(report.applied, 1);
        assert_eq!(report.errors.len(), 2);
        assert!(matches!(report.errors[0], ScriptError::Rejected { line: 1, .. }));
        assert!(matches!(report.errors[1], ScriptError::Rejected { line: 2, .. }));
        assert_eq!(engine.registry().tab_count(), 1);
    }

    #[test]
    fn close_then_message_reattaches() {
        let (engine, report) = run(concat!(
            r#"{"event":"create","conversation":{"account":"me","name":"alice"}}"#,
            "\n",
            r#"{"event":"close","conversation":{"account":"me","name":"alice"}}"#,
            "\n",
            r#"{"event":"message","conversation":{"account":"me","name":"alice"},"sender":"alice","body":"hi","flags":["recv"],"timestamp":"2024-01-01T00:00:00Z"}"#,
        ));

        assert!(report.errors.is_empty());
        let tab = engine.registry().tabs().next().expect("tab");
        assert_ne!(tab.window(), engine.hidden_window());
        assert_eq!(tab.unseen().state(), UnseenState::Text);
    }

    #[test]
    fn advance_expires_parked_conversations() {
        let (engine, report) = run(concat!(
            r#"{"event":"create","conversation":{"account":"me","name":"alice"}}"#,
            "\n",
            r#"{"event":"close","conversation":{"account":"me","name":"alice"}}"#,
            "\n",
            r#"{"event":"advance","ms":600000}"#,
        ));

        assert!(report.errors.is_empty());
        assert_eq!(engine.registry().tab_count(), 0);
        assert!(engine.pending_notices().iter().any(|n| matches!(
            n,
            crate::engine::EngineNotice::DestroyConversation(_)
        )));
    }

    #[test]
    fn closing_twice_is_rejected() {
        let (_, report) = run(concat!(
            r#"{"event":"create","conversation":{"account":"me","name":"alice"}}"#,
            "\n",
            r#"{"event":"close","conversation":{"account":"me","name":"alice"}}"#,
            "\n",
            r#"{"event":"close","conversation":{"account":"me","name":"alice"}}"#,
        ));

        assert!(matches!(
            report.errors.as_slice(),
            [ScriptError::Rejected { line: 3, .. }]
        ));
    }

    #[test]
    fn disconnected_account_destroys_persistent_room_on_close() {
        let (engine, report) = run(concat!(
            r##"{"event":"create","conversation":{"account":"me","name":"#rust","kind":"group","persistent":true}}"##,
            "\n",
            r#"{"event":"connection","account":"me","connected":false}"#,
            "\n",
            r##"{"event":"close","conversation":{"account":"me","name":"#rust","kind":"group"}}"##,
        ));

        assert!(report.errors.is_empty());
        assert_eq!(engine.registry().tab_count(), 0);
    }
}
