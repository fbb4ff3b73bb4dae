//! Scenario runner that replays scripted input against an engine.
//!
//! Time is virtual: the engine runs on a [`ManualClock`] and `wait` steps
//! advance it in fixed ticks, running due timers after each tick the way a
//! host frame loop would.

use crate::config::EngineConfig;
use crate::engine::ScrollEngine;
use crate::report::{AssertionFailure, ScenarioReport};
use crate::scenario::{Scenario, ScenarioStep};
use anyhow::Result;
use parking_lot::Mutex;
use scrollspy_core::events::KeyCode;
use scrollspy_scheduler::ManualClock;
use scrollspy_store::{MemoryStorage, UiState};
use std::sync::Arc;
use std::time::Duration;

/// Replay settings.
#[derive(Debug, Clone, Copy)]
pub struct ReplayConfig {
    /// Clock granularity of `wait` steps
    pub tick_ms: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self { tick_ms: 16 }
    }
}

/// Execute scenario JSON with default settings.
pub fn run_scenario(input: &str) -> Result<ScenarioReport> {
    let scenario = Scenario::from_json(input)?;
    run_loaded_scenario(&scenario, None, ReplayConfig::default())
}

/// Execute a pre-loaded scenario.
///
/// `config` takes precedence over the scenario's own configuration. The
/// engine gets fresh in-memory preference storage so replays are hermetic.
pub fn run_loaded_scenario(
    scenario: &Scenario,
    config: Option<EngineConfig>,
    replay: ReplayConfig,
) -> Result<ScenarioReport> {
    let config = config
        .or_else(|| scenario.config.clone())
        .unwrap_or_default();
    let defaults = config.reveal.options();

    let clock = ManualClock::new();
    let engine = ScrollEngine::new(
        config,
        Arc::new(MemoryStorage::new()),
        Arc::new(clock.clone()),
    )?;

    let notifications = Arc::new(Mutex::new(0usize));
    let counter = notifications.clone();
    let _subscription = engine.subscribe(move |_| *counter.lock() += 1);

    engine.mount(scenario.sections.clone(), std::iter::empty::<String>());
    for element in &scenario.elements {
        engine.register_element(element.id(), element.options(defaults));
    }

    let mut elapsed_ms: u64 = 0;
    let tick = replay.tick_ms.max(1);

    for (step_index, step) in scenario.steps.iter().enumerate() {
        tracing::trace!(step_index, ?step, "replay step");

        let failure = match step {
            ScenarioStep::Scroll { y } => {
                engine.on_scroll(*y);
                None
            }
            ScenarioStep::Resize {
                width,
                height,
                sections,
            } => {
                let sections = sections.clone().unwrap_or_else(|| scenario.sections.clone());
                engine.on_resize(*width, *height, sections);
                None
            }
            ScenarioStep::Wait { ms } => {
                let mut remaining = *ms;
                while remaining > 0 {
                    let step_ms = remaining.min(tick);
                    remaining -= step_ms;
                    clock.advance(Duration::from_millis(step_ms));
                    elapsed_ms = elapsed_ms.saturating_add(step_ms);
                    engine.tick();
                }
                None
            }
            ScenarioStep::Visibility { viewport, bounds } => {
                engine.on_visibility_pass(*viewport, |id| bounds.get(id).copied());
                None
            }
            ScenarioStep::Key { key } => {
                engine.on_key(KeyCode::from_name(key));
                None
            }
            ScenarioStep::PointerDown { inside_menu } => {
                engine.on_pointer_down(*inside_menu);
                None
            }
            ScenarioStep::NavLink { id } => {
                engine.on_nav_link(id);
                None
            }
            ScenarioStep::ToggleTheme => {
                engine.toggle_theme();
                None
            }
            ScenarioStep::ToggleMenu => {
                engine.toggle_menu();
                None
            }
            ScenarioStep::SetFilter { filter } => {
                engine.set_project_filter(filter);
                None
            }
            ScenarioStep::AssertActive { id } => check_active(&engine.state(), id.as_deref()),
            ScenarioStep::AssertRevealed { id, revealed } => {
                check_revealed(&engine.state(), id, *revealed)
            }
            ScenarioStep::AssertMenu { open } => {
                let actual = engine.state().menu_open;
                (actual != *open).then(|| {
                    (
                        "assert_menu",
                        format!("expected menu_open={open}, got {actual}"),
                    )
                })
            }
            ScenarioStep::AssertTheme { theme } => {
                let actual = engine.state().theme;
                (actual != *theme).then(|| {
                    (
                        "assert_theme",
                        format!("expected theme {theme}, got {actual}"),
                    )
                })
            }
            ScenarioStep::AssertHeader {
                scrolled,
                show_scroll_top,
            } => check_header(&engine.state(), *scrolled, *show_scroll_top),
        };

        if let Some((assertion, message)) = failure {
            tracing::debug!(step_index, assertion, %message, "assertion failed");
            let report = ScenarioReport::passed(elapsed_ms, *notifications.lock(), engine.state())
                .fail(AssertionFailure {
                    step_index,
                    assertion: assertion.to_string(),
                    message,
                });
            return Ok(report);
        }
    }

    let notifications = *notifications.lock();
    let final_state = engine.state();
    engine.teardown();
    Ok(ScenarioReport::passed(elapsed_ms, notifications, final_state))
}

fn check_active(state: &UiState, expected: Option<&str>) -> Option<(&'static str, String)> {
    let actual = state.active_section_id.as_deref();
    (actual != expected).then(|| {
        (
            "assert_active",
            format!("expected active section {expected:?}, got {actual:?}"),
        )
    })
}

fn check_revealed(state: &UiState, id: &str, revealed: bool) -> Option<(&'static str, String)> {
    let actual = state.is_revealed(id);
    (actual != revealed).then(|| {
        (
            "assert_revealed",
            format!("{id}: expected revealed={revealed}, got {actual}"),
        )
    })
}

fn check_header(
    state: &UiState,
    scrolled: Option<bool>,
    show_scroll_top: Option<bool>,
) -> Option<(&'static str, String)> {
    if let Some(expected) = scrolled.filter(|expected| *expected != state.scrolled) {
        return Some((
            "assert_header",
            format!("expected scrolled={expected}, got {}", state.scrolled),
        ));
    }
    if let Some(expected) = show_scroll_top.filter(|expected| *expected != state.show_scroll_top) {
        return Some((
            "assert_header",
            format!(
                "expected show_scroll_top={expected}, got {}",
                state.show_scroll_top
            ),
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportStatus;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_scenario_passes() {
        let report = run_scenario(r#"{ "steps": [] }"#).unwrap();
        assert_eq!(report.status, ReportStatus::Passed);
        assert_eq!(report.notifications, 0);
    }

    #[test]
    fn test_wait_accumulates_elapsed_time() {
        let report = run_scenario(
            r#"{ "steps": [{ "type": "wait", "ms": 40 }, { "type": "wait", "ms": 60 }] }"#,
        )
        .unwrap();
        assert_eq!(report.elapsed_ms, 100);
    }

    #[test]
    fn test_failed_assertion_reports_step() {
        let report = run_scenario(
            r#"{
                "steps": [
                    { "type": "toggle_menu" },
                    { "type": "assert_menu", "open": true },
                    { "type": "assert_theme", "theme": "light" }
                ]
            }"#,
        )
        .unwrap();
        assert!(report.is_failed());
        assert_eq!(
            report.failure,
            Some(AssertionFailure {
                step_index: 2,
                assertion: "assert_theme".to_string(),
                message: "expected theme light, got dark".to_string(),
            })
        );
    }

    #[test]
    fn test_config_override_wins() {
        let scenario = Scenario::from_json(
            r#"{
                "config": { "layout": { "header_height": 0 } },
                "sections": [{ "id": "a", "top_offset": 0, "height": 300 }],
                "steps": [{ "type": "scroll", "y": 0 }, { "type": "assert_active", "id": "a" }]
            }"#,
        )
        .unwrap();

        let mut config = EngineConfig::default();
        config.scroll.viewport_offset = 500.0;
        let report = run_loaded_scenario(&scenario, Some(config), ReplayConfig::default()).unwrap();
        assert!(report.is_failed());

        let report = run_loaded_scenario(&scenario, None, ReplayConfig::default()).unwrap();
        assert!(!report.is_failed());
    }
}
