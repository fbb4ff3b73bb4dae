//! End-to-end replays of scripted input

use pretty_assertions::assert_eq;
use scrollspy_app::{
    run_loaded_scenario, run_scenario, EngineConfig, ReplayConfig, ReportStatus, Scenario,
    ScenarioReport,
};
use scrollspy_store::ThemeMode;

const PORTFOLIO: &str = include_str!("fixtures/portfolio.json");

#[test]
fn test_portfolio_scenario_passes() {
    let report = run_scenario(PORTFOLIO).unwrap();
    assert_eq!(
        report.status,
        ReportStatus::Passed,
        "failed: {:?}",
        report.failure
    );
    assert_eq!(report.elapsed_ms, 120);
    assert!(report.notifications > 0);

    let state = &report.final_state;
    assert_eq!(state.active_section_id.as_deref(), Some("about"));
    assert_eq!(state.theme, ThemeMode::Light);
    assert_eq!(state.project_filter.as_str(), "web");
    assert_eq!(state.revealed_sorted(), vec!["about-intro"]);
}

#[test]
fn test_longer_settle_delays_resolution() {
    let mut scenario = Scenario::from_json(PORTFOLIO).unwrap();
    // Up to the assertion that follows the burst
    scenario.steps.truncate(15);

    let mut config = EngineConfig::default();
    config.scroll.settle_ms = 500;
    let report = run_loaded_scenario(&scenario, Some(config), ReplayConfig::default()).unwrap();

    assert!(report.is_failed());
    let failure = report.failure.unwrap();
    assert_eq!(failure.assertion, "assert_active");
    assert_eq!(
        failure.message,
        r#"expected active section Some("about"), got Some("home")"#
    );
}

#[test]
fn test_report_serializes_to_json() {
    let report = run_scenario(PORTFOLIO).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports").join("portfolio.json");
    report.write_to_path(&path).unwrap();

    let written: ScenarioReport =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written.status, ReportStatus::Passed);
    assert_eq!(written.final_state, report.final_state);

    let mut out = Vec::new();
    report.write_to_writer(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("\"status\": \"passed\""));
    assert!(text.ends_with('\n'));
}
