//! Subcommand implementations

use anyhow::{bail, Context, Result};
use scrollspy_app::{run_loaded_scenario, EngineConfig, ReplayConfig, Scenario};
use std::path::Path;

/// Run a scenario file. Returns `false` when an assertion failed.
pub fn replay(
    scenario_path: &Path,
    config_path: Option<&Path>,
    report_path: Option<&Path>,
    tick_ms: u64,
) -> Result<bool> {
    let scenario = Scenario::from_path(scenario_path)?;
    let config = config_path
        .map(|path| {
            EngineConfig::load(path).with_context(|| format!("Invalid config {}", path.display()))
        })
        .transpose()?;

    tracing::info!(
        scenario = %scenario_path.display(),
        steps = scenario.steps.len(),
        "replaying scenario"
    );
    let report = run_loaded_scenario(&scenario, config, ReplayConfig { tick_ms })?;

    report.write_to_writer(&mut std::io::stdout().lock())?;
    if let Some(path) = report_path {
        report
            .write_to_path(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        tracing::info!(path = %path.display(), "report written");
    }

    if let Some(failure) = &report.failure {
        tracing::error!(
            step = failure.step_index,
            assertion = %failure.assertion,
            message = %failure.message,
            "scenario failed"
        );
    }
    Ok(!report.is_failed())
}

pub fn check_config(path: &Path) -> Result<()> {
    let config = EngineConfig::load(path).with_context(|| format!("Invalid config {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        throttle_ms = config.scroll.throttle_ms,
        settle_ms = config.scroll.settle_ms,
        "config is valid"
    );
    Ok(())
}

pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }
    let content = EngineConfig::default().to_toml()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "default config written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_then_check_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("scrollspy.toml");

        init_config(&path, false).unwrap();
        check_config(&path).unwrap();

        assert!(init_config(&path, false).is_err());
        init_config(&path, true).unwrap();
    }

    #[test]
    fn test_check_config_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[layout]\nmobile_breakpoint = -1\n").unwrap();

        let err = check_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("layout.mobile_breakpoint"));
    }

    #[test]
    fn test_replay_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = dir.path().join("scenario.json");
        let report = dir.path().join("report.json");
        std::fs::write(
            &scenario,
            r#"{ "steps": [{ "type": "assert_menu", "open": true }] }"#,
        )
        .unwrap();

        let passed = replay(&scenario, None, Some(&report), 16).unwrap();
        assert!(!passed);
        let written = std::fs::read_to_string(&report).unwrap();
        assert!(written.contains("\"failed_step_index\": 0"));
    }
}
