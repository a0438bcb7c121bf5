//! `natcheck run` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use natcheck_core::config::NatcheckConfig;
use natcheck_core::report::{ScenarioReport, StepStatus};
use natcheck_verifier::{Scenario, ScenarioRunner};

use crate::cli::{RunArgs, ScenarioKind};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command.
///
/// Runs the selected lifecycle scenario(s) strictly in sequence and
/// renders a per-step report. Exits non-zero when any scenario fails.
pub async fn execute(
    args: RunArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = NatcheckConfig::load(config_path).await?;
    let client = super::manager_client(&config)?;
    let router_id = super::resolve_router_id(&config, args.router_id)?;
    let fixture = super::fixture_from(&config);

    let mut scenarios = match args.scenario {
        ScenarioKind::Snat => vec![Scenario::snat_basic(&router_id)],
        ScenarioKind::Dnat => vec![Scenario::dnat_basic(&router_id)],
        ScenarioKind::All => vec![
            Scenario::snat_basic(&router_id),
            Scenario::dnat_basic(&router_id),
        ],
    };
    for scenario in &mut scenarios {
        scenario.fixture = fixture.clone();
    }

    let runner = ScenarioRunner::builder().client(client).build()?;
    let mut reports = Vec::with_capacity(scenarios.len());
    for scenario in &scenarios {
        info!(scenario = %scenario.name, router_id = %router_id, "running scenario");
        reports.push(runner.run(scenario).await);
    }

    let payload = RunReport::from_reports(reports);
    writer.render(&payload)?;

    if !payload.passed {
        let failed: Vec<&str> = payload
            .scenarios
            .iter()
            .filter(|r| !r.passed())
            .map(|r| r.name.as_str())
            .collect();
        return Err(CliError::ScenarioFailed(failed.join(", ")));
    }
    Ok(())
}

#[derive(Serialize)]
pub struct RunReport {
    pub passed: bool,
    pub scenarios: Vec<ScenarioReport>,
}

impl RunReport {
    fn from_reports(scenarios: Vec<ScenarioReport>) -> Self {
        Self {
            passed: scenarios.iter().all(ScenarioReport::passed),
            scenarios,
        }
    }
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        for report in &self.scenarios {
            writeln!(
                w,
                "{} [{}]",
                report.name,
                if report.passed() { "PASS" } else { "FAIL" }
            )?;
            for step in &report.steps {
                match &step.status {
                    StepStatus::Passed => {
                        writeln!(
                            w,
                            "  {:<16} ok    {:>6}ms",
                            step.step.to_string(),
                            step.elapsed.as_millis()
                        )?;
                    }
                    StepStatus::Failed(reason) => {
                        writeln!(
                            w,
                            "  {:<16} FAIL  {:>6}ms  {}",
                            step.step.to_string(),
                            step.elapsed.as_millis(),
                            reason
                        )?;
                    }
                }
            }
        }
        writeln!(
            w,
            "result: {}",
            if self.passed { "passed" } else { "failed" }
        )
    }
}
