//! `natcheck render` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use natcheck_core::config::NatcheckConfig;
use natcheck_core::error::{ConfigError, NatcheckError};
use natcheck_verifier::Scenario;

use crate::cli::{RenderArgs, RenderPhase, ScenarioKind};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `render` command.
///
/// Purely offline: renders the scenario's configuration text without
/// contacting the manager. A missing configuration file falls back to
/// defaults so the templates can be inspected anywhere.
pub async fn execute(
    args: RenderArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = match NatcheckConfig::load(config_path).await {
        Ok(config) => config,
        Err(NatcheckError::Config(ConfigError::FileNotFound { .. })) => {
            debug!(path = %config_path.display(), "no configuration file, using defaults");
            NatcheckConfig::default()
        }
        Err(e) => return Err(e.into()),
    };

    let router_id = args
        .router_id
        .unwrap_or_else(|| config.verify.router_id.clone());
    let router_id = if router_id.is_empty() {
        // Offline rendering does not need a real identifier.
        "LOGICAL-ROUTER-ID".to_owned()
    } else {
        router_id
    };

    let mut scenario = match args.scenario {
        ScenarioKind::Snat => Scenario::snat_basic(&router_id),
        ScenarioKind::Dnat => Scenario::dnat_basic(&router_id),
        ScenarioKind::All => {
            return Err(CliError::Command(
                "render requires a single scenario (snat or dnat)".to_owned(),
            ));
        }
    };
    scenario.fixture = super::fixture_from(&config);

    let (phase, text) = match args.phase {
        RenderPhase::Create => ("create", scenario.render_create()?),
        RenderPhase::Update => ("update", scenario.render_update()?),
    };

    let payload = RenderedConfig {
        scenario: scenario.name.clone(),
        phase: phase.to_owned(),
        text,
    };
    writer.render(&payload)?;
    Ok(())
}

#[derive(Serialize)]
pub struct RenderedConfig {
    pub scenario: String,
    pub phase: String,
    pub text: String,
}

impl Render for RenderedConfig {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        w.write_all(self.text.as_bytes())
    }
}
