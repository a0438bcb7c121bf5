//! `natcheck check` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use natcheck_core::config::NatcheckConfig;
use natcheck_core::types::RuleHandle;
use natcheck_verifier::{LifecycleVerifier, VerifierError};

use crate::cli::CheckArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `check` command.
///
/// One-shot existence check: reads the rule and verifies that its
/// display name matches the expected one.
pub async fn execute(
    args: CheckArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = NatcheckConfig::load(config_path).await?;
    let client = super::manager_client(&config)?;

    let handle = RuleHandle {
        id: args.rule_id.clone(),
        logical_router_id: args.router_id.clone(),
    };
    let verifier = LifecycleVerifier::new(client);

    info!(rule_id = %args.rule_id, display_name = %args.display_name, "checking rule");
    verifier
        .exists(&args.display_name, &handle)
        .await
        .map_err(map_check_error)?;

    let payload = CheckReport {
        router_id: args.router_id,
        rule_id: args.rule_id,
        display_name: args.display_name,
        exists: true,
    };
    writer.render(&payload)?;
    Ok(())
}

/// A check that ran but did not pass maps to the check-failure exit
/// code; infrastructure errors keep their own codes.
fn map_check_error(err: VerifierError) -> CliError {
    match err {
        VerifierError::Mismatch { .. }
        | VerifierError::NotFound { .. }
        | VerifierError::StillExists { .. } => CliError::CheckFailed(err.to_string()),
        other => other.into(),
    }
}

#[derive(Serialize)]
pub struct CheckReport {
    pub router_id: String,
    pub rule_id: String,
    pub display_name: String,
    pub exists: bool,
}

impl Render for CheckReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            w,
            "rule {} on router {} exists as \"{}\"",
            self.rule_id, self.router_id, self.display_name
        )
    }
}
