//! Command handlers -- one module per subcommand

pub mod check;
pub mod config;
pub mod ping;
pub mod render;
pub mod run;

use std::sync::Arc;

use natcheck_core::config::NatcheckConfig;
use natcheck_core::types::RouterFixture;
use natcheck_verifier::{HttpManagerClient, VerifierConfig};

use crate::error::CliError;

/// Build an HTTP manager client from the loaded configuration.
pub(crate) fn manager_client(config: &NatcheckConfig) -> Result<Arc<HttpManagerClient>, CliError> {
    let verifier_config = VerifierConfig::from_core(&config.manager);
    let client = HttpManagerClient::new(&verifier_config)?;
    Ok(Arc::new(client))
}

/// Resolve the logical router id from the CLI override or configuration.
pub(crate) fn resolve_router_id(
    config: &NatcheckConfig,
    cli_override: Option<String>,
) -> Result<String, CliError> {
    let router_id = cli_override.unwrap_or_else(|| config.verify.router_id.clone());
    if router_id.is_empty() {
        return Err(CliError::Config(
            "logical router id is not set (use --router-id or [verify].router_id)".to_owned(),
        ));
    }
    Ok(router_id)
}

/// Router fixture as declared in the configuration.
pub(crate) fn fixture_from(config: &NatcheckConfig) -> RouterFixture {
    RouterFixture {
        display_name: config.verify.router_display_name.clone(),
        edge_cluster_name: config.verify.edge_cluster_name.clone(),
    }
}
