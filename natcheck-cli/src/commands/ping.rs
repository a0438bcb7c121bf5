//! `natcheck ping` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use natcheck_core::config::NatcheckConfig;
use natcheck_verifier::ManagerClient;

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `ping` command.
pub async fn execute(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    let config = NatcheckConfig::load(config_path).await?;
    let client = super::manager_client(&config)?;

    client.ping().await?;

    let payload = PingReport {
        endpoint: config.manager.endpoint.clone(),
        reachable: true,
    };
    writer.render(&payload)?;
    Ok(())
}

#[derive(Serialize)]
pub struct PingReport {
    pub endpoint: String,
    pub reachable: bool,
}

impl Render for PingReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "manager at {} is reachable", self.endpoint)
    }
}
