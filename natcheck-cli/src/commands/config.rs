//! `natcheck config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use natcheck_core::config::NatcheckConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show => execute_show(config_path, writer).await,
    }
}

/// Attempts to load and validate the configuration file, reporting any
/// errors.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match NatcheckConfig::load(config_path).await {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }
    Ok(())
}

/// Loads and displays the effective configuration (file + env overrides
/// + defaults). The manager password is always redacted.
async fn execute_show(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let mut config = NatcheckConfig::load(config_path).await?;
    redact_credentials(&mut config);

    let report = ConfigShowReport {
        source: config_path.display().to_string(),
        config,
    };
    writer.render(&report)?;
    Ok(())
}

fn redact_credentials(config: &mut NatcheckConfig) {
    if !config.manager.password.is_empty() {
        config.manager.password = "<redacted>".to_owned();
    }
}

#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.valid {
            writeln!(w, "{}: configuration is valid", self.source)
        } else {
            writeln!(w, "{}: configuration is INVALID", self.source)?;
            for error in &self.errors {
                writeln!(w, "  - {error}")?;
            }
            Ok(())
        }
    }
}

#[derive(Serialize)]
pub struct ConfigShowReport {
    pub source: String,
    pub config: NatcheckConfig,
}

impl Render for ConfigShowReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "# effective configuration ({})", self.source)?;
        let rendered = toml::to_string_pretty(&self.config)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        w.write_all(rendered.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_replaces_password() {
        let mut config = NatcheckConfig::default();
        config.manager.password = "hunter2".to_owned();
        redact_credentials(&mut config);
        assert_eq!(config.manager.password, "<redacted>");
    }

    #[test]
    fn test_redact_leaves_empty_password() {
        let mut config = NatcheckConfig::default();
        redact_credentials(&mut config);
        assert!(config.manager.password.is_empty());
    }

    #[test]
    fn test_show_report_text_omits_secret() {
        let mut config = NatcheckConfig::default();
        config.manager.password = "hunter2".to_owned();
        redact_credentials(&mut config);

        let report = ConfigShowReport {
            source: "natcheck.toml".to_owned(),
            config,
        };
        let mut buf = Vec::new();
        report.render_text(&mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(!text.contains("hunter2"));
        assert!(text.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_validate_accepts_wellformed_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("natcheck.toml");
        std::fs::write(
            &path,
            r#"
[manager]
endpoint = "https://nsx.example.com"
username = "admin"
password = "secret"
"#,
        )
        .expect("write config");

        let writer = OutputWriter::new(crate::cli::OutputFormat::Json);
        execute_validate(&path, &writer).await.expect("valid config");
    }

    #[tokio::test]
    async fn test_validate_rejects_malformed_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("natcheck.toml");
        std::fs::write(&path, "[manager\nendpoint=").expect("write config");

        let writer = OutputWriter::new(crate::cli::OutputFormat::Json);
        let err = execute_validate(&path, &writer).await.unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_validation_report_text_lists_errors() {
        let report = ConfigValidationReport {
            source: "natcheck.toml".to_owned(),
            valid: false,
            errors: vec!["bad endpoint".to_owned()],
        };
        let mut buf = Vec::new();
        report.render_text(&mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("INVALID"));
        assert!(text.contains("bad endpoint"));
    }
}
