//! natcheck CLI 진입점
//!
//! 인자 파싱, 로깅 초기화, 서브커맨드 디스패치, 종료 코드 매핑을
//! 담당합니다. 실제 동작은 `commands` 모듈의 핸들러에 있습니다.

mod cli;
mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use natcheck_core::config::NatcheckConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 로깅 부트스트랩: CLI 플래그가 설정 파일보다 우선합니다.
    // 설정 파일이 없거나 깨졌으면 기본값으로 초기화하고, 실제 에러는
    // 서브커맨드 핸들러가 다시 로드할 때 보고합니다.
    let general = NatcheckConfig::from_file(&cli.config)
        .await
        .map(|c| c.general)
        .unwrap_or_default();
    let level = cli.log_level.clone().unwrap_or(general.log_level);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr);
    if general.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }

    tracing::debug!(config = %cli.config.display(), "natcheck starting");

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);
    let config_path = cli.config.as_path();

    match cli.command {
        Commands::Run(args) => commands::run::execute(args, config_path, &writer).await,
        Commands::Render(args) => commands::render::execute(args, config_path, &writer).await,
        Commands::Check(args) => commands::check::execute(args, config_path, &writer).await,
        Commands::Ping => commands::ping::execute(config_path, &writer).await,
        Commands::Config(args) => commands::config::execute(args, config_path, &writer).await,
    }
}
