use std::process::ExitCode;

use anyhow::Result;
use cdnfs_cli::cli::{Cli, Commands};
use cdnfs_cli::commands::{
    exit_status, run_cp, run_exists, run_get, run_ls, run_mv, run_put, run_rm, run_rmdir,
    run_stat, run_url,
};
use cdnfs_cli::context::build_adapter;
use cdnfs_cli::telemetry;
use clap::Parser as _;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    telemetry::init_tracing(cli.verbose, cli.timing);

    let adapter = build_adapter()?;

    match cli.command {
        Commands::Put {
            local,
            remote,
            mime_type,
        } => run_put(&adapter, &local, &remote, mime_type).await?,
        Commands::Get { remote, output } => run_get(&adapter, &remote, output).await?,
        Commands::Rm { remote } => run_rm(&adapter, &remote).await?,
        Commands::Rmdir { remote } => run_rmdir(&adapter, &remote).await?,
        Commands::Mv { from, to } => run_mv(&adapter, &from, &to).await?,
        Commands::Cp { from, to } => run_cp(&adapter, &from, &to).await?,
        Commands::Ls { dir, recursive } => run_ls(&adapter, &dir, recursive).await?,
        Commands::Stat { remote } => run_stat(&adapter, &remote).await?,
        Commands::Exists { remote } => {
            let exists = run_exists(&adapter, &remote).await;
            return Ok(ExitCode::from(exit_status(exists)));
        }
        Commands::Url { remote } => run_url(&adapter, &remote)?,
    }

    Ok(ExitCode::SUCCESS)
}
