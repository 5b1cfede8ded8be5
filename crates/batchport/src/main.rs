//! batchport - submit and manage jobs on a PBS/Torque cluster.

use batchport_cli::{Args, Command, SubmitArgs};
use batchport_config::{build_adapter, load_config};
use batchport_core::Adapter;
use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use std::fs;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(&args.config)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to load {}", args.config))?;
    let adapter = build_adapter(&config).into_diagnostic()?;

    run(adapter.as_ref(), args.command).await
}

/// Log to stderr at `warn`, or `debug` with `-v`. `RUST_LOG` wins when set.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(adapter: &dyn Adapter, command: Command) -> Result<()> {
    match command {
        Command::Submit(submit) => {
            let id = submit_job(adapter, &submit).await?;
            println!("{id}");
        }
        Command::Info { id } => print_json(&adapter.info(&id).await.into_diagnostic()?)?,
        Command::InfoAll { owner } => {
            let jobs = if owner.is_empty() {
                adapter.info_all().await
            } else {
                let owners: Vec<&str> = owner.iter().map(String::as_str).collect();
                adapter.info_where_owner(&owners).await
            };
            print_json(&jobs.into_diagnostic()?)?;
        }
        Command::Status { id } => print_json(&adapter.status(&id).await.into_diagnostic()?)?,
        Command::Hold { id } => adapter.hold(&id).await.into_diagnostic()?,
        Command::Release { id } => adapter.release(&id).await.into_diagnostic()?,
        Command::Delete { id } => adapter.delete(&id).await.into_diagnostic()?,
    }
    Ok(())
}

async fn submit_job(adapter: &dyn Adapter, submit: &SubmitArgs) -> Result<String> {
    let content = fs::read_to_string(&submit.script)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", submit.script))?;
    let script = submit.to_script(content);
    adapter
        .submit(&script, &submit.dependencies())
        .await
        .into_diagnostic()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{json}");
    Ok(())
}
