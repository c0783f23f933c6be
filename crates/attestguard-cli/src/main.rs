// crates/attestguard-cli/src/main.rs
// ============================================================================
// Module: Attestguard CLI Entry Point
// Description: Command dispatcher for serving C10, one-off verification, and
//              direct task/cron operations (spec.md §4.10, §6).
// Purpose: Give operators a single `attestguard` binary covering everything
//          the HTTP surface exposes, plus a synchronous `verify` escape
//          hatch that bypasses the queue entirely.
// Dependencies: attestguard-api, attestguard-config, attestguard-core,
//              attestguard-queue, attestguard-service, attestguard-store,
//              attestguard-sync, clap, tokio, tracing, tracing-subscriber
// ============================================================================

//! ## Overview
//! Grounded on `decision-gate-cli::main.rs`'s `Cli`/`Commands` dispatch and
//! `#[tokio::main(flavor = "multi_thread")] async fn main() -> ExitCode`
//! shape. The teacher's i18n catalog (`decision_gate_cli::t!`) is not
//! carried over: spec.md has no localization requirement, and it sits
//! outside the ambient-stack categories (logging, error handling, config,
//! test tooling) this transformation is obliged to keep.

mod error;
mod wiring;

use std::process::ExitCode;
use std::sync::Arc;

use attestguard_core::AppId;
use attestguard_core::TaskId;
use attestguard_core::TaskStatus;
use attestguard_core::VerificationFlags;
use attestguard_core::VerificationTask;
use attestguard_queue::build_app_config;
use clap::Args;
use clap::Parser;
use clap::Subcommand;

use crate::error::CliError;
use crate::wiring::Deployment;

type CliResult<T> = Result<T, CliError>;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "attestguard", arg_required_else_help = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the HTTP API (C10) alongside the worker pool (C7) and the two
    /// analytics-sync tick loops (C9).
    Serve,
    /// Direct task operations against C6/C7, bypassing the HTTP surface.
    Task {
        /// Selected task subcommand.
        #[command(subcommand)]
        command: TaskCommand,
    },
    /// Runs one verification synchronously against a known application,
    /// without touching the queue (spec.md §4.5 called directly).
    Verify(VerifyCommand),
    /// Direct cron-trigger operations against C9/C7, bypassing the HTTP
    /// surface's bearer-token check (spec.md §6 "Auth").
    Cron {
        /// Selected cron subcommand.
        #[command(subcommand)]
        command: CronCommand,
    },
}

/// Task subcommands (spec.md §4.6/§4.7).
#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// Enqueues a new verification task for an application.
    Create(TaskCreateCommand),
    /// Cancels a `pending` task.
    Cancel(TaskIdCommand),
    /// Re-enqueues a `failed` task under a fresh id.
    Retry(TaskIdCommand),
    /// Prints one task and, when present, its uploaded report.
    Get(TaskIdCommand),
}

/// Arguments for `task create`.
#[derive(Args, Debug)]
struct TaskCreateCommand {
    /// Application id the task verifies.
    #[arg(long)]
    app_id: String,
    /// Comma-separated verification-flag names; defaults to every flag.
    #[arg(long)]
    flags: Option<String>,
    /// Opaque JSON metadata stored verbatim on the task row.
    #[arg(long)]
    metadata: Option<String>,
}

/// Arguments shared by every task subcommand that targets one task id.
#[derive(Args, Debug)]
struct TaskIdCommand {
    /// Task id.
    #[arg(long)]
    id: String,
}

/// Arguments for `verify`.
#[derive(Args, Debug)]
struct VerifyCommand {
    /// Application id to verify.
    #[arg(long)]
    app_id: String,
    /// Comma-separated verification-flag names; defaults to every flag.
    #[arg(long)]
    flags: Option<String>,
}

/// Cron subcommands (spec.md §4.9 profile/app sync, §5 reap).
#[derive(Subcommand, Debug)]
enum CronCommand {
    /// Runs one profile-sync tick.
    ProfileSync,
    /// Runs one app-sync tick.
    AppSync,
    /// Reaps stale `active` tasks past their grace period.
    Reap,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run() -> CliResult<u8> {
    let cli = Cli::parse();
    let config = attestguard_config::AttestguardConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(config.rust_log.clone()))
        .init();

    match cli.command {
        Commands::Serve => command_serve(config).await,
        Commands::Task { command } => command_task(config, command),
        Commands::Verify(command) => command_verify(config, command),
        Commands::Cron { command } => command_cron(config, command),
    }
}

/// Runs the HTTP API, worker pool, and both sync-tick loops together until a
/// `SIGINT`/`SIGTERM` is observed.
async fn command_serve(config: attestguard_config::AttestguardConfig) -> CliResult<u8> {
    let addr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|err| CliError::Validation(format!("invalid bind address: {err}")))?;

    let deployment = Deployment::build(&config)?;
    let state = Arc::new(attestguard_api::ApiState {
        store: Arc::clone(&deployment.store),
        blob: Arc::clone(&deployment.blob),
        queue: Arc::clone(&deployment.queue),
        sync: Arc::clone(&deployment.sync),
        cron_api_key: config.auth.cron_api_key.clone(),
    });
    let router = attestguard_api::build_router(state);

    let shutdown = Arc::new(tokio::sync::Notify::new());
    let queue = Arc::clone(&deployment.queue);
    let queue_shutdown = Arc::clone(&shutdown);
    let worker_loop = tokio::spawn(async move { queue.run(&queue_shutdown).await });

    let sync = Arc::clone(&deployment.sync);
    let profile_interval_ms = config.sync.profile_interval_ms;
    let app_interval_ms = config.sync.app_interval_ms;
    let sync_loop = tokio::spawn(async move { run_sync_ticks(sync, profile_interval_ms, app_interval_ms).await });

    tokio::select! {
        result = attestguard_api::serve(addr, router) => result.map_err(|err| CliError::Unavailable(err.to_string()))?,
        () = tokio::signal::ctrl_c().map(|_| ()) => {
            tracing::info!("shutdown signal received");
        }
    }

    shutdown.notify_waiters();
    sync_loop.abort();
    let _ = worker_loop.await;
    Ok(0)
}

/// Drives both analytics-sync cron loops on their configured intervals
/// until aborted.
async fn run_sync_ticks(sync: Arc<attestguard_sync::SyncEngine>, profile_interval_ms: u64, app_interval_ms: u64) {
    let mut profile_tick = tokio::time::interval(std::time::Duration::from_millis(profile_interval_ms));
    let mut app_tick = tokio::time::interval(std::time::Duration::from_millis(app_interval_ms));
    loop {
        tokio::select! {
            _ = profile_tick.tick() => {
                if let Err(err) = sync.run_profile_sync_once() {
                    tracing::warn!(error = %err, "profile sync tick failed");
                }
            }
            _ = app_tick.tick() => {
                if let Err(err) = sync.run_app_sync_once() {
                    tracing::warn!(error = %err, "app sync tick failed");
                }
            }
        }
    }
}

/// Dispatches direct task operations.
fn command_task(config: attestguard_config::AttestguardConfig, command: TaskCommand) -> CliResult<u8> {
    let deployment = Deployment::build(&config)?;
    match command {
        TaskCommand::Create(args) => task_create(&deployment, &config, &args),
        TaskCommand::Cancel(args) => task_cancel(&deployment, &args),
        TaskCommand::Retry(args) => task_retry(&deployment, &args),
        TaskCommand::Get(args) => task_get(&deployment, &args),
    }
}

fn parse_flags(config: &attestguard_config::AttestguardConfig, flags: Option<&str>) -> VerificationFlags {
    match flags {
        Some(csv) => VerificationFlags::from_csv(csv),
        None => config.default_flags,
    }
}

fn task_create(
    deployment: &Deployment,
    config: &attestguard_config::AttestguardConfig,
    args: &TaskCreateCommand,
) -> CliResult<u8> {
    let app_id = AppId::new(args.app_id.clone());
    if deployment.store.get_app(&app_id)?.is_none() {
        return Err(CliError::Validation(format!("unknown app id {}", args.app_id)));
    }
    let metadata = args
        .metadata
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(|err| CliError::Validation(format!("invalid metadata JSON: {err}")))?;
    let flags = parse_flags(config, args.flags.as_deref());
    let task_id = deployment.queue.add_task(&app_id, metadata, flags)?;
    println!("{}", serde_json::json!({ "taskId": task_id.as_str() }));
    Ok(0)
}

fn task_cancel(deployment: &Deployment, args: &TaskIdCommand) -> CliResult<u8> {
    deployment.queue.remove_job(&TaskId::new(args.id.clone()))?;
    println!("{}", serde_json::json!({ "cancelled": args.id }));
    Ok(0)
}

fn task_retry(deployment: &Deployment, args: &TaskIdCommand) -> CliResult<u8> {
    let task_id = TaskId::new(args.id.clone());
    let task = deployment
        .store
        .get_task(&task_id)?
        .ok_or_else(|| CliError::Validation(format!("task {} not found", args.id)))?;
    if task.status != TaskStatus::Failed {
        return Err(CliError::Validation(format!("task {} is not failed", args.id)));
    }
    let app_id = task
        .app_id
        .ok_or_else(|| CliError::Validation("task has no app_id".to_string()))?;
    let new_id = deployment.queue.add_task(&app_id, task.app_metadata.clone(), task.flags)?;
    println!("{}", serde_json::json!({ "taskId": new_id.as_str() }));
    Ok(0)
}

fn task_get(deployment: &Deployment, args: &TaskIdCommand) -> CliResult<u8> {
    let task_id = TaskId::new(args.id.clone());
    let task = deployment
        .store
        .get_task(&task_id)?
        .ok_or_else(|| CliError::Validation(format!("task {} not found", args.id)))?;
    let report = task
        .blob_ref
        .as_ref()
        .map(|blob_ref| deployment.blob.download_json(&blob_ref.key))
        .transpose()?;
    println!("{}", serde_json::json!({ "task": task, "report": report }));
    Ok(0)
}

/// Runs one verification synchronously and reports it on stdout, returning
/// exit code `0` for an executed report and `1` when `success == false`
/// (kept separate from the `2`/`3`/`4` wrapper codes, mirroring
/// `decision-gate-cli`'s runpack-verify `ExitCode::SUCCESS`/`FAILURE`
/// convention).
fn command_verify(config: attestguard_config::AttestguardConfig, args: VerifyCommand) -> CliResult<u8> {
    let deployment = Deployment::build(&config)?;
    let app_id = AppId::new(args.app_id.clone());
    let app = deployment
        .store
        .get_app(&app_id)?
        .ok_or_else(|| CliError::Validation(format!("unknown app id {}", args.app_id)))?;
    let flags = parse_flags(&config, args.flags.as_deref());
    let placeholder_task = VerificationTask::new_pending(TaskId::new("cli-verify".to_string()), Some(app_id), flags);
    let app_config = build_app_config(&app, &placeholder_task)?;
    let report = attestguard_service::verify(&deployment.clients, app_config, Some(flags));
    let success = report.success;
    println!("{}", serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string()));
    Ok(u8::from(!success))
}

/// Dispatches direct cron operations.
fn command_cron(config: attestguard_config::AttestguardConfig, command: CronCommand) -> CliResult<u8> {
    let deployment = Deployment::build(&config)?;
    match command {
        CronCommand::ProfileSync => {
            deployment.sync.run_profile_sync_once()?;
        }
        CronCommand::AppSync => {
            deployment.sync.run_app_sync_once()?;
        }
        CronCommand::Reap => {
            let reaped = deployment.queue.reap_stale_tasks()?;
            println!("{}", serde_json::json!({ "reaped": reaped }));
        }
    }
    Ok(0)
}
