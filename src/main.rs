//! Grievance desk - operator CLI over a grievance snapshot file

use anyhow::Context;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grievance_desk::{
    aggregate::{count_by_domain, count_by_status, filter, sort_by_recency},
    auth::Actor,
    config::{Args, Command},
    export,
    lifecycle::GrievanceService,
    model::GrievanceStatus,
    repository::{GrievanceStore, InMemoryRepository},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("grievance_desk={},info", log_level).into()),
        )
        .with(
            (!args.log_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
        .with(
            args.log_json
                .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Bolo Bharat - Grievance Desk");
    info!("======================================");
    info!("Data file: {}", args.data_file.display());
    info!("Administrators: {}", args.admin_email_list().join(", "));
    info!("======================================");

    let repo = Arc::new(InMemoryRepository::from_snapshot(load_snapshot(
        &args.data_file,
    )?));
    let store = GrievanceStore::new(repo.clone());
    let service = GrievanceService::new(store.clone());

    let operator_email = args
        .operator_email()
        .context("no administrator configured")?;
    let operator = Actor::admin("operator", operator_email);

    match &args.command {
        Command::Summary => {
            operator.require("view_all_grievances")?;
            let all = store.list_all().await?;
            println!("Total grievances: {}", all.len());
            println!();
            println!("By domain:");
            for (domain, count) in count_by_domain(&all) {
                println!("  {:<28} {}", domain, count);
            }
            println!();
            println!("By status:");
            for (status, count) in count_by_status(&all) {
                println!("  {:<28} {}", status, count);
            }
        }
        Command::List { .. } => {
            operator.require("view_all_grievances")?;
            let criteria = args.list_filter().unwrap_or_default();
            let all = sort_by_recency(store.list_all().await?);
            let matching = filter(&all, &criteria);
            for g in &matching {
                let date = g
                    .submitted_at()
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}/{}  [{}]  {}  {}  ({} votes, {})",
                    g.submitter_id,
                    g.id,
                    g.effective_status(),
                    g.domain,
                    g.problem_title,
                    g.vote_count(),
                    date
                );
            }
            info!("{} of {} grievances matched", matching.len(), all.len());
        }
        Command::Export { .. } => {
            operator.require("export_csv")?;
            let all = store.list_all().await?;
            let path = export::write_export(&args.export_target(), &all)?;
            println!("{}", path.display());
        }
        Command::SetStatus {
            submitter,
            id,
            status,
        } => {
            let status: GrievanceStatus = status
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            let updated = service
                .change_status(&operator, submitter, id, status)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!(
                "{}/{} is now {} ({} transitions recorded)",
                updated.submitter_id,
                updated.id,
                updated.effective_status(),
                updated.status_history.len()
            );
        }
    }

    if args.is_mutation() {
        let body = serde_json::to_string_pretty(&repo.snapshot())?;
        std::fs::write(&args.data_file, body)
            .with_context(|| format!("writing {}", args.data_file.display()))?;
        info!("Saved snapshot to {}", args.data_file.display());
    }

    Ok(())
}

/// Read the document tree; a missing file starts from an empty tree
fn load_snapshot(path: &Path) -> anyhow::Result<serde_json::Value> {
    match std::fs::read_to_string(path) {
        Ok(body) => serde_json::from_str(&body)
            .with_context(|| format!("parsing {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("{} not found, starting with an empty tree", path.display());
            Ok(serde_json::Value::Object(Default::default()))
        }
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}
