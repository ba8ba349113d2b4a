//! DocForge — upload a text file, get a formatted Word document back.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod client;
mod error;
mod routes;
mod state;
mod sweeper;

use client::ApiClient;
use state::AppState;

const WAIT_TIMEOUT: Duration = Duration::from_secs(60);

fn print_usage() {
    println!("DocForge — text to DOCX conversion service");
    println!();
    println!("Usage: docforge [command]");
    println!();
    println!("Commands:");
    println!("  (none) | serve                                   Start the server");
    println!("  submit <file> --issuer-id <id> --email <email>   Upload a file and wait for the result");
    println!("  status <job-id>                                  Show a job's status");
    println!("  download <job-id> [output]                       Save a completed job's document");
    println!("  help                                             Show this help message");
    println!();
    println!("Client commands talk to DOCFORGE_SERVER_URL (default {}).", client::DEFAULT_SERVER_URL);
}

/// Value following `flag` in `args`, if any.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        None | Some("serve") => serve().await,
        Some("submit") => {
            let (Some(file), Some(issuer_id), Some(email)) = (
                args.get(2).filter(|a| !a.starts_with("--")),
                flag_value(&args, "--issuer-id"),
                flag_value(&args, "--email"),
            ) else {
                eprintln!("Usage: docforge submit <file> --issuer-id <id> --email <email>");
                std::process::exit(1);
            };
            submit(&PathBuf::from(file), issuer_id, email).await
        }
        Some("status") => {
            let Some(job_id) = args.get(2) else {
                eprintln!("Usage: docforge status <job-id>");
                std::process::exit(1);
            };
            let job = ApiClient::from_env().get_job_status(job_id).await?;
            println!("{} {} — {}", job.job_id, job.status, job.message);
            if let Some(err) = job.error {
                println!("error: {}", err);
            }
            Ok(())
        }
        Some("download") => {
            let Some(job_id) = args.get(2) else {
                eprintln!("Usage: docforge download <job-id> [output]");
                std::process::exit(1);
            };
            let output = args
                .get(3)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(format!("{}.docx", job_id)));
            let size = ApiClient::from_env().download(job_id, &output).await?;
            println!("Saved {} ({} bytes)", output.display(), size);
            Ok(())
        }
        Some("--help") | Some("-h") | Some("help") => {
            print_usage();
            Ok(())
        }
        Some(other) => {
            eprintln!("Unknown command: {}. Use 'docforge help' for usage.", other);
            std::process::exit(1);
        }
    }
}

async fn serve() -> anyhow::Result<()> {
    let config = docforge_core::DocForgeConfig::from_env()?;
    config.ensure_dirs()?;
    info!("Temporary storage: {}", config.temp_storage_path.display());

    let addr = config.bind_addr();
    let state = Arc::new(AppState::new(config)?);

    sweeper::start_retention_sweeper(state.clone());

    let app = routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("DocForge server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn submit(file: &std::path::Path, issuer_id: &str, email: &str) -> anyhow::Result<()> {
    let client = ApiClient::from_env();
    let job = client.upload_file(file, issuer_id, email).await?;
    println!("Job {} submitted: {}", job.job_id, job.status);

    let job = if job.is_terminal() {
        job
    } else {
        client.wait_for_completion(&job.job_id, WAIT_TIMEOUT).await?
    };

    match job.status.as_str() {
        "complete" => {
            println!("{}", job.message);
            if let Some(url) = job.download_url {
                println!("Download: {}", url);
            }
            println!("Run `docforge download {}` to save the document.", job.job_id);
            Ok(())
        }
        _ => anyhow::bail!(
            "Job {} failed: {}",
            job.job_id,
            job.error.unwrap_or(job.message)
        ),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
    info!("Shutting down gracefully...");
}
