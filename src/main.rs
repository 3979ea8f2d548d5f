//! docdesk command-line interface.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use docdesk::display::{ConsoleNotifier, ConsoleResultsView};
use docdesk::models::{AnalysisReport, SearchFilter, UploadFile};
use docdesk::{
    load_settings, ApiClient, DocumentApi, PollConfig, PollOutcome, SearchService,
    UploadCoordinator,
};

#[derive(Parser)]
#[command(name = "docdesk", version, about = "Upload documents for analysis and search the results")]
struct Cli {
    /// Base URL of the document service
    #[arg(long, env = "DOCDESK_API_ENDPOINT", global = true)]
    api_endpoint: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a PDF, DOCX or TXT file and wait for its analysis
    Upload {
        /// File to upload
        file: PathBuf,

        /// MIME type to send instead of guessing from the extension
        #[arg(long)]
        content_type: Option<String>,

        /// Return as soon as the file is stored
        #[arg(long)]
        no_wait: bool,
    },

    /// Show the analysis status of an uploaded document
    Status {
        document_id: String,

        /// Keep checking until analysis completes
        #[arg(long)]
        watch: bool,
    },

    /// Search analyzed documents
    Search {
        /// Keywords to look for
        query: Option<String>,

        /// Document type (season_report, player_stats, draft_report,
        /// contract_news, stadium_report) or "all"
        #[arg(short = 't', long = "type", default_value = "all")]
        doc_type: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = load_settings().await;
    if let Some(endpoint) = cli.api_endpoint {
        settings.api_endpoint = endpoint;
    }
    tracing::debug!(endpoint = %settings.api_endpoint, "Using document service");

    let api: Arc<dyn DocumentApi> = Arc::new(
        ApiClient::new(&settings)
            .with_context(|| format!("Invalid API endpoint '{}'", settings.api_endpoint))?,
    );

    match cli.command {
        Commands::Upload {
            file,
            content_type,
            no_wait,
        } => {
            let upload = UploadFile::from_path(&file, content_type.as_deref())
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let notifier = Arc::new(ConsoleNotifier::new());
            let coordinator =
                UploadCoordinator::new(api, notifier.clone(), PollConfig::from(&settings));

            if no_wait {
                return Ok(match coordinator.upload(&upload).await {
                    Ok(document_id) => {
                        println!("{}", document_id);
                        ExitCode::SUCCESS
                    }
                    Err(_) => ExitCode::FAILURE,
                });
            }

            let handle = match coordinator.submit(&upload).await {
                Ok(handle) => handle,
                // Already reported through the notifier
                Err(_) => return Ok(ExitCode::FAILURE),
            };

            notifier.start_spinner(&format!(
                "Waiting for analysis of {}",
                handle.document_id()
            ));
            cancel_on_ctrl_c(handle.cancellation_token());

            let document_id = handle.document_id().to_string();
            let outcome = handle.wait().await;
            notifier.finish_spinner();
            Ok(report_outcome(&document_id, outcome))
        }

        Commands::Status { document_id, watch } => {
            let notifier = Arc::new(ConsoleNotifier::new());
            let poll_config = PollConfig {
                initial_delay: Duration::ZERO,
                ..PollConfig::from(&settings)
            };
            let coordinator = UploadCoordinator::new(api, notifier.clone(), poll_config);

            if !watch {
                let report = coordinator
                    .check_status(&document_id)
                    .await
                    .with_context(|| format!("Failed to get status of {}", document_id))?;
                println!("{}: {}", document_id, report.status);
                print_analysis(&report)?;
                return Ok(ExitCode::SUCCESS);
            }

            let token = CancellationToken::new();
            cancel_on_ctrl_c(token.clone());
            notifier.start_spinner(&format!("Waiting for analysis of {}", document_id));
            let outcome = coordinator.poll_status(&document_id, &token).await;
            notifier.finish_spinner();
            Ok(report_outcome(&document_id, outcome))
        }

        Commands::Search { query, doc_type } => {
            let filter: SearchFilter = match doc_type.parse() {
                Ok(filter) => filter,
                Err(never) => match never {},
            };
            if let SearchFilter::Type(t) = &filter {
                if !t.is_known() {
                    tracing::warn!("Unknown document type '{}', searching anyway", t);
                }
            }

            let service = SearchService::new(api, Arc::new(ConsoleResultsView::new()));
            service
                .search(query.as_deref().unwrap_or_default(), &filter)
                .await;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "docdesk=debug" } else { "docdesk=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
}

fn report_outcome(document_id: &str, outcome: PollOutcome) -> ExitCode {
    match outcome {
        PollOutcome::Completed(report) => match print_analysis(&report) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("Failed to print analysis: {}", e);
                ExitCode::FAILURE
            }
        },
        PollOutcome::Abandoned { .. } => ExitCode::FAILURE,
        PollOutcome::Failed(reason) => {
            eprintln!("Stopped checking {}: {}", document_id, reason);
            ExitCode::FAILURE
        }
        PollOutcome::Cancelled => {
            eprintln!(
                "Stopped waiting. Check again with: docdesk status {} --watch",
                document_id
            );
            ExitCode::from(130)
        }
    }
}

fn print_analysis(report: &AnalysisReport) -> anyhow::Result<()> {
    if let Some(analysis) = &report.analysis {
        println!("{}", serde_json::to_string_pretty(analysis)?);
    }
    Ok(())
}
