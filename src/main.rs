use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use ashby_screen::ashby::{ApiError, HttpCaller, ListApplicationsOpts};
use ashby_screen::config::Config;
use ashby_screen::fetch::{self, ScreenRequest};
use ashby_screen::output;
use ashby_screen::screening::{validate_rubric, Tier, DEFAULT_RUBRIC};

const EXIT_SUCCESS: i32 = 0;
const EXIT_AUTH: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;
/// 128 + SIGINT
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a job's applications, score and rank them
    Screen {
        /// Ashby job id
        #[arg(long)]
        job_id: String,

        /// Application status to screen (defaults to Active)
        #[arg(long)]
        status: Option<String>,

        /// Maximum applications to fetch (0 = all)
        #[arg(long, default_value_t = 0)]
        limit: usize,

        /// Only list candidates at or above this tier: strong, moderate, weak, no_signal
        #[arg(long)]
        min_tier: Option<Tier>,

        /// Re-fetch each application with form submissions before scoring
        #[arg(long)]
        enrich: bool,

        /// Enrichment requests in flight at once
        #[arg(long)]
        concurrency: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Score application records saved as JSON (no API key needed)
    ScreenFile {
        /// JSON file: an array of applications, {"applications": [...]}, or one
        /// application. Reads stdin when omitted or "-".
        path: Option<PathBuf>,

        #[arg(long)]
        min_tier: Option<Tier>,

        #[arg(long)]
        json: bool,
    },
    /// Fetch and score a single application, with a per-category breakdown
    ScreenApplication {
        application_id: String,

        #[arg(long)]
        json: bool,
    },
    /// List raw application records as JSON
    Applications {
        #[arg(long)]
        job_id: Option<String>,

        #[arg(long)]
        status: Option<String>,

        /// Maximum applications to fetch (0 = all); ignored with --cursor
        #[arg(long, default_value_t = 0)]
        limit: usize,

        /// Fetch the single page at this cursor and print the next one
        #[arg(long)]
        cursor: Option<String>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "ashby-screen")]
#[command(about = "Screen Ashby applicants by weighted keyword scoring", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/ashby-screen/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();
    let start_time = Instant::now();

    if let Err(e) = ashby_screen::telemetry::init(cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    let config_path = cli.config.map(PathBuf::from);
    let config = match ashby_screen::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate rubric at startup
    if let Err(errors) = validate_rubric(DEFAULT_RUBRIC) {
        eprintln!("Rubric errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling outstanding requests");
            interrupt.cancel();
        }
    });

    let result = match cli.command {
        Commands::Screen {
            job_id,
            status,
            limit,
            min_tier,
            enrich,
            concurrency,
            json,
        } => {
            let client = connect_or_exit(&config);
            let request = ScreenRequest {
                job_id,
                status: status.or_else(|| config.screening.status.clone()),
                limit,
                min_tier: min_tier.or(config.screening.min_tier),
                enrich: enrich || config.screening.enrich,
                enrich_concurrency: concurrency.unwrap_or(config.screening.enrich_concurrency),
            };
            run_screen(&client, &request, json, &cancel).await
        }
        Commands::ScreenFile {
            path,
            min_tier,
            json,
        } => run_screen_file(path.as_deref(), min_tier.or(config.screening.min_tier), json),
        Commands::ScreenApplication {
            application_id,
            json,
        } => {
            let client = connect_or_exit(&config);
            run_screen_application(&client, &application_id, json, &cancel).await
        }
        Commands::Applications {
            job_id,
            status,
            limit,
            cursor,
        } => {
            let client = connect_or_exit(&config);
            let opts = ListApplicationsOpts {
                job_id,
                status,
                limit,
                cursor,
                ..Default::default()
            };
            run_applications(&client, &opts, &cancel).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code_for(&e));
    }

    tracing::debug!(elapsed = ?start_time.elapsed(), "done");
    std::process::exit(EXIT_SUCCESS);
}

/// Read the API key and build the HTTP caller, exiting on failure
fn connect_or_exit(config: &Config) -> HttpCaller {
    let Some(api_key) = ashby_screen::credentials::get_api_key_from_env() else {
        eprintln!(
            "No Ashby API key found. Set {} (or {}).",
            ashby_screen::credentials::ENV_API_KEY_VAR,
            ashby_screen::credentials::ENV_API_KEY_FALLBACK_VAR
        );
        std::process::exit(EXIT_AUTH);
    };

    match ashby_screen::ashby::create_client(&api_key, &config.api) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    }
}

async fn run_screen(
    client: &HttpCaller,
    request: &ScreenRequest,
    json: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let output = fetch::screen_applications(client, request, DEFAULT_RUBRIC, cancel).await?;
    print_screen_output(&output, json)
}

async fn run_screen_application(
    client: &HttpCaller,
    application_id: &str,
    json: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let record = fetch::screen_application(client, application_id, DEFAULT_RUBRIC, cancel).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        let use_colors = output::should_use_colors();
        println!("{}", output::format_candidate_detail(&record, use_colors));
    }
    Ok(())
}

async fn run_applications(
    client: &HttpCaller,
    opts: &ListApplicationsOpts,
    cancel: &CancellationToken,
) -> Result<()> {
    let result = ashby_screen::ashby::list_applications(client, opts, cancel)
        .await
        .context("Failed to list applications")?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run_screen_file(path: Option<&Path>, min_tier: Option<Tier>, json: bool) -> Result<()> {
    let records = match path.filter(|p| p.as_os_str() != "-") {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            fetch::records_from_reader(std::io::BufReader::new(file))
                .with_context(|| format!("Failed to load applications from {}", path.display()))?
        }
        None => fetch::records_from_reader(std::io::stdin().lock())
            .context("Failed to load applications from stdin")?,
    };

    tracing::info!(count = records.len(), "loaded applications");

    let output = fetch::screen_records(&records, DEFAULT_RUBRIC, min_tier);
    print_screen_output(&output, json)
}

fn print_screen_output(screen: &fetch::ScreenOutput, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(screen)?);
        return Ok(());
    }

    let use_colors = output::should_use_colors();
    println!("{}", output::format_screen_table(&screen.candidates, use_colors));
    eprintln!();
    eprintln!("{}", output::format_summary(screen, use_colors));
    Ok(())
}

/// Auth failures exit 1, interrupts 130, other remote failures 2, and
/// anything else (bad input files, missing arguments) 4.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.chain().find_map(|cause| cause.downcast_ref::<ApiError>()) {
        Some(api) if api.is_cancelled() => EXIT_INTERRUPTED,
        Some(api) if api.is_auth() => EXIT_AUTH,
        Some(_) => EXIT_NETWORK,
        None => EXIT_CONFIG,
    }
}
