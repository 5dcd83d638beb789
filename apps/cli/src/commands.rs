//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tenderstat_core::{PipelineOutcome, run_fetched};
use tenderstat_shared::{
    AppConfig, PipelinePolicy, SourceConfig, init_config, load_config, validate_config,
};
use tenderstat_source::{SourceClient, default_save_name, load_file, save_file};
use tracing::{info, warn};

use crate::output;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// tenderstat: yearly procurement statistics for a company.
#[derive(Parser)]
#[command(
    name = "tenderstat",
    version,
    about = "Aggregate a company's public procurement records into yearly count and value tables.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Report output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch a company's records and print its aggregate tables.
    Report {
        /// Company name; also used to match pencatatan winners.
        company: String,

        /// Read records from a saved response instead of the API.
        #[arg(short, long, conflicts_with = "save")]
        input: Option<PathBuf>,

        /// Save the fetched response (defaults to "<COMPANY>.json").
        #[arg(long, num_args = 0..=1)]
        save: Option<Option<PathBuf>>,

        /// Output format.
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,

        /// Base URL of the scrape API.
        #[arg(long, env = "TENDERSTAT_API_URL")]
        api_url: Option<String>,

        /// Emit zero columns for categories with no rows.
        #[arg(long)]
        zero_fill: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

/// Flags for `tenderstat report`.
struct ReportArgs {
    company: String,
    input: Option<PathBuf>,
    save: Option<Option<PathBuf>>,
    format: OutputFormat,
    api_url: Option<String>,
    zero_fill: bool,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "tenderstat=info",
        1 => "tenderstat=debug",
        _ => "tenderstat=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Report {
            company,
            input,
            save,
            format,
            api_url,
            zero_fill,
        } => {
            cmd_report(ReportArgs {
                company,
                input,
                save,
                format,
                api_url,
                zero_fill,
            })
            .await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_report(args: ReportArgs) -> Result<()> {
    let company = args.company.trim().to_string();
    if company.is_empty() {
        return Err(eyre!("company name must not be empty"));
    }

    let mut config = load_config()?;
    if let Some(url) = args.api_url {
        config.source.api_url = url;
    }
    if args.zero_fill {
        config.pipeline.zero_fill_empty_categories = true;
    }
    validate_config(&config)?;

    let policy = PipelinePolicy::from(&config);

    let fetched = match &args.input {
        Some(path) => {
            info!(path = %path.display(), "loading saved response");
            load_file(path)
        }
        None => fetch_with_spinner(&config, &company).await?,
    };

    if let (Some(save), Ok(body)) = (&args.save, &fetched) {
        let path = save
            .clone()
            .unwrap_or_else(|| PathBuf::from(default_save_name(&company)));
        save_response(&path, body)?;
    }

    let outcome = run_fetched(fetched, &company, &policy);
    if let PipelineOutcome::NoData { reason } = &outcome {
        warn!(company = %company, %reason, "no data");
    }

    match args.format {
        OutputFormat::Table => print!("{}", output::render_outcome(&company, &outcome)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
    }

    Ok(())
}

/// Fetch from the API while showing a spinner.
///
/// Client construction errors are fatal; fetch errors are handed back so the
/// pipeline can report them as "no data".
async fn fetch_with_spinner(
    config: &AppConfig,
    company: &str,
) -> Result<tenderstat_shared::Result<Value>> {
    let client = SourceClient::new(&SourceConfig::from(config))?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!("Fetching records for {company} from {}", client.endpoint()));

    let fetched = client.fetch(company).await;
    spinner.finish_and_clear();

    Ok(fetched)
}

fn save_response(path: &Path, body: &Value) -> Result<()> {
    save_file(path, body)?;
    println!("Response saved to: {}", path.display());
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
