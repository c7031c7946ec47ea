//! WHOIS Check CLI Application
//!
//! A command-line interface for looking up domain registration data across
//! several WHOIS providers. This CLI is a thin front-end over the
//! whois-check-lib library.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use futures::StreamExt;
use serde::Serialize;
use std::process;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use whois_check_lib::{
    load_env_config, parse_duration_string, prepare_domain, CanonicalRecord, ConfigManager,
    FailureReason, FileConfig, LookupConfig, LookupState, ProviderFailure, ProviderRegistry,
    WhoisCheckError, WhoisChecker,
};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for whois-check
#[derive(Parser, Debug)]
#[command(name = "whois-check")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Look up domain registration data with automatic provider fallback")]
#[command(
    long_about = "Look up domain registration data (registrar, dates, status, name servers).\n\n\
        Providers are tried one at a time until one answers; built-in demo data is the last resort."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Domain names to look up (e.g. google.com)
    #[arg(value_name = "DOMAINS", help_heading = "Domain Selection")]
    pub domains: Vec<String>,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Enable sectioned, colored output
    #[arg(short = 'p', long = "pretty", help_heading = "Output Format")]
    pub pretty: bool,

    /// Time budget per provider (e.g. "500ms", "10s")
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Lookup")]
    pub timeout: Option<String>,

    /// Artificial delay of the demo provider
    #[arg(long = "offline-delay", value_name = "DURATION", help_heading = "Lookup")]
    pub offline_delay: Option<String>,

    /// Use only the built-in demo data (no network)
    #[arg(long = "offline", help_heading = "Lookup")]
    pub offline: bool,

    /// Fail instead of showing placeholder data for unknown domains in demo mode
    #[arg(long = "no-placeholder", help_heading = "Lookup")]
    pub no_placeholder: bool,

    /// List the active providers in trial order and exit
    #[arg(long = "list-providers", help_heading = "Lookup")]
    pub list_providers: bool,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show detailed debug information and error messages
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug)]
struct Settings {
    lookup: LookupConfig,
    registry: ProviderRegistry,
    json: bool,
    json_pretty: bool,
    pretty: bool,
}

/// Failed domains grouped by reason, in first-seen order
#[derive(Debug, Default)]
pub(crate) struct ErrorStats {
    pub(crate) by_reason: Vec<(FailureReason, Vec<String>)>,
}

impl ErrorStats {
    /// Record a failed lookup under the reason of its last provider attempt.
    fn add_error(&mut self, domain: &str, error: &WhoisCheckError) {
        let reason = error
            .last_cause()
            .map(|cause| cause.reason)
            .unwrap_or_else(|| error.reason());

        match self.by_reason.iter_mut().find(|(r, _)| *r == reason) {
            Some((_, domains)) => domains.push(domain.to_string()),
            None => self.by_reason.push((reason, vec![domain.to_string()])),
        }
    }

    fn has_errors(&self) -> bool {
        !self.by_reason.is_empty()
    }

    fn total(&self) -> usize {
        self.by_reason.iter().map(|(_, domains)| domains.len()).sum()
    }
}

/// One entry of `--json` output.
#[derive(Debug, Serialize)]
struct JsonLookup<'a> {
    domain: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<&'a CanonicalRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    offline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonError>,
}

#[derive(Debug, Serialize)]
struct JsonError {
    reason: FailureReason,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    causes: Vec<ProviderFailure>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args);

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    tracing::info!("whois-check v{} starting", env!("CARGO_PKG_VERSION"));

    match run_lookups(args).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over the flags.
fn init_logging(args: &Args) {
    let default_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    // --list-providers is self-contained
    if args.list_providers {
        return Ok(());
    }

    if args.domains.is_empty() {
        return Err("You must specify at least one domain name (e.g. google.com)".to_string());
    }

    if args.json && args.pretty {
        return Err("Cannot combine --json with --pretty".to_string());
    }

    Ok(())
}

/// Main lookup logic. Returns `Ok(false)` when any domain failed.
async fn run_lookups(args: Args) -> Result<bool, Box<dyn std::error::Error>> {
    let settings = build_settings(&args)?;

    if args.list_providers {
        ui::print_providers(&settings.registry);
        return Ok(true);
    }

    // Reject bad input before contacting any provider
    let mut domains = Vec::with_capacity(args.domains.len());
    let mut invalid = Vec::new();
    for input in &args.domains {
        match prepare_domain(input) {
            Ok(domain) => domains.push(domain),
            Err(e) => invalid.push(e.to_string()),
        }
    }
    if !invalid.is_empty() {
        return Err(invalid.join("\n").into());
    }

    let checker = WhoisChecker::with_config(settings.lookup.clone(), settings.registry.clone())?;

    let mut state = LookupState::default();
    let mut error_stats = ErrorStats::default();
    let mut json_entries: Vec<serde_json::Value> = Vec::new();
    let mut succeeded = 0usize;
    let start_time = Instant::now();

    let mut stream = checker.lookup_stream(&domains);
    for domain in &domains {
        let spinner = match spinner_message(&mut state, domain, settings.json) {
            Some(message) => ui::Spinner::start(message),
            None => None,
        };

        let next = stream.next().await;

        if let Some(s) = spinner {
            s.stop().await;
        }

        let result = match next {
            Some((_, result)) => result,
            None => Err(WhoisCheckError::internal("lookup stream ended early")),
        };

        let causes = match &result {
            Err(e) => {
                error_stats.add_error(domain, e);
                match e {
                    WhoisCheckError::AllProvidersFailed { causes, .. } => causes.clone(),
                    _ => Vec::new(),
                }
            }
            Ok(_) => Vec::new(),
        };

        state.finish(result);

        match &state {
            LookupState::Success(outcome) => {
                succeeded += 1;
                if settings.json {
                    json_entries.push(serde_json::to_value(JsonLookup {
                        domain,
                        record: Some(&outcome.record),
                        source: Some(outcome.provider.as_str()),
                        offline: outcome.offline,
                        duration_ms: Some(outcome.duration.as_millis()),
                        error: None,
                    })?);
                } else {
                    ui::print_record(outcome, settings.pretty, args.debug);
                }
            }
            LookupState::Error {
                domain,
                reason,
                message,
            } => {
                if settings.json {
                    json_entries.push(serde_json::to_value(JsonLookup {
                        domain,
                        record: None,
                        source: None,
                        offline: false,
                        duration_ms: None,
                        error: Some(JsonError {
                            reason: *reason,
                            message: message.clone(),
                            causes,
                        }),
                    })?);
                } else {
                    ui::print_failure(domain, *reason, message, args.debug);
                }
            }
            LookupState::Idle | LookupState::Loading { .. } => {}
        }
    }

    let duration = start_time.elapsed();

    if settings.json {
        let output = match json_entries.len() {
            1 => json_entries.remove(0),
            _ => serde_json::Value::Array(json_entries),
        };
        if settings.json_pretty {
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", serde_json::to_string(&output)?);
        }
    } else if domains.len() > 1 {
        ui::print_summary(domains.len(), succeeded, error_stats.total(), duration);
        if error_stats.has_errors() {
            println!();
            ui::print_error_summary(&error_stats);
        }
    }

    Ok(!error_stats.has_errors())
}

/// Build run settings from CLI arguments with config file integration.
///
/// Precedence order (highest to lowest):
/// 1. CLI arguments (explicit user input)
/// 2. Environment variables (WC_*)
/// 3. Explicit config file (--config or WC_CONFIG), else discovered files
/// 4. Built-in defaults
/// Move the state into loading for `domain`. Returns the spinner text
/// when a new lookup started and output is not JSON.
fn spinner_message(state: &mut LookupState, domain: &str, json: bool) -> Option<String> {
    if !state.begin(domain) || json {
        return None;
    }
    Some(format!("Looking up {}...", domain))
}

fn build_settings(args: &Args) -> Result<Settings, Box<dyn std::error::Error>> {
    let env_config = load_env_config();
    let config_manager = ConfigManager::new(args.verbose);

    // Step 1: config files
    let explicit_path = args.config.as_ref().or(env_config.config.as_ref());
    let file_config = match explicit_path {
        Some(path) => {
            tracing::info!(path = %path, "using explicit config file");
            config_manager
                .load_file(path)
                .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
        }
        None => match config_manager.discover_and_load() {
            Ok(file_config) => file_config,
            Err(e) => {
                tracing::warn!("config discovery failed: {}", e);
                FileConfig::default()
            }
        },
    };

    let mut lookup = file_config.apply_to(LookupConfig::default());

    // Step 2: environment variables
    lookup = env_config.apply_to(lookup);

    // Step 3: CLI arguments
    lookup = apply_cli_args(lookup, args)?;

    let registry = if args.offline {
        ProviderRegistry::offline_only()
    } else {
        file_config.registry()?.unwrap_or_default()
    };

    let output = file_config.output.unwrap_or_default();
    let json = args.json || env_config.json.or(output.json).unwrap_or(false);
    let pretty = args.pretty || env_config.pretty.or(output.pretty).unwrap_or(false);

    Ok(Settings {
        lookup,
        registry,
        json,
        json_pretty: output.json_pretty.unwrap_or(true),
        pretty: pretty && !json,
    })
}

fn apply_cli_args(
    mut config: LookupConfig,
    args: &Args,
) -> Result<LookupConfig, Box<dyn std::error::Error>> {
    if let Some(timeout) = &args.timeout {
        config.timeout = match parse_duration_string(timeout) {
            Some(d) if !d.is_zero() => d,
            _ => {
                return Err(format!(
                    "Invalid timeout '{}'. Use a non-zero value like '500ms', '10s', '1m'",
                    timeout
                )
                .into())
            }
        };
    }

    if let Some(delay) = &args.offline_delay {
        config.offline_delay = parse_duration_string(delay).ok_or_else(|| {
            format!(
                "Invalid offline delay '{}'. Use a value like '0s', '250ms', '1s'",
                delay
            )
        })?;
    }

    if args.no_placeholder {
        config.offline_placeholder = false;
    }

    Ok(config)
}
