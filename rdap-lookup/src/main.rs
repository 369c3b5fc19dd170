//! RDAP Lookup CLI Application
//!
//! A command-line interface for looking up domain registration data over RDAP.
//! This CLI application provides a thin layer over the rdap-lookup-lib library:
//! it layers configuration, runs the lookups and prints normalized records as JSON.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use rdap_lookup_lib::{
    load_env_config, parse_timeout_string, read_domain_file, BatchPolicy, BatchResult,
    ConfigManager, FileConfig, LookupConfig, RdapLookup, MAX_REDIRECTS_LIMIT,
};
use serde_json::{json, Value};
use std::process;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for rdap-lookup
#[derive(Parser, Debug)]
#[command(name = "rdap-lookup")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Sai Dutt G.V <gvs46@protonmail.com>")]
#[command(about = "Look up normalized domain registration data over RDAP")]
#[command(
    long_about = "Look up domain registration data over RDAP.\n\nThe authoritative RDAP server is found through the IANA bootstrap registry, redirects and referrals are followed, and the answer is printed as a normalized JSON record."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Domain names or URLs to look up
    #[arg(value_name = "DOMAINS", help_heading = "Domain Selection")]
    pub domains: Vec<String>,

    /// Input file with domains (one per line, # comments)
    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        help_heading = "Domain Selection"
    )]
    pub file: Option<String>,

    /// List the TLDs with a known RDAP server and exit
    #[arg(long = "list-tlds", help_heading = "Domain Selection")]
    pub list_tlds: bool,

    /// Abort a batch at the first failed lookup
    #[arg(long = "fail-fast", help_heading = "Lookup")]
    pub fail_fast: bool,

    /// Maximum redirects/referrals followed per server (default: 5)
    #[arg(long = "max-redirects", value_name = "N", help_heading = "Lookup")]
    pub max_redirects: Option<usize>,

    /// Per-request timeout (e.g. "10s", "2m")
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Lookup")]
    pub timeout: Option<String>,

    /// IANA bootstrap file to use instead of the built-in snapshot
    #[arg(long = "bootstrap-file", value_name = "FILE", help_heading = "Lookup")]
    pub bootstrap_file: Option<String>,

    /// Print single-line JSON
    #[arg(long = "compact", help_heading = "Output Format")]
    pub compact: bool,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Effective settings after layering file, environment and CLI values.
#[derive(Debug, Clone, PartialEq)]
struct Settings {
    lookup: LookupConfig,
    pretty: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_tracing(args.verbose);

    // Validate arguments
    if let Err(e) = validate_args(&args) {
        ui::print_error(&e);
        process::exit(1);
    }

    match run(args).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            ui::print_error(&e.to_string());
            process::exit(1);
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "warn,rdap_lookup_lib=debug,rdap_lookup=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    // --list-tlds is self-contained, skip other validation
    if args.list_tlds {
        return Ok(());
    }

    if args.domains.is_empty() && args.file.is_none() {
        return Err("You must specify a domain name or a file with --file".to_string());
    }

    if let Some(max) = args.max_redirects {
        if max > MAX_REDIRECTS_LIMIT {
            return Err(format!(
                "--max-redirects must be between 0 and {}",
                MAX_REDIRECTS_LIMIT
            ));
        }
    }

    if let Some(timeout) = &args.timeout {
        if parse_timeout_string(timeout).is_none() {
            return Err(format!(
                "Invalid timeout '{}'. Use format like '5s', '30s', '2m'",
                timeout
            ));
        }
    }

    Ok(())
}

/// Main lookup logic. Returns whether every lookup succeeded.
async fn run(args: Args) -> Result<bool, Box<dyn std::error::Error>> {
    let settings = build_settings(&args)?;
    debug!(?settings, "Effective configuration");

    let lookup = RdapLookup::with_config(settings.lookup.clone())?;

    if args.list_tlds {
        for tld in lookup.registry().tlds() {
            println!("{}", tld);
        }
        return Ok(true);
    }

    let inputs = collect_inputs(&args)?;

    // A single positional domain prints the bare record
    if inputs.len() == 1 && args.file.is_none() {
        let record = lookup.lookup(&inputs[0]).await?;
        print_json(&serde_json::to_value(&record)?, settings.pretty)?;
        return Ok(true);
    }

    let policy = if args.fail_fast {
        BatchPolicy::FailFast
    } else {
        BatchPolicy::CollectAll
    };
    let results = lookup.lookup_batch(&inputs, policy).await?;

    print_json(&batch_to_json(&results)?, settings.pretty)?;
    ui::print_batch_failures(&results);

    Ok(results.iter().all(BatchResult::is_ok))
}

/// Layer configuration: defaults < config file(s) < environment < CLI flags.
fn build_settings(args: &Args) -> Result<Settings, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new(args.verbose);

    let file_config = match &args.config {
        Some(path) => {
            debug!(path = %path, "Using explicit config file");
            config_manager
                .load_file(path)
                .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
        }
        None => match config_manager.discover_and_load() {
            Ok(file_config) => file_config,
            Err(e) => {
                warn!("Ignoring configuration files: {}", e);
                FileConfig::default()
            }
        },
    };

    let env_config = load_env_config();

    let mut lookup = env_config.apply_to(file_config.apply_to(LookupConfig::default()));
    let mut pretty = env_config
        .pretty
        .or_else(|| file_config.pretty())
        .unwrap_or(true);

    if let Some(max) = args.max_redirects {
        lookup.max_redirects = max;
    }
    if let Some(timeout) = args.timeout.as_deref().and_then(parse_timeout_string) {
        lookup.timeout = Some(timeout);
    }
    if let Some(path) = &args.bootstrap_file {
        lookup.bootstrap_file = Some(path.into());
    }
    if args.compact {
        pretty = false;
    }

    Ok(Settings { lookup, pretty })
}

/// Positional domains followed by the `--file` entries.
fn collect_inputs(args: &Args) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut inputs = args.domains.clone();

    if let Some(path) = &args.file {
        inputs.extend(read_domain_file(path)?);
    }

    Ok(inputs)
}

/// Render batch results as `{domain, record}` / `{domain, error, kind}` entries.
fn batch_to_json(results: &[BatchResult]) -> Result<Value, serde_json::Error> {
    let entries = results
        .iter()
        .map(|entry| -> Result<Value, serde_json::Error> {
            match &entry.result {
                Ok(record) => Ok(json!({
                    "domain": entry.input,
                    "record": serde_json::to_value(record)?,
                })),
                Err(e) => Ok(json!({
                    "domain": entry.input,
                    "error": e.to_string(),
                    "kind": e.kind(),
                })),
            }
        })
        .collect::<Result<Vec<Value>, serde_json::Error>>()?;

    Ok(Value::Array(entries))
}

fn print_json(value: &Value, pretty: bool) -> Result<(), serde_json::Error> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}
