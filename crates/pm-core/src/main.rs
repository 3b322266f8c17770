//! Process Mining Core - event-log analytics engine
//!
//! The main entry point for pm-core, handling:
//! - Discovery requests (validate, reduce, encode, metrics, graph, deliver)
//! - Single pipeline stages on raw event records
//! - Configuration and schema inspection

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use pm_common::error::format_error_human;
use pm_common::{Error, EventLog, OutputFormat, RequestId, StructuredError, SCHEMA_VERSION};
use pm_config::{load_config, resolve_config, LoadedConfig, ValidationError};
use pm_core::delivery::CallbackDelivery;
use pm_core::encode::{self, EncodingMode};
use pm_core::exit_codes::ExitCode;
use pm_core::graph::{discover_graph, DirectlyFollowsMiner, Graph};
use pm_core::ingest;
use pm_core::logging::{
    event_names, generate_run_id, get_host_id, init_logging, LogConfig, LogContext, LogFormat,
    Stage,
};
use pm_core::metrics::{MetricsBundle, MetricsEngine, MetricsRequest};
use pm_core::pipeline::{DiscoveryResponse, Pipeline};
use pm_core::reduce;
use pm_core::request::{ActiveEventParameters, DiscoveryParameters, DiscoveryRequest};
use pm_core::schema::{
    available_schemas, format_schema, generate_all_schemas, generate_schema, SchemaFormat,
};
use serde_json::{json, Value};
use std::io::Read;
use std::path::Path;

/// Process Mining Core - directly-follows graphs and log statistics
#[derive(Parser)]
#[command(name = "pm-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to config.yml
    #[arg(long, global = true, env = "PM_CONFIG")]
    config: Option<String>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a discovery request end to end and deliver the response
    Discover(DiscoverArgs),

    /// Validate a raw event record
    Check(LogArgs),

    /// Keep only the cases of the dominant variants
    Reduce(ReduceArgs),

    /// Relabel activities by occurrence count or state
    Encode(EncodeArgs),

    /// Compute log statistics
    Metrics(MetricsArgs),

    /// Discover the directly-follows graph
    Graph(GraphArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Print JSON schemas for request, response and config types
    Schema(SchemaArgs),

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },

    /// Print version information
    Version,
}

// ============================================================================
// Command argument structs
// ============================================================================

#[derive(Args, Debug)]
struct DiscoverArgs {
    /// Request file (JSON), or - for stdin
    input: String,

    /// Do not POST the response to callback_url
    #[arg(long)]
    no_deliver: bool,
}

#[derive(Args, Debug)]
struct LogArgs {
    /// Raw event record (JSON), or - for stdin
    input: String,
}

#[derive(Args, Debug)]
struct ReduceArgs {
    /// Raw event record (JSON), or - for stdin
    input: String,

    /// Fraction of cases to cover, in [0, 1]
    #[arg(long)]
    retain: f64,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Raw event record (JSON), or - for stdin
    input: String,

    /// Suffix each activity with its occurrence count in the case
    #[arg(long)]
    counts: bool,

    /// Suffix each activity with the counts of these state-changing activities
    #[arg(long, value_delimiter = ',')]
    states: Vec<String>,

    /// Remove existing `_<n>` suffixes first
    #[arg(long)]
    strip: bool,
}

#[derive(Args, Debug)]
struct MetricsArgs {
    /// Raw event record (JSON), or - for stdin
    input: String,

    /// Number of top variants (config default when omitted)
    #[arg(long)]
    top: Option<usize>,

    /// Activities that open an occupancy interval
    #[arg(long, value_delimiter = ',')]
    positive: Vec<String>,

    /// Activities that close an occupancy interval
    #[arg(long, value_delimiter = ',')]
    negative: Vec<String>,

    /// Activities counted only in their own bin
    #[arg(long, value_delimiter = ',')]
    singular: Vec<String>,
}

#[derive(Args, Debug)]
struct GraphArgs {
    /// Raw event record (JSON), or - for stdin
    input: String,

    /// Name of the synthetic start node
    #[arg(long)]
    start_node: Option<String>,

    /// Name of the synthetic end node
    #[arg(long)]
    end_node: Option<String>,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective configuration and where it came from
    Show,
    /// Validate a configuration file
    Validate {
        /// File to validate (defaults to the resolved config)
        path: Option<String>,
    },
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Type to print
    name: Option<String>,

    /// List available types
    #[arg(long)]
    list: bool,

    /// Print every schema
    #[arg(long)]
    all: bool,

    /// Single-line JSON
    #[arg(long)]
    compact: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = LogConfig::level_from_flags(cli.global.verbose, cli.global.quiet);
    // Machine output on stdout pairs with machine logs on stderr.
    let format = match cli.global.format {
        OutputFormat::Json => Some(LogFormat::Jsonl),
        _ => None,
    };
    let log_config = LogConfig::from_env(level, format).with_color(!cli.global.no_color);
    init_logging(&log_config);

    let exit_code = match &cli.command {
        Commands::Discover(args) => run_discover(&cli.global, args),
        Commands::Check(args) => run_check(&cli.global, args),
        Commands::Reduce(args) => run_reduce(&cli.global, args),
        Commands::Encode(args) => run_encode(&cli.global, args),
        Commands::Metrics(args) => run_metrics(&cli.global, args),
        Commands::Graph(args) => run_graph(&cli.global, args),
        Commands::Config(args) => run_config(&cli.global, args),
        Commands::Schema(args) => run_schema(&cli.global, args),
        Commands::Completions { shell } => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                "pm-core",
                &mut std::io::stdout(),
            );
            ExitCode::Clean
        }
        Commands::Version => {
            print_version(&cli.global);
            ExitCode::Clean
        }
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_discover(global: &GlobalOpts, args: &DiscoverArgs) -> ExitCode {
    let ctx = LogContext::new(generate_run_id(), get_host_id());
    pm_core::log_event!(
        ctx,
        INFO,
        event_names::RUN_STARTED,
        Stage::Init,
        "Starting discovery",
        input = args.input.as_str()
    );

    let config = match load_engine_config(global, &ctx) {
        Ok(loaded) => loaded.config,
        Err(code) => return code,
    };

    let request: DiscoveryRequest = match read_input(&args.input)
        .and_then(|content| serde_json::from_str::<DiscoveryRequest>(&content).map_err(Error::from))
    {
        Ok(request) => request,
        Err(e) => return output_error(global, &ctx, &e),
    };
    let ctx = match &request.id {
        Some(id) => ctx.with_correlation_id(id.as_str()),
        None => ctx,
    };

    let now = chrono::Local::now().naive_local();
    let pipeline = Pipeline::new(&config, &DirectlyFollowsMiner, &ctx);
    let response = match pipeline.run(&request, now) {
        Ok(response) => response,
        Err(e) => return output_error(global, &ctx, &e),
    };

    let delivery = match (&request.callback_url, args.no_deliver) {
        (Some(url), false) => {
            let client = CallbackDelivery::new(config.delivery.timeout_seconds);
            Some((url.as_str(), client.deliver(&ctx, url, &response)))
        }
        _ => None,
    };

    let delivery_json = match &delivery {
        Some((url, Ok(receipt))) => json!({"url": url, "delivered": true, "status": receipt.status}),
        Some((url, Err(e))) => json!({
            "url": url,
            "delivered": false,
            "error": StructuredError::from(e),
        }),
        None => Value::Null,
    };

    match global.format {
        OutputFormat::Json => {
            let output = envelope(
                &ctx,
                json!({"response": &response, "delivery": delivery_json}),
            );
            println!("{:#}", output);
        }
        OutputFormat::Summary => {
            let delivered = match &delivery {
                Some((_, Ok(_))) => "delivered",
                Some((_, Err(_))) => "delivery failed",
                None => "not delivered",
            };
            println!(
                "[{}] discover: {} connections, {} cases, {}",
                ctx.run_id,
                response.graph.len(),
                response.metrics.case_count.unwrap_or(0),
                delivered
            );
        }
        OutputFormat::Exitcode => {}
        OutputFormat::Md => print_response_markdown(&response),
    }

    let exit_code = match &delivery {
        Some((_, Err(e))) => ExitCode::from(e),
        _ => ExitCode::Clean,
    };
    pm_core::log_event!(
        ctx,
        INFO,
        event_names::RUN_FINISHED,
        Stage::Init,
        "Discovery finished",
        exit_code = exit_code.as_i32()
    );
    exit_code
}

fn run_check(global: &GlobalOpts, args: &LogArgs) -> ExitCode {
    let ctx = LogContext::new(generate_run_id(), get_host_id());
    let log = match load_log(&args.input) {
        Ok(log) => log,
        Err(e) => return output_error(global, &ctx, &e),
    };

    match global.format {
        OutputFormat::Json => {
            let output = envelope(
                &ctx,
                json!({
                    "status": "valid",
                    "events": log.len(),
                    "cases": log.case_count(),
                }),
            );
            println!("{:#}", output);
        }
        OutputFormat::Summary => {
            println!(
                "[{}] check: OK ({} events, {} cases)",
                ctx.run_id,
                log.len(),
                log.case_count()
            );
        }
        OutputFormat::Exitcode => {}
        OutputFormat::Md => {
            println!("# Event Log Check");
            println!();
            println!("Status: ✓ Valid");
            println!("Events: {}", log.len());
            println!("Cases: {}", log.case_count());
        }
    }
    ExitCode::Clean
}

fn run_reduce(global: &GlobalOpts, args: &ReduceArgs) -> ExitCode {
    let ctx = LogContext::new(generate_run_id(), get_host_id());
    let result = load_log(&args.input)
        .and_then(|log| reduce::reduce_with_stats(&log, args.retain));
    let (reduced, stats) = match result {
        Ok(outcome) => outcome,
        Err(e) => return output_error(global, &ctx, &e),
    };
    pm_core::log_event!(
        ctx,
        INFO,
        event_names::REDUCE_FINISHED,
        Stage::Reduce,
        "Complexity reduced",
        kept_cases = stats.cases_after,
        kept_variants = stats.variants_kept
    );

    match global.format {
        OutputFormat::Json => {
            let output = envelope(
                &ctx,
                json!({
                    "retain": args.retain,
                    "stats": {
                        "cases_before": stats.cases_before,
                        "cases_after": stats.cases_after,
                        "variants_before": stats.variants_before,
                        "variants_kept": stats.variants_kept,
                    },
                    "log": ingest::to_raw_record(&reduced),
                }),
            );
            println!("{:#}", output);
        }
        OutputFormat::Summary => {
            println!(
                "[{}] reduce: kept {}/{} cases, {}/{} variants",
                ctx.run_id,
                stats.cases_after,
                stats.cases_before,
                stats.variants_kept,
                stats.variants_before
            );
        }
        OutputFormat::Exitcode => {}
        OutputFormat::Md => {
            println!("# Complexity Reduction");
            println!();
            println!("| | Before | After |");
            println!("|---|---|---|");
            println!("| Cases | {} | {} |", stats.cases_before, stats.cases_after);
            println!(
                "| Variants | {} | {} |",
                stats.variants_before, stats.variants_kept
            );
        }
    }
    ExitCode::Clean
}

fn run_encode(global: &GlobalOpts, args: &EncodeArgs) -> ExitCode {
    let ctx = LogContext::new(generate_run_id(), get_host_id());
    let states = (!args.states.is_empty()).then_some(args.states.as_slice());
    let mode = match EncodingMode::from_options(args.counts, states) {
        Ok(mode) => mode,
        Err(e) => return output_error(global, &ctx, &e),
    };
    let log = match load_log(&args.input) {
        Ok(log) => log,
        Err(e) => return output_error(global, &ctx, &e),
    };

    let log = if args.strip {
        encode::strip_suffixes(&log)
    } else {
        log
    };
    let log = match &mode {
        Some(mode) => encode::encode(&log, mode),
        None => log,
    };
    let mode_name = mode.as_ref().map(EncodingMode::name).unwrap_or("none");

    match global.format {
        OutputFormat::Json => {
            let output = envelope(
                &ctx,
                json!({
                    "mode": mode_name,
                    "stripped": args.strip,
                    "log": ingest::to_raw_record(&log),
                }),
            );
            println!("{:#}", output);
        }
        OutputFormat::Summary => {
            println!(
                "[{}] encode: {} events relabeled ({})",
                ctx.run_id,
                log.len(),
                mode_name
            );
        }
        OutputFormat::Exitcode => {}
        OutputFormat::Md => {
            println!("# Encoded Log ({})", mode_name);
            println!();
            println!("| Case | Activity | Timestamp |");
            println!("|---|---|---|");
            for event in &log {
                println!(
                    "| {} | {} | {} |",
                    event.case_id,
                    event.activity,
                    pm_common::timestamp::format_event(&event.timestamp)
                );
            }
        }
    }
    ExitCode::Clean
}

fn run_metrics(global: &GlobalOpts, args: &MetricsArgs) -> ExitCode {
    let ctx = LogContext::new(generate_run_id(), get_host_id());
    let config = match load_engine_config(global, &ctx) {
        Ok(loaded) => loaded.config,
        Err(code) => return code,
    };

    let active_events = if args.positive.is_empty()
        && args.negative.is_empty()
        && args.singular.is_empty()
    {
        None
    } else {
        Some(ActiveEventParameters::new(
            args.positive.iter().cloned(),
            args.negative.iter().cloned(),
            args.singular.iter().cloned(),
        ))
    };
    let params = DiscoveryParameters {
        active_events,
        n_top_variants: args.top,
        ..Default::default()
    };

    let bundle = params
        .resolve(&config.defaults)
        .and_then(|resolved| {
            let log = load_log(&args.input)?;
            let metrics_config = config.metrics_config();
            let engine = MetricsEngine::new(&metrics_config, &DirectlyFollowsMiner);
            engine.compute(
                &log,
                &MetricsRequest {
                    active_events: resolved.active_events.as_ref(),
                    n_top_variants: resolved.n_top_variants,
                    horizon: chrono::Local::now().naive_local(),
                },
            )
        });
    let bundle = match bundle {
        Ok(bundle) => bundle,
        Err(e) => return output_error(global, &ctx, &e),
    };

    match global.format {
        OutputFormat::Json => {
            println!("{:#}", envelope(&ctx, json!({ "metrics": &bundle })));
        }
        OutputFormat::Summary => {
            println!(
                "[{}] metrics: {} computed, {} cases, {} variants",
                ctx.run_id,
                bundle.computed_count(),
                bundle.case_count.unwrap_or(0),
                bundle.variant_count.unwrap_or(0)
            );
        }
        OutputFormat::Exitcode => {}
        OutputFormat::Md => print_metrics_markdown(&bundle),
    }
    ExitCode::Clean
}

fn run_graph(global: &GlobalOpts, args: &GraphArgs) -> ExitCode {
    let ctx = LogContext::new(generate_run_id(), get_host_id());
    let config = match load_engine_config(global, &ctx) {
        Ok(loaded) => loaded.config,
        Err(code) => return code,
    };

    let params = DiscoveryParameters {
        start_node_name: args.start_node.clone(),
        end_node_name: args.end_node.clone(),
        ..Default::default()
    };
    let graph = params.resolve(&config.defaults).and_then(|resolved| {
        let log = load_log(&args.input)?;
        discover_graph(
            &DirectlyFollowsMiner,
            &log,
            &resolved.start_node_name,
            &resolved.end_node_name,
        )
    });
    let graph = match graph {
        Ok(graph) => graph,
        Err(e) => return output_error(global, &ctx, &e),
    };

    match global.format {
        OutputFormat::Json => {
            println!("{:#}", envelope(&ctx, json!({ "graph": &graph })));
        }
        OutputFormat::Summary => {
            println!("[{}] graph: {} connections", ctx.run_id, graph.len());
        }
        OutputFormat::Exitcode => {}
        OutputFormat::Md => print_graph_markdown(&graph),
    }
    ExitCode::Clean
}

fn run_config(global: &GlobalOpts, args: &ConfigArgs) -> ExitCode {
    let ctx = LogContext::new(generate_run_id(), get_host_id());
    match &args.command {
        ConfigCommands::Show => {
            let loaded = match load_engine_config(global, &ctx) {
                Ok(loaded) => loaded,
                Err(code) => return code,
            };
            match global.format {
                OutputFormat::Json => {
                    let output = envelope(
                        &ctx,
                        json!({
                            "source": loaded.snapshot.to_json(),
                            "config": &loaded.config,
                        }),
                    );
                    println!("{:#}", output);
                }
                OutputFormat::Summary => {
                    println!(
                        "[{}] config: {} ({} metrics excluded)",
                        ctx.run_id,
                        loaded.snapshot.path.as_deref().unwrap_or("built-in defaults"),
                        loaded.config.excluded().len()
                    );
                }
                OutputFormat::Exitcode => {}
                OutputFormat::Md => {
                    println!("# Configuration");
                    println!();
                    println!(
                        "Path: {}",
                        loaded.snapshot.path.as_deref().unwrap_or("built-in defaults")
                    );
                    println!("Source: {}", loaded.snapshot.source);
                    let excluded: Vec<&str> =
                        loaded.config.excluded().iter().map(|m| m.as_str()).collect();
                    println!("Excluded metrics: {}", excluded.join(", "));
                    println!(
                        "Callback timeout: {}s",
                        loaded.config.delivery.timeout_seconds
                    );
                }
            }
            ExitCode::Clean
        }
        ConfigCommands::Validate { path } => {
            let path = path.as_deref().or(global.config.as_deref());
            let paths = resolve_config(path.map(Path::new));
            match load_config(&paths) {
                Ok(loaded) => {
                    match global.format {
                        OutputFormat::Json => {
                            let output = envelope(
                                &ctx,
                                json!({
                                    "status": "valid",
                                    "path": loaded.snapshot.path,
                                    "using_defaults": loaded.snapshot.is_default(),
                                    "schema_version": loaded.snapshot.schema_version,
                                }),
                            );
                            println!("{:#}", output);
                        }
                        OutputFormat::Summary => {
                            println!("[{}] config validate: OK", ctx.run_id);
                        }
                        OutputFormat::Exitcode => {}
                        OutputFormat::Md => {
                            println!("# Configuration Validation");
                            println!();
                            println!("Status: ✓ Valid");
                            match &loaded.snapshot.path {
                                Some(path) => println!("Config: {}", path),
                                None => println!("Config: using built-in defaults"),
                            }
                        }
                    }
                    ExitCode::Clean
                }
                Err(e) => output_config_error(global, &ctx, &e),
            }
        }
    }
}

fn run_schema(global: &GlobalOpts, args: &SchemaArgs) -> ExitCode {
    let format = if args.compact {
        SchemaFormat::JsonCompact
    } else {
        SchemaFormat::Json
    };

    if args.all {
        let all: serde_json::Map<String, Value> = generate_all_schemas().into_iter().collect();
        println!("{}", format_schema(&Value::Object(all), format));
        return ExitCode::Clean;
    }

    match (&args.name, args.list) {
        (Some(name), false) => match generate_schema(name) {
            Some(schema) => {
                println!("{}", format_schema(&schema, format));
                ExitCode::Clean
            }
            None => {
                let ctx = LogContext::new(generate_run_id(), get_host_id());
                let err = Error::InvalidArgument(format!(
                    "unknown schema type '{}'; run `pm-core schema --list`",
                    name
                ));
                output_error(global, &ctx, &err)
            }
        },
        _ => {
            match global.format {
                OutputFormat::Json => {
                    let listing: Vec<Value> = available_schemas()
                        .into_iter()
                        .map(|(name, description)| json!({"name": name, "description": description}))
                        .collect();
                    println!("{:#}", Value::Array(listing));
                }
                OutputFormat::Exitcode => {}
                _ => {
                    for (name, description) in available_schemas() {
                        println!("{:<24} {}", name, description);
                    }
                }
            }
            ExitCode::Clean
        }
    }
}

fn print_version(global: &GlobalOpts) {
    let version_info = json!({
        "schema_version": SCHEMA_VERSION,
        "pm_core_version": env!("CARGO_PKG_VERSION"),
        "rust_version": env!("CARGO_PKG_RUST_VERSION"),
    });

    match global.format {
        OutputFormat::Json => {
            println!("{:#}", version_info);
        }
        OutputFormat::Exitcode => {}
        _ => {
            println!("pm-core {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Read a file, or stdin for `-`.
fn read_input(input: &str) -> pm_common::Result<String> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

/// Load a raw event record. A request document is accepted too; its `data`
/// member is used.
fn load_log(input: &str) -> pm_common::Result<EventLog> {
    let value: Value = serde_json::from_str(&read_input(input)?)?;
    match value.get("data") {
        Some(data) if value.get("parameters").is_some() => ingest::parse_record(data),
        _ => ingest::parse_record(&value),
    }
}

fn load_engine_config(global: &GlobalOpts, ctx: &LogContext) -> Result<LoadedConfig, ExitCode> {
    let paths = resolve_config(global.config.as_deref().map(Path::new));
    match load_config(&paths) {
        Ok(loaded) => {
            if loaded.snapshot.is_default() {
                pm_core::log_event!(
                    ctx,
                    DEBUG,
                    event_names::CONFIG_DEFAULT_USED,
                    Stage::Init,
                    "No config file found, using built-in defaults"
                );
            } else {
                let path = loaded.snapshot.path.clone().unwrap_or_default();
                pm_core::log_event!(
                    ctx,
                    INFO,
                    event_names::CONFIG_LOADED,
                    Stage::Init,
                    "Configuration loaded",
                    path = path.as_str(),
                    source = loaded.snapshot.source.as_str()
                );
            }
            Ok(loaded)
        }
        Err(e) => Err(output_config_error(global, ctx, &e)),
    }
}

fn envelope(ctx: &LogContext, payload: Value) -> Value {
    let mut output = json!({
        "schema_version": SCHEMA_VERSION,
        "request_id": RequestId::new().0,
        "run_id": &ctx.run_id,
        "generated_at": chrono::Utc::now().to_rfc3339(),
    });
    if let (Some(target), Value::Object(fields)) = (output.as_object_mut(), payload) {
        target.extend(fields);
    }
    output
}

/// Output a pipeline error in the appropriate format.
fn output_error(global: &GlobalOpts, ctx: &LogContext, error: &Error) -> ExitCode {
    let exit_code = ExitCode::from(error);
    if exit_code.is_internal_error() {
        pm_core::log_event!(
            ctx,
            ERROR,
            event_names::INTERNAL_ERROR,
            Stage::Init,
            "Command failed",
            error = error.to_string(),
            code = error.code()
        );
    } else {
        pm_core::log_event!(
            ctx,
            WARN,
            event_names::RUN_FINISHED,
            Stage::Init,
            "Request rejected",
            error = error.to_string(),
            code = error.code()
        );
    }

    match global.format {
        OutputFormat::Json => {
            let response = envelope(
                ctx,
                json!({"status": "error", "error": StructuredError::from(error)}),
            );
            eprintln!("{:#}", response);
        }
        OutputFormat::Summary => {
            eprintln!("[{}] error: {}", ctx.run_id, error);
        }
        OutputFormat::Exitcode => {}
        OutputFormat::Md => {
            eprintln!("{}", format_error_human(error, !global.no_color));
        }
    }
    exit_code
}

/// Output a config error in the appropriate format.
fn output_config_error(global: &GlobalOpts, ctx: &LogContext, error: &ValidationError) -> ExitCode {
    pm_core::log_event!(
        ctx,
        ERROR,
        event_names::CONFIG_ERROR,
        Stage::Init,
        "Configuration invalid",
        error = error.to_string()
    );

    match global.format {
        OutputFormat::Json => {
            let response = envelope(
                ctx,
                json!({
                    "status": "error",
                    "error": {
                        "code": error.code(),
                        "category": "config",
                        "message": error.to_string(),
                    }
                }),
            );
            eprintln!("{:#}", response);
        }
        OutputFormat::Summary => {
            eprintln!("[{}] config error: {}", ctx.run_id, error);
        }
        OutputFormat::Exitcode => {}
        OutputFormat::Md => {
            eprintln!("# Configuration Error");
            eprintln!();
            eprintln!("Error: {}", error);
        }
    }
    ExitCode::ConfigError
}

fn print_graph_markdown(graph: &Graph) {
    println!("# Directly-Follows Graph");
    println!();
    println!("| From | To | Frequency | Mean (s) | Median (s) |");
    println!("|---|---|---|---|---|");
    for c in &graph.connections {
        println!(
            "| {} | {} | {} | {:.1} | {:.1} |",
            c.e1, c.e2, c.frequency, c.mean, c.median
        );
    }
}

fn print_metrics_markdown(bundle: &MetricsBundle) {
    println!("# Log Metrics");
    println!();
    let rows: [(&str, Option<String>); 8] = [
        ("Cases", bundle.case_count.map(|v| v.to_string())),
        ("Events", bundle.event_count.map(|v| v.to_string())),
        ("Variants", bundle.variant_count.map(|v| v.to_string())),
        ("Min trace length", bundle.min_trace_length.map(|v| v.to_string())),
        ("Max trace length", bundle.max_trace_length.map(|v| v.to_string())),
        (
            "Min trace duration (s)",
            bundle.min_trace_duration.map(|v| format!("{:.1}", v)),
        ),
        (
            "Max trace duration (s)",
            bundle.max_trace_duration.map(|v| format!("{:.1}", v)),
        ),
        (
            "Activities",
            bundle
                .event_frequency_distribution
                .as_ref()
                .map(|d| d.len().to_string()),
        ),
    ];
    for (label, value) in rows {
        if let Some(value) = value {
            println!("- **{}**: {}", label, value);
        }
    }

    if let Some(top) = &bundle.top_variants {
        println!();
        println!("## Top Variants");
        println!();
        println!("| Rank | Variant | Cases | Mean duration (s) |");
        println!("|---|---|---|---|");
        for variant in top {
            println!(
                "| {} | {} | {} | {:.1} |",
                variant.rank,
                variant.event_sequence.join(" → "),
                variant.frequency,
                variant.mean_duration
            );
        }
    }
}

fn print_response_markdown(response: &DiscoveryResponse) {
    println!("# Discovery Result");
    println!();
    if let Some(id) = &response.id {
        println!("Request: {}", id);
    }
    println!("Created: {}", response.created);
    println!();
    print_graph_markdown(&response.graph);
    println!();
    print_metrics_markdown(&response.metrics);
}
