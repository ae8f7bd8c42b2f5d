//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use xmlfetch_node::{MemoryStore, MessageCatalog, NodeParameters, XmlFetchNode};
use xmlfetch_shared::{
    AppConfig, DEBUG_URL_KEY, FetchResult, XmlFetchError, init_config, load_config,
    load_config_from,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// XmlFetch — pull one value out of an XML web service.
#[derive(Parser)]
#[command(
    name = "xmlfetch",
    version,
    about = "Fetch an XML document over HTTP and extract a value with XPath.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.xmlfetch/xmlfetch.toml.
    #[arg(long, global = true, env = "XMLFETCH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run one extraction from command-line parameters.
    Run(RunArgs),

    /// Run one extraction from a TOML parameter file.
    Node {
        /// Parameter file with Address, Query, NamespacePrefix, XPath, VariableName.
        #[arg(long)]
        params: PathBuf,

        /// Print the resulting variables as JSON.
        #[arg(long)]
        json: bool,

        /// Abort the run after this many seconds (overrides config).
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Print the node descriptor as JSON.
    Describe,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Parameters of `xmlfetch run`.
#[derive(Args)]
pub(crate) struct RunArgs {
    /// Web service address.
    #[arg(short, long)]
    pub address: String,

    /// Query string appended to the address.
    #[arg(short, long, default_value = "")]
    pub query: String,

    /// Prefix bound to the document's default namespace.
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// XPath expression evaluated against the root element.
    #[arg(short = 'x', long)]
    pub xpath: String,

    /// Variable that receives the value.
    #[arg(long = "var", default_value = "result")]
    pub variable: String,

    /// Abort the run after this many seconds (overrides config).
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = format!("xmlfetch={level},xmlfetch_extract={level},xmlfetch_node={level}");

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
    let config = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Command::Run(args) => cmd_run(args, &config).await,
        Command::Node {
            params,
            json,
            timeout_secs,
        } => cmd_node(&params, json, timeout_secs, &config).await,
        Command::Describe => cmd_describe(),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(args: RunArgs, config: &AppConfig) -> Result<()> {
    let params = NodeParameters {
        address: args.address,
        query: args.query,
        namespace_prefix: args.prefix.unwrap_or_default(),
        xpath: args.xpath,
        variable_name: args.variable,
    }
    .with_default_prefix(&config.defaults.namespace_prefix);

    let timeout = args
        .timeout_secs
        .map(Duration::from_secs)
        .or_else(|| config.defaults.timeout());

    let variable = params.variable_name.clone();
    let mut vars = MemoryStore::new();
    let outcome = run_node(params, &mut vars, timeout).await?;

    print_debug_url(&vars);
    match outcome {
        Ok(value) => {
            println!("{variable} = {}", value.as_deref().unwrap_or("<null>"));
            Ok(())
        }
        Err(e) => Err(present(&e, config)),
    }
}

async fn cmd_node(
    path: &Path,
    json: bool,
    timeout_secs: Option<u64>,
    config: &AppConfig,
) -> Result<()> {
    let content =
        std::fs::read_to_string(path).map_err(|e| XmlFetchError::io(path, e))?;
    let params = NodeParameters::from_toml_str(&content)?
        .with_default_prefix(&config.defaults.namespace_prefix);

    let timeout = timeout_secs
        .map(Duration::from_secs)
        .or_else(|| config.defaults.timeout());

    info!(params = %path.display(), "running node from parameter file");

    let mut vars = MemoryStore::new();
    let outcome = run_node(params, &mut vars, timeout).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&vars)?);
    } else {
        for (key, value) in vars.iter() {
            println!("{key} = {}", value.unwrap_or("<null>"));
        }
    }

    outcome.map(|_| ()).map_err(|e| present(&e, config))
}

fn cmd_describe() -> Result<()> {
    let descriptor = XmlFetchNode::descriptor();
    println!("{}", serde_json::to_string_pretty(&descriptor)?);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Run the node under a spinner, bounded by `timeout` if given.
async fn run_node(
    params: NodeParameters,
    vars: &mut MemoryStore,
    timeout: Option<Duration>,
) -> Result<FetchResult> {
    let node = XmlFetchNode::new()?;
    let spinner = Spinner::new(&params.address);

    let run = node.run(params, vars);
    let outcome = match timeout {
        Some(limit) => tokio::time::timeout(limit, run)
            .await
            .map_err(|_| eyre!("run did not finish within {}s", limit.as_secs())),
        None => Ok(run.await),
    };

    spinner.finish();
    outcome
}

fn print_debug_url(vars: &MemoryStore) {
    use xmlfetch_shared::VariableStore;

    if let Some(url) = vars.get(DEBUG_URL_KEY) {
        eprintln!("{DEBUG_URL_KEY} = {url}");
    }
}

/// Turn a classified failure into the user-facing report.
fn present(err: &XmlFetchError, config: &AppConfig) -> color_eyre::Report {
    let catalog = MessageCatalog::with_overrides(config.messages.clone());
    eyre!("{}", catalog.render(err))
}

/// Spinner shown on stderr while the request is in flight.
struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    fn new(address: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
        }
        bar.set_message(format!("Fetching {address}"));
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    fn finish(self) {
        self.bar.finish_and_clear();
    }
}
