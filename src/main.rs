use bindkeeper::store::{ArtifactStore, CollectionKind};
use bindkeeper::{
    ConfigLexValidator, RecordParser, StoreConfig, StoreError, ZoneTemplate, ZoneValidator,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "bindkeeper",
    version,
    about = "Versioned store for BIND9 configuration and zone files"
)]
struct Cli {
    /// Directory holding configuration files (overrides BIND9_CONFIG_PATH)
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Directory holding zone files (overrides BIND9_RECORDS_PATH)
    #[arg(long, value_name = "DIR")]
    records_dir: Option<PathBuf>,

    #[arg(value_enum)]
    collection: CollectionArg,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CollectionArg {
    Config,
    Zones,
}

impl From<CollectionArg> for CollectionKind {
    fn from(arg: CollectionArg) -> Self {
        match arg {
            CollectionArg::Config => CollectionKind::Config,
            CollectionArg::Zones => CollectionKind::Zones,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List artifacts, excluding snapshots
    List,
    /// Print an artifact with its parsed records
    Read { name: String },
    /// Create a new artifact
    Create {
        name: String,
        /// Read content from FILE instead of stdin
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Replace an artifact's content, snapshotting the old content
    Update {
        name: String,
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Delete an artifact, snapshotting its content
    Delete { name: String },
    /// Show snapshots of an artifact, newest first
    History { name: String },
    /// Check content without storing it
    Validate {
        /// Pick the validator from this artifact name instead of the collection
        name: Option<String>,
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Print the records parsed from zone text
    Parse {
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Create a zone file from the starter template
    NewZone {
        name: String,
        #[arg(long)]
        zone_name: String,
        #[arg(long)]
        admin_email: String,
        #[arg(long, default_value_t = 86400)]
        ttl: u32,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Store(err)) => {
            error!("{}", err);
            let payload = json!({
                "error": err.kind(),
                "message": err.to_string(),
                "details": err.details(),
            });
            eprintln!("{}", payload);
            if err.is_client_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
        Err(CliError::Other(err)) => {
            error!("{}", err);
            eprintln!("{}", json!({ "error": "Failed", "message": err.to_string() }));
            ExitCode::FAILURE
        }
    }
}

enum CliError {
    Store(StoreError),
    Other(Box<dyn std::error::Error>),
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        CliError::Store(err)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Other(Box::new(err))
    }
}

impl From<bindkeeper::ConfigError> for CliError {
    fn from(err: bindkeeper::ConfigError) -> Self {
        CliError::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Other(Box::new(err))
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = StoreConfig::from_env()?;
    if let Some(dir) = cli.config_dir {
        config.config_dir = dir;
    }
    if let Some(dir) = cli.records_dir {
        config.records_dir = dir;
    }
    debug!("Using {:?}", config);

    let kind = CollectionKind::from(cli.collection);

    // Pure commands do not touch the store directories
    match &cli.command {
        Command::Parse { file } => return print(&RecordParser::parse(&read_input(file.as_ref())?)),
        Command::Validate { name: None, file } => {
            let content = read_input(file.as_ref())?;
            let result = match kind {
                CollectionKind::Config => ConfigLexValidator::validate(&content),
                CollectionKind::Zones => ZoneValidator::validate(&content),
            };
            return print(&result);
        }
        _ => {}
    }

    let store = ArtifactStore::open(&config)?;
    let collection = store.collection(kind);

    match cli.command {
        Command::List => print(&collection.list()?),
        Command::Read { name } => print(&collection.read(&name)?),
        Command::Create { name, file } => {
            let content = read_input(file.as_ref())?;
            print(&collection.create(&name, &content)?)
        }
        Command::Update { name, file } => {
            let content = read_input(file.as_ref())?;
            print(&collection.update(&name, &content)?)
        }
        Command::Delete { name } => print(&collection.delete(&name)?),
        Command::History { name } => print(&collection.history(&name)?),
        Command::Validate { name, file } => {
            let content = read_input(file.as_ref())?;
            let name = name.unwrap_or_default();
            print(&collection.validate(&name, &content))
        }
        Command::NewZone {
            name,
            zone_name,
            admin_email,
            ttl,
        } => {
            let template = ZoneTemplate::new(zone_name, admin_email).with_ttl(ttl);
            print(&collection.create_zone(&name, &template)?)
        }
        Command::Parse { .. } => Ok(()),
    }
}

fn read_input(file: Option<&PathBuf>) -> Result<String, CliError> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut content = String::new();
            std::io::stdin().read_to_string(&mut content)?;
            Ok(content)
        }
    }
}

fn print<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
