use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checklist_elog::{ElogClient, ElogConfig};
use checklist_xml::load_document;

mod console;

/// Stand-alone operator checklist console
///
/// Loads a checklist document (with its includes), shows the checklist
/// menu or auto-activates a single checklist, and drives the submission
/// workflow against the configured e-log client.
///
/// # Environment Variables
/// - `CHECKLIST_DATA_DIR`: Directory containing checklist documents (default: ".")
/// - `CHECKLIST_ELOG_*`: E-log client settings (host, port, logbook, credentials)
#[derive(Parser)]
#[command(name = "checklist")]
#[command(about = "Operator checklist console")]
struct Cli {
    /// Checklist document to load from the data directory
    #[arg(long, default_value = "CheckList.xml")]
    show: String,

    /// Directory containing checklist documents (overrides CHECKLIST_DATA_DIR)
    #[arg(long)]
    path: Option<PathBuf>,

    /// Log filter override, for example "checklist=debug"
    #[arg(long)]
    debug: Option<String>,

    /// Render every checklist and its report without interactive prompts
    #[arg(long)]
    batch: bool,
}

/// Main entry point for the checklist console
///
/// Exit status is 0 when the document loaded and was displayed; a load
/// failure is fatal and exits nonzero before any session state exists.
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = match &cli.debug {
        Some(directive) => tracing_subscriber::EnvFilter::try_new(directive)?,
        None => {
            tracing_subscriber::EnvFilter::from_default_env().add_directive("checklist=info".parse()?)
        }
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir = match cli.path {
        Some(path) => path,
        None => PathBuf::from(std::env::var("CHECKLIST_DATA_DIR").unwrap_or_else(|_| ".".into())),
    };
    let document = data_dir.join(&cli.show);

    tracing::info!("++ Loading checklist document {}", document.display());

    let store = load_document(&document)
        .map_err(|e| anyhow::anyhow!("cannot load {}: {e}", document.display()))?;

    tracing::info!(checklists = store.len(), "document loaded");

    if cli.batch {
        console::run_batch(&store);
        return Ok(());
    }

    let elog = ElogClient::new(ElogConfig::from_env());
    console::run(&store, elog)
}
