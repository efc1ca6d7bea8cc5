//! Command-line entry point for docker-manifest-sync

use clap::{Parser, Subcommand};
use docker_manifest_sync::credentials::CredentialStore;
use docker_manifest_sync::error::{RegistryError, Result};
use docker_manifest_sync::logging::Logger;
use docker_manifest_sync::registry::RegistryClient;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "docker-manifest-sync")]
#[command(about = "Fetch and retag image manifests on Docker registries")]
#[command(version)]
struct Cli {
    #[arg(
        long = "docker-config",
        help = "Path to a Docker config.json holding registry credentials"
    )]
    docker_config: Option<PathBuf>,

    #[arg(
        long = "timeout",
        short = 't',
        default_value = "10",
        help = "Timeout for network operations in seconds"
    )]
    timeout: u64,

    #[arg(
        long = "insecure",
        short = 'k',
        help = "Skip TLS certificate verification"
    )]
    insecure: bool,

    #[arg(long = "verbose", short = 'v', help = "Enable verbose output")]
    verbose: bool,

    #[arg(long = "quiet", short = 'q', help = "Suppress all output except errors")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a manifest and print it as JSON
    Fetch {
        /// Full manifest URL (.../v2/<name>/manifests/<reference>)
        manifest_url: String,
    },
    /// Fetch a manifest from one URL and store it at another
    Retag {
        /// Manifest URL to read from
        source_url: String,
        /// Manifest URL to write to
        target_url: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let logger = if cli.quiet {
        Logger::new_quiet()
    } else {
        Logger::new(cli.verbose)
    };

    if let Err(e) = run(cli, &logger).await {
        logger.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, logger: &Logger) -> Result<()> {
    if cli.insecure {
        logger.warning("TLS certificate verification is disabled");
    }

    let credentials = match &cli.docker_config {
        Some(path) => CredentialStore::from_file(path)?,
        None => CredentialStore::from_default_location()?,
    };
    logger.verbose(&format!(
        "Loaded credentials for {} registries",
        credentials.len()
    ));

    let client = RegistryClient::builder()
        .with_credentials(credentials)
        .with_timeout(Duration::from_secs(cli.timeout))
        .with_skip_tls(cli.insecure)
        .with_logger(logger.clone())
        .build()?;

    match cli.command {
        Commands::Fetch { manifest_url } => {
            logger.info(&format!("Fetching manifest from {}", manifest_url));
            let manifest = client.get_manifest(&manifest_url).await?;
            logger.success(&format!(
                "Fetched manifest with {} layers ({} bytes of layer data)",
                manifest.layer_count(),
                manifest.total_layer_size()
            ));
            let pretty = serde_json::to_string_pretty(&manifest)
                .map_err(|e| RegistryError::decode("manifest payload", e))?;
            println!("{}", pretty);
        }
        Commands::Retag {
            source_url,
            target_url,
        } => {
            logger.info(&format!(
                "Copying manifest: {} -> {}",
                source_url, target_url
            ));
            let manifest = client.get_manifest(&source_url).await?;
            logger.detail(&format!(
                "Source manifest has {} layers",
                manifest.layer_count()
            ));
            client.put_manifest(&target_url, &manifest).await?;
            logger.success(&format!("Manifest stored at {}", target_url));
        }
    }
    Ok(())
}
