//! Manifest Fetch Demo
//!
//! Fetches an image manifest from a live registry and prints a layer summary.
//! Docker Hub works anonymously: the registry answers with a bearer challenge
//! and the client negotiates a pull token on its own.

use docker_manifest_sync::{CredentialStore, Logger, RegistryClient, Result};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    println!("🐳 Docker Registry Manifest Fetch Demo");
    println!("======================================");

    let manifest_url = env::var("MANIFEST_URL").unwrap_or_else(|_| {
        "https://registry-1.docker.io/v2/library/alpine/manifests/latest".to_string()
    });

    println!("📋 Configuration:");
    println!("  Manifest URL: {}", manifest_url);
    println!();

    let credentials = CredentialStore::from_default_location()?;
    if credentials.is_empty() {
        println!("ℹ️  No stored credentials found, fetching anonymously");
    } else {
        println!("🔑 Loaded credentials for {} registries", credentials.len());
    }

    let client = RegistryClient::builder()
        .with_credentials(credentials)
        .with_logger(Logger::new(true))
        .build()?;

    println!();
    println!("🌐 Fetching manifest...");
    match client.get_manifest(&manifest_url).await {
        Ok(manifest) => {
            println!("✅ Manifest fetched successfully");
            println!("  Schema version: {}", manifest.schema_version);
            println!("  Media type: {}", manifest.media_type);
            println!("  Config digest: {}", manifest.config.digest);
            println!(
                "  Layers: {} ({} bytes total)",
                manifest.layer_count(),
                manifest.total_layer_size()
            );
            for (index, layer) in manifest.layers.iter().enumerate() {
                println!("    [{}] {} ({} bytes)", index, layer.digest, layer.size);
            }
        }
        Err(e) => {
            println!("❌ Fetch failed: {}", e);
            println!("   Private repositories need an entry in ~/.docker/config.json");
        }
    }

    println!();
    println!("🏁 Demo completed");
    Ok(())
}
