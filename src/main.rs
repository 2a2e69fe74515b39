//! nextgenchatd - chat routing daemon.

use std::sync::Arc;

use anyhow::Context as _;
use nextgenchat::config::{Config, validate};
use nextgenchat::hub::Hub;
use nextgenchat::moderation::{BackgroundWriter, JsonFileRepository, MuteRepository, NoOpRepository};
use nextgenchat::network::Gateway;
use nextgenchat::providers::Providers;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "nextgenchat.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    info!(
        server = %config.server.name,
        address = %config.listen.address,
        tps = config.server.ticks_per_second,
        provider = %config.providers.kind,
        "Starting nextgenchat"
    );

    // Mute persistence
    let file_repository = config
        .moderation
        .save_mute_data
        .then(|| Arc::new(JsonFileRepository::new(&config.moderation.mute_data_path)));
    let mut writer = None;
    let repository: Arc<dyn MuteRepository> = match &file_repository {
        Some(file) => {
            info!(path = %file.path().display(), "Mute data persistence enabled");
            let (background, handle) = BackgroundWriter::spawn(file.clone());
            let background = Arc::new(background);
            writer = Some((Arc::clone(&background), handle));
            background
        }
        None => {
            warn!("Mute data persistence disabled, mutes are lost on restart");
            Arc::new(NoOpRepository)
        }
    };

    let listen_address = config.listen.address;
    let config = config.into_shared();
    let providers = Providers::from_config(&config);
    let hub = Arc::new(Hub::new(config, providers, repository).with_config_path(&config_path));

    match hub.mutes.load() {
        Ok(count) => info!(count, "Loaded active mutes"),
        Err(e) => warn!(error = %e, "Failed to load mute data, starting empty"),
    }

    // Tick driver: delayed broadcasts, autobroadcast, mute sweep
    let ticker = Arc::clone(&hub.scheduler).spawn();

    // Start the Gateway
    let gateway = Gateway::bind(listen_address, Arc::clone(&hub))
        .await
        .with_context(|| format!("failed to bind {listen_address}"))?;

    tokio::select! {
        _ = gateway.run() => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutting down");
        }
    }

    ticker.abort();
    // Let an in-flight background write finish before the final save.
    if let Some((background, handle)) = writer {
        background.close();
        if let Err(e) = handle.await {
            error!(error = %e, "Mute data writer did not stop cleanly");
        }
    }
    if let Some(file) = &file_repository {
        match hub.mutes.save_to(&**file) {
            Ok(count) => info!(count, "Mute data saved"),
            Err(e) => error!(error = %e, "Failed to save mute data on shutdown"),
        }
    }

    Ok(())
}
