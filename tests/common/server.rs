//! Test server management.
//!
//! Runs a Hub and Gateway inside the test runtime on an ephemeral port.

use std::net::SocketAddr;
use std::sync::Arc;

use nextgenchat::config::{Config, GroupConfig};
use nextgenchat::hub::Hub;
use nextgenchat::moderation::NoOpRepository;
use nextgenchat::network::Gateway;
use nextgenchat::permissions::PermissionSet;
use nextgenchat::providers::Providers;
use tokio::task::JoinHandle;

/// Configuration used by the integration tests.
///
/// Everyone may chat and use commands; `Admin` holds every node through the
/// group directory. Anti-spam is off so tests can send freely.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.listen.address = SocketAddr::from(([127, 0, 0, 1], 0));
    config.anti_spam.enable_anti_spam = false;
    config.anti_spam.enable_anti_flood = false;
    config.providers.kind = "groups".to_string();
    config.permissions.defaults = PermissionSet {
        chat_local: true,
        chat_global: true,
        use_commands: true,
        ..PermissionSet::default()
    };
    config.groups = vec![
        GroupConfig {
            name: "default".to_string(),
            default: true,
            permissions: vec![
                "nextgenchat.chat.*".to_string(),
                "nextgenchat.commands".to_string(),
            ],
            ..GroupConfig::default()
        },
        GroupConfig {
            name: "admin".to_string(),
            prefix: "[A] ".to_string(),
            weight: 100,
            members: vec!["Admin".to_string()],
            permissions: vec!["nextgenchat.*".to_string()],
            ..GroupConfig::default()
        },
    ];
    config
}

/// A test server instance.
pub struct TestServer {
    pub hub: Arc<Hub>,
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Spawn a server with the given configuration.
    pub async fn spawn(config: Config) -> anyhow::Result<Self> {
        let bind = config.listen.address;
        let config = config.into_shared();
        let providers = Providers::from_config(&config);
        let hub = Arc::new(Hub::new(config, providers, Arc::new(NoOpRepository)));

        let gateway = Gateway::bind(bind, Arc::clone(&hub)).await?;
        let addr = gateway.local_addr()?;
        let task = tokio::spawn(gateway.run());

        Ok(Self { hub, addr, task })
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
