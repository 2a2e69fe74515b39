//! In-process tests of the command layer, notices and the tick driver,
//! reading each player's outbound queue directly.

mod common;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use common::test_config;
use nextgenchat::config::Config;
use nextgenchat::error::HandlerError;
use nextgenchat::handlers::{Context, Registry};
use nextgenchat::hub::Hub;
use nextgenchat::moderation::{JsonFileRepository, MuteRepository, NoOpRepository};
use nextgenchat::providers::Providers;
use nextgenchat::state::{Position, Principal};
use tokio::sync::mpsc;

struct Player {
    principal: Principal,
    rx: mpsc::Receiver<String>,
}

impl Player {
    fn join(hub: &Hub, name: &str) -> Self {
        let principal = Principal::new(name);
        let rx = hub
            .sessions
            .register(principal.clone(), "world", Position::default(), 64)
            .expect("register");
        Self { principal, rx }
    }

    fn drain(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = self.rx.try_recv() {
            lines.push(line);
        }
        lines
    }
}

fn hub_with(config: Config) -> Arc<Hub> {
    let config = config.into_shared();
    let providers = Providers::from_config(&config);
    Arc::new(Hub::new(config, providers, Arc::new(NoOpRepository)))
}

async fn run(hub: &Arc<Hub>, registry: &Registry, who: &Principal, line: &str) -> Result<(), HandlerError> {
    let ctx = Context {
        hub,
        principal: who,
        registry,
    };
    registry.dispatch(&ctx, line).await
}

#[tokio::test]
async fn test_mute_notifies_target_moderator_and_staff() {
    let hub = hub_with(test_config());
    let registry = Registry::new();
    let mut admin = Player::join(&hub, "Admin");
    let mut steve = Player::join(&hub, "Steve");

    run(&hub, &registry, &admin.principal, "/mute Steve 2h flooding").await.unwrap();

    let to_steve = steve.drain();
    assert_eq!(to_steve.len(), 1);
    assert!(to_steve[0].contains("2ч 0м"));
    assert!(to_steve[0].contains("flooding"));

    // Moderator copy plus the staff copy (the admin holds the notification node).
    let to_admin = admin.drain();
    assert_eq!(to_admin.len(), 2);
    assert!(to_admin.iter().any(|l| l.contains("[Модерация]")));

    let err = run(&hub, &registry, &admin.principal, "/mute steve").await.unwrap_err();
    assert!(matches!(err, HandlerError::AlreadyMuted(ref n) if n == "Steve"));
}

#[tokio::test]
async fn test_mute_requires_online_target_and_valid_duration() {
    let hub = hub_with(test_config());
    let registry = Registry::new();
    let admin = Player::join(&hub, "Admin");
    let _steve = Player::join(&hub, "Steve");

    let err = run(&hub, &registry, &admin.principal, "/mute Ghost 1h").await.unwrap_err();
    assert!(matches!(err, HandlerError::PlayerNotFound(ref n) if n == "Ghost"));

    // The second word is always the duration.
    let err = run(&hub, &registry, &admin.principal, "/mute Steve because").await.unwrap_err();
    assert!(matches!(err, HandlerError::InvalidDuration));

    let err = run(&hub, &registry, &admin.principal, "/mute").await.unwrap_err();
    assert!(matches!(err, HandlerError::NeedMoreParams(_)));
}

#[tokio::test]
async fn test_unmute_offline_player_by_stored_name() {
    let hub = hub_with(test_config());
    let registry = Registry::new();
    let mut admin = Player::join(&hub, "Admin");
    let steve = Player::join(&hub, "Steve");

    run(&hub, &registry, &admin.principal, "/mute Steve 1d").await.unwrap();
    hub.sessions.remove(&steve.principal.id);
    drop(steve);
    admin.drain();

    run(&hub, &registry, &admin.principal, "/unmute STEVE").await.unwrap();
    assert!(hub.mutes.is_empty());
    assert!(admin.drain().iter().any(|l| l.contains("Steve")));

    let err = run(&hub, &registry, &admin.principal, "/unmute Steve").await.unwrap_err();
    assert!(matches!(err, HandlerError::PlayerNotFound(_)));
}

#[tokio::test]
async fn test_mutelist_shows_active_mutes() {
    let hub = hub_with(test_config());
    let registry = Registry::new();
    let mut admin = Player::join(&hub, "Admin");
    let _steve = Player::join(&hub, "Steve");
    let _alex = Player::join(&hub, "Alex");

    run(&hub, &registry, &admin.principal, "/mutelist").await.unwrap();
    assert_eq!(admin.drain().len(), 1);

    run(&hub, &registry, &admin.principal, "/mute Steve 1h caps").await.unwrap();
    run(&hub, &registry, &admin.principal, "/mute Alex 30m spam").await.unwrap();
    admin.drain();

    run(&hub, &registry, &admin.principal, "/mutelist").await.unwrap();
    let lines = admin.drain();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("Alex") && lines[1].contains("spam"));
    assert!(lines[2].contains("Steve") && lines[2].contains("caps"));
}

#[tokio::test]
async fn test_regular_player_cannot_moderate() {
    let hub = hub_with(test_config());
    let registry = Registry::new();
    let steve = Player::join(&hub, "Steve");
    let _alex = Player::join(&hub, "Alex");

    for line in ["/mute Alex", "/unmute Alex", "/mutelist", "/nextgenchat reload"] {
        let err = run(&hub, &registry, &steve.principal, line).await.unwrap_err();
        assert!(matches!(err, HandlerError::AccessDenied), "{line}");
    }
}

#[tokio::test]
async fn test_join_and_quit_notices_wait_in_queue() {
    let hub = hub_with(test_config());
    let mut alice = Player::join(&hub, "Alice");
    let bob = Principal::new("Bob");

    hub.notifier.player_joined(&bob).await;
    hub.notifier.player_left(&bob).await;
    assert_eq!(hub.queue.len(), 2);

    // Join waits 5 ticks; the quit notice then needs 3 more at the head.
    for _ in 0..4 {
        hub.scheduler.tick();
    }
    assert!(alice.drain().is_empty());

    assert_eq!(hub.scheduler.tick().delivered, 1);
    let lines = alice.drain();
    assert!(lines[0].contains("Bob") && lines[0].contains("присоединился"));

    hub.scheduler.tick();
    hub.scheduler.tick();
    assert_eq!(hub.scheduler.tick().delivered, 1);
    assert!(alice.drain()[0].contains("покинул"));
}

#[tokio::test]
async fn test_broadcast_commands() {
    let hub = hub_with(test_config());
    let registry = Registry::new();
    let mut admin = Player::join(&hub, "Admin");

    run(&hub, &registry, &admin.principal, "/nextgenchat broadcast").await.unwrap();
    let lines = admin.drain();
    // The rotation message itself plus the confirmation.
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Добро пожаловать"));
    assert_eq!(hub.rotation.current_index(), 1);
    assert_eq!(hub.rotation.tick_accumulator(), 0);

    let enabled = hub.config.read().auto_broadcast.enabled;
    run(&hub, &registry, &admin.principal, "/nextgenchat broadcast toggle").await.unwrap();
    assert_eq!(hub.config.read().auto_broadcast.enabled, !enabled);

    admin.drain();
    run(&hub, &registry, &admin.principal, "/nextgenchat broadcast status").await.unwrap();
    assert_eq!(admin.drain().len(), 4);
}

#[tokio::test]
async fn test_reload_command_applies_new_config() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r##"
[server]
name = "Reloaded"

[chat]
global_chat_symbol = "#"
"##
    )
    .unwrap();

    let config = test_config().into_shared();
    let providers = Providers::from_config(&config);
    let hub = Arc::new(
        Hub::new(config, providers, Arc::new(NoOpRepository)).with_config_path(file.path()),
    );
    let registry = Registry::new();
    let admin = Player::join(&hub, "Admin");

    run(&hub, &registry, &admin.principal, "/nextgenchat reload").await.unwrap();
    let config = hub.config.read();
    assert_eq!(config.server.name, "Reloaded");
    assert_eq!(config.chat.global_chat_symbol, "#");
}

#[tokio::test]
async fn test_mutes_survive_restart_through_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mutes.json");

    {
        let hub = Arc::new(Hub::new(
            test_config().into_shared(),
            Providers::none(),
            Arc::new(JsonFileRepository::new(&path)),
        ));
        let moderator = Principal::new("Admin");
        hub.mutes
            .mute(&Principal::new("Steve"), &moderator, Some("1w"), Some("griefing"))
            .unwrap();
    }

    let stored = JsonFileRepository::new(&path).load_all().unwrap();
    assert_eq!(stored.len(), 1);

    let restarted = Arc::new(Hub::new(
        test_config().into_shared(),
        Providers::none(),
        Arc::new(JsonFileRepository::new(&path)),
    ));
    assert_eq!(restarted.mutes.load().unwrap(), 1);
    let record = restarted.mutes.find_by_name("steve").unwrap();
    assert_eq!(record.reason, "griefing");
    assert_eq!(record.duration_millis, Duration::from_secs(7 * 24 * 3600).as_millis() as i64);
}
