//! Connection - Handles an individual player connection.
//!
//! Each Connection runs in its own Tokio task:
//!
//! ```text
//! Phase 1: Login (LOGIN <name> [zone], sequential)
//!    ↓
//! Phase 2: Event loop (tokio::select!)
//!    ├─ inbound line ─▶ /command ─▶ Registry
//!    │                └ chat     ─▶ ChatRouter
//!    └─ outbound queue ─▶ socket
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};
use tracing::{debug, error, info, instrument, warn};

use crate::chat::ChatOutcome;
use crate::error::HandlerError;
use crate::handlers::{Context, Registry};
use crate::hub::Hub;
use crate::state::{Position, Principal, Roster, SessionError};

/// Longest accepted player name.
pub const MAX_NAME_LEN: usize = 16;

/// Zone used when `LOGIN` names none.
pub const DEFAULT_ZONE: &str = "world";

const LOGIN_TIMEOUT: Duration = Duration::from_secs(30);

type LineReader = FramedRead<OwnedReadHalf, LinesCodec>;
type LineWriter = FramedWrite<OwnedWriteHalf, LinesCodec>;

/// Whether `name` is 1 to 16 characters of `[A-Za-z0-9_]`.
pub fn is_valid_name(name: &str) -> bool {
    (1..=MAX_NAME_LEN).contains(&name.len())
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Parse a `LOGIN <name> [zone]` line.
fn parse_login(line: &str) -> Result<(&str, &str), &'static str> {
    let mut words = line.split_whitespace();
    if !words
        .next()
        .is_some_and(|w| w.eq_ignore_ascii_case("LOGIN"))
    {
        return Err("ERROR expected LOGIN <name> [zone]");
    }
    let name = words.next().ok_or("ERROR expected LOGIN <name> [zone]")?;
    if !is_valid_name(name) {
        return Err("ERROR invalid name");
    }
    let zone = words.next().unwrap_or(DEFAULT_ZONE);
    Ok((name, zone))
}

/// A player connection handler.
pub struct Connection {
    addr: SocketAddr,
    stream: TcpStream,
    hub: Arc<Hub>,
    registry: Arc<Registry>,
}

impl Connection {
    pub fn new(stream: TcpStream, addr: SocketAddr, hub: Arc<Hub>, registry: Arc<Registry>) -> Self {
        Self {
            addr,
            stream,
            hub,
            registry,
        }
    }

    /// Run the connection until the peer disconnects.
    #[instrument(skip(self), fields(addr = %self.addr), name = "connection")]
    pub async fn run(self) {
        let (max_line_length, queue_depth) = {
            let config = self.hub.config.read();
            (config.listen.max_line_length, config.listen.outbound_queue)
        };
        let (read_half, write_half) = self.stream.into_split();
        let mut reader = FramedRead::new(read_half, LinesCodec::new_with_max_length(max_line_length));
        let mut writer = FramedWrite::new(write_half, LinesCodec::new());

        // Phase 1: Login
        let Some((principal, outgoing_rx)) = login(&self.hub, &mut reader, &mut writer, queue_depth).await else {
            debug!("Connection closed before login");
            return;
        };
        info!(player = %principal.name, "Player logged in");
        self.hub.notifier.player_joined(&principal).await;

        // Phase 2: Event loop
        event_loop(&self.hub, &self.registry, &principal, reader, writer, outgoing_rx).await;

        // Cleanup
        self.hub.sessions.remove(&principal.id);
        self.hub.router.forget(&principal.id);
        self.hub.permissions.invalidate(&principal.id);
        self.hub.notifier.player_left(&principal).await;
        info!(player = %principal.name, "Player disconnected");
    }
}

async fn login(
    hub: &Hub,
    reader: &mut LineReader,
    writer: &mut LineWriter,
    queue_depth: usize,
) -> Option<(Principal, mpsc::Receiver<String>)> {
    loop {
        let line = match tokio::time::timeout(LOGIN_TIMEOUT, reader.next()).await {
            Ok(Some(Ok(line))) => line,
            Ok(Some(Err(e))) => {
                warn!(error = %e, "Read error during login");
                return None;
            }
            Ok(None) => return None,
            Err(_) => {
                let _ = writer.send("ERROR login timeout").await;
                return None;
            }
        };

        let (name, zone) = match parse_login(&line) {
            Ok(parsed) => parsed,
            Err(reply) => {
                writer.send(reply).await.ok()?;
                continue;
            }
        };

        let principal = Principal::new(name);
        match hub
            .sessions
            .register(principal.clone(), zone, Position::default(), queue_depth)
        {
            Ok(rx) => {
                writer.send(format!("OK {}", principal.name)).await.ok()?;
                return Some((principal, rx));
            }
            Err(SessionError::NameInUse) => {
                debug!(player = %name, "Login rejected: name in use");
                writer.send("ERROR name in use").await.ok()?;
            }
            Err(SessionError::ServerFull) => {
                warn!(player = %name, "Login rejected: server full");
                let _ = writer.send("ERROR server full").await;
                return None;
            }
        }
    }
}

async fn event_loop(
    hub: &Arc<Hub>,
    registry: &Registry,
    principal: &Principal,
    mut reader: LineReader,
    mut writer: LineWriter,
    mut outgoing_rx: mpsc::Receiver<String>,
) {
    loop {
        tokio::select! {
            // BRANCH A: Network input
            result = reader.next() => {
                let line = match result {
                    Some(Ok(line)) => line,
                    Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                        warn!(player = %principal.name, "Line too long, closing connection");
                        let _ = writer.send("ERROR line too long").await;
                        break;
                    }
                    Some(Err(LinesCodecError::Io(e))) => {
                        debug!(player = %principal.name, error = %e, "Read error");
                        break;
                    }
                    None => break,
                };
                let line = line.trim_end();
                if line.is_empty() {
                    continue;
                }
                if line.starts_with('/') {
                    run_command(hub, registry, principal, line).await;
                } else {
                    route_chat(hub, principal, line).await;
                }
            }

            // BRANCH B: Outbound queue
            Some(text) = outgoing_rx.recv() => {
                if let Err(e) = writer.send(text).await {
                    debug!(player = %principal.name, error = %e, "Write error");
                    break;
                }
            }
        }
    }
}

async fn run_command(hub: &Arc<Hub>, registry: &Registry, principal: &Principal, line: &str) {
    let ctx = Context {
        hub,
        principal,
        registry,
    };
    let Err(e) = registry.dispatch(&ctx, line).await else {
        return;
    };

    if let HandlerError::Internal(_) = e {
        error!(player = %principal.name, error = %e, "Command failed");
    } else {
        debug!(player = %principal.name, code = e.error_code(), error = %e, "Command refused");
    }
    let reply = {
        let config = hub.config.read();
        e.to_user_reply(&config)
    };
    if let Some(reply) = reply {
        ctx.reply(&reply);
    }
}

async fn route_chat(hub: &Hub, principal: &Principal, line: &str) {
    let Some(entry) = hub.sessions.lookup(&principal.id) else {
        return;
    };
    match hub.router.handle_incoming(&entry, line).await {
        ChatOutcome::Delivered { mode, recipients, .. } => {
            debug!(player = %principal.name, %mode, recipients, "Chat delivered");
        }
        ChatOutcome::Blocked(reason) => {
            debug!(player = %principal.name, ?reason, "Chat blocked");
        }
    }
}
