//! TCP server - session manager
//!
//! Accepts connections, assigns identities, collects the first player's setup
//! flags and hands each paired game to its own task. Uses tokio for async
//! networking; sessions share nothing except the session counter.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use log::{info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};

use crate::connection::PlayerConn;
use crate::core::RandomComputer;
use crate::event_log::EventLog;
use crate::protocol::ServerMessage;
use crate::session::{Session, SessionError};
use crate::types::{GameMode, Mover, DEFAULT_PORT};

const DEFAULT_MOVE_TIMEOUT_SECS: u64 = 300;
const DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64 = 30;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Deadline for each column read inside a session (`None` waits forever)
    pub move_timeout: Option<Duration>,
    /// Deadline for the first player's setup flags
    pub handshake_timeout: Option<Duration>,
    /// JSON lines session log
    pub log_path: Option<String>,
    /// Makes computer opponents reproducible
    pub computer_seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            move_timeout: Some(Duration::from_secs(DEFAULT_MOVE_TIMEOUT_SECS)),
            handshake_timeout: Some(Duration::from_secs(DEFAULT_HANDSHAKE_TIMEOUT_SECS)),
            log_path: None,
            computer_seed: None,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let host = env::var("CONNECT4_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("CONNECT4_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let move_timeout = parse_timeout_secs(
            env::var("CONNECT4_MOVE_TIMEOUT_SECS").ok(),
            DEFAULT_MOVE_TIMEOUT_SECS,
        );
        let handshake_timeout = parse_timeout_secs(
            env::var("CONNECT4_HANDSHAKE_TIMEOUT_SECS").ok(),
            DEFAULT_HANDSHAKE_TIMEOUT_SECS,
        );

        let log_path = env::var("CONNECT4_LOG_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(s) });

        let computer_seed = env::var("CONNECT4_COMPUTER_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok());

        Self {
            host,
            port,
            move_timeout,
            handshake_timeout,
            log_path,
            computer_seed,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

/// Seconds from an env value; `0` disables the deadline, garbage keeps the default.
fn parse_timeout_secs(raw: Option<String>, default_secs: u64) -> Option<Duration> {
    let secs = raw
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(default_secs);
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}

/// Probe whether `host:port` can be bound right now.
pub fn check_tcp_listen_available(host: &str, port: u16) -> std::io::Result<()> {
    std::net::TcpListener::bind((host, port)).map(|_| ())
}

/// State shared by the accept loop and every session it starts
pub struct ServerContext {
    config: ServerConfig,
    sessions: AtomicU64,
    log: EventLog,
}

impl ServerContext {
    pub fn new(config: ServerConfig, log: EventLog) -> Self {
        Self {
            config,
            sessions: AtomicU64::new(1),
            log,
        }
    }

    /// Allocate the next session number (observability only)
    pub fn next_session_id(&self) -> u64 {
        self.sessions.fetch_add(1, Ordering::Relaxed)
    }

    fn computer(&self, session_id: u64) -> RandomComputer {
        match self.config.computer_seed {
            Some(seed) => RandomComputer::seeded(seed.wrapping_add(session_id)),
            None => RandomComputer::new(),
        }
    }
}

/// Start the TCP server
pub async fn run_server(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let bound = listener.local_addr()?;
    info!("Server listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let log = match config.log_path.clone() {
        Some(path) => {
            info!("Writing session log to {}", path);
            EventLog::spawn_file_writer(path)
        }
        None => EventLog::disabled(),
    };

    let ctx = Arc::new(ServerContext::new(config, log));
    serve(listener, ctx).await
}

/// First player whose setup flags have arrived
struct Setup {
    session_id: u64,
    p1: PlayerConn<TcpStream>,
    ui_flag: bool,
    mode: GameMode,
}

/// Accept loop. Returns only when the listener fails.
///
/// Setup exchanges run in their own tasks and report back over a channel, so
/// an idle client never delays anyone else. A new connection becomes mover B
/// of the oldest pvp game whose setup is complete, otherwise mover A of a new
/// game.
pub async fn serve(listener: TcpListener, ctx: Arc<ServerContext>) -> anyhow::Result<()> {
    let (setup_tx, mut setup_rx) = mpsc::unbounded_channel::<Setup>();
    let mut waiting: VecDeque<Setup> = VecDeque::new();

    loop {
        tokio::select! {
            biased;

            Some(setup) = setup_rx.recv() => match setup.mode {
                GameMode::PlayerVsPlayer => {
                    info!("Session {} waiting for player 2", setup.session_id);
                    waiting.push_back(setup);
                }
                GameMode::PlayerVsComputer => start_pvc(&ctx, setup),
            },

            accepted = listener.accept() => {
                let (socket, addr) = accepted?;
                match waiting.pop_front() {
                    Some(game) => {
                        info!("Player 2 joined session {} from {}", game.session_id, addr);
                        match second_player(socket, game.ui_flag, &ctx).await {
                            Ok(p2) => start_pvp(&ctx, game, p2),
                            Err(e) => {
                                warn!("Session {} player 2 setup failed: {}", game.session_id, e);
                                waiting.push_front(game);
                            }
                        }
                    }
                    None => {
                        let session_id = ctx.next_session_id();
                        info!("Player 1 joined session {} from {}", session_id, addr);
                        let ctx = Arc::clone(&ctx);
                        let setup_tx = setup_tx.clone();
                        tokio::spawn(async move {
                            match first_player(socket, &ctx).await {
                                Ok((p1, ui_flag, mode)) => {
                                    let _ = setup_tx.send(Setup {
                                        session_id,
                                        p1,
                                        ui_flag,
                                        mode,
                                    });
                                }
                                Err(e) => warn!("Session {} setup failed: {}", session_id, e),
                            }
                        });
                    }
                }
            }
        }
    }
}

fn start_pvp(ctx: &ServerContext, game: Setup, p2: PlayerConn<TcpStream>) {
    info!("Start a task for session {}", game.session_id);
    let session = Session::new(game.session_id, ctx.log.clone());
    tokio::spawn(async move {
        let _ = session.run_pvp(game.p1, p2, game.ui_flag).await;
    });
}

fn start_pvc(ctx: &ServerContext, setup: Setup) {
    info!("Start a task for session {}", setup.session_id);
    let session = Session::new(setup.session_id, ctx.log.clone());
    let computer = ctx.computer(setup.session_id);
    tokio::spawn(async move {
        let _ = session.run_pvc(setup.p1, computer, setup.ui_flag).await;
    });
}

/// Assign mover A and read the ui and game-mode flags
async fn first_player(
    socket: TcpStream,
    ctx: &ServerContext,
) -> Result<(PlayerConn<TcpStream>, bool, GameMode), SessionError> {
    let _ = socket.set_nodelay(true);
    let mut conn = PlayerConn::new(socket, Mover::A, ctx.config.handshake_timeout);
    conn.send(ServerMessage::Identity(Mover::A)).await?;
    let ui_flag = conn.recv_flag().await?;
    let mode = GameMode::from_flag(conn.recv_flag().await?);
    conn.set_read_timeout(ctx.config.move_timeout);
    Ok((conn, ui_flag, mode))
}

/// Assign mover B and forward the ui flag. Writes only, so it never waits
/// on the peer.
async fn second_player(
    socket: TcpStream,
    ui_flag: bool,
    ctx: &ServerContext,
) -> Result<PlayerConn<TcpStream>, SessionError> {
    let _ = socket.set_nodelay(true);
    let mut conn = PlayerConn::new(socket, Mover::B, ctx.config.move_timeout);
    conn.send(ServerMessage::Identity(Mover::B)).await?;
    conn.send(ServerMessage::UiMode(ui_flag)).await?;
    Ok(conn)
}
