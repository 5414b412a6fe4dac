use clap::Parser;
use paperio_server::config::ServerConfig;
use paperio_server::game::runner::{GameCommand, run_game_loop};
use paperio_server::games::paperio::PaperioGame;
use paperio_server::network::udp::UdpServer;
use paperio_server::protocol::client::{ClientMessage, Ping, client_message::Payload};
use paperio_server::protocol::server::{Error, Pong, ServerMessage, server_message};
use paperio_server::session::{SessionManager, SessionRole};
use prost::Message;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Authoritative paper.io arena server")]
struct Args {
    /// TOML config file (defaults to $PAPERIO_CONFIG, then config/paperio.toml)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Address to bind, overrides the config file
    #[clap(short, long)]
    listen: Option<String>,
}

type Commands = mpsc::UnboundedSender<GameCommand>;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "paperio_server=debug".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let mut config = ServerConfig::load(args.config.as_deref());
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }

    let server = Arc::new(UdpServer::bind(&config.listen_addr).await?);
    tracing::info!("Paper.io server started");

    let sessions = Arc::new(Mutex::new(SessionManager::new(config.session_timeout_secs)));
    let (commands, command_rx) = mpsc::unbounded_channel();

    let game = PaperioGame::with_config(config.game.clone());
    tokio::spawn(run_game_loop(game, command_rx, server.clone(), sessions.clone()));

    // Cleanup task for timed-out sessions
    let sessions_cleanup = sessions.clone();
    let commands_cleanup = commands.clone();
    let cleanup_interval = std::time::Duration::from_secs(config.cleanup_interval_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_interval);
        loop {
            interval.tick().await;
            let timed_out = sessions_cleanup.lock().await.cleanup_timed_out();
            for session in timed_out {
                if session.role != SessionRole::Pending {
                    send_command(&commands_cleanup, GameCommand::Remove {
                        player_id: session.player_id,
                    });
                }
            }
        }
    });

    // Main receive loop
    loop {
        let (data, addr) = match server.recv().await {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!("recv error - sent to closed port. Ignoring. Error: {}", e);
                continue;
            }
        };

        let msg = match ClientMessage::decode(&data[..]) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("Failed to decode from {}: {}", addr, e);
                continue;
            }
        };

        let mut sessions = sessions.lock().await;

        match msg.payload {
            Some(Payload::JoinPlayer(join)) => {
                let session = sessions.register(addr, join.name.clone());
                session.role = SessionRole::Player;
                let element = Some(join.element).filter(|e| !e.is_empty());
                send_command(&commands, GameCommand::JoinPlayer {
                    player_id: session.player_id,
                    addr,
                    name: join.name,
                    element,
                });
            }

            Some(Payload::JoinSpectator(join)) => {
                let session = sessions.register(addr, join.name.clone());
                session.role = SessionRole::Spectator;
                send_command(&commands, GameCommand::JoinSpectator {
                    spectator_id: session.player_id,
                    addr,
                    name: join.name,
                });
            }

            Some(Payload::GameMessage(game_msg)) => {
                sessions.update_last_seen(&addr);
                match sessions.get_by_addr(&addr) {
                    Some(session) if session.role == SessionRole::Player => {
                        send_command(&commands, GameCommand::Input {
                            player_id: session.player_id,
                            payload: game_msg.payload,
                        });
                    }
                    Some(session) => {
                        tracing::debug!("GameMessage from non-player {}", session.player_id);
                    }
                    None => tracing::warn!("GameMessage from unknown address: {}", addr),
                }
            }

            Some(Payload::SetName(set_name)) => {
                sessions.update_last_seen(&addr);
                let Some(session) = sessions.get_by_addr_mut(&addr) else {
                    send_error(&server, addr, "Join before renaming").await;
                    continue;
                };
                session.player_name = set_name.name.clone();
                send_command(&commands, GameCommand::SetName {
                    player_id: session.player_id,
                    name: set_name.name,
                });
            }

            Some(Payload::SetElement(set_element)) => {
                sessions.update_last_seen(&addr);
                let Some(session) = sessions.get_by_addr(&addr) else {
                    send_error(&server, addr, "Join before picking an element").await;
                    continue;
                };
                send_command(&commands, GameCommand::SetElement {
                    player_id: session.player_id,
                    addr,
                    element: set_element.element,
                });
            }

            Some(Payload::Leave(_)) => {
                if let Some(session) = sessions.remove(&addr) {
                    send_command(&commands, GameCommand::Remove {
                        player_id: session.player_id,
                    });
                }
            }

            Some(Payload::Ping(ping)) => {
                handle_ping(&server, &mut sessions, addr, ping).await;
            }

            None => {
                tracing::warn!("Empty message from {}", addr);
            }
        }
    }
}

fn send_command(commands: &Commands, command: GameCommand) {
    if let Err(e) = commands.send(command) {
        tracing::warn!("Game loop is gone, dropped {:?}", e.0);
    }
}

async fn send_error(server: &UdpServer, addr: SocketAddr, message: &str) {
    let error = ServerMessage {
        payload: Some(server_message::Payload::Error(Error {
            message: message.to_string(),
        })),
    };
    if let Err(e) = server.send(&error.encode_to_vec(), addr).await {
        tracing::warn!("Failed to send error to {}: {}", addr, e);
    }
}

async fn handle_ping(server: &UdpServer,
                     sessions: &mut SessionManager,
                     addr: SocketAddr,
                     ping: Ping) {
    sessions.ping(&addr);

    if let Some(session) = sessions.get_by_addr(&addr) {
        tracing::trace!(
            "Ping from player {} (seq={}, count={})",
            session.player_id,
            ping.sequence,
            session.ping_count
        );
    } else {
        tracing::debug!("Ping from unregistered address {}", addr);
    }

    let pong_message = ServerMessage {
        payload: Some(server_message::Payload::Pong(Pong {
            timestamp: ping.timestamp,
            sequence: ping.sequence,
            server_time: current_timestamp_ms(),
        }))
    };

    if let Err(e) = server.send(&pong_message.encode_to_vec(), addr).await {
        tracing::warn!("Failed to send pong: {}", e);
    }
}

fn current_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
