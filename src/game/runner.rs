use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use prost::Message;
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::time::{Instant, MissedTickBehavior};

use crate::game::traits::{Game, PlayerId};
use crate::games::paperio::{PaperioGame, codec};
use crate::network::udp::UdpServer;
use crate::protocol::server::{ServerMessage, SpectatorJoined, server_message::Payload};
use crate::session::SessionManager;

/// Upper bound on the delta fed to a single tick after a stall.
const MAX_TICK_DELTA: Duration = Duration::from_millis(50);

/// Commands queued by the receive loop, applied by the game task between ticks.
#[derive(Debug)]
pub enum GameCommand {
    JoinPlayer {
        player_id: PlayerId,
        addr: SocketAddr,
        name: String,
        element: Option<String>,
    },
    JoinSpectator {
        spectator_id: PlayerId,
        addr: SocketAddr,
        name: String,
    },
    Input {
        player_id: PlayerId,
        payload: Vec<u8>,
    },
    SetName {
        player_id: PlayerId,
        name: String,
    },
    SetElement {
        player_id: PlayerId,
        addr: SocketAddr,
        element: String,
    },
    Remove {
        player_id: PlayerId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Addr(SocketAddr),
    Everyone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub recipient: Recipient,
    pub message: ServerMessage,
}

impl Outbound {
    fn to(addr: SocketAddr, message: ServerMessage) -> Self {
        Self { recipient: Recipient::Addr(addr), message }
    }

    fn everyone(message: ServerMessage) -> Self {
        Self { recipient: Recipient::Everyone, message }
    }
}

/// Applies one queued command and returns the direct replies it produces.
/// Broadcasts triggered by the command come out of `drain_event_messages`.
pub fn apply_command(game: &mut PaperioGame, command: GameCommand) -> Vec<Outbound> {
    match command {
        GameCommand::JoinPlayer { player_id, addr, name, element } => {
            let element = element.as_deref().filter(|e| !e.trim().is_empty());
            match game.join_player(player_id, &name, element) {
                Ok(player) => vec![
                    Outbound::to(addr, codec::welcome_message(&player)),
                    Outbound::to(addr, codec::state_message(&game.snapshot())),
                ],
                Err(reason) => {
                    tracing::info!("Join from {} rejected: {}", addr, reason);
                    vec![
                        Outbound::to(addr, codec::rejection_message(reason)),
                        Outbound::to(addr, codec::availability_message(&game.element_availability())),
                    ]
                }
            }
        }

        GameCommand::JoinSpectator { spectator_id, addr, name } => {
            let spectator_id = game.join_spectator(spectator_id, &name);
            let joined = ServerMessage {
                payload: Some(Payload::SpectatorJoined(SpectatorJoined { spectator_id })),
            };
            vec![
                Outbound::to(addr, joined),
                Outbound::to(addr, codec::state_message(&game.snapshot())),
            ]
        }

        GameCommand::Input { player_id, payload } => {
            if let Err(e) = game.handle_input(player_id, &payload) {
                tracing::debug!("Input from player {} ignored: {}", player_id, e);
            }
            Vec::new()
        }

        GameCommand::SetName { player_id, name } => {
            if game.set_name(player_id, &name).is_none() {
                tracing::debug!("Rename for unknown player {}", player_id);
            }
            Vec::new()
        }

        GameCommand::SetElement { player_id, addr, element } => {
            let element = Some(element.as_str()).filter(|e| !e.trim().is_empty());
            let result = game.set_element(player_id, element);
            vec![Outbound::to(addr, codec::element_result_message(result))]
        }

        GameCommand::Remove { player_id } => {
            game.player_left(player_id);
            Vec::new()
        }
    }
}

/// Translates pending engine events into broadcasts.
pub fn drain_event_messages(game: &mut PaperioGame) -> Vec<Outbound> {
    let winner_name = game.state().clock.winner_name.clone();
    game.drain_events()
        .iter()
        .filter_map(|event| codec::event_to_message(event, winner_name.as_deref()))
        .map(Outbound::everyone)
        .collect()
}

async fn deliver(server: &UdpServer, addrs: &[SocketAddr], outbound: Vec<Outbound>) {
    for Outbound { recipient, message } in outbound {
        let bytes = message.encode_to_vec();
        match recipient {
            Recipient::Addr(addr) => {
                if let Err(e) = server.send(&bytes, addr).await {
                    tracing::warn!("Failed to send to {}: {}", addr, e);
                }
            }
            Recipient::Everyone => server.send_to_many(&bytes, addrs).await,
        }
    }
}

/// The single writer of engine state. Commands are drained only at tick
/// boundaries, then the tick runs and its snapshot goes to every session.
/// Returns once every command sender is gone.
pub async fn run_game_loop(
    mut game: PaperioGame,
    mut commands: mpsc::UnboundedReceiver<GameCommand>,
    server: Arc<UdpServer>,
    sessions: Arc<Mutex<SessionManager>>,
) {
    let mut interval = tokio::time::interval(game.tick_rate());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_tick = Instant::now();

    tracing::info!(
        "Game loop started ({}x{} grid, tick {:?})",
        game.config().cols(),
        game.config().rows(),
        game.tick_rate()
    );

    loop {
        interval.tick().await;

        let mut outbound = Vec::new();
        loop {
            match commands.try_recv() {
                Ok(command) => outbound.extend(apply_command(&mut game, command)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::info!("Command channel closed, stopping game loop");
                    return;
                }
            }
        }

        let now = Instant::now();
        let delta = now.duration_since(last_tick).min(MAX_TICK_DELTA);
        last_tick = now;

        let result = game.tick(delta);
        outbound.extend(drain_event_messages(&mut game));

        if !result.eliminated.is_empty() {
            tracing::debug!("Tick {}: eliminated {:?}", game.current_tick(), result.eliminated);
        }

        let addrs = sessions.lock().await.addrs();
        deliver(&server, &addrs, outbound).await;

        if let Some(bytes) = result.broadcast {
            server.send_to_many(&bytes, &addrs).await;
        }
        tracing::trace!("Tick {} sent to {} sessions", game.current_tick(), addrs.len());
    }
}
