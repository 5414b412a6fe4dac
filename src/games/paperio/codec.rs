use super::config::Element;
use super::state::{Cell, EliminationReason, GameEvent, GameSnapshot, PlayerSnapshot, RejectReason};
use super::systems::direction_to_proto;
use crate::protocol::paperio::{PaperioState, PlayerState};
use crate::protocol::server::{
    ElementAvailability, ElementChanged, ElementResult, ElementSlot, JoinRejected, MatchOver,
    PlayerEliminated, PlayerJoined, PlayerLeft, PlayerRenamed, PlayerRespawned, ServerMessage,
    Welcome, server_message::Payload,
};

pub fn player_to_proto(player: &PlayerSnapshot) -> PlayerState {
    PlayerState {
        id: player.id,
        name: player.name.clone(),
        element: player.element.to_string(),
        color: player.color,
        col: player.col,
        row: player.row,
        x: player.x,
        y: player.y,
        direction: direction_to_proto(player.direction),
        area: player.area,
        is_outside: player.is_outside,
    }
}

pub fn snapshot_to_proto(snapshot: &GameSnapshot) -> PaperioState {
    let mut owners = Vec::with_capacity(snapshot.cells.len());
    let mut colors = Vec::with_capacity(snapshot.cells.len());
    let mut trails = Vec::with_capacity(snapshot.cells.len());

    for cell in &snapshot.cells {
        match *cell {
            Cell::Empty => {
                owners.push(0);
                colors.push(0);
                trails.push(false);
            }
            Cell::Owned { owner, color, trail } => {
                owners.push(owner);
                colors.push(color);
                trails.push(trail);
            }
        }
    }

    PaperioState {
        players: snapshot.players.values().map(player_to_proto).collect(),
        cols: snapshot.cols,
        rows: snapshot.rows,
        owners,
        colors,
        trails,
        game_time_ms: snapshot.game_time.as_millis() as u64,
        time_remaining_ms: snapshot.time_remaining.as_millis() as u64,
        game_over: snapshot.game_over,
        winner_id: snapshot.winner_id.unwrap_or(0),
        winner_name: snapshot.winner_name.clone().unwrap_or_default(),
    }
}

fn wrap(payload: Payload) -> ServerMessage {
    ServerMessage { payload: Some(payload) }
}

pub fn state_message(snapshot: &GameSnapshot) -> ServerMessage {
    wrap(Payload::State(snapshot_to_proto(snapshot)))
}

pub fn welcome_message(player: &PlayerSnapshot) -> ServerMessage {
    wrap(Payload::Welcome(Welcome {
        player_id: player.id,
        player: Some(player_to_proto(player)),
    }))
}

pub fn rejection_message(reason: RejectReason) -> ServerMessage {
    wrap(Payload::JoinRejected(JoinRejected {
        reason: reason.code().to_string(),
    }))
}

pub fn element_result_message(result: Result<Element, RejectReason>) -> ServerMessage {
    let result = match result {
        Ok(element) => ElementResult {
            success: true,
            element: element.to_string(),
            color: element.color(),
            reason: String::new(),
        },
        Err(reason) => ElementResult {
            success: false,
            reason: reason.code().to_string(),
            ..Default::default()
        },
    };
    wrap(Payload::ElementResult(result))
}

pub fn availability_message(availability: &[(Element, bool)]) -> ServerMessage {
    wrap(Payload::ElementAvailability(ElementAvailability {
        slots: availability
            .iter()
            .map(|(element, available)| ElementSlot {
                element: element.to_string(),
                available: *available,
            })
            .collect(),
    }))
}

fn reason_code(reason: EliminationReason) -> &'static str {
    match reason {
        EliminationReason::TrailCut => "TRAIL_CUT",
        EliminationReason::SelfCollision => "SELF_COLLISION",
    }
}

/// Broadcast message for an engine event; `None` for events clients do not see.
pub fn event_to_message(event: &GameEvent, winner_name: Option<&str>) -> Option<ServerMessage> {
    let payload = match event {
        GameEvent::PlayerJoined(player) => Payload::PlayerJoined(PlayerJoined {
            player: Some(player_to_proto(player)),
        }),
        GameEvent::PlayerLeft { player_id } => Payload::PlayerLeft(PlayerLeft {
            player_id: *player_id,
        }),
        GameEvent::PlayerRenamed { player_id, name } => Payload::PlayerRenamed(PlayerRenamed {
            player_id: *player_id,
            name: name.clone(),
        }),
        GameEvent::PlayerElementChanged { player_id, element, color } => {
            Payload::ElementChanged(ElementChanged {
                player_id: *player_id,
                element: element.to_string(),
                color: *color,
            })
        }
        GameEvent::ElementAvailability(availability) => {
            return Some(availability_message(availability));
        }
        GameEvent::PlayerEliminated { player_id, reason } => {
            Payload::PlayerEliminated(PlayerEliminated {
                player_id: *player_id,
                reason: reason_code(*reason).to_string(),
            })
        }
        GameEvent::PlayerRespawned { player_id } => Payload::PlayerRespawned(PlayerRespawned {
            player_id: *player_id,
        }),
        GameEvent::MatchOver { winner_id } => Payload::MatchOver(MatchOver {
            winner_id: winner_id.unwrap_or(0),
            winner_name: winner_name.unwrap_or_default().to_string(),
        }),
        GameEvent::MatchStarted => return None,
    };
    Some(wrap(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::paperio::state::Direction;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn player() -> PlayerSnapshot {
        PlayerSnapshot {
            id: 3,
            name: "Alice".to_string(),
            element: Element::Lavar,
            color: Element::Lavar.color(),
            col: 4,
            row: 2,
            x: 80.0,
            y: 40.0,
            direction: Direction::Left,
            area: 12,
            is_outside: true,
        }
    }

    #[test]
    fn test_player_to_proto() {
        let proto = player_to_proto(&player());
        assert_eq!(proto.id, 3);
        assert_eq!(proto.element, "lavar");
        assert_eq!(proto.direction, 3);
        assert_eq!(proto.area, 12);
        assert!(proto.is_outside);
    }

    #[test]
    fn test_snapshot_cells_flattened() {
        let snapshot = GameSnapshot {
            players: BTreeMap::from([(3, player())]),
            cols: 2,
            rows: 1,
            cells: vec![Cell::Empty, Cell::trail(3, 0xAA)],
            game_time: Duration::from_millis(1500),
            time_remaining: Duration::from_secs(10),
            game_over: false,
            winner_id: None,
            winner_name: None,
        };

        let proto = snapshot_to_proto(&snapshot);
        assert_eq!(proto.owners, vec![0, 3]);
        assert_eq!(proto.colors, vec![0, 0xAA]);
        assert_eq!(proto.trails, vec![false, true]);
        assert_eq!(proto.game_time_ms, 1500);
        assert_eq!(proto.time_remaining_ms, 10_000);
        assert_eq!(proto.winner_id, 0);
        assert_eq!(proto.players.len(), 1);
    }

    #[test]
    fn test_rejection_uses_wire_code() {
        let msg = rejection_message(RejectReason::ElementTaken);
        match msg.payload {
            Some(Payload::JoinRejected(r)) => assert_eq!(r.reason, "ELEMENT_TAKEN"),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_element_result() {
        match element_result_message(Ok(Element::Water)).payload {
            Some(Payload::ElementResult(r)) => {
                assert!(r.success);
                assert_eq!(r.element, "water");
                assert_eq!(r.color, Element::Water.color());
            }
            other => panic!("unexpected payload {:?}", other),
        }
        match element_result_message(Err(RejectReason::InvalidElement)).payload {
            Some(Payload::ElementResult(r)) => {
                assert!(!r.success);
                assert_eq!(r.reason, "INVALID_ELEMENT");
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_match_started_not_broadcast() {
        assert!(event_to_message(&GameEvent::MatchStarted, None).is_none());
        let over = event_to_message(&GameEvent::MatchOver { winner_id: Some(2) }, Some("Bob")).unwrap();
        match over.payload {
            Some(Payload::MatchOver(m)) => {
                assert_eq!(m.winner_id, 2);
                assert_eq!(m.winner_name, "Bob");
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }
}
