//! Wire messages. Every datagram is one `ClientMessage` or `ServerMessage`,
//! protobuf-encoded with prost.

pub mod paperio {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PaperioInput {
        /// 0 none, 1 up, 2 down, 3 left, 4 right
        #[prost(int32, tag = "1")]
        pub direction: i32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PlayerState {
        #[prost(uint32, tag = "1")]
        pub id: u32,
        #[prost(string, tag = "2")]
        pub name: String,
        #[prost(string, tag = "3")]
        pub element: String,
        #[prost(uint32, tag = "4")]
        pub color: u32,
        #[prost(int32, tag = "5")]
        pub col: i32,
        #[prost(int32, tag = "6")]
        pub row: i32,
        #[prost(float, tag = "7")]
        pub x: f32,
        #[prost(float, tag = "8")]
        pub y: f32,
        #[prost(int32, tag = "9")]
        pub direction: i32,
        #[prost(uint32, tag = "10")]
        pub area: u32,
        #[prost(bool, tag = "11")]
        pub is_outside: bool,
    }

    /// Row-major cell arrays; `owners[i] == 0` is an empty cell.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PaperioState {
        #[prost(message, repeated, tag = "1")]
        pub players: Vec<PlayerState>,
        #[prost(uint32, tag = "2")]
        pub cols: u32,
        #[prost(uint32, tag = "3")]
        pub rows: u32,
        #[prost(uint32, repeated, tag = "4")]
        pub owners: Vec<u32>,
        #[prost(uint32, repeated, tag = "5")]
        pub colors: Vec<u32>,
        #[prost(bool, repeated, tag = "6")]
        pub trails: Vec<bool>,
        #[prost(uint64, tag = "7")]
        pub game_time_ms: u64,
        #[prost(uint64, tag = "8")]
        pub time_remaining_ms: u64,
        #[prost(bool, tag = "9")]
        pub game_over: bool,
        #[prost(uint32, tag = "10")]
        pub winner_id: u32,
        #[prost(string, tag = "11")]
        pub winner_name: String,
    }
}

pub mod client {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ClientMessage {
        #[prost(oneof = "client_message::Payload", tags = "1, 2, 3, 4, 5, 6, 7")]
        pub payload: Option<client_message::Payload>,
    }

    pub mod client_message {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Payload {
            #[prost(message, tag = "1")]
            JoinPlayer(super::JoinPlayer),
            #[prost(message, tag = "2")]
            JoinSpectator(super::JoinSpectator),
            #[prost(message, tag = "3")]
            GameMessage(super::GameMessage),
            #[prost(message, tag = "4")]
            SetName(super::SetName),
            #[prost(message, tag = "5")]
            SetElement(super::SetElement),
            #[prost(message, tag = "6")]
            Leave(super::Leave),
            #[prost(message, tag = "7")]
            Ping(super::Ping),
        }
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct JoinPlayer {
        #[prost(string, tag = "1")]
        pub name: String,
        /// Empty when the client did not pick one
        #[prost(string, tag = "2")]
        pub element: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct JoinSpectator {
        #[prost(string, tag = "1")]
        pub name: String,
    }

    /// Opaque game input, a `PaperioInput` for this server
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct GameMessage {
        #[prost(bytes = "vec", tag = "1")]
        pub payload: Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct SetName {
        #[prost(string, tag = "1")]
        pub name: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct SetElement {
        #[prost(string, tag = "1")]
        pub element: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Leave {}

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Ping {
        #[prost(uint64, tag = "1")]
        pub timestamp: u64,
        #[prost(uint32, tag = "2")]
        pub sequence: u32,
    }
}

pub mod server {
    use super::paperio::{PaperioState, PlayerState};

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ServerMessage {
        #[prost(
            oneof = "server_message::Payload",
            tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15"
        )]
        pub payload: Option<server_message::Payload>,
    }

    pub mod server_message {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Payload {
            #[prost(message, tag = "1")]
            Welcome(super::Welcome),
            #[prost(message, tag = "2")]
            JoinRejected(super::JoinRejected),
            #[prost(message, tag = "3")]
            SpectatorJoined(super::SpectatorJoined),
            #[prost(message, tag = "4")]
            State(super::PaperioState),
            #[prost(message, tag = "5")]
            PlayerJoined(super::PlayerJoined),
            #[prost(message, tag = "6")]
            PlayerLeft(super::PlayerLeft),
            #[prost(message, tag = "7")]
            PlayerRenamed(super::PlayerRenamed),
            #[prost(message, tag = "8")]
            ElementChanged(super::ElementChanged),
            #[prost(message, tag = "9")]
            ElementResult(super::ElementResult),
            #[prost(message, tag = "10")]
            ElementAvailability(super::ElementAvailability),
            #[prost(message, tag = "11")]
            PlayerEliminated(super::PlayerEliminated),
            #[prost(message, tag = "12")]
            PlayerRespawned(super::PlayerRespawned),
            #[prost(message, tag = "13")]
            MatchOver(super::MatchOver),
            #[prost(message, tag = "14")]
            Error(super::Error),
            #[prost(message, tag = "15")]
            Pong(super::Pong),
        }
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Welcome {
        #[prost(uint32, tag = "1")]
        pub player_id: u32,
        #[prost(message, optional, tag = "2")]
        pub player: Option<PlayerState>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct JoinRejected {
        /// ROOM_FULL, ELEMENT_TAKEN, ELEMENT_REQUIRED or INVALID_ELEMENT
        #[prost(string, tag = "1")]
        pub reason: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct SpectatorJoined {
        #[prost(uint32, tag = "1")]
        pub spectator_id: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PlayerJoined {
        #[prost(message, optional, tag = "1")]
        pub player: Option<PlayerState>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PlayerLeft {
        #[prost(uint32, tag = "1")]
        pub player_id: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PlayerRenamed {
        #[prost(uint32, tag = "1")]
        pub player_id: u32,
        #[prost(string, tag = "2")]
        pub name: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ElementChanged {
        #[prost(uint32, tag = "1")]
        pub player_id: u32,
        #[prost(string, tag = "2")]
        pub element: String,
        #[prost(uint32, tag = "3")]
        pub color: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ElementResult {
        #[prost(bool, tag = "1")]
        pub success: bool,
        #[prost(string, tag = "2")]
        pub element: String,
        #[prost(uint32, tag = "3")]
        pub color: u32,
        #[prost(string, tag = "4")]
        pub reason: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ElementSlot {
        #[prost(string, tag = "1")]
        pub element: String,
        #[prost(bool, tag = "2")]
        pub available: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ElementAvailability {
        #[prost(message, repeated, tag = "1")]
        pub slots: Vec<ElementSlot>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PlayerEliminated {
        #[prost(uint32, tag = "1")]
        pub player_id: u32,
        #[prost(string, tag = "2")]
        pub reason: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PlayerRespawned {
        #[prost(uint32, tag = "1")]
        pub player_id: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct MatchOver {
        /// 0 when nobody won
        #[prost(uint32, tag = "1")]
        pub winner_id: u32,
        #[prost(string, tag = "2")]
        pub winner_name: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Error {
        #[prost(string, tag = "1")]
        pub message: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Pong {
        #[prost(uint64, tag = "1")]
        pub timestamp: u64,
        #[prost(uint32, tag = "2")]
        pub sequence: u32,
        #[prost(uint64, tag = "3")]
        pub server_time: u64,
    }
}
