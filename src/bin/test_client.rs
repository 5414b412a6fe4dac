use prost::Message;
use std::net::UdpSocket;
use std::time::Duration;
use std::thread;
use paperio_server::protocol::client::{
    ClientMessage, GameMessage, JoinPlayer, Leave,
    client_message::Payload,
};
use paperio_server::protocol::paperio::PaperioInput;
use paperio_server::protocol::server::{ServerMessage, server_message};

fn main() -> std::io::Result<()> {
    let socket = UdpSocket::bind("127.0.0.1:0")?;
    socket.set_read_timeout(Some(Duration::from_secs(2)))?;
    let server_addr = std::env::args().nth(1).unwrap_or_else(|| "127.0.0.1:9000".to_string());

    // 1. Join as a player
    let join_msg = ClientMessage {
        payload: Some(Payload::JoinPlayer(JoinPlayer {
            name: "Player1".to_string(),
            element: "water".to_string(),
        })),
    };
    socket.send_to(&join_msg.encode_to_vec(), &server_addr)?;
    println!("Sent: JoinPlayer");

    receive_response(&socket);

    // 2. Walk a square: right, down, left, up
    for direction in [4, 2, 3, 1] {
        let input = PaperioInput { direction };
        let game_msg = ClientMessage {
            payload: Some(Payload::GameMessage(GameMessage {
                payload: input.encode_to_vec(),
            })),
        };
        socket.send_to(&game_msg.encode_to_vec(), &server_addr)?;
        println!("Sent: direction {}", direction);
        thread::sleep(Duration::from_millis(480));
        receive_response(&socket);
    }

    // 3. Leave
    let leave_msg = ClientMessage {
        payload: Some(Payload::Leave(Leave {})),
    };
    socket.send_to(&leave_msg.encode_to_vec(), &server_addr)?;
    println!("Done!");
    Ok(())
}

fn receive_response(socket: &UdpSocket) {
    let mut buf = vec![0u8; 65536];
    match socket.recv_from(&mut buf) {
        Ok((len, _)) => match ServerMessage::decode(&buf[..len]) {
            Ok(ServerMessage { payload: Some(server_message::Payload::State(state)) }) => {
                let owned = state.owners.iter().filter(|&&o| o != 0).count();
                println!(
                    "Received: State {}x{}, {} players, {} owned cells, {}ms left",
                    state.cols, state.rows, state.players.len(), owned, state.time_remaining_ms
                );
            }
            Ok(response) => println!("Received: {:?}", response),
            Err(_) => println!("Received {} bytes (failed to decode)", len),
        },
        Err(e) => println!("No response: {}", e),
    }
}
