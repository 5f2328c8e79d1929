//! Connection handling for client sessions
//!
//! Frame format (both directions):
//! - 2 bytes: payload length (little-endian u16)
//! - N bytes: payload, starting with opcode (u16) + sub-mode (u8)
//!
//! Each session processes its commands strictly sequentially. The player
//! aggregate lives on this task and nothing else ever touches it; zone
//! broadcasts cross between sessions only through the queues registered in
//! the game state.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use bytes::BytesMut;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::constants::{DEFAULT_ZONE_ID, MAX_FRAME_SIZE};
use crate::game::player::{Gender, Player};
use crate::handlers::{CommandContext, PacketSink};
use crate::Server;

/// Zone-routed sink backing live sessions. Broadcasts fan out through the
/// per-session queues in the game state; direct replies are collected for
/// the session's own socket.
struct ZoneSink<'a> {
    server: &'a Server,
    zone_id: u32,
    replies: Vec<Vec<u8>>,
}

impl PacketSink for ZoneSink<'_> {
    fn broadcast(&mut self, packet: Vec<u8>) {
        self.server.game_state.send_to_zone(self.zone_id, &packet);
    }

    fn reply(&mut self, packet: Vec<u8>) {
        self.replies.push(packet);
    }
}

/// Handle a client connection for its whole lifetime.
pub async fn handle_connection(
    mut socket: TcpStream,
    addr: SocketAddr,
    server: Arc<Server>,
) -> Result<()> {
    info!("New connection from {}", addr);

    let session_id = Uuid::new_v4();
    let character_id = server.next_character_id();

    // Session establishment is an external concern; every connection gets a
    // fresh character with the configured starting balance.
    let mut player = Player::new(
        character_id,
        format!("character-{}", character_id),
        Gender::Neutral,
        DEFAULT_ZONE_ID,
    );
    player.wallet.coin = server.config.game.starting_coin;

    let (outbox_tx, mut outbox_rx) = mpsc::unbounded_channel();
    server
        .game_state
        .register_session(session_id, character_id, outbox_tx);
    server.game_state.enter_zone(player.zone_id, character_id);

    let result = session_loop(&mut socket, &server, &mut player, &mut outbox_rx).await;

    server.game_state.leave_zone(player.zone_id, character_id);
    server.game_state.unregister_session(session_id, character_id);
    info!("Connection closed from {}", addr);
    result
}

/// Main frame loop for one session.
async fn session_loop(
    socket: &mut TcpStream,
    server: &Arc<Server>,
    player: &mut Player,
    outbox_rx: &mut mpsc::UnboundedReceiver<Vec<u8>>,
) -> Result<()> {
    let mut recv_buffer = BytesMut::with_capacity(MAX_FRAME_SIZE);
    let mut rng = StdRng::from_entropy();

    loop {
        let mut temp_buf = [0u8; 4096];

        tokio::select! {
            // A zone broadcast (possibly our own) is ready for delivery
            Some(packet) = outbox_rx.recv() => {
                send_frame(socket, &packet).await?;
            }

            read_result = socket.read(&mut temp_buf) => {
                match read_result {
                    Ok(0) => {
                        debug!("Character {} disconnected", player.character_id);
                        return Ok(());
                    }
                    Ok(n) => {
                        recv_buffer.extend_from_slice(&temp_buf[..n]);

                        // Process every complete frame in the buffer
                        while recv_buffer.len() >= 2 {
                            let payload_len =
                                u16::from_le_bytes([recv_buffer[0], recv_buffer[1]]) as usize;
                            if payload_len > MAX_FRAME_SIZE {
                                error!(
                                    "Invalid frame length {} from character {}",
                                    payload_len, player.character_id
                                );
                                return Ok(());
                            }
                            if recv_buffer.len() < 2 + payload_len {
                                break;
                            }
                            let _ = recv_buffer.split_to(2);
                            let frame = recv_buffer.split_to(payload_len);

                            let mut sink = ZoneSink {
                                server,
                                zone_id: player.zone_id,
                                replies: Vec::new(),
                            };
                            // Confine the non-Send CommandContext to its own scope
                            // so it is fully dropped before awaiting, keeping the
                            // connection future Send for tokio::spawn.
                            {
                                let mut ctx = CommandContext {
                                    player: &mut *player,
                                    metadata: &server.metadata,
                                    sink: &mut sink,
                                    rng: &mut rng,
                                };
                                server.dispatcher.dispatch(&mut ctx, &frame);
                            }

                            let replies = std::mem::take(&mut sink.replies);
                            for reply in replies {
                                send_frame(socket, &reply).await?;
                            }
                        }
                    }
                    Err(e) => {
                        error!("Read error from character {}: {}", player.character_id, e);
                        return Err(e.into());
                    }
                }
            }
        }
    }
}

/// Send one length-prefixed frame to the client.
async fn send_frame(socket: &mut TcpStream, payload: &[u8]) -> Result<()> {
    let len = payload.len() as u16;
    let mut message = Vec::with_capacity(2 + payload.len());
    message.extend_from_slice(&len.to_le_bytes());
    message.extend_from_slice(payload);

    socket.write_all(&message).await?;
    socket.flush().await?;
    Ok(())
}
