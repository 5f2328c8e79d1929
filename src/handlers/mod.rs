//! Command dispatch for the Mist Online 2 server
//!
//! Commands are routed through a two-level table: the u16 feature opcode
//! and the u8 sub-mode byte together pick a handler. The table is built
//! once at startup; each command is dispatched independently with no
//! cross-command state in the dispatcher itself.

pub mod beauty;
mod connection;

pub use connection::handle_connection;

use std::collections::HashMap;

use rand::RngCore;
use tracing::debug;

use crate::game::player::Player;
use crate::metadata::MetadataStore;
use crate::protocol::{PacketReader, ReadResult};

/// Packet delivery surface handed to handlers.
///
/// `broadcast` reaches every session observing the acting player's zone,
/// the acting session included; `reply` reaches the acting session only.
/// Implementations must deliver packets in the order they were sinked.
pub trait PacketSink {
    fn broadcast(&mut self, packet: Vec<u8>);
    fn reply(&mut self, packet: Vec<u8>);
}

/// Everything a handler may touch while processing one command.
///
/// The player reference is exclusive for the duration of the command, so
/// handlers mutate equipment, inventory, and wallet without locking. The
/// randomness source is injected so outcomes are reproducible under test.
pub struct CommandContext<'a> {
    pub player: &'a mut Player,
    pub metadata: &'a MetadataStore,
    pub sink: &'a mut dyn PacketSink,
    pub rng: &'a mut dyn RngCore,
}

/// A transaction handler: decode payload, resolve, validate/pay, mutate,
/// broadcast. Returns Err only for malformed payloads.
pub type HandlerFn = fn(&mut CommandContext<'_>, &mut PacketReader<'_>) -> ReadResult<()>;

/// The (opcode, sub-mode) -> handler table.
pub struct Dispatcher {
    table: HashMap<(u16, u8), HandlerFn>,
}

impl Dispatcher {
    /// Build the table with every supported feature channel registered.
    pub fn new() -> Self {
        let mut dispatcher = Self {
            table: HashMap::new(),
        };
        beauty::register(&mut dispatcher);
        dispatcher
    }

    pub fn register(&mut self, opcode: u16, mode: u8, handler: HandlerFn) {
        self.table.insert((opcode, mode), handler);
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Route one command frame payload (opcode + sub-mode + fields).
    ///
    /// Unknown (opcode, sub-mode) pairs and malformed payloads are logged
    /// and dropped; neither mutates state or reaches the client. No failure
    /// here ever terminates the session.
    pub fn dispatch(&self, ctx: &mut CommandContext<'_>, frame: &[u8]) {
        let mut reader = PacketReader::new(frame);
        let (opcode, mode) = match (reader.read_u16(), reader.read_u8()) {
            (Ok(opcode), Ok(mode)) => (opcode, mode),
            _ => {
                debug!("Dropping truncated command frame ({} bytes)", frame.len());
                return;
            }
        };

        match self.table.get(&(opcode, mode)) {
            Some(handler) => {
                if let Err(e) = handler(ctx, &mut reader) {
                    debug!(
                        "Malformed payload for command ({:#06X}, {:#04X}): {}",
                        opcode, mode, e
                    );
                }
            }
            None => {
                debug!("Unknown command ({:#06X}, {:#04X}) dropped", opcode, mode);
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_ZONE_ID;
    use crate::game::player::Gender;
    use crate::protocol::{PacketWriter, RecvOp};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct RecordingSink {
        broadcasts: Vec<Vec<u8>>,
        replies: Vec<Vec<u8>>,
    }

    impl PacketSink for RecordingSink {
        fn broadcast(&mut self, packet: Vec<u8>) {
            self.broadcasts.push(packet);
        }

        fn reply(&mut self, packet: Vec<u8>) {
            self.replies.push(packet);
        }
    }

    fn dispatch_frame(frame: &[u8]) -> RecordingSink {
        let dispatcher = Dispatcher::new();
        let store = MetadataStore::default();
        let mut player = Player::new(1, "test".to_string(), Gender::Male, DEFAULT_ZONE_ID);
        let mut sink = RecordingSink::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut ctx = CommandContext {
            player: &mut player,
            metadata: &store,
            sink: &mut sink,
            rng: &mut rng,
        };
        dispatcher.dispatch(&mut ctx, frame);
        sink
    }

    #[test]
    fn test_all_beauty_modes_registered() {
        let dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.len(), 10);
    }

    #[test]
    fn test_unknown_opcode_is_dropped() {
        let mut writer = PacketWriter::new();
        writer.write_u16(0x7777).write_u8(0x00).write_i32(1);
        let sink = dispatch_frame(writer.as_bytes());

        assert!(sink.broadcasts.is_empty());
        assert!(sink.replies.is_empty());
    }

    #[test]
    fn test_unknown_sub_mode_is_dropped() {
        let mut writer = PacketWriter::new();
        writer.write_u16(RecvOp::Beauty.id()).write_u8(0xEE);
        let sink = dispatch_frame(writer.as_bytes());

        assert!(sink.broadcasts.is_empty());
        assert!(sink.replies.is_empty());
    }

    #[test]
    fn test_truncated_frame_is_dropped() {
        let sink = dispatch_frame(&[0x5A]);

        assert!(sink.broadcasts.is_empty());
        assert!(sink.replies.is_empty());
    }
}
