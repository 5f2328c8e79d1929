//! Game state management for the Mist Online 2 beauty server

pub mod equips;
pub mod inventory;
pub mod item;
pub mod player;
pub mod wallet;

pub use equips::EquipSet;
pub use inventory::Inventory;
pub use item::{CoordF, EquipColor, HairData, Item, ItemSlot, SkinColor};
pub use player::{Gender, HairVault, Player};
pub use wallet::{CurrencyType, Wallet};

use std::collections::HashSet;

use dashmap::DashMap;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// Global routing state: which characters observe which zone, and the
/// outbound packet queue for each live session.
///
/// Player state itself is never stored here; it stays owned by its session
/// task. Only delivery plumbing is shared.
pub struct GameState {
    zones: DashMap<u32, HashSet<i64>>,
    sessions: DashMap<Uuid, UnboundedSender<Vec<u8>>>,
    sessions_by_character: DashMap<i64, Uuid>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            zones: DashMap::new(),
            sessions: DashMap::new(),
            sessions_by_character: DashMap::new(),
        }
    }

    /// Register a session's outbound queue.
    pub fn register_session(
        &self,
        session_id: Uuid,
        character_id: i64,
        sender: UnboundedSender<Vec<u8>>,
    ) {
        self.sessions.insert(session_id, sender);
        self.sessions_by_character.insert(character_id, session_id);
    }

    pub fn unregister_session(&self, session_id: Uuid, character_id: i64) {
        self.sessions.remove(&session_id);
        self.sessions_by_character.remove(&character_id);
    }

    pub fn enter_zone(&self, zone_id: u32, character_id: i64) {
        self.zones.entry(zone_id).or_default().insert(character_id);
    }

    pub fn leave_zone(&self, zone_id: u32, character_id: i64) {
        if let Some(mut observers) = self.zones.get_mut(&zone_id) {
            observers.remove(&character_id);
        }
    }

    /// All characters currently observing a zone.
    pub fn zone_observers(&self, zone_id: u32) -> Vec<i64> {
        self.zones
            .get(&zone_id)
            .map(|observers| observers.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Deliver a packet to every session observing a zone, the acting
    /// session included. Sessions that disconnected mid-send are skipped.
    pub fn send_to_zone(&self, zone_id: u32, packet: &[u8]) {
        for character_id in self.zone_observers(zone_id) {
            let session_id = match self.sessions_by_character.get(&character_id) {
                Some(session_id) => *session_id,
                None => continue,
            };
            if let Some(sender) = self.sessions.get(&session_id) {
                let _ = sender.send(packet.to_vec());
            }
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
