//! Per-session player aggregate

use serde::Deserialize;

use crate::constants::MAX_SAVED_HAIRS;

use super::equips::EquipSet;
use super::inventory::Inventory;
use super::item::{Item, SkinColor};
use super::wallet::Wallet;

/// Character gender, used to filter shop entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Gender {
    Male = 0,
    Female = 1,
    /// Matches either gender filter.
    Neutral = 2,
}

impl Gender {
    pub fn matches(self, other: Gender) -> bool {
        self == other || self == Gender::Neutral || other == Gender::Neutral
    }
}

/// Saved-hair collection plus the single-slot holder for the hair a random
/// roll displaced.
#[derive(Debug, Default)]
pub struct HairVault {
    saved: Vec<Item>,
    previous: Option<Item>,
}

impl HairVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> &[Item] {
        &self.saved
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    /// The collection accepts saves up to its capacity of 31 entries.
    pub fn is_full(&self) -> bool {
        self.saved.len() >= MAX_SAVED_HAIRS
    }

    /// Store a saved hair. Returns false, storing nothing, at capacity.
    pub fn try_save(&mut self, item: Item) -> bool {
        if self.is_full() {
            return false;
        }
        self.saved.push(item);
        true
    }

    pub fn get(&self, uid: i64) -> Option<&Item> {
        self.saved.iter().find(|item| item.uid == uid)
    }

    /// Remove a saved hair by uid, transferring ownership to the caller.
    pub fn take(&mut self, uid: i64) -> Option<Item> {
        let pos = self.saved.iter().position(|item| item.uid == uid)?;
        Some(self.saved.remove(pos))
    }

    /// Order the collection by creation time ascending, as listed to clients.
    pub fn sort_by_creation(&mut self) {
        self.saved.sort_by_key(|item| item.created_at);
    }

    /// Stash the hair displaced by a random roll, overwriting any earlier
    /// stash that was never resolved.
    pub fn stash_previous(&mut self, item: Item) {
        self.previous = Some(item);
    }

    pub fn take_previous(&mut self) -> Option<Item> {
        self.previous.take()
    }

    pub fn clear_previous(&mut self) {
        self.previous = None;
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

/// In-memory mutable state for one connected character.
///
/// Owned exclusively by the session task; handlers only ever touch it on
/// behalf of that player's own commands, so no locking is needed.
#[derive(Debug)]
pub struct Player {
    pub character_id: i64,
    pub name: String,
    pub gender: Gender,
    pub zone_id: u32,
    pub skin: SkinColor,
    pub wallet: Wallet,
    pub equips: EquipSet,
    pub inventory: Inventory,
    pub hair_vault: HairVault,
}

impl Player {
    pub fn new(character_id: i64, name: String, gender: Gender, zone_id: u32) -> Self {
        Self {
            character_id,
            name,
            gender,
            zone_id,
            skin: SkinColor::default(),
            wallet: Wallet::default(),
            equips: EquipSet::new(),
            inventory: Inventory::new(),
            hair_vault: HairVault::new(),
        }
    }
}
