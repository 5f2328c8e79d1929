//! NPC runtime facade
//!
//! An NPC is its immutable metadata plus the little runtime state a spawned
//! instance carries. Shop resolution goes through here so handlers deal
//! with behavior predicates instead of raw kind codes.

use std::sync::Arc;

use crate::constants::{NPC_KIND_BANK, NPC_KIND_SHOP};
use crate::metadata::NpcMetadata;

/// A spawned NPC: shared metadata, own facing angle (degrees * 10).
#[derive(Debug, Clone)]
pub struct Npc {
    pub meta: Arc<NpcMetadata>,
    pub facing: i16,
}

impl Npc {
    pub fn new(meta: Arc<NpcMetadata>) -> Self {
        Self { meta, facing: 0 }
    }
}

/// Whether this NPC's behavior kind opens a shop.
pub fn is_shop(npc: &Npc) -> bool {
    npc.meta.kind == NPC_KIND_SHOP
}

/// Whether this NPC's behavior kind opens the bank.
pub fn is_bank(npc: &Npc) -> bool {
    npc.meta.kind == NPC_KIND_BANK
}
