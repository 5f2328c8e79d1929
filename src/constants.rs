//! Game constants for the Mist Online 2 beauty server
//!
//! Fixed ids and caps are dictated by the v1.4 client and its shipped
//! game data; they cannot be changed without breaking the client.

// =============================================================================
// SERVER CONFIGURATION
// =============================================================================

pub const DEFAULT_PORT: u16 = 20360;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const MAX_TOTAL_CONNECTIONS: usize = 512;

/// Largest accepted command frame payload. Anything bigger is a broken or
/// hostile client and the connection is dropped.
pub const MAX_FRAME_SIZE: usize = 8192;

// =============================================================================
// ZONES
// =============================================================================

pub const DEFAULT_ZONE_ID: u32 = 1;

// =============================================================================
// NPC BEHAVIOR KINDS
// =============================================================================

pub const NPC_KIND_BANK: i16 = 2;
pub const NPC_KIND_SHOP: i16 = 13;

// =============================================================================
// FIXED SHOP IDS
// =============================================================================

/// Skin-tone changes always bill against this shop.
pub const SKIN_SHOP_ID: i32 = 501;
/// Dye commands always bill against this shop.
pub const DYE_SHOP_ID: i32 = 506;
/// Switching to a saved hair always bills against this shop.
pub const SAVED_HAIR_SHOP_ID: i32 = 510;

// =============================================================================
// HAIR & COSMETICS
// =============================================================================

/// Palette the random-hair roll draws colors from.
pub const RANDOM_HAIR_PALETTE_ID: i32 = 2;

/// Compensation item granted when the player rejects a random hair roll.
pub const RANDOM_HAIR_VOUCHER_ITEM_ID: i32 = 20300246;

/// Saved-hair collection capacity. Inserts are rejected once the count
/// exceeds 30, so the 31st save is the last one accepted.
pub const MAX_SAVED_HAIRS: usize = 31;

// =============================================================================
// VOUCHER TAGS
// =============================================================================

// An inventory item carrying one of these tags substitutes for the matching
// shop's currency cost.
pub const TAG_BEAUTY_HAIR: &str = "beauty_hair";
pub const TAG_BEAUTY_HAIR_SPECIAL: &str = "beauty_hair_special";
pub const TAG_BEAUTY_FACE: &str = "beauty_face";
pub const TAG_BEAUTY_MAKEUP: &str = "beauty_makeup";
pub const TAG_BEAUTY_SKIN: &str = "beauty_skin";
pub const TAG_BEAUTY_DYE: &str = "beauty_itemcolor";

// =============================================================================
// NOTICES
// =============================================================================

pub const NOTICE_ITEM_NOT_FOUND: &str = "Item not found";
