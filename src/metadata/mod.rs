//! Static game data for the beauty server
//!
//! Loads shop, NPC, item, and color-palette tables from TOML files. The
//! tables are the single source of truth for costs, slots, voucher tags,
//! and hair presets; they are read-only after startup and shared across
//! session tasks without synchronization.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::game::item::{CoordF, EquipColor, ItemSlot};
use crate::game::player::Gender;
use crate::game::wallet::CurrencyType;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read data file {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse data file {path}: {source}")]
    ParseError {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// =============================================================================
// DESCRIPTORS
// =============================================================================

/// Coarse grouping that decides a shop's reply layout and special handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ShopCategory {
    Standard = 0,
    Special = 1,
    Dye = 2,
    Save = 3,
}

/// What the shop sells; also selects the voucher tag that can pay there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ShopType {
    Hair = 0,
    Face = 1,
    Makeup = 2,
    Skin = 3,
    Dye = 4,
}

/// One purchasable entry of a shop, with its own cost override.
#[derive(Debug, Clone, Deserialize)]
pub struct ShopEntry {
    pub item_id: i32,
    pub gender: Gender,
    pub currency: CurrencyType,
    pub cost: i32,
    #[serde(default)]
    pub required_item_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopMetadata {
    pub shop_id: i32,
    pub category: ShopCategory,
    pub shop_type: ShopType,
    pub currency: CurrencyType,
    pub cost: i32,
    /// Overrides `cost` when nonzero.
    #[serde(default)]
    pub special_cost: i32,
    /// Catalog item a barter-currency cost is denominated in.
    #[serde(default)]
    pub required_item_id: i32,
    #[serde(default, rename = "entry")]
    pub entries: Vec<ShopEntry>,
}

impl ShopMetadata {
    /// The amount a flat-cost purchase at this shop bills.
    pub fn effective_cost(&self) -> i32 {
        if self.special_cost != 0 {
            self.special_cost
        } else {
            self.cost
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NpcMetadata {
    pub id: i32,
    pub kind: i16,
    #[serde(default)]
    pub shop_id: i32,
}

/// Shape preset a random hair roll picks from. Lengths are sampled inside
/// `[min_scale, max_scale]`.
#[derive(Debug, Clone, Deserialize)]
pub struct HairPreset {
    pub min_scale: f32,
    pub max_scale: f32,
    #[serde(default)]
    pub back_position: CoordF,
    #[serde(default)]
    pub back_rotation: CoordF,
    #[serde(default)]
    pub front_position: CoordF,
    #[serde(default)]
    pub front_rotation: CoordF,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemMetadata {
    pub id: i32,
    /// Equip slot, when the item is equippable at all; vouchers and barter
    /// goods have none.
    #[serde(default)]
    pub slot: Option<ItemSlot>,
    #[serde(default)]
    pub tag: String,
    #[serde(default = "default_stack_limit")]
    pub stack_limit: i32,
    #[serde(default, rename = "hair_preset")]
    pub hair_presets: Vec<HairPreset>,
}

fn default_stack_limit() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColorPalette {
    pub id: i32,
    pub colors: Vec<EquipColor>,
}

// =============================================================================
// TOML DOCUMENTS
// =============================================================================

#[derive(Debug, Deserialize)]
struct ShopsDocument {
    #[serde(default, rename = "shop")]
    shops: Vec<ShopMetadata>,
}

#[derive(Debug, Deserialize)]
struct NpcsDocument {
    #[serde(default, rename = "npc")]
    npcs: Vec<NpcMetadata>,
}

#[derive(Debug, Deserialize)]
struct ItemsDocument {
    #[serde(default, rename = "item")]
    items: Vec<ItemMetadata>,
}

#[derive(Debug, Deserialize)]
struct PalettesDocument {
    #[serde(default, rename = "palette")]
    palettes: Vec<ColorPalette>,
}

fn load_document<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, MetadataError> {
    let text = std::fs::read_to_string(path).map_err(|source| MetadataError::IoError {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| MetadataError::ParseError {
        path: path.display().to_string(),
        source,
    })
}

// =============================================================================
// STORE
// =============================================================================

/// Process-wide lookup over the static tables, with derived indexes.
#[derive(Debug, Default)]
pub struct MetadataStore {
    shops: HashMap<i32, ShopMetadata>,
    npcs: HashMap<i32, Arc<NpcMetadata>>,
    items: HashMap<i32, ItemMetadata>,
    palettes: HashMap<i32, ColorPalette>,
    /// Catalog item id -> id of the cosmetic shop selling it.
    shop_by_item: HashMap<i32, i32>,
}

impl MetadataStore {
    /// Load `shops.toml`, `npcs.toml`, `items.toml`, and `palettes.toml`
    /// from a data directory.
    pub fn load(dir: &Path) -> Result<Self, MetadataError> {
        let shops: ShopsDocument = load_document(&dir.join("shops.toml"))?;
        let npcs: NpcsDocument = load_document(&dir.join("npcs.toml"))?;
        let items: ItemsDocument = load_document(&dir.join("items.toml"))?;
        let palettes: PalettesDocument = load_document(&dir.join("palettes.toml"))?;

        Ok(Self::from_tables(
            shops.shops,
            npcs.npcs,
            items.items,
            palettes.palettes,
        ))
    }

    /// Build a store directly from descriptor tables.
    pub fn from_tables(
        shops: Vec<ShopMetadata>,
        npcs: Vec<NpcMetadata>,
        items: Vec<ItemMetadata>,
        palettes: Vec<ColorPalette>,
    ) -> Self {
        let mut shop_by_item = HashMap::new();
        for shop in &shops {
            for entry in &shop.entries {
                shop_by_item.insert(entry.item_id, shop.shop_id);
            }
        }

        Self {
            shops: shops.into_iter().map(|s| (s.shop_id, s)).collect(),
            npcs: npcs.into_iter().map(|n| (n.id, Arc::new(n))).collect(),
            items: items.into_iter().map(|i| (i.id, i)).collect(),
            palettes: palettes.into_iter().map(|p| (p.id, p)).collect(),
            shop_by_item,
        }
    }

    pub fn get_shop(&self, shop_id: i32) -> Option<&ShopMetadata> {
        self.shops.get(&shop_id)
    }

    pub fn get_npc(&self, npc_id: i32) -> Option<&Arc<NpcMetadata>> {
        self.npcs.get(&npc_id)
    }

    pub fn get_item(&self, item_id: i32) -> Option<&ItemMetadata> {
        self.items.get(&item_id)
    }

    pub fn get_palette(&self, palette_id: i32) -> Option<&ColorPalette> {
        self.palettes.get(&palette_id)
    }

    /// The cosmetic shop whose entry list sells the given catalog item.
    pub fn cosmetic_shop_for_item(&self, item_id: i32) -> Option<&ShopMetadata> {
        self.shops.get(self.shop_by_item.get(&item_id)?)
    }

    /// A shop's entries filtered by character gender.
    pub fn gender_entries(&self, shop_id: i32, gender: Gender) -> Vec<&ShopEntry> {
        self.get_shop(shop_id)
            .map(|shop| {
                shop.entries
                    .iter()
                    .filter(|entry| entry.gender.matches(gender))
                    .collect()
            })
            .unwrap_or_default()
    }
}
