//! Beauty channel handlers (opcode 0x5A)
//!
//! Sub-mode payloads (all little-endian, color record = 3x u32 + i32 index):
//!
//! LoadShop (0x00):          npc_id (4) + category (1)
//! NewCosmetic (0x03):       reserved (1) + use_voucher (1) + item_id (4) +
//!                           color (16) + palette_id (4) + slot extras
//! ModifyExisting (0x05):    reserved (1) + use_voucher (1) + uid (8) +
//!                           color (16) + palette_id (4) + slot extras
//! ModifySkin (0x06):        reserved (1) + skin (8) + use_voucher (1)
//! RandomHair (0x07):        shop_id (4) + use_voucher (1)
//! ChooseRandomHair (0x0C):  selection (1), 0 = revert to previous
//! SaveHair (0x10):          uid (8)
//! DeleteSavedHair (0x12):   uid (8)
//! ChangeToSavedHair (0x15): uid (8)
//! DyeItem (0x16):           count (1) + per item: quantity (2) +
//!                           use_voucher (1) + reserved (1+8+4) + uid (8) +
//!                           item_id (4) + color (16) + palette_id (4)
//!                           [+ hat placement: 4 coords + scale, hat slot only]
//!
//! Slot extras: hair = shape record (56), face decoration = opaque blob (16),
//! anything else = none.

use rand::{Rng, RngCore};
use tracing::debug;

use crate::constants::{
    DYE_SHOP_ID, NOTICE_ITEM_NOT_FOUND, RANDOM_HAIR_PALETTE_ID, RANDOM_HAIR_VOUCHER_ITEM_ID,
    SAVED_HAIR_SHOP_ID, SKIN_SHOP_ID, TAG_BEAUTY_DYE, TAG_BEAUTY_FACE, TAG_BEAUTY_HAIR,
    TAG_BEAUTY_HAIR_SPECIAL, TAG_BEAUTY_MAKEUP, TAG_BEAUTY_SKIN,
};
use crate::game::item::{CoordF, EquipColor, HairData, Item, ItemSlot, SkinColor, FACE_DECOR_DATA_LEN};
use crate::game::wallet::CurrencyType;
use crate::metadata::{HairPreset, ShopCategory, ShopMetadata, ShopType};
use crate::npc::{self, Npc};
use crate::protocol::packets;
use crate::protocol::{BeautyMode, PacketReader, ReadResult, RecvOp};

use super::{CommandContext, Dispatcher};

/// Register every beauty sub-mode in the dispatch table.
pub fn register(dispatcher: &mut Dispatcher) {
    let op = RecvOp::Beauty.id();
    dispatcher.register(op, BeautyMode::LoadShop.value(), handle_load_shop);
    dispatcher.register(op, BeautyMode::NewCosmetic.value(), handle_new_cosmetic);
    dispatcher.register(op, BeautyMode::ModifyExisting.value(), handle_modify_existing);
    dispatcher.register(op, BeautyMode::ModifySkin.value(), handle_modify_skin);
    dispatcher.register(op, BeautyMode::RandomHair.value(), handle_random_hair);
    dispatcher.register(op, BeautyMode::ChooseRandomHair.value(), handle_choose_random_hair);
    dispatcher.register(op, BeautyMode::SaveHair.value(), handle_save_hair);
    dispatcher.register(op, BeautyMode::DeleteSavedHair.value(), handle_delete_saved_hair);
    dispatcher.register(op, BeautyMode::ChangeToSavedHair.value(), handle_change_to_saved_hair);
    dispatcher.register(op, BeautyMode::DyeItem.value(), handle_dye_item);
}

// =============================================================================
// SUB-MODE HANDLERS
// =============================================================================

/// LoadShop (0x00): read-only shop listing for the NPC the client talked to.
fn handle_load_shop(ctx: &mut CommandContext<'_>, reader: &mut PacketReader<'_>) -> ReadResult<()> {
    let npc_id = reader.read_i32()?;
    let _category = reader.read_u8()?;

    let npc_meta = match ctx.metadata.get_npc(npc_id) {
        Some(meta) => meta.clone(),
        None => return Ok(()),
    };
    let npc = Npc::new(npc_meta);
    if !npc::is_shop(&npc) {
        debug!("NPC {} has no shop behavior", npc_id);
        return Ok(());
    }

    let shop = match ctx.metadata.get_shop(npc.meta.shop_id) {
        Some(shop) => shop,
        None => return Ok(()),
    };

    match shop.category {
        ShopCategory::Dye => {
            // Two layouts: dye-type shops get the compact window, the rest
            // of the dye category uses the standard listing.
            if shop.shop_type == ShopType::Dye {
                ctx.sink.reply(packets::dye_shop(shop));
            } else {
                ctx.sink.reply(packets::beauty_shop(shop, &[]));
            }
        }
        ShopCategory::Save => {
            ctx.sink.reply(packets::save_shop(shop));
            ctx.player.hair_vault.sort_by_creation();
            ctx.sink
                .reply(packets::saved_hair_count(ctx.player.hair_vault.len() as i16));
            if !ctx.player.hair_vault.is_empty() {
                ctx.sink
                    .reply(packets::saved_hair_list(ctx.player.hair_vault.saved()));
            }
        }
        _ => {
            let entries = ctx.metadata.gender_entries(shop.shop_id, ctx.player.gender);
            ctx.sink.reply(packets::beauty_shop(shop, &entries));
        }
    }

    Ok(())
}

/// NewCosmetic (0x03): buy a fresh cosmetic and equip it.
fn handle_new_cosmetic(
    ctx: &mut CommandContext<'_>,
    reader: &mut PacketReader<'_>,
) -> ReadResult<()> {
    let _reserved = reader.read_u8()?;
    let use_voucher = reader.read_bool()?;
    let item_id = reader.read_i32()?;
    let color = EquipColor::decode(reader)?;
    let _palette_id = reader.read_i32()?;

    let (slot, tag) = match ctx.metadata.get_item(item_id) {
        Some(meta) => match meta.slot {
            Some(slot) => (slot, meta.tag.clone()),
            None => return Ok(()),
        },
        None => return Ok(()),
    };
    let extras = SlotPayload::decode(reader, slot)?;

    let shop = match ctx.metadata.cosmetic_shop_for_item(item_id) {
        Some(shop) => shop,
        None => return Ok(()),
    };
    let paid = if use_voucher {
        pay_with_voucher(ctx, shop)
    } else {
        pay_for_entry(ctx, shop, item_id)
    };
    if !paid {
        return Ok(());
    }

    let mut item = Item::new(item_id);
    item.color = color;
    item.tag = tag;
    extras.apply(&mut item);

    vacate_slot(ctx, slot);
    attach_and_announce(ctx, slot, item);
    Ok(())
}

/// ModifyExisting (0x05): recolor/reshape an already equipped cosmetic.
fn handle_modify_existing(
    ctx: &mut CommandContext<'_>,
    reader: &mut PacketReader<'_>,
) -> ReadResult<()> {
    let _reserved = reader.read_u8()?;
    let use_voucher = reader.read_bool()?;
    let uid = reader.read_i64()?;
    let color = EquipColor::decode(reader)?;
    let _palette_id = reader.read_i32()?;

    let (slot, item_id) = match ctx.player.equips.find_by_uid(uid) {
        Some((slot, item)) => (slot, item.id),
        None => return Ok(()),
    };
    let extras = SlotPayload::decode(reader, slot)?;

    let shop = match ctx.metadata.cosmetic_shop_for_item(item_id) {
        Some(shop) => shop,
        None => return Ok(()),
    };
    let paid = if use_voucher {
        pay_with_voucher(ctx, shop)
    } else {
        pay_with_shop_cost(ctx, shop)
    };
    if !paid {
        return Ok(());
    }

    // The modified item cycles through a full unequip/equip pair.
    let mut item = match ctx.player.equips.detach(slot) {
        Some(item) => item,
        None => return Ok(()),
    };
    ctx.sink
        .broadcast(packets::unequip_item(ctx.player.character_id, item.uid, slot));
    item.color = color;
    extras.apply(&mut item);
    attach_and_announce(ctx, slot, item);
    Ok(())
}

/// ModifySkin (0x06): pay the skin shop and retint the character.
fn handle_modify_skin(
    ctx: &mut CommandContext<'_>,
    reader: &mut PacketReader<'_>,
) -> ReadResult<()> {
    let _reserved = reader.read_u8()?;
    let skin = SkinColor::decode(reader)?;
    let use_voucher = reader.read_bool()?;

    let shop = match ctx.metadata.get_shop(SKIN_SHOP_ID) {
        Some(shop) => shop,
        None => return Ok(()),
    };
    let paid = if use_voucher {
        pay_with_voucher(ctx, shop)
    } else {
        pay_with_shop_cost(ctx, shop)
    };
    if !paid {
        return Ok(());
    }

    ctx.player.skin = skin;
    ctx.sink
        .broadcast(packets::skin_update(ctx.player.character_id, skin));
    Ok(())
}

/// RandomHair (0x07): pay, roll a new hair, and stash the displaced one so
/// the client can offer a revert.
fn handle_random_hair(
    ctx: &mut CommandContext<'_>,
    reader: &mut PacketReader<'_>,
) -> ReadResult<()> {
    let shop_id = reader.read_i32()?;
    let use_voucher = reader.read_bool()?;

    let shop = match ctx.metadata.get_shop(shop_id) {
        Some(shop) => shop,
        None => return Ok(()),
    };
    let entries = ctx.metadata.gender_entries(shop_id, ctx.player.gender);
    if entries.is_empty() {
        return Ok(());
    }
    let palette = match ctx.metadata.get_palette(RANDOM_HAIR_PALETTE_ID) {
        Some(palette) if !palette.colors.is_empty() => palette,
        _ => return Ok(()),
    };

    // The whole roll resolves before any charge.
    let entry = entries[ctx.rng.gen_range(0..entries.len())];
    let item_meta = match ctx.metadata.get_item(entry.item_id) {
        Some(meta) if !meta.hair_presets.is_empty() => meta,
        _ => return Ok(()),
    };
    let preset = &item_meta.hair_presets[ctx.rng.gen_range(0..item_meta.hair_presets.len())];
    let front_length = sample_scale(ctx.rng, preset);
    let back_length = sample_scale(ctx.rng, preset);
    let color = palette.colors[ctx.rng.gen_range(0..palette.colors.len())];

    let paid = if use_voucher {
        pay_with_voucher(ctx, shop)
    } else {
        pay_with_shop_cost(ctx, shop)
    };
    if !paid {
        return Ok(());
    }

    let mut new_hair = Item::new(entry.item_id);
    new_hair.tag = item_meta.tag.clone();
    new_hair.color = color;
    new_hair.hair = Some(HairData {
        back_length,
        front_length,
        back_position: preset.back_position,
        back_rotation: preset.back_rotation,
        front_position: preset.front_position,
        front_rotation: preset.front_rotation,
    });

    let previous = ctx.player.equips.detach(ItemSlot::Hair);
    let previous_summary = previous.as_ref().map(|item| (item.uid, item.id));
    if let Some(prev) = previous {
        ctx.sink.broadcast(packets::unequip_item(
            ctx.player.character_id,
            prev.uid,
            ItemSlot::Hair,
        ));
        ctx.player.hair_vault.stash_previous(prev);
    }

    let option = packets::random_hair_option(previous_summary, &new_hair);
    attach_and_announce(ctx, ItemSlot::Hair, new_hair);
    ctx.sink.reply(option);
    Ok(())
}

/// ChooseRandomHair (0x0C): resolve the keep/revert choice of a random roll.
fn handle_choose_random_hair(
    ctx: &mut CommandContext<'_>,
    reader: &mut PacketReader<'_>,
) -> ReadResult<()> {
    let selection = reader.read_u8()?;

    if selection == 0 {
        // Revert: put the stashed hair back and compensate with a voucher.
        let previous = match ctx.player.hair_vault.take_previous() {
            Some(item) => item,
            None => return Ok(()),
        };
        if let Some(current) = ctx.player.equips.detach(ItemSlot::Hair) {
            ctx.sink.broadcast(packets::unequip_item(
                ctx.player.character_id,
                current.uid,
                ItemSlot::Hair,
            ));
        }
        attach_and_announce(ctx, ItemSlot::Hair, previous);

        let mut voucher = Item::new(RANDOM_HAIR_VOUCHER_ITEM_ID);
        voucher.tag = ctx
            .metadata
            .get_item(RANDOM_HAIR_VOUCHER_ITEM_ID)
            .map(|meta| meta.tag.clone())
            .unwrap_or_default();
        let voucher_id = voucher.id;
        ctx.player.inventory.add(voucher);
        ctx.sink.reply(packets::choose_random_hair(Some(voucher_id)));
    } else {
        ctx.player.hair_vault.clear_previous();
        ctx.sink.reply(packets::choose_random_hair(None));
    }
    Ok(())
}

/// SaveHair (0x10): clone the equipped hair into the vault.
fn handle_save_hair(ctx: &mut CommandContext<'_>, reader: &mut PacketReader<'_>) -> ReadResult<()> {
    let uid = reader.read_i64()?;

    let hair = match ctx.player.equips.find_by_uid(uid) {
        Some((ItemSlot::Hair, item)) => item,
        _ => return Ok(()),
    };
    if ctx.player.hair_vault.is_full() {
        debug!("Saved-hair collection is full, rejecting save");
        return Ok(());
    }

    let copy = hair.duplicate();
    let confirmation = packets::save_hair(hair, &copy);
    if !ctx.player.hair_vault.try_save(copy) {
        return Ok(());
    }
    ctx.sink.reply(confirmation);
    Ok(())
}

/// DeleteSavedHair (0x12): drop a vault entry; missing uids are a no-op.
fn handle_delete_saved_hair(
    ctx: &mut CommandContext<'_>,
    reader: &mut PacketReader<'_>,
) -> ReadResult<()> {
    let uid = reader.read_i64()?;

    if ctx.player.hair_vault.take(uid).is_some() {
        ctx.sink.reply(packets::delete_saved_hair(uid));
    }
    Ok(())
}

/// ChangeToSavedHair (0x15): pay the switch fee and equip a vault entry.
/// The entry moves out of the vault; the collection shrinks by one.
fn handle_change_to_saved_hair(
    ctx: &mut CommandContext<'_>,
    reader: &mut PacketReader<'_>,
) -> ReadResult<()> {
    let uid = reader.read_i64()?;

    let item_id = match ctx.player.hair_vault.get(uid) {
        Some(item) => item.id,
        None => return Ok(()),
    };
    let slot = ctx
        .metadata
        .get_item(item_id)
        .and_then(|meta| meta.slot)
        .unwrap_or(ItemSlot::Hair);

    let shop = match ctx.metadata.get_shop(SAVED_HAIR_SHOP_ID) {
        Some(shop) => shop,
        None => return Ok(()),
    };
    if !pay_with_shop_cost(ctx, shop) {
        return Ok(());
    }

    let hair = match ctx.player.hair_vault.take(uid) {
        Some(item) => item,
        None => return Ok(()),
    };
    vacate_slot(ctx, slot);
    attach_and_announce(ctx, slot, hair);
    ctx.sink.reply(packets::change_to_saved_hair());
    Ok(())
}

/// DyeItem (0x16): recolor up to N equipped items in one command.
///
/// A uid that fails to resolve aborts the rest of the batch; items already
/// processed keep their new color.
fn handle_dye_item(ctx: &mut CommandContext<'_>, reader: &mut PacketReader<'_>) -> ReadResult<()> {
    let shop = match ctx.metadata.get_shop(DYE_SHOP_ID) {
        Some(shop) => shop,
        None => return Ok(()),
    };

    let count = reader.read_u8()?;
    for _ in 0..count {
        let _quantity = reader.read_i16()?;
        let use_voucher = reader.read_bool()?;
        let _reserved1 = reader.read_u8()?;
        let _reserved2 = reader.read_i64()?;
        let _reserved3 = reader.read_i32()?;
        let uid = reader.read_i64()?;
        let _item_id = reader.read_i32()?;
        let color = EquipColor::decode(reader)?;
        let _palette_id = reader.read_i32()?;

        let slot = match ctx.player.equips.find_by_uid(uid) {
            Some((slot, _)) => slot,
            None => return Ok(()),
        };
        if slot == ItemSlot::Hat {
            // Hat dyes carry a placement block; it is client-side only.
            let _position_x = CoordF::decode(reader)?;
            let _position_y = CoordF::decode(reader)?;
            let _position_z = CoordF::decode(reader)?;
            let _rotation = CoordF::decode(reader)?;
            let _scale = reader.read_i32()?;
        }

        let paid = if use_voucher {
            pay_with_voucher(ctx, shop)
        } else {
            pay_with_shop_cost(ctx, shop)
        };
        if !paid {
            return Ok(());
        }

        let packet = match ctx.player.equips.find_by_uid_mut(uid) {
            Some((_, item)) => {
                item.color = color;
                packets::item_color_update(ctx.player.character_id, item)
            }
            None => return Ok(()),
        };
        ctx.sink.broadcast(packet);
    }
    Ok(())
}

// =============================================================================
// SLOT SWAP
// =============================================================================

/// Decoded slot-specific tail of a cosmetic payload.
enum SlotPayload {
    Hair(HairData),
    FaceDecor([u8; FACE_DECOR_DATA_LEN]),
    None,
}

impl SlotPayload {
    /// Decode the extra fields a slot's payload carries. Reads are fixed-size
    /// per slot; nothing here branches on payload content.
    fn decode(reader: &mut PacketReader<'_>, slot: ItemSlot) -> ReadResult<Self> {
        match slot {
            ItemSlot::Hair => Ok(Self::Hair(HairData::decode(reader)?)),
            ItemSlot::FaceDecor => Ok(Self::FaceDecor(reader.read_fixed()?)),
            _ => Ok(Self::None),
        }
    }

    fn apply(self, item: &mut Item) {
        match self {
            Self::Hair(hair) => item.hair = Some(hair),
            Self::FaceDecor(data) => item.face_decor = Some(data),
            Self::None => {}
        }
    }
}

/// Detach a slot's occupant, if any, and broadcast the unequip.
fn vacate_slot(ctx: &mut CommandContext<'_>, slot: ItemSlot) -> Option<Item> {
    let prev = ctx.player.equips.detach(slot)?;
    ctx.sink
        .broadcast(packets::unequip_item(ctx.player.character_id, prev.uid, slot));
    Some(prev)
}

/// Attach an item and broadcast the equip. The state change commits before
/// the packet is enqueued, so observers never see an equip the equip set
/// does not already reflect.
fn attach_and_announce(ctx: &mut CommandContext<'_>, slot: ItemSlot, item: Item) {
    let packet = packets::equip_item(ctx.player.character_id, &item, slot);
    ctx.player.equips.attach(slot, item);
    ctx.sink.broadcast(packet);
}

fn sample_scale(rng: &mut dyn RngCore, preset: &HairPreset) -> f32 {
    preset.min_scale + (preset.max_scale - preset.min_scale) * rng.gen::<f32>()
}

// =============================================================================
// PAYMENT
// =============================================================================

/// Tag an inventory voucher must carry to pay at this shop.
fn voucher_tag(shop: &ShopMetadata) -> &'static str {
    match shop.shop_type {
        ShopType::Hair if shop.category == ShopCategory::Special => TAG_BEAUTY_HAIR_SPECIAL,
        ShopType::Hair => TAG_BEAUTY_HAIR,
        ShopType::Face => TAG_BEAUTY_FACE,
        ShopType::Makeup => TAG_BEAUTY_MAKEUP,
        ShopType::Skin => TAG_BEAUTY_SKIN,
        ShopType::Dye => TAG_BEAUTY_DYE,
    }
}

/// Consume one matching voucher. Fails with a notice when none is held.
fn pay_with_voucher(ctx: &mut CommandContext<'_>, shop: &ShopMetadata) -> bool {
    let tag = voucher_tag(shop);
    let (uid, item_id) = match ctx.player.inventory.find_by_tag(tag) {
        Some(voucher) => (voucher.uid, voucher.id),
        None => {
            ctx.sink.reply(packets::notice(NOTICE_ITEM_NOT_FOUND));
            return false;
        }
    };
    if !ctx.player.inventory.consume(uid, 1) {
        return false;
    }
    ctx.sink.reply(packets::use_voucher(item_id, 1));
    true
}

/// Charge a cost in the given currency. Barter costs consume the required
/// catalog item from inventory; everything else debits the wallet. Nothing
/// is charged unless the full amount is covered.
fn pay_cost(
    ctx: &mut CommandContext<'_>,
    currency: CurrencyType,
    cost: i32,
    required_item_id: i32,
) -> bool {
    if cost <= 0 {
        return true;
    }
    match currency {
        CurrencyType::Item => {
            let uid = match ctx.player.inventory.find_by_id(required_item_id) {
                Some(stack) if stack.amount >= cost => stack.uid,
                _ => return false,
            };
            ctx.player.inventory.consume(uid, cost)
        }
        _ => ctx.player.wallet.try_debit(currency, cost as i64),
    }
}

/// Charge the shop's flat cost (special cost wins when set).
fn pay_with_shop_cost(ctx: &mut CommandContext<'_>, shop: &ShopMetadata) -> bool {
    pay_cost(ctx, shop.currency, shop.effective_cost(), shop.required_item_id)
}

/// Charge the per-entry cost the shop lists for a specific catalog item.
fn pay_for_entry(ctx: &mut CommandContext<'_>, shop: &ShopMetadata, item_id: i32) -> bool {
    let entry = match shop.entries.iter().find(|entry| entry.item_id == item_id) {
        Some(entry) => entry,
        None => return false,
    };
    pay_cost(ctx, entry.currency, entry.cost, entry.required_item_id)
}
