//! Server-to-client packet builders
//!
//! Each function returns a complete payload (opcode + sub-mode + fields)
//! ready for framing. Fields are the minimum a client renderer needs:
//! character id, slot, instance uid, color, and shape sub-records where
//! the slot calls for them.

use crate::game::item::{Item, ItemSlot, SkinColor, FACE_DECOR_DATA_LEN};
use crate::metadata::{ShopEntry, ShopMetadata};

use super::types::{
    BeautyReply, SendOp, EQUIPMENT_MODE_EQUIP, EQUIPMENT_MODE_UNEQUIP, ITEM_DATA_MODE_COLOR,
    NOTICE_MODE_FAST_TEXT, SKIN_MODE_UPDATE,
};
use super::PacketWriter;

fn beauty_header(reply: BeautyReply) -> PacketWriter {
    let mut writer = PacketWriter::new();
    writer.write_u16(SendOp::Beauty.id()).write_u8(reply.value());
    writer
}

/// Standard shop listing with its purchasable entries.
pub fn beauty_shop(shop: &ShopMetadata, entries: &[&ShopEntry]) -> Vec<u8> {
    let mut writer = beauty_header(BeautyReply::Shop);
    writer
        .write_i32(shop.shop_id)
        .write_u8(shop.category as u8)
        .write_u8(shop.shop_type as u8)
        .write_u8(shop.currency as u8)
        .write_i32(shop.cost)
        .write_i32(shop.special_cost)
        .write_i32(shop.required_item_id)
        .write_u16(entries.len() as u16);
    for entry in entries {
        writer
            .write_i32(entry.item_id)
            .write_u8(entry.gender as u8)
            .write_u8(entry.currency as u8)
            .write_i32(entry.cost);
    }
    writer.into_bytes()
}

/// Compact listing used by shops of the dye type; no entry table.
pub fn dye_shop(shop: &ShopMetadata) -> Vec<u8> {
    let mut writer = beauty_header(BeautyReply::DyeShop);
    writer
        .write_i32(shop.shop_id)
        .write_u8(shop.currency as u8)
        .write_i32(shop.cost)
        .write_i32(shop.special_cost);
    writer.into_bytes()
}

/// Listing for the saved-hair shop window.
pub fn save_shop(shop: &ShopMetadata) -> Vec<u8> {
    let mut writer = beauty_header(BeautyReply::SaveShop);
    writer
        .write_i32(shop.shop_id)
        .write_u8(shop.currency as u8)
        .write_i32(shop.effective_cost());
    writer.into_bytes()
}

/// Capacity notice for the saved-hair window.
pub fn saved_hair_count(count: i16) -> Vec<u8> {
    let mut writer = beauty_header(BeautyReply::SavedHairCount);
    writer.write_i16(count);
    writer.into_bytes()
}

fn write_hair_fields(writer: &mut PacketWriter, item: &Item) {
    writer
        .write_i64(item.uid)
        .write_i32(item.id);
    item.color.encode(writer);
    match &item.hair {
        Some(hair) => {
            writer.write_bool(true);
            hair.encode(writer);
        }
        None => {
            writer.write_bool(false);
        }
    }
}

/// The saved-hair collection, in the order given.
pub fn saved_hair_list(hairs: &[Item]) -> Vec<u8> {
    let mut writer = beauty_header(BeautyReply::SavedHairList);
    writer.write_u16(hairs.len() as u16);
    for hair in hairs {
        write_hair_fields(&mut writer, hair);
        writer.write_i64(hair.created_at);
    }
    writer.into_bytes()
}

/// Outcome of a random hair roll: the displaced hair (if any) and the new
/// one, so the client can offer the keep/revert choice.
pub fn random_hair_option(previous: Option<(i64, i32)>, new_hair: &Item) -> Vec<u8> {
    let mut writer = beauty_header(BeautyReply::RandomHairOption);
    match previous {
        Some((uid, id)) => {
            writer.write_bool(true).write_i64(uid).write_i32(id);
        }
        None => {
            writer.write_bool(false);
        }
    }
    write_hair_fields(&mut writer, new_hair);
    writer.into_bytes()
}

/// Acknowledges the random-hair choice; carries the compensation voucher's
/// catalog id when the player reverted.
pub fn choose_random_hair(voucher_item_id: Option<i32>) -> Vec<u8> {
    let mut writer = beauty_header(BeautyReply::ChooseRandomHair);
    match voucher_item_id {
        Some(id) => {
            writer.write_bool(true).write_i32(id);
        }
        None => {
            writer.write_bool(false);
        }
    }
    writer.into_bytes()
}

/// Confirms a hair save: source instance plus the stored copy.
pub fn save_hair(source: &Item, copy: &Item) -> Vec<u8> {
    let mut writer = beauty_header(BeautyReply::SaveHair);
    writer
        .write_i64(source.uid)
        .write_i64(copy.uid)
        .write_i64(copy.created_at);
    writer.into_bytes()
}

pub fn delete_saved_hair(uid: i64) -> Vec<u8> {
    let mut writer = beauty_header(BeautyReply::DeleteSavedHair);
    writer.write_i64(uid);
    writer.into_bytes()
}

pub fn change_to_saved_hair() -> Vec<u8> {
    beauty_header(BeautyReply::ChangeToSavedHair).into_bytes()
}

/// Announces a voucher spend to the acting client.
pub fn use_voucher(item_id: i32, amount: u16) -> Vec<u8> {
    let mut writer = beauty_header(BeautyReply::UseVoucher);
    writer.write_i32(item_id).write_u16(amount);
    writer.into_bytes()
}

/// Zone broadcast: an item was equipped into a slot.
pub fn equip_item(character_id: i64, item: &Item, slot: ItemSlot) -> Vec<u8> {
    let mut writer = PacketWriter::new();
    writer
        .write_u16(SendOp::Equipment.id())
        .write_u8(EQUIPMENT_MODE_EQUIP)
        .write_i64(character_id)
        .write_u8(slot as u8)
        .write_i64(item.uid)
        .write_i32(item.id);
    item.color.encode(&mut writer);
    match slot {
        ItemSlot::Hair => {
            item.hair.unwrap_or_default().encode(&mut writer);
        }
        ItemSlot::FaceDecor => {
            writer.write_bytes(&item.face_decor.unwrap_or([0; FACE_DECOR_DATA_LEN]));
        }
        _ => {}
    }
    writer.into_bytes()
}

/// Zone broadcast: a slot's occupant was removed.
pub fn unequip_item(character_id: i64, uid: i64, slot: ItemSlot) -> Vec<u8> {
    let mut writer = PacketWriter::new();
    writer
        .write_u16(SendOp::Equipment.id())
        .write_u8(EQUIPMENT_MODE_UNEQUIP)
        .write_i64(character_id)
        .write_u8(slot as u8)
        .write_i64(uid);
    writer.into_bytes()
}

/// Zone broadcast: the player's skin tone changed.
pub fn skin_update(character_id: i64, skin: SkinColor) -> Vec<u8> {
    let mut writer = PacketWriter::new();
    writer
        .write_u16(SendOp::Skin.id())
        .write_u8(SKIN_MODE_UPDATE)
        .write_i64(character_id);
    skin.encode(&mut writer);
    writer.into_bytes()
}

/// Zone broadcast: an equipped item's color changed.
pub fn item_color_update(character_id: i64, item: &Item) -> Vec<u8> {
    let mut writer = PacketWriter::new();
    writer
        .write_u16(SendOp::ItemData.id())
        .write_u8(ITEM_DATA_MODE_COLOR)
        .write_i64(character_id)
        .write_i64(item.uid);
    item.color.encode(&mut writer);
    writer.into_bytes()
}

/// Direct best-effort text notice to the acting client.
pub fn notice(text: &str) -> Vec<u8> {
    let mut writer = PacketWriter::new();
    writer
        .write_u16(SendOp::Notice.id())
        .write_u8(NOTICE_MODE_FAST_TEXT)
        .write_string(text);
    writer.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::item::{EquipColor, HairData};
    use crate::game::player::Gender;
    use crate::game::wallet::CurrencyType;
    use crate::metadata::{ShopCategory, ShopType};

    #[test]
    fn test_equip_packet_layout() {
        let mut hat = Item::new(20100001);
        hat.uid = 0x0102030405060708;
        hat.color = EquipColor {
            primary: 0xAABBCCDD,
            secondary: 0,
            tertiary: 0,
            index: 1,
        };

        let packet = equip_item(77, &hat, ItemSlot::Hat);

        // opcode + mode + character id + slot + uid + catalog id + color
        assert_eq!(packet.len(), 2 + 1 + 8 + 1 + 8 + 4 + 16);
        assert_eq!(&packet[..3], hex::decode("400000").unwrap().as_slice());
        assert_eq!(packet[11], ItemSlot::Hat as u8);
    }

    #[test]
    fn test_equip_packet_carries_hair_shape() {
        let mut hair = Item::new(11000001);
        hair.hair = Some(HairData::default());

        let packet = equip_item(77, &hair, ItemSlot::Hair);
        assert_eq!(packet.len(), 2 + 1 + 8 + 1 + 8 + 4 + 16 + 56);
    }

    #[test]
    fn test_beauty_shop_entry_table() {
        let shop = ShopMetadata {
            shop_id: 504,
            category: ShopCategory::Standard,
            shop_type: ShopType::Hair,
            currency: CurrencyType::Coin,
            cost: 500,
            special_cost: 0,
            required_item_id: 0,
            entries: vec![
                ShopEntry {
                    item_id: 11000001,
                    gender: Gender::Male,
                    currency: CurrencyType::Coin,
                    cost: 500,
                    required_item_id: 0,
                },
                ShopEntry {
                    item_id: 11000002,
                    gender: Gender::Female,
                    currency: CurrencyType::Coin,
                    cost: 600,
                    required_item_id: 0,
                },
            ],
        };
        let entries: Vec<&ShopEntry> = shop.entries.iter().collect();

        let packet = beauty_shop(&shop, &entries);
        let head = 2 + 1 + 4 + 1 + 1 + 1 + 4 + 4 + 4;
        assert_eq!(
            u16::from_le_bytes([packet[head], packet[head + 1]]),
            2 // entry count
        );
    }

    #[test]
    fn test_notice_is_null_terminated() {
        let packet = notice("Item not found");
        assert_eq!(*packet.last().unwrap(), 0);
    }
}
