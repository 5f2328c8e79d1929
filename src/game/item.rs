//! Item instances and the fixed-size wire records they carry
//!
//! Compound records (coordinates, colors, hair shape) are fixed-size and
//! decode with straight sequences of primitive reads; they never branch on
//! content, so a malformed payload always fails as an out-of-bounds read.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::Deserialize;

use crate::protocol::{PacketReader, PacketWriter, ReadResult};

/// Monotonic instance uid source, process-wide.
static NEXT_ITEM_UID: AtomicI64 = AtomicI64::new(1);

fn next_item_uid() -> i64 {
    NEXT_ITEM_UID.fetch_add(1, Ordering::SeqCst)
}

/// Equip slots understood by the client. The byte values are wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ItemSlot {
    Hair = 0x01,
    Face = 0x02,
    FaceDecor = 0x03,
    Hat = 0x04,
    Top = 0x05,
    Bottom = 0x06,
    Gloves = 0x07,
    Shoes = 0x08,
    Cape = 0x09,
    Earring = 0x0A,
}

impl ItemSlot {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Hair),
            0x02 => Some(Self::Face),
            0x03 => Some(Self::FaceDecor),
            0x04 => Some(Self::Hat),
            0x05 => Some(Self::Top),
            0x06 => Some(Self::Bottom),
            0x07 => Some(Self::Gloves),
            0x08 => Some(Self::Shoes),
            0x09 => Some(Self::Cape),
            0x0A => Some(Self::Earring),
            _ => None,
        }
    }
}

/// A 3-axis float coordinate (12 bytes on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct CoordF {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl CoordF {
    pub fn decode(reader: &mut PacketReader) -> ReadResult<Self> {
        Ok(Self {
            x: reader.read_f32()?,
            y: reader.read_f32()?,
            z: reader.read_f32()?,
        })
    }

    pub fn encode(&self, writer: &mut PacketWriter) {
        writer.write_f32(self.x).write_f32(self.y).write_f32(self.z);
    }
}

/// An equip color record (16 bytes on the wire): three packed RGBA colors
/// plus the palette index the client picked them from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct EquipColor {
    pub primary: u32,
    pub secondary: u32,
    pub tertiary: u32,
    pub index: i32,
}

impl EquipColor {
    pub fn decode(reader: &mut PacketReader) -> ReadResult<Self> {
        Ok(Self {
            primary: reader.read_u32()?,
            secondary: reader.read_u32()?,
            tertiary: reader.read_u32()?,
            index: reader.read_i32()?,
        })
    }

    pub fn encode(&self, writer: &mut PacketWriter) {
        writer
            .write_u32(self.primary)
            .write_u32(self.secondary)
            .write_u32(self.tertiary)
            .write_i32(self.index);
    }
}

/// A skin tone record (8 bytes on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct SkinColor {
    pub primary: u32,
    pub secondary: u32,
}

impl SkinColor {
    pub fn decode(reader: &mut PacketReader) -> ReadResult<Self> {
        Ok(Self {
            primary: reader.read_u32()?,
            secondary: reader.read_u32()?,
        })
    }

    pub fn encode(&self, writer: &mut PacketWriter) {
        writer.write_u32(self.primary).write_u32(self.secondary);
    }
}

/// Hair shape: front/back length scalars plus attachment coordinates for
/// both strands (56 bytes on the wire, back strand first).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HairData {
    pub back_length: f32,
    pub front_length: f32,
    pub back_position: CoordF,
    pub back_rotation: CoordF,
    pub front_position: CoordF,
    pub front_rotation: CoordF,
}

impl HairData {
    pub fn decode(reader: &mut PacketReader) -> ReadResult<Self> {
        let back_length = reader.read_f32()?;
        let back_position = CoordF::decode(reader)?;
        let back_rotation = CoordF::decode(reader)?;
        let front_length = reader.read_f32()?;
        let front_position = CoordF::decode(reader)?;
        let front_rotation = CoordF::decode(reader)?;
        Ok(Self {
            back_length,
            front_length,
            back_position,
            back_rotation,
            front_position,
            front_rotation,
        })
    }

    pub fn encode(&self, writer: &mut PacketWriter) {
        writer.write_f32(self.back_length);
        self.back_position.encode(writer);
        self.back_rotation.encode(writer);
        writer.write_f32(self.front_length);
        self.front_position.encode(writer);
        self.front_rotation.encode(writer);
    }
}

/// Width of the opaque face-decoration placement blob.
pub const FACE_DECOR_DATA_LEN: usize = 16;

/// A live item instance.
///
/// Exactly one container (equip set, inventory, or hair vault) owns an
/// instance at a time; moving between containers transfers ownership.
/// `slot` is `None` while the item is not equipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub uid: i64,
    pub id: i32,
    pub slot: Option<ItemSlot>,
    pub amount: i32,
    pub color: EquipColor,
    pub hair: Option<HairData>,
    pub face_decor: Option<[u8; FACE_DECOR_DATA_LEN]>,
    pub tag: String,
    pub created_at: i64,
}

impl Item {
    /// Create a fresh instance of a catalog item with a new uid and
    /// creation timestamp.
    pub fn new(id: i32) -> Self {
        Self {
            uid: next_item_uid(),
            id,
            slot: None,
            amount: 1,
            color: EquipColor::default(),
            hair: None,
            face_decor: None,
            tag: String::new(),
            created_at: Utc::now().timestamp(),
        }
    }

    /// Clone this item into a brand new instance: same catalog id, color,
    /// and sub-records, but a fresh uid and creation timestamp.
    pub fn duplicate(&self) -> Self {
        Self {
            uid: next_item_uid(),
            created_at: Utc::now().timestamp(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equip_color_round_trip() {
        let color = EquipColor {
            primary: 0xFF102030,
            secondary: 0xFF405060,
            tertiary: 0xFF708090,
            index: 7,
        };

        let mut writer = PacketWriter::new();
        color.encode(&mut writer);
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), 16);

        let mut reader = PacketReader::new(&bytes);
        assert_eq!(EquipColor::decode(&mut reader).unwrap(), color);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_hair_data_round_trip() {
        let hair = HairData {
            back_length: 12.0,
            front_length: 8.5,
            back_position: CoordF { x: 1.0, y: 2.0, z: 3.0 },
            back_rotation: CoordF { x: 0.0, y: 90.0, z: 0.0 },
            front_position: CoordF { x: -1.0, y: 0.5, z: 0.25 },
            front_rotation: CoordF { x: 45.0, y: 0.0, z: 0.0 },
        };

        let mut writer = PacketWriter::new();
        hair.encode(&mut writer);
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), 56);

        let mut reader = PacketReader::new(&bytes);
        assert_eq!(HairData::decode(&mut reader).unwrap(), hair);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_hair_data_truncated() {
        let mut writer = PacketWriter::new();
        HairData::default().encode(&mut writer);
        let mut bytes = writer.into_bytes();
        bytes.truncate(40);

        let mut reader = PacketReader::new(&bytes);
        assert!(HairData::decode(&mut reader).is_err());
    }

    #[test]
    fn test_fresh_uids() {
        let a = Item::new(100);
        let b = Item::new(100);
        assert_ne!(a.uid, b.uid);
    }

    #[test]
    fn test_duplicate_keeps_looks_but_not_identity() {
        let mut hair = Item::new(11000001);
        hair.color.primary = 0xAA;
        hair.hair = Some(HairData {
            back_length: 3.0,
            ..Default::default()
        });

        let copy = hair.duplicate();
        assert_eq!(copy.id, hair.id);
        assert_eq!(copy.color, hair.color);
        assert_eq!(copy.hair, hair.hair);
        assert_ne!(copy.uid, hair.uid);
    }

    #[test]
    fn test_slot_from_u8() {
        assert_eq!(ItemSlot::from_u8(0x01), Some(ItemSlot::Hair));
        assert_eq!(ItemSlot::from_u8(0x04), Some(ItemSlot::Hat));
        assert_eq!(ItemSlot::from_u8(0xBB), None);
    }
}
