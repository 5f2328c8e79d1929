//! Equipped-slot map with explicit ownership transfer
//!
//! Detach and attach are the only ways items move in and out; both make the
//! transfer explicit so handlers can sequence the unequip broadcast before
//! the equip broadcast.

use std::collections::HashMap;

use super::item::{Item, ItemSlot};

/// At most one item per slot; absence of a key means the slot is empty.
#[derive(Debug, Default)]
pub struct EquipSet {
    slots: HashMap<ItemSlot, Item>,
}

impl EquipSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: ItemSlot) -> Option<&Item> {
        self.slots.get(&slot)
    }

    pub fn is_occupied(&self, slot: ItemSlot) -> bool {
        self.slots.contains_key(&slot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Remove and return the slot's occupant, marking it unequipped.
    pub fn detach(&mut self, slot: ItemSlot) -> Option<Item> {
        let mut item = self.slots.remove(&slot)?;
        item.slot = None;
        Some(item)
    }

    /// Place an item into a slot, stamping its owning slot. Returns the
    /// displaced occupant, if any; callers that care about unequip events
    /// must detach first.
    pub fn attach(&mut self, slot: ItemSlot, mut item: Item) -> Option<Item> {
        item.slot = Some(slot);
        let mut displaced = self.slots.insert(slot, item);
        if let Some(prev) = displaced.as_mut() {
            prev.slot = None;
        }
        displaced
    }

    /// Locate an equipped item by instance uid.
    pub fn find_by_uid(&self, uid: i64) -> Option<(ItemSlot, &Item)> {
        self.slots
            .iter()
            .find(|(_, item)| item.uid == uid)
            .map(|(slot, item)| (*slot, item))
    }

    /// Locate an equipped item by instance uid, mutably.
    pub fn find_by_uid_mut(&mut self, uid: i64) -> Option<(ItemSlot, &mut Item)> {
        self.slots
            .iter_mut()
            .find(|(_, item)| item.uid == uid)
            .map(|(slot, item)| (*slot, item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_stamps_slot() {
        let mut equips = EquipSet::new();
        let hat = Item::new(20100001);
        assert_eq!(hat.slot, None);

        equips.attach(ItemSlot::Hat, hat);
        assert_eq!(
            equips.get(ItemSlot::Hat).unwrap().slot,
            Some(ItemSlot::Hat)
        );
    }

    #[test]
    fn test_detach_marks_unequipped() {
        let mut equips = EquipSet::new();
        equips.attach(ItemSlot::Hair, Item::new(11000001));

        let detached = equips.detach(ItemSlot::Hair).unwrap();
        assert_eq!(detached.slot, None);
        assert!(!equips.is_occupied(ItemSlot::Hair));
    }

    #[test]
    fn test_detach_empty_slot() {
        let mut equips = EquipSet::new();
        assert!(equips.detach(ItemSlot::Cape).is_none());
    }

    #[test]
    fn test_attach_returns_displaced_occupant() {
        let mut equips = EquipSet::new();
        let old = Item::new(11000001);
        let old_uid = old.uid;
        equips.attach(ItemSlot::Hair, old);

        let displaced = equips.attach(ItemSlot::Hair, Item::new(11000002)).unwrap();
        assert_eq!(displaced.uid, old_uid);
        assert_eq!(displaced.slot, None);
        assert_eq!(equips.len(), 1);
    }

    #[test]
    fn test_find_by_uid() {
        let mut equips = EquipSet::new();
        let top = Item::new(12000001);
        let uid = top.uid;
        equips.attach(ItemSlot::Top, top);

        let (slot, found) = equips.find_by_uid(uid).unwrap();
        assert_eq!(slot, ItemSlot::Top);
        assert_eq!(found.id, 12000001);
        assert!(equips.find_by_uid(uid + 1).is_none());
    }
}
