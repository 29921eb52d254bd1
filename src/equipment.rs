use lottie_rig::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Where on the pet an item is worn. Ordering is the draw/report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Wings,
    Cape,
    Hair,
    Hat,
    Accessory,
}

/// Slot -> item mapping handed over by the app's state management.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Equipment {
    slots: BTreeMap<Slot, ItemId>,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `item` in `slot`, returning whatever was there before.
    pub fn equip(&mut self, slot: Slot, item: impl Into<ItemId>) -> Option<ItemId> {
        self.slots.insert(slot, item.into())
    }

    pub fn unequip(&mut self, slot: Slot) -> Option<ItemId> {
        self.slots.remove(&slot)
    }

    pub fn get(&self, slot: Slot) -> Option<&ItemId> {
        self.slots.get(&slot)
    }

    pub fn contains_item(&self, item: &ItemId) -> bool {
        self.slots.values().any(|equipped| equipped == item)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &ItemId)> {
        self.slots.iter().map(|(slot, item)| (*slot, item))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Tells the rig which slots have a visual element ready to receive a placement.
pub trait SlotSurface {
    fn is_mounted(&self, slot: Slot) -> bool;
}

/// Surface where every slot is always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllMounted;

impl SlotSurface for AllMounted {
    fn is_mounted(&self, _slot: Slot) -> bool {
        true
    }
}

impl SlotSurface for HashSet<Slot> {
    fn is_mounted(&self, slot: Slot) -> bool {
        self.contains(&slot)
    }
}

impl SlotSurface for BTreeSet<Slot> {
    fn is_mounted(&self, slot: Slot) -> bool {
        self.contains(&slot)
    }
}
