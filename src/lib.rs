//! Equipped-item placement for the virtual pet.
//!
//! [`PetRig`] is the per-character entry point: feed it the current playback
//! frame, the layout snapshot for that frame and the pet's equipment, and it
//! returns one [`SlotPlacement`] per equipped slot for the presentation layer.

pub mod equipment;
pub mod registry;

pub use equipment::{AllMounted, Equipment, Slot, SlotSurface};
pub use lottie_rig::{
    AttachmentAnimation, AttachmentConfig, AttachmentError, CompositionLibrary, FrameGeometry,
    ItemId, Placement, Playhead, RigConfig,
};
pub use registry::ItemRegistry;

use anyhow::Context;
use lottie_rig::{AttachmentRequest, Rig};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct SlotPlacement {
    pub slot: Slot,
    pub item: ItemId,
    pub result: Result<Placement, AttachmentError>,
}

impl SlotPlacement {
    pub fn placement(&self) -> Option<&Placement> {
        self.result.as_ref().ok()
    }
}

pub struct PetRig {
    rig: Rig,
    registry: Arc<ItemRegistry>,
}

impl PetRig {
    pub fn new(
        library: Arc<CompositionLibrary>,
        registry: Arc<ItemRegistry>,
        config: RigConfig,
    ) -> anyhow::Result<Self> {
        let rig = Rig::new(library, config).context("invalid rig configuration")?;
        Ok(Self { rig, registry })
    }

    /// Builds a rig from the character animation JSON and the item catalogue JSON.
    pub fn load(animation: &[u8], catalogue: &[u8], config: RigConfig) -> anyhow::Result<Self> {
        let library =
            CompositionLibrary::from_slice(animation).context("failed to load pet animation")?;
        let registry = ItemRegistry::from_json(catalogue)?;
        Self::new(Arc::new(library), Arc::new(registry), config)
    }

    pub fn library(&self) -> &CompositionLibrary {
        self.rig.library()
    }

    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    /// Number of items currently holding runtime state.
    pub fn tracked_items(&self) -> usize {
        self.rig.states().len()
    }

    pub fn playhead(&self) -> Playhead {
        Playhead::new(self.rig.library())
    }

    /// Places every equipped item for `frame`.
    ///
    /// State of items no longer in `equipment` is dropped first, so an item
    /// that is unequipped and later re-equipped starts from rest. Failures are
    /// reported per slot and never stop the remaining slots. An item worn in
    /// several slots is animated once and every mounted slot gets the same
    /// placement.
    pub fn frame(
        &mut self,
        frame: f32,
        geometry: &FrameGeometry,
        equipment: &Equipment,
        surface: &impl SlotSurface,
    ) -> Vec<SlotPlacement> {
        self.rig.retain_items(|item| equipment.contains_item(item));

        let registry = &self.registry;
        let rig = &mut self.rig;
        let mut placed = HashMap::new();
        equipment
            .iter()
            .map(|(slot, item)| {
                let result = match registry.get(item) {
                    Some(config) => rig.place_once(
                        &mut placed,
                        frame,
                        geometry,
                        AttachmentRequest {
                            item,
                            config,
                            mounted: surface.is_mounted(slot),
                        },
                    ),
                    None => Err(AttachmentError::UnknownItem(item.clone())),
                };
                if let Err(err) = &result {
                    tracing::trace!(?slot, item = %item, %err, "slot skipped this frame");
                }
                SlotPlacement {
                    slot,
                    item: item.clone(),
                    result,
                }
            })
            .collect()
    }

    /// Removes the item in `slot` and drops its runtime state right away.
    pub fn unequip(&mut self, equipment: &mut Equipment, slot: Slot) -> Option<ItemId> {
        let item = equipment.unequip(slot)?;
        if !equipment.contains_item(&item) {
            self.rig.forget_item(&item);
        }
        Some(item)
    }

    /// Called when the hosting animation stops; nothing carries over to the next start.
    pub fn teardown(&mut self) {
        self.rig.teardown();
    }
}
