//! # Item Registry
//!
//! Lookup from equippable item id to its attachment configuration. The shop
//! and inventory own the catalogue; the rig only needs to know, for each id,
//! which socket to follow and how the item moves.

use anyhow::Context;
use lottie_rig::{AttachmentConfig, ItemId};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ItemRegistry {
    items: HashMap<ItemId, AttachmentConfig>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object mapping item ids to attachment configs.
    pub fn from_json(bytes: &[u8]) -> anyhow::Result<Self> {
        let items: HashMap<ItemId, AttachmentConfig> = serde_json::from_slice(bytes)
            .context("item registry is not a valid id -> config map")?;
        tracing::debug!(items = items.len(), "item registry loaded");
        Ok(Self { items })
    }

    pub fn insert(
        &mut self,
        item: impl Into<ItemId>,
        config: AttachmentConfig,
    ) -> Option<AttachmentConfig> {
        self.items.insert(item.into(), config)
    }

    pub fn get(&self, item: &ItemId) -> Option<&AttachmentConfig> {
        self.items.get(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<(ItemId, AttachmentConfig)> for ItemRegistry {
    fn from_iter<I: IntoIterator<Item = (ItemId, AttachmentConfig)>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lottie_rig::AttachmentAnimation;

    #[test]
    fn loads_catalogue_json() {
        let json = br#"{
            "tophat": { "socket": "hat_socket", "offset_y": -12, "scale": 0.9 },
            "angel_wings": {
                "socket": "back_socket",
                "animation": { "type": "floating", "amplitude": 6, "frequency": 1.2 }
            }
        }"#;

        let registry = ItemRegistry::from_json(json).unwrap();
        assert_eq!(registry.len(), 2);

        let hat = registry.get(&"tophat".into()).unwrap();
        assert_eq!(hat.offset_y, -12.0);
        assert_eq!(hat.animation, AttachmentAnimation::Static);

        let wings = registry.get(&"angel_wings".into()).unwrap();
        assert_eq!(
            wings.animation,
            AttachmentAnimation::Floating {
                amplitude: 6.0,
                frequency: 1.2,
                phase: 0.0
            }
        );
    }

    #[test]
    fn malformed_catalogue_reports_context() {
        let err = ItemRegistry::from_json(br#"{ "tophat": { "scale": 2 } }"#).unwrap_err();
        assert!(err.to_string().contains("item registry"));
    }
}
