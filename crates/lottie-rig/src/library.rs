//! Load-time view of the animation description.
//!
//! The library owns every composition (the root one plus each precomposition
//! asset) and precomputes, per layer, whether it nests another composition and
//! where its parent sits. It is immutable once built.

use crate::error::RigError;
use kurbo::Rect;
use lottie_data::model::{self as data, LottieJson};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CompositionId {
    Root,
    Asset(String),
}

impl fmt::Display for CompositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositionId::Root => f.write_str("<root>"),
            CompositionId::Asset(id) => f.write_str(id),
        }
    }
}

/// What a layer draws from: its own content, or a nested composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSource {
    Direct,
    Composition(String),
}

#[derive(Debug, Clone)]
pub struct Composition {
    pub id: CompositionId,
    pub layers: Vec<data::Layer>,
    sources: Vec<LayerSource>,
    by_index: HashMap<u32, usize>,
}

impl Composition {
    fn new(id: CompositionId, layers: Vec<data::Layer>) -> Self {
        let mut by_index = HashMap::new();
        for (pos, layer) in layers.iter().enumerate() {
            if let Some(ind) = layer.ind {
                // First declaration wins on duplicate indices.
                by_index.entry(ind).or_insert(pos);
            }
        }
        Self {
            id,
            sources: vec![LayerSource::Direct; layers.len()],
            layers,
            by_index,
        }
    }

    pub fn layer(&self, pos: usize) -> Option<&data::Layer> {
        self.layers.get(pos)
    }

    pub fn source(&self, pos: usize) -> &LayerSource {
        self.sources.get(pos).unwrap_or(&LayerSource::Direct)
    }

    /// Position of the parent layer of the layer at `pos`, if it has one that exists.
    pub fn parent_of(&self, pos: usize) -> Option<usize> {
        let parent_ind = self.layers.get(pos)?.parent?;
        self.by_index.get(&parent_ind).copied()
    }
}

pub struct CompositionLibrary {
    root: Composition,
    assets: HashMap<String, Composition>,
    pub frame_rate: f32,
    pub in_point: f32,
    pub out_point: f32,
    pub bounds: Rect,
}

impl CompositionLibrary {
    pub fn from_model(model: LottieJson) -> Result<Self, RigError> {
        if !(model.fr.is_finite() && model.fr > 0.0) {
            return Err(RigError::InvalidFrameRate(model.fr));
        }

        let mut assets = HashMap::new();
        for asset in model.assets {
            if let Some(layers) = asset.layers {
                let id = asset.id;
                assets.insert(id.clone(), Composition::new(CompositionId::Asset(id), layers));
            }
        }

        let mut library = Self {
            root: Composition::new(CompositionId::Root, model.layers),
            assets,
            frame_rate: model.fr,
            in_point: model.ip,
            out_point: model.op,
            bounds: Rect::new(0.0, 0.0, f64::from(model.w), f64::from(model.h)),
        };
        library.link_sources();

        tracing::debug!(
            precomps = library.assets.len(),
            root_layers = library.root.layers.len(),
            "composition library built"
        );
        Ok(library)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, RigError> {
        let model: LottieJson = serde_json::from_slice(bytes)?;
        Self::from_model(model)
    }

    fn link_sources(&mut self) {
        let known: Vec<String> = self.assets.keys().cloned().collect();
        let link = |comp: &mut Composition| {
            for (pos, layer) in comp.layers.iter().enumerate() {
                if let Some(ref_id) = &layer.ref_id {
                    if known.contains(ref_id) {
                        comp.sources[pos] = LayerSource::Composition(ref_id.clone());
                    }
                }
            }
        };
        link(&mut self.root);
        self.assets.values_mut().for_each(link);
    }

    pub fn root(&self) -> &Composition {
        &self.root
    }

    pub fn composition(&self, id: &CompositionId) -> Option<&Composition> {
        match id {
            CompositionId::Root => Some(&self.root),
            CompositionId::Asset(asset_id) => self.assets.get(asset_id),
        }
    }

    pub fn asset(&self, id: &str) -> Option<&Composition> {
        self.assets.get(id)
    }

    pub fn duration_frames(&self) -> f32 {
        (self.out_point - self.in_point).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn library(value: serde_json::Value) -> CompositionLibrary {
        let model: LottieJson = serde_json::from_value(value).unwrap();
        CompositionLibrary::from_model(model).unwrap()
    }

    #[test]
    fn links_only_refs_that_name_precomps() {
        let lib = library(json!({
            "fr": 30, "ip": 0, "op": 90, "w": 400, "h": 300,
            "layers": [
                { "ind": 1, "nm": "body", "refId": "comp_body" },
                { "ind": 2, "nm": "photo", "refId": "image_0" }
            ],
            "assets": [
                { "id": "comp_body", "layers": [{ "ind": 1, "nm": "head" }] },
                { "id": "image_0", "w": 10, "h": 10, "p": "img.png" }
            ]
        }));

        assert_eq!(
            lib.root().source(0),
            &LayerSource::Composition("comp_body".to_string())
        );
        assert_eq!(lib.root().source(1), &LayerSource::Direct);
        assert!(lib.asset("image_0").is_none());
        assert_eq!(lib.bounds, Rect::new(0.0, 0.0, 400.0, 300.0));
        assert_eq!(lib.duration_frames(), 90.0);
    }

    #[test]
    fn parent_lookup_ignores_dangling_indices() {
        let lib = library(json!({
            "fr": 24,
            "layers": [
                { "ind": 5, "nm": "root" },
                { "ind": 6, "nm": "child", "parent": 5 },
                { "ind": 7, "nm": "orphan", "parent": 99 }
            ]
        }));

        assert_eq!(lib.root().parent_of(1), Some(0));
        assert_eq!(lib.root().parent_of(0), None);
        assert_eq!(lib.root().parent_of(2), None);
    }

    #[test]
    fn rejects_non_positive_frame_rate() {
        let model: LottieJson = serde_json::from_value(json!({ "fr": 0, "layers": [] })).unwrap();
        assert!(matches!(
            CompositionLibrary::from_model(model),
            Err(RigError::InvalidFrameRate(_))
        ));
    }
}
