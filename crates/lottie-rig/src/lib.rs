//! Attachment retargeting for keyframed character rigs.
//!
//! Given an animation description and a set of equipped items, a [`Rig`]
//! resolves each item's socket layer, composes its world transform at the
//! current frame, maps it to container pixels and layers the item's own motion
//! on top. Output is plain [`Placement`] data; drawing is left to the caller.

pub mod animatable;
pub mod attachment;
pub mod config;
pub mod error;
pub mod library;
pub mod mapping;
pub mod socket;
pub mod transform;

pub use attachment::{
    AttachmentAnimation, AttachmentAnimator, AttachmentConfig, AttachmentState,
    AttachmentStates, FrameClock, ItemId, Placement, SocketPose,
};
pub use config::RigConfig;
pub use error::{AttachmentError, RigError};
pub use library::{CompositionId, CompositionLibrary, LayerSource};
pub use mapping::FrameGeometry;
pub use socket::{resolve_socket, LayerRef, ResolvedSocket};
pub use transform::{DecomposedTransform, LocalTransform};

use kurbo::Point;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// One item to place this frame.
#[derive(Debug, Clone, Copy)]
pub struct AttachmentRequest<'a> {
    pub item: &'a ItemId,
    pub config: &'a AttachmentConfig,
    /// Whether the presentation layer has a visual element ready for the item.
    pub mounted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemPlacement {
    pub item: ItemId,
    pub result: Result<Placement, AttachmentError>,
}

/// Per-character engine instance.
///
/// Holds the shared composition library plus everything that is specific to one
/// character on screen: its attachment state and its socket lookup cache. Rigs
/// never share mutable state, so any number can run side by side.
pub struct Rig {
    library: Arc<CompositionLibrary>,
    config: RigConfig,
    animator: AttachmentAnimator,
    sockets: HashMap<String, Option<ResolvedSocket>>,
    reported_misses: HashSet<String>,
}

impl Rig {
    pub fn new(library: Arc<CompositionLibrary>, config: RigConfig) -> Result<Self, RigError> {
        if let Some(fr) = config.frame_rate_override {
            if !(fr.is_finite() && fr > 0.0) {
                return Err(RigError::InvalidFrameRate(fr));
            }
        }
        Ok(Self {
            library,
            config,
            animator: AttachmentAnimator::new(),
            sockets: HashMap::new(),
            reported_misses: HashSet::new(),
        })
    }

    pub fn from_slice(bytes: &[u8], config: RigConfig) -> Result<Self, RigError> {
        let library = CompositionLibrary::from_slice(bytes)?;
        Self::new(Arc::new(library), config)
    }

    pub fn library(&self) -> &CompositionLibrary {
        &self.library
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    pub fn frame_rate(&self) -> f32 {
        self.config
            .frame_rate_override
            .unwrap_or(self.library.frame_rate)
    }

    pub fn states(&self) -> &AttachmentStates {
        self.animator.states()
    }

    fn lookup(&mut self, name: &str) -> Option<ResolvedSocket> {
        if self.config.cache_sockets {
            if let Some(cached) = self.sockets.get(name) {
                return cached.clone();
            }
        }
        let resolved = resolve_socket(&self.library, name);
        if resolved.is_none() && self.reported_misses.insert(name.to_string()) {
            tracing::debug!(socket = name, "socket not found in composition hierarchy");
        }
        if self.config.cache_sockets {
            self.sockets.insert(name.to_string(), resolved.clone());
        }
        resolved
    }

    /// Socket pose in container pixels at `frame`, without touching any item state.
    pub fn socket_pose(
        &mut self,
        socket: &str,
        frame: f32,
        inherit_rotation: f32,
        geometry: &FrameGeometry,
    ) -> Option<SocketPose> {
        let resolved = self.lookup(socket)?;
        let world = transform::socket_world_transform(
            &self.library,
            &resolved,
            frame,
            inherit_rotation,
            self.config.compose_containers,
        );
        let decomposed = DecomposedTransform::from_affine(&world);
        let position = geometry.to_container(Point::new(
            f64::from(decomposed.x),
            f64::from(decomposed.y),
        ))?;
        Some(SocketPose {
            position,
            rotation_degrees: f64::from(decomposed.rotation_degrees),
        })
    }

    /// Places one item. On error the item's state is left untouched.
    pub fn place(
        &mut self,
        frame: f32,
        geometry: &FrameGeometry,
        request: AttachmentRequest<'_>,
    ) -> Result<Placement, AttachmentError> {
        if !request.mounted {
            return Err(AttachmentError::MissingVisualElement(request.item.clone()));
        }
        if geometry.scale().is_none() {
            return Err(AttachmentError::InvalidGeometry);
        }

        let config = request.config;
        let pose = self
            .socket_pose(&config.socket, frame, config.inherit_rotation, geometry)
            .ok_or_else(|| AttachmentError::SocketNotFound {
                item: request.item.clone(),
                socket: config.socket.clone(),
            })?;

        let clock = FrameClock {
            frame: f64::from(frame),
            frame_rate: f64::from(self.frame_rate()),
        };
        Ok(self.animator.animate(request.item, config, &pose, clock))
    }

    /// Places every requested item for one frame.
    ///
    /// All items share `frame` and `geometry`; a failure for one item is
    /// reported in its own entry and does not affect the others. An item
    /// requested more than once is animated once and its placement reused.
    pub fn frame<'a>(
        &mut self,
        frame: f32,
        geometry: &FrameGeometry,
        requests: impl IntoIterator<Item = AttachmentRequest<'a>>,
    ) -> Vec<ItemPlacement> {
        let mut placed = HashMap::new();
        requests
            .into_iter()
            .map(|request| {
                let result = self.place_once(&mut placed, frame, geometry, request);
                if let Err(err) = &result {
                    tracing::trace!(item = %request.item, %err, "attachment skipped");
                }
                ItemPlacement {
                    item: request.item.clone(),
                    result,
                }
            })
            .collect()
    }

    /// [`Rig::place`], reusing the item's placement if it was already placed
    /// this frame. Physics items must integrate once per frame.
    pub fn place_once<'a>(
        &mut self,
        placed: &mut HashMap<&'a ItemId, Placement>,
        frame: f32,
        geometry: &FrameGeometry,
        request: AttachmentRequest<'a>,
    ) -> Result<Placement, AttachmentError> {
        if request.mounted {
            if let Some(placement) = placed.get(request.item) {
                return Ok(*placement);
            }
        }
        let placement = self.place(frame, geometry, request)?;
        placed.insert(request.item, placement);
        Ok(placement)
    }

    /// Drops runtime state of items for which `keep` returns false.
    pub fn retain_items(&mut self, keep: impl FnMut(&ItemId) -> bool) {
        self.animator.states_mut().retain(keep);
    }

    pub fn forget_item(&mut self, item: &ItemId) {
        self.animator.states_mut().remove(item);
    }

    /// Discards all per-item state and cached lookups.
    pub fn teardown(&mut self) {
        tracing::debug!(items = self.animator.states().len(), "rig teardown");
        self.animator.states_mut().clear();
        self.sockets.clear();
        self.reported_misses.clear();
    }
}

/// Looping playback position for hosts without their own frame driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playhead {
    pub current_frame: f32,
    in_point: f32,
    out_point: f32,
    frame_rate: f32,
}

impl Playhead {
    pub fn new(library: &CompositionLibrary) -> Self {
        Self {
            current_frame: library.in_point,
            in_point: library.in_point,
            out_point: library.out_point,
            frame_rate: library.frame_rate,
        }
    }

    /// Advances by `dt` seconds, wrapping past the out point.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.current_frame += dt * self.frame_rate;

        let duration = self.out_point - self.in_point;
        if duration <= 0.0 {
            self.current_frame = self.in_point;
        } else if self.current_frame >= self.out_point {
            self.current_frame = self.in_point + (self.current_frame - self.out_point) % duration;
        }
        self.current_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use serde_json::json;

    fn rig() -> Rig {
        let bytes = serde_json::to_vec(&json!({
            "fr": 30, "ip": 0, "op": 60, "w": 200, "h": 200,
            "layers": [
                { "ind": 1, "nm": "head_socket", "ks": { "p": { "a": 0, "k": [50, 40] } } }
            ]
        }))
        .unwrap();
        Rig::from_slice(&bytes, RigConfig::default()).unwrap()
    }

    fn geometry() -> FrameGeometry {
        FrameGeometry::new(
            Rect::new(0.0, 0.0, 200.0, 200.0),
            Rect::new(0.0, 0.0, 400.0, 400.0),
            Rect::new(0.0, 0.0, 400.0, 400.0),
        )
    }

    #[test]
    fn unmounted_item_is_skipped_without_state() {
        let mut rig = rig();
        let item = ItemId::new("tophat");
        let config = AttachmentConfig::new("head_socket", AttachmentAnimation::Static);

        let result = rig.place(
            0.0,
            &geometry(),
            AttachmentRequest {
                item: &item,
                config: &config,
                mounted: false,
            },
        );
        assert_eq!(result, Err(AttachmentError::MissingVisualElement(item.clone())));
        assert!(rig.states().is_empty());
    }

    #[test]
    fn zero_width_layout_is_invalid_geometry() {
        let mut rig = rig();
        let item = ItemId::new("tophat");
        let config = AttachmentConfig::new("head_socket", AttachmentAnimation::Static);
        let mut geometry = geometry();
        geometry.rendered = Rect::ZERO;

        let request = AttachmentRequest {
            item: &item,
            config: &config,
            mounted: true,
        };
        assert_eq!(rig.place(0.0, &geometry, request), Err(AttachmentError::InvalidGeometry));
    }

    #[test]
    fn overridden_frame_rate_must_be_positive() {
        let library = Arc::clone(&rig().library);
        let config = RigConfig {
            frame_rate_override: Some(0.0),
            ..RigConfig::default()
        };
        assert!(matches!(Rig::new(library, config), Err(RigError::InvalidFrameRate(_))));
    }

    #[test]
    fn socket_miss_is_reported_once_without_cache() {
        let library = Arc::clone(&rig().library);
        let config = RigConfig {
            cache_sockets: false,
            ..RigConfig::default()
        };
        let mut rig = Rig::new(library, config).unwrap();
        let item = ItemId::new("wings");
        let config = AttachmentConfig::new("wing_socket", AttachmentAnimation::Static);
        let request = AttachmentRequest {
            item: &item,
            config: &config,
            mounted: true,
        };

        for frame in 0..3 {
            assert!(rig.place(frame as f32, &geometry(), request).is_err());
        }
        assert!(rig.sockets.is_empty());
        assert_eq!(rig.reported_misses.len(), 1);

        rig.teardown();
        assert!(rig.reported_misses.is_empty());
    }

    #[test]
    fn playhead_loops_between_in_and_out() {
        let rig = rig();
        let mut playhead = Playhead::new(rig.library());
        assert_eq!(playhead.advance(1.0), 30.0);
        assert_eq!(playhead.advance(1.5), 15.0);
    }
}
