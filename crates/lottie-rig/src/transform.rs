//! Layer transforms: local evaluation, composition up the parent chain,
//! and decomposition back into translate/rotate/scale.
//!
//! All matrices are 2D affine (`glam::Affine2`, six coefficients) in composition
//! space, y pointing down. Positive rotation turns +x towards +y, which reads as
//! clockwise on screen, the same convention the authored rotation tracks use.

use crate::animatable::Animator;
use crate::library::{Composition, CompositionLibrary};
use crate::socket::{LayerRef, ResolvedSocket};
use glam::{Affine2, Vec2};
use lottie_data::model::{self as data, PositionProperty};
use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

fn warn_once(key: String, message: &'static str) {
    static SEEN: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();
    let store = SEEN.get_or_init(|| Mutex::new(HashSet::new()));
    if let Ok(mut seen) = store.lock() {
        if seen.insert(key.clone()) {
            tracing::warn!(layer = %key, "{message}");
        }
    }
}

fn check_track<T>(layer: &data::Layer, property: &str, prop: &data::Property<T>) {
    if prop.is_malformed() {
        warn_once(
            format!("{}:{property}", layer.name()),
            "track has no value or keyframes, using neutral default",
        );
    }
}

/// Evaluated transform properties of one layer at one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    pub position: Vec2,
    pub rotation_degrees: f32,
    /// Percent, 100 = identity.
    pub scale: Vec2,
    pub anchor: Vec2,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation_degrees: 0.0,
            scale: Vec2::splat(100.0),
            anchor: Vec2::ZERO,
        }
    }
}

impl LocalTransform {
    pub fn evaluate(layer: &data::Layer, frame: f32) -> Self {
        let ks = &layer.ks;

        // Unset components (2D tracks, malformed tracks) resolve to zero.
        let position = match &ks.p {
            PositionProperty::Unified(p) => {
                check_track(layer, "position", p);
                Animator::resolve(p, frame, |v| Vec2::new(v.0[0], v.0[1]), Vec2::ZERO)
            }
            PositionProperty::Split { x, y } => {
                check_track(layer, "position.x", x);
                check_track(layer, "position.y", y);
                Vec2::new(
                    Animator::resolve(x, frame, |v| *v, 0.0),
                    Animator::resolve(y, frame, |v| *v, 0.0),
                )
            }
        };

        check_track(layer, "scale", &ks.s);
        check_track(layer, "rotation", &ks.r);

        Self {
            position,
            rotation_degrees: Animator::resolve(&ks.r, frame, |v| *v, 0.0),
            scale: Animator::resolve(
                &ks.s,
                frame,
                |v| Vec2::new(v.0[0], v.0[1]),
                Vec2::splat(100.0),
            ),
            anchor: Animator::resolve(&ks.a, frame, |v| Vec2::new(v.0[0], v.0[1]), Vec2::ZERO),
        }
    }

    /// `T(position) * R(rotation * damping) * S(scale / 100) * T(-anchor)`.
    pub fn to_affine(&self, rotation_damping: f32) -> Affine2 {
        Affine2::from_translation(self.position)
            * Affine2::from_angle((self.rotation_degrees * rotation_damping).to_radians())
            * Affine2::from_scale(self.scale / 100.0)
            * Affine2::from_translation(-self.anchor)
    }
}

/// World transform of one layer inside its own composition.
///
/// Ancestors are collected iteratively and then composed from the topmost one
/// down, so `world = parent_world * local`. A parent cycle ends the chain at the
/// last layer not yet visited.
pub fn layer_world_transform(
    comp: &Composition,
    layer: usize,
    frame: f32,
    rotation_damping: f32,
) -> Affine2 {
    let mut chain = vec![layer];
    let mut visited = HashSet::from([layer]);
    let mut current = layer;
    loop {
        let Some(parent) = comp.parent_of(current) else {
            if let Some(dangling) = comp.layer(current).filter(|l| l.parent.is_some()) {
                warn_once(
                    format!("{}:{}:parent", comp.id, dangling.name()),
                    "parent index names no layer, treating as root",
                );
            }
            break;
        };
        if !visited.insert(parent) {
            let name = comp.layer(current).map(data::Layer::name).unwrap_or_default();
            warn_once(
                format!("{}:{name}:parent", comp.id),
                "parent chain forms a cycle, truncating",
            );
            break;
        }
        chain.push(parent);
        current = parent;
    }

    chain
        .iter()
        .rev()
        .filter_map(|&pos| comp.layer(pos))
        .fold(Affine2::IDENTITY, |world, layer| {
            world * LocalTransform::evaluate(layer, frame).to_affine(rotation_damping)
        })
}

fn layer_ref_transform(
    library: &CompositionLibrary,
    layer_ref: &LayerRef,
    frame: f32,
    rotation_damping: f32,
) -> Affine2 {
    library
        .composition(&layer_ref.composition)
        .map(|comp| layer_world_transform(comp, layer_ref.layer, frame, rotation_damping))
        .unwrap_or(Affine2::IDENTITY)
}

/// World transform of a resolved socket at `frame`, in root composition space.
///
/// With `compose_containers`, every enclosing precomposition layer contributes
/// its own world transform and shifts the local time of the composition it
/// nests by its start offset (`st`).
pub fn socket_world_transform(
    library: &CompositionLibrary,
    socket: &ResolvedSocket,
    frame: f32,
    rotation_damping: f32,
    compose_containers: bool,
) -> Affine2 {
    if !compose_containers {
        return layer_ref_transform(library, &socket.socket, frame, rotation_damping);
    }

    let mut world = Affine2::IDENTITY;
    let mut local_frame = frame;
    for container in &socket.containers {
        world = world * layer_ref_transform(library, container, local_frame, rotation_damping);
        let start = library
            .composition(&container.composition)
            .and_then(|comp| comp.layer(container.layer))
            .map_or(0.0, |layer| layer.st);
        local_frame -= start;
    }
    world * layer_ref_transform(library, &socket.socket, local_frame, rotation_damping)
}

/// Translation, rotation and per-axis scale read back from an affine matrix.
/// Shear is not representable and is silently folded into the result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecomposedTransform {
    pub x: f32,
    pub y: f32,
    pub rotation_degrees: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl DecomposedTransform {
    pub fn from_affine(m: &Affine2) -> Self {
        let col_x = m.matrix2.x_axis;
        let col_y = m.matrix2.y_axis;
        Self {
            x: m.translation.x,
            y: m.translation.y,
            rotation_degrees: col_x.y.atan2(col_x.x).to_degrees(),
            scale_x: col_x.length(),
            scale_y: col_y.length(),
        }
    }

    pub fn to_affine(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(
            Vec2::new(self.scale_x, self.scale_y),
            self.rotation_degrees.to_radians(),
            Vec2::new(self.x, self.y),
        )
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}
