//! Secondary motion for equipped items.
//!
//! Each item carries an [`AttachmentConfig`] naming the socket it follows and one
//! of four animation strategies. The [`AttachmentAnimator`] turns a resolved
//! socket pose into a [`Placement`] and owns the only state that survives
//! between frames: the smoothed angle of physics items.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

fn default_one() -> f64 {
    1.0
}

fn default_one_f32() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentConfig {
    /// Name of the socket layer inside the composition hierarchy.
    pub socket: String,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
    #[serde(default = "default_one")]
    pub scale: f64,
    /// Fraction of inherited rotation applied while composing the socket chain.
    #[serde(default = "default_one_f32")]
    pub inherit_rotation: f32,
    #[serde(default)]
    pub animation: AttachmentAnimation,
}

impl AttachmentConfig {
    pub fn new(socket: impl Into<String>, animation: AttachmentAnimation) -> Self {
        Self {
            socket: socket.into(),
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
            inherit_rotation: 1.0,
            animation,
        }
    }

    pub fn with_offset(mut self, dx: f64, dy: f64) -> Self {
        self.offset_x = dx;
        self.offset_y = dy;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    fn offset(&self) -> Vec2 {
        Vec2::new(self.offset_x, self.offset_y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AttachmentAnimation {
    #[default]
    Static,
    /// Rotation lags behind the socket, moving `damping` of the remaining
    /// distance every frame.
    Physics {
        follow: f64,
        damping: f64,
        #[serde(default, rename = "biasDegrees", alias = "bias_degrees")]
        bias_degrees: f64,
        #[serde(default)]
        invert: bool,
    },
    Floating {
        amplitude: f64,
        frequency: f64,
        #[serde(default)]
        phase: f64,
    },
    Pulse {
        #[serde(rename = "minScale", alias = "min_scale")]
        min_scale: f64,
        #[serde(rename = "maxScale", alias = "max_scale")]
        max_scale: f64,
        frequency: f64,
    },
}

/// Socket transform at this frame, already mapped to container pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SocketPose {
    pub position: Point,
    pub rotation_degrees: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    pub frame: f64,
    pub frame_rate: f64,
}

impl FrameClock {
    pub fn seconds(&self) -> f64 {
        if self.frame_rate > 0.0 {
            self.frame / self.frame_rate
        } else {
            0.0
        }
    }
}

/// Where and how to draw one item this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub pixel_x: f64,
    pub pixel_y: f64,
    pub rotation_degrees: f64,
    pub scale: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AttachmentState {
    pub initialized: bool,
    pub smoothed_angle: f64,
}

/// Per-item runtime state, at most one record per item id.
#[derive(Debug, Default)]
pub struct AttachmentStates {
    states: HashMap<ItemId, AttachmentState>,
}

impl AttachmentStates {
    pub fn get(&self, item: &ItemId) -> Option<&AttachmentState> {
        self.states.get(item)
    }

    fn entry(&mut self, item: &ItemId) -> &mut AttachmentState {
        let state = self.states.entry(item.clone()).or_default();
        if !state.initialized {
            tracing::trace!(item = %item, "attachment state initialized");
            *state = AttachmentState {
                initialized: true,
                smoothed_angle: 0.0,
            };
        }
        state
    }

    pub fn remove(&mut self, item: &ItemId) -> Option<AttachmentState> {
        self.states.remove(item)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&ItemId) -> bool) {
        self.states.retain(|item, _| keep(item));
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct AttachmentAnimator {
    states: AttachmentStates,
}

impl AttachmentAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> &AttachmentStates {
        &self.states
    }

    pub fn states_mut(&mut self) -> &mut AttachmentStates {
        &mut self.states
    }

    /// Applies `config`'s strategy on top of `pose`. Must be called at most once
    /// per item per frame: physics items integrate on every call.
    pub fn animate(
        &mut self,
        item: &ItemId,
        config: &AttachmentConfig,
        pose: &SocketPose,
        clock: FrameClock,
    ) -> Placement {
        let state = self.states.entry(item);
        let anchored = pose.position + config.offset();
        let mut placement = Placement {
            pixel_x: anchored.x,
            pixel_y: anchored.y,
            rotation_degrees: pose.rotation_degrees,
            scale: config.scale,
        };

        match config.animation {
            AttachmentAnimation::Static => {}
            AttachmentAnimation::Physics {
                follow,
                damping,
                bias_degrees,
                invert,
            } => {
                let target = if invert {
                    -pose.rotation_degrees
                } else {
                    pose.rotation_degrees
                };
                state.smoothed_angle += (target - state.smoothed_angle) * damping;
                placement.rotation_degrees = state.smoothed_angle * follow - bias_degrees;
            }
            AttachmentAnimation::Floating {
                amplitude,
                frequency,
                phase,
            } => {
                let t = clock.seconds();
                placement.pixel_y += (t * frequency * 2.0 + phase).sin() * amplitude;
            }
            AttachmentAnimation::Pulse {
                min_scale,
                max_scale,
                frequency,
            } => {
                let t = clock.seconds();
                let o = (t * frequency * TAU).sin() * 0.5 + 0.5;
                placement.scale = config.scale * (min_scale + (max_scale - min_scale) * o);
            }
        }

        placement
    }
}
