use serde::{Deserialize, Serialize};

/// Tuning knobs for a [`crate::Rig`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Compose sockets found in nested compositions with the precomposition
    /// layers that contain them. When off, a socket is evaluated in its owning
    /// composition only.
    pub compose_containers: bool,
    /// Seconds-per-frame basis for floating/pulse items. Defaults to the
    /// composition frame rate.
    pub frame_rate_override: Option<f32>,
    /// Memoise socket lookups by name for the lifetime of the rig.
    pub cache_sockets: bool,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            compose_containers: true,
            frame_rate_override: None,
            cache_sockets: true,
        }
    }
}
