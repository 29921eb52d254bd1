use crate::attachment::ItemId;

/// Failure building a rig from an animation description.
#[derive(thiserror::Error, Debug)]
pub enum RigError {
    #[error("failed to parse animation description: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("frame rate must be positive and finite, got {0}")]
    InvalidFrameRate(f32),
}

/// Why one item was not placed on one frame.
///
/// All variants are recoverable: the item is hidden for that frame and every
/// other item is processed as usual.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AttachmentError {
    /// Also reported when the only path to the socket runs through a
    /// composition reference cycle.
    #[error("socket `{socket}` not found for item `{item}`")]
    SocketNotFound { item: ItemId, socket: String },

    #[error("visual slot for item `{0}` is not mounted")]
    MissingVisualElement(ItemId),

    #[error("frame geometry is not laid out yet")]
    InvalidGeometry,

    #[error("item `{0}` is not in the registry")]
    UnknownItem(ItemId),
}
