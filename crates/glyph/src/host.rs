use arena_common::Transform;
use serde::{Deserialize, Serialize};

/// Opaque handle to a visual object owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

/// Scene host that materialises glyph visuals.
///
/// The core asks for creation and destruction; it never inspects what the host
/// builds behind the handle.
pub trait VisualHost {
    /// Create a glyph visual at `pose` (position, rotation and scale).
    fn spawn_visual(&mut self, pose: &Transform) -> VisualHandle;

    /// Destroy a visual previously returned by `spawn_visual`.
    fn destroy_visual(&mut self, handle: VisualHandle);
}
