/// Applier trait - the native device calls behind the cache

use crate::error::Result;
use crate::state::{
    BindCategory, Capability, CapabilityExt, CommonParam, DepthRange, Scissor,
    TextureTarget, Viewport,
};
use super::handle::RawHandle;

// ============================================================================
// Device limits
// ============================================================================

/// Device-reported maxima and feature availability
///
/// Queried once per context when the cache is built and again on `reset()`.
/// Validation of array counts and unit indices runs against these values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceLimits {
    /// Number of indexed viewports/scissors (the device guarantees at least 1)
    pub max_viewports: u32,

    /// Number of texture units the device exposes
    pub max_texture_units: u32,

    /// Smallest and largest selectable line width
    pub line_width_range: [f32; 2],

    /// Whether the conservative rasterization toggle is available
    pub conservative_raster: bool,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            max_viewports: 16,
            max_texture_units: 32,
            line_width_range: [1.0, 1.0],
            conservative_raster: false,
        }
    }
}

// ============================================================================
// Applier trait
// ============================================================================

/// Native device calls the cache forwards to on a miss
///
/// Implemented by backends. The cache invokes these verbs only when the
/// cached value differs from the requested one; a failure is propagated to
/// the caller unchanged and the corresponding cache entry keeps its
/// pre-call value, so a corrected retry stays consistent.
pub trait Applier: Send {
    /// Device-reported limits, fetched at construction and on reset
    fn limits(&self) -> DeviceLimits;

    /// Ground-truth query for one boolean capability (used by reset)
    fn query_capability(&self, capability: Capability) -> bool;

    /// Toggle a boolean capability
    fn apply_capability(&mut self, capability: Capability, enabled: bool) -> Result<()>;

    /// Toggle an extended/vendor capability
    fn apply_ext_capability(&mut self, capability: CapabilityExt, enabled: bool) -> Result<()>;

    /// Bind one resource to one slot of a category
    fn apply_bind(&mut self, category: BindCategory, slot: u32, handle: RawHandle) -> Result<()>;

    /// Bind a contiguous run of resources starting at `first`
    fn apply_bind_range(&mut self, category: BindCategory, first: u32, handles: &[RawHandle]) -> Result<()>;

    /// Select the active texture unit
    fn select_unit(&mut self, unit: u32) -> Result<()>;

    /// Bind a texture to the currently selected unit
    fn apply_texture_bind(&mut self, target: TextureTarget, handle: RawHandle) -> Result<()>;

    /// Bind a run of textures to contiguous units
    ///
    /// Must not disturb the selected unit.
    fn apply_texture_bind_range(
        &mut self,
        first: u32,
        targets: &[TextureTarget],
        handles: &[RawHandle],
    ) -> Result<()>;

    /// Update a run of viewport rectangles
    fn apply_viewports(&mut self, first: u32, viewports: &[Viewport]) -> Result<()>;

    /// Update a run of scissor rectangles
    fn apply_scissors(&mut self, first: u32, scissors: &[Scissor]) -> Result<()>;

    /// Update a run of depth ranges
    fn apply_depth_ranges(&mut self, first: u32, ranges: &[DepthRange]) -> Result<()>;

    /// Set one common scalar render state
    fn apply_common(&mut self, param: CommonParam) -> Result<()>;
}
