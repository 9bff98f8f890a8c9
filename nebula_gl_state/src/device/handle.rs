//! Weak resource handles as seen by the cache
//!
//! Handles are owned and allocated by the render-system layer; the cache
//! only compares them for equality and must never be their last owner.

/// Opaque device-side object name
pub type RawHandle = u32;

/// Reserved "nothing bound" handle value
pub const UNBOUND: RawHandle = 0;

/// Resource category a handle belongs to
///
/// Carried alongside every handle that crosses the release boundary so the
/// cache resolves the owning table with a plain match, without any runtime
/// type inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceCategory {
    Buffer,
    Texture,
    Sampler,
    Framebuffer,
    Renderbuffer,
    VertexArray,
    Program,
}

/// Tagged reference to a device resource: category plus raw handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRef {
    /// Category that selects the cache table(s) to scan
    pub category: ResourceCategory,
    /// Handle value about to be released or already released
    pub handle: RawHandle,
}

impl ResourceRef {
    /// Build a tagged reference
    pub fn new(category: ResourceCategory, handle: RawHandle) -> Self {
        Self { category, handle }
    }
}
