/// Central device state cache for one rendering context.
///
/// Sits between high-level rendering commands and a backend `Applier`:
/// every operation compares against the cached state first, and only a
/// mismatch reaches the device. One instance exists per rendering context
/// and is driven by one thread at a time, the same affinity contract the
/// device context itself imposes, so no locking lives here.

use crate::device::{Applier, DeviceLimits, RawHandle, ResourceCategory, ResourceRef, UNBOUND};
use crate::error::Result;
use crate::{state_debug, state_trace};

use super::binding::{BindCategory, BindingTable, BufferTarget, FramebufferTarget, VertexArrayState};
use super::capability::{Capability, CapabilityExt, CapabilityState};
use super::common::{CommonState, CompareFunc, CullFaceMode, FrontFaceMode, LogicOp, PolygonMode};
use super::texture::{TextureTarget, TextureUnitState};
use super::viewport::{DepthRange, Scissor, Viewport, ViewportState};

/// Per-context device state cache
pub struct StateManager {
    applier: Box<dyn Applier>,
    limits: DeviceLimits,
    capabilities: CapabilityState,
    buffers: BindingTable,
    framebuffers: BindingTable,
    renderbuffer: BindingTable,
    program: BindingTable,
    samplers: BindingTable,
    textures: TextureUnitState,
    vertex_array: VertexArrayState,
    common: CommonState,
    viewports: ViewportState,
}

impl StateManager {
    /// Build a cache for a freshly created context
    ///
    /// Queries the device limits once and loads capability ground truth.
    /// The context must be current on the calling thread so the queries hit
    /// the right device.
    pub fn new(applier: Box<dyn Applier>) -> Self {
        let limits = applier.limits();
        let mut manager = Self {
            applier,
            limits,
            capabilities: CapabilityState::new(),
            buffers: BindingTable::new(BindCategory::Buffer, BufferTarget::COUNT, "buffer"),
            framebuffers: BindingTable::new(BindCategory::Framebuffer, FramebufferTarget::COUNT, "framebuffer"),
            renderbuffer: BindingTable::new(BindCategory::Renderbuffer, 1, "renderbuffer"),
            program: BindingTable::new(BindCategory::Program, 1, "program"),
            samplers: BindingTable::new(BindCategory::Sampler, limits.max_texture_units.max(1) as usize, "sampler"),
            textures: TextureUnitState::new(limits.max_texture_units),
            vertex_array: VertexArrayState::new(),
            common: CommonState::new(),
            viewports: ViewportState::new(limits.max_viewports),
        };
        manager.capabilities.reset(manager.applier.as_mut());
        state_debug!("nebulagl::StateManager",
            "state cache initialized ({} texture units, {} viewports)",
            manager.textures.unit_count(), manager.viewports.max_viewports());
        manager
    }

    /// Re-synchronize with device ground truth
    ///
    /// Required after foreign code sharing the context may have mutated
    /// state behind the cache's back. Limits and boolean capabilities are
    /// re-queried.
    pub fn reset(&mut self) {
        self.limits = self.applier.limits();
        self.capabilities.reset(self.applier.as_mut());
        state_debug!("nebulagl::StateManager", "state cache re-synchronized");
    }

    /// Device limits as queried at construction (or the last reset)
    pub fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    // ===== BOOLEAN CAPABILITIES =====

    /// Set a capability; no device call when the value is already cached
    pub fn set_capability(&mut self, capability: Capability, enabled: bool) -> Result<()> {
        self.capabilities.set(capability, enabled, self.applier.as_mut())
    }

    /// Enable a capability
    pub fn enable(&mut self, capability: Capability) -> Result<()> {
        self.set_capability(capability, true)
    }

    /// Disable a capability
    pub fn disable(&mut self, capability: Capability) -> Result<()> {
        self.set_capability(capability, false)
    }

    /// Cached capability value
    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.capabilities.is_enabled(capability)
    }

    /// Set an extended capability (contract violation when unavailable)
    pub fn set_ext_capability(&mut self, capability: CapabilityExt, enabled: bool) -> Result<()> {
        self.capabilities.set_ext(capability, enabled, self.applier.as_mut())
    }

    /// Cached extended capability value (contract violation when unavailable)
    pub fn is_ext_enabled(&self, capability: CapabilityExt) -> Result<bool> {
        self.capabilities.is_ext_enabled(capability)
    }

    /// Save a capability value for a later pop
    pub fn push_capability(&mut self, capability: Capability) {
        self.capabilities.push(capability)
    }

    /// Restore the most recently pushed capability
    pub fn pop_capability(&mut self) -> Result<()> {
        self.capabilities.pop(self.applier.as_mut())
    }

    /// Restore the `count` most recently pushed capabilities
    pub fn pop_capabilities(&mut self, count: usize) -> Result<()> {
        self.capabilities.pop_many(count, self.applier.as_mut())
    }

    // ===== BUFFERS =====

    /// Bind a buffer to a target
    pub fn bind_buffer(&mut self, target: BufferTarget, buffer: RawHandle) -> Result<()> {
        self.buffers.bind(target.slot(), buffer, self.applier.as_mut())
    }

    /// Bind buffers to a contiguous run of targets starting at `first`
    ///
    /// Only the first slot's cache entry is updated precisely; see
    /// `BindingTable::bind_range` for the policy.
    pub fn bind_buffer_range(&mut self, first: BufferTarget, buffers: &[RawHandle]) -> Result<()> {
        self.buffers.bind_range(first.slot(), buffers, self.applier.as_mut())
    }

    /// Save the binding of a buffer target
    pub fn push_bound_buffer(&mut self, target: BufferTarget) -> Result<()> {
        self.buffers.push(target.slot())
    }

    /// Restore the most recently pushed buffer binding
    pub fn pop_bound_buffer(&mut self) -> Result<()> {
        self.buffers.pop(self.applier.as_mut())
    }

    /// Restore the `count` most recently pushed buffer bindings
    pub fn pop_bound_buffers(&mut self, count: usize) -> Result<()> {
        self.buffers.pop_many(count, self.applier.as_mut())
    }

    /// Cached buffer binding; `None` when unknown
    pub fn bound_buffer(&self, target: BufferTarget) -> Option<RawHandle> {
        self.buffers.bound(target.slot())
    }

    // ===== VERTEX ARRAYS =====

    /// Bind a vertex array
    ///
    /// Switching vertex arrays implicitly changes which element-array
    /// buffer is bound; the coupling is handled here, see
    /// `VertexArrayState::bind`.
    pub fn bind_vertex_array(&mut self, vertex_array: RawHandle) -> Result<()> {
        self.vertex_array.bind(vertex_array, &mut self.buffers, self.applier.as_mut())
    }

    /// Attach an element-array buffer to the next vertex array (or to the
    /// current one, immediately)
    pub fn bind_element_array_to_vertex_array(&mut self, buffer: RawHandle) -> Result<()> {
        self.vertex_array.set_element_buffer(buffer, &mut self.buffers, self.applier.as_mut())
    }

    /// Cached vertex-array binding; `None` when unknown
    pub fn bound_vertex_array(&self) -> Option<RawHandle> {
        self.vertex_array.bound()
    }

    // ===== FRAMEBUFFERS =====

    /// Bind a framebuffer to the draw or read target
    pub fn bind_framebuffer(&mut self, target: FramebufferTarget, framebuffer: RawHandle) -> Result<()> {
        self.framebuffers.bind(target.slot(), framebuffer, self.applier.as_mut())
    }

    /// Save the binding of a framebuffer target
    pub fn push_bound_framebuffer(&mut self, target: FramebufferTarget) -> Result<()> {
        self.framebuffers.push(target.slot())
    }

    /// Restore the most recently pushed framebuffer binding
    pub fn pop_bound_framebuffer(&mut self) -> Result<()> {
        self.framebuffers.pop(self.applier.as_mut())
    }

    /// Cached framebuffer binding; `None` when unknown
    pub fn bound_framebuffer(&self, target: FramebufferTarget) -> Option<RawHandle> {
        self.framebuffers.bound(target.slot())
    }

    // ===== RENDERBUFFER =====

    /// Bind a renderbuffer
    pub fn bind_renderbuffer(&mut self, renderbuffer: RawHandle) -> Result<()> {
        self.renderbuffer.bind(0, renderbuffer, self.applier.as_mut())
    }

    /// Cached renderbuffer binding; `None` when unknown
    pub fn bound_renderbuffer(&self) -> Option<RawHandle> {
        self.renderbuffer.bound(0)
    }

    // ===== SHADER PROGRAM =====

    /// Bind a shader program
    pub fn bind_program(&mut self, program: RawHandle) -> Result<()> {
        self.program.bind(0, program, self.applier.as_mut())
    }

    /// Save the bound program for a later pop
    pub fn push_program(&mut self) -> Result<()> {
        self.program.push(0)
    }

    /// Restore the most recently pushed program
    pub fn pop_program(&mut self) -> Result<()> {
        self.program.pop(self.applier.as_mut())
    }

    /// Cached program binding; `None` when unknown
    pub fn bound_program(&self) -> Option<RawHandle> {
        self.program.bound(0)
    }

    // ===== SAMPLERS =====

    /// Bind a sampler to a texture unit
    pub fn bind_sampler(&mut self, unit: u32, sampler: RawHandle) -> Result<()> {
        self.samplers.bind(unit, sampler, self.applier.as_mut())
    }

    /// Bind samplers to a contiguous run of units starting at `first`
    pub fn bind_sampler_range(&mut self, first: u32, samplers: &[RawHandle]) -> Result<()> {
        self.samplers.bind_range(first, samplers, self.applier.as_mut())
    }

    /// Cached sampler binding; `None` when unknown
    pub fn bound_sampler(&self, unit: u32) -> Option<RawHandle> {
        self.samplers.bound(unit)
    }

    // ===== TEXTURES =====

    /// Select the active texture unit (deduplicated)
    pub fn active_texture(&mut self, unit: u32) -> Result<()> {
        self.textures.select_unit(unit, self.applier.as_mut())
    }

    /// Bind a texture to (unit, target); unit-select and bind are
    /// deduplicated independently
    pub fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: RawHandle) -> Result<()> {
        self.textures.bind(unit, target, texture, self.applier.as_mut())
    }

    /// Bind textures to a contiguous run of units; every touched cell is
    /// cached precisely
    pub fn bind_texture_range(
        &mut self,
        first: u32,
        targets: &[TextureTarget],
        textures: &[RawHandle],
    ) -> Result<()> {
        self.textures.bind_range(first, targets, textures, self.applier.as_mut())
    }

    /// Save the binding at (unit, target)
    pub fn push_bound_texture(&mut self, unit: u32, target: TextureTarget) -> Result<()> {
        self.textures.push(unit, target)
    }

    /// Save the binding at (active unit, target)
    pub fn push_bound_texture_active(&mut self, target: TextureTarget) {
        self.textures.push_active(target)
    }

    /// Restore the most recently pushed texture binding (re-selecting its
    /// unit when needed)
    pub fn pop_bound_texture(&mut self) -> Result<()> {
        self.textures.pop(self.applier.as_mut())
    }

    /// Restore the `count` most recently pushed texture bindings
    pub fn pop_bound_textures(&mut self, count: usize) -> Result<()> {
        self.textures.pop_many(count, self.applier.as_mut())
    }

    /// Cached texture binding; `None` when unknown
    pub fn bound_texture(&self, unit: u32, target: TextureTarget) -> Option<RawHandle> {
        self.textures.bound(unit, target)
    }

    /// Texture unit the cache believes is selected
    pub fn active_texture_unit(&self) -> u32 {
        self.textures.active_unit()
    }

    // ===== VIEWPORT / SCISSOR / DEPTH RANGE =====

    /// Update viewport 0
    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.viewports.set_viewport(viewport, self.applier.as_mut())
    }

    /// Update a run of viewports (contract violation past the device limit)
    pub fn set_viewport_array(&mut self, first: u32, viewports: &[Viewport]) -> Result<()> {
        self.viewports.set_viewport_array(first, viewports, self.applier.as_mut())
    }

    /// Update scissor 0
    pub fn set_scissor(&mut self, scissor: Scissor) -> Result<()> {
        self.viewports.set_scissor(scissor, self.applier.as_mut())
    }

    /// Update a run of scissors (contract violation past the device limit)
    pub fn set_scissor_array(&mut self, first: u32, scissors: &[Scissor]) -> Result<()> {
        self.viewports.set_scissor_array(first, scissors, self.applier.as_mut())
    }

    /// Update depth range 0
    pub fn set_depth_range(&mut self, range: DepthRange) -> Result<()> {
        self.viewports.set_depth_range(range, self.applier.as_mut())
    }

    /// Update a run of depth ranges (contract violation past the device limit)
    pub fn set_depth_range_array(&mut self, first: u32, ranges: &[DepthRange]) -> Result<()> {
        self.viewports.set_depth_range_array(first, ranges, self.applier.as_mut())
    }

    /// Cached viewport at `index`
    pub fn viewport(&self, index: u32) -> Option<Viewport> {
        self.viewports.viewport(index)
    }

    /// Cached scissor at `index`
    pub fn scissor(&self, index: u32) -> Option<Scissor> {
        self.viewports.scissor(index)
    }

    /// Cached depth range at `index`
    pub fn depth_range(&self, index: u32) -> Option<DepthRange> {
        self.viewports.depth_range(index)
    }

    // ===== COMMON STATES =====

    pub fn set_depth_func(&mut self, func: CompareFunc) -> Result<()> {
        self.common.set_depth_func(func, self.applier.as_mut())
    }

    pub fn set_cull_face(&mut self, mode: CullFaceMode) -> Result<()> {
        self.common.set_cull_face(mode, self.applier.as_mut())
    }

    pub fn set_front_face(&mut self, mode: FrontFaceMode) -> Result<()> {
        self.common.set_front_face(mode, self.applier.as_mut())
    }

    pub fn set_polygon_mode(&mut self, mode: PolygonMode) -> Result<()> {
        self.common.set_polygon_mode(mode, self.applier.as_mut())
    }

    pub fn set_polygon_offset(&mut self, factor: f32, units: f32, clamp: f32) -> Result<()> {
        self.common.set_polygon_offset(factor, units, clamp, self.applier.as_mut())
    }

    pub fn set_depth_mask(&mut self, mask: bool) -> Result<()> {
        self.common.set_depth_mask(mask, self.applier.as_mut())
    }

    pub fn set_blend_color(&mut self, color: [f32; 4]) -> Result<()> {
        self.common.set_blend_color(color, self.applier.as_mut())
    }

    pub fn set_logic_op(&mut self, op: LogicOp) -> Result<()> {
        self.common.set_logic_op(op, self.applier.as_mut())
    }

    /// Set the line width, clamped to the device-reported range
    pub fn set_line_width(&mut self, width: f32) -> Result<()> {
        self.common.set_line_width(width, &self.limits, self.applier.as_mut())
    }

    pub fn set_patch_vertices(&mut self, count: i32) -> Result<()> {
        self.common.set_patch_vertices(count, self.applier.as_mut())
    }

    /// Cached common scalar states
    pub fn common(&self) -> &CommonState {
        &self.common
    }

    // ===== RELEASE INVALIDATION =====

    /// Purge a destroyed resource from every cache table
    ///
    /// Must run before the handle value becomes eligible for reuse: a stale
    /// entry matching a recycled handle would make the cache elide a
    /// required bind of the new resource, silently rendering with the wrong
    /// one. No device call is issued here; the device already discarded the
    /// resource and unbound it itself.
    pub fn invalidate_resource(&mut self, resource: ResourceRef) {
        if resource.handle == UNBOUND {
            return;
        }
        let purged = match resource.category {
            ResourceCategory::Buffer => {
                self.vertex_array.invalidate_element_buffer(resource.handle)
                    + self.buffers.invalidate(resource.handle)
            }
            ResourceCategory::Texture => self.textures.invalidate(resource.handle),
            ResourceCategory::Sampler => self.samplers.invalidate(resource.handle),
            ResourceCategory::Framebuffer => self.framebuffers.invalidate(resource.handle),
            ResourceCategory::Renderbuffer => self.renderbuffer.invalidate(resource.handle),
            ResourceCategory::VertexArray => self.vertex_array.invalidate_vertex_array(resource.handle),
            ResourceCategory::Program => self.program.invalidate(resource.handle),
        };
        if purged > 0 {
            state_trace!("nebulagl::StateManager",
                "released {:?} handle {} purged from {} cache entries",
                resource.category, resource.handle, purged);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "state_manager_tests.rs"]
mod tests;
