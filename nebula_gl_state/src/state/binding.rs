//! Slot-indexed binding caches
//!
//! One `BindingTable` per resource category maps a slot index to the handle
//! the device is believed to have bound there. `Some(h)` is a known
//! binding, `None` an unknown one: unknown entries never match, so the next
//! bind to that slot always reaches the device. A cached entry equals the
//! real device binding at all times, except between a resource release and
//! its invalidation scan, which runs before the handle can be recycled.

use crate::device::{Applier, RawHandle, UNBOUND};
use crate::error::Result;
use crate::state_bail;
use super::scope::ScopeStack;

// ===== CATEGORIES AND TARGETS =====

/// Resource category a binding table caches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindCategory {
    Buffer,
    Framebuffer,
    Renderbuffer,
    VertexArray,
    Program,
    Sampler,
}

/// Buffer bind points (slot indices within the Buffer category)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    Array,
    AtomicCounter,
    CopyRead,
    CopyWrite,
    DispatchIndirect,
    DrawIndirect,
    ElementArray,
    PixelPack,
    PixelUnpack,
    Query,
    ShaderStorage,
    Texture,
    TransformFeedback,
    Uniform,
}

impl BufferTarget {
    /// Number of buffer bind points
    pub const COUNT: usize = 14;

    /// Slot index within the Buffer category
    pub fn slot(self) -> u32 {
        self as u32
    }
}

/// Framebuffer bind points (separate draw and read attachments)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferTarget {
    Draw,
    Read,
}

impl FramebufferTarget {
    /// Number of framebuffer bind points
    pub const COUNT: usize = 2;

    /// Slot index within the Framebuffer category
    pub fn slot(self) -> u32 {
        self as u32
    }
}

// ===== BINDING TABLE =====

/// Saved slot value for push/pop
#[derive(Debug, Clone, Copy)]
struct SlotEntry {
    slot: u32,
    saved: Option<RawHandle>,
}

/// Slot-indexed cache for one resource category
pub struct BindingTable {
    category: BindCategory,
    slots: Vec<Option<RawHandle>>,
    stack: ScopeStack<SlotEntry>,
}

impl BindingTable {
    /// Create a table with every slot known-unbound (a fresh context binds
    /// nothing anywhere)
    pub fn new(category: BindCategory, slot_count: usize, label: &'static str) -> Self {
        Self {
            category,
            slots: vec![Some(UNBOUND); slot_count],
            stack: ScopeStack::new(label),
        }
    }

    fn check_slot(&self, slot: u32) -> Result<()> {
        if slot as usize >= self.slots.len() {
            state_bail!("nebulagl::BindingTable",
                "{:?} slot {} out of range ({} slots)",
                self.category, slot, self.slots.len());
        }
        Ok(())
    }

    /// Bind `handle` to `slot`; forwards to the device only on a cache miss
    pub fn bind(&mut self, slot: u32, handle: RawHandle, applier: &mut dyn Applier) -> Result<()> {
        self.check_slot(slot)?;
        if self.slots[slot as usize] != Some(handle) {
            applier.apply_bind(self.category, slot, handle)?;
            self.slots[slot as usize] = Some(handle);
        }
        Ok(())
    }

    /// Bind a contiguous run of handles starting at `first`
    ///
    /// Policy: the run is forwarded whole, the first slot's entry is
    /// updated precisely and the remaining entries are marked unknown.
    /// Callers of range binds typically re-touch only the first slot right
    /// away; the other slots trade a possibly redundant re-bind later for a
    /// simpler cache.
    pub fn bind_range(&mut self, first: u32, handles: &[RawHandle], applier: &mut dyn Applier) -> Result<()> {
        if handles.is_empty() {
            return Ok(());
        }
        let last = first as usize + handles.len() - 1;
        if last >= self.slots.len() {
            state_bail!("nebulagl::BindingTable",
                "{:?} range bind [{}..={}] out of range ({} slots)",
                self.category, first, last, self.slots.len());
        }
        applier.apply_bind_range(self.category, first, handles)?;
        self.slots[first as usize] = Some(handles[0]);
        for slot in first as usize + 1..=last {
            self.slots[slot] = None;
        }
        Ok(())
    }

    /// Cached handle at `slot`; `None` when unknown or out of range
    pub fn bound(&self, slot: u32) -> Option<RawHandle> {
        self.slots.get(slot as usize).copied().flatten()
    }

    /// Save the current value of `slot`
    pub fn push(&mut self, slot: u32) -> Result<()> {
        self.check_slot(slot)?;
        self.stack.push(SlotEntry {
            slot,
            saved: self.slots[slot as usize],
        });
        Ok(())
    }

    /// Restore the most recently pushed slot through the normal bind path
    ///
    /// A slot that was unknown at push time is marked unknown again instead
    /// of guessing a handle to re-bind.
    pub fn pop(&mut self, applier: &mut dyn Applier) -> Result<()> {
        let entry = self.stack.pop()?;
        self.restore(entry, applier)
    }

    /// Restore the `count` most recently pushed slots
    pub fn pop_many(&mut self, count: usize, applier: &mut dyn Applier) -> Result<()> {
        for entry in self.stack.pop_many(count)? {
            self.restore(entry, applier)?;
        }
        Ok(())
    }

    fn restore(&mut self, entry: SlotEntry, applier: &mut dyn Applier) -> Result<()> {
        match entry.saved {
            Some(handle) => self.bind(entry.slot, handle, applier),
            None => {
                self.slots[entry.slot as usize] = None;
                Ok(())
            }
        }
    }

    /// Purge every entry holding `handle` after the resource died
    ///
    /// The device unbinds deleted objects from the current context itself,
    /// so matching entries become known-unbound and no device call is
    /// issued. Returns the number of purged entries.
    pub fn invalidate(&mut self, handle: RawHandle) -> usize {
        if handle == UNBOUND {
            return 0;
        }
        let mut purged = 0;
        for slot in self.slots.iter_mut() {
            if *slot == Some(handle) {
                *slot = Some(UNBOUND);
                purged += 1;
            }
        }
        purged
    }

    /// Mark one slot unknown (the device changed it behind the cache)
    pub fn invalidate_slot(&mut self, slot: u32) {
        if let Some(entry) = self.slots.get_mut(slot as usize) {
            *entry = None;
        }
    }

    /// Current scope depth
    pub fn scope_depth(&self) -> usize {
        self.stack.depth()
    }
}

// ===== VERTEX ARRAY COUPLING =====

/// Vertex-array binding plus its element-array coupling
///
/// The element-array binding lives inside the vertex array object on the
/// device: switching vertex arrays silently swaps it, without any explicit
/// bind call. The cache therefore marks the element-array slot unknown on
/// every switch, and keeps an "element buffer for the next vertex array"
/// register that is re-attached through the normal cached bind path.
pub struct VertexArrayState {
    bound: Option<RawHandle>,
    deferred_element_buffer: RawHandle,
}

impl VertexArrayState {
    /// Fresh context: no vertex array bound, no element buffer pending
    pub fn new() -> Self {
        Self {
            bound: Some(UNBOUND),
            deferred_element_buffer: UNBOUND,
        }
    }

    /// Bind a vertex array
    ///
    /// On a switch the element-array slot of the buffer table is marked
    /// unknown, then the deferred element buffer (if any) is re-attached.
    pub fn bind(
        &mut self,
        vertex_array: RawHandle,
        buffers: &mut BindingTable,
        applier: &mut dyn Applier,
    ) -> Result<()> {
        if self.bound == Some(vertex_array) {
            return Ok(());
        }
        applier.apply_bind(BindCategory::VertexArray, 0, vertex_array)?;
        self.bound = Some(vertex_array);

        // the new vertex array brought its own element-array binding
        buffers.invalidate_slot(BufferTarget::ElementArray.slot());

        if vertex_array != UNBOUND && self.deferred_element_buffer != UNBOUND {
            buffers.bind(BufferTarget::ElementArray.slot(), self.deferred_element_buffer, applier)?;
        }
        Ok(())
    }

    /// Attach `buffer` as the element-array buffer of the next vertex array
    /// (or of the current one, immediately)
    pub fn set_element_buffer(
        &mut self,
        buffer: RawHandle,
        buffers: &mut BindingTable,
        applier: &mut dyn Applier,
    ) -> Result<()> {
        self.deferred_element_buffer = buffer;
        match self.bound {
            Some(vertex_array) if vertex_array != UNBOUND => {
                buffers.bind(BufferTarget::ElementArray.slot(), buffer, applier)
            }
            _ => Ok(()),
        }
    }

    /// Cached vertex-array handle; `None` when unknown
    pub fn bound(&self) -> Option<RawHandle> {
        self.bound
    }

    /// Element buffer pending for the next vertex array
    pub fn deferred_element_buffer(&self) -> RawHandle {
        self.deferred_element_buffer
    }

    /// Forget a released vertex array; returns the number of purged entries
    pub fn invalidate_vertex_array(&mut self, handle: RawHandle) -> usize {
        if handle != UNBOUND && self.bound == Some(handle) {
            self.bound = Some(UNBOUND);
            1
        } else {
            0
        }
    }

    /// Forget a released element buffer pending attachment; returns the
    /// number of purged entries
    pub fn invalidate_element_buffer(&mut self, handle: RawHandle) -> usize {
        if handle != UNBOUND && self.deferred_element_buffer == handle {
            self.deferred_element_buffer = UNBOUND;
            1
        } else {
            0
        }
    }
}

impl Default for VertexArrayState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "binding_tests.rs"]
mod tests;
