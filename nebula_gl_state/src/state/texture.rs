//! Texture unit binding cache
//!
//! Two-dimensional: texture unit × target kind, plus the cached active
//! unit so repeated binds to one unit skip the separate unit-select call.

use crate::device::{Applier, RawHandle, UNBOUND};
use crate::error::Result;
use crate::state_bail;
use super::scope::ScopeStack;

/// Hard upper bound on cached texture units; the device may report fewer
pub const MAX_TEXTURE_UNITS: usize = 32;

/// Texture dimensionality kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureTarget {
    Texture1D,
    Texture2D,
    Texture3D,
    Texture1DArray,
    Texture2DArray,
    TextureRectangle,
    TextureCubeMap,
    TextureCubeMapArray,
    TextureBuffer,
    Texture2DMultisample,
    Texture2DMultisampleArray,
}

impl TextureTarget {
    /// Number of target kinds
    pub const COUNT: usize = 11;

    fn index(self) -> usize {
        self as usize
    }
}

/// Saved binding for push/pop: unit, target and previous handle combined,
/// so one pop fully reverses one push
#[derive(Debug, Clone, Copy)]
struct TextureEntry {
    unit: u32,
    target: TextureTarget,
    saved: Option<RawHandle>,
}

/// Per-unit bound handles, one cell per target kind
type UnitCells = [Option<RawHandle>; TextureTarget::COUNT];

/// Cached texture bindings across all units and target kinds
pub struct TextureUnitState {
    active_unit: u32,
    units: Vec<UnitCells>,
    stack: ScopeStack<TextureEntry>,
}

impl TextureUnitState {
    /// Cache for `unit_count` units (device-capped, at most
    /// MAX_TEXTURE_UNITS); every cell starts known-unbound
    pub fn new(unit_count: u32) -> Self {
        let count = (unit_count as usize).clamp(1, MAX_TEXTURE_UNITS);
        Self {
            active_unit: 0,
            units: vec![[Some(UNBOUND); TextureTarget::COUNT]; count],
            stack: ScopeStack::new("texture"),
        }
    }

    fn check_unit(&self, unit: u32) -> Result<()> {
        if unit as usize >= self.units.len() {
            state_bail!("nebulagl::TextureUnitState",
                "texture unit {} out of range ({} units)", unit, self.units.len());
        }
        Ok(())
    }

    /// Select the active unit; skips the device call when already selected
    pub fn select_unit(&mut self, unit: u32, applier: &mut dyn Applier) -> Result<()> {
        self.check_unit(unit)?;
        if self.active_unit != unit {
            applier.select_unit(unit)?;
            self.active_unit = unit;
        }
        Ok(())
    }

    /// Bind a texture to (unit, target)
    ///
    /// The unit-select call and the bind call are deduplicated
    /// independently: binding twice to the same unit selects it once,
    /// binding the same handle twice issues nothing at all.
    pub fn bind(
        &mut self,
        unit: u32,
        target: TextureTarget,
        handle: RawHandle,
        applier: &mut dyn Applier,
    ) -> Result<()> {
        self.select_unit(unit, applier)?;
        if self.units[unit as usize][target.index()] != Some(handle) {
            applier.apply_texture_bind(target, handle)?;
            self.units[unit as usize][target.index()] = Some(handle);
        }
        Ok(())
    }

    /// Bind a run of textures to contiguous units, each entry possibly a
    /// different target kind
    ///
    /// Every touched cell is cached precisely: multi-texture draws rely on
    /// per-unit accuracy. The active unit is left untouched.
    pub fn bind_range(
        &mut self,
        first: u32,
        targets: &[TextureTarget],
        handles: &[RawHandle],
        applier: &mut dyn Applier,
    ) -> Result<()> {
        if targets.len() != handles.len() {
            state_bail!("nebulagl::TextureUnitState",
                "range bind with {} targets but {} handles",
                targets.len(), handles.len());
        }
        if handles.is_empty() {
            return Ok(());
        }
        let last = first as usize + handles.len() - 1;
        if last >= self.units.len() {
            state_bail!("nebulagl::TextureUnitState",
                "range bind [{}..={}] out of range ({} units)",
                first, last, self.units.len());
        }
        applier.apply_texture_bind_range(first, targets, handles)?;
        for (offset, (target, handle)) in targets.iter().zip(handles).enumerate() {
            self.units[first as usize + offset][target.index()] = Some(*handle);
        }
        Ok(())
    }

    /// Cached handle at (unit, target); `None` when unknown or out of range
    pub fn bound(&self, unit: u32, target: TextureTarget) -> Option<RawHandle> {
        self.units
            .get(unit as usize)
            .map(|cells| cells[target.index()])
            .flatten()
    }

    /// Unit the cache believes is selected
    pub fn active_unit(&self) -> u32 {
        self.active_unit
    }

    /// Save the binding at (unit, target)
    pub fn push(&mut self, unit: u32, target: TextureTarget) -> Result<()> {
        self.check_unit(unit)?;
        self.stack.push(TextureEntry {
            unit,
            target,
            saved: self.units[unit as usize][target.index()],
        });
        Ok(())
    }

    /// Save the binding at (active unit, target)
    pub fn push_active(&mut self, target: TextureTarget) {
        let unit = self.active_unit;
        self.stack.push(TextureEntry {
            unit,
            target,
            saved: self.units[unit as usize][target.index()],
        });
    }

    /// Restore the most recent push: re-selects the saved unit when needed,
    /// then re-binds through the normal cached path
    pub fn pop(&mut self, applier: &mut dyn Applier) -> Result<()> {
        let entry = self.stack.pop()?;
        self.restore(entry, applier)
    }

    /// Restore the `count` most recent pushes
    pub fn pop_many(&mut self, count: usize, applier: &mut dyn Applier) -> Result<()> {
        for entry in self.stack.pop_many(count)? {
            self.restore(entry, applier)?;
        }
        Ok(())
    }

    fn restore(&mut self, entry: TextureEntry, applier: &mut dyn Applier) -> Result<()> {
        match entry.saved {
            Some(handle) => self.bind(entry.unit, entry.target, handle, applier),
            None => {
                self.units[entry.unit as usize][entry.target.index()] = None;
                Ok(())
            }
        }
    }

    /// Purge a released texture from every cell; no device call.
    /// Returns the number of purged entries.
    pub fn invalidate(&mut self, handle: RawHandle) -> usize {
        if handle == UNBOUND {
            return 0;
        }
        let mut purged = 0;
        for cells in self.units.iter_mut() {
            for cell in cells.iter_mut() {
                if *cell == Some(handle) {
                    *cell = Some(UNBOUND);
                    purged += 1;
                }
            }
        }
        purged
    }

    /// Number of cached units
    pub fn unit_count(&self) -> u32 {
        self.units.len() as u32
    }

    /// Current scope depth
    pub fn scope_depth(&self) -> usize {
        self.stack.depth()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
