//! Viewport, scissor and depth-range array caches
//!
//! Indexed state capped by the device's viewport limit. Exceeding the
//! limit is a reported contract violation, never a silent clamp.

use crate::device::Applier;
use crate::error::Result;
use crate::state_bail;

// ===== RECTANGLE TYPES =====

/// Viewport rectangle (pixels, f32 as the device consumes them)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Scissor rectangle (integer pixels)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scissor {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Near/far depth mapping for one viewport index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRange {
    pub near: f64,
    pub far: f64,
}

impl Default for DepthRange {
    fn default() -> Self {
        Self { near: 0.0, far: 1.0 }
    }
}

// ===== VIEWPORT STATE =====

/// Cached per-index viewport, scissor and depth-range arrays
///
/// Entries start unknown: the initial viewport depends on the surface the
/// context was made current with, not on the context itself.
pub struct ViewportState {
    viewports: Vec<Option<Viewport>>,
    scissors: Vec<Option<Scissor>>,
    depth_ranges: Vec<Option<DepthRange>>,
}

impl ViewportState {
    /// Cache for `max_viewports` indices
    pub fn new(max_viewports: u32) -> Self {
        let count = max_viewports.max(1) as usize;
        Self {
            viewports: vec![None; count],
            scissors: vec![None; count],
            depth_ranges: vec![None; count],
        }
    }

    fn check_range(&self, first: u32, count: usize) -> Result<()> {
        if first as usize + count > self.viewports.len() {
            state_bail!("nebulagl::ViewportState",
                "range [{}; {}) exceeds device viewport limit of {}",
                first, first as usize + count, self.viewports.len());
        }
        Ok(())
    }

    /// Update a run of viewports
    ///
    /// Policy: per-entry comparison is cheap, the device's batch call is
    /// one driver crossing, so when any entry in the run differs the whole
    /// run is forwarded and every touched entry is cached precisely. When
    /// none differ, no device call.
    pub fn set_viewport_array(
        &mut self,
        first: u32,
        viewports: &[Viewport],
        applier: &mut dyn Applier,
    ) -> Result<()> {
        self.check_range(first, viewports.len())?;
        let start = first as usize;
        let differs = self.viewports[start..start + viewports.len()]
            .iter()
            .zip(viewports)
            .any(|(cached, v)| *cached != Some(*v));
        if differs {
            applier.apply_viewports(first, viewports)?;
            for (offset, v) in viewports.iter().enumerate() {
                self.viewports[start + offset] = Some(*v);
            }
        }
        Ok(())
    }

    /// Update viewport 0
    pub fn set_viewport(&mut self, viewport: Viewport, applier: &mut dyn Applier) -> Result<()> {
        self.set_viewport_array(0, std::slice::from_ref(&viewport), applier)
    }

    /// Update a run of scissor rectangles (same policy as viewports)
    pub fn set_scissor_array(
        &mut self,
        first: u32,
        scissors: &[Scissor],
        applier: &mut dyn Applier,
    ) -> Result<()> {
        self.check_range(first, scissors.len())?;
        let start = first as usize;
        let differs = self.scissors[start..start + scissors.len()]
            .iter()
            .zip(scissors)
            .any(|(cached, s)| *cached != Some(*s));
        if differs {
            applier.apply_scissors(first, scissors)?;
            for (offset, s) in scissors.iter().enumerate() {
                self.scissors[start + offset] = Some(*s);
            }
        }
        Ok(())
    }

    /// Update scissor 0
    pub fn set_scissor(&mut self, scissor: Scissor, applier: &mut dyn Applier) -> Result<()> {
        self.set_scissor_array(0, std::slice::from_ref(&scissor), applier)
    }

    /// Update a run of depth ranges (same policy as viewports)
    pub fn set_depth_range_array(
        &mut self,
        first: u32,
        ranges: &[DepthRange],
        applier: &mut dyn Applier,
    ) -> Result<()> {
        self.check_range(first, ranges.len())?;
        let start = first as usize;
        let differs = self.depth_ranges[start..start + ranges.len()]
            .iter()
            .zip(ranges)
            .any(|(cached, r)| *cached != Some(*r));
        if differs {
            applier.apply_depth_ranges(first, ranges)?;
            for (offset, r) in ranges.iter().enumerate() {
                self.depth_ranges[start + offset] = Some(*r);
            }
        }
        Ok(())
    }

    /// Update depth range 0
    pub fn set_depth_range(&mut self, range: DepthRange, applier: &mut dyn Applier) -> Result<()> {
        self.set_depth_range_array(0, std::slice::from_ref(&range), applier)
    }

    // ===== ACCESSORS =====

    /// Cached viewport at `index`; `None` when unknown
    pub fn viewport(&self, index: u32) -> Option<Viewport> {
        self.viewports.get(index as usize).copied().flatten()
    }

    /// Cached scissor at `index`; `None` when unknown
    pub fn scissor(&self, index: u32) -> Option<Scissor> {
        self.scissors.get(index as usize).copied().flatten()
    }

    /// Cached depth range at `index`; `None` when unknown
    pub fn depth_range(&self, index: u32) -> Option<DepthRange> {
        self.depth_ranges.get(index as usize).copied().flatten()
    }

    /// Number of cached indices
    pub fn max_viewports(&self) -> u32 {
        self.viewports.len() as u32
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "viewport_tests.rs"]
mod tests;
