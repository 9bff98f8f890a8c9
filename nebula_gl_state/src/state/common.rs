//! Common scalar render states
//!
//! The scalar siblings of the boolean toggles: comparison functions, face
//! culling, polygon state, blend color, line width. Each setter compares
//! against the cached value and forwards a miss as a single applier verb.
//! Defaults mirror the device's documented initial state.

use crate::device::{Applier, DeviceLimits};
use crate::error::Result;

// ===== PARAMETER ENUMS =====

/// Depth comparison function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

/// Which faces get culled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullFaceMode {
    Front,
    Back,
    FrontAndBack,
}

/// Winding order that counts as front-facing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFaceMode {
    Clockwise,
    CounterClockwise,
}

/// Polygon rasterization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonMode {
    Fill,
    Line,
    Point,
}

/// Color logic operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    Clear,
    And,
    AndReverse,
    Copy,
    AndInverted,
    NoOp,
    Xor,
    Or,
    Nor,
    Equiv,
    Invert,
    OrReverse,
    CopyInverted,
    OrInverted,
    Nand,
    Set,
}

/// One common scalar state change, forwarded as a single applier verb
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommonParam {
    DepthFunc(CompareFunc),
    CullFace(CullFaceMode),
    FrontFace(FrontFaceMode),
    PolygonMode(PolygonMode),
    PolygonOffset { factor: f32, units: f32, clamp: f32 },
    DepthMask(bool),
    BlendColor([f32; 4]),
    LogicOp(LogicOp),
    LineWidth(f32),
    PatchVertices(i32),
}

// ===== COMMON STATE =====

/// Cached common scalar states
pub struct CommonState {
    depth_func: CompareFunc,
    cull_face: CullFaceMode,
    front_face: FrontFaceMode,
    polygon_mode: PolygonMode,
    offset_factor: f32,
    offset_units: f32,
    offset_clamp: f32,
    depth_mask: bool,
    blend_color: [f32; 4],
    logic_op: LogicOp,
    line_width: f32,
    patch_vertices: i32,
}

impl CommonState {
    /// Device initial state
    pub fn new() -> Self {
        Self {
            depth_func: CompareFunc::Less,
            cull_face: CullFaceMode::Back,
            front_face: FrontFaceMode::CounterClockwise,
            polygon_mode: PolygonMode::Fill,
            offset_factor: 0.0,
            offset_units: 0.0,
            offset_clamp: 0.0,
            depth_mask: true,
            blend_color: [0.0, 0.0, 0.0, 0.0],
            logic_op: LogicOp::Copy,
            line_width: 1.0,
            patch_vertices: 0,
        }
    }

    pub fn set_depth_func(&mut self, func: CompareFunc, applier: &mut dyn Applier) -> Result<()> {
        if self.depth_func != func {
            applier.apply_common(CommonParam::DepthFunc(func))?;
            self.depth_func = func;
        }
        Ok(())
    }

    pub fn set_cull_face(&mut self, mode: CullFaceMode, applier: &mut dyn Applier) -> Result<()> {
        if self.cull_face != mode {
            applier.apply_common(CommonParam::CullFace(mode))?;
            self.cull_face = mode;
        }
        Ok(())
    }

    pub fn set_front_face(&mut self, mode: FrontFaceMode, applier: &mut dyn Applier) -> Result<()> {
        if self.front_face != mode {
            applier.apply_common(CommonParam::FrontFace(mode))?;
            self.front_face = mode;
        }
        Ok(())
    }

    pub fn set_polygon_mode(&mut self, mode: PolygonMode, applier: &mut dyn Applier) -> Result<()> {
        if self.polygon_mode != mode {
            applier.apply_common(CommonParam::PolygonMode(mode))?;
            self.polygon_mode = mode;
        }
        Ok(())
    }

    pub fn set_polygon_offset(
        &mut self,
        factor: f32,
        units: f32,
        clamp: f32,
        applier: &mut dyn Applier,
    ) -> Result<()> {
        if (self.offset_factor, self.offset_units, self.offset_clamp) != (factor, units, clamp) {
            applier.apply_common(CommonParam::PolygonOffset { factor, units, clamp })?;
            self.offset_factor = factor;
            self.offset_units = units;
            self.offset_clamp = clamp;
        }
        Ok(())
    }

    pub fn set_depth_mask(&mut self, mask: bool, applier: &mut dyn Applier) -> Result<()> {
        if self.depth_mask != mask {
            applier.apply_common(CommonParam::DepthMask(mask))?;
            self.depth_mask = mask;
        }
        Ok(())
    }

    pub fn set_blend_color(&mut self, color: [f32; 4], applier: &mut dyn Applier) -> Result<()> {
        if self.blend_color != color {
            applier.apply_common(CommonParam::BlendColor(color))?;
            self.blend_color = color;
        }
        Ok(())
    }

    pub fn set_logic_op(&mut self, op: LogicOp, applier: &mut dyn Applier) -> Result<()> {
        if self.logic_op != op {
            applier.apply_common(CommonParam::LogicOp(op))?;
            self.logic_op = op;
        }
        Ok(())
    }

    /// Set the line width, clamped to the range the device honors
    pub fn set_line_width(
        &mut self,
        width: f32,
        limits: &DeviceLimits,
        applier: &mut dyn Applier,
    ) -> Result<()> {
        let width = width.clamp(limits.line_width_range[0], limits.line_width_range[1]);
        if self.line_width != width {
            applier.apply_common(CommonParam::LineWidth(width))?;
            self.line_width = width;
        }
        Ok(())
    }

    pub fn set_patch_vertices(&mut self, count: i32, applier: &mut dyn Applier) -> Result<()> {
        if self.patch_vertices != count {
            applier.apply_common(CommonParam::PatchVertices(count))?;
            self.patch_vertices = count;
        }
        Ok(())
    }

    // ===== ACCESSORS =====

    pub fn depth_func(&self) -> CompareFunc { self.depth_func }
    pub fn cull_face(&self) -> CullFaceMode { self.cull_face }
    pub fn front_face(&self) -> FrontFaceMode { self.front_face }
    pub fn polygon_mode(&self) -> PolygonMode { self.polygon_mode }
    pub fn polygon_offset(&self) -> (f32, f32, f32) {
        (self.offset_factor, self.offset_units, self.offset_clamp)
    }
    pub fn depth_mask(&self) -> bool { self.depth_mask }
    pub fn blend_color(&self) -> [f32; 4] { self.blend_color }
    pub fn logic_op(&self) -> LogicOp { self.logic_op }
    pub fn line_width(&self) -> f32 { self.line_width }
    pub fn patch_vertices(&self) -> i32 { self.patch_vertices }
}

impl Default for CommonState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "common_tests.rs"]
mod tests;
