//! Boolean device capability cache
//!
//! The simplest cached primitive: one bool per device toggle, initialized
//! from ground truth at context creation, deduplicated on every
//! enable/disable. Extended vendor toggles live in a parallel table gated
//! by device availability.

use crate::device::Applier;
use crate::error::Result;
use crate::state_bail;
use super::scope::ScopeStack;

// ===== CAPABILITY ENUMS =====

/// Core boolean device toggles, always queryable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Blend,
    ColorLogicOp,
    CullFace,
    DepthClamp,
    DepthTest,
    Dither,
    FramebufferSrgb,
    LineSmooth,
    Multisample,
    PolygonOffsetFill,
    PolygonOffsetLine,
    PolygonOffsetPoint,
    PolygonSmooth,
    PrimitiveRestart,
    PrimitiveRestartFixedIndex,
    RasterizerDiscard,
    SampleAlphaToCoverage,
    SampleAlphaToOne,
    SampleCoverage,
    SampleShading,
    ScissorTest,
    StencilTest,
    TextureCubeMapSeamless,
    ProgramPointSize,
}

impl Capability {
    /// Number of core toggles
    pub const COUNT: usize = 24;

    /// Every core toggle, in cache order
    pub const ALL: [Capability; Self::COUNT] = [
        Capability::Blend,
        Capability::ColorLogicOp,
        Capability::CullFace,
        Capability::DepthClamp,
        Capability::DepthTest,
        Capability::Dither,
        Capability::FramebufferSrgb,
        Capability::LineSmooth,
        Capability::Multisample,
        Capability::PolygonOffsetFill,
        Capability::PolygonOffsetLine,
        Capability::PolygonOffsetPoint,
        Capability::PolygonSmooth,
        Capability::PrimitiveRestart,
        Capability::PrimitiveRestartFixedIndex,
        Capability::RasterizerDiscard,
        Capability::SampleAlphaToCoverage,
        Capability::SampleAlphaToOne,
        Capability::SampleCoverage,
        Capability::SampleShading,
        Capability::ScissorTest,
        Capability::StencilTest,
        Capability::TextureCubeMapSeamless,
        Capability::ProgramPointSize,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Vendor/extended toggles, only valid when the device reports them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityExt {
    ConservativeRasterization,
}

impl CapabilityExt {
    /// Number of extended toggles
    pub const COUNT: usize = 1;

    fn index(self) -> usize {
        self as usize
    }
}

// ===== CAPABILITY STATE =====

/// Extended toggle entry: availability plus cached value
#[derive(Debug, Clone, Copy, Default)]
struct ExtEntry {
    available: bool,
    enabled: bool,
}

/// Saved toggle value for push/pop
#[derive(Debug, Clone, Copy)]
struct CapabilityEntry {
    capability: Capability,
    enabled: bool,
}

/// Cached boolean device toggles
pub struct CapabilityState {
    values: [bool; Capability::COUNT],
    ext: [ExtEntry; CapabilityExt::COUNT],
    stack: ScopeStack<CapabilityEntry>,
}

impl CapabilityState {
    /// Create a cache with every toggle off and every extended toggle
    /// unavailable; call `reset` to load ground truth
    pub fn new() -> Self {
        Self {
            values: [false; Capability::COUNT],
            ext: [ExtEntry::default(); CapabilityExt::COUNT],
            stack: ScopeStack::new("capability"),
        }
    }

    /// Re-synchronize the cache with device ground truth
    ///
    /// Required once at context creation and again whenever foreign code
    /// may have mutated the context behind the cache's back.
    pub fn reset(&mut self, applier: &mut dyn Applier) {
        for capability in Capability::ALL {
            self.values[capability.index()] = applier.query_capability(capability);
        }
        let limits = applier.limits();
        self.ext[CapabilityExt::ConservativeRasterization.index()] = ExtEntry {
            available: limits.conservative_raster,
            enabled: false,
        };
    }

    /// Set a toggle; forwards to the device only when the value changes
    pub fn set(&mut self, capability: Capability, enabled: bool, applier: &mut dyn Applier) -> Result<()> {
        if self.values[capability.index()] != enabled {
            applier.apply_capability(capability, enabled)?;
            self.values[capability.index()] = enabled;
        }
        Ok(())
    }

    /// Pure cached read
    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.values[capability.index()]
    }

    /// Set an extended toggle
    ///
    /// # Errors
    ///
    /// `ContractViolation` when the device never reported the capability.
    pub fn set_ext(&mut self, capability: CapabilityExt, enabled: bool, applier: &mut dyn Applier) -> Result<()> {
        let entry = self.ext[capability.index()];
        if !entry.available {
            state_bail!("nebulagl::CapabilityState",
                "extended capability {:?} not supported by this device", capability);
        }
        if entry.enabled != enabled {
            applier.apply_ext_capability(capability, enabled)?;
            self.ext[capability.index()].enabled = enabled;
        }
        Ok(())
    }

    /// Cached read of an extended toggle
    ///
    /// # Errors
    ///
    /// `ContractViolation` when the device never reported the capability.
    pub fn is_ext_enabled(&self, capability: CapabilityExt) -> Result<bool> {
        let entry = self.ext[capability.index()];
        if !entry.available {
            state_bail!("nebulagl::CapabilityState",
                "extended capability {:?} not supported by this device", capability);
        }
        Ok(entry.enabled)
    }

    /// Save the current value of a toggle. Never fails.
    pub fn push(&mut self, capability: Capability) {
        self.stack.push(CapabilityEntry {
            capability,
            enabled: self.values[capability.index()],
        });
    }

    /// Restore the most recently pushed toggle
    ///
    /// Restoration runs through the normal set path, so it is deduplicated
    /// like any other toggle change.
    pub fn pop(&mut self, applier: &mut dyn Applier) -> Result<()> {
        let entry = self.stack.pop()?;
        self.set(entry.capability, entry.enabled, applier)
    }

    /// Restore the `count` most recently pushed toggles
    pub fn pop_many(&mut self, count: usize, applier: &mut dyn Applier) -> Result<()> {
        for entry in self.stack.pop_many(count)? {
            self.set(entry.capability, entry.enabled, applier)?;
        }
        Ok(())
    }

    /// Current scope depth
    pub fn scope_depth(&self) -> usize {
        self.stack.depth()
    }
}

impl Default for CapabilityState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "capability_tests.rs"]
mod tests;
