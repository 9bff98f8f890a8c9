#![allow(dead_code)]
//! Applier test utilities - Shared recording backend for integration tests
//!
//! Integration tests drive the public API only, so they bring their own
//! Applier: a recording double that counts every verb reaching the
//! "device". The shared call log survives boxing the applier into a
//! StateManager, which is exactly how the tests count elided calls.

use std::sync::{Arc, Mutex};

use nebula_gl_state::nebulagl::device::{Applier, DeviceLimits, RawHandle};
use nebula_gl_state::nebulagl::state::{
    BindCategory, Capability, CapabilityExt, CommonParam, DepthRange, Scissor,
    StateManager, TextureTarget, Viewport,
};
use nebula_gl_state::nebulagl::Result;

/// Recording Applier backed by a shared call log
#[derive(Debug, Clone)]
pub struct RecordingApplier {
    calls: Arc<Mutex<Vec<String>>>,
    limits: DeviceLimits,
    ground_truth: [bool; Capability::COUNT],
}

impl RecordingApplier {
    /// Create a recorder with default limits
    pub fn new() -> Self {
        Self::with_limits(DeviceLimits::default())
    }

    /// Create a recorder reporting the given limits
    pub fn with_limits(limits: DeviceLimits) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            limits,
            ground_truth: [false; Capability::COUNT],
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    /// All recorded calls
    pub fn recorded(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls whose verb matches `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.starts_with(prefix)).count()
    }

    /// Total number of recorded calls
    pub fn total(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Applier for RecordingApplier {
    fn limits(&self) -> DeviceLimits {
        self.limits
    }

    fn query_capability(&self, capability: Capability) -> bool {
        self.ground_truth[capability as usize]
    }

    fn apply_capability(&mut self, capability: Capability, enabled: bool) -> Result<()> {
        self.record(format!("capability:{:?}:{}", capability, enabled));
        Ok(())
    }

    fn apply_ext_capability(&mut self, capability: CapabilityExt, enabled: bool) -> Result<()> {
        self.record(format!("ext_capability:{:?}:{}", capability, enabled));
        Ok(())
    }

    fn apply_bind(&mut self, category: BindCategory, slot: u32, handle: RawHandle) -> Result<()> {
        self.record(format!("bind:{:?}:{}:{}", category, slot, handle));
        Ok(())
    }

    fn apply_bind_range(&mut self, category: BindCategory, first: u32, handles: &[RawHandle]) -> Result<()> {
        self.record(format!("bind_range:{:?}:{}:{:?}", category, first, handles));
        Ok(())
    }

    fn select_unit(&mut self, unit: u32) -> Result<()> {
        self.record(format!("select_unit:{}", unit));
        Ok(())
    }

    fn apply_texture_bind(&mut self, target: TextureTarget, handle: RawHandle) -> Result<()> {
        self.record(format!("texture_bind:{:?}:{}", target, handle));
        Ok(())
    }

    fn apply_texture_bind_range(
        &mut self,
        first: u32,
        targets: &[TextureTarget],
        handles: &[RawHandle],
    ) -> Result<()> {
        self.record(format!("texture_bind_range:{}:{:?}:{:?}", first, targets, handles));
        Ok(())
    }

    fn apply_viewports(&mut self, first: u32, viewports: &[Viewport]) -> Result<()> {
        self.record(format!("viewports:{}:{}", first, viewports.len()));
        Ok(())
    }

    fn apply_scissors(&mut self, first: u32, scissors: &[Scissor]) -> Result<()> {
        self.record(format!("scissors:{}:{}", first, scissors.len()));
        Ok(())
    }

    fn apply_depth_ranges(&mut self, first: u32, ranges: &[DepthRange]) -> Result<()> {
        self.record(format!("depth_ranges:{}:{}", first, ranges.len()));
        Ok(())
    }

    fn apply_common(&mut self, param: CommonParam) -> Result<()> {
        self.record(format!("common:{:?}", param));
        Ok(())
    }
}

/// Build a StateManager over a fresh recorder; returns a probe sharing the
/// call log
pub fn recording_manager() -> (StateManager, RecordingApplier) {
    recording_manager_with_limits(DeviceLimits::default())
}

/// Same as `recording_manager` with explicit device limits
pub fn recording_manager_with_limits(limits: DeviceLimits) -> (StateManager, RecordingApplier) {
    let applier = RecordingApplier::with_limits(limits);
    let probe = applier.clone();
    let manager = StateManager::new(Box::new(applier));
    (manager, probe)
}
