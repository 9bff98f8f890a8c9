/// Mock Applier for unit tests (no device required)
///
/// Records every verb that reaches the "device" as a readable string so
/// tests can count exactly which calls were issued and which were elided.

#[cfg(test)]
use std::sync::{Arc, Mutex};

#[cfg(test)]
use crate::error::{Error, Result};
#[cfg(test)]
use crate::state::{
    BindCategory, Capability, CapabilityExt, CommonParam, DepthRange, Scissor,
    TextureTarget, Viewport,
};
#[cfg(test)]
use super::applier::{Applier, DeviceLimits};
#[cfg(test)]
use super::handle::RawHandle;

/// Mock Applier that records forwarded calls
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct MockApplier {
    /// Every verb that reached the device, in order (shared so a clone kept
    /// outside the cache can inspect calls after the mock is boxed)
    pub calls: Arc<Mutex<Vec<String>>>,
    /// Limits reported to the cache
    pub limits: DeviceLimits,
    /// Ground truth reported by query_capability during reset
    pub capability_ground_truth: [bool; Capability::COUNT],
    /// When set, every apply verb fails with DeviceFailure
    pub fail_applies: Arc<Mutex<bool>>,
}

#[cfg(test)]
impl MockApplier {
    /// Create a mock with default limits
    pub fn new() -> Self {
        Self::with_limits(DeviceLimits::default())
    }

    /// Create a mock reporting the given limits
    pub fn with_limits(limits: DeviceLimits) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            limits,
            capability_ground_truth: [false; Capability::COUNT],
            fail_applies: Arc::new(Mutex::new(false)),
        }
    }

    fn record(&self, call: String) -> Result<()> {
        if *self.fail_applies.lock().unwrap() {
            return Err(Error::DeviceFailure(format!("mock rejected {}", call)));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
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

    /// Toggle failure injection for subsequent apply verbs
    pub fn set_fail(&self, fail: bool) {
        *self.fail_applies.lock().unwrap() = fail;
    }
}

#[cfg(test)]
impl Applier for MockApplier {
    fn limits(&self) -> DeviceLimits {
        self.limits
    }

    fn query_capability(&self, capability: Capability) -> bool {
        self.capability_ground_truth[capability as usize]
    }

    fn apply_capability(&mut self, capability: Capability, enabled: bool) -> Result<()> {
        self.record(format!("capability:{:?}:{}", capability, enabled))
    }

    fn apply_ext_capability(&mut self, capability: CapabilityExt, enabled: bool) -> Result<()> {
        self.record(format!("ext_capability:{:?}:{}", capability, enabled))
    }

    fn apply_bind(&mut self, category: BindCategory, slot: u32, handle: RawHandle) -> Result<()> {
        self.record(format!("bind:{:?}:{}:{}", category, slot, handle))
    }

    fn apply_bind_range(&mut self, category: BindCategory, first: u32, handles: &[RawHandle]) -> Result<()> {
        self.record(format!("bind_range:{:?}:{}:{:?}", category, first, handles))
    }

    fn select_unit(&mut self, unit: u32) -> Result<()> {
        self.record(format!("select_unit:{}", unit))
    }

    fn apply_texture_bind(&mut self, target: TextureTarget, handle: RawHandle) -> Result<()> {
        self.record(format!("texture_bind:{:?}:{}", target, handle))
    }

    fn apply_texture_bind_range(
        &mut self,
        first: u32,
        targets: &[TextureTarget],
        handles: &[RawHandle],
    ) -> Result<()> {
        self.record(format!("texture_bind_range:{}:{:?}:{:?}", first, targets, handles))
    }

    fn apply_viewports(&mut self, first: u32, viewports: &[Viewport]) -> Result<()> {
        self.record(format!("viewports:{}:{}", first, viewports.len()))
    }

    fn apply_scissors(&mut self, first: u32, scissors: &[Scissor]) -> Result<()> {
        self.record(format!("scissors:{}:{}", first, scissors.len()))
    }

    fn apply_depth_ranges(&mut self, first: u32, ranges: &[DepthRange]) -> Result<()> {
        self.record(format!("depth_ranges:{}:{}", first, ranges.len()))
    }

    fn apply_common(&mut self, param: CommonParam) -> Result<()> {
        self.record(format!("common:{:?}", param))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_applier_tests.rs"]
mod tests;
