//! Integration tests for the current-context registry
//!
//! These exercise the release-notification route end to end: destruction
//! in a resource-lifecycle layer with no cache reference, routed through
//! Context to whichever instance is current. The registry is process-wide,
//! so every test is #[serial].

mod applier_test_utils;

use applier_test_utils::{recording_manager, RecordingApplier};
use nebula_gl_state::nebulagl::device::{ResourceCategory, ResourceRef, UNBOUND};
use nebula_gl_state::nebulagl::state::{BufferTarget, StateManager, TextureTarget};
use nebula_gl_state::nebulagl::{Context, Error};
use serial_test::serial;
use std::sync::{Arc, Mutex};

// ============================================================================
// Helpers
// ============================================================================

fn shared_manager() -> (Arc<Mutex<StateManager>>, RecordingApplier) {
    let (manager, probe) = recording_manager();
    (Arc::new(Mutex::new(manager)), probe)
}

/// Stand-in for the resource-lifecycle layer: destroys a device object and
/// notifies whichever cache is current, exactly once, before the handle
/// value can be handed to a new resource.
fn destroy_resource(category: ResourceCategory, handle: u32) {
    Context::notify_release(ResourceRef::new(category, handle));
}

// ============================================================================
// HANDLE REUSE THROUGH THE REGISTRY
// ============================================================================

#[test]
#[serial]
fn test_integration_release_and_reuse_through_registry() {
    Context::initialize().unwrap();
    let _ = Context::clear_current();

    let (cache, probe) = shared_manager();
    Context::make_current(cache.clone()).unwrap();

    // buffer A gets handle 7 and is bound
    cache.lock().unwrap().bind_buffer(BufferTarget::Array, 7).unwrap();
    assert_eq!(probe.count("bind:"), 1);

    // A is destroyed; the lifecycle layer has no cache reference and goes
    // through the registry
    destroy_resource(ResourceCategory::Buffer, 7);
    assert_eq!(cache.lock().unwrap().bound_buffer(BufferTarget::Array), Some(UNBOUND));

    // buffer B is created and receives the recycled handle 7; the bind
    // must reach the device
    probe.clear();
    cache.lock().unwrap().bind_buffer(BufferTarget::Array, 7).unwrap();
    assert_eq!(probe.count("bind:Buffer:0:7"), 1);

    Context::clear_current().unwrap();
}

#[test]
#[serial]
fn test_integration_texture_release_through_registry() {
    Context::initialize().unwrap();
    let _ = Context::clear_current();

    let (cache, probe) = shared_manager();
    Context::make_current(cache.clone()).unwrap();

    cache.lock().unwrap().bind_texture(2, TextureTarget::Texture2D, 9).unwrap();
    destroy_resource(ResourceCategory::Texture, 9);

    probe.clear();
    cache.lock().unwrap().bind_texture(2, TextureTarget::Texture2D, 9).unwrap();
    assert_eq!(probe.count("texture_bind:Texture2D:9"), 1);

    Context::clear_current().unwrap();
}

// ============================================================================
// NO-CONTEXT AND MULTI-INSTANCE BEHAVIOR
// ============================================================================

#[test]
#[serial]
fn test_integration_release_without_current_context_is_safe() {
    Context::initialize().unwrap();
    let _ = Context::clear_current();

    // nothing current: must be a silent no-op
    destroy_resource(ResourceCategory::Buffer, 7);
    destroy_resource(ResourceCategory::Program, 3);
}

#[test]
#[serial]
fn test_integration_release_targets_only_the_current_instance() {
    Context::initialize().unwrap();
    let _ = Context::clear_current();

    let (first, _) = shared_manager();
    let (second, _) = shared_manager();

    first.lock().unwrap().bind_buffer(BufferTarget::Array, 7).unwrap();
    second.lock().unwrap().bind_buffer(BufferTarget::Array, 7).unwrap();

    // switch contexts: second is now current
    Context::make_current(first.clone()).unwrap();
    Context::make_current(second.clone()).unwrap();

    destroy_resource(ResourceCategory::Buffer, 7);

    // only the current instance processed the release
    assert_eq!(second.lock().unwrap().bound_buffer(BufferTarget::Array), Some(UNBOUND));
    assert_eq!(first.lock().unwrap().bound_buffer(BufferTarget::Array), Some(7));

    Context::clear_current().unwrap();
}

#[test]
#[serial]
fn test_integration_current_fails_after_clear() {
    Context::initialize().unwrap();
    let _ = Context::clear_current();

    let (cache, _) = shared_manager();
    Context::make_current(cache).unwrap();
    assert!(Context::current().is_ok());

    Context::clear_current().unwrap();
    let err = Context::current().unwrap_err();
    assert!(matches!(err, Error::InitializationFailed(_)));
}
