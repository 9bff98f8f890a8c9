use super::*;
use crate::device::mock_applier::MockApplier;
use crate::nebulagl::Error;

// ============================================================================
// Helpers
// ============================================================================

fn fresh() -> (TextureUnitState, MockApplier) {
    (TextureUnitState::new(8), MockApplier::new())
}

// ============================================================================
// UNIT SELECT TESTS
// ============================================================================

#[test]
fn test_select_unit_forwards_on_change() {
    let (mut textures, mut mock) = fresh();

    textures.select_unit(3, &mut mock).unwrap();
    assert_eq!(textures.active_unit(), 3);
    assert_eq!(mock.count("select_unit:3"), 1);
}

#[test]
fn test_select_unit_zero_on_fresh_cache_is_elided() {
    let (mut textures, mut mock) = fresh();

    // unit 0 is the initial selection
    textures.select_unit(0, &mut mock).unwrap();
    assert_eq!(mock.total(), 0);
}

#[test]
fn test_select_unit_out_of_range_is_contract_violation() {
    let (mut textures, mut mock) = fresh();

    let err = textures.select_unit(8, &mut mock).unwrap_err();
    assert!(matches!(err, Error::ContractViolation(_)));
}

#[test]
fn test_unit_count_is_clamped() {
    let textures = TextureUnitState::new(1000);
    assert_eq!(textures.unit_count(), MAX_TEXTURE_UNITS as u32);

    let textures = TextureUnitState::new(0);
    assert_eq!(textures.unit_count(), 1);
}

// ============================================================================
// BIND TESTS
// ============================================================================

#[test]
fn test_bind_selects_then_binds() {
    let (mut textures, mut mock) = fresh();

    textures.bind(2, TextureTarget::Texture2D, 7, &mut mock).unwrap();

    assert_eq!(mock.recorded(), vec![
        "select_unit:2".to_string(),
        "texture_bind:Texture2D:7".to_string(),
    ]);
    assert_eq!(textures.bound(2, TextureTarget::Texture2D), Some(7));
}

#[test]
fn test_two_binds_same_unit_issue_one_select() {
    let (mut textures, mut mock) = fresh();

    textures.bind(2, TextureTarget::Texture2D, 7, &mut mock).unwrap();
    textures.bind(2, TextureTarget::TextureCubeMap, 8, &mut mock).unwrap();

    // both bind calls issue, the unit-select only once
    assert_eq!(mock.count("select_unit:"), 1);
    assert_eq!(mock.count("texture_bind:"), 2);
}

#[test]
fn test_bind_same_handle_twice_is_elided() {
    let (mut textures, mut mock) = fresh();

    textures.bind(2, TextureTarget::Texture2D, 7, &mut mock).unwrap();
    textures.bind(2, TextureTarget::Texture2D, 7, &mut mock).unwrap();

    assert_eq!(mock.count("texture_bind:"), 1);
}

#[test]
fn test_targets_on_same_unit_are_independent() {
    let (mut textures, mut mock) = fresh();

    textures.bind(0, TextureTarget::Texture2D, 7, &mut mock).unwrap();
    textures.bind(0, TextureTarget::Texture3D, 7, &mut mock).unwrap();

    assert_eq!(textures.bound(0, TextureTarget::Texture2D), Some(7));
    assert_eq!(textures.bound(0, TextureTarget::Texture3D), Some(7));
    assert_eq!(mock.count("texture_bind:"), 2);
}

#[test]
fn test_device_failure_leaves_cell_and_unit_unchanged() {
    let (mut textures, mut mock) = fresh();
    mock.set_fail(true);

    let err = textures.bind(2, TextureTarget::Texture2D, 7, &mut mock).unwrap_err();
    assert!(matches!(err, Error::DeviceFailure(_)));

    // the select failed first, so neither the unit nor the cell moved
    assert_eq!(textures.active_unit(), 0);
    assert_eq!(textures.bound(2, TextureTarget::Texture2D), Some(crate::device::UNBOUND));
}

// ============================================================================
// RANGE BIND TESTS
// ============================================================================

#[test]
fn test_bind_range_updates_every_cell() {
    let (mut textures, mut mock) = fresh();

    let targets = [TextureTarget::Texture2D, TextureTarget::TextureCubeMap, TextureTarget::Texture3D];
    textures.bind_range(1, &targets, &[10, 11, 12], &mut mock).unwrap();

    // per-unit correctness: every cell cached precisely
    assert_eq!(textures.bound(1, TextureTarget::Texture2D), Some(10));
    assert_eq!(textures.bound(2, TextureTarget::TextureCubeMap), Some(11));
    assert_eq!(textures.bound(3, TextureTarget::Texture3D), Some(12));
    assert_eq!(mock.count("texture_bind_range:1:"), 1);
}

#[test]
fn test_bind_after_range_is_elided() {
    let (mut textures, mut mock) = fresh();

    let targets = [TextureTarget::Texture2D, TextureTarget::Texture2D];
    textures.bind_range(1, &targets, &[10, 11], &mut mock).unwrap();
    mock.clear();

    textures.bind(2, TextureTarget::Texture2D, 11, &mut mock).unwrap();
    // only the unit-select reaches the device, the bind itself is cached
    assert_eq!(mock.count("texture_bind:"), 0);
    assert_eq!(mock.count("select_unit:2"), 1);
}

#[test]
fn test_bind_range_does_not_touch_active_unit() {
    let (mut textures, mut mock) = fresh();

    textures.select_unit(5, &mut mock).unwrap();
    textures.bind_range(0, &[TextureTarget::Texture2D], &[10], &mut mock).unwrap();

    assert_eq!(textures.active_unit(), 5);
    assert_eq!(mock.count("select_unit:"), 1);
}

#[test]
fn test_bind_range_mismatched_lengths_is_contract_violation() {
    let (mut textures, mut mock) = fresh();

    let err = textures
        .bind_range(0, &[TextureTarget::Texture2D], &[10, 11], &mut mock)
        .unwrap_err();
    assert!(matches!(err, Error::ContractViolation(_)));
}

#[test]
fn test_bind_range_past_end_is_contract_violation() {
    let (mut textures, mut mock) = fresh();

    let targets = [TextureTarget::Texture2D, TextureTarget::Texture2D];
    let err = textures.bind_range(7, &targets, &[10, 11], &mut mock).unwrap_err();
    assert!(matches!(err, Error::ContractViolation(_)));
    assert_eq!(mock.total(), 0);
}

// ============================================================================
// PUSH / POP TESTS
// ============================================================================

#[test]
fn test_push_pop_restores_binding_and_unit() {
    let (mut textures, mut mock) = fresh();

    textures.bind(2, TextureTarget::Texture2D, 7, &mut mock).unwrap();
    textures.push(2, TextureTarget::Texture2D).unwrap();

    // wander off to another unit and binding
    textures.bind(5, TextureTarget::Texture2D, 9, &mut mock).unwrap();
    assert_eq!(textures.active_unit(), 5);

    // one pop restores the binding, re-selecting its unit on the way
    textures.pop(&mut mock).unwrap();
    assert_eq!(textures.bound(2, TextureTarget::Texture2D), Some(7));
    assert_eq!(textures.active_unit(), 2);
}

#[test]
fn test_pop_without_change_is_elided() {
    let (mut textures, mut mock) = fresh();

    textures.bind(2, TextureTarget::Texture2D, 7, &mut mock).unwrap();
    mock.clear();

    textures.push(2, TextureTarget::Texture2D).unwrap();
    textures.pop(&mut mock).unwrap();

    // unit still selected and handle still bound: nothing issued
    assert_eq!(mock.total(), 0);
}

#[test]
fn test_push_active_uses_selected_unit() {
    let (mut textures, mut mock) = fresh();

    textures.bind(3, TextureTarget::TextureCubeMap, 7, &mut mock).unwrap();
    textures.push_active(TextureTarget::TextureCubeMap);

    textures.bind(3, TextureTarget::TextureCubeMap, 9, &mut mock).unwrap();
    textures.pop(&mut mock).unwrap();

    assert_eq!(textures.bound(3, TextureTarget::TextureCubeMap), Some(7));
}

#[test]
fn test_unbalanced_pop_is_contract_violation() {
    let (mut textures, mut mock) = fresh();

    let err = textures.pop(&mut mock).unwrap_err();
    assert!(matches!(err, Error::ContractViolation(_)));
}

#[test]
fn test_pop_many_reverses_batch_override() {
    let (mut textures, mut mock) = fresh();

    textures.bind(0, TextureTarget::Texture2D, 1, &mut mock).unwrap();
    textures.bind(1, TextureTarget::Texture2D, 2, &mut mock).unwrap();

    textures.push(0, TextureTarget::Texture2D).unwrap();
    textures.push(1, TextureTarget::Texture2D).unwrap();

    textures.bind(0, TextureTarget::Texture2D, 8, &mut mock).unwrap();
    textures.bind(1, TextureTarget::Texture2D, 9, &mut mock).unwrap();

    textures.pop_many(2, &mut mock).unwrap();
    assert_eq!(textures.bound(0, TextureTarget::Texture2D), Some(1));
    assert_eq!(textures.bound(1, TextureTarget::Texture2D), Some(2));
    assert_eq!(textures.scope_depth(), 0);
}

// ============================================================================
// INVALIDATION TESTS
// ============================================================================

#[test]
fn test_invalidate_scans_all_cells() {
    let (mut textures, mut mock) = fresh();

    textures.bind(0, TextureTarget::Texture2D, 7, &mut mock).unwrap();
    textures.bind(4, TextureTarget::TextureCubeMap, 7, &mut mock).unwrap();
    textures.bind(4, TextureTarget::Texture2D, 8, &mut mock).unwrap();
    mock.clear();

    let purged = textures.invalidate(7);
    assert_eq!(purged, 2);
    assert_eq!(textures.bound(0, TextureTarget::Texture2D), Some(crate::device::UNBOUND));
    assert_eq!(textures.bound(4, TextureTarget::TextureCubeMap), Some(crate::device::UNBOUND));
    assert_eq!(textures.bound(4, TextureTarget::Texture2D), Some(8));
    // no device call for invalidation
    assert_eq!(mock.total(), 0);
}

#[test]
fn test_rebind_after_invalidate_issues_call() {
    let (mut textures, mut mock) = fresh();

    textures.bind(2, TextureTarget::Texture2D, 7, &mut mock).unwrap();
    textures.invalidate(7);
    mock.clear();

    // recycled handle value: the bind must issue
    textures.bind(2, TextureTarget::Texture2D, 7, &mut mock).unwrap();
    assert_eq!(mock.count("texture_bind:Texture2D:7"), 1);
}
