use super::*;
use crate::error::Error;

// ============================================================================
// Domain key tests
// ============================================================================

#[test]
fn test_domain_equality() {
    let a = DescriptorDomain::new(ViewKind::SampledTexture, Visibility::ShaderVisible);
    let b = DescriptorDomain::new(ViewKind::SampledTexture, Visibility::ShaderVisible);
    let c = DescriptorDomain::new(ViewKind::SampledTexture, Visibility::CpuOnly);
    let d = DescriptorDomain::new(ViewKind::Sampler, Visibility::ShaderVisible);

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, d);
}

#[test]
fn test_domain_usable_as_map_key() {
    let mut map = rustc_hash::FxHashMap::default();
    map.insert(
        DescriptorDomain::new(ViewKind::UniformBuffer, Visibility::ShaderVisible),
        1u32,
    );
    map.insert(
        DescriptorDomain::new(ViewKind::UniformBuffer, Visibility::CpuOnly),
        2u32,
    );

    assert_eq!(map.len(), 2);
    assert_eq!(
        map[&DescriptorDomain::new(ViewKind::UniformBuffer, Visibility::CpuOnly)],
        2
    );
}

#[test]
fn test_domain_is_orderable() {
    let mut domains = vec![
        DescriptorDomain::new(ViewKind::Sampler, Visibility::CpuOnly),
        DescriptorDomain::new(ViewKind::SampledTexture, Visibility::ShaderVisible),
    ];
    domains.sort();
    assert_eq!(domains[0].view_kind, ViewKind::SampledTexture);
}

// ============================================================================
// Heap description tests
// ============================================================================

#[test]
fn test_capacity_for_selects_by_visibility() {
    let desc = HeapDescription {
        shader_visible_capacity: 100,
        cpu_visible_capacity: 10,
        allow_growth: false,
        growth_factor: 1.0,
        max_growth_iterations: 0,
    };

    assert_eq!(desc.capacity_for(Visibility::ShaderVisible), 100);
    assert_eq!(desc.capacity_for(Visibility::CpuOnly), 10);
}

#[test]
fn test_default_description_is_valid() {
    let desc = HeapDescription::default();
    assert!(desc.validate().is_ok());
    assert!(desc.allow_growth);
    assert!(desc.growth_factor > 0.0);
}

#[test]
fn test_validate_rejects_zero_growth_factor() {
    let desc = HeapDescription {
        growth_factor: 0.0,
        allow_growth: true,
        ..HeapDescription::default()
    };
    assert!(matches!(
        desc.validate(),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn test_validate_rejects_negative_growth_factor() {
    let desc = HeapDescription {
        growth_factor: -2.0,
        allow_growth: true,
        ..HeapDescription::default()
    };
    assert!(desc.validate().is_err());
}

#[test]
fn test_validate_rejects_non_finite_growth_factor() {
    for factor in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
        let desc = HeapDescription {
            growth_factor: factor,
            allow_growth: true,
            ..HeapDescription::default()
        };
        assert!(desc.validate().is_err(), "factor {} accepted", factor);
    }
}

#[test]
fn test_validate_ignores_growth_factor_when_growth_disabled() {
    // A fixed-capacity domain never computes growth, so the factor is
    // not validated
    let desc = HeapDescription {
        growth_factor: 0.0,
        allow_growth: false,
        ..HeapDescription::default()
    };
    assert!(desc.validate().is_ok());
}
