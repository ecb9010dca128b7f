// Host-side tests for constants and their relationships.

use folio_core::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn constants_are_within_reasonable_bounds() {
    assert!(PARTICLE_COUNT > 0);
    assert!(PARTICLE_FADE_STEP > 0.0 && PARTICLE_FADE_STEP <= 1.0);
    assert!(PARTICLE_FADE_INTERVAL_MS > 0);
    assert!(ORBIT_DAMPING_FACTOR > 0.0 && ORBIT_DAMPING_FACTOR <= 1.0);
    assert!(ORBIT_MIN_DISTANCE < ORBIT_MAX_DISTANCE);
    assert!(ORBIT_ZOOM_STEP > 0.0 && ORBIT_ZOOM_STEP < 1.0);
    assert!(CAMERA_NEAR > 0.0 && CAMERA_FAR > CAMERA_NEAR);
}

#[test]
fn initial_camera_sits_inside_orbit_range() {
    let d = (CAMERA_EYE - CAMERA_TARGET).length();
    assert!(d >= ORBIT_MIN_DISTANCE && d <= ORBIT_MAX_DISTANCE);
}

#[test]
fn dark_preset_is_brighter_than_light() {
    assert!(DARK_DIRECTIONAL_INTENSITY > LIGHT_DIRECTIONAL_INTENSITY);
    assert!(DARK_AMBIENT_INTENSITY > LIGHT_AMBIENT_INTENSITY);
}

#[test]
fn full_fade_takes_about_a_second() {
    let total_ms = ticks_to_expire() as u64 * PARTICLE_FADE_INTERVAL_MS;
    assert!((950..=1050).contains(&total_ms));
}

#[test]
fn bundled_shaders_expose_entry_points() {
    for src in [SCENE_WGSL, PARTICLES_WGSL] {
        assert!(src.contains("fn vs_main"));
        assert!(src.contains("fn fs_main"));
    }
}
