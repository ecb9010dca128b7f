// Host-side tests for the viewer session: click toggling, theme lighting and
// particle lifetimes driven through the public event API.

use folio_core::*;
use glam::{Vec2, Vec3};
use std::time::Duration;

const VIEW_W: f32 = 800.0;
const VIEW_H: f32 = 600.0;

fn viewport() -> Viewport {
    Viewport::sized(VIEW_W, VIEW_H)
}

fn desk_scene() -> Scene {
    let m = Material::default();
    Scene::from_objects([
        // Sits on the orbit target, so the centre of the view lands on it.
        SceneObject::cuboid("Monitor", CAMERA_TARGET, Vec3::splat(0.3), m.clone()),
        SceneObject::cuboid("Desk", Vec3::new(2.5, 0.0, 0.0), Vec3::new(0.5, 0.1, 0.5), m),
    ])
}

fn session_with_scene() -> ViewerSession {
    let cfg = ViewerConfig::default().with_seed(42);
    let mut s = ViewerSession::new(&cfg, false).expect("default config is valid");
    s.handle(ViewerEvent::Resize { width: VIEW_W, height: VIEW_H });
    s.handle(ViewerEvent::SceneLoaded(desk_scene()));
    s
}

fn click_center(s: &mut ViewerSession) -> Commands {
    s.handle(ViewerEvent::Click { x: VIEW_W / 2.0, y: VIEW_H / 2.0, viewport: viewport() })
}

fn monitor(s: &ViewerSession) -> &SceneObject {
    s.scene().and_then(|sc| sc.find_by_name("Monitor")).expect("monitor present")
}

fn desk(s: &ViewerSession) -> &SceneObject {
    s.scene().and_then(|sc| sc.find_by_name("Desk")).expect("desk present")
}

#[test]
fn center_click_picks_the_monitor() {
    let s = session_with_scene();
    let hit = s.pick(VIEW_W / 2.0, VIEW_H / 2.0, &viewport()).expect("hit");
    assert_eq!(hit.object, monitor(&s).id);
    assert!(hit.distance > 0.0 && hit.distance < 3.5);
}

#[test]
fn clicking_monitor_twice_toggles_emissive_and_spawns_once() {
    let mut s = session_with_scene();
    assert!(!s.is_activated());

    let cmds = click_center(&mut s);
    assert_eq!(cmds.len(), 2);
    assert!(s.is_activated());
    assert_eq!(monitor(&s).emissive, Emissive::on());
    assert_eq!(monitor(&s).emissive.intensity, 2.0);
    assert_eq!(s.particles().len(), 1);
    assert_eq!(s.particles().effects()[0].positions.len(), PARTICLE_COUNT);

    let cmds = click_center(&mut s);
    assert_eq!(cmds.len(), 1);
    assert!(!s.is_activated());
    assert_eq!(monitor(&s).emissive, Emissive::off());
    assert_eq!(monitor(&s).emissive.intensity, 0.0);
    // Deactivation never spawns.
    assert_eq!(s.particles().len(), 1);
}

#[test]
fn other_objects_are_never_touched() {
    let mut s = session_with_scene();
    let before = desk(&s).emissive;
    click_center(&mut s);
    click_center(&mut s);
    click_center(&mut s);
    assert_eq!(desk(&s).emissive, before);
}

#[test]
fn click_on_empty_space_is_a_no_op() {
    let mut s = session_with_scene();
    assert!(s.pick(0.0, 0.0, &viewport()).is_none());
    let cmds = s.handle(ViewerEvent::Click { x: 0.0, y: 0.0, viewport: viewport() });
    assert!(cmds.is_empty());
    assert!(!s.is_activated());
    assert!(s.particles().is_empty());
}

#[test]
fn click_outside_the_canvas_is_a_no_op() {
    let mut s = session_with_scene();
    let cmds = s.handle(ViewerEvent::Click { x: -500.0, y: 2000.0, viewport: viewport() });
    assert!(cmds.is_empty());
    assert!(!s.is_activated());
}

fn session_with(scene: Scene) -> ViewerSession {
    let cfg = ViewerConfig::default().with_seed(7);
    let mut s = ViewerSession::new(&cfg, false).expect("valid");
    s.handle(ViewerEvent::Resize { width: VIEW_W, height: VIEW_H });
    s.handle(ViewerEvent::SceneLoaded(scene));
    s
}

/// Halfway between the eye and the orbit target.
fn between_eye_and_target() -> Vec3 {
    CAMERA_TARGET.lerp(CAMERA_EYE, 0.5)
}

#[test]
fn object_in_front_of_the_monitor_blocks_the_toggle() {
    let m = Material::default();
    let mut s = session_with(Scene::from_objects([
        SceneObject::cuboid("Monitor", CAMERA_TARGET, Vec3::splat(0.3), m.clone()),
        SceneObject::cuboid("Desk", between_eye_and_target(), Vec3::splat(0.2), m),
    ]));
    let hit = s.pick(VIEW_W / 2.0, VIEW_H / 2.0, &viewport()).expect("hit");
    assert_eq!(hit.object, desk(&s).id);
    assert!(click_center(&mut s).is_empty());
    assert!(!s.is_activated());
    assert_eq!(monitor(&s).emissive, Emissive::off());
}

#[test]
fn monitor_in_front_of_another_object_is_activated() {
    let m = Material::default();
    let mut s = session_with(Scene::from_objects([
        SceneObject::cuboid("Desk", CAMERA_TARGET, Vec3::splat(0.6), m.clone()),
        SceneObject::cuboid("Monitor", between_eye_and_target(), Vec3::splat(0.2), m),
    ]));
    let hit = s.pick(VIEW_W / 2.0, VIEW_H / 2.0, &viewport()).expect("hit");
    assert_eq!(hit.object, monitor(&s).id);
    click_center(&mut s);
    assert!(s.is_activated());
    assert_eq!(desk(&s).emissive, Emissive::off());
}

#[test]
fn pointer_outside_projected_monitor_never_picks_it() {
    let s = session_with_scene();
    let mon = monitor(&s);
    let view_proj = s.camera().view_projection();
    let (lo, hi) = (mon.bounds.min, mon.bounds.max);
    let mut min_px = Vec2::splat(f32::INFINITY);
    let mut max_px = Vec2::splat(f32::NEG_INFINITY);
    for i in 0..8 {
        let corner = Vec3::new(
            if i & 1 == 0 { lo.x } else { hi.x },
            if i & 2 == 0 { lo.y } else { hi.y },
            if i & 4 == 0 { lo.z } else { hi.z },
        );
        let ndc = view_proj.project_point3(corner);
        let px = Vec2::new((ndc.x + 1.0) * 0.5 * VIEW_W, (1.0 - ndc.y) * 0.5 * VIEW_H);
        min_px = min_px.min(px);
        max_px = max_px.max(px);
    }
    assert!(min_px.x > 0.0 && max_px.x < VIEW_W && min_px.y > 0.0 && max_px.y < VIEW_H);

    let mut checked = 0;
    let mut y = -40.0;
    while y <= VIEW_H + 40.0 {
        let mut x = -40.0;
        while x <= VIEW_W + 40.0 {
            let outside = x < min_px.x - 1.0
                || x > max_px.x + 1.0
                || y < min_px.y - 1.0
                || y > max_px.y + 1.0;
            if outside {
                let hit = s.pick(x, y, &viewport());
                assert_ne!(hit.map(|h| h.object), Some(mon.id), "picked monitor at ({x}, {y})");
                checked += 1;
            }
            x += 8.0;
        }
        y += 8.0;
    }
    assert!(checked > 1000);
}

#[test]
fn clicks_before_the_scene_loads_do_nothing() {
    let cfg = ViewerConfig::default().with_seed(1);
    let mut s = ViewerSession::new(&cfg, true).expect("valid");
    assert!(s.scene().is_none());
    assert!(click_center(&mut s).is_empty());
    assert!(!s.is_activated());
}

#[test]
fn failed_load_leaves_interaction_inert() {
    let cfg = ViewerConfig::default().with_seed(1);
    let mut s = ViewerSession::new(&cfg, false).expect("valid");
    s.handle(ViewerEvent::SceneLoadFailed("404".into()));
    assert!(s.scene().is_none());
    assert!(click_center(&mut s).is_empty());
}

#[test]
fn scene_revision_tracks_loads_and_failures() {
    let cfg = ViewerConfig::default().with_seed(1);
    let mut s = ViewerSession::new(&cfg, false).expect("valid");
    assert_eq!(s.scene_revision(), 0);
    s.handle(ViewerEvent::SceneLoaded(desk_scene()));
    assert_eq!(s.scene_revision(), 1);
    s.handle(ViewerEvent::ToggleTheme);
    assert_eq!(s.scene_revision(), 1);
    s.handle(ViewerEvent::SceneLoadFailed("gone".into()));
    assert_eq!(s.scene_revision(), 2);
}

#[test]
fn scene_without_pickable_object_still_loads() {
    let cfg = ViewerConfig::default().with_seed(1);
    let mut s = ViewerSession::new(&cfg, false).expect("valid");
    s.handle(ViewerEvent::Resize { width: VIEW_W, height: VIEW_H });
    s.handle(ViewerEvent::SceneLoaded(Scene::from_objects([SceneObject::cuboid(
        "Screen",
        CAMERA_TARGET,
        Vec3::splat(0.3),
        Material::default(),
    )])));
    assert!(s.pick(VIEW_W / 2.0, VIEW_H / 2.0, &viewport()).is_some());
    assert!(click_center(&mut s).is_empty());
    assert!(!s.is_activated());
}

#[test]
fn theme_toggle_swaps_lighting_presets() {
    let mut s = session_with_scene();
    assert_eq!(s.lighting(), lighting_profile(false));

    let cmds = s.handle(ViewerEvent::ToggleTheme);
    assert!(s.is_dark());
    assert_eq!(s.lighting(), lighting_profile(true));
    assert!(cmds.contains(&SceneCommand::SetDocumentTheme { dark: true }));

    let l = s.lighting();
    assert_eq!(l.directional_color, rgb_from_hex(0xaaaaee));
    assert_eq!(l.directional_intensity, 2.0);
    assert_eq!(l.ambient_intensity, 1.2);

    s.handle(ViewerEvent::ToggleTheme);
    let l = s.lighting();
    assert!(!s.is_dark());
    assert_eq!(l.directional_color, Vec3::ONE);
    assert_eq!(l.directional_intensity, 1.5);
    assert_eq!(l.ambient_intensity, 0.8);
}

#[test]
fn set_theme_is_idempotent() {
    let mut s = session_with_scene();
    s.handle(ViewerEvent::SetTheme(true));
    let once = s.lighting();
    s.handle(ViewerEvent::SetTheme(true));
    assert_eq!(s.lighting(), once);
    assert!(s.is_dark());
}

#[test]
fn theme_does_not_touch_activation() {
    let mut s = session_with_scene();
    click_center(&mut s);
    s.handle(ViewerEvent::ToggleTheme);
    assert!(s.is_activated());
    assert_eq!(monitor(&s).emissive, Emissive::on());
}

#[test]
fn burst_button_spawns_independent_effects() {
    let mut s = session_with_scene();
    s.handle(ViewerEvent::BurstParticles);
    s.handle(ViewerEvent::BurstParticles);
    assert_eq!(s.particles().len(), 2);
    assert!(!s.is_activated());
    for (p, opacity) in s.particles().instances() {
        assert_eq!(opacity, 1.0);
        assert!(p.y >= 0.0 && p.y < PARTICLE_HEIGHT + 1e-6);
    }
}

#[test]
fn particles_fade_out_on_a_fixed_tick() {
    let mut s = session_with_scene();
    s.handle(ViewerEvent::BurstParticles);
    let step = Duration::from_millis(PARTICLE_FADE_INTERVAL_MS);
    let expire = ticks_to_expire();
    assert!(expire <= 21);
    for _ in 0..expire - 1 {
        s.advance(step);
    }
    assert_eq!(s.particles().len(), 1);
    assert!(s.particles().effects()[0].opacity() > 0.0);
    s.advance(step);
    assert!(s.particles().is_empty());
}

#[test]
fn particle_system_expires_after_expected_ticks() {
    let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(9);
    let mut sys = ParticleSystem::default();
    sys.spawn(&mut rng, Vec3::ZERO);
    let mut ticks = 0;
    while !sys.is_empty() {
        sys.tick();
        ticks += 1;
        assert!(ticks <= 21, "effect outlived its fade");
    }
    assert_eq!(ticks, ticks_to_expire());
}

#[test]
fn resize_updates_projection_aspect() {
    let mut s = session_with_scene();
    s.handle(ViewerEvent::Resize { width: 1000.0, height: 500.0 });
    assert!((s.camera().aspect - 2.0).abs() < 1e-6);
    // Collapsed containers keep the previous aspect.
    assert!(s.handle(ViewerEvent::Resize { width: 0.0, height: 500.0 }).is_empty());
    assert!((s.camera().aspect - 2.0).abs() < 1e-6);
}

#[test]
fn orbit_drag_moves_the_eye_over_frames() {
    let mut s = session_with_scene();
    let start = s.camera().eye;
    s.handle(ViewerEvent::OrbitDrag { dx: 200.0, dy: 0.0, viewport_height: VIEW_H });
    for _ in 0..10 {
        s.advance(Duration::from_millis(16));
    }
    let eye = s.camera().eye;
    assert!((eye - start).length() > 0.01);
    // Orbiting keeps the distance to the target.
    let d0 = (start - CAMERA_TARGET).length();
    let d1 = (eye - CAMERA_TARGET).length();
    assert!((d0 - d1).abs() < 1e-4);
}

#[test]
fn zoom_respects_distance_limits() {
    let mut s = session_with_scene();
    for _ in 0..300 {
        s.handle(ViewerEvent::Zoom { delta_y: 120.0 });
        s.advance(Duration::from_millis(16));
    }
    assert!(s.orbit().distance() <= ORBIT_MAX_DISTANCE + 1e-4);
    for _ in 0..300 {
        s.handle(ViewerEvent::Zoom { delta_y: -120.0 });
        s.advance(Duration::from_millis(16));
    }
    assert!(s.orbit().distance() >= ORBIT_MIN_DISTANCE - 1e-4);
}

#[test]
fn invalid_config_is_rejected() {
    let mut cfg = ViewerConfig::default();
    cfg.camera.znear = 0.0;
    assert!(matches!(ViewerSession::new(&cfg, false), Err(ViewerError::InvalidConfig(_))));
}
