//! Explicit viewer context.
//!
//! `ViewerSession` owns everything the viewer mutates: the loaded scene, the
//! orbit camera, theme and activation state, and live particle bursts. Hosts
//! feed it [`ViewerEvent`]s and get back the [`SceneCommand`]s that were
//! applied, so DOM-side effects (the document theme class) can follow.

use crate::camera::{Camera, OrbitCamera};
use crate::config::ViewerConfig;
use crate::error::Result;
use crate::interaction::{self, Commands, InteractionState};
use crate::particles::ParticleSystem;
use crate::picking::{self, Hit, Viewport};
use crate::scene::{Emissive, Scene};
use crate::theme::{LightingProfile, ThemeState};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use smallvec::smallvec;
use std::time::Duration;

#[derive(Clone, Debug)]
pub enum ViewerEvent {
    /// Pointer click in client pixels.
    Click { x: f32, y: f32, viewport: Viewport },
    OrbitDrag { dx: f32, dy: f32, viewport_height: f32 },
    Zoom { delta_y: f32 },
    ToggleTheme,
    SetTheme(bool),
    BurstParticles,
    Resize { width: f32, height: f32 },
    SceneLoaded(Scene),
    SceneLoadFailed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum SceneCommand {
    SetEmissive { target: String, emissive: Emissive },
    SpawnParticles { origin: Vec3 },
    ApplyLighting(LightingProfile),
    /// Host should mirror the flag onto the document-level theme marker.
    SetDocumentTheme { dark: bool },
    SetAspect(f32),
}

pub struct ViewerSession {
    scene: Option<Scene>,
    orbit: OrbitCamera,
    theme: ThemeState,
    lighting: LightingProfile,
    interaction: InteractionState,
    particles: ParticleSystem,
    rng: StdRng,
    /// Bumped whenever the loaded scene is replaced or dropped.
    scene_revision: u64,
}

impl ViewerSession {
    pub fn new(config: &ViewerConfig, is_dark: bool) -> Result<Self> {
        config.validate()?;
        let camera = Camera::from_config(&config.camera, 1.0);
        let theme = ThemeState::new(is_dark);
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            scene: None,
            orbit: OrbitCamera::new(camera, config.orbit.clone()),
            lighting: theme.profile(),
            theme,
            interaction: InteractionState::new(config.pickable_name.clone()),
            particles: ParticleSystem::default(),
            rng,
            scene_revision: 0,
        })
    }

    pub fn handle(&mut self, event: ViewerEvent) -> Commands {
        let commands = match event {
            ViewerEvent::Click { x, y, viewport } => self.click(x, y, &viewport),
            ViewerEvent::OrbitDrag { dx, dy, viewport_height } => {
                self.orbit.rotate_by_pixels(dx, dy, viewport_height);
                Commands::new()
            }
            ViewerEvent::Zoom { delta_y } => {
                self.orbit.zoom(delta_y);
                Commands::new()
            }
            ViewerEvent::ToggleTheme => {
                let dark = !self.theme.is_dark;
                self.theme_commands(dark)
            }
            ViewerEvent::SetTheme(dark) => self.theme_commands(dark),
            ViewerEvent::BurstParticles => {
                smallvec![SceneCommand::SpawnParticles { origin: self.interaction.effect_origin }]
            }
            ViewerEvent::Resize { width, height } => {
                if width > 0.0 && height > 0.0 {
                    smallvec![SceneCommand::SetAspect(width / height)]
                } else {
                    Commands::new()
                }
            }
            ViewerEvent::SceneLoaded(scene) => self.install_scene(scene),
            ViewerEvent::SceneLoadFailed(reason) => {
                log::error!("[scene] load failed: {}", reason);
                self.scene = None;
                self.scene_revision += 1;
                self.interaction.activated = false;
                Commands::new()
            }
        };
        self.apply(&commands);
        commands
    }

    /// Per-frame step: camera damping and particle fade.
    pub fn advance(&mut self, dt: Duration) {
        self.orbit.update();
        self.particles.advance(dt);
    }

    pub fn pick(&self, x: f32, y: f32, viewport: &Viewport) -> Option<Hit> {
        picking::pick(x, y, viewport, &self.orbit.camera, self.scene.as_ref())
    }

    fn click(&mut self, x: f32, y: f32, viewport: &Viewport) -> Commands {
        let Some(hit) = self.pick(x, y, viewport) else {
            return Commands::new();
        };
        let Some(name) = self.scene.as_ref().and_then(|s| s.object(hit.object)).map(|o| o.name.clone())
        else {
            return Commands::new();
        };
        log::debug!("[click] hit `{}` at {:.2}", name, hit.distance);
        let (next, commands) = interaction::toggle(&self.interaction, &name);
        if next.activated != self.interaction.activated {
            log::info!("[click] `{}` activated={}", name, next.activated);
        }
        self.interaction = next;
        commands
    }

    fn theme_commands(&mut self, dark: bool) -> Commands {
        log::info!("[theme] dark={}", dark);
        let profile = self.theme.set(dark);
        smallvec![
            SceneCommand::ApplyLighting(profile),
            SceneCommand::SetDocumentTheme { dark },
        ]
    }

    fn install_scene(&mut self, scene: Scene) -> Commands {
        let target = self.interaction.target.clone();
        if scene.ids_named(&target).is_empty() {
            log::warn!("[scene] no object named `{}`; clicks will not activate anything", target);
        }
        self.scene = Some(scene);
        self.scene_revision += 1;
        self.interaction.activated = false;
        smallvec![
            SceneCommand::SetEmissive { target, emissive: Emissive::off() },
            SceneCommand::ApplyLighting(self.theme.profile()),
        ]
    }

    fn apply(&mut self, commands: &[SceneCommand]) {
        for cmd in commands {
            match cmd {
                SceneCommand::SetEmissive { target, emissive } => {
                    if let Some(scene) = self.scene.as_mut() {
                        scene.set_emissive_named(target, *emissive);
                    }
                }
                SceneCommand::SpawnParticles { origin } => {
                    self.particles.spawn(&mut self.rng, *origin);
                }
                SceneCommand::ApplyLighting(profile) => self.lighting = *profile,
                SceneCommand::SetAspect(aspect) => self.orbit.camera.aspect = *aspect,
                SceneCommand::SetDocumentTheme { .. } => {}
            }
        }
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn scene_revision(&self) -> u64 {
        self.scene_revision
    }

    pub fn camera(&self) -> &Camera {
        &self.orbit.camera
    }

    pub fn orbit(&self) -> &OrbitCamera {
        &self.orbit
    }

    pub fn lighting(&self) -> LightingProfile {
        self.lighting
    }

    pub fn is_dark(&self) -> bool {
        self.theme.is_dark
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn is_activated(&self) -> bool {
        self.interaction.activated
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }
}
