//! Activation toggle for the designated pickable object.
//!
//! `toggle` is a pure transition: it takes the current state and the name of
//! the object that was hit and returns the next state plus the commands the
//! session should apply. Only an exact, case-sensitive name match does anything.

use crate::scene::Emissive;
use crate::session::SceneCommand;
use glam::Vec3;
use smallvec::{smallvec, SmallVec};

pub type Commands = SmallVec<[SceneCommand; 4]>;

#[derive(Clone, Debug, PartialEq)]
pub struct InteractionState {
    /// Node name that reacts to clicks.
    pub target: String,
    pub activated: bool,
    /// Where activation bursts are spawned.
    pub effect_origin: Vec3,
}

impl InteractionState {
    pub fn new(target: impl Into<String>) -> Self {
        Self { target: target.into(), activated: false, effect_origin: Vec3::ZERO }
    }

    /// Emissive that matches the current activation flag.
    pub fn emissive(&self) -> Emissive {
        if self.activated {
            Emissive::on()
        } else {
            Emissive::off()
        }
    }
}

pub fn toggle(state: &InteractionState, hit_name: &str) -> (InteractionState, Commands) {
    if hit_name != state.target {
        return (state.clone(), Commands::new());
    }
    let next = InteractionState { activated: !state.activated, ..state.clone() };
    let mut commands: Commands = smallvec![SceneCommand::SetEmissive {
        target: next.target.clone(),
        emissive: next.emissive(),
    }];
    if next.activated {
        commands.push(SceneCommand::SpawnParticles { origin: next.effect_origin });
    }
    (next, commands)
}
