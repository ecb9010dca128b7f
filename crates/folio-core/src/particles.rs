//! Short-lived point bursts.
//!
//! Each effect fades on its own fixed tick and is dropped once its opacity
//! reaches zero. Every effect keeps its own clock, fed from frame time, so
//! bursts never share or reset each other's fade.

use crate::constants::*;
use glam::Vec3;
use rand::Rng;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ParticleEffect {
    pub positions: Vec<Vec3>,
    ticks: u32,
    clock: Duration,
}

impl ParticleEffect {
    /// Sample `PARTICLE_COUNT` points in a small box above `origin`.
    pub fn spawn<R: Rng>(rng: &mut R, origin: Vec3) -> Self {
        let positions = (0..PARTICLE_COUNT)
            .map(|_| {
                origin
                    + Vec3::new(
                        (rng.gen::<f32>() - 0.5) * 2.0 * PARTICLE_HALF_WIDTH,
                        rng.gen::<f32>() * PARTICLE_HEIGHT,
                        (rng.gen::<f32>() - 0.5) * 2.0 * PARTICLE_HALF_WIDTH,
                    )
            })
            .collect();
        Self { positions, ticks: 0, clock: Duration::ZERO }
    }

    pub fn opacity(&self) -> f32 {
        (1.0 - self.ticks as f32 * PARTICLE_FADE_STEP).max(0.0)
    }

    pub fn is_expired(&self) -> bool {
        self.opacity() <= 0.0
    }

    /// One fade step. Returns false once the effect should be removed.
    pub fn tick(&mut self) -> bool {
        self.ticks = self.ticks.saturating_add(1);
        !self.is_expired()
    }
}

/// Number of fade ticks after which a fresh effect is gone.
pub fn ticks_to_expire() -> u32 {
    (1.0 / PARTICLE_FADE_STEP).ceil() as u32
}

#[derive(Clone, Debug)]
pub struct ParticleSystem {
    effects: Vec<ParticleEffect>,
    interval: Duration,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new(Duration::from_millis(PARTICLE_FADE_INTERVAL_MS))
    }
}

impl ParticleSystem {
    pub fn new(interval: Duration) -> Self {
        Self { effects: Vec::new(), interval }
    }

    pub fn spawn<R: Rng>(&mut self, rng: &mut R, origin: Vec3) {
        self.effects.push(ParticleEffect::spawn(rng, origin));
        log::debug!("[particles] spawned burst, {} active", self.effects.len());
    }

    /// Run one fade tick on every effect and drop the finished ones.
    pub fn tick(&mut self) {
        self.effects.retain_mut(|e| e.tick());
    }

    /// Advance every effect's clock by `dt`, running one tick per full
    /// interval. Returns the number of ticks run across all effects.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if self.interval.is_zero() {
            return 0;
        }
        let interval = self.interval;
        let mut ran = 0;
        self.effects.retain_mut(|e| {
            e.clock += dt;
            while e.clock >= interval {
                e.clock -= interval;
                ran += 1;
                if !e.tick() {
                    return false;
                }
            }
            true
        });
        ran
    }

    pub fn effects(&self) -> &[ParticleEffect] {
        &self.effects
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Flattened `(position, opacity)` pairs for upload.
    pub fn instances(&self) -> impl Iterator<Item = (Vec3, f32)> + '_ {
        self.effects
            .iter()
            .flat_map(|e| e.positions.iter().map(move |p| (*p, e.opacity())))
    }
}
