//! Staggered fly-out / fly-in of structure elements.

use bevy::math::curve::{Curve, EaseFunction};
use bevy::prelude::*;
use rand::Rng;

use crate::constants::{
    ANIM_BUFFER_SECS, ANIM_DISTANCE, ANIM_JITTER_SECS, ANIM_MOVE_SECS, ANIM_STAGGER_PER_STOREY_SECS,
};

/// Durations of one leave or enter phase, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTiming {
    /// Delay between the first and the last element starting to move.
    pub stagger: f32,
    /// Travel time of a single element.
    pub movement: f32,
    /// Upper bound of the random extra delay per element.
    pub jitter: f32,
    pub buffer: f32,
    /// Vertical travel distance.
    pub distance: f32,
}

impl AnimationTiming {
    pub fn for_storeys(storeys: u32) -> Self {
        Self {
            stagger: storeys as f32 * ANIM_STAGGER_PER_STOREY_SECS,
            movement: ANIM_MOVE_SECS,
            jitter: ANIM_JITTER_SECS,
            buffer: ANIM_BUFFER_SECS,
            distance: ANIM_DISTANCE,
        }
    }

    /// Time after which every element of the phase has arrived.
    pub fn window(&self) -> f32 {
        self.stagger + self.movement + self.jitter + self.buffer
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaggerOrder {
    /// Leaving: the top of the frame goes first.
    TopFirst,
    /// Entering: the bottom of the frame lands first.
    BottomFirst,
}

/// Per-element start delays from each element's vertical extent `(min_y, max_y)`.
pub fn stagger_delays<R: Rng + ?Sized>(
    extents: &[(f32, f32)],
    order: StaggerOrder,
    timing: &AnimationTiming,
    rng: &mut R,
) -> Vec<f32> {
    let lowest = extents.iter().map(|e| e.0).fold(f32::INFINITY, f32::min);
    let highest = extents.iter().map(|e| e.1).fold(f32::NEG_INFINITY, f32::max);
    let span = highest - lowest;

    extents
        .iter()
        .map(|&(min_y, max_y)| {
            let center = (min_y + max_y) * 0.5;
            let normalized = if span > f32::EPSILON {
                match order {
                    StaggerOrder::TopFirst => (highest - center) / span,
                    StaggerOrder::BottomFirst => (center - lowest) / span,
                }
            } else {
                0.0
            };
            normalized * timing.stagger + rng.gen::<f32>() * timing.jitter
        })
        .collect()
}

/// Eased translation from `from` to `to`, starting after `delay`.
#[derive(Component, Debug, Clone)]
pub struct PositionTween {
    pub from: Vec3,
    pub to: Vec3,
    pub delay: f32,
    pub duration: f32,
    pub ease: EaseFunction,
    elapsed: f32,
}

impl PositionTween {
    pub fn new(from: Vec3, to: Vec3, delay: f32, duration: f32, ease: EaseFunction) -> Self {
        Self { from, to, delay, duration, ease, elapsed: 0.0 }
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return if self.elapsed >= self.delay { 1.0 } else { 0.0 };
        }
        ((self.elapsed - self.delay) / self.duration).clamp(0.0, 1.0)
    }

    pub fn sample(&self) -> Vec3 {
        let t = self.ease.sample_clamped(self.progress());
        self.from.lerp(self.to, t)
    }

    /// Advances the clock; true once the tween has reached its target.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.progress() >= 1.0
    }
}

pub fn advance_tweens(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut PositionTween)>,
) {
    let dt = time.delta_secs();
    for (entity, mut transform, mut tween) in query.iter_mut() {
        let finished = tween.advance(dt);
        if tween.elapsed < tween.delay {
            continue;
        }
        transform.translation = tween.sample();
        if finished {
            transform.translation = tween.to;
            commands.entity(entity).remove::<PositionTween>();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn window_adds_all_parts() {
        let timing = AnimationTiming::for_storeys(5);
        assert_eq!(timing.stagger, 5.0);
        assert!((timing.window() - 5.7).abs() < 1e-5);
    }

    #[test]
    fn top_elements_leave_first_and_bottom_elements_enter_first() {
        let timing = AnimationTiming { jitter: 0.0, ..AnimationTiming::for_storeys(4) };
        let extents = [(0.0, 2.0), (4.0, 6.0), (8.0, 10.0)];
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let leave = stagger_delays(&extents, StaggerOrder::TopFirst, &timing, &mut rng);
        assert_eq!(leave, vec![3.6, 2.0, 0.4]);

        let enter = stagger_delays(&extents, StaggerOrder::BottomFirst, &timing, &mut rng);
        assert_eq!(enter, vec![0.4, 2.0, 3.6]);
    }

    #[test]
    fn flat_frames_and_jitter_stay_bounded() {
        let timing = AnimationTiming::for_storeys(3);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let delays = stagger_delays(&[(1.0, 1.0); 8], StaggerOrder::TopFirst, &timing, &mut rng);
        assert!(delays.iter().all(|d| (0.0..timing.jitter).contains(d)));
    }

    #[test]
    fn tween_waits_for_delay_then_reaches_target() {
        let mut tween = PositionTween::new(Vec3::ZERO, Vec3::Y * 100.0, 1.0, 0.5, EaseFunction::QuadraticInOut);
        assert!(!tween.advance(0.5));
        assert_eq!(tween.sample(), Vec3::ZERO);
        assert!(!tween.advance(0.75));
        let mid = tween.sample();
        assert!(mid.y > 0.0 && mid.y < 100.0);
        assert!(tween.advance(0.5));
        assert_eq!(tween.sample(), Vec3::Y * 100.0);
    }
}
