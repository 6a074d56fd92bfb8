//! Regeneration state machine.
//!
//! Phases advance on elapsed frame time inside the per-frame tick rather than
//! on host timers, so a full leave/enter cycle can be driven in tests.

use bevy::prelude::*;

use crate::animation::AnimationTiming;
use crate::settings::FrameSettings;

#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum RegenerationPhase {
    #[default]
    Idle,
    /// Old elements are flying out; regenerate once `elapsed >= window`.
    Leaving { elapsed: f32, window: f32 },
    /// New elements are flying in; back to idle once `elapsed >= window`.
    Entering { elapsed: f32, window: f32 },
}

/// Work the scene has to carry out for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegenerationCommand {
    /// Rebuild immediately without animation.
    Regenerate,
    /// Start the fly-out of the current elements.
    BeginLeave,
    /// Rebuild and fly the new elements in.
    RegenerateAndEnter,
    /// Animation finished.
    Complete,
}

/// Which regeneration the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegenerationMode {
    /// Animated or not per `FrameSettings::animate_regeneration`.
    #[default]
    Configured,
    WithoutAnimation,
}

#[derive(Resource, Debug, Clone, Default, Reflect)]
#[reflect(Resource)]
pub struct RegenerationController {
    phase: RegenerationPhase,
    time_since_last_regeneration: f32,
}

impl RegenerationController {
    pub fn phase(&self) -> RegenerationPhase { self.phase }

    pub fn is_animating(&self) -> bool { self.phase != RegenerationPhase::Idle }

    pub fn time_since_last_regeneration(&self) -> f32 { self.time_since_last_regeneration }

    /// Requests a regeneration. Dropped while an animation is in flight.
    pub fn trigger(&mut self, mode: RegenerationMode, settings: &FrameSettings) -> Option<RegenerationCommand> {
        if self.is_animating() {
            debug!("regeneration request dropped, animation in flight");
            return None;
        }
        self.time_since_last_regeneration = 0.0;
        let animate = mode == RegenerationMode::Configured && settings.animate_regeneration;
        if !animate {
            return Some(RegenerationCommand::Regenerate);
        }
        let window = AnimationTiming::for_storeys(settings.height_size).window();
        self.phase = RegenerationPhase::Leaving { elapsed: 0.0, window };
        Some(RegenerationCommand::BeginLeave)
    }

    /// Advances phase clocks and the loop timer by one frame.
    pub fn tick(&mut self, dt: f32, settings: &FrameSettings) -> Vec<RegenerationCommand> {
        let mut commands = Vec::new();
        self.time_since_last_regeneration += dt;

        match &mut self.phase {
            RegenerationPhase::Idle => {}
            RegenerationPhase::Leaving { elapsed, window } => {
                *elapsed += dt;
                if *elapsed >= *window {
                    let window = AnimationTiming::for_storeys(settings.height_size).window();
                    self.phase = RegenerationPhase::Entering { elapsed: 0.0, window };
                    commands.push(RegenerationCommand::RegenerateAndEnter);
                }
            }
            RegenerationPhase::Entering { elapsed, window } => {
                *elapsed += dt;
                if *elapsed >= *window {
                    self.phase = RegenerationPhase::Idle;
                    self.time_since_last_regeneration = 0.0;
                    commands.push(RegenerationCommand::Complete);
                }
            }
        }

        if settings.regeneration_loop && self.time_since_last_regeneration > settings.regeneration_interval {
            commands.extend(self.trigger(RegenerationMode::Configured, settings));
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animated() -> FrameSettings {
        FrameSettings { animate_regeneration: true, height_size: 2, ..default() }
    }

    #[test]
    fn static_trigger_regenerates_and_stays_idle() {
        let mut controller = RegenerationController::default();
        controller.tick(3.0, &FrameSettings::default());
        let cmd = controller.trigger(RegenerationMode::Configured, &FrameSettings::default());
        assert_eq!(cmd, Some(RegenerationCommand::Regenerate));
        assert!(!controller.is_animating());
        assert_eq!(controller.time_since_last_regeneration(), 0.0);
    }

    #[test]
    fn animated_cycle_leaves_then_enters_then_completes() {
        let settings = animated();
        // 2 storeys: 2.0 + 0.5 + 0.1 + 0.1
        let window = 2.7;
        let mut controller = RegenerationController::default();

        assert_eq!(controller.trigger(RegenerationMode::Configured, &settings), Some(RegenerationCommand::BeginLeave));
        assert!(controller.is_animating());

        assert!(controller.tick(window - 0.1, &settings).is_empty());
        assert_eq!(controller.tick(0.2, &settings), vec![RegenerationCommand::RegenerateAndEnter]);
        assert!(matches!(controller.phase(), RegenerationPhase::Entering { .. }));

        assert!(controller.tick(window - 0.1, &settings).is_empty());
        assert_eq!(controller.tick(0.2, &settings), vec![RegenerationCommand::Complete]);
        assert_eq!(controller.phase(), RegenerationPhase::Idle);
        assert_eq!(controller.time_since_last_regeneration(), 0.0);
    }

    #[test]
    fn triggers_while_animating_are_dropped() {
        let settings = animated();
        let mut controller = RegenerationController::default();
        controller.trigger(RegenerationMode::Configured, &settings);
        controller.tick(1.0, &settings);

        assert_eq!(controller.trigger(RegenerationMode::Configured, &settings), None);
        assert_eq!(controller.trigger(RegenerationMode::WithoutAnimation, &settings), None);
        assert!(matches!(controller.phase(), RegenerationPhase::Leaving { elapsed, .. } if elapsed == 1.0));
    }

    #[test]
    fn without_animation_ignores_animate_setting() {
        let mut controller = RegenerationController::default();
        let cmd = controller.trigger(RegenerationMode::WithoutAnimation, &animated());
        assert_eq!(cmd, Some(RegenerationCommand::Regenerate));
        assert!(!controller.is_animating());
    }

    #[test]
    fn loop_timer_fires_after_interval() {
        let settings = FrameSettings { regeneration_loop: true, regeneration_interval: 1.0, ..default() };
        let mut controller = RegenerationController::default();
        assert!(controller.tick(0.6, &settings).is_empty());
        assert!(controller.tick(0.3, &settings).is_empty());
        assert_eq!(controller.tick(0.2, &settings), vec![RegenerationCommand::Regenerate]);
        assert_eq!(controller.time_since_last_regeneration(), 0.0);
        assert!(controller.tick(0.5, &settings).is_empty());
    }

    #[test]
    fn loop_waits_for_animated_cycle_to_finish() {
        let settings = FrameSettings { regeneration_loop: true, regeneration_interval: 1.0, ..animated() };
        let mut controller = RegenerationController::default();

        assert_eq!(controller.tick(1.1, &settings), vec![RegenerationCommand::BeginLeave]);
        // the interval elapses twice over while leaving, nothing new starts
        assert!(controller.tick(1.1, &settings).is_empty());
        assert!(controller.tick(1.0, &settings).is_empty());
        assert_eq!(controller.tick(0.7, &settings), vec![RegenerationCommand::RegenerateAndEnter]);

        assert_eq!(controller.tick(2.8, &settings), vec![RegenerationCommand::Complete]);
        assert_eq!(controller.time_since_last_regeneration(), 0.0);

        assert!(controller.tick(0.5, &settings).is_empty());
        assert_eq!(controller.tick(0.6, &settings), vec![RegenerationCommand::BeginLeave]);
    }

    #[test]
    fn loop_timer_is_idle_when_disabled() {
        let mut controller = RegenerationController::default();
        assert!(controller.tick(100.0, &FrameSettings::default()).is_empty());
    }
}
