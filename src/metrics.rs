use std::time::Duration;

use bevy::prelude::*;

use crate::constants::METRICS_REPORT_SECS;
use crate::scene::FrameElement;

#[derive(Resource, Default, Debug)]
pub struct Metrics {
    pub frame_time_ms: f32,
    pub fps: f32,
    pub voxel_count: u64,
    pub element_count: u64,
    pub regenerations: u64,
}

pub fn flush_metrics(
    mut metrics: ResMut<Metrics>,
    time: Res<Time>,
    elements: Query<(), With<FrameElement>>,
) {
    let dt = time.delta_secs();
    metrics.frame_time_ms = dt * 1000.0;
    metrics.fps = if dt > 0.0 { 1.0 / dt } else { 0.0 };
    metrics.element_count = elements.iter().count() as u64;
}

/// Log line emitted every [`METRICS_REPORT_SECS`], counting the
/// regenerations since the previous line.
#[derive(Resource)]
pub struct MetricsReport {
    every: Timer,
    regenerations_seen: u64,
}

impl Default for MetricsReport {
    fn default() -> Self {
        Self {
            every: Timer::from_seconds(METRICS_REPORT_SECS, TimerMode::Repeating),
            regenerations_seen: 0,
        }
    }
}

impl MetricsReport {
    /// Advances the report clock; returns the line to log when one is due.
    pub fn poll(&mut self, elapsed: Duration, metrics: &Metrics) -> Option<String> {
        if !self.every.tick(elapsed).just_finished() {
            return None;
        }
        let fresh = metrics.regenerations.saturating_sub(self.regenerations_seen);
        self.regenerations_seen = metrics.regenerations;
        Some(format!(
            "{:.1} fps ({:.2} ms) | {} voxels in {} elements | {fresh} regenerations since last report",
            metrics.fps, metrics.frame_time_ms, metrics.voxel_count, metrics.element_count,
        ))
    }
}

pub fn periodic_metrics_report(mut report: ResMut<MetricsReport>, metrics: Res<Metrics>, time: Res<Time>) {
    if let Some(line) = report.poll(time.delta(), &metrics) {
        info!("{line}");
    }
}
