//! Construction config and the live tunables read at each regeneration.

use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;

use crate::constants::DEFAULT_FILL_FRACTION;
use crate::error::{FrameError, FrameResult};
use crate::randomize::FillMode;

/// Inclusive range and step of one panel tunable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunableRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl TunableRange {
    pub fn clamp(&self, value: f32) -> f32 { value.clamp(self.min, self.max) }

    /// Moves `value` by `steps` steps and snaps it back into range.
    pub fn stepped(&self, value: f32, steps: i32) -> f32 {
        let raw = value + self.step * steps as f32;
        // Snap to the step grid so repeated presses don't drift.
        let snapped = ((raw - self.min) / self.step).round() * self.step + self.min;
        self.clamp(snapped)
    }
}

/// Tunables exposed on the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum Tunable {
    StoreyHeight,
    GridWidth,
    GridDepth,
    MaxStoreys,
    MaxXBays,
    MaxYBays,
    RegenerationInterval,
}

impl Tunable {
    pub const ALL: [Tunable; 7] = [
        Tunable::StoreyHeight,
        Tunable::GridWidth,
        Tunable::GridDepth,
        Tunable::MaxStoreys,
        Tunable::MaxXBays,
        Tunable::MaxYBays,
        Tunable::RegenerationInterval,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tunable::StoreyHeight => "Storey Height",
            Tunable::GridWidth => "Grid X Width",
            Tunable::GridDepth => "Grid Y Depth",
            Tunable::MaxStoreys => "Max Storeys",
            Tunable::MaxXBays => "Max X Bays",
            Tunable::MaxYBays => "Max Y Bays",
            Tunable::RegenerationInterval => "Regen. Delay",
        }
    }

    pub fn range(self) -> TunableRange {
        match self {
            Tunable::StoreyHeight => TunableRange { min: 2.0, max: 5.0, step: 0.1 },
            Tunable::GridWidth | Tunable::GridDepth => TunableRange { min: 4.0, max: 10.0, step: 0.1 },
            Tunable::MaxStoreys => TunableRange { min: 2.0, max: 7.0, step: 1.0 },
            Tunable::MaxXBays | Tunable::MaxYBays => TunableRange { min: 2.0, max: 10.0, step: 1.0 },
            Tunable::RegenerationInterval => TunableRange { min: 1.0, max: 7.0, step: 0.5 },
        }
    }
}

/// Live tunables. Changes apply at the next regeneration; existing grids
/// keep the dimensions they were built with.
#[derive(Resource, Debug, Clone, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct FrameSettings {
    pub unit_width: f32,
    pub unit_height: f32,
    pub unit_depth: f32,
    pub width_size: u32,
    pub height_size: u32,
    pub depth_size: u32,
    pub pause_rotation: bool,
    pub regeneration_loop: bool,
    pub regeneration_interval: f32,
    pub animate_regeneration: bool,
    pub fill_fraction: f32,
    pub fill_mode: FillMode,
    pub show_bounds: bool,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            unit_width: 7.0,
            unit_height: 3.5,
            unit_depth: 7.0,
            width_size: 5,
            height_size: 5,
            depth_size: 5,
            pause_rotation: false,
            regeneration_loop: false,
            regeneration_interval: 5.0,
            animate_regeneration: false,
            fill_fraction: DEFAULT_FILL_FRACTION,
            fill_mode: FillMode::Chunks,
            show_bounds: false,
        }
    }
}

impl FrameSettings {
    /// Voxel counts along width, height and depth.
    pub fn dims(&self) -> UVec3 { UVec3::new(self.width_size, self.height_size, self.depth_size) }

    /// World size of one voxel.
    pub fn unit(&self) -> Vec3 { Vec3::new(self.unit_width, self.unit_height, self.unit_depth) }

    pub fn value(&self, tunable: Tunable) -> f32 {
        match tunable {
            Tunable::StoreyHeight => self.unit_height,
            Tunable::GridWidth => self.unit_width,
            Tunable::GridDepth => self.unit_depth,
            Tunable::MaxStoreys => self.height_size as f32,
            Tunable::MaxXBays => self.width_size as f32,
            Tunable::MaxYBays => self.depth_size as f32,
            Tunable::RegenerationInterval => self.regeneration_interval,
        }
    }

    pub fn set(&mut self, tunable: Tunable, value: f32) {
        let value = tunable.range().clamp(value);
        match tunable {
            Tunable::StoreyHeight => self.unit_height = value,
            Tunable::GridWidth => self.unit_width = value,
            Tunable::GridDepth => self.unit_depth = value,
            Tunable::MaxStoreys => self.height_size = value.round() as u32,
            Tunable::MaxXBays => self.width_size = value.round() as u32,
            Tunable::MaxYBays => self.depth_size = value.round() as u32,
            Tunable::RegenerationInterval => self.regeneration_interval = value,
        }
    }

    pub fn adjust(&mut self, tunable: Tunable, steps: i32) {
        let value = tunable.range().stepped(self.value(tunable), steps);
        self.set(tunable, value);
    }

    /// Pulls every tunable back into its panel range.
    pub fn clamp_all(&mut self) {
        for tunable in Tunable::ALL {
            self.set(tunable, self.value(tunable));
        }
        self.fill_fraction = self.fill_fraction.clamp(0.0, 1.0);
    }
}

/// Optional overrides for [`FrameSettings`] in a config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TunablesConfig {
    pub storey_height: Option<f32>,
    pub grid_width: Option<f32>,
    pub grid_depth: Option<f32>,
    pub max_storeys: Option<u32>,
    pub max_x_bays: Option<u32>,
    pub max_y_bays: Option<u32>,
    pub pause_rotation: Option<bool>,
    pub fill_fraction: Option<f32>,
    pub fill_mode: Option<FillMode>,
}

/// Construction parameters for one mounted frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Id of the element the viewport attaches to.
    pub host_id: String,
    pub animate_regeneration: bool,
    pub regeneration_loop: bool,
    pub regeneration_interval_seconds: f32,
    pub show_control_panel: bool,
    /// Fixed RNG seed; entropy when absent.
    pub seed: Option<u64>,
    pub tunables: TunablesConfig,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            host_id: "frame".into(),
            animate_regeneration: false,
            regeneration_loop: false,
            regeneration_interval_seconds: 5.0,
            show_control_panel: true,
            seed: None,
            tunables: TunablesConfig::default(),
        }
    }
}

impl FrameConfig {
    pub fn new(host_id: impl Into<String>) -> Self {
        Self { host_id: host_id.into(), ..default() }
    }

    pub fn from_toml_str(source: &str) -> FrameResult<Self> {
        toml::from_str(source).map_err(|e| FrameError::Config(e.to_string()))
    }

    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> FrameResult<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(source) => {
                info!("loading frame config from {}", path.display());
                Self::from_toml_str(&source)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("no frame config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(FrameError::Config(format!("{}: {e}", path.display()))),
        }
    }

    /// Uses `host_id` unless the loaded config names a host of its own.
    pub fn with_fallback_host(self, host_id: impl Into<String>) -> Self {
        if self.host_id == Self::default().host_id {
            Self { host_id: host_id.into(), ..self }
        } else {
            self
        }
    }

    /// Initial tunables with the config's overrides applied.
    ///
    /// `[tunables]` values outside the panel ranges are clamped with a warning.
    /// The loop interval is taken as given as long as it is a usable duration.
    pub fn settings(&self) -> FrameSettings {
        let t = &self.tunables;
        let defaults = FrameSettings::default();
        let mut settings = FrameSettings {
            unit_height: t.storey_height.unwrap_or(defaults.unit_height),
            unit_width: t.grid_width.unwrap_or(defaults.unit_width),
            unit_depth: t.grid_depth.unwrap_or(defaults.unit_depth),
            height_size: t.max_storeys.unwrap_or(defaults.height_size),
            width_size: t.max_x_bays.unwrap_or(defaults.width_size),
            depth_size: t.max_y_bays.unwrap_or(defaults.depth_size),
            pause_rotation: t.pause_rotation.unwrap_or(defaults.pause_rotation),
            fill_fraction: t.fill_fraction.unwrap_or(defaults.fill_fraction),
            fill_mode: t.fill_mode.unwrap_or(defaults.fill_mode),
            regeneration_loop: self.regeneration_loop,
            regeneration_interval: self.regeneration_interval_seconds,
            animate_regeneration: self.animate_regeneration,
            ..defaults
        };
        let requested = settings.clone();
        settings.clamp_all();
        if self.regeneration_interval_seconds.is_finite() && self.regeneration_interval_seconds >= 0.0 {
            settings.regeneration_interval = self.regeneration_interval_seconds;
        }
        for tunable in Tunable::ALL {
            let (asked, got) = (requested.value(tunable), settings.value(tunable));
            if asked != got {
                warn!("{} {asked} outside {:?}, using {got}", tunable.label(), tunable.range());
            }
        }
        if requested.fill_fraction != settings.fill_fraction {
            warn!("fill fraction {} outside 0..1, using {}", requested.fill_fraction, settings.fill_fraction);
        }
        settings
    }

    /// CSS selector of the canvas to mount into, if the host id can name one.
    pub fn canvas_selector(&self) -> Option<String> {
        let id = self.host_id.trim();
        let valid = !id.is_empty()
            && !id.starts_with(|c: char| c.is_ascii_digit())
            && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Some(format!("#{id}"))
        } else {
            error!("mount target {:?} not found, viewport stays detached", self.host_id);
            None
        }
    }
}
