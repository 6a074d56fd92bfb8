//! Global generation, animation and camera constants

/// Proportion of the grid that the chunk randomizer fills by default.
pub const DEFAULT_FILL_FRACTION: f32 = 0.35;
/// Chunks carved after the first one before the randomizer gives up.
pub const MAX_CHUNK_ATTEMPTS: usize = 10_000;
/// Chunk footprints and heights are capped at this share of the axis.
pub const CHUNK_EXTENT_RATIO: f32 = 0.7;

pub const ANIM_DISTANCE: f32 = 100.0; // world units
pub const ANIM_JITTER_SECS: f32 = 0.1;
pub const ANIM_MOVE_SECS: f32 = 0.5;
pub const ANIM_BUFFER_SECS: f32 = 0.1;
/// Stagger span per storey.
pub const ANIM_STAGGER_PER_STOREY_SECS: f32 = 1.0;

/// Pivot spin, 0.007 rad per frame at 60 Hz.
pub const ROTATION_SPEED: f32 = 0.007 * 60.0;

pub const CAMERA_DISTANCE_FACTOR: f32 = 1.2;
pub const CAMERA_MIN_DISTANCE: f32 = 1.5;
pub const CAMERA_FOV_DEGREES: f32 = 75.0;

pub const METRICS_REPORT_SECS: f32 = 10.0;
