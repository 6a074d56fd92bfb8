//! Error types for frame generation.

use bevy::math::UVec3;
use thiserror::Error;

/// Errors that can occur while generating a frame.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    /// A voxel coordinate outside the occupancy grid.
    #[error("voxel ({x}, {y}, {z}) is outside the {dims} grid")]
    OutOfBounds { x: u32, y: u32, z: u32, dims: UVec3 },

    /// A chunk whose extent leaves the occupancy grid.
    #[error("chunk at {origin} with size {size} does not fit the {dims} grid")]
    ChunkOutOfBounds { origin: UVec3, size: UVec3, dims: UVec3 },

    /// Grids need at least one cell on every axis.
    #[error("grid dimensions {0} must be non-zero on every axis")]
    InvalidDimensions(UVec3),

    /// Fill fraction must be a finite value in [0, 1].
    #[error("fill fraction {0} must be within [0, 1]")]
    InvalidFraction(f32),

    /// The chunk budget ran out before the occupancy target was met.
    #[error("fill target unreachable: {filled}/{required} voxels after {attempts} chunks")]
    ThresholdUnreachable { attempts: usize, filled: usize, required: usize },

    /// The configuration could not be read or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for frame operations.
pub type FrameResult<T> = Result<T, FrameError>;
