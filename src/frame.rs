//! Per-cycle frame snapshot: grids, chunks and bounds built from the settings.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::bounds::{compute_bounding_box, FrameBounds};
use crate::error::FrameResult;
use crate::randomize::{randomize_all, randomize_some_chunks, Chunk, FillMode};
use crate::settings::FrameSettings;
use crate::voxel::FrameGrids;

/// Grids and derived data of the frame currently on screen. Replaced
/// wholesale on every regeneration.
#[derive(Resource, Debug, Clone, Default)]
pub struct FrameState {
    pub grids: FrameGrids,
    pub chunks: Vec<Chunk>,
    pub bounds: FrameBounds,
    /// Voxel size the grids were drawn with.
    pub unit: Vec3,
    /// Number of regenerations so far, including failed ones.
    pub generation: u64,
}

impl FrameState {
    /// Builds a fresh snapshot from the current settings.
    pub fn generate<R: Rng + ?Sized>(settings: &FrameSettings, generation: u64, rng: &mut R) -> FrameResult<Self> {
        let mut grids = FrameGrids::allocate(settings.dims())?;
        let chunks = match settings.fill_mode {
            FillMode::Chunks => randomize_some_chunks(&mut grids, settings.fill_fraction, rng)?,
            FillMode::Uniform => {
                randomize_all(&mut grids, rng)?;
                Vec::new()
            }
        };
        let unit = settings.unit();
        let bounds = compute_bounding_box(grids.occupancy(), unit);
        Ok(Self { grids, chunks, bounds, unit, generation })
    }
}

#[derive(Resource)]
pub struct FrameRng(pub ChaCha8Rng);

impl FrameRng {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        debug!("frame rng seed {seed}");
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}
