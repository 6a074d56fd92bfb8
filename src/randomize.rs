//! Random occupancy: ground-anchored rectangular chunks or per-voxel noise.

use bevy::math::UVec3;
use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;

use crate::constants::{CHUNK_EXTENT_RATIO, MAX_CHUNK_ATTEMPTS};
use crate::error::{FrameError, FrameResult};
use crate::voxel::FrameGrids;

/// How the occupancy grid gets filled on regeneration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    /// Stacked rectangular chunks until the fill fraction is reached.
    #[default]
    Chunks,
    /// Each voxel filled with probability one half.
    Uniform,
}

/// An axis-aligned block of voxels carved in one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub origin: UVec3,
    pub size: UVec3,
}

impl Chunk {
    pub fn contains(&self, p: UVec3) -> bool {
        p.cmpge(self.origin).all() && p.cmplt(self.origin + self.size).all()
    }

    /// True when the chunk starts on the ground and spans all storeys.
    pub fn is_full_height(&self, storeys: u32) -> bool {
        self.origin.y == 0 && self.size.y == storeys
    }
}

/// Integer in `[lo, hi]` after flooring both bounds; an empty range yields `lo`.
pub fn random_int<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> u32 {
    let lo = lo.floor().max(0.0) as u32;
    let hi = hi.floor().max(0.0) as u32;
    if hi < lo { lo } else { rng.gen_range(lo..=hi) }
}

/// Carves a chunk of the given size at a random ground-level position.
///
/// The position range leaves one unit of slack on each horizontal axis, so
/// only a chunk spanning the whole axis reaches the last column of voxels.
pub fn carve_chunk<R: Rng + ?Sized>(grids: &mut FrameGrids, size: UVec3, rng: &mut R) -> FrameResult<Chunk> {
    let dims = grids.dims();
    let x = random_int(rng, 0.0, dims.x as f32 - size.x as f32 - 1.0);
    let z = random_int(rng, 0.0, dims.z as f32 - size.z as f32 - 1.0);
    let chunk = Chunk { origin: UVec3::new(x, 0, z), size };

    let end = chunk.origin + chunk.size;
    if end.cmpgt(dims).any() {
        return Err(FrameError::ChunkOutOfBounds { origin: chunk.origin, size, dims });
    }
    for i in chunk.origin.x..end.x {
        for j in 0..end.y {
            for k in chunk.origin.z..end.z {
                grids.flag_voxel(i, j, k)?;
            }
        }
    }
    Ok(chunk)
}

/// Fills `grids` with chunks until at least `fraction` of the voxels are set.
///
/// The first chunk always spans every storey; later ones are capped below
/// full height. Returns the carved chunks in order.
pub fn randomize_some_chunks<R: Rng + ?Sized>(
    grids: &mut FrameGrids,
    fraction: f32,
    rng: &mut R,
) -> FrameResult<Vec<Chunk>> {
    randomize_some_chunks_with_budget(grids, fraction, MAX_CHUNK_ATTEMPTS, rng)
}

pub fn randomize_some_chunks_with_budget<R: Rng + ?Sized>(
    grids: &mut FrameGrids,
    fraction: f32,
    budget: usize,
    rng: &mut R,
) -> FrameResult<Vec<Chunk>> {
    if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
        return Err(FrameError::InvalidFraction(fraction));
    }
    let dims = grids.dims();
    let (w, h, d) = (dims.x as f32, dims.y as f32, dims.z as f32);
    let total = dims.x as usize * dims.y as usize * dims.z as usize;
    let required = (total as f32 * fraction).ceil() as usize;

    // Footprint of the tower is biased towards wider in x or in z.
    let wider_in_x = rng.gen_bool(0.5);
    let first = UVec3::new(
        random_int(rng, if wider_in_x { 2.0 } else { 1.0 }, w * CHUNK_EXTENT_RATIO),
        dims.y,
        random_int(rng, if wider_in_x { 1.0 } else { 2.0 }, d * CHUNK_EXTENT_RATIO),
    );
    let mut chunks = vec![carve_chunk(grids, first, rng)?];

    let mut attempts = 0;
    while grids.filled_count() < required {
        if attempts == budget {
            return Err(FrameError::ThresholdUnreachable {
                attempts,
                filled: grids.filled_count(),
                required,
            });
        }
        attempts += 1;
        let size = UVec3::new(
            random_int(rng, 1.0, w),
            random_int(rng, 1.0, h * CHUNK_EXTENT_RATIO),
            random_int(rng, 1.0, d),
        );
        chunks.push(carve_chunk(grids, size, rng)?);
    }

    debug!("carved {} chunks, {}/{} voxels filled", chunks.len(), grids.filled_count(), total);
    Ok(chunks)
}

/// Flags every voxel independently with probability one half.
pub fn randomize_all<R: Rng + ?Sized>(grids: &mut FrameGrids, rng: &mut R) -> FrameResult<()> {
    let dims = grids.dims();
    for i in 0..dims.x {
        for j in 0..dims.y {
            for k in 0..dims.z {
                if rng.gen_bool(0.5) {
                    grids.flag_voxel(i, j, k)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn random_int_floors_bounds_and_handles_empty_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..200 {
            let v = random_int(&mut rng, 1.0, 3.5);
            assert!((1..=3).contains(&v));
        }
        assert_eq!(random_int(&mut rng, 2.0, 1.4), 2);
        assert_eq!(random_int(&mut rng, 0.0, -1.0), 0);
    }

    #[test]
    fn full_width_chunk_sits_at_origin() {
        let mut grids = FrameGrids::allocate(UVec3::new(4, 3, 4)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let chunk = carve_chunk(&mut grids, UVec3::new(4, 2, 4), &mut rng).unwrap();
        assert_eq!(chunk.origin, UVec3::ZERO);
        assert_eq!(grids.filled_count(), 32);
    }

    #[test]
    fn oversized_chunk_is_rejected() {
        let mut grids = FrameGrids::allocate(UVec3::new(2, 2, 2)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let err = carve_chunk(&mut grids, UVec3::new(3, 1, 1), &mut rng).unwrap_err();
        assert!(matches!(err, FrameError::ChunkOutOfBounds { .. }));
        assert_eq!(grids.filled_count(), 0);
    }

    #[test]
    fn chunk_fill_reaches_target_on_small_grids() {
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for dims in [UVec3::splat(2), UVec3::new(2, 7, 10), UVec3::new(10, 2, 3), UVec3::splat(5)] {
                let mut grids = FrameGrids::allocate(dims).unwrap();
                let chunks = randomize_some_chunks(&mut grids, 0.35, &mut rng).unwrap();
                let total = (dims.x * dims.y * dims.z) as f32;
                assert!(grids.filled_count() as f32 >= 0.35 * total);
                for p in grids.occupancy().iter() {
                    assert!(chunks.iter().any(|c| c.contains(p)), "{p} outside every chunk");
                }
            }
        }
    }

    #[test]
    fn five_cube_scenario() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut grids = FrameGrids::allocate(UVec3::splat(5)).unwrap();
        let chunks = randomize_some_chunks(&mut grids, 0.35, &mut rng).unwrap();

        assert!(grids.filled_count() >= 44);
        assert!(chunks[0].is_full_height(5));
        let c = chunks[0];
        for y in 0..5 {
            assert!(grids.is_filled(c.origin.x, y, c.origin.z));
        }
        assert!(chunks[1..].iter().all(|c| c.size.y < 5));
    }

    #[test]
    fn unreachable_target_reports_budget_exhaustion() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut grids = FrameGrids::allocate(UVec3::new(3, 3, 3)).unwrap();
        let err = randomize_some_chunks_with_budget(&mut grids, 1.0, 5, &mut rng).unwrap_err();
        match err {
            FrameError::ThresholdUnreachable { attempts, required, filled } => {
                assert_eq!(attempts, 5);
                assert_eq!(required, 27);
                assert!(filled < 27);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn invalid_fraction_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut grids = FrameGrids::allocate(UVec3::splat(3)).unwrap();
        assert_eq!(
            randomize_some_chunks(&mut grids, 1.5, &mut rng).unwrap_err(),
            FrameError::InvalidFraction(1.5)
        );
    }

    #[test]
    fn uniform_fill_keeps_derived_grids_consistent() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut grids = FrameGrids::allocate(UVec3::new(6, 4, 5)).unwrap();
        randomize_all(&mut grids, &mut rng).unwrap();
        assert!(grids.filled_count() > 0);
        assert_eq!(FrameGrids::from_occupancy(grids.occupancy()).unwrap(), grids);
    }
}
