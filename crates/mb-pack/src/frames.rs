use mb_core::config::PackScheme;
use mb_core::error::CoreError;
use mb_core::frame::{BinaryGrid, FrameSequence, PixelGrid};
use rayon::prelude::*;

use crate::pack::pack_with;
use crate::threshold::threshold;

/// Pack an ordered sequence of frames with the row-aligned scheme.
///
/// La première frame fixe les dimensions partagées.
///
/// # Errors
/// Returns [`CoreError::DimensionMismatch`] for the first frame whose size
/// differs from frame 0. Nothing is packed in that case.
///
/// # Example
/// ```
/// use mb_core::frame::BinaryGrid;
/// use mb_pack::frames::pack_frames;
///
/// let seq = pack_frames(&[BinaryGrid::new(8, 2), BinaryGrid::new(8, 2)]).unwrap();
/// assert_eq!(seq.frame_count(), 2);
/// assert_eq!(seq.frames[0], vec![0, 0]);
/// assert_eq!(pack_frames(&[]).unwrap().frame_count(), 0);
/// ```
pub fn pack_frames(grids: &[BinaryGrid]) -> Result<FrameSequence, CoreError> {
    pack_frames_with(grids, PackScheme::RowAligned)
}

/// Pack an ordered sequence of frames with an explicit scheme.
///
/// Frames are independent and packed in parallel; output order matches input order.
///
/// # Errors
/// Returns [`CoreError::DimensionMismatch`] if frames disagree on width or height.
pub fn pack_frames_with(
    grids: &[BinaryGrid],
    scheme: PackScheme,
) -> Result<FrameSequence, CoreError> {
    let Some(first) = grids.first() else {
        return Ok(FrameSequence {
            scheme,
            ..FrameSequence::default()
        });
    };
    let (width, height) = (first.width(), first.height());

    // Validation complète avant tout packing : pas de résultat partiel.
    if let Some((index, grid)) = grids
        .iter()
        .enumerate()
        .find(|(_, g)| g.width() != width || g.height() != height)
    {
        return Err(CoreError::DimensionMismatch {
            index,
            expected_width: width,
            expected_height: height,
            width: grid.width(),
            height: grid.height(),
        });
    }

    let frames = grids
        .par_iter()
        .map(|grid| pack_with(grid, scheme).bytes)
        .collect();

    Ok(FrameSequence {
        width,
        height,
        scheme,
        frames,
    })
}

/// Apply the same threshold to every frame of an animation.
#[must_use]
pub fn threshold_frames(grids: &[PixelGrid], cutoff: i32, invert: bool) -> Vec<BinaryGrid> {
    grids
        .par_iter()
        .map(|grid| threshold(grid, cutoff, invert))
        .collect()
}
