/// Bitmap packing engine for monobit.
///
/// Thresholds grayscale grids to bits, packs bits to bytes, aggregates
/// animation frames, and unpacks bytes back to bit grids.
pub mod frames;
pub mod pack;
pub mod threshold;
pub mod unpack;

pub use frames::{pack_frames, pack_frames_with, threshold_frames};
pub use pack::{pack, pack_with};
pub use threshold::threshold;
pub use unpack::{unpack, unpack_with};
