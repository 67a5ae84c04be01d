/// Shared types, traits, and configuration for monobit.
///
/// This crate contains the grid and frame types exchanged between the
/// packing engine, the grid sources, and the exporters.

pub mod config;
pub mod error;
pub mod frame;
pub mod traits;

pub use config::{ArrayStyle, ConvertConfig, PackScheme};
pub use error::CoreError;
pub use frame::{BinaryGrid, FrameSequence, PackedFrame, PixelGrid};

