/// Grid sources for monobit (still image, animation, rendered glyphs).
///
/// Every source yields `PixelGrid`s through the `GridSource` trait.

pub mod animation;
pub mod glyph;
pub mod image;
pub mod resize;

pub use animation::AnimationSource;
pub use glyph::{GlyphRasterizer, GlyphSource};
pub use image::ImageSource;
pub use resize::{Resizer, TargetSize};
