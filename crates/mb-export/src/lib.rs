/// Output side of monobit: array text formatting, array text parsing, and
/// verification previews.
pub mod carray;
pub mod parse;
pub mod preview;

pub use carray::{ArrayOptions, format_frame, format_sequence};
pub use parse::{ParsedArray, parse_array, parse_bytes};
pub use preview::{PreviewOptions, render_halfblock, render_png, save_png};
