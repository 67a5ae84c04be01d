use std::fmt::Write;

use mb_core::config::{ArrayStyle, ConvertConfig};
use mb_core::frame::{FrameSequence, PackedFrame};

/// Options de mise en forme d'un tableau.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayOptions {
    /// Préfixe du nom, suffixé par `_{W}x{H}`.
    pub name: String,
    /// Output syntax.
    pub style: ArrayStyle,
    /// Bytes per text line (min 1).
    pub bytes_per_line: usize,
}

impl Default for ArrayOptions {
    fn default() -> Self {
        Self::from(&ConvertConfig::default())
    }
}

impl From<&ConvertConfig> for ArrayOptions {
    fn from(config: &ConvertConfig) -> Self {
        Self {
            name: config.array_name.clone(),
            style: config.style,
            bytes_per_line: config.bytes_per_line,
        }
    }
}

impl ArrayOptions {
    /// Identifiant complet : `bit_map_64x32` (C) ou `BIT_MAP_64X32` (Rust).
    ///
    /// # Example
    /// ```
    /// use mb_export::carray::ArrayOptions;
    /// assert_eq!(ArrayOptions::default().identifier(64, 32), "bit_map_64x32");
    /// ```
    #[must_use]
    pub fn identifier(&self, width: u32, height: u32) -> String {
        let ident = format!("{}_{width}x{height}", self.name);
        match self.style {
            ArrayStyle::C => ident,
            ArrayStyle::Rust => ident.to_ascii_uppercase(),
        }
    }
}

/// Format one packed frame as a source-embeddable array.
///
/// # Example
/// ```
/// use mb_core::config::PackScheme;
/// use mb_core::frame::PackedFrame;
/// use mb_export::carray::{format_frame, ArrayOptions};
///
/// let frame = PackedFrame { width: 8, height: 2, scheme: PackScheme::RowAligned, bytes: vec![0xAA, 0x0F] };
/// let text = format_frame(&frame, &ArrayOptions::default());
/// assert_eq!(text, "const unsigned char bit_map_8x2[] = {\n  0xAA, 0x0F\n};\n");
/// ```
#[must_use]
pub fn format_frame(frame: &PackedFrame, options: &ArrayOptions) -> String {
    let ident = options.identifier(frame.width, frame.height);
    let mut out = String::new();
    match options.style {
        ArrayStyle::C => {
            let _ = writeln!(out, "const unsigned char {ident}[] = {{");
            write_body(&mut out, &frame.bytes, options.bytes_per_line, "  ");
            out.push_str("};\n");
        }
        ArrayStyle::Rust => {
            let _ = writeln!(out, "pub const {ident}: [u8; {}] = [", frame.bytes.len());
            write_body(&mut out, &frame.bytes, options.bytes_per_line, "    ");
            out.push_str("];\n");
        }
    }
    out
}

/// Format a frame sequence: one group per frame, in frame order.
///
/// # Example
/// ```
/// use mb_core::config::PackScheme;
/// use mb_core::frame::FrameSequence;
/// use mb_export::carray::{format_sequence, ArrayOptions};
///
/// let seq = FrameSequence { width: 8, height: 1, scheme: PackScheme::RowAligned, frames: vec![vec![0x01], vec![0x80]] };
/// let text = format_sequence(&seq, &ArrayOptions::default());
/// assert!(text.contains("const unsigned char bit_map_8x1[2][1] = {"));
/// assert!(text.contains("  { 0x01 },\n  { 0x80 },\n"));
/// ```
#[must_use]
pub fn format_sequence(seq: &FrameSequence, options: &ArrayOptions) -> String {
    let ident = options.identifier(seq.width, seq.height);
    let (count, len) = (seq.frame_count(), seq.frame_len());
    let mut out = String::new();
    let _ = writeln!(
        out,
        "// {count} frame(s), {}x{}, {len} octets par frame",
        seq.width, seq.height
    );
    let (open, close, indent) = match options.style {
        ArrayStyle::C => {
            let _ = writeln!(out, "const unsigned char {ident}[{count}][{len}] = {{");
            ("{", "}", "  ")
        }
        ArrayStyle::Rust => {
            let _ = writeln!(out, "pub const {ident}: [[u8; {len}]; {count}] = [");
            ("[", "]", "    ")
        }
    };

    let single_line = len <= options.bytes_per_line.max(1);
    for bytes in &seq.frames {
        if single_line {
            let _ = writeln!(out, "{indent}{open} {} {close},", join_hex(bytes));
        } else {
            let _ = writeln!(out, "{indent}{open}");
            write_body(&mut out, bytes, options.bytes_per_line, &format!("{indent}  "));
            let _ = writeln!(out, "{indent}{close},");
        }
    }

    out.push_str(match options.style {
        ArrayStyle::C => "};\n",
        ArrayStyle::Rust => "];\n",
    });
    out
}

/// Corps du tableau : `bytes_per_line` octets par ligne, séparés par des virgules.
fn write_body(out: &mut String, bytes: &[u8], bytes_per_line: usize, indent: &str) {
    let mut lines = bytes.chunks(bytes_per_line.max(1)).peekable();
    while let Some(line) = lines.next() {
        out.push_str(indent);
        out.push_str(&join_hex(line));
        if lines.peek().is_some() {
            out.push(',');
        }
        out.push('\n');
    }
}

fn join_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{b:02X}"))
        .collect::<Vec<_>>()
        .join(", ")
}
