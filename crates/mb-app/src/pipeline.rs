use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mb_core::config::{ConvertConfig, PackScheme};
use mb_core::frame::{BinaryGrid, FrameSequence, PackedFrame};
use mb_core::traits::GridSource;
use mb_export::carray::{ArrayOptions, format_frame, format_sequence};
use mb_export::parse::parse_array;
use mb_export::preview::{PreviewOptions, render_halfblock, save_png};

/// Where the results of a conversion go.
#[derive(Debug, Default)]
pub struct Sinks {
    /// Fichier du tableau ; stdout si `None`.
    pub output: Option<PathBuf>,
    /// Aperçu demi-blocs sur stderr.
    pub preview: bool,
    /// Aperçu PNG.
    pub preview_png: Option<PathBuf>,
}

/// Résultat d'une conversion : le texte du tableau et les grilles binaires.
pub struct Conversion {
    /// Array source text.
    pub text: String,
    /// Bit grids, one per frame, for previews.
    pub grids: Vec<BinaryGrid>,
}

/// Convertit la première grille d'une source en un tableau simple.
///
/// # Errors
/// Returns an error if the source yields no grid.
pub fn convert_single(source: &mut dyn GridSource, config: &ConvertConfig) -> Result<Conversion> {
    let Some(pixels) = source.next_grid() else {
        anyhow::bail!("La source ne contient aucune image");
    };
    warn_padding(pixels.width, config.scheme);

    let grid = mb_pack::threshold(&pixels, config.threshold, config.invert);
    let frame: PackedFrame = mb_pack::pack_with(&grid, config.scheme);
    log::info!(
        "{}×{} → {} octets ({:?})",
        frame.width,
        frame.height,
        frame.bytes.len(),
        frame.scheme
    );

    Ok(Conversion {
        text: format_frame(&frame, &ArrayOptions::from(config)),
        grids: vec![grid],
    })
}

/// Convertit toutes les grilles d'une source en séquence de frames.
///
/// # Errors
/// Returns an error if frames disagree on dimensions.
pub fn convert_sequence(
    source: &mut dyn GridSource,
    config: &ConvertConfig,
) -> Result<Conversion> {
    let pixels = source.collect_grids();
    if let Some(first) = pixels.first() {
        warn_padding(first.width, config.scheme);
    } else {
        log::warn!("Séquence vide : aucun octet produit");
    }

    let grids = mb_pack::threshold_frames(&pixels, config.threshold, config.invert);
    let seq: FrameSequence = mb_pack::pack_frames_with(&grids, config.scheme)?;
    log::info!(
        "{} frame(s) {}×{} → {} octets par frame",
        seq.frame_count(),
        seq.width,
        seq.height,
        seq.frame_len()
    );

    Ok(Conversion {
        text: format_sequence(&seq, &ArrayOptions::from(config)),
        grids,
    })
}

fn warn_padding(width: u32, scheme: PackScheme) {
    if let Some(message) = padding_warning(width, scheme) {
        log::warn!("{message}");
    }
}

/// Message affiché quand les lignes packées portent des bits de padding.
fn padding_warning(width: u32, scheme: PackScheme) -> Option<String> {
    (scheme == PackScheme::RowAligned && !width.is_multiple_of(8)).then(|| {
        format!(
            "Largeur {width} non multiple de 8 : {} bit(s) de padding par ligne, \
             le tableau ne pourra pas être relu par `monobit decode`",
            8 - width % 8
        )
    })
}

/// Écrit le tableau et les aperçus demandés.
///
/// # Errors
/// Returns an error if a file cannot be written.
pub fn emit(conversion: &Conversion, sinks: &Sinks, config: &ConvertConfig) -> Result<()> {
    match sinks.output {
        Some(ref path) => {
            std::fs::write(path, &conversion.text)
                .with_context(|| format!("Impossible d'écrire {}", path.display()))?;
            log::info!("Tableau écrit dans {}", path.display());
        }
        None => std::io::stdout()
            .write_all(conversion.text.as_bytes())
            .context("Écriture sur stdout impossible")?,
    }

    if sinks.preview {
        let mut stderr = std::io::stderr();
        for grid in &conversion.grids {
            writeln!(stderr, "{}", render_halfblock(grid))
                .context("Écriture de l'aperçu sur stderr impossible")?;
        }
    }

    if let Some(ref path) = sinks.preview_png {
        write_pngs(&conversion.grids, &PreviewOptions::from(config), path)?;
    }
    Ok(())
}

/// Un PNG par frame : `path` pour une frame unique, `stem_{i}.ext` sinon.
///
/// # Errors
/// Returns an error if a PNG cannot be written.
pub fn write_pngs(grids: &[BinaryGrid], options: &PreviewOptions, path: &Path) -> Result<()> {
    if let [grid] = grids {
        return save_png(grid, options, path);
    }
    for (i, grid) in grids.iter().enumerate() {
        save_png(grid, options, &frame_path(path, i))?;
    }
    Ok(())
}

fn frame_path(path: &Path, index: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("preview");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("png");
    path.with_file_name(format!("{stem}_{index}.{ext}"))
}

/// Lit un tableau depuis un fichier ou stdin (`-`).
///
/// # Errors
/// Returns an error if the input cannot be read.
pub fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Lecture de stdin impossible")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Impossible de lire {input}"))
    }
}

/// Parse an array and unpack every frame it holds.
///
/// Dimensions come from `size`, else from the `_{W}x{H}` suffix of the
/// array name. A byte count that is a multiple of one frame is split into
/// frames in order.
///
/// # Errors
/// Returns an error if dimensions are unknown or the bytes do not unpack.
pub fn decode(text: &str, size: (Option<u32>, Option<u32>), scheme: PackScheme) -> Result<Vec<BinaryGrid>> {
    let parsed = parse_array(text)?;
    let inferred = parsed.dimensions;
    let (Some(width), Some(height)) = (
        size.0.or(inferred.map(|d| d.0)),
        size.1.or(inferred.map(|d| d.1)),
    ) else {
        anyhow::bail!("Dimensions inconnues : utilisez --width et --height");
    };
    log::debug!(
        "{} : {} octets, {width}×{height}",
        parsed.name.as_deref().unwrap_or("<anonyme>"),
        parsed.bytes.len()
    );

    let frame_len = scheme.byte_len(width, height);
    let multi = frame_len > 0
        && parsed.bytes.len() > frame_len
        && parsed.bytes.len().is_multiple_of(frame_len);
    let chunks: Vec<&[u8]> = if multi {
        parsed.bytes.chunks_exact(frame_len).collect()
    } else {
        vec![parsed.bytes.as_slice()]
    };

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, bytes)| {
            mb_pack::unpack_with(bytes, width, height, scheme)
                .with_context(|| format!("Frame {i} : décodage impossible"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mb_core::frame::PixelGrid;
    use mb_source::image::ImageSource;
    use mb_source::resize::TargetSize;

    struct Frames(Vec<PixelGrid>);

    impl GridSource for Frames {
        fn next_grid(&mut self) -> Option<PixelGrid> {
            if self.0.is_empty() {
                None
            } else {
                Some(self.0.remove(0))
            }
        }
        fn native_size(&self) -> (u32, u32) {
            self.0.first().map_or((0, 0), |g| (g.width, g.height))
        }
        fn len_hint(&self) -> usize {
            self.0.len()
        }
    }

    fn stripes(width: u32, height: u32, phase: u32) -> PixelGrid {
        let mut grid = PixelGrid::new(width, height);
        for y in 0..height {
            for x in 0..width {
                grid.set(x, y, if (x + phase) % 2 == 0 { 255 } else { 0 });
            }
        }
        grid
    }

    #[test]
    fn single_image_round_trips_through_text() {
        let config = ConvertConfig::default();
        let mut src = ImageSource::from_grid(stripes(16, 4, 0), TargetSize::Native).unwrap();
        let conversion = convert_single(&mut src, &config).unwrap();
        assert!(conversion.text.starts_with("const unsigned char bit_map_16x4[] = {"));

        let grids = decode(&conversion.text, (None, None), PackScheme::RowAligned).unwrap();
        assert_eq!(grids, conversion.grids);
    }

    #[test]
    fn sequence_round_trips_through_text() {
        let config = ConvertConfig::default();
        let mut src = Frames((0..3).map(|i| stripes(8, 8, i)).collect());
        let conversion = convert_sequence(&mut src, &config).unwrap();
        assert!(conversion.text.contains("bit_map_8x8[3][8]"));

        let grids = decode(&conversion.text, (None, None), PackScheme::RowAligned).unwrap();
        assert_eq!(grids.len(), 3);
        assert_eq!(grids, conversion.grids);
    }

    #[test]
    fn mismatched_frames_fail() {
        let config = ConvertConfig::default();
        let mut src = Frames(vec![stripes(8, 8, 0), stripes(8, 4, 0), stripes(8, 8, 0)]);
        assert!(convert_sequence(&mut src, &config).is_err());
    }

    #[test]
    fn empty_sequence_converts() {
        let config = ConvertConfig::default();
        let conversion = convert_sequence(&mut Frames(Vec::new()), &config).unwrap();
        assert!(conversion.grids.is_empty());
        assert!(conversion.text.starts_with("// 0 frame(s)"));
    }

    #[test]
    fn decode_needs_dimensions() {
        assert!(decode("0xAA", (None, None), PackScheme::RowAligned).is_err());
        let grids = decode("0xAA", (Some(8), Some(1)), PackScheme::RowAligned).unwrap();
        assert_eq!(grids[0].count_ones(), 4);
    }

    #[test]
    fn decode_reports_length_mismatch() {
        let err = decode("0, 0, 0, 0, 0", (Some(8), Some(2)), PackScheme::RowAligned).unwrap_err();
        let root = err.root_cause().downcast_ref::<mb_core::CoreError>();
        assert!(matches!(
            root,
            Some(mb_core::CoreError::LengthMismatch { expected: 2, actual: 5 })
        ));
    }

    #[test]
    fn flat_legacy_decode() {
        let text = "const unsigned char bit_map_3x3[] = { 0xBC, 0x80 };";
        let grids = decode(text, (None, None), PackScheme::Flat).unwrap();
        assert_eq!(grids[0].count_ones(), 6);
    }

    #[test]
    fn padded_width_warns_about_decode() {
        let message = padding_warning(13, PackScheme::RowAligned).unwrap();
        assert!(message.contains("3 bit(s) de padding"));
        assert!(message.contains("monobit decode"));
        assert!(padding_warning(16, PackScheme::RowAligned).is_none());
        assert!(padding_warning(13, PackScheme::Flat).is_none());
    }

    #[test]
    fn padded_width_output_is_rejected_by_decode() {
        let config = ConvertConfig::default();
        let mut src = ImageSource::from_grid(stripes(13, 2, 0), TargetSize::Native).unwrap();
        let conversion = convert_single(&mut src, &config).unwrap();
        let err = decode(&conversion.text, (None, None), PackScheme::RowAligned).unwrap_err();
        let root = err.root_cause().downcast_ref::<mb_core::CoreError>();
        assert!(matches!(
            root,
            Some(mb_core::CoreError::InvalidDimensions { width: 13, height: 2 })
        ));
    }

    #[test]
    fn emit_writes_array_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.h");
        let conversion = Conversion {
            text: "const unsigned char bit_map_8x1[] = {\n  0xAA\n};\n".to_string(),
            grids: vec![BinaryGrid::new(8, 1)],
        };
        let sinks = Sinks {
            output: Some(path.clone()),
            preview: true,
            preview_png: None,
        };
        emit(&conversion, &sinks, &ConvertConfig::default()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), conversion.text);
    }

    #[test]
    fn frame_paths_are_numbered() {
        assert_eq!(
            frame_path(Path::new("out/anim.png"), 2),
            PathBuf::from("out/anim_2.png")
        );
    }
}
