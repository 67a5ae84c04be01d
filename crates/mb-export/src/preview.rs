use std::path::Path;

use anyhow::{Context, Result};
use image::{GrayImage, Luma};
use mb_core::config::ConvertConfig;
use mb_core::frame::BinaryGrid;

/// Options du rendu de vérification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreviewOptions {
    /// Côté en pixels d'un bit (min 1).
    pub scale: u32,
    /// Niveau de gris des bits à 1.
    pub foreground: u8,
    /// Niveau de gris des bits à 0.
    pub background: u8,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self::from(&ConvertConfig::default())
    }
}

impl From<&ConvertConfig> for PreviewOptions {
    fn from(config: &ConvertConfig) -> Self {
        Self {
            scale: config.preview_scale,
            foreground: config.preview_foreground,
            background: config.preview_background,
        }
    }
}

/// Render a bit grid as a magnified grayscale image.
///
/// # Example
/// ```
/// use mb_core::frame::BinaryGrid;
/// use mb_export::preview::{render_png, PreviewOptions};
///
/// let mut grid = BinaryGrid::new(2, 1);
/// grid.set(1, 0, true);
/// let img = render_png(&grid, &PreviewOptions { scale: 3, foreground: 255, background: 0 });
/// assert_eq!(img.dimensions(), (6, 3));
/// assert_eq!(img.get_pixel(4, 2).0, [255]);
/// assert_eq!(img.get_pixel(0, 0).0, [0]);
/// ```
#[must_use]
pub fn render_png(grid: &BinaryGrid, options: &PreviewOptions) -> GrayImage {
    let scale = options.scale.max(1);
    GrayImage::from_fn(grid.width() * scale, grid.height() * scale, |x, y| {
        if grid.get(x / scale, y / scale) {
            Luma([options.foreground])
        } else {
            Luma([options.background])
        }
    })
}

/// Render and write a PNG preview.
///
/// # Errors
/// Returns an error if the image cannot be written.
pub fn save_png(grid: &BinaryGrid, options: &PreviewOptions, path: &Path) -> Result<()> {
    let img = render_png(grid, options);
    img.save(path)
        .with_context(|| format!("Impossible d'écrire {}", path.display()))?;
    log::info!(
        "Aperçu {}×{} écrit dans {}",
        img.width(),
        img.height(),
        path.display()
    );
    Ok(())
}

/// Aperçu terminal : deux lignes de pixels par ligne de texte (▀ ▄ █).
///
/// # Example
/// ```
/// use mb_core::frame::BinaryGrid;
/// use mb_export::preview::render_halfblock;
///
/// let grid = BinaryGrid::from_rows(&[&[1, 0, 1, 0], &[1, 1, 0, 0], &[0, 1, 0, 0]]).unwrap();
/// assert_eq!(render_halfblock(&grid), "█▄▀ \n ▀  \n");
/// ```
#[must_use]
pub fn render_halfblock(grid: &BinaryGrid) -> String {
    let mut out = String::new();
    for top in (0..grid.height()).step_by(2) {
        let bottom = top + 1;
        for x in 0..grid.width() {
            let up = grid.get(x, top);
            let down = bottom < grid.height() && grid.get(x, bottom);
            out.push(match (up, down) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        out.push('\n');
    }
    out
}
