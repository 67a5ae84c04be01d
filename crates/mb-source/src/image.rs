use std::path::Path;

use ::image::DynamicImage;
use anyhow::{Context, Result};
use mb_core::frame::PixelGrid;
use mb_core::traits::GridSource;

use crate::resize::{TargetSize, resize_grid};

/// Source d'image statique. Produit une seule grille puis s'épuise.
///
/// # Example
/// ```no_run
/// use mb_source::image::ImageSource;
/// use mb_source::resize::TargetSize;
/// use std::path::Path;
/// let source = ImageSource::open(Path::new("logo.png"), TargetSize::Width(64)).unwrap();
/// ```
pub struct ImageSource {
    grid: Option<PixelGrid>,
    size: (u32, u32),
}

impl ImageSource {
    /// Load an image from disk, convert it to luma, and resize it.
    ///
    /// # Errors
    /// Returns an error if the image cannot be decoded or resized.
    pub fn open(path: &Path, target: TargetSize) -> Result<Self> {
        let native = load_luma(path)?;
        log::info!(
            "{} : {}×{}",
            path.display(),
            native.width,
            native.height
        );
        Self::from_grid(native, target)
    }

    /// Build a source from an already decoded grid.
    ///
    /// # Errors
    /// Returns an error if the resize fails.
    pub fn from_grid(native: PixelGrid, target: TargetSize) -> Result<Self> {
        let (w, h) = target.resolve(native.width, native.height);
        let grid = resize_grid(&native, w, h)?;
        Ok(Self {
            size: (grid.width, grid.height),
            grid: Some(grid),
        })
    }
}

impl GridSource for ImageSource {
    fn next_grid(&mut self) -> Option<PixelGrid> {
        self.grid.take()
    }

    fn native_size(&self) -> (u32, u32) {
        self.size
    }

    fn len_hint(&self) -> usize {
        usize::from(self.grid.is_some())
    }
}

/// Convertit une image décodée en grille de luminance 8 bits.
#[must_use]
pub fn luma_grid(img: &DynamicImage) -> PixelGrid {
    let luma = img.to_luma8();
    let (width, height) = luma.dimensions();
    PixelGrid {
        data: luma.into_raw(),
        width,
        height,
    }
}

/// Decode an image file into a luma grid at its native size.
///
/// # Errors
/// Returns an error if the image cannot be loaded.
pub fn load_luma(path: &Path) -> Result<PixelGrid> {
    let img = ::image::open(path)
        .with_context(|| format!("Impossible de charger {}", path.display()))?;
    Ok(luma_grid(&img))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{GrayImage, Luma};

    fn write_gradient(dir: &Path, w: u32, h: u32) -> std::path::PathBuf {
        let path = dir.join("gradient.png");
        let img = GrayImage::from_fn(w, h, |x, _| Luma([(x * 255 / (w - 1)) as u8]));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn native_size_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_gradient(dir.path(), 16, 4);
        let mut src = ImageSource::open(&path, TargetSize::Native).unwrap();
        assert_eq!(src.native_size(), (16, 4));
        let grid = src.next_grid().unwrap();
        assert_eq!(grid.get(0, 0), 0);
        assert_eq!(grid.get(15, 3), 255);
        assert!(src.next_grid().is_none());
    }

    #[test]
    fn width_target_keeps_aspect() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_gradient(dir.path(), 32, 8);
        let mut src = ImageSource::open(&path, TargetSize::Width(16)).unwrap();
        assert_eq!(src.native_size(), (16, 4));
        assert_eq!(src.len_hint(), 1);
        assert_eq!(src.collect_grids().len(), 1);
        assert_eq!(src.len_hint(), 0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ImageSource::open(&dir.path().join("nope.png"), TargetSize::Native).is_err());
    }
}
