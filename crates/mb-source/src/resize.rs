use anyhow::{Context, Result};
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};
use mb_core::frame::PixelGrid;
use rayon::prelude::*;

/// Taille cible d'une conversion.
///
/// # Example
/// ```
/// use mb_source::resize::TargetSize;
/// assert_eq!(TargetSize::Width(64).resolve(640, 480), (64, 48));
/// assert_eq!(TargetSize::Height(10).resolve(200, 100), (20, 10));
/// assert_eq!(TargetSize::Exact(128, 32).resolve(7, 7), (128, 32));
/// assert_eq!(TargetSize::Native.resolve(7, 9), (7, 9));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetSize {
    /// Dimensions natives de la source.
    Native,
    /// Largeur fixée, hauteur déduite du ratio (arrondi inférieur, min 1).
    Width(u32),
    /// Hauteur fixée, largeur déduite du ratio (arrondi inférieur, min 1).
    Height(u32),
    /// Dimensions exactes, sans conservation du ratio.
    Exact(u32, u32),
}

impl TargetSize {
    /// Build from optional width/height options.
    #[must_use]
    pub fn from_options(width: Option<u32>, height: Option<u32>) -> Self {
        match (width, height) {
            (Some(w), Some(h)) => Self::Exact(w, h),
            (Some(w), None) => Self::Width(w),
            (None, Some(h)) => Self::Height(h),
            (None, None) => Self::Native,
        }
    }

    /// Resolve against the native size of a source.
    #[must_use]
    pub fn resolve(self, src_width: u32, src_height: u32) -> (u32, u32) {
        match self {
            Self::Native => (src_width, src_height),
            Self::Exact(w, h) => (w, h),
            Self::Width(w) => (w, scale_side(src_height, w, src_width)),
            Self::Height(h) => (scale_side(src_width, h, src_height), h),
        }
    }
}

/// `side × num / den`, tronqué, au moins 1.
fn scale_side(side: u32, num: u32, den: u32) -> u32 {
    if den == 0 {
        return 1;
    }
    ((u64::from(side) * u64::from(num) / u64::from(den)) as u32).max(1)
}

/// Resizer réutilisable wrappant fast_image_resize (Lanczos3, 1 canal U8).
///
/// # Example
/// ```
/// use mb_source::resize::Resizer;
/// let r = Resizer::new();
/// ```
pub struct Resizer {
    inner: FirResizer,
    options: ResizeOptions,
    /// Scratch buffer for the source (fast_image_resize needs `&mut`).
    src_buf: Vec<u8>,
}

impl Resizer {
    /// Create a new resizer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3)),
            src_buf: Vec::new(),
        }
    }

    /// Resize `src` into `dst`. Dimensions of `dst` determine output size.
    ///
    /// # Errors
    /// Returns an error if either grid is empty or the resize fails.
    ///
    /// # Example
    /// ```
    /// use mb_source::resize::Resizer;
    /// use mb_core::frame::PixelGrid;
    /// let mut r = Resizer::new();
    /// let src = PixelGrid::new(100, 100);
    /// let mut dst = PixelGrid::new(50, 50);
    /// r.resize_into(&src, &mut dst).unwrap();
    /// ```
    pub fn resize_into(&mut self, src: &PixelGrid, dst: &mut PixelGrid) -> Result<()> {
        if src.width == dst.width && src.height == dst.height {
            dst.data.copy_from_slice(&src.data);
            return Ok(());
        }

        if src.width == 0 || src.height == 0 || dst.width == 0 || dst.height == 0 {
            anyhow::bail!(
                "Redimensionnement impossible : {}×{} → {}×{}",
                src.width,
                src.height,
                dst.width,
                dst.height
            );
        }

        self.src_buf.clear();
        self.src_buf.extend_from_slice(&src.data);

        let src_image = Image::from_slice_u8(src.width, src.height, &mut self.src_buf, PixelType::U8)
            .context("Dimensions source invalides")?;

        let mut dst_image =
            Image::from_slice_u8(dst.width, dst.height, &mut dst.data, PixelType::U8)
                .context("Dimensions destination invalides")?;

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .context("Échec du redimensionnement")?;

        Ok(())
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience for one-shot usage.
///
/// # Errors
/// Returns an error if the resize operation fails.
///
/// # Example
/// ```
/// use mb_source::resize::resize_grid;
/// use mb_core::frame::PixelGrid;
/// let src = PixelGrid::new(100, 100);
/// let dst = resize_grid(&src, 64, 64).unwrap();
/// assert_eq!(dst.width, 64);
/// ```
pub fn resize_grid(src: &PixelGrid, width: u32, height: u32) -> Result<PixelGrid> {
    let mut dst = PixelGrid::new(width, height);
    Resizer::new().resize_into(src, &mut dst)?;
    Ok(dst)
}

/// Redimensionne une séquence ; la première grille fixe la taille cible.
///
/// Returns the shared size and the resized grids, in input order.
///
/// # Errors
/// Returns an error if any resize fails.
pub fn resize_all(native: &[PixelGrid], target: TargetSize) -> Result<((u32, u32), Vec<PixelGrid>)> {
    let Some(first) = native.first() else {
        return Ok(((0, 0), Vec::new()));
    };
    let (width, height) = target.resolve(first.width, first.height);

    let grids = native
        .par_iter()
        .map_init(Resizer::new, |resizer, src| {
            let mut dst = PixelGrid::new(width, height);
            resizer.resize_into(src, &mut dst)?;
            Ok::<_, anyhow::Error>(dst)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(((width, height), grids))
}
