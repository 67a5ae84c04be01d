use mb_core::frame::{BinaryGrid, PixelGrid};

/// Seuillage d'une grille en niveaux de gris.
///
/// Bit à 1 quand `p > cutoff`. Avec `invert`, bit à 1 quand `p <= cutoff`.
/// Un `cutoff` hors de [0, 255] sature : jamais (≥ 255) ou toujours (< 0).
///
/// # Example
/// ```
/// use mb_core::frame::PixelGrid;
/// use mb_pack::threshold::threshold;
///
/// let grid = PixelGrid::from_raw(2, 1, vec![127, 128]).unwrap();
/// let bits = threshold(&grid, 127, false);
/// assert_eq!(bits.bits(), &[false, true]);
/// ```
#[must_use]
pub fn threshold(grid: &PixelGrid, cutoff: i32, invert: bool) -> BinaryGrid {
    let mut out = BinaryGrid::new(grid.width, grid.height);
    for y in 0..grid.height {
        for x in 0..grid.width {
            let on = i32::from(grid.get(x, y)) > cutoff;
            out.set(x, y, on != invert);
        }
    }
    out
}
