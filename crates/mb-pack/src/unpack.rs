use mb_core::config::PackScheme;
use mb_core::error::CoreError;
use mb_core::frame::BinaryGrid;

/// Reconstruct a grid from row-aligned packed bytes.
///
/// `width` must be a non-zero multiple of 8 and `height` non-zero, so that
/// `unpack(pack(g).bytes, w, h) == g` holds exactly.
///
/// # Errors
/// - [`CoreError::InvalidDimensions`] for a zero size or a width not divisible by 8.
/// - [`CoreError::LengthMismatch`] when `bytes.len() != width / 8 * height`.
///
/// # Example
/// ```
/// use mb_pack::unpack::unpack;
/// let grid = unpack(&[0xAA], 8, 1).unwrap();
/// assert!(grid.get(0, 0));
/// assert!(!grid.get(1, 0));
/// assert!(unpack(&[0; 5], 8, 1).is_err());
/// ```
pub fn unpack(bytes: &[u8], width: u32, height: u32) -> Result<BinaryGrid, CoreError> {
    unpack_with(bytes, width, height, PackScheme::RowAligned)
}

/// Reconstruct a grid from packed bytes in the given scheme.
///
/// The flat scheme accepts any non-zero width; trailing pad bits of the last
/// byte are ignored.
///
/// # Errors
/// Same as [`unpack`]; the flat scheme expects `ceil(width × height / 8)` bytes.
pub fn unpack_with(
    bytes: &[u8],
    width: u32,
    height: u32,
    scheme: PackScheme,
) -> Result<BinaryGrid, CoreError> {
    let aligned_ok = scheme == PackScheme::Flat || width.is_multiple_of(8);
    if width == 0 || height == 0 || !aligned_ok {
        return Err(CoreError::InvalidDimensions { width, height });
    }

    let expected = scheme.byte_len(width, height);
    if bytes.len() != expected {
        return Err(CoreError::LengthMismatch {
            expected,
            actual: bytes.len(),
        });
    }

    let mut grid = BinaryGrid::new(width, height);
    match scheme {
        PackScheme::RowAligned => {
            let bytes_per_row = width.div_ceil(8) as usize;
            for (y, row) in bytes.chunks_exact(bytes_per_row).enumerate() {
                for x in 0..width as usize {
                    // x < width : les bits au-delà de la largeur sont ignorés
                    grid.set(x as u32, y as u32, bit_at(row, x));
                }
            }
        }
        PackScheme::Flat => {
            let w = width as usize;
            for i in 0..w * height as usize {
                grid.set((i % w) as u32, (i / w) as u32, bit_at(bytes, i));
            }
        }
    }
    Ok(grid)
}

/// Bit `index` d'un flux MSB-first.
#[inline(always)]
fn bit_at(bytes: &[u8], index: usize) -> bool {
    bytes[index / 8] & (0x80u8 >> (index % 8)) != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::{pack, pack_with};

    fn checker(width: u32, height: u32) -> BinaryGrid {
        let mut grid = BinaryGrid::new(width, height);
        for y in 0..height {
            for x in 0..width {
                grid.set(x, y, (x + y) % 2 == 0 || x % 5 == 0);
            }
        }
        grid
    }

    #[test]
    fn round_trip_row_aligned() {
        for (w, h) in [(8, 1), (16, 16), (64, 32), (128, 3)] {
            let grid = checker(w, h);
            let frame = pack(&grid);
            assert_eq!(unpack(&frame.bytes, w, h).unwrap(), grid, "{w}x{h}");
        }
    }

    #[test]
    fn round_trip_flat_any_width() {
        for (w, h) in [(1, 1), (3, 3), (10, 7), (17, 2)] {
            let grid = checker(w, h);
            let frame = pack_with(&grid, PackScheme::Flat);
            assert_eq!(
                unpack_with(&frame.bytes, w, h, PackScheme::Flat).unwrap(),
                grid,
                "{w}x{h}"
            );
        }
    }

    #[test]
    fn length_mismatch_reported() {
        let err = unpack(&[0u8; 5], 8, 1).unwrap_err();
        assert_eq!(
            err,
            CoreError::LengthMismatch {
                expected: 1,
                actual: 5
            }
        );
        assert!(matches!(
            unpack_with(&[0u8; 1], 3, 3, PackScheme::Flat),
            Err(CoreError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn invalid_dimensions_reported() {
        for (w, h) in [(0, 1), (8, 0), (12, 2)] {
            assert_eq!(
                unpack(&[0u8; 4], w, h).unwrap_err(),
                CoreError::InvalidDimensions {
                    width: w,
                    height: h
                }
            );
        }
        assert!(unpack_with(&[], 0, 4, PackScheme::Flat).is_err());
    }

    #[test]
    fn dimensions_checked_before_length() {
        // largeur invalide ET longueur fausse → InvalidDimensions
        assert!(matches!(
            unpack(&[0u8; 99], 7, 1),
            Err(CoreError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn bits_read_high_to_low() {
        let grid = unpack(&[0x80, 0x01], 16, 1).unwrap();
        let on: Vec<u32> = (0..16).filter(|&x| grid.get(x, 0)).collect();
        assert_eq!(on, vec![0, 15]);
    }
}
