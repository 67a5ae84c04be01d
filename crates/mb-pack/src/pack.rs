use mb_core::config::PackScheme;
use mb_core::frame::{BinaryGrid, PackedFrame};

/// Pack a grid with the canonical row-aligned scheme.
///
/// Bit 7 of each byte is the leftmost pixel of its 8-pixel group. Rows whose
/// width is not a multiple of 8 are padded with trailing zero bits.
///
/// # Example
/// ```
/// use mb_core::frame::BinaryGrid;
/// use mb_pack::pack::pack;
///
/// let grid = BinaryGrid::from_rows(&[&[1, 0, 1, 0, 1, 0, 1, 0]]).unwrap();
/// assert_eq!(pack(&grid).bytes, vec![0xAA]);
/// ```
#[must_use]
pub fn pack(grid: &BinaryGrid) -> PackedFrame {
    pack_with(grid, PackScheme::RowAligned)
}

/// Pack a grid with an explicit scheme.
#[must_use]
pub fn pack_with(grid: &BinaryGrid, scheme: PackScheme) -> PackedFrame {
    let bytes = match scheme {
        PackScheme::RowAligned => pack_rows(grid),
        PackScheme::Flat => pack_flat(grid),
    };
    debug_assert_eq!(bytes.len(), scheme.byte_len(grid.width(), grid.height()));
    PackedFrame {
        width: grid.width(),
        height: grid.height(),
        scheme,
        bytes,
    }
}

/// Chaque ligne démarre sur un nouvel octet.
fn pack_rows(grid: &BinaryGrid) -> Vec<u8> {
    let bytes_per_row = grid.width().div_ceil(8) as usize;
    let mut bytes = vec![0u8; bytes_per_row * grid.height() as usize];
    if bytes_per_row == 0 {
        return bytes;
    }

    for (row, out) in grid.rows().zip(bytes.chunks_exact_mut(bytes_per_row)) {
        for (x, &on) in row.iter().enumerate() {
            if on {
                out[x / 8] |= 0x80u8 >> (x % 8);
            }
        }
    }
    bytes
}

/// Flux continu : le dernier octet incomplet est complété par des zéros en poids faible.
fn pack_flat(grid: &BinaryGrid) -> Vec<u8> {
    grid.bits()
        .chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (j, &on)| byte | (u8::from(on) << (7 - j)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msb_is_leftmost_pixel() {
        let grid = BinaryGrid::from_rows(&[&[1, 0, 1, 0, 1, 0, 1, 0]]).unwrap();
        assert_eq!(pack(&grid).bytes, vec![0xAA]);
        let grid = BinaryGrid::from_rows(&[&[0, 0, 0, 0, 0, 0, 0, 1]]).unwrap();
        assert_eq!(pack(&grid).bytes, vec![0x01]);
    }

    #[test]
    fn first_pixel_of_16_wide_row() {
        let mut grid = BinaryGrid::new(16, 1);
        grid.set(0, 0, true);
        assert_eq!(pack(&grid).bytes, vec![0x80, 0x00]);
    }

    #[test]
    fn rows_padded_to_byte_boundary() {
        // 10 de large → 2 octets par ligne, 6 bits de padding
        let grid = BinaryGrid::from_rows(&[
            &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            &[0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
        ])
        .unwrap();
        let frame = pack(&grid);
        assert_eq!(frame.bytes, vec![0xFF, 0xC0, 0x00, 0x40]);
        assert_eq!(frame.bytes_per_row(), Some(2));
    }

    #[test]
    fn flat_scheme_crosses_rows() {
        // 3×3 : 9 bits → 2 octets, pas d'alignement par ligne
        let grid = BinaryGrid::from_rows(&[&[1, 0, 1], &[1, 1, 1], &[0, 0, 1]]).unwrap();
        let frame = pack_with(&grid, PackScheme::Flat);
        assert_eq!(frame.bytes, vec![0b1011_1100, 0b1000_0000]);
        assert_eq!(frame.scheme, PackScheme::Flat);
        assert_eq!(frame.bytes_per_row(), None);
    }

    #[test]
    fn schemes_agree_on_multiple_of_8() {
        let mut grid = BinaryGrid::new(16, 3);
        for (x, y) in [(0, 0), (9, 1), (15, 2), (7, 2)] {
            grid.set(x, y, true);
        }
        assert_eq!(
            pack_with(&grid, PackScheme::Flat).bytes,
            pack(&grid).bytes
        );
    }

    #[test]
    fn empty_grid_packs_to_nothing() {
        assert!(pack(&BinaryGrid::new(0, 5)).bytes.is_empty());
        assert!(pack(&BinaryGrid::new(8, 0)).bytes.is_empty());
        assert!(pack_with(&BinaryGrid::new(0, 0), PackScheme::Flat).bytes.is_empty());
    }

    #[test]
    fn packing_is_deterministic() {
        let grid = BinaryGrid::from_rows(&[&[1, 1, 0, 1, 0, 0, 1, 0, 1]]).unwrap();
        assert_eq!(pack(&grid), pack(&grid));
    }
}
