use crate::config::PackScheme;
use crate::error::CoreError;

/// Grille d'intensités en niveaux de gris, row-major, 1 byte par pixel.
///
/// Produite par les sources (image, animation, glyphes), lue par le seuillage.
///
/// # Example
/// ```
/// use mb_core::frame::PixelGrid;
/// let grid = PixelGrid::new(10, 4);
/// assert_eq!(grid.data.len(), 40);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    /// Intensités 0–255, row-major.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelGrid {
    /// Crée une grille noire aux dimensions données.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Wrap an existing sample buffer.
    ///
    /// # Errors
    /// Returns [`CoreError::SampleCount`] if `data.len() != width * height`.
    ///
    /// # Example
    /// ```
    /// use mb_core::frame::PixelGrid;
    /// assert!(PixelGrid::from_raw(2, 2, vec![0, 64, 128, 255]).is_ok());
    /// assert!(PixelGrid::from_raw(2, 2, vec![0; 3]).is_err());
    /// ```
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CoreError> {
        if data.len() != width as usize * height as usize {
            return Err(CoreError::SampleCount {
                width,
                height,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Intensité du pixel (x, y).
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Set the intensity of pixel (x, y).
    #[inline(always)]
    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        self.data[y as usize * self.width as usize + x as usize] = value;
    }
}

/// Grille binaire (1 bit logique par pixel), row-major.
///
/// La longueur vaut toujours exactement `width × height`.
///
/// # Example
/// ```
/// use mb_core::frame::BinaryGrid;
/// let mut grid = BinaryGrid::new(8, 2);
/// grid.set(3, 1, true);
/// assert!(grid.get(3, 1));
/// assert_eq!(grid.count_ones(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BinaryGrid {
    bits: Vec<bool>,
    width: u32,
    height: u32,
}

impl BinaryGrid {
    /// Crée une grille dont tous les bits sont à 0.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bits: vec![false; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Build a grid from row-major bits.
    ///
    /// # Errors
    /// Returns [`CoreError::SampleCount`] if `bits.len() != width * height`.
    pub fn from_bits(width: u32, height: u32, bits: Vec<bool>) -> Result<Self, CoreError> {
        if bits.len() != width as usize * height as usize {
            return Err(CoreError::SampleCount {
                width,
                height,
                actual: bits.len(),
            });
        }
        Ok(Self {
            bits,
            width,
            height,
        })
    }

    /// Build a grid from rows of 0/1 values. Any non-zero value is a set bit.
    ///
    /// # Errors
    /// Returns [`CoreError::SampleCount`] if the rows are ragged.
    ///
    /// # Example
    /// ```
    /// use mb_core::frame::BinaryGrid;
    /// let grid = BinaryGrid::from_rows(&[&[1, 0, 1], &[0, 1, 0]]).unwrap();
    /// assert_eq!((grid.width(), grid.height()), (3, 2));
    /// assert!(grid.get(1, 1));
    /// ```
    pub fn from_rows(rows: &[&[u8]]) -> Result<Self, CoreError> {
        let width = rows.first().map_or(0, |r| r.len()) as u32;
        let height = rows.len() as u32;
        let bits: Vec<bool> = rows
            .iter()
            .flat_map(|r| r.iter().map(|&v| v != 0))
            .collect();
        Self::from_bits(width, height, bits)
    }

    /// Width in pixels.
    #[inline(always)]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline(always)]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bits row-major.
    #[must_use]
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Bit at (x, y).
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> bool {
        debug_assert!(x < self.width && y < self.height, "bit out of bounds");
        self.bits[y as usize * self.width as usize + x as usize]
    }

    /// Set the bit at (x, y).
    #[inline(always)]
    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        self.bits[y as usize * self.width as usize + x as usize] = on;
    }

    /// Itère sur les lignes, de haut en bas.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        // width 0 → bits vide, chunks_exact(1) ne produit rien
        self.bits.chunks_exact((self.width as usize).max(1))
    }

    /// Number of set bits.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

/// Encodage octets d'une `BinaryGrid`.
///
/// Construit par le packer ; la taille de `bytes` est fixée par le schéma
/// (voir [`PackScheme::byte_len`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PackedFrame {
    /// Width in pixels of the source grid.
    pub width: u32,
    /// Height in pixels of the source grid.
    pub height: u32,
    /// Packing scheme used to produce `bytes`.
    pub scheme: PackScheme,
    /// Packed bytes.
    pub bytes: Vec<u8>,
}

impl PackedFrame {
    /// Bytes per row for the row-aligned scheme, `None` for the flat scheme.
    ///
    /// # Example
    /// ```
    /// use mb_core::frame::PackedFrame;
    /// use mb_core::config::PackScheme;
    /// let frame = PackedFrame { width: 12, height: 2, scheme: PackScheme::RowAligned, bytes: vec![0; 4] };
    /// assert_eq!(frame.bytes_per_row(), Some(2));
    /// ```
    #[must_use]
    pub fn bytes_per_row(&self) -> Option<usize> {
        match self.scheme {
            PackScheme::RowAligned => Some(self.width.div_ceil(8) as usize),
            PackScheme::Flat => None,
        }
    }
}

/// Séquence ordonnée de frames packées partageant les mêmes dimensions.
///
/// L'ordre des frames est l'ordre de lecture de l'animation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FrameSequence {
    /// Width shared by every frame (0 for an empty sequence).
    pub width: u32,
    /// Height shared by every frame (0 for an empty sequence).
    pub height: u32,
    /// Packing scheme shared by every frame.
    pub scheme: PackScheme,
    /// Packed bytes, one entry per frame.
    pub frames: Vec<Vec<u8>>,
}

impl FrameSequence {
    /// Number of frames.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Bytes per frame, or 0 for an empty sequence.
    #[must_use]
    pub fn frame_len(&self) -> usize {
        self.frames.first().map_or(0, Vec::len)
    }

    /// Vue d'une frame en `PackedFrame`.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<PackedFrame> {
        self.frames.get(index).map(|bytes| PackedFrame {
            width: self.width,
            height: self.height,
            scheme: self.scheme,
            bytes: bytes.clone(),
        })
    }
}
