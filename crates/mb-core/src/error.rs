use thiserror::Error;

/// Errors originating from the core types and the packing engine.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// A frame does not share the dimensions of the first frame.
    #[error(
        "Frame {index} : dimensions {width}×{height} différentes de la première frame ({expected_width}×{expected_height})"
    )]
    DimensionMismatch {
        /// Position of the offending frame in the sequence.
        index: usize,
        /// Width established by the first frame.
        expected_width: u32,
        /// Height established by the first frame.
        expected_height: u32,
        /// Width of the offending frame.
        width: u32,
        /// Height of the offending frame.
        height: u32,
    },

    /// Invalid width/height dimensions.
    #[error("Dimensions invalides : {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Packed byte count differs from what the dimensions require.
    #[error("Taille incohérente : {actual} octets reçus, {expected} attendus")]
    LengthMismatch {
        /// Byte count required by the dimensions.
        expected: usize,
        /// Byte count received.
        actual: usize,
    },

    /// Raw sample buffer does not hold exactly width × height samples.
    #[error("Nombre d'échantillons incohérent : {actual} pour une grille {width}×{height}")]
    SampleCount {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
        /// Samples received.
        actual: usize,
    },
}
