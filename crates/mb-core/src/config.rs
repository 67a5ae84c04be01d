use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Configuration complète d'une conversion.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use mb_core::config::ConvertConfig;
/// let config = ConvertConfig::default();
/// assert_eq!(config.threshold, 180);
/// assert_eq!(config.width, Some(64));
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ConvertConfig {
    // === Seuillage ===
    /// Seuil : un pixel strictement supérieur donne un bit à 1.
    /// Hors de [0, 255] le seuil sature sans erreur.
    pub threshold: i32,
    /// Inverser la polarité (bit à 1 pour les pixels sombres).
    pub invert: bool,

    // === Dimensions ===
    /// Largeur cible. `None` = largeur native.
    pub width: Option<u32>,
    /// Hauteur cible. `None` = déduite du ratio de la source.
    pub height: Option<u32>,

    // === Packing ===
    /// Bit packing scheme.
    pub scheme: PackScheme,

    // === Sortie ===
    /// Préfixe du nom de tableau (suffixé par `_{W}x{H}`).
    pub array_name: String,
    /// Output array syntax.
    pub style: ArrayStyle,
    /// Octets par ligne de texte.
    pub bytes_per_line: usize,

    // === Preview ===
    /// Magnification factor for PNG previews.
    pub preview_scale: u32,
    /// Intensity drawn for set bits.
    pub preview_foreground: u8,
    /// Intensity drawn for cleared bits.
    pub preview_background: u8,
}

/// Byte packing scheme.
///
/// # Example
/// ```
/// use mb_core::config::PackScheme;
/// assert_eq!(PackScheme::RowAligned.byte_len(12, 3), 6);
/// assert_eq!(PackScheme::Flat.byte_len(12, 3), 5);
/// ```
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum PackScheme {
    /// Chaque ligne commence sur une frontière d'octet (canonique).
    #[default]
    #[serde(alias = "row", alias = "row_aligned")]
    RowAligned,
    /// Flux de bits continu, 8 bits par octet (legacy).
    #[serde(alias = "flat")]
    Flat,
}

impl PackScheme {
    /// Number of bytes a `width × height` grid packs to.
    #[must_use]
    pub fn byte_len(self, width: u32, height: u32) -> usize {
        match self {
            Self::RowAligned => width.div_ceil(8) as usize * height as usize,
            Self::Flat => (width as usize * height as usize).div_ceil(8),
        }
    }
}

/// Output array syntax.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum ArrayStyle {
    /// `const unsigned char name[] = { ... };`
    #[default]
    #[serde(alias = "c")]
    C,
    /// `pub const NAME: [u8; N] = [ ... ];`
    #[serde(alias = "rust")]
    Rust,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            threshold: 180,
            invert: false,
            width: Some(64),
            height: None,
            scheme: PackScheme::RowAligned,
            array_name: "bit_map".to_string(),
            style: ArrayStyle::C,
            bytes_per_line: 16,
            preview_scale: 8,
            preview_foreground: 255,
            preview_background: 0,
        }
    }
}

impl ConvertConfig {
    /// Clamp numeric fields to their valid ranges.
    /// Called after TOML deserialization. `threshold` is left untouched.
    pub fn clamp_all(&mut self) {
        self.bytes_per_line = self.bytes_per_line.clamp(1, 256);
        self.preview_scale = self.preview_scale.clamp(1, 64);
        self.width = self.width.filter(|&w| w > 0);
        self.height = self.height.filter(|&h| h > 0);
    }

    /// Check that the array name is a usable identifier.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] when the name is empty, starts with a
    /// digit, or holds characters other than ASCII alphanumerics and `_`.
    ///
    /// # Example
    /// ```
    /// use mb_core::config::ConvertConfig;
    /// let mut config = ConvertConfig::default();
    /// assert!(config.validate().is_ok());
    /// config.array_name = "3d-logo".into();
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), CoreError> {
        let name = self.array_name.as_str();
        let valid = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(())
        } else {
            Err(CoreError::Config(format!(
                "nom de tableau invalide « {name} »"
            )))
        }
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    convert: ConvertSection,
    output: Option<OutputSection>,
    preview: Option<PreviewSection>,
}

/// Convert section of the TOML config, all fields optional for partial override.
#[derive(Deserialize, Default)]
struct ConvertSection {
    threshold: Option<i32>,
    invert: Option<bool>,
    width: Option<u32>,
    height: Option<u32>,
    scheme: Option<PackScheme>,
}

#[derive(Deserialize)]
struct OutputSection {
    array_name: Option<String>,
    style: Option<ArrayStyle>,
    bytes_per_line: Option<usize>,
}

#[derive(Deserialize)]
struct PreviewSection {
    scale: Option<u32>,
    foreground: Option<u8>,
    background: Option<u8>,
}

/// Charge une configuration TOML et la fusionne sur les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read, is not valid TOML, or
/// names an invalid array identifier.
pub fn load_config(path: &Path) -> Result<ConvertConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let config = parse_config(&content)
        .with_context(|| format!("Configuration invalide dans {}", path.display()))?;
    log::debug!("Configuration chargée depuis {}", path.display());
    Ok(config)
}

/// Parse TOML text into a config merged over the defaults.
///
/// # Errors
/// Returns an error on TOML syntax errors or an invalid array name.
///
/// # Example
/// ```
/// use mb_core::config::{parse_config, PackScheme};
/// let config = parse_config("[convert]\nthreshold = 90\nscheme = \"Flat\"\n").unwrap();
/// assert_eq!(config.threshold, 90);
/// assert_eq!(config.scheme, PackScheme::Flat);
/// assert_eq!(config.array_name, "bit_map");
/// ```
pub fn parse_config(content: &str) -> Result<ConvertConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;

    let mut config = ConvertConfig::default();

    let c = file.convert;
    if let Some(v) = c.threshold {
        config.threshold = v;
    }
    if let Some(v) = c.invert {
        config.invert = v;
    }
    if let Some(v) = c.width {
        config.width = Some(v);
    }
    if let Some(v) = c.height {
        config.height = Some(v);
    }
    if let Some(v) = c.scheme {
        config.scheme = v;
    }

    if let Some(o) = file.output {
        if let Some(v) = o.array_name {
            config.array_name = v;
        }
        if let Some(v) = o.style {
            config.style = v;
        }
        if let Some(v) = o.bytes_per_line {
            config.bytes_per_line = v;
        }
    }

    if let Some(p) = file.preview {
        if let Some(v) = p.scale {
            config.preview_scale = v;
        }
        if let Some(v) = p.foreground {
            config.preview_foreground = v;
        }
        if let Some(v) = p.background {
            config.preview_background = v;
        }
    }

    config.clamp_all();
    config.validate()?;
    Ok(config)
}
