use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use mb_core::config::{ArrayStyle, ConvertConfig, PackScheme};

/// monobit : images, animations et glyphes vers bitmaps monochromes packés.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Fichier de configuration TOML. Défaut : monobit.toml s'il existe.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convertir une image fixe (PNG, JPEG, BMP, GIF) en un tableau.
    Image {
        /// Image source.
        path: PathBuf,
        #[command(flatten)]
        convert: ConvertArgs,
    },

    /// Convertir un GIF animé ou un dossier d'images en séquence de frames.
    Anim {
        /// GIF animé ou dossier de frames (triées par nom).
        path: PathBuf,
        #[command(flatten)]
        convert: ConvertArgs,
    },

    /// Rasteriser du texte avec une police TTF/OTF.
    Text {
        /// Texte à rendre.
        text: String,
        /// Fichier de police.
        #[arg(long)]
        font: PathBuf,
        /// Taille de police en pixels.
        #[arg(long, default_value_t = 16.0)]
        size: f32,
        /// Une frame par caractère (table de police) au lieu d'une seule ligne.
        #[arg(long, default_value_t = false)]
        cells: bool,
        #[command(flatten)]
        convert: ConvertArgs,
    },

    /// Relire un tableau packé et afficher le bitmap.
    Decode {
        /// Fichier source contenant le tableau, ou "-" pour stdin.
        input: String,
        /// Largeur en pixels (défaut : suffixe _WxH du nom).
        #[arg(long)]
        width: Option<u32>,
        /// Hauteur en pixels (défaut : suffixe _WxH du nom).
        #[arg(long)]
        height: Option<u32>,
        /// Schéma de packing.
        #[arg(long, value_enum)]
        scheme: Option<SchemeArg>,
        /// Écrire un aperçu PNG (un fichier par frame si plusieurs).
        #[arg(long)]
        preview_png: Option<PathBuf>,
        /// Facteur d'agrandissement du PNG.
        #[arg(long)]
        scale: Option<u32>,
    },
}

/// Options partagées par les conversions.
#[derive(Args, Debug, Default)]
pub struct ConvertArgs {
    /// Largeur cible (hauteur déduite du ratio si --height absent).
    #[arg(long)]
    pub width: Option<u32>,
    /// Hauteur cible.
    #[arg(long)]
    pub height: Option<u32>,
    /// Garder les dimensions natives (ignore la largeur de la config).
    #[arg(long, default_value_t = false, conflicts_with_all = ["width", "height"])]
    pub native: bool,
    /// Seuil : bit à 1 si pixel > seuil.
    #[arg(short, long, allow_negative_numbers = true)]
    pub threshold: Option<i32>,
    /// Inverser la polarité.
    #[arg(long, default_value_t = false)]
    pub invert: bool,
    /// Schéma de packing.
    #[arg(long, value_enum)]
    pub scheme: Option<SchemeArg>,
    /// Préfixe du nom de tableau.
    #[arg(long)]
    pub name: Option<String>,
    /// Syntaxe de sortie.
    #[arg(long, value_enum)]
    pub style: Option<StyleArg>,
    /// Octets par ligne.
    #[arg(long)]
    pub bytes_per_line: Option<usize>,
    /// Fichier de sortie (stdout sinon).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Afficher un aperçu demi-blocs sur stderr.
    #[arg(long, default_value_t = false)]
    pub preview: bool,
    /// Écrire un aperçu PNG.
    #[arg(long)]
    pub preview_png: Option<PathBuf>,
    /// Facteur d'agrandissement du PNG.
    #[arg(long)]
    pub scale: Option<u32>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemeArg {
    /// Aligné par ligne (canonique).
    Row,
    /// Flux continu (legacy).
    Flat,
}

impl From<SchemeArg> for PackScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Row => PackScheme::RowAligned,
            SchemeArg::Flat => PackScheme::Flat,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleArg {
    C,
    Rust,
}

impl From<StyleArg> for ArrayStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::C => ArrayStyle::C,
            StyleArg::Rust => ArrayStyle::Rust,
        }
    }
}

impl ConvertArgs {
    /// Apply CLI overrides on top of the loaded config.
    ///
    /// # Errors
    /// Returns an error if the resulting array name is invalid.
    pub fn apply(&self, config: &mut ConvertConfig) -> anyhow::Result<()> {
        if self.native {
            config.width = None;
            config.height = None;
        }
        if self.width.is_some() || self.height.is_some() {
            config.width = self.width;
            config.height = self.height;
        }
        if let Some(v) = self.threshold {
            config.threshold = v;
        }
        if self.invert {
            config.invert = true;
        }
        if let Some(v) = self.scheme {
            config.scheme = v.into();
        }
        if let Some(ref v) = self.name {
            config.array_name.clone_from(v);
        }
        if let Some(v) = self.style {
            config.style = v.into();
        }
        if let Some(v) = self.bytes_per_line {
            config.bytes_per_line = v;
        }
        if let Some(v) = self.scale {
            config.preview_scale = v;
        }
        config.clamp_all();
        config.validate()?;
        Ok(())
    }
}
