use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use ::image::codecs::gif::GifDecoder;
use ::image::{AnimationDecoder, DynamicImage};
use anyhow::{Context, Result};
use mb_core::frame::PixelGrid;
use mb_core::traits::GridSource;

use crate::image::{load_luma, luma_grid};
use crate::resize::{TargetSize, resize_all};

/// Extensions image reconnues dans un dossier de frames.
const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Source d'animation : toutes les frames d'un GIF, ou les images d'un dossier.
///
/// La première frame fixe la taille cible ; toutes les frames sont
/// redimensionnées à cette taille.
pub struct AnimationSource {
    frames: VecDeque<PixelGrid>,
    size: (u32, u32),
}

impl AnimationSource {
    /// Ouvre un GIF animé, un dossier d'images, ou une image seule (1 frame).
    ///
    /// # Errors
    /// Returns an error if the path cannot be read, holds no frame, or a
    /// frame fails to decode.
    pub fn open(path: &Path, target: TargetSize) -> Result<Self> {
        let native = if path.is_dir() {
            load_folder(path)?
        } else if has_ext(path, "gif") {
            load_gif(path)?
        } else {
            vec![load_luma(path)?]
        };
        log::info!("{} : {} frame(s)", path.display(), native.len());
        Self::from_grids(native, target)
    }

    /// Build from decoded frames.
    ///
    /// # Errors
    /// Returns an error if `native` is empty or a resize fails.
    pub fn from_grids(native: Vec<PixelGrid>, target: TargetSize) -> Result<Self> {
        if native.is_empty() {
            anyhow::bail!("Aucune frame à convertir");
        }
        let (size, frames) = resize_all(&native, target)?;
        Ok(Self {
            frames: frames.into(),
            size,
        })
    }
}

impl GridSource for AnimationSource {
    fn next_grid(&mut self) -> Option<PixelGrid> {
        self.frames.pop_front()
    }

    fn native_size(&self) -> (u32, u32) {
        self.size
    }

    fn len_hint(&self) -> usize {
        self.frames.len()
    }
}

fn has_ext(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Décode toutes les frames d'un GIF (déjà composées sur le canvas complet).
fn load_gif(path: &Path) -> Result<Vec<PixelGrid>> {
    let file = File::open(path).with_context(|| format!("Impossible d'ouvrir {}", path.display()))?;
    let decoder = GifDecoder::new(BufReader::new(file))
        .with_context(|| format!("GIF invalide : {}", path.display()))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .with_context(|| format!("Décodage des frames impossible : {}", path.display()))?;
    Ok(frames
        .into_iter()
        .map(|f| luma_grid(&DynamicImage::ImageRgba8(f.into_buffer())))
        .collect())
}

/// Charge chaque image d'un dossier, triées par chemin.
fn load_folder(dir: &Path) -> Result<Vec<PixelGrid>> {
    let mut files = Vec::new();
    scan_dir(dir, &mut files)?;
    files.sort();
    log::debug!("{} image(s) trouvée(s) dans {}", files.len(), dir.display());
    files.iter().map(|p| load_luma(p)).collect()
}

/// Extrait récursivement les images reconnues.
fn scan_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("Lecture de {} impossible", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            scan_dir(&path, files)?;
        } else if IMAGE_EXTS.iter().any(|ext| has_ext(&path, ext)) {
            files.push(path);
        }
    }
    Ok(())
}
