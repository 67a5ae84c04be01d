use std::collections::VecDeque;
use std::path::Path;

use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont, point};
use anyhow::{Context, Result};
use mb_core::frame::PixelGrid;
use mb_core::traits::GridSource;

use crate::resize::{TargetSize, resize_all};

/// Rasterise des glyphes TTF/OTF en grilles de couverture (0–255).
///
/// Hauteur de cellule = ascent − descent ; largeur de cellule = avance de 'M'.
pub struct GlyphRasterizer {
    font: FontVec,
    scale: PxScale,
    ascent: f32,
    cell_width: u32,
    cell_height: u32,
}

impl GlyphRasterizer {
    /// Load a font from raw bytes at `size_px` pixels.
    ///
    /// # Errors
    /// Retourne une erreur si la police fournie est invalide.
    pub fn new(font_data: Vec<u8>, size_px: f32) -> Result<Self> {
        let font = FontVec::try_from_vec(font_data).context("Police invalide")?;
        let scale = PxScale::from(size_px.max(1.0));

        let scaled = font.as_scaled(scale);
        let ascent = scaled.ascent();
        let cell_height = (ascent - scaled.descent()).ceil() as u32;
        let cell_width = scaled.h_advance(font.glyph_id('M')).ceil() as u32;

        Ok(Self {
            cell_width: cell_width.max(1),
            cell_height: cell_height.max(1),
            font,
            scale,
            ascent,
        })
    }

    /// Load a font file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a font.
    pub fn from_file(path: &Path, size_px: f32) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("Impossible de lire {}", path.display()))?;
        Self::new(data, size_px)
            .with_context(|| format!("Police invalide : {}", path.display()))
    }

    /// Cell size used by [`GlyphRasterizer::render_cells`].
    #[must_use]
    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }

    /// Render `text` on a single line (advance + kerning).
    #[must_use]
    pub fn render_text(&self, text: &str) -> PixelGrid {
        let scaled = self.font.as_scaled(self.scale);

        let mut placed: Vec<(GlyphId, f32)> = Vec::with_capacity(text.len());
        let mut caret = 0.0f32;
        let mut prev: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = self.glyph_id(ch);
            if let Some(p) = prev {
                caret += scaled.kern(p, id);
            }
            placed.push((id, caret));
            caret += scaled.h_advance(id);
            prev = Some(id);
        }

        let mut grid = PixelGrid::new(caret.ceil().max(0.0) as u32, self.cell_height);
        for (id, x) in placed {
            self.draw(&mut grid, id, x);
        }
        grid
    }

    /// Render each char into its own cell. Every grid has [`cell_size`](Self::cell_size).
    #[must_use]
    pub fn render_cells(&self, chars: &str) -> Vec<PixelGrid> {
        chars
            .chars()
            .map(|ch| {
                let mut grid = PixelGrid::new(self.cell_width, self.cell_height);
                self.draw(&mut grid, self.glyph_id(ch), 0.0);
                grid
            })
            .collect()
    }

    fn glyph_id(&self, ch: char) -> GlyphId {
        let id = self.font.glyph_id(ch);
        // glyph_id 0 = .notdef
        if id.0 == 0 && !ch.is_whitespace() {
            log::warn!("Glyphe absent de la police : {ch:?}");
        }
        id
    }

    /// Dessine un glyphe à l'abscisse `x` ; la couverture est combinée par max.
    fn draw(&self, grid: &mut PixelGrid, id: GlyphId, x: f32) {
        let glyph = id.with_scale_and_position(self.scale, point(x, self.ascent));
        let Some(outline) = self.font.outline_glyph(glyph) else {
            return;
        };
        let bounds = outline.px_bounds();
        let (w, h) = (grid.width, grid.height);
        #[allow(clippy::cast_possible_wrap)]
        outline.draw(|gx, gy, v| {
            let px = gx as i32 + bounds.min.x as i32;
            let py = gy as i32 + bounds.min.y as i32;
            if px >= 0 && py >= 0 && (px as u32) < w && (py as u32) < h {
                let value = (v * 255.0).round().clamp(0.0, 255.0) as u8;
                let (px, py) = (px as u32, py as u32);
                if value > grid.get(px, py) {
                    grid.set(px, py, value);
                }
            }
        });
    }
}

/// Glyphes rendus exposés comme source de grilles.
pub struct GlyphSource {
    grids: VecDeque<PixelGrid>,
    size: (u32, u32),
}

impl GlyphSource {
    /// Une seule grille : le texte complet sur une ligne, redimensionné à `target`.
    ///
    /// # Errors
    /// Returns an error if the resize fails (e.g. empty text with an explicit target).
    pub fn text(rasterizer: &GlyphRasterizer, text: &str, target: TargetSize) -> Result<Self> {
        Self::from_grids(vec![rasterizer.render_text(text)], target)
    }

    /// Une grille par caractère (table de police), toutes à la même taille.
    ///
    /// # Errors
    /// Returns an error if the resize fails.
    pub fn cells(rasterizer: &GlyphRasterizer, chars: &str, target: TargetSize) -> Result<Self> {
        Self::from_grids(rasterizer.render_cells(chars), target)
    }

    fn from_grids(native: Vec<PixelGrid>, target: TargetSize) -> Result<Self> {
        let (size, grids) = resize_all(&native, target)?;
        Ok(Self {
            grids: grids.into(),
            size,
        })
    }
}

impl GridSource for GlyphSource {
    fn next_grid(&mut self) -> Option<PixelGrid> {
        self.grids.pop_front()
    }

    fn native_size(&self) -> (u32, u32) {
        self.size
    }

    fn len_hint(&self) -> usize {
        self.grids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// DejaVu Sans Mono (licence Bitstream Vera, voir testdata/DejaVu-LICENSE).
    const FONT: &[u8] = include_bytes!("../testdata/DejaVuSansMono.ttf");
    const SIZE: f32 = 16.0;

    fn rasterizer() -> GlyphRasterizer {
        GlyphRasterizer::new(FONT.to_vec(), SIZE).unwrap()
    }

    fn font() -> FontVec {
        FontVec::try_from_vec(FONT.to_vec()).unwrap()
    }

    fn lit_rows(grid: &PixelGrid) -> Vec<u32> {
        (0..grid.height)
            .filter(|&y| (0..grid.width).any(|x| grid.get(x, y) > 0))
            .collect()
    }

    #[test]
    fn cell_is_m_advance_by_line_height() {
        let font = font();
        let scaled = font.as_scaled(PxScale::from(SIZE));
        let expected = (
            scaled.h_advance(font.glyph_id('M')).ceil() as u32,
            (scaled.ascent() - scaled.descent()).ceil() as u32,
        );
        assert_eq!(rasterizer().cell_size(), expected);
        assert!(expected.1 > expected.0);
    }

    #[test]
    fn text_width_follows_advances_and_kerning() {
        let font = font();
        let scaled = font.as_scaled(PxScale::from(SIZE));
        let (a, v) = (font.glyph_id('A'), font.glyph_id('V'));
        let caret = scaled.h_advance(a) + scaled.kern(a, v) + scaled.h_advance(v);

        let r = rasterizer();
        let grid = r.render_text("AV");
        assert_eq!(grid.width, caret.ceil() as u32);
        assert_eq!(grid.height, r.cell_size().1);
        assert!(grid.data.iter().any(|&v| v > 0));
    }

    #[test]
    fn later_glyphs_leave_earlier_ones_intact() {
        let r = rasterizer();
        let one = r.render_text("H");
        let two = r.render_text("HH");
        assert!(two.width > one.width);
        for y in 0..one.height {
            for x in 0..one.width - 1 {
                assert_eq!(one.get(x, y), two.get(x, y), "({x}, {y})");
            }
        }
    }

    #[test]
    fn glyphs_sit_on_the_ascent_baseline() {
        let font = font();
        let baseline = font.as_scaled(PxScale::from(SIZE)).ascent().ceil() as u32;
        let r = rasterizer();

        // 'x' : hauteur d'x, rien au-dessus du milieu, rien sous la ligne de base
        let rows = lit_rows(&r.render_text("x"));
        assert!(rows.first().is_some_and(|&y| y > 2));
        assert!(rows.last().is_some_and(|&y| y <= baseline));

        // 'g' : jambage sous la ligne de base, dans la cellule
        let rows = lit_rows(&r.render_text("g"));
        assert!(rows.last().is_some_and(|&y| y > baseline && y < r.cell_size().1));
    }

    #[test]
    fn overlapping_coverage_keeps_the_maximum() {
        let r = rasterizer();
        let (w, h) = r.cell_size();
        let (bar, dash) = (r.glyph_id('l'), r.glyph_id('-'));

        let mut a = PixelGrid::new(w, h);
        r.draw(&mut a, bar, 0.0);
        let mut b = PixelGrid::new(w, h);
        r.draw(&mut b, dash, 0.0);
        let mut both = a.clone();
        r.draw(&mut both, dash, 0.0);

        for i in 0..both.data.len() {
            assert_eq!(both.data[i], a.data[i].max(b.data[i]), "sample {i}");
        }
        // redessiner le même glyphe ne change rien
        let mut again = a.clone();
        r.draw(&mut again, bar, 0.0);
        assert_eq!(again, a);
    }

    #[test]
    fn font_table_cells_are_uniform_and_space_is_blank() {
        let r = rasterizer();
        let cells = r.render_cells("AB ");
        assert_eq!(cells.len(), 3);
        assert!(cells.iter().all(|g| (g.width, g.height) == r.cell_size()));
        assert!(cells[0].data.iter().any(|&v| v > 0));
        assert!(cells[1].data.iter().any(|&v| v > 0));
        assert_ne!(cells[0], cells[1]);
        assert!(cells[2].data.iter().all(|&v| v == 0));

        let mut src = GlyphSource::cells(&r, "AB ", TargetSize::Native).unwrap();
        assert_eq!(src.len_hint(), 3);
        assert_eq!(src.native_size(), r.cell_size());
        assert_eq!(src.collect_grids(), cells);
    }

    #[test]
    fn whitespace_text_is_blank_but_sized() {
        let grid = rasterizer().render_text("  ");
        assert!(grid.width > 0);
        assert!(grid.data.iter().all(|&v| v == 0));
    }

    #[test]
    fn font_loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.ttf");
        std::fs::write(&path, FONT).unwrap();
        let r = GlyphRasterizer::from_file(&path, SIZE).unwrap();
        assert_eq!(r.cell_size(), rasterizer().cell_size());
    }

    #[test]
    fn invalid_font_data_rejected() {
        assert!(GlyphRasterizer::new(vec![0u8; 64], 16.0).is_err());
        assert!(GlyphRasterizer::new(Vec::new(), 16.0).is_err());
    }

    #[test]
    fn empty_cell_set_is_empty_source() {
        let src = GlyphSource::from_grids(Vec::new(), TargetSize::Width(8)).unwrap();
        assert_eq!(src.len_hint(), 0);
        assert_eq!(src.native_size(), (0, 0));
    }

    #[test]
    fn glyph_grids_resized_to_target() {
        let grids = vec![PixelGrid::new(10, 20), PixelGrid::new(10, 20)];
        let mut src = GlyphSource::from_grids(grids, TargetSize::Height(10)).unwrap();
        assert_eq!(src.native_size(), (5, 10));
        assert!(src.collect_grids().iter().all(|g| (g.width, g.height) == (5, 10)));
    }

    #[test]
    fn missing_font_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(GlyphRasterizer::from_file(&dir.path().join("absent.ttf"), 12.0).is_err());
    }
}
