use crate::frame::PixelGrid;

/// Fournit des grilles de pixels au pipeline de conversion.
///
/// Implémenté par : `ImageSource`, `AnimationSource`, `GlyphSource`.
/// Une source finie retourne ses grilles dans l'ordre puis `None`.
///
/// # Example
/// ```
/// use mb_core::traits::GridSource;
/// use mb_core::frame::PixelGrid;
///
/// struct Single(Option<PixelGrid>);
/// impl GridSource for Single {
///     fn next_grid(&mut self) -> Option<PixelGrid> { self.0.take() }
///     fn native_size(&self) -> (u32, u32) { (8, 8) }
///     fn len_hint(&self) -> usize { usize::from(self.0.is_some()) }
/// }
///
/// let mut src = Single(Some(PixelGrid::new(8, 8)));
/// assert_eq!(src.collect_grids().len(), 1);
/// ```
pub trait GridSource {
    /// Retourne la prochaine grille, ou `None` si la source est épuisée.
    fn next_grid(&mut self) -> Option<PixelGrid>;

    /// Dimensions des grilles produites.
    fn native_size(&self) -> (u32, u32);

    /// Nombre de grilles restantes.
    fn len_hint(&self) -> usize;

    /// Drain the source in order.
    fn collect_grids(&mut self) -> Vec<PixelGrid> {
        let mut grids = Vec::with_capacity(self.len_hint());
        while let Some(grid) = self.next_grid() {
            grids.push(grid);
        }
        grids
    }
}
