//! Screen-space vertical bands per level.
//!
//! Each embedded level gets a horizontal band of the unit-height viewport.
//! Expanding a level doubles its band; the others shrink proportionally so
//! the bands always tile `[0, 1]` exactly.

use serde::Serialize;

/// One level's vertical band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelBand {
    /// Band height as a fraction of the viewport.
    pub total_size: f64,
    /// Distance of the band's top from the viewport top.
    pub top_offset: f64,
}

/// Compute the band layout for `level_count` levels.
///
/// With `expanded` set, that level's band takes double weight; an
/// out-of-range index behaves like no expansion.
#[must_use]
pub fn level_visuals(level_count: usize, expanded: Option<usize>) -> Vec<LevelBand> {
    if level_count == 0 {
        return Vec::new();
    }
    let weight_of = |level: usize| -> f64 {
        if expanded == Some(level) { 2.0 } else { 1.0 }
    };
    let total: f64 = (0..level_count).map(weight_of).sum();

    let mut bands = Vec::with_capacity(level_count);
    let mut top = 0.0;
    for level in 0..level_count {
        let size = weight_of(level) / total;
        bands.push(LevelBand {
            total_size: size,
            top_offset: top,
        });
        top += size;
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_tiles_unit(bands: &[LevelBand]) {
        let mut expected_top = 0.0;
        for band in bands {
            assert!((band.top_offset - expected_top).abs() < 1e-12);
            expected_top += band.total_size;
        }
        assert!((expected_top - 1.0).abs() < 1e-12);
    }

    #[test]
    fn uniform_bands_without_expansion() {
        let bands = level_visuals(4, None);
        assert_eq!(bands.len(), 4);
        for band in &bands {
            assert!((band.total_size - 0.25).abs() < 1e-12);
        }
        assert_tiles_unit(&bands);
    }

    #[test]
    fn expanded_level_takes_double_weight() {
        let bands = level_visuals(3, Some(1));
        assert!((bands[1].total_size - 0.5).abs() < 1e-12);
        assert!((bands[0].total_size - 0.25).abs() < 1e-12);
        assert!((bands[2].total_size - 0.25).abs() < 1e-12);
        assert_tiles_unit(&bands);
    }

    #[test]
    fn out_of_range_expansion_is_ignored() {
        let bands = level_visuals(2, Some(7));
        assert!((bands[0].total_size - 0.5).abs() < 1e-12);
        assert_tiles_unit(&bands);
    }

    #[test]
    fn no_levels_no_bands() {
        assert!(level_visuals(0, Some(0)).is_empty());
    }
}
