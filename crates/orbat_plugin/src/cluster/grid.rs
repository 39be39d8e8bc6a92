//! Pixel-grid bucketing.

use glam::DVec2;

/// Grid cell address. Cells extend to negative screen space, hence floored
/// division rather than truncation.
pub type CellKey = (i32, i32);

pub fn cell_of(point: DVec2, cell_px: f64) -> CellKey {
    (
        (point.x / cell_px).floor() as i32,
        (point.y / cell_px).floor() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_partition_the_plane() {
        assert_eq!(cell_of(DVec2::new(0.0, 0.0), 48.0), (0, 0));
        assert_eq!(cell_of(DVec2::new(47.9, 47.9), 48.0), (0, 0));
        assert_eq!(cell_of(DVec2::new(48.0, 0.0), 48.0), (1, 0));
        assert_eq!(cell_of(DVec2::new(-0.1, -48.1), 48.0), (-1, -2));
    }
}
