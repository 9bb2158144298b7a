//! Pixel geometry of the text area.
//!
//! The view is a grid of fixed-size cells: row `r` starts at
//! `(r - first_row) * cell_height` and visual column `c` at `c * cell_width`.
//! Tab expansion and wide characters are resolved into visual columns by the
//! caller before reaching this module.

/// Size of one text cell in pixels. Both dimensions are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMetrics {
    cell_width: u32,
    cell_height: u32,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self::new(8, 16)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CellMetrics {
    pub fn new(cell_width: u32, cell_height: u32) -> Self {
        Self {
            cell_width: cell_width.max(1),
            cell_height: cell_height.max(1),
        }
    }

    pub fn cell_width(&self) -> u32 {
        self.cell_width
    }

    pub fn cell_height(&self) -> u32 {
        self.cell_height
    }

    /// Display row and visual column under `point`, given the first visible
    /// row. Points left of or above the text area hit nothing.
    pub fn cell_at(&self, point: PixelPoint, first_row: usize) -> Option<(usize, usize)> {
        let x = u32::try_from(point.x).ok()?;
        let y = u32::try_from(point.y).ok()?;
        let row = first_row + (y / self.cell_height) as usize;
        let col = (x / self.cell_width) as usize;
        Some((row, col))
    }

    /// Rectangle covering visual columns `cols` of `row`.
    pub fn rect_for(&self, row: usize, first_row: usize, cols: std::ops::Range<usize>) -> PixelRect {
        let rel = row as i64 - first_row as i64;
        let clamp = |v: i64| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        let width = cols.end.saturating_sub(cols.start) as u64 * self.cell_width as u64;
        PixelRect {
            x: clamp(cols.start as i64 * self.cell_width as i64),
            y: clamp(rel * self.cell_height as i64),
            width: width.min(u32::MAX as u64) as u32,
            height: self.cell_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_floor_at_one() {
        let m = CellMetrics::new(0, 0);
        assert_eq!((m.cell_width(), m.cell_height()), (1, 1));
    }

    #[test]
    fn cell_hit_testing() {
        let m = CellMetrics::new(8, 16);
        assert_eq!(m.cell_at(PixelPoint::new(17, 33), 10), Some((12, 2)));
        assert_eq!(m.cell_at(PixelPoint::new(-1, 0), 0), None);
        assert_eq!(m.cell_at(PixelPoint::new(0, -5), 0), None);
    }

    #[test]
    fn rect_relative_to_viewport() {
        let m = CellMetrics::new(8, 16);
        let r = m.rect_for(12, 10, 2..5);
        assert_eq!(r, PixelRect { x: 16, y: 32, width: 24, height: 16 });
        assert_eq!(m.rect_for(3, 5, 0..1).y, -32);
    }
}
