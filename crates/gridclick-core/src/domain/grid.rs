//! Grid coordinate mapper.
//!
//! The overlay divides the active display into `rows × cols` equal cells.  A
//! cell is addressed by a two-letter label: the first letter picks the row and
//! the second the column, with `A` = 0 through `Z` = 25.
//!
//! # Mapping (for beginners)
//!
//! For a display whose top-left corner is `(x, y)` and whose size is
//! `width × height`, each cell is `width / cols` wide and `height / rows` tall.
//! Selecting a cell moves the pointer to the cell's centre:
//!
//! ```text
//! point.x = x + (col + 0.5) * (width  / cols)
//! point.y = y + (row + 0.5) * (height / rows)
//! ```
//!
//! Nudging afterwards is plain vector addition and is never clamped to the
//! display: the pointer may be walked onto a neighbouring display or past the
//! edge, and the OS decides what that means.

use std::fmt;
use std::ops::Range;

use thiserror::Error;

use super::geometry::{DisplayBounds, Point};

/// Largest grid dimension a label can address (`A`..=`Z`).
pub const MAX_DIMENSION: u8 = 26;

/// Default number of rows and columns.
pub const DEFAULT_DIMENSION: u8 = 26;

/// Errors produced by the grid mapper.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// A label named a row or column outside the configured grid.
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfRange { row: u8, col: u8, rows: u8, cols: u8 },

    /// The grid dimensions themselves are unusable.
    #[error("grid dimensions must be between 1 and {MAX_DIMENSION}, got {rows}x{cols}")]
    InvalidDimensions { rows: u8, cols: u8 },
}

/// One label letter, `A` (0) through `Z` (25).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Letter(u8);

impl Letter {
    /// Creates a letter from its zero-based index.  Returns `None` for 26 and above.
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < MAX_DIMENSION {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Creates a letter from an ASCII character, accepting either case.
    pub fn from_char(c: char) -> Option<Self> {
        let upper = c.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Self::from_index(upper as u8 - b'A')
        } else {
            None
        }
    }

    /// Zero-based index of this letter.
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Uppercase ASCII character for this letter.
    pub const fn as_char(self) -> char {
        (b'A' + self.0) as char
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A resolved grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub row: u8,
    pub col: u8,
}

impl GridCell {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// Grid dimensions, fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    rows: u8,
    cols: u8,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            rows: DEFAULT_DIMENSION,
            cols: DEFAULT_DIMENSION,
        }
    }
}

impl GridGeometry {
    /// Creates a grid of `rows × cols` cells.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] if either dimension is zero or
    /// larger than [`MAX_DIMENSION`].
    pub fn new(rows: u8, cols: u8) -> Result<Self, GridError> {
        let valid = 1..=MAX_DIMENSION;
        if !valid.contains(&rows) || !valid.contains(&cols) {
            return Err(GridError::InvalidDimensions { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    pub const fn rows(&self) -> u8 {
        self.rows
    }

    pub const fn cols(&self) -> u8 {
        self.cols
    }

    /// Resolves a two-letter label into a cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfRange`] if the row letter is not below
    /// `rows` or the column letter is not below `cols`.
    pub fn decode_label(&self, first: Letter, second: Letter) -> Result<GridCell, GridError> {
        let (row, col) = (first.index(), second.index());
        if row >= self.rows || col >= self.cols {
            return Err(GridError::OutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(GridCell::new(row, col))
    }

    /// Returns the label (row letter, column letter) of `cell`, or `None` if
    /// the cell is outside this grid.
    pub fn label(&self, cell: GridCell) -> Option<(Letter, Letter)> {
        if cell.row >= self.rows || cell.col >= self.cols {
            return None;
        }
        Some((Letter::from_index(cell.row)?, Letter::from_index(cell.col)?))
    }

    fn cell_size(&self, bounds: &DisplayBounds) -> (f64, f64) {
        (
            bounds.width / f64::from(self.cols),
            bounds.height / f64::from(self.rows),
        )
    }

    /// Centre of `cell` on `bounds`, in global coordinates.
    pub fn cell_to_point(&self, cell: GridCell, bounds: &DisplayBounds) -> Point {
        let (cell_w, cell_h) = self.cell_size(bounds);
        Point::new(
            bounds.x + (f64::from(cell.col) + 0.5) * cell_w,
            bounds.y + (f64::from(cell.row) + 0.5) * cell_h,
        )
    }

    /// The rectangle covered by `cell` on `bounds`.
    pub fn cell_rect(&self, cell: GridCell, bounds: &DisplayBounds) -> DisplayBounds {
        let (cell_w, cell_h) = self.cell_size(bounds);
        DisplayBounds::new(
            bounds.x + f64::from(cell.col) * cell_w,
            bounds.y + f64::from(cell.row) * cell_h,
            cell_w,
            cell_h,
        )
    }

    /// Nearest-cell lookup: the cell of `bounds` that contains `point`.
    ///
    /// Returns `None` if the point is not on the display.
    pub fn cell_at(&self, point: Point, bounds: &DisplayBounds) -> Option<GridCell> {
        if !bounds.contains(point) {
            return None;
        }
        let (cell_w, cell_h) = self.cell_size(bounds);
        let col = ((point.x - bounds.x) / cell_w).floor() as i64;
        let row = ((point.y - bounds.y) / cell_h).floor() as i64;
        // Rounding can push a point on the far edge one cell too far.
        let col = col.clamp(0, i64::from(self.cols) - 1) as u8;
        let row = row.clamp(0, i64::from(self.rows) - 1) as u8;
        Some(GridCell::new(row, col))
    }

    /// Rows the overlay should draw.
    ///
    /// With no first letter every row is visible.  Once a row letter has been
    /// typed only that row is shown, or nothing if the letter is past the last row.
    pub fn visible_rows(&self, first: Option<Letter>) -> Range<u8> {
        match first {
            None => 0..self.rows,
            Some(letter) if letter.index() < self.rows => letter.index()..letter.index() + 1,
            Some(_) => 0..0,
        }
    }
}

/// Direction of a fine-tuning nudge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeDirection {
    Left,
    Right,
    Up,
    Down,
}

impl NudgeDirection {
    /// The `(dx, dy)` vector for a nudge of `step` pixels.
    ///
    /// `Down` is positive y because global coordinates grow downwards.
    pub fn offset(self, step: f64) -> (f64, f64) {
        match self {
            NudgeDirection::Left => (-step, 0.0),
            NudgeDirection::Right => (step, 0.0),
            NudgeDirection::Up => (0.0, -step),
            NudgeDirection::Down => (0.0, step),
        }
    }
}

/// Moves `point` by `(dx, dy)` without clamping.
pub fn nudge(point: Point, dx: f64, dy: f64) -> Point {
    point.offset(dx, dy)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn letter(c: char) -> Letter {
        Letter::from_char(c).expect("ASCII letter")
    }

    fn hd() -> DisplayBounds {
        DisplayBounds::new(0.0, 0.0, 1920.0, 1080.0)
    }

    #[test]
    fn test_letter_indices_run_a_to_z() {
        assert_eq!(letter('A').index(), 0);
        assert_eq!(letter('z').index(), 25);
        assert_eq!(Letter::from_index(25).map(Letter::as_char), Some('Z'));
        assert_eq!(Letter::from_index(26), None);
        assert_eq!(Letter::from_char('1'), None);
    }

    #[test]
    fn test_decode_label_g_k_is_row_6_col_10() {
        let grid = GridGeometry::default();
        let cell = grid.decode_label(letter('G'), letter('K')).unwrap();
        assert_eq!(cell, GridCell::new(6, 10));
    }

    #[test]
    fn test_decode_label_outside_small_grid_is_rejected() {
        // Arrange
        let grid = GridGeometry::new(5, 5).unwrap();

        // Act
        let result = grid.decode_label(letter('A'), letter('F'));

        // Assert
        assert_eq!(
            result,
            Err(GridError::OutOfRange {
                row: 0,
                col: 5,
                rows: 5,
                cols: 5
            })
        );
    }

    #[test]
    fn test_new_rejects_zero_and_oversized_dimensions() {
        assert!(GridGeometry::new(0, 26).is_err());
        assert!(GridGeometry::new(26, 27).is_err());
        assert!(GridGeometry::new(1, 1).is_ok());
    }

    #[test]
    fn test_cell_to_point_is_cell_centre() {
        // Arrange
        let grid = GridGeometry::default();

        // Act
        let p = grid.cell_to_point(GridCell::new(6, 10), &hd());

        // Assert
        let cell_w = 1920.0 / 26.0;
        let cell_h = 1080.0 / 26.0;
        assert!((p.x - 10.5 * cell_w).abs() < 1e-9);
        assert!((p.y - 6.5 * cell_h).abs() < 1e-9);
    }

    #[test]
    fn test_cell_to_point_respects_display_origin() {
        let grid = GridGeometry::new(2, 2).unwrap();
        let bounds = DisplayBounds::new(-1000.0, 200.0, 1000.0, 800.0);
        let p = grid.cell_to_point(GridCell::new(1, 0), &bounds);
        assert_eq!(p, Point::new(-750.0, 800.0));
    }

    #[test]
    fn test_cell_at_inverts_cell_to_point_for_every_cell() {
        let grid = GridGeometry::default();
        for bounds in [hd(), DisplayBounds::new(-1366.0, -100.0, 1366.0, 768.0)] {
            for row in 0..grid.rows() {
                for col in 0..grid.cols() {
                    let cell = GridCell::new(row, col);
                    let centre = grid.cell_to_point(cell, &bounds);
                    assert_eq!(grid.cell_at(centre, &bounds), Some(cell), "{cell:?} on {bounds:?}");
                }
            }
        }
    }

    #[test]
    fn test_cell_at_off_display_is_none() {
        let grid = GridGeometry::default();
        assert_eq!(grid.cell_at(Point::new(-1.0, 5.0), &hd()), None);
    }

    #[test]
    fn test_cell_rect_tiles_display() {
        let grid = GridGeometry::new(4, 4).unwrap();
        let rect = grid.cell_rect(GridCell::new(3, 3), &hd());
        assert_eq!(rect.x + rect.width, 1920.0);
        assert_eq!(rect.y + rect.height, 1080.0);
    }

    #[test]
    fn test_label_round_trips_through_decode() {
        let grid = GridGeometry::default();
        let (first, second) = grid.label(GridCell::new(25, 0)).unwrap();
        assert_eq!((first.as_char(), second.as_char()), ('Z', 'A'));
        assert_eq!(grid.label(GridCell::new(26, 0)), None);
    }

    #[test]
    fn test_visible_rows_narrows_to_selected_row() {
        let grid = GridGeometry::new(10, 26).unwrap();
        assert_eq!(grid.visible_rows(None), 0..10);
        assert_eq!(grid.visible_rows(Some(letter('C'))), 2..3);
        assert!(grid.visible_rows(Some(letter('Q'))).is_empty());
    }

    #[test]
    fn test_nudge_is_unclamped() {
        let p = nudge(Point::new(3.0, 3.0), -15.0, 0.0);
        assert_eq!(p, Point::new(-12.0, 3.0));
    }

    #[test]
    fn test_nudge_down_is_positive_y() {
        assert_eq!(NudgeDirection::Down.offset(15.0), (0.0, 15.0));
        assert_eq!(NudgeDirection::Left.offset(15.0), (-15.0, 0.0));
    }
}
