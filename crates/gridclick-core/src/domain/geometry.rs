//! Points and display rectangles in the global desktop coordinate space.
//!
//! Every coordinate in GridClick is expressed in the same space the operating
//! system uses for pointer events: the origin is the top-left corner of the
//! primary display, x grows to the right and y grows downwards.  Secondary
//! displays may sit at negative offsets.

/// An absolute position in global desktop coordinates.
///
/// Fractional values are kept so that cell centres on displays whose size is
/// not a multiple of the grid dimension stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns this point moved by `(dx, dy)`.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// The rectangle a single display occupies in global desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBounds {
    /// X coordinate of the top-left corner (may be negative).
    pub x: f64,
    /// Y coordinate of the top-left corner (may be negative).
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl DisplayBounds {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns `true` if `point` lies inside this display.
    ///
    /// The left and top edges are inclusive, the right and bottom edges are
    /// exclusive, so a point on the seam between two side-by-side displays
    /// belongs to exactly one of them.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    /// Returns the top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Returns the first display in `displays` that contains `point`.
pub fn display_at_point(displays: &[DisplayBounds], point: Point) -> Option<DisplayBounds> {
    displays.iter().copied().find(|d| d.contains(point))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn primary() -> DisplayBounds {
        DisplayBounds::new(0.0, 0.0, 1920.0, 1080.0)
    }

    fn left_secondary() -> DisplayBounds {
        DisplayBounds::new(-1280.0, 0.0, 1280.0, 1024.0)
    }

    #[test]
    fn test_contains_includes_top_left_corner() {
        assert!(primary().contains(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_contains_excludes_right_and_bottom_edges() {
        let d = primary();
        assert!(!d.contains(Point::new(1920.0, 10.0)));
        assert!(!d.contains(Point::new(10.0, 1080.0)));
        assert!(d.contains(Point::new(1919.5, 1079.5)));
    }

    #[test]
    fn test_display_at_point_picks_display_with_negative_origin() {
        // Arrange
        let displays = [primary(), left_secondary()];

        // Act
        let found = display_at_point(&displays, Point::new(-10.0, 500.0));

        // Assert
        assert_eq!(found, Some(left_secondary()));
    }

    #[test]
    fn test_display_at_point_seam_belongs_to_right_hand_display() {
        let displays = [left_secondary(), primary()];
        assert_eq!(display_at_point(&displays, Point::new(0.0, 10.0)), Some(primary()));
    }

    #[test]
    fn test_display_at_point_returns_none_in_gap() {
        let displays = [primary()];
        assert_eq!(display_at_point(&displays, Point::new(5000.0, 5000.0)), None);
    }

    #[test]
    fn test_offset_is_plain_vector_addition() {
        let p = Point::new(10.0, 20.0).offset(-15.0, 15.0);
        assert_eq!(p, Point::new(-5.0, 35.0));
    }
}
