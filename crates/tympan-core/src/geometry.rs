//! Integer lattice geometry for the simulation grid.
//!
//! Scene geometry is axis-aligned and lives on an integer grid whose
//! unit is one grid spacing. The y axis grows toward [`Direction::Bottom`],
//! matching the screen-space convention of the scene editors that
//! produce these descriptions.

use std::fmt;
use std::ops::{Add, Sub};

/// A point on the simulation grid, in grid-spacing units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate; grows downward.
    pub y: i32,
}

impl Point {
    /// Construct a point from its coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component along the given axis.
    pub fn along(self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Extent of a rectangle in grid cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    /// Cells along x.
    pub width: usize,
    /// Cells along y.
    pub height: usize,
}

impl Size {
    /// Construct a size from its extents.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Extent along the given axis.
    pub fn along(self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }

    /// Total cell count.
    pub fn area(self) -> usize {
        self.width * self.height
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An axis-aligned rectangle on the grid.
///
/// Covers the half-open cell range `[top_left, bottom_right)` on both
/// axes, where `bottom_right = top_left + size`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Corner with the smallest coordinates.
    pub top_left: Point,
    /// Extent in cells.
    pub size: Size,
}

impl Rect {
    /// Construct a rectangle from its top-left corner and size.
    pub fn new(top_left: Point, size: Size) -> Self {
        Self { top_left, size }
    }

    /// Corner one past the largest contained cell.
    pub fn bottom_right(&self) -> Point {
        Point::new(
            self.top_left.x + self.size.width as i32,
            self.top_left.y + self.size.height as i32,
        )
    }

    /// Half-open coordinate range `[start, end)` along the given axis.
    pub fn range(&self, axis: Axis) -> (i32, i32) {
        (self.top_left.along(axis), self.bottom_right().along(axis))
    }

    /// Whether the cell at `p` lies inside this rectangle.
    pub fn contains(&self, p: Point) -> bool {
        let br = self.bottom_right();
        p.x >= self.top_left.x && p.x < br.x && p.y >= self.top_left.y && p.y < br.y
    }

    /// The overlap of the two projected ranges along `axis`, if any.
    ///
    /// Touching ranges (shared endpoint) yield `None`; a boundary needs
    /// a run of shared cells, not a shared corner.
    pub fn projected_overlap(&self, other: &Rect, axis: Axis) -> Option<(i32, i32)> {
        let (a0, a1) = self.range(axis);
        let (b0, b1) = other.range(axis);
        let lo = a0.max(b0);
        let hi = a1.min(b1);
        if lo < hi {
            Some((lo, hi))
        } else {
            None
        }
    }
}

/// One of the four sides of a rectangular domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Negative x.
    Left,
    /// Positive x.
    Right,
    /// Negative y.
    Top,
    /// Positive y.
    Bottom,
}

impl Direction {
    /// All four directions, in a fixed traversal order.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Top,
        Direction::Bottom,
    ];

    /// The direction pointing the other way.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Top => Direction::Bottom,
            Direction::Bottom => Direction::Top,
        }
    }

    /// The axis this direction points along.
    pub fn axis(self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::X,
            Direction::Top | Direction::Bottom => Axis::Y,
        }
    }

    /// Whether this direction points toward smaller coordinates.
    pub fn is_negative(self) -> bool {
        matches!(self, Direction::Left | Direction::Top)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Top => "top",
            Direction::Bottom => "bottom",
        };
        write!(f, "{s}")
    }
}

/// A grid axis. Derivatives are taken along one axis at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

impl Axis {
    /// The other axis.
    pub fn orthogonal(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    /// The directions pointing along this axis, negative side first.
    pub fn directions(self) -> (Direction, Direction) {
        match self {
            Axis::X => (Direction::Left, Direction::Right),
            Axis::Y => (Direction::Top, Direction::Bottom),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_ranges_and_containment() {
        let r = Rect::new(Point::new(2, -3), Size::new(4, 6));
        assert_eq!(r.bottom_right(), Point::new(6, 3));
        assert_eq!(r.range(Axis::X), (2, 6));
        assert_eq!(r.range(Axis::Y), (-3, 3));
        assert!(r.contains(Point::new(2, -3)));
        assert!(r.contains(Point::new(5, 2)));
        assert!(!r.contains(Point::new(6, 0)));
        assert!(!r.contains(Point::new(0, 0)));
    }

    #[test]
    fn touching_rects_have_no_projected_overlap() {
        let a = Rect::new(Point::new(0, 0), Size::new(4, 4));
        let b = Rect::new(Point::new(4, 4), Size::new(4, 4));
        assert_eq!(a.projected_overlap(&b, Axis::X), None);
        assert_eq!(a.projected_overlap(&b, Axis::Y), None);
    }

    #[test]
    fn partial_projected_overlap() {
        let a = Rect::new(Point::new(0, 0), Size::new(4, 4));
        let b = Rect::new(Point::new(4, 2), Size::new(4, 4));
        assert_eq!(a.projected_overlap(&b, Axis::Y), Some((2, 4)));
    }

    #[test]
    fn direction_opposites_pair_up() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
            assert_eq!(d.axis(), d.opposite().axis());
            assert_ne!(d.is_negative(), d.opposite().is_negative());
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn rects() -> impl Strategy<Value = Rect> {
            (-100i32..100, -100i32..100, 1usize..50, 1usize..50)
                .prop_map(|(x, y, w, h)| Rect::new(Point::new(x, y), Size::new(w, h)))
        }

        proptest! {
            #[test]
            fn projected_overlap_is_symmetric(a in rects(), b in rects()) {
                for axis in [Axis::X, Axis::Y] {
                    prop_assert_eq!(
                        a.projected_overlap(&b, axis),
                        b.projected_overlap(&a, axis)
                    );
                }
            }

            #[test]
            fn overlap_lies_within_both_ranges(a in rects(), b in rects()) {
                for axis in [Axis::X, Axis::Y] {
                    if let Some((lo, hi)) = a.projected_overlap(&b, axis) {
                        let (a0, a1) = a.range(axis);
                        let (b0, b1) = b.range(axis);
                        prop_assert!(lo < hi);
                        prop_assert!(lo >= a0 && hi <= a1);
                        prop_assert!(lo >= b0 && hi <= b1);
                    }
                }
            }

            #[test]
            fn contains_respects_ranges(r in rects(), x in -200i32..200, y in -200i32..200) {
                let p = Point::new(x, y);
                let (x0, x1) = r.range(Axis::X);
                let (y0, y1) = r.range(Axis::Y);
                let expected = x >= x0 && x < x1 && y >= y0 && y < y1;
                prop_assert_eq!(r.contains(p), expected);
            }
        }
    }
}
