#![forbid(unsafe_code)]

//! World-space and screen-space geometry primitives.
//!
//! World coordinates are integer units with the origin at the top-left corner
//! of the canvas. Screen coordinates are fractional pixels relative to the
//! viewport origin. The camera (in `placegrid-layout`) converts between them.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Points and deltas
// ---------------------------------------------------------------------------

/// A point in integer world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: i32,
    pub y: i32,
}

impl WorldPoint {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A fractional point in world units, as produced by the camera.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f64,
    pub y: f64,
}

impl WorldPos {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The integer world point at or before this position on both axes.
    #[must_use]
    pub fn floor(self) -> WorldPoint {
        WorldPoint::new(
            saturating_f64_to_i32(self.x.floor()),
            saturating_f64_to_i32(self.y.floor()),
        )
    }
}

impl From<WorldPoint> for WorldPos {
    fn from(point: WorldPoint) -> Self {
        Self::new(f64::from(point.x), f64::from(point.y))
    }
}

/// Fractional displacement in world units, before snapping.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldDelta {
    pub dx: f64,
    pub dy: f64,
}

impl WorldDelta {
    #[must_use]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// A point in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Component-wise difference `self - origin`.
    #[must_use]
    pub fn delta_from(self, origin: Self) -> (f64, f64) {
        (self.x - origin.x, self.y - origin.y)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

// ---------------------------------------------------------------------------
// Sizes and rectangles
// ---------------------------------------------------------------------------

/// Dimensions of the world canvas in world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldSize {
    pub width: i32,
    pub height: i32,
}

impl WorldSize {
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// The whole canvas as a rectangle anchored at the origin.
    #[must_use]
    pub const fn bounds(self) -> ZoneRect {
        ZoneRect::new(0, 0, self.width, self.height)
    }
}

/// Viewport dimensions in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn center(self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }
}

/// A rectangle in screen pixels (derived view output).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Axis-aligned zone bounds in world units.
///
/// Edges are treated as open intervals for overlap: two rectangles that only
/// share an edge do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ZoneRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ZoneRect {
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from its four edges.
    #[inline]
    #[must_use]
    pub const fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    #[inline]
    #[must_use]
    pub const fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    #[must_use]
    pub const fn top(&self) -> i32 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    #[must_use]
    pub const fn position(&self) -> WorldPoint {
        WorldPoint::new(self.x, self.y)
    }

    /// Same size, new top-left corner.
    #[must_use]
    pub const fn with_position(self, position: WorldPoint) -> Self {
        Self::new(position.x, position.y, self.width, self.height)
    }

    /// Open-interval overlap test. Edge-touching rectangles do not overlap.
    #[inline]
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Whether `self` lies fully inside `outer` (edges may coincide).
    #[must_use]
    pub const fn is_within(&self, outer: &Self) -> bool {
        self.left() >= outer.left()
            && self.top() >= outer.top()
            && self.right() <= outer.right()
            && self.bottom() <= outer.bottom()
    }

    /// Half-open containment for fractional world coordinates.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= f64::from(self.left())
            && x < f64::from(self.right())
            && y >= f64::from(self.top())
            && y < f64::from(self.bottom())
    }

    /// World coordinates of one corner.
    #[must_use]
    pub const fn corner(&self, corner: Corner) -> WorldPoint {
        match corner {
            Corner::TopLeft => WorldPoint::new(self.left(), self.top()),
            Corner::TopRight => WorldPoint::new(self.right(), self.top()),
            Corner::BottomLeft => WorldPoint::new(self.left(), self.bottom()),
            Corner::BottomRight => WorldPoint::new(self.right(), self.bottom()),
        }
    }

    /// Whether position and size are all multiples of `pitch`.
    #[must_use]
    pub const fn is_on_grid(&self, pitch: GridPitch) -> bool {
        let p = pitch.get();
        self.x % p == 0 && self.y % p == 0 && self.width % p == 0 && self.height % p == 0
    }
}

impl fmt::Display for ZoneRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})+{}x{}",
            self.x, self.y, self.width, self.height
        )
    }
}

// ---------------------------------------------------------------------------
// Corners
// ---------------------------------------------------------------------------

/// Resize handle position on a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    /// Whether dragging this corner moves the left edge (otherwise the right).
    #[must_use]
    pub const fn moves_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    /// Whether dragging this corner moves the top edge (otherwise the bottom).
    #[must_use]
    pub const fn moves_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }

    /// The diagonally opposite corner, which stays fixed during a resize.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::TopLeft => Self::BottomRight,
            Self::TopRight => Self::BottomLeft,
            Self::BottomLeft => Self::TopRight,
            Self::BottomRight => Self::TopLeft,
        }
    }
}

// ---------------------------------------------------------------------------
// Grid pitch
// ---------------------------------------------------------------------------

/// Fixed snapping unit for zone positions and sizes. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct GridPitch(i32);

impl GridPitch {
    pub fn new(raw: i32) -> Result<Self, GeometryError> {
        if raw <= 0 {
            return Err(GeometryError::NonPositivePitch { pitch: raw });
        }
        Ok(Self(raw))
    }

    /// Build a pitch, raising non-positive values to 1.
    #[must_use]
    pub const fn clamped(raw: i32) -> Self {
        if raw < 1 { Self(1) } else { Self(raw) }
    }

    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Length of `cells` grid steps in world units.
    #[must_use]
    pub const fn cells(self, cells: i32) -> i32 {
        self.0.saturating_mul(cells)
    }

    /// Round a fractional world length to the nearest multiple of the pitch.
    #[must_use]
    pub fn snap(self, value: f64) -> i32 {
        let p = f64::from(self.0);
        let steps = (value / p).round();
        saturating_f64_to_i32(steps * p)
    }

    /// Index of the grid cell containing `value` (floor division).
    #[must_use]
    pub fn cell_index(self, value: f64) -> i32 {
        saturating_f64_to_i32((value / f64::from(self.0)).floor())
    }

    /// Round an integer world length down to a multiple of the pitch.
    #[must_use]
    pub const fn floor(self, value: i32) -> i32 {
        value.div_euclid(self.0) * self.0
    }

    /// Round an integer world length up to a multiple of the pitch.
    #[must_use]
    pub const fn ceil(self, value: i32) -> i32 {
        let floored = self.floor(value);
        if floored == value {
            value
        } else {
            floored.saturating_add(self.0)
        }
    }
}

impl TryFrom<i32> for GridPitch {
    type Error = GeometryError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<GridPitch> for i32 {
    fn from(pitch: GridPitch) -> Self {
        pitch.0
    }
}

fn saturating_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        0
    } else {
        // `as` saturates at the i32 bounds.
        value as i32
    }
}

/// Geometry construction errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    NonPositivePitch { pitch: i32 },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositivePitch { pitch } => {
                write!(f, "grid pitch must be > 0 (got {pitch})")
            }
        }
    }
}

impl std::error::Error for GeometryError {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pitch(raw: i32) -> GridPitch {
        GridPitch::new(raw).expect("test pitch must be positive")
    }

    #[test]
    fn edge_touching_rects_do_not_overlap() {
        let a = ZoneRect::new(0, 0, 40, 40);
        let right = ZoneRect::new(40, 0, 40, 40);
        let below = ZoneRect::new(0, 40, 40, 40);
        let diagonal = ZoneRect::new(40, 40, 20, 20);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
        assert!(!a.overlaps(&diagonal));
        assert!(a.overlaps(&ZoneRect::new(20, 20, 40, 40)));
        assert!(a.overlaps(&ZoneRect::new(10, 10, 10, 10)));
    }

    #[test]
    fn containment_is_half_open() {
        let r = ZoneRect::new(20, 20, 40, 40);
        assert!(r.contains(20.0, 20.0));
        assert!(r.contains(59.9, 59.9));
        assert!(!r.contains(60.0, 30.0));
        assert!(!r.contains(19.9, 30.0));
    }

    #[test]
    fn corners_and_opposites() {
        let r = ZoneRect::new(20, 40, 60, 80);
        assert_eq!(r.corner(Corner::TopLeft), WorldPoint::new(20, 40));
        assert_eq!(r.corner(Corner::BottomRight), WorldPoint::new(80, 120));
        for corner in Corner::ALL {
            let opposite = corner.opposite();
            assert_ne!(corner.moves_left(), opposite.moves_left());
            assert_ne!(corner.moves_top(), opposite.moves_top());
            assert_eq!(opposite.opposite(), corner);
        }
    }

    #[test]
    fn pitch_rejects_non_positive() {
        assert_eq!(
            GridPitch::new(0),
            Err(GeometryError::NonPositivePitch { pitch: 0 })
        );
        assert!(GridPitch::new(-4).is_err());
        assert!(serde_json::from_str::<GridPitch>("0").is_err());
        assert_eq!(
            serde_json::from_str::<GridPitch>("20").expect("valid pitch"),
            pitch(20)
        );
    }

    #[test]
    fn snap_rounds_to_nearest_step() {
        let p = pitch(20);
        assert_eq!(p.snap(0.0), 0);
        assert_eq!(p.snap(9.9), 0);
        assert_eq!(p.snap(10.1), 20);
        assert_eq!(p.snap(-10.1), -20);
        assert_eq!(p.snap(47.0), 40);
        assert_eq!(p.snap(f64::NAN), 0);
    }

    #[test]
    fn floor_ceil_and_cells() {
        let p = pitch(20);
        assert_eq!(p.floor(39), 20);
        assert_eq!(p.floor(-1), -20);
        assert_eq!(p.ceil(41), 60);
        assert_eq!(p.ceil(40), 40);
        assert_eq!(p.cell_index(59.9), 2);
        assert_eq!(p.cell_index(-0.5), -1);
        assert_eq!(p.cells(3), 60);
    }

    proptest! {
        #[test]
        fn snapped_values_are_pitch_multiples(raw in 1i32..128, value in -1.0e6f64..1.0e6) {
            let p = pitch(raw);
            prop_assert_eq!(p.snap(value) % raw, 0);
        }

        #[test]
        fn overlap_is_symmetric(
            ax in -50i32..50, ay in -50i32..50, aw in 1i32..60, ah in 1i32..60,
            bx in -50i32..50, by in -50i32..50, bw in 1i32..60, bh in 1i32..60,
        ) {
            let a = ZoneRect::new(ax, ay, aw, ah);
            let b = ZoneRect::new(bx, by, bw, bh);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }
    }
}
