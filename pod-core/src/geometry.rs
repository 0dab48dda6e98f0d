//! Snap geometry and 2D affine transforms.
//!
//! Everything in this module is pure: the snap functions take the previous
//! snap memory as input and hand back the new memory together with an
//! edge-triggered `crossed` flag, which is what haptic feedback keys off.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Distance in pixels from the container center within which an axis snaps.
pub const POSITION_SNAP_THRESHOLD: f64 = 5.0;

/// Angular distance in radians (~2.9°) within which a rotation snaps.
pub const ROTATION_SNAP_THRESHOLD: f64 = 0.05;

/// Smallest allowed item scale.
pub const MIN_SCALE: f64 = 0.5;

/// Largest allowed item scale.
pub const MAX_SCALE: f64 = 5.0;

/// A point (or displacement) in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate, pixels from the left.
    pub x: f64,
    /// Y coordinate, pixels from the top.
    pub y: f64,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Size {
    /// Create a size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Center of a rectangle of this size anchored at the origin.
    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether both dimensions are positive and finite.
    #[must_use]
    pub fn is_drawable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Fit `natural` into `container` preserving aspect ratio, then shrink by `fill_ratio`.
///
/// Degenerate natural sizes are returned unchanged.
#[must_use]
pub fn fit_size(natural: Size, container: Size, fill_ratio: f64) -> Size {
    if !natural.is_drawable() || !container.is_drawable() {
        return natural;
    }
    let scale =
        (container.width / natural.width).min(container.height / natural.height) * fill_ratio;
    Size::new(natural.width * scale, natural.height * scale)
}

/// Per-axis snap memory for position snapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisSnap {
    /// X axis is currently pinned to the center.
    pub x: bool,
    /// Y axis is currently pinned to the center.
    pub y: bool,
}

/// Outcome of [`snap_position`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSnap {
    /// Position after snapping.
    pub position: Point,
    /// Snap memory to carry into the next evaluation.
    pub state: AxisSnap,
    /// True when at least one axis went from free to snapped.
    pub crossed: bool,
}

/// Snap a candidate position to the container center, each axis independently.
#[must_use]
pub fn snap_position(candidate: Point, center: Point, previous: AxisSnap) -> PositionSnap {
    let (x, snapped_x) = snap_axis(candidate.x, center.x);
    let (y, snapped_y) = snap_axis(candidate.y, center.y);

    PositionSnap {
        position: Point::new(x, y),
        state: AxisSnap {
            x: snapped_x,
            y: snapped_y,
        },
        crossed: (snapped_x && !previous.x) || (snapped_y && !previous.y),
    }
}

fn snap_axis(value: f64, center: f64) -> (f64, bool) {
    if (value - center).abs() < POSITION_SNAP_THRESHOLD {
        (center, true)
    } else {
        (value, false)
    }
}

/// The four angles a rotation can snap to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardinalAngle {
    /// 0°.
    Zero,
    /// 90°.
    Quarter,
    /// 180°.
    Half,
    /// 270°.
    ThreeQuarters,
}

impl CardinalAngle {
    /// All cardinal angles in ascending order.
    pub const ALL: [Self; 4] = [Self::Zero, Self::Quarter, Self::Half, Self::ThreeQuarters];

    /// The angle in radians.
    #[must_use]
    pub fn radians(self) -> f64 {
        match self {
            Self::Zero => 0.0,
            Self::Quarter => FRAC_PI_2,
            Self::Half => PI,
            Self::ThreeQuarters => 3.0 * FRAC_PI_2,
        }
    }
}

/// Outcome of [`snap_rotation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationSnap {
    /// Rotation after snapping, in `[0, 2π)`.
    pub rotation: f64,
    /// Snap memory to carry into the next evaluation.
    pub snapped: Option<CardinalAngle>,
    /// True when the rotation snapped to an angle other than the remembered one.
    pub crossed: bool,
}

/// Normalize an angle into `[0, 2π)`. Non-finite input maps to zero.
#[must_use]
pub fn normalize_angle(radians: f64) -> f64 {
    if !radians.is_finite() {
        return 0.0;
    }
    let normalized = radians.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if normalized >= TAU {
        0.0
    } else {
        normalized
    }
}

/// Shortest distance between two angles on the circle.
#[must_use]
pub fn circular_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs();
    diff.min(TAU - diff)
}

/// Snap a candidate rotation to the nearest cardinal angle when close enough.
#[must_use]
pub fn snap_rotation(candidate: f64, previous: Option<CardinalAngle>) -> RotationSnap {
    let normalized = normalize_angle(candidate);

    let nearest = CardinalAngle::ALL
        .iter()
        .map(|&angle| (angle, circular_distance(normalized, angle.radians())))
        .min_by(|a, b| a.1.total_cmp(&b.1));

    match nearest {
        Some((angle, distance)) if distance < ROTATION_SNAP_THRESHOLD => RotationSnap {
            rotation: angle.radians(),
            snapped: Some(angle),
            crossed: previous != Some(angle),
        },
        _ => RotationSnap {
            rotation: normalized,
            snapped: None,
            crossed: false,
        },
    }
}

/// Clamp a scale into `[MIN_SCALE, MAX_SCALE]`. NaN maps to 1.0.
#[must_use]
pub fn clamp_scale(candidate: f64) -> f64 {
    if candidate.is_nan() {
        return 1.0;
    }
    candidate.clamp(MIN_SCALE, MAX_SCALE)
}

/// A 2D affine transform.
///
/// Maps `(x, y)` to `(a·x + c·y + tx, b·x + d·y + ty)`, the same layout as an
/// SVG `matrix(a b c d tx ty)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    /// Row 0, column 0.
    pub a: f64,
    /// Row 1, column 0.
    pub b: f64,
    /// Row 0, column 1.
    pub c: f64,
    /// Row 1, column 1.
    pub d: f64,
    /// X translation.
    pub tx: f64,
    /// Y translation.
    pub ty: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Uniform scale around the origin.
    #[must_use]
    pub fn scale(factor: f64) -> Self {
        Self {
            a: factor,
            d: factor,
            ..Self::IDENTITY
        }
    }

    /// Rotation around the origin (clockwise on a y-down canvas).
    #[must_use]
    pub fn rotate(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Translation.
    #[must_use]
    pub fn translate(dx: f64, dy: f64) -> Self {
        Self {
            tx: dx,
            ty: dy,
            ..Self::IDENTITY
        }
    }

    /// The transform that applies `self` first, then `next`.
    #[must_use]
    pub fn then(self, next: Self) -> Self {
        Self {
            a: next.a * self.a + next.c * self.b,
            b: next.b * self.a + next.d * self.b,
            c: next.a * self.c + next.c * self.d,
            d: next.b * self.c + next.d * self.d,
            tx: next.a * self.tx + next.c * self.ty + next.tx,
            ty: next.b * self.tx + next.d * self.ty + next.ty,
        }
    }

    /// Scale, then rotate, both around the origin.
    #[must_use]
    pub fn scale_then_rotate(scale: f64, rotation: f64) -> Self {
        Self::scale(scale).then(Self::rotate(rotation))
    }

    /// Map a point through this transform.
    #[must_use]
    pub fn apply(self, point: Point) -> Point {
        Point::new(
            self.a * point.x + self.c * point.y + self.tx,
            self.b * point.x + self.d * point.y + self.ty,
        )
    }

    /// The inverse transform, if the matrix is invertible.
    #[must_use]
    pub fn invert(self) -> Option<Self> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < f64::EPSILON || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Self {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            tx: (self.c * self.ty - self.d * self.tx) * inv,
            ty: (self.b * self.tx - self.a * self.ty) * inv,
        })
    }

    /// Component-wise comparison within `epsilon`.
    #[must_use]
    pub fn approx_eq(self, other: Self, epsilon: f64) -> bool {
        [
            (self.a, other.a),
            (self.b, other.b),
            (self.c, other.c),
            (self.d, other.d),
            (self.tx, other.tx),
            (self.ty, other.ty),
        ]
        .iter()
        .all(|(l, r)| (l - r).abs() <= epsilon)
    }

    /// Whether this is (numerically) the identity.
    #[must_use]
    pub fn is_identity(self) -> bool {
        self.approx_eq(Self::IDENTITY, 1e-12)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    const CENTER: Point = Point::new(100.0, 100.0);

    #[test]
    fn test_position_snaps_each_axis_independently() {
        let snap = snap_position(Point::new(103.0, 140.0), CENTER, AxisSnap::default());
        assert_eq!(snap.position, Point::new(100.0, 140.0));
        assert!(snap.state.x);
        assert!(!snap.state.y);
        assert!(snap.crossed);
    }

    #[test]
    fn test_position_threshold_is_exclusive() {
        let snap = snap_position(Point::new(105.0, 95.0), CENTER, AxisSnap::default());
        assert_eq!(snap.position, Point::new(105.0, 95.0));
        assert!(!snap.crossed);
    }

    #[test]
    fn test_position_crossing_is_edge_triggered() {
        let first = snap_position(Point::new(102.0, 98.0), CENTER, AxisSnap::default());
        assert!(first.crossed);
        let second = snap_position(Point::new(101.0, 99.0), CENTER, first.state);
        assert!(!second.crossed);
        assert_eq!(second.position, CENTER);
    }

    #[test]
    fn test_position_second_axis_crossing_fires_again() {
        let first = snap_position(Point::new(102.0, 150.0), CENTER, AxisSnap::default());
        assert!(first.crossed);
        let second = snap_position(Point::new(102.0, 101.0), CENTER, first.state);
        assert!(second.crossed);
    }

    #[test]
    fn test_rotation_snaps_to_cardinal() {
        let snap = snap_rotation(FRAC_PI_2 + 0.03, None);
        assert_eq!(snap.rotation, FRAC_PI_2);
        assert_eq!(snap.snapped, Some(CardinalAngle::Quarter));
        assert!(snap.crossed);

        let again = snap_rotation(FRAC_PI_2 - 0.02, snap.snapped);
        assert!(!again.crossed);
    }

    #[test]
    fn test_rotation_wraps_near_full_turn() {
        let snap = snap_rotation(TAU - 0.01, None);
        assert_eq!(snap.rotation, 0.0);
        assert_eq!(snap.snapped, Some(CardinalAngle::Zero));
    }

    #[test]
    fn test_rotation_free_clears_memory() {
        let snap = snap_rotation(1.0, Some(CardinalAngle::Zero));
        assert_eq!(snap.rotation, 1.0);
        assert_eq!(snap.snapped, None);
        assert!(!snap.crossed);
    }

    #[test]
    fn test_negative_rotation_is_normalized() {
        let snap = snap_rotation(-1.0, None);
        assert!((snap.rotation - (TAU - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_never_returns_full_turn() {
        assert!(normalize_angle(-1e-20) < TAU);
        assert_eq!(normalize_angle(f64::NAN), 0.0);
        assert_eq!(normalize_angle(TAU), 0.0);
    }

    #[test]
    fn test_clamp_scale_bounds() {
        assert_eq!(clamp_scale(0.1), MIN_SCALE);
        assert_eq!(clamp_scale(12.0), MAX_SCALE);
        assert_eq!(clamp_scale(2.5), 2.5);
        assert_eq!(clamp_scale(f64::INFINITY), MAX_SCALE);
        assert_eq!(clamp_scale(f64::NAN), 1.0);
    }

    #[test]
    fn test_scale_then_rotate_identity() {
        assert!(Affine::scale_then_rotate(1.0, 0.0).is_identity());
    }

    #[test]
    fn test_scale_then_rotate_order() {
        let t = Affine::scale_then_rotate(2.0, FRAC_PI_2);
        let p = t.apply(Point::new(1.0, 0.0));
        assert!((p.x - 0.0).abs() < 1e-12);
        assert!((p.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_invert_round_trip() {
        let t = Affine::scale_then_rotate(1.5, 0.7).then(Affine::translate(30.0, -12.0));
        let inv = t.invert().expect("invertible");
        assert!(t.then(inv).is_identity());
    }

    #[test]
    fn test_fit_size_preserves_aspect() {
        let fitted = fit_size(Size::new(400.0, 200.0), Size::new(200.0, 200.0), 0.8);
        assert_eq!(fitted, Size::new(160.0, 80.0));
    }

    #[test]
    fn test_fit_size_degenerate_passthrough() {
        let fitted = fit_size(Size::new(0.0, 10.0), Size::new(200.0, 200.0), 0.8);
        assert_eq!(fitted, Size::new(0.0, 10.0));
    }
}
