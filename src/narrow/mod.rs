//! Narrowphase data and logic module.

pub mod hit;

use crate::{Affine2, Fp, Vec2};

// ---------- Point & Line ---------- //

#[inline]
pub fn closest_point_on_segment(a: Vec2, b: Vec2, p: Vec2) -> (Vec2, Fp) {
    //! Returns the point on segment `a->b` closest to `p`, and its clamped coefficient along the segment.
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 { return (a, 0.0); } // degenerate segment
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    (a + ab * t, t)
}

#[inline]
pub fn seg_seg_query(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<Fp> {
    //! Returns the coefficient distance along line segment `a` an intersection occurs.
    let da = a2 - a1;
    let db = b2 - b1;

    let dot = da.x * db.y - db.x * da.y;
    if dot == 0.0 { return None; } // guard against colinearity
    let dd = dot * dot;

    let nd1 = a1 - b1;
    let tdd = db.perp_dot(nd1) * dot;
    if tdd < 0.0 || tdd > dd { return None; } // seg a guard

    let udd = da.perp_dot(nd1) * dot;
    if udd < 0.0 || udd > dd { return None; } // seg b guard

    Some(tdd / dd)
}

// ---------- Aabb & Rect ---------- //

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}
impl Aabb {
    #[inline]
    pub fn new(minx: Fp, miny: Fp, maxx: Fp, maxy: Fp) -> Aabb {
        debug_assert!(minx <= maxx);
        debug_assert!(miny <= maxy);

        Aabb {
            min: Vec2::new(minx, miny),
            max: Vec2::new(maxx, maxy),
        }
    }
    pub fn new_safe(ax: Fp, by: Fp, cx: Fp, dy: Fp) -> Aabb {
        //! Orders minimum and maximum values.
        Aabb::new(ax.min(cx), by.min(dy), ax.max(cx), by.max(dy))
    }
    pub fn from_points(points: &[Vec2]) -> Aabb {
        //! Smallest box enclosing every point. An empty slice yields a zero box at the origin.
        let (first, rest) = match points.split_first() {
            Some(split) => split,
            None => return Aabb { min: Vec2::ZERO, max: Vec2::ZERO },
        };
        rest.iter().fold(Aabb { min: *first, max: *first }, |aabb, p| Aabb {
            min: aabb.min.min(*p),
            max: aabb.max.max(*p),
        })
    }

    #[inline]
    pub fn aabb_test(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
    #[inline]
    pub fn point_test(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// A rectangle placed by a `pivot` (fractions of `size`) sitting at `position`.
///
/// Edges follow screen conventions: `top` is the smaller y, `bottom` the larger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub position: Vec2,
    pub size: Vec2,
    pub pivot: Vec2,
}
impl Rect {
    #[inline]
    pub fn new(position: Vec2, size: Vec2, pivot: Vec2) -> Rect {
        Rect { position, size: size.abs(), pivot }
    }
    #[inline]
    pub fn centered(center: Vec2, size: Vec2) -> Rect {
        Rect::new(center, size, Vec2::splat(0.5))
    }

    #[inline]
    pub fn left(&self) -> Fp {
        self.position.x - self.pivot.x * self.size.x
    }
    #[inline]
    pub fn right(&self) -> Fp {
        self.left() + self.size.x
    }
    #[inline]
    pub fn top(&self) -> Fp {
        self.position.y - self.pivot.y * self.size.y
    }
    #[inline]
    pub fn bottom(&self) -> Fp {
        self.top() + self.size.y
    }
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left() + self.size.x * 0.5, self.top() + self.size.y * 0.5)
    }

    #[inline]
    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.left(), self.top())
    }
    #[inline]
    pub fn top_right(&self) -> Vec2 {
        Vec2::new(self.right(), self.top())
    }
    #[inline]
    pub fn bottom_right(&self) -> Vec2 {
        Vec2::new(self.right(), self.bottom())
    }
    #[inline]
    pub fn bottom_left(&self) -> Vec2 {
        Vec2::new(self.left(), self.bottom())
    }
    pub fn corners(&self) -> [Vec2; 4] {
        //! Clockwise on screen, starting at the top left.
        [self.top_left(), self.top_right(), self.bottom_right(), self.bottom_left()]
    }

    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }
}

// ---------- Circle & Quad ---------- //

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub rad: Fp,
    pub pos: Vec2,
}
impl Circle {
    #[inline]
    pub fn new(rad: Fp, posx: Fp, posy: Fp) -> Circle {
        Circle {
            rad: rad.abs(),
            pos: Vec2::new(posx, posy),
        }
    }
}

/// A box in its owner's local space, carried to world space by `world`.
///
/// `world` is a copy of the owner's local-to-world matrix taken when the snapshot was made,
/// so rotation and scale inherited from ancestors apply to the corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub offset: Vec2,
    pub half_size: Vec2,
    pub world: Affine2,
}
impl Quad {
    #[inline]
    pub fn new(offset: Vec2, half_size: Vec2, world: Affine2) -> Quad {
        Quad { offset, half_size: half_size.abs(), world }
    }
    #[inline]
    pub fn axis_aligned(center: Vec2, half_size: Vec2) -> Quad {
        Quad::new(Vec2::ZERO, half_size, Affine2::from_translation(center))
    }

    #[inline]
    pub fn local_rect(&self) -> Rect {
        Rect::centered(self.offset, self.half_size * 2.0)
    }
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.world.transform_point2(self.offset)
    }
    pub fn corners(&self) -> [Vec2; 4] {
        //! World-space corners, in the winding of [`Rect::corners`].
        let local = self.local_rect().corners();
        [
            self.world.transform_point2(local[0]),
            self.world.transform_point2(local[1]),
            self.world.transform_point2(local[2]),
            self.world.transform_point2(local[3]),
        ]
    }
    pub fn axes(&self) -> [Vec2; 2] {
        //! Unit face normals in world space. Zero when the box is degenerate along that axis.
        let c = self.corners();
        [(c[1] - c[0]).normalize_or_zero(), (c[3] - c[0]).normalize_or_zero()]
    }
    pub fn to_local(&self, point: Vec2) -> Option<Vec2> {
        //! Maps a world point into the owner's local space. `None` when the transform is not invertible.
        if self.world.matrix2.determinant() == 0.0 { return None; }
        Some(self.world.inverse().transform_point2(point))
    }
}

// ---------- Intersect ---------- //

pub trait Intersect {
    fn get_bounding_box(&self) -> Aabb;

    fn point_test(&self, point: Vec2) -> bool;
    fn line_query(&self, a: Vec2, b: Vec2) -> Option<Fp>; // line entrypoint distance coeff
}

impl Intersect for Circle {
    #[inline]
    fn get_bounding_box(&self) -> Aabb {
        let splat = Vec2::splat(self.rad);
        Aabb {
            min: self.pos - splat,
            max: self.pos + splat,
        }
    }

    #[inline]
    fn point_test(&self, a: Vec2) -> bool {
        //! Return whether a circle-point intersect occurs.
        self.rad * self.rad >= self.pos.distance_squared(a)
    }
    fn line_query(&self, a: Vec2, b: Vec2) -> Option<Fp> {
        //! Returns the coefficient distance along line segment `a->b` the circle is entered. Starting inside yields `0.0`.
        if self.point_test(a) { return Some(0.0); }
        let ab = b - a;
        let len = ab.length();
        if len == 0.0 { return None; }
        let unit = ab / len;

        let ca = a - self.pos;
        let dot = unit.dot(ca);
        let rad_discr = self.rad * self.rad + dot * dot - ca.length_squared();
        if rad_discr < 0.0 { return None; } // line misses entirely

        let dist = -dot - rad_discr.sqrt();
        if dist >= 0.0 && dist <= len {
            Some(dist / len)
        } else {
            None
        }
    }
}
impl Intersect for Quad {
    fn get_bounding_box(&self) -> Aabb {
        Aabb::from_points(&self.corners())
    }

    fn point_test(&self, point: Vec2) -> bool {
        match self.to_local(point) {
            Some(local) => self.local_rect().contains(local),
            None => false,
        }
    }
    fn line_query(&self, a: Vec2, b: Vec2) -> Option<Fp> {
        //! Returns the coefficient distance along line segment `a->b` the box is entered. Starting inside yields `0.0`.
        if self.point_test(a) { return Some(0.0); }
        let c = self.corners();
        (0..4)
            .filter_map(|i| seg_seg_query(a, b, c[i], c[(i + 1) % 4]))
            .fold(None, |best: Option<Fp>, t| Some(best.map_or(t, |m| m.min(t))))
    }
}

// ---------- Shape ---------- //

/// Body-relative description of a collider's geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShapeDesc {
    Circle { offset: Vec2, radius: Fp },
    Box { offset: Vec2, half_size: Vec2 },
}
impl ShapeDesc {
    #[inline]
    pub fn circle(radius: Fp) -> ShapeDesc {
        ShapeDesc::Circle { offset: Vec2::ZERO, radius: radius.abs() }
    }
    #[inline]
    pub fn quad(half_width: Fp, half_height: Fp) -> ShapeDesc {
        ShapeDesc::Box { offset: Vec2::ZERO, half_size: Vec2::new(half_width, half_height).abs() }
    }
    #[inline]
    pub fn with_offset(self, offset: Vec2) -> ShapeDesc {
        match self {
            ShapeDesc::Circle { radius, .. } => ShapeDesc::Circle { offset, radius },
            ShapeDesc::Box { half_size, .. } => ShapeDesc::Box { offset, half_size },
        }
    }

    pub fn resolve(&self, world: &Affine2) -> Shape {
        //! Builds the world-space snapshot for an owner at `world`.
        match *self {
            ShapeDesc::Circle { offset, radius } => {
                let scale = world.matrix2.x_axis.length().max(world.matrix2.y_axis.length());
                let pos = world.transform_point2(offset);
                Shape::Circle(Circle { rad: radius * scale, pos })
            }
            ShapeDesc::Box { offset, half_size } => Shape::Box(Quad::new(offset, half_size, *world)),
        }
    }
}

/// World-space geometry of a collider for the current step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Box(Quad),
}
impl Shape {
    #[inline]
    pub fn get_circle(&self) -> Option<&Circle> {
        match self {
            Shape::Circle(c) => Some(c),
            Shape::Box(_) => None,
        }
    }
    #[inline]
    pub fn get_quad(&self) -> Option<&Quad> {
        match self {
            Shape::Box(q) => Some(q),
            Shape::Circle(_) => None,
        }
    }
    #[inline]
    pub fn center(&self) -> Vec2 {
        match self {
            Shape::Circle(c) => c.pos,
            Shape::Box(q) => q.center(),
        }
    }
}
impl Intersect for Shape {
    fn get_bounding_box(&self) -> Aabb {
        match self {
            Shape::Circle(c) => c.get_bounding_box(),
            Shape::Box(q) => q.get_bounding_box(),
        }
    }

    fn point_test(&self, point: Vec2) -> bool {
        match self {
            Shape::Circle(c) => c.point_test(point),
            Shape::Box(q) => q.point_test(point),
        }
    }
    fn line_query(&self, a: Vec2, b: Vec2) -> Option<Fp> {
        match self {
            Shape::Circle(c) => c.line_query(a, b),
            Shape::Box(q) => q.line_query(a, b),
        }
    }
}

impl From<Circle> for Shape {
    fn from(circle: Circle) -> Self {
        Shape::Circle(circle)
    }
}
impl From<Quad> for Shape {
    fn from(quad: Quad) -> Self {
        Shape::Box(quad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn line_seg_test() {
        assert_eq!(seg_seg_query(Vec2::new(0.0, 0.0), Vec2::new(3.0, 1.0), Vec2::new(2.0, 1.0), Vec2::new(2.0, -4.0)), Some(2.0 / 3.0));
        assert_eq!(seg_seg_query(Vec2::new(3.0, 1.0), Vec2::new(0.0, 0.0), Vec2::new(2.0, 1.0), Vec2::new(2.0, -4.0)), Some(1.0 / 3.0));
    }

    #[test]
    fn closest_point_clamps() {
        let (p, t) = closest_point_on_segment(Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0), Vec2::new(1.0, 3.0));
        assert_eq!(p, Vec2::new(1.0, 0.0));
        assert_eq!(t, 0.5);

        let (p, t) = closest_point_on_segment(Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0), Vec2::new(-4.0, 1.0));
        assert_eq!(p, Vec2::ZERO);
        assert_eq!(t, 0.0);

        let (p, _) = closest_point_on_segment(Vec2::ONE, Vec2::ONE, Vec2::new(5.0, 5.0));
        assert_eq!(p, Vec2::ONE);
    }

    #[test]
    fn rect_edges() {
        let r = Rect::new(Vec2::new(10.0, 10.0), Vec2::new(4.0, 2.0), Vec2::ZERO);
        assert_eq!((r.left(), r.right(), r.top(), r.bottom()), (10.0, 14.0, 10.0, 12.0));
        assert_eq!(r.center(), Vec2::new(12.0, 11.0));

        let r = Rect::centered(Vec2::ZERO, Vec2::new(2.0, 2.0));
        assert_eq!(r.corners(), [Vec2::new(-1.0, -1.0), Vec2::new(1.0, -1.0), Vec2::new(1.0, 1.0), Vec2::new(-1.0, 1.0)]);
        assert!(r.contains(Vec2::new(1.0, 1.0)));
        assert!(!r.contains(Vec2::new(1.01, 0.0)));
    }

    #[test]
    fn circle_seg_test() {
        let c = Circle::new(0.5, 0.5, 0.5);

        assert!(c.line_query(Vec2::new(0.0, 1.5), Vec2::new(3.0, 1.5)).is_none());
        assert!(c.line_query(Vec2::new(3.0, -1.0), Vec2::new(0.0, -1.0)).is_none());
        assert!(c.line_query(Vec2::new(-0.5, -0.5), Vec2::new(-1.0, -1.0)).is_none());

        assert_eq!(c.line_query(Vec2::new(-1.0, 0.5), Vec2::new(3.0, 0.5)), Some(0.25));
        assert_eq!(c.line_query(Vec2::new(0.5, 0.5), Vec2::new(3.0, 0.5)), Some(0.0));
        assert!(c.line_query(Vec2::new(3.0, 1.0), Vec2::new(0.0, 0.0)).is_some());
    }

    #[test]
    fn rotated_quad_corners() {
        let world = Affine2::from_scale_angle_translation(Vec2::new(2.0, 1.0), std::f32::consts::FRAC_PI_2 as Fp, Vec2::new(5.0, 0.0));
        let quad = Quad::new(Vec2::ZERO, Vec2::new(1.0, 1.0), world);
        let aabb = quad.get_bounding_box();

        // the x scale ends up along y after a quarter turn
        assert_relative_eq!(aabb.min.x, 4.0, epsilon = 1e-5);
        assert_relative_eq!(aabb.max.x, 6.0, epsilon = 1e-5);
        assert_relative_eq!(aabb.min.y, -2.0, epsilon = 1e-5);
        assert_relative_eq!(aabb.max.y, 2.0, epsilon = 1e-5);

        assert!(quad.point_test(Vec2::new(5.0, 1.9)));
        assert!(!quad.point_test(Vec2::new(6.5, 0.0)));
    }

    #[test]
    fn quad_line_query() {
        let quad = Quad::axis_aligned(Vec2::ZERO, Vec2::new(1.0, 1.0));
        assert_relative_eq!(quad.line_query(Vec2::new(-3.0, 0.0), Vec2::new(1.0, 0.0)).unwrap(), 0.5);
        assert_eq!(quad.line_query(Vec2::new(0.0, 0.0), Vec2::new(9.0, 0.0)), Some(0.0));
        assert!(quad.line_query(Vec2::new(-3.0, 2.0), Vec2::new(3.0, 2.0)).is_none());
    }

    #[test]
    fn degenerate_quad_contains_nothing() {
        let world = Affine2::from_scale_angle_translation(Vec2::new(0.0, 1.0), 0.0, Vec2::ZERO);
        let quad = Quad::new(Vec2::ZERO, Vec2::ONE, world);
        assert!(!quad.point_test(Vec2::ZERO));
        assert_eq!(quad.axes()[0], Vec2::ZERO);
    }

    #[test]
    fn desc_resolves_with_scale_and_offset() {
        let world = Affine2::from_scale_angle_translation(Vec2::new(2.0, 3.0), 0.0, Vec2::new(1.0, 1.0));
        let shape = ShapeDesc::circle(1.0).with_offset(Vec2::new(1.0, 0.0)).resolve(&world);
        assert_eq!(shape, Shape::Circle(Circle { rad: 3.0, pos: Vec2::new(3.0, 1.0) }));

        let shape = ShapeDesc::quad(1.0, 2.0).resolve(&world);
        assert_eq!(shape.center(), Vec2::new(1.0, 1.0));
        assert!(shape.get_circle().is_none());
        assert_eq!(shape.get_quad().map(|q| q.half_size), Some(Vec2::new(1.0, 2.0)));
    }
}
