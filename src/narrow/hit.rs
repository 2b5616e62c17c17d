//! Overlap tests that also produce a push-out, dispatched over every pair of shape kinds.

use super::{closest_point_on_segment, Circle, Intersect, Quad, Shape};
use crate::{config::CollisionConfig, Fp, Vec2};
use approx::abs_diff_eq;

/// A positive hit test, seen from the tested shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Subtracting this from the tested shape's velocity resolves the overlap.
    /// `None` when the shapes overlap but no push-out is meaningful.
    pub reflect: Option<Vec2>,
    /// Fraction of the step's motion at which contact began. Only circle pairs estimate it, others report `1.0`.
    /// Informational: corrections are derived from `reflect` alone.
    pub toi: Fp,
    /// Estimated point of contact, or zero when there is none to speak of.
    pub contact: Vec2,
}
impl Hit {
    #[inline]
    pub fn invert(self) -> Hit {
        //! The same hit as seen by the other shape.
        Hit { reflect: self.reflect.map(|r| -r), ..self }
    }
}

// ---------- Circle ---------- //

pub fn circle_circle_hit(a: &Circle, b: &Circle, vel: Vec2, config: &CollisionConfig) -> Option<Hit> {
    //! Hit test of `a`, moving by `vel` this step, against `b`.
    let dist = a.pos.distance(b.pos);
    let sum = a.rad + b.rad;

    let reflect = if abs_diff_eq!(dist, sum, epsilon = config.tangent_epsilon) {
        Vec2::ZERO // touching, nothing to resolve
    } else if dist > sum {
        return None;
    } else {
        (b.pos - a.pos).normalize_or_zero() * (sum - dist)
    };

    // rewind to the previous position, replay the corrected motion, then step toward b by a's radius
    let corrected = a.pos - vel + (vel - reflect);
    let gap = corrected.distance(b.pos);
    let toi = if gap > 0.0 { (a.rad / gap).min(1.0) } else { 0.0 };

    Some(Hit { reflect: Some(reflect), toi, contact: corrected.lerp(b.pos, toi) })
}

pub fn line_circle_push(a: Vec2, b: Vec2, circle: &Circle) -> Option<(Vec2, Vec2)> {
    //! Tests segment `a->b` against the circle, returning the push away from the segment and the segment's closest point.
    let Circle { rad, pos } = *circle;
    let dist_a = pos.distance(a);
    let dist_b = pos.distance(b);
    let max_dist = dist_a.max(dist_b);

    let ab = b - a;
    let len2 = ab.length_squared();
    let min_dist = if len2 > 0.0 && (0.0..=1.0).contains(&((pos - a).dot(ab) / len2)) {
        // perpendicular foot lies on the segment: twice the triangle's area over its base
        ab.perp_dot(pos - a).abs() / len2.sqrt()
    } else {
        dist_a.min(dist_b)
    };

    let crosses = min_dist <= rad && rad <= max_dist;
    if !crosses && dist_a >= rad && dist_b >= rad { return None; }

    let (closest, _) = closest_point_on_segment(a, b, pos);
    let push = (pos - closest).normalize_or_zero() * (rad - pos.distance(closest));
    Some((push, closest))
}

pub fn circle_quad_hit(circle: &Circle, quad: &Quad) -> Option<Hit> {
    //! Hit test of the circle against the box's four edges.
    //!
    //! With the center outside the box only the strongest edge push counts. With the center
    //! inside, every touching edge's push is summed, which can over-correct near corners.
    let corners = quad.corners();
    let inside = quad.point_test(circle.pos);

    let mut sum = Vec2::ZERO;
    let mut strongest: Option<(Vec2, Vec2)> = None;
    for i in 0..4 {
        if let Some((push, closest)) = line_circle_push(corners[i], corners[(i + 1) % 4], circle) {
            sum += push;
            if strongest.map_or(true, |(p, _)| push.length_squared() > p.length_squared()) {
                strongest = Some((push, closest));
            }
        }
    }

    match strongest {
        // edge pushes point at the center: away from the box when outside, deeper in when inside
        Some((push, closest)) => Some(Hit {
            reflect: Some(if inside { sum } else { -push }),
            toi: 1.0,
            contact: closest,
        }),
        None if inside => Some(Hit { reflect: None, toi: 1.0, contact: circle.pos }), // wholly contained
        None => None,
    }
}

// ---------- Quad ---------- //

#[inline]
fn project(corners: &[Vec2; 4], axis: Vec2) -> (Fp, Fp) {
    corners.iter().fold((Fp::MAX, Fp::MIN), |(min, max), c| {
        let d = c.dot(axis);
        (min.min(d), max.max(d))
    })
}

pub fn quad_quad_hit(a: &Quad, b: &Quad, vel: Vec2, config: &CollisionConfig) -> Option<Hit> {
    //! Separating axis test of `a`, moving by `vel` this step, against `b`.
    let corners_a = a.corners();
    let corners_b = b.corners();
    let [a0, a1] = a.axes();
    let [b0, b1] = b.axes();
    let toward = b.center() - a.center();

    let mut least: Option<(Fp, Vec2)> = None;
    for axis in [a0, a1, b0, b1] {
        if axis == Vec2::ZERO { continue; } // degenerate box

        let (min_a, max_a) = project(&corners_a, axis);
        let (min_b, max_b) = project(&corners_b, axis);
        let overlap = max_a.min(max_b) - min_a.max(min_b);
        if overlap <= 0.0 { return None; } // separating axis found
        if overlap < config.sat_epsilon { continue; }

        // push-out must oppose the motion; without motion along the axis, oppose b
        let along = vel.dot(axis);
        let axis = if along < 0.0 || (along == 0.0 && toward.dot(axis) < 0.0) { -axis } else { axis };

        if least.map_or(true, |(o, _)| overlap < o) {
            least = Some((overlap, axis));
        }
    }

    Some(Hit {
        reflect: least.map(|(overlap, axis)| axis * overlap.min(config.max_penetration)),
        toi: 1.0,
        contact: Vec2::ZERO,
    })
}

// ---------- Shape ---------- //

impl Shape {
    pub fn hit_test(&self, other: &Shape, vel: Vec2, config: &CollisionConfig) -> Option<Hit> {
        //! Tests `self`, which moved by `vel` this step, against `other`.
        match (self, other) {
            (Shape::Circle(a), Shape::Circle(b)) => circle_circle_hit(a, b, vel, config),
            (Shape::Circle(c), Shape::Box(q)) => circle_quad_hit(c, q),
            (Shape::Box(q), Shape::Circle(c)) => circle_quad_hit(c, q).map(Hit::invert),
            (Shape::Box(a), Shape::Box(b)) => quad_quad_hit(a, b, vel, config),
        }
    }
}
