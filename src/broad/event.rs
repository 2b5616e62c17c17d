//! Collision event types delivered through [`Scene::dispatch`](crate::Scene::dispatch).

use crate::{collider::ColliderRef, Vec2};

/// Where a pair of colliders stands in its overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// First step of an overlap
    Enter,
    /// The pair overlapped on the previous step too
    Stay,
    /// The pair overlapped on the previous step, but no longer does
    Exit,
}

/// A detected overlap, from the point of view of `a`, the receiving collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub a: ColliderRef,
    pub b: ColliderRef,
    /// Zero when the shapes offer no meaningful contact point.
    pub contact: Vec2,
}
impl Collision {
    #[inline]
    pub fn new(a: ColliderRef, b: ColliderRef) -> Collision {
        Collision { a, b, contact: Vec2::ZERO }
    }
    #[inline]
    pub fn with_contact(self, contact: Vec2) -> Collision {
        Collision { contact, ..self }
    }
}

/// A collision and its phase. `trigger` marks pass-through pairs, where at least one side is a trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub phase: Phase,
    pub collision: Collision,
    pub trigger: bool,
}
impl CollisionEvent {
    #[inline]
    pub fn new(phase: Phase, collision: Collision) -> CollisionEvent {
        CollisionEvent { phase, collision, trigger: false }
    }
    #[inline]
    pub fn into_trigger(self) -> CollisionEvent {
        CollisionEvent { trigger: true, ..self }
    }

    #[inline]
    pub fn is_enter(&self) -> bool {
        self.phase == Phase::Enter
    }
    #[inline]
    pub fn is_stay(&self) -> bool {
        self.phase == Phase::Stay
    }
    #[inline]
    pub fn is_exit(&self) -> bool {
        self.phase == Phase::Exit
    }
}
