use crate::{
    body::BodyId,
    broad::{event::CollisionEvent, layers::LayerId},
    narrow::{hit::Hit, Shape, ShapeDesc},
    Affine2, Vec2,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(pub u32);

/// A collider together with the body that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderRef {
    pub body: BodyId,
    pub id: ColliderId,
}

/// One shape attached to a body, with the state it carries from step to step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub id: ColliderId,
    /// Body-relative geometry
    pub desc: ShapeDesc,
    /// World-space geometry for the current step
    pub shape: Shape,
    /// Triggers report overlaps but are never pushed apart, nor push others.
    pub trigger: bool,
    pub layer: LayerId,
    /// Owner's displacement over the current step
    pub vel: Vec2,
    /// Owner's world position at the end of the previous step
    pub last_pos: Vec2,
    /// Owner's local-to-world matrix for the current step, corrections included
    pub world: Affine2,
}

impl Collider {
    pub fn new(id: ColliderId, desc: ShapeDesc, layer: LayerId, trigger: bool) -> Collider {
        Collider {
            id,
            desc,
            shape: desc.resolve(&Affine2::IDENTITY),
            trigger,
            layer,
            vel: Vec2::ZERO,
            last_pos: Vec2::ZERO,
            world: Affine2::IDENTITY,
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.world.translation
    }

    pub fn collision_update(&mut self, world: Affine2, last_pos: Vec2) {
        //! Refreshes velocity and shape from the owner's transform at the start of a step.
        self.vel = world.translation - last_pos;
        self.last_pos = last_pos;
        self.world = world;
        self.shape = self.desc.resolve(&world);
    }

    pub fn move_to(&mut self, pos: Vec2) {
        //! Places the owner at `pos` for the rest of the step, as if it had moved there from `last_pos`.
        self.world.translation = pos;
        self.vel = pos - self.last_pos;
        self.shape = self.desc.resolve(&self.world);
    }

    pub fn collide(&mut self, other_trigger: bool, hit: &Hit) -> Option<Vec2> {
        //! Applies the push-out of a positive hit test, returning the owner's corrected position if it moved.
        if self.trigger || other_trigger { return None; }
        let reflect = hit.reflect?;
        if reflect == Vec2::ZERO { return None; }

        self.move_to(self.last_pos + (self.vel - reflect));
        Some(self.pos())
    }

    #[inline]
    pub fn convert(&self, other_trigger: bool, event: CollisionEvent) -> CollisionEvent {
        //! Turns `event` into its trigger variant when either side is a trigger.
        if self.trigger || other_trigger {
            event.into_trigger()
        } else {
            event
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broad::event::{Collision, Phase};
    use approx::assert_relative_eq;

    fn collider(trigger: bool) -> Collider {
        Collider::new(ColliderId(0), ShapeDesc::circle(1.0), LayerId(0), trigger)
    }

    #[test]
    fn update_tracks_motion() {
        let mut c = collider(false);
        c.collision_update(Affine2::from_translation(Vec2::new(3.0, 1.0)), Vec2::new(2.0, 1.0));
        assert_eq!(c.vel, Vec2::new(1.0, 0.0));
        assert_eq!(c.shape.center(), Vec2::new(3.0, 1.0));
    }

    #[test]
    fn collide_corrects_solid() {
        let mut c = collider(false);
        c.collision_update(Affine2::from_translation(Vec2::new(3.0, 0.0)), Vec2::new(2.0, 0.0));
        let hit = Hit { reflect: Some(Vec2::new(0.25, 0.0)), toi: 1.0, contact: Vec2::ZERO };

        let pos = c.collide(false, &hit).unwrap();
        assert_relative_eq!(pos, Vec2::new(2.75, 0.0));
        assert_relative_eq!(c.vel, Vec2::new(0.75, 0.0));
        assert_relative_eq!(c.shape.center(), pos);
    }

    #[test]
    fn toi_does_not_scale_correction() {
        let mut early = collider(false);
        early.collision_update(Affine2::from_translation(Vec2::new(3.0, 0.0)), Vec2::new(2.0, 0.0));
        let mut late = early;

        let hit = Hit { reflect: Some(Vec2::new(0.25, 0.0)), toi: 1.0, contact: Vec2::ZERO };
        let late_pos = late.collide(false, &hit).unwrap();
        let early_pos = early.collide(false, &Hit { toi: 0.1, ..hit }).unwrap();
        assert_eq!(early_pos, late_pos);
    }

    #[test]
    fn triggers_never_move() {
        let hit = Hit { reflect: Some(Vec2::new(0.25, 0.0)), toi: 1.0, contact: Vec2::ZERO };
        let mut c = collider(true);
        assert!(c.collide(false, &hit).is_none());
        let mut c = collider(false);
        assert!(c.collide(true, &hit).is_none());
        assert!(c.collide(false, &Hit { reflect: None, ..hit }).is_none());
    }

    #[test]
    fn convert_to_trigger() {
        let this = ColliderRef { body: BodyId(0), id: ColliderId(0) };
        let other = ColliderRef { body: BodyId(1), id: ColliderId(1) };
        let event = CollisionEvent::new(Phase::Enter, Collision::new(this, other));

        assert!(!collider(false).convert(false, event).trigger);
        assert!(collider(false).convert(true, event).trigger);
        assert!(collider(true).convert(false, event).trigger);
    }
}
