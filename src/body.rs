use crate::{broad::event::CollisionEvent, Affine2, Fp, Vec2};
use fnv::FnvHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

/// The host engine's side of the contract: transforms in, corrected positions and events out.
pub trait Scene {
    /// Local-to-world matrix of the body this step. Its translation is the body's world position.
    /// `None` once the body no longer exists.
    fn world_transform(&self, body: BodyId) -> Option<Affine2>;
    /// World position of the body at the end of the previous step.
    fn last_world_position(&self, body: BodyId) -> Option<Vec2>;
    fn world_position(&self, body: BodyId) -> Option<Vec2> {
        self.world_transform(body).map(|world| world.translation)
    }

    /// Writes back a position corrected by collision response.
    fn set_world_position(&mut self, body: BodyId, pos: Vec2);
    /// Delivers a collision or trigger event to the body's listeners.
    ///
    /// Every `Enter` is eventually followed by an `Exit`, unless the receiving body itself is unregistered
    /// with [`CollisionManager::unregister`](crate::CollisionManager::unregister).
    fn dispatch(&mut self, body: BodyId, event: &CollisionEvent);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Position
    pub pos: Vec2,
    /// Position at the end of the previous step
    pub last_pos: Vec2,
    /// Rotation, in radians
    pub angle: Fp,
    pub scale: Vec2,
}
impl Body {
    pub fn new(pos: Vec2) -> Body {
        Body { pos, last_pos: pos, angle: 0.0, scale: Vec2::ONE }
    }

    #[inline]
    pub fn world(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(self.scale, self.angle, self.pos)
    }
    #[inline]
    pub fn translate(&mut self, offset: Vec2) {
        self.pos += offset;
    }
}

/// A flat set of root bodies implementing [`Scene`], recording every dispatched event.
#[derive(Debug, Default)]
pub struct BodySet {
    bodies: FnvHashMap<BodyId, Body>,
    events: Vec<(BodyId, CollisionEvent)>,
    next: u32,
}
impl BodySet {
    pub fn new() -> BodySet {
        BodySet::default()
    }

    pub fn insert(&mut self, pos: Vec2) -> BodyId {
        self.insert_body(Body::new(pos))
    }
    pub fn insert_body(&mut self, body: Body) -> BodyId {
        let id = BodyId(self.next);
        self.next += 1;
        self.bodies.insert(id, body);
        id
    }
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        self.bodies.remove(&id)
    }

    #[inline]
    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id)
    }
    #[inline]
    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(&id)
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn begin_step(&mut self) {
        //! Remembers every body's position as the previous one. Call before moving bodies for the step.
        for body in self.bodies.values_mut() {
            body.last_pos = body.pos;
        }
    }
    pub fn translate(&mut self, id: BodyId, offset: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.translate(offset);
        }
    }

    #[inline]
    pub fn events(&self) -> &[(BodyId, CollisionEvent)] {
        &self.events
    }
    pub fn take_events(&mut self) -> Vec<(BodyId, CollisionEvent)> {
        std::mem::take(&mut self.events)
    }
}

impl Scene for BodySet {
    fn world_transform(&self, body: BodyId) -> Option<Affine2> {
        self.bodies.get(&body).map(Body::world)
    }
    fn last_world_position(&self, body: BodyId) -> Option<Vec2> {
        self.bodies.get(&body).map(|b| b.last_pos)
    }

    fn set_world_position(&mut self, body: BodyId, pos: Vec2) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.pos = pos;
        }
    }
    fn dispatch(&mut self, body: BodyId, event: &CollisionEvent) {
        if self.bodies.contains_key(&body) {
            self.events.push((body, *event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_bookkeeping() {
        let mut set = BodySet::new();
        let a = set.insert(Vec2::new(1.0, 2.0));
        set.begin_step();
        set.translate(a, Vec2::new(0.5, 0.0));

        assert_eq!(set.last_world_position(a), Some(Vec2::new(1.0, 2.0)));
        assert_eq!(set.world_position(a), Some(Vec2::new(1.5, 2.0)));

        set.remove(a);
        assert!(set.world_transform(a).is_none());
        set.set_world_position(a, Vec2::ZERO);
        assert!(set.is_empty());
    }
}
