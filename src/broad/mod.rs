//! Broadphase: the collider registry, layer filtering, and the per-step pair scan.

pub mod event;
pub mod layers;
pub mod pair;

use crate::{
    body::{BodyId, Scene},
    collider::{Collider, ColliderId, ColliderRef},
    config::CollisionConfig,
    narrow::{hit::Hit, Aabb, Intersect, ShapeDesc},
    Fp, Vec2,
};
use event::{Collision, CollisionEvent, Phase};
use fnv::FnvHashSet;
use indexmap::IndexMap;
use layers::{LayerError, LayerId, LayerRegistry};
use log::{debug, trace, warn};
use pair::UnorderedPair;

/// Owns every registered body's colliders and turns their overlaps into corrections and events.
///
/// The scan is all-pairs, `O(n²)` in colliders, meant for small to moderate populations.
#[derive(Debug)]
pub struct CollisionManager {
    config: CollisionConfig,
    layers: LayerRegistry,
    ignored: FnvHashSet<UnorderedPair<LayerId>>,
    /// Registration order is scan order.
    bodies: IndexMap<BodyId, Vec<Collider>>,
    /// Collider pairs found overlapping by the last scan.
    ongoing: FnvHashSet<UnorderedPair<ColliderId>>,
    next_collider: u32,
}

impl CollisionManager {
    pub fn new(layers: LayerRegistry, ignored: &[(&str, &str)], config: CollisionConfig) -> Result<CollisionManager, LayerError> {
        //! Fails on the first ignored pair naming an unregistered layer.
        let mut manager = CollisionManager {
            config,
            layers,
            ignored: FnvHashSet::default(),
            bodies: IndexMap::new(),
            ongoing: FnvHashSet::default(),
            next_collider: 0,
        };
        for &(a, b) in ignored {
            manager.set_ignore_layers_by_name(a, b)?;
        }
        debug!("collision manager ready: {} layers, {} ignored pairs", manager.layers.len(), manager.ignored.len());
        Ok(manager)
    }

    #[inline]
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }
    #[inline]
    pub fn set_config(&mut self, config: CollisionConfig) {
        self.config = config;
    }
    #[inline]
    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    // ---------- Layers ---------- //

    pub fn set_ignore_layers(&mut self, a: LayerId, b: LayerId) -> Result<(), LayerError> {
        self.layers.check(a)?;
        self.layers.check(b)?;
        if self.ignored.insert(UnorderedPair::new(a, b)) {
            debug!("ignoring collisions between layers {:?} and {:?}", self.layers.name(a), self.layers.name(b));
        }
        Ok(())
    }
    pub fn set_dont_ignore_layers(&mut self, a: LayerId, b: LayerId) -> bool {
        //! Returns whether the pair was being ignored.
        self.ignored.remove(&UnorderedPair::new(a, b))
    }
    pub fn set_ignore_layers_by_name(&mut self, a: &str, b: &str) -> Result<(), LayerError> {
        let (a, b) = (self.layers.resolve(a)?, self.layers.resolve(b)?);
        self.set_ignore_layers(a, b)
    }
    pub fn set_dont_ignore_layers_by_name(&mut self, a: &str, b: &str) -> Result<bool, LayerError> {
        let (a, b) = (self.layers.resolve(a)?, self.layers.resolve(b)?);
        Ok(self.set_dont_ignore_layers(a, b))
    }
    #[inline]
    pub fn ignores(&self, a: LayerId, b: LayerId) -> bool {
        self.ignored.contains(&UnorderedPair::new(a, b))
    }

    // ---------- Registry ---------- //

    pub fn register(&mut self, body: BodyId) -> bool {
        //! Starts tracking `body`. Returns `false` if it already was.
        if self.bodies.contains_key(&body) { return false; }
        self.bodies.insert(body, Vec::new());
        debug!("registered {:?}", body);
        true
    }
    pub fn unregister(&mut self, body: BodyId) -> bool {
        //! Stops tracking `body` and drops its colliders. Ongoing pairs are forgotten without an `Exit`,
        //! see [`unregister_in`](CollisionManager::unregister_in) to close them.
        let colliders = match self.bodies.shift_remove(&body) {
            Some(colliders) => colliders,
            None => return false,
        };
        self.ongoing.retain(|pair| !colliders.iter().any(|c| pair.contains(c.id)));
        debug!("unregistered {:?}", body);
        true
    }

    pub fn unregister_in<S: Scene + ?Sized>(&mut self, scene: &mut S, body: BodyId) -> bool {
        //! Like [`unregister`](CollisionManager::unregister), but first dispatches `Exit` to every
        //! partner still overlapping one of `body`'s colliders, so their `Enter` is closed.
        if !self.is_registered(body) { return false; }
        self.exit_partners(scene, body);
        self.unregister(body)
    }

    pub fn attach(&mut self, body: BodyId, desc: ShapeDesc, layer: LayerId, trigger: bool) -> Result<ColliderId, LayerError> {
        //! Adds a collider to `body`, registering the body if needed.
        //!
        //! The new collider sits at the world origin until the next [`update`](CollisionManager::update)
        //! or [`refresh`](CollisionManager::refresh) places it at its owner's transform.
        self.layers.check(layer)?;
        let id = ColliderId(self.next_collider);
        self.next_collider += 1;

        self.register(body);
        if let Some(colliders) = self.bodies.get_mut(&body) {
            colliders.push(Collider::new(id, desc, layer, trigger));
        }
        Ok(id)
    }
    pub fn detach(&mut self, id: ColliderId) -> Option<Collider> {
        //! Removes a collider. Its body is unregistered once it owns none.
        let body = self.owner(id)?;
        let colliders = self.bodies.get_mut(&body)?;
        let index = colliders.iter().position(|c| c.id == id)?;
        let collider = colliders.remove(index);
        let now_empty = colliders.is_empty();

        self.ongoing.retain(|pair| !pair.contains(id));
        if now_empty {
            self.unregister(body);
        }
        Some(collider)
    }

    pub fn set_trigger(&mut self, id: ColliderId, trigger: bool) -> bool {
        match self.collider_mut(id) {
            Some(c) => {
                c.trigger = trigger;
                true
            }
            None => false,
        }
    }
    pub fn set_layer(&mut self, id: ColliderId, layer: LayerId) -> Result<bool, LayerError> {
        self.layers.check(layer)?;
        Ok(match self.collider_mut(id) {
            Some(c) => {
                c.layer = layer;
                true
            }
            None => false,
        })
    }

    #[inline]
    pub fn is_registered(&self, body: BodyId) -> bool {
        self.bodies.contains_key(&body)
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
    pub fn bodies(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies.keys().copied()
    }
    pub fn colliders(&self, body: BodyId) -> &[Collider] {
        self.bodies.get(&body).map(Vec::as_slice).unwrap_or(&[])
    }
    pub fn collider(&self, id: ColliderId) -> Option<&Collider> {
        self.bodies.values().flatten().find(|c| c.id == id)
    }
    pub fn owner(&self, id: ColliderId) -> Option<BodyId> {
        self.bodies.iter().find(|(_, cs)| cs.iter().any(|c| c.id == id)).map(|(b, _)| *b)
    }
    fn collider_mut(&mut self, id: ColliderId) -> Option<&mut Collider> {
        self.bodies.values_mut().flatten().find(|c| c.id == id)
    }

    // ---------- Queries ---------- //

    pub fn is_colliding(&self, a: BodyId, b: BodyId) -> bool {
        //! Whether any collider of `a` overlapped any collider of `b` in the last scan.
        self.colliders(a).iter().any(|ca| {
            self.colliders(b).iter().any(|cb| self.ongoing.contains(&UnorderedPair::new(ca.id, cb.id)))
        })
    }
    pub fn ongoing_pairs(&self) -> impl Iterator<Item = UnorderedPair<ColliderId>> + '_ {
        self.ongoing.iter().copied()
    }

    pub fn query_point(&self, point: Vec2, mask: u32) -> Vec<ColliderRef> {
        //! Colliders on a layer in `mask` whose current shape contains `point`.
        self.bodies
            .iter()
            .flat_map(|(body, cs)| cs.iter().map(move |c| (*body, c)))
            .filter(|(_, c)| c.layer.bit() & mask != 0)
            .filter(|(_, c)| c.shape.get_bounding_box().point_test(point) && c.shape.point_test(point))
            .map(|(body, c)| ColliderRef { body, id: c.id })
            .collect()
    }
    pub fn raycast(&self, a: Vec2, b: Vec2, mask: u32) -> Option<(ColliderRef, Fp)> {
        //! First collider on a layer in `mask` entered by the segment `a->b`, with the coefficient along it.
        let bounds = Aabb::new_safe(a.x, a.y, b.x, b.y);
        let mut first: Option<(ColliderRef, Fp)> = None;
        for (body, cs) in self.bodies.iter() {
            for c in cs.iter().filter(|c| c.layer.bit() & mask != 0) {
                if !bounds.aabb_test(&c.shape.get_bounding_box()) { continue; }
                if let Some(t) = c.shape.line_query(a, b) {
                    if first.map_or(true, |(_, best)| t < best) {
                        first = Some((ColliderRef { body: *body, id: c.id }, t));
                    }
                }
            }
        }
        first
    }

    // ---------- Step ---------- //

    pub fn refresh<S: Scene + ?Sized>(&mut self, scene: &S) {
        //! Places every collider at its owner's current transform without scanning for overlaps.
        let snapshot: Vec<BodyId> = self.bodies.keys().copied().collect();
        self.refresh_bodies(scene, &snapshot);
    }

    fn refresh_bodies<S: Scene + ?Sized>(&mut self, scene: &S, snapshot: &[BodyId]) -> FnvHashSet<BodyId> {
        //! Returns the bodies the scene no longer knows.
        let mut missing = FnvHashSet::default();
        for &body in snapshot.iter() {
            match (scene.world_transform(body), scene.last_world_position(body)) {
                (Some(world), Some(last)) => {
                    if let Some(colliders) = self.bodies.get_mut(&body) {
                        for c in colliders.iter_mut() {
                            c.collision_update(world, last);
                        }
                    }
                }
                _ => {
                    missing.insert(body);
                }
            }
        }
        missing
    }

    pub fn update<S: Scene + ?Sized>(&mut self, scene: &mut S) {
        //! Runs one step: refreshes every collider, scans every pair, applies corrections and dispatches events.
        //!
        //! The scan walks a snapshot of the registry taken up front. Bodies the scene no longer knows
        //! are skipped for this step and unregistered once the scan is done, with `Exit` dispatched
        //! to the partners they were still overlapping.
        let snapshot: Vec<BodyId> = self.bodies.keys().copied().collect();
        let missing = self.refresh_bodies(&*scene, &snapshot);

        for (i, &body_a) in snapshot.iter().enumerate() {
            if missing.contains(&body_a) { continue; }
            for &body_b in snapshot[(i + 1)..].iter() {
                if missing.contains(&body_b) { continue; }
                let (len_a, len_b) = (self.colliders(body_a).len(), self.colliders(body_b).len());
                for ia in 0..len_a {
                    for ib in 0..len_b {
                        self.test_pair(scene, (body_a, ia), (body_b, ib));
                    }
                }
            }
        }

        for body in missing {
            warn!("{:?} left the scene without being unregistered, dropping it", body);
            self.unregister_in(scene, body);
        }
    }

    fn exit_partners<S: Scene + ?Sized>(&mut self, scene: &mut S, body: BodyId) {
        //! Ends every ongoing pair between `body` and another body the scene still knows.
        let gone: Vec<Collider> = self.colliders(body).to_vec();
        for c in gone.iter() {
            let partners: Vec<ColliderId> = self.ongoing.iter().filter_map(|pair| pair.other(c.id)).collect();
            for partner in partners {
                self.ongoing.remove(&UnorderedPair::new(c.id, partner));
                let owner = match self.owner(partner) {
                    Some(owner) if owner != body && scene.world_transform(owner).is_some() => owner,
                    _ => continue,
                };
                trace!("Exit {:?} <-> {:?} on removal", partner, c.id);
                let this = ColliderRef { body: owner, id: partner };
                self.stopped_colliding(scene, this, ColliderRef { body, id: c.id }, c.trigger);
            }
        }
    }

    fn test_pair<S: Scene + ?Sized>(&mut self, scene: &mut S, (body_a, ia): (BodyId, usize), (body_b, ib): (BodyId, usize)) {
        let (a, b) = match (self.colliders(body_a).get(ia), self.colliders(body_b).get(ib)) {
            (Some(a), Some(b)) => (*a, *b),
            _ => return,
        };
        let this = ColliderRef { body: body_a, id: a.id };
        let other = ColliderRef { body: body_b, id: b.id };
        let key = UnorderedPair::new(a.id, b.id);

        // both orders see the pre-correction shapes
        let hits = if self.ignores(a.layer, b.layer) {
            None
        } else {
            match (a.shape.hit_test(&b.shape, a.vel, &self.config), b.shape.hit_test(&a.shape, b.vel, &self.config)) {
                (None, None) => None,
                hits => Some(hits),
            }
        };

        match hits {
            Some((hit_a, hit_b)) => {
                let phase = if self.ongoing.insert(key) { Phase::Enter } else { Phase::Stay };
                trace!("{:?} {:?} <-> {:?}", phase, this, other);
                self.collide(scene, this, other, b.trigger, hit_a.or(hit_b.map(Hit::invert)), phase);
                self.collide(scene, other, this, a.trigger, hit_b.or(hit_a.map(Hit::invert)), phase);
            }
            None => {
                if self.ongoing.remove(&key) {
                    trace!("Exit {:?} <-> {:?}", this, other);
                    self.stopped_colliding(scene, this, other, b.trigger);
                    self.stopped_colliding(scene, other, this, a.trigger);
                }
            }
        }
    }

    fn collide<S: Scene + ?Sized>(&mut self, scene: &mut S, this: ColliderRef, other: ColliderRef, other_trigger: bool, hit: Option<Hit>, phase: Phase) {
        let hit = match hit {
            Some(hit) => hit,
            None => return,
        };
        let colliders = match self.bodies.get_mut(&this.body) {
            Some(colliders) => colliders,
            None => return,
        };
        let index = match colliders.iter().position(|c| c.id == this.id) {
            Some(index) => index,
            None => return,
        };

        if let Some(pos) = colliders[index].collide(other_trigger, &hit) {
            // the owner moved, so every sibling collider moves along
            for c in colliders.iter_mut() {
                c.move_to(pos);
            }
            scene.set_world_position(this.body, pos);
        }

        let collision = Collision::new(this, other).with_contact(hit.contact);
        let event = colliders[index].convert(other_trigger, CollisionEvent::new(phase, collision));
        scene.dispatch(this.body, &event);
    }

    fn stopped_colliding<S: Scene + ?Sized>(&self, scene: &mut S, this: ColliderRef, other: ColliderRef, other_trigger: bool) {
        let collider = match self.colliders(this.body).iter().find(|c| c.id == this.id) {
            Some(c) => c,
            None => return,
        };
        let event = collider.convert(other_trigger, CollisionEvent::new(Phase::Exit, Collision::new(this, other)));
        scene.dispatch(this.body, &event);
    }
}
