//! Per-step 2D collision detection and resolution for component-based scenes.
//!
//! Bodies live in the host engine and are reached through the [`Scene`] trait. Each body
//! registered with the [`CollisionManager`] owns one or more [`Collider`]s. Once per step the
//! manager refreshes every collider from its owner's transform, tests every collider pair,
//! pushes overlapping solid bodies apart and reports `Enter`/`Stay`/`Exit` events.
//!
//! ```
//! use overlap::{BodySet, CollisionConfig, CollisionManager, LayerRegistry, ShapeDesc, Vec2};
//!
//! let layers = LayerRegistry::new(["Default", "Player"]).unwrap();
//! let mut manager = CollisionManager::new(layers, &[], CollisionConfig::default()).unwrap();
//! let mut scene = BodySet::new();
//!
//! let a = scene.insert(Vec2::new(0.0, 0.0));
//! let b = scene.insert(Vec2::new(1.5, 0.0));
//! let default = manager.layers().default_layer();
//! manager.attach(a, ShapeDesc::circle(1.0), default, false).unwrap();
//! manager.attach(b, ShapeDesc::circle(1.0), default, false).unwrap();
//!
//! scene.begin_step();
//! manager.update(&mut scene);
//! assert!(manager.is_colliding(a, b));
//! ```

pub mod body;
pub mod broad;
pub mod collider;
pub mod config;
pub mod narrow;

#[cfg(not(feature = "f64"))]
pub type Fp = f32;
#[cfg(not(feature = "f64"))]
pub type Vec2 = glam::Vec2;
#[cfg(not(feature = "f64"))]
pub type Affine2 = glam::Affine2;

#[cfg(feature = "f64")]
pub type Fp = f64;
#[cfg(feature = "f64")]
pub type Vec2 = glam::DVec2;
#[cfg(feature = "f64")]
pub type Affine2 = glam::DAffine2;

pub use body::{BodyId, BodySet, Scene};
pub use broad::{
    event::{Collision, CollisionEvent, Phase},
    layers::{LayerConfig, LayerError, LayerId, LayerRegistry, ALL_LAYERS},
    pair::UnorderedPair,
    CollisionManager,
};
pub use collider::{Collider, ColliderId, ColliderRef};
pub use config::CollisionConfig;
pub use narrow::{hit::Hit, Aabb, Circle, Intersect, Quad, Rect, Shape, ShapeDesc};
