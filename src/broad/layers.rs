//! Named collision layers and the bitmask-sized id space they map to.

use crate::{broad::CollisionManager, config::CollisionConfig};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mask selecting every layer in queries.
pub const ALL_LAYERS: u32 = u32::MAX;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayerError {
    #[error("too many collision layers: {count}, at most {max} fit a mask", max = LayerRegistry::MAX_LAYERS)]
    TooManyLayers { count: usize },
    #[error("collision layer declared twice: {0}")]
    DuplicateLayer(String),
    #[error("unknown collision layer: {0}")]
    UnknownLayer(String),
    #[error("collision layer id {0} is not registered")]
    InvalidLayerId(u8),
}

/// Index of a layer in its [`LayerRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u8);
impl LayerId {
    #[inline]
    pub fn bit(self) -> u32 {
        //! This layer's bit in a layer mask.
        1u32 << self.0
    }
}

/// Layer names, indexed by id. Fixed once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRegistry {
    names: Vec<String>,
    default: LayerId,
}

impl LayerRegistry {
    pub const MAX_LAYERS: usize = 32;
    pub const DEFAULT: &'static str = "Default";

    pub fn new<I, S>(names: I) -> Result<LayerRegistry, LayerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        //! Builds the registry in the given order. `"Default"` is put first when not listed.
        let mut list: Vec<String> = names.into_iter().map(Into::into).collect();
        if !list.iter().any(|n| n == LayerRegistry::DEFAULT) {
            list.insert(0, LayerRegistry::DEFAULT.to_owned());
        }
        if list.len() > LayerRegistry::MAX_LAYERS {
            return Err(LayerError::TooManyLayers { count: list.len() });
        }
        for (i, name) in list.iter().enumerate() {
            if list[..i].contains(name) {
                return Err(LayerError::DuplicateLayer(name.clone()));
            }
        }

        let default = list.iter().position(|n| n == LayerRegistry::DEFAULT).unwrap_or(0);
        Ok(LayerRegistry { names: list, default: LayerId(default as u8) })
    }

    #[inline]
    pub fn default_layer(&self) -> LayerId {
        self.default
    }
    pub fn id(&self, name: &str) -> Option<LayerId> {
        //! Best-effort lookup.
        self.names.iter().position(|n| n == name).map(|i| LayerId(i as u8))
    }
    pub fn resolve(&self, name: &str) -> Result<LayerId, LayerError> {
        self.id(name).ok_or_else(|| LayerError::UnknownLayer(name.to_owned()))
    }
    pub fn name(&self, id: LayerId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }
    #[inline]
    pub fn contains(&self, id: LayerId) -> bool {
        (id.0 as usize) < self.names.len()
    }
    pub fn check(&self, id: LayerId) -> Result<LayerId, LayerError> {
        if self.contains(id) {
            Ok(id)
        } else {
            Err(LayerError::InvalidLayerId(id.0))
        }
    }

    pub fn mask<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<u32, LayerError> {
        //! Mask with the bits of every named layer set.
        names.into_iter().try_fold(0, |mask, name| Ok(mask | self.resolve(name)?.bit()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &str)> {
        self.names.iter().enumerate().map(|(i, n)| (LayerId(i as u8), n.as_str()))
    }
}

impl Default for LayerRegistry {
    fn default() -> Self {
        LayerRegistry { names: vec![LayerRegistry::DEFAULT.to_owned()], default: LayerId(0) }
    }
}

/// Engine-level layer configuration: layer names in id order, and name pairs that never collide.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct LayerConfig {
    pub layers: Vec<String>,
    pub ignored: Vec<(String, String)>,
}

impl LayerConfig {
    pub fn build(&self, config: CollisionConfig) -> Result<CollisionManager, LayerError> {
        let registry = LayerRegistry::new(self.layers.iter().cloned())?;
        let ignored: Vec<(&str, &str)> = self.ignored.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        CollisionManager::new(registry, &ignored, config)
    }
}
