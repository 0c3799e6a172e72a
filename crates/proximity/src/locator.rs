use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::RegistryError;

/// Resolves an anchor name to the current world position of its scene object.
pub trait AnchorLocator {
    fn world_position(&self, name: &str) -> Option<Vec3>;
}

/// Named world positions extracted from the loaded environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneIndex {
    objects: BTreeMap<String, Vec3>,
}

impl SceneIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object mapping names to `[x, y, z]`.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn insert(&mut self, name: impl Into<String>, position: Vec3) {
        self.objects.insert(name.into(), position);
    }

    /// Add `name` halfway between two existing objects, e.g. an anchor
    /// centred on a pair of doors. Returns the new position.
    pub fn insert_midpoint(
        &mut self,
        name: impl Into<String>,
        a: &str,
        b: &str,
    ) -> Result<Vec3, RegistryError> {
        let pa = self.require(a)?;
        let pb = self.require(b)?;
        let mid = pa.lerp(pb, 0.5);
        self.insert(name, mid);
        Ok(mid)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn require(&self, name: &str) -> Result<Vec3, RegistryError> {
        self.objects
            .get(name)
            .copied()
            .ok_or_else(|| RegistryError::MissingObject(name.to_string()))
    }
}

impl AnchorLocator for SceneIndex {
    fn world_position(&self, name: &str) -> Option<Vec3> {
        self.objects.get(name).copied()
    }
}
