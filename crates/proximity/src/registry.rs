use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::RegistryError;

/// Display text for one anchor.
///
/// Serialized with the board-data keys `name` and `info`; `title` and `body`
/// are accepted when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorInfo {
    #[serde(rename = "name", alias = "title")]
    pub title: String,
    #[serde(rename = "info", alias = "body")]
    pub body: String,
}

impl AnchorInfo {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Anchor name → display info.
///
/// World positions are not stored here; they come from an
/// [`AnchorLocator`](crate::AnchorLocator) at query time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnchorRegistry {
    anchors: BTreeMap<String, AnchorInfo>,
}

impl AnchorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse board data: a JSON object mapping anchor name to `{ name, info }`.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let registry: Self = serde_json::from_str(json)?;
        if registry.anchors.contains_key("") {
            return Err(RegistryError::EmptyName);
        }
        tracing::debug!(anchors = registry.len(), "anchor registry parsed");
        Ok(registry)
    }

    /// Insert or replace an anchor. Returns the previous info, if any.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        info: AnchorInfo,
    ) -> Result<Option<AnchorInfo>, RegistryError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        Ok(self.anchors.insert(name, info))
    }

    pub fn get(&self, name: &str) -> Option<&AnchorInfo> {
        self.anchors.get(name)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Anchors in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnchorInfo)> {
        self.anchors.iter().map(|(k, v)| (k.as_str(), v))
    }
}
