use std::collections::BTreeMap;

use glam::Vec3;

/// Panel element holding the anchor title.
pub const TITLE_KEY: &str = "name";
/// Panel element holding the anchor body text.
pub const BODY_KEY: &str = "info";

/// The floating information board. Rendering lives with the implementor.
pub trait InfoPanel {
    fn update_element(&mut self, key: &str, value: &str);
    /// Rebuild the visual after element changes.
    fn update(&mut self);
    fn set_position(&mut self, position: Vec3);
    /// Turn the panel to face `target`.
    fn look_at(&mut self, target: Vec3);
    fn set_visible(&mut self, visible: bool);
    fn is_visible(&self) -> bool;
}

/// Panel that only records its state. Used headless and in tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlessPanel {
    pub elements: BTreeMap<String, String>,
    pub position: Vec3,
    pub facing: Option<Vec3>,
    pub visible: bool,
    /// Number of `update` calls, i.e. visual rebuilds.
    pub revisions: u64,
}

impl HeadlessPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(&self, key: &str) -> Option<&str> {
        self.elements.get(key).map(String::as_str)
    }
}

impl InfoPanel for HeadlessPanel {
    fn update_element(&mut self, key: &str, value: &str) {
        self.elements.insert(key.to_string(), value.to_string());
    }

    fn update(&mut self) {
        self.revisions += 1;
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn look_at(&mut self, target: Vec3) {
        self.facing = Some(target);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}
