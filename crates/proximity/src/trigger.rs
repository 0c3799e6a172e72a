use glam::Vec3;
use serde::{Deserialize, Serialize};
use walkthrough_common::{ConfigError, ensure_non_negative, ensure_positive};

use crate::locator::AnchorLocator;
use crate::panel::{BODY_KEY, InfoPanel, TITLE_KEY};
use crate::registry::{AnchorInfo, AnchorRegistry};

/// Proximity tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// An anchor triggers when the viewer is strictly closer than this.
    pub threshold: f32,
    /// Height of the panel above its anchor.
    pub panel_offset: f32,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            threshold: 3.0,
            panel_offset: 1.3,
        }
    }
}

impl ProximityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("proximity.threshold", self.threshold)?;
        ensure_non_negative("proximity.panel_offset", self.panel_offset)
    }
}

/// Result of one proximity update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProximityChange {
    /// The panel switched to this anchor.
    Shown(String),
    /// The panel was hidden.
    Hidden,
    Unchanged,
}

/// Shows the information panel for the anchor the viewer is standing near.
#[derive(Debug, Clone, Default)]
pub struct ProximityTrigger {
    config: ProximityConfig,
    shown: Option<String>,
}

impl ProximityTrigger {
    pub fn new(config: ProximityConfig) -> Self {
        Self {
            config,
            shown: None,
        }
    }

    pub fn config(&self) -> &ProximityConfig {
        &self.config
    }

    /// Name of the anchor currently on the panel.
    pub fn shown(&self) -> Option<&str> {
        self.shown.as_deref()
    }

    /// Forget the shown anchor, e.g. after the registry was replaced. The
    /// panel keeps its state until the next `update`.
    pub fn reset(&mut self) {
        self.shown = None;
    }

    /// Re-evaluate which anchor, if any, the viewer at `viewer` is near.
    ///
    /// `head` is where the panel turns to face when it switches.
    pub fn update<L, P>(
        &mut self,
        viewer: Vec3,
        head: Vec3,
        registry: &AnchorRegistry,
        locator: &L,
        panel: &mut P,
    ) -> ProximityChange
    where
        L: AnchorLocator + ?Sized,
        P: InfoPanel + ?Sized,
    {
        let threshold = self.config.threshold;
        let nearest = registry
            .iter()
            .filter_map(|(name, info)| {
                let position = locator.world_position(name)?;
                let distance = viewer.distance(position);
                (distance < threshold).then_some((name, info, position, distance))
            })
            .min_by(|a, b| a.3.total_cmp(&b.3));

        match nearest {
            Some((name, _, _, _)) if self.shown.as_deref() == Some(name) => {
                ProximityChange::Unchanged
            }
            Some((name, info, position, distance)) => {
                self.show(name, info, position, head, panel);
                tracing::debug!(anchor = name, distance, "info panel shown");
                ProximityChange::Shown(name.to_string())
            }
            None if self.shown.is_some() || panel.is_visible() => {
                self.shown = None;
                panel.set_visible(false);
                tracing::debug!("info panel hidden");
                ProximityChange::Hidden
            }
            None => ProximityChange::Unchanged,
        }
    }

    fn show<P>(&mut self, name: &str, info: &AnchorInfo, anchor: Vec3, head: Vec3, panel: &mut P)
    where
        P: InfoPanel + ?Sized,
    {
        panel.set_position(anchor + Vec3::Y * self.config.panel_offset);
        panel.update_element(TITLE_KEY, &info.title);
        panel.update_element(BODY_KEY, &info.body);
        panel.update();
        panel.look_at(head);
        panel.set_visible(true);
        self.shown = Some(name.to_string());
    }
}
