//! Quality rendition tracking and manual override
//!
//! Renditions are derived from the engine's level list when its manifest is
//! parsed. The selection is modelled per rendition: `Auto` enables every
//! rendition, `Fixed(h)` enables only the one with height `h`.

use crate::engine::{Level, StreamingEngine, AUTO_LEVEL};
use log::{debug, info};
use serde::Serialize;
use std::fmt;

/// One selectable quality variant, identified by its height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rendition {
    pub height: u32,
    pub enabled: bool,
}

impl Rendition {
    /// Menu label, e.g. `"720p"`
    pub fn label(&self) -> String {
        format!("{}p", self.height)
    }
}

/// Current quality selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualitySelection {
    #[default]
    Auto,
    Fixed(u32),
}

impl fmt::Display for QualitySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualitySelection::Auto => write!(f, "Auto"),
            QualitySelection::Fixed(height) => write!(f, "{}p", height),
        }
    }
}

/// Distinct heights of `levels`, tallest first
pub fn derive_renditions(levels: &[Level]) -> Vec<Rendition> {
    let mut heights: Vec<u32> = levels.iter().map(|level| level.height).collect();
    heights.sort_unstable_by(|a, b| b.cmp(a));
    heights.dedup();
    heights
        .into_iter()
        .map(|height| Rendition { height, enabled: true })
        .collect()
}

/// Rendition list plus the selection applied to it
#[derive(Debug, Default)]
pub struct QualityController {
    renditions: Vec<Rendition>,
    selection: QualitySelection,
}

impl QualityController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the rendition list from a freshly parsed manifest and fall
    /// back to `Auto`
    pub fn reset_from_levels(&mut self, levels: &[Level]) {
        self.renditions = derive_renditions(levels);
        self.selection = QualitySelection::Auto;
        info!(
            "Discovered renditions: {:?}",
            self.renditions.iter().map(|r| r.height).collect::<Vec<_>>()
        );
    }

    /// Forget all renditions, e.g. when the source changes
    pub fn clear(&mut self) {
        self.renditions.clear();
        self.selection = QualitySelection::Auto;
    }

    pub fn renditions(&self) -> &[Rendition] {
        &self.renditions
    }

    pub fn selection(&self) -> QualitySelection {
        self.selection
    }

    /// Apply `selection` to the rendition list and the engine
    ///
    /// A fixed height that is not in the list is ignored and leaves both the
    /// selection and the engine untouched. Returns whether anything was
    /// applied.
    pub fn set_selection(
        &mut self,
        selection: QualitySelection,
        engine: &mut dyn StreamingEngine,
    ) -> bool {
        match selection {
            QualitySelection::Auto => {
                for rendition in &mut self.renditions {
                    rendition.enabled = true;
                }
                engine.set_current_level(AUTO_LEVEL);
            }
            QualitySelection::Fixed(height) => {
                if !self.renditions.iter().any(|r| r.height == height) {
                    debug!("Ignoring selection of unknown rendition {}p", height);
                    return false;
                }
                // Engine levels may repeat a height; the first one wins
                let levels = engine.levels();
                let Some(index) = levels.iter().position(|level| level.height == height) else {
                    debug!("Engine no longer advertises {}p", height);
                    return false;
                };
                for rendition in &mut self.renditions {
                    rendition.enabled = rendition.height == height;
                }
                engine.set_current_level(index as i32);
            }
        }

        self.selection = selection;
        info!("Quality selection: {}", selection);
        true
    }
}
