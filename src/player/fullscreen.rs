//! Fullscreen toggling against the host environment

use crate::utils::error::Result;
use log::info;
use std::fmt;

/// Identifies a host element that can go fullscreen
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host fullscreen capability
pub trait FullscreenHost: Send {
    /// Element currently shown fullscreen, if any
    fn fullscreen_element(&self) -> Option<ElementId>;

    /// Show `element` fullscreen
    fn request_fullscreen(&mut self, element: &ElementId) -> Result<()>;

    /// Leave fullscreen
    fn exit_fullscreen(&mut self) -> Result<()>;
}

/// Stateless toggle; the host is queried on every call
#[derive(Debug, Clone)]
pub struct FullscreenController {
    container: ElementId,
}

impl FullscreenController {
    pub fn new(container: ElementId) -> Self {
        Self { container }
    }

    /// Exit fullscreen if anything is fullscreen, otherwise make the
    /// player container fullscreen
    pub fn toggle(&self, host: &mut dyn FullscreenHost) -> Result<()> {
        match host.fullscreen_element() {
            Some(current) => {
                info!("Leaving fullscreen ({})", current);
                host.exit_fullscreen()
            }
            None => {
                info!("Entering fullscreen on {}", self.container);
                host.request_fullscreen(&self.container)
            }
        }
    }
}
