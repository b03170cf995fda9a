//! Presentation policy for the chat widget.
//!
//! Desktop dashboard gets a push-content side drawer; everything else gets a
//! floating popup with a dismiss backdrop. Derived from two inputs, no state.

use serde::{Deserialize, Serialize};

/// Viewports narrower than this are treated as mobile.
pub const NARROW_BREAKPOINT_PX: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Dashboard,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationMode {
    Drawer,
    Popup,
}

impl PresentationMode {
    #[must_use]
    pub fn select(view: View, is_narrow: bool) -> Self {
        match (view, is_narrow) {
            (View::Dashboard, false) => Self::Drawer,
            (View::Dashboard, true) | (View::Other, _) => Self::Popup,
        }
    }

    /// Convenience for callers holding a raw viewport width.
    #[must_use]
    pub fn for_viewport(view: View, width_px: u32) -> Self {
        Self::select(view, is_narrow(width_px))
    }

    #[must_use]
    pub fn pushes_content(self) -> bool {
        matches!(self, Self::Drawer)
    }

    #[must_use]
    pub fn shows_backdrop(self) -> bool {
        matches!(self, Self::Popup)
    }
}

#[must_use]
pub fn is_narrow(width_px: u32) -> bool {
    width_px < NARROW_BREAKPOINT_PX
}
