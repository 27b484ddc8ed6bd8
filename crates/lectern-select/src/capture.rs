//! Selection-release handling and contextual-menu geometry.

use crate::intent::Intent;

/// Vertical gap between the selection and the menu, in pixels.
const MENU_OFFSET_PX: f64 = 44.0;

/// Width reserved for the contextual menu when clamping, in pixels.
const MENU_WIDTH_PX: f64 = 150.0;

/// Minimum gap kept between the menu and the viewport edge, in pixels.
const VIEWPORT_MARGIN_PX: f64 = 8.0;

/// Bounding rectangle of a selection, in viewport coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SelectionRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Viewport dimensions at the time of a selection release.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
}

/// One selection release as reported by the presentation surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub text: String,
    pub rect: SelectionRect,
    /// True when the selection anchors inside the assistant's own surface.
    /// Such selections must never raise the menu.
    pub within_surface: bool,
}

/// Where the contextual menu opens, in viewport coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MenuAnchor {
    pub top: f64,
    pub left: f64,
}

/// Observes selection releases and turns the user's menu choice into an
/// [`Intent`].
///
/// Holds at most one pending candidate. The enable flag is owned by the
/// caller: capture stays entirely off while the consuming identity is not
/// authenticated, a policy enforced at that boundary rather than here.
pub struct SelectionCapture {
    enabled: bool,
    pending: Option<Selection>,
}

impl SelectionCapture {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            pending: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Toggles capture. Disabling drops any pending candidate.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.pending = None;
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops the pending candidate without committing it.
    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Handles one selection release.
    ///
    /// Empty or collapsed selections and selections anchored inside the
    /// assistant's own surface clear the pending candidate and return
    /// nothing. Anything else becomes the pending candidate and yields the
    /// anchor at which the menu should open.
    pub fn on_selection_release(
        &mut self,
        selection: Selection,
        viewport: Viewport,
    ) -> Option<MenuAnchor> {
        if !self.enabled {
            self.pending = None;
            return None;
        }
        if selection.text.trim().is_empty() || selection.within_surface {
            self.pending = None;
            return None;
        }

        let anchor = menu_anchor(&selection.rect, &viewport);
        tracing::debug!(
            chars = selection.text.chars().count(),
            top = anchor.top,
            left = anchor.left,
            "Selection candidate registered"
        );
        self.pending = Some(selection);
        Some(anchor)
    }

    /// Commits the pending candidate as an ask intent.
    pub fn ask(&mut self) -> Option<Intent> {
        self.pending.take().map(|s| Intent::ask(&s.text))
    }

    /// Commits the pending candidate as a summarize intent.
    pub fn summarize(&mut self) -> Option<Intent> {
        self.pending.take().map(|s| Intent::summarize(&s.text))
    }
}

/// Positions the menu above the selection, horizontally centered on it and
/// clamped to stay within the viewport.
fn menu_anchor(rect: &SelectionRect, viewport: &Viewport) -> MenuAnchor {
    let top = rect.top - MENU_OFFSET_PX;
    let centered = rect.left + rect.width / 2.0 - MENU_WIDTH_PX / 2.0;
    let max_left = (viewport.width - MENU_WIDTH_PX - VIEWPORT_MARGIN_PX).max(VIEWPORT_MARGIN_PX);
    let left = centered.clamp(VIEWPORT_MARGIN_PX, max_left);
    MenuAnchor { top, left }
}

// =============================================================================
// Tests
// =============================================================================
