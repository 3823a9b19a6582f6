//! Sliding side panel hosting the gallery.

use mediadesk_core::ElementContext;

const DEFAULT_WIDTH: u32 = 300;

/// What the caller has to do after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    /// The panel slid in; its content should load its resources.
    LoadResources { width: u32 },
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelToggle {
    default_width: u32,
    width: u32,
    visible: bool,
}

impl PanelToggle {
    /// Width comes from `width`, else the button's `data-default-width`,
    /// else 300.
    pub fn new(button: &ElementContext, width: Option<u32>) -> Self {
        let default_width = width
            .or_else(|| {
                button
                    .data("default-width")
                    .and_then(|w| w.trim().parse().ok())
            })
            .unwrap_or(DEFAULT_WIDTH);
        Self {
            default_width,
            width: default_width,
            visible: false,
        }
    }

    pub fn default_width(&self) -> u32 {
        self.default_width
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle(&mut self) -> PanelAction {
        self.visible = !self.visible;
        self.width = self.default_width;
        if self.visible {
            PanelAction::LoadResources { width: self.width }
        } else {
            PanelAction::Closed
        }
    }

    /// Close button inside the panel.
    pub fn close(&mut self) -> bool {
        let was_visible = self.visible;
        self.visible = false;
        was_visible
    }

    /// Resize after the handle was dragged to `left` in a view `view_width`
    /// wide. The panel never gets narrower than its default width.
    pub fn drag_to(&mut self, view_width: u32, left: u32, handle_width: u32) -> u32 {
        if !self.visible {
            return self.width;
        }
        let available = view_width.saturating_sub(left).saturating_sub(handle_width);
        self.width = available.max(self.default_width);
        self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_resolution_order() {
        let button = ElementContext::new("button").with_data("default-width", "420");
        assert_eq!(PanelToggle::new(&button, Some(250)).default_width(), 250);
        assert_eq!(PanelToggle::new(&button, None).default_width(), 420);
        assert_eq!(
            PanelToggle::new(&ElementContext::new("button"), None).default_width(),
            300
        );
        let bad = ElementContext::new("button").with_data("default-width", "wide");
        assert_eq!(PanelToggle::new(&bad, None).default_width(), 300);
    }

    #[test]
    fn toggle_opens_then_closes() {
        let mut panel = PanelToggle::new(&ElementContext::new("button"), None);
        assert_eq!(panel.toggle(), PanelAction::LoadResources { width: 300 });
        assert!(panel.is_visible());
        assert_eq!(panel.toggle(), PanelAction::Closed);
        assert!(!panel.close());
    }

    #[test]
    fn drag_keeps_minimum_width() {
        let mut panel = PanelToggle::new(&ElementContext::new("button"), None);
        panel.toggle();
        assert_eq!(panel.drag_to(1200, 700, 20), 480);
        assert_eq!(panel.drag_to(1200, 1000, 20), 300);
        panel.toggle();
        assert_eq!(panel.width(), 300);
    }
}
