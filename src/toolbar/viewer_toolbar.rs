use crate::surface::ZoomSurface;

use super::zoom::{zoom_in, zoom_out};
use super::{ActionButton, ToolbarAction, create_action_button};

/// Zoom controls floating over the viewer.
pub struct ViewerToolbar {
    zoom_out_button: ActionButton,
    zoom_reset_button: ActionButton,
    zoom_to_fit_button: ActionButton,
    zoom_in_button: ActionButton,
}

impl Default for ViewerToolbar {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerToolbar {
    pub fn new() -> Self {
        Self {
            zoom_out_button: create_action_button("Zoom Out", ToolbarAction::ZoomOut, "➖"),
            zoom_reset_button: create_action_button("Zoom Reset", ToolbarAction::ZoomReset, "1:1"),
            zoom_to_fit_button: create_action_button("Zoom to Fit", ToolbarAction::ZoomToFit, "⛶"),
            zoom_in_button: create_action_button("Zoom In", ToolbarAction::ZoomIn, "➕"),
        }
    }

    /// Unlike the editor, reset here always returns to 1:1; fitting has its own button.
    pub fn handle_action<S: ZoomSurface + ?Sized>(&mut self, action: ToolbarAction, view: &mut S) {
        tracing::debug!(action = action.id(), "viewer toolbar action");
        match action {
            ToolbarAction::ZoomIn => zoom_in(view),
            ToolbarAction::ZoomOut => zoom_out(view),
            ToolbarAction::ZoomReset => view.set_zoom_level(1.0),
            ToolbarAction::ZoomToFit => view.auto_zoom(),
            _ => {}
        }
    }

    pub fn ui<S: ZoomSurface + ?Sized>(&mut self, ui: &mut egui::Ui, view: &mut S) {
        let mut action = None;
        ui.horizontal(|ui| {
            let mut on_click = |a: ToolbarAction| action = Some(a);
            self.zoom_out_button.ui(ui, &mut on_click);
            self.zoom_reset_button.ui(ui, &mut on_click);
            self.zoom_to_fit_button.ui(ui, &mut on_click);
            self.zoom_in_button.ui(ui, &mut on_click);
        });
        if let Some(action) = action {
            self.handle_action(action, view);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::memory::MemoryMarkerArea;

    #[test]
    fn reset_ignores_auto_zoom_flags() {
        let mut toolbar = ViewerToolbar::new();
        let mut view = MemoryMarkerArea::view_only();
        view.set_auto_zoom(true, true);
        view.set_zoom_level(2.5);

        toolbar.handle_action(ToolbarAction::ZoomReset, &mut view);
        assert_eq!(view.zoom_level(), 1.0);
    }

    #[test]
    fn zoom_to_fit_uses_the_viewport() {
        let mut toolbar = ViewerToolbar::new();
        let mut view = MemoryMarkerArea::view_only();
        view.set_auto_zoom(true, true);
        view.set_viewport(egui::vec2(400.0, 300.0));

        toolbar.handle_action(ToolbarAction::ZoomToFit, &mut view);
        assert_eq!(view.zoom_level(), 0.5);
    }

    #[test]
    fn editor_only_actions_are_ignored() {
        let mut toolbar = ViewerToolbar::new();
        let mut view = MemoryMarkerArea::view_only();
        toolbar.handle_action(ToolbarAction::Delete, &mut view);
        toolbar.handle_action(ToolbarAction::ZoomIn, &mut view);
        assert!((view.zoom_level() - 1.1).abs() < 1e-6);
    }
}
