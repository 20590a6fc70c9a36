//! Action buttons and the toolbars built from them.

pub mod editor_toolbar;
pub mod marker_type_group;
pub mod marker_types;
pub mod viewer_toolbar;
pub mod zoom;

pub use editor_toolbar::{EditorToolbar, ShellRequest, ToolbarCommand};
pub use viewer_toolbar::ViewerToolbar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Closed set of toolbar actions.
pub enum ToolbarAction {
    Select,
    Delete,
    Save,
    Close,
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    ZoomToFit,
}

impl ToolbarAction {
    pub fn id(self) -> &'static str {
        match self {
            ToolbarAction::Select => "select",
            ToolbarAction::Delete => "delete",
            ToolbarAction::Save => "save",
            ToolbarAction::Close => "close",
            ToolbarAction::Undo => "undo",
            ToolbarAction::Redo => "redo",
            ToolbarAction::ZoomIn => "zoom-in",
            ToolbarAction::ZoomOut => "zoom-out",
            ToolbarAction::ZoomReset => "zoom-reset",
            ToolbarAction::ZoomToFit => "zoom-to-fit",
        }
    }
}

/// A toolbar button tagged with one [`ToolbarAction`].
#[derive(Debug, Clone)]
pub struct ActionButton {
    title: &'static str,
    action: ToolbarAction,
    icon: &'static str,
    pub enabled: bool,
}

/// Builds an enabled button. Building never dispatches.
pub fn create_action_button(
    title: &'static str,
    action: ToolbarAction,
    icon: &'static str,
) -> ActionButton {
    ActionButton {
        title,
        action,
        icon,
        enabled: true,
    }
}

impl ActionButton {
    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn action(&self) -> ToolbarAction {
        self.action
    }

    /// Dispatches the button's action once, unless the button is disabled.
    pub fn press(&self, on_click: &mut dyn FnMut(ToolbarAction)) {
        if self.enabled {
            on_click(self.action);
        }
    }

    pub fn ui(&self, ui: &mut egui::Ui, on_click: &mut dyn FnMut(ToolbarAction)) -> egui::Response {
        let response = ui
            .add_enabled(self.enabled, egui::Button::new(self.icon).min_size(egui::vec2(28.0, 28.0)))
            .on_hover_text(self.title)
            .on_disabled_hover_text(self.title);
        if response.clicked() {
            self.press(on_click);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn building_a_button_does_not_dispatch() {
        let mut calls = Vec::new();
        let button = create_action_button("Undo", ToolbarAction::Undo, "⟲");
        assert!(calls.is_empty());

        button.press(&mut |action| calls.push(action));
        assert_eq!(calls, vec![ToolbarAction::Undo]);
    }

    #[test]
    fn disabled_button_never_dispatches() {
        let mut calls = 0;
        let mut button = create_action_button("Redo", ToolbarAction::Redo, "⟳");
        button.enabled = false;
        button.press(&mut |_| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn action_ids_match_their_wire_names() {
        assert_eq!(ToolbarAction::ZoomToFit.id(), "zoom-to-fit");
        assert_eq!(ToolbarAction::Save.id(), "save");
    }
}
