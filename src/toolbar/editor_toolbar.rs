use crate::surface::{MarkerArea, MarkerId, MarkerKind};

use super::marker_type_group::MarkerTypeGroupButton;
use super::marker_types::{GLYPH_MARKER_SIZE, MarkerTypeItem, default_groups};
use super::{ActionButton, ToolbarAction, create_action_button};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Actions the toolbar hands back to its shell instead of the marker area.
pub enum ShellRequest {
    Save,
    Close,
}

/// A click on the editor toolbar, not yet applied to the area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarCommand {
    Action(ToolbarAction),
    /// Group index and the type picked from it.
    MarkerType(usize, MarkerTypeItem),
}

/// Top toolbar of the editor: selection tools, marker type groups, OK/close.
pub struct EditorToolbar {
    select_button: ActionButton,
    delete_button: ActionButton,
    ok_button: ActionButton,
    close_button: ActionButton,
    groups: Vec<MarkerTypeGroupButton>,
}

impl Default for EditorToolbar {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorToolbar {
    pub fn new() -> Self {
        let groups = default_groups()
            .into_iter()
            .map(|group| {
                let wide = group.items.len() > 5;
                MarkerTypeGroupButton::new(group, wide)
            })
            .collect();
        Self {
            select_button: create_action_button("Select", ToolbarAction::Select, "⬉"),
            delete_button: create_action_button("Delete", ToolbarAction::Delete, "🗑"),
            ok_button: create_action_button("OK", ToolbarAction::Save, "✔"),
            close_button: create_action_button("Close", ToolbarAction::Close, "✖"),
            groups,
        }
    }

    pub fn groups(&self) -> &[MarkerTypeGroupButton] {
        &self.groups
    }

    pub fn handle_action<A: MarkerArea + ?Sized>(
        &mut self,
        action: ToolbarAction,
        area: &mut A,
    ) -> Option<ShellRequest> {
        tracing::debug!(action = action.id(), "editor toolbar action");
        match action {
            ToolbarAction::Select => {
                area.switch_to_select_mode();
                for group in &mut self.groups {
                    group.set_current(None, false);
                }
                None
            }
            ToolbarAction::Delete => {
                area.delete_selected_markers();
                None
            }
            ToolbarAction::Save => Some(ShellRequest::Save),
            ToolbarAction::Close => Some(ShellRequest::Close),
            _ => None,
        }
    }

    /// Creates a marker of `item`'s type; the group at `group_index` becomes
    /// the only active one.
    pub fn handle_marker_type<A: MarkerArea + ?Sized>(
        &mut self,
        group_index: usize,
        item: &MarkerTypeItem,
        area: &mut A,
    ) -> Option<MarkerId> {
        for (idx, group) in self.groups.iter_mut().enumerate() {
            if idx != group_index {
                group.set_current(None, false);
            }
        }
        let id = area.create_marker(item.kind)?;
        if item.kind == MarkerKind::CustomImage {
            area.set_custom_image(id, item.icon, GLYPH_MARKER_SIZE, GLYPH_MARKER_SIZE);
        }
        tracing::debug!(marker = item.kind.type_name(), ?id, "marker created from toolbar");
        Some(id)
    }

    pub fn apply<A: MarkerArea + ?Sized>(
        &mut self,
        command: ToolbarCommand,
        area: &mut A,
    ) -> Option<ShellRequest> {
        match command {
            ToolbarCommand::Action(action) => self.handle_action(action, area),
            ToolbarCommand::MarkerType(idx, item) => {
                self.handle_marker_type(idx, &item, area);
                None
            }
        }
    }

    /// Draws the toolbar and returns the clicked command. The caller applies
    /// it with [`apply`](Self::apply).
    pub fn ui(&mut self, ui: &mut egui::Ui) -> Option<ToolbarCommand> {
        let mut action = None;
        let mut picked = None;

        ui.horizontal(|ui| {
            let mut on_click = |a: ToolbarAction| action = Some(a);
            self.select_button.ui(ui, &mut on_click);
            self.delete_button.ui(ui, &mut on_click);
            ui.separator();

            for (idx, group) in self.groups.iter_mut().enumerate() {
                if let Some(item) = group.ui(ui) {
                    picked = Some(ToolbarCommand::MarkerType(idx, item));
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                self.close_button.ui(ui, &mut on_click);
                self.ok_button.ui(ui, &mut on_click);
            });
        });

        picked.or(action.map(ToolbarCommand::Action))
    }
}
