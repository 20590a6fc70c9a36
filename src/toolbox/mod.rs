//! Editor toolbox: undo/redo, marker property panels and zoom controls.

pub mod fill;
pub mod font;
pub mod notes;
pub mod opacity;
pub mod panel;
pub mod stroke;

use std::sync::mpsc;

use crate::surface::{AreaEvent, MarkerArea};
use crate::toolbar::zoom::{zoom_in, zoom_out, zoom_reset};
use crate::toolbar::{ActionButton, ToolbarAction, create_action_button};

pub use panel::ToolboxPanel;

use fill::FillPanel;
use font::FontPanel;
use notes::NotesPanel;
use opacity::OpacityPanel;
use stroke::StrokePanel;

pub struct EditorToolbox {
    undo_button: ActionButton,
    redo_button: ActionButton,
    zoom_out_button: ActionButton,
    zoom_reset_button: ActionButton,
    zoom_in_button: ActionButton,
    panels: Vec<Box<dyn ToolboxPanel>>,
    events: Option<mpsc::Receiver<AreaEvent>>,
}

impl Default for EditorToolbox {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorToolbox {
    pub fn new() -> Self {
        Self {
            undo_button: create_action_button("Undo", ToolbarAction::Undo, "⮪"),
            redo_button: create_action_button("Redo", ToolbarAction::Redo, "⮫"),
            zoom_out_button: create_action_button("Zoom Out", ToolbarAction::ZoomOut, "➖"),
            zoom_reset_button: create_action_button("Zoom Reset", ToolbarAction::ZoomReset, "1:1"),
            zoom_in_button: create_action_button("Zoom In", ToolbarAction::ZoomIn, "➕"),
            panels: Vec::new(),
            events: None,
        }
    }

    pub fn is_built(&self) -> bool {
        self.events.is_some()
    }

    /// Subscribes to the area and creates the property panels on the first
    /// call. Every call refreshes the undo/redo buttons.
    pub fn get_ui(&mut self, area: &mut dyn MarkerArea) {
        if self.events.is_none() {
            self.events = Some(area.subscribe());
            self.panels = vec![
                Box::new(FontPanel::new("Font", "🗛")),
                Box::new(StrokePanel::new("Stroke", "▭")),
                Box::new(FillPanel::new("Fill", "💧")),
                Box::new(OpacityPanel::new("Opacity", "◐")),
                Box::new(NotesPanel::new("Notes", "🗒")),
            ];
            for panel in &mut self.panels {
                panel.get_ui();
            }
            tracing::debug!(panels = self.panels.len(), "editor toolbox built");
        }
        self.update_toolbar_buttons(area);
    }

    pub fn panels(&self) -> impl Iterator<Item = &dyn ToolboxPanel> {
        self.panels.iter().map(|panel| panel.as_ref())
    }

    pub fn panel(&self, title: &str) -> Option<&dyn ToolboxPanel> {
        self.panels().find(|panel| panel.title() == title)
    }

    pub fn undo_enabled(&self) -> bool {
        self.undo_button.enabled
    }

    pub fn redo_enabled(&self) -> bool {
        self.redo_button.enabled
    }

    /// Handles the area events queued since the last frame.
    pub fn poll(&mut self, area: &mut dyn MarkerArea) {
        let Some(events) = self.events.as_ref() else {
            return;
        };
        let pending: Vec<AreaEvent> = events.try_iter().collect();
        for event in pending {
            match event {
                AreaEvent::MarkerSelect(_) => {
                    self.update_panel_visibility(area);
                    self.update_panel_content(area);
                }
                AreaEvent::MarkerDeselect(_) => {
                    self.apply_panel_values(area);
                    self.update_panel_visibility(area);
                }
                AreaEvent::AreaStateChange => self.update_toolbar_buttons(area),
                AreaEvent::MarkerCreate(_) => {}
            }
        }
    }

    /// Writes pending panel edits onto the selected marker now, instead of
    /// waiting for the deselect event. Must run before anything that swaps
    /// or removes markers, or the late write lands on the new state.
    pub fn flush_pending_edits(&mut self, area: &mut dyn MarkerArea) {
        self.poll(area);
        self.apply_panel_values(area);
        self.update_panel_visibility(area);
    }

    pub fn handle_action(&mut self, action: ToolbarAction, area: &mut dyn MarkerArea) {
        tracing::debug!(action = action.id(), "editor toolbox action");
        match action {
            ToolbarAction::Undo => {
                self.flush_pending_edits(area);
                if area.is_undo_possible() {
                    area.undo();
                }
            }
            ToolbarAction::Redo => {
                self.flush_pending_edits(area);
                if area.is_redo_possible() {
                    area.redo();
                }
            }
            ToolbarAction::ZoomIn => zoom_in(&mut *area),
            ToolbarAction::ZoomOut => zoom_out(&mut *area),
            ToolbarAction::ZoomReset => zoom_reset(&mut *area),
            _ => {}
        }
        self.update_toolbar_buttons(area);
    }

    /// No-op until the toolbox is built.
    pub fn update_toolbar_buttons(&mut self, area: &dyn MarkerArea) {
        if !self.is_built() {
            return;
        }
        self.undo_button.enabled = area.is_undo_possible();
        self.redo_button.enabled = area.is_redo_possible();
    }

    fn update_panel_visibility(&mut self, area: &dyn MarkerArea) {
        for panel in &mut self.panels {
            panel.update_visibility(area);
        }
    }

    fn update_panel_content(&mut self, area: &dyn MarkerArea) {
        for panel in &mut self.panels {
            panel.update_content(area);
        }
    }

    fn apply_panel_values(&mut self, area: &mut dyn MarkerArea) {
        for panel in &mut self.panels {
            if panel.apply_values(area) {
                tracing::debug!(panel = panel.title(), "panel values applied");
            }
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, area: &mut dyn MarkerArea) {
        self.get_ui(area);
        self.poll(area);

        let mut action = None;
        ui.horizontal(|ui| {
            let mut on_click = |a: ToolbarAction| action = Some(a);
            self.undo_button.ui(ui, &mut on_click);
            self.redo_button.ui(ui, &mut on_click);
            ui.separator();

            for panel in &mut self.panels {
                panel::show_panel(panel.as_mut(), ui, area);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                self.zoom_in_button.ui(ui, &mut on_click);
                self.zoom_reset_button.ui(ui, &mut on_click);
                self.zoom_out_button.ui(ui, &mut on_click);
            });
        });

        if let Some(action) = action {
            self.handle_action(action, area);
        }
    }
}
