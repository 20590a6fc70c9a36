use crate::surface::{EditorFamily, MarkerArea};

use super::panel::{PanelFrame, ToolboxPanel, delegate_panel_frame};

/// Free-form notes attached to a marker. Empty text clears them.
pub struct NotesPanel {
    frame: PanelFrame<String>,
}

impl NotesPanel {
    pub fn new(title: &str, icon: &'static str) -> Self {
        Self {
            frame: PanelFrame::new(title, icon),
        }
    }

    fn applies(_family: EditorFamily) -> bool {
        true
    }

    pub fn text(&self) -> Option<&str> {
        self.frame.controls().map(String::as_str)
    }

    /// Replaces the text as if typed. The marker is written on the next
    /// `apply_values`.
    pub fn set_text(&mut self, text: &str) {
        if let Some(current) = self.frame.edit() {
            *current = text.to_string();
        }
    }
}

fn notes_value(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

impl ToolboxPanel for NotesPanel {
    delegate_panel_frame!();

    fn get_ui(&mut self) {
        self.frame.get_ui(String::new);
    }

    fn update_content(&mut self, area: &dyn MarkerArea) {
        let Some(props) = self.frame.begin_sync(area, Self::applies) else {
            return;
        };
        if let Some(text) = self.frame.controls_mut() {
            *text = props.notes.unwrap_or_default();
        }
    }

    fn apply_values(&mut self, area: &mut dyn MarkerArea) -> bool {
        let Some(notes) = self.text().map(notes_value) else {
            return false;
        };
        self.frame.apply_group(
            area,
            notes,
            |props| props.notes.clone(),
            |props, notes| props.notes = notes,
        )
    }

    fn show_content(&mut self, ui: &mut egui::Ui, area: &mut dyn MarkerArea) {
        let Some(text) = self.frame.controls_mut() else {
            return;
        };
        let response = ui.add(
            egui::TextEdit::multiline(text)
                .desired_rows(4)
                .hint_text("Notes"),
        );
        if response.changed() {
            self.frame.mark_dirty();
        }
        // Typing marks the panel dirty; the marker is written once focus leaves.
        if response.lost_focus() {
            self.apply_values(area);
        }
    }
}
